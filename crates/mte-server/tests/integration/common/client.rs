//! Minimal protocol client for integration tests.

use mte_wire::{decode_response, Message, RESPONSE_LEN};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

const READ_TIMEOUT: Duration = Duration::from_secs(5);

pub struct TestClient {
    stream: TcpStream,
}

impl TestClient {
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        stream.set_nodelay(true).unwrap();
        Self { stream }
    }

    pub async fn insert(&mut self, timestamp: i32, price: i32) {
        self.send_raw(&Message::Insert { timestamp, price }.encode())
            .await;
    }

    /// Send a query and wait for its response.
    pub async fn query(&mut self, min_time: i32, max_time: i32) -> i32 {
        self.send_raw(&Message::Query { min_time, max_time }.encode())
            .await;
        self.read_mean().await
    }

    /// Like `query`, but `None` if the server closes instead of answering.
    pub async fn try_query(&mut self, min_time: i32, max_time: i32) -> Option<i32> {
        let bytes = Message::Query { min_time, max_time }.encode();
        self.stream.write_all(&bytes).await.ok()?;
        let mut buf = [0u8; RESPONSE_LEN];
        match timeout(READ_TIMEOUT, self.stream.read_exact(&mut buf)).await {
            Ok(Ok(_)) => Some(decode_response(buf)),
            _ => None,
        }
    }

    pub async fn send_raw(&mut self, bytes: &[u8]) {
        self.stream.write_all(bytes).await.unwrap();
        self.stream.flush().await.unwrap();
    }

    pub async fn read_mean(&mut self) -> i32 {
        let mut buf = [0u8; RESPONSE_LEN];
        timeout(READ_TIMEOUT, self.stream.read_exact(&mut buf))
            .await
            .expect("timed out waiting for response")
            .unwrap();
        decode_response(buf)
    }

    /// Half-close the write side, as a client that has finished sending.
    pub async fn finish_writes(&mut self) {
        self.stream.shutdown().await.unwrap();
    }

    /// Read until the server closes the connection and return every byte
    /// received. A reset counts as closed.
    pub async fn read_until_closed(&mut self) -> Vec<u8> {
        let mut received = Vec::new();
        let mut buf = [0u8; 64];
        loop {
            let read = timeout(READ_TIMEOUT, self.stream.read(&mut buf))
                .await
                .expect("timed out waiting for server to close");
            match read {
                Ok(0) => break,
                Ok(n) => received.extend_from_slice(&buf[..n]),
                Err(_) => break,
            }
        }
        received
    }
}
