//! Stream framing for fixed-size requests.
//!
//! A single transport read may hold part of a request, exactly one, or
//! several back to back. `MessageCodec` buffers until a full 9-byte request
//! is available, so callers only ever see whole messages.

use crate::error::WireError;
use crate::message::{Message, MESSAGE_LEN, RESPONSE_LEN};
use bytes::{Buf, BufMut, BytesMut};
use mte_core::Price;
use tokio_util::codec::{Decoder, Encoder};

/// Server-side codec: decodes requests, encodes query responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageCodec;

impl MessageCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for MessageCodec {
    type Item = Message;
    type Error = WireError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>, WireError> {
        // Reject a bad tag as soon as it is buffered rather than waiting for
        // the remaining 8 bytes.
        if let Some(&tag) = src.first() {
            if !Message::is_known_tag(tag) {
                return Err(WireError::UnknownTag(tag));
            }
        }

        if src.len() < MESSAGE_LEN {
            src.reserve(MESSAGE_LEN - src.len());
            return Ok(None);
        }

        let mut raw = [0u8; MESSAGE_LEN];
        src.copy_to_slice(&mut raw);
        Message::decode(&raw).map(Some)
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Message>, WireError> {
        match self.decode(buf)? {
            Some(msg) => Ok(Some(msg)),
            None if buf.is_empty() => Ok(None),
            None => Err(WireError::Truncated {
                buffered: buf.len(),
            }),
        }
    }
}

impl Encoder<Price> for MessageCodec {
    type Error = WireError;

    fn encode(&mut self, mean: Price, dst: &mut BytesMut) -> Result<(), WireError> {
        dst.reserve(RESPONSE_LEN);
        dst.put_i32(mean);
        Ok(())
    }
}

/// Decode a 4-byte query response.
pub fn decode_response(raw: [u8; RESPONSE_LEN]) -> Price {
    i32::from_be_bytes(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use tokio_util::codec::FramedRead;

    fn insert(timestamp: i32, price: i32) -> Message {
        Message::Insert { timestamp, price }
    }

    #[test]
    fn test_partial_buffer_waits() {
        let mut codec = MessageCodec::new();
        let bytes = insert(1, 2).encode();
        let mut buf = BytesMut::from(&bytes[..5]);

        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), 5);

        buf.extend_from_slice(&bytes[5..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(insert(1, 2)));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_coalesced_messages_decode_one_at_a_time() {
        let mut codec = MessageCodec::new();
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&insert(1, 10).encode());
        buf.extend_from_slice(&insert(2, 20).encode());
        buf.extend_from_slice(&insert(3, 30).encode()[..4]);

        assert_eq!(codec.decode(&mut buf).unwrap(), Some(insert(1, 10)));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(insert(2, 20)));
        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), 4);
    }

    #[test]
    fn test_unknown_tag_rejected_before_full_frame() {
        let mut codec = MessageCodec::new();
        let mut buf = BytesMut::from(&b"X"[..]);
        let err = codec.decode(&mut buf).unwrap_err();
        assert!(matches!(err, WireError::UnknownTag(b'X')));
    }

    #[test]
    fn test_eof_with_partial_frame_is_truncated() {
        let mut codec = MessageCodec::new();
        let mut buf = BytesMut::from(&insert(1, 2).encode()[..8]);
        let err = codec.decode_eof(&mut buf).unwrap_err();
        assert!(matches!(err, WireError::Truncated { buffered: 8 }));
    }

    #[test]
    fn test_eof_with_empty_buffer_is_clean() {
        let mut codec = MessageCodec::new();
        let mut buf = BytesMut::new();
        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_encode_response() {
        let mut codec = MessageCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(-2, &mut buf).unwrap();
        assert_eq!(&buf[..], &[0xff, 0xff, 0xff, 0xfe]);
        assert_eq!(decode_response([0xff, 0xff, 0xff, 0xfe]), -2);
        assert_eq!(decode_response([0x00, 0x00, 0x00, 0x65]), 101);
    }

    #[tokio::test]
    async fn test_framed_read_reassembles_split_reads() {
        let first = insert(1000, 100).encode();
        let second = Message::Query {
            min_time: 1000,
            max_time: 1000,
        }
        .encode();

        // Deliver the two requests across uneven reads.
        let reader = tokio_test::io::Builder::new()
            .read(&first[..3])
            .read(&first[3..])
            .read(&second[..1])
            .read(&second[1..7])
            .read(&second[7..])
            .build();

        let mut framed = FramedRead::new(reader, MessageCodec::new());
        assert_eq!(framed.next().await.unwrap().unwrap(), insert(1000, 100));
        assert_eq!(
            framed.next().await.unwrap().unwrap(),
            Message::Query {
                min_time: 1000,
                max_time: 1000
            }
        );
        assert!(framed.next().await.is_none());
    }

    #[tokio::test]
    async fn test_framed_read_truncated_stream() {
        let bytes = insert(5, 6).encode();
        let reader = tokio_test::io::Builder::new().read(&bytes[..6]).build();

        let mut framed = FramedRead::new(reader, MessageCodec::new());
        let result = framed.next().await.unwrap();
        assert!(matches!(result, Err(WireError::Truncated { buffered: 6 })));
    }
}
