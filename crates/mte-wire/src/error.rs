//! Wire protocol error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("Unknown message tag: 0x{0:02x}")]
    UnknownTag(u8),

    #[error("Stream ended mid-message: {buffered} of 9 bytes buffered")]
    Truncated { buffered: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type WireResult<T> = Result<T, WireError>;
