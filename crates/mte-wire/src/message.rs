//! Request message types.

use crate::error::{WireError, WireResult};
use mte_core::{Price, Timestamp};

/// Size of every request on the wire.
pub const MESSAGE_LEN: usize = 9;

/// Size of a query response on the wire.
pub const RESPONSE_LEN: usize = 4;

/// Tag byte for an insert request.
pub const TAG_INSERT: u8 = b'I';

/// Tag byte for a query request.
pub const TAG_QUERY: u8 = b'Q';

/// A decoded client request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Append a price record. No response.
    Insert { timestamp: Timestamp, price: Price },
    /// Mean price over `[min_time, max_time]`. Answered with one `i32`.
    Query { min_time: Timestamp, max_time: Timestamp },
}

impl Message {
    /// Decode a complete 9-byte request.
    pub fn decode(raw: &[u8; MESSAGE_LEN]) -> WireResult<Self> {
        let first = i32::from_be_bytes([raw[1], raw[2], raw[3], raw[4]]);
        let second = i32::from_be_bytes([raw[5], raw[6], raw[7], raw[8]]);

        match raw[0] {
            TAG_INSERT => Ok(Self::Insert {
                timestamp: first,
                price: second,
            }),
            TAG_QUERY => Ok(Self::Query {
                min_time: first,
                max_time: second,
            }),
            other => Err(WireError::UnknownTag(other)),
        }
    }

    /// Encode to the 9-byte wire form.
    pub fn encode(&self) -> [u8; MESSAGE_LEN] {
        let (tag, first, second) = match *self {
            Self::Insert { timestamp, price } => (TAG_INSERT, timestamp, price),
            Self::Query { min_time, max_time } => (TAG_QUERY, min_time, max_time),
        };

        let mut out = [0u8; MESSAGE_LEN];
        out[0] = tag;
        out[1..5].copy_from_slice(&first.to_be_bytes());
        out[5..9].copy_from_slice(&second.to_be_bytes());
        out
    }

    /// Check whether a tag byte starts a known request.
    pub fn is_known_tag(tag: u8) -> bool {
        matches!(tag, TAG_INSERT | TAG_QUERY)
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "insert",
            Self::Query { .. } => "query",
        }
    }
}
