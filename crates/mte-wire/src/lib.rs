//! Binary wire protocol for the price ledger service.
//!
//! Every request is exactly 9 bytes with no length prefix or delimiter:
//!
//! ```text
//! ┌──────┬──────────────────┬──────────────────┐
//! │ tag  │ i32 (big-endian) │ i32 (big-endian) │
//! │ 1 B  │       4 B        │       4 B        │
//! └──────┴──────────────────┴──────────────────┘
//!   'I'     timestamp          price
//!   'Q'     min_time           max_time
//! ```
//!
//! Only `Q` produces a response: a single 4-byte big-endian `i32` mean.
//! Framing relies purely on the fixed size, so `MessageCodec` reassembles
//! requests that arrive split across reads or coalesced into one read.

pub mod codec;
pub mod error;
pub mod message;

pub use codec::{decode_response, MessageCodec};
pub use error::{WireError, WireResult};
pub use message::{Message, MESSAGE_LEN, RESPONSE_LEN, TAG_INSERT, TAG_QUERY};
