//! Core domain types for the price ledger service.
//!
//! This crate provides the state owned by a single client session:
//! - `PriceRecord`: One `(timestamp, price)` observation
//! - `Ledger`: Append-only, insertion-ordered record store
//! - `RangeSummary`: Sum/count over a timestamp range, reduced to a mean

pub mod error;
pub mod ledger;
pub mod record;

pub use error::{CoreError, Result};
pub use ledger::{Ledger, RangeSummary};
pub use record::{Price, PriceRecord, Timestamp};
