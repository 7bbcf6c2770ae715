//! Price record type.

use std::fmt;

/// Opaque client-supplied timestamp. Not validated as wall-clock time.
pub type Timestamp = i32;

/// Client-supplied price.
pub type Price = i32;

/// A single price observation as inserted by a client.
///
/// Timestamps may repeat and arrive in any order; both are kept as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PriceRecord {
    pub timestamp: Timestamp,
    pub price: Price,
}

impl PriceRecord {
    pub fn new(timestamp: Timestamp, price: Price) -> Self {
        Self { timestamp, price }
    }

    /// Check if the timestamp lies in the closed range `[min_time, max_time]`.
    #[inline]
    pub fn is_within(&self, min_time: Timestamp, max_time: Timestamp) -> bool {
        min_time <= self.timestamp && self.timestamp <= max_time
    }
}

impl fmt::Display for PriceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.price, self.timestamp)
    }
}
