//! Per-session price ledger and range aggregation.
//!
//! A `Ledger` is owned by exactly one session and never shared. Records are
//! kept in insertion order and are never mutated or removed once appended.

use crate::error::{CoreError, Result};
use crate::record::{Price, PriceRecord, Timestamp};

/// Sum and count of the prices matched by a range scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeSummary {
    /// Number of matched records.
    pub count: u64,
    /// Sum of matched prices. Wide enough that no realistic ledger overflows.
    pub sum: i128,
    /// Records examined by the scan (0 when the range short-circuits).
    pub scanned: usize,
}

impl RangeSummary {
    /// Truncating integer mean of the matched prices, `0` if nothing matched.
    pub fn mean(&self) -> Price {
        if self.count == 0 {
            return 0;
        }
        // Mean of i32 values is always within i32 range.
        (self.sum / i128::from(self.count)) as Price
    }
}

/// Append-only, insertion-ordered record store.
#[derive(Debug, Default)]
pub struct Ledger {
    records: Vec<PriceRecord>,
    /// Maximum number of records (None = unbounded).
    capacity_limit: Option<usize>,
}

impl Ledger {
    /// Create an unbounded ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger that rejects inserts past `limit` records.
    pub fn with_capacity_limit(limit: Option<usize>) -> Self {
        Self {
            records: Vec::new(),
            capacity_limit: limit,
        }
    }

    /// Append a record.
    ///
    /// # Errors
    /// Returns `CoreError::LedgerFull` if the capacity limit is reached. The
    /// ledger is left unchanged.
    pub fn insert(&mut self, record: PriceRecord) -> Result<()> {
        if let Some(limit) = self.capacity_limit {
            if self.records.len() >= limit {
                return Err(CoreError::LedgerFull { limit });
            }
        }
        self.records.push(record);
        Ok(())
    }

    /// Scan all records with `min_time <= timestamp <= max_time`.
    ///
    /// An inverted range (`min_time > max_time`) short-circuits to an empty
    /// summary without scanning.
    pub fn summarize(&self, min_time: Timestamp, max_time: Timestamp) -> RangeSummary {
        if min_time > max_time {
            return RangeSummary::default();
        }

        let initial = RangeSummary {
            scanned: self.records.len(),
            ..RangeSummary::default()
        };

        self.records
            .iter()
            .filter(|r| r.is_within(min_time, max_time))
            .fold(initial, |mut acc, r| {
                acc.count += 1;
                acc.sum += i128::from(r.price);
                acc
            })
    }

    /// Truncating mean price over `[min_time, max_time]`.
    ///
    /// Returns `0` when the range is inverted or matches no records.
    pub fn mean(&self, min_time: Timestamp, max_time: Timestamp) -> Price {
        self.summarize(min_time, max_time).mean()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}


// ── Property-Based Tests ────────────────────────────────────────────
