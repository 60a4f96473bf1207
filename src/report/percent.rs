//! Exact coverage percentages.

use serde::{Serialize, Serializer};
use std::fmt;

/// A percentage truncated (never rounded) to two decimal places.
///
/// Stored as integer hundredths so `66.666…` is exactly `66.66` and
/// `29/100` is exactly `29.00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Percentage {
    hundredths: u64,
}

impl Percentage {
    pub const ZERO: Self = Self { hundredths: 0 };

    /// `covered / total * 100`, truncated to two decimals.
    ///
    /// Returns `None` when `total` is zero.
    #[must_use]
    pub fn from_ratio(covered: u64, total: u64) -> Option<Self> {
        if total == 0 {
            return None;
        }
        let covered = covered.min(total);
        Some(Self {
            hundredths: covered * 10_000 / total,
        })
    }

    #[must_use]
    pub const fn hundredths(self) -> u64 {
        self.hundredths
    }

    /// True when this percentage is at or above a whole-number target.
    #[must_use]
    pub fn meets(self, target: u32) -> bool {
        self.hundredths >= u64::from(target) * 100
    }

    #[must_use]
    pub fn as_f64(self) -> f64 {
        self.hundredths as f64 / 100.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.hundredths / 100, self.hundredths % 100)
    }
}

impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}
