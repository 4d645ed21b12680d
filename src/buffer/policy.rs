/// Retention policy and trim planning
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{BufferError, Result};

/// Count and age limits bound to a store for its whole lifetime.
///
/// A zero limit is disabled. At least one limit must be active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    max_entries: u64,
    max_age: Duration,
}

impl RetentionPolicy {
    /// Validate and build a policy
    pub fn new(max_entries: u64, max_age: Duration) -> Result<Self> {
        if max_entries == 0 && max_age.is_zero() {
            return Err(BufferError::InvalidPolicy);
        }
        Ok(Self {
            max_entries,
            max_age,
        })
    }

    /// Keep only the newest `max_entries` entries
    pub fn max_entries(max_entries: u64) -> Result<Self> {
        Self::new(max_entries, Duration::ZERO)
    }

    /// Drop entries older than `max_age`
    pub fn max_age(max_age: Duration) -> Result<Self> {
        Self::new(0, max_age)
    }

    pub fn entry_limit(&self) -> u64 {
        self.max_entries
    }

    pub fn age_limit(&self) -> Duration {
        self.max_age
    }

    /// Age limit in nanoseconds, saturating at `u64::MAX`
    pub fn max_age_nanos(&self) -> u64 {
        u64::try_from(self.max_age.as_nanos()).unwrap_or(u64::MAX)
    }

    /// Age limit in milliseconds, saturating at `u64::MAX`
    pub fn max_age_millis(&self) -> u64 {
        u64::try_from(self.max_age.as_millis()).unwrap_or(u64::MAX)
    }

    /// Work out which existing entries must go when one more entry stamped
    /// `incoming` is added to `retained` entries.
    pub(crate) fn plan(&self, retained: usize, incoming: u64) -> TrimPlan {
        let excess = if self.max_entries > 0 {
            let limit = usize::try_from(self.max_entries).unwrap_or(usize::MAX);
            retained.saturating_add(1).saturating_sub(limit)
        } else {
            0
        };

        let cutoff = if self.max_age.is_zero() {
            None
        } else {
            Some(incoming.saturating_sub(self.max_age_nanos()))
        };

        TrimPlan { excess, cutoff }
    }

    pub(crate) fn to_record(self) -> PolicyRecord {
        PolicyRecord {
            max_age_ns: self.max_age_nanos(),
            max_entries: self.max_entries,
        }
    }
}

/// Persisted form of the policy (singleton row in the `policy` partition)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRecord {
    pub max_age_ns: u64,
    pub max_entries: u64,
}

/// Deletion plan for a single insert.
///
/// Entries are walked oldest-first; both limits select a prefix of that
/// order, so trimming stops at the first entry that is not covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TrimPlan {
    /// Number of oldest entries over the count limit
    pub excess: usize,
    /// Entries stamped strictly before this are expired
    pub cutoff: Option<u64>,
}

impl TrimPlan {
    /// Whether the entry at `index` (0 = oldest) stamped `timestamp` is dropped
    pub fn covers(&self, index: usize, timestamp: u64) -> bool {
        index < self.excess || self.cutoff.is_some_and(|cutoff| timestamp < cutoff)
    }
}
