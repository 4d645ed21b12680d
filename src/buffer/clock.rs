use std::time::{SystemTime, UNIX_EPOCH};

use super::keys::EntryKey;

/// Issues strictly increasing entry keys from wall-clock readings.
///
/// The timestamp never goes backwards even if the wall clock does; the
/// sequence number breaks ties between equal timestamps.
#[derive(Debug, Default)]
pub struct LogicalClock {
    last: Option<EntryKey>,
}

impl LogicalClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume after the last persisted key
    pub fn resume(last: Option<EntryKey>) -> Self {
        Self { last }
    }

    pub fn last(&self) -> Option<EntryKey> {
        self.last
    }

    /// Key that `tick(now)` would return, without advancing
    pub fn peek(&self, now: u64) -> EntryKey {
        match self.last {
            Some(last) => EntryKey::new(now.max(last.timestamp), last.seq.wrapping_add(1)),
            None => EntryKey::new(now, 0),
        }
    }

    /// Record `key` as issued once its write has committed
    pub fn advance(&mut self, key: EntryKey) {
        if self.last.is_none_or(|last| key > last) {
            self.last = Some(key);
        }
    }

    pub fn tick(&mut self, now: u64) -> EntryKey {
        let key = self.peek(now);
        self.advance(key);
        key
    }
}

/// Current Unix timestamp in nanoseconds
pub fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
