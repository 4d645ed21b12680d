use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::clock::LogicalClock;
use super::error::StoreResult;
use super::keys::{EntryKey, LogEntry};
use super::policy::RetentionPolicy;
use super::store::EntryStore;

/// Ephemeral store: entries live in an ordered map for the lifetime of the
/// process. Insert and trim run under one write lock.
#[derive(Debug)]
pub struct MemoryStore {
    policy: RetentionPolicy,
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    clock: LogicalClock,
    entries: BTreeMap<EntryKey, Vec<u8>>,
}

impl MemoryStore {
    pub fn new(policy: RetentionPolicy) -> Self {
        Self {
            policy,
            state: RwLock::new(MemoryState::default()),
        }
    }
}

impl EntryStore for MemoryStore {
    fn insert_at(&self, payload: &[u8], now: u64) -> StoreResult<EntryKey> {
        let mut state = self.state.write();
        let key = state.clock.tick(now);
        let plan = self.policy.plan(state.entries.len(), key.timestamp);

        let mut index = 0;
        while let Some(entry) = state.entries.first_entry() {
            if !plan.covers(index, entry.key().timestamp) {
                break;
            }
            entry.remove();
            index += 1;
        }

        state.entries.insert(key, payload.to_vec());
        Ok(key)
    }

    fn entries(&self) -> StoreResult<Vec<LogEntry>> {
        let state = self.state.read();
        Ok(state
            .entries
            .iter()
            .map(|(key, payload)| LogEntry::new(*key, payload.clone()))
            .collect())
    }

    fn len(&self) -> StoreResult<usize> {
        Ok(self.state.read().entries.len())
    }

    fn flush(&self) -> StoreResult<()> {
        Ok(())
    }
}
