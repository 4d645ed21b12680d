use std::path::Path;

use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use parking_lot::Mutex;

use super::clock::LogicalClock;
use super::error::{StoreError, StoreResult};
use super::keys::{EntryKey, LogEntry, POLICY_KEY};
use super::policy::{PolicyRecord, RetentionPolicy};
use super::store::EntryStore;

/// Fjall-backed durable store
///
/// Architecture:
/// - `entries` partition: EntryKey (16 bytes, big-endian) → raw payload
/// - `policy` partition: "policy" → PolicyRecord (JSON), rewritten on open
///
/// Every insert is one write batch holding the new entry and the removals
/// of its trim pass. Batches are serialized by the writer mutex, which also
/// owns the logical clock, the retained-entry count and the oldest retained
/// key. Reads go through a partition snapshot and never see half a batch.
///
/// Trimmed entries leave tombstones until compaction, so scans always start
/// at the oldest retained key rather than at the start of the partition.
pub struct DiskStore {
    policy: RetentionPolicy,
    keyspace: Keyspace,
    entries: PartitionHandle,
    settings: PartitionHandle,
    writer: Mutex<WriterState>,
}

#[derive(Debug)]
struct WriterState {
    clock: LogicalClock,
    retained: usize,
    oldest: Option<EntryKey>,
    /// Entries read by the most recent trim pass
    last_scan: usize,
}

impl DiskStore {
    /// Open or create a keyspace at `path` and bind `policy` to it
    pub fn open<P: AsRef<Path>>(path: P, policy: RetentionPolicy) -> StoreResult<Self> {
        let path = path.as_ref();

        std::fs::create_dir_all(path)?;

        let keyspace = Config::new(path).open()?;
        let entries = keyspace.open_partition("entries", PartitionCreateOptions::default())?;
        let settings = keyspace.open_partition("policy", PartitionCreateOptions::default())?;

        settings.insert(POLICY_KEY, serde_json::to_vec(&policy.to_record())?)?;

        // Resume the clock after the newest persisted entry and recount
        let mut retained = 0;
        let mut oldest = None;
        let mut last = None;
        for item in entries.iter() {
            let (key, _) = item?;
            let key = decode_key(&key)?;
            oldest.get_or_insert(key);
            last = Some(key);
            retained += 1;
        }

        Ok(Self {
            policy,
            keyspace,
            entries,
            settings,
            writer: Mutex::new(WriterState {
                clock: LogicalClock::resume(last),
                retained,
                oldest,
                last_scan: 0,
            }),
        })
    }

    /// Read back the persisted policy record
    pub fn stored_policy(&self) -> StoreResult<Option<PolicyRecord>> {
        match self.settings.get(POLICY_KEY)? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }

    /// Key of the oldest retained entry
    pub fn oldest(&self) -> Option<EntryKey> {
        self.writer.lock().oldest
    }
}

impl EntryStore for DiskStore {
    fn insert_at(&self, payload: &[u8], now: u64) -> StoreResult<EntryKey> {
        let mut writer = self.writer.lock();
        let key = writer.clock.peek(now);
        let plan = self.policy.plan(writer.retained, key.timestamp);

        let mut batch = self.keyspace.batch();
        let mut removed = 0;
        let mut scanned = 0;
        let mut survivor = None;
        if let Some(oldest) = writer.oldest {
            for item in self.entries.range(oldest.encode()..) {
                let (existing, _) = item?;
                scanned += 1;
                let existing_key = decode_key(&existing)?;
                if !plan.covers(removed, existing_key.timestamp) {
                    survivor = Some(existing_key);
                    break;
                }
                batch.remove(&self.entries, existing);
                removed += 1;
            }
        }
        batch.insert(&self.entries, key.encode().to_vec(), payload);
        batch.commit()?;

        writer.clock.advance(key);
        writer.retained = writer.retained - removed + 1;
        writer.oldest = Some(survivor.unwrap_or(key));
        writer.last_scan = scanned;
        Ok(key)
    }

    fn entries(&self) -> StoreResult<Vec<LogEntry>> {
        // Snapshot and scan start are taken together so they agree
        let (snapshot, oldest) = {
            let writer = self.writer.lock();
            (self.entries.snapshot(), writer.oldest)
        };

        let Some(oldest) = oldest else {
            return Ok(Vec::new());
        };

        let mut results = Vec::new();
        for item in snapshot.range(oldest.encode()..) {
            let (key, value) = item.map_err(fjall::Error::from)?;
            results.push(LogEntry::new(decode_key(&key)?, value.to_vec()));
        }

        Ok(results)
    }

    fn len(&self) -> StoreResult<usize> {
        Ok(self.writer.lock().retained)
    }

    fn flush(&self) -> StoreResult<()> {
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}

fn decode_key(key: &[u8]) -> StoreResult<EntryKey> {
    EntryKey::decode(key).ok_or_else(|| StoreError::InvalidKey(format!("{:02x?}", key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn create_test_store(policy: RetentionPolicy) -> (DiskStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = DiskStore::open(temp_dir.path().join("test_buffer"), policy).unwrap();
        (store, temp_dir)
    }

    fn texts(store: &DiskStore) -> Vec<String> {
        store.entries().unwrap().iter().map(LogEntry::text).collect()
    }

    #[test]
    fn test_open_store() {
        let temp_dir = TempDir::new().unwrap();
        let policy = RetentionPolicy::max_entries(5).unwrap();
        let store = DiskStore::open(temp_dir.path().join("test_buffer"), policy);
        assert!(store.is_ok());
    }

    #[test]
    fn test_policy_record_written() {
        let policy = RetentionPolicy::new(25, Duration::from_secs(2)).unwrap();
        let (store, _temp) = create_test_store(policy);

        let record = store.stored_policy().unwrap().unwrap();
        assert_eq!(record.max_entries, 25);
        assert_eq!(record.max_age_ns, 2_000_000_000);
    }

    #[test]
    fn test_count_retention() {
        let (store, _temp) = create_test_store(RetentionPolicy::max_entries(2).unwrap());

        for (i, entry) in ["a", "b", "c"].iter().enumerate() {
            store.insert_at(entry.as_bytes(), 100 + i as u64).unwrap();
        }

        assert_eq!(texts(&store), vec!["b", "c"]);
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn test_age_retention() {
        let policy = RetentionPolicy::max_age(Duration::from_nanos(100)).unwrap();
        let (store, _temp) = create_test_store(policy);

        store.insert_at(b"first", 1_000).unwrap();
        store.insert_at(b"second", 1_080).unwrap();
        store.insert_at(b"third", 1_150).unwrap();

        assert_eq!(texts(&store), vec!["second", "third"]);
    }

    #[test]
    fn test_binary_payload_preserved() {
        let (store, _temp) = create_test_store(RetentionPolicy::max_entries(4).unwrap());
        let payload = [0u8, 159, 146, 150, b'\n'];

        store.insert_at(&payload, 1).unwrap();
        let entries = store.entries().unwrap();
        assert_eq!(entries[0].payload(), &payload);
    }

    #[test]
    fn test_persistence_across_reopens() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test_buffer");
        let policy = RetentionPolicy::max_entries(3).unwrap();

        let last = {
            let store = DiskStore::open(&path, policy).unwrap();
            store.insert_at(b"one", 10).unwrap();
            store.insert_at(b"two", 20).unwrap();
            let last = store.insert_at(b"three", 30).unwrap();
            store.flush().unwrap();
            last
        };

        // Reopen: count and clock resume from disk
        let store = DiskStore::open(&path, policy).unwrap();
        assert_eq!(store.len().unwrap(), 3);

        let next = store.insert_at(b"four", 5).unwrap();
        assert!(next > last);
        assert_eq!(texts(&store), vec!["two", "three", "four"]);
    }

    #[test]
    fn test_reopen_rebinds_policy() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test_buffer");

        {
            let store = DiskStore::open(&path, RetentionPolicy::max_entries(10).unwrap()).unwrap();
            store.flush().unwrap();
        }

        let policy = RetentionPolicy::max_age(Duration::from_secs(1)).unwrap();
        let store = DiskStore::open(&path, policy).unwrap();
        let record = store.stored_policy().unwrap().unwrap();
        assert_eq!(record.max_entries, 0);
        assert_eq!(record.max_age_ns, 1_000_000_000);
    }

    #[test]
    fn test_trim_scan_starts_at_oldest_retained() {
        let (store, _temp) = create_test_store(RetentionPolicy::max_entries(3).unwrap());

        for i in 0..500u64 {
            store.insert_at(format!("entry {i}").as_bytes(), 1_000 + i).unwrap();

            let entries = store.entries().unwrap();
            assert_eq!(store.oldest(), Some(entries[0].key()));

            // One trimmed entry plus the first survivor, never the history
            let scanned = store.writer.lock().last_scan;
            assert!(scanned <= 2, "write {i} scanned {scanned} entries");
        }

        assert_eq!(texts(&store), vec!["entry 497", "entry 498", "entry 499"]);
    }

    #[test]
    fn test_oldest_tracks_age_trim() {
        let policy = RetentionPolicy::max_age(Duration::from_nanos(100)).unwrap();
        let (store, _temp) = create_test_store(policy);
        assert_eq!(store.oldest(), None);

        let first = store.insert_at(b"first", 1_000).unwrap();
        let second = store.insert_at(b"second", 1_050).unwrap();
        assert_eq!(store.oldest(), Some(first));

        store.insert_at(b"third", 1_120).unwrap();
        assert_eq!(store.oldest(), Some(second));

        // Everything before is expired; the new entry is the oldest
        let fourth = store.insert_at(b"fourth", 5_000).unwrap();
        assert_eq!(store.oldest(), Some(fourth));
        assert_eq!(store.writer.lock().last_scan, 2);
        assert_eq!(texts(&store), vec!["fourth"]);
    }

    #[test]
    fn test_oldest_resumes_on_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test_buffer");
        let policy = RetentionPolicy::max_entries(2).unwrap();

        let expected = {
            let store = DiskStore::open(&path, policy).unwrap();
            store.insert_at(b"a", 10).unwrap();
            let b = store.insert_at(b"b", 20).unwrap();
            store.insert_at(b"c", 30).unwrap();
            store.flush().unwrap();
            b
        };

        let store = DiskStore::open(&path, policy).unwrap();
        assert_eq!(store.oldest(), Some(expected));
        assert_eq!(texts(&store), vec!["b", "c"]);
    }
}
