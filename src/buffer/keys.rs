/// Key layout and entry types
///
/// Partition structure:
/// - `entries`: {timestamp_ns:be64}{seq:be64} -> raw payload bytes
/// - `policy`: "policy" -> PolicyRecord (JSON)
///
/// Big-endian keys sort bytewise in (timestamp, seq) order, so the entries
/// partition doubles as the timestamp index.
use chrono::{DateTime, Utc};

/// Length of an encoded entry key
pub const ENTRY_KEY_LEN: usize = 16;

/// Key of the singleton policy record
pub const POLICY_KEY: &[u8] = b"policy";

/// Position of an entry: store-assigned timestamp plus insertion sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryKey {
    pub timestamp: u64,
    pub seq: u64,
}

impl EntryKey {
    pub fn new(timestamp: u64, seq: u64) -> Self {
        Self { timestamp, seq }
    }

    pub fn encode(&self) -> [u8; ENTRY_KEY_LEN] {
        let mut key = [0u8; ENTRY_KEY_LEN];
        key[..8].copy_from_slice(&self.timestamp.to_be_bytes());
        key[8..].copy_from_slice(&self.seq.to_be_bytes());
        key
    }

    pub fn decode(key: &[u8]) -> Option<Self> {
        if key.len() != ENTRY_KEY_LEN {
            return None;
        }
        let timestamp = u64::from_be_bytes(key[..8].try_into().ok()?);
        let seq = u64::from_be_bytes(key[8..].try_into().ok()?);
        Some(Self { timestamp, seq })
    }
}

/// A retained log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    key: EntryKey,
    payload: Vec<u8>,
}

impl LogEntry {
    pub fn new(key: EntryKey, payload: Vec<u8>) -> Self {
        Self { key, payload }
    }

    pub fn key(&self) -> EntryKey {
        self.key
    }

    /// Nanoseconds since the Unix epoch
    pub fn timestamp(&self) -> u64 {
        self.key.timestamp
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload decoded as UTF-8 (lossy) with surrounding whitespace trimmed
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.payload).trim().to_string()
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        let nanos = i64::try_from(self.key.timestamp).unwrap_or(i64::MAX);
        DateTime::from_timestamp_nanos(nanos)
    }
}
