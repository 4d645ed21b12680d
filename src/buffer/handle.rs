use std::io;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::BufferConfig;
use crate::observability::BufferMetrics;

use super::error::Result;
use super::keys::LogEntry;
use super::policy::RetentionPolicy;
use super::store::{Location, Store};

/// Retention-bounded log buffer
///
/// Owns at most one open [`Store`]. The lock guards only the slot holding
/// it: `write` and `dump` share it for the duration of their store call,
/// while `close`, `clear` and lazy (re)opening take it exclusively. After
/// `close` or `clear` the next `write` or `dump` reopens the store at the
/// same location with the same policy.
///
/// Tracing events are emitted only while the lock is not held, so the
/// buffer can itself be the sink of a tracing subscriber.
#[derive(Debug)]
pub struct LogBuffer {
    policy: RetentionPolicy,
    location: Location,
    store: RwLock<Option<Store>>,
    metrics: BufferMetrics,
}

impl LogBuffer {
    /// Create a buffer keeping at most `max_entries` entries and/or entries
    /// no older than `max_age`. Zero disables a limit; at least one must be
    /// set. The store is opened right away.
    pub fn new(
        max_entries: u64,
        max_age: Duration,
        location: impl Into<Location>,
    ) -> Result<Self> {
        let policy = RetentionPolicy::new(max_entries, max_age)?;
        Self::with_policy(policy, location)
    }

    pub fn with_policy(policy: RetentionPolicy, location: impl Into<Location>) -> Result<Self> {
        let buffer = Self {
            policy,
            location: location.into(),
            store: RwLock::new(None),
            metrics: BufferMetrics::new(),
        };
        buffer.ensure_open()?;
        Ok(buffer)
    }

    pub fn from_config(config: &BufferConfig) -> Result<Self> {
        Self::new(
            config.max_entries,
            config.max_age.as_duration(),
            Location::parse(&config.path),
        )
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn metrics(&self) -> &BufferMetrics {
        &self.metrics
    }

    pub fn is_open(&self) -> bool {
        self.store.read_recursive().is_some()
    }

    /// Append `payload` as one entry. Returns the number of bytes written.
    pub fn write(&self, payload: &[u8]) -> Result<usize> {
        let result = self.with_store(|store| store.insert(payload));
        match result {
            Ok(_) => {
                self.metrics.entry_written();
                Ok(payload.len())
            }
            Err(err) => {
                self.metrics.write_failed();
                Err(err)
            }
        }
    }

    pub fn write_str(&self, entry: &str) -> Result<()> {
        self.write(entry.as_bytes()).map(|_| ())
    }

    /// Retained entries oldest-first, as whitespace-trimmed text
    pub fn dump(&self) -> Result<Vec<String>> {
        let entries = self.entries()?;
        Ok(entries.iter().map(LogEntry::text).collect())
    }

    /// Retained entries oldest-first, with their timestamps and raw payloads
    pub fn entries(&self) -> Result<Vec<LogEntry>> {
        self.with_store(Store::query_all)
    }

    /// Release the store without deleting persisted entries. Never fails.
    pub fn close(&self) {
        let released = {
            let mut slot = self.store.write();
            slot.take().map(Store::release)
        };

        if let Some(result) = released {
            self.log_release(result);
        }
    }

    fn log_release(&self, result: Result<()>) {
        match result {
            Ok(()) => debug!(location = %self.location, "Log buffer store closed"),
            Err(err) => {
                warn!(location = %self.location, error = %err, "Failed to flush log buffer store on close")
            }
        }
    }

    /// Drop every entry and remove the durable location. The buffer stays
    /// usable; the next operation recreates an empty store.
    ///
    /// Failure to remove the location is logged and counted but not
    /// returned: the buffer is logically empty either way.
    pub fn clear(&self) -> Result<()> {
        let removal = {
            let mut slot = self.store.write();
            match slot.take() {
                Some(store) => store.destroy(),
                None => self.location.remove(),
            }
        };

        self.metrics.cleared();
        match removal {
            Ok(()) => info!(location = %self.location, "Log buffer cleared"),
            Err(err) => {
                self.metrics.removal_failed();
                warn!(
                    location = %self.location,
                    error = %err,
                    "Log buffer cleared but its location could not be removed"
                );
            }
        }

        Ok(())
    }

    /// Run `op` against the open store, opening one first if needed.
    ///
    /// The shared lock is held for the whole call so `close`/`clear` cannot
    /// pull the store out from under it. It is taken recursively: a tracing
    /// sink may re-enter from inside a store call while a writer is queued.
    /// If the slot is empty the shared lock is dropped before escalating,
    /// then the shared path is retried.
    fn with_store<T>(&self, mut op: impl FnMut(&Store) -> Result<T>) -> Result<T> {
        loop {
            {
                let slot = self.store.read_recursive();
                if let Some(store) = slot.as_ref() {
                    return op(store);
                }
            }

            self.ensure_open()?;
        }
    }

    /// Open the store unless another caller already has
    fn ensure_open(&self) -> Result<()> {
        let opened = {
            let mut slot = self.store.write();
            if slot.is_some() {
                return Ok(());
            }
            let store = Store::open(&self.location, self.policy)?;
            let retained = store.len()?;
            *slot = Some(store);
            retained
        };

        self.metrics.store_opened();
        info!(
            location = %self.location,
            retained = opened,
            max_entries = self.policy.entry_limit(),
            max_age_ms = self.policy.max_age_millis(),
            "Log buffer store opened"
        );
        Ok(())
    }
}

impl Drop for LogBuffer {
    fn drop(&mut self) {
        if let Some(store) = self.store.get_mut().take() {
            self.log_release(store.release());
        }
    }
}

impl io::Write for &LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        LogBuffer::write(*self, buf).map_err(io::Error::other)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
