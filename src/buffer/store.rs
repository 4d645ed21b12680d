use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::clock::now_nanos;
use super::disk::DiskStore;
use super::error::{BufferError, Result, StoreResult};
use super::keys::{EntryKey, LogEntry};
use super::memory::MemoryStore;
use super::policy::RetentionPolicy;

/// Sentinel selecting the ephemeral in-memory store
pub const MEMORY_LOCATION: &str = ":memory:";

/// Where a store keeps its entries
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    /// Durable fjall keyspace directory
    Path(PathBuf),
    /// Process-local, nothing touches the filesystem
    Memory,
}

impl Location {
    pub fn parse(value: &str) -> Self {
        if value == MEMORY_LOCATION {
            Location::Memory
        } else {
            Location::Path(PathBuf::from(value))
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        matches!(self, Location::Memory)
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Location::Path(path) => Some(path),
            Location::Memory => None,
        }
    }

    /// Physically remove the durable location. A missing directory counts
    /// as removed; the ephemeral location has nothing to remove.
    pub fn remove(&self) -> io::Result<()> {
        match self {
            Location::Path(path) => match std::fs::remove_dir_all(path) {
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
                other => other,
            },
            Location::Memory => Ok(()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Path(path) => write!(f, "{}", path.display()),
            Location::Memory => f.write_str(MEMORY_LOCATION),
        }
    }
}

impl FromStr for Location {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Location::parse(s))
    }
}

impl From<&str> for Location {
    fn from(value: &str) -> Self {
        Location::parse(value)
    }
}

impl From<String> for Location {
    fn from(value: String) -> Self {
        Location::parse(&value)
    }
}

impl From<PathBuf> for Location {
    fn from(value: PathBuf) -> Self {
        Location::Path(value)
    }
}

impl From<&Path> for Location {
    fn from(value: &Path) -> Self {
        Location::Path(value.to_path_buf())
    }
}

/// Storage backend holding entries under a bound retention policy.
///
/// Implementations must be safe for concurrent use: `insert_at` applies the
/// insert and its trim pass as one atomic unit, and `entries` never observes
/// the state in between.
pub trait EntryStore: Send + Sync {
    /// Append `payload` using the wall-clock reading `now` (ns since epoch),
    /// then trim per policy. Returns the key assigned to the new entry.
    fn insert_at(&self, payload: &[u8], now: u64) -> StoreResult<EntryKey>;

    /// All retained entries, oldest first
    fn entries(&self) -> StoreResult<Vec<LogEntry>>;

    /// Number of retained entries
    fn len(&self) -> StoreResult<usize>;

    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Make pending writes durable
    fn flush(&self) -> StoreResult<()>;
}

/// An open store: a backend plus the location and policy it was opened with
pub struct Store {
    location: Location,
    policy: RetentionPolicy,
    backend: Box<dyn EntryStore>,
}

impl Store {
    /// Open (or create) the store at `location` and record `policy` in it
    pub fn open(location: &Location, policy: RetentionPolicy) -> Result<Self> {
        let backend: Box<dyn EntryStore> = match location {
            Location::Path(path) => {
                let store = DiskStore::open(path, policy).map_err(|source| BufferError::Open {
                    location: location.to_string(),
                    source,
                })?;
                Box::new(store)
            }
            Location::Memory => Box::new(MemoryStore::new(policy)),
        };

        Ok(Self {
            location: location.clone(),
            policy,
            backend,
        })
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    pub fn insert(&self, payload: &[u8]) -> Result<EntryKey> {
        Ok(self.backend.insert_at(payload, now_nanos())?)
    }

    pub fn query_all(&self) -> Result<Vec<LogEntry>> {
        Ok(self.backend.entries()?)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.backend.len()?)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.backend.is_empty()?)
    }

    /// Flush and close without touching persisted data
    pub fn release(self) -> Result<()> {
        let flushed = self.backend.flush();
        drop(self.backend);
        Ok(flushed?)
    }

    /// Close and physically remove the durable location.
    ///
    /// Returns the removal outcome; the store is gone either way.
    pub fn destroy(self) -> io::Result<()> {
        let location = self.location;
        drop(self.backend);
        location.remove()
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("location", &self.location)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
