/// Retention-bounded persistent buffer for raw log lines
///
/// Every written entry is persisted, and every insert trims the stored set
/// back within the buffer's retention policy:
///
/// - `max_entries > 0`: only the newest `max_entries` entries are kept
/// - `max_age > 0`: entries older than `max_age` relative to the newest
///   entry are dropped the moment a new entry is written
///
/// Either limit can be disabled with zero, but not both.
///
/// ## Architecture
///
/// [`LogBuffer`] is the public handle. It lazily owns a [`Store`], which
/// pairs a [`Location`] with a backend:
///
/// - [`DiskStore`]: a fjall keyspace directory that survives restarts
/// - [`MemoryStore`]: selected by the `:memory:` location, never touches disk
///
/// Insert and trim are one atomic unit in both backends; concurrent readers
/// see either the state before an insert or the fully trimmed state after it.
///
/// ## Usage
///
/// ```rust,ignore
/// use std::time::Duration;
/// use logbuf::buffer::{LogBuffer, Location};
///
/// let buffer = LogBuffer::new(10, Duration::ZERO, Location::Memory)?;
/// buffer.write_str("first entry")?;
/// buffer.write_str("second entry")?;
/// assert_eq!(buffer.dump()?, vec!["first entry", "second entry"]);
/// ```

pub mod clock;
pub mod disk;
pub mod error;
pub mod handle;
pub mod keys;
pub mod memory;
pub mod policy;
pub mod store;

pub use disk::DiskStore;
pub use error::{BufferError, Result, StoreError};
pub use handle::LogBuffer;
pub use keys::{EntryKey, LogEntry};
pub use memory::MemoryStore;
pub use policy::RetentionPolicy;
pub use store::{EntryStore, Location, MEMORY_LOCATION, Store};
