//! Buffer counters and tracing integration

use std::cell::Cell;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing_subscriber::fmt::MakeWriter;

use crate::buffer::LogBuffer;

/// Counters for buffer activity
///
/// Counters are bumped silently: the write path may be running inside a
/// tracing sink, so no events are emitted from here.
#[derive(Debug, Default)]
pub struct BufferMetrics {
    entries_written: AtomicU64,
    write_failures: AtomicU64,
    store_opens: AtomicU64,
    clears: AtomicU64,
    removal_failures: AtomicU64,
}

impl BufferMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry_written(&self) {
        self.entries_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn write_failed(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn store_opened(&self) {
        self.store_opens.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cleared(&self) {
        self.clears.fetch_add(1, Ordering::Relaxed);
    }

    pub fn removal_failed(&self) {
        self.removal_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            entries_written: self.entries_written.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            store_opens: self.store_opens.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
            removal_failures: self.removal_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub entries_written: u64,
    pub write_failures: u64,
    pub store_opens: u64,
    pub clears: u64,
    pub removal_failures: u64,
}

thread_local! {
    static IN_BUFFER_WRITE: Cell<bool> = const { Cell::new(false) };
}

/// `MakeWriter` that stores every formatted tracing event as one buffer entry
///
/// Events raised while an entry is being written on the same thread (for
/// example by the storage engine) are dropped rather than re-entering the
/// buffer.
#[derive(Clone, Debug)]
pub struct BufferSink {
    buffer: Arc<LogBuffer>,
}

impl BufferSink {
    pub fn new(buffer: Arc<LogBuffer>) -> Self {
        Self { buffer }
    }

    pub fn buffer(&self) -> &Arc<LogBuffer> {
        &self.buffer
    }
}

impl<'a> MakeWriter<'a> for BufferSink {
    type Writer = SinkWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        SinkWriter {
            buffer: &self.buffer,
        }
    }
}

/// Writer for a single event
pub struct SinkWriter<'a> {
    buffer: &'a LogBuffer,
}

impl io::Write for SinkWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        IN_BUFFER_WRITE.with(|active| {
            if active.replace(true) {
                return Ok(buf.len());
            }
            let result = self.buffer.write(buf).map_err(io::Error::other);
            active.set(false);
            result
        })
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
