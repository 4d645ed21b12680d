//! Tee subscriber demo: every event lands in the buffer, only events at or
//! above the configured level are echoed to stdout.

use std::sync::Arc;

use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;

use logbuf::buffer::{LogBuffer, Result};
use logbuf::observability::BufferSink;

/// Only events from this module are captured or echoed, so the buffer's own
/// lifecycle events neither write back into it nor clutter the output.
const DEMO_TARGET: &str = "logbuf::demo";

/// Emit a handful of mixed-level events through the tee subscriber and
/// return what the buffer retained. The buffer is cleared afterwards unless
/// `keep` is set.
pub fn run(buffer: Arc<LogBuffer>, stdout_level: Level, keep: bool) -> Result<Vec<String>> {
    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(stdout_filter(stdout_level));

    let buffer_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(BufferSink::new(Arc::clone(&buffer)))
        .with_filter(Targets::new().with_target(DEMO_TARGET, LevelFilter::TRACE));

    let subscriber = tracing_subscriber::registry()
        .with(stdout_layer)
        .with(buffer_layer);

    tracing::subscriber::with_default(subscriber, || {
        emit_events();

        let entries = buffer.dump()?;
        if !keep {
            buffer.clear()?;
        }
        Ok(entries)
    })
}

fn stdout_filter(level: Level) -> Targets {
    Targets::new().with_target(DEMO_TARGET, LevelFilter::from_level(level))
}

fn emit_events() {
    tracing::debug!(target: DEMO_TARGET, "hidden from stdout, kept in buffer");
    tracing::info!(target: DEMO_TARGET, user = "alice", "user logged in");
    tracing::debug!(target: DEMO_TARGET, method = "GET", path = "/status", "request received");
    tracing::warn!(target: DEMO_TARGET, free_mb = 512, "disk space low");
    tracing::debug!(target: DEMO_TARGET, status = 200, elapsed_ms = 3, "request executed");
    tracing::error!(target: DEMO_TARGET, id = 42, "failed to send email");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use logbuf::buffer::Location;

    fn buffer(max_entries: u64) -> Arc<LogBuffer> {
        Arc::new(LogBuffer::new(max_entries, Duration::ZERO, Location::Memory).unwrap())
    }

    #[test]
    fn test_demo_captures_every_level() {
        let buffer = buffer(100);
        let entries = run(Arc::clone(&buffer), Level::WARN, true).unwrap();

        assert_eq!(entries.len(), 6);
        assert!(entries[0].contains("DEBUG"));
        assert!(entries[1].contains("user logged in"));
        assert!(entries[1].contains("user=\"alice\""));
        assert!(entries[5].contains("ERROR"));
        assert!(entries[5].contains("id=42"));

        assert_eq!(buffer.dump().unwrap(), entries);
    }

    #[test]
    fn test_demo_respects_retention() {
        let buffer = buffer(2);
        let entries = run(buffer, Level::INFO, true).unwrap();

        assert_eq!(entries.len(), 2);
        assert!(entries[0].contains("request executed"));
        assert!(entries[1].contains("failed to send email"));
    }

    #[test]
    fn test_stdout_filter_only_echoes_demo_events() {
        let filter = stdout_filter(Level::INFO);

        assert!(filter.would_enable(DEMO_TARGET, &Level::WARN));
        assert!(filter.would_enable(DEMO_TARGET, &Level::INFO));
        assert!(!filter.would_enable(DEMO_TARGET, &Level::DEBUG));
        assert!(!filter.would_enable("logbuf::buffer::handle", &Level::INFO));
    }

    #[test]
    fn test_demo_clears_unless_kept() {
        let buffer = buffer(100);
        let entries = run(Arc::clone(&buffer), Level::INFO, false).unwrap();

        assert_eq!(entries.len(), 6);
        assert!(!buffer.is_open());
        assert!(buffer.dump().unwrap().is_empty());
    }
}
