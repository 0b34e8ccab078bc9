//! The operator-facing log sink.

use std::sync::Arc;

use tracing::Level;

/// Destination for the dispatcher's outcome reports.
///
/// Submission failures never reach the producer; this sink is where they become visible. Each
/// event carries a severity, a message and an optional detail such as the remote error text.
pub trait Log: Send + Sync {
    fn log(&self, level: Level, message: &str, detail: Option<&str>);

    fn debug(&self, message: &str) {
        self.log(Level::DEBUG, message, None)
    }

    fn info(&self, message: &str) {
        self.log(Level::INFO, message, None)
    }

    fn warn(&self, message: &str, detail: Option<&str>) {
        self.log(Level::WARN, message, detail)
    }

    fn error(&self, message: &str, detail: Option<&str>) {
        self.log(Level::ERROR, message, detail)
    }
}

impl<T: Log + ?Sized> Log for Arc<T> {
    fn log(&self, level: Level, message: &str, detail: Option<&str>) {
        (**self).log(level, message, detail)
    }
}

/// Forwards every event to the `tracing` macro of the same level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl Log for TracingLog {
    fn log(&self, level: Level, message: &str, detail: Option<&str>) {
        if level == Level::ERROR {
            tracing::error!(detail, "{}", message)
        } else if level == Level::WARN {
            tracing::warn!(detail, "{}", message)
        } else if level == Level::INFO {
            tracing::info!(detail, "{}", message)
        } else if level == Level::DEBUG {
            tracing::debug!(detail, "{}", message)
        } else {
            tracing::trace!(detail, "{}", message)
        }
    }
}
