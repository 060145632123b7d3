//! Caller-visible event reporting.
//!
//! Operations report noteworthy conditions (device error codes, flash
//! progress, configuration version warnings) through an [`EventSink`]. The
//! default sink forwards to `tracing`; front ends replace it to print or
//! forward messages elsewhere.

use std::fmt;
use std::sync::Arc;

/// Message priority, ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Error => "error",
            Priority::Warning => "warning",
            Priority::Notice => "notice",
            Priority::Info => "info",
            Priority::Debug => "debug",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receiver for progress and log messages.
pub trait EventSink: Send + Sync {
    fn log(&self, priority: Priority, message: &str);
}

/// Forwards events to `tracing` at the matching level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn log(&self, priority: Priority, message: &str) {
        match priority {
            Priority::Error => tracing::error!("{}", message),
            Priority::Warning => tracing::warn!("{}", message),
            Priority::Notice | Priority::Info => tracing::info!("{}", message),
            Priority::Debug => tracing::debug!("{}", message),
        }
    }
}

/// Shared handle to the default sink.
pub fn default_sink() -> Arc<dyn EventSink> {
    Arc::new(TracingSink)
}

/// Event recording for tests of this crate and its dependents.
#[doc(hidden)]
pub mod testing {
    use super::*;
    use std::sync::{Mutex, MutexGuard};

    /// Sink that records every event, for assertions.
    #[derive(Default)]
    pub struct RecordingSink {
        events: Mutex<Vec<(Priority, String)>>,
    }

    impl RecordingSink {
        pub fn shared() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn events(&self) -> MutexGuard<'_, Vec<(Priority, String)>> {
            self.events.lock().unwrap_or_else(|e| e.into_inner())
        }

        pub fn messages(&self, priority: Priority) -> Vec<String> {
            self.events()
                .iter()
                .filter(|(p, _)| *p == priority)
                .map(|(_, m)| m.clone())
                .collect()
        }
    }

    impl EventSink for RecordingSink {
        fn log(&self, priority: Priority, message: &str) {
            self.events().push((priority, message.to_string()));
        }
    }
}
