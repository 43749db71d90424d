//! Diagnostic side channel for the parser and solution resolver.
//!
//! Missing files, invalid project directories and swallowed parse failures
//! are reported through a [`DiagnosticSink`] instead of being returned to the
//! caller.  The default sink forwards to the [`log`] facade; any
//! `Fn(Level, &str)` closure can be used instead, which is how the tests
//! capture messages without installing a global logger.

use std::fmt;
use std::sync::Arc;

pub use log::Level;

/// `log` target used by [`LogSink`].
pub const LOG_TARGET: &str = "unity_csproj";

/// Receiver for diagnostic messages.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, level: Level, message: &str);
}

impl<F> DiagnosticSink for F
where
    F: Fn(Level, &str) + Send + Sync,
{
    fn emit(&self, level: Level, message: &str) {
        self(level, message)
    }
}

/// Forwards every diagnostic to the `log` crate under [`LOG_TARGET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, level: Level, message: &str) {
        log::log!(target: LOG_TARGET, level, "{message}");
    }
}

/// Shared handle to a sink, cheap to clone into parsers and resolvers.
#[derive(Clone)]
pub struct Diagnostics(Arc<dyn DiagnosticSink>);

impl Diagnostics {
    pub fn new(sink: impl DiagnosticSink + 'static) -> Self {
        Self(Arc::new(sink))
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.0.emit(Level::Warn, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.0.emit(Level::Error, message.as_ref());
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(LogSink)
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Diagnostics(..)")
    }
}
