//! Diagnostic output as an explicit per-component dependency, treated the
//! same way a functional-options API treats any other setting rather than
//! reaching for a process-global logger inside the engine. Defaults to a
//! no-op sink; callers that want
//! the ambient `log` facade opt in with [`LogCrateSink`].

use std::sync::Arc;

/// A sink a [`crate::compiler::Compiler`] or [`crate::artifact::ExecutableArtifact`]
/// writes diagnostic lines to.
pub trait DiagnosticSink: Send + Sync {
  fn log(&self, level: log::Level, message: &str);
}

/// Discards everything. The default when nothing else is configured.
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
  fn log(&self, _level: log::Level, _message: &str) {}
}

/// Bridges to the ambient `log` facade (and whatever subscriber the host
/// process installed, e.g. `env_logger` via [`crate::init_logger`]).
pub struct LogCrateSink {
  target: &'static str,
}

impl LogCrateSink {
  #[must_use]
  pub fn new(target: &'static str) -> Self {
    Self { target }
  }
}

impl DiagnosticSink for LogCrateSink {
  fn log(&self, level: log::Level, message: &str) {
    log::log!(target: self.target, level, "{}", message);
  }
}

/// Either a structured [`DiagnosticSink`] or a bare handler closure;
/// setting one clears the other.
#[derive(Clone)]
pub enum Diagnostics {
  Sink(Arc<dyn DiagnosticSink>),
  Handler(Arc<dyn Fn(log::Level, &str) + Send + Sync>),
}

impl Diagnostics {
  pub fn emit(&self, level: log::Level, message: &str) {
    match self {
      Diagnostics::Sink(sink) => sink.log(level, message),
      Diagnostics::Handler(handler) => handler(level, message),
    }
  }
}

impl Default for Diagnostics {
  fn default() -> Self {
    Diagnostics::Sink(Arc::new(NoopSink))
  }
}
