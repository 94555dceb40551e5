//! Compiler (C6): turns a [`SourceLoader`]'s bytes into an
//! [`crate::artifact::ExecutableArtifact`]. `CompilerOptions` is built
//! through a validating-mutator builder, the same functional-options
//! shape used elsewhere in this codebase for Provider construction,
//! generalised to be engine-agnostic via the `R` (runtime-config) type
//! parameter so a non-WASM backend never needs to downcast an opaque handle.

use std::sync::Arc;

use shared_types::{EvalError, Value};

use crate::context::EvalContext;
use crate::diagnostics::Diagnostics;
use crate::loader::SourceLoader;

/// An additional host import exposed to the guest beyond whatever the
/// backend wires in unconditionally (e.g. WASI). May be empty.
#[derive(Clone)]
pub struct HostFunction {
  pub module: String,
  pub name: String,
  pub func: Arc<dyn Fn(Vec<Value>) -> Result<Value, EvalError> + Send + Sync>,
}

impl HostFunction {
  pub fn new(
    module: impl Into<String>,
    name: impl Into<String>,
    func: impl Fn(Vec<Value>) -> Result<Value, EvalError> + Send + Sync + 'static,
  ) -> Self {
    Self {
      module: module.into(),
      name: name.into(),
      func: Arc::new(func),
    }
  }
}

/// Resolved options a `Compile` call is run with. `R` is the backend's own
/// engine-tuning handle type (e.g. `wasmtime::Config`); every backend fixes
/// it via [`Compiler::RuntimeConfig`].
pub struct CompilerOptions<R> {
  pub entry_point: String,
  pub diagnostics: Diagnostics,
  pub wasi_enabled: bool,
  pub runtime_config: R,
  pub host_functions: Vec<HostFunction>,
  pub context: EvalContext,
}

/// Builds a [`CompilerOptions`] value, applying each option as a validating
/// mutator: defaults are re-applied to unset fields, then a validate pass
/// runs.
pub struct CompilerOptionsBuilder<R> {
  entry_point: String,
  diagnostics: Diagnostics,
  wasi_enabled: bool,
  runtime_config: Option<R>,
  host_functions: Vec<HostFunction>,
  context: EvalContext,
}

impl<R> Default for CompilerOptionsBuilder<R> {
  fn default() -> Self {
    Self {
      entry_point: "main".to_string(),
      diagnostics: Diagnostics::default(),
      wasi_enabled: true,
      runtime_config: None,
      host_functions: Vec::new(),
      context: EvalContext::new(),
    }
  }
}

impl<R> CompilerOptionsBuilder<R> {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  pub fn entry_point(mut self, name: impl Into<String>) -> Result<Self, EvalError> {
    let name = name.into();
    if name.is_empty() {
      return Err(EvalError::ValidationFailed(
        "entry point must not be empty".to_string(),
      ));
    }
    self.entry_point = name;
    Ok(self)
  }

  #[must_use]
  pub fn logger(mut self, sink: Arc<dyn crate::diagnostics::DiagnosticSink>) -> Self {
    self.diagnostics = Diagnostics::Sink(sink);
    self
  }

  #[must_use]
  pub fn log_handler(
    mut self,
    handler: Arc<dyn Fn(log::Level, &str) + Send + Sync>,
  ) -> Self {
    self.diagnostics = Diagnostics::Handler(handler);
    self
  }

  #[must_use]
  pub fn wasi_enabled(mut self, enabled: bool) -> Self {
    self.wasi_enabled = enabled;
    self
  }

  #[must_use]
  pub fn runtime_config(mut self, config: R) -> Self {
    self.runtime_config = Some(config);
    self
  }

  #[must_use]
  pub fn host_function(mut self, host_function: HostFunction) -> Self {
    self.host_functions.push(host_function);
    self
  }

  #[must_use]
  pub fn context(mut self, context: EvalContext) -> Self {
    self.context = context;
    self
  }

  /// Applies remaining defaults and validates. `runtime_config` must have
  /// been set; everything else has a sound default.
  pub fn build(self) -> Result<CompilerOptions<R>, EvalError> {
    let runtime_config = self.runtime_config.ok_or_else(|| {
      EvalError::ValidationFailed("runtime config must not be absent".to_string())
    })?;

    if self.entry_point.is_empty() {
      return Err(EvalError::ValidationFailed(
        "entry point must not be empty".to_string(),
      ));
    }

    Ok(CompilerOptions {
      entry_point: self.entry_point,
      diagnostics: self.diagnostics,
      wasi_enabled: self.wasi_enabled,
      runtime_config,
      host_functions: self.host_functions,
      context: self.context,
    })
  }
}

/// Turns a [`SourceLoader`]'s bytes into a ready-to-instantiate
/// [`crate::artifact::ExecutableArtifact`]. Implementations must be free of
/// concurrent-mutation hazards once constructed: `compile` may be called
/// concurrently from multiple threads.
pub trait Compiler: Send + Sync {
  type Artifact: crate::artifact::ExecutableArtifact;
  type RuntimeConfig;

  /// Filename expected under a plugin's install directory. A method
  /// rather than an associated const, since associated consts on
  /// object-unfriendly traits are awkward to reference generically.
  fn main_file(&self) -> &'static str;

  /// A sound default engine-tuning handle, used when a caller does not
  /// need to customise it.
  fn default_runtime_config(&self) -> Self::RuntimeConfig;

  fn compile(
    &self,
    loader: &dyn SourceLoader,
    options: CompilerOptions<Self::RuntimeConfig>,
  ) -> Result<Self::Artifact, EvalError>;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builder_rejects_empty_entry_point() {
    let result = CompilerOptionsBuilder::<()>::new().entry_point("");
    assert!(result.is_err());
  }

  #[test]
  fn build_requires_runtime_config() {
    let result = CompilerOptionsBuilder::<()>::new().build();
    assert!(result.is_err());
  }

  #[test]
  fn build_succeeds_with_defaults_once_runtime_config_is_set() {
    let options = CompilerOptionsBuilder::<()>::new()
      .runtime_config(())
      .build()
      .unwrap();
    assert_eq!(options.entry_point, "main");
    assert!(options.wasi_enabled);
    assert!(options.host_functions.is_empty());
  }

  #[test]
  fn logger_and_log_handler_are_mutually_exclusive() {
    let options = CompilerOptionsBuilder::<()>::new()
      .runtime_config(())
      .log_handler(Arc::new(|_level, _msg| {}))
      .logger(Arc::new(crate::diagnostics::NoopSink))
      .build()
      .unwrap();
    assert!(matches!(options.diagnostics, Diagnostics::Sink(_)));
  }
}
