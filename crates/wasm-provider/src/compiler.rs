use std::io::Read as _;

use core::{Compiler, CompilerOptions, SourceLoader};
use shared_types::EvalError;
use wasmtime::{Config, Engine, Module};

use crate::artifact::WasmArtifact;
use crate::instance::instantiate;

/// The WebAssembly backend's `Compiler` (C6): turns a guest module's bytes
/// into a [`WasmArtifact`]. Each compiled artifact owns its own
/// `wasmtime::Engine`, built from the per-compile `RuntimeConfig` -- a
/// deliberate departure from the usual wasmtime recipe of sharing one
/// process-wide `Engine`, made so `CompilerOptions::runtime_config` is a
/// real per-compile knob rather than an ignored field.
#[derive(Debug, Default)]
pub struct WasmCompiler;

impl WasmCompiler {
  #[must_use]
  pub fn new() -> Self {
    Self
  }
}

impl Compiler for WasmCompiler {
  type Artifact = WasmArtifact;
  type RuntimeConfig = Config;

  fn main_file(&self) -> &'static str {
    "main.wasm"
  }

  fn default_runtime_config(&self) -> Config {
    let mut config = Config::new();
    config.epoch_interruption(true);
    config
  }

  fn compile(
    &self,
    loader: &dyn SourceLoader,
    options: CompilerOptions<Config>,
  ) -> Result<WasmArtifact, EvalError> {
    let mut reader = loader
      .get_reader()
      .map_err(|e| EvalError::ValidationFailed(e.to_string()))?;
    let mut bytes = Vec::new();
    reader
      .read_to_end(&mut bytes)
      .map_err(|e| EvalError::ValidationFailed(e.to_string()))?;

    if bytes.is_empty() {
      return Err(EvalError::ContentNil);
    }

    let engine = Engine::new(&options.runtime_config).map_err(|_| EvalError::ExecCreationFailed)?;
    let module =
      Module::new(&engine, &bytes).map_err(|e| EvalError::ValidationFailed(e.to_string()))?;

    // Probe for the entry point with a throw-away instance; both store and
    // instance are released the moment this block ends, win or lose.
    {
      let (mut probe_store, probe_instance) =
        instantiate(&engine, &module, options.wasi_enabled, &options.host_functions)?;
      if probe_instance
        .get_func(&mut probe_store, &options.entry_point)
        .is_none()
      {
        return Err(EvalError::ValidationFailed(format!(
          "entry point '{}' not found",
          options.entry_point
        )));
      }
    }

    Ok(WasmArtifact::new(
      engine,
      module,
      bytes,
      options.entry_point,
      options.wasi_enabled,
      options.host_functions,
      options.diagnostics,
    ))
  }
}
