use std::sync::atomic::{AtomicBool, Ordering};

use core::{Diagnostics, ExecutableArtifact, HostFunction, InstanceConfig};
use shared_types::EvalError;
use wasmtime::{Engine, Module};

use crate::instance::WasmInstance;

/// The WebAssembly backend's Executable Artifact (C5): a compiled module
/// bound to the entry point and options it was compiled with. Owns the
/// Fresh/Open/Closed lifecycle; `close` just flips a flag since wasmtime
/// releases engine resources when `Module`/`Engine` are dropped.
pub struct WasmArtifact {
  pub(crate) engine: Engine,
  pub(crate) module: Module,
  bytes: Vec<u8>,
  entry_point: String,
  pub(crate) wasi_enabled: bool,
  pub(crate) host_functions: Vec<HostFunction>,
  diagnostics: Diagnostics,
  closed: AtomicBool,
}

impl WasmArtifact {
  #[must_use]
  pub fn new(
    engine: Engine,
    module: Module,
    bytes: Vec<u8>,
    entry_point: String,
    wasi_enabled: bool,
    host_functions: Vec<HostFunction>,
    diagnostics: Diagnostics,
  ) -> Self {
    Self {
      engine,
      module,
      bytes,
      entry_point,
      wasi_enabled,
      host_functions,
      diagnostics,
      closed: AtomicBool::new(false),
    }
  }
}

impl ExecutableArtifact for WasmArtifact {
  type Instance = WasmInstance;

  fn entry_point(&self) -> &str {
    &self.entry_point
  }

  fn bytes(&self) -> &[u8] {
    &self.bytes
  }

  fn is_closed(&self) -> bool {
    self.closed.load(Ordering::SeqCst)
  }

  fn close(&self) -> Result<(), EvalError> {
    self.closed.store(true, Ordering::SeqCst);
    Ok(())
  }

  fn diagnostics(&self) -> Diagnostics {
    self.diagnostics.clone()
  }

  fn instance(
    &self,
    ctx: &core::EvalContext,
    config: &InstanceConfig,
  ) -> Result<Self::Instance, EvalError> {
    if self.is_closed() {
      return Err(EvalError::ExecutableClosed);
    }
    WasmInstance::new(self, ctx, config)
  }
}
