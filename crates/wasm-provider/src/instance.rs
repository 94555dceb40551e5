use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use core::{EvalContext, GuestInstance, HostFunction, InstanceConfig};
use shared_types::EvalError;
use wasmtime::{Engine, Instance as WtInstance, Linker, Module, Store, UpdateDeadline};

use crate::abi;
use crate::artifact::WasmArtifact;
use crate::host::register_host_function;
use crate::state::StoreState;

/// Builds a fresh `Store`/`Instance` pair wired with WASI (if enabled) and
/// `host_functions`. Shared by [`WasmInstance::new`] (a real per-evaluation
/// instance) and the compiler's throw-away entry-point probe, so the two
/// never drift on how a guest module is instantiated.
pub(crate) fn instantiate(
  engine: &Engine,
  module: &Module,
  wasi_enabled: bool,
  host_functions: &[HostFunction],
) -> Result<(Store<StoreState>, WtInstance), EvalError> {
  let state = StoreState::new(wasi_enabled);
  let mut store = Store::new(engine, state);

  let mut linker: Linker<StoreState> = Linker::new(engine);

  if wasi_enabled {
    wasmtime_wasi::preview1::add_to_linker_sync(&mut linker, |state: &mut StoreState| {
      state
        .wasi
        .as_mut()
        .expect("wasi context present when wasi_enabled is set")
    })
    .map_err(|e| EvalError::InstanceCreationFailed(e.to_string()))?;
  }

  for host_fn in host_functions {
    register_host_function(&mut linker, host_fn.clone())
      .map_err(|e| EvalError::InstanceCreationFailed(e.to_string()))?;
  }

  let instance = linker
    .instantiate(&mut store, module)
    .map_err(|e| EvalError::InstanceCreationFailed(e.to_string()))?;

  Ok((store, instance))
}

/// How often the cancellation ticker polls the evaluation context.
const TICK_INTERVAL: Duration = Duration::from_millis(10);

/// A live guest instance. Cancellation is implemented with wasmtime's
/// epoch-interruption mechanism, but `Engine::increment_epoch()` advances a
/// counter shared by every `Store` built from this instance's `Engine`
/// (all of them, across every concurrently-running `WasmInstance` cloned
/// from the same [`WasmArtifact`]) -- it is not scoped to one call. So the
/// ticker thread spawned per call just advances that shared clock
/// unconditionally; whether reaching the deadline actually traps *this*
/// store is decided independently by an epoch-deadline callback registered
/// per call in [`call_with_context`](GuestInstance::call_with_context),
/// which re-checks this call's own `EvalContext` and only lets the trap
/// through when that context -- not some unrelated concurrent one -- has
/// been cancelled. A normal, uncancelled call keeps extending its own
/// deadline indefinitely, so ticks caused by other concurrent calls never
/// trap it.
///
/// Releases its wasmtime `Store`/`Instance` (and stops its ticker thread,
/// if one is still running) on drop, the same RAII pattern `lucet-runtime`'s
/// `InstanceHandle` uses for guest instance lifetimes.
pub struct WasmInstance {
  store: Store<StoreState>,
  instance: WtInstance,
  engine: Engine,
  finished: Arc<AtomicBool>,
}

impl WasmInstance {
  pub(crate) fn new(
    artifact: &WasmArtifact,
    _ctx: &EvalContext,
    _config: &InstanceConfig,
  ) -> Result<Self, EvalError> {
    let (mut store, instance) = instantiate(
      &artifact.engine,
      &artifact.module,
      artifact.wasi_enabled,
      &artifact.host_functions,
    )?;
    store.set_epoch_deadline(1);

    Ok(Self {
      store,
      instance,
      engine: artifact.engine.clone(),
      finished: Arc::new(AtomicBool::new(false)),
    })
  }

  /// Advances this artifact's shared engine epoch once per tick for as
  /// long as this call is in flight. Ticking is harmless by itself -- it
  /// only reaches a `Store`'s deadline, and whether that deadline actually
  /// traps is decided per-store by the epoch-deadline callback registered
  /// in `call_with_context`, never by this thread.
  fn spawn_ticker(&self) -> JoinHandle<()> {
    let engine = self.engine.clone();
    let finished = Arc::clone(&self.finished);
    thread::spawn(move || {
      loop {
        if finished.load(Ordering::SeqCst) {
          return;
        }
        thread::sleep(TICK_INTERVAL);
        engine.increment_epoch();
      }
    })
  }
}

impl GuestInstance for WasmInstance {
  fn function_exists(&mut self, name: &str) -> bool {
    self.instance.get_func(&mut self.store, name).is_some()
  }

  fn call_with_context(
    &mut self,
    ctx: &EvalContext,
    name: &str,
    input: &[u8],
  ) -> Result<(u32, Vec<u8>), EvalError> {
    let memory = self
      .instance
      .get_memory(&mut self.store, abi::MEMORY_EXPORT)
      .ok_or_else(|| EvalError::InstanceCreationFailed("guest exports no memory".to_string()))?;

    let input_ptr = if input.is_empty() {
      0
    } else {
      let alloc = self
        .instance
        .get_typed_func::<i32, i32>(&mut self.store, abi::ALLOC_EXPORT)
        .map_err(|e| EvalError::InstanceCreationFailed(e.to_string()))?;
      let ptr = alloc
        .call(&mut self.store, input.len() as i32)
        .map_err(|e| EvalError::ExecutionFailed(e.to_string()))?;
      abi::write_bytes(&mut self.store, &memory, ptr, input)
        .map_err(|e| EvalError::ExecutionFailed(e.to_string()))?;
      ptr
    };

    let entry = self
      .instance
      .get_typed_func::<(i32, i32), i64>(&mut self.store, name)
      .map_err(|_| {
        EvalError::InstanceCreationFailed(format!("entry point '{name}' not found"))
      })?;

    // The shared engine's epoch advances for every concurrent call against
    // this artifact, not just this one. This callback is what makes that
    // safe: it fires whenever the ticker has pushed the epoch past our
    // deadline, but only lets the trap through when *this* call's own
    // context is cancelled, re-arming the deadline for one more tick
    // otherwise. Without it, one cancelled call would trip every other
    // concurrently-running, uncancelled instance sharing the same engine.
    let cancel_ctx = ctx.clone();
    self.store.epoch_deadline_callback(move |_store| {
      if cancel_ctx.is_cancelled() {
        Err(wasmtime::Error::msg("execution cancelled"))
      } else {
        Ok(UpdateDeadline::Continue(1))
      }
    });

    let ticker = self.spawn_ticker();
    let call_result = entry.call(&mut self.store, (input_ptr, input.len() as i32));
    self.finished.store(true, Ordering::SeqCst);
    let _ = ticker.join();

    let packed = call_result.map_err(|e| EvalError::ExecutionFailed(e.to_string()))?;
    let exit_code = abi::exit_code_from_packed(packed);

    if exit_code != 0 {
      return Ok((exit_code, Vec::new()));
    }

    let output_ptr_fn = self
      .instance
      .get_typed_func::<(), i32>(&mut self.store, abi::OUTPUT_PTR_EXPORT)
      .map_err(|e| EvalError::InstanceCreationFailed(e.to_string()))?;
    let output_len_fn = self
      .instance
      .get_typed_func::<(), i32>(&mut self.store, abi::OUTPUT_LEN_EXPORT)
      .map_err(|e| EvalError::InstanceCreationFailed(e.to_string()))?;

    let out_ptr = output_ptr_fn
      .call(&mut self.store, ())
      .map_err(|e| EvalError::ExecutionFailed(e.to_string()))?;
    let out_len = output_len_fn
      .call(&mut self.store, ())
      .map_err(|e| EvalError::ExecutionFailed(e.to_string()))?;

    let output = abi::read_bytes(&self.store, &memory, out_ptr, out_len)
      .map_err(|e| EvalError::ExecutionFailed(e.to_string()))?;

    Ok((exit_code, output))
  }
}

impl Drop for WasmInstance {
  fn drop(&mut self) {
    // `call_with_context` always joins its own ticker before returning; this
    // guards the case where an instance is dropped without ever being
    // called, so a ticker spawned by a future caller path can never outlive
    // the `Store`/`Instance` it closes over.
    self.finished.store(true, Ordering::SeqCst);
  }
}
