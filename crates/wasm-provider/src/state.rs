use wasmtime_wasi::WasiCtxBuilder;
use wasmtime_wasi::preview1::WasiP1Ctx;

/// Per-instance store data: WASI context, present only when the artifact
/// was compiled with `wasi_enabled`.
pub struct StoreState {
  pub wasi: Option<WasiP1Ctx>,
}

impl StoreState {
  #[must_use]
  pub fn new(wasi_enabled: bool) -> Self {
    let wasi = wasi_enabled.then(|| WasiCtxBuilder::new().inherit_stdio().build_p1());
    Self { wasi }
  }
}
