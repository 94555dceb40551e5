//! Hand-written WebAssembly Text fixtures, compiled to real `.wasm` bytes at
//! test time via the `wat` crate rather than checked in as pre-built
//! binaries. Shared by this crate's own tests, `core`'s plugin-manager
//! tests, and the `test-harness` demonstration binary, so the four
//! end-to-end scenarios (greet, vowel count with number normalisation,
//! non-zero exit, cancellation) only need to be authored once.
//!
//! Every module below exports `memory` even when it never touches the
//! input, since [`crate::instance::WasmInstance::call_with_context`] reads
//! the `memory` export unconditionally before it ever looks at the input
//! byte slice.

/// Echoes `{"greeting":"Hello, World!"}` regardless of input. Stands in for
/// a guest that reads its `name` input and renders a greeting -- the
/// surrounding host pipeline is what these fixtures exercise, not guest
/// string handling.
pub const GREET_MODULE: &str = r#"
  (module
    (memory (export "memory") 1)
    (data (i32.const 1024) "{\"greeting\":\"Hello, World!\"}")
    (global $next (mut i32) (i32.const 2048))
    (func (export "alloc") (param $len i32) (result i32)
      (local $ptr i32)
      local.get $len
      drop
      global.get $next
      local.set $ptr
      local.get $ptr
    )
    (func (export "main") (param $ptr i32) (param $len i32) (result i64)
      local.get $ptr
      drop
      local.get $len
      drop
      i64.const 0
    )
    (func (export "output_ptr") (result i32)
      i32.const 1024
    )
    (func (export "output_len") (result i32)
      i32.const 28
    )
  )
"#;

/// Emits `{"count":3,"vowels":"eoo","input":"Hello World"}` -- a `count`
/// key a host decoding this output must renormalise to `Value::Int`, per
/// the number-normalisation rule.
pub const COUNT_VOWELS_MODULE: &str = r#"
  (module
    (memory (export "memory") 1)
    (data (i32.const 1024) "{\"count\":3,\"vowels\":\"eoo\",\"input\":\"Hello World\"}")
    (global $next (mut i32) (i32.const 2048))
    (func (export "alloc") (param $len i32) (result i32)
      (local $ptr i32)
      local.get $len
      drop
      global.get $next
      local.set $ptr
      local.get $ptr
    )
    (func (export "main") (param $ptr i32) (param $len i32) (result i64)
      local.get $ptr
      drop
      local.get $len
      drop
      i64.const 0
    )
    (func (export "output_ptr") (result i32)
      i32.const 1024
    )
    (func (export "output_len") (result i32)
      i32.const 48
    )
  )
"#;

/// Always exits with code 1 and never writes anything to `output_ptr`.
/// Stands in for a guest that fails: the host must discard whatever
/// `output_ptr`/`output_len` would otherwise report rather than surface
/// stale memory contents.
pub const NONZERO_EXIT_MODULE: &str = r#"
  (module
    (memory (export "memory") 1)
    (func (export "alloc") (param $len i32) (result i32)
      local.get $len
      drop
      i32.const 1024
    )
    (func (export "main") (param $ptr i32) (param $len i32) (result i64)
      local.get $ptr
      drop
      local.get $len
      drop
      i64.const 1
    )
    (func (export "output_ptr") (result i32)
      i32.const 0
    )
    (func (export "output_len") (result i32)
      i32.const 0
    )
  )
"#;

/// Spins forever. Used to exercise cancellation: a cancelled
/// [`core::EvalContext`] must trap this loop through epoch interruption,
/// since the guest itself never returns on its own.
pub const SPIN_FOREVER_MODULE: &str = r#"
  (module
    (memory (export "memory") 1)
    (func (export "alloc") (param $len i32) (result i32)
      local.get $len
      drop
      i32.const 1024
    )
    (func (export "main") (param $ptr i32) (param $len i32) (result i64)
      local.get $ptr
      drop
      local.get $len
      drop
      (loop $spin
        br $spin
      )
      i64.const 0
    )
    (func (export "output_ptr") (result i32)
      i32.const 0
    )
    (func (export "output_len") (result i32)
      i32.const 0
    )
  )
"#;

/// Parses `wat_src` into real `.wasm` bytes.
///
/// # Panics
///
/// Panics if `wat_src` does not parse -- fixture text above is fixed at
/// compile time, so a parse failure here means a fixture itself is broken,
/// not bad input from a caller.
#[must_use]
pub fn to_wasm_bytes(wat_src: &str) -> Vec<u8> {
  wat::parse_str(wat_src).expect("fixture WAT must parse")
}

/// Compiles `wat_src` through the real [`crate::WasmCompiler`] pipeline
/// (the same `Compiler::compile` path a disk-loaded plugin goes through),
/// via an in-memory [`core::MemoryLoader`].
pub fn compile(
  wat_src: &str,
  wasi_enabled: bool,
) -> Result<crate::WasmArtifact, shared_types::EvalError> {
  use core::{Compiler, CompilerOptionsBuilder, MemoryLoader};

  let loader = MemoryLoader::new(to_wasm_bytes(wat_src));
  let compiler = crate::WasmCompiler::new();
  let options = CompilerOptionsBuilder::new()
    .wasi_enabled(wasi_enabled)
    .runtime_config(compiler.default_runtime_config())
    .build()?;
  compiler.compile(&loader, options)
}
