//! Guest-side helper for the host/guest wire ABI: a plain WebAssembly core
//! module (not a component) exporting `alloc`, `memory`, an entry point
//! shaped `(ptr: i32, len: i32) -> i64`, and `output_ptr`/`output_len`
//! consulted only when the packed return value's exit code is zero.
//!
//! A guest crate depends on this, then declares its entry point with
//! [`entry_point!`]:
//!
//! ```ignore
//! bud_plugin_sdk::entry_point!(main, |input| {
//!   let name = input.get("name").and_then(|v| v.as_str()).unwrap_or("World");
//!   Ok(serde_json::json!({ "greeting": format!("Hello, {name}!") }))
//! });
//! ```

use std::cell::RefCell;

thread_local! {
  static OUTPUT: RefCell<Vec<u8>> = const { RefCell::new(Vec::new()) };
}

/// Bump-allocates `len` bytes in this module's own linear memory and
/// returns the pointer. The host calls this before writing its
/// JSON-encoded input, and never frees what it returns -- the guest's
/// normal allocator reclaims it once the instance is torn down.
#[no_mangle]
pub extern "C" fn alloc(len: i32) -> i32 {
  let mut buf = vec![0u8; len.max(0) as usize];
  let ptr = buf.as_mut_ptr();
  std::mem::forget(buf);
  ptr as i32
}

/// Pointer to the last [`dispatch`] call's encoded output. Read by the host
/// only when the entry point's packed return value carries a zero exit
/// code.
#[no_mangle]
pub extern "C" fn output_ptr() -> i32 {
  OUTPUT.with(|cell| cell.borrow().as_ptr() as i32)
}

/// Length in bytes of the last [`dispatch`] call's encoded output.
#[no_mangle]
pub extern "C" fn output_len() -> i32 {
  OUTPUT.with(|cell| cell.borrow().len() as i32)
}

/// Decodes the host's input out of linear memory. `len == 0` (the host's
/// convention for "no data") decodes as an empty object rather than an
/// error, so a handler can always call `.get(...)` without a branch.
fn read_input(ptr: i32, len: i32) -> serde_json::Value {
  if len == 0 {
    return serde_json::Value::Object(serde_json::Map::new());
  }
  // Safety: `ptr`/`len` describe a region the host just wrote via this
  // module's own `alloc` export, inside this module's own linear memory.
  let slice = unsafe { std::slice::from_raw_parts(ptr as *const u8, len as usize) };
  serde_json::from_slice(slice).unwrap_or(serde_json::Value::Null)
}

/// Runs `handler` against the decoded input, stashes its encoded output
/// behind [`output_ptr`]/[`output_len`], and returns the packed exit code
/// the entry point must return verbatim. A handler returning `Err` packs
/// exit code 1 and leaves the output buffer untouched -- the host discards
/// output on a non-zero exit regardless of what is there.
pub fn dispatch<F>(ptr: i32, len: i32, handler: F) -> i64
where
  F: FnOnce(serde_json::Value) -> Result<serde_json::Value, String>,
{
  match handler(read_input(ptr, len)) {
    Ok(output) => {
      let bytes = serde_json::to_vec(&output).unwrap_or_default();
      OUTPUT.with(|cell| *cell.borrow_mut() = bytes);
      0
    }
    Err(_) => 1,
  }
}

/// Declares `$name` as the guest's entry point, exported with the
/// `(ptr: i32, len: i32) -> i64` signature the host requires, wired
/// through [`dispatch`]. `$handler` is any `FnOnce(serde_json::Value) ->
/// Result<serde_json::Value, String>`.
#[macro_export]
macro_rules! entry_point {
  ($name:ident, $handler:expr) => {
    #[no_mangle]
    pub extern "C" fn $name(ptr: i32, len: i32) -> i64 {
      $crate::dispatch(ptr, len, $handler)
    }
  };
}
