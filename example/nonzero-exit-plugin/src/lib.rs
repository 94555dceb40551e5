//! Always fails with exit code 3, regardless of input. Demonstrates the
//! bare wire ABI directly rather than through
//! [`bud_plugin_sdk::entry_point!`], since that macro's
//! [`bud_plugin_sdk::dispatch`] only ever packs exit codes 0 or 1 -- a
//! guest that needs a distinct failure code exports its own entry point.

#[no_mangle]
pub extern "C" fn alloc(len: i32) -> i32 {
  let mut buf = vec![0u8; len.max(0) as usize];
  let ptr = buf.as_mut_ptr();
  std::mem::forget(buf);
  ptr as i32
}

#[no_mangle]
pub extern "C" fn main(_ptr: i32, _len: i32) -> i64 {
  3
}

#[no_mangle]
pub extern "C" fn output_ptr() -> i32 {
  0
}

#[no_mangle]
pub extern "C" fn output_len() -> i32 {
  0
}
