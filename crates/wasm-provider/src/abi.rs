//! The concrete wire ABI between the host and a guest WebAssembly module
//! (documented as a load-bearing, explicitly invented detail: the engine
//! SDK's own contract is treated abstractly, but a runnable backend still
//! needs one fixed convention).
//!
//! - The guest exports `alloc(len: i32) -> i32`, bump-allocating `len`
//!   bytes in its own linear memory and returning the pointer.
//! - The entry point's exported signature is `(ptr: i32, len: i32) -> i64`;
//!   the low 32 bits of the return value are the guest's exit code. On a
//!   zero exit code the host reads the guest's `output_ptr() -> i32` and
//!   `output_len() -> i32` exports to locate the result bytes. On a
//!   non-zero exit code the host never touches guest memory for output.
//! - Host functions registered through `CompilerOptions::host_functions`
//!   share the same `(ptr: i32, len: i32) -> i64` shape for their
//!   argument list, but pack their own return value's pointer and length
//!   directly into the low/high 32 bits of the returned `i64` (there is no
//!   exit-code concept for a host function call); a negative return value
//!   signals a host-side marshaling failure.

use wasmtime::{AsContext, AsContextMut, Memory};

pub const ALLOC_EXPORT: &str = "alloc";
pub const MEMORY_EXPORT: &str = "memory";
pub const OUTPUT_PTR_EXPORT: &str = "output_ptr";
pub const OUTPUT_LEN_EXPORT: &str = "output_len";

/// Extracts the exit code an entry point packed into the low 32 bits of its
/// `i64` return value.
#[must_use]
pub fn exit_code_from_packed(packed: i64) -> u32 {
  (packed as u64 & 0xFFFF_FFFF) as u32
}

/// Packs a host function's result location for its `i64` return value.
#[must_use]
pub fn pack_host_result(ptr: i32, len: i32) -> i64 {
  ((len as i64) << 32) | (i64::from(ptr) & 0xFFFF_FFFF)
}

/// Sentinel returned by a host function wrapper when marshaling fails
/// before the guest's own exit-code convention would apply.
pub const HOST_MARSHAL_ERROR: i64 = -1;

pub fn read_bytes<T: AsContext>(ctx: &T, memory: &Memory, ptr: i32, len: i32) -> Result<Vec<u8>, wasmtime::Error> {
  let mut buf = vec![0u8; len.max(0) as usize];
  memory.read(ctx, ptr as usize, &mut buf)?;
  Ok(buf)
}

pub fn write_bytes<T: AsContextMut>(
  mut ctx: T,
  memory: &Memory,
  ptr: i32,
  bytes: &[u8],
) -> Result<(), wasmtime::Error> {
  memory.write(&mut ctx, ptr as usize, bytes)
}
