//! Wires a `core::HostFunction` into a guest's import namespace, using the
//! same pointer/length convention as entry points (see [`crate::abi`]).

use core::HostFunction;
use shared_types::{Value, encode::value_to_json};
use utils::json_to_value;
use wasmtime::{Caller, Linker};

use crate::abi;
use crate::state::StoreState;

pub fn register_host_function(
  linker: &mut Linker<StoreState>,
  host_fn: HostFunction,
) -> Result<(), wasmtime::Error> {
  linker.func_wrap(
    host_fn.module.clone(),
    host_fn.name.clone(),
    move |mut caller: Caller<'_, StoreState>, ptr: i32, len: i32| -> i64 {
      let Some(memory) = caller
        .get_export(abi::MEMORY_EXPORT)
        .and_then(|export| export.into_memory())
      else {
        return abi::HOST_MARSHAL_ERROR;
      };

      let Ok(input_bytes) = abi::read_bytes(&caller, &memory, ptr, len) else {
        return abi::HOST_MARSHAL_ERROR;
      };

      let args: Vec<Value> = match serde_json::from_slice::<serde_json::Value>(&input_bytes) {
        Ok(serde_json::Value::Array(items)) => items.into_iter().map(json_to_value).collect(),
        _ => Vec::new(),
      };

      let Ok(result) = (host_fn.func)(args) else {
        return abi::HOST_MARSHAL_ERROR;
      };

      let Ok(encoded) = serde_json::to_vec(&value_to_json(&result)) else {
        return abi::HOST_MARSHAL_ERROR;
      };

      let Some(alloc) = caller
        .get_export(abi::ALLOC_EXPORT)
        .and_then(|export| export.into_func())
      else {
        return abi::HOST_MARSHAL_ERROR;
      };
      let Ok(alloc) = alloc.typed::<i32, i32>(&caller) else {
        return abi::HOST_MARSHAL_ERROR;
      };
      let Ok(out_ptr) = alloc.call(&mut caller, encoded.len() as i32) else {
        return abi::HOST_MARSHAL_ERROR;
      };
      if abi::write_bytes(&mut caller, &memory, out_ptr, &encoded).is_err() {
        return abi::HOST_MARSHAL_ERROR;
      }

      abi::pack_host_result(out_ptr, encoded.len() as i32)
    },
  )?;
  Ok(())
}
