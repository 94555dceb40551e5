//! WebAssembly backend for `core`'s `Compiler`/`ExecutableArtifact`/
//! `GuestInstance` traits, built on `wasmtime`.

mod abi;
mod artifact;
mod compiler;
pub mod fixtures;
mod host;
mod instance;
mod state;

pub use artifact::WasmArtifact;
pub use compiler::WasmCompiler;
pub use instance::WasmInstance;
