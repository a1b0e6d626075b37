//! Contract compilation: extracted signatures to the two generated artifacts.
//!
//! 1. `normalize`: signatures + type graph -> contract IR (context check,
//!    fingerprints, flattened types)
//! 2. `codegen`: contract IR -> TypeScript IR, once per artifact
//! 3. `emit`: TypeScript IR -> code strings (via the `Emit` trait)

pub mod api;
mod codegen;
mod emit;
mod normalize;
pub mod types;
pub mod utils;

pub use api::{ContractIR, ContractParam, FunctionContract, ModuleContract};
pub use codegen::{
    BackendOptions, GENERATED_BINDINGS, GENERATED_TYPE_NAMES, codegen_backend, codegen_frontend,
    module_specifier,
};
pub use emit::Emit;
pub use normalize::normalize_modules;

/// Rendered text of both artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub frontend: String,
    pub backend: String,
}

/// Render both artifacts from the contract IR.
pub fn render(ir: &ContractIR, api_url: &str, backend: &BackendOptions<'_>) -> Artifacts {
    Artifacts {
        frontend: codegen_frontend(ir, api_url).emit(),
        backend: codegen_backend(ir, backend).emit(),
    }
}
