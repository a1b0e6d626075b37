//! Contract-level IR.
//!
//! Everything here is already resolved: type positions hold canonical text
//! and every function carries its fingerprint. Code generation only reads it.

use std::path::PathBuf;

/// All modules of one generation run plus the flattened named types.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractIR {
    pub modules: Vec<ModuleContract>,
    /// `(identity, definition)` in table insertion order
    pub types: Vec<(String, String)>,
}

impl ContractIR {
    pub fn function_count(&self) -> usize {
        self.modules.iter().map(|m| m.functions.len()).sum()
    }
}

/// One API module.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleContract {
    /// Logical module name, also the binding name in both artifacts
    pub name: String,
    pub source_path: PathBuf,
    pub functions: Vec<FunctionContract>,
}

/// One exposed function with its context parameter stripped.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionContract {
    pub name: String,
    pub hash: u32,
    pub params: Vec<ContractParam>,
    /// Resolved return text, always wrapped in the async wrapper
    pub return_type: String,
}

/// A wire-visible parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractParam {
    pub name: String,
    pub ty: String,
    pub optional: bool,
    pub rest: bool,
}
