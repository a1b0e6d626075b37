//! tree-sitter TypeScript front end.
//!
//! [`TypeScriptHost`] parses API modules and the files they import, and lowers
//! the declared types into a shared [`TypeGraph`].

mod lower;
mod syntax;

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use self::lower::{Lowerer, MemoKey, SourceCache};
use crate::error::GenerateError;
use crate::extract::{Declaration, DeclarationKind, TypeQuery};
use crate::model::{TypeGraph, TypeId};

/// Type-query facility backed by tree-sitter.
#[derive(Debug)]
pub struct TypeScriptHost {
    sources: SourceCache,
    graph: TypeGraph,
    memo: HashMap<MemoKey, TypeId>,
    context_type: String,
}

impl TypeScriptHost {
    /// `context_type` is the type name that marks the injected context parameter.
    pub fn new(context_type: impl Into<String>) -> Self {
        Self {
            sources: SourceCache::new(),
            graph: TypeGraph::new(),
            memo: HashMap::new(),
            context_type: context_type.into(),
        }
    }
}

impl TypeQuery for TypeScriptHost {
    fn declarations(&mut self, path: &Path) -> Result<Vec<Declaration>, GenerateError> {
        let file = self.sources.load(path)?;
        if let Some(error) = &file.syntax_error {
            return Err(GenerateError::Parse {
                path: path.to_path_buf(),
                message: error.clone(),
            });
        }

        let mut lowerer = Lowerer::new(
            &mut self.graph,
            &mut self.sources,
            &mut self.memo,
            &self.context_type,
        );
        let mut declarations = Vec::new();
        for decl in &file.declarations {
            let kind = lowerer.declaration(&file, decl);
            let names = file.export_names(decl);
            if names.is_empty() {
                if file.is_default_export(decl) && kind != DeclarationKind::Other {
                    debug!("Skipping default export '{}'", decl.name);
                }
                declarations.push(Declaration {
                    name: decl.name.clone(),
                    exported: false,
                    kind,
                });
                continue;
            }
            for name in names {
                declarations.push(Declaration {
                    name,
                    exported: true,
                    kind: kind.clone(),
                });
            }
        }

        debug!(
            path = %path.display(),
            declarations = declarations.len(),
            graph = self.graph.len(),
            "Lowered module"
        );
        Ok(declarations)
    }

    fn graph(&self) -> &TypeGraph {
        &self.graph
    }
}
