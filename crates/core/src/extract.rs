//! Signature extraction.
//!
//! The host front end describes a module as a list of top-level declarations
//! through [`TypeQuery`]; [`extract_signatures`] keeps the exported,
//! function-shaped ones and normalizes them into [`FunctionSignature`]s.

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use crate::error::GenerateError;
use crate::model::{CallSignature, FunctionSignature, TypeGraph};

/// Type-query facility supplied by a host front end.
pub trait TypeQuery {
    /// Top-level declarations of the module at `path`, in source order.
    ///
    /// Types referenced by the returned signatures live in [`TypeQuery::graph`].
    fn declarations(&mut self, path: &Path) -> Result<Vec<Declaration>, GenerateError>;

    fn graph(&self) -> &TypeGraph;
}

/// A top-level declaration as seen by the extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub exported: bool,
    pub kind: DeclarationKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationKind {
    /// `function name(...)`; one entry per overload, implementation last
    Function(CallSignature),
    /// `const name = ...`; call signatures of the value, empty when it is not callable
    Variable { signatures: Vec<CallSignature> },
    /// Anything else (types, classes, enums)
    Other,
}

/// Exported function-shaped declarations, in declaration order.
///
/// A variable contributes the first call signature of its value. Overloaded
/// functions contribute their first signature only.
pub fn extract_signatures(declarations: Vec<Declaration>) -> Vec<FunctionSignature> {
    let mut seen = HashSet::new();
    let mut signatures = Vec::new();

    for Declaration {
        name,
        exported,
        kind,
    } in declarations
    {
        let signature = match kind {
            DeclarationKind::Function(signature) => signature,
            DeclarationKind::Variable { signatures } => match signatures.into_iter().next() {
                Some(signature) => signature,
                None => continue,
            },
            DeclarationKind::Other => continue,
        };

        if !exported {
            debug!("Skipping non-exported function '{name}'");
            continue;
        }
        if !seen.insert(name.clone()) {
            debug!("Skipping additional signature of '{name}'");
            continue;
        }

        signatures.push(FunctionSignature {
            name,
            params: signature.params,
            return_type: signature.return_type,
        });
    }

    signatures
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::model::Parameter;

    fn signature(graph: &mut TypeGraph, params: &[&str]) -> CallSignature {
        let string = graph.primitive("string");
        CallSignature {
            params: params
                .iter()
                .map(|name| Parameter::new(*name, string, "string"))
                .collect(),
            return_type: string,
        }
    }

    fn function(name: &str, exported: bool, signature: CallSignature) -> Declaration {
        Declaration {
            name: name.into(),
            exported,
            kind: DeclarationKind::Function(signature),
        }
    }

    fn names(signatures: &[FunctionSignature]) -> Vec<&str> {
        signatures.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_keeps_exported_functions_and_callable_variables_in_order() {
        let mut graph = TypeGraph::new();
        let declarations = vec![
            function("first", true, signature(&mut graph, &["ctx"])),
            Declaration {
                name: "second".into(),
                exported: true,
                kind: DeclarationKind::Variable {
                    signatures: vec![signature(&mut graph, &["ctx", "id"])],
                },
            },
            function("third", true, signature(&mut graph, &["ctx"])),
        ];

        let signatures = extract_signatures(declarations);
        assert_eq!(names(&signatures), ["first", "second", "third"]);
        assert_eq!(signatures[1].params.len(), 2);
    }

    #[test]
    fn test_skips_private_and_non_callable_declarations() {
        let mut graph = TypeGraph::new();
        let declarations = vec![
            function("hidden", false, signature(&mut graph, &["ctx"])),
            Declaration {
                name: "limit".into(),
                exported: true,
                kind: DeclarationKind::Variable { signatures: vec![] },
            },
            Declaration {
                name: "User".into(),
                exported: true,
                kind: DeclarationKind::Other,
            },
            function("visible", true, signature(&mut graph, &["ctx"])),
        ];

        assert_eq!(names(&extract_signatures(declarations)), ["visible"]);
    }

    #[test]
    fn test_overloads_contribute_first_signature() {
        let mut graph = TypeGraph::new();
        let declarations = vec![
            function("find", true, signature(&mut graph, &["ctx", "id"])),
            function("find", true, signature(&mut graph, &["ctx", "id", "deep"])),
        ];

        let signatures = extract_signatures(declarations);
        assert_eq!(signatures.len(), 1);
        assert_eq!(signatures[0].params.len(), 2);
    }

    #[test]
    fn test_variable_uses_first_call_signature() {
        let mut graph = TypeGraph::new();
        let number = graph.primitive("number");
        let mut second = signature(&mut graph, &["ctx"]);
        second.return_type = number;
        let declarations = vec![Declaration {
            name: "handler".into(),
            exported: true,
            kind: DeclarationKind::Variable {
                signatures: vec![signature(&mut graph, &["ctx", "a"]), second],
            },
        }];

        let signatures = extract_signatures(declarations);
        assert_eq!(signatures[0].params.len(), 2);
        assert_ne!(signatures[0].return_type, number);
    }
}
