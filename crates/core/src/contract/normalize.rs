//! Extracted signatures -> contract IR.
//!
//! Validates the context parameter, fingerprints the remaining parameters and
//! flattens every parameter and return type through one shared resolver and
//! named-type table.

use tracing::debug;

use super::api::{ContractIR, ContractParam, FunctionContract, ModuleContract};
use super::codegen::GENERATED_TYPE_NAMES;
use crate::error::GenerateError;
use crate::hasher::fingerprint;
use crate::model::{FunctionSignature, Module, TypeGraph, TypeKind};
use crate::resolver::{ASYNC_WRAPPER, Diagnostic, NamedTypeTable, TypeResolver};

/// Normalize all modules of a run, in order.
///
/// Returns the IR together with every diagnostic raised while flattening.
pub fn normalize_modules(
    modules: &[Module],
    graph: &TypeGraph,
    context_type: &str,
) -> Result<(ContractIR, Vec<Diagnostic>), GenerateError> {
    let mut table = NamedTypeTable::new();
    let mut resolver = TypeResolver::new(graph);
    let mut contracts = Vec::with_capacity(modules.len());

    for module in modules {
        let functions = module
            .functions
            .iter()
            .map(|signature| {
                normalize_function(
                    &module.name,
                    signature,
                    graph,
                    context_type,
                    &mut resolver,
                    &mut table,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        contracts.push(ModuleContract {
            name: module.name.clone(),
            source_path: module.source_path.clone(),
            functions,
        });
    }

    if let Some((name, _)) = table
        .iter()
        .find(|(identity, _)| GENERATED_TYPE_NAMES.contains(identity))
    {
        return Err(GenerateError::ReservedTypeName {
            name: name.to_string(),
        });
    }

    let types = table
        .iter()
        .map(|(identity, definition)| (identity.to_string(), definition.to_string()))
        .collect();

    Ok((
        ContractIR {
            modules: contracts,
            types,
        },
        resolver.into_diagnostics(),
    ))
}

fn normalize_function(
    module: &str,
    signature: &FunctionSignature,
    graph: &TypeGraph,
    context_type: &str,
    resolver: &mut TypeResolver<'_>,
    table: &mut NamedTypeTable,
) -> Result<FunctionContract, GenerateError> {
    let Some((context, params)) = signature.params.split_first() else {
        return Err(GenerateError::MissingContextParameter {
            module: module.to_string(),
            function: signature.name.clone(),
            context: context_type.to_string(),
        });
    };

    if context.rest || graph.context() != Some(context.ty) {
        return Err(GenerateError::InvalidContextParameter {
            module: module.to_string(),
            function: signature.name.clone(),
            context: context_type.to_string(),
            found: context.raw_type.clone(),
        });
    }

    let hash = fingerprint(params);

    let params = params
        .iter()
        .map(|param| ContractParam {
            name: param.name.clone(),
            ty: resolver.resolve(param.ty, table),
            optional: param.optional,
            rest: param.rest,
        })
        .collect();

    let resolved = resolver.resolve(signature.return_type, table);
    let return_type = if matches!(graph.kind(signature.return_type), TypeKind::Async(_)) {
        resolved
    } else {
        format!("{ASYNC_WRAPPER}<{resolved}>")
    };

    debug!(
        module,
        function = %signature.name,
        hash,
        "Normalized {}.{}",
        module,
        signature.name
    );

    Ok(FunctionContract {
        name: signature.name.clone(),
        hash,
        params,
        return_type,
    })
}
