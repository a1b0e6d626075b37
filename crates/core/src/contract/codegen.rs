//! Code generation from contract IR to the two TypeScript artifacts.
//!
//! The frontend module gets one namespace object per API module whose entries
//! call a shared `rpc` helper, followed by the flattened named types. The
//! backend module imports every API module and routes requests through a
//! nested dispatch table.

use std::path::{Component, Path};

use super::api::{ContractIR, FunctionContract, ModuleContract};
use super::types::{
    ImportKind, TsExpr, TsFunction, TsImport, TsItem, TsLiteral, TsModule, TsParam, TsPrimitive,
    TsProp, TsStmt, TsType, TsTypeDef, TypeDefKind,
};

const HEADER: &str = "Generated by rpcgen. Do not edit.";

/// Top-level bindings of the generated artifacts, and the globals their code
/// calls. A module binding with one of these names would shadow or clash.
pub const GENERATED_BINDINGS: [&str; 11] = [
    "rpc",
    "modules",
    "RpcError",
    "RpcRequest",
    "RpcResponse",
    "RpcEntry",
    "fetch",
    "JSON",
    "Object",
    "Error",
    "Promise",
];

/// Type names the frontend declares or relies on.
pub const GENERATED_TYPE_NAMES: [&str; 2] = ["RpcError", "Promise"];

/// Settings for the backend artifact.
#[derive(Debug, Clone, Copy)]
pub struct BackendOptions<'a> {
    pub context_type: &'a str,
    pub context_import: &'a str,
    /// Directory the backend artifact is written to; import paths are relative to it
    pub output_dir: &'a Path,
}

// =============================================================================
// Frontend
// =============================================================================

/// Generate the client stub module.
pub fn codegen_frontend(ir: &ContractIR, api_url: &str) -> TsModule {
    let mut items = vec![
        TsItem::Stmt(codegen_rpc_error_class()),
        TsItem::Function(codegen_client_rpc(api_url)),
    ];

    for module in &ir.modules {
        items.push(TsItem::Stmt(codegen_client_namespace(module)));
    }

    for (identity, definition) in &ir.types {
        items.push(TsItem::Type(TsTypeDef {
            name: identity.clone(),
            kind: TypeDefKind::TypeAlias {
                ty: TsType::Ref(definition.clone()),
            },
        }));
    }

    TsModule {
        header: vec![HEADER.to_string()],
        imports: vec![],
        items,
    }
}

/// Since the IR has no class support, the error class is a raw block.
fn codegen_rpc_error_class() -> TsStmt {
    TsStmt::Raw(
        r#"export class RpcError extends Error {
  constructor(message: string) {
    super(message);
    this.name = "RpcError";
  }
}"#
        .into(),
    )
}

fn envelope_type(data: TsType) -> TsType {
    TsType::Union(vec![
        TsType::Object(vec![
            TsProp::new("type", TsType::Literal(TsLiteral::String("success".into()))),
            TsProp::new("data", data),
        ]),
        TsType::Object(vec![
            TsProp::new("type", TsType::Literal(TsLiteral::String("error".into()))),
            TsProp::new("message", TsType::string()),
        ]),
    ])
}

/// The transport helper every generated stub calls.
fn codegen_client_rpc(api_url: &str) -> TsFunction {
    let request_body = TsExpr::call(
        TsExpr::member(TsExpr::ident("JSON"), "stringify"),
        vec![TsExpr::Object(
            ["module", "func", "hash", "args"]
                .into_iter()
                .map(|field| (field.to_string(), TsExpr::ident(field)))
                .collect(),
        )],
    );

    let fetch = TsExpr::Await(Box::new(TsExpr::call(
        TsExpr::ident("fetch"),
        vec![
            TsExpr::string(api_url),
            TsExpr::ObjectBlock(vec![
                ("method".into(), TsExpr::string("POST")),
                (
                    "headers".into(),
                    TsExpr::Object(vec![(
                        "Content-Type".into(),
                        TsExpr::string("application/json"),
                    )]),
                ),
                ("body".into(), request_body),
            ]),
        ],
    )));

    let body = vec![
        TsStmt::VarDecl {
            name: "response".into(),
            ty: None,
            init: fetch,
            is_export: false,
        },
        TsStmt::If {
            cond: TsExpr::Raw("!response.ok".into()),
            then_body: vec![TsStmt::Throw(TsExpr::Raw(
                "new RpcError(`HTTP ${response.status}: ${response.statusText}`)".into(),
            ))],
            else_body: None,
        },
        TsStmt::VarDecl {
            name: "envelope".into(),
            ty: Some(envelope_type(TsType::Primitive(TsPrimitive::Any))),
            init: TsExpr::Await(Box::new(TsExpr::call(
                TsExpr::member(TsExpr::ident("response"), "json"),
                vec![],
            ))),
            is_export: false,
        },
        TsStmt::If {
            cond: TsExpr::Raw("envelope.type === \"error\"".into()),
            then_body: vec![TsStmt::Throw(TsExpr::Raw(
                "new RpcError(envelope.message)".into(),
            ))],
            else_body: None,
        },
        TsStmt::Return(Some(TsExpr::member(TsExpr::ident("envelope"), "data"))),
    ];

    TsFunction {
        name: "rpc".into(),
        params: vec![
            TsParam::new("module", TsType::string()),
            TsParam::new("func", TsType::string()),
            TsParam::new("hash", TsType::number()),
            TsParam::new("args", TsType::Array(Box::new(TsType::unknown()))),
        ],
        return_type: Some(TsType::promise("any")),
        body,
        is_async: true,
        is_export: false,
    }
}

/// `export const users = { getUser: async (id: string): Promise<User> => rpc(...), ... };`
fn codegen_client_namespace(module: &ModuleContract) -> TsStmt {
    let entries = module
        .functions
        .iter()
        .map(|function| (function.name.clone(), codegen_client_stub(&module.name, function)))
        .collect();

    TsStmt::VarDecl {
        name: module.name.clone(),
        ty: None,
        init: TsExpr::ObjectBlock(entries),
        is_export: true,
    }
}

fn codegen_client_stub(module: &str, function: &FunctionContract) -> TsExpr {
    let params = function
        .params
        .iter()
        .map(|param| TsParam {
            name: param.name.clone(),
            ty: Some(TsType::Ref(param.ty.clone())),
            optional: param.optional,
            rest: param.rest,
        })
        .collect();

    let args = function
        .params
        .iter()
        .map(|param| {
            let ident = TsExpr::ident(param.name.as_str());
            if param.rest {
                TsExpr::Spread(Box::new(ident))
            } else {
                ident
            }
        })
        .collect();

    TsExpr::Arrow {
        params,
        return_type: Some(TsType::Ref(function.return_type.clone())),
        body: Box::new(TsExpr::call(
            TsExpr::ident("rpc"),
            vec![
                TsExpr::string(module),
                TsExpr::string(function.name.as_str()),
                TsExpr::Literal(TsLiteral::Int(i64::from(function.hash))),
                TsExpr::Array(args),
            ],
        )),
        is_async: true,
    }
}

// =============================================================================
// Backend
// =============================================================================

/// Generate the server dispatch module.
pub fn codegen_backend(ir: &ContractIR, options: &BackendOptions<'_>) -> TsModule {
    let mut imports = vec![TsImport {
        kind: ImportKind::Named(vec![options.context_type.to_string()]),
        from: options.context_import.to_string(),
        type_only: true,
    }];
    imports.extend(ir.modules.iter().map(|module| TsImport {
        kind: ImportKind::Namespace(module.name.clone()),
        from: module_specifier(options.output_dir, &module.source_path),
        type_only: false,
    }));

    let items = vec![
        TsItem::Type(TsTypeDef {
            name: "RpcRequest".into(),
            kind: TypeDefKind::Interface {
                properties: vec![
                    TsProp::new("module", TsType::string()),
                    TsProp::new("func", TsType::string()),
                    TsProp::new("hash", TsType::number()),
                    TsProp::new("args", TsType::Array(Box::new(TsType::unknown()))),
                ],
            },
        }),
        TsItem::Type(TsTypeDef {
            name: "RpcResponse".into(),
            kind: TypeDefKind::TypeAlias {
                ty: envelope_type(TsType::unknown()),
            },
        }),
        TsItem::Type(TsTypeDef {
            name: "RpcEntry".into(),
            kind: TypeDefKind::TypeAlias {
                ty: TsType::Object(vec![
                    TsProp::new("hash", TsType::number()),
                    TsProp::new(
                        "func",
                        TsType::Ref(format!(
                            "(context: {}, ...args: any[]) => unknown",
                            options.context_type
                        )),
                    ),
                ]),
            },
        }),
        TsItem::Stmt(codegen_dispatch_table(ir)),
        TsItem::Function(codegen_server_rpc(options.context_type)),
    ];

    TsModule {
        header: vec![HEADER.to_string()],
        imports,
        items,
    }
}

fn codegen_dispatch_table(ir: &ContractIR) -> TsStmt {
    let modules = ir
        .modules
        .iter()
        .map(|module| {
            let functions = module
                .functions
                .iter()
                .map(|function| {
                    let entry = TsExpr::Object(vec![
                        (
                            "hash".into(),
                            TsExpr::Literal(TsLiteral::Int(i64::from(function.hash))),
                        ),
                        (
                            "func".into(),
                            TsExpr::member(
                                TsExpr::ident(module.name.as_str()),
                                function.name.as_str(),
                            ),
                        ),
                    ]);
                    (function.name.clone(), entry)
                })
                .collect();
            (module.name.clone(), TsExpr::ObjectBlock(functions))
        })
        .collect();

    let entry = TsType::Ref("RpcEntry".into());
    TsStmt::VarDecl {
        name: "modules".into(),
        ty: Some(TsType::Record {
            key: Box::new(TsType::string()),
            value: Box::new(TsType::Record {
                key: Box::new(TsType::string()),
                value: Box::new(entry),
            }),
        }),
        init: TsExpr::ObjectBlock(modules),
        is_export: false,
    }
}

fn error_result(message: &str) -> TsStmt {
    TsStmt::Return(Some(TsExpr::Object(vec![
        ("type".into(), TsExpr::string("error")),
        ("message".into(), TsExpr::string(message)),
    ])))
}

fn own_property_check(object: &str, key: &str) -> TsExpr {
    TsExpr::Raw(format!(
        "!Object.prototype.hasOwnProperty.call({object}, {key})"
    ))
}

/// The driver: look up, verify the fingerprint, invoke with the server-side context.
fn codegen_server_rpc(context_type: &str) -> TsFunction {
    let body = vec![
        TsStmt::VarDecl {
            name: "{ module, func, hash, args }".into(),
            ty: None,
            init: TsExpr::ident("request"),
            is_export: false,
        },
        TsStmt::If {
            cond: own_property_check("modules", "module"),
            then_body: vec![error_result("Module not found")],
            else_body: None,
        },
        TsStmt::VarDecl {
            name: "functions".into(),
            ty: None,
            init: TsExpr::Raw("modules[module]".into()),
            is_export: false,
        },
        TsStmt::If {
            cond: own_property_check("functions", "func"),
            then_body: vec![error_result("Function not found")],
            else_body: None,
        },
        TsStmt::VarDecl {
            name: "entry".into(),
            ty: None,
            init: TsExpr::Raw("functions[func]".into()),
            is_export: false,
        },
        TsStmt::If {
            cond: TsExpr::Raw("entry.hash !== hash".into()),
            then_body: vec![error_result("Hash mismatch")],
            else_body: None,
        },
        TsStmt::Try {
            body: vec![
                TsStmt::VarDecl {
                    name: "data".into(),
                    ty: None,
                    init: TsExpr::Await(Box::new(TsExpr::call(
                        TsExpr::member(TsExpr::ident("entry"), "func"),
                        vec![
                            TsExpr::ident("context"),
                            TsExpr::Spread(Box::new(TsExpr::ident("args"))),
                        ],
                    ))),
                    is_export: false,
                },
                TsStmt::Return(Some(TsExpr::Object(vec![
                    ("type".into(), TsExpr::string("success")),
                    ("data".into(), TsExpr::ident("data")),
                ]))),
            ],
            catch_param: "error".into(),
            catch_body: vec![TsStmt::Return(Some(TsExpr::Object(vec![
                ("type".into(), TsExpr::string("error")),
                (
                    "message".into(),
                    TsExpr::Raw("error instanceof Error ? error.message : String(error)".into()),
                ),
            ])))],
        },
    ];

    TsFunction {
        name: "rpc".into(),
        params: vec![
            TsParam::new("context", TsType::Ref(context_type.to_string())),
            TsParam::new("request", TsType::Ref("RpcRequest".into())),
        ],
        return_type: Some(TsType::promise("RpcResponse")),
        body,
        is_async: true,
        is_export: true,
    }
}

/// Import specifier of `source` as seen from `from_dir`: relative, `/`-separated,
/// `.ts` extension dropped, always starting with `./` or `../`.
pub fn module_specifier(from_dir: &Path, source: &Path) -> String {
    let relative = pathdiff::diff_paths(source, from_dir).unwrap_or_else(|| source.to_path_buf());

    let mut parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect();

    if let Some(last) = parts.last_mut() {
        for extension in [".tsx", ".ts"] {
            if let Some(stripped) = last.strip_suffix(extension) {
                *last = stripped.to_string();
                break;
            }
        }
    }

    let joined = parts.join("/");
    if joined.starts_with("../") {
        joined
    } else {
        format!("./{joined}")
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::contract::api::ContractParam;
    use crate::contract::emit::Emit;
    use std::path::PathBuf;

    fn sample_ir() -> ContractIR {
        ContractIR {
            modules: vec![ModuleContract {
                name: "users".into(),
                source_path: PathBuf::from("/app/api/users.api.ts"),
                functions: vec![
                    FunctionContract {
                        name: "getUser".into(),
                        hash: 42,
                        params: vec![ContractParam {
                            name: "id".into(),
                            ty: "string".into(),
                            optional: false,
                            rest: false,
                        }],
                        return_type: "Promise<User>".into(),
                    },
                    FunctionContract {
                        name: "tag".into(),
                        hash: 7,
                        params: vec![
                            ContractParam {
                                name: "note".into(),
                                ty: "string".into(),
                                optional: true,
                                rest: false,
                            },
                            ContractParam {
                                name: "labels".into(),
                                ty: "string[]".into(),
                                optional: false,
                                rest: true,
                            },
                        ],
                        return_type: "Promise<void>".into(),
                    },
                ],
            }],
            types: vec![("User".into(), "{ name: string }".into())],
        }
    }

    #[test]
    fn test_frontend_namespace_object() {
        let output = codegen_frontend(&sample_ir(), "/api/rpc").emit();
        let expected = "export const users = {\n  getUser: async (id: string): Promise<User> => rpc(\"users\", \"getUser\", 42, [id]),\n  tag: async (note?: string, ...labels: string[]): Promise<void> => rpc(\"users\", \"tag\", 7, [note, ...labels]),\n};\n";
        assert!(output.contains(expected), "{output}");
    }

    #[test]
    fn test_frontend_helper_posts_envelope_to_configured_url() {
        let output = codegen_frontend(&sample_ir(), "/v2/rpc").emit();
        assert!(output.starts_with("// Generated by rpcgen. Do not edit.\n"));
        assert!(output.contains("export class RpcError extends Error {"));
        assert!(output.contains(
            "async function rpc(module: string, func: string, hash: number, args: unknown[]): Promise<any> {"
        ));
        assert!(output.contains("const response = await fetch(\"/v2/rpc\", {\n    method: \"POST\",\n"));
        assert!(output.contains(
            "body: JSON.stringify({ module: module, func: func, hash: hash, args: args }),"
        ));
        assert!(output.contains("throw new RpcError(envelope.message);"));
    }

    #[test]
    fn test_frontend_types_come_last() {
        let output = codegen_frontend(&sample_ir(), "/api/rpc").emit();
        assert!(output.ends_with("export type User = { name: string };\n"));
        let types_at = output.find("export type User").unwrap();
        let module_at = output.find("export const users").unwrap();
        assert!(module_at < types_at);
    }

    #[test]
    fn test_backend_imports_and_table() {
        let options = BackendOptions {
            context_type: "RpcContext",
            context_import: "rpc-gen",
            output_dir: Path::new("/app"),
        };
        let output = codegen_backend(&sample_ir(), &options).emit();
        assert!(output.contains("import type { RpcContext } from \"rpc-gen\";\n"));
        assert!(output.contains("import * as users from \"./api/users.api\";\n"));
        assert!(output.contains(
            "const modules: Record<string, Record<string, RpcEntry>> = {\n  users: {\n    getUser: { hash: 42, func: users.getUser },\n    tag: { hash: 7, func: users.tag },\n  },\n};\n"
        ));
        assert!(!output.contains("export type User"));
    }

    #[test]
    fn test_backend_driver_returns_envelopes() {
        let options = BackendOptions {
            context_type: "AppContext",
            context_import: "./context",
            output_dir: Path::new("/app"),
        };
        let output = codegen_backend(&sample_ir(), &options).emit();
        assert!(output.contains(
            "export async function rpc(context: AppContext, request: RpcRequest): Promise<RpcResponse> {"
        ));
        assert!(output.contains("return { type: \"error\", message: \"Module not found\" };"));
        assert!(output.contains("return { type: \"error\", message: \"Function not found\" };"));
        assert!(output.contains("return { type: \"error\", message: \"Hash mismatch\" };"));
        assert!(output.contains("const data = await entry.func(context, ...args);"));
        assert!(output.contains("return { type: \"success\", data: data };"));
        assert!(output.contains("!Object.prototype.hasOwnProperty.call(modules, module)"));
    }

    #[test]
    fn test_module_specifier() {
        assert_eq!(
            module_specifier(Path::new("/app"), Path::new("/app/api/users.api.ts")),
            "./api/users.api"
        );
        assert_eq!(
            module_specifier(Path::new("/app/server"), Path::new("/app/api/users.api.ts")),
            "../api/users.api"
        );
        assert_eq!(
            module_specifier(Path::new("/app"), Path::new("/app/users.api.ts")),
            "./users.api"
        );
    }
}
