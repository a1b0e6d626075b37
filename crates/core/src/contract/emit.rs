//! TypeScript code emission via the Emit trait.
//!
//! Each IR type implements `Emit`; statements and multi-line object literals
//! additionally know how to emit themselves at an indentation level.

use super::types::{
    ImportKind, TsExpr, TsFunction, TsImport, TsItem, TsLiteral, TsModule, TsParam, TsPrimitive,
    TsProp, TsStmt, TsType, TsTypeDef, TypeDefKind,
};
use super::utils::{escape_js_string, quote_if_needed};

/// Trait for emitting TypeScript code from IR nodes.
pub trait Emit {
    /// Convert the node to its TypeScript string representation.
    fn emit(&self) -> String;
}

fn join<T: Emit>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(Emit::emit)
        .collect::<Vec<_>>()
        .join(separator)
}

// =============================================================================
// Types
// =============================================================================

impl Emit for TsPrimitive {
    fn emit(&self) -> String {
        match self {
            TsPrimitive::String => "string".to_string(),
            TsPrimitive::Number => "number".to_string(),
            TsPrimitive::Unknown => "unknown".to_string(),
            TsPrimitive::Any => "any".to_string(),
        }
    }
}

impl Emit for TsLiteral {
    fn emit(&self) -> String {
        match self {
            TsLiteral::String(s) => format!("\"{}\"", escape_js_string(s)),
            TsLiteral::Int(i) => i.to_string(),
        }
    }
}

impl Emit for TsType {
    fn emit(&self) -> String {
        match self {
            TsType::Primitive(p) => p.emit(),
            TsType::Array(inner) => {
                let inner_str = inner.emit();
                if matches!(**inner, TsType::Union(_)) {
                    format!("({inner_str})[]")
                } else {
                    format!("{inner_str}[]")
                }
            }
            TsType::Union(types) => join(types, " | "),
            TsType::Object(props) => {
                if props.is_empty() {
                    "{}".to_string()
                } else {
                    format!("{{ {} }}", join(props, "; "))
                }
            }
            TsType::Record { key, value } => {
                format!("Record<{}, {}>", key.emit(), value.emit())
            }
            TsType::Literal(lit) => lit.emit(),
            TsType::Ref(text) => text.clone(),
        }
    }
}

impl Emit for TsProp {
    fn emit(&self) -> String {
        let key = quote_if_needed(&self.name);
        let opt = if self.optional { "?" } else { "" };
        format!("{key}{opt}: {}", self.ty.emit())
    }
}

impl Emit for TsTypeDef {
    fn emit(&self) -> String {
        match &self.kind {
            TypeDefKind::Interface { properties } => {
                let mut output = format!("export interface {} {{\n", self.name);
                for prop in properties {
                    output.push_str(&format!("  {};\n", prop.emit()));
                }
                output.push_str("}\n");
                output
            }
            TypeDefKind::TypeAlias { ty } => {
                format!("export type {} = {};\n", self.name, ty.emit())
            }
        }
    }
}

// =============================================================================
// Expressions
// =============================================================================

impl Emit for TsExpr {
    fn emit(&self) -> String {
        self.emit_indented(0)
    }
}

impl TsExpr {
    /// Emit with the given indentation level for any multi-line parts.
    pub fn emit_indented(&self, indent: usize) -> String {
        match self {
            TsExpr::Ident(name) => name.clone(),
            TsExpr::Literal(lit) => lit.emit(),
            TsExpr::Call { callee, args } => {
                let args_str = args
                    .iter()
                    .map(|a| a.emit_indented(indent))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}({args_str})", callee.emit_indented(indent))
            }
            TsExpr::Arrow {
                params,
                return_type,
                body,
                is_async,
            } => {
                let async_str = if *is_async { "async " } else { "" };
                let return_str = return_type
                    .as_ref()
                    .map(|t| format!(": {}", t.emit()))
                    .unwrap_or_default();
                format!(
                    "{async_str}({}){return_str} => {}",
                    join(params, ", "),
                    body.emit_indented(indent)
                )
            }
            TsExpr::Object(props) => {
                if props.is_empty() {
                    "{}".to_string()
                } else {
                    let parts: Vec<_> = props
                        .iter()
                        .map(|(k, v)| format!("{}: {}", quote_if_needed(k), v.emit_indented(indent)))
                        .collect();
                    format!("{{ {} }}", parts.join(", "))
                }
            }
            TsExpr::ObjectBlock(props) => {
                if props.is_empty() {
                    return "{}".to_string();
                }
                let inner = "  ".repeat(indent + 1);
                let mut output = "{\n".to_string();
                for (k, v) in props {
                    output.push_str(&format!(
                        "{inner}{}: {},\n",
                        quote_if_needed(k),
                        v.emit_indented(indent + 1)
                    ));
                }
                output.push_str(&format!("{}}}", "  ".repeat(indent)));
                output
            }
            TsExpr::Member { object, prop } => {
                format!("{}.{prop}", object.emit_indented(indent))
            }
            TsExpr::Await(expr) => format!("await {}", expr.emit_indented(indent)),
            TsExpr::Spread(expr) => format!("...{}", expr.emit_indented(indent)),
            TsExpr::Array(items) => {
                let items_str = items
                    .iter()
                    .map(|i| i.emit_indented(indent))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("[{items_str}]")
            }
            TsExpr::Raw(code) => code.clone(),
        }
    }
}

impl Emit for TsParam {
    fn emit(&self) -> String {
        let rest = if self.rest { "..." } else { "" };
        let opt = if self.optional && !self.rest { "?" } else { "" };
        match &self.ty {
            Some(ty) => format!("{rest}{}{opt}: {}", self.name, ty.emit()),
            None => format!("{rest}{}{opt}", self.name),
        }
    }
}

// =============================================================================
// Statements
// =============================================================================

impl Emit for TsStmt {
    fn emit(&self) -> String {
        self.emit_indented(1)
    }
}

impl TsStmt {
    /// Emit with specified indentation level (2 spaces per level)
    pub fn emit_indented(&self, indent: usize) -> String {
        let prefix = "  ".repeat(indent);
        match self {
            TsStmt::VarDecl {
                name,
                ty,
                init,
                is_export,
            } => {
                let export_str = if *is_export { "export " } else { "" };
                let ty_str = ty.as_ref().map(|t| format!(": {}", t.emit())).unwrap_or_default();
                format!(
                    "{prefix}{export_str}const {name}{ty_str} = {};\n",
                    init.emit_indented(indent)
                )
            }
            TsStmt::Return(expr) => match expr {
                Some(e) => format!("{prefix}return {};\n", e.emit_indented(indent)),
                None => format!("{prefix}return;\n"),
            },
            TsStmt::If {
                cond,
                then_body,
                else_body,
            } => {
                let mut output = format!("{prefix}if ({}) {{\n", cond.emit());
                for stmt in then_body {
                    output.push_str(&stmt.emit_indented(indent + 1));
                }
                if let Some(else_stmts) = else_body {
                    output.push_str(&format!("{prefix}}} else {{\n"));
                    for stmt in else_stmts {
                        output.push_str(&stmt.emit_indented(indent + 1));
                    }
                }
                output.push_str(&format!("{prefix}}}\n"));
                output
            }
            TsStmt::Try {
                body,
                catch_param,
                catch_body,
            } => {
                let mut output = format!("{prefix}try {{\n");
                for stmt in body {
                    output.push_str(&stmt.emit_indented(indent + 1));
                }
                output.push_str(&format!("{prefix}}} catch ({catch_param}) {{\n"));
                for stmt in catch_body {
                    output.push_str(&stmt.emit_indented(indent + 1));
                }
                output.push_str(&format!("{prefix}}}\n"));
                output
            }
            TsStmt::Throw(expr) => format!("{prefix}throw {};\n", expr.emit_indented(indent)),
            TsStmt::Raw(code) => code
                .lines()
                .map(|line| {
                    if line.is_empty() {
                        "\n".to_string()
                    } else {
                        format!("{prefix}{line}\n")
                    }
                })
                .collect(),
        }
    }
}

// =============================================================================
// Functions
// =============================================================================

impl Emit for TsFunction {
    fn emit(&self) -> String {
        let export_str = if self.is_export { "export " } else { "" };
        let async_str = if self.is_async { "async " } else { "" };
        let return_type_str = self
            .return_type
            .as_ref()
            .map(|t| format!(": {}", t.emit()))
            .unwrap_or_default();

        let mut output = format!(
            "{export_str}{async_str}function {}({}){return_type_str}",
            self.name,
            join(&self.params, ", ")
        );
        if self.body.is_empty() {
            output.push_str(" {}\n");
        } else {
            output.push_str(" {\n");
            for stmt in &self.body {
                output.push_str(&stmt.emit_indented(1));
            }
            output.push_str("}\n");
        }
        output
    }
}

// =============================================================================
// Imports
// =============================================================================

impl Emit for TsImport {
    fn emit(&self) -> String {
        let type_keyword = if self.type_only { "type " } else { "" };
        let binding = match &self.kind {
            ImportKind::Named(names) => format!("{{ {} }}", names.join(", ")),
            ImportKind::Namespace(name) => format!("* as {name}"),
        };
        format!("import {type_keyword}{binding} from \"{}\";\n", escape_js_string(&self.from))
    }
}

// =============================================================================
// Module
// =============================================================================

impl Emit for TsItem {
    fn emit(&self) -> String {
        match self {
            TsItem::Type(def) => def.emit(),
            TsItem::Function(func) => func.emit(),
            TsItem::Stmt(stmt) => stmt.emit_indented(0),
        }
    }
}

impl Emit for TsModule {
    fn emit(&self) -> String {
        let mut output = String::new();

        for line in &self.header {
            output.push_str(&format!("// {line}\n"));
        }
        if !self.header.is_empty() {
            output.push('\n');
        }

        for import in &self.imports {
            output.push_str(&import.emit());
        }
        if !self.imports.is_empty() && !self.items.is_empty() {
            output.push('\n');
        }

        let items: Vec<String> = self.items.iter().map(Emit::emit).collect();
        output.push_str(&items.join("\n"));

        output
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_string_literals_are_escaped() {
        assert_eq!(TsLiteral::String("users".into()).emit(), "\"users\"");
        assert_eq!(TsLiteral::String("a\\b".into()).emit(), "\"a\\\\b\"");
        assert_eq!(TsLiteral::Int(-3).emit(), "-3");
    }

    #[test]
    fn test_array_of_union_is_parenthesized() {
        let status = TsType::Union(vec![
            TsType::Literal(TsLiteral::String("open".into())),
            TsType::Literal(TsLiteral::String("closed".into())),
        ]);
        assert_eq!(
            TsType::Array(Box::new(status)).emit(),
            "(\"open\" | \"closed\")[]"
        );
    }

    #[test]
    fn test_nested_record_type() {
        let entries = TsType::Record {
            key: Box::new(TsType::string()),
            value: Box::new(TsType::Record {
                key: Box::new(TsType::string()),
                value: Box::new(TsType::Ref("RpcEntry".into())),
            }),
        };
        assert_eq!(
            entries.emit(),
            "Record<string, Record<string, RpcEntry>>"
        );
    }

    #[test]
    fn test_interface_quotes_non_identifier_keys() {
        let def = TsTypeDef {
            name: "Headers".into(),
            kind: TypeDefKind::Interface {
                properties: vec![
                    TsProp::new("content-type", TsType::string()),
                    TsProp {
                        optional: true,
                        ..TsProp::new("retries", TsType::number())
                    },
                ],
            },
        };
        assert_eq!(
            def.emit(),
            "export interface Headers {\n  \"content-type\": string;\n  retries?: number;\n}\n"
        );
    }

    #[test]
    fn test_type_alias_keeps_flattened_text() {
        let def = TsTypeDef {
            name: "Page_User".into(),
            kind: TypeDefKind::TypeAlias {
                ty: TsType::Ref("{ items: User[]; total: number }".into()),
            },
        };
        assert_eq!(
            def.emit(),
            "export type Page_User = { items: User[]; total: number };\n"
        );
    }

    #[test]
    fn test_emit_namespace_import() {
        let import = TsImport {
            kind: ImportKind::Namespace("users".into()),
            from: "./api/users.api".into(),
            type_only: false,
        };
        assert_eq!(import.emit(), "import * as users from \"./api/users.api\";\n");
    }

    #[test]
    fn test_context_is_a_type_only_import() {
        let import = TsImport {
            kind: ImportKind::Named(vec!["RpcContext".into()]),
            from: "rpc-gen".into(),
            type_only: true,
        };
        assert_eq!(import.emit(), "import type { RpcContext } from \"rpc-gen\";\n");
    }

    #[test]
    fn test_emit_async_arrow_with_rest_param() {
        let arrow = TsExpr::Arrow {
            params: vec![TsParam {
                name: "ids".into(),
                ty: Some(TsType::Ref("string[]".into())),
                optional: false,
                rest: true,
            }],
            return_type: Some(TsType::promise("number")),
            body: Box::new(TsExpr::call(
                TsExpr::ident("count"),
                vec![TsExpr::Array(vec![TsExpr::Spread(Box::new(TsExpr::ident("ids")))])],
            )),
            is_async: true,
        };
        assert_eq!(
            arrow.emit(),
            "async (...ids: string[]): Promise<number> => count([...ids])"
        );
    }

    #[test]
    fn test_emit_object_block_nests_indentation() {
        let stmt = TsStmt::VarDecl {
            name: "modules".into(),
            ty: None,
            init: TsExpr::ObjectBlock(vec![(
                "users".into(),
                TsExpr::ObjectBlock(vec![(
                    "get".into(),
                    TsExpr::Object(vec![("hash".into(), TsExpr::Literal(TsLiteral::Int(1)))]),
                )]),
            )]),
            is_export: true,
        };
        let expected = "export const modules = {\n  users: {\n    get: { hash: 1 },\n  },\n};\n";
        assert_eq!(stmt.emit_indented(0), expected);
    }

    #[test]
    fn test_emit_try_catch() {
        let stmt = TsStmt::Try {
            body: vec![TsStmt::Return(Some(TsExpr::ident("a")))],
            catch_param: "error".into(),
            catch_body: vec![TsStmt::Return(None)],
        };
        assert_eq!(
            stmt.emit_indented(0),
            "try {\n  return a;\n} catch (error) {\n  return;\n}\n"
        );
    }

    #[test]
    fn test_emit_function() {
        let func = TsFunction {
            name: "rpc".into(),
            params: vec![TsParam::new("module", TsType::string())],
            return_type: Some(TsType::promise("unknown")),
            body: vec![TsStmt::Return(None)],
            is_async: true,
            is_export: true,
        };
        assert_eq!(
            func.emit(),
            "export async function rpc(module: string): Promise<unknown> {\n  return;\n}\n"
        );
    }

    #[test]
    fn test_emit_module_layout() {
        let module = TsModule {
            header: vec!["generated".into()],
            imports: vec![TsImport {
                kind: ImportKind::Namespace("a".into()),
                from: "./a".into(),
                type_only: false,
            }],
            items: vec![
                TsItem::Stmt(TsStmt::Raw("const x = 1;".into())),
                TsItem::Stmt(TsStmt::Raw("const y = 2;".into())),
            ],
        };
        assert_eq!(
            module.emit(),
            "// generated\n\nimport * as a from \"./a\";\n\nconst x = 1;\n\nconst y = 2;\n"
        );
    }
}
