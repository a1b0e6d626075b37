//! TypeScript syntax model.
//!
//! tree-sitter nodes are borrowed from their tree, so each file is walked once
//! into the owned structures below and the tree is dropped. Only what the
//! lowering pass needs is kept: imports, re-exports and top-level declarations
//! with their type syntax.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tree_sitter::{Node, Parser};

use crate::contract::utils::{escape_js_string, normalize_whitespace};

/// One parsed source file.
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Local binding name -> where it comes from
    pub imports: HashMap<String, ImportBinding>,
    /// Top-level declarations in source order
    pub declarations: Vec<SyntaxDecl>,
    /// Names made public by `export { a, b as c }` (exported name -> local name)
    pub export_list: HashMap<String, String>,
    /// `export { a as b } from "./x"` (exported name -> (specifier, imported name))
    pub reexports: HashMap<String, (String, String)>,
    /// `export * from "./x"`
    pub star_reexports: Vec<String>,
    /// Local name of the `export default` declaration
    pub default_export: Option<String>,
    /// Location of the first syntax error, if any
    pub syntax_error: Option<String>,
}

impl SourceFile {
    /// First type-level declaration (interface, alias, enum, class) named `name`.
    pub fn type_declaration(&self, name: &str) -> Option<&SyntaxDecl> {
        self.declarations
            .iter()
            .find(|decl| decl.name == name && decl.kind.is_type_level())
    }

    /// First function declaration named `name`.
    pub fn function_declaration(&self, name: &str) -> Option<&SyntaxSignature> {
        self.declarations.iter().find_map(|decl| match &decl.kind {
            DeclKind::Function(signature) if decl.name == name => Some(signature),
            _ => None,
        })
    }

    /// Names under which `decl` is importable by name, in a stable order.
    ///
    /// A direct `export` contributes the declared name and every
    /// `export { local as name }` adds its alias. Default exports are not
    /// importable by name and contribute nothing.
    pub fn export_names(&self, decl: &SyntaxDecl) -> Vec<String> {
        let mut names = Vec::new();
        if decl.exported && self.default_export.as_deref() != Some(decl.name.as_str()) {
            names.push(decl.name.clone());
        }

        let mut aliases: Vec<&String> = self
            .export_list
            .iter()
            .filter(|(exported, local)| **local == decl.name && exported.as_str() != "default")
            .map(|(exported, _)| exported)
            .collect();
        aliases.sort();
        for alias in aliases {
            if !names.contains(alias) {
                names.push(alias.clone());
            }
        }
        names
    }

    /// Whether `decl` is the module's default export.
    pub fn is_default_export(&self, decl: &SyntaxDecl) -> bool {
        self.default_export.as_deref() == Some(decl.name.as_str())
            || self
                .export_list
                .get("default")
                .is_some_and(|local| *local == decl.name)
    }

    /// Local name behind an exported name, if this file declares it.
    pub fn local_for_export<'a>(&'a self, exported: &'a str) -> &'a str {
        self.export_list
            .get(exported)
            .map_or(exported, String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportBinding {
    /// import { imported as local } from "source"
    Named { source: String, imported: String },
    /// import local from "source"
    Default { source: String },
    /// import * as local from "source"
    Namespace { source: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxDecl {
    pub name: String,
    pub exported: bool,
    pub kind: DeclKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclKind {
    /// Function declaration or overload signature
    Function(SyntaxSignature),
    Variable {
        annotation: Option<TypeExpr>,
        value: VariableValue,
    },
    Interface {
        type_params: Vec<TypeParam>,
        extends: Vec<TypeExpr>,
        members: Vec<Member>,
    },
    TypeAlias {
        type_params: Vec<TypeParam>,
        value: TypeExpr,
    },
    /// Member values, already rendered as literal types
    Enum { members: Vec<TypeExpr> },
    Class {
        type_params: Vec<TypeParam>,
        fields: Vec<Member>,
    },
}

impl DeclKind {
    pub fn is_type_level(&self) -> bool {
        matches!(
            self,
            DeclKind::Interface { .. }
                | DeclKind::TypeAlias { .. }
                | DeclKind::Enum { .. }
                | DeclKind::Class { .. }
        )
    }
}

/// Initializer of a variable declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum VariableValue {
    /// Arrow function or function expression
    Function(SyntaxSignature),
    /// Another binding: `export const handler = implementation;`
    Alias(String),
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxSignature {
    pub type_params: Vec<TypeParam>,
    pub params: Vec<SyntaxParam>,
    pub return_type: Option<TypeExpr>,
    pub is_async: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxParam {
    pub name: String,
    pub ty: Option<TypeExpr>,
    /// Annotation text with whitespace normalized
    pub raw_type: Option<String>,
    pub optional: bool,
    pub rest: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub name: String,
    pub default: Option<TypeExpr>,
}

/// Member of an interface, object type or class.
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Property {
        name: String,
        ty: Option<TypeExpr>,
        optional: bool,
    },
    Method {
        name: String,
    },
    Index {
        key_name: String,
        key: TypeExpr,
        value: TypeExpr,
    },
    /// Call or construct signature: the whole shape is callable
    Call,
}

/// Type syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// `string`, `number`, `any`, `never`, `null`, `undefined`, ...
    Predefined(String),
    /// `"active"`, `42`, `true`; strings normalized to double quotes
    Literal(String),
    /// `User`, `Page<User>`, `models.User`
    Reference {
        name: String,
        args: Vec<TypeExpr>,
        text: String,
    },
    Array(Box<TypeExpr>),
    Tuple(Vec<TypeExpr>),
    Union(Vec<TypeExpr>),
    Intersection(Vec<TypeExpr>),
    Object(Vec<Member>),
    /// Function or constructor type
    Function(Option<Box<SyntaxSignature>>),
    /// Syntax the lowering pass does not model; carries the source text
    Unsupported(String),
}

/// Parse a TypeScript (or TSX) source file into the syntax model.
pub fn parse_file(parser: &mut Parser, path: &Path, source: &str) -> Result<SourceFile, String> {
    let language: tree_sitter::Language = if path.extension().is_some_and(|ext| ext == "tsx") {
        tree_sitter_typescript::LANGUAGE_TSX.into()
    } else {
        tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
    };
    parser
        .set_language(&language)
        .map_err(|err| format!("Failed to set tree-sitter language: {err}"))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| "tree-sitter returned no tree".to_string())?;

    let root = tree.root_node();
    let walker = Walker {
        source: source.as_bytes(),
    };
    let mut file = SourceFile {
        path: path.to_path_buf(),
        syntax_error: first_error(root).map(|node| {
            let position = node.start_position();
            format!(
                "syntax error at line {}, column {}",
                position.row + 1,
                position.column + 1
            )
        }),
        ..SourceFile::default()
    };

    for node in named_children(root) {
        walker.statement(node, false, &mut file);
    }

    Ok(file)
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

fn first_named(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).next()
}

fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|child| child.kind() == kind)
}

/// Whether `node` has an unnamed token child such as `async`, `?` or `default`.
fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token)
}

/// Unquote a string literal's source text.
fn unquote(text: &str) -> String {
    let inner = if text.len() >= 2 {
        &text[1..text.len() - 1]
    } else {
        text
    };
    inner
        .replace("\\'", "'")
        .replace("\\\"", "\"")
        .replace("\\\\", "\\")
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

struct Walker<'s> {
    source: &'s [u8],
}

impl Walker<'_> {
    fn text(&self, node: Node<'_>) -> String {
        node.utf8_text(self.source).unwrap_or_default().to_string()
    }

    fn field_text(&self, node: Node<'_>, field: &str) -> Option<String> {
        node.child_by_field_name(field).map(|child| self.text(child))
    }

    fn statement(&self, node: Node<'_>, exported: bool, file: &mut SourceFile) {
        match node.kind() {
            "export_statement" => self.export_statement(node, file),
            "import_statement" => self.import_statement(node, file),
            "ambient_declaration" => {
                for child in named_children(node) {
                    self.statement(child, exported, file);
                }
            }
            "function_declaration" | "function_signature" => {
                if let Some(name) = self.field_text(node, "name") {
                    file.declarations.push(SyntaxDecl {
                        name,
                        exported,
                        kind: DeclKind::Function(self.signature(node)),
                    });
                }
            }
            "lexical_declaration" | "variable_declaration" => {
                for declarator in named_children(node) {
                    if declarator.kind() == "variable_declarator" {
                        self.variable(declarator, exported, file);
                    }
                }
            }
            "interface_declaration" => {
                let Some(name) = self.field_text(node, "name") else {
                    return;
                };
                let extends = child_of_kind(node, "extends_type_clause")
                    .map(|clause| {
                        named_children(clause)
                            .into_iter()
                            .map(|ty| self.type_expr(ty))
                            .collect()
                    })
                    .unwrap_or_default();
                let members = node
                    .child_by_field_name("body")
                    .map(|body| self.members(body))
                    .unwrap_or_default();
                file.declarations.push(SyntaxDecl {
                    name,
                    exported,
                    kind: DeclKind::Interface {
                        type_params: self.type_params(node),
                        extends,
                        members,
                    },
                });
            }
            "type_alias_declaration" => {
                let (Some(name), Some(value)) = (
                    self.field_text(node, "name"),
                    node.child_by_field_name("value"),
                ) else {
                    return;
                };
                file.declarations.push(SyntaxDecl {
                    name,
                    exported,
                    kind: DeclKind::TypeAlias {
                        type_params: self.type_params(node),
                        value: self.type_expr(value),
                    },
                });
            }
            "enum_declaration" => {
                let Some(name) = self.field_text(node, "name") else {
                    return;
                };
                let members = node
                    .child_by_field_name("body")
                    .map(|body| self.enum_members(body))
                    .unwrap_or_default();
                file.declarations.push(SyntaxDecl {
                    name,
                    exported,
                    kind: DeclKind::Enum { members },
                });
            }
            "class_declaration" | "abstract_class_declaration" => {
                let Some(name) = self.field_text(node, "name") else {
                    return;
                };
                let fields = node
                    .child_by_field_name("body")
                    .map(|body| self.class_fields(body))
                    .unwrap_or_default();
                file.declarations.push(SyntaxDecl {
                    name,
                    exported,
                    kind: DeclKind::Class {
                        type_params: self.type_params(node),
                        fields,
                    },
                });
            }
            _ => {}
        }
    }

    fn export_statement(&self, node: Node<'_>, file: &mut SourceFile) {
        let source = node
            .child_by_field_name("source")
            .map(|s| unquote(&self.text(s)));

        if let Some(declaration) = node.child_by_field_name("declaration") {
            let before = file.declarations.len();
            self.statement(declaration, true, file);
            if has_token(node, "default") {
                file.default_export = file.declarations.get(before).map(|d| d.name.clone());
            }
            return;
        }

        if let Some(clause) = child_of_kind(node, "export_clause") {
            for specifier in named_children(clause) {
                if specifier.kind() != "export_specifier" {
                    continue;
                }
                let Some(name) = self.field_text(specifier, "name") else {
                    continue;
                };
                let exported = self.field_text(specifier, "alias").unwrap_or_else(|| name.clone());
                match &source {
                    Some(source) => {
                        file.reexports.insert(exported, (source.clone(), name));
                    }
                    None => {
                        file.export_list.insert(exported, name);
                    }
                }
            }
            return;
        }

        if let Some(source) = source {
            if has_token(node, "*") && child_of_kind(node, "namespace_export").is_none() {
                file.star_reexports.push(source);
            }
        }
    }

    fn import_statement(&self, node: Node<'_>, file: &mut SourceFile) {
        let Some(source) = node
            .child_by_field_name("source")
            .map(|s| unquote(&self.text(s)))
        else {
            return;
        };
        let Some(clause) = child_of_kind(node, "import_clause") else {
            return;
        };

        for part in named_children(clause) {
            match part.kind() {
                "identifier" => {
                    file.imports.insert(
                        self.text(part),
                        ImportBinding::Default {
                            source: source.clone(),
                        },
                    );
                }
                "namespace_import" => {
                    if let Some(local) = first_named(part) {
                        file.imports.insert(
                            self.text(local),
                            ImportBinding::Namespace {
                                source: source.clone(),
                            },
                        );
                    }
                }
                "named_imports" => {
                    for specifier in named_children(part) {
                        if specifier.kind() != "import_specifier" {
                            continue;
                        }
                        let Some(imported) = self.field_text(specifier, "name") else {
                            continue;
                        };
                        let local = self
                            .field_text(specifier, "alias")
                            .unwrap_or_else(|| imported.clone());
                        file.imports.insert(
                            local,
                            ImportBinding::Named {
                                source: source.clone(),
                                imported,
                            },
                        );
                    }
                }
                _ => {}
            }
        }
    }

    fn variable(&self, node: Node<'_>, exported: bool, file: &mut SourceFile) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        if name_node.kind() != "identifier" {
            return;
        }
        let annotation = node
            .child_by_field_name("type")
            .and_then(first_named)
            .map(|ty| self.type_expr(ty));
        let value = node
            .child_by_field_name("value")
            .map_or(VariableValue::Other, |value| self.variable_value(value));

        file.declarations.push(SyntaxDecl {
            name: self.text(name_node),
            exported,
            kind: DeclKind::Variable { annotation, value },
        });
    }

    fn variable_value(&self, node: Node<'_>) -> VariableValue {
        match node.kind() {
            "arrow_function" | "function_expression" | "function" => {
                VariableValue::Function(self.signature(node))
            }
            "identifier" => VariableValue::Alias(self.text(node)),
            "parenthesized_expression" | "as_expression" | "satisfies_expression" => {
                first_named(node).map_or(VariableValue::Other, |inner| self.variable_value(inner))
            }
            _ => VariableValue::Other,
        }
    }

    fn signature(&self, node: Node<'_>) -> SyntaxSignature {
        let params = if let Some(list) = node.child_by_field_name("parameters") {
            named_children(list)
                .into_iter()
                .enumerate()
                .filter_map(|(index, param)| self.parameter(param, index))
                .collect()
        } else if let Some(single) = node.child_by_field_name("parameter") {
            vec![SyntaxParam {
                name: self.text(single),
                ty: None,
                raw_type: None,
                optional: false,
                rest: false,
            }]
        } else {
            Vec::new()
        };

        let return_type = node.child_by_field_name("return_type").map(|ret| {
            if ret.kind() == "type_annotation" {
                first_named(ret).map_or_else(
                    || TypeExpr::Unsupported(self.text(ret)),
                    |ty| self.type_expr(ty),
                )
            } else if ret.kind().ends_with("annotation") {
                TypeExpr::Unsupported(self.text(ret))
            } else {
                self.type_expr(ret)
            }
        });

        SyntaxSignature {
            type_params: self.type_params(node),
            params,
            return_type,
            is_async: has_token(node, "async"),
        }
    }

    fn parameter(&self, node: Node<'_>, index: usize) -> Option<SyntaxParam> {
        let kind = node.kind();
        if kind != "required_parameter" && kind != "optional_parameter" {
            return None;
        }
        let pattern = node.child_by_field_name("pattern")?;

        let (name, rest) = match pattern.kind() {
            "this" => return None,
            "identifier" => (self.text(pattern), false),
            "rest_pattern" => match first_named(pattern) {
                Some(inner) if inner.kind() == "identifier" => (self.text(inner), true),
                _ => (format!("arg{index}"), true),
            },
            _ => (format!("arg{index}"), false),
        };

        let annotation = node.child_by_field_name("type").and_then(first_named);
        Some(SyntaxParam {
            name,
            ty: annotation.map(|ty| self.type_expr(ty)),
            raw_type: annotation.map(|ty| normalize_whitespace(&self.text(ty))),
            optional: kind == "optional_parameter" || node.child_by_field_name("value").is_some(),
            rest,
        })
    }

    fn type_params(&self, node: Node<'_>) -> Vec<TypeParam> {
        let Some(list) = node.child_by_field_name("type_parameters") else {
            return Vec::new();
        };
        named_children(list)
            .into_iter()
            .filter(|param| param.kind() == "type_parameter")
            .filter_map(|param| {
                Some(TypeParam {
                    name: self.field_text(param, "name")?,
                    default: param
                        .child_by_field_name("value")
                        .and_then(first_named)
                        .map(|ty| self.type_expr(ty)),
                })
            })
            .collect()
    }

    fn property_name(&self, node: Node<'_>) -> Option<String> {
        let name = node.child_by_field_name("name")?;
        match name.kind() {
            "property_identifier" | "identifier" | "number" => Some(self.text(name)),
            "string" => Some(unquote(&self.text(name))),
            _ => None,
        }
    }

    fn members(&self, body: Node<'_>) -> Vec<Member> {
        named_children(body)
            .into_iter()
            .filter_map(|member| match member.kind() {
                "property_signature" => Some(Member::Property {
                    name: self.property_name(member)?,
                    ty: member
                        .child_by_field_name("type")
                        .and_then(first_named)
                        .map(|ty| self.type_expr(ty)),
                    optional: has_token(member, "?"),
                }),
                "method_signature" => Some(Member::Method {
                    name: self.property_name(member)?,
                }),
                "call_signature" | "construct_signature" => Some(Member::Call),
                "index_signature" => self.index_signature(member),
                _ => None,
            })
            .collect()
    }

    fn index_signature(&self, node: Node<'_>) -> Option<Member> {
        let children = named_children(node);
        let key_name = children
            .iter()
            .find(|child| child.kind() == "identifier")
            .map(|child| self.text(*child))?;
        let key = node
            .child_by_field_name("index_type")
            .or_else(|| {
                children
                    .iter()
                    .copied()
                    .find(|child| child.kind() == "predefined_type" || child.kind() == "type_identifier")
            })?;
        let value = children
            .iter()
            .copied()
            .find(|child| child.kind().ends_with("type_annotation"))
            .and_then(first_named)?;
        Some(Member::Index {
            key_name,
            key: self.type_expr(key),
            value: self.type_expr(value),
        })
    }

    fn enum_members(&self, body: Node<'_>) -> Vec<TypeExpr> {
        let mut next = Some(0.0_f64);
        let mut members = Vec::new();

        for member in named_children(body) {
            let value = match member.kind() {
                "property_identifier" | "string" => None,
                "enum_assignment" => member.child_by_field_name("value"),
                _ => continue,
            };

            let literal = match value {
                None => next.map(format_number),
                Some(value) if value.kind() == "number" => {
                    let text = self.text(value);
                    next = text.parse::<f64>().ok().map(|n| n + 1.0);
                    Some(text)
                }
                Some(value) if value.kind() == "string" => {
                    next = None;
                    Some(format!("\"{}\"", escape_js_string(&unquote(&self.text(value)))))
                }
                Some(value) => {
                    next = None;
                    members.push(TypeExpr::Unsupported(self.text(value)));
                    continue;
                }
            };

            if value.is_none() {
                next = next.map(|n| n + 1.0);
            }
            match literal {
                Some(literal) => members.push(TypeExpr::Literal(literal)),
                None => members.push(TypeExpr::Unsupported(self.text(member))),
            }
        }

        members
    }

    fn class_fields(&self, body: Node<'_>) -> Vec<Member> {
        named_children(body)
            .into_iter()
            .filter(|member| member.kind() == "public_field_definition")
            .filter(|member| !has_token(*member, "static"))
            .filter(|member| {
                child_of_kind(*member, "accessibility_modifier")
                    .is_none_or(|modifier| self.text(modifier) == "public")
            })
            .filter_map(|member| {
                let name = self.property_name(member)?;
                let ty = member.child_by_field_name("type").and_then(first_named)?;
                Some(Member::Property {
                    name,
                    ty: Some(self.type_expr(ty)),
                    optional: has_token(member, "?"),
                })
            })
            .collect()
    }

    fn flatten_into(&self, node: Node<'_>, kind: &str, out: &mut Vec<TypeExpr>) {
        for child in named_children(node) {
            if child.kind() == kind {
                self.flatten_into(child, kind, out);
            } else {
                out.push(self.type_expr(child));
            }
        }
    }

    fn type_expr(&self, node: Node<'_>) -> TypeExpr {
        match node.kind() {
            "predefined_type" => TypeExpr::Predefined(self.text(node)),
            "type_identifier" | "nested_type_identifier" | "identifier" => {
                let text = self.text(node);
                TypeExpr::Reference {
                    name: text.clone(),
                    args: Vec::new(),
                    text,
                }
            }
            "generic_type" => {
                let Some(name) = self.field_text(node, "name") else {
                    return TypeExpr::Unsupported(self.text(node));
                };
                let args = node
                    .child_by_field_name("type_arguments")
                    .map(|list| {
                        named_children(list)
                            .into_iter()
                            .map(|arg| self.type_expr(arg))
                            .collect()
                    })
                    .unwrap_or_default();
                TypeExpr::Reference {
                    name,
                    args,
                    text: normalize_whitespace(&self.text(node)),
                }
            }
            "literal_type" => match first_named(node) {
                Some(value) => match value.kind() {
                    "null" | "undefined" => TypeExpr::Predefined(value.kind().to_string()),
                    "string" => TypeExpr::Literal(format!(
                        "\"{}\"",
                        escape_js_string(&unquote(&self.text(value)))
                    )),
                    _ => TypeExpr::Literal(self.text(value).split_whitespace().collect()),
                },
                None => TypeExpr::Unsupported(self.text(node)),
            },
            "undefined" | "null" => TypeExpr::Predefined(node.kind().to_string()),
            "array_type" => match first_named(node) {
                Some(element) => TypeExpr::Array(Box::new(self.type_expr(element))),
                None => TypeExpr::Unsupported(self.text(node)),
            },
            "readonly_type" | "parenthesized_type" => match first_named(node) {
                Some(inner) => self.type_expr(inner),
                None => TypeExpr::Unsupported(self.text(node)),
            },
            "tuple_type" => {
                let mut elements = Vec::new();
                for element in named_children(node) {
                    match element.kind() {
                        "optional_type" | "rest_type" | "optional_parameter" => {
                            return TypeExpr::Unsupported(normalize_whitespace(&self.text(node)));
                        }
                        "required_parameter" => {
                            match element.child_by_field_name("type").and_then(first_named) {
                                Some(ty) => elements.push(self.type_expr(ty)),
                                None => {
                                    return TypeExpr::Unsupported(normalize_whitespace(
                                        &self.text(node),
                                    ));
                                }
                            }
                        }
                        _ => elements.push(self.type_expr(element)),
                    }
                }
                TypeExpr::Tuple(elements)
            }
            "union_type" => {
                let mut branches = Vec::new();
                self.flatten_into(node, "union_type", &mut branches);
                TypeExpr::Union(branches)
            }
            "intersection_type" => {
                let mut branches = Vec::new();
                self.flatten_into(node, "intersection_type", &mut branches);
                TypeExpr::Intersection(branches)
            }
            "object_type" => {
                let has_mapped = named_children(node).iter().any(|member| {
                    member.kind() == "index_signature"
                        && child_of_kind(*member, "mapped_type_clause").is_some()
                });
                if has_mapped {
                    TypeExpr::Unsupported(normalize_whitespace(&self.text(node)))
                } else {
                    TypeExpr::Object(self.members(node))
                }
            }
            "function_type" => TypeExpr::Function(Some(Box::new(self.signature(node)))),
            "constructor_type" => TypeExpr::Function(None),
            _ => TypeExpr::Unsupported(normalize_whitespace(&self.text(node))),
        }
    }
}
