//! Lowering of the syntax model into the [`TypeGraph`].
//!
//! Named declarations are memoized on (file, name, type arguments) before
//! their bodies are lowered, so a recursive declaration refers back to its own
//! node and shows up as a cycle in the graph.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, warn};
use tree_sitter::Parser;

use super::syntax::{
    DeclKind, ImportBinding, Member, SourceFile, SyntaxDecl, SyntaxSignature, TypeExpr,
    TypeParam, VariableValue, parse_file,
};
use crate::error::GenerateError;
use crate::extract::DeclarationKind;
use crate::model::{
    CallSignature, IndexSignature, ObjectType, Parameter, Property, TypeGraph, TypeId, TypeKind,
    TypeName, TypeNode,
};
use crate::resolver::FALLBACK;

/// Nested generic instantiations lowered before giving up on a reference.
const MAX_INSTANTIATION_DEPTH: usize = 32;

/// Re-export hops followed when resolving an imported name.
const MAX_EXPORT_HOPS: usize = 16;

/// Global types rendered verbatim instead of expanded.
const OPAQUE_BUILTINS: &[&str] = &[
    "Date",
    "RegExp",
    "Error",
    "Map",
    "ReadonlyMap",
    "Set",
    "ReadonlySet",
    "WeakMap",
    "WeakSet",
    "ArrayBuffer",
    "SharedArrayBuffer",
    "DataView",
    "Int8Array",
    "Uint8Array",
    "Uint8ClampedArray",
    "Int16Array",
    "Uint16Array",
    "Int32Array",
    "Uint32Array",
    "Float32Array",
    "Float64Array",
    "BigInt64Array",
    "BigUint64Array",
    "Blob",
    "File",
    "FormData",
    "URL",
    "URLSearchParams",
    "Headers",
    "Request",
    "Response",
    "ReadableStream",
    "Object",
    "Symbol",
    "BigInt",
];

pub(super) type MemoKey = (PathBuf, String, Vec<TypeId>);

type Scope = HashMap<String, TypeId>;

/// Parsed files of one run, keyed by normalized path.
pub(super) struct SourceCache {
    parser: Parser,
    files: HashMap<PathBuf, Rc<SourceFile>>,
}

impl fmt::Debug for SourceCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceCache")
            .field("files", &self.files.len())
            .finish_non_exhaustive()
    }
}

impl SourceCache {
    pub(super) fn new() -> Self {
        Self {
            parser: Parser::new(),
            files: HashMap::new(),
        }
    }

    pub(super) fn load(&mut self, path: &Path) -> Result<Rc<SourceFile>, GenerateError> {
        let path = normalize_path(path);
        if let Some(file) = self.files.get(&path) {
            return Ok(Rc::clone(file));
        }

        let source = fs::read_to_string(&path).map_err(|source| GenerateError::Io {
            path: path.clone(),
            source,
        })?;
        let file = parse_file(&mut self.parser, &path, &source).map_err(|message| {
            GenerateError::Parse {
                path: path.clone(),
                message,
            }
        })?;

        if let Some(error) = &file.syntax_error {
            warn!("{}: {error}; declarations may be incomplete", path.display());
        }
        debug!(
            path = %path.display(),
            declarations = file.declarations.len(),
            "Parsed source file"
        );

        let file = Rc::new(file);
        self.files.insert(path, Rc::clone(&file));
        Ok(file)
    }
}

/// Lowers declarations of parsed files into one graph.
pub(super) struct Lowerer<'h> {
    graph: &'h mut TypeGraph,
    sources: &'h mut SourceCache,
    memo: &'h mut HashMap<MemoKey, TypeId>,
    context_type: &'h str,
    depth: usize,
}

impl<'h> Lowerer<'h> {
    pub(super) fn new(
        graph: &'h mut TypeGraph,
        sources: &'h mut SourceCache,
        memo: &'h mut HashMap<MemoKey, TypeId>,
        context_type: &'h str,
    ) -> Self {
        Self {
            graph,
            sources,
            memo,
            context_type,
            depth: 0,
        }
    }

    /// Lower the callable part of a top-level declaration.
    pub(super) fn declaration(&mut self, file: &Rc<SourceFile>, decl: &SyntaxDecl) -> DeclarationKind {
        match &decl.kind {
            DeclKind::Function(signature) => {
                DeclarationKind::Function(self.call_signature(file, signature))
            }
            DeclKind::Variable { annotation, value } => DeclarationKind::Variable {
                signatures: variable_signature(file, annotation.as_ref(), value)
                    .map(|signature| vec![self.call_signature(file, signature)])
                    .unwrap_or_default(),
            },
            _ => DeclarationKind::Other,
        }
    }

    fn call_signature(&mut self, file: &Rc<SourceFile>, signature: &SyntaxSignature) -> CallSignature {
        let scope: Scope = signature
            .type_params
            .iter()
            .map(|param| (param.name.clone(), self.graph.unresolved(param.name.clone())))
            .collect();

        let params = signature
            .params
            .iter()
            .map(|param| Parameter {
                name: param.name.clone(),
                ty: match &param.ty {
                    Some(ty) => self.lower(file, &scope, ty),
                    None => self.graph.primitive(FALLBACK),
                },
                raw_type: param
                    .raw_type
                    .clone()
                    .unwrap_or_else(|| FALLBACK.to_string()),
                optional: param.optional,
                rest: param.rest,
            })
            .collect();

        let return_type = match &signature.return_type {
            Some(ty) => self.lower(file, &scope, ty),
            None => {
                let inferred = self.graph.unresolved("inferred return type");
                if signature.is_async {
                    self.graph.add_kind(TypeKind::Async(inferred))
                } else {
                    inferred
                }
            }
        };

        CallSignature {
            params,
            return_type,
        }
    }

    fn lower(&mut self, file: &Rc<SourceFile>, scope: &Scope, expr: &TypeExpr) -> TypeId {
        match expr {
            TypeExpr::Predefined(name) => self.graph.primitive(name),
            TypeExpr::Literal(text) => self.graph.literal(text),
            TypeExpr::Reference { name, args, text } => {
                self.reference(file, scope, name, args, text)
            }
            TypeExpr::Array(element) => {
                let element = self.lower(file, scope, element);
                self.graph.add_kind(TypeKind::Array(element))
            }
            TypeExpr::Tuple(elements) => {
                let elements = self.lower_all(file, scope, elements);
                self.graph.add_kind(TypeKind::Tuple(elements))
            }
            TypeExpr::Union(branches) => {
                let branches = self.lower_all(file, scope, branches);
                self.graph.add_kind(TypeKind::Union(branches))
            }
            TypeExpr::Intersection(branches) => {
                let branches = self.lower_all(file, scope, branches);
                self.graph.add_kind(TypeKind::Intersection(branches))
            }
            TypeExpr::Object(members) => {
                let kind = self.members(file, scope, members);
                self.graph.add_kind(kind)
            }
            TypeExpr::Function(_) => self.graph.add_kind(TypeKind::Callable),
            TypeExpr::Unsupported(text) => self.graph.unresolved(text.clone()),
        }
    }

    fn lower_all(&mut self, file: &Rc<SourceFile>, scope: &Scope, exprs: &[TypeExpr]) -> Vec<TypeId> {
        exprs
            .iter()
            .map(|expr| self.lower(file, scope, expr))
            .collect()
    }

    fn members(&mut self, file: &Rc<SourceFile>, scope: &Scope, members: &[Member]) -> TypeKind {
        let mut object = ObjectType::default();

        for member in members {
            match member {
                Member::Property { name, ty, optional } => {
                    let ty = match ty {
                        Some(ty) => self.lower(file, scope, ty),
                        None => self.graph.primitive(FALLBACK),
                    };
                    object.properties.push(Property {
                        name: name.clone(),
                        ty,
                        optional: *optional,
                    });
                }
                Member::Method { name } => {
                    let ty = self.graph.add_kind(TypeKind::Callable);
                    object.properties.push(Property::required(name.clone(), ty));
                }
                Member::Index {
                    key_name,
                    key,
                    value,
                } => {
                    if object.index.is_none() {
                        let key = self.lower(file, scope, key);
                        let value = self.lower(file, scope, value);
                        object.index = Some(IndexSignature {
                            key_name: key_name.clone(),
                            key,
                            value,
                        });
                    }
                }
                Member::Call => return TypeKind::Callable,
            }
        }

        TypeKind::Object(object)
    }

    /// Resolve a type reference: type parameters, the context type, namespace
    /// members, local declarations, relative imports, then global builtins.
    fn reference(
        &mut self,
        file: &Rc<SourceFile>,
        scope: &Scope,
        name: &str,
        args: &[TypeExpr],
        text: &str,
    ) -> TypeId {
        if args.is_empty() {
            if let Some(&id) = scope.get(name) {
                return id;
            }
            if name == self.context_type {
                return self.graph.register_context(name);
            }
        }

        if let Some((namespace, member)) = name.split_once('.') {
            let resolved = match file.imports.get(namespace) {
                Some(ImportBinding::Namespace { source }) => {
                    let args = self.lower_all(file, scope, args);
                    self.imported(file, source, member, args, 0)
                }
                _ => None,
            };
            return resolved.unwrap_or_else(|| self.graph.unresolved(text));
        }

        if let Some(decl) = file.type_declaration(name) {
            let args = self.lower_all(file, scope, args);
            return self
                .declaration_type(file, decl, args)
                .unwrap_or_else(|| self.graph.unresolved(text));
        }

        if let Some(binding) = file.imports.get(name) {
            let args = self.lower_all(file, scope, args);
            let resolved = match binding {
                ImportBinding::Named { source, imported } => {
                    self.imported(file, source, imported, args, 0)
                }
                ImportBinding::Default { source } => self.imported_default(file, source, args),
                ImportBinding::Namespace { .. } => None,
            };
            return resolved.unwrap_or_else(|| self.graph.unresolved(text));
        }

        self.builtin(file, scope, name, args, text)
            .unwrap_or_else(|| self.graph.unresolved(text))
    }

    fn load(&mut self, from: &SourceFile, specifier: &str) -> Option<Rc<SourceFile>> {
        let path = resolve_module(&from.path, specifier)?;
        match self.sources.load(&path) {
            Ok(file) => Some(file),
            Err(err) => {
                warn!("{err}");
                None
            }
        }
    }

    fn imported(
        &mut self,
        from: &SourceFile,
        specifier: &str,
        export_name: &str,
        args: Vec<TypeId>,
        hops: usize,
    ) -> Option<TypeId> {
        if hops > MAX_EXPORT_HOPS {
            debug!("Giving up on '{export_name}' after {hops} re-exports");
            return None;
        }
        let target = self.load(from, specifier)?;
        self.exported(&target, export_name, args, hops)
    }

    fn imported_default(
        &mut self,
        from: &SourceFile,
        specifier: &str,
        args: Vec<TypeId>,
    ) -> Option<TypeId> {
        let target = self.load(from, specifier)?;
        let decl = target.type_declaration(target.default_export.as_deref()?)?;
        self.declaration_type(&target, decl, args)
    }

    fn exported(
        &mut self,
        target: &Rc<SourceFile>,
        export_name: &str,
        args: Vec<TypeId>,
        hops: usize,
    ) -> Option<TypeId> {
        let local = target.local_for_export(export_name);

        if let Some(decl) = target.type_declaration(local) {
            return self.declaration_type(target, decl, args);
        }

        if let Some(binding) = target.imports.get(local) {
            return match binding {
                ImportBinding::Named { source, imported } => {
                    self.imported(target, source, imported, args, hops + 1)
                }
                ImportBinding::Default { source } => self.imported_default(target, source, args),
                ImportBinding::Namespace { .. } => None,
            };
        }

        if let Some((source, imported)) = target.reexports.get(export_name) {
            return self.imported(target, source, imported, args, hops + 1);
        }

        target.star_reexports.iter().find_map(|source| {
            self.imported(target, source, export_name, args.clone(), hops + 1)
        })
    }

    fn declaration_type(
        &mut self,
        file: &Rc<SourceFile>,
        decl: &SyntaxDecl,
        args: Vec<TypeId>,
    ) -> Option<TypeId> {
        let key = (file.path.clone(), decl.name.clone(), args.clone());
        if let Some(&id) = self.memo.get(&key) {
            return Some(id);
        }
        if self.depth >= MAX_INSTANTIATION_DEPTH {
            debug!(
                "Instantiation of '{}' nested deeper than {MAX_INSTANTIATION_DEPTH} levels",
                decl.name
            );
            return None;
        }

        self.depth += 1;
        let id = self.lower_declaration(file, decl, key, args);
        self.depth -= 1;
        id
    }

    fn lower_declaration(
        &mut self,
        file: &Rc<SourceFile>,
        decl: &SyntaxDecl,
        key: MemoKey,
        args: Vec<TypeId>,
    ) -> Option<TypeId> {
        match &decl.kind {
            DeclKind::Interface {
                type_params,
                extends,
                members,
            } => {
                let id = self.graph.reserve(&decl.name);
                self.memo.insert(key, id);
                let scope = self.bind(file, type_params, &args);

                let mut kind = self.members(file, &scope, members);
                for base in extends {
                    let base = self.lower(file, &scope, base);
                    kind = inherit(&*self.graph, kind, base, &decl.name);
                }

                self.graph
                    .replace(id, TypeNode::named(kind, type_name(file, decl, args)));
                Some(id)
            }
            DeclKind::Class {
                type_params,
                fields,
            } => {
                let id = self.graph.reserve(&decl.name);
                self.memo.insert(key, id);
                let scope = self.bind(file, type_params, &args);
                let kind = self.members(file, &scope, fields);
                self.graph
                    .replace(id, TypeNode::named(kind, type_name(file, decl, args)));
                Some(id)
            }
            DeclKind::TypeAlias { type_params, value } => {
                let id = self.graph.reserve(&decl.name);
                self.memo.insert(key.clone(), id);
                let scope = self.bind(file, type_params, &args);
                let value = self.lower(file, &scope, value);

                if self.graph.context() == Some(value) {
                    self.memo.insert(key, value);
                    return Some(value);
                }
                if value != id {
                    let node = if self.graph.name(value).is_some() {
                        self.graph.node(value).clone()
                    } else {
                        TypeNode::named(
                            self.graph.kind(value).clone(),
                            type_name(file, decl, args),
                        )
                    };
                    self.graph.replace(id, node);
                }
                Some(id)
            }
            DeclKind::Enum { members } => {
                let scope = Scope::new();
                let branches = self.lower_all(file, &scope, members);
                let id = self.graph.add(TypeNode::named(
                    TypeKind::Union(branches),
                    type_name(file, decl, args),
                ));
                self.memo.insert(key, id);
                Some(id)
            }
            DeclKind::Function(_) | DeclKind::Variable { .. } => None,
        }
    }

    /// Bind type parameters to arguments, falling back to defaults.
    fn bind(&mut self, file: &Rc<SourceFile>, params: &[TypeParam], args: &[TypeId]) -> Scope {
        let mut scope = Scope::new();
        for (index, param) in params.iter().enumerate() {
            let id = match (args.get(index), &param.default) {
                (Some(&arg), _) => arg,
                (None, Some(default)) => self.lower(file, &scope, default),
                (None, None) => self.graph.unresolved(param.name.clone()),
            };
            scope.insert(param.name.clone(), id);
        }
        scope
    }

    fn first_arg(&mut self, file: &Rc<SourceFile>, scope: &Scope, args: &[TypeExpr]) -> TypeId {
        match args.first() {
            Some(arg) => self.lower(file, scope, arg),
            None => self.graph.primitive(FALLBACK),
        }
    }

    /// Global types and the utility types evaluated structurally.
    fn builtin(
        &mut self,
        file: &Rc<SourceFile>,
        scope: &Scope,
        name: &str,
        args: &[TypeExpr],
        text: &str,
    ) -> Option<TypeId> {
        let id = match name {
            "Promise" | "PromiseLike" => {
                let inner = self.first_arg(file, scope, args);
                self.graph.add_kind(TypeKind::Async(inner))
            }
            "Array" | "ReadonlyArray" => {
                let element = self.first_arg(file, scope, args);
                self.graph.add_kind(TypeKind::Array(element))
            }
            "Partial" | "Required" | "Readonly" => {
                let target = self.first_arg(file, scope, args);
                match self.graph.kind(target) {
                    TypeKind::Object(object) => {
                        let mut object = object.clone();
                        for property in &mut object.properties {
                            match name {
                                "Partial" => property.optional = true,
                                "Required" => property.optional = false,
                                _ => {}
                            }
                        }
                        self.graph.add_kind(TypeKind::Object(object))
                    }
                    _ => target,
                }
            }
            "Pick" | "Omit" => {
                let (Some(target), Some(keys)) = (args.first(), args.get(1)) else {
                    return None;
                };
                let keys = literal_keys(keys)?;
                let target = self.lower(file, scope, target);
                let TypeKind::Object(object) = self.graph.kind(target) else {
                    return Some(self.graph.unresolved(text));
                };
                let keep = name == "Pick";
                let mut object = object.clone();
                object
                    .properties
                    .retain(|property| keys.contains(&property.name) == keep);
                if keep {
                    object.index = None;
                }
                self.graph.add_kind(TypeKind::Object(object))
            }
            "Record" => {
                let (Some(key), Some(value)) = (args.first(), args.get(1)) else {
                    return None;
                };
                let value = self.lower(file, scope, value);
                let object = match key {
                    TypeExpr::Predefined(key) if key == "string" || key == "number" => ObjectType {
                        properties: Vec::new(),
                        index: Some(IndexSignature {
                            key_name: "key".to_string(),
                            key: self.graph.primitive(key),
                            value,
                        }),
                    },
                    other => ObjectType::new(
                        literal_keys(other)?
                            .into_iter()
                            .map(|name| Property::required(name, value))
                            .collect(),
                    ),
                };
                self.graph.add_kind(TypeKind::Object(object))
            }
            "NonNullable" => {
                let target = self.first_arg(file, scope, args);
                match self.graph.kind(target) {
                    TypeKind::Union(branches) => {
                        let kept: Vec<TypeId> = branches
                            .iter()
                            .copied()
                            .filter(|branch| {
                                !matches!(
                                    self.graph.kind(*branch),
                                    TypeKind::Primitive(text) if text == "null" || text == "undefined"
                                )
                            })
                            .collect();
                        self.graph.add_kind(TypeKind::Union(kept))
                    }
                    _ => target,
                }
            }
            "Function" | "CallableFunction" | "NewableFunction" => {
                self.graph.add_kind(TypeKind::Callable)
            }
            _ if OPAQUE_BUILTINS.contains(&name) => self.graph.primitive(text),
            _ => return None,
        };
        Some(id)
    }
}

fn type_name(file: &SourceFile, decl: &SyntaxDecl, args: Vec<TypeId>) -> TypeName {
    TypeName::generic(decl.name.clone(), args).with_origin(file.path.clone())
}

/// Merge the members of a base type into an interface body. Own members win.
///
/// Bases that are objects or intersections of objects merge member by member;
/// any other base leaves the interface unresolved.
fn inherit(graph: &TypeGraph, kind: TypeKind, base: TypeId, interface: &str) -> TypeKind {
    match kind {
        TypeKind::Callable => TypeKind::Callable,
        _ if matches!(graph.kind(base), TypeKind::Callable) => TypeKind::Callable,
        TypeKind::Object(mut object) => {
            if merge_base(graph, &mut object, base, 0) {
                TypeKind::Object(object)
            } else {
                warn!(
                    interface,
                    base = graph.kind(base).label(),
                    "Interface extends a type without members"
                );
                TypeKind::Unresolved(format!(
                    "{interface} (extends {} {base})",
                    graph.kind(base).label()
                ))
            }
        }
        kind => kind,
    }
}

fn merge_base(graph: &TypeGraph, object: &mut ObjectType, base: TypeId, depth: usize) -> bool {
    if depth > MAX_INSTANTIATION_DEPTH {
        return false;
    }
    match graph.kind(base) {
        TypeKind::Object(inherited) => {
            for property in &inherited.properties {
                if !object.properties.iter().any(|own| own.name == property.name) {
                    object.properties.push(property.clone());
                }
            }
            if object.index.is_none() {
                object.index.clone_from(&inherited.index);
            }
            true
        }
        TypeKind::Intersection(branches) => branches
            .iter()
            .all(|branch| merge_base(graph, object, *branch, depth + 1)),
        _ => false,
    }
}

/// Signature a variable declaration is callable with, if any.
fn variable_signature<'f>(
    file: &'f SourceFile,
    annotation: Option<&'f TypeExpr>,
    value: &'f VariableValue,
) -> Option<&'f SyntaxSignature> {
    match value {
        VariableValue::Function(signature) => return Some(signature),
        VariableValue::Alias(target) => {
            let local = file.function_declaration(target).or_else(|| {
                file.declarations.iter().find_map(|decl| match &decl.kind {
                    DeclKind::Variable {
                        value: VariableValue::Function(signature),
                        ..
                    } if decl.name == *target => Some(signature),
                    _ => None,
                })
            });
            if local.is_some() {
                return local;
            }
        }
        VariableValue::Other => {}
    }

    match annotation {
        Some(TypeExpr::Function(Some(signature))) => Some(signature),
        _ => None,
    }
}

/// Property names named by a literal key type: `"a"` or `"a" | "b"`.
fn literal_keys(expr: &TypeExpr) -> Option<Vec<String>> {
    match expr {
        TypeExpr::Literal(text) => Some(vec![text.trim_matches('"').to_string()]),
        TypeExpr::Union(branches) => branches
            .iter()
            .map(literal_keys)
            .collect::<Option<Vec<_>>>()
            .map(|keys| keys.concat()),
        _ => None,
    }
}

/// File a relative module specifier points at, trying TypeScript extensions.
/// Package imports are not followed.
pub(super) fn resolve_module(from: &Path, specifier: &str) -> Option<PathBuf> {
    if !(specifier.starts_with("./") || specifier.starts_with("../")) {
        return None;
    }
    let base = normalize_path(&from.parent()?.join(specifier));
    let base = base.to_string_lossy();

    let mut candidates = Vec::new();
    for extension in [".js", ".jsx", ".mjs"] {
        if let Some(stem) = base.strip_suffix(extension) {
            candidates.push(format!("{stem}.ts"));
            candidates.push(format!("{stem}.tsx"));
            candidates.push(format!("{stem}.d.ts"));
        }
    }
    if base.ends_with(".ts") || base.ends_with(".tsx") {
        candidates.push(base.to_string());
    }
    for suffix in [".ts", ".tsx", ".d.ts", "/index.ts", "/index.tsx", "/index.d.ts"] {
        candidates.push(format!("{base}{suffix}"));
    }

    candidates
        .into_iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.is_file())
}

/// Lexically remove `.` and `..` components.
pub(super) fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/app/src/./api/../models/user.ts")),
            PathBuf::from("/app/src/models/user.ts")
        );
        assert_eq!(normalize_path(Path::new("../x")), PathBuf::from("../x"));
    }

    #[test]
    fn test_resolve_module_candidates() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/models")).unwrap();
        fs::write(dir.path().join("src/models/index.ts"), "").unwrap();
        fs::write(dir.path().join("src/shared.ts"), "").unwrap();
        let from = dir.path().join("src/users.api.ts");

        assert_eq!(
            resolve_module(&from, "./models"),
            Some(dir.path().join("src/models/index.ts"))
        );
        assert_eq!(
            resolve_module(&from, "./shared.js"),
            Some(dir.path().join("src/shared.ts"))
        );
        assert_eq!(resolve_module(&from, "./missing"), None);
        assert_eq!(resolve_module(&from, "zod"), None);
    }

    #[test]
    fn test_literal_keys() {
        let keys = TypeExpr::Union(vec![
            TypeExpr::Literal("\"id\"".into()),
            TypeExpr::Literal("\"name\"".into()),
        ]);
        assert_eq!(literal_keys(&keys), Some(vec!["id".to_string(), "name".to_string()]));
        assert_eq!(literal_keys(&TypeExpr::Predefined("string".into())), None);
    }

    #[test]
    fn test_inherit_keeps_own_members_first() {
        let mut graph = TypeGraph::new();
        let string = graph.primitive("string");
        let number = graph.primitive("number");
        let own = TypeKind::Object(ObjectType::new(vec![Property::required("id", string)]));
        let base = graph.add_kind(TypeKind::Object(ObjectType::new(vec![
            Property::required("id", number),
            Property::required("createdAt", number),
        ])));

        let TypeKind::Object(merged) = inherit(&graph, own, base, "Audited") else {
            unreachable!("objects merge into an object");
        };
        let names: Vec<_> = merged.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["id", "createdAt"]);
        assert_eq!(merged.properties[0].ty, string);
    }

    #[test]
    fn test_inherit_merges_intersection_bases() {
        let mut graph = TypeGraph::new();
        let string = graph.primitive("string");
        let number = graph.primitive("number");
        let left = graph.add_kind(TypeKind::Object(ObjectType::new(vec![Property::required(
            "a", string,
        )])));
        let right = graph.add_kind(TypeKind::Object(ObjectType::new(vec![Property::required(
            "b", number,
        )])));
        let base = graph.add_kind(TypeKind::Intersection(vec![left, right]));
        let own = TypeKind::Object(ObjectType::new(vec![Property::required("c", number)]));

        let TypeKind::Object(merged) = inherit(&graph, own, base, "X") else {
            unreachable!("an intersection of objects merges into an object");
        };
        let names: Vec<_> = merged.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["c", "a", "b"]);
    }

    #[test]
    fn test_inherit_from_shapeless_base_is_unresolved() {
        let mut graph = TypeGraph::new();
        let string = graph.primitive("string");
        let number = graph.primitive("number");
        let base = graph.add_kind(TypeKind::Union(vec![string, number]));
        let own = TypeKind::Object(ObjectType::new(vec![Property::required("c", number)]));

        let kind = inherit(&graph, own, base, "X");
        assert!(matches!(kind, TypeKind::Unresolved(text) if text.starts_with("X (extends union")));
    }
}
