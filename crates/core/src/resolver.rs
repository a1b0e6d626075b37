//! Type flattening.
//!
//! [`TypeResolver::resolve`] turns a node of the [`TypeGraph`] into canonical
//! TypeScript text. Named shapes are stored once in a [`NamedTypeTable`] and
//! referenced by identity afterwards; anonymous shapes are inlined.
//!
//! Branches are tried in a fixed order, first match wins:
//! memo, cycle guard, depth guard, leaf, literal, async wrapper, array, union,
//! intersection, tuple, callable, object, fallback.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::model::{IndexSignature, ObjectType, Property, TypeGraph, TypeId, TypeKind};
use crate::contract::utils::{identifier_fragment, quote_if_needed};

/// Universal fallback substituted when a type cannot or must not be expanded.
pub const FALLBACK: &str = "any";

/// Maximum number of nested resolutions before giving up.
pub const MAX_DEPTH: usize = 20;

/// Name of the asynchronous-result wrapper in generated code.
pub const ASYNC_WRAPPER: &str = "Promise";

pub const NEVER: &str = "never";
pub const UNDEFINED: &str = "undefined";

/// Why the resolver substituted something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    Cycle,
    DepthExceeded,
    Callable,
    Unrecognized,
    NameCollision,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiagnosticKind::Cycle => "cycle",
            DiagnosticKind::DepthExceeded => "depth",
            DiagnosticKind::Callable => "callable",
            DiagnosticKind::Unrecognized => "unrecognized",
            DiagnosticKind::NameCollision => "name-collision",
        };
        f.write_str(label)
    }
}

/// A recovered resolution problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Run-scoped registry of flattened named types, in insertion order.
///
/// Entries are never overwritten: the first resolution of an identity wins.
#[derive(Debug, Clone, Default)]
pub struct NamedTypeTable {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
    origins: HashMap<String, PathBuf>,
}

impl NamedTypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identity: &str) -> Option<&str> {
        self.index
            .get(identity)
            .map(|&i| self.entries[i].1.as_str())
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.index.contains_key(identity)
    }

    /// Insert a definition unless the identity is already taken.
    ///
    /// Returns `true` when the entry was added.
    pub fn insert(
        &mut self,
        identity: &str,
        definition: impl Into<String>,
        origin: Option<&Path>,
    ) -> bool {
        if self.index.contains_key(identity) {
            return false;
        }
        self.index.insert(identity.to_string(), self.entries.len());
        self.entries.push((identity.to_string(), definition.into()));
        if let Some(origin) = origin {
            self.origins.insert(identity.to_string(), origin.to_path_buf());
        }
        true
    }

    /// Copy of the table with one identity left out.
    pub fn without(&self, identity: &str) -> Self {
        let mut copy = Self::new();
        for (name, definition) in &self.entries {
            if name != identity {
                copy.insert(name, definition.as_str(), self.origin(name));
            }
        }
        copy
    }

    pub fn origin(&self, identity: &str) -> Option<&Path> {
        self.origins.get(identity).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(identity, definition)| (identity.as_str(), definition.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Flattens types of one graph, accumulating diagnostics.
#[derive(Debug)]
pub struct TypeResolver<'g> {
    graph: &'g TypeGraph,
    stack: Vec<TypeId>,
    diagnostics: Vec<Diagnostic>,
    /// Node that first registered each identity
    owners: HashMap<String, TypeId>,
    /// Nodes already compared against the owner of their identity
    compared: HashSet<TypeId>,
}

impl<'g> TypeResolver<'g> {
    pub fn new(graph: &'g TypeGraph) -> Self {
        Self {
            graph,
            stack: Vec::new(),
            diagnostics: Vec::new(),
            owners: HashMap::new(),
            compared: HashSet::new(),
        }
    }

    /// Resolve `ty` to canonical text, registering named shapes in `table`.
    pub fn resolve(&mut self, ty: TypeId, table: &mut NamedTypeTable) -> String {
        self.resolve_type(ty, table)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn resolve_type(&mut self, ty: TypeId, table: &mut NamedTypeTable) -> String {
        let identity = self.identity(ty, 0);

        if let Some(identity) = &identity {
            if table.contains(identity) {
                self.check_collision(ty, identity, table);
                return identity.clone();
            }
        }

        if self.stack.contains(&ty) {
            self.diagnose(
                DiagnosticKind::Cycle,
                format!(
                    "type {} is recursive; substituting '{FALLBACK}'",
                    self.describe(ty, identity.as_deref())
                ),
            );
            return FALLBACK.to_string();
        }

        if self.stack.len() > MAX_DEPTH {
            self.diagnose(
                DiagnosticKind::DepthExceeded,
                format!(
                    "type {} is nested deeper than {MAX_DEPTH} levels; substituting '{FALLBACK}'",
                    self.describe(ty, identity.as_deref())
                ),
            );
            return FALLBACK.to_string();
        }

        self.stack.push(ty);
        let text = self.resolve_shape(ty, identity, table);
        self.stack.pop();
        text
    }

    fn resolve_shape(
        &mut self,
        ty: TypeId,
        identity: Option<String>,
        table: &mut NamedTypeTable,
    ) -> String {
        let graph = self.graph;
        match graph.kind(ty) {
            TypeKind::Primitive(text) | TypeKind::Literal(text) => text.clone(),
            TypeKind::Async(inner) => {
                let inner = self.resolve_type(*inner, table);
                format!("{ASYNC_WRAPPER}<{inner}>")
            }
            TypeKind::Array(element) => {
                let element = self.resolve_type(*element, table);
                if element == NEVER || element == UNDEFINED {
                    return element;
                }
                let text = if has_top_level_operator(&element) {
                    format!("({element})[]")
                } else {
                    format!("{element}[]")
                };
                self.register(ty, identity, text, table)
            }
            TypeKind::Union(branches) => {
                let parts = self.resolve_branches(branches, table);
                if parts.is_empty() {
                    return NEVER.to_string();
                }
                self.register(ty, identity, parts.join(" | "), table)
            }
            TypeKind::Intersection(branches) => {
                let parts: Vec<String> = self
                    .resolve_branches(branches, table)
                    .into_iter()
                    .map(|part| {
                        if has_top_level_operator(&part) {
                            format!("({part})")
                        } else {
                            part
                        }
                    })
                    .collect();
                if parts.is_empty() {
                    return NEVER.to_string();
                }
                self.register(ty, identity, parts.join(" & "), table)
            }
            TypeKind::Tuple(elements) => {
                let parts: Vec<String> = elements
                    .iter()
                    .map(|element| self.resolve_type(*element, table))
                    .collect();
                self.register(ty, identity, format!("[{}]", parts.join(", ")), table)
            }
            TypeKind::Callable => {
                self.diagnose(
                    DiagnosticKind::Callable,
                    format!(
                        "function type {} cannot be serialized; substituting '{UNDEFINED}'",
                        self.describe(ty, identity.as_deref())
                    ),
                );
                UNDEFINED.to_string()
            }
            TypeKind::Object(object) => match self.resolve_object(object, table) {
                Some(text) => self.register(ty, identity, text, table),
                None => UNDEFINED.to_string(),
            },
            TypeKind::Unresolved(text) => {
                self.diagnose(
                    DiagnosticKind::Unrecognized,
                    format!("unrecognized type '{text}'; substituting '{FALLBACK}'"),
                );
                FALLBACK.to_string()
            }
        }
    }

    fn resolve_branches(&mut self, branches: &[TypeId], table: &mut NamedTypeTable) -> Vec<String> {
        branches
            .iter()
            .map(|branch| self.resolve_type(*branch, table))
            .filter(|text| text != NEVER)
            .collect()
    }

    /// Render an object shape, or `None` when nothing serializable is left.
    fn resolve_object(&mut self, object: &ObjectType, table: &mut NamedTypeTable) -> Option<String> {
        let mut members = Vec::new();

        for Property { name, ty, optional } in &object.properties {
            let text = self.resolve_type(*ty, table);
            if text == UNDEFINED {
                continue;
            }
            let marker = if *optional { "?" } else { "" };
            members.push(format!("{}{marker}: {text}", quote_if_needed(name)));
        }

        if let Some(IndexSignature {
            key_name,
            key,
            value,
        }) = &object.index
        {
            let value = self.resolve_type(*value, table);
            if value != UNDEFINED {
                let key = self.resolve_type(*key, table);
                members.push(format!("[{key_name}: {key}]: {value}"));
            }
        }

        if members.is_empty() {
            return None;
        }
        Some(format!("{{ {} }}", members.join("; ")))
    }

    /// Store `text` under the identity of `ty` when it has one.
    fn register(
        &mut self,
        ty: TypeId,
        identity: Option<String>,
        text: String,
        table: &mut NamedTypeTable,
    ) -> String {
        match identity {
            Some(identity) => {
                let graph = self.graph;
                let origin = graph.name(ty).and_then(|name| name.origin.as_deref());
                if table.insert(&identity, text, origin) {
                    self.owners.insert(identity.clone(), ty);
                } else {
                    self.check_collision(ty, &identity, table);
                }
                identity
            }
            None => text,
        }
    }

    /// Canonical table identity of `ty`, if it has a traceable name.
    ///
    /// Generic instantiations append one fragment per argument, so
    /// `Page<Page<User>>` and `Page<User>` get distinct identities.
    fn identity(&mut self, ty: TypeId, depth: usize) -> Option<String> {
        let graph = self.graph;
        let name = graph.name(ty)?;
        if name.args.is_empty() {
            return Some(name.declaration.clone());
        }
        if depth > MAX_DEPTH {
            return None;
        }

        let mut parts = vec![name.declaration.clone()];
        for &arg in &name.args {
            let fragment = self.fragment(arg, depth + 1);
            parts.push(fragment);
        }
        Some(parts.join("_"))
    }

    /// Identifier fragment standing for a generic argument.
    ///
    /// Operators and literals are spelled out so that `A | B` and `A & B`,
    /// or `null` and `"null"`, produce different fragments.
    fn fragment(&mut self, ty: TypeId, depth: usize) -> String {
        if let Some(identity) = self.identity(ty, depth) {
            return identity;
        }
        if depth > MAX_DEPTH {
            return FALLBACK.to_string();
        }

        let graph = self.graph;
        match graph.kind(ty) {
            TypeKind::Primitive(text) => identifier_fragment(text),
            TypeKind::Literal(text) => format!("Lit_{}", literal_fragment(text)),
            TypeKind::Array(element) => {
                let element_fragment = self.fragment(*element, depth + 1);
                if matches!(
                    graph.kind(*element),
                    TypeKind::Union(_) | TypeKind::Intersection(_)
                ) && graph.name(*element).is_none()
                {
                    format!("{element_fragment}_Array")
                } else {
                    format!("{element_fragment}Array")
                }
            }
            TypeKind::Union(branches) => self.joined_fragment(branches, "Or", depth),
            TypeKind::Intersection(branches) => self.joined_fragment(branches, "And", depth),
            TypeKind::Tuple(elements) => {
                let inner = self.joined_fragment(elements, "_", depth);
                format!("Tuple_{inner}")
            }
            TypeKind::Async(inner) => {
                let inner = self.fragment(*inner, depth + 1);
                format!("{ASYNC_WRAPPER}_{inner}")
            }
            TypeKind::Callable => "Function".to_string(),
            TypeKind::Object(_) | TypeKind::Unresolved(_) => {
                let mut scratch = NamedTypeTable::new();
                identifier_fragment(&self.resolve_type(ty, &mut scratch))
            }
        }
    }

    fn joined_fragment(&mut self, members: &[TypeId], separator: &str, depth: usize) -> String {
        members
            .iter()
            .map(|member| self.fragment(*member, depth + 1))
            .collect::<Vec<_>>()
            .join(separator)
    }

    fn check_collision(&mut self, ty: TypeId, identity: &str, table: &NamedTypeTable) {
        let graph = self.graph;
        let origin = graph.name(ty).and_then(|name| name.origin.as_deref());
        if let (Some(origin), Some(registered)) = (origin, table.origin(identity)) {
            if origin != registered {
                self.diagnose(
                    DiagnosticKind::NameCollision,
                    format!(
                        "'{identity}' is declared in both {} and {}; keeping the first",
                        registered.display(),
                        origin.display()
                    ),
                );
                return;
            }
        }

        if self.owners.get(identity).is_none_or(|owner| *owner == ty) || !self.compared.insert(ty)
        {
            return;
        }
        if self.stack.contains(&ty) {
            return;
        }
        // flatten again with the identity unregistered, then compare definitions
        let mut scratch = table.without(identity);
        let recorded = self.diagnostics.len();
        self.stack.push(ty);
        let text = self.resolve_shape(ty, None, &mut scratch);
        self.stack.pop();
        self.diagnostics.truncate(recorded);

        if let Some(existing) = table.get(identity).filter(|existing| *existing != text) {
            self.diagnose(
                DiagnosticKind::NameCollision,
                format!(
                    "'{identity}' names two different shapes ('{existing}' and '{text}'); keeping the first"
                ),
            );
        }
    }

    fn describe(&self, ty: TypeId, identity: Option<&str>) -> String {
        match identity {
            Some(identity) => format!("'{identity}'"),
            None => format!("{} {ty}", self.graph.kind(ty).label()),
        }
    }

    fn diagnose(&mut self, kind: DiagnosticKind, message: String) {
        let diagnostic = Diagnostic { kind, message };
        if self.diagnostics.contains(&diagnostic) {
            return;
        }
        warn!(kind = %kind, "{}", diagnostic.message);
        self.diagnostics.push(diagnostic);
    }
}

/// Fragment for rendered literal text: quotes dropped, sign and point spelled out.
fn literal_fragment(text: &str) -> String {
    let spelled = text.replace('-', "Neg").replace('.', "Dot");
    identifier_fragment(&spelled)
}

/// Whether `text` has a `|` or `&` outside any brackets or string literals.
fn has_top_level_operator(text: &str) -> bool {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in text.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => depth = depth.saturating_sub(1),
            '|' | '&' if depth == 0 => return true,
            _ => {}
        }
    }
    false
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::model::{TypeName, TypeNode};

    fn object(props: &[(&str, TypeId)]) -> TypeKind {
        TypeKind::Object(ObjectType::new(
            props
                .iter()
                .map(|(name, ty)| Property::required(*name, *ty))
                .collect(),
        ))
    }

    fn resolve(graph: &TypeGraph, ty: TypeId) -> (String, NamedTypeTable, Vec<Diagnostic>) {
        let mut table = NamedTypeTable::new();
        let mut resolver = TypeResolver::new(graph);
        let text = resolver.resolve(ty, &mut table);
        (text, table, resolver.into_diagnostics())
    }

    #[test]
    fn test_primitives_resolve_verbatim_and_are_not_registered() {
        let mut graph = TypeGraph::new();
        let string = graph.primitive("string");
        let date = graph.primitive("Date");

        let (text, table, _) = resolve(&graph, string);
        assert_eq!(text, "string");
        assert!(table.is_empty());

        let (text, _, _) = resolve(&graph, date);
        assert_eq!(text, "Date");
    }

    #[test]
    fn test_literal_resolves_to_its_value() {
        let mut graph = TypeGraph::new();
        let lit = graph.literal("\"active\"");
        let num = graph.literal("42");
        assert_eq!(resolve(&graph, lit).0, "\"active\"");
        assert_eq!(resolve(&graph, num).0, "42");
    }

    #[test]
    fn test_named_object_is_registered_and_referenced_by_name() {
        let mut graph = TypeGraph::new();
        let string = graph.primitive("string");
        let number = graph.primitive("number");
        let kind = object(&[("name", string), ("value", number)]);
        let user = graph.add(TypeNode::named(kind, TypeName::plain("User")));

        let (text, table, diagnostics) = resolve(&graph, user);
        assert_eq!(text, "User");
        assert_eq!(table.get("User"), Some("{ name: string; value: number }"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_anonymous_object_is_inlined() {
        let mut graph = TypeGraph::new();
        let string = graph.primitive("string");
        let kind = object(&[("first-name", string)]);
        let shape = graph.add_kind(kind);

        let (text, table, _) = resolve(&graph, shape);
        assert_eq!(text, "{ \"first-name\": string }");
        assert!(table.is_empty());
    }

    #[test]
    fn test_direct_cycle_terminates_with_fallback() {
        let mut graph = TypeGraph::new();
        let node = graph.reserve("Node");
        let kind = object(&[("next", node)]);
        graph.replace(node, TypeNode::named(kind, TypeName::plain("Node")));

        let (text, table, diagnostics) = resolve(&graph, node);
        assert_eq!(text, "Node");
        assert_eq!(table.get("Node"), Some("{ next: any }"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::Cycle);
    }

    #[test]
    fn test_indirect_anonymous_cycle_is_caught_by_identity() {
        let mut graph = TypeGraph::new();
        let a = graph.reserve("a");
        let b = graph.reserve("b");
        let a_kind = object(&[("b", b)]);
        let b_kind = object(&[("a", a)]);
        graph.replace(a, TypeNode::anonymous(a_kind));
        graph.replace(b, TypeNode::anonymous(b_kind));

        let (text, _, diagnostics) = resolve(&graph, a);
        assert_eq!(text, "{ b: { a: any } }");
        assert!(diagnostics.iter().any(|d| d.kind == DiagnosticKind::Cycle));
    }

    #[test]
    fn test_cycle_through_array_yields_fallback_element() {
        let mut graph = TypeGraph::new();
        let tree = graph.reserve("Tree");
        let children = graph.add_kind(TypeKind::Array(tree));
        let kind = object(&[("children", children)]);
        graph.replace(tree, TypeNode::named(kind, TypeName::plain("Tree")));

        let (_, table, _) = resolve(&graph, tree);
        assert_eq!(table.get("Tree"), Some("{ children: any[] }"));
    }

    #[test]
    fn test_depth_guard_stops_deep_nesting() {
        let mut graph = TypeGraph::new();
        let mut inner = graph.primitive("string");
        for _ in 0..30 {
            let kind = object(&[("inner", inner)]);
            inner = graph.add_kind(kind);
        }

        let (text, _, diagnostics) = resolve(&graph, inner);
        assert!(text.contains(FALLBACK));
        assert!(!text.contains("string"));
        assert!(
            diagnostics
                .iter()
                .any(|d| d.kind == DiagnosticKind::DepthExceeded)
        );
    }

    #[test]
    fn test_object_with_only_callable_property_is_undefined() {
        let mut graph = TypeGraph::new();
        let callback = graph.add_kind(TypeKind::Callable);
        let kind = object(&[("onChange", callback)]);
        let shape = graph.add(TypeNode::named(kind, TypeName::plain("Handlers")));

        let (text, table, diagnostics) = resolve(&graph, shape);
        assert_eq!(text, UNDEFINED);
        assert!(table.is_empty());
        assert_eq!(diagnostics[0].kind, DiagnosticKind::Callable);
    }

    #[test]
    fn test_callable_property_is_dropped_from_shape() {
        let mut graph = TypeGraph::new();
        let string = graph.primitive("string");
        let method = graph.add_kind(TypeKind::Callable);
        let kind = object(&[("id", string), ("save", method)]);
        let shape = graph.add_kind(kind);

        assert_eq!(resolve(&graph, shape).0, "{ id: string }");
    }

    #[test]
    fn test_array_of_never_is_never() {
        let mut graph = TypeGraph::new();
        let never = graph.primitive("never");
        let array = graph.add_kind(TypeKind::Array(never));
        assert_eq!(resolve(&graph, array).0, NEVER);
    }

    #[test]
    fn test_array_of_union_is_parenthesized() {
        let mut graph = TypeGraph::new();
        let string = graph.primitive("string");
        let null = graph.primitive("null");
        let union = graph.add_kind(TypeKind::Union(vec![string, null]));
        let array = graph.add_kind(TypeKind::Array(union));
        assert_eq!(resolve(&graph, array).0, "(string | null)[]");
    }

    #[test]
    fn test_union_drops_never_branches() {
        let mut graph = TypeGraph::new();
        let never = graph.primitive("never");
        let string = graph.primitive("string");
        let union = graph.add_kind(TypeKind::Union(vec![never, string]));
        assert_eq!(resolve(&graph, union).0, "string");

        let empty = graph.add_kind(TypeKind::Union(vec![never, never]));
        assert_eq!(resolve(&graph, empty).0, NEVER);
    }

    #[test]
    fn test_intersection_of_only_never_is_never() {
        let mut graph = TypeGraph::new();
        let never = graph.primitive("never");
        let both = graph.add_kind(TypeKind::Intersection(vec![never, never]));
        assert_eq!(resolve(&graph, both).0, NEVER);
    }

    #[test]
    fn test_array_of_undefined_propagates_undefined() {
        let mut graph = TypeGraph::new();
        let undefined = graph.primitive("undefined");
        let array = graph.add_kind(TypeKind::Array(undefined));
        assert_eq!(resolve(&graph, array).0, UNDEFINED);

        let callback = graph.add_kind(TypeKind::Callable);
        let callbacks = graph.add_kind(TypeKind::Array(callback));
        assert_eq!(resolve(&graph, callbacks).0, UNDEFINED);
    }

    #[test]
    fn test_intersection_wraps_union_members() {
        let mut graph = TypeGraph::new();
        let a = graph.literal("\"a\"");
        let b = graph.literal("\"b\"");
        let union = graph.add_kind(TypeKind::Union(vec![a, b]));
        let string = graph.primitive("string");
        let kind = object(&[("h", string)]);
        let shape = graph.add_kind(kind);
        let both = graph.add_kind(TypeKind::Intersection(vec![union, shape]));
        assert_eq!(resolve(&graph, both).0, "(\"a\" | \"b\") & { h: string }");
    }

    #[test]
    fn test_tuple_preserves_order() {
        let mut graph = TypeGraph::new();
        let number = graph.primitive("number");
        let string = graph.primitive("string");
        let tuple = graph.add_kind(TypeKind::Tuple(vec![number, string, number]));
        assert_eq!(resolve(&graph, tuple).0, "[number, string, number]");
    }

    #[test]
    fn test_async_wrapper_recurses_without_registering() {
        let mut graph = TypeGraph::new();
        let string = graph.primitive("string");
        let kind = object(&[("name", string)]);
        let user = graph.add(TypeNode::named(kind, TypeName::plain("User")));
        let promise = graph.add_kind(TypeKind::Async(user));

        let (text, table, _) = resolve(&graph, promise);
        assert_eq!(text, "Promise<User>");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_nested_generic_instantiations_get_distinct_names() {
        let mut graph = TypeGraph::new();
        let string = graph.primitive("string");
        let leaf_kind = object(&[("id", string)]);
        let leaf = graph.add(TypeNode::named(leaf_kind, TypeName::plain("Leaf")));

        let inner_kind = object(&[("name", string), ("value", leaf)]);
        let inner = graph.add(TypeNode::named(
            inner_kind,
            TypeName::generic("Wrapper", vec![leaf]),
        ));
        let outer_kind = object(&[("name", string), ("value", inner)]);
        let outer = graph.add(TypeNode::named(
            outer_kind,
            TypeName::generic("Wrapper", vec![inner]),
        ));

        let (text, table, _) = resolve(&graph, outer);
        assert_eq!(text, "Wrapper_Wrapper_Leaf");
        assert_eq!(
            table.get("Wrapper_Wrapper_Leaf"),
            Some("{ name: string; value: Wrapper_Leaf }")
        );
        assert_eq!(
            table.get("Wrapper_Leaf"),
            Some("{ name: string; value: Leaf }")
        );
        assert_eq!(table.get("Leaf"), Some("{ id: string }"));
    }

    #[test]
    fn test_generic_over_anonymous_argument_uses_sanitized_fragment() {
        let mut graph = TypeGraph::new();
        let number = graph.primitive("number");
        let array = graph.add_kind(TypeKind::Array(number));
        let kind = object(&[("value", array)]);
        let boxed = graph.add(TypeNode::named(kind, TypeName::generic("Box", vec![array])));

        let (text, table, _) = resolve(&graph, boxed);
        assert_eq!(text, "Box_numberArray");
        assert_eq!(table.get("Box_numberArray"), Some("{ value: number[] }"));
    }

    #[test]
    fn test_generic_arguments_keep_operators_and_literals_apart() {
        let mut graph = TypeGraph::new();
        let string = graph.primitive("string");
        let number = graph.primitive("number");
        let a_kind = object(&[("x", string)]);
        let a = graph.add(TypeNode::named(a_kind, TypeName::plain("A")));
        let b_kind = object(&[("y", number)]);
        let b = graph.add(TypeNode::named(b_kind, TypeName::plain("B")));
        let either = graph.add_kind(TypeKind::Union(vec![a, b]));
        let both = graph.add_kind(TypeKind::Intersection(vec![a, b]));
        let null = graph.primitive("null");
        let quoted = graph.literal("\"null\"");

        fn boxed(graph: &mut TypeGraph, arg: TypeId) -> TypeId {
            let kind = object(&[("value", arg)]);
            graph.add(TypeNode::named(kind, TypeName::generic("Box", vec![arg])))
        }
        let params = [
            boxed(&mut graph, either),
            boxed(&mut graph, both),
            boxed(&mut graph, null),
            boxed(&mut graph, quoted),
        ];

        let mut table = NamedTypeTable::new();
        let mut resolver = TypeResolver::new(&graph);
        let names: Vec<String> = params
            .iter()
            .map(|param| resolver.resolve(*param, &mut table))
            .collect();

        assert_eq!(names, ["Box_AOrB", "Box_AAndB", "Box_null", "Box_Lit_null"]);
        assert_eq!(table.get("Box_AOrB"), Some("{ value: A | B }"));
        assert_eq!(table.get("Box_AAndB"), Some("{ value: A & B }"));
        assert_eq!(table.get("Box_null"), Some("{ value: null }"));
        assert_eq!(table.get("Box_Lit_null"), Some("{ value: \"null\" }"));
        assert!(resolver.diagnostics().is_empty());
    }

    #[test]
    fn test_array_of_anonymous_union_fragment_differs_from_union_with_array() {
        let mut graph = TypeGraph::new();
        let string = graph.primitive("string");
        let number = graph.primitive("number");
        let union = graph.add_kind(TypeKind::Union(vec![string, number]));
        let union_array = graph.add_kind(TypeKind::Array(union));
        let numbers = graph.add_kind(TypeKind::Array(number));
        let mixed = graph.add_kind(TypeKind::Union(vec![string, numbers]));

        let mut resolver = TypeResolver::new(&graph);
        assert_eq!(resolver.fragment(union_array, 0), "stringOrnumber_Array");
        assert_eq!(resolver.fragment(mixed, 0), "stringOrnumberArray");
    }

    #[test]
    fn test_equal_shapes_under_one_identity_are_not_reported() {
        let mut graph = TypeGraph::new();
        let string = graph.primitive("string");
        let null = graph.primitive("null");
        let first_arg = graph.add_kind(TypeKind::Union(vec![string, null]));
        let second_arg = graph.add_kind(TypeKind::Union(vec![string, null]));
        let first_kind = object(&[("value", first_arg)]);
        let first = graph.add(TypeNode::named(first_kind, TypeName::generic("Box", vec![first_arg])));
        let second_kind = object(&[("value", second_arg)]);
        let second = graph.add(TypeNode::named(
            second_kind,
            TypeName::generic("Box", vec![second_arg]),
        ));

        let mut table = NamedTypeTable::new();
        let mut resolver = TypeResolver::new(&graph);
        assert_eq!(resolver.resolve(first, &mut table), "Box_stringOrnull");
        assert_eq!(resolver.resolve(second, &mut table), "Box_stringOrnull");
        assert_eq!(table.len(), 1);
        assert!(resolver.diagnostics().is_empty());
    }

    #[test]
    fn test_first_registration_wins() {
        let mut graph = TypeGraph::new();
        let string = graph.primitive("string");
        let number = graph.primitive("number");
        let first_kind = object(&[("a", string)]);
        let second_kind = object(&[("b", number)]);
        let first = graph.add(TypeNode::named(first_kind, TypeName::plain("Item")));
        let second = graph.add(TypeNode::named(second_kind, TypeName::plain("Item")));

        let mut table = NamedTypeTable::new();
        let mut resolver = TypeResolver::new(&graph);
        assert_eq!(resolver.resolve(first, &mut table), "Item");
        assert_eq!(resolver.resolve(second, &mut table), "Item");
        assert_eq!(table.get("Item"), Some("{ a: string }"));
        assert_eq!(resolver.diagnostics().len(), 1);
        assert_eq!(resolver.diagnostics()[0].kind, DiagnosticKind::NameCollision);
        assert!(resolver.diagnostics()[0].message.contains("{ b: number }"));
    }

    #[test]
    fn test_name_collision_across_files_is_diagnosed() {
        let mut graph = TypeGraph::new();
        let string = graph.primitive("string");
        let first_kind = object(&[("a", string)]);
        let second_kind = object(&[("b", string)]);
        let first = graph.add(TypeNode::named(
            first_kind,
            TypeName::plain("Item").with_origin("a.api.ts"),
        ));
        let second = graph.add(TypeNode::named(
            second_kind,
            TypeName::plain("Item").with_origin("b.api.ts"),
        ));

        let mut table = NamedTypeTable::new();
        let mut resolver = TypeResolver::new(&graph);
        resolver.resolve(first, &mut table);
        resolver.resolve(second, &mut table);
        assert!(
            resolver
                .diagnostics()
                .iter()
                .any(|d| d.kind == DiagnosticKind::NameCollision)
        );
    }

    #[test]
    fn test_unresolved_falls_back_with_diagnostic() {
        let mut graph = TypeGraph::new();
        let unknown = graph.unresolved("keyof Foo");
        let (text, _, diagnostics) = resolve(&graph, unknown);
        assert_eq!(text, FALLBACK);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::Unrecognized);
        assert!(diagnostics[0].message.contains("keyof Foo"));
    }

    #[test]
    fn test_optional_properties_and_index_signature() {
        let mut graph = TypeGraph::new();
        let string = graph.primitive("string");
        let number = graph.primitive("number");
        let shape = graph.add_kind(TypeKind::Object(ObjectType {
            properties: vec![Property::optional("label", string)],
            index: Some(IndexSignature {
                key_name: "key".into(),
                key: string,
                value: number,
            }),
        }));
        assert_eq!(
            resolve(&graph, shape).0,
            "{ label?: string; [key: string]: number }"
        );
    }

    #[test]
    fn test_has_top_level_operator() {
        assert!(has_top_level_operator("string | null"));
        assert!(has_top_level_operator("A & B"));
        assert!(!has_top_level_operator("{ a: string | null }"));
        assert!(!has_top_level_operator("Promise<A | B>"));
        assert!(!has_top_level_operator("\"a|b\""));
    }
}
