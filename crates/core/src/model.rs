//! Type graph and contract data model shared by every pipeline stage.
//!
//! The host front end lowers declared types into a [`TypeGraph`]: an arena of
//! [`TypeNode`]s addressed by [`TypeId`]. Nodes reference each other by id, so
//! recursive declarations become literal cycles in the graph. The resolver
//! detects those by id, never by rendered text.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Handle of a node in a [`TypeGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Structural shape of a declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// Leaf rendered verbatim: `string`, `number`, `never`, `Date`, ...
    Primitive(String),
    /// Literal value, already rendered: `"active"`, `42`, `true`
    Literal(String),
    /// `T[]`
    Array(TypeId),
    /// `[A, B]`
    Tuple(Vec<TypeId>),
    /// `A | B`
    Union(Vec<TypeId>),
    /// `A & B`
    Intersection(Vec<TypeId>),
    /// Property map
    Object(ObjectType),
    /// Asynchronous-result wrapper (`Promise<T>`)
    Async(TypeId),
    /// Function-valued type; cannot cross the wire
    Callable,
    /// Shape the host could not model; carries the source text
    Unresolved(String),
}

impl TypeKind {
    /// Short label used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            TypeKind::Primitive(_) => "primitive",
            TypeKind::Literal(_) => "literal",
            TypeKind::Array(_) => "array",
            TypeKind::Tuple(_) => "tuple",
            TypeKind::Union(_) => "union",
            TypeKind::Intersection(_) => "intersection",
            TypeKind::Object(_) => "object",
            TypeKind::Async(_) => "async",
            TypeKind::Callable => "callable",
            TypeKind::Unresolved(_) => "unresolved",
        }
    }
}

/// Object shape: ordered properties plus an optional index signature.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectType {
    pub properties: Vec<Property>,
    pub index: Option<IndexSignature>,
}

impl ObjectType {
    pub fn new(properties: Vec<Property>) -> Self {
        Self {
            properties,
            index: None,
        }
    }
}

/// A named member of an object shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub ty: TypeId,
    pub optional: bool,
}

impl Property {
    pub fn required(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
        }
    }

    pub fn optional(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: true,
        }
    }
}

/// `[key: K]: V`
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSignature {
    pub key_name: String,
    pub key: TypeId,
    pub value: TypeId,
}

/// Declaration linkage of a type: where its name comes from.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeName {
    /// Declared name (`User`, `Page`)
    pub declaration: String,
    /// Generic arguments of this instantiation, in order
    pub args: Vec<TypeId>,
    /// File the declaration lives in, when known
    pub origin: Option<PathBuf>,
}

impl TypeName {
    pub fn plain(declaration: impl Into<String>) -> Self {
        Self {
            declaration: declaration.into(),
            args: Vec::new(),
            origin: None,
        }
    }

    pub fn generic(declaration: impl Into<String>, args: Vec<TypeId>) -> Self {
        Self {
            declaration: declaration.into(),
            args,
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<PathBuf>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

/// One node of the type graph.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeNode {
    pub kind: TypeKind,
    pub name: Option<TypeName>,
}

impl TypeNode {
    pub fn anonymous(kind: TypeKind) -> Self {
        Self { kind, name: None }
    }

    pub fn named(kind: TypeKind, name: TypeName) -> Self {
        Self {
            kind,
            name: Some(name),
        }
    }
}

/// Arena of type nodes for one generation run.
#[derive(Debug, Default)]
pub struct TypeGraph {
    nodes: Vec<TypeNode>,
    primitives: HashMap<String, TypeId>,
    literals: HashMap<String, TypeId>,
    context: Option<TypeId>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add(&mut self, node: TypeNode) -> TypeId {
        let id = TypeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn add_kind(&mut self, kind: TypeKind) -> TypeId {
        self.add(TypeNode::anonymous(kind))
    }

    /// Interned leaf type rendered verbatim.
    pub fn primitive(&mut self, text: &str) -> TypeId {
        if let Some(id) = self.primitives.get(text) {
            return *id;
        }
        let id = self.add_kind(TypeKind::Primitive(text.to_string()));
        self.primitives.insert(text.to_string(), id);
        id
    }

    /// Interned literal type.
    pub fn literal(&mut self, text: &str) -> TypeId {
        if let Some(id) = self.literals.get(text) {
            return *id;
        }
        let id = self.add_kind(TypeKind::Literal(text.to_string()));
        self.literals.insert(text.to_string(), id);
        id
    }

    pub fn unresolved(&mut self, text: impl Into<String>) -> TypeId {
        self.add_kind(TypeKind::Unresolved(text.into()))
    }

    /// Reserve a slot for a declaration whose body is not lowered yet.
    ///
    /// The slot reads as `Unresolved` until [`TypeGraph::replace`] fills it, so
    /// a declaration that never completes still resolves to the fallback.
    pub fn reserve(&mut self, label: &str) -> TypeId {
        self.unresolved(format!("{label} (incomplete)"))
    }

    pub fn replace(&mut self, id: TypeId, node: TypeNode) {
        if let Some(slot) = self.nodes.get_mut(id.index()) {
            *slot = node;
        }
    }

    pub fn node(&self, id: TypeId) -> &TypeNode {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: TypeId) -> &TypeKind {
        &self.node(id).kind
    }

    pub fn name(&self, id: TypeId) -> Option<&TypeName> {
        self.node(id).name.as_ref()
    }

    /// Register the context type. Repeated calls return the same node.
    pub fn register_context(&mut self, name: &str) -> TypeId {
        if let Some(id) = self.context {
            return id;
        }
        let id = self.add_kind(TypeKind::Unresolved(name.to_string()));
        self.context = Some(id);
        id
    }

    pub fn context(&self) -> Option<TypeId> {
        self.context
    }
}

/// One parameter of a call signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeId,
    /// Declared type text before flattening; `any` when not annotated
    pub raw_type: String,
    pub optional: bool,
    pub rest: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeId, raw_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty,
            raw_type: raw_type.into(),
            optional: false,
            rest: false,
        }
    }
}

/// Parameters and return type of something callable.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSignature {
    pub params: Vec<Parameter>,
    pub return_type: TypeId,
}

/// An exported, function-shaped declaration of an API module.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<Parameter>,
    pub return_type: TypeId,
}

/// One discovered API module.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// Logical name: file name without the module suffix
    pub name: String,
    pub source_path: PathBuf,
    pub functions: Vec<FunctionSignature>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives_and_literals_are_interned() {
        let mut graph = TypeGraph::new();
        let a = graph.primitive("string");
        let b = graph.primitive("string");
        let c = graph.literal("\"string\"");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_reserved_slot_reads_unresolved_until_replaced() {
        let mut graph = TypeGraph::new();
        let id = graph.reserve("Node");
        assert!(matches!(graph.kind(id), TypeKind::Unresolved(_)));

        let text = graph.primitive("string");
        let object = ObjectType::new(vec![Property::required("name", text)]);
        graph.replace(id, TypeNode::named(TypeKind::Object(object), TypeName::plain("Node")));

        assert_eq!(graph.kind(id).label(), "object");
        assert_eq!(graph.name(id).map(|n| n.declaration.as_str()), Some("Node"));
    }

    #[test]
    fn test_context_registration_is_idempotent() {
        let mut graph = TypeGraph::new();
        let first = graph.register_context("RpcContext");
        let second = graph.register_context("RpcContext");
        assert_eq!(first, second);
        assert_eq!(graph.context(), Some(first));
    }
}
