//! TypeScript IR for the generated artifacts.
//!
//! - TsType: type positions (primitives, arrays, unions, objects, resolved text)
//! - TsExpr: expressions (identifiers, calls, arrows, object literals, ...)
//! - TsStmt / TsFunction / TsModule: statements and whole files

/// TypeScript type representation
#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    /// Keyword types: string, number, unknown, any
    Primitive(TsPrimitive),
    /// Array type: T[]
    Array(Box<TsType>),
    /// Union type: A | B | C
    Union(Vec<TsType>),
    /// Object type: { foo: string; bar?: number }
    Object(Vec<TsProp>),
    /// Record type: Record<K, V>
    Record {
        key: Box<TsType>,
        value: Box<TsType>,
    },
    /// Literal type: "active", 42
    Literal(TsLiteral),
    /// Already-rendered type text: a table name or a flattened shape
    Ref(String),
}

impl TsType {
    pub fn string() -> Self {
        TsType::Primitive(TsPrimitive::String)
    }

    pub fn number() -> Self {
        TsType::Primitive(TsPrimitive::Number)
    }

    pub fn unknown() -> Self {
        TsType::Primitive(TsPrimitive::Unknown)
    }

    /// `Promise<T>` around already-rendered text.
    pub fn promise(inner: &str) -> Self {
        TsType::Ref(format!("Promise<{inner}>"))
    }
}

/// TypeScript primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsPrimitive {
    String,
    Number,
    Unknown,
    Any,
}

/// Object property definition
#[derive(Debug, Clone, PartialEq)]
pub struct TsProp {
    pub name: String,
    pub ty: TsType,
    pub optional: bool,
}

impl TsProp {
    pub fn new(name: impl Into<String>, ty: TsType) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
        }
    }
}

/// TypeScript literal values
#[derive(Debug, Clone, PartialEq)]
pub enum TsLiteral {
    String(String),
    Int(i64),
}

/// TypeScript expression
#[derive(Debug, Clone, PartialEq)]
pub enum TsExpr {
    /// Identifier: foo
    Ident(String),
    /// Literal value: "bar", 42
    Literal(TsLiteral),
    /// Function call: foo(a, b)
    Call {
        callee: Box<TsExpr>,
        args: Vec<TsExpr>,
    },
    /// Arrow function: async (x: T): Promise<R> => body
    Arrow {
        params: Vec<TsParam>,
        return_type: Option<TsType>,
        body: Box<TsExpr>,
        is_async: bool,
    },
    /// Object literal on one line: { a: 1, b: 2 }
    Object(Vec<(String, TsExpr)>),
    /// Object literal with one property per line
    ObjectBlock(Vec<(String, TsExpr)>),
    /// Member access: foo.bar
    Member { object: Box<TsExpr>, prop: String },
    /// Await expression: await fetch()
    Await(Box<TsExpr>),
    /// Spread: ...args
    Spread(Box<TsExpr>),
    /// Array literal: [a, b, c]
    Array(Vec<TsExpr>),
    /// Raw code that doesn't fit the AST
    Raw(String),
}

impl TsExpr {
    pub fn ident(name: impl Into<String>) -> Self {
        TsExpr::Ident(name.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        TsExpr::Literal(TsLiteral::String(value.into()))
    }

    pub fn call(callee: TsExpr, args: Vec<TsExpr>) -> Self {
        TsExpr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn member(object: TsExpr, prop: impl Into<String>) -> Self {
        TsExpr::Member {
            object: Box::new(object),
            prop: prop.into(),
        }
    }
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct TsParam {
    pub name: String,
    pub ty: Option<TsType>,
    pub optional: bool,
    pub rest: bool,
}

impl TsParam {
    pub fn new(name: impl Into<String>, ty: TsType) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
            optional: false,
            rest: false,
        }
    }
}

// =============================================================================
// Module-Level IR
// =============================================================================

/// Import statement
#[derive(Debug, Clone, PartialEq)]
pub struct TsImport {
    pub kind: ImportKind,
    /// Module specifier
    pub from: String,
    /// Whether this is a type-only import
    pub type_only: bool,
}

/// What an import binds.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportKind {
    /// import { a, b } from "..."
    Named(Vec<String>),
    /// import * as name from "..."
    Namespace(String),
}

/// Type definition kind
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefKind {
    /// interface Foo { ... }
    Interface { properties: Vec<TsProp> },
    /// type Foo = ...
    TypeAlias { ty: TsType },
}

/// Type definition
#[derive(Debug, Clone, PartialEq)]
pub struct TsTypeDef {
    pub name: String,
    pub kind: TypeDefKind,
}

/// Statement in a function body or at module level
#[derive(Debug, Clone, PartialEq)]
pub enum TsStmt {
    /// `const` binding, optionally exported
    VarDecl {
        name: String,
        ty: Option<TsType>,
        init: TsExpr,
        is_export: bool,
    },
    /// Return statement
    Return(Option<TsExpr>),
    /// If statement
    If {
        cond: TsExpr,
        then_body: Vec<TsStmt>,
        else_body: Option<Vec<TsStmt>>,
    },
    /// try { ... } catch (param) { ... }
    Try {
        body: Vec<TsStmt>,
        catch_param: String,
        catch_body: Vec<TsStmt>,
    },
    /// Throw statement
    Throw(TsExpr),
    /// Raw code block (for patterns that don't fit the AST)
    Raw(String),
}

/// Function definition
#[derive(Debug, Clone, PartialEq)]
pub struct TsFunction {
    pub name: String,
    pub params: Vec<TsParam>,
    pub return_type: Option<TsType>,
    pub body: Vec<TsStmt>,
    pub is_async: bool,
    pub is_export: bool,
}

/// Top-level item of a module, emitted in order.
#[derive(Debug, Clone, PartialEq)]
pub enum TsItem {
    Type(TsTypeDef),
    Function(TsFunction),
    Stmt(TsStmt),
}

/// Complete TypeScript module
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TsModule {
    /// Leading comment lines, without the `// ` prefix
    pub header: Vec<String>,
    pub imports: Vec<TsImport>,
    pub items: Vec<TsItem>,
}
