//! Abstract Syntax Tree definitions for Pineapple
//!
//! The parser hands over these trees with every type annotation in its
//! `Unresolved` form and every expression type unset. The semantic pass
//! fills the `ty`/`resolved` slots in place.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{type_equals, Type};
use crate::utils::Location;

/// Top-level declarations of one source file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Declaration {
    Function(FunctionDecl),
    Struct(StructDecl),
    Enum(EnumDecl),
    Group(GroupDecl),
    /// `def Cat is Animal`
    GroupBinding(GroupBinding),
    Import(ImportDecl),
    /// A block of example statements checked like a function body
    Example(ExampleDecl),
}

impl Declaration {
    /// File this declaration came from
    pub fn origin(&self) -> &str {
        match self {
            Self::Function(d) => &d.origin,
            Self::Struct(d) => &d.origin,
            Self::Enum(d) => &d.origin,
            Self::Group(d) => &d.origin,
            Self::GroupBinding(d) => &d.origin,
            Self::Import(d) => &d.origin,
            Self::Example(d) => &d.origin,
        }
    }

    pub fn location(&self) -> Location {
        match self {
            Self::Function(d) => d.location,
            Self::Struct(d) => d.location,
            Self::Enum(d) => d.location,
            Self::Group(d) => d.location,
            Self::GroupBinding(d) => d.location,
            Self::Import(d) => d.location,
            Self::Example(d) => d.location,
        }
    }

    /// Tag the declaration with the file it came from
    pub fn set_origin(&mut self, origin: &str) {
        let slot = match self {
            Self::Function(d) => &mut d.origin,
            Self::Struct(d) => &mut d.origin,
            Self::Enum(d) => &mut d.origin,
            Self::Group(d) => &mut d.origin,
            Self::GroupBinding(d) => &mut d.origin,
            Self::Import(d) => &mut d.origin,
            Self::Example(d) => &mut d.origin,
        };
        *slot = origin.to_string();
    }
}

/// Identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    #[serde(default)]
    pub location: Location,
}

impl Ident {
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self { name: name.into(), location }
    }
}

/// Where the name tokens of a function sit relative to its arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Affix {
    /// `.main`
    Nofix,
    /// `not x`
    Prefix,
    /// `x.show`
    Suffix,
    /// `x + y`
    Infix,
    /// `list.replace x with y`
    Mixfix,
}

/// Key of the function table: stringified signature plus arity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FunctionKey {
    pub signature: String,
    pub arity: usize,
}

impl FunctionKey {
    pub fn new(signature: &[Ident], arity: usize) -> Self {
        Self {
            signature: signature.iter().map(|t| t.name.as_str()).collect::<Vec<_>>().join("_"),
            arity,
        }
    }
}

impl fmt::Display for FunctionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.signature, self.arity)
    }
}

/// Human-readable call shape, `_` standing for each argument
pub fn display_signature(signature: &[Ident], affix: Affix) -> String {
    let tokens: Vec<&str> = signature.iter().map(|t| t.name.as_str()).collect();
    let first = tokens.first().copied().unwrap_or_default();
    match affix {
        Affix::Nofix => format!(".{}", first),
        Affix::Prefix => format!("{} _", first),
        Affix::Suffix => format!("_.{}", first),
        Affix::Infix => format!("_ {} _", first),
        Affix::Mixfix => format!("_.{} _", tokens.join(" _ ")),
    }
}

/// Function definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub signature: Vec<Ident>,
    pub affix: Affix,
    #[serde(default = "Type::void")]
    pub return_type: Type,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub generics: Vec<GenericParam>,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub location: Location,
}

impl FunctionDecl {
    pub fn key(&self) -> FunctionKey {
        FunctionKey::new(&self.signature, self.params.len())
    }

    pub fn display_signature(&self) -> String {
        display_signature(&self.signature, self.affix)
    }

    /// Whether any parameter mentions a generic placeholder
    pub fn is_generic(&self) -> bool {
        self.params.iter().any(|p| p.ty.contains_generic())
    }

    pub fn generic_names(&self) -> Vec<String> {
        self.generics.iter().map(|g| g.name.name.clone()).collect()
    }

    pub fn param_types(&self) -> Vec<Type> {
        self.params.iter().map(|p| p.ty.clone()).collect()
    }

    /// Same signature and structurally equal parameter types
    pub fn same_overload(&self, other: &FunctionDecl) -> bool {
        self.key() == other.key()
            && self
                .params
                .iter()
                .zip(&other.params)
                .all(|(a, b)| type_equals(&a.ty, &b.ty))
    }
}

/// Function parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub name: Ident,
    pub ty: Type,
    #[serde(default)]
    pub mutable: bool,
}

/// Generic parameter, optionally restricted to members of a group
/// (`if T is SyntaxNode`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericParam {
    pub name: Ident,
    #[serde(default)]
    pub constraint: Option<Type>,
}

/// Struct definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructDecl {
    pub name: Ident,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub generics: Vec<Ident>,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub location: Location,
}

impl StructDecl {
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name.name == name)
    }

    pub fn generic_names(&self) -> Vec<String> {
        self.generics.iter().map(|g| g.name.clone()).collect()
    }
}

/// Struct member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub name: Ident,
    pub ty: Type,
}

/// Enum definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumDecl {
    pub name: Ident,
    #[serde(default)]
    pub cases: Vec<Ident>,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub location: Location,
}

impl EnumDecl {
    pub fn has_case(&self, case: &str) -> bool {
        self.cases.iter().any(|c| c.name == case)
    }
}

/// Group definition (`def group Animal`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDecl {
    pub name: Ident,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub location: Location,
}

/// Binds a type into a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupBinding {
    pub child: Type,
    pub parent: Type,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportDecl {
    pub filename: Ident,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExampleDecl {
    #[serde(default)]
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub location: Location,
}

/// Statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    /// let [mutable] name [Type] = expr, or name = expr
    Assignment(Assignment),
    /// return [expr]
    Return {
        #[serde(default)]
        value: Option<Expr>,
        #[serde(default)]
        location: Location,
    },
    /// A call evaluated for its side effects
    Call {
        call: FunctionCall,
        #[serde(default)]
        location: Location,
    },
    /// if / elif / else
    Branch(Branch),
    /// for x in expr
    For(ForLoop),
    /// while guard
    While(WhileLoop),
    /// pass
    Pass {
        #[serde(default)]
        location: Location,
    },
    /// Host-language code embedded verbatim
    HostCode {
        code: String,
        #[serde(default)]
        location: Location,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub variable: VariableDecl,
    /// `let` introduces a new variable; otherwise an existing one is rebound
    #[serde(default)]
    pub is_declaration: bool,
    pub value: Expr,
    #[serde(default)]
    pub location: Location,
}

/// The variable side of an assignment or a loop iterator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableDecl {
    pub name: Ident,
    #[serde(default)]
    pub declared_type: Option<Type>,
    #[serde(default)]
    pub mutable: bool,
    /// Filled by the semantic pass
    #[serde(default)]
    pub resolved_type: Option<Type>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    /// Empty for a final `else`
    #[serde(default)]
    pub guard: Vec<GuardTerm>,
    #[serde(default)]
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub else_branch: Option<Box<Branch>>,
    #[serde(default)]
    pub location: Location,
}

/// One test of a guard chain, joined to the previous one by `junction`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardTerm {
    #[serde(default)]
    pub junction: Option<Junction>,
    pub test: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Junction {
    And,
    Or,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForLoop {
    pub iterator: VariableDecl,
    pub iterable: Expr,
    #[serde(default)]
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhileLoop {
    pub guard: Vec<GuardTerm>,
    #[serde(default)]
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub location: Location,
}

/// Expression with the type slot filled by the semantic pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    #[serde(default)]
    pub ty: Option<Type>,
    #[serde(default)]
    pub location: Location,
}

impl Expr {
    pub fn new(kind: ExprKind, location: Location) -> Self {
        Self { kind, ty: None, location }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExprKind {
    /// Numeric literal as written (`1`, `2.0`)
    Number(String),
    String(String),
    Boolean(bool),
    Nil,
    Variable(Ident),
    Call(FunctionCall),
    /// `[a, b, c]`
    List(Vec<Expr>),
    /// `(a, b, c)`
    Tuple(Vec<Expr>),
    /// Struct literal: `People :name = "Wong" :age = 99`
    Object {
        constructor: Type,
        #[serde(default)]
        members: Vec<KeyValue>,
    },
    /// `subject:key`
    ObjectAccess { subject: Box<Expr>, key: Ident },
    /// `Color.red`, or a bare `red`
    EnumCase {
        #[serde(default)]
        enum_name: Option<Ident>,
        case: Ident,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyValue {
    pub member: Ident,
    pub value: Expr,
}

/// Function call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub signature: Vec<Ident>,
    pub affix: Affix,
    #[serde(default)]
    pub args: Vec<Expr>,
    /// Filled by overload resolution
    #[serde(default)]
    pub resolved: Option<ResolvedCall>,
}

impl FunctionCall {
    pub fn key(&self) -> FunctionKey {
        FunctionKey::new(&self.signature, self.args.len())
    }

    pub fn display_signature(&self) -> String {
        display_signature(&self.signature, self.affix)
    }

    pub fn location(&self) -> Location {
        self.signature.first().map(|t| t.location).unwrap_or_default()
    }
}

/// The overload a call was bound to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedCall {
    pub params: Vec<Type>,
    pub return_type: Type,
}
