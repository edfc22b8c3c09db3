//! Type System for Pineapple

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::Location;

/// Builtin type catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuiltinKind {
    Any,
    Number,
    Integer,
    String,
    Date,
    List,
    Table,
    /// Root of every struct type
    Struct,
    Tuple,
    /// Root of every enum type
    Enum,
}

impl BuiltinKind {
    pub const ALL: [BuiltinKind; 10] = [
        Self::Any, Self::Number, Self::Integer, Self::String, Self::Date,
        Self::List, Self::Table, Self::Struct, Self::Tuple, Self::Enum,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Any => "Any",
            Self::Number => "Number",
            Self::Integer => "Integer",
            Self::String => "String",
            Self::Date => "Date",
            Self::List => "List",
            Self::Table => "Table",
            Self::Struct => "Struct",
            Self::Tuple => "Tuple",
            Self::Enum => "Enum",
        }
    }

    /// Look up a builtin by its source name. `Int` is accepted for `Integer`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Int" => Some(Self::Integer),
            _ => Self::ALL.iter().copied().find(|kind| kind.name() == name),
        }
    }
}

/// The shape of a type value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TypeKind {
    /// A name as written in the source, awaiting resolution
    Unresolved {
        name: String,
        #[serde(default)]
        args: Vec<Type>,
        #[serde(default)]
        location: Location,
    },
    /// A placeholder bound by a declaration's generic parameter list
    Generic {
        name: String,
        #[serde(default)]
        location: Location,
    },
    Void,
    Builtin {
        kind: BuiltinKind,
        #[serde(default)]
        args: Vec<Type>,
    },
    /// Refers to an entry of the struct table
    Struct {
        name: String,
        #[serde(default)]
        args: Vec<Type>,
    },
    /// Refers to an entry of the enum table
    Enum { name: String },
    /// Refers to a group registered in the lattice
    Group { name: String },
}

/// A type value. Nullability is orthogonal to the kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Type {
    pub kind: TypeKind,
    #[serde(default)]
    pub nullable: bool,
}

/// Name of the builtin enum whose single case is `nil`
pub const NIL_ENUM: &str = "Nil";
/// Name of the builtin enum with cases `true` and `false`
pub const BOOLEAN_ENUM: &str = "Boolean";

impl Type {
    pub fn new(kind: TypeKind) -> Self {
        Self { kind, nullable: false }
    }

    pub fn void() -> Self {
        Self::new(TypeKind::Void)
    }

    pub fn builtin(kind: BuiltinKind) -> Self {
        Self::new(TypeKind::Builtin { kind, args: Vec::new() })
    }

    pub fn any() -> Self {
        Self::builtin(BuiltinKind::Any)
    }

    pub fn list(element: Type) -> Self {
        Self::new(TypeKind::Builtin { kind: BuiltinKind::List, args: vec![element] })
    }

    pub fn tuple(elements: Vec<Type>) -> Self {
        Self::new(TypeKind::Builtin { kind: BuiltinKind::Tuple, args: elements })
    }

    pub fn structure(name: impl Into<String>, args: Vec<Type>) -> Self {
        Self::new(TypeKind::Struct { name: name.into(), args })
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Enum { name: name.into() })
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Group { name: name.into() })
    }

    pub fn generic(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Generic { name: name.into(), location: Location::dummy() })
    }

    pub fn unresolved(name: impl Into<String>) -> Self {
        Self::unresolved_with(name, Vec::new(), Location::dummy())
    }

    pub fn unresolved_with(name: impl Into<String>, args: Vec<Type>, location: Location) -> Self {
        Self::new(TypeKind::Unresolved { name: name.into(), args, location })
    }

    pub fn nil() -> Self {
        Self::enumeration(NIL_ENUM)
    }

    pub fn boolean() -> Self {
        Self::enumeration(BOOLEAN_ENUM)
    }

    /// Same type with the given nullability
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn is_void(&self) -> bool {
        matches!(self.kind, TypeKind::Void)
    }

    pub fn is_nil(&self) -> bool {
        matches!(&self.kind, TypeKind::Enum { name } if name == NIL_ENUM)
    }

    pub fn is_any(&self) -> bool {
        matches!(self.kind, TypeKind::Builtin { kind: BuiltinKind::Any, .. })
    }

    pub fn is_generic(&self) -> bool {
        matches!(self.kind, TypeKind::Generic { .. })
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self.kind, TypeKind::Unresolved { .. })
            && self.args().iter().all(Type::is_resolved)
    }

    /// Name of the head of this type (`List` for `List{Number}`)
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            TypeKind::Unresolved { name, .. }
            | TypeKind::Generic { name, .. }
            | TypeKind::Struct { name, .. }
            | TypeKind::Enum { name }
            | TypeKind::Group { name } => Some(name),
            TypeKind::Builtin { kind, .. } => Some(kind.name()),
            TypeKind::Void => None,
        }
    }

    /// Generic arguments
    pub fn args(&self) -> &[Type] {
        match &self.kind {
            TypeKind::Unresolved { args, .. }
            | TypeKind::Builtin { args, .. }
            | TypeKind::Struct { args, .. } => args,
            _ => &[],
        }
    }

    /// Source location, if this type was written in the source
    pub fn location(&self) -> Location {
        match &self.kind {
            TypeKind::Unresolved { location, .. } | TypeKind::Generic { location, .. } => *location,
            _ => Location::dummy(),
        }
    }

    /// Whether a generic placeholder occurs anywhere inside this type
    pub fn contains_generic(&self) -> bool {
        self.is_generic() || self.args().iter().any(Type::contains_generic)
    }

    /// Names of every generic placeholder occurring in this type
    pub fn generic_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_generic_names(&mut names);
        names
    }

    fn collect_generic_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        if let TypeKind::Generic { name, .. } = &self.kind {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        for arg in self.args() {
            arg.collect_generic_names(names);
        }
    }

    /// Two types share a head when kind and name agree, ignoring generic
    /// arguments and nullability. Lattice nodes are identified by head.
    pub fn same_head(&self, other: &Type) -> bool {
        match (&self.kind, &other.kind) {
            (TypeKind::Void, TypeKind::Void) => true,
            (TypeKind::Builtin { kind: a, .. }, TypeKind::Builtin { kind: b, .. }) => a == b,
            (TypeKind::Struct { name: a, .. }, TypeKind::Struct { name: b, .. })
            | (TypeKind::Enum { name: a }, TypeKind::Enum { name: b })
            | (TypeKind::Group { name: a }, TypeKind::Group { name: b })
            | (TypeKind::Generic { name: a, .. }, TypeKind::Generic { name: b, .. }) => a == b,
            (TypeKind::Unresolved { name, .. }, _) => head_matches_name(other, name),
            (_, TypeKind::Unresolved { name, .. }) => head_matches_name(self, name),
            _ => false,
        }
    }
}

fn head_matches_name(ty: &Type, name: &str) -> bool {
    match &ty.kind {
        TypeKind::Builtin { kind, .. } => BuiltinKind::from_name(name) == Some(*kind),
        _ => ty.name() == Some(name),
    }
}

/// Structural type equality.
///
/// An `Unresolved` value equals a resolved value with the same name and
/// equal arguments. Nullability does not take part. Any two generic
/// placeholders compare equal, whatever their names.
pub fn type_equals(x: &Type, y: &Type) -> bool {
    match (&x.kind, &y.kind) {
        (TypeKind::Generic { .. }, TypeKind::Generic { .. }) => true,
        (TypeKind::Generic { .. }, _) | (_, TypeKind::Generic { .. }) => false,
        (TypeKind::Void, TypeKind::Void) => true,
        (TypeKind::Enum { name: a }, TypeKind::Enum { name: b })
        | (TypeKind::Group { name: a }, TypeKind::Group { name: b }) => a == b,
        _ => x.same_head(y) && args_equal(x.args(), y.args()),
    }
}

fn args_equal(xs: &[Type], ys: &[Type]) -> bool {
    xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| type_equals(x, y))
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Void => write!(f, "Void")?,
            _ => {
                write!(f, "{}", self.name().unwrap_or_default())?;
                let args = self.args();
                if !args.is_empty() {
                    let rendered: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                    write!(f, "{{{}}}", rendered.join(", "))?;
                }
            }
        }
        if self.nullable {
            write!(f, "?")?;
        }
        Ok(())
    }
}
