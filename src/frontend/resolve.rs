//! Type resolution
//!
//! Turns the `Unresolved` names written in the source into resolved type
//! values, and answers subtype questions against the lattice.

use log::trace;

use crate::frontend::ast::StructDecl;
use crate::frontend::symbols::SymbolTable;
use crate::types::{type_equals, BuiltinKind, Type, TypeKind, TypeLattice};
use crate::utils::suggest::similar_names;
use crate::utils::{Error, Location, Result};

/// Resolve `ty` against the tables, with `generics` naming the placeholders
/// declared by the enclosing declaration.
///
/// Lookup order for a name: lattice, enum table, struct table, builtin
/// catalog. Resolving an already resolved type yields an equal value.
pub fn resolve_type(symbols: &SymbolTable, ty: &Type, generics: &[String]) -> Result<Type> {
    let kind = match &ty.kind {
        TypeKind::Void | TypeKind::Enum { .. } | TypeKind::Group { .. } => ty.kind.clone(),
        TypeKind::Generic { name, location } => {
            if !generics.contains(name) {
                return Err(undefined_generic(name, generics, *location));
            }
            ty.kind.clone()
        }
        TypeKind::Builtin { kind, args } => TypeKind::Builtin {
            kind: *kind,
            args: resolve_all(symbols, args, generics)?,
        },
        TypeKind::Struct { name, args } => TypeKind::Struct {
            name: name.clone(),
            args: resolve_all(symbols, args, generics)?,
        },
        TypeKind::Unresolved { name, args, location } => {
            if args.is_empty() && generics.contains(name) {
                TypeKind::Generic { name: name.clone(), location: *location }
            } else {
                let args = resolve_all(symbols, args, generics)?;
                let kind =
                    lookup(symbols, name, args).ok_or_else(|| undefined_type(symbols, name, generics, *location))?;
                check_type_arguments(symbols, &kind, *location)?;
                kind
            }
        }
    };
    let resolved = Type { kind, nullable: ty.nullable };
    trace!("resolved {} to {:?}", ty, resolved.kind);
    Ok(resolved)
}

fn resolve_all(symbols: &SymbolTable, types: &[Type], generics: &[String]) -> Result<Vec<Type>> {
    types.iter().map(|t| resolve_type(symbols, t, generics)).collect()
}

fn lookup(symbols: &SymbolTable, name: &str, args: Vec<Type>) -> Option<TypeKind> {
    if let Some(found) = symbols.lattice.find(name) {
        return match &found.kind {
            TypeKind::Builtin { kind, .. } => Some(TypeKind::Builtin { kind: *kind, args }),
            TypeKind::Struct { name, .. } => Some(TypeKind::Struct { name: name.clone(), args }),
            TypeKind::Enum { name } => Some(TypeKind::Enum { name: name.clone() }),
            TypeKind::Group { name } => Some(TypeKind::Group { name: name.clone() }),
            _ => None,
        };
    }
    if symbols.enums.contains_key(name) {
        return Some(TypeKind::Enum { name: name.to_string() });
    }
    if symbols.structs.contains_key(name) {
        return Some(TypeKind::Struct { name: name.to_string(), args });
    }
    BuiltinKind::from_name(name).map(|kind| TypeKind::Builtin { kind, args })
}

/// A generic struct written with arguments must be given one per
/// placeholder. A bare name leaves them to the context.
pub fn check_type_arguments(symbols: &SymbolTable, kind: &TypeKind, location: Location) -> Result<()> {
    let TypeKind::Struct { name, args } = kind else {
        return Ok(());
    };
    let Some(decl) = symbols.find_struct(name) else {
        return Ok(());
    };
    if !args.is_empty() && args.len() != decl.generics.len() {
        return Err(Error::WrongNumberOfTypeArguments {
            name: name.clone(),
            expected: decl.generics.len(),
            actual: args.len(),
            location,
        });
    }
    Ok(())
}

/// Placeholder names a parameter type introduces without declaring them
/// (`T` in `def (this List{T}).length`)
pub fn implicit_generics(symbols: &SymbolTable, ty: &Type, names: &mut Vec<String>) {
    if let TypeKind::Unresolved { name, args, .. } = &ty.kind {
        if args.is_empty()
            && looks_like_generic(name)
            && lookup(symbols, name, Vec::new()).is_none()
            && !names.contains(name)
        {
            names.push(name.clone());
        }
    }
    for arg in ty.args() {
        implicit_generics(symbols, arg, names);
    }
}

/// One upper-case letter, optionally followed by digits (`T`, `K2`)
fn looks_like_generic(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase()) && chars.all(|c| c.is_ascii_digit())
}

fn undefined_generic(name: &str, generics: &[String], location: Location) -> Error {
    Error::UsingUndefinedGenericName {
        name: name.to_string(),
        suggestions: similar_names(name, generics.iter().map(String::as_str)),
        location,
    }
}

fn undefined_type(symbols: &SymbolTable, name: &str, generics: &[String], location: Location) -> Error {
    if looks_like_generic(name) {
        return undefined_generic(name, generics, location);
    }
    Error::UsingUndefinedType {
        name: name.to_string(),
        suggestions: similar_names(name, symbols.type_names()),
        location,
    }
}

/// Resolve every member type of a struct. Member types may only use the
/// struct's own generic names.
pub fn resolve_struct(symbols: &SymbolTable, decl: &mut StructDecl) -> Result<()> {
    let generics = decl.generic_names();
    for member in &mut decl.members {
        member.ty = resolve_type(symbols, &member.ty, &generics)?;
    }
    Ok(())
}

/// Whether a value of type `x` may be used where `y` is expected
pub fn is_subtype_of(lattice: &TypeLattice, x: &Type, y: &Type) -> bool {
    type_equals(x, y)
        || y.is_any()
        || (x.is_nil() && y.nullable)
        || (y.is_nil() && x.nullable)
        || lattice.distance(x, y).is_some()
}
