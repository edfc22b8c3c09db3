//! Global symbol tables
//!
//! Functions, structs, enums and the subtype lattice. One table bundle lives
//! for a whole compilation and grows with every file added to it.

use std::collections::BTreeMap;

use log::debug;

use crate::frontend::ast::*;
use crate::types::{BuiltinKind, Type, TypeKind, TypeLattice, BOOLEAN_ENUM, NIL_ENUM};
use crate::utils::{Error, Location, Result};

/// Origin recorded for declarations the compiler provides itself
pub const BUILTIN_ORIGIN: &str = "<builtin>";

// ==================== Function Table ====================

/// Overloads grouped by (stringified signature, arity), in registration order
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    entries: BTreeMap<FunctionKey, Vec<FunctionDecl>>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an overload. Returns `false` when an equal overload is already
    /// registered, in which case the table is unchanged.
    pub fn insert(&mut self, decl: FunctionDecl) -> bool {
        let key = decl.key();
        let overloads = self.entries.entry(key.clone()).or_default();
        if overloads.iter().any(|existing| existing.same_overload(&decl)) {
            return false;
        }
        debug!(
            "function table: {} ({})",
            key,
            decl.params.iter().map(|p| p.ty.to_string()).collect::<Vec<_>>().join(", ")
        );
        overloads.push(decl);
        true
    }

    /// Overloads registered under `key`
    pub fn get(&self, key: &FunctionKey) -> &[FunctionDecl] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every overload whose first parameter is the struct or group `name`,
    /// or a generic constrained by the group `name`. The code generator uses
    /// this to emit dynamic dispatch.
    pub fn bound_to(&self, name: &str) -> Vec<&FunctionDecl> {
        self.entries
            .values()
            .flatten()
            .filter(|decl| match decl.params.first().map(|p| &p.ty.kind) {
                Some(TypeKind::Struct { name: n, .. }) | Some(TypeKind::Group { name: n }) => n == name,
                Some(TypeKind::Generic { name: placeholder, .. }) => decl
                    .generics
                    .iter()
                    .filter(|g| &g.name.name == placeholder)
                    .filter_map(|g| g.constraint.as_ref())
                    .any(|constraint| constraint.name() == Some(name)),
                _ => false,
            })
            .collect()
    }

    /// Total number of overloads
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ==================== Symbol Table ====================

/// Tables shared by every file of a compilation
#[derive(Debug, Clone)]
pub struct SymbolTable {
    pub functions: FunctionTable,
    pub structs: BTreeMap<String, StructDecl>,
    pub enums: BTreeMap<String, EnumDecl>,
    pub lattice: TypeLattice,
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut table = Self {
            functions: FunctionTable::new(),
            structs: BTreeMap::new(),
            enums: BTreeMap::new(),
            lattice: TypeLattice::new(),
        };
        table.register_builtins();
        table
    }

    /// Register the `Boolean` and `Nil` enums
    fn register_builtins(&mut self) {
        self.define_builtin_enum(BOOLEAN_ENUM, &["true", "false"]);
        self.define_builtin_enum(NIL_ENUM, &["nil"]);
    }

    fn define_builtin_enum(&mut self, name: &str, cases: &[&str]) {
        let decl = EnumDecl {
            name: Ident::new(name, Location::dummy()),
            cases: cases.iter().map(|c| Ident::new(*c, Location::dummy())).collect(),
            origin: BUILTIN_ORIGIN.to_string(),
            location: Location::dummy(),
        };
        // A fresh table cannot hold either name yet
        let _ = self.register_enum(&decl);
    }

    /// Add a struct name to the struct table and the lattice. Member types
    /// stay unresolved until [`SymbolTable::update_struct`].
    pub fn register_struct(&mut self, decl: &StructDecl) -> Result<()> {
        let name = &decl.name.name;
        if let Some(previous) = self.structs.get(name) {
            return Err(Error::StructRedeclare {
                name: name.clone(),
                previous_origin: previous.origin.clone(),
                location: decl.name.location,
            });
        }
        debug!("register struct {}", name);
        let placeholders = decl.generics.iter().map(|g| Type::generic(g.name.clone())).collect();
        self.lattice
            .insert(Type::structure(name.clone(), placeholders), &Type::builtin(BuiltinKind::Struct));
        self.structs.insert(name.clone(), decl.clone());
        Ok(())
    }

    /// Replace a registered struct with its resolved form
    pub fn update_struct(&mut self, decl: &StructDecl) {
        self.structs.insert(decl.name.name.clone(), decl.clone());
    }

    pub fn register_enum(&mut self, decl: &EnumDecl) -> Result<()> {
        let name = &decl.name.name;
        if let Some(previous) = self.enums.get(name) {
            return Err(Error::EnumRedeclare {
                name: name.clone(),
                previous_origin: previous.origin.clone(),
                location: decl.name.location,
            });
        }
        debug!("register enum {}", name);
        self.lattice.insert(Type::enumeration(name.clone()), &Type::builtin(BuiltinKind::Enum));
        self.enums.insert(name.clone(), decl.clone());
        Ok(())
    }

    /// Groups live only in the lattice, directly under `Any`
    pub fn register_group(&mut self, decl: &GroupDecl) -> Result<()> {
        let group = Type::group(decl.name.name.clone());
        if self.lattice.contains(&group) {
            return Err(Error::GroupRedeclare {
                name: decl.name.name.clone(),
                location: decl.name.location,
            });
        }
        debug!("register group {}", decl.name.name);
        self.lattice.insert(group, &Type::any());
        Ok(())
    }

    /// Make `child` a member of `parent`. Both must already be resolved.
    pub fn bind_group(&mut self, child: &Type, parent: &Type) -> bool {
        debug!("bind {} into {}", child, parent);
        self.lattice.insert(child.clone(), parent)
    }

    pub fn find_struct(&self, name: &str) -> Option<&StructDecl> {
        self.structs.get(name)
    }

    pub fn find_enum(&self, name: &str) -> Option<&EnumDecl> {
        self.enums.get(name)
    }

    /// First enum, in name order, declaring `case`
    pub fn enum_with_case(&self, case: &str) -> Option<&EnumDecl> {
        self.enums.values().find(|e| e.has_case(case))
    }

    /// Every type name known to the tables, for suggestions
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.lattice.types().filter_map(Type::name).collect();
        names.extend(self.structs.keys().map(String::as_str));
        names.extend(self.enums.keys().map(String::as_str));
        names.sort_unstable();
        names.dedup();
        names
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
