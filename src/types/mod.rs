//! Type values and the subtype lattice

pub mod type_system;
pub mod lattice;

pub use type_system::{type_equals, BuiltinKind, Type, TypeKind, BOOLEAN_ENUM, NIL_ENUM};
pub use lattice::TypeLattice;
