//! Frontend module - Declaration Trees, Symbol Tables, Semantic Analysis

pub mod ast;
pub mod symbols;
pub mod resolve;
pub mod overload;
pub mod semantic;
pub mod session;
pub mod module;

#[cfg(test)]
pub(crate) mod testing;
