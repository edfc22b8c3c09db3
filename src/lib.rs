//! Pineapple semantic core
//!
//! Type resolution, overload resolution and static checks for parsed
//! Pineapple declaration trees.

pub mod config;
pub mod feedback;
pub mod frontend;
pub mod types;
pub mod utils;

pub use frontend::session::{CompilationSession, SourceUnit};
pub use utils::{Diagnostic, Error, Result};
