//! Utility module

mod span;
mod source;
mod error;
pub mod suggest;

pub use span::Location;
pub use source::SourceFile;
pub use error::{ordinal, Diagnostic, Error, Result};
