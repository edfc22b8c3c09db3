//! Source location tracking

use serde::{Deserialize, Serialize};
use std::fmt;

/// A location is a range of lines/columns in one source file.
///
/// Lines and columns are 1-based, as produced by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub first_line: usize,
    pub first_column: usize,
    pub last_line: usize,
    pub last_column: usize,
}

impl Location {
    /// Create a new location
    pub fn new(first_line: usize, first_column: usize, last_line: usize, last_column: usize) -> Self {
        Self { first_line, first_column, last_line, last_column }
    }

    /// A location covering a single line
    pub fn line(line: usize, first_column: usize, last_column: usize) -> Self {
        Self::new(line, first_column, line, last_column)
    }

    /// Create a dummy location (for builtins and testing)
    pub fn dummy() -> Self {
        Self { first_line: 0, first_column: 0, last_line: 0, last_column: 0 }
    }

    /// Check if the location points nowhere
    pub fn is_dummy(&self) -> bool {
        self.first_line == 0
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::dummy()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.first_line, self.first_column)
    }
}
