//! Source file context handed to the analyzer and to diagnostics

use serde::{Deserialize, Serialize};

/// The file currently being compiled. Passed explicitly wherever an error
/// may need the original text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub filename: String,
    #[serde(default)]
    pub content: String,
}

impl SourceFile {
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self { filename: filename.into(), content: content.into() }
    }

    /// Get a 1-based line of the content
    pub fn line(&self, number: usize) -> Option<&str> {
        if number == 0 {
            return None;
        }
        self.content.lines().nth(number - 1)
    }

    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }
}
