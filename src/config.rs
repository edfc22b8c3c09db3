//! Checker configuration

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Source lines shown on each side of an error
pub const DEFAULT_CONTEXT_LINES: usize = 5;

/// How diagnostics are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Numbered source window with the error line marked
    #[default]
    Human,
    /// One `CompilationFeedback` JSON document
    Json,
}

/// Options of one `pinec check` run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub format: OutputFormat,
    pub context_lines: usize,
    /// Print the annotated declaration trees after a successful check
    pub emit_typed: bool,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_context_lines(mut self, context_lines: usize) -> Self {
        self.context_lines = context_lines;
        self
    }

    pub fn with_emit_typed(mut self, emit_typed: bool) -> Self {
        self.emit_typed = emit_typed;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            context_lines: DEFAULT_CONTEXT_LINES,
            emit_typed: false,
        }
    }
}
