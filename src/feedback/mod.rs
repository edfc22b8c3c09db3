//! Structured Feedback Module
//!
//! Provides machine-readable output of a check run:
//! - JSON error reports with codes, suggestions and hints
//! - Check statistics

pub mod render;

pub use render::render;

use serde::{Deserialize, Serialize};

use crate::frontend::symbols::SymbolTable;
use crate::utils::Diagnostic;

// ==================== Structured Error Report ====================

/// A structured error report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Error code (e.g., "E0024")
    pub code: String,

    /// Error kind (e.g., "ListElementsArentHomogeneous")
    pub name: String,

    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Location information
    pub location: Option<Location>,

    /// Suggested replacements
    pub suggestions: Vec<Suggestion>,

    /// Remediation hint
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    /// A defect of the compiler rather than of the program
    InternalError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub end_line: Option<usize>,
    pub end_column: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    /// Description of the fix
    pub message: String,

    /// The replacement text
    pub replacement: Option<String>,
}

// ==================== Compilation Feedback ====================

/// Complete feedback of one check run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilationFeedback {
    pub success: bool,

    /// Units in the order they were checked
    pub files: Vec<String>,

    pub diagnostics: Vec<ErrorReport>,

    pub stats: CheckStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckStats {
    /// Time spent checking, in milliseconds
    pub check_time_ms: u64,

    /// Number of units checked successfully
    pub unit_count: usize,

    /// Number of overloads in the function table, specialisations included
    pub function_count: usize,

    pub struct_count: usize,

    pub enum_count: usize,

    /// Number of nodes in the subtype lattice
    pub type_count: usize,
}

impl CheckStats {
    /// Counts taken from the tables at the end of a run
    pub fn from_symbols(symbols: &SymbolTable, unit_count: usize, check_time_ms: u64) -> Self {
        Self {
            check_time_ms,
            unit_count,
            function_count: symbols.functions.len(),
            struct_count: symbols.structs.len(),
            enum_count: symbols.enums.len(),
            type_count: symbols.lattice.len(),
        }
    }
}

// ==================== Error Conversion ====================

impl ErrorReport {
    /// Create an error report from a diagnostic
    pub fn from_diagnostic(diagnostic: &Diagnostic) -> Self {
        let error = &diagnostic.error;
        let location = error.location().filter(|l| !l.is_dummy()).map(|l| Location {
            file: diagnostic.file.filename.clone(),
            line: l.first_line,
            column: l.first_column,
            end_line: Some(l.last_line),
            end_column: Some(l.last_column),
        });
        let severity = if error.is_internal() { Severity::InternalError } else { Severity::Error };

        Self {
            code: error.code().to_string(),
            name: error.name().to_string(),
            severity,
            message: error.to_string(),
            location,
            suggestions: error
                .suggestions()
                .iter()
                .map(|name| Suggestion {
                    message: format!("Did you mean `{}`?", name),
                    replacement: Some(name.clone()),
                })
                .collect(),
            hint: error.hint(),
        }
    }
}

impl CompilationFeedback {
    /// Create a successful feedback
    pub fn success(files: Vec<String>, stats: CheckStats) -> Self {
        Self {
            success: true,
            files,
            diagnostics: vec![],
            stats,
        }
    }

    /// Create a failed feedback
    pub fn failure(files: Vec<String>, errors: Vec<ErrorReport>, stats: CheckStats) -> Self {
        Self {
            success: false,
            files,
            diagnostics: errors,
            stats,
        }
    }

    /// Output as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Output as compact JSON (for programmatic use)
    pub fn to_json_compact(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
