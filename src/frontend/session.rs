//! Compilation session
//!
//! Owns the symbol tables for a whole compilation and checks one source
//! unit at a time. Units must be added in dependency order.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::frontend::ast::Declaration;
use crate::frontend::semantic::SemanticAnalyzer;
use crate::frontend::symbols::SymbolTable;
use crate::utils::{Diagnostic, SourceFile};

/// The parsed form of one source file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceUnit {
    pub filename: String,
    /// Original text, used to render diagnostics
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

impl SourceUnit {
    pub fn new(filename: impl Into<String>, content: impl Into<String>, declarations: Vec<Declaration>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
            declarations,
        }
    }

    pub fn source_file(&self) -> SourceFile {
        SourceFile::new(self.filename.clone(), self.content.clone())
    }
}

/// Tables and bookkeeping shared by every unit of a compilation
#[derive(Debug, Default)]
pub struct CompilationSession {
    symbols: SymbolTable,
    checked: Vec<String>,
}

impl CompilationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check one unit, annotating its declarations in place and adding
    /// its names to the tables. The first error aborts the unit.
    pub fn add_unit(&mut self, unit: &mut SourceUnit) -> Result<(), Diagnostic> {
        info!("checking {}", unit.filename);
        for decl in &mut unit.declarations {
            if decl.origin().is_empty() {
                decl.set_origin(&unit.filename);
            }
        }

        let mut analyzer = SemanticAnalyzer::new(&mut self.symbols);
        analyzer
            .analyze(&mut unit.declarations)
            .map_err(|error| Diagnostic::new(error, &unit.source_file()))?;

        debug!(
            "{} checked: {} overloads, {} structs, {} enums",
            unit.filename,
            self.symbols.functions.len(),
            self.symbols.structs.len(),
            self.symbols.enums.len()
        );
        self.checked.push(unit.filename.clone());
        Ok(())
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Files checked so far, in order
    pub fn checked_files(&self) -> &[String] {
        &self.checked
    }
}
