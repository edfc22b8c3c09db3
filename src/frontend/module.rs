//! Source unit loading
//!
//! Units arrive as JSON documents written by the parser. The loader finds
//! them on disk and decodes them; it does not follow imports.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::frontend::session::SourceUnit;
use crate::utils::{Error, Location, Result};

/// Extensions tried, in order, when a unit is named without one
const UNIT_EXTENSIONS: [&str; 2] = ["pine.json", "json"];

/// Finds and decodes source units
pub struct ModuleLoader {
    /// Directories searched for unit files
    search_paths: Vec<PathBuf>,
}

impl ModuleLoader {
    /// Create a new loader searching the current directory
    pub fn new() -> Self {
        Self { search_paths: vec![PathBuf::from(".")] }
    }

    /// Add a search path
    pub fn add_search_path(&mut self, path: PathBuf) {
        if !self.search_paths.contains(&path) {
            self.search_paths.push(path);
        }
    }

    /// Find a unit file by name: as given, then with each unit extension,
    /// in every search path
    pub fn find_unit_file(&self, name: &str) -> Option<PathBuf> {
        let direct = PathBuf::from(name);
        if direct.is_file() {
            return Some(direct);
        }
        for search_path in &self.search_paths {
            let candidate = search_path.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
            for extension in UNIT_EXTENSIONS {
                let candidate = search_path.join(format!("{}.{}", name, extension));
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// Load a unit by name
    pub fn load(&self, name: &str) -> Result<SourceUnit> {
        let path = self.find_unit_file(name).ok_or_else(|| Error::ImportFail {
            filename: name.to_string(),
            location: Location::dummy(),
        })?;
        load_unit(&path)
    }
}

impl Default for ModuleLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Read and decode the unit stored at `path`
pub fn load_unit(path: &Path) -> Result<SourceUnit> {
    debug!("loading {}", path.display());
    let text = fs::read_to_string(path).map_err(|_| Error::ImportFail {
        filename: path.display().to_string(),
        location: Location::dummy(),
    })?;
    parse_unit(&text, &path.display().to_string())
}

/// Decode a unit. A unit without a filename takes `fallback_name`.
pub fn parse_unit(text: &str, fallback_name: &str) -> Result<SourceUnit> {
    let mut unit: SourceUnit = serde_json::from_str(text).map_err(|e| Error::Syntax {
        message: e.to_string(),
        location: Location::line(e.line(), e.column(), e.column()),
    })?;
    if unit.filename.is_empty() {
        unit.filename = fallback_name.to_string();
    }
    Ok(unit)
}
