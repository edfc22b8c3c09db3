//! Human-readable diagnostics
//!
//! The offending line is marked `ERROR >>` inside a window of numbered
//! source lines, followed by the hint of the error if it has one.

use crate::utils::{Diagnostic, Location, SourceFile};

const MARKER: &str = "    ERROR >> ";

/// Render a diagnostic with `context_lines` source lines on each side of
/// the error line
pub fn render(diagnostic: &Diagnostic, context_lines: usize) -> String {
    let error = &diagnostic.error;
    let file = &diagnostic.file;
    let mut out = if error.is_internal() {
        format!("internal compiler error[{}]: {}\n", error.code(), error)
    } else {
        format!("error[{}] {}: {}\n", error.code(), error.name(), error)
    };

    if let Some(location) = error.location().filter(|l| !l.is_dummy()) {
        out.push_str(&format!("  --> {}:{}\n", file.filename, location));
        if file.line(location.first_line).is_some() {
            out.push('\n');
            out.push_str(&label_lines(file, location, context_lines));
        }
    }

    if let Some(hint) = error.hint() {
        out.push_str(&format!("\nhint: {}\n", hint));
    }
    out
}

/// Numbered lines around `location`, the error line marked and its
/// columns underlined
pub fn label_lines(file: &SourceFile, location: Location, context_lines: usize) -> String {
    let error_line = location.first_line;
    let first = error_line.saturating_sub(context_lines).max(1);
    let last = (error_line + context_lines).min(file.line_count());
    let width = last.to_string().len();
    let blank = " ".repeat(MARKER.len());

    let mut out = String::new();
    for number in first..=last {
        let text = file.line(number).unwrap_or_default();
        let prefix = if number == error_line { MARKER } else { blank.as_str() };
        out.push_str(&format!("{}{:>width$} | {}\n", prefix, number, text, width = width));

        if number == error_line && location.last_line == error_line && location.first_column > 0 {
            let start = location.first_column;
            let end = location.last_column.max(start);
            out.push_str(&format!(
                "{}{} | {}{}\n",
                blank,
                " ".repeat(width),
                " ".repeat(start - 1),
                "^".repeat(end - start + 1)
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BuiltinKind, Type};
    use crate::utils::Error;
    use pretty_assertions::assert_eq;

    fn numbered_file(lines: usize) -> SourceFile {
        let content: Vec<String> = (1..=lines).map(|n| format!("line {}", n)).collect();
        SourceFile::new("long.pine", content.join("\n"))
    }

    #[test]
    fn test_render_marks_error_line() {
        let file = SourceFile::new("list.pine", "def .main\n    let xs = [1, \"a\"]\n");
        let error = Error::ListElementsArentHomogeneous {
            position: 2,
            expected: Type::builtin(BuiltinKind::Integer),
            actual: Type::builtin(BuiltinKind::String),
            location: Location::line(2, 18, 20),
        };
        let text = render(&Diagnostic::new(error, &file), 5);

        assert!(text.starts_with("error[E0024] ListElementsArentHomogeneous: "));
        assert!(text.contains("  --> list.pine:2:18\n"));
        assert!(text.contains("    ERROR >> 2 |     let xs = [1, \"a\"]\n"));
        assert!(text.contains("             1 | def .main\n"));
        assert!(text.contains("\nhint: Use a tuple"));
    }

    #[test]
    fn test_window_is_limited_by_context() {
        let window = label_lines(&numbered_file(20), Location::line(10, 1, 4), 2);
        let numbered: Vec<&str> = window.lines().filter(|l| !l.trim_start().starts_with('|')).collect();
        assert_eq!(numbered.len(), 5);
        assert!(numbered[0].ends_with(" 8 | line 8"));
        assert!(numbered[4].ends_with("12 | line 12"));
        assert!(window.contains("ERROR >> 10 | line 10\n"));
        assert!(window.contains("   | ^^^^\n"));
    }

    #[test]
    fn test_window_clamped_at_file_start() {
        let window = label_lines(&numbered_file(3), Location::line(1, 1, 1), 5);
        assert_eq!(window.lines().next(), Some("    ERROR >> 1 | line 1"));
    }

    #[test]
    fn test_internal_errors_render_distinctly() {
        let text = render(&Diagnostic::new(Error::Internal("lost".to_string()), &SourceFile::default()), 5);
        assert!(text.starts_with("internal compiler error[E9999]: Internal compiler error: lost"));
        assert!(text.contains("possibly a compiler bug"));
    }
}
