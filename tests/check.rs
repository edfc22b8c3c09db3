//! End-to-end checks over JSON units on disk

use std::path::PathBuf;

use pineapple::feedback::{render, CheckStats, CompilationFeedback, ErrorReport};
use pineapple::frontend::ast::{Declaration, ExprKind, Stmt};
use pineapple::frontend::module::ModuleLoader;
use pineapple::types::{type_equals, BuiltinKind, Type};
use pineapple::{CompilationSession, Error, SourceUnit};
use pretty_assertions::assert_eq;

fn loader() -> ModuleLoader {
    let mut loader = ModuleLoader::new();
    loader.add_search_path(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures"));
    loader
}

fn load(name: &str) -> SourceUnit {
    loader().load(name).unwrap()
}

fn main_body(unit: &SourceUnit) -> &[Stmt] {
    match &unit.declarations[0] {
        Declaration::Function(func) => &func.body,
        other => panic!("expected a function, got {:?}", other),
    }
}

#[test]
fn test_library_then_application() {
    let mut session = CompilationSession::new();
    let mut lib = load("lib");
    let mut app = load("app");
    session.add_unit(&mut lib).unwrap();
    session.add_unit(&mut app).unwrap();

    assert_eq!(session.checked_files(), ["lib.pine".to_string(), "app.pine".to_string()]);
    assert!(session.symbols().find_struct("People").is_some());

    let Stmt::Assignment(total) = &main_body(&app)[0] else { panic!("expected an assignment") };
    let ty = total.variable.resolved_type.as_ref().unwrap();
    assert!(type_equals(ty, &Type::builtin(BuiltinKind::Number)));
    let ExprKind::Call(call) = &total.value.kind else { panic!("expected a call") };
    let resolved = call.resolved.as_ref().unwrap();
    assert_eq!(resolved.params.len(), 2);
    assert!(resolved.params.iter().all(|p| p.to_string() == "Number"));
}

#[test]
fn test_units_out_of_order_fail() {
    let mut session = CompilationSession::new();
    let diagnostic = session.add_unit(&mut load("app")).unwrap_err();
    assert_eq!(diagnostic.file.filename, "app.pine");
    assert!(matches!(diagnostic.error, Error::UsingUnknownFunction { .. } | Error::UsingUndefinedType { .. }));
    assert!(session.checked_files().is_empty());
}

#[test]
fn test_typo_is_reported_with_source() {
    let mut session = CompilationSession::new();
    session.add_unit(&mut load("lib")).unwrap();
    let diagnostic = session.add_unit(&mut load("typo")).unwrap_err();

    let text = render(&diagnostic, 5);
    assert!(text.contains("UsingUndefinedVariable"));
    assert!(text.contains("  --> typo.pine:3:5\n"));
    assert!(text.contains("ERROR >> 3 |     cuont.show\n"));

    let report = ErrorReport::from_diagnostic(&diagnostic);
    assert_eq!(report.suggestions[0].replacement.as_deref(), Some("count"));

    let stats = CheckStats::from_symbols(session.symbols(), session.checked_files().len(), 0);
    let feedback = CompilationFeedback::failure(session.checked_files().to_vec(), vec![report], stats);
    let value: serde_json::Value = serde_json::from_str(&feedback.to_json()).unwrap();
    assert_eq!(value["success"], serde_json::Value::Bool(false));
    assert_eq!(value["diagnostics"][0]["location"]["line"], 3);
    assert_eq!(value["stats"]["unit_count"], 1);
}

#[test]
fn test_unknown_unit_name() {
    assert!(matches!(loader().load("nowhere"), Err(Error::ImportFail { .. })));
}
