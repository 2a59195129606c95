//! Diagnostic codes, locations and output formats

mod common;

use common::{assert_eq, run};
use lox_runtime::{error_codes, DiagnosticFormatter, RunStatus};
use rstest::rstest;

#[rstest]
#[case("@", error_codes::UNEXPECTED_CHARACTER)]
#[case("\"open", error_codes::UNTERMINATED_STRING)]
#[case("print ;", error_codes::SYNTAX_ERROR)]
#[case("1 = 2;", error_codes::INVALID_ASSIGNMENT_TARGET)]
#[case("break;", error_codes::BREAK_OUTSIDE_LOOP)]
#[case("return;", error_codes::RETURN_OUTSIDE_FUNCTION)]
#[case("while true { continue; }", error_codes::CONTINUE_UNSUPPORTED)]
fn test_static_error_codes(#[case] source: &str, #[case] code: &str) {
    let (outcome, _) = run(source);
    assert_eq!(outcome.status, RunStatus::StaticError);
    assert_eq!(outcome.diagnostics[0].code, code);
}

#[rstest]
#[case("-nil;", error_codes::TYPE_ERROR)]
#[case("undeclared = 1;", error_codes::UNDEFINED_VARIABLE)]
#[case("print undeclared;", error_codes::UNASSIGNED_VARIABLE)]
#[case("clock(1);", error_codes::ARITY_MISMATCH)]
#[case("1();", error_codes::NOT_CALLABLE)]
#[case("sleep(-1);", error_codes::NATIVE_ERROR)]
fn test_runtime_error_codes(#[case] source: &str, #[case] code: &str) {
    let (outcome, _) = run(source);
    assert_eq!(outcome.status, RunStatus::RuntimeError);
    assert_eq!(outcome.diagnostics[0].code, code);
}

#[test]
fn test_lexical_and_syntax_errors_reported_together() {
    let (outcome, _) = run("print @;\nvar = 1;");
    let reports: Vec<String> = outcome.diagnostics.iter().map(|d| d.to_string()).collect();
    assert_eq!(
        reports,
        vec![
            "[line 1] Error: Unexpected character `@`.".to_string(),
            "[line 1] Error at ';': Expected expression.".to_string(),
            "[line 2] Error at '=': Expected variable name.".to_string(),
        ]
    );
}

#[test]
fn test_resolution_is_skipped_after_syntax_errors() {
    let (outcome, _) = run("return 1;\nprint ;");
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].code, error_codes::SYNTAX_ERROR);
}

#[test]
fn test_locations_are_filled_in() {
    let (outcome, _) = run("var a = 1;\n  print a + nil;");
    let diag = &outcome.diagnostics[0];
    assert_eq!(diag.line, 2);
    assert_eq!(diag.column, 11);
    assert_eq!(diag.snippet, "  print a + nil;");
    assert_eq!(diag.notes, vec!["in a + nil".to_string()]);
}

#[test]
fn test_json_output() {
    let (outcome, _) = run("print -\"x\";");
    let json = outcome.diagnostics[0].to_json_string().expect("serialises");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["code"], "LX0001");
    assert_eq!(value["message"], "Operand must be a number.");
    assert_eq!(value["line"], 1);
    assert_eq!(value["column"], 7);
    assert_eq!(value["anchor"]["kind"], "at_lexeme");
    assert_eq!(value["anchor"]["lexeme"], "-");
}

#[test]
fn test_human_output() {
    let (outcome, _) = run("var x = 1;\nprint -\"x\";");
    let bytes = DiagnosticFormatter::plain()
        .format_to_buffer(&outcome.diagnostics[0])
        .expect("renders");
    let text = String::from_utf8(bytes).expect("utf-8");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "error[LX0001]: Operand must be a number.");
    assert_eq!(lines[1], "  --> <input>:2:7");
    assert_eq!(lines[3], " 2| print -\"x\";");
    assert!(lines[4].ends_with("      ^ runtime error"), "caret line: {:?}", lines[4]);
    assert!(text.contains("   = note: in -\"x\""));
}
