//! REPL session behaviour across lines

mod common;

use common::assert_eq;
use lox_runtime::{ReplCore, RunStatus};

#[test]
fn test_definitions_persist_between_lines() {
    let mut repl = ReplCore::new();
    assert_eq!(repl.eval_line("var a = 1;").stdout, "");
    assert_eq!(repl.eval_line("fun inc() { a = a + 1; }").stdout, "");
    repl.eval_line("inc();");
    assert_eq!(repl.eval_line("a;").stdout, "2\n");
}

#[test]
fn test_only_expression_statements_echo() {
    let mut repl = ReplCore::new();
    assert_eq!(repl.eval_line("\"hi\";").stdout, "hi\n");
    assert_eq!(repl.eval_line("print \"hi\";").stdout, "hi\n");
    assert_eq!(repl.eval_line("var x = 3;").stdout, "");
    assert_eq!(repl.eval_line("x = 4;").stdout, "4\n");
    assert_eq!(repl.eval_line("{ x; }").stdout, "");
}

#[test]
fn test_closures_defined_on_earlier_lines() {
    let mut repl = ReplCore::new();
    repl.eval_line("fun make() { var n = 0; return fun () { n = n + 1; return n; }; }");
    repl.eval_line("var c = make();");
    repl.eval_line("c();");
    assert_eq!(repl.eval_line("c();").stdout, "2\n");
}

#[test]
fn test_locals_resolve_on_every_line() {
    let mut repl = ReplCore::new();
    assert_eq!(repl.eval_line("{ var a = 1; { print a; } }").stdout, "1\n");
    assert_eq!(repl.eval_line("{ var b = 2; { print b; } }").stdout, "2\n");
    assert_eq!(repl.eval_line("{ var a = \"x\"; print a; }").stdout, "x\n");
}

#[test]
fn test_static_error_reports_and_runs_nothing() {
    let mut repl = ReplCore::new();
    let result = repl.eval_line("print 1; print ;");
    assert_eq!(result.status, RunStatus::StaticError);
    assert_eq!(result.stdout, "");
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].file, "<repl>");
}

#[test]
fn test_runtime_error_keeps_partial_output() {
    let mut repl = ReplCore::new();
    let result = repl.eval_line("print \"before\"; nil();");
    assert_eq!(result.status, RunStatus::RuntimeError);
    assert_eq!(result.stdout, "before\n");
    assert_eq!(
        result.diagnostics[0].message,
        "Can only call functions and classes."
    );
}

#[test]
fn test_session_recovers_after_errors() {
    let mut repl = ReplCore::new();
    repl.eval_line("var ok = \"yes\";");
    repl.eval_line("break;");
    repl.eval_line("ok + 1;");
    let result = repl.eval_line("ok;");
    assert_eq!(result.status, RunStatus::Success);
    assert_eq!(result.stdout, "yes\n");
}
