//! Printer round trip: rendered source behaves like the original

mod common;

use common::{assert_eq, run};
use lox_runtime::ast::Stmt;
use lox_runtime::{parse, print_expr, print_program};
use proptest::prelude::*;

/// Render the single expression of `print <source>;`
fn render(source: &str) -> Option<String> {
    let (program, diagnostics) = parse(&format!("print {};", source));
    if !diagnostics.is_empty() {
        return None;
    }
    match program.statements.first() {
        Some(Stmt::Print(expr)) => Some(print_expr(expr)),
        _ => None,
    }
}

/// What running `print <source>;` produces: output, or the first error report
fn observe(source: &str) -> String {
    let (outcome, output) = run(&format!("print {};", source));
    match outcome.diagnostics.first() {
        Some(diag) => format!("{}error: {}", output, diag.message),
        None => output,
    }
}

// ============================================================================
// Generated expressions
// ============================================================================

fn leaf() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u8..10).prop_map(|n| n.to_string()),
        Just("0.5".to_string()),
        Just("true".to_string()),
        Just("false".to_string()),
        Just("nil".to_string()),
        Just("\"s\"".to_string()),
    ]
}

/// Operator expressions without `ifx`
fn operand() -> impl Strategy<Value = String> {
    leaf().prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (
                inner.clone(),
                prop::sample::select(vec![
                    "+", "-", "*", "/", "<", ">=", "==", "!=", "and", "or",
                ]),
                inner.clone()
            )
                .prop_map(|(l, op, r)| format!("{} {} {}", l, op, r)),
            inner.clone().prop_map(|e| format!("({})", e)),
            inner.clone().prop_map(|e| format!("-{}", e)),
            inner.prop_map(|e| format!("!{}", e)),
        ]
    })
}

/// Full expressions, with `ifx` branches that cannot fuse with what
/// precedes them
fn expression() -> impl Strategy<Value = String> {
    operand().prop_recursive(3, 24, 3, |inner| {
        let branch = inner
            .clone()
            .prop_filter("branch must not continue the previous operand", |s| {
                !s.starts_with('(') && !s.starts_with('-') && !s.contains(',')
            });
        prop_oneof![
            (operand(), branch.clone(), branch)
                .prop_map(|(c, t, e)| format!("ifx {} {} {}", c, t, e)),
            (inner.clone(), inner).prop_map(|(l, r)| format!("{}, {}", l, r)),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Re-parsing a rendering evaluates exactly like the source did
    #[test]
    fn rendering_preserves_behaviour(source in expression()) {
        let rendered = render(&source);
        prop_assume!(rendered.is_some());
        let rendered = rendered.unwrap_or_default();
        prop_assert_eq!(observe(&source), observe(&rendered));
    }

    /// Rendering a rendering changes nothing
    #[test]
    fn rendering_is_stable(source in expression()) {
        let rendered = render(&source);
        prop_assume!(rendered.is_some());
        let rendered = rendered.unwrap_or_default();
        prop_assert_eq!(render(&rendered), Some(rendered.clone()));
    }
}

// ============================================================================
// Fixed cases
// ============================================================================

#[test]
fn test_stacked_ifx_round_trip() {
    for source in [
        "ifx false ifx true 1 2 3",
        "ifx nil 1 ifx 0 2 3",
        "ifx true ifx false 1 ifx true 2 3 4",
        "ifx 1 < 2 \"lt\" \"ge\"",
    ] {
        let rendered = render(source).expect("parses");
        assert_eq!(observe(source), observe(&rendered), "for {:?}", source);
    }
}

#[test]
fn test_program_round_trip() {
    let source = "var total = 0;
        fun add(n) { total = total + n; return total; }
        for (var i = 0; i < 4; i = i + 1) { if i == 2 { break; } add(i); }
        var f = fun (x) { return ifx x > 0 x 0 - x; };
        print f(-3), total;";
    let (program, diagnostics) = parse(source);
    assert!(diagnostics.is_empty());
    let rendered = print_program(&program);

    let (_, original) = run(source);
    let (outcome, reprinted) = run(&rendered);
    assert!(outcome.status.is_success(), "rendered:\n{}", rendered);
    assert_eq!(original, reprinted);
    assert_eq!(original, "1\n");
}
