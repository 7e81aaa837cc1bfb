use super::Fixture;
use crate::engine::Engine;
use crate::evaluator::evaluate_text;
use crate::semantic::{ErrorKind, SemanticValue};
use chrono::{FixedOffset, TimeZone};
use rust_decimal_macros::dec;

fn eval(text: &str) -> SemanticValue {
    let mut fixture = Fixture::new();
    evaluate_text(text, None, &mut fixture.ctx(1))
}

fn error_message(value: SemanticValue) -> String {
    match value {
        SemanticValue::Error(error) => error.message,
        other => panic!("expected an error, got {:?}", other),
    }
}

fn engine() -> Engine {
    Engine::with_now(FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap())
}

#[test]
fn test_numeric_builtins() {
    assert!(eval("sqrt(16)").approx_eq(&SemanticValue::number(4)));
    assert!(eval("abs(-3.5)").approx_eq(&SemanticValue::Number(dec!(3.5))));
    assert!(eval("round(2.345, 2)").approx_eq(&SemanticValue::Number(dec!(2.35))));
    assert!(eval("floor(2.7) + ceil(2.1)").approx_eq(&SemanticValue::number(5)));
    assert!(eval("log(1000)").approx_eq(&SemanticValue::number(3)));
    assert!(eval("log(8, 2)").approx_eq(&SemanticValue::number(3)));
    assert!(eval("pow(2, 10)").approx_eq(&SemanticValue::number(1024)));
}

#[test]
fn test_aggregates_accept_lists_or_arguments() {
    assert!(eval("sum(1, 2, 3)").approx_eq(&SemanticValue::number(6)));
    assert!(eval("sum([1, 2, 3])").approx_eq(&SemanticValue::number(6)));
    assert!(eval("avg(2, 4)").approx_eq(&SemanticValue::number(3)));
    assert!(eval("median([5, 1, 3, 2])").approx_eq(&SemanticValue::Number(dec!(2.5))));
    assert!(eval("max(1 km, 800 m)").approx_eq(&crate::parser::parse_value("1 km").unwrap()));
    assert!(eval("count(1..4)").approx_eq(&SemanticValue::number(4)));
}

#[test]
fn test_builtin_errors() {
    let error = eval("sqrt(-4)");
    assert!(matches!(error, SemanticValue::Error(ref e) if e.kind == ErrorKind::Semantic));
    assert_eq!(error_message(error), "Cannot take the square root of a negative number");
    assert_eq!(error_message(eval("sqrt(1, 2)")), "sqrt() takes 1 argument(s), got 2");
    assert_eq!(error_message(eval("frobnicate(1)")), "Unknown function 'frobnicate'");
    assert!(eval("sum(1 m, 2 kg)").is_error());
}

#[test]
fn test_user_functions_with_defaults_and_named_arguments() {
    let mut engine = engine();
    engine.evaluate_line("area(w, h = w) = w * h");
    assert_eq!(engine.evaluate_line("area(3, 4)").result(), Some("12"));
    assert_eq!(engine.evaluate_line("area(5)").result(), Some("25"));
    assert_eq!(engine.evaluate_line("area(2, h: 7)").result(), Some("14"));
}

#[test]
fn test_user_function_argument_errors() {
    let mut engine = engine();
    engine.evaluate_line("double(x) = x * 2");
    let node = engine.evaluate_line("double(1, 2)");
    assert!(node.is_error());
    assert!(node.display_text.contains("double(x) takes 1 argument(s), got 2"));

    engine.evaluate_line("scale(x, factor) = x * factor");
    let node = engine.evaluate_line("scale(2)");
    assert!(node.display_text.contains("Missing argument 'factor' for scale(x, factor)"));

    let node = engine.evaluate_line("double(y: 2)");
    assert!(node.display_text.contains("has no parameter 'y'"));
}

#[test]
fn test_user_functions_shadow_builtins() {
    let mut engine = engine();
    engine.evaluate_line("sqrt(x) = x + 1");
    assert_eq!(engine.evaluate_line("sqrt(9)").result(), Some("10"));
}

#[test]
fn test_recursion_hits_call_depth() {
    let mut engine = engine();
    engine.evaluate_line("loop(n) = loop(n + 1)");
    let node = engine.evaluate_line("loop(1)");
    assert!(node.is_error());
    assert!(node.display_text.contains("Maximum call depth of 20 exceeded in 'loop'"));
}
