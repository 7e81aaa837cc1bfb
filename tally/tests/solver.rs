use chrono::{FixedOffset, TimeZone};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally::{Engine, SemanticValue};

fn engine() -> Engine {
    Engine::with_now(FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap())
}

fn number(engine: &mut Engine, line: &str) -> Decimal {
    let node = engine.evaluate_line(line);
    match node.semantic_value() {
        Some(SemanticValue::Number(n)) => *n,
        other => panic!("'{}' gave {:?} ({})", line, other, node.display_text),
    }
}

fn close(actual: Decimal, expected: Decimal) -> bool {
    (actual - expected).abs() < dec!(0.000001)
}

#[test]
fn test_linear_equations() {
    let mut engine = engine();
    assert_eq!(number(&mut engine, "solve x in y = 2*x + 3, y = 11"), dec!(4));
    assert_eq!(number(&mut engine, "solve x in 10 = 4 - x"), dec!(-6));
    assert_eq!(number(&mut engine, "solve for n in 3 * (n + 2) = 21"), dec!(5));
    assert_eq!(number(&mut engine, "solve d in 100 / d = 4"), dec!(25));
}

#[test]
fn test_helpers_after_where() {
    let mut engine = engine();
    let r = number(&mut engine, "solve for r in a = pi * r^2 where a = 50");
    assert!(close(r, dec!(3.989423)), "r = {}", r);
}

#[test]
fn test_powers_and_exponents() {
    let mut engine = engine();
    assert!(close(number(&mut engine, "solve v in 27 = v^3"), dec!(3)));
    assert!(close(number(&mut engine, "solve t in 2^t = 32"), dec!(5)));
}

#[test]
fn test_symbolic_answers() {
    let mut engine = engine();
    let node = engine.evaluate_line("solve x in y = m*x + b");
    assert_eq!(node.result(), Some("(y - b) / m"));
    let node = engine.evaluate_line("solve b in y = m*x + b");
    assert_eq!(node.result(), Some("y - m * x"));
    engine.evaluate_line("m = 2");
    let node = engine.evaluate_line("solve x in y = m*x + b");
    assert_eq!(node.result(), Some("(y - b) / 2"));
}

#[test]
fn test_square_root_needs_a_non_negative_value() {
    let mut engine = engine();
    engine.evaluate_line("a = 16");
    assert!(close(number(&mut engine, "solve s in a = s^2"), dec!(4)));

    engine.evaluate_line("a = -4");
    let node = engine.evaluate_line("solve s in a = s^2");
    assert!(node.is_error());
    assert!(node.display_text.contains("Cannot take the square root of a negative number"));
}

#[test]
fn test_implicit_square_root_of_a_negative_value_is_an_error() {
    let nodes = engine().evaluate_document("a = s^2\na = -4\ns").unwrap();
    let last = &nodes[2];
    assert_eq!(last.kind_name(), "error");
    assert!(last.display_text.contains("Cannot take the square root of a negative number"));

    let nodes = engine().evaluate_document("a = s^2\na = 9\ns").unwrap();
    assert_eq!(nodes[2].result(), Some("3"));
}

#[test]
fn test_unsolvable_requests() {
    let mut engine = engine();
    for line in [
        "solve z in y = 2 * x",
        "solve x in x = x * 2 + 1",
        "solve x in y = x * x",
        "solve x in y = sqrt(x)",
        "solve x in y = x mod 3",
        "solve x in y = 2^x^x",
    ] {
        let node = engine.evaluate_line(line);
        assert!(node.is_error(), "'{}' should not solve: {}", line, node.display_text);
        assert_eq!(node.kind_name(), "error");
    }
}

#[test]
fn test_implicit_solving_from_earlier_lines() {
    let mut engine = engine();
    engine.evaluate_line("total = price * qty");
    engine.evaluate_line("total = 120");
    engine.evaluate_line("qty = 4");
    assert_eq!(number(&mut engine, "price"), dec!(30));
}

#[test]
fn test_implicit_solving_without_enough_values_stays_symbolic() {
    let mut engine = engine();
    engine.evaluate_line("area = width * height");
    let node = engine.evaluate_line("width");
    assert_eq!(node.result(), Some("area / height"));
}
