use crate::ast::ArithmeticOperation::{self, *};
use crate::evaluator::operations::{arithmetic, negate};
use crate::parser::parse_value;
use crate::semantic::{ErrorKind, ErrorValue, FormatOptions, SemanticValue, SymbolicValue, ValueType};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn value(text: &str) -> SemanticValue {
    parse_value(text).unwrap_or_else(|| panic!("'{}' should parse", text))
}

fn apply(left: &str, op: ArithmeticOperation, right: &str) -> SemanticValue {
    arithmetic(&value(left), op, &value(right))
}

fn shown(result: SemanticValue) -> String {
    result.format(&FormatOptions::default())
}

fn error_kind(result: SemanticValue) -> ErrorKind {
    match result {
        SemanticValue::Error(error) => error.kind,
        other => panic!("expected an error, got {:?}", other),
    }
}

#[test]
fn test_percentage_forms() {
    assert_eq!(apply("100", Add, "10%"), SemanticValue::number(110));
    assert_eq!(apply("100", Subtract, "10%"), SemanticValue::number(90));
    assert_eq!(apply("100", Multiply, "10%"), SemanticValue::number(10));
    assert_eq!(apply("20%", Multiply, "50"), SemanticValue::number(10));
    assert_eq!(apply("10%", Add, "5%"), SemanticValue::Percentage(dec!(15)));
    assert_eq!(error_kind(apply("10%", Add, "100")), ErrorKind::Type);
}

#[test]
fn test_money_arithmetic() {
    assert_eq!(shown(apply("$50", Add, "$30")), "$80");
    assert_eq!(shown(apply("$100", Add, "10%")), "$110");
    assert_eq!(shown(apply("$20", Multiply, "3")), "$60");
    assert_eq!(apply("$60", Divide, "$20"), SemanticValue::number(3));
    assert_eq!(error_kind(apply("$50", Add, "50 EUR")), ErrorKind::Semantic);
}

#[test]
fn test_rates_cancel_units() {
    assert_eq!(shown(apply("$100/m^2", Multiply, "5 m^2")), "$500");
    assert_eq!(shown(apply("$25/h", Multiply, "8 h")), "$200");
    assert_eq!(apply("$100", Divide, "4 h").value_type(), ValueType::CurrencyUnit);
}

#[test]
fn test_unit_arithmetic() {
    assert_eq!(shown(apply("50 m", Add, "20 ft")), "56.096 m");
    assert_eq!(apply("10 m", Divide, "2 m"), SemanticValue::number(5));
    assert_eq!(apply("3 m", Multiply, "2 m").value_type(), ValueType::Unit);
    assert_eq!(error_kind(apply("3 m", Add, "2 kg")), ErrorKind::Semantic);
}

#[test]
fn test_plain_numbers_do_not_take_a_unit() {
    assert_eq!(error_kind(apply("10 °C", Add, "5")), ErrorKind::Semantic);
    assert_eq!(error_kind(apply("5", Add, "3 m")), ErrorKind::Semantic);
    assert_eq!(error_kind(apply("5 m", Subtract, "3")), ErrorKind::Semantic);
    match apply("5 m", Add, "3") {
        SemanticValue::Error(error) => assert!(error.suggestion.unwrap().contains("3 m")),
        other => panic!("expected an error, got {:?}", other),
    }

    assert_eq!(shown(apply("5 m", Add, "0")), "5 m");
    assert_eq!(shown(apply("0", Subtract, "5 m")), "-5 m");
    assert_eq!(shown(apply("5 m", Multiply, "3")), "15 m");
}

#[test]
fn test_a_zero_quantity_combines_with_any_dimension() {
    assert_eq!(shown(apply("0 m", Add, "5 kg")), "5 kg");
    assert_eq!(shown(apply("5 kg", Add, "0 m")), "5 kg");
    assert_eq!(shown(apply("0 m", Subtract, "5 kg")), "-5 kg");
    assert_eq!(error_kind(apply("1 m", Add, "5 kg")), ErrorKind::Semantic);
}

#[test]
fn test_temperature_addition_uses_degree_size() {
    assert_eq!(shown(apply("20 °C", Add, "10 K")), "30 °C");
    assert_eq!(shown(apply("20 °C", Add, "18 °F")), "30 °C");
    assert_eq!(shown(apply("50 °F", Subtract, "5 °C")), "41 °F");
}

#[test]
fn test_dates_and_durations() {
    assert_eq!(shown(apply("2024-01-31", Add, "1 month")), "2024-02-29");
    assert_eq!(shown(apply("2024-03-15", Add, "3 business days")), "2024-03-20");
    assert_eq!(shown(apply("2024-03-15", Subtract, "2024-03-01")), "14 days");
    assert_eq!(apply("2024-03-15", Add, "2024-03-01").value_type(), ValueType::Error);
    assert_eq!(shown(apply("14:30", Add, "45 minutes")), "15:15");
}

#[test]
fn test_division_by_zero() {
    for op in [Divide, Modulo] {
        match apply("1", op, "0") {
            SemanticValue::Error(error) => {
                assert_eq!(error.kind, ErrorKind::Semantic);
                assert_eq!(error.message, "Division by zero");
            }
            other => panic!("expected an error, got {:?}", other),
        }
    }
}

#[test]
fn test_errors_propagate_and_chain() {
    let a = SemanticValue::Error(ErrorValue::unknown_variable("a"));
    let b = SemanticValue::Error(ErrorValue::unknown_variable("b"));
    match arithmetic(&a, Add, &b) {
        SemanticValue::Error(error) => assert_eq!(error.unresolved, vec!["a", "b"]),
        other => panic!("expected an error, got {:?}", other),
    }
    assert!(arithmetic(&a, Multiply, &SemanticValue::number(2)).is_error());
}

#[test]
fn test_symbolic_operands_stay_symbolic() {
    let x = SemanticValue::Symbolic(SymbolicValue::atom("x"));
    match arithmetic(&arithmetic(&x, Add, &SemanticValue::number(1)), Multiply, &SemanticValue::number(2)) {
        SemanticValue::Symbolic(s) => assert_eq!(s.text, "(x + 1) * 2"),
        other => panic!("expected a symbolic value, got {:?}", other),
    }
    assert!(matches!(negate(&x), SemanticValue::Symbolic(ref s) if s.text == "-x"));
}

#[test]
fn test_lists_broadcast_and_zip() {
    assert_eq!(shown(apply("[1, 2, 3]", Multiply, "2")), "[2, 4, 6]");
    assert_eq!(shown(apply("[1, 2]", Add, "[10, 20]")), "[11, 22]");
    assert!(apply("[1, 2]", Add, "[1, 2, 3]").is_error());
}

proptest! {
    #[test]
    fn prop_adding_a_percentage_scales(n in -1_000_000i64..1_000_000, p in 0i64..500) {
        let n = Decimal::from(n);
        let p = Decimal::from(p);
        let result = arithmetic(&SemanticValue::Number(n), Add, &SemanticValue::Percentage(p));
        let expected = n * (Decimal::ONE + p / Decimal::ONE_HUNDRED);
        prop_assert!(result.approx_eq(&SemanticValue::Number(expected)));
    }

    #[test]
    fn prop_operands_are_not_mutated(a in -10_000i64..10_000, b in 1i64..10_000) {
        let left = SemanticValue::Currency(crate::semantic::Money::new(
            Decimal::from(a),
            crate::semantic::currency::by_code("USD").unwrap(),
        ));
        let right = SemanticValue::number(b);
        let before = (left.clone(), right.clone());
        for op in [Add, Subtract, Multiply, Divide] {
            let _ = arithmetic(&left, op, &right);
        }
        prop_assert_eq!((left, right), before);
    }
}
