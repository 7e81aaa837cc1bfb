use crate::parser::parse_value;
use crate::semantic::{
    currency, DurationPart, DurationUnit, DurationValue, ErrorKind, ErrorValue, FormatOptions, ListValue, Money,
    SemanticValue, SymbolicValue, ValueType,
};
use crate::ast::ArithmeticOperation;
use rust_decimal_macros::dec;

fn value(text: &str) -> SemanticValue {
    parse_value(text).unwrap_or_else(|| panic!("'{}' should parse", text))
}

#[test]
fn test_number_formatting() {
    let options = FormatOptions::default();
    assert_eq!(SemanticValue::Number(dec!(2.50)).format(&options), "2.5");
    assert_eq!(SemanticValue::Number(dec!(1.23456789)).format(&options), "1.234568");
    assert_eq!(SemanticValue::Number(dec!(-0.0000001)).format(&options), "-1e-7");
    assert_eq!(SemanticValue::Number(dec!(0)).format(&options), "0");

    let grouped = FormatOptions {
        thousands_separator: true,
        ..FormatOptions::default()
    };
    assert_eq!(SemanticValue::Number(dec!(1234567.5)).format(&grouped), "1,234,567.5");
}

#[test]
fn test_money_formatting() {
    let options = FormatOptions::default();
    let usd = currency::by_code("usd").unwrap();
    assert_eq!(SemanticValue::Currency(Money::new(dec!(500), usd)).format(&options), "$500");
    assert_eq!(SemanticValue::Currency(Money::new(dec!(12.5), usd)).format(&options), "$12.50");
    let chf = currency::by_code("CHF").unwrap();
    assert_eq!(SemanticValue::Currency(Money::new(dec!(500), chf)).format(&options), "500 CHF");
}

#[test]
fn test_value_types() {
    assert_eq!(value("25%").value_type(), ValueType::Percentage);
    assert_eq!(value("$12.50").value_type(), ValueType::Currency);
    assert_eq!(value("$100/m^2").value_type(), ValueType::CurrencyUnit);
    assert_eq!(value("5 km/h").value_type(), ValueType::Unit);
    assert_eq!(value("2024-03-15").value_type(), ValueType::Date);
    assert_eq!(value("14:30").value_type(), ValueType::Time);
    assert_eq!(value("2 hours 30 minutes").value_type(), ValueType::Duration);
    assert_eq!(value("[1, 2, 3]").value_type(), ValueType::List);
    assert_eq!(ValueType::CurrencyUnit.name(), "currency rate");
}

#[test]
fn test_numeric_projection() {
    assert_eq!(value("25%").to_number().unwrap(), dec!(0.25));
    assert_eq!(value("$12.50").to_number().unwrap(), dec!(12.50));
    assert!(value("2024-03-15").to_number().is_err());
    assert!(value("5 km").is_numeric());
}

#[test]
fn test_tolerant_equality() {
    assert!(SemanticValue::Number(dec!(0.1)).approx_eq(&SemanticValue::Number(dec!(0.10000000000001))));
    assert!(!SemanticValue::Number(dec!(0.1)).approx_eq(&SemanticValue::Number(dec!(0.1001))));
    assert!(value("1 km").approx_eq(&value("1 km")));
    let a = SemanticValue::Symbolic(SymbolicValue::atom("x  +  1"));
    let b = SemanticValue::Symbolic(SymbolicValue::atom("x + 1"));
    assert!(a.approx_eq(&b));
}

#[test]
fn test_values_are_not_mutated_by_arithmetic() {
    let left = value("$50");
    let right = value("$30");
    let sum = left.add(&right);
    assert_eq!(left, value("$50"));
    assert!(sum.approx_eq(&value("$80")));
}

#[test]
fn test_error_chain_merges_unresolved_names() {
    let a = ErrorValue::unknown_variable("a");
    let b = ErrorValue::unknown_variable("b");
    let chained = a.chain(b);
    assert_eq!(chained.unresolved, vec!["a", "b"]);
    assert!(chained.is_unresolved_only());

    let mixed = ErrorValue::unknown_variable("a").chain(ErrorValue::division_by_zero());
    assert!(!mixed.is_unresolved_only());
}

#[test]
fn test_error_description_includes_types() {
    let error = ErrorValue::type_mismatch("Cannot add", "number", "date").with_expression("1 + today");
    assert_eq!(error.kind, ErrorKind::Type);
    assert_eq!(error.describe(), "1 + today: Cannot add (expected number, got date)");
    // the first expression wins
    let error = error.with_expression("outer");
    assert_eq!(error.expression.as_deref(), Some("1 + today"));
}

#[test]
fn test_symbolic_combination_parenthesizes() {
    let a = SymbolicValue::atom("a");
    let sum = SymbolicValue::combine(&a, ArithmeticOperation::Add, &SymbolicValue::atom("b"));
    let product = SymbolicValue::combine(&sum, ArithmeticOperation::Multiply, &SymbolicValue::atom("c"));
    assert_eq!(product.text, "(a + b) * c");
    assert_eq!(sum.negate().text, "-(a + b)");
    let power = SymbolicValue::combine(&a, ArithmeticOperation::Power, &SymbolicValue::atom("2"));
    assert_eq!(power.text, "a^2");
}

#[test]
fn test_list_access() {
    let items = (1..=5).map(SemanticValue::number).collect();
    let list = ListValue::new(items, 10).unwrap();
    assert_eq!(list.get(0), Some(&SemanticValue::number(1)));
    assert_eq!(list.get(-1), Some(&SemanticValue::number(5)));
    assert_eq!(list.get(5), None);
    assert_eq!(list.slice(Some(1), Some(3)).len(), 2);
    assert_eq!(list.slice(None, Some(-1)).len(), 4);
    assert_eq!(list.slice(Some(3), None).len(), 2);
}

#[test]
fn test_list_length_is_capped() {
    let items = (0..11).map(SemanticValue::number).collect();
    assert!(ListValue::new(items, 10).is_err());
}

#[test]
fn test_duration_units() {
    assert_eq!(DurationUnit::parse("hrs"), Some(DurationUnit::Hour));
    let d = DurationValue::single(dec!(90), DurationUnit::Minute);
    assert_eq!(d.total_seconds().unwrap(), dec!(5400));
    assert_eq!(d.format(&FormatOptions::default()), "90 minutes");
}

#[test]
fn test_negative_durations_parse_back() {
    assert_eq!(value("-1 hour").value_type(), ValueType::Duration);
    let shown = SemanticValue::Duration(
        DurationValue::from_parts(vec![
            DurationPart { amount: dec!(2), unit: DurationUnit::Hour },
            DurationPart { amount: dec!(30), unit: DurationUnit::Minute },
        ])
        .negate(),
    );
    assert_eq!(shown.to_string(), "-2 hours -30 minutes");
    assert!(value("-2 hours -30 minutes").approx_eq(&shown));
    assert!(value("-90 minutes").approx_eq(&value("-1 hour -30 minutes")));
}
