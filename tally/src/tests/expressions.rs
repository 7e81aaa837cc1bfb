use super::Fixture;
use crate::evaluator::evaluate_text;
use crate::parser::parse_value;
use crate::semantic::{ErrorKind, SemanticValue};
use crate::stores::VariableStore;
use rust_decimal_macros::dec;

fn eval(fixture: &mut Fixture, text: &str) -> SemanticValue {
    evaluate_text(text, None, &mut fixture.ctx(1))
}

fn shown(fixture: &mut Fixture, text: &str) -> String {
    let format = fixture.format.clone();
    eval(fixture, text).format(&format)
}

#[test]
fn test_precedence_and_associativity() {
    let mut f = Fixture::new();
    assert_eq!(eval(&mut f, "2 + 3 * 4"), SemanticValue::number(14));
    assert_eq!(eval(&mut f, "(2 + 3) * 4"), SemanticValue::number(20));
    assert_eq!(eval(&mut f, "2 ^ 3 ^ 2"), SemanticValue::number(512));
    assert_eq!(eval(&mut f, "-2 ^ 2"), SemanticValue::number(-4));
    assert_eq!(eval(&mut f, "10 - 4 - 3"), SemanticValue::number(3));
    assert_eq!(eval(&mut f, "17 mod 5"), SemanticValue::number(2));
}

#[test]
fn test_implicit_multiplication() {
    let mut f = Fixture::new();
    f.variables
        .set_variable_with_value("x", SemanticValue::number(4), "4")
        .unwrap();
    assert_eq!(eval(&mut f, "3 (2 + 1)"), SemanticValue::number(9));
    assert_eq!(eval(&mut f, "2 x"), SemanticValue::number(8));
}

#[test]
fn test_adjacent_numbers_need_an_operator() {
    let mut f = Fixture::new();
    match eval(&mut f, "1 000") {
        SemanticValue::Error(error) => {
            assert_eq!(error.kind, ErrorKind::Syntax);
            assert!(error.suggestion.unwrap().contains("'1000'"));
        }
        other => panic!("expected an error, got {:?}", other),
    }
    assert!(eval(&mut f, "2 + 3 4").is_error());
    assert_eq!(eval(&mut f, "3 (2 + 1)"), SemanticValue::number(9));
}

#[test]
fn test_results_below_the_smallest_decimal_are_errors() {
    let mut f = Fixture::new();
    match eval(&mut f, "1e-15 * 1e-15") {
        SemanticValue::Error(error) => {
            assert_eq!(error.kind, ErrorKind::Runtime);
            assert!(error.message.contains("too small"));
        }
        other => panic!("expected an error, got {:?}", other),
    }
    assert!(eval(&mut f, "1e-15 / 1e15").is_error());
    assert!(eval(&mut f, "10 ^ -30").is_error());
    assert_eq!(eval(&mut f, "0 * 1e-15"), SemanticValue::number(0));
    assert!(!eval(&mut f, "1 / 3").is_error());
}

#[test]
fn test_literals_out_of_range_are_errors() {
    let mut f = Fixture::new();
    for text in ["1e-30", "9.1e-31 kg", "1e308 * 10"] {
        match eval(&mut f, text) {
            SemanticValue::Error(error) => {
                assert_eq!(error.kind, ErrorKind::Runtime, "{}", text);
                assert!(error.message.contains("out of range"), "{}", text);
            }
            other => panic!("{} should be an error, got {:?}", text, other),
        }
    }
    assert_eq!(eval(&mut f, "1.5e3"), SemanticValue::number(1500));
}

#[test]
fn test_percentages() {
    let mut f = Fixture::new();
    assert_eq!(eval(&mut f, "100 + 10%"), SemanticValue::number(110));
    assert_eq!(eval(&mut f, "100 - 10%"), SemanticValue::number(90));
    assert_eq!(eval(&mut f, "20% of 100"), SemanticValue::number(20));
    assert_eq!(eval(&mut f, "5% on 200"), SemanticValue::number(210));
    assert_eq!(eval(&mut f, "25% off 80"), SemanticValue::number(60));
    assert_eq!(eval(&mut f, "30 as % of 120"), SemanticValue::Percentage(dec!(25)));
    assert_eq!(eval(&mut f, "10% of what is 5"), SemanticValue::number(50));
}

#[test]
fn test_phrase_variables() {
    let mut f = Fixture::new();
    f.variables
        .set_variable_with_value("cost of living", SemanticValue::number(1200), "1200")
        .unwrap();
    assert_eq!(eval(&mut f, "cost of living * 2"), SemanticValue::number(2400));
    assert_eq!(eval(&mut f, "Cost  of Living"), SemanticValue::number(1200));
}

#[test]
fn test_unknown_names_accumulate() {
    let mut f = Fixture::new();
    match eval(&mut f, "a * 2 + b") {
        SemanticValue::Error(error) => {
            assert_eq!(error.unresolved, vec!["a", "b"]);
            assert!(error.is_unresolved_only());
            assert_eq!(error.expression.as_deref(), Some("a * 2 + b"));
        }
        other => panic!("expected an error, got {:?}", other),
    }
}

#[test]
fn test_units_and_money() {
    let mut f = Fixture::new();
    assert_eq!(shown(&mut f, "50 m + 20 ft"), "56.096 m");
    assert_eq!(shown(&mut f, "$100/m^2 * 5 m^2"), "$500");
    assert_eq!(shown(&mut f, "$50 + $30"), "$80");
    assert_eq!(shown(&mut f, "1500 m to km"), "1.5 km");
    assert!(matches!(
        eval(&mut f, "5 m + 3 kg"),
        SemanticValue::Error(ref e) if e.kind == ErrorKind::Semantic
    ));
}

#[test]
fn test_constants_and_dates() {
    let mut f = Fixture::new();
    let pi = eval(&mut f, "pi").to_number().unwrap();
    assert!((pi - dec!(3.14159265)).abs() < dec!(0.0000001));
    assert_eq!(shown(&mut f, "today"), "2024-03-15");
    assert_eq!(shown(&mut f, "today + 3 business days"), "2024-03-20");
    assert_eq!(shown(&mut f, "2024-03-15 - 2024-03-01"), "14 days");
}

#[test]
fn test_lists_and_ranges() {
    let mut f = Fixture::new();
    assert_eq!(shown(&mut f, "[1, 2, 3] * 2"), "[2, 4, 6]");
    assert_eq!(shown(&mut f, "1..5"), "[1, 2, 3, 4, 5]");
    assert_eq!(shown(&mut f, "5..1 step 2"), "[5, 3, 1]");
    assert_eq!(shown(&mut f, "[10, 20, 30][-1]"), "30");
    assert_eq!(shown(&mut f, "[10, 20, 30][0:2]"), "[10, 20]");
    assert!(eval(&mut f, "[1, 2][5]").is_error());
    assert!(eval(&mut f, "1..3 step 0").is_error());
}

#[test]
fn test_display_round_trip() {
    let mut f = Fixture::new();
    for text in ["1 / 3", "$12.5 * 3", "50 m + 20 ft", "2 hours + 30 minutes", "15% * 2"] {
        let value = eval(&mut f, text);
        let reparsed = parse_value(&value.to_string()).unwrap();
        assert!(value.approx_eq(&reparsed), "{} -> {} -> {:?}", text, value, reparsed);
    }
}
