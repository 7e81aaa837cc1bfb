use tally::{Engine, SemanticValue};

fn result(line: &str) -> String {
    let node = Engine::new().evaluate_line(line);
    match node.result() {
        Some(result) => result.to_string(),
        None => panic!("'{}' gave {} node: {}", line, node.kind_name(), node.display_text),
    }
}

fn is_error(line: &str) -> bool {
    Engine::new().evaluate_line(line).is_error()
}

#[test]
fn test_explicit_conversions_keep_the_target_unit() {
    assert_eq!(result("5 km to m"), "5000 m");
    assert_eq!(result("1500 m in km"), "1.5 km");
    assert_eq!(result("1 mi to km"), "1.609344 km");
    assert_eq!(result("10 kg as lb"), "22.046226 lb");
}

#[test]
fn test_results_are_rescaled_for_display() {
    assert_eq!(result("800 m + 700 m"), "1.5 km");
    assert_eq!(result("50 m + 20 ft"), "56.096 m");
}

#[test]
fn test_temperature_conversions() {
    assert_eq!(result("100 °C to °F"), "212 °F");
    assert_eq!(result("0 °C to K"), "273.15 K");
    assert!(is_error("10 °C * 2 m"));
}

#[test]
fn test_derived_quantities() {
    let mut engine = Engine::new();
    let node = engine.evaluate_line("120 km / 2 h");
    match node.semantic_value() {
        Some(SemanticValue::Unit(q)) => assert_eq!(q.unit.kind().map(|k| k.name), Some("speed")),
        other => panic!("expected a speed, got {:?}", other),
    }
    assert_eq!(engine.evaluate_line("120 km / 2 h to km/h").result(), Some("60 km/h"));
    assert_eq!(engine.evaluate_line("6 m / 3 m").result(), Some("2"));
}

#[test]
fn test_incompatible_units() {
    assert!(is_error("5 m + 3 kg"));
    assert!(is_error("5 m to kg"));
}

#[test]
fn test_percent_and_decimal_targets() {
    assert_eq!(result("0.25 to %"), "25%");
    assert_eq!(result("12.5% as decimal"), "0.125");
}

#[test]
fn test_currency_rates() {
    assert_eq!(result("$100/m^2 * 5 m^2"), "$500");
    assert_eq!(result("$30/h * 40 h"), "$1200");
    assert!(is_error("$5 + 5 EUR"));
}
