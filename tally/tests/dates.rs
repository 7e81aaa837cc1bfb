use chrono::{FixedOffset, TimeZone};
use tally::{Engine, SemanticValue};

/// Friday 2024-03-15, 09:30 UTC
fn engine() -> Engine {
    Engine::with_now(FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap())
}

fn result(line: &str) -> String {
    let node = engine().evaluate_line(line);
    match node.result() {
        Some(result) => result.to_string(),
        None => panic!("'{}' gave {} node: {}", line, node.kind_name(), node.display_text),
    }
}

#[test]
fn test_keywords() {
    assert_eq!(result("today"), "2024-03-15");
    assert_eq!(result("tomorrow"), "2024-03-16");
    assert_eq!(result("yesterday"), "2024-03-14");
    assert_eq!(result("now"), "2024-03-15 09:30");
}

#[test]
fn test_relative_weekdays() {
    assert_eq!(result("next friday"), "2024-03-22");
    assert_eq!(result("last monday"), "2024-03-11");
    assert_eq!(result("this friday"), "2024-03-15");
}

#[test]
fn test_business_days() {
    assert_eq!(result("today + 3 business days"), "2024-03-20");
    assert_eq!(result("today + 1 business day"), "2024-03-18");
    assert_eq!(result("today - 1 business day"), "2024-03-14");
    assert_eq!(result("today + 0 business days"), "2024-03-15");
}

#[test]
fn test_calendar_arithmetic() {
    assert_eq!(result("2024-01-31 + 1 month"), "2024-02-29");
    assert_eq!(result("2024-03-15 + 1 year"), "2025-03-15");
    assert_eq!(result("today + 2 weeks"), "2024-03-29");
    assert_eq!(result("today + 1 year and 2 months"), "2025-05-15");
}

#[test]
fn test_differences_between_dates() {
    assert_eq!(result("today - 2024-01-01"), "74 days");
    let mut engine = engine();
    engine.evaluate_line("deadline = 2024-04-01");
    let node = engine.evaluate_line("deadline - today");
    assert_eq!(node.result(), Some("17 days"));
    assert!(matches!(node.semantic_value(), Some(SemanticValue::Duration(_))));
}

#[test]
fn test_clock_times() {
    assert_eq!(result("14:30 + 45 minutes"), "15:15");
    assert_eq!(result("23:00 + 2 hours"), "01:00 (+1 day)");
    assert_eq!(result("9:15 am + 30 minutes"), "09:45");
}

#[test]
fn test_date_variables_in_chains() {
    let mut engine = engine();
    engine.evaluate_line("start date = 2024-03-01");
    let node = engine.evaluate_line("start date + 10 days");
    assert_eq!(node.result(), Some("2024-03-11"));
}

#[test]
fn test_dates_cannot_be_added() {
    let node = engine().evaluate_line("today + 2024-01-01");
    assert!(node.is_error());
}
