use crate::engine::Engine;
use crate::pipeline::RenderNode;
use crate::semantic::{FormatOptions, SemanticValue};
use crate::stores::VariableContext;
use chrono::{FixedOffset, TimeZone};

fn engine() -> Engine {
    // Friday
    Engine::with_now(FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap())
}

fn results(nodes: &[RenderNode]) -> Vec<&str> {
    nodes.iter().map(|n| n.display_text.as_str()).collect()
}

#[test]
fn test_percent_of() {
    let nodes = engine().evaluate_document("20% of 100").unwrap();
    assert_eq!(nodes[0].kind_name(), "mathResult");
    assert_eq!(nodes[0].result(), Some("20"));
}

#[test]
fn test_assignment_then_combined_total() {
    let nodes = engine()
        .evaluate_document("price = 100\ntotal = price + 10% =>")
        .unwrap();
    assert_eq!(nodes[0].kind_name(), "variable");
    assert_eq!(nodes[1].kind_name(), "combined");
    assert_eq!(nodes[1].result(), Some("110"));
}

#[test]
fn test_mixed_length_units() {
    let nodes = engine().evaluate_document("50 m + 20 ft =>").unwrap();
    assert_eq!(nodes[0].result(), Some("56.096 m"));
}

#[test]
fn test_business_days_skip_the_weekend() {
    let nodes = engine().evaluate_document("today + 3 business days").unwrap();
    assert_eq!(nodes[0].result(), Some("2024-03-20"));
}

#[test]
fn test_solve_with_helper_equation() {
    let nodes = engine().evaluate_document("solve x in y = 2*x + 3, y = 11 =>").unwrap();
    assert_eq!(nodes[0].result(), Some("4"));
}

#[test]
fn test_rate_times_area() {
    let nodes = engine().evaluate_document("$100/m^2 * 5 m^2 =>").unwrap();
    assert_eq!(nodes[0].result(), Some("$500"));
}

#[test]
fn test_symbolic_rearrangement() {
    let nodes = engine().evaluate_document("solve x in y = m*x + b").unwrap();
    assert_eq!(nodes[0].result(), Some("(y - b) / m"));
}

#[test]
fn test_square_root_solutions() {
    let mut notepad = engine();
    notepad.evaluate_line("a = s^2");
    notepad.evaluate_line("a = 9");
    assert_eq!(notepad.evaluate_line("s").result(), Some("3"));

    let nodes = notepad.evaluate_document("a = -4\nsolve s in a = s^2").unwrap();
    assert!(nodes[1].is_error());
    assert!(nodes[1].display_text.contains("square root of a negative number"));
}

#[test]
fn test_implicit_solving_uses_earlier_equations() {
    let nodes = engine()
        .evaluate_document("distance = speed * time\ndistance = 100\ntime = 4\nspeed")
        .unwrap();
    assert_eq!(nodes[3].result(), Some("25"));
}

#[test]
fn test_unknown_names_stay_symbolic() {
    let mut engine = engine();
    let node = engine.evaluate_line("total = price * qty");
    assert_eq!(node.result(), Some("price * qty"));
    engine.evaluate_line("price = 3");
    let node = engine.evaluate_line("total = price * qty");
    assert_eq!(node.result(), Some("3 * qty"));
}

#[test]
fn test_prose_and_comments_render_as_text() {
    let nodes = engine()
        .evaluate_document("# Budget\nremember the milk\n\n5 + 5")
        .unwrap();
    let kinds: Vec<&str> = nodes.iter().map(|n| n.kind_name()).collect();
    assert_eq!(kinds, vec!["text", "text", "text", "mathResult"]);
    assert_eq!(results(&nodes)[1], "remember the milk");
}

#[test]
fn test_errors_do_not_stop_the_document() {
    let nodes = engine().evaluate_document("1 / 0\n5 m + 2 kg\n2 + 2").unwrap();
    assert!(nodes[0].is_error());
    assert!(nodes[1].is_error());
    assert_eq!(nodes[2].result(), Some("4"));
}

#[test]
fn test_tiny_results_render_as_errors() {
    let nodes = engine().evaluate_document("1e-15 * 1e-15 =>\n1e-30 kg =>").unwrap();
    assert!(nodes[0].is_error());
    assert!(nodes[0].display_text.contains("too small"));
    assert!(nodes[1].is_error());
    assert!(nodes[1].display_text.contains("out of range"));
}

#[test]
fn test_format_options_apply() {
    let format = FormatOptions {
        precision: 2,
        ..FormatOptions::default()
    };
    let mut engine = engine().with_format(format);
    assert_eq!(engine.evaluate_line("1 / 3").result(), Some("0.33"));
}

#[test]
fn test_variables_are_exposed() {
    let mut engine = engine();
    engine.evaluate_document("Hourly Rate = $40\nhours = 8").unwrap();
    assert_eq!(engine.variables().names(), vec!["hourly rate", "hours"]);
    assert!(matches!(
        engine.variables().value("HOURLY RATE"),
        Some(SemanticValue::Currency(_))
    ));
}
