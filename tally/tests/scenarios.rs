use chrono::{FixedOffset, TimeZone};
use tally::{Engine, RenderNode};

fn engine() -> Engine {
    Engine::with_now(FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap())
}

fn render(nodes: &[RenderNode]) -> String {
    nodes
        .iter()
        .map(|n| format!("{} {} {}", n.line, n.kind_name(), n.display_text))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_trip_budget_document() {
    let document = "# Trip budget\nflights = $420\nhotel = $95 * 3\ntotal = flights + hotel =>\ntotal + 10% =>";
    let nodes = engine().evaluate_document(document).unwrap();
    insta::assert_snapshot!(render(&nodes), @r"
    1 text # Trip budget
    2 variable $420
    3 variable $285
    4 combined $705
    5 mathResult $775.50
    ");
}

#[test]
fn test_everyday_lines() {
    let cases = [
        ("20% of 100", "20"),
        ("50 m + 20 ft =>", "56.096 m"),
        ("today + 3 business days", "2024-03-20"),
        ("solve x in y = 2*x + 3, y = 11 =>", "4"),
        ("$100/m^2 * 5 m^2 =>", "$500"),
        ("solve x in y = m*x + b", "(y - b) / m"),
        ("solve s in a = s^2", "sqrt(a)"),
    ];
    for (line, expected) in cases {
        let node = engine().evaluate_line(line);
        assert_eq!(node.result(), Some(expected), "line: {}", line);
    }
}

#[test]
fn test_one_node_per_line_with_stable_numbering() {
    let document = "a = 1\n\nnotes about the plan\nb = a + 1\nb * 10";
    let nodes = engine().evaluate_document(document).unwrap();
    assert_eq!(nodes.len(), 5);
    for (index, node) in nodes.iter().enumerate() {
        assert_eq!(node.line, index + 1);
    }
    assert_eq!(nodes[4].result(), Some("20"));
    assert_eq!(nodes[2].kind_name(), "text");
}

#[test]
fn test_reevaluation_is_idempotent() {
    let document = "price = $40\nqty = 3\nsubtotal = price * qty =>\nsubtotal - 15% =>\ntoday + 1 week";
    let mut engine = engine();
    let first = engine.evaluate_document(document).unwrap();
    let second = engine.evaluate_document(document).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_later_lines_see_earlier_assignments_only() {
    let nodes = engine().evaluate_document("total = rate * 2\nrate = 5\ntotal = rate * 2").unwrap();
    assert_eq!(nodes[0].result(), Some("rate * 2"));
    assert_eq!(nodes[2].result(), Some("10"));
}

#[test]
fn test_render_nodes_serialize_for_hosts() {
    let nodes = engine().evaluate_document("# notes\nx = 2 =>\nx / 0").unwrap();
    let json = serde_json::to_value(&nodes).unwrap();
    assert_eq!(json[0]["type"], "text");
    assert_eq!(json[1]["type"], "combined");
    assert_eq!(json[1]["variableName"], "x");
    assert_eq!(json[2]["type"], "error");
    assert_eq!(json[2]["originalRaw"], "x / 0");
}
