use super::Fixture;
use crate::error::TallyResult;
use crate::evaluator::EvaluationContext;
use crate::parser::{parse_line, LineNode};
use crate::pipeline::evaluators::{CommentEvaluator, ExpressionEvaluator};
use crate::pipeline::{LineOutcome, NodeEvaluator, Pipeline, RenderKind, RenderNode};
use crate::semantic::SemanticValue;
use crate::stores::VariableStore;

fn run(fixture: &mut Fixture, raw: &str) -> LineOutcome {
    let node = parse_line(raw, 1);
    Pipeline::standard().evaluate(&node, &mut fixture.ctx(1))
}

fn handled_by(fixture: &mut Fixture, raw: &str) -> &'static str {
    match run(fixture, raw) {
        LineOutcome::Handled { evaluator, .. } | LineOutcome::Failed { evaluator, .. } => evaluator,
        LineOutcome::Unhandled => "none",
    }
}

#[test]
fn test_standard_order() {
    assert_eq!(
        Pipeline::standard().evaluator_names(),
        vec![
            "comment",
            "percentage",
            "datetime",
            "equation",
            "units",
            "combined",
            "function",
            "assignment",
            "expression",
            "fallback",
        ]
    );
}

#[test]
fn test_lines_reach_the_right_evaluator() {
    let mut f = Fixture::new();
    assert_eq!(handled_by(&mut f, "# groceries"), "comment");
    assert_eq!(handled_by(&mut f, ""), "comment");
    assert_eq!(handled_by(&mut f, "20% of 100"), "percentage");
    assert_eq!(handled_by(&mut f, "today + 3 days"), "datetime");
    assert_eq!(handled_by(&mut f, "solve x in 2 * x = 8"), "equation");
    assert_eq!(handled_by(&mut f, "5 km to m"), "units");
    assert_eq!(handled_by(&mut f, "total = 5 =>"), "combined");
    assert_eq!(handled_by(&mut f, "double(x) = x * 2"), "function");
    assert_eq!(handled_by(&mut f, "price = 100"), "assignment");
    assert_eq!(handled_by(&mut f, "2 + 2"), "expression");
    assert_eq!(handled_by(&mut f, "buy milk"), "fallback");
}

#[test]
fn test_declined_phrases_fall_through() {
    let mut f = Fixture::new();
    f.variables
        .set_variable_with_value("cost of living", SemanticValue::number(900), "900")
        .unwrap();
    // not a percentage, so the percentage evaluator declines
    assert_eq!(handled_by(&mut f, "cost of living"), "expression");
}

#[test]
fn test_store_failures_become_error_nodes() {
    let mut f = Fixture::new();
    match run(&mut f, "today = 5") {
        LineOutcome::Failed { evaluator, node } => {
            assert_eq!(evaluator, "assignment");
            assert_eq!(node.kind_name(), "error");
            assert!(node.display_text.starts_with("assignment failed:"));
            assert!(node.display_text.contains("reserved"));
        }
        other => panic!("expected a failure, got {:?}", other),
    }
}

#[test]
fn test_parse_failures_are_reported() {
    let mut f = Fixture::new();
    let node = run(&mut f, "2 + * 3").into_node().unwrap();
    assert!(node.is_error());
}

struct Refuses;

impl NodeEvaluator for Refuses {
    fn name(&self) -> &'static str {
        "refuses"
    }

    fn can_handle(&self, _node: &LineNode, _ctx: &EvaluationContext<'_>) -> bool {
        true
    }

    fn evaluate(&self, _node: &LineNode, _ctx: &mut EvaluationContext<'_>) -> TallyResult<Option<RenderNode>> {
        Ok(None)
    }
}

#[test]
fn test_custom_pipelines() {
    let mut f = Fixture::new();
    let pipeline = Pipeline::new(vec![Box::new(Refuses), Box::new(CommentEvaluator)]);
    let node = parse_line("1 + 1", 1);
    assert_eq!(pipeline.evaluate(&node, &mut f.ctx(1)), LineOutcome::Unhandled);

    let pipeline = Pipeline::new(vec![Box::new(Refuses), Box::new(ExpressionEvaluator)]);
    match pipeline.evaluate(&node, &mut f.ctx(1)) {
        LineOutcome::Handled { evaluator, node } => {
            assert_eq!(evaluator, "expression");
            assert_eq!(node.result(), Some("2"));
        }
        other => panic!("expected the expression evaluator, got {:?}", other),
    }
}

#[test]
fn test_render_node_json() {
    let mut f = Fixture::new();
    let node = run(&mut f, "total = 40 + 2 =>").into_node().unwrap();
    assert!(matches!(node.kind, RenderKind::Combined { .. }));
    let json = serde_json::to_value(&node).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "line": 1,
            "originalRaw": "total = 40 + 2 =>",
            "displayText": "42",
            "type": "combined",
            "variableName": "total",
            "result": "42",
        })
    );

    let node = run(&mut f, "1 / 0").into_node().unwrap();
    let json = serde_json::to_value(&node).unwrap();
    assert_eq!(json["type"], "error");
    assert_eq!(json["errorKind"], "semantic");
}
