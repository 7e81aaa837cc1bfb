use super::expression_text;
use crate::datemath;
use crate::error::TallyResult;
use crate::evaluator::percentage::{evaluate_phrase, looks_like_phrase};
use crate::evaluator::EvaluationContext;
use crate::parser::LineNode;
use crate::pipeline::{NodeEvaluator, RenderNode};

/// `20% of 100`, `5% off $80`, `30 as % of 120`
///
/// Runs ahead of plain expressions because `X of Y` could also be a phrase
/// variable; the phrase evaluator declines when it is one.
pub struct PercentageEvaluator;

impl NodeEvaluator for PercentageEvaluator {
    fn name(&self) -> &'static str {
        "percentage"
    }

    fn can_handle(&self, node: &LineNode, _ctx: &EvaluationContext<'_>) -> bool {
        expression_text(node).is_some_and(looks_like_phrase)
    }

    fn evaluate(&self, node: &LineNode, ctx: &mut EvaluationContext<'_>) -> TallyResult<Option<RenderNode>> {
        let Some(text) = expression_text(node) else {
            return Ok(None);
        };
        Ok(evaluate_phrase(text, ctx).map(|value| RenderNode::value(node.line, &node.raw, value, ctx.format)))
    }
}

/// Date chains: `today + 3 business days`, `2024-03-15 - 2024-01-01`,
/// `now to JST`
pub struct DateTimeEvaluator;

impl NodeEvaluator for DateTimeEvaluator {
    fn name(&self) -> &'static str {
        "datetime"
    }

    fn can_handle(&self, node: &LineNode, ctx: &EvaluationContext<'_>) -> bool {
        expression_text(node).is_some_and(|text| datemath::starts_with_anchor(text, ctx))
    }

    fn evaluate(&self, node: &LineNode, ctx: &mut EvaluationContext<'_>) -> TallyResult<Option<RenderNode>> {
        let Some(text) = expression_text(node) else {
            return Ok(None);
        };
        Ok(datemath::evaluate(text, ctx).map(|value| RenderNode::value(node.line, &node.raw, value, ctx.format)))
    }
}
