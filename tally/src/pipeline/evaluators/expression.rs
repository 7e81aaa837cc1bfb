use super::{blocking_parse_error, display_format, expression_text};
use crate::ast::{any_literal, ComponentKind};
use crate::error::TallyResult;
use crate::evaluator::conversion::has_conversion_suffix;
use crate::evaluator::{evaluate_text, EvaluationContext};
use crate::parser::LineNode;
use crate::pipeline::{NodeEvaluator, RenderNode};
use crate::semantic::SemanticValue;

/// Expressions with unit or rate literals, or a trailing conversion
pub struct UnitsEvaluator;

impl NodeEvaluator for UnitsEvaluator {
    fn name(&self) -> &'static str {
        "units"
    }

    fn can_handle(&self, node: &LineNode, _ctx: &EvaluationContext<'_>) -> bool {
        let Some(text) = expression_text(node) else {
            return false;
        };
        has_conversion_suffix(text)
            || node.components.as_deref().is_some_and(|components| {
                any_literal(components, &|value| {
                    matches!(value, SemanticValue::Unit(_) | SemanticValue::CurrencyUnit(_))
                })
            })
    }

    fn evaluate(&self, node: &LineNode, ctx: &mut EvaluationContext<'_>) -> TallyResult<Option<RenderNode>> {
        render_expression(node, ctx)
    }
}

/// Any other expression line
pub struct ExpressionEvaluator;

impl NodeEvaluator for ExpressionEvaluator {
    fn name(&self) -> &'static str {
        "expression"
    }

    fn can_handle(&self, node: &LineNode, _ctx: &EvaluationContext<'_>) -> bool {
        expression_text(node).is_some()
    }

    fn evaluate(&self, node: &LineNode, ctx: &mut EvaluationContext<'_>) -> TallyResult<Option<RenderNode>> {
        render_expression(node, ctx)
    }
}

/// Evaluate the line as a math result. Prose (nothing but unknown words)
/// declines so the fallback shows it as text.
fn render_expression(node: &LineNode, ctx: &mut EvaluationContext<'_>) -> TallyResult<Option<RenderNode>> {
    let Some(text) = expression_text(node) else {
        return Ok(None);
    };
    if let Some(error) = blocking_parse_error(node, text, ctx) {
        return Err(error);
    }
    let value = evaluate_text(text, node.components.as_deref(), ctx);
    if let SemanticValue::Error(error) = &value {
        if error.is_unresolved_only() && is_prose(node) {
            return Ok(None);
        }
    }
    let format = display_format(text, ctx.format);
    Ok(Some(RenderNode::value(node.line, &node.raw, value, &format)))
}

fn is_prose(node: &LineNode) -> bool {
    node.components.as_deref().is_some_and(|components| {
        !components.is_empty()
            && components
                .iter()
                .all(|c| matches!(c.kind, ComponentKind::Variable(_)))
    })
}
