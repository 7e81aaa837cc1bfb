use crate::error::TallyResult;
use crate::evaluator::EvaluationContext;
use crate::parser::{LineKind, LineNode};
use crate::pipeline::{NodeEvaluator, RenderNode};
use crate::semantic::ErrorValue;

/// Blank lines and `#` / `//` comments
pub struct CommentEvaluator;

impl NodeEvaluator for CommentEvaluator {
    fn name(&self) -> &'static str {
        "comment"
    }

    fn can_handle(&self, node: &LineNode, _ctx: &EvaluationContext<'_>) -> bool {
        node.kind == LineKind::Comment
    }

    fn evaluate(&self, node: &LineNode, _ctx: &mut EvaluationContext<'_>) -> TallyResult<Option<RenderNode>> {
        Ok(Some(RenderNode::text(node.line, &node.raw, node.raw.trim())))
    }
}

/// Last resort: a recorded parse failure becomes an error node, anything else
/// is shown as plain text
pub struct FallbackEvaluator;

impl NodeEvaluator for FallbackEvaluator {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn can_handle(&self, _node: &LineNode, _ctx: &EvaluationContext<'_>) -> bool {
        true
    }

    fn evaluate(&self, node: &LineNode, _ctx: &mut EvaluationContext<'_>) -> TallyResult<Option<RenderNode>> {
        let rendered = match &node.parse_error {
            Some(error) => {
                let mut value = ErrorValue::parse(error.message());
                if let Some(suggestion) = error.details().and_then(|d| d.suggestion.clone()) {
                    value = value.with_suggestion(suggestion);
                }
                RenderNode::error(node.line, &node.raw, &value)
            }
            None => RenderNode::text(node.line, &node.raw, node.raw.trim()),
        };
        Ok(Some(rendered))
    }
}
