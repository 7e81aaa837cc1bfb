use crate::ast::ComponentKind;
use crate::error::TallyResult;
use crate::evaluator::EvaluationContext;
use crate::parser::{LineKind, LineNode};
use crate::pipeline::{NodeEvaluator, RenderNode};
use crate::semantic::SemanticValue;
use crate::solver;

/// `solve x in ...` lines, and bare names that only earlier equations define
pub struct EquationEvaluator;

impl NodeEvaluator for EquationEvaluator {
    fn name(&self) -> &'static str {
        "equation"
    }

    fn can_handle(&self, node: &LineNode, ctx: &EvaluationContext<'_>) -> bool {
        node.is_solve() || implicit_target(node, ctx).is_some()
    }

    fn evaluate(&self, node: &LineNode, ctx: &mut EvaluationContext<'_>) -> TallyResult<Option<RenderNode>> {
        if let (true, LineKind::Expression { text }) = (node.is_solve(), &node.kind) {
            let value = solver::solve_explicit(text, ctx);
            return Ok(Some(RenderNode::value(node.line, &node.raw, value, ctx.format)));
        }
        let Some(name) = implicit_target(node, ctx) else {
            return Ok(None);
        };
        let name = name.to_string();
        Ok(solver::solve_implicit(&name, ctx).map(|value| RenderNode::value(node.line, &node.raw, value, ctx.format)))
    }
}

/// A line that is a single name with no concrete value
fn implicit_target<'n>(node: &'n LineNode, ctx: &EvaluationContext<'_>) -> Option<&'n str> {
    if !matches!(node.kind, LineKind::Expression { .. }) {
        return None;
    }
    let [component] = node.components.as_deref()? else {
        return None;
    };
    let ComponentKind::Variable(name) = &component.kind else {
        return None;
    };
    match ctx.lookup(name) {
        None | Some(SemanticValue::Symbolic(_)) => Some(name),
        Some(_) => None,
    }
}
