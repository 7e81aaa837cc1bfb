use super::{blocking_parse_error, display_format};
use crate::ast::referenced_variables;
use crate::error::TallyResult;
use crate::evaluator::functions::is_builtin;
use crate::evaluator::{evaluate_text, EvaluationContext};
use crate::parser::{LineKind, LineNode};
use crate::pipeline::{NodeEvaluator, RenderNode};
use crate::semantic::{SemanticValue, SymbolicValue};
use crate::solver::{self, algebra, substitute};
use crate::stores::{Equation, FunctionDefinition};
use tracing::warn;

/// `name = expr =>`: stores the value and displays it
pub struct CombinedAssignmentEvaluator;

impl NodeEvaluator for CombinedAssignmentEvaluator {
    fn name(&self) -> &'static str {
        "combined"
    }

    fn can_handle(&self, node: &LineNode, _ctx: &EvaluationContext<'_>) -> bool {
        node.display && matches!(node.kind, LineKind::Assignment { .. })
    }

    fn evaluate(&self, node: &LineNode, ctx: &mut EvaluationContext<'_>) -> TallyResult<Option<RenderNode>> {
        assign(node, ctx, true)
    }
}

/// `name(params) = body`
pub struct FunctionDefinitionEvaluator;

impl NodeEvaluator for FunctionDefinitionEvaluator {
    fn name(&self) -> &'static str {
        "function"
    }

    fn can_handle(&self, node: &LineNode, _ctx: &EvaluationContext<'_>) -> bool {
        matches!(node.kind, LineKind::FunctionDefinition { .. })
    }

    fn evaluate(&self, node: &LineNode, ctx: &mut EvaluationContext<'_>) -> TallyResult<Option<RenderNode>> {
        let LineKind::FunctionDefinition { name, params, body } = &node.kind else {
            return Ok(None);
        };
        if let Some(error) = &node.parse_error {
            return Err(error.clone());
        }
        let definition = FunctionDefinition {
            name: name.clone(),
            params: params.clone(),
            body: node.components.clone().unwrap_or_default(),
            body_text: body.clone(),
            line: node.line,
        };
        let signature = definition.signature();
        if is_builtin(name) {
            warn!(line = node.line, function = %name, "user function shadows a builtin");
        }
        if let Some(previous) = ctx.functions.define(definition)? {
            warn!(
                line = node.line,
                function = %name,
                previous_line = previous.line,
                "function redefined"
            );
        }
        Ok(Some(RenderNode::text(node.line, &node.raw, signature)))
    }
}

/// `name = expr`
pub struct AssignmentEvaluator;

impl NodeEvaluator for AssignmentEvaluator {
    fn name(&self) -> &'static str {
        "assignment"
    }

    fn can_handle(&self, node: &LineNode, _ctx: &EvaluationContext<'_>) -> bool {
        matches!(node.kind, LineKind::Assignment { .. })
    }

    fn evaluate(&self, node: &LineNode, ctx: &mut EvaluationContext<'_>) -> TallyResult<Option<RenderNode>> {
        assign(node, ctx, node.display)
    }
}

/// Evaluate the right-hand side and store it. A right-hand side that mentions
/// names is also logged as an equation for the solver. When the only problem
/// is unknown names, the value is kept symbolic.
fn assign(node: &LineNode, ctx: &mut EvaluationContext<'_>, combined: bool) -> TallyResult<Option<RenderNode>> {
    let LineKind::Assignment { name, expression } = &node.kind else {
        return Ok(None);
    };
    if let Some(error) = blocking_parse_error(node, expression, ctx) {
        return Err(error);
    }

    let value = evaluate_text(expression, node.components.as_deref(), ctx);
    let referenced = node
        .components
        .as_deref()
        .map(referenced_variables)
        .unwrap_or_default();
    if !referenced.is_empty() {
        ctx.equations.record(Equation {
            variable: name.clone(),
            expression: expression.clone(),
            source_line: node.line,
        });
    }

    let value = match value {
        SemanticValue::Error(error) if error.is_unresolved_only() => symbolic_value(node, expression, &referenced, ctx),
        other => other,
    };
    if let SemanticValue::Error(error) = &value {
        return Ok(Some(RenderNode::error(node.line, &node.raw, error)));
    }

    ctx.variables.set_variable_with_value(name, value.clone(), expression)?;
    let format = display_format(expression, ctx.format);
    Ok(Some(RenderNode::variable(
        node.line,
        &node.raw,
        name,
        value,
        &format,
        combined,
    )))
}

/// The right-hand side as symbolic text with every known value substituted
fn symbolic_value(
    node: &LineNode,
    expression: &str,
    referenced: &[String],
    ctx: &mut EvaluationContext<'_>,
) -> SemanticValue {
    let tree = node
        .components
        .as_deref()
        .and_then(|components| algebra::from_components(components).ok());
    if let Some(tree) = tree {
        return solver::evaluate_solution(&tree, ctx);
    }
    let known: Vec<(String, String)> = referenced
        .iter()
        .filter_map(|name| match ctx.lookup(name) {
            Some(SemanticValue::Symbolic(_) | SemanticValue::Error(_)) | None => None,
            Some(value) => Some((name.clone(), value.to_string())),
        })
        .collect();
    SemanticValue::Symbolic(SymbolicValue::new(
        substitute::substitute(expression, &known),
        crate::ast::ArithmeticOperation::Add.precedence(),
    ))
}
