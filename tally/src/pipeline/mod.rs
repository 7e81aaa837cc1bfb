//! Evaluator pipeline
//!
//! A line is offered to each evaluator in a fixed priority order. The first
//! evaluator that claims it (`can_handle`) and returns a node ends the search;
//! `Ok(None)` declines and the next one is tried. A host error is caught here
//! and turned into an error node naming the evaluator, so one bad line never
//! stops the document.

pub mod evaluators;
pub mod render;

pub use render::{RenderKind, RenderNode};

use crate::error::TallyResult;
use crate::evaluator::EvaluationContext;
use crate::parser::LineNode;
use tracing::{debug, error, warn};

/// One stage of the pipeline
pub trait NodeEvaluator {
    fn name(&self) -> &'static str;

    /// Cheap and free of side effects
    fn can_handle(&self, node: &LineNode, ctx: &EvaluationContext<'_>) -> bool;

    /// `Ok(None)` declines the line after all
    fn evaluate(&self, node: &LineNode, ctx: &mut EvaluationContext<'_>) -> TallyResult<Option<RenderNode>>;
}

/// Result of offering a line to the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Handled { evaluator: &'static str, node: RenderNode },
    Failed { evaluator: &'static str, node: RenderNode },
    Unhandled,
}

impl LineOutcome {
    pub fn into_node(self) -> Option<RenderNode> {
        match self {
            LineOutcome::Handled { node, .. } | LineOutcome::Failed { node, .. } => Some(node),
            LineOutcome::Unhandled => None,
        }
    }
}

pub struct Pipeline {
    evaluators: Vec<Box<dyn NodeEvaluator>>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl Pipeline {
    pub fn new(evaluators: Vec<Box<dyn NodeEvaluator>>) -> Self {
        Self { evaluators }
    }

    /// The ten evaluators in priority order
    pub fn standard() -> Self {
        use evaluators::*;
        Self::new(vec![
            Box::new(CommentEvaluator),
            Box::new(PercentageEvaluator),
            Box::new(DateTimeEvaluator),
            Box::new(EquationEvaluator),
            Box::new(UnitsEvaluator),
            Box::new(CombinedAssignmentEvaluator),
            Box::new(FunctionDefinitionEvaluator),
            Box::new(AssignmentEvaluator),
            Box::new(ExpressionEvaluator),
            Box::new(FallbackEvaluator),
        ])
    }

    pub fn evaluator_names(&self) -> Vec<&'static str> {
        self.evaluators.iter().map(|e| e.name()).collect()
    }

    pub fn evaluate(&self, node: &LineNode, ctx: &mut EvaluationContext<'_>) -> LineOutcome {
        for evaluator in &self.evaluators {
            if !evaluator.can_handle(node, ctx) {
                continue;
            }
            match evaluator.evaluate(node, ctx) {
                Ok(Some(render)) => {
                    debug!(line = node.line, evaluator = evaluator.name(), kind = render.kind_name(), "line handled");
                    return LineOutcome::Handled {
                        evaluator: evaluator.name(),
                        node: render,
                    };
                }
                Ok(None) => continue,
                Err(err) => {
                    error!(line = node.line, evaluator = evaluator.name(), error = %err, "evaluator failed");
                    return LineOutcome::Failed {
                        evaluator: evaluator.name(),
                        node: RenderNode::failure(node.line, &node.raw, evaluator.name(), &err),
                    };
                }
            }
        }
        warn!(line = node.line, "no evaluator handled the line");
        LineOutcome::Unhandled
    }
}
