//! The ten line evaluators, in pipeline order

mod assignment;
mod equation;
mod expression;
mod phrasing;
mod text;

pub use assignment::{AssignmentEvaluator, CombinedAssignmentEvaluator, FunctionDefinitionEvaluator};
pub use equation::EquationEvaluator;
pub use expression::{ExpressionEvaluator, UnitsEvaluator};
pub use phrasing::{DateTimeEvaluator, PercentageEvaluator};
pub use text::{CommentEvaluator, FallbackEvaluator};

use crate::datemath;
use crate::error::TallyError;
use crate::evaluator::conversion::{has_conversion_suffix, split_conversion};
use crate::evaluator::percentage::looks_like_phrase;
use crate::evaluator::EvaluationContext;
use crate::parser::{LineKind, LineNode};
use crate::semantic::FormatOptions;

/// Text of a plain expression line; `solve` lines excluded
fn expression_text(node: &LineNode) -> Option<&str> {
    match &node.kind {
        LineKind::Expression { text } if !node.is_solve() => Some(text),
        _ => None,
    }
}

/// The component parse failure of a line, unless `text` is evaluated
/// without components anyway (conversions, percentage phrases, date chains)
fn blocking_parse_error(node: &LineNode, text: &str, ctx: &EvaluationContext<'_>) -> Option<TallyError> {
    let error = node.parse_error.as_ref()?;
    let bypassed = split_conversion(text).is_some()
        || looks_like_phrase(text)
        || datemath::starts_with_anchor(text, ctx);
    (!bypassed).then(|| error.clone())
}

/// Options for showing the value of `text`. A line ending in an explicit
/// conversion keeps the unit it asked for.
fn display_format(text: &str, format: &FormatOptions) -> FormatOptions {
    FormatOptions {
        auto_scale_units: format.auto_scale_units && !has_conversion_suffix(text),
        ..format.clone()
    }
}
