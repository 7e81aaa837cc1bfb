//! Percentage phrasing
//!
//! `20% of 100`, `5% on $40`, `15% off 80`, `30 as % of 120` and
//! `10% of what is 5`. Each form declines (returns `None`) when its parts do
//! not have the expected kinds, leaving the text to ordinary expressions.

use super::context::EvaluationContext;
use super::evaluate_text;
use super::operations::{arithmetic, arithmetic_operation};
use crate::ast::ArithmeticOperation;
use crate::semantic::{ErrorValue, SemanticValue};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

static AS_PERCENT_OF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(.+?)\s+as\s+(?:a\s+)?(?:%|percent|percentage)\s+of\s+(.+)$")
        .expect("percentage regex must compile")
});
static OF_WHAT_IS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(.+?)\s+of\s+what\s+is\s+(.+)$").expect("percentage regex must compile")
});
static PERCENT_OF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.+?)\s+(of|on|off)\s+(.+)$").expect("percentage regex must compile"));

/// Cheap shape check for the pipeline
pub fn looks_like_phrase(text: &str) -> bool {
    AS_PERCENT_OF.is_match(text) || OF_WHAT_IS.is_match(text) || PERCENT_OF.is_match(text)
}

pub fn evaluate_phrase(text: &str, ctx: &mut EvaluationContext<'_>) -> Option<SemanticValue> {
    let text = text.trim();
    if ctx.is_defined(text) {
        return None;
    }

    if let Some(caps) = AS_PERCENT_OF.captures(text) {
        let part = evaluate_text(caps.get(1)?.as_str(), None, ctx);
        let whole = evaluate_text(caps.get(2)?.as_str(), None, ctx);
        return Some(ratio_as_percentage(&part, &whole));
    }

    if let Some(caps) = OF_WHAT_IS.captures(text) {
        let d = percentage_fraction(&evaluate_text(caps.get(1)?.as_str(), None, ctx))?;
        let result = evaluate_text(caps.get(2)?.as_str(), None, ctx);
        return Some(arithmetic(&result, ArithmeticOperation::Divide, &SemanticValue::Number(d)));
    }

    let caps = PERCENT_OF.captures(text)?;
    let d = percentage_fraction(&evaluate_text(caps.get(1)?.as_str(), None, ctx))?;
    let factor = match caps.get(2)?.as_str().to_lowercase().as_str() {
        "of" => d,
        "on" => Decimal::ONE + d,
        _ => Decimal::ONE - d,
    };
    let base = evaluate_text(caps.get(3)?.as_str(), None, ctx);
    Some(arithmetic(&base, ArithmeticOperation::Multiply, &SemanticValue::Number(factor)))
}

/// The decimal fraction of a percentage value; anything else declines
fn percentage_fraction(value: &SemanticValue) -> Option<Decimal> {
    match value {
        SemanticValue::Percentage(p) => Some(*p / Decimal::ONE_HUNDRED),
        _ => None,
    }
}

fn ratio_as_percentage(part: &SemanticValue, whole: &SemanticValue) -> SemanticValue {
    let ratio = match arithmetic_operation(part, ArithmeticOperation::Divide, whole) {
        Ok(ratio) => ratio,
        Err(error) => return SemanticValue::Error(error),
    };
    match ratio {
        SemanticValue::Number(n) => SemanticValue::Percentage(n * Decimal::ONE_HUNDRED),
        other => SemanticValue::Error(
            ErrorValue::type_mismatch(
                "Cannot express the ratio as a percentage",
                "number",
                other.value_type().name(),
            )
            .with_suggestion("Both sides need the same kind of value"),
        ),
    }
}
