//! Date and duration chains
//!
//! `anchor (± term)* [to|in|as target]`, evaluated left to right. Terms are
//! duration phrases (`3 business days`, `2 hours 30 minutes`), further anchors
//! (dates, times, keywords) or date/time/duration variables.

pub mod anchor;
pub mod zones;

use crate::ast::ArithmeticOperation;
use crate::evaluator::context::EvaluationContext;
use crate::evaluator::conversion;
use crate::evaluator::operations;
use crate::semantic::{DurationPart, DurationUnit, DurationValue, SemanticValue};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::trace;

pub use anchor::{parse_anchor, Anchor};

static DURATION_PART: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(\d+(?:\.\d+)?|\.\d+)\s*((?:business|working)\s+days?|[a-z]+)")
        .expect("duration regex must compile")
});
static SIGN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([+\-−])\s*").expect("sign regex must compile"));

/// Duration written as number/unit pairs at the start of `text`
pub fn parse_duration_prefix(text: &str) -> Option<(DurationValue, usize)> {
    let mut parts = Vec::new();
    let mut used = 0;
    while let Some(caps) = DURATION_PART.captures(&text[used..]) {
        let unit_text = caps.get(2)?.as_str();
        let Some(unit) = DurationUnit::parse(unit_text) else {
            break;
        };
        let amount = Decimal::from_str(caps.get(1)?.as_str()).ok()?;
        parts.push(DurationPart { amount, unit });
        used += caps.get(0)?.end();
        // "1 year and 2 months"
        let rest = &text[used..];
        if let Some(stripped) = rest.trim_start().strip_prefix("and ") {
            if DURATION_PART.is_match(stripped) {
                used = text.len() - stripped.len();
            }
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some((DurationValue::from_parts(parts), used))
}

/// Cheap check used to claim a line: does `text` start with a date anchor
/// that is followed by nothing, an operator chain or a conversion?
pub fn starts_with_anchor(text: &str, ctx: &EvaluationContext<'_>) -> bool {
    match parse_anchor(text, ctx) {
        Some(anchor) => {
            let rest = text[anchor.consumed..].trim();
            rest.is_empty()
                || SIGN.is_match(rest)
                || conversion::split_conversion(&format!("x {}", rest)).is_some()
        }
        None => false,
    }
}

/// Evaluate a date chain. `None` means the text is not one.
pub fn evaluate(text: &str, ctx: &mut EvaluationContext<'_>) -> Option<SemanticValue> {
    if let Some((source, target)) = conversion::split_conversion(text) {
        if let Some(value) = evaluate_chain(source, ctx) {
            return Some(
                target
                    .apply(&value, ctx.local_zone())
                    .unwrap_or_else(SemanticValue::Error),
            );
        }
    }
    evaluate_chain(text, ctx)
}

fn evaluate_chain(text: &str, ctx: &EvaluationContext<'_>) -> Option<SemanticValue> {
    let start = parse_anchor(text, ctx)?;
    let mut value = start.value;
    let mut rest = &text[start.consumed..];
    let mut terms = 0;

    while !rest.trim().is_empty() {
        let sign = SIGN.captures(rest)?;
        let op = match sign.get(1)?.as_str() {
            "+" => ArithmeticOperation::Add,
            _ => ArithmeticOperation::Subtract,
        };
        rest = &rest[sign.get(0)?.end()..];
        let (term, used) = parse_term(rest, ctx)?;
        rest = &rest[used..];
        value = operations::arithmetic(&value, op, &term);
        terms += 1;
    }

    // A bare variable is an ordinary expression, not a date chain
    if terms == 0 && !is_literal_anchor(&value, text, ctx) {
        return None;
    }
    trace!(terms, "evaluated date chain");
    Some(value)
}

fn is_literal_anchor(value: &SemanticValue, text: &str, ctx: &EvaluationContext<'_>) -> bool {
    match value {
        SemanticValue::Date(_) | SemanticValue::Time(_) => ctx.lookup(text.trim()).is_none(),
        _ => false,
    }
}

fn parse_term(text: &str, ctx: &EvaluationContext<'_>) -> Option<(SemanticValue, usize)> {
    if let Some((duration, used)) = parse_duration_prefix(text) {
        return Some((SemanticValue::Duration(duration), used));
    }
    parse_anchor(text, ctx).map(|anchor| (anchor.value, anchor.consumed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_durations() {
        let (duration, used) = parse_duration_prefix("2 hours 30 minutes - x").unwrap();
        assert_eq!(used, "2 hours 30 minutes".len());
        assert_eq!(duration.parts().len(), 2);

        let (duration, _) = parse_duration_prefix("1 year and 2 months").unwrap();
        assert_eq!(duration.parts()[1].unit, DurationUnit::Month);
    }

    #[test]
    fn business_days_are_one_unit() {
        let (duration, _) = parse_duration_prefix("3 business days").unwrap();
        assert!(duration.has_business_days());
    }

    #[test]
    fn plain_numbers_are_not_durations() {
        assert!(parse_duration_prefix("3 apples").is_none());
        assert!(parse_duration_prefix("+ 3").is_none());
    }
}
