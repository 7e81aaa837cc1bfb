//! Semantic evaluation of expression text
//!
//! `evaluate_text` is the single entry point used by the pipeline, the solver
//! and function calls. It tries, in order:
//! 1. the whole text as a known name
//! 2. percentage phrasing (`20% of 100`)
//! 3. date chains (`today + 3 business days`)
//! 4. a trailing conversion (`... to km`)
//! 5. the component tree, by precedence climbing

pub mod context;
pub mod conversion;
pub mod datetime;
pub mod expression;
pub mod functions;
pub mod operations;
pub mod percentage;

pub use context::EvaluationContext;
pub use expression::{evaluate_components, resolve_variable};
pub use operations::{arithmetic, ValueResult};

use crate::ast::ExpressionComponent;
use crate::datemath;
use crate::parser::parse_components;
use crate::semantic::{ErrorValue, SemanticValue};

/// Evaluate `text`. `components` are used when the caller has already parsed it.
pub fn evaluate_text(
    text: &str,
    components: Option<&[ExpressionComponent]>,
    ctx: &mut EvaluationContext<'_>,
) -> SemanticValue {
    let text = text.trim();
    if text.is_empty() {
        return SemanticValue::Error(ErrorValue::parse("Empty expression"));
    }
    if let Some(value) = ctx.lookup(text) {
        return value;
    }
    if let Some(value) = percentage::evaluate_phrase(text, ctx) {
        return with_expression(value, text);
    }
    if let Some(value) = datemath::evaluate(text, ctx) {
        return with_expression(value, text);
    }
    if let Some((source, target)) = conversion::split_conversion(text) {
        let value = evaluate_text(source, None, ctx);
        if value.is_error() {
            return value;
        }
        let converted = target
            .apply(&value, ctx.local_zone())
            .unwrap_or_else(SemanticValue::Error);
        return with_expression(converted, text);
    }

    let parsed;
    let components = match components {
        Some(components) => components,
        None => match parse_components(text) {
            Ok(c) => {
                parsed = c;
                &parsed
            }
            Err(error) => {
                let mut value = ErrorValue::parse(error.message());
                if let Some(suggestion) = error.details().and_then(|d| d.suggestion.clone()) {
                    value = value.with_suggestion(suggestion);
                }
                return SemanticValue::Error(value.with_expression(text));
            }
        },
    };
    with_expression(evaluate_components(components, ctx), text)
}

fn with_expression(value: SemanticValue, text: &str) -> SemanticValue {
    match value {
        SemanticValue::Error(error) => SemanticValue::Error(error.with_expression(text)),
        other => other,
    }
}
