//! Expression evaluation
//!
//! Evaluates a component sequence by precedence climbing. Adjacent operands
//! multiply (`2 x`, `3 (4)`), `of` multiplies with a percentage on its left,
//! postfix `%` turns a number into a percentage and unary minus binds looser
//! than `^`.
//!
//! Failures never short-circuit: both sides of an operator are evaluated so
//! every unknown name ends up in the error's `unresolved` list.

use super::context::EvaluationContext;
use super::functions;
use super::operations::{arithmetic, negate};
use crate::ast::{Access, ArithmeticOperation, ComponentKind, ExpressionComponent, Operator};
use crate::parser::literals::parse_value;
use crate::semantic::symbolic::UNARY_PRECEDENCE;
use crate::semantic::{DateValue, ErrorValue, ListValue, SemanticValue};
use chrono::Duration;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

const PI: Decimal = dec!(3.1415926535897932384626433833);
const E: Decimal = dec!(2.7182818284590452353602874714);
const TAU: Decimal = dec!(6.2831853071795864769252867666);

/// Precedence at which `of` and implicit multiplication bind
const PRODUCT_PRECEDENCE: u8 = 2;

pub fn evaluate_components(components: &[ExpressionComponent], ctx: &mut EvaluationContext<'_>) -> SemanticValue {
    if components.is_empty() {
        return SemanticValue::Error(ErrorValue::parse("Empty expression"));
    }
    let mut pos = 0;
    let value = expression(components, &mut pos, 0, ctx);
    match components.get(pos) {
        Some(extra) => SemanticValue::Error(ErrorValue::syntax(
            format!("Unexpected '{}'", extra.text),
            "Check for a missing operator",
        )),
        None => value,
    }
}

fn expression(
    components: &[ExpressionComponent],
    pos: &mut usize,
    min_precedence: u8,
    ctx: &mut EvaluationContext<'_>,
) -> SemanticValue {
    let mut left = unary(components, pos, ctx);

    while let Some(next) = components.get(*pos) {
        let (operator, explicit) = match &next.kind {
            ComponentKind::Operator(Operator::Percent) => {
                *pos += 1;
                left = to_percentage(left);
                continue;
            }
            ComponentKind::Operator(op) => (*op, true),
            _ => (Operator::Binary(ArithmeticOperation::Multiply), false),
        };
        let (op, precedence) = match operator {
            Operator::Binary(op) => (op, op.precedence()),
            Operator::Of | Operator::Percent => (ArithmeticOperation::Multiply, PRODUCT_PRECEDENCE),
        };
        if precedence < min_precedence {
            break;
        }
        if explicit {
            *pos += 1;
        } else if *pos > 0 && is_bare_number(&components[*pos - 1]) && is_bare_number(next) {
            let written = format!("{} {}", components[*pos - 1].text, next.text);
            *pos = components.len();
            return SemanticValue::Error(ErrorValue::syntax(
                format!("Two numbers in a row: '{}'", written),
                format!("Write '{}' without the space, or put an operator between them", written.replace(' ', "")),
            ));
        }
        let next_min = if op.is_right_associative() {
            precedence
        } else {
            precedence + 1
        };
        if components.get(*pos).is_none() {
            return SemanticValue::Error(ErrorValue::syntax(
                format!("Missing value after '{}'", next.text),
                "Complete the expression",
            ));
        }
        let right = expression(components, pos, next_min, ctx);
        left = match (operator, &left) {
            (Operator::Of, SemanticValue::Percentage(p)) => arithmetic(
                &right,
                ArithmeticOperation::Multiply,
                &SemanticValue::Number(*p / Decimal::ONE_HUNDRED),
            ),
            _ => arithmetic(&left, op, &right),
        };
    }
    left
}

fn is_bare_number(component: &ExpressionComponent) -> bool {
    matches!(component.kind, ComponentKind::Literal(Some(SemanticValue::Number(_))))
}

fn unary(components: &[ExpressionComponent], pos: &mut usize, ctx: &mut EvaluationContext<'_>) -> SemanticValue {
    let Some(component) = components.get(*pos) else {
        return SemanticValue::Error(ErrorValue::syntax("Missing value", "Complete the expression"));
    };
    match component.kind {
        ComponentKind::Operator(Operator::Binary(ArithmeticOperation::Subtract)) => {
            *pos += 1;
            negate(&expression(components, pos, UNARY_PRECEDENCE, ctx))
        }
        ComponentKind::Operator(Operator::Binary(ArithmeticOperation::Add)) => {
            *pos += 1;
            expression(components, pos, UNARY_PRECEDENCE, ctx)
        }
        ComponentKind::Operator(_) => {
            *pos += 1;
            SemanticValue::Error(ErrorValue::syntax(
                format!("Unexpected '{}'", component.text),
                "An operator needs a value on its left",
            ))
        }
        _ => {
            *pos += 1;
            operand(component, ctx)
        }
    }
}

fn to_percentage(value: SemanticValue) -> SemanticValue {
    match value {
        SemanticValue::Number(n) => SemanticValue::Percentage(n),
        SemanticValue::Percentage(_) | SemanticValue::Error(_) => value,
        other => SemanticValue::Error(
            ErrorValue::type_mismatch(
                format!("'%' cannot apply to a {}", other.value_type()),
                "number",
                other.value_type().name(),
            )
            .with_suggestion("Use 'mod' for the remainder of a division"),
        ),
    }
}

fn operand(component: &ExpressionComponent, ctx: &mut EvaluationContext<'_>) -> SemanticValue {
    match &component.kind {
        ComponentKind::Literal(Some(value)) => value.clone(),
        ComponentKind::Literal(None) => parse_value(&component.text).unwrap_or_else(|| {
            SemanticValue::Error(ErrorValue::parse(format!("Cannot read '{}'", component.text)))
        }),
        ComponentKind::Variable(name) => resolve_variable(name, ctx),
        ComponentKind::Function { name, args } => functions::call(name, args, ctx),
        ComponentKind::Parentheses(children) => evaluate_components(children, ctx),
        ComponentKind::List(items) => list(items, ctx),
        ComponentKind::ListAccess { base, access } => list_access(base, access, ctx),
        ComponentKind::Range { start, end, step } => range(start, end, step.as_deref(), ctx),
        ComponentKind::Operator(_) => SemanticValue::Error(ErrorValue::syntax(
            format!("Unexpected '{}'", component.text),
            "An operator needs values on both sides",
        )),
    }
}

/// Stores and locals first, then constants and date keywords. A phrase that is
/// not a known name multiplies its words when every word resolves.
pub fn resolve_variable(name: &str, ctx: &EvaluationContext<'_>) -> SemanticValue {
    if let Some(value) = known_value(name, ctx) {
        return value;
    }
    let words: Vec<&str> = name
        .split_whitespace()
        .filter(|word| !word.eq_ignore_ascii_case("of"))
        .collect();
    if words.len() > 1 {
        let values: Option<Vec<SemanticValue>> = words.iter().map(|w| known_value(w, ctx)).collect();
        if let Some(values) = values {
            let mut iter = values.into_iter();
            if let Some(first) = iter.next() {
                return iter.fold(first, |product, value| {
                    arithmetic(&product, ArithmeticOperation::Multiply, &value)
                });
            }
        }
    }
    SemanticValue::Error(ErrorValue::unknown_variable(name))
}

fn known_value(name: &str, ctx: &EvaluationContext<'_>) -> Option<SemanticValue> {
    if let Some(value) = ctx.lookup(name) {
        return Some(value);
    }
    let today = ctx.now.date_naive();
    let value = match name.to_lowercase().as_str() {
        "pi" | "π" => SemanticValue::Number(PI),
        "e" => SemanticValue::Number(E),
        "tau" | "τ" => SemanticValue::Number(TAU),
        "today" => SemanticValue::Date(DateValue::date_only(today)),
        "tomorrow" => SemanticValue::Date(DateValue::date_only(today + Duration::days(1))),
        "yesterday" => SemanticValue::Date(DateValue::date_only(today - Duration::days(1))),
        "now" => SemanticValue::Date(DateValue::with_time(ctx.now.naive_local(), Some(*ctx.now.offset()))),
        _ => return None,
    };
    Some(value)
}

fn list(items: &[Vec<ExpressionComponent>], ctx: &mut EvaluationContext<'_>) -> SemanticValue {
    let mut values = Vec::with_capacity(items.len());
    for item in items {
        let value = evaluate_components(item, ctx);
        if value.is_error() {
            return value;
        }
        values.push(value);
    }
    match ListValue::new(values, ctx.limits.max_list_length) {
        Ok(list) => SemanticValue::List(list),
        Err(error) => SemanticValue::Error(error),
    }
}

fn integer(value: &SemanticValue, what: &str) -> Result<i64, ErrorValue> {
    match value {
        SemanticValue::Number(n) if n.fract().is_zero() => n
            .to_i64()
            .ok_or_else(|| ErrorValue::runtime(format!("{} is out of range", what))),
        SemanticValue::Error(error) => Err(error.clone()),
        other => Err(ErrorValue::type_mismatch(
            format!("{} must be a whole number", what),
            "whole number",
            other.value_type().name(),
        )),
    }
}

fn slice_bound(
    components: Option<&[ExpressionComponent]>,
    ctx: &mut EvaluationContext<'_>,
) -> Result<Option<i64>, ErrorValue> {
    components
        .map(|c| integer(&evaluate_components(c, ctx), "A slice bound"))
        .transpose()
}

fn list_access(base: &ExpressionComponent, access: &Access, ctx: &mut EvaluationContext<'_>) -> SemanticValue {
    let list = match operand(base, ctx) {
        SemanticValue::List(list) => list,
        SemanticValue::Error(error) => return SemanticValue::Error(error),
        other => {
            return SemanticValue::Error(ErrorValue::type_mismatch(
                format!("'{}' is not a list", base.text),
                "list",
                other.value_type().name(),
            ))
        }
    };
    let result = match access {
        Access::Index(index) => integer(&evaluate_components(index, ctx), "An index").and_then(|i| {
            list.get(i).cloned().ok_or_else(|| {
                ErrorValue::runtime(format!(
                    "Index {} is out of range for a list of {} items",
                    i,
                    list.len()
                ))
            })
        }),
        Access::Slice { start, end } => slice_bound(start.as_deref(), ctx).and_then(|from| {
            let to = slice_bound(end.as_deref(), ctx)?;
            Ok(SemanticValue::List(list.slice(from, to)))
        }),
    };
    result.unwrap_or_else(SemanticValue::Error)
}

/// Inclusive; descends when start > end. The step is always positive.
fn range(
    start: &ExpressionComponent,
    end: &ExpressionComponent,
    step: Option<&ExpressionComponent>,
    ctx: &mut EvaluationContext<'_>,
) -> SemanticValue {
    let (from, to, step) = match range_bounds(start, end, step, ctx) {
        Ok(bounds) => bounds,
        Err(error) => return SemanticValue::Error(error),
    };
    if step <= Decimal::ZERO {
        return SemanticValue::Error(
            ErrorValue::semantic("Range step must be positive")
                .with_suggestion("Ranges count down on their own when start > end"),
        );
    }
    let span = (to - from).abs();
    let count = (span / step).floor() + Decimal::ONE;
    let limit = ctx.limits.max_list_length;
    if count > Decimal::from(limit) {
        return SemanticValue::Error(ErrorValue::runtime(format!(
            "Range has {} items; the limit is {}",
            count, limit
        )));
    }
    let direction = if from > to { -step } else { step };
    let count = count.to_usize().unwrap_or(0);
    let items = (0..count)
        .map(|i| SemanticValue::Number(from + direction * Decimal::from(i)))
        .collect();
    match ListValue::new(items, limit) {
        Ok(list) => SemanticValue::List(list),
        Err(error) => SemanticValue::Error(error),
    }
}

fn range_bounds(
    start: &ExpressionComponent,
    end: &ExpressionComponent,
    step: Option<&ExpressionComponent>,
    ctx: &mut EvaluationContext<'_>,
) -> Result<(Decimal, Decimal, Decimal), ErrorValue> {
    let from = range_number(operand(start, ctx), "start")?;
    let to = range_number(operand(end, ctx), "end")?;
    let step = match step {
        Some(step) => range_number(operand(step, ctx), "step")?,
        None => Decimal::ONE,
    };
    Ok((from, to, step))
}

fn range_number(value: SemanticValue, what: &str) -> Result<Decimal, ErrorValue> {
    match value {
        SemanticValue::Number(n) => Ok(n),
        SemanticValue::Error(error) => Err(error),
        other => Err(ErrorValue::type_mismatch(
            format!("Range {} must be a number", what),
            "number",
            other.value_type().name(),
        )),
    }
}
