//! Builtin and user-defined function calls

use super::context::EvaluationContext;
use super::evaluate_components;
use super::operations::{arithmetic_operation, ValueResult};
use crate::ast::{ArithmeticOperation, Argument};
use crate::semantic::{CurrencyRate, ErrorValue, ListValue, SemanticValue};
use crate::stores::{normalize_name, FunctionDefinition};
use crate::units::{DimensionVector, Quantity};
use indexmap::IndexMap;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::cmp::Ordering;
use tracing::trace;

/// Names of the builtin functions, for suggestions and reserved-name checks
pub const BUILTINS: &[&str] = &[
    "sqrt", "cbrt", "abs", "round", "floor", "ceil", "ln", "log", "log2", "exp", "sin", "cos",
    "tan", "asin", "acos", "atan", "min", "max", "sum", "avg", "average", "mean", "median",
    "count", "pow",
];

const FLOAT_PLACES: u32 = 15;

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&normalize_name(name).as_str())
}

/// Evaluated call arguments
struct Arguments {
    positional: Vec<SemanticValue>,
    named: IndexMap<String, SemanticValue>,
}

impl Arguments {
    fn get(&self, index: usize, name: &str) -> Option<&SemanticValue> {
        self.positional.get(index).or_else(|| self.named.get(name))
    }

    fn count(&self) -> usize {
        self.positional.len() + self.named.len()
    }
}

/// Call `name` with unevaluated `args`. User functions shadow builtins.
pub fn call(name: &str, args: &[Argument], ctx: &mut EvaluationContext<'_>) -> SemanticValue {
    let name = normalize_name(name);
    let mut evaluated = Arguments {
        positional: Vec::new(),
        named: IndexMap::new(),
    };
    for arg in args {
        let value = evaluate_components(&arg.components, ctx);
        if let SemanticValue::Error(error) = value {
            return SemanticValue::Error(error);
        }
        match &arg.name {
            Some(arg_name) => {
                evaluated.named.insert(normalize_name(arg_name), value);
            }
            None => evaluated.positional.push(value),
        }
    }

    let result = match ctx.functions.function(&name).cloned() {
        Some(definition) => call_user(&definition, evaluated, ctx),
        None => call_builtin(&name, &evaluated),
    };
    result.unwrap_or_else(SemanticValue::Error)
}

fn call_user(definition: &FunctionDefinition, args: Arguments, ctx: &mut EvaluationContext<'_>) -> ValueResult {
    if args.positional.len() > definition.params.len() {
        return Err(ErrorValue::semantic(format!(
            "{} takes {} argument(s), got {}",
            definition.signature(),
            definition.params.len(),
            args.positional.len()
        )));
    }
    let mut bindings: IndexMap<String, SemanticValue> = IndexMap::new();
    for (param, value) in definition.params.iter().zip(args.positional) {
        bindings.insert(param.name.clone(), value);
    }
    for (name, value) in args.named {
        if !definition.params.iter().any(|p| p.name == name) {
            return Err(ErrorValue::semantic(format!(
                "{} has no parameter '{}'",
                definition.signature(),
                name
            )));
        }
        bindings.insert(name, value);
    }

    ctx.enter_call(&definition.name)?;
    trace!(function = %definition.name, depth = ctx.call_depth(), "calling user function");
    ctx.push_scope(bindings);
    let result = bind_defaults(definition, ctx).map(|_| evaluate_components(&definition.body, ctx));
    ctx.pop_scope();
    ctx.exit_call();
    result
}

/// Defaults are evaluated inside the call scope, so they may use earlier parameters
fn bind_defaults(definition: &FunctionDefinition, ctx: &mut EvaluationContext<'_>) -> Result<(), ErrorValue> {
    for param in &definition.params {
        if ctx.lookup_local(&param.name).is_some() {
            continue;
        }
        match &param.default {
            Some(default) => {
                let value = evaluate_components(default, ctx);
                if let SemanticValue::Error(error) = value {
                    return Err(error);
                }
                ctx.bind_local(&param.name, value);
            }
            None => {
                return Err(ErrorValue::semantic(format!(
                    "Missing argument '{}' for {}",
                    param.name,
                    definition.signature()
                )))
            }
        }
    }
    Ok(())
}

fn arity(name: &str, args: &Arguments, min: usize, max: usize) -> Result<(), ErrorValue> {
    let count = args.count();
    if count < min || count > max {
        let expected = if min == max {
            format!("{}", min)
        } else {
            format!("{} to {}", min, max)
        };
        return Err(ErrorValue::semantic(format!(
            "{}() takes {} argument(s), got {}",
            name, expected, count
        )));
    }
    Ok(())
}

fn first<'v>(name: &str, args: &'v Arguments) -> Result<&'v SemanticValue, ErrorValue> {
    args.get(0, "x")
        .ok_or_else(|| ErrorValue::semantic(format!("{}() needs an argument", name)))
}

fn call_builtin(name: &str, args: &Arguments) -> ValueResult {
    match name {
        "sqrt" => {
            arity(name, args, 1, 1)?;
            let x = first(name, args)?;
            if x.to_number().is_ok_and(|n| n.is_sign_negative() && !n.is_zero()) {
                return Err(ErrorValue::semantic("Cannot take the square root of a negative number"));
            }
            arithmetic_operation(x, ArithmeticOperation::Power, &SemanticValue::Number(dec!(0.5)))
        }
        "cbrt" => {
            arity(name, args, 1, 1)?;
            match first(name, args)? {
                SemanticValue::Unit(q) => super::operations::quantity_root(q, 3),
                other => float(name, plain(name, other)?.cbrt()),
            }
        }
        "abs" => {
            arity(name, args, 1, 1)?;
            map_amount(name, first(name, args)?, &|n| n.abs())
        }
        "round" => {
            arity(name, args, 1, 2)?;
            let digits = match args.get(1, "digits") {
                Some(d) => whole_number(name, d)?,
                None => 0,
            };
            let digits = u32::try_from(digits)
                .ok()
                .filter(|d| *d <= 28)
                .ok_or_else(|| ErrorValue::semantic("round() digits must be between 0 and 28"))?;
            map_amount(name, first(name, args)?, &|n| {
                n.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero)
            })
        }
        "floor" => {
            arity(name, args, 1, 1)?;
            map_amount(name, first(name, args)?, &|n| n.floor())
        }
        "ceil" => {
            arity(name, args, 1, 1)?;
            map_amount(name, first(name, args)?, &|n| n.ceil())
        }
        "ln" => unary_float(name, args, f64::ln),
        "log2" => unary_float(name, args, f64::log2),
        "exp" => unary_float(name, args, f64::exp),
        "log" => {
            arity(name, args, 1, 2)?;
            let x = plain(name, first(name, args)?)?;
            let base = match args.get(1, "base") {
                Some(b) => plain(name, b)?,
                None => 10.0,
            };
            if base <= 0.0 || base == 1.0 {
                return Err(ErrorValue::semantic("log() base must be positive and not 1"));
            }
            float(name, x.log(base))
        }
        "sin" | "cos" | "tan" => {
            arity(name, args, 1, 1)?;
            let radians = angle(name, first(name, args)?)?;
            let result = match name {
                "sin" => radians.sin(),
                "cos" => radians.cos(),
                _ => radians.tan(),
            };
            float(name, result)
        }
        "asin" => unary_float(name, args, f64::asin),
        "acos" => unary_float(name, args, f64::acos),
        "atan" => unary_float(name, args, f64::atan),
        "pow" => {
            arity(name, args, 2, 2)?;
            let exponent = args
                .get(1, "exponent")
                .ok_or_else(|| ErrorValue::semantic("pow() needs an exponent"))?;
            arithmetic_operation(first(name, args)?, ArithmeticOperation::Power, exponent)
        }
        "count" => Ok(SemanticValue::Number(Decimal::from(values(args).len()))),
        "sum" => sum(&values(args)),
        "avg" | "average" | "mean" => {
            let items = values(args);
            if items.is_empty() {
                return Err(ErrorValue::semantic(format!("{}() of nothing", name)));
            }
            let total = sum(&items)?;
            arithmetic_operation(
                &total,
                ArithmeticOperation::Divide,
                &SemanticValue::Number(Decimal::from(items.len())),
            )
        }
        "min" | "max" => {
            let items = values(args);
            let mut best = items
                .first()
                .cloned()
                .ok_or_else(|| ErrorValue::semantic(format!("{}() of nothing", name)))?;
            for item in &items[1..] {
                let ordering = compare(item, &best)?;
                let better = if name == "min" {
                    ordering == Ordering::Less
                } else {
                    ordering == Ordering::Greater
                };
                if better {
                    best = item.clone();
                }
            }
            Ok(best)
        }
        "median" => median(values(args)),
        _ => Err(ErrorValue::semantic(format!("Unknown function '{}'", name))
            .with_suggestion(format!("Define it first, e.g. {}(x) = x * 2", name))),
    }
}

/// Aggregate inputs: one list argument, or every argument
fn values(args: &Arguments) -> Vec<SemanticValue> {
    let all: Vec<&SemanticValue> = args.positional.iter().chain(args.named.values()).collect();
    match all.as_slice() {
        [SemanticValue::List(list)] => list.items().to_vec(),
        _ => all.into_iter().cloned().collect(),
    }
}

fn sum(items: &[SemanticValue]) -> ValueResult {
    let Some((head, tail)) = items.split_first() else {
        return Ok(SemanticValue::Number(Decimal::ZERO));
    };
    tail.iter().try_fold(head.clone(), |total, item| {
        arithmetic_operation(&total, ArithmeticOperation::Add, item)
    })
}

fn median(mut items: Vec<SemanticValue>) -> ValueResult {
    if items.is_empty() {
        return Err(ErrorValue::semantic("median() of nothing"));
    }
    let mut failure = None;
    items.sort_by(|a, b| {
        compare(a, b).unwrap_or_else(|error| {
            failure.get_or_insert(error);
            Ordering::Equal
        })
    });
    if let Some(error) = failure {
        return Err(error);
    }
    let mid = items.len() / 2;
    if items.len() % 2 == 1 {
        return Ok(items[mid].clone());
    }
    let pair = arithmetic_operation(&items[mid - 1], ArithmeticOperation::Add, &items[mid])?;
    arithmetic_operation(&pair, ArithmeticOperation::Divide, &SemanticValue::Number(Decimal::TWO))
}

/// Order two values by the sign of their difference, so units convert and
/// currencies must match
fn compare(a: &SemanticValue, b: &SemanticValue) -> Result<Ordering, ErrorValue> {
    let difference = arithmetic_operation(a, ArithmeticOperation::Subtract, b)?;
    let sign = match &difference {
        SemanticValue::Number(n) | SemanticValue::Percentage(n) => *n,
        SemanticValue::Currency(m) => m.amount,
        SemanticValue::Unit(q) => q.value,
        SemanticValue::Duration(d) => d.total_seconds()?,
        other => {
            return Err(ErrorValue::type_mismatch(
                format!("Cannot compare {} values", a.value_type()),
                "number",
                other.value_type().name(),
            ))
        }
    };
    Ok(sign.cmp(&Decimal::ZERO))
}

/// Apply `f` to the amount, keeping the kind and unit
fn map_amount(name: &str, value: &SemanticValue, f: &dyn Fn(Decimal) -> Decimal) -> ValueResult {
    match value {
        SemanticValue::Number(n) => Ok(SemanticValue::Number(f(*n))),
        SemanticValue::Percentage(p) => Ok(SemanticValue::Percentage(f(*p))),
        SemanticValue::Currency(m) => Ok(SemanticValue::Currency(m.with_amount(f(m.amount)))),
        SemanticValue::CurrencyUnit(r) => Ok(SemanticValue::CurrencyUnit(CurrencyRate::new(
            f(r.amount),
            r.currency,
            r.unit.clone(),
        ))),
        SemanticValue::Unit(q) => Ok(SemanticValue::Unit(Quantity::new(f(q.value), q.unit.clone()))),
        SemanticValue::List(list) => {
            let items = list
                .items()
                .iter()
                .map(|item| map_amount(name, item, f))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(SemanticValue::List(ListValue::new(items, usize::MAX)?))
        }
        other => Err(ErrorValue::type_mismatch(
            format!("{}() needs a number", name),
            "number",
            other.value_type().name(),
        )),
    }
}

fn plain(name: &str, value: &SemanticValue) -> Result<f64, ErrorValue> {
    let number = match value {
        SemanticValue::Number(n) => *n,
        SemanticValue::Percentage(p) => *p / Decimal::ONE_HUNDRED,
        other => {
            return Err(ErrorValue::type_mismatch(
                format!("{}() needs a plain number", name),
                "number",
                other.value_type().name(),
            ))
        }
    };
    number
        .to_f64()
        .ok_or_else(|| ErrorValue::runtime(format!("{}() argument is out of range", name)))
}

fn whole_number(name: &str, value: &SemanticValue) -> Result<i64, ErrorValue> {
    match value {
        SemanticValue::Number(n) if n.fract().is_zero() => n
            .to_i64()
            .ok_or_else(|| ErrorValue::runtime(format!("{}() argument is out of range", name))),
        other => Err(ErrorValue::type_mismatch(
            format!("{}() needs a whole number", name),
            "whole number",
            other.value_type().name(),
        )),
    }
}

/// Radians from a plain number or an angle quantity
fn angle(name: &str, value: &SemanticValue) -> Result<f64, ErrorValue> {
    match value {
        SemanticValue::Unit(q) if q.dimension() == DimensionVector::ANGLE => q
            .base_value()
            .map_err(super::operations::unit_error)?
            .to_f64()
            .ok_or_else(|| ErrorValue::runtime(format!("{}() argument is out of range", name))),
        other => plain(name, other),
    }
}

fn unary_float(name: &str, args: &Arguments, f: fn(f64) -> f64) -> ValueResult {
    arity(name, args, 1, 1)?;
    float(name, f(plain(name, first(name, args)?)?))
}

fn float(name: &str, result: f64) -> ValueResult {
    if !result.is_finite() {
        return Err(ErrorValue::semantic(format!("{}() is undefined for this input", name)));
    }
    Decimal::from_f64(result)
        .map(|d| SemanticValue::Number(d.round_dp(FLOAT_PLACES).normalize()))
        .ok_or_else(|| ErrorValue::runtime(format!("{}() result cannot be represented", name)))
}
