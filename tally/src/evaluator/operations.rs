//! Type-aware arithmetic
//!
//! Dispatches on (left kind, right kind) for every operator. Errors are values:
//! helpers return `ValueResult` and `arithmetic` folds the error back into a
//! `SemanticValue`.

use super::datetime;
use crate::ast::ArithmeticOperation;
use crate::semantic::{
    CurrencyRate, DurationValue, ErrorValue, ListValue, Money, SemanticValue, SymbolicValue,
};
use crate::semantic::symbolic::{ATOM_PRECEDENCE, UNARY_PRECEDENCE};
use crate::units::{self, CompositeUnit, Combine, Magnitude, Quantity, UnitError};
use rust_decimal::prelude::*;

// Percentages are stored as percent points (20 for 20%)
const PERCENT_DENOMINATOR: Decimal = Decimal::ONE_HUNDRED;

pub type ValueResult = Result<SemanticValue, ErrorValue>;

/// Perform type-aware arithmetic, returning an `Error` value on failure.
///
/// # Examples
/// ```text
/// 100 + 20%          = 120
/// 100 * 20%          = 20
/// $50 + $30          = $80
/// 50 m + 20 ft       = 56.096 m
/// 2024-01-15 + 5 days = 2024-01-20
/// ```
pub fn arithmetic(left: &SemanticValue, op: ArithmeticOperation, right: &SemanticValue) -> SemanticValue {
    arithmetic_operation(left, op, right).unwrap_or_else(SemanticValue::Error)
}

pub fn arithmetic_operation(
    left: &SemanticValue,
    op: ArithmeticOperation,
    right: &SemanticValue,
) -> ValueResult {
    use SemanticValue::*;

    match (left, right) {
        // Errors absorb everything
        (Error(l), Error(r)) => Err(l.clone().chain(r.clone())),
        (Error(e), _) | (_, Error(e)) => Err(e.clone()),

        (Symbolic(_), _) | (_, Symbolic(_)) => Ok(Symbolic(symbolic_combine(left, op, right))),

        (List(l), List(r)) => zip_lists(l, op, r),
        (List(l), _) => broadcast(l, |item| arithmetic_operation(item, op, right)),
        (_, List(r)) => broadcast(r, |item| arithmetic_operation(left, op, item)),

        (Number(l), Number(r)) => Ok(Number(number_arithmetic(*l, op, *r)?)),
        (Number(n), Percentage(p)) => apply_percentage(*n, op, *p).map(Number),
        (Percentage(p), Number(n)) => percentage_number(*p, op, *n, left, right),
        (Percentage(l), Percentage(r)) => percentage_arithmetic(*l, op, *r),

        (Currency(m), Number(n)) => money_number(m, op, *n, left, right),
        (Number(n), Currency(m)) => match op {
            ArithmeticOperation::Add => Ok(Currency(m.with_amount(checked(n.checked_add(m.amount))?))),
            ArithmeticOperation::Subtract => Ok(Currency(m.with_amount(checked(n.checked_sub(m.amount))?))),
            ArithmeticOperation::Multiply => Ok(Currency(m.with_amount(checked(n.checked_mul(m.amount))?))),
            _ => Err(unsupported(left, op, right)),
        },
        (Currency(m), Percentage(p)) => Ok(Currency(m.with_amount(apply_percentage(m.amount, op, *p)?))),
        (Percentage(p), Currency(m)) if op == ArithmeticOperation::Multiply => {
            Ok(Currency(m.with_amount(m.amount * *p / PERCENT_DENOMINATOR)))
        }
        (Currency(l), Currency(r)) => money_money(l, op, r, left, right),
        (Currency(m), Unit(q)) => money_quantity(m, op, q, left, right),
        (Unit(q), Currency(m)) if op == ArithmeticOperation::Multiply => money_quantity(m, op, q, right, left),
        (Currency(m), Duration(d)) => money_quantity(m, op, &d.to_quantity()?, left, right),
        (Duration(d), Currency(m)) if op == ArithmeticOperation::Multiply => {
            money_quantity(m, op, &d.to_quantity()?, right, left)
        }
        (Currency(m), CurrencyUnit(r)) if op == ArithmeticOperation::Divide => {
            same_currency(m.currency, r.currency)?;
            let amount = divide(m.amount, r.amount)?;
            magnitude_value(units::combine(amount, &CompositeUnit::default(), &r.unit.inverse(), Combine::Divide).map_err(unit_error)?)
        }

        (CurrencyUnit(r), Number(n)) => match op {
            ArithmeticOperation::Multiply => Ok(CurrencyUnit(rate_with(r, checked(r.amount.checked_mul(*n))?))),
            ArithmeticOperation::Divide => Ok(CurrencyUnit(rate_with(r, divide(r.amount, *n)?))),
            _ => Err(unsupported(left, op, right)),
        },
        (Number(n), CurrencyUnit(r)) if op == ArithmeticOperation::Multiply => {
            Ok(CurrencyUnit(rate_with(r, checked(r.amount.checked_mul(*n))?)))
        }
        (CurrencyUnit(r), Percentage(p)) => Ok(CurrencyUnit(rate_with(r, apply_percentage(r.amount, op, *p)?))),
        (CurrencyUnit(r), Unit(q)) => rate_quantity(r, op, q, left, right),
        (Unit(q), CurrencyUnit(r)) if op == ArithmeticOperation::Multiply => rate_quantity(r, op, q, right, left),
        (CurrencyUnit(r), Duration(d)) => rate_quantity(r, op, &d.to_quantity()?, left, right),
        (Duration(d), CurrencyUnit(r)) if op == ArithmeticOperation::Multiply => {
            rate_quantity(r, op, &d.to_quantity()?, right, left)
        }
        (CurrencyUnit(l), CurrencyUnit(r)) => rate_rate(l, op, r, left, right),

        (Unit(q), Number(n)) => quantity_number(q, op, *n),
        (Number(n), Unit(q)) => number_quantity(*n, op, q, left, right),
        (Unit(q), Percentage(p)) => Ok(Unit(Quantity::new(apply_percentage(q.value, op, *p)?, q.unit.clone()))),
        (Percentage(p), Unit(q)) if op == ArithmeticOperation::Multiply => {
            Ok(Unit(q.scale_by(*p / PERCENT_DENOMINATOR).map_err(unit_error)?))
        }
        (Unit(l), Unit(r)) => quantity_arithmetic(l, op, r),
        (Unit(q), Duration(d)) => quantity_arithmetic(q, op, &d.to_quantity()?),

        (Duration(d), Number(n)) => match op {
            ArithmeticOperation::Multiply => Ok(Duration(d.scale(*n))),
            ArithmeticOperation::Divide => Ok(Duration(d.scale(divide(Decimal::ONE, *n)?))),
            _ => Err(unsupported(left, op, right)),
        },
        (Number(n), Duration(d)) if op == ArithmeticOperation::Multiply => Ok(Duration(d.scale(*n))),
        (Duration(d), Percentage(p)) => match op {
            ArithmeticOperation::Multiply => Ok(Duration(d.scale(*p / PERCENT_DENOMINATOR))),
            ArithmeticOperation::Add | ArithmeticOperation::Subtract => {
                Ok(Duration(d.scale(apply_percentage(Decimal::ONE, op, *p)?)))
            }
            _ => Err(unsupported(left, op, right)),
        },
        (Duration(l), Duration(r)) => duration_arithmetic(l, op, r, left, right),
        (Duration(d), Unit(q)) => match op {
            ArithmeticOperation::Add | ArithmeticOperation::Subtract if q.dimension() == units::DimensionVector::TIME => {
                let other = datetime::duration_from_quantity(q)?;
                duration_arithmetic(d, op, &other, left, right)
            }
            _ => quantity_arithmetic(&d.to_quantity()?, op, q),
        },
        (Duration(d), Date(date)) if op == ArithmeticOperation::Add => {
            Ok(Date(datetime::add_duration(date, d)?))
        }

        (Date(date), Duration(d)) => match op {
            ArithmeticOperation::Add => Ok(Date(datetime::add_duration(date, d)?)),
            ArithmeticOperation::Subtract => Ok(Date(datetime::add_duration(date, &d.negate())?)),
            _ => Err(unsupported(left, op, right)),
        },
        (Date(date), Unit(q)) if q.dimension() == units::DimensionVector::TIME => {
            let d = datetime::duration_from_quantity(q)?;
            arithmetic_operation(&Date(date.clone()), op, &Duration(d))
        }
        (Date(l), Date(r)) => match op {
            ArithmeticOperation::Subtract => Ok(Duration(datetime::date_difference(l, r)?)),
            ArithmeticOperation::Add => Err(ErrorValue::semantic("Cannot add two dates").with_suggestion(
                "Subtract dates to get the duration between them",
            )),
            _ => Err(unsupported(left, op, right)),
        },
        (Date(date), Time(t)) if op == ArithmeticOperation::Add => Ok(Date(datetime::combine_date_time(date, t))),

        (Time(t), Duration(d)) => match op {
            ArithmeticOperation::Add => Ok(Time(datetime::time_add(t, d)?)),
            ArithmeticOperation::Subtract => Ok(Time(datetime::time_add(t, &d.negate())?)),
            _ => Err(unsupported(left, op, right)),
        },
        (Time(t), Unit(q)) if q.dimension() == units::DimensionVector::TIME => {
            let d = datetime::duration_from_quantity(q)?;
            arithmetic_operation(&Time(t.clone()), op, &Duration(d))
        }
        (Time(l), Time(r)) => match op {
            ArithmeticOperation::Subtract => Ok(Duration(datetime::time_difference(l, r))),
            ArithmeticOperation::Add => Err(ErrorValue::semantic("Adding two times of day is meaningless")
                .with_suggestion("Add a duration instead, e.g. 14:30 + 2 hours")),
            _ => Err(unsupported(left, op, right)),
        },

        _ => Err(unsupported(left, op, right)),
    }
}

/// Unary minus
pub fn negate(value: &SemanticValue) -> SemanticValue {
    use SemanticValue::*;
    match value {
        Number(n) => Number(-*n),
        Percentage(p) => Percentage(-*p),
        Currency(m) => Currency(m.with_amount(-m.amount)),
        CurrencyUnit(r) => CurrencyUnit(rate_with(r, -r.amount)),
        Unit(q) => Unit(Quantity::new(-q.value, q.unit.clone())),
        Duration(d) => Duration(d.negate()),
        List(l) => broadcast(l, |item| Ok(negate(item))).unwrap_or_else(Error),
        Symbolic(s) => Symbolic(s.negate()),
        Error(e) => Error(e.clone()),
        Date(_) | Time(_) => Error(ErrorValue::type_mismatch(
            format!("Cannot negate a {}", value.value_type()),
            "number",
            value.value_type().name(),
        )),
    }
}

/// Basic number arithmetic
pub fn number_arithmetic(left: Decimal, op: ArithmeticOperation, right: Decimal) -> Result<Decimal, ErrorValue> {
    let result = exact_arithmetic(left, op, right)?;
    let underflowed = result.is_zero()
        && !left.is_zero()
        && match op {
            ArithmeticOperation::Multiply => !right.is_zero(),
            ArithmeticOperation::Divide | ArithmeticOperation::Power => true,
            _ => false,
        };
    if underflowed {
        return Err(ErrorValue::runtime(format!(
            "Result of {} {} {} is too small to represent",
            left,
            op.symbol(),
            right
        ))
        .with_suggestion("Numbers keep at most 28 decimal places; use a smaller unit"));
    }
    Ok(result)
}

fn exact_arithmetic(left: Decimal, op: ArithmeticOperation, right: Decimal) -> Result<Decimal, ErrorValue> {
    match op {
        ArithmeticOperation::Add => checked(left.checked_add(right)),
        ArithmeticOperation::Subtract => checked(left.checked_sub(right)),
        ArithmeticOperation::Multiply => checked(left.checked_mul(right)),
        ArithmeticOperation::Divide => divide(left, right),
        ArithmeticOperation::Modulo => {
            if right.is_zero() {
                return Err(ErrorValue::division_by_zero());
            }
            checked(left.checked_rem(right))
        }
        ArithmeticOperation::Power => power(left, right),
    }
}

fn power(base: Decimal, exponent: Decimal) -> Result<Decimal, ErrorValue> {
    if exponent.fract().is_zero() {
        if let Some(exp) = exponent.to_i32().filter(|e| e.abs() <= 4096) {
            if base.is_zero() && exp < 0 {
                return Err(ErrorValue::division_by_zero());
            }
            if let Some(result) = units::decimal_powi(base, exp) {
                return Ok(result);
            }
        }
    }
    let base_f = base
        .to_f64()
        .ok_or_else(|| ErrorValue::runtime("Cannot convert base to float"))?;
    let exp_f = exponent
        .to_f64()
        .ok_or_else(|| ErrorValue::runtime("Cannot convert exponent to float"))?;
    let result = base_f.powf(exp_f);
    if result.is_nan() {
        return Err(ErrorValue::semantic(format!(
            "{}^{} has no real value",
            base, exponent
        )));
    }
    Decimal::from_f64(result).ok_or_else(|| ErrorValue::runtime("Power result cannot be represented"))
}

fn divide(left: Decimal, right: Decimal) -> Result<Decimal, ErrorValue> {
    if right.is_zero() {
        return Err(ErrorValue::division_by_zero());
    }
    checked(left.checked_div(right))
}

fn checked(value: Option<Decimal>) -> Result<Decimal, ErrorValue> {
    value.ok_or_else(|| ErrorValue::runtime("Numeric overflow"))
}

/// `n + p` scales by (1 + d), `n * p` takes the percentage of n
fn apply_percentage(n: Decimal, op: ArithmeticOperation, p: Decimal) -> Result<Decimal, ErrorValue> {
    let d = p / PERCENT_DENOMINATOR;
    match op {
        ArithmeticOperation::Add => checked(n.checked_mul(Decimal::ONE + d)),
        ArithmeticOperation::Subtract => checked(n.checked_mul(Decimal::ONE - d)),
        ArithmeticOperation::Multiply => checked(n.checked_mul(d)),
        ArithmeticOperation::Divide => divide(n, d),
        ArithmeticOperation::Modulo | ArithmeticOperation::Power => Err(ErrorValue::type_mismatch(
            format!("Cannot apply {} with a percentage", op.name()),
            "number",
            "percentage",
        )),
    }
}

fn percentage_number(
    p: Decimal,
    op: ArithmeticOperation,
    n: Decimal,
    left: &SemanticValue,
    right: &SemanticValue,
) -> Result<SemanticValue, ErrorValue> {
    match op {
        ArithmeticOperation::Multiply => Ok(SemanticValue::Number(checked(p.checked_mul(n))? / PERCENT_DENOMINATOR)),
        ArithmeticOperation::Divide => Ok(SemanticValue::Percentage(divide(p, n)?)),
        ArithmeticOperation::Add | ArithmeticOperation::Subtract => Err(unsupported(left, op, right)
            .with_suggestion(format!("Write the number first, e.g. {} {} {}%", n, op.symbol(), p))),
        _ => Err(unsupported(left, op, right)),
    }
}

fn percentage_arithmetic(l: Decimal, op: ArithmeticOperation, r: Decimal) -> Result<SemanticValue, ErrorValue> {
    match op {
        ArithmeticOperation::Add | ArithmeticOperation::Subtract | ArithmeticOperation::Modulo => {
            Ok(SemanticValue::Percentage(number_arithmetic(l, op, r)?))
        }
        ArithmeticOperation::Multiply => Ok(SemanticValue::Percentage(checked(l.checked_mul(r))? / PERCENT_DENOMINATOR)),
        ArithmeticOperation::Divide => Ok(SemanticValue::Number(divide(l, r)?)),
        ArithmeticOperation::Power => Err(ErrorValue::type_mismatch(
            "Cannot raise a percentage to a percentage",
            "number",
            "percentage",
        )),
    }
}

fn money_number(
    m: &Money,
    op: ArithmeticOperation,
    n: Decimal,
    left: &SemanticValue,
    right: &SemanticValue,
) -> Result<SemanticValue, ErrorValue> {
    match op {
        ArithmeticOperation::Power => Err(unsupported(left, op, right)),
        _ => Ok(SemanticValue::Currency(m.with_amount(number_arithmetic(m.amount, op, n)?))),
    }
}

fn same_currency(
    left: &'static crate::semantic::Currency,
    right: &'static crate::semantic::Currency,
) -> Result<(), ErrorValue> {
    if left == right {
        Ok(())
    } else {
        Err(ErrorValue::semantic(format!(
            "Currency mismatch: {} and {}",
            left.code, right.code
        ))
        .with_suggestion("Exchange rates are not available; keep amounts in one currency"))
    }
}

fn money_money(
    l: &Money,
    op: ArithmeticOperation,
    r: &Money,
    left: &SemanticValue,
    right: &SemanticValue,
) -> Result<SemanticValue, ErrorValue> {
    same_currency(l.currency, r.currency)?;
    match op {
        ArithmeticOperation::Add | ArithmeticOperation::Subtract | ArithmeticOperation::Modulo => {
            Ok(SemanticValue::Currency(l.with_amount(number_arithmetic(l.amount, op, r.amount)?)))
        }
        ArithmeticOperation::Divide => Ok(SemanticValue::Number(divide(l.amount, r.amount)?)),
        _ => Err(unsupported(left, op, right)),
    }
}

/// Money combined with a quantity gives a currency rate (`$/m^2`, `$·h`)
fn money_quantity(
    m: &Money,
    op: ArithmeticOperation,
    q: &Quantity,
    left: &SemanticValue,
    right: &SemanticValue,
) -> Result<SemanticValue, ErrorValue> {
    if q.unit.has_offset() {
        return Err(unit_error(UnitError::OffsetArithmetic(q.unit.label())));
    }
    match op {
        ArithmeticOperation::Multiply => Ok(SemanticValue::CurrencyUnit(CurrencyRate::new(
            checked(m.amount.checked_mul(q.value))?,
            m.currency,
            q.unit.clone(),
        ))),
        ArithmeticOperation::Divide => Ok(SemanticValue::CurrencyUnit(CurrencyRate::new(
            divide(m.amount, q.value)?,
            m.currency,
            q.unit.inverse(),
        ))),
        _ => Err(unsupported(left, op, right)),
    }
}

fn rate_with(rate: &CurrencyRate, amount: Decimal) -> CurrencyRate {
    CurrencyRate::new(amount, rate.currency, rate.unit.clone())
}

/// `$100/m^2 * 5 m^2 = $500`; units that cancel leave plain money
fn rate_quantity(
    r: &CurrencyRate,
    op: ArithmeticOperation,
    q: &Quantity,
    left: &SemanticValue,
    right: &SemanticValue,
) -> Result<SemanticValue, ErrorValue> {
    let (amount, other, combine) = match op {
        ArithmeticOperation::Multiply => (checked(r.amount.checked_mul(q.value))?, q.unit.clone(), Combine::Multiply),
        ArithmeticOperation::Divide => (divide(r.amount, q.value)?, q.unit.inverse(), Combine::Divide),
        _ => return Err(unsupported(left, op, right)),
    };
    match units::combine(amount, &r.unit, &other, combine).map_err(unit_error)? {
        Magnitude::Number(n) => Ok(SemanticValue::Currency(Money::new(n, r.currency))),
        Magnitude::Quantity(q) => Ok(SemanticValue::CurrencyUnit(CurrencyRate::new(q.value, r.currency, q.unit))),
    }
}

fn rate_rate(
    l: &CurrencyRate,
    op: ArithmeticOperation,
    r: &CurrencyRate,
    left: &SemanticValue,
    right: &SemanticValue,
) -> Result<SemanticValue, ErrorValue> {
    same_currency(l.currency, r.currency)?;
    match op {
        ArithmeticOperation::Add | ArithmeticOperation::Subtract => {
            let converted = Quantity::new(r.amount, r.unit.clone())
                .convert_to(&l.unit)
                .map_err(unit_error)?;
            let amount = number_arithmetic(l.amount, op, converted.value)?;
            Ok(SemanticValue::CurrencyUnit(rate_with(l, amount)))
        }
        ArithmeticOperation::Divide => {
            let amount = divide(l.amount, r.amount)?;
            magnitude_value(units::combine(amount, &l.unit, &r.unit.inverse(), Combine::Divide).map_err(unit_error)?)
        }
        _ => Err(unsupported(left, op, right)),
    }
}

fn quantity_number(q: &Quantity, op: ArithmeticOperation, n: Decimal) -> Result<SemanticValue, ErrorValue> {
    match op {
        ArithmeticOperation::Power => quantity_power(q, n),
        ArithmeticOperation::Add | ArithmeticOperation::Subtract if n.is_zero() => Ok(SemanticValue::Unit(q.clone())),
        ArithmeticOperation::Add | ArithmeticOperation::Subtract => Err(unitless_sum(op, n, q)),
        _ => Ok(SemanticValue::Unit(Quantity::new(number_arithmetic(q.value, op, n)?, q.unit.clone()))),
    }
}

/// Only a literal zero is addable to a quantity without a unit
fn unitless_sum(op: ArithmeticOperation, n: Decimal, q: &Quantity) -> ErrorValue {
    let unit = q.unit.label();
    ErrorValue::semantic(format!(
        "Cannot apply {} to a plain number and '{}': dimensions differ",
        op.name(),
        unit
    ))
    .with_suggestion(format!("Write the number with a unit, e.g. '{} {}'", n, unit))
}

fn quantity_power(q: &Quantity, exponent: Decimal) -> Result<SemanticValue, ErrorValue> {
    if exponent.fract().is_zero() {
        let n = exponent
            .to_i32()
            .ok_or_else(|| ErrorValue::runtime("Exponent too large"))?;
        return magnitude_value(q.powi(n).map_err(unit_error)?);
    }
    // x^0.5 and friends: accept exponents that are exact reciprocals of integers
    let reciprocal = divide(Decimal::ONE, exponent)?;
    if reciprocal.fract().is_zero() {
        if let Some(root) = reciprocal.to_i32() {
            return magnitude_value(q.root(root).map_err(unit_error)?);
        }
    }
    Err(ErrorValue::semantic(format!(
        "Cannot raise '{}' to the non-integer power {}",
        q.unit.label(),
        exponent
    )))
}

/// The `n`th root of a quantity whose unit exponents divide evenly
pub fn quantity_root(q: &Quantity, n: i32) -> ValueResult {
    magnitude_value(q.root(n).map_err(unit_error)?)
}

fn number_quantity(
    n: Decimal,
    op: ArithmeticOperation,
    q: &Quantity,
    left: &SemanticValue,
    right: &SemanticValue,
) -> Result<SemanticValue, ErrorValue> {
    match op {
        ArithmeticOperation::Add | ArithmeticOperation::Subtract if n.is_zero() => {
            Ok(SemanticValue::Unit(Quantity::new(number_arithmetic(n, op, q.value)?, q.unit.clone())))
        }
        ArithmeticOperation::Add | ArithmeticOperation::Subtract => Err(unitless_sum(op, n, q)),
        ArithmeticOperation::Multiply => Ok(SemanticValue::Unit(q.scale_by(n).map_err(unit_error)?)),
        ArithmeticOperation::Divide => {
            let unitless = Quantity::new(n, CompositeUnit::default());
            magnitude_value(unitless.divide(q).map_err(unit_error)?)
        }
        _ => Err(unsupported(left, op, right)),
    }
}

fn quantity_arithmetic(l: &Quantity, op: ArithmeticOperation, r: &Quantity) -> Result<SemanticValue, ErrorValue> {
    match op {
        ArithmeticOperation::Add => Ok(SemanticValue::Unit(l.add(r).map_err(unit_error)?)),
        ArithmeticOperation::Subtract => Ok(SemanticValue::Unit(l.subtract(r).map_err(unit_error)?)),
        ArithmeticOperation::Multiply => magnitude_value(l.multiply(r).map_err(unit_error)?),
        ArithmeticOperation::Divide => magnitude_value(l.divide(r).map_err(unit_error)?),
        ArithmeticOperation::Modulo => {
            let converted = r.convert_to(&l.unit).map_err(unit_error)?;
            Ok(SemanticValue::Unit(Quantity::new(
                number_arithmetic(l.value, op, converted.value)?,
                l.unit.clone(),
            )))
        }
        ArithmeticOperation::Power => Err(ErrorValue::semantic(format!(
            "Cannot raise '{}' to a power with units '{}'",
            l.unit.label(),
            r.unit.label()
        ))),
    }
}

fn duration_arithmetic(
    l: &DurationValue,
    op: ArithmeticOperation,
    r: &DurationValue,
    left: &SemanticValue,
    right: &SemanticValue,
) -> Result<SemanticValue, ErrorValue> {
    match op {
        ArithmeticOperation::Add => Ok(SemanticValue::Duration(l.add(r))),
        ArithmeticOperation::Subtract => Ok(SemanticValue::Duration(l.add(&r.negate()))),
        ArithmeticOperation::Divide => Ok(SemanticValue::Number(divide(l.total_seconds()?, r.total_seconds()?)?)),
        _ => Err(unsupported(left, op, right)),
    }
}

fn magnitude_value(magnitude: Magnitude) -> Result<SemanticValue, ErrorValue> {
    Ok(match magnitude {
        Magnitude::Number(n) => SemanticValue::Number(n),
        Magnitude::Quantity(q) => SemanticValue::Unit(q),
    })
}

/// Unit failures surface as semantic errors, or runtime ones for numeric trouble
pub fn unit_error(error: UnitError) -> ErrorValue {
    match &error {
        UnitError::Overflow => ErrorValue::runtime(error.to_string()),
        UnitError::DivisionByZero => ErrorValue::division_by_zero(),
        UnitError::UnknownUnit { suggestion, .. } => {
            let value = ErrorValue::semantic(error.to_string());
            match suggestion {
                Some(s) => value.with_suggestion(s.clone()),
                None => value,
            }
        }
        _ => ErrorValue::semantic(error.to_string()),
    }
}

fn zip_lists(l: &ListValue, op: ArithmeticOperation, r: &ListValue) -> ValueResult {
    if l.len() != r.len() {
        return Err(ErrorValue::semantic(format!(
            "Cannot combine lists of different lengths ({} and {})",
            l.len(),
            r.len()
        )));
    }
    let items = l
        .items()
        .iter()
        .zip(r.items())
        .map(|(a, b)| arithmetic_operation(a, op, b))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SemanticValue::List(ListValue::new(items, usize::MAX)?))
}

fn broadcast(list: &ListValue, f: impl Fn(&SemanticValue) -> ValueResult) -> ValueResult {
    let items = list.items().iter().map(f).collect::<Result<Vec<_>, _>>()?;
    Ok(SemanticValue::List(ListValue::new(items, usize::MAX)?))
}

/// Operand as symbolic text with the precedence it binds at
fn symbolic_operand(value: &SemanticValue) -> SymbolicValue {
    match value {
        SemanticValue::Symbolic(s) => s.clone(),
        other => {
            let text = other.to_string();
            let precedence = if text.starts_with('-') {
                UNARY_PRECEDENCE
            } else if text.contains(' ') {
                ArithmeticOperation::Multiply.precedence()
            } else {
                ATOM_PRECEDENCE
            };
            SymbolicValue::new(text, precedence)
        }
    }
}

fn symbolic_combine(left: &SemanticValue, op: ArithmeticOperation, right: &SemanticValue) -> SymbolicValue {
    SymbolicValue::combine(&symbolic_operand(left), op, &symbolic_operand(right))
}

fn unsupported(left: &SemanticValue, op: ArithmeticOperation, right: &SemanticValue) -> ErrorValue {
    ErrorValue::type_mismatch(
        format!(
            "Cannot apply {} to {} and {}",
            op.name(),
            left.value_type(),
            right.value_type()
        ),
        compatible_with(left, op),
        right.value_type().name(),
    )
}

/// What the right operand could have been
fn compatible_with(left: &SemanticValue, op: ArithmeticOperation) -> &'static str {
    use SemanticValue::*;
    match (left, op) {
        (Date(_), ArithmeticOperation::Subtract) => "duration or date",
        (Date(_), _) | (Time(_), _) => "duration",
        (Duration(_), ArithmeticOperation::Add | ArithmeticOperation::Subtract) => "duration",
        (Currency(_), ArithmeticOperation::Add | ArithmeticOperation::Subtract) => "currency",
        (Unit(_), ArithmeticOperation::Add | ArithmeticOperation::Subtract) => "unit",
        (Percentage(_), ArithmeticOperation::Add | ArithmeticOperation::Subtract) => "percentage",
        _ => "number",
    }
}
