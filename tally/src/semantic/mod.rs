//! Semantic values
//!
//! The closed set of value kinds an expression can evaluate to. Every kind
//! shares one contract: a type tag, a numeric projection, formatting, tolerant
//! equality and type-directed arithmetic. Arithmetic never mutates; it returns
//! a new value, which may be an `Error` value.

pub mod currency;
pub mod datetime;
pub mod error;
pub mod format;
pub mod list;
pub mod symbolic;

pub use currency::{Currency, CurrencyRate, Money};
pub use datetime::{DateValue, DurationPart, DurationUnit, DurationValue, TimeValue};
pub use error::{ErrorKind, ErrorValue};
pub use format::{format_decimal, DateFormat, DateLocale, FormatOptions};
pub use list::ListValue;
pub use symbolic::SymbolicValue;

use crate::ast::ArithmeticOperation;
use crate::evaluator::operations;
use crate::units::{self, Quantity};
use rust_decimal::prelude::*;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

/// Type tag of a semantic value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Number,
    Percentage,
    Currency,
    CurrencyUnit,
    Unit,
    Date,
    Time,
    Duration,
    List,
    Symbolic,
    Error,
}

impl ValueType {
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Number => "number",
            ValueType::Percentage => "percentage",
            ValueType::Currency => "currency",
            ValueType::CurrencyUnit => "currency rate",
            ValueType::Unit => "unit",
            ValueType::Date => "date",
            ValueType::Time => "time",
            ValueType::Duration => "duration",
            ValueType::List => "list",
            ValueType::Symbolic => "symbolic",
            ValueType::Error => "error",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SemanticValue {
    Number(Decimal),
    /// Percent points: `20%` is stored as 20
    Percentage(Decimal),
    Currency(Money),
    CurrencyUnit(CurrencyRate),
    Unit(Quantity),
    Date(DateValue),
    Time(TimeValue),
    Duration(DurationValue),
    List(ListValue),
    Symbolic(SymbolicValue),
    Error(ErrorValue),
}

impl SemanticValue {
    pub fn number(value: impl Into<Decimal>) -> Self {
        SemanticValue::Number(value.into())
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            SemanticValue::Number(_) => ValueType::Number,
            SemanticValue::Percentage(_) => ValueType::Percentage,
            SemanticValue::Currency(_) => ValueType::Currency,
            SemanticValue::CurrencyUnit(_) => ValueType::CurrencyUnit,
            SemanticValue::Unit(_) => ValueType::Unit,
            SemanticValue::Date(_) => ValueType::Date,
            SemanticValue::Time(_) => ValueType::Time,
            SemanticValue::Duration(_) => ValueType::Duration,
            SemanticValue::List(_) => ValueType::List,
            SemanticValue::Symbolic(_) => ValueType::Symbolic,
            SemanticValue::Error(_) => ValueType::Error,
        }
    }

    /// Plain numeric projection: percentages as decimals, money and quantities
    /// as their amounts
    pub fn to_number(&self) -> Result<Decimal, ErrorValue> {
        match self {
            SemanticValue::Number(n) => Ok(*n),
            SemanticValue::Percentage(p) => Ok(*p / Decimal::ONE_HUNDRED),
            SemanticValue::Currency(m) => Ok(m.amount),
            SemanticValue::CurrencyUnit(r) => Ok(r.amount),
            SemanticValue::Unit(q) => Ok(q.value),
            SemanticValue::Error(e) => Err(e.clone()),
            other => Err(ErrorValue::type_mismatch(
                format!("A {} has no numeric value", other.value_type()),
                "number",
                other.value_type().name(),
            )),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            SemanticValue::Number(_)
                | SemanticValue::Percentage(_)
                | SemanticValue::Currency(_)
                | SemanticValue::CurrencyUnit(_)
                | SemanticValue::Unit(_)
        )
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SemanticValue::Error(_))
    }

    /// Whether `to <target>` would succeed for this value
    pub fn can_convert_to(&self, target: &str) -> bool {
        crate::evaluator::conversion::ConversionTarget::parse(target)
            .map(|t| t.accepts(self))
            .unwrap_or(false)
    }

    pub fn format(&self, options: &FormatOptions) -> String {
        match self {
            SemanticValue::Number(n) => format_decimal(*n, options),
            SemanticValue::Percentage(p) => format!("{}%", format_decimal(*p, options)),
            SemanticValue::Currency(m) => m.format(options),
            SemanticValue::CurrencyUnit(r) => r.format(options),
            SemanticValue::Unit(q) => {
                let shown = if options.auto_scale_units {
                    units::best_display_unit(q)
                } else {
                    q.clone()
                };
                format!("{} {}", format_decimal(shown.value, options), shown.unit.label())
            }
            SemanticValue::Date(d) => d.format(options),
            SemanticValue::Time(t) => t.format(options),
            SemanticValue::Duration(d) => d.format(options),
            SemanticValue::List(l) => format!(
                "[{}]",
                l.items()
                    .iter()
                    .map(|v| v.format(options))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            SemanticValue::Symbolic(s) => s.text.clone(),
            SemanticValue::Error(e) => e.to_string(),
        }
    }

    /// Equality within 1e-10 for numeric payloads; exact for calendar values
    pub fn approx_eq(&self, other: &SemanticValue) -> bool {
        use SemanticValue::*;
        match (self, other) {
            (Number(a), Number(b)) | (Percentage(a), Percentage(b)) => units::approx_eq_decimal(*a, *b),
            (Currency(a), Currency(b)) => {
                a.currency == b.currency && units::approx_eq_decimal(a.amount, b.amount)
            }
            (CurrencyUnit(a), CurrencyUnit(b)) => {
                a.currency == b.currency
                    && Quantity::new(a.amount, a.unit.clone())
                        .approx_eq(&Quantity::new(b.amount, b.unit.clone()))
            }
            (Unit(a), Unit(b)) => a.approx_eq(b),
            (Duration(a), Duration(b)) => match (a.total_seconds(), b.total_seconds()) {
                (Ok(x), Ok(y)) => units::approx_eq_decimal(x, y),
                _ => a == b,
            },
            (List(a), List(b)) => {
                a.len() == b.len() && a.items().iter().zip(b.items()).all(|(x, y)| x.approx_eq(y))
            }
            (Symbolic(a), Symbolic(b)) => {
                a.text.split_whitespace().eq(b.text.split_whitespace())
            }
            _ => self == other,
        }
    }

    pub fn add(&self, other: &SemanticValue) -> SemanticValue {
        operations::arithmetic(self, ArithmeticOperation::Add, other)
    }

    pub fn subtract(&self, other: &SemanticValue) -> SemanticValue {
        operations::arithmetic(self, ArithmeticOperation::Subtract, other)
    }

    pub fn multiply(&self, other: &SemanticValue) -> SemanticValue {
        operations::arithmetic(self, ArithmeticOperation::Multiply, other)
    }

    pub fn divide(&self, other: &SemanticValue) -> SemanticValue {
        operations::arithmetic(self, ArithmeticOperation::Divide, other)
    }

    pub fn modulo(&self, other: &SemanticValue) -> SemanticValue {
        operations::arithmetic(self, ArithmeticOperation::Modulo, other)
    }

    pub fn power(&self, other: &SemanticValue) -> SemanticValue {
        operations::arithmetic(self, ArithmeticOperation::Power, other)
    }

    pub fn negate(&self) -> SemanticValue {
        operations::negate(self)
    }
}

impl From<ErrorValue> for SemanticValue {
    fn from(error: ErrorValue) -> Self {
        SemanticValue::Error(error)
    }
}

impl fmt::Display for SemanticValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(&FormatOptions::canonical()))
    }
}

impl Serialize for SemanticValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SemanticValue", 2)?;
        state.serialize_field("type", &self.value_type())?;
        state.serialize_field("display", &self.to_string())?;
        state.end()
    }
}
