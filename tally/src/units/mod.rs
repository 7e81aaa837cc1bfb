//! Dimensional units
//!
//! A unit string parses into atomic factors (`UnitFactor`), each pointing at a
//! table entry with an SI scale and a dimension vector. Quantities combine by
//! merging factors; a result whose exponents all cancel collapses to a plain
//! number.

pub mod definitions;
pub mod dimension;
mod parse;
pub mod quantities;
pub mod temperature;

pub use definitions::{lookup, UnitRef};
pub use dimension::{BaseDimension, DimensionVector};
pub use parse::parse_unit;
pub use quantities::{best_display_unit, kind_of, Combine, QuantityKind};

use rust_decimal::prelude::*;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    #[error("Unknown unit '{unit}'")]
    UnknownUnit {
        unit: String,
        suggestion: Option<String>,
    },

    #[error("Invalid unit expression '{0}'")]
    InvalidUnit(String),

    #[error("Cannot combine {left} and {right}: dimensions differ")]
    IncompatibleDimensions { left: String, right: String },

    #[error("'{0}' has an offset origin and cannot be part of a composite unit")]
    OffsetArithmetic(String),

    #[error("Cannot take root {root} of unit '{unit}'")]
    NonIntegralRoot { unit: String, root: i32 },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Numeric overflow in unit arithmetic")]
    Overflow,
}

/// One atomic unit raised to an integer power
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitFactor {
    pub unit: UnitRef,
    pub exponent: i32,
}

/// A product of unit factors, e.g. `kg*m/s^2`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompositeUnit {
    factors: Vec<UnitFactor>,
}

impl CompositeUnit {
    pub fn single(unit: UnitRef) -> Self {
        Self {
            factors: vec![UnitFactor { unit, exponent: 1 }],
        }
    }

    /// Build from factors, merging repeated units and dropping zero exponents
    pub fn from_factors(factors: impl IntoIterator<Item = UnitFactor>) -> Self {
        let mut merged: Vec<UnitFactor> = Vec::new();
        for factor in factors {
            match merged.iter_mut().find(|f| f.unit == factor.unit) {
                Some(existing) => existing.exponent += factor.exponent,
                None => merged.push(factor),
            }
        }
        merged.retain(|f| f.exponent != 0);
        Self { factors: merged }
    }

    pub fn factors(&self) -> &[UnitFactor] {
        &self.factors
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    pub fn dimension(&self) -> DimensionVector {
        self.factors
            .iter()
            .fold(DimensionVector::NONE, |acc, f| {
                acc * f.unit.dimension().powi(f.exponent).unwrap_or(DimensionVector::NONE)
            })
    }

    /// Factor converting a value in this unit to SI base units
    pub fn scale(&self) -> Decimal {
        self.factors.iter().fold(Decimal::ONE, |acc, f| {
            decimal_powi(f.unit.scale(), f.exponent)
                .and_then(|s| acc.checked_mul(s))
                .unwrap_or(acc)
        })
    }

    pub fn has_offset(&self) -> bool {
        self.factors.iter().any(|f| f.unit.is_offset())
    }

    /// The unit itself when this is a lone offset unit such as °C
    pub fn offset_unit(&self) -> Option<UnitRef> {
        match self.factors.as_slice() {
            [f] if f.exponent == 1 && f.unit.is_offset() => Some(f.unit),
            _ => None,
        }
    }

    pub fn inverse(&self) -> Self {
        Self {
            factors: self
                .factors
                .iter()
                .map(|f| UnitFactor {
                    unit: f.unit,
                    exponent: -f.exponent,
                })
                .collect(),
        }
    }

    pub fn powi(&self, n: i32) -> Self {
        Self::from_factors(self.factors.iter().map(|f| UnitFactor {
            unit: f.unit,
            exponent: f.exponent * n,
        }))
    }

    pub fn root(&self, n: i32) -> Option<Self> {
        if n == 0 || self.factors.iter().any(|f| f.exponent % n != 0) {
            return None;
        }
        Some(Self::from_factors(self.factors.iter().map(|f| UnitFactor {
            unit: f.unit,
            exponent: f.exponent / n,
        })))
    }

    /// Factors with positive exponents, e.g. `kg*m`
    pub fn numerator(&self) -> Self {
        Self {
            factors: self.factors.iter().filter(|f| f.exponent > 0).copied().collect(),
        }
    }

    /// Factors with negative exponents, inverted, e.g. `s^2` for `kg*m/s^2`
    pub fn denominator(&self) -> Self {
        Self {
            factors: self
                .factors
                .iter()
                .filter(|f| f.exponent < 0)
                .map(|f| UnitFactor {
                    unit: f.unit,
                    exponent: -f.exponent,
                })
                .collect(),
        }
    }

    /// Normalized symbolic label: numerator joined by `*`, each denominator after `/`
    pub fn label(&self) -> String {
        let term = |f: &UnitFactor| match f.exponent.abs() {
            1 => f.unit.symbol(),
            e => format!("{}^{}", f.unit.symbol(), e),
        };
        let numerator: Vec<String> = self.factors.iter().filter(|f| f.exponent > 0).map(term).collect();
        let mut label = if numerator.is_empty() {
            "1".to_string()
        } else {
            numerator.join("*")
        };
        for f in self.factors.iter().filter(|f| f.exponent < 0) {
            label.push('/');
            label.push_str(&term(f));
        }
        label
    }

    pub fn kind(&self) -> Option<&'static QuantityKind> {
        kind_of(self.dimension())
    }
}

/// Result of multiplying or dividing quantities
#[derive(Debug, Clone, PartialEq)]
pub enum Magnitude {
    Number(Decimal),
    Quantity(Quantity),
}

/// A numeric value in a (possibly composite) unit
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    pub value: Decimal,
    pub unit: CompositeUnit,
}

impl Quantity {
    pub fn new(value: Decimal, unit: CompositeUnit) -> Self {
        Self { value, unit }
    }

    /// Parse a unit string and attach it to `value`
    pub fn parse(value: Decimal, unit: &str) -> Result<Self, UnitError> {
        Ok(Self::new(value, parse_unit(unit)?))
    }

    pub fn dimension(&self) -> DimensionVector {
        self.unit.dimension()
    }

    /// Value in SI base units (kelvin for temperatures)
    pub fn base_value(&self) -> Result<Decimal, UnitError> {
        if let Some(unit) = self.unit.offset_unit() {
            return Ok(temperature::to_kelvin(self.value, &unit));
        }
        if self.unit.has_offset() {
            return Err(UnitError::OffsetArithmetic(self.unit.label()));
        }
        self.value
            .checked_mul(self.unit.scale())
            .ok_or(UnitError::Overflow)
    }

    pub fn convert_to(&self, target: &CompositeUnit) -> Result<Quantity, UnitError> {
        if self.dimension() != target.dimension() {
            return Err(UnitError::IncompatibleDimensions {
                left: self.unit.label(),
                right: target.label(),
            });
        }
        if self.unit == *target {
            return Ok(self.clone());
        }
        if let (Some(from), Some(to)) = (self.unit.offset_unit(), target.offset_unit()) {
            return Ok(Quantity::new(
                temperature::convert(self.value, &from, &to),
                target.clone(),
            ));
        }
        if let Some(from) = self.unit.offset_unit() {
            if target.factors().len() == 1 && target.factors()[0].exponent == 1 {
                let kelvin = temperature::to_kelvin(self.value, &from);
                return Ok(Quantity::new(
                    temperature::from_kelvin(kelvin, &target.factors()[0].unit),
                    target.clone(),
                ));
            }
        }
        if let Some(to) = target.offset_unit() {
            let kelvin = self.base_value()?;
            return Ok(Quantity::new(temperature::from_kelvin(kelvin, &to), target.clone()));
        }
        if self.unit.has_offset() || target.has_offset() {
            return Err(UnitError::OffsetArithmetic(self.unit.label()));
        }
        let value = self
            .value
            .checked_mul(self.unit.scale())
            .and_then(|v| v.checked_div(target.scale()))
            .ok_or(UnitError::Overflow)?;
        Ok(Quantity::new(value, target.clone()))
    }

    pub fn add(&self, other: &Quantity) -> Result<Quantity, UnitError> {
        self.add_signed(other, Decimal::ONE)
    }

    pub fn subtract(&self, other: &Quantity) -> Result<Quantity, UnitError> {
        self.add_signed(other, Decimal::NEGATIVE_ONE)
    }

    /// Addition in the left operand's unit; a zero on either side always combines
    fn add_signed(&self, other: &Quantity, sign: Decimal) -> Result<Quantity, UnitError> {
        if other.value.is_zero() {
            return Ok(self.clone());
        }
        if self.value.is_zero() && self.dimension() != other.dimension() {
            return Ok(Quantity::new(other.value * sign, other.unit.clone()));
        }
        let converted = if self.unit.has_offset() || other.unit.has_offset() {
            other.interval_in(&self.unit)?
        } else {
            other.convert_to(&self.unit)?.value
        };
        let value = converted
            .checked_mul(sign)
            .and_then(|delta| self.value.checked_add(delta))
            .ok_or(UnitError::Overflow)?;
        Ok(Quantity::new(value, self.unit.clone()))
    }

    /// The right operand of a temperature sum is a difference: only the
    /// degree size converts, never the origin
    fn interval_in(&self, target: &CompositeUnit) -> Result<Decimal, UnitError> {
        if self.dimension() != target.dimension() {
            return Err(UnitError::IncompatibleDimensions {
                left: target.label(),
                right: self.unit.label(),
            });
        }
        if self.unit == *target {
            return Ok(self.value);
        }
        self.value
            .checked_mul(self.unit.scale())
            .and_then(|v| v.checked_div(target.scale()))
            .ok_or(UnitError::Overflow)
    }

    pub fn scale_by(&self, factor: Decimal) -> Result<Quantity, UnitError> {
        let value = self.value.checked_mul(factor).ok_or(UnitError::Overflow)?;
        Ok(Quantity::new(value, self.unit.clone()))
    }

    pub fn multiply(&self, other: &Quantity) -> Result<Magnitude, UnitError> {
        let value = self.value.checked_mul(other.value).ok_or(UnitError::Overflow)?;
        combine(value, &self.unit, &other.unit, Combine::Multiply)
    }

    pub fn divide(&self, other: &Quantity) -> Result<Magnitude, UnitError> {
        if other.value.is_zero() {
            return Err(UnitError::DivisionByZero);
        }
        let value = self.value.checked_div(other.value).ok_or(UnitError::Overflow)?;
        combine(value, &self.unit, &other.unit.inverse(), Combine::Divide)
    }

    pub fn powi(&self, n: i32) -> Result<Magnitude, UnitError> {
        if n == 0 {
            return Ok(Magnitude::Number(Decimal::ONE));
        }
        if self.unit.has_offset() {
            return Err(UnitError::OffsetArithmetic(self.unit.label()));
        }
        let value = decimal_powi(self.value, n).ok_or(UnitError::Overflow)?;
        Ok(Magnitude::Quantity(Quantity::new(value, self.unit.powi(n))))
    }

    /// n-th root; every unit exponent must divide by `n`
    pub fn root(&self, n: i32) -> Result<Magnitude, UnitError> {
        let unit = self.unit.root(n).ok_or_else(|| UnitError::NonIntegralRoot {
            unit: self.unit.label(),
            root: n,
        })?;
        let value = self
            .value
            .to_f64()
            .map(|v| v.powf(1.0 / f64::from(n)))
            .filter(|v| v.is_finite())
            .and_then(Decimal::from_f64)
            .ok_or(UnitError::Overflow)?;
        if unit.is_empty() {
            Ok(Magnitude::Number(value))
        } else {
            Ok(Magnitude::Quantity(Quantity::new(value, unit)))
        }
    }

    /// Same dimension and base values within 1e-10 (relative)
    pub fn approx_eq(&self, other: &Quantity) -> bool {
        if self.dimension() != other.dimension() {
            return false;
        }
        match (self.base_value(), other.base_value()) {
            (Ok(a), Ok(b)) => approx_eq_decimal(a, b),
            _ => false,
        }
    }
}

/// Merge `right` factors into `left` (right operand converted into the left's
/// units where dimensions agree), then collapse or derive.
pub(crate) fn combine(
    value: Decimal,
    left: &CompositeUnit,
    right: &CompositeUnit,
    op: Combine,
) -> Result<Magnitude, UnitError> {
    if left.has_offset() {
        return Err(UnitError::OffsetArithmetic(left.label()));
    }
    if right.has_offset() {
        return Err(UnitError::OffsetArithmetic(right.label()));
    }

    let mut value = value;
    let mut factors: Vec<UnitFactor> = left.factors().to_vec();
    for factor in right.factors() {
        if let Some(existing) = factors.iter_mut().find(|f| f.unit == factor.unit) {
            existing.exponent += factor.exponent;
            continue;
        }
        if let Some(existing) = factors
            .iter_mut()
            .find(|f| f.unit.dimension() == factor.unit.dimension())
        {
            let ratio = factor
                .unit
                .scale()
                .checked_div(existing.unit.scale())
                .ok_or(UnitError::Overflow)?;
            let adjust = decimal_powi(ratio, factor.exponent).ok_or(UnitError::Overflow)?;
            value = value.checked_mul(adjust).ok_or(UnitError::Overflow)?;
            existing.exponent += factor.exponent;
            continue;
        }
        factors.push(*factor);
    }
    let merged = CompositeUnit::from_factors(factors);

    if merged.dimension().is_dimensionless() {
        let value = value.checked_mul(merged.scale()).ok_or(UnitError::Overflow)?;
        return Ok(Magnitude::Number(value));
    }

    let right_dimension = match op {
        Combine::Multiply => right.dimension(),
        Combine::Divide => right.inverse().dimension(),
    };
    if let Some((_, Some(target))) = quantities::derive(left.dimension(), op, right_dimension) {
        let target = CompositeUnit::single(target);
        if target.dimension() == merged.dimension() {
            return Quantity::new(value, merged).convert_to(&target).map(Magnitude::Quantity);
        }
    }
    Ok(Magnitude::Quantity(Quantity::new(value, merged)))
}

/// Exact integer power; negative exponents divide
pub fn decimal_powi(base: Decimal, exponent: i32) -> Option<Decimal> {
    if base == Decimal::ONE || (base.is_zero() && exponent > 0) {
        return Some(base);
    }
    let mut result = Decimal::ONE;
    for _ in 0..exponent.unsigned_abs() {
        result = result.checked_mul(base)?;
    }
    if exponent < 0 {
        Decimal::ONE.checked_div(result)
    } else {
        Some(result)
    }
}

/// Tolerant comparison: |a - b| <= 1e-10 * max(1, |a|, |b|)
pub fn approx_eq_decimal(a: Decimal, b: Decimal) -> bool {
    let tolerance = Decimal::new(1, 10);
    let magnitude = a.abs().max(b.abs()).max(Decimal::ONE);
    match a.checked_sub(b) {
        Some(diff) => diff.abs() <= tolerance * magnitude,
        None => false,
    }
}
