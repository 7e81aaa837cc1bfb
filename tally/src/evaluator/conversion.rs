//! Trailing `to|in|as|into <target>` conversions

use super::operations::{unit_error, ValueResult};
use crate::datemath::zones;
use crate::semantic::{currency, Currency, DateValue, DurationUnit, ErrorValue, SemanticValue};
use crate::units::{self, CompositeUnit, DimensionVector, Quantity};
use chrono::FixedOffset;
use once_cell::sync::Lazy;
use regex::Regex;

static CONVERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(.+?)\s+(?:to|in|as|into)\s+(\S.*?)\s*$").expect("conversion regex must compile")
});

/// Split `expr to target` at the last conversion keyword whose target parses.
/// Returns the source text and the parsed target.
pub fn split_conversion(text: &str) -> Option<(&str, ConversionTarget)> {
    let keywords = [" to ", " in ", " as ", " into "];
    let lower = text.to_lowercase();
    let mut positions: Vec<(usize, usize)> = keywords
        .iter()
        .flat_map(|k| lower.match_indices(k).map(move |(i, _)| (i, k.len())))
        .collect();
    positions.sort_by(|a, b| b.0.cmp(&a.0));
    for (index, len) in positions {
        // byte offsets agree because lowercasing these keywords is ASCII-only
        if !text.is_char_boundary(index) || !text.is_char_boundary(index + len) {
            continue;
        }
        let source = text[..index].trim();
        let target = text[index + len..].trim();
        if source.is_empty() {
            continue;
        }
        if let Some(parsed) = ConversionTarget::parse(target) {
            return Some((source, parsed));
        }
    }
    None
}

/// True if `text` ends in something shaped like a conversion
pub fn has_conversion_suffix(text: &str) -> bool {
    CONVERSION.is_match(text)
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConversionTarget {
    Unit(CompositeUnit),
    /// A duration name; `unit` is the matching table unit when there is one
    Time {
        duration: DurationUnit,
        unit: Option<CompositeUnit>,
    },
    Zone(FixedOffset),
    Percent,
    Decimal,
    Currency(&'static Currency),
}

impl ConversionTarget {
    pub fn parse(target: &str) -> Option<ConversionTarget> {
        let trimmed = target.trim();
        if trimmed.is_empty() {
            return None;
        }
        let lower = trimmed.to_lowercase();
        match lower.as_str() {
            "%" | "percent" | "percentage" | "percent points" => return Some(ConversionTarget::Percent),
            "decimal" | "number" | "fraction" => return Some(ConversionTarget::Decimal),
            _ => {}
        }
        if let Some(currency) = currency::lookup(trimmed) {
            return Some(ConversionTarget::Currency(currency));
        }
        if let Some(duration) = DurationUnit::parse(trimmed) {
            let unit = units::parse_unit(trimmed)
                .ok()
                .filter(|u| u.dimension() == DimensionVector::TIME);
            return Some(ConversionTarget::Time { duration, unit });
        }
        if let Some(zone) = zones::parse_zone(trimmed) {
            return Some(ConversionTarget::Zone(zone));
        }
        units::parse_unit(trimmed).ok().map(ConversionTarget::Unit)
    }

    /// Cheap check without converting
    pub fn accepts(&self, value: &SemanticValue) -> bool {
        use SemanticValue as V;
        match (self, value) {
            (ConversionTarget::Unit(unit), V::Unit(q)) => q.dimension() == unit.dimension(),
            (ConversionTarget::Unit(unit), V::Duration(_)) => unit.dimension() == DimensionVector::TIME,
            (ConversionTarget::Time { .. }, V::Duration(_)) => true,
            (ConversionTarget::Time { .. }, V::Unit(q)) => q.dimension() == DimensionVector::TIME,
            (ConversionTarget::Zone(_), V::Date(_)) => true,
            (ConversionTarget::Percent, V::Number(_) | V::Percentage(_)) => true,
            (ConversionTarget::Decimal, V::Number(_) | V::Percentage(_)) => true,
            (ConversionTarget::Currency(c), V::Currency(m)) => m.currency == *c,
            (ConversionTarget::Currency(c), V::CurrencyUnit(r)) => r.currency == *c,
            (_, V::List(list)) => list.items().iter().all(|item| self.accepts(item)),
            _ => false,
        }
    }

    /// Convert `value`. `local` is the zone of dates written without one.
    pub fn apply(&self, value: &SemanticValue, local: FixedOffset) -> ValueResult {
        use SemanticValue as V;
        match (self, value) {
            (_, V::Error(e)) => Err(e.clone()),
            (_, V::Symbolic(_)) => Ok(value.clone()),
            (_, V::List(list)) => {
                let items = list
                    .items()
                    .iter()
                    .map(|item| self.apply(item, local))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(V::List(crate::semantic::ListValue::new(items, usize::MAX)?))
            }
            (_, V::Time(_)) => Err(ErrorValue::conversion("Cannot convert a time of day")
                .with_suggestion("Convert a date with a time instead, e.g. now to UTC")),

            (ConversionTarget::Unit(unit), V::Unit(q)) => Ok(V::Unit(convert_quantity(q, unit)?)),
            (ConversionTarget::Unit(unit), V::Duration(d)) => Ok(V::Unit(convert_quantity(&d.to_quantity()?, unit)?)),
            (ConversionTarget::Time { duration, .. }, V::Duration(d)) => Ok(V::Duration(d.to_unit(*duration)?)),
            (ConversionTarget::Time { duration, unit }, V::Unit(q)) => match unit {
                Some(unit) => Ok(V::Unit(convert_quantity(q, unit)?)),
                None => {
                    let d = super::datetime::duration_from_quantity(q)?;
                    Ok(V::Duration(d.to_unit(*duration)?))
                }
            },
            (ConversionTarget::Zone(zone), V::Date(date)) => Ok(V::Date(convert_zone(date, *zone, local))),
            (ConversionTarget::Percent, V::Number(n)) => Ok(V::Percentage(*n * rust_decimal::Decimal::ONE_HUNDRED)),
            (ConversionTarget::Percent, V::Percentage(_)) => Ok(value.clone()),
            (ConversionTarget::Decimal, V::Percentage(_) | V::Number(_)) => Ok(V::Number(value.to_number()?)),
            (ConversionTarget::Currency(c), V::Currency(m)) => {
                if m.currency == *c {
                    Ok(value.clone())
                } else {
                    Err(ErrorValue::conversion(format!(
                        "Cannot convert {} to {}: exchange rates are not available",
                        m.currency.code, c.code
                    )))
                }
            }
            (ConversionTarget::Currency(c), V::CurrencyUnit(r)) if r.currency == *c => Ok(value.clone()),
            (target, other) => Err(ErrorValue::conversion(format!(
                "Cannot convert a {} to {}",
                other.value_type(),
                target.describe()
            ))),
        }
    }

    fn describe(&self) -> String {
        match self {
            ConversionTarget::Unit(unit) => format!("'{}'", unit.label()),
            ConversionTarget::Time { duration, .. } => duration.plural().to_string(),
            ConversionTarget::Zone(zone) => crate::semantic::datetime::format_zone(*zone),
            ConversionTarget::Percent => "a percentage".to_string(),
            ConversionTarget::Decimal => "a decimal".to_string(),
            ConversionTarget::Currency(c) => c.code.to_string(),
        }
    }
}

fn convert_quantity(quantity: &Quantity, unit: &CompositeUnit) -> Result<Quantity, ErrorValue> {
    quantity.convert_to(unit).map_err(|e| {
        let error = unit_error(e);
        ErrorValue::conversion(error.message.clone())
    })
}

/// Same instant, shown in `zone`
fn convert_zone(date: &DateValue, zone: FixedOffset, local: FixedOffset) -> DateValue {
    let utc = date.to_utc(local);
    let shifted = utc + chrono::Duration::seconds(i64::from(zone.local_minus_utc()));
    DateValue::with_time(shifted, Some(zone))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_at_the_last_parseable_keyword() {
        let (source, target) = split_conversion("5 km in an hour to m").unwrap();
        assert_eq!(source, "5 km in an hour");
        assert!(matches!(target, ConversionTarget::Unit(_)));
        assert!(split_conversion("price in dollars").is_none());
    }

    #[test]
    fn duration_names_prefer_time_targets() {
        assert!(matches!(
            ConversionTarget::parse("hours"),
            Some(ConversionTarget::Time { duration: DurationUnit::Hour, unit: Some(_) })
        ));
        assert!(matches!(
            ConversionTarget::parse("business days"),
            Some(ConversionTarget::Time { duration: DurationUnit::BusinessDay, unit: None })
        ));
    }
}
