//! Literal values from text
//!
//! `parse_value` reads back everything a `SemanticValue` displays as, and is
//! what the component builder uses to turn `number + trailing unit` runs into
//! typed literals.

use crate::datemath::{self, anchor};
use crate::semantic::{
    currency, CurrencyRate, DateLocale, DurationValue, ErrorValue, ListValue, Money, SemanticValue,
};
use crate::units::{self, CompositeUnit, Quantity};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

const NUMBER: &str = r"(?:\d{1,3}(?:,\d{3})+|\d+)?(?:\.\d+)?(?:[eE][+-]?\d+)?";
const SYMBOLS: &str = "$€£¥₹₩₽₿₺₪";

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("literal regex must compile")
}

static NUMBER_ONLY: Lazy<Regex> = Lazy::new(|| regex(&format!(r"^[+-]?{}$", NUMBER)));
static SYMBOL_FIRST: Lazy<Regex> =
    Lazy::new(|| regex(&format!(r"^(-)?\s*([{}])\s*(-)?({})(.*)$", SYMBOLS, NUMBER)));
static SYMBOL_LAST: Lazy<Regex> =
    Lazy::new(|| regex(&format!(r"^(-)?({})\s*([{}])(.*)$", NUMBER, SYMBOLS)));
static CODE_LAST: Lazy<Regex> =
    Lazy::new(|| regex(&format!(r"^(-)?({})\s*([A-Za-z]{{3}})\b(.*)$", NUMBER)));
static CODE_FIRST: Lazy<Regex> =
    Lazy::new(|| regex(&format!(r"^([A-Za-z]{{3}})\s*(-)?({})(.*)$", NUMBER)));
static QUANTITY: Lazy<Regex> = Lazy::new(|| regex(&format!(r"^([+-]?{})\s*(\D.*)$", NUMBER)));

/// Unit words that spell a duration out. Symbols like `h` or `min` stay quantities.
const DURATION_WORDS: &[&str] = &[
    "millisecond", "milliseconds", "second", "seconds", "minute", "minutes", "hour", "hours",
    "day", "days", "business", "working", "workday", "workdays", "week", "weeks", "month",
    "months", "quarter", "quarters", "year", "years", "and",
];

/// Decimal from `1,234.5`, `-2`, `.5` or `1.5e15`
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let cleaned: String = text.chars().filter(|c| *c != ',' && *c != '_').collect();
    if cleaned.is_empty() || !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    if cleaned.contains(['e', 'E']) {
        Decimal::from_scientific(&cleaned.to_lowercase()).ok()
    } else {
        Decimal::from_str(&cleaned).ok()
    }
}

/// Parse a displayed value, reading ambiguous numeric dates as month/day
pub fn parse_value(text: &str) -> Option<SemanticValue> {
    parse_value_with(text, DateLocale::Us)
}

pub fn parse_value_with(text: &str, locale: DateLocale) -> Option<SemanticValue> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(message) = text.strip_prefix("Error: ") {
        return Some(SemanticValue::Error(ErrorValue::semantic(message)));
    }
    if text.starts_with('[') && text.ends_with(']') {
        return parse_list(&text[1..text.len() - 1], locale);
    }
    if NUMBER_ONLY.is_match(text) {
        return parse_decimal(text).map(SemanticValue::Number);
    }
    if let Some(number) = text.strip_suffix('%') {
        let number = number.trim_end();
        if NUMBER_ONLY.is_match(number) {
            return parse_decimal(number).map(SemanticValue::Percentage);
        }
    }
    if let Some((date, used)) = anchor::parse_date_prefix(text, locale) {
        if used == text.len() {
            return Some(SemanticValue::Date(date));
        }
    }
    if let Some((time, used)) = anchor::parse_time_prefix(text) {
        if used == text.len() {
            return Some(SemanticValue::Time(time));
        }
    }
    if let Some(duration) = parse_duration(text) {
        return Some(duration);
    }
    if let Some(money) = parse_money(text) {
        return Some(money);
    }
    parse_quantity(text)
}

fn parse_list(inner: &str, locale: DateLocale) -> Option<SemanticValue> {
    if inner.trim().is_empty() {
        return Some(SemanticValue::List(ListValue::default()));
    }
    let mut items = Vec::new();
    let mut depth = 0;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth -= 1,
            ',' if depth == 0 => {
                items.push(parse_value_with(&inner[start..i], locale)?);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(parse_value_with(&inner[start..], locale)?);
    ListValue::new(items, usize::MAX).ok().map(SemanticValue::List)
}

/// `2 hours 30 minutes`, and the negated display form `-2 hours -30 minutes`
fn parse_duration(text: &str) -> Option<SemanticValue> {
    let mut parts = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let (negative, unsigned) = match rest.strip_prefix('-') {
            Some(unsigned) => (true, unsigned.trim_start()),
            None => (false, rest),
        };
        let (duration, used) = datemath::parse_duration_prefix(unsigned)?;
        let duration = if negative { duration.negate() } else { duration };
        parts.extend_from_slice(duration.parts());
        rest = unsigned[used..].trim_start();
    }
    if parts.is_empty() {
        return None;
    }
    let duration = DurationValue::from_parts(parts);
    let spelled_out = text
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .all(|w| DURATION_WORDS.contains(&w.to_lowercase().as_str()));
    spelled_out.then_some(SemanticValue::Duration(duration))
}

fn signed(amount: Decimal, negative: bool) -> Decimal {
    if negative {
        -amount
    } else {
        amount
    }
}

fn parse_money(text: &str) -> Option<SemanticValue> {
    let (currency, amount, rest) = if let Some(caps) = SYMBOL_FIRST.captures(text) {
        let negative = caps.get(1).is_some() || caps.get(3).is_some();
        let amount = parse_decimal(caps.get(4)?.as_str())?;
        (currency::by_symbol(caps.get(2)?.as_str())?, signed(amount, negative), caps.get(5)?.as_str())
    } else if let Some(caps) = SYMBOL_LAST.captures(text) {
        let amount = parse_decimal(caps.get(2)?.as_str())?;
        (
            currency::by_symbol(caps.get(3)?.as_str())?,
            signed(amount, caps.get(1).is_some()),
            caps.get(4)?.as_str(),
        )
    } else if let Some((currency, caps)) = CODE_LAST
        .captures(text)
        .and_then(|caps| Some((currency::by_code(caps.get(3)?.as_str())?, caps)))
    {
        let amount = parse_decimal(caps.get(2)?.as_str())?;
        (currency, signed(amount, caps.get(1).is_some()), caps.get(4)?.as_str())
    } else {
        let caps = CODE_FIRST.captures(text)?;
        let currency = currency::by_code(caps.get(1)?.as_str())?;
        let amount = parse_decimal(caps.get(3)?.as_str())?;
        (currency, signed(amount, caps.get(2).is_some()), caps.get(4)?.as_str())
    };

    let rest = rest.trim();
    if rest.is_empty() {
        return Some(SemanticValue::Currency(Money::new(amount, currency)));
    }
    let unit = rate_unit(rest)?;
    Some(SemanticValue::CurrencyUnit(CurrencyRate::new(amount, currency, unit)))
}

/// `/m^2`, `per hour`, `h/kg`
pub fn rate_unit(rest: &str) -> Option<CompositeUnit> {
    let rest = rest.trim();
    let unit_text = if rest.starts_with('/') {
        format!("1{}", rest)
    } else if let Some(per) = rest.strip_prefix("per ") {
        format!("1/{}", per.trim())
    } else {
        rest.to_string()
    };
    units::parse_unit(&unit_text).ok()
}

fn parse_quantity(text: &str) -> Option<SemanticValue> {
    let caps = QUANTITY.captures(text)?;
    let value = parse_decimal(caps.get(1)?.as_str())?;
    let quantity = Quantity::parse(value, caps.get(2)?.as_str().trim()).ok()?;
    Some(SemanticValue::Unit(quantity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::{DurationUnit, ValueType};

    fn kind(text: &str) -> Option<ValueType> {
        parse_value(text).map(|v| v.value_type())
    }

    #[test]
    fn numbers_in_every_written_form() {
        assert_eq!(parse_decimal("1,234.5"), Decimal::from_str("1234.5").ok());
        assert_eq!(parse_decimal("1.5e15"), Decimal::from_str("1500000000000000").ok());
        assert_eq!(parse_decimal("2.5e-7"), Decimal::from_str("0.00000025").ok());
        assert_eq!(parse_decimal("abc"), None);
    }

    #[test]
    fn classifies_display_forms() {
        assert_eq!(kind("25%"), Some(ValueType::Percentage));
        assert_eq!(kind("$12.50"), Some(ValueType::Currency));
        assert_eq!(kind("-$5"), Some(ValueType::Currency));
        assert_eq!(kind("500 CHF"), Some(ValueType::Currency));
        assert_eq!(kind("$100/m^2"), Some(ValueType::CurrencyUnit));
        assert_eq!(kind("56.096 m"), Some(ValueType::Unit));
        assert_eq!(kind("9.81 kg*m/s^2"), Some(ValueType::Unit));
        assert_eq!(kind("3 h"), Some(ValueType::Unit));
        assert_eq!(kind("2 hours 30 minutes"), Some(ValueType::Duration));
        assert_eq!(kind("2024-03-15 14:30 +05:30"), Some(ValueType::Date));
        assert_eq!(kind("01:30 (+1 day)"), Some(ValueType::Time));
        assert_eq!(kind("[1, 2, 3]"), Some(ValueType::List));
        assert_eq!(kind("Error: Division by zero"), Some(ValueType::Error));
        assert_eq!(kind("five apples"), None);
    }

    #[test]
    fn business_days_literal() {
        match parse_value("3 business days") {
            Some(SemanticValue::Duration(d)) => assert_eq!(d.parts()[0].unit, DurationUnit::BusinessDay),
            other => panic!("expected duration, got {:?}", other),
        }
    }
}
