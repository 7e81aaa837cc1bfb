//! Currencies, money amounts and amount-per-unit rates

use super::format::{format_decimal, FormatOptions};
use crate::units::CompositeUnit;
use rust_decimal::prelude::*;

#[derive(Debug)]
pub struct Currency {
    pub code: &'static str,
    pub symbol: Option<&'static str>,
    pub minor_units: u32,
}

impl PartialEq for Currency {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

pub static CURRENCIES: &[Currency] = &[
    Currency { code: "USD", symbol: Some("$"), minor_units: 2 },
    Currency { code: "EUR", symbol: Some("€"), minor_units: 2 },
    Currency { code: "GBP", symbol: Some("£"), minor_units: 2 },
    Currency { code: "JPY", symbol: Some("¥"), minor_units: 0 },
    Currency { code: "INR", symbol: Some("₹"), minor_units: 2 },
    Currency { code: "KRW", symbol: Some("₩"), minor_units: 0 },
    Currency { code: "RUB", symbol: Some("₽"), minor_units: 2 },
    Currency { code: "BTC", symbol: Some("₿"), minor_units: 8 },
    Currency { code: "TRY", symbol: Some("₺"), minor_units: 2 },
    Currency { code: "ILS", symbol: Some("₪"), minor_units: 2 },
    Currency { code: "CHF", symbol: None, minor_units: 2 },
    Currency { code: "CAD", symbol: None, minor_units: 2 },
    Currency { code: "AUD", symbol: None, minor_units: 2 },
    Currency { code: "CNY", symbol: None, minor_units: 2 },
    Currency { code: "SEK", symbol: None, minor_units: 2 },
    Currency { code: "NOK", symbol: None, minor_units: 2 },
    Currency { code: "DKK", symbol: None, minor_units: 2 },
    Currency { code: "PLN", symbol: None, minor_units: 2 },
    Currency { code: "MXN", symbol: None, minor_units: 2 },
    Currency { code: "BRL", symbol: None, minor_units: 2 },
    Currency { code: "ZAR", symbol: None, minor_units: 2 },
    Currency { code: "NZD", symbol: None, minor_units: 2 },
    Currency { code: "SGD", symbol: None, minor_units: 2 },
    Currency { code: "HKD", symbol: None, minor_units: 2 },
];

pub fn by_symbol(symbol: &str) -> Option<&'static Currency> {
    CURRENCIES.iter().find(|c| c.symbol == Some(symbol))
}

/// Case-insensitive ISO code lookup
pub fn by_code(code: &str) -> Option<&'static Currency> {
    CURRENCIES.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

/// Symbol or code
pub fn lookup(text: &str) -> Option<&'static Currency> {
    by_symbol(text).or_else(|| by_code(text))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Money {
    pub amount: Decimal,
    pub currency: &'static Currency,
}

impl Money {
    pub fn new(amount: Decimal, currency: &'static Currency) -> Self {
        Self { amount, currency }
    }

    pub fn with_amount(&self, amount: Decimal) -> Self {
        Self::new(amount, self.currency)
    }

    pub fn format(&self, options: &FormatOptions) -> String {
        format_money(self.amount, self.currency, options)
    }
}

/// Money per (or times) a unit, e.g. `$100/m^2`. Negative exponents in `unit`
/// are "per".
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyRate {
    pub amount: Decimal,
    pub currency: &'static Currency,
    pub unit: CompositeUnit,
}

impl CurrencyRate {
    pub fn new(amount: Decimal, currency: &'static Currency, unit: CompositeUnit) -> Self {
        Self {
            amount,
            currency,
            unit,
        }
    }

    pub fn money(&self) -> Money {
        Money::new(self.amount, self.currency)
    }

    pub fn format(&self, options: &FormatOptions) -> String {
        let mut text = format_money(self.amount, self.currency, options);
        let numerator = self.unit.numerator();
        if !numerator.is_empty() {
            text.push(' ');
            text.push_str(&numerator.label());
        }
        for factor in self.unit.denominator().factors() {
            text.push('/');
            match factor.exponent {
                1 => text.push_str(&factor.unit.symbol()),
                e => text.push_str(&format!("{}^{}", factor.unit.symbol(), e)),
            }
        }
        text
    }
}

fn format_money(amount: Decimal, currency: &Currency, options: &FormatOptions) -> String {
    let magnitude = amount.abs();
    let digits = if options.money_rounding {
        let rounded = magnitude.round_dp_with_strategy(currency.minor_units, RoundingStrategy::MidpointAwayFromZero);
        if rounded.fract().is_zero() {
            format_decimal(rounded.trunc(), options)
        } else {
            let grouped = format_decimal(rounded, options);
            pad_fraction(&grouped, currency.minor_units as usize)
        }
    } else {
        format_decimal(magnitude, options)
    };
    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    match currency.symbol {
        Some(symbol) => format!("{}{}{}", sign, symbol, digits),
        None => format!("{}{} {}", sign, digits, currency.code),
    }
}

fn pad_fraction(text: &str, minor_units: usize) -> String {
    match text.split_once('.') {
        Some((_, fraction)) if fraction.len() < minor_units && !text.contains('e') => {
            format!("{}{}", text, "0".repeat(minor_units - fraction.len()))
        }
        _ => text.to_string(),
    }
}
