use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// How dates are written when displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DateFormat {
    /// 2024-03-15
    #[default]
    Iso,
    /// 03/15/2024
    Us,
    /// 15/03/2024
    Eu,
    /// 15 March 2024
    Long,
}

/// Field order assumed for ambiguous numeric dates like 03/04/2024
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DateLocale {
    /// month/day/year
    #[default]
    Us,
    /// day/month/year
    Eu,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Decimal places shown before trimming
    pub precision: u32,
    /// Magnitudes at or above this print in scientific notation
    pub scientific_upper: Decimal,
    /// Nonzero magnitudes below this print in scientific notation
    pub scientific_lower: Decimal,
    pub trim_zeros: bool,
    pub thousands_separator: bool,
    /// Round money to the currency's minor units
    pub money_rounding: bool,
    pub date_format: DateFormat,
    pub date_locale: DateLocale,
    /// Apply the best-display-unit policy to quantities
    pub auto_scale_units: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            precision: 6,
            scientific_upper: dec!(1000000000000000),
            scientific_lower: dec!(0.000001),
            trim_zeros: true,
            thousands_separator: false,
            money_rounding: true,
            date_format: DateFormat::Iso,
            date_locale: DateLocale::Us,
            auto_scale_units: true,
        }
    }
}

impl FormatOptions {
    /// Lossless-enough options used by `Display`: parsing the output gives the
    /// value back within 1e-10.
    pub fn canonical() -> Self {
        Self {
            precision: 15,
            money_rounding: false,
            auto_scale_units: false,
            ..Self::default()
        }
    }
}

pub fn format_decimal(value: Decimal, options: &FormatOptions) -> String {
    if value.is_zero() {
        return "0".to_string();
    }
    let abs = value.abs();
    if abs >= options.scientific_upper || abs < options.scientific_lower {
        return format_scientific(value, options.precision);
    }
    let rounded = value.round_dp_with_strategy(options.precision, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        return "0".to_string();
    }
    let text = if options.trim_zeros {
        rounded.normalize().to_string()
    } else {
        format!("{:.*}", options.precision as usize, rounded)
    };
    if options.thousands_separator {
        group_thousands(&text)
    } else {
        text
    }
}

/// `1.5e15`, `-2.5e-7`
fn format_scientific(value: Decimal, precision: u32) -> String {
    let float = value.to_f64().unwrap_or(0.0);
    let text = format!("{:.*e}", precision.min(15) as usize, float);
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let mantissa = if mantissa.contains('.') {
                mantissa.trim_end_matches('0').trim_end_matches('.')
            } else {
                mantissa
            };
            format!("{}e{}", mantissa, exponent)
        }
        None => text,
    }
}

fn group_thousands(text: &str) -> String {
    let (sign, rest) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (integer, fraction) = match rest.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rest, None),
    };
    let mut grouped = String::new();
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    match fraction {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}
