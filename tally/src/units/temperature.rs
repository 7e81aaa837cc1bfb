//! Offset-aware temperature conversions. Celsius and Fahrenheit have a
//! nonzero origin, so they never take part in linear scaling.

use super::definitions::UnitRef;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const KELVIN_OFFSET: Decimal = dec!(273.15);
const RANKINE_OFFSET: Decimal = dec!(459.67);

pub fn to_kelvin(value: Decimal, unit: &UnitRef) -> Decimal {
    match unit.definition.symbol {
        "°C" => value + KELVIN_OFFSET,
        "°F" => (value + RANKINE_OFFSET) * dec!(5) / dec!(9),
        _ => value * unit.scale(),
    }
}

pub fn from_kelvin(kelvin: Decimal, unit: &UnitRef) -> Decimal {
    match unit.definition.symbol {
        "°C" => kelvin - KELVIN_OFFSET,
        "°F" => kelvin * dec!(9) / dec!(5) - RANKINE_OFFSET,
        _ => kelvin / unit.scale(),
    }
}

pub fn convert(value: Decimal, from: &UnitRef, to: &UnitRef) -> Decimal {
    if from == to {
        return value;
    }
    from_kelvin(to_kelvin(value, from), to)
}
