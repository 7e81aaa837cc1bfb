//! Named physical quantities, derivation rules and the display-unit policy

use super::definitions::{self, UnitRef};
use super::dimension::DimensionVector;
use super::{CompositeUnit, Quantity};

#[derive(Debug)]
pub struct QuantityKind {
    pub name: &'static str,
    pub dimension: DimensionVector,
}

pub static QUANTITY_KINDS: &[QuantityKind] = &[
    QuantityKind { name: "length", dimension: DimensionVector::LENGTH },
    QuantityKind { name: "mass", dimension: DimensionVector::MASS },
    QuantityKind { name: "duration", dimension: DimensionVector::TIME },
    QuantityKind { name: "temperature", dimension: DimensionVector::TEMPERATURE },
    QuantityKind { name: "area", dimension: DimensionVector::AREA },
    QuantityKind { name: "volume", dimension: DimensionVector::VOLUME },
    QuantityKind { name: "speed", dimension: DimensionVector::SPEED },
    QuantityKind { name: "acceleration", dimension: DimensionVector::ACCELERATION },
    QuantityKind { name: "force", dimension: DimensionVector::FORCE },
    QuantityKind { name: "pressure", dimension: DimensionVector::PRESSURE },
    QuantityKind { name: "energy", dimension: DimensionVector::ENERGY },
    QuantityKind { name: "power", dimension: DimensionVector::POWER },
    QuantityKind { name: "current", dimension: DimensionVector::CURRENT },
    QuantityKind { name: "potential", dimension: DimensionVector::POTENTIAL },
    QuantityKind { name: "resistance", dimension: DimensionVector::RESISTANCE },
    QuantityKind { name: "charge", dimension: DimensionVector::CHARGE },
    QuantityKind { name: "frequency", dimension: DimensionVector::FREQUENCY },
    QuantityKind { name: "angle", dimension: DimensionVector::ANGLE },
    QuantityKind { name: "information", dimension: DimensionVector::INFORMATION },
    QuantityKind { name: "rotational speed", dimension: DimensionVector::ROTATIONAL_SPEED },
];

pub fn kind_of(dimension: DimensionVector) -> Option<&'static QuantityKind> {
    QUANTITY_KINDS.iter().find(|k| k.dimension == dimension)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combine {
    Multiply,
    Divide,
}

struct DerivationRule {
    left: &'static str,
    op: Combine,
    right: &'static str,
    result: &'static str,
    /// Unit the result is expressed in; `None` keeps the merged composite
    unit: Option<&'static str>,
}

macro_rules! rule {
    ($left:literal * $right:literal => $result:literal) => {
        DerivationRule { left: $left, op: Combine::Multiply, right: $right, result: $result, unit: None }
    };
    ($left:literal * $right:literal => $result:literal in $unit:literal) => {
        DerivationRule { left: $left, op: Combine::Multiply, right: $right, result: $result, unit: Some($unit) }
    };
    ($left:literal / $right:literal => $result:literal) => {
        DerivationRule { left: $left, op: Combine::Divide, right: $right, result: $result, unit: None }
    };
    ($left:literal / $right:literal => $result:literal in $unit:literal) => {
        DerivationRule { left: $left, op: Combine::Divide, right: $right, result: $result, unit: Some($unit) }
    };
}

static DERIVATIONS: &[DerivationRule] = &[
    rule!("length" * "length" => "area"),
    rule!("area" * "length" => "volume"),
    rule!("length" * "area" => "volume"),
    rule!("mass" * "acceleration" => "force" in "N"),
    rule!("acceleration" * "mass" => "force" in "N"),
    rule!("force" * "length" => "energy" in "J"),
    rule!("length" * "force" => "energy" in "J"),
    rule!("power" * "duration" => "energy" in "Wh"),
    rule!("duration" * "power" => "energy" in "Wh"),
    rule!("potential" * "current" => "power" in "W"),
    rule!("current" * "potential" => "power" in "W"),
    rule!("current" * "resistance" => "potential" in "V"),
    rule!("resistance" * "current" => "potential" in "V"),
    rule!("current" * "duration" => "charge" in "C"),
    rule!("force" / "area" => "pressure" in "Pa"),
    rule!("energy" / "duration" => "power" in "W"),
    rule!("energy" / "power" => "duration" in "h"),
    rule!("potential" / "current" => "resistance" in "Ω"),
    rule!("potential" / "resistance" => "current" in "A"),
    rule!("power" / "potential" => "current" in "A"),
    rule!("power" / "current" => "potential" in "V"),
    rule!("length" / "duration" => "speed"),
    rule!("speed" / "duration" => "acceleration"),
];

/// Named result of combining two quantities, and the unit to express it in
pub fn derive(
    left: DimensionVector,
    op: Combine,
    right: DimensionVector,
) -> Option<(&'static str, Option<UnitRef>)> {
    let left = kind_of(left)?;
    let right = kind_of(right)?;
    DERIVATIONS
        .iter()
        .find(|r| r.left == left.name && r.op == op && r.right == right.name)
        .map(|r| (r.result, r.unit.and_then(definitions::find_by_symbol)))
}

/// Unit families the display policy may move within, smallest first
static FAMILIES: &[&[&str]] = &[
    &["mm", "cm", "m", "km"],
    &["mg", "g", "kg", "t"],
    &["mL", "L"],
    &["J", "kJ", "MJ", "GJ"],
    &["Wh", "kWh", "MWh", "GWh"],
    &["W", "kW", "MW", "GW"],
    &["Pa", "kPa", "MPa"],
    &["N", "kN", "MN"],
    &["B", "kB", "MB", "GB", "TB"],
    &["Hz", "kHz", "MHz", "GHz"],
];

/// Rescale a quantity for display: once a value reaches 1000 of its unit, move
/// up its family to the largest unit that still shows at least 1.
/// The underlying value is unchanged.
pub fn best_display_unit(quantity: &Quantity) -> Quantity {
    let [factor] = quantity.unit.factors() else {
        return quantity.clone();
    };
    if factor.exponent != 1 || quantity.value.abs() < rust_decimal::Decimal::ONE_THOUSAND {
        return quantity.clone();
    }
    let symbol = factor.unit.symbol();
    let Some(family) = FAMILIES.iter().find(|f| f.contains(&symbol.as_str())) else {
        return quantity.clone();
    };
    let mut best = quantity.clone();
    for member in family.iter() {
        let Some(unit) = definitions::lookup(member) else {
            continue;
        };
        if unit.scale() <= factor.unit.scale() {
            continue;
        }
        if let Ok(candidate) = quantity.convert_to(&CompositeUnit::single(unit)) {
            if candidate.value.abs() >= rust_decimal::Decimal::ONE {
                best = candidate;
            }
        }
    }
    best
}
