//! Atomic unit table
//!
//! Scales convert one unit of the entry into SI base units of its dimension.
//! Entries flagged `offset` (°C, °F) are never scaled linearly; they go through
//! `units::temperature`.

use super::dimension::DimensionVector;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[derive(Debug)]
pub struct UnitDefinition {
    pub symbol: &'static str,
    /// Long names and alternate spellings, matched case-insensitively
    pub names: &'static [&'static str],
    pub dimension: DimensionVector,
    pub scale: Decimal,
    pub prefixable: bool,
    pub offset: bool,
}

#[derive(Debug)]
pub struct Prefix {
    pub symbol: &'static str,
    pub name: &'static str,
    pub factor: Decimal,
}

pub static PREFIXES: &[Prefix] = &[
    Prefix { symbol: "T", name: "tera", factor: dec!(1000000000000) },
    Prefix { symbol: "G", name: "giga", factor: dec!(1000000000) },
    Prefix { symbol: "M", name: "mega", factor: dec!(1000000) },
    Prefix { symbol: "k", name: "kilo", factor: dec!(1000) },
    Prefix { symbol: "h", name: "hecto", factor: dec!(100) },
    Prefix { symbol: "d", name: "deci", factor: dec!(0.1) },
    Prefix { symbol: "c", name: "centi", factor: dec!(0.01) },
    Prefix { symbol: "m", name: "milli", factor: dec!(0.001) },
    Prefix { symbol: "µ", name: "micro", factor: dec!(0.000001) },
    Prefix { symbol: "μ", name: "micro", factor: dec!(0.000001) },
    Prefix { symbol: "u", name: "micro", factor: dec!(0.000001) },
    Prefix { symbol: "n", name: "nano", factor: dec!(0.000000001) },
    Prefix { symbol: "p", name: "pico", factor: dec!(0.000000000001) },
];

macro_rules! unit {
    ($symbol:expr, [$($name:expr),*], $dim:expr, $scale:expr) => {
        UnitDefinition { symbol: $symbol, names: &[$($name),*], dimension: $dim, scale: $scale, prefixable: false, offset: false }
    };
    ($symbol:expr, [$($name:expr),*], $dim:expr, $scale:expr, prefixable) => {
        UnitDefinition { symbol: $symbol, names: &[$($name),*], dimension: $dim, scale: $scale, prefixable: true, offset: false }
    };
    ($symbol:expr, [$($name:expr),*], $dim:expr, $scale:expr, offset) => {
        UnitDefinition { symbol: $symbol, names: &[$($name),*], dimension: $dim, scale: $scale, prefixable: false, offset: true }
    };
}

use DimensionVector as D;

pub static UNITS: &[UnitDefinition] = &[
    // length
    unit!("m", ["meter", "meters", "metre", "metres"], D::LENGTH, dec!(1), prefixable),
    unit!("km", ["kilometer", "kilometers", "kilometre", "kilometres"], D::LENGTH, dec!(1000)),
    unit!("cm", ["centimeter", "centimeters", "centimetre", "centimetres"], D::LENGTH, dec!(0.01)),
    unit!("mm", ["millimeter", "millimeters", "millimetre", "millimetres"], D::LENGTH, dec!(0.001)),
    unit!("in", ["inch", "inches"], D::LENGTH, dec!(0.0254)),
    unit!("ft", ["foot", "feet"], D::LENGTH, dec!(0.3048)),
    unit!("yd", ["yard", "yards"], D::LENGTH, dec!(0.9144)),
    unit!("mi", ["mile", "miles"], D::LENGTH, dec!(1609.344)),
    unit!("nmi", ["nautical_mile", "nautical_miles"], D::LENGTH, dec!(1852)),
    // mass
    unit!("g", ["gram", "grams", "gramme", "grammes"], D::MASS, dec!(0.001), prefixable),
    unit!("kg", ["kilogram", "kilograms", "kilo", "kilos"], D::MASS, dec!(1)),
    unit!("mg", ["milligram", "milligrams"], D::MASS, dec!(0.000001)),
    unit!("t", ["tonne", "tonnes", "ton", "tons"], D::MASS, dec!(1000)),
    unit!("lb", ["lbs", "pound", "pounds"], D::MASS, dec!(0.45359237)),
    unit!("oz", ["ounce", "ounces"], D::MASS, dec!(0.028349523125)),
    unit!("st", ["stone", "stones"], D::MASS, dec!(6.35029318)),
    // time
    unit!("s", ["sec", "secs", "second", "seconds"], D::TIME, dec!(1), prefixable),
    unit!("ms", ["millisecond", "milliseconds"], D::TIME, dec!(0.001)),
    unit!("min", ["mins", "minute", "minutes"], D::TIME, dec!(60)),
    unit!("h", ["hr", "hrs", "hour", "hours"], D::TIME, dec!(3600)),
    unit!("d", ["day", "days"], D::TIME, dec!(86400)),
    unit!("wk", ["week", "weeks"], D::TIME, dec!(604800)),
    unit!("mo", ["month", "months"], D::TIME, dec!(2629746)),
    unit!("yr", ["year", "years"], D::TIME, dec!(31556952)),
    // temperature
    unit!("K", ["kelvin", "kelvins"], D::TEMPERATURE, dec!(1)),
    unit!("°C", ["degc", "celsius", "℃"], D::TEMPERATURE, dec!(1), offset),
    unit!("°F", ["degf", "fahrenheit", "℉"], D::TEMPERATURE, dec!(0.5555555555555555555555555556), offset),
    // electrical
    unit!("A", ["amp", "amps", "ampere", "amperes"], D::CURRENT, dec!(1), prefixable),
    unit!("V", ["volt", "volts"], D::POTENTIAL, dec!(1), prefixable),
    unit!("Ω", ["ohm", "ohms"], D::RESISTANCE, dec!(1), prefixable),
    unit!("C", ["coulomb", "coulombs"], D::CHARGE, dec!(1), prefixable),
    // power and energy
    unit!("W", ["watt", "watts"], D::POWER, dec!(1), prefixable),
    unit!("kW", ["kilowatt", "kilowatts"], D::POWER, dec!(1000)),
    unit!("hp", ["horsepower"], D::POWER, dec!(745.69987158227022)),
    unit!("J", ["joule", "joules"], D::ENERGY, dec!(1), prefixable),
    unit!("kJ", ["kilojoule", "kilojoules"], D::ENERGY, dec!(1000)),
    unit!("Wh", ["watthour", "watthours", "watt_hour", "watt_hours"], D::ENERGY, dec!(3600), prefixable),
    unit!("kWh", ["kilowatthour", "kilowatthours", "kilowatt_hour", "kilowatt_hours"], D::ENERGY, dec!(3600000)),
    unit!("cal", ["calorie", "calories"], D::ENERGY, dec!(4.184)),
    unit!("kcal", ["kilocalorie", "kilocalories", "kcals"], D::ENERGY, dec!(4184)),
    unit!("BTU", ["btu", "btus"], D::ENERGY, dec!(1055.05585262)),
    unit!("eV", ["electronvolt", "electronvolts"], D::ENERGY, dec!(0.0000000000000000001602176634)),
    // force and pressure
    unit!("N", ["newton", "newtons"], D::FORCE, dec!(1), prefixable),
    unit!("lbf", ["pound_force"], D::FORCE, dec!(4.4482216152605)),
    unit!("Pa", ["pascal", "pascals"], D::PRESSURE, dec!(1), prefixable),
    unit!("bar", ["bars"], D::PRESSURE, dec!(100000), prefixable),
    unit!("psi", [], D::PRESSURE, dec!(6894.757293168)),
    unit!("atm", ["atmosphere", "atmospheres"], D::PRESSURE, dec!(101325)),
    // frequency and angle
    unit!("Hz", ["hertz"], D::FREQUENCY, dec!(1), prefixable),
    unit!("rad", ["radian", "radians"], D::ANGLE, dec!(1), prefixable),
    unit!("deg", ["degree", "degrees", "°"], D::ANGLE, dec!(0.0174532925199432957692369077)),
    unit!("rpm", [], D::ROTATIONAL_SPEED, dec!(0.1047197551196597746154214461)),
    // information
    unit!("bit", ["bits"], D::INFORMATION, dec!(1), prefixable),
    unit!("B", ["byte", "bytes"], D::INFORMATION, dec!(8)),
    unit!("kB", ["kb", "kilobyte", "kilobytes"], D::INFORMATION, dec!(8000)),
    unit!("MB", ["megabyte", "megabytes"], D::INFORMATION, dec!(8000000)),
    unit!("GB", ["gigabyte", "gigabytes"], D::INFORMATION, dec!(8000000000)),
    unit!("TB", ["terabyte", "terabytes"], D::INFORMATION, dec!(8000000000000)),
    unit!("KiB", ["kibibyte", "kibibytes"], D::INFORMATION, dec!(8192)),
    unit!("MiB", ["mebibyte", "mebibytes"], D::INFORMATION, dec!(8388608)),
    unit!("GiB", ["gibibyte", "gibibytes"], D::INFORMATION, dec!(8589934592)),
    // area and volume
    unit!("ha", ["hectare", "hectares"], D::AREA, dec!(10000)),
    unit!("acre", ["acres"], D::AREA, dec!(4046.8564224)),
    unit!("L", ["l", "liter", "liters", "litre", "litres"], D::VOLUME, dec!(0.001), prefixable),
    unit!("mL", ["ml", "milliliter", "milliliters", "millilitre", "millilitres"], D::VOLUME, dec!(0.000001)),
    unit!("gal", ["gallon", "gallons"], D::VOLUME, dec!(0.003785411784)),
    unit!("qt", ["quart", "quarts"], D::VOLUME, dec!(0.000946352946)),
    unit!("pt", ["pint", "pints"], D::VOLUME, dec!(0.000473176473)),
    unit!("cup", ["cups"], D::VOLUME, dec!(0.0002365882365)),
    unit!("floz", ["fl_oz"], D::VOLUME, dec!(0.0000295735295625)),
    // speed
    unit!("mph", [], D::SPEED, dec!(0.44704)),
    unit!("kph", ["kmh"], D::SPEED, dec!(0.2777777777777777777777777778)),
    unit!("kn", ["knot", "knots"], D::SPEED, dec!(0.5144444444444444444444444444)),
    // substance and luminosity
    unit!("mol", ["mole", "moles"], D::SUBSTANCE, dec!(1), prefixable),
    unit!("cd", ["candela", "candelas"], D::LUMINOSITY, dec!(1)),
];

/// A table entry together with the SI prefix it was written with
#[derive(Debug, Clone, Copy)]
pub struct UnitRef {
    pub definition: &'static UnitDefinition,
    pub prefix: Option<&'static Prefix>,
}

impl UnitRef {
    pub fn plain(definition: &'static UnitDefinition) -> Self {
        Self {
            definition,
            prefix: None,
        }
    }

    /// Factor to SI base units
    pub fn scale(&self) -> Decimal {
        match self.prefix {
            Some(p) => p.factor * self.definition.scale,
            None => self.definition.scale,
        }
    }

    pub fn dimension(&self) -> DimensionVector {
        self.definition.dimension
    }

    pub fn symbol(&self) -> String {
        match self.prefix {
            Some(p) => format!("{}{}", p.symbol, self.definition.symbol),
            None => self.definition.symbol.to_string(),
        }
    }

    pub fn is_offset(&self) -> bool {
        self.definition.offset
    }
}

impl PartialEq for UnitRef {
    fn eq(&self, other: &Self) -> bool {
        self.symbol() == other.symbol()
    }
}

/// Resolve one atomic unit: exact symbol, then long name, then prefix + symbol
pub fn lookup(text: &str) -> Option<UnitRef> {
    if text.is_empty() {
        return None;
    }
    if let Some(def) = UNITS.iter().find(|u| u.symbol == text) {
        return Some(UnitRef::plain(def));
    }
    let lower = text.to_lowercase();
    if let Some(def) = UNITS.iter().find(|u| u.names.iter().any(|n| *n == lower)) {
        return Some(UnitRef::plain(def));
    }
    for prefix in PREFIXES {
        if let Some(rest) = text.strip_prefix(prefix.symbol) {
            if let Some(def) = UNITS.iter().find(|u| u.prefixable && u.symbol == rest) {
                return Some(UnitRef {
                    definition: def,
                    prefix: Some(prefix),
                });
            }
        }
    }
    None
}

pub fn find_by_symbol(symbol: &str) -> Option<UnitRef> {
    UNITS
        .iter()
        .find(|u| u.symbol == symbol)
        .map(UnitRef::plain)
}

/// Closest known unit spelling, for "did you mean" hints
pub fn suggest(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    let mut best: Option<(&'static str, usize)> = None;
    for def in UNITS {
        for candidate in std::iter::once(&def.symbol).chain(def.names.iter()) {
            let distance = edit_distance(&lower, &candidate.to_lowercase());
            if distance <= 2 && best.map_or(true, |(_, d)| distance < d) {
                best = Some((*candidate, distance));
            }
        }
    }
    best.map(|(name, _)| name)
}

fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut current = vec![i + 1];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            let value = (previous[j] + cost)
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
            current.push(value);
        }
        previous = current;
    }
    previous[b.len()]
}
