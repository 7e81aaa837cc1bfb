use std::fmt;
use std::ops;

/// The base dimensions every unit is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseDimension {
    Length,
    Mass,
    Time,
    Temperature,
    Current,
    Substance,
    Luminosity,
    Information,
    Angle,
}

impl BaseDimension {
    pub const ALL: [BaseDimension; 9] = [
        BaseDimension::Length,
        BaseDimension::Mass,
        BaseDimension::Time,
        BaseDimension::Temperature,
        BaseDimension::Current,
        BaseDimension::Substance,
        BaseDimension::Luminosity,
        BaseDimension::Information,
        BaseDimension::Angle,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BaseDimension::Length => "L",
            BaseDimension::Mass => "M",
            BaseDimension::Time => "T",
            BaseDimension::Temperature => "Θ",
            BaseDimension::Current => "I",
            BaseDimension::Substance => "N",
            BaseDimension::Luminosity => "J",
            BaseDimension::Information => "B",
            BaseDimension::Angle => "A",
        }
    }
}

/// Exponent of each base dimension, indexed by `BaseDimension::index`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DimensionVector(pub [i8; 9]);

impl DimensionVector {
    pub const NONE: Self = Self([0, 0, 0, 0, 0, 0, 0, 0, 0]);
    pub const LENGTH: Self = Self([1, 0, 0, 0, 0, 0, 0, 0, 0]);
    pub const AREA: Self = Self([2, 0, 0, 0, 0, 0, 0, 0, 0]);
    pub const VOLUME: Self = Self([3, 0, 0, 0, 0, 0, 0, 0, 0]);
    pub const MASS: Self = Self([0, 1, 0, 0, 0, 0, 0, 0, 0]);
    pub const TIME: Self = Self([0, 0, 1, 0, 0, 0, 0, 0, 0]);
    pub const TEMPERATURE: Self = Self([0, 0, 0, 1, 0, 0, 0, 0, 0]);
    pub const CURRENT: Self = Self([0, 0, 0, 0, 1, 0, 0, 0, 0]);
    pub const SUBSTANCE: Self = Self([0, 0, 0, 0, 0, 1, 0, 0, 0]);
    pub const LUMINOSITY: Self = Self([0, 0, 0, 0, 0, 0, 1, 0, 0]);
    pub const INFORMATION: Self = Self([0, 0, 0, 0, 0, 0, 0, 1, 0]);
    pub const ANGLE: Self = Self([0, 0, 0, 0, 0, 0, 0, 0, 1]);
    pub const SPEED: Self = Self([1, 0, -1, 0, 0, 0, 0, 0, 0]);
    pub const ACCELERATION: Self = Self([1, 0, -2, 0, 0, 0, 0, 0, 0]);
    pub const FORCE: Self = Self([1, 1, -2, 0, 0, 0, 0, 0, 0]);
    pub const PRESSURE: Self = Self([-1, 1, -2, 0, 0, 0, 0, 0, 0]);
    pub const ENERGY: Self = Self([2, 1, -2, 0, 0, 0, 0, 0, 0]);
    pub const POWER: Self = Self([2, 1, -3, 0, 0, 0, 0, 0, 0]);
    pub const POTENTIAL: Self = Self([2, 1, -3, 0, -1, 0, 0, 0, 0]);
    pub const RESISTANCE: Self = Self([2, 1, -3, 0, -2, 0, 0, 0, 0]);
    pub const CHARGE: Self = Self([0, 0, 1, 0, 1, 0, 0, 0, 0]);
    pub const FREQUENCY: Self = Self([0, 0, -1, 0, 0, 0, 0, 0, 0]);
    pub const ROTATIONAL_SPEED: Self = Self([0, 0, -1, 0, 0, 0, 0, 0, 1]);

    pub fn exponent(&self, base: BaseDimension) -> i8 {
        self.0[base.index()]
    }

    pub fn is_dimensionless(&self) -> bool {
        self.0.iter().all(|e| *e == 0)
    }

    /// Raise every exponent to an integer power
    pub fn powi(&self, n: i32) -> Option<Self> {
        let mut out = [0i8; 9];
        for (slot, e) in out.iter_mut().zip(self.0.iter()) {
            let v = i32::from(*e).checked_mul(n)?;
            *slot = i8::try_from(v).ok()?;
        }
        Some(Self(out))
    }

    /// Integer root; `None` unless every exponent divides evenly
    pub fn root(&self, n: i32) -> Option<Self> {
        if n == 0 {
            return None;
        }
        let mut out = [0i8; 9];
        for (slot, e) in out.iter_mut().zip(self.0.iter()) {
            let e = i32::from(*e);
            if e % n != 0 {
                return None;
            }
            *slot = i8::try_from(e / n).ok()?;
        }
        Some(Self(out))
    }
}

impl ops::Mul for DimensionVector {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut out = self.0;
        for (slot, e) in out.iter_mut().zip(rhs.0.iter()) {
            *slot = slot.saturating_add(*e);
        }
        Self(out)
    }
}

impl ops::Div for DimensionVector {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        let mut out = self.0;
        for (slot, e) in out.iter_mut().zip(rhs.0.iter()) {
            *slot = slot.saturating_sub(*e);
        }
        Self(out)
    }
}

impl fmt::Display for DimensionVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "1");
        }
        let parts: Vec<String> = BaseDimension::ALL
            .iter()
            .filter(|b| self.exponent(**b) != 0)
            .map(|b| match self.exponent(*b) {
                1 => b.symbol().to_string(),
                e => format!("{}^{}", b.symbol(), e),
            })
            .collect();
        write!(f, "{}", parts.join("·"))
    }
}
