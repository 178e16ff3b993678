//! # Physical Units
//!
//! Parsing and conversion of the unit expressions attached to tabular fields,
//! such as `"uA / cm2"` or `"mA h"`.
//!
//! The grammar is the one found in published Data Packages: a unit expression
//! is a sequence of `/`-separated groups, each group a product of tokens
//! separated by whitespace or `*`. A token is an optional SI prefix, a base
//! unit symbol, and an optional integer exponent (`m2`, `s-1`, `cm^2`).
//!
//! Only linear units are supported. Conversion between two expressions of the
//! same dimension is a plain multiplication:
//!
//! ```rust
//! use unitpack::units::conversion_factor;
//!
//! let factor = conversion_factor("A / m2", "uA / cm2")?;
//! assert!((factor - 100.0).abs() < 1e-9);
//! # Ok::<(), unitpack::units::UnitError>(())
//! ```

use std::fmt;

#[cfg(test)]
mod tests;

/// Errors raised while parsing or converting unit expressions
#[derive(Debug, thiserror::Error)]
pub enum UnitError {
    /// Unit symbol not present in the registry
    #[error("Unknown unit '{0}'")]
    UnknownUnit(String),

    /// Expression that does not follow the unit grammar
    #[error("Malformed unit expression '{0}'")]
    Malformed(String),

    /// Conversion between incompatible dimensions
    #[error("Cannot convert '{from}' to '{to}': incompatible dimensions")]
    Incompatible { from: String, to: String },

    /// Metadata object that does not encode a quantity
    #[error("Not a quantity: expected an object with 'value' and 'unit' keys")]
    NotAQuantity,
}

/// Exponents over the seven SI base dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimension {
    pub length: i8,
    pub mass: i8,
    pub time: i8,
    pub current: i8,
    pub temperature: i8,
    pub amount: i8,
    pub luminosity: i8,
}

impl Dimension {
    pub const DIMENSIONLESS: Dimension = Dimension {
        length: 0,
        mass: 0,
        time: 0,
        current: 0,
        temperature: 0,
        amount: 0,
        luminosity: 0,
    };

    const fn new(
        length: i8,
        mass: i8,
        time: i8,
        current: i8,
        temperature: i8,
        amount: i8,
        luminosity: i8,
    ) -> Self {
        Dimension {
            length,
            mass,
            time,
            current,
            temperature,
            amount,
            luminosity,
        }
    }

    fn scaled(self, exponent: i8) -> Self {
        Dimension {
            length: self.length * exponent,
            mass: self.mass * exponent,
            time: self.time * exponent,
            current: self.current * exponent,
            temperature: self.temperature * exponent,
            amount: self.amount * exponent,
            luminosity: self.luminosity * exponent,
        }
    }

    fn combined(self, other: Dimension) -> Self {
        Dimension {
            length: self.length + other.length,
            mass: self.mass + other.mass,
            time: self.time + other.time,
            current: self.current + other.current,
            temperature: self.temperature + other.temperature,
            amount: self.amount + other.amount,
            luminosity: self.luminosity + other.luminosity,
        }
    }
}

/// A parsed unit: its dimension and the factor converting values to SI
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unit {
    dims: Dimension,
    si_factor: f64,
}

// Base unit registry. Symbols are matched exactly before any prefix
// interpretation, so `min` is minutes and `cd` is candela, never
// centi-day. The gram carries its 1e-3 factor so that `kg` falls out
// of the ordinary prefix rule.
struct BaseUnit {
    symbol: &'static str,
    si_factor: f64,
    dims: Dimension,
}

const DIMLESS: Dimension = Dimension::DIMENSIONLESS;

const BASE_UNITS: &[BaseUnit] = &[
    // SI base units
    BaseUnit { symbol: "m", si_factor: 1.0, dims: Dimension::new(1, 0, 0, 0, 0, 0, 0) },
    BaseUnit { symbol: "g", si_factor: 1e-3, dims: Dimension::new(0, 1, 0, 0, 0, 0, 0) },
    BaseUnit { symbol: "s", si_factor: 1.0, dims: Dimension::new(0, 0, 1, 0, 0, 0, 0) },
    BaseUnit { symbol: "A", si_factor: 1.0, dims: Dimension::new(0, 0, 0, 1, 0, 0, 0) },
    BaseUnit { symbol: "K", si_factor: 1.0, dims: Dimension::new(0, 0, 0, 0, 1, 0, 0) },
    BaseUnit { symbol: "mol", si_factor: 1.0, dims: Dimension::new(0, 0, 0, 0, 0, 1, 0) },
    BaseUnit { symbol: "cd", si_factor: 1.0, dims: Dimension::new(0, 0, 0, 0, 0, 0, 1) },
    // Derived SI units
    BaseUnit { symbol: "Hz", si_factor: 1.0, dims: Dimension::new(0, 0, -1, 0, 0, 0, 0) },
    BaseUnit { symbol: "N", si_factor: 1.0, dims: Dimension::new(1, 1, -2, 0, 0, 0, 0) },
    BaseUnit { symbol: "Pa", si_factor: 1.0, dims: Dimension::new(-1, 1, -2, 0, 0, 0, 0) },
    BaseUnit { symbol: "J", si_factor: 1.0, dims: Dimension::new(2, 1, -2, 0, 0, 0, 0) },
    BaseUnit { symbol: "W", si_factor: 1.0, dims: Dimension::new(2, 1, -3, 0, 0, 0, 0) },
    BaseUnit { symbol: "C", si_factor: 1.0, dims: Dimension::new(0, 0, 1, 1, 0, 0, 0) },
    BaseUnit { symbol: "V", si_factor: 1.0, dims: Dimension::new(2, 1, -3, -1, 0, 0, 0) },
    BaseUnit { symbol: "F", si_factor: 1.0, dims: Dimension::new(-2, -1, 4, 2, 0, 0, 0) },
    BaseUnit { symbol: "Ohm", si_factor: 1.0, dims: Dimension::new(2, 1, -3, -2, 0, 0, 0) },
    BaseUnit { symbol: "Ω", si_factor: 1.0, dims: Dimension::new(2, 1, -3, -2, 0, 0, 0) },
    BaseUnit { symbol: "S", si_factor: 1.0, dims: Dimension::new(-2, -1, 3, 2, 0, 0, 0) },
    BaseUnit { symbol: "T", si_factor: 1.0, dims: Dimension::new(0, 1, -2, -1, 0, 0, 0) },
    BaseUnit { symbol: "Wb", si_factor: 1.0, dims: Dimension::new(2, 1, -2, -1, 0, 0, 0) },
    // Accepted non-SI units
    BaseUnit { symbol: "L", si_factor: 1e-3, dims: Dimension::new(3, 0, 0, 0, 0, 0, 0) },
    BaseUnit { symbol: "l", si_factor: 1e-3, dims: Dimension::new(3, 0, 0, 0, 0, 0, 0) },
    BaseUnit { symbol: "min", si_factor: 60.0, dims: Dimension::new(0, 0, 1, 0, 0, 0, 0) },
    BaseUnit { symbol: "h", si_factor: 3600.0, dims: Dimension::new(0, 0, 1, 0, 0, 0, 0) },
    BaseUnit { symbol: "d", si_factor: 86400.0, dims: Dimension::new(0, 0, 1, 0, 0, 0, 0) },
    BaseUnit { symbol: "bar", si_factor: 1e5, dims: Dimension::new(-1, 1, -2, 0, 0, 0, 0) },
    BaseUnit { symbol: "eV", si_factor: 1.602_176_634e-19, dims: Dimension::new(2, 1, -2, 0, 0, 0, 0) },
    BaseUnit { symbol: "rad", si_factor: 1.0, dims: DIMLESS },
    BaseUnit { symbol: "%", si_factor: 1e-2, dims: DIMLESS },
];

// Prefixes ordered longest-first so `da` wins over `d`.
const PREFIXES: &[(&str, f64)] = &[
    ("da", 1e1),
    ("Y", 1e24),
    ("Z", 1e21),
    ("E", 1e18),
    ("P", 1e15),
    ("T", 1e12),
    ("G", 1e9),
    ("M", 1e6),
    ("k", 1e3),
    ("h", 1e2),
    ("d", 1e-1),
    ("c", 1e-2),
    ("m", 1e-3),
    ("u", 1e-6),
    ("µ", 1e-6),
    ("n", 1e-9),
    ("p", 1e-12),
    ("f", 1e-15),
    ("a", 1e-18),
    ("z", 1e-21),
    ("y", 1e-24),
];

impl Unit {
    /// The dimensionless unit with factor one
    pub fn dimensionless() -> Self {
        Unit {
            dims: DIMLESS,
            si_factor: 1.0,
        }
    }

    /// Parse a unit expression such as `"uA / cm2"` or `"mA h"`
    pub fn parse(expression: &str) -> Result<Self, UnitError> {
        let expression = expression.trim();
        if expression.is_empty() || expression == "1" {
            return Ok(Unit::dimensionless());
        }

        let mut unit = Unit::dimensionless();

        for (index, group) in expression.split('/').enumerate() {
            let group = group.trim();
            if group.is_empty() {
                return Err(UnitError::Malformed(expression.to_string()));
            }

            // Everything after the first `/` divides.
            let sign: i8 = if index == 0 { 1 } else { -1 };

            for token in group.split(['*', '·', ' ']).filter(|t| !t.is_empty()) {
                let (factor, dims, exponent) = parse_token(token)?;
                let exponent = exponent * i32::from(sign);
                unit.si_factor *= factor.powi(exponent);
                unit.dims = unit.dims.combined(dims.scaled(exponent as i8));
            }
        }

        Ok(unit)
    }

    /// The dimension of this unit
    pub fn dimension(&self) -> Dimension {
        self.dims
    }

    /// The factor converting a value in this unit to SI
    pub fn si_factor(&self) -> f64 {
        self.si_factor
    }

    /// Whether a value in this unit can be converted to `other`
    pub fn is_compatible(&self, other: &Unit) -> bool {
        self.dims == other.dims
    }

    /// The factor by which values in this unit must be multiplied to express
    /// them in `target`
    fn factor_to(&self, target: &Unit) -> Option<f64> {
        if self.is_compatible(target) {
            Some(self.si_factor / target.si_factor)
        } else {
            None
        }
    }
}

impl Default for Unit {
    fn default() -> Self {
        Unit::dimensionless()
    }
}

/// Parse a single token into (si factor of the base, dims of the base, exponent)
fn parse_token(token: &str) -> Result<(f64, Dimension, i32), UnitError> {
    let (base, exponent) = split_exponent(token)?;

    if base.is_empty() {
        return Err(UnitError::Malformed(token.to_string()));
    }

    if base == "1" {
        return Ok((1.0, DIMLESS, exponent));
    }

    // Exact symbols take precedence over prefix readings.
    if let Some(unit) = BASE_UNITS.iter().find(|u| u.symbol == base) {
        return Ok((unit.si_factor, unit.dims, exponent));
    }

    for (prefix, scale) in PREFIXES {
        if let Some(rest) = base.strip_prefix(prefix) {
            if let Some(unit) = BASE_UNITS.iter().find(|u| u.symbol == rest) {
                return Ok((scale * unit.si_factor, unit.dims, exponent));
            }
        }
    }

    Err(UnitError::UnknownUnit(base.to_string()))
}

/// Split a trailing integer exponent off a token: `m2`, `s-1`, `cm^2`
fn split_exponent(token: &str) -> Result<(&str, i32), UnitError> {
    let trailing_digits = token
        .bytes()
        .rev()
        .take_while(|b| b.is_ascii_digit())
        .count();
    let digits_start = token.len() - trailing_digits;

    // No trailing digits, or the token is purely numeric (the literal `1`).
    if trailing_digits == 0 || digits_start == 0 {
        return Ok((token, 1));
    }

    let mut base_end = digits_start;
    let mut negative = false;

    if token[..base_end].ends_with('-') {
        base_end -= 1;
        negative = true;
    }
    if token[..base_end].ends_with('^') {
        base_end -= 1;
    }

    let magnitude: i32 = token[digits_start..]
        .parse()
        .map_err(|_| UnitError::Malformed(token.to_string()))?;

    Ok((
        &token[..base_end],
        if negative { -magnitude } else { magnitude },
    ))
}

/// The factor by which values tagged `from` must be multiplied to express
/// them in `to`
///
/// Errors if either expression fails to parse or the dimensions differ.
pub fn conversion_factor(from: &str, to: &str) -> Result<f64, UnitError> {
    let source = Unit::parse(from)?;
    let target = Unit::parse(to)?;

    source
        .factor_to(&target)
        .ok_or_else(|| UnitError::Incompatible {
            from: from.to_string(),
            to: to.to_string(),
        })
}

/// A value paired with its unit expression
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    value: f64,
    expression: String,
    unit: Unit,
}

impl Quantity {
    /// Create a quantity from a value and a unit expression
    pub fn new(value: f64, expression: &str) -> Result<Self, UnitError> {
        Ok(Quantity {
            value,
            expression: expression.trim().to_string(),
            unit: Unit::parse(expression)?,
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// The unit expression this quantity was created with
    pub fn unit(&self) -> &str {
        &self.expression
    }

    /// This quantity expressed in a compatible `target` unit
    pub fn to(&self, target: &str) -> Result<Quantity, UnitError> {
        let factor = conversion_factor(&self.expression, target)?;

        Ok(Quantity {
            value: self.value * factor,
            expression: target.trim().to_string(),
            unit: Unit::parse(target)?,
        })
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.expression)
    }
}
