//! Time, activity, mass and amount-of-substance units.
//!
//! Unit sizes are expressed as exact decimal factors so the rational strategy
//! converts without rounding. Time is always handled as `f64` seconds.

use std::fmt;
use std::str::FromStr;

use crate::constants::{CURIE_EXP10, CURIE_MANTISSA, SECONDS_PER_DAY};
use crate::error::UnitError;
use crate::scalar::DecayScalar;

/// SI prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prefix {
    Pico,
    Nano,
    Micro,
    Milli,
    Unit,
    Kilo,
    Mega,
    Giga,
    Tera,
    Peta,
    Exa,
}

impl Prefix {
    pub fn exp10(self) -> i32 {
        match self {
            Prefix::Pico => -12,
            Prefix::Nano => -9,
            Prefix::Micro => -6,
            Prefix::Milli => -3,
            Prefix::Unit => 0,
            Prefix::Kilo => 3,
            Prefix::Mega => 6,
            Prefix::Giga => 9,
            Prefix::Tera => 12,
            Prefix::Peta => 15,
            Prefix::Exa => 18,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Prefix::Pico => "p",
            Prefix::Nano => "n",
            Prefix::Micro => "μ",
            Prefix::Milli => "m",
            Prefix::Unit => "",
            Prefix::Kilo => "k",
            Prefix::Mega => "M",
            Prefix::Giga => "G",
            Prefix::Tera => "T",
            Prefix::Peta => "P",
            Prefix::Exa => "E",
        }
    }

    fn from_symbol(s: &str) -> Option<Self> {
        Some(match s {
            "p" => Prefix::Pico,
            "n" => Prefix::Nano,
            "μ" | "µ" | "u" => Prefix::Micro,
            "m" => Prefix::Milli,
            "" => Prefix::Unit,
            "k" => Prefix::Kilo,
            "M" => Prefix::Mega,
            "G" => Prefix::Giga,
            "T" => Prefix::Tera,
            "P" => Prefix::Peta,
            "E" => Prefix::Exa,
            _ => return None,
        })
    }

    /// Split `"kBq"` into `Kilo` given base `"Bq"`.
    fn strip(s: &str, base: &str) -> Option<Self> {
        s.strip_suffix(base).and_then(Self::from_symbol)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Picosecond,
    Nanosecond,
    Microsecond,
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Year,
    Kiloyear,
    Megayear,
    Gigayear,
    Terayear,
    Petayear,
}

impl TimeUnit {
    /// Every unit from shortest to longest.
    pub const ALL: [TimeUnit; 14] = [
        TimeUnit::Picosecond,
        TimeUnit::Nanosecond,
        TimeUnit::Microsecond,
        TimeUnit::Millisecond,
        TimeUnit::Second,
        TimeUnit::Minute,
        TimeUnit::Hour,
        TimeUnit::Day,
        TimeUnit::Year,
        TimeUnit::Kiloyear,
        TimeUnit::Megayear,
        TimeUnit::Gigayear,
        TimeUnit::Terayear,
        TimeUnit::Petayear,
    ];

    /// The longest unit in which `seconds` is at least one, and the value in
    /// that unit. Durations below a picosecond stay in picoseconds.
    pub fn readable(seconds: f64, year_days: f64) -> (f64, TimeUnit) {
        let unit = Self::ALL
            .iter()
            .rev()
            .copied()
            .find(|u| seconds >= u.seconds(year_days))
            .unwrap_or(TimeUnit::Picosecond);
        (unit.from_seconds(seconds, year_days), unit)
    }

    /// Length of one unit in seconds, for a year of `year_days` days.
    pub fn seconds(self, year_days: f64) -> f64 {
        let day = SECONDS_PER_DAY as f64;
        let year = year_days * day;
        match self {
            TimeUnit::Picosecond => 1e-12,
            TimeUnit::Nanosecond => 1e-9,
            TimeUnit::Microsecond => 1e-6,
            TimeUnit::Millisecond => 1e-3,
            TimeUnit::Second => 1.0,
            TimeUnit::Minute => 60.0,
            TimeUnit::Hour => 3600.0,
            TimeUnit::Day => day,
            TimeUnit::Year => year,
            TimeUnit::Kiloyear => year * 1e3,
            TimeUnit::Megayear => year * 1e6,
            TimeUnit::Gigayear => year * 1e9,
            TimeUnit::Terayear => year * 1e12,
            TimeUnit::Petayear => year * 1e15,
        }
    }

    pub fn to_seconds(self, value: f64, year_days: f64) -> f64 {
        value * self.seconds(year_days)
    }

    pub fn from_seconds(self, seconds: f64, year_days: f64) -> f64 {
        seconds / self.seconds(year_days)
    }

    /// Convert `value` from one time unit to another.
    pub fn convert(value: f64, from: TimeUnit, to: TimeUnit, year_days: f64) -> f64 {
        if from == to {
            return value;
        }
        to.from_seconds(from.to_seconds(value, year_days), year_days)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TimeUnit::Picosecond => "ps",
            TimeUnit::Nanosecond => "ns",
            TimeUnit::Microsecond => "μs",
            TimeUnit::Millisecond => "ms",
            TimeUnit::Second => "s",
            TimeUnit::Minute => "m",
            TimeUnit::Hour => "h",
            TimeUnit::Day => "d",
            TimeUnit::Year => "y",
            TimeUnit::Kiloyear => "ky",
            TimeUnit::Megayear => "My",
            TimeUnit::Gigayear => "Gy",
            TimeUnit::Terayear => "Ty",
            TimeUnit::Petayear => "Py",
        }
    }
}

impl FromStr for TimeUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "ps" => TimeUnit::Picosecond,
            "ns" => TimeUnit::Nanosecond,
            "μs" | "µs" | "us" => TimeUnit::Microsecond,
            "ms" => TimeUnit::Millisecond,
            "s" | "sec" | "second" | "seconds" => TimeUnit::Second,
            "m" | "min" | "minute" | "minutes" => TimeUnit::Minute,
            "h" | "hr" | "hour" | "hours" => TimeUnit::Hour,
            "d" | "day" | "days" => TimeUnit::Day,
            "y" | "yr" | "year" | "years" => TimeUnit::Year,
            "ky" => TimeUnit::Kiloyear,
            "My" => TimeUnit::Megayear,
            "Gy" | "By" => TimeUnit::Gigayear,
            "Ty" => TimeUnit::Terayear,
            "Py" => TimeUnit::Petayear,
            other => return Err(UnitError::UnknownTime(other.to_string())),
        })
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ---------------------------------------------------------------------------
// Activity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityUnit {
    Becquerel(Prefix),
    Curie(Prefix),
    /// Disintegrations per minute.
    Dpm,
}

impl ActivityUnit {
    pub const BQ: ActivityUnit = ActivityUnit::Becquerel(Prefix::Unit);
    pub const CI: ActivityUnit = ActivityUnit::Curie(Prefix::Unit);

    /// Size of one unit in becquerel.
    pub fn becquerels<N: DecayScalar>(self) -> N {
        match self {
            ActivityUnit::Becquerel(p) => N::from_decimal(1, p.exp10()),
            ActivityUnit::Curie(p) => N::from_decimal(CURIE_MANTISSA, CURIE_EXP10 + p.exp10()),
            ActivityUnit::Dpm => N::one() / N::from_decimal(60, 0),
        }
    }
}

impl FromStr for ActivityUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "dpm" {
            return Ok(ActivityUnit::Dpm);
        }
        if let Some(p) = Prefix::strip(s, "Bq") {
            return Ok(ActivityUnit::Becquerel(p));
        }
        if let Some(p) = Prefix::strip(s, "Ci") {
            return Ok(ActivityUnit::Curie(p));
        }
        Err(UnitError::UnknownActivity(s.to_string()))
    }
}

impl fmt::Display for ActivityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityUnit::Becquerel(p) => write!(f, "{}Bq", p.symbol()),
            ActivityUnit::Curie(p) => write!(f, "{}Ci", p.symbol()),
            ActivityUnit::Dpm => f.write_str("dpm"),
        }
    }
}

// ---------------------------------------------------------------------------
// Mass
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MassUnit {
    Gram(Prefix),
    /// Metric ton, 10⁶ g.
    Tonne,
}

impl MassUnit {
    pub const G: MassUnit = MassUnit::Gram(Prefix::Unit);

    /// Size of one unit in grams.
    pub fn grams<N: DecayScalar>(self) -> N {
        match self {
            MassUnit::Gram(p) => N::from_decimal(1, p.exp10()),
            MassUnit::Tonne => N::from_decimal(1, 6),
        }
    }
}

impl FromStr for MassUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if matches!(s, "t" | "ton" | "tonne") {
            return Ok(MassUnit::Tonne);
        }
        match Prefix::strip(s, "g") {
            Some(p) if p.exp10() <= 6 => Ok(MassUnit::Gram(p)),
            _ => Err(UnitError::UnknownMass(s.to_string())),
        }
    }
}

impl fmt::Display for MassUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MassUnit::Gram(p) => write!(f, "{}g", p.symbol()),
            MassUnit::Tonne => f.write_str("t"),
        }
    }
}

// ---------------------------------------------------------------------------
// Amount of substance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MolesUnit(pub Prefix);

impl MolesUnit {
    pub const MOL: MolesUnit = MolesUnit(Prefix::Unit);

    /// Size of one unit in moles.
    pub fn moles<N: DecayScalar>(self) -> N {
        N::from_decimal(1, self.0.exp10())
    }
}

impl FromStr for MolesUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match Prefix::strip(s, "mol") {
            Some(p) if p.exp10() <= 6 => Ok(MolesUnit(p)),
            _ => Err(UnitError::UnknownMoles(s.to_string())),
        }
    }
}

impl fmt::Display for MolesUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}mol", self.0.symbol())
    }
}

// ---------------------------------------------------------------------------
// Any quantity
// ---------------------------------------------------------------------------

/// Unit of an inventory quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantityUnit {
    /// Number of atoms.
    Atoms,
    Activity(ActivityUnit),
    Mass(MassUnit),
    Moles(MolesUnit),
}

impl FromStr for QuantityUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if matches!(s, "num" | "atoms" | "number") {
            return Ok(QuantityUnit::Atoms);
        }
        if let Ok(u) = s.parse() {
            return Ok(QuantityUnit::Activity(u));
        }
        if let Ok(u) = s.parse() {
            return Ok(QuantityUnit::Moles(u));
        }
        if let Ok(u) = s.parse() {
            return Ok(QuantityUnit::Mass(u));
        }
        Err(UnitError::UnknownQuantity(s.to_string()))
    }
}

impl fmt::Display for QuantityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantityUnit::Atoms => f.write_str("num"),
            QuantityUnit::Activity(u) => fmt::Display::fmt(u, f),
            QuantityUnit::Mass(u) => fmt::Display::fmt(u, f),
            QuantityUnit::Moles(u) => fmt::Display::fmt(u, f),
        }
    }
}

impl From<ActivityUnit> for QuantityUnit {
    fn from(u: ActivityUnit) -> Self {
        QuantityUnit::Activity(u)
    }
}

impl From<MassUnit> for QuantityUnit {
    fn from(u: MassUnit) -> Self {
        QuantityUnit::Mass(u)
    }
}

impl From<MolesUnit> for QuantityUnit {
    fn from(u: MolesUnit) -> Self {
        QuantityUnit::Moles(u)
    }
}
