//! Canonical nuclide identifiers and name parsing.
//!
//! A nuclide is identified by `Z·10⁷ + A·10⁴ + state`, where state 0 is the
//! ground state, 1 the first metastable (`m`) and 2 the second (`n`).
//!
//! Accepted name forms:
//! - `Symbol-A` with optional state suffix: `Tc-99m`
//! - `SymbolA`: `Tc99m`
//! - `ASymbol` with the state between A and symbol: `99mTc`
//! - the canonical id in decimal: `430990001`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    atomic_number, element_symbol, ID_A_FACTOR, ID_Z_FACTOR, MAX_METASTABLE_STATE,
};
use crate::error::NuclideError;

/// Canonical nuclide id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NuclideId(u32);

impl NuclideId {
    /// Build an id from atomic number, mass number and metastable state.
    pub fn new(z: u32, a: u32, state: u32) -> Result<Self, NuclideError> {
        if element_symbol(z).is_none() {
            return Err(NuclideError::InvalidAtomicNumber(z));
        }
        let a_part = a
            .checked_mul(ID_A_FACTOR)
            .filter(|v| a >= z && *v < ID_Z_FACTOR)
            .ok_or(NuclideError::InvalidMassNumber { z, a })?;
        if state > MAX_METASTABLE_STATE as u32 {
            return Err(NuclideError::InvalidState(state));
        }
        Ok(Self(z * ID_Z_FACTOR + a_part + state))
    }

    /// Validate and wrap a canonical id.
    pub fn from_canonical(id: u32) -> Result<Self, NuclideError> {
        let z = id / ID_Z_FACTOR;
        let a = (id % ID_Z_FACTOR) / ID_A_FACTOR;
        let state = id % ID_A_FACTOR;
        Self::new(z, a, state).map_err(|_| NuclideError::InvalidId(id))
    }

    /// The canonical integer id.
    pub fn canonical(&self) -> u32 {
        self.0
    }

    /// Atomic number Z.
    pub fn z(&self) -> u32 {
        self.0 / ID_Z_FACTOR
    }

    /// Mass number A.
    pub fn a(&self) -> u32 {
        (self.0 % ID_Z_FACTOR) / ID_A_FACTOR
    }

    /// Metastable state (0 = ground).
    pub fn state(&self) -> u32 {
        self.0 % ID_A_FACTOR
    }

    /// Element symbol.
    pub fn symbol(&self) -> &'static str {
        // Construction guarantees Z is in the element table.
        element_symbol(self.z()).unwrap_or("?")
    }

    /// True for excited (metastable) states.
    pub fn is_metastable(&self) -> bool {
        self.state() > 0
    }
}

fn state_suffix(state: u32) -> &'static str {
    match state {
        1 => "m",
        2 => "n",
        _ => "",
    }
}

fn state_from_letter(c: char) -> Option<u32> {
    match c {
        'm' | 'M' => Some(1),
        'n' | 'N' => Some(2),
        _ => None,
    }
}

/// Capitalise an element symbol: `tc` / `TC` -> `Tc`.
fn normalise_symbol(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

fn lookup_z(raw_symbol: &str) -> Result<u32, NuclideError> {
    let symbol = normalise_symbol(raw_symbol);
    atomic_number(&symbol).ok_or(NuclideError::UnknownElement(symbol))
}

fn parse_mass_number(digits: &str, input: &str) -> Result<u32, NuclideError> {
    digits
        .parse::<u32>()
        .map_err(|_| NuclideError::InvalidString(input.to_string()))
}

impl FromStr for NuclideId {
    type Err = NuclideError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let s = input.trim();
        let invalid = || NuclideError::InvalidString(input.to_string());
        let first = s.chars().next().ok_or_else(invalid)?;

        if s.bytes().all(|b| b.is_ascii_digit()) {
            let id = s.parse::<u32>().map_err(|_| invalid())?;
            return Self::from_canonical(id);
        }

        if first.is_ascii_digit() {
            // ASymbol, e.g. 99mTc, 238U
            let digits_end = s.find(|c: char| !c.is_ascii_digit()).ok_or_else(invalid)?;
            let a = parse_mass_number(&s[..digits_end], input)?;
            let rest = s[digits_end..].trim_start_matches('-');
            let mut chars = rest.chars();
            let (state, symbol) = match (chars.next(), chars.next()) {
                (Some(c), Some(next))
                    if c.is_ascii_lowercase()
                        && next.is_ascii_uppercase()
                        && state_from_letter(c).is_some() =>
                {
                    (state_from_letter(c).unwrap_or(0), &rest[1..])
                }
                _ => (0, rest),
            };
            if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(invalid());
            }
            return Self::new(lookup_z(symbol)?, a, state);
        }

        // Symbol-A or SymbolA, e.g. Tc-99m, Tc99m
        let symbol_end = s.find(|c: char| !c.is_ascii_alphabetic()).ok_or_else(invalid)?;
        if symbol_end == 0 {
            return Err(invalid());
        }
        let symbol = &s[..symbol_end];
        let rest = s[symbol_end..].strip_prefix('-').unwrap_or(&s[symbol_end..]);
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        if digits_end == 0 {
            return Err(invalid());
        }
        let a = parse_mass_number(&rest[..digits_end], input)?;
        let suffix = &rest[digits_end..];
        let state = match suffix.chars().count() {
            0 => 0,
            1 => suffix
                .chars()
                .next()
                .and_then(state_from_letter)
                .ok_or_else(invalid)?,
            _ => return Err(invalid()),
        };
        Self::new(lookup_z(symbol)?, a, state)
    }
}

impl fmt::Display for NuclideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{}-{}{}", self.symbol(), self.a(), state_suffix(self.state())))
    }
}

impl TryFrom<u32> for NuclideId {
    type Error = NuclideError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        Self::from_canonical(id)
    }
}

impl From<NuclideId> for u32 {
    fn from(id: NuclideId) -> Self {
        id.0
    }
}
