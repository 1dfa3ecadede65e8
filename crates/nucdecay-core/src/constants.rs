//! Physical constants and solver defaults.
//!
//! Exact physical constants are stored as decimal `(mantissa, exponent)` pairs so
//! that both numeric strategies can materialise them without rounding.

/// Avogadro constant (mol⁻¹), exact since the 2019 SI redefinition: 6.02214076 × 10²³.
pub const AVOGADRO_MANTISSA: i64 = 602_214_076;
/// Decimal exponent paired with [`AVOGADRO_MANTISSA`].
pub const AVOGADRO_EXP10: i32 = 15;
/// Avogadro constant as an `f64`.
pub const AVOGADRO: f64 = 6.022_140_76e23;

/// One curie in becquerel: 3.7 × 10¹⁰.
pub const CURIE_MANTISSA: i64 = 37;
/// Decimal exponent paired with [`CURIE_MANTISSA`].
pub const CURIE_EXP10: i32 = 9;

/// One electronvolt in joules (exact since 2019).
pub const EV_TO_JOULE: f64 = 1.602_176_634e-19;

/// Seconds in one day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Default number of days in a year (mean tropical year).
///
/// ```
/// use nucdecay_core::constants::DEFAULT_YEAR_DAYS;
/// assert!((DEFAULT_YEAR_DAYS - 365.2422).abs() < 1e-12);
/// ```
pub const DEFAULT_YEAR_DAYS: f64 = 365.2422;

/// Default significant-figure budget for the high-precision solver.
pub const DEFAULT_SIG_FIGS: u32 = 320;

/// Terms whose base-10 magnitude bound falls below this are dropped by the
/// high-precision solver. Far below the smallest subnormal `f64`.
pub const UNDERFLOW_LOG10: f64 = -400.0;

/// Exponentials above `10^OVERFLOW_LOG10` are not materialised by the
/// high-precision solver; affected outputs saturate to infinity.
pub const OVERFLOW_LOG10: f64 = 10_000.0;

/// Tolerance on the sum of branching fractions leaving one parent.
pub const BRANCHING_TOLERANCE: f64 = 1e-6;

/// Multiplier of Z in the canonical nuclide id.
pub const ID_Z_FACTOR: u32 = 10_000_000;
/// Multiplier of A in the canonical nuclide id.
pub const ID_A_FACTOR: u32 = 10_000;
/// Highest metastable state with a letter suffix (`m` = 1, `n` = 2).
pub const MAX_METASTABLE_STATE: u16 = 2;

/// Element symbols indexed by `Z - 1`.
pub const ELEMENT_SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

/// Atomic number for an element symbol (case-sensitive), if known.
pub fn atomic_number(symbol: &str) -> Option<u32> {
    ELEMENT_SYMBOLS
        .iter()
        .position(|s| *s == symbol)
        .map(|i| i as u32 + 1)
}

/// Element symbol for an atomic number in `1..=118`.
pub fn element_symbol(z: u32) -> Option<&'static str> {
    if z == 0 {
        return None;
    }
    ELEMENT_SYMBOLS.get(z as usize - 1).copied()
}
