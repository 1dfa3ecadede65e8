//! Arbitrary-precision strategy: exact rationals plus a digit-budgeted exponential.
//!
//! Matrix entries, inputs and unit factors are exact [`BigRational`] values.
//! The only inexact step is `e^x`, which is computed to a requested number of
//! significant digits and then carried as an exact rational.
//!
//! The exponential uses argument halving, a fixed-point Taylor series and
//! repeated squaring. Squaring `s` times loses about `s·log10(2)` digits, so
//! that many guard digits are added on top of the budget.

use std::f64::consts::{LN_10, LOG10_2};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::constants::{OVERFLOW_LOG10, UNDERFLOW_LOG10};
use crate::scalar::{DecayFactor, DecayScalar, ExpBudget};

/// Guard digits carried beyond the budget before squaring losses are added.
const BASE_GUARD_DIGITS: u32 = 10;

/// Halving stops once the reduced argument is at most `2^-8`.
const REDUCED_ARG_LOG2: i64 = 8;

fn pow10(n: u32) -> BigInt {
    BigInt::from(10u32).pow(n)
}

/// Decimal floating-point value `mantissa × 10^exponent`.
#[derive(Debug, Clone)]
struct DecimalFloat {
    mantissa: BigInt,
    exponent: i64,
}

impl DecimalFloat {
    fn square(&self) -> Self {
        Self {
            mantissa: &self.mantissa * &self.mantissa,
            exponent: self.exponent * 2,
        }
    }

    /// Truncate the mantissa to roughly `digits` significant digits.
    fn shrink(mut self, digits: u32) -> Self {
        let bits = self.mantissa.bits();
        if bits == 0 {
            return self;
        }
        let approx_digits = (bits as f64 * LOG10_2).floor() as i64 + 1;
        let excess = approx_digits - i64::from(digits);
        if excess > 0 {
            self.mantissa /= pow10(excess as u32);
            self.exponent += excess;
        }
        self
    }

    fn into_rational(self) -> BigRational {
        if self.exponent >= 0 {
            BigRational::from_integer(self.mantissa * pow10(self.exponent as u32))
        } else {
            BigRational::new(self.mantissa, pow10(self.exponent.unsigned_abs() as u32))
        }
    }
}

/// `e^x` for exact rational `x`, rounded to about `sig_figs` significant digits.
///
/// Exactly one for `x = 0`. The caller bounds `|x|`; see [`OVERFLOW_LOG10`].
pub fn exp_rational(x: &BigRational, sig_figs: u32) -> BigRational {
    if x.is_zero() {
        return BigRational::one();
    }

    let magnitude = rational_to_f64(x).abs();
    let halvings = if magnitude > (-(REDUCED_ARG_LOG2 as f64)).exp2() {
        (magnitude.log2().ceil().min(4096.0) as i64 + REDUCED_ARG_LOG2).max(0) as u32
    } else {
        0
    };
    let digits = sig_figs + BASE_GUARD_DIGITS + (f64::from(halvings) * LOG10_2).ceil() as u32;
    let scale = pow10(digits);

    // r = x / 2^halvings in fixed point with `digits` decimals
    let r = (x.numer() * &scale) / (x.denom() << halvings as usize);

    let mut term = scale.clone();
    let mut sum = scale.clone();
    let mut k = 1u32;
    loop {
        term = (&term * &r) / (&scale * BigInt::from(k));
        if term.is_zero() {
            break;
        }
        sum += &term;
        k += 1;
    }

    let mut value = DecimalFloat {
        mantissa: sum,
        exponent: -i64::from(digits),
    };
    for _ in 0..halvings {
        value = value.square().shrink(digits);
    }
    value.shrink(sig_figs).into_rational()
}

/// Split a non-zero rational into `mantissa × 2^shift` with a 64-bit mantissa.
fn split_pow2(value: &BigRational) -> (f64, i64) {
    let numer = value.numer();
    let denom = value.denom();
    let shift = numer.bits() as i64 - denom.bits() as i64 - 64;
    let quotient = if shift >= 0 {
        numer / (denom << shift as usize)
    } else {
        (numer << shift.unsigned_abs() as usize) / denom
    };
    (quotient.to_f64().unwrap_or(0.0), shift)
}

/// Nearest `f64` to an exact rational, saturating to infinity or zero.
pub fn rational_to_f64(value: &BigRational) -> f64 {
    if value.is_zero() {
        return 0.0;
    }
    let (mantissa, shift) = split_pow2(value);
    scale_pow2(mantissa, shift)
}

fn scale_pow2(mut x: f64, mut exp: i64) -> f64 {
    const STEP: i64 = 1000;
    while exp > STEP && x.is_finite() {
        x *= 2f64.powi(STEP as i32);
        exp -= STEP;
    }
    while exp < -STEP && x != 0.0 {
        x *= 2f64.powi(-STEP as i32);
        exp += STEP;
    }
    x * 2f64.powi(exp as i32)
}

impl DecayScalar for BigRational {
    const LABEL: &'static str = "rational";

    fn try_from_f64(value: f64) -> Option<Self> {
        BigRational::from_float(value)
    }

    fn from_decimal(mantissa: i64, exp10: i32) -> Self {
        let m = BigInt::from(mantissa);
        if exp10 >= 0 {
            BigRational::from_integer(m * pow10(exp10 as u32))
        } else {
            BigRational::new(m, pow10(exp10.unsigned_abs()))
        }
    }

    fn as_f64(&self) -> f64 {
        rational_to_f64(self)
    }

    fn sign_negative(&self) -> bool {
        Signed::is_negative(self)
    }

    fn log10_abs(&self) -> f64 {
        if self.is_zero() {
            return f64::NEG_INFINITY;
        }
        let (mantissa, shift) = split_pow2(self);
        mantissa.abs().log10() + shift as f64 * LOG10_2
    }

    fn decay_factor(lambda: &Self, t: f64, budget: &ExpBudget) -> DecayFactor<Self> {
        if lambda.is_zero() || t == 0.0 {
            return DecayFactor::Value(Self::one());
        }
        // log10(e^{-λt})
        let estimate = -(lambda.as_f64() * t) / LN_10;
        if estimate + budget.magnitude_log10 < UNDERFLOW_LOG10 {
            return DecayFactor::Negligible;
        }
        if estimate > OVERFLOW_LOG10 {
            return DecayFactor::Unbounded;
        }
        let Some(time) = Self::try_from_f64(t) else {
            return DecayFactor::Unbounded;
        };
        let exponent = -(lambda * &time);
        DecayFactor::Value(exp_rational(&exponent, budget.sig_figs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const E_50_DIGITS: &str = "27182818284590452353602874713526624977572470936999";

    fn rat(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    fn relative_error(a: &BigRational, b: &BigRational) -> BigRational {
        ((a - b) / b).abs()
    }

    fn tolerance(digits: u32) -> BigRational {
        BigRational::new(BigInt::one(), pow10(digits))
    }

    #[test]
    fn exp_zero_is_exactly_one() {
        assert_eq!(exp_rational(&BigRational::zero(), 320), BigRational::one());
    }

    #[test]
    fn exp_one_matches_reference_digits() {
        let e = exp_rational(&BigRational::one(), 60);
        let reference = BigRational::new(E_50_DIGITS.parse::<BigInt>().unwrap(), pow10(49));
        assert!(relative_error(&e, &reference) < tolerance(48));
    }

    #[test]
    fn exp_of_negation_is_reciprocal() {
        let x = rat(123_456, 1000);
        let product = exp_rational(&x, 320) * exp_rational(&-x, 320);
        assert!(relative_error(&product, &BigRational::one()) < tolerance(310));
    }

    #[test]
    fn exp_far_below_f64_range() {
        // e^-2000 ~ 10^-868.6, far outside the f64 range.
        let small = exp_rational(&rat(-2000, 1), 50);
        assert!(small > BigRational::zero());
        let log10 = small.log10_abs();
        assert!((log10 + 868.589).abs() < 0.01, "log10 = {log10}");
        let back = small * exp_rational(&rat(2000, 1), 50);
        assert!(relative_error(&back, &BigRational::one()) < tolerance(40));
    }

    #[test]
    fn rational_to_f64_matches_float() {
        for v in [1.0, -2.5, 1e-300, 6.022e23, 3.0e-320, 1.7e308] {
            let r = BigRational::from_float(v).unwrap();
            assert_eq!(rational_to_f64(&r), v);
        }
        assert_eq!(rational_to_f64(&rat(1, 3)), 1.0 / 3.0);
    }

    #[test]
    fn rational_to_f64_saturates() {
        let huge = BigRational::from_integer(pow10(400));
        assert_eq!(rational_to_f64(&huge), f64::INFINITY);
        let tiny = BigRational::new(BigInt::one(), pow10(400));
        assert_eq!(rational_to_f64(&tiny), 0.0);
    }

    #[test]
    fn from_decimal_is_exact() {
        assert_eq!(BigRational::from_decimal(37, 9), BigRational::from_integer(BigInt::from(37_000_000_000i64)));
        assert_eq!(BigRational::from_decimal(25, -2), rat(1, 4));
    }

    #[test]
    fn decay_factor_policies() {
        let lambda = BigRational::one();
        let budget = ExpBudget { sig_figs: 40, magnitude_log10: 0.0 };
        assert_eq!(BigRational::decay_factor(&BigRational::zero(), 5.0, &budget), DecayFactor::Value(BigRational::one()));
        assert_eq!(BigRational::decay_factor(&lambda, 0.0, &budget), DecayFactor::Value(BigRational::one()));
        assert_eq!(BigRational::decay_factor(&lambda, 1.0e4, &budget), DecayFactor::Negligible);
        assert_eq!(BigRational::decay_factor(&lambda, -1.0e5, &budget), DecayFactor::Unbounded);
        // A large magnitude bound keeps an otherwise tiny term alive.
        let wide = ExpBudget { sig_figs: 40, magnitude_log10: 200.0 };
        assert!(matches!(BigRational::decay_factor(&lambda, 800.0, &wide), DecayFactor::Value(_)));
    }

    #[test]
    fn negligible_cutoff_is_absolute() {
        // e^{-900} is about 10^-390.9: kept alone, dropped once scaled below 10^-400.
        let lambda = BigRational::one();
        let unit = ExpBudget { sig_figs: 40, magnitude_log10: 0.0 };
        let small = ExpBudget { sig_figs: 40, magnitude_log10: -20.0 };
        assert!(matches!(BigRational::decay_factor(&lambda, 900.0, &unit), DecayFactor::Value(_)));
        assert_eq!(BigRational::decay_factor(&lambda, 900.0, &small), DecayFactor::Negligible);
        // Dropping depends on the term alone, not on how large the other terms are.
        let huge = ExpBudget { sig_figs: 40, magnitude_log10: 380.0 };
        assert_eq!(BigRational::decay_factor(&lambda, 1800.0, &huge), DecayFactor::Negligible);
    }

    proptest! {
        #[test]
        fn exp_agrees_with_f64(x in -700.0f64..700.0) {
            let exact = BigRational::from_float(x).unwrap();
            let value = rational_to_f64(&exp_rational(&exact, 30));
            let expected = x.exp();
            prop_assert!(((value - expected) / expected).abs() < 1e-13);
        }
    }
}
