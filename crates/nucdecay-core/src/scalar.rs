//! Numeric strategy for the decay solver.
//!
//! [`DecayScalar`] abstracts over the two precisions the solver runs in:
//! `f64` for fast fixed-precision work and [`BigRational`](crate::BigRational)
//! for exact matrix arithmetic with exponentials evaluated to a digit budget.
//! The matrix builder, the solver and the quantity converter are all written
//! once against this trait.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use num_traits::{One, Zero};

/// Inputs to the evaluation of one decay factor `e^{-λt}`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpBudget {
    /// Significant digits to carry (ignored by `f64`).
    pub sig_figs: u32,
    /// Base-10 magnitude bound of everything the factor will be multiplied by.
    pub magnitude_log10: f64,
}

/// Outcome of evaluating `e^{-λt}`.
#[derive(Debug, Clone, PartialEq)]
pub enum DecayFactor<N> {
    /// The factor, to the precision of the strategy.
    Value(N),
    /// Too small to affect any `f64` output; treated as zero.
    Negligible,
    /// Too large to materialise; outputs it feeds saturate to infinity.
    Unbounded,
}

/// Arithmetic needed by the decay-chain solver.
pub trait DecayScalar:
    Clone
    + fmt::Debug
    + PartialEq
    + Send
    + Sync
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// Short name used in log output.
    const LABEL: &'static str;

    /// Convert from `f64`. Exact for the rational strategy. `None` for NaN or infinity.
    fn try_from_f64(value: f64) -> Option<Self>;

    /// `mantissa × 10^exp10`, exact for the rational strategy.
    fn from_decimal(mantissa: i64, exp10: i32) -> Self;

    /// Nearest `f64`.
    fn as_f64(&self) -> f64;

    /// True when strictly below zero.
    fn sign_negative(&self) -> bool;

    /// Approximate `log10(|self|)`; negative infinity for zero.
    fn log10_abs(&self) -> f64;

    /// Evaluate `e^{-λt}`.
    fn decay_factor(lambda: &Self, t: f64, budget: &ExpBudget) -> DecayFactor<Self>;
}

impl DecayScalar for f64 {
    const LABEL: &'static str = "f64";

    fn try_from_f64(value: f64) -> Option<Self> {
        value.is_finite().then_some(value)
    }

    fn from_decimal(mantissa: i64, exp10: i32) -> Self {
        // Parsing gives the correctly rounded value.
        format!("{mantissa}e{exp10}")
            .parse()
            .unwrap_or_else(|_| mantissa as f64 * 10f64.powi(exp10))
    }

    fn as_f64(&self) -> f64 {
        *self
    }

    fn sign_negative(&self) -> bool {
        *self < 0.0
    }

    fn log10_abs(&self) -> f64 {
        self.abs().log10()
    }

    fn decay_factor(lambda: &Self, t: f64, _budget: &ExpBudget) -> DecayFactor<Self> {
        if *lambda == 0.0 || t == 0.0 {
            return DecayFactor::Value(1.0);
        }
        DecayFactor::Value((-lambda * t).exp())
    }
}
