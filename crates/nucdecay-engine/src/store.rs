//! Both precisions of a dataset's decomposition, built once and shared.

use nucdecay_core::{BigRational, DatasetError, DecayScalar};

use crate::builder::{DecayMatrixBuilder, Decomposition};
use crate::engine::DecayEngine;

/// Λ, C and C⁻¹ in `f64` and in exact rationals.
///
/// The two sets are built independently from the same λ and branching
/// values; the exact set uses the exact rational value of each `f64` input.
#[derive(Debug, Clone, PartialEq)]
pub struct DualPrecisionStore {
    fixed: Decomposition<f64>,
    exact: Decomposition<BigRational>,
    fixed_scale: Vec<f64>,
    exact_scale: Vec<f64>,
}

impl DualPrecisionStore {
    pub fn build(builder: &DecayMatrixBuilder<'_>) -> Result<Self, DatasetError> {
        let fixed = builder.build::<f64>()?;
        let exact = builder.build::<BigRational>()?;
        Self::from_parts(fixed, exact)
    }

    /// Assemble a store from decompositions built elsewhere (e.g. a cache).
    pub fn from_parts(
        fixed: Decomposition<f64>,
        exact: Decomposition<BigRational>,
    ) -> Result<Self, DatasetError> {
        fixed.validate().map_err(DatasetError::CacheMismatch)?;
        exact.validate().map_err(DatasetError::CacheMismatch)?;
        if fixed.dim() != exact.dim() {
            return Err(DatasetError::CacheMismatch(format!(
                "fixed dimension {} differs from exact dimension {}",
                fixed.dim(),
                exact.dim()
            )));
        }
        let fixed_scale = fixed.c.column_max_log10();
        let exact_scale = exact.c.column_max_log10();
        Ok(Self {
            fixed,
            exact,
            fixed_scale,
            exact_scale,
        })
    }

    pub fn dim(&self) -> usize {
        self.fixed.dim()
    }

    pub fn fixed(&self) -> &Decomposition<f64> {
        &self.fixed
    }

    pub fn exact(&self) -> &Decomposition<BigRational> {
        &self.exact
    }

    /// Solver over the `f64` matrices.
    pub fn fixed_engine(&self) -> DecayEngine<'_, f64> {
        DecayEngine::new(&self.fixed, &self.fixed_scale, f64::DIGITS)
    }

    /// Solver over the exact matrices, with exponentials to `sig_figs` digits.
    pub fn exact_engine(&self, sig_figs: u32) -> DecayEngine<'_, BigRational> {
        DecayEngine::new(&self.exact, &self.exact_scale, sig_figs.max(1))
    }

    /// Decay constants as `f64`, in topological order.
    pub fn decay_constants(&self) -> Vec<f64> {
        self.fixed.decay_consts.clone()
    }

    /// Consistency check between the two precisions: the exact decay
    /// constants must round to the fixed ones.
    pub fn precisions_agree(&self) -> bool {
        self.fixed
            .decay_consts
            .iter()
            .zip(&self.exact.decay_consts)
            .all(|(f, e)| e.as_f64() == *f)
    }
}
