//! Trait interfaces between the nucdecay crates.
//!
//! - [`DecaySolver`]: evaluates `N(t)` for a dataset (nucdecay-engine implements
//!   it once per numeric strategy)

use crate::error::DecayError;

/// Evaluation of the closed-form decay solution on dense atom-count vectors.
///
/// Vectors are indexed by the dataset's topological nuclide order and always
/// cross this boundary as `f64`, whatever precision is used internally.
pub trait DecaySolver: Send + Sync {
    /// Number of nuclides in the underlying dataset.
    fn len(&self) -> usize;

    /// True when the dataset holds no nuclides.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short name of the numeric strategy, for logs.
    fn precision_label(&self) -> &'static str;

    /// Atom counts after `t` seconds. Negative `t` decays backwards.
    fn decay(&self, initial: &[f64], t: f64) -> Result<Vec<f64>, DecayError>;

    /// Atom counts at each time in `times` (seconds).
    ///
    /// Default implementation calls [`decay`](Self::decay) per time point.
    fn decay_series(&self, initial: &[f64], times: &[f64]) -> Result<Vec<Vec<f64>>, DecayError> {
        times.iter().map(|&t| self.decay(initial, t)).collect()
    }
}
