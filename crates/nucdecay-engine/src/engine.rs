//! Decay solver implementing the [`DecaySolver`] trait.
//!
//! Evaluates the closed-form solution
//!
//! ```text
//! N(t) = C · diag(e^{-λt}) · C⁻¹ · N(0)
//! ```
//!
//! as three sparse steps: project onto the eigenbasis, scale each component
//! by its decay factor, and map back. One generic engine serves both numeric
//! strategies; results leave the engine as `f64`.

use nucdecay_core::{DecayError, DecayFactor, DecayScalar, DecaySolver, ExpBudget};
use tracing::{debug, warn};

use crate::builder::Decomposition;

/// Decay solver over one [`Decomposition`].
#[derive(Debug, Clone, Copy)]
pub struct DecayEngine<'a, N> {
    decomposition: &'a Decomposition<N>,
    /// log10 of the largest |C_ji| in each column of C.
    column_scale: &'a [f64],
    sig_figs: u32,
}

/// Eigenbasis components after scaling by their decay factors.
struct Evolved<N> {
    components: Vec<N>,
    /// Components whose factor overflowed, with the sign of their coefficient.
    saturated: Vec<(usize, bool)>,
}

impl<'a, N: DecayScalar> DecayEngine<'a, N> {
    pub fn new(decomposition: &'a Decomposition<N>, column_scale: &'a [f64], sig_figs: u32) -> Self {
        Self {
            decomposition,
            column_scale,
            sig_figs,
        }
    }

    pub fn sig_figs(&self) -> u32 {
        self.sig_figs
    }

    pub fn decomposition(&self) -> &'a Decomposition<N> {
        self.decomposition
    }

    fn check_time(t: f64) -> Result<(), DecayError> {
        if !t.is_finite() {
            return Err(DecayError::InvalidTime(t));
        }
        if t < 0.0 {
            warn!(t, "decay: negative time is numerically unstable");
        }
        Ok(())
    }

    fn check_len(&self, len: usize) -> Result<(), DecayError> {
        let expected = self.decomposition.dim();
        if len != expected {
            return Err(DecayError::DimensionMismatch { expected, got: len });
        }
        Ok(())
    }

    fn lift(&self, initial: &[f64]) -> Result<Vec<N>, DecayError> {
        self.check_len(initial.len())?;
        initial
            .iter()
            .map(|&x| N::try_from_f64(x).ok_or(DecayError::NotRepresentable(x)))
            .collect()
    }

    /// `C⁻¹ · N(0)`: coefficients of the initial state in the eigenbasis.
    pub fn project(&self, initial: &[N]) -> Vec<N> {
        self.decomposition.c_inv.mul_vec(initial)
    }

    fn evolve(&self, coefficients: &[N], t: f64) -> Evolved<N> {
        let mut components = Vec::with_capacity(coefficients.len());
        let mut saturated = Vec::new();
        for (i, y) in coefficients.iter().enumerate() {
            if y.is_zero() {
                components.push(N::zero());
                continue;
            }
            let budget = ExpBudget {
                sig_figs: self.sig_figs,
                magnitude_log10: self.column_scale.get(i).copied().unwrap_or(0.0) + y.log10_abs(),
            };
            match N::decay_factor(&self.decomposition.decay_consts[i], t, &budget) {
                DecayFactor::Value(f) => components.push(y.clone() * f),
                DecayFactor::Negligible => components.push(N::zero()),
                DecayFactor::Unbounded => {
                    saturated.push((i, y.sign_negative()));
                    components.push(N::zero());
                }
            }
        }
        Evolved {
            components,
            saturated,
        }
    }

    /// Map evolved components back and cast to `f64`, saturating overflowed terms.
    fn finish(&self, evolved: Evolved<N>) -> Vec<f64> {
        let mut out: Vec<f64> = self
            .decomposition
            .c
            .mul_vec(&evolved.components)
            .iter()
            .map(N::as_f64)
            .collect();
        if !evolved.saturated.is_empty() {
            warn!(
                terms = evolved.saturated.len(),
                precision = N::LABEL,
                "decay: decay factor overflow, affected outputs saturate"
            );
        }
        for (i, negative) in evolved.saturated {
            for (j, c_ji) in self.decomposition.c.column(i) {
                let inf = if negative != c_ji.sign_negative() {
                    f64::NEG_INFINITY
                } else {
                    f64::INFINITY
                };
                out[j] = if out[j].is_nan() || (out[j].is_infinite() && out[j] != inf) {
                    f64::NAN
                } else {
                    inf
                };
            }
        }
        out
    }

    /// Decay an exact initial vector and keep the result in `N`.
    ///
    /// Fails with [`DecayError::Overflow`] when a decay factor is too large to
    /// materialise.
    pub fn decay_exact(&self, initial: &[N], t: f64) -> Result<Vec<N>, DecayError> {
        Self::check_time(t)?;
        self.check_len(initial.len())?;
        if t == 0.0 {
            return Ok(initial.to_vec());
        }
        let evolved = self.evolve(&self.project(initial), t);
        if !evolved.saturated.is_empty() {
            return Err(DecayError::Overflow(t));
        }
        Ok(self.decomposition.c.mul_vec(&evolved.components))
    }
}

impl<N: DecayScalar> DecaySolver for DecayEngine<'_, N> {
    fn len(&self) -> usize {
        self.decomposition.dim()
    }

    fn precision_label(&self) -> &'static str {
        N::LABEL
    }

    /// `t == 0` returns the input unchanged rather than round-tripping it
    /// through `C·C⁻¹`.
    fn decay(&self, initial: &[f64], t: f64) -> Result<Vec<f64>, DecayError> {
        Self::check_time(t)?;
        let input = initial;
        let initial = self.lift(initial)?;
        if t == 0.0 {
            return Ok(input.to_vec());
        }
        debug!(t, precision = N::LABEL, sig_figs = self.sig_figs, "decay: evaluating");
        let coefficients = self.project(&initial);
        Ok(self.finish(self.evolve(&coefficients, t)))
    }

    /// Projects onto the eigenbasis once and reuses it for every time point.
    fn decay_series(&self, initial: &[f64], times: &[f64]) -> Result<Vec<Vec<f64>>, DecayError> {
        for &t in times {
            Self::check_time(t)?;
        }
        let input = initial;
        let initial = self.lift(initial)?;
        debug!(points = times.len(), precision = N::LABEL, "decay: evaluating series");
        let coefficients = self.project(&initial);
        Ok(times
            .iter()
            .map(|&t| {
                if t == 0.0 {
                    input.to_vec()
                } else {
                    self.finish(self.evolve(&coefficients, t))
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DecayMatrixBuilder;
    use crate::index::NuclideIndex;
    use crate::store::DualPrecisionStore;
    use nucdecay_core::{BigRational, Nuclide, NuclideId, Progeny};
    use proptest::prelude::*;
    use std::f64::consts::LN_2;

    fn id(s: &str) -> NuclideId {
        s.parse().unwrap()
    }

    fn nuc(name: &str, half_life: Option<f64>, progeny: &[(&str, f64)]) -> Nuclide {
        Nuclide::from_half_life(
            id(name),
            half_life,
            1.0,
            progeny
                .iter()
                .map(|(p, b)| Progeny {
                    id: id(p),
                    branching_fraction: *b,
                    mode: String::new(),
                })
                .collect(),
        )
    }

    fn store(nuclides: Vec<Nuclide>) -> (DualPrecisionStore, NuclideIndex) {
        let index = NuclideIndex::build(&nuclides).unwrap();
        let mut sorted = nuclides;
        sorted.sort_by_key(|n| index.position(n.id).unwrap());
        let builder = DecayMatrixBuilder::new(&sorted, &index).unwrap();
        (DualPrecisionStore::build(&builder).unwrap(), index)
    }

    fn rn_po() -> (DualPrecisionStore, NuclideIndex) {
        store(vec![
            nuc("Rn-222", Some(330_350.4), &[("Po-218", 1.0)]),
            nuc("Po-218", Some(185.88), &[("Pb-214", 1.0)]),
            nuc("Pb-214", None, &[]),
        ])
    }

    fn rel(a: f64, b: f64) -> f64 {
        (a - b).abs() / b.abs().max(f64::MIN_POSITIVE)
    }

    #[test]
    fn single_nuclide_exponential() {
        let (s, _) = store(vec![nuc("Cs-137", Some(9.5e8), &[])]);
        let engine = s.fixed_engine();
        for t in [0.0, 1.0e6, 9.5e8, 5.0e9] {
            let out = engine.decay(&[1.0e20], t).unwrap();
            let expected = 1.0e20 * (-LN_2 / 9.5e8 * t).exp();
            assert!(rel(out[0], expected) < 1e-12, "t = {t}");
        }
    }

    #[test]
    fn zero_time_is_identity() {
        let (s, index) = rn_po();
        let mut n0 = vec![0.0; 3];
        n0[index.position(id("Rn-222")).unwrap()] = 1.0e12;
        n0[index.position(id("Pb-214")).unwrap()] = 5.0;
        let out = s.fixed_engine().decay(&n0, 0.0).unwrap();
        for (a, b) in out.iter().zip(&n0) {
            assert!((a - b).abs() <= 1e-9 * b.abs().max(1.0));
        }
    }

    #[test]
    fn zero_time_in_series_is_identity() {
        let (s, index) = rn_po();
        let mut n0 = vec![0.0; 3];
        n0[index.position(id("Rn-222")).unwrap()] = 1.0e12;
        n0[index.position(id("Pb-214")).unwrap()] = 5.0;
        let rows = s.fixed_engine().decay_series(&n0, &[0.0, 60.0, 0.0]).unwrap();
        assert_eq!(rows[0], n0);
        assert_eq!(rows[2], n0);
        assert!(rows[1][index.position(id("Po-218")).unwrap()] > 0.0);
    }

    #[test]
    fn exact_zero_time_gives_exact_zero_progeny() {
        let (s, index) = rn_po();
        let mut n0 = vec![0.0; 3];
        n0[index.position(id("Rn-222")).unwrap()] = 1.0e12;
        let out = s.exact_engine(320).decay(&n0, 0.0).unwrap();
        assert_eq!(out[index.position(id("Po-218")).unwrap()], 0.0);
        assert_eq!(out[index.position(id("Pb-214")).unwrap()], 0.0);
        assert_eq!(out[index.position(id("Rn-222")).unwrap()], 1.0e12);
    }

    #[test]
    fn stable_progeny_conserves_atoms() {
        let (s, _) = store(vec![nuc("H-3", Some(3.888e8), &[("He-3", 1.0)]), nuc("He-3", None, &[])]);
        for t in [1.0, 1.0e8, 1.0e9, 1.0e10] {
            let out = s.fixed_engine().decay(&[1.0e18, 0.0], t).unwrap();
            assert!(rel(out[0] + out[1], 1.0e18) < 1e-12);
        }
    }

    #[test]
    fn precisions_agree() {
        let (s, index) = rn_po();
        let mut n0 = vec![0.0; 3];
        n0[index.position(id("Rn-222")).unwrap()] = 1.0e15;
        for t in [10.0, 1.0e4, 3.0e5, 1.0e6] {
            let fixed = s.fixed_engine().decay(&n0, t).unwrap();
            let exact = s.exact_engine(60).decay(&n0, t).unwrap();
            for (f, e) in fixed.iter().zip(&exact) {
                if e.abs() > 1e-3 {
                    assert!(rel(*f, *e) < 1e-7, "t = {t}: {f} vs {e}");
                }
            }
        }
    }

    #[test]
    fn exact_round_trip_within_digit_budget() {
        let (s, _) = rn_po();
        let engine = s.exact_engine(120);
        let n0: Vec<BigRational> = [1.0e12, 3.0e9, 7.0]
            .iter()
            .map(|x| BigRational::try_from_f64(*x).unwrap())
            .collect();
        let forward = engine.decay_exact(&n0, 5.0e4).unwrap();
        let back = engine.decay_exact(&forward, -5.0e4).unwrap();
        let tol = BigRational::try_from_f64(1e-90).unwrap();
        for (b, a) in back.iter().zip(&n0) {
            let diff = (b.clone() - a.clone()) / a.clone();
            let diff = if diff.sign_negative() { -diff } else { diff };
            assert!(diff < tol);
        }
    }

    #[test]
    fn series_matches_pointwise() {
        let (s, _) = rn_po();
        let engine = s.fixed_engine();
        let n0 = [1.0e10, 0.0, 0.0];
        let times = [0.0, 100.0, 1.0e5];
        let series = engine.decay_series(&n0, &times).unwrap();
        for (row, t) in series.iter().zip(times) {
            assert_eq!(row, &engine.decay(&n0, t).unwrap());
        }
    }

    #[test]
    fn rejects_bad_inputs() {
        let (s, _) = rn_po();
        let engine = s.fixed_engine();
        assert!(matches!(engine.decay(&[1.0], 1.0), Err(DecayError::DimensionMismatch { expected: 3, got: 1 })));
        assert!(matches!(engine.decay(&[1.0, 0.0, 0.0], f64::NAN), Err(DecayError::InvalidTime(_))));
        assert!(matches!(engine.decay(&[f64::INFINITY, 0.0, 0.0], 1.0), Err(DecayError::NotRepresentable(_))));
    }

    #[test]
    fn negative_time_is_permitted() {
        let (s, _) = store(vec![nuc("Cs-137", Some(9.5e8), &[])]);
        let out = s.fixed_engine().decay(&[1.0], -9.5e8).unwrap();
        assert!((out[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn exact_overflow_saturates_like_fixed() {
        let (s, _) = store(vec![nuc("Po-212", Some(3.0e-7), &[])]);
        let fixed = s.fixed_engine().decay(&[1.0], -1.0).unwrap();
        let exact = s.exact_engine(30).decay(&[1.0], -1.0).unwrap();
        assert_eq!(fixed[0], f64::INFINITY);
        assert_eq!(exact[0], f64::INFINITY);
        let n0 = [BigRational::try_from_f64(1.0).unwrap()];
        assert!(matches!(s.exact_engine(30).decay_exact(&n0, -1.0), Err(DecayError::Overflow(_))));
    }

    #[test]
    fn exact_underflow_is_zero() {
        let (s, _) = store(vec![nuc("Po-212", Some(3.0e-7), &[]), nuc("Pb-208", None, &[])]);
        let out = s.exact_engine(30).decay(&[1.0, 2.0], 1.0e3).unwrap();
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], 2.0);
    }

    proptest! {
        #[test]
        fn two_member_chain_conserves(t in 0.0f64..1.0e7, n in 1.0f64..1.0e20) {
            let (s, index) = store(vec![nuc("Sr-90", Some(9.1e8), &[("Y-90", 1.0)]), nuc("Y-90", Some(230_400.0), &[("Zr-90", 1.0)]), nuc("Zr-90", None, &[])]);
            let mut n0 = vec![0.0; 3];
            n0[index.position(id("Sr-90")).unwrap()] = n;
            let out = s.fixed_engine().decay(&n0, t).unwrap();
            let total: f64 = out.iter().sum();
            prop_assert!(rel(total, n) < 1e-10);
        }
    }
}
