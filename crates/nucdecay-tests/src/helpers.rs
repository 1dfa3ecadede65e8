//! Shared fixtures for integration tests.

use std::sync::Arc;

use nucdecay_core::constants::DEFAULT_YEAR_DAYS;
use nucdecay_core::{Nuclide, NuclideId, Progeny};
use nucdecay_engine::DecayDataset;

/// The bundled sample dataset: H-3, C-14, K-40, the Cs-137 and Mo-99
/// chains, and U-238 down to Pb-206.
pub const SAMPLE_JSON: &str = include_str!("../../../data/sample.json");

pub fn sample_dataset() -> Arc<DecayDataset> {
    Arc::new(DecayDataset::from_json(SAMPLE_JSON).unwrap())
}

pub fn id(name: &str) -> NuclideId {
    name.parse().unwrap()
}

/// Relative difference of `a` from `b`.
pub fn rel_err(a: f64, b: f64) -> f64 {
    if b == 0.0 {
        a.abs()
    } else {
        ((a - b) / b).abs()
    }
}

/// Decay constant for a half-life in seconds.
pub fn lambda(half_life: f64) -> f64 {
    std::f64::consts::LN_2 / half_life
}

/// Synthetic ids for chain members: Hg isotopes with descending mass number.
pub fn chain_id(i: usize) -> NuclideId {
    NuclideId::new(80, 240 - i as u32, 0).unwrap()
}

/// A linear chain where member `i` decays fully into member `i + 1`.
/// `None` marks a stable member (it must be last).
pub fn linear_chain(half_lives: &[Option<f64>]) -> Vec<Nuclide> {
    half_lives
        .iter()
        .enumerate()
        .map(|(i, hl)| {
            let progeny = match hl {
                Some(_) if i + 1 < half_lives.len() => vec![Progeny {
                    id: chain_id(i + 1),
                    branching_fraction: 1.0,
                    mode: "β-".to_string(),
                }],
                _ => vec![],
            };
            Nuclide::from_half_life(chain_id(i), *hl, 200.0, progeny)
        })
        .collect()
}

pub fn chain_dataset(name: &str, half_lives: &[Option<f64>]) -> Result<DecayDataset, nucdecay_core::DatasetError> {
    DecayDataset::from_nuclides(name, DEFAULT_YEAR_DAYS, linear_chain(half_lives))
}

/// Closed-form atoms of the second member of a two-member chain
/// starting from `n0` atoms of the parent.
pub fn bateman_daughter(n0: f64, branch: f64, l1: f64, l2: f64, t: f64) -> f64 {
    branch * n0 * l1 / (l2 - l1) * ((-l1 * t).exp() - (-l2 * t).exp())
}
