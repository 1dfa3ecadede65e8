//! Nuclear data model shared by every crate.

use std::collections::BTreeMap;
use std::f64::consts::LN_2;

use serde::{Deserialize, Serialize};

use crate::nuclide::NuclideId;
use crate::units::TimeUnit;

/// One decay branch from a parent to a progeny nuclide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progeny {
    /// Progeny nuclide.
    pub id: NuclideId,
    /// Fraction of parent decays producing this progeny, in `[0, 1]`.
    pub branching_fraction: f64,
    /// Decay mode label, e.g. `β-`, `α`, `IT`, `EC`.
    pub mode: String,
}

/// Immutable nuclear data for one species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nuclide {
    pub id: NuclideId,
    /// Decay constant λ in s⁻¹. Zero for stable nuclides.
    pub decay_constant: f64,
    /// Atomic mass in g/mol.
    pub atomic_mass: f64,
    /// Decay branches in dataset order.
    pub progeny: Vec<Progeny>,
    /// Energy released per decay in eV, keyed by decay mode.
    #[serde(default)]
    pub decay_energy: BTreeMap<String, f64>,
}

impl Nuclide {
    /// Build a nuclide from a half-life in seconds (`None` for stable).
    pub fn from_half_life(
        id: NuclideId,
        half_life_seconds: Option<f64>,
        atomic_mass: f64,
        progeny: Vec<Progeny>,
    ) -> Self {
        let decay_constant = match half_life_seconds {
            Some(t) => LN_2 / t,
            None => 0.0,
        };
        Self {
            id,
            decay_constant,
            atomic_mass,
            progeny,
            decay_energy: BTreeMap::new(),
        }
    }

    pub fn with_decay_energy(mut self, decay_energy: BTreeMap<String, f64>) -> Self {
        self.decay_energy = decay_energy;
        self
    }

    pub fn is_stable(&self) -> bool {
        self.decay_constant == 0.0
    }

    /// Half-life in seconds; infinite for stable nuclides.
    pub fn half_life(&self) -> f64 {
        if self.is_stable() {
            f64::INFINITY
        } else {
            LN_2 / self.decay_constant
        }
    }

    /// Half-life in the longest time unit where it is at least one, e.g.
    /// `3.8235 d` or `1.248 Gy`. Stable nuclides read `stable`.
    pub fn readable_half_life(&self, year_days: f64) -> String {
        if self.is_stable() {
            return "stable".to_string();
        }
        let (value, unit) = TimeUnit::readable(self.half_life(), year_days);
        let digits = format!("{value:.4}");
        let digits = digits.trim_end_matches('0').trim_end_matches('.');
        format!("{digits} {unit}")
    }

    /// Branching-weighted energy per decay in eV. Modes with no tabulated
    /// energy contribute nothing.
    pub fn mean_decay_energy(&self) -> f64 {
        self.progeny
            .iter()
            .map(|p| p.branching_fraction * self.decay_energy.get(&p.mode).copied().unwrap_or(0.0))
            .sum()
    }

    /// Sum of branching fractions over all progeny.
    pub fn total_branching(&self) -> f64 {
        self.progeny.iter().map(|p| p.branching_fraction).sum()
    }

    /// The branch leading to `progeny`, if any.
    pub fn branch_to(&self, progeny: NuclideId) -> Option<&Progeny> {
        self.progeny.iter().find(|p| p.id == progeny)
    }
}
