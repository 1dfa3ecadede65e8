//! Conversions between atom counts and activity, mass and moles.
//!
//! Generic over [`DecayScalar`]: with [`BigRational`](crate::BigRational) every
//! conversion is exact and its inverse returns the original value exactly.

use crate::constants::{AVOGADRO_EXP10, AVOGADRO_MANTISSA};
use crate::error::QuantityError;
use crate::scalar::DecayScalar;
use crate::types::Nuclide;
use crate::units::QuantityUnit;

/// Stateless converter between atoms and physical quantities.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantityConverter<N> {
    avogadro: N,
}

impl<N: DecayScalar> Default for QuantityConverter<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: DecayScalar> QuantityConverter<N> {
    pub fn new() -> Self {
        Self {
            avogadro: N::from_decimal(AVOGADRO_MANTISSA, AVOGADRO_EXP10),
        }
    }

    pub fn avogadro(&self) -> &N {
        &self.avogadro
    }

    fn decay_constant(nuclide: &Nuclide) -> N {
        N::try_from_f64(nuclide.decay_constant).unwrap_or_else(N::zero)
    }

    fn molar_mass(nuclide: &Nuclide) -> Result<N, QuantityError> {
        if !(nuclide.atomic_mass.is_finite() && nuclide.atomic_mass > 0.0) {
            return Err(QuantityError::UndefinedMass(nuclide.id.to_string()));
        }
        N::try_from_f64(nuclide.atomic_mass)
            .ok_or_else(|| QuantityError::UndefinedMass(nuclide.id.to_string()))
    }

    /// Activity in Bq: `λ·N`.
    pub fn atoms_to_activity(&self, atoms: N, nuclide: &Nuclide) -> N {
        Self::decay_constant(nuclide) * atoms
    }

    /// Atoms from activity in Bq: `A/λ`.
    ///
    /// A stable nuclide only accepts zero activity.
    pub fn activity_to_atoms(&self, activity: N, nuclide: &Nuclide) -> Result<N, QuantityError> {
        let lambda = Self::decay_constant(nuclide);
        if lambda.is_zero() {
            if activity.is_zero() {
                return Ok(N::zero());
            }
            return Err(QuantityError::ActivityOfStable {
                nuclide: nuclide.id.to_string(),
                activity: activity.as_f64(),
            });
        }
        Ok(activity / lambda)
    }

    /// Mass in grams: `M·N/N_a`.
    pub fn atoms_to_mass(&self, atoms: N, nuclide: &Nuclide) -> Result<N, QuantityError> {
        Ok(atoms * Self::molar_mass(nuclide)? / self.avogadro.clone())
    }

    /// Atoms from mass in grams: `m·N_a/M`.
    pub fn mass_to_atoms(&self, grams: N, nuclide: &Nuclide) -> Result<N, QuantityError> {
        Ok(grams * self.avogadro.clone() / Self::molar_mass(nuclide)?)
    }

    pub fn atoms_to_moles(&self, atoms: N) -> N {
        atoms / self.avogadro.clone()
    }

    pub fn moles_to_atoms(&self, moles: N) -> N {
        moles * self.avogadro.clone()
    }

    /// Convert a quantity in `unit` to atoms.
    pub fn to_atoms(&self, value: N, unit: QuantityUnit, nuclide: &Nuclide) -> Result<N, QuantityError> {
        match unit {
            QuantityUnit::Atoms => Ok(value),
            QuantityUnit::Activity(u) => self.activity_to_atoms(value * u.becquerels::<N>(), nuclide),
            QuantityUnit::Mass(u) => self.mass_to_atoms(value * u.grams::<N>(), nuclide),
            QuantityUnit::Moles(u) => Ok(self.moles_to_atoms(value * u.moles::<N>())),
        }
    }

    /// Convert an atom count to a quantity in `unit`.
    pub fn from_atoms(&self, atoms: N, unit: QuantityUnit, nuclide: &Nuclide) -> Result<N, QuantityError> {
        match unit {
            QuantityUnit::Atoms => Ok(atoms),
            QuantityUnit::Activity(u) => Ok(self.atoms_to_activity(atoms, nuclide) / u.becquerels::<N>()),
            QuantityUnit::Mass(u) => Ok(self.atoms_to_mass(atoms, nuclide)? / u.grams::<N>()),
            QuantityUnit::Moles(u) => Ok(self.atoms_to_moles(atoms) / u.moles::<N>()),
        }
    }

    /// Each value divided by the total. All zeros when the total is zero.
    pub fn fractions(values: &[N]) -> Vec<N> {
        let total = values.iter().cloned().fold(N::zero(), |acc, v| acc + v);
        if total.is_zero() {
            return vec![N::zero(); values.len()];
        }
        values.iter().map(|v| v.clone() / total.clone()).collect()
    }
}
