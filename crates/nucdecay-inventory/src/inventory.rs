//! Nuclide inventories.
//!
//! An [`Inventory`] maps nuclides of one [`DecayDataset`] to atom counts.
//! It is a value type: arithmetic and decay return new inventories and
//! leave the receiver untouched.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::sync::Arc;

use nucdecay_core::constants::{DEFAULT_SIG_FIGS, EV_TO_JOULE};
use nucdecay_core::{
    ActivityUnit, DecaySolver, MassUnit, MolesUnit, Nuclide, NuclideId, QuantityConverter, QuantityError,
    QuantityUnit, TimeUnit,
};
use nucdecay_engine::{DecayDataset, NuclideKey};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::InventoryError;

/// Numeric strategy used by [`Inventory::decay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    /// `f64` matrices and exponentials.
    #[default]
    Fixed,
    /// Exact rational matrices with exponentials to `sig_figs` digits.
    High { sig_figs: u32 },
}

impl Precision {
    /// High precision with the default digit budget.
    pub fn high() -> Self {
        Precision::High {
            sig_figs: DEFAULT_SIG_FIGS,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Precision::Fixed => "fixed",
            Precision::High { .. } => "high",
        }
    }
}

/// Atom counts for a set of nuclides from one dataset.
#[derive(Debug, Clone)]
pub struct Inventory {
    dataset: Arc<DecayDataset>,
    /// Matrix position -> atoms.
    contents: BTreeMap<usize, f64>,
    precision: Precision,
}

impl Inventory {
    /// Build an inventory from `(nuclide, quantity)` pairs given in `unit`.
    ///
    /// Quantities must be finite and non-negative. Entries naming the same
    /// nuclide (e.g. `"Tc-99m"` and `"99mTc"`) are summed.
    pub fn new<K, I>(dataset: Arc<DecayDataset>, contents: I, unit: QuantityUnit) -> Result<Self, InventoryError>
    where
        K: NuclideKey,
        I: IntoIterator<Item = (K, f64)>,
    {
        let converted = convert_entries(&dataset, contents, unit)?;
        let mut map = BTreeMap::new();
        for (pos, atoms) in converted {
            *map.entry(pos).or_insert(0.0) += atoms;
        }
        Ok(Self {
            dataset,
            contents: map,
            precision: Precision::Fixed,
        })
    }

    /// An inventory with no nuclides.
    pub fn empty(dataset: Arc<DecayDataset>) -> Self {
        Self {
            dataset,
            contents: BTreeMap::new(),
            precision: Precision::Fixed,
        }
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn dataset(&self) -> &Arc<DecayDataset> {
        &self.dataset
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Nuclides in the inventory, in decay-chain order.
    pub fn nuclides(&self) -> Vec<NuclideId> {
        self.entries().map(|(n, _)| n.id).collect()
    }

    pub fn contains<K: NuclideKey + ?Sized>(&self, key: &K) -> bool {
        self.dataset
            .position(key)
            .is_ok_and(|pos| self.contents.contains_key(&pos))
    }

    /// Atoms of a single nuclide.
    pub fn atoms<K: NuclideKey + ?Sized>(&self, key: &K) -> Result<f64, InventoryError> {
        let pos = self.dataset.position(key)?;
        self.contents
            .get(&pos)
            .copied()
            .ok_or_else(|| InventoryError::NotPresent(self.name_at(pos)))
    }

    /// Quantity of a single nuclide in `unit`.
    pub fn get<K: NuclideKey + ?Sized>(&self, key: &K, unit: QuantityUnit) -> Result<f64, InventoryError> {
        let atoms = self.atoms(key)?;
        let nuclide = self.dataset.nuclide(key)?;
        Ok(QuantityConverter::<f64>::new().from_atoms(atoms, unit, nuclide)?)
    }

    /// Add quantities given in `unit`. Nuclides not yet present are inserted.
    pub fn add<K, I>(&self, contents: I, unit: QuantityUnit) -> Result<Self, InventoryError>
    where
        K: NuclideKey,
        I: IntoIterator<Item = (K, f64)>,
    {
        let converted = convert_entries(&self.dataset, contents, unit)?;
        Ok(self.combine(converted, 1.0))
    }

    /// Subtract quantities given in `unit`.
    ///
    /// Results are not clamped: removing more than is present leaves a
    /// negative count, reported by [`Inventory::negative_nuclides`].
    pub fn subtract<K, I>(&self, contents: I, unit: QuantityUnit) -> Result<Self, InventoryError>
    where
        K: NuclideKey,
        I: IntoIterator<Item = (K, f64)>,
    {
        let converted = convert_entries(&self.dataset, contents, unit)?;
        Ok(self.combine(converted, -1.0))
    }

    pub fn add_inventory(&self, other: &Inventory) -> Result<Self, InventoryError> {
        self.check_same_dataset(other)?;
        Ok(self.combine(other.contents.iter().map(|(p, a)| (*p, *a)).collect(), 1.0))
    }

    pub fn subtract_inventory(&self, other: &Inventory) -> Result<Self, InventoryError> {
        self.check_same_dataset(other)?;
        Ok(self.combine(other.contents.iter().map(|(p, a)| (*p, *a)).collect(), -1.0))
    }

    /// Nuclides whose atom count is below zero.
    pub fn negative_nuclides(&self) -> Vec<NuclideId> {
        self.entries()
            .filter(|(_, atoms)| *atoms < 0.0)
            .map(|(n, _)| n.id)
            .collect()
    }

    /// Drop the given nuclides. Each must be present.
    pub fn remove<K: NuclideKey>(&self, nuclides: &[K]) -> Result<Self, InventoryError> {
        let mut contents = self.contents.clone();
        for key in nuclides {
            let pos = self.dataset.position(key)?;
            if contents.remove(&pos).is_none() {
                return Err(InventoryError::NotPresent(self.name_at(pos)));
            }
        }
        Ok(self.derive(contents))
    }

    /// Multiply every atom count by a finite `factor`.
    pub fn scale(&self, factor: f64) -> Result<Self, InventoryError> {
        if !factor.is_finite() {
            return Err(QuantityError::NonFiniteFactor(factor).into());
        }
        Ok(self.scaled(factor))
    }

    /// Decay for `t` in `unit`.
    ///
    /// The result holds every nuclide present before plus every progeny with
    /// a non-zero count. Negative `t` runs the decay backwards; it is allowed
    /// but numerically unstable.
    pub fn decay(&self, t: f64, unit: TimeUnit) -> Result<Self, InventoryError> {
        let seconds = unit.to_seconds(t, self.dataset.year_days());
        let initial = self.dense();
        debug!(
            t = seconds,
            precision = self.precision.label(),
            nuclides = self.len(),
            "inventory: decaying"
        );
        let decayed = self.solver_decay(&initial, seconds)?;
        let contents = decayed
            .into_iter()
            .enumerate()
            .filter(|(pos, atoms)| self.contents.contains_key(pos) || *atoms != 0.0)
            .collect();
        Ok(self.derive(contents))
    }

    /// Atom counts in decay-chain order.
    pub fn numbers(&self) -> Vec<(NuclideId, f64)> {
        self.entries().map(|(n, atoms)| (n.id, atoms)).collect()
    }

    pub fn activities(&self, unit: ActivityUnit) -> Vec<(NuclideId, f64)> {
        let conv = QuantityConverter::<f64>::new();
        let scale = unit.becquerels::<f64>();
        self.entries()
            .map(|(n, atoms)| (n.id, conv.atoms_to_activity(atoms, n) / scale))
            .collect()
    }

    pub fn masses(&self, unit: MassUnit) -> Result<Vec<(NuclideId, f64)>, InventoryError> {
        self.quantities(unit.into())
    }

    pub fn moles(&self, unit: MolesUnit) -> Vec<(NuclideId, f64)> {
        let conv = QuantityConverter::<f64>::new();
        let scale = unit.moles::<f64>();
        self.entries()
            .map(|(n, atoms)| (n.id, conv.atoms_to_moles(atoms) / scale))
            .collect()
    }

    /// Every nuclide's quantity in `unit`.
    pub fn quantities(&self, unit: QuantityUnit) -> Result<Vec<(NuclideId, f64)>, InventoryError> {
        let conv = QuantityConverter::<f64>::new();
        self.entries()
            .map(|(n, atoms)| Ok((n.id, conv.from_atoms(atoms, unit, n)?)))
            .collect()
    }

    /// Share of the total mass held by each nuclide.
    pub fn mass_fractions(&self) -> Result<Vec<(NuclideId, f64)>, InventoryError> {
        Ok(fractions(self.masses(MassUnit::G)?))
    }

    /// Share of the total moles held by each nuclide.
    pub fn mole_fractions(&self) -> Vec<(NuclideId, f64)> {
        fractions(self.moles(MolesUnit::MOL))
    }

    /// Half-lives in `unit`; infinite for stable nuclides.
    pub fn half_lives(&self, unit: TimeUnit) -> Vec<(NuclideId, f64)> {
        let year_days = self.dataset.year_days();
        self.entries()
            .map(|(n, _)| (n.id, unit.from_seconds(n.half_life(), year_days)))
            .collect()
    }

    /// Half-lives as text in a fitting unit, e.g. `6.0067 h`, or `stable`.
    pub fn half_lives_readable(&self) -> Vec<(NuclideId, String)> {
        let year_days = self.dataset.year_days();
        self.entries()
            .map(|(n, _)| (n.id, n.readable_half_life(year_days)))
            .collect()
    }

    /// Power released by each nuclide's decays in watts, from its activity
    /// and branching-weighted energy per decay. Zero where the dataset
    /// tabulates no decay energy.
    pub fn decay_power(&self) -> Vec<(NuclideId, f64)> {
        let conv = QuantityConverter::<f64>::new();
        self.entries()
            .map(|(n, atoms)| (n.id, conv.atoms_to_activity(atoms, n) * n.mean_decay_energy() * EV_TO_JOULE))
            .collect()
    }

    /// Total decay power in watts.
    pub fn total_decay_power(&self) -> f64 {
        self.decay_power().iter().map(|(_, w)| w).sum()
    }

    /// Dense atom vector indexed by matrix position.
    pub(crate) fn dense(&self) -> Vec<f64> {
        let mut v = vec![0.0; self.dataset.len()];
        for (&pos, &atoms) in &self.contents {
            v[pos] = atoms;
        }
        v
    }

    pub(crate) fn solver(&self) -> Box<dyn DecaySolver + '_> {
        match self.precision {
            Precision::Fixed => Box::new(self.dataset.fixed_engine()),
            Precision::High { sig_figs } => Box::new(self.dataset.exact_engine(sig_figs)),
        }
    }

    pub(crate) fn contains_position(&self, pos: usize) -> bool {
        self.contents.contains_key(&pos)
    }

    fn solver_decay(&self, initial: &[f64], seconds: f64) -> Result<Vec<f64>, InventoryError> {
        Ok(self.solver().decay(initial, seconds)?)
    }

    fn entries(&self) -> impl Iterator<Item = (&Nuclide, f64)> + '_ {
        self.contents
            .iter()
            .filter_map(|(&pos, &atoms)| self.dataset.nuclide_at(pos).map(|n| (n, atoms)))
    }

    fn name_at(&self, pos: usize) -> String {
        self.dataset
            .nuclide_at(pos)
            .map(|n| n.id.to_string())
            .unwrap_or_else(|| pos.to_string())
    }

    fn derive(&self, contents: BTreeMap<usize, f64>) -> Self {
        Self {
            dataset: Arc::clone(&self.dataset),
            contents,
            precision: self.precision,
        }
    }

    fn scaled(&self, factor: f64) -> Self {
        self.derive(self.contents.iter().map(|(&p, &a)| (p, a * factor)).collect())
    }

    fn combine(&self, entries: Vec<(usize, f64)>, sign: f64) -> Self {
        let mut contents = self.contents.clone();
        for (pos, atoms) in entries {
            *contents.entry(pos).or_insert(0.0) += sign * atoms;
        }
        let negative: Vec<String> = contents
            .iter()
            .filter(|(_, atoms)| **atoms < 0.0)
            .map(|(&pos, _)| self.name_at(pos))
            .collect();
        if !negative.is_empty() {
            warn!(nuclides = ?negative, "inventory: negative atom counts after subtraction");
        }
        self.derive(contents)
    }

    fn check_same_dataset(&self, other: &Inventory) -> Result<(), InventoryError> {
        if self.dataset.same_as(&other.dataset) {
            return Ok(());
        }
        Err(InventoryError::DatasetMismatch {
            left: describe(&self.dataset),
            right: describe(&other.dataset),
        })
    }
}

fn describe(dataset: &DecayDataset) -> String {
    let hex = dataset.fingerprint_hex();
    format!("{} ({})", dataset.name(), &hex[..12])
}

fn fractions(values: Vec<(NuclideId, f64)>) -> Vec<(NuclideId, f64)> {
    let raw: Vec<f64> = values.iter().map(|(_, v)| *v).collect();
    values
        .into_iter()
        .zip(QuantityConverter::<f64>::fractions(&raw))
        .map(|((id, _), f)| (id, f))
        .collect()
}

/// Resolve keys to positions and quantities to atoms, rejecting bad input.
fn convert_entries<K, I>(
    dataset: &DecayDataset,
    contents: I,
    unit: QuantityUnit,
) -> Result<Vec<(usize, f64)>, InventoryError>
where
    K: NuclideKey,
    I: IntoIterator<Item = (K, f64)>,
{
    let conv = QuantityConverter::<f64>::new();
    contents
        .into_iter()
        .map(|(key, value)| {
            let pos = dataset.position(&key)?;
            let nuclide = dataset.nuclide(&key)?;
            if !value.is_finite() {
                return Err(QuantityError::NonFinite {
                    nuclide: nuclide.id.to_string(),
                }
                .into());
            }
            if value < 0.0 {
                return Err(QuantityError::Negative {
                    nuclide: nuclide.id.to_string(),
                    value,
                }
                .into());
            }
            Ok((pos, conv.to_atoms(value, unit, nuclide)?))
        })
        .collect()
}

/// Fails with [`InventoryError::DatasetMismatch`] across datasets.
impl Add<&Inventory> for &Inventory {
    type Output = Result<Inventory, InventoryError>;

    fn add(self, other: &Inventory) -> Self::Output {
        self.add_inventory(other)
    }
}

impl Add for Inventory {
    type Output = Result<Inventory, InventoryError>;

    fn add(self, other: Inventory) -> Self::Output {
        self.add_inventory(&other)
    }
}

/// Fails with [`InventoryError::DatasetMismatch`] across datasets.
impl Sub<&Inventory> for &Inventory {
    type Output = Result<Inventory, InventoryError>;

    fn sub(self, other: &Inventory) -> Self::Output {
        self.subtract_inventory(other)
    }
}

impl Sub for Inventory {
    type Output = Result<Inventory, InventoryError>;

    fn sub(self, other: Inventory) -> Self::Output {
        self.subtract_inventory(&other)
    }
}

impl Mul<f64> for &Inventory {
    type Output = Inventory;

    fn mul(self, factor: f64) -> Inventory {
        self.scaled(factor)
    }
}

impl Mul<f64> for Inventory {
    type Output = Inventory;

    fn mul(self, factor: f64) -> Inventory {
        self.scaled(factor)
    }
}

impl Mul<Inventory> for f64 {
    type Output = Inventory;

    fn mul(self, inventory: Inventory) -> Inventory {
        inventory.scaled(self)
    }
}

impl Div<f64> for &Inventory {
    type Output = Inventory;

    fn div(self, divisor: f64) -> Inventory {
        self.scaled(1.0 / divisor)
    }
}

impl Div<f64> for Inventory {
    type Output = Inventory;

    fn div(self, divisor: f64) -> Inventory {
        self.scaled(1.0 / divisor)
    }
}

impl fmt::Display for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Inventory ({} precision, dataset {}):",
            self.precision.label(),
            self.dataset.name()
        )?;
        for (nuclide, atoms) in self.entries() {
            write!(f, " {}: {atoms:e},", nuclide.id)?;
        }
        Ok(())
    }
}
