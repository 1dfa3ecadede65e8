//! Decay datasets: loading, validation and nuclear-data queries.
//!
//! A [`DecayDataset`] owns the nuclides in topological order, their
//! [`NuclideIndex`], the [`DualPrecisionStore`] and a BLAKE3 fingerprint of
//! its inputs. It is immutable and meant to be shared behind an `Arc`.
//!
//! Datasets are described on disk by [`DatasetSpec`] JSON:
//!
//! ```json
//! {
//!   "name": "example",
//!   "year_days": 365.2422,
//!   "nuclides": [
//!     { "nuclide": "H-3", "half_life": 12.32, "unit": "y", "atomic_mass": 3.016,
//!       "progeny": [{ "nuclide": "He-3", "fraction": 1.0, "mode": "β-" }] },
//!     { "nuclide": "He-3", "atomic_mass": 3.016 }
//!   ]
//! }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use nucdecay_core::constants::{BRANCHING_TOLERANCE, DEFAULT_YEAR_DAYS};
use nucdecay_core::{
    BigRational, DatasetError, Nuclide, NuclideError, NuclideId, Progeny, TimeUnit,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::builder::DecayMatrixBuilder;
use crate::engine::DecayEngine;
use crate::index::NuclideIndex;
use crate::store::DualPrecisionStore;

fn default_year_days() -> f64 {
    DEFAULT_YEAR_DAYS
}

fn default_time_unit() -> String {
    "s".to_string()
}

/// On-disk description of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSpec {
    pub name: String,
    #[serde(default = "default_year_days")]
    pub year_days: f64,
    pub nuclides: Vec<NuclideSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NuclideSpec {
    /// Nuclide name in any accepted form.
    pub nuclide: String,
    /// Half-life in `unit`; absent for stable nuclides.
    #[serde(default)]
    pub half_life: Option<f64>,
    #[serde(default = "default_time_unit")]
    pub unit: String,
    /// Atomic mass in g/mol.
    pub atomic_mass: f64,
    #[serde(default)]
    pub progeny: Vec<ProgenySpec>,
    /// Energy released per decay in eV, keyed by decay mode.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub decay_energy: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgenySpec {
    pub nuclide: String,
    pub fraction: f64,
    #[serde(default)]
    pub mode: String,
}

impl DatasetSpec {
    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        serde_json::from_str(json).map_err(|e| DatasetError::Serialization(e.to_string()))
    }

    pub fn from_path(path: &Path) -> Result<Self, DatasetError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| DatasetError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, DatasetError> {
        serde_json::to_string_pretty(self).map_err(|e| DatasetError::Serialization(e.to_string()))
    }

    /// Resolve names and units into [`Nuclide`] records, in file order.
    pub fn to_nuclides(&self) -> Result<Vec<Nuclide>, DatasetError> {
        self.nuclides
            .iter()
            .map(|spec| {
                let id: NuclideId = spec.nuclide.parse()?;
                let half_life = match spec.half_life {
                    Some(value) => {
                        let unit: TimeUnit = spec.unit.parse()?;
                        let seconds = unit.to_seconds(value, self.year_days);
                        if !(seconds.is_finite() && seconds > 0.0) {
                            return Err(DatasetError::InvalidHalfLife {
                                nuclide: id.to_string(),
                                value,
                            });
                        }
                        Some(seconds)
                    }
                    None => None,
                };
                let progeny = spec
                    .progeny
                    .iter()
                    .map(|p| {
                        Ok(Progeny {
                            id: p.nuclide.parse()?,
                            branching_fraction: p.fraction,
                            mode: p.mode.clone(),
                        })
                    })
                    .collect::<Result<Vec<_>, NuclideError>>()?;
                if let Some((mode, &value)) = spec
                    .decay_energy
                    .iter()
                    .find(|(_, e)| !(e.is_finite() && **e >= 0.0))
                {
                    return Err(DatasetError::InvalidDecayEnergy {
                        nuclide: id.to_string(),
                        mode: mode.clone(),
                        value,
                    });
                }
                Ok(Nuclide::from_half_life(id, half_life, spec.atomic_mass, progeny)
                    .with_decay_energy(spec.decay_energy.clone()))
            })
            .collect()
    }
}

/// Anything that names a nuclide: a name string, a [`NuclideId`] or a canonical id.
pub trait NuclideKey {
    fn to_nuclide_id(&self) -> Result<NuclideId, NuclideError>;
}

impl NuclideKey for str {
    fn to_nuclide_id(&self) -> Result<NuclideId, NuclideError> {
        self.parse()
    }
}

impl NuclideKey for String {
    fn to_nuclide_id(&self) -> Result<NuclideId, NuclideError> {
        self.parse()
    }
}

impl NuclideKey for NuclideId {
    fn to_nuclide_id(&self) -> Result<NuclideId, NuclideError> {
        Ok(*self)
    }
}

impl NuclideKey for u32 {
    fn to_nuclide_id(&self) -> Result<NuclideId, NuclideError> {
        NuclideId::from_canonical(*self)
    }
}

impl<T: NuclideKey + ?Sized> NuclideKey for &T {
    fn to_nuclide_id(&self) -> Result<NuclideId, NuclideError> {
        (**self).to_nuclide_id()
    }
}

/// An immutable, validated decay dataset with its pre-built matrices.
#[derive(Debug)]
pub struct DecayDataset {
    name: String,
    year_days: f64,
    nuclides: Vec<Nuclide>,
    index: NuclideIndex,
    store: DualPrecisionStore,
    fingerprint: [u8; 32],
}

/// Validated nuclides in topological order, ready for matrix construction.
pub(crate) struct Prepared {
    pub name: String,
    pub year_days: f64,
    pub nuclides: Vec<Nuclide>,
    pub index: NuclideIndex,
    pub fingerprint: [u8; 32],
}

impl Prepared {
    pub fn new(name: &str, year_days: f64, nuclides: Vec<Nuclide>) -> Result<Self, DatasetError> {
        validate(&nuclides)?;
        let index = NuclideIndex::build(&nuclides)?;
        let mut ordered = nuclides;
        ordered.sort_by_key(|n| index.position(n.id).unwrap_or(usize::MAX));
        let fingerprint = fingerprint(name, year_days, &ordered)?;
        Ok(Self {
            name: name.to_string(),
            year_days,
            nuclides: ordered,
            index,
            fingerprint,
        })
    }

    pub fn build_store(&self) -> Result<DualPrecisionStore, DatasetError> {
        let builder = DecayMatrixBuilder::new(&self.nuclides, &self.index)?;
        DualPrecisionStore::build(&builder)
    }

    pub fn finish(self, store: DualPrecisionStore) -> Result<DecayDataset, DatasetError> {
        if store.dim() != self.nuclides.len() {
            return Err(DatasetError::CacheMismatch(format!(
                "store dimension {} for {} nuclides",
                store.dim(),
                self.nuclides.len()
            )));
        }
        Ok(DecayDataset {
            name: self.name,
            year_days: self.year_days,
            nuclides: self.nuclides,
            index: self.index,
            store,
            fingerprint: self.fingerprint,
        })
    }
}

fn validate(nuclides: &[Nuclide]) -> Result<(), DatasetError> {
    if nuclides.is_empty() {
        return Err(DatasetError::Empty);
    }
    let mut seen = HashSet::new();
    for nuclide in nuclides {
        let name = nuclide.id.to_string();
        if !seen.insert(nuclide.id) {
            return Err(DatasetError::DuplicateNuclide(name));
        }
        if !(nuclide.decay_constant.is_finite() && nuclide.decay_constant >= 0.0) {
            return Err(DatasetError::InvalidHalfLife {
                nuclide: name,
                value: nuclide.half_life(),
            });
        }
        if !(nuclide.atomic_mass.is_finite() && nuclide.atomic_mass > 0.0) {
            return Err(DatasetError::InvalidAtomicMass {
                nuclide: name,
                value: nuclide.atomic_mass,
            });
        }
        if nuclide.is_stable() && !nuclide.progeny.is_empty() {
            return Err(DatasetError::StableWithProgeny(name));
        }
        for branch in &nuclide.progeny {
            let b = branch.branching_fraction;
            if !(b.is_finite() && (0.0..=1.0).contains(&b)) {
                return Err(DatasetError::InvalidBranching {
                    nuclide: name,
                    detail: format!("fraction {b} to {}", branch.id),
                });
            }
        }
        let total = nuclide.total_branching();
        if total > 1.0 + BRANCHING_TOLERANCE {
            return Err(DatasetError::InvalidBranching {
                nuclide: name,
                detail: format!("fractions sum to {total}"),
            });
        }
    }
    Ok(())
}

fn fingerprint(name: &str, year_days: f64, nuclides: &[Nuclide]) -> Result<[u8; 32], DatasetError> {
    let bytes = serde_json::to_vec(&(name, year_days, nuclides))
        .map_err(|e| DatasetError::Serialization(e.to_string()))?;
    Ok(*blake3::hash(&bytes).as_bytes())
}

impl DecayDataset {
    /// Validate `nuclides`, order them and build both decompositions.
    pub fn from_nuclides(name: &str, year_days: f64, nuclides: Vec<Nuclide>) -> Result<Self, DatasetError> {
        let prepared = Prepared::new(name, year_days, nuclides)?;
        let store = prepared.build_store()?;
        let dataset = prepared.finish(store)?;
        debug!(
            dataset = %dataset.name,
            nuclides = dataset.len(),
            fingerprint = %dataset.fingerprint_hex(),
            "dataset: built"
        );
        Ok(dataset)
    }

    pub fn from_spec(spec: &DatasetSpec) -> Result<Self, DatasetError> {
        Self::from_nuclides(&spec.name, spec.year_days, spec.to_nuclides()?)
    }

    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        Self::from_spec(&DatasetSpec::from_json(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        Self::from_spec(&DatasetSpec::from_path(path)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Days per year used for year-based time units.
    pub fn year_days(&self) -> f64 {
        self.year_days
    }

    pub fn len(&self) -> usize {
        self.nuclides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nuclides.is_empty()
    }

    /// Nuclides in topological order.
    pub fn nuclides(&self) -> &[Nuclide] {
        &self.nuclides
    }

    pub fn index(&self) -> &NuclideIndex {
        &self.index
    }

    pub fn store(&self) -> &DualPrecisionStore {
        &self.store
    }

    pub fn fingerprint(&self) -> &[u8; 32] {
        &self.fingerprint
    }

    pub fn fingerprint_hex(&self) -> String {
        blake3::Hash::from(self.fingerprint).to_hex().to_string()
    }

    /// True when both datasets were built from identical inputs.
    pub fn same_as(&self, other: &DecayDataset) -> bool {
        self.fingerprint == other.fingerprint
    }

    /// Matrix position of a nuclide.
    pub fn position<K: NuclideKey + ?Sized>(&self, key: &K) -> Result<usize, DatasetError> {
        let id = key.to_nuclide_id()?;
        self.index
            .position(id)
            .ok_or_else(|| DatasetError::UnknownNuclide(id.to_string()))
    }

    pub fn nuclide<K: NuclideKey + ?Sized>(&self, key: &K) -> Result<&Nuclide, DatasetError> {
        Ok(&self.nuclides[self.position(key)?])
    }

    /// Nuclide at matrix position `pos`.
    pub fn nuclide_at(&self, pos: usize) -> Option<&Nuclide> {
        self.nuclides.get(pos)
    }

    pub fn contains<K: NuclideKey + ?Sized>(&self, key: &K) -> bool {
        self.position(key).is_ok()
    }

    /// Half-life in `unit`; infinite for stable nuclides.
    pub fn half_life<K: NuclideKey + ?Sized>(&self, key: &K, unit: TimeUnit) -> Result<f64, DatasetError> {
        let seconds = self.nuclide(key)?.half_life();
        Ok(unit.from_seconds(seconds, self.year_days))
    }

    /// Half-life as text in a fitting unit, e.g. `3.8235 d`, or `stable`.
    pub fn half_life_readable<K: NuclideKey + ?Sized>(&self, key: &K) -> Result<String, DatasetError> {
        Ok(self.nuclide(key)?.readable_half_life(self.year_days))
    }

    /// Tabulated energy per decay in eV, keyed by decay mode.
    pub fn decay_energy<K: NuclideKey + ?Sized>(&self, key: &K) -> Result<&BTreeMap<String, f64>, DatasetError> {
        Ok(&self.nuclide(key)?.decay_energy)
    }

    pub fn progeny<K: NuclideKey + ?Sized>(&self, key: &K) -> Result<&[Progeny], DatasetError> {
        Ok(&self.nuclide(key)?.progeny)
    }

    /// Summed branching fraction from `parent` to `progeny`; zero when unrelated.
    pub fn branching_fraction<P, Q>(&self, parent: &P, progeny: &Q) -> Result<f64, DatasetError>
    where
        P: NuclideKey + ?Sized,
        Q: NuclideKey + ?Sized,
    {
        let parent = self.nuclide(parent)?;
        let target = self.nuclide(progeny)?.id;
        Ok(parent
            .progeny
            .iter()
            .filter(|p| p.id == target)
            .map(|p| p.branching_fraction)
            .sum())
    }

    /// Decay mode label of the branch from `parent` to `progeny`.
    pub fn decay_mode<P, Q>(&self, parent: &P, progeny: &Q) -> Result<&str, DatasetError>
    where
        P: NuclideKey + ?Sized,
        Q: NuclideKey + ?Sized,
    {
        let parent = self.nuclide(parent)?;
        let target = self.nuclide(progeny)?.id;
        parent
            .branch_to(target)
            .map(|p| p.mode.as_str())
            .ok_or_else(|| DatasetError::NotProgeny {
                parent: parent.id.to_string(),
                progeny: target.to_string(),
            })
    }

    /// Decay constants in topological order.
    pub fn decay_constants(&self) -> Vec<f64> {
        self.store.decay_constants()
    }

    pub fn fixed_engine(&self) -> DecayEngine<'_, f64> {
        self.store.fixed_engine()
    }

    pub fn exact_engine(&self, sig_figs: u32) -> DecayEngine<'_, BigRational> {
        self.store.exact_engine(sig_figs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"{
        "name": "small",
        "nuclides": [
            { "nuclide": "He-3", "atomic_mass": 3.016029 },
            { "nuclide": "H-3", "half_life": 12.32, "unit": "y", "atomic_mass": 3.016049,
              "progeny": [{ "nuclide": "He-3", "fraction": 1.0, "mode": "β-" }],
              "decay_energy": { "β-": 18591.0 } },
            { "nuclide": "K-40", "half_life": 1.251e9, "unit": "y", "atomic_mass": 39.963998,
              "progeny": [
                { "nuclide": "Ca-40", "fraction": 0.8914, "mode": "β-" },
                { "nuclide": "Ar-40", "fraction": 0.1086, "mode": "β+ & EC" }
              ] },
            { "nuclide": "Ca-40", "atomic_mass": 39.962591 },
            { "nuclide": "Ar-40", "atomic_mass": 39.962383 }
        ]
    }"#;

    fn small() -> DecayDataset {
        DecayDataset::from_json(SMALL).unwrap()
    }

    #[test]
    fn loads_and_orders() {
        let ds = small();
        assert_eq!(ds.name(), "small");
        assert_eq!(ds.len(), 5);
        assert_eq!(ds.year_days(), DEFAULT_YEAR_DAYS);
        assert!(ds.position("H-3").unwrap() < ds.position("He-3").unwrap());
        assert!(ds.position("K-40").unwrap() < ds.position("Ar-40").unwrap());
        assert!(ds.store().precisions_agree());
    }

    #[test]
    fn queries() {
        let ds = small();
        let hl = ds.half_life("H3", TimeUnit::Year).unwrap();
        assert!((hl - 12.32).abs() < 1e-9);
        assert!(ds.half_life("Ca-40", TimeUnit::Second).unwrap().is_infinite());
        assert_eq!(ds.branching_fraction("K-40", "Ca-40").unwrap(), 0.8914);
        assert_eq!(ds.branching_fraction("K-40", "He-3").unwrap(), 0.0);
        assert_eq!(ds.decay_mode("K-40", "Ar-40").unwrap(), "β+ & EC");
        assert!(matches!(ds.decay_mode("H-3", "Ar-40"), Err(DatasetError::NotProgeny { .. })));
        assert_eq!(ds.progeny("40K").unwrap().len(), 2);
        let k40: NuclideId = "K-40".parse().unwrap();
        assert_eq!(ds.nuclide(&k40).unwrap().id, k40);
        assert_eq!(ds.nuclide(&k40.canonical()).unwrap().id, k40);
    }

    #[test]
    fn readable_half_lives_and_energies() {
        let ds = small();
        assert_eq!(ds.half_life_readable("H-3").unwrap(), "12.32 y");
        assert_eq!(ds.half_life_readable("K40").unwrap(), "1.251 Gy");
        assert_eq!(ds.half_life_readable("He-3").unwrap(), "stable");
        assert_eq!(ds.decay_energy("H-3").unwrap().get("β-"), Some(&18591.0));
        assert!(ds.decay_energy("K-40").unwrap().is_empty());
        assert_eq!(ds.nuclide("H-3").unwrap().mean_decay_energy(), 18591.0);

        let mut spec = DatasetSpec::from_json(SMALL).unwrap();
        spec.nuclides[1].decay_energy.insert("α".into(), -1.0);
        assert!(matches!(
            DecayDataset::from_spec(&spec),
            Err(DatasetError::InvalidDecayEnergy { ref mode, .. }) if mode == "α"
        ));
    }

    #[test]
    fn unknown_and_malformed_names() {
        let ds = small();
        assert!(matches!(ds.position("Cs-137"), Err(DatasetError::UnknownNuclide(_))));
        assert!(matches!(ds.position("not a nuclide"), Err(DatasetError::Nuclide(_))));
        assert!(!ds.contains("U-238"));
    }

    #[test]
    fn fingerprint_ignores_file_order() {
        let mut spec = DatasetSpec::from_json(SMALL).unwrap();
        let a = DecayDataset::from_spec(&spec).unwrap();
        spec.nuclides.reverse();
        let b = DecayDataset::from_spec(&spec).unwrap();
        assert!(a.same_as(&b));
        spec.name = "renamed".into();
        let c = DecayDataset::from_spec(&spec).unwrap();
        assert!(!a.same_as(&c));
        assert_eq!(a.fingerprint_hex().len(), 64);
    }

    #[test]
    fn validation_errors() {
        let base = DatasetSpec::from_json(SMALL).unwrap();

        let mut dup = base.clone();
        dup.nuclides.push(dup.nuclides[0].clone());
        assert!(matches!(DecayDataset::from_spec(&dup), Err(DatasetError::DuplicateNuclide(_))));

        let mut over = base.clone();
        over.nuclides[2].progeny[0].fraction = 0.95;
        assert!(matches!(DecayDataset::from_spec(&over), Err(DatasetError::InvalidBranching { .. })));

        let mut missing = base.clone();
        missing.nuclides.retain(|n| n.nuclide != "Ar-40");
        assert!(matches!(DecayDataset::from_spec(&missing), Err(DatasetError::UnknownProgeny { .. })));

        let mut stable_parent = base.clone();
        stable_parent.nuclides[0].progeny.push(ProgenySpec { nuclide: "H-3".into(), fraction: 1.0, mode: String::new() });
        assert!(matches!(DecayDataset::from_spec(&stable_parent), Err(DatasetError::StableWithProgeny(_))));

        let mut bad_unit = base.clone();
        bad_unit.nuclides[1].unit = "fortnight".into();
        assert!(matches!(DecayDataset::from_spec(&bad_unit), Err(DatasetError::Unit(_))));

        let mut bad_half_life = base.clone();
        bad_half_life.nuclides[1].half_life = Some(-1.0);
        assert!(matches!(DecayDataset::from_spec(&bad_half_life), Err(DatasetError::InvalidHalfLife { .. })));

        let mut bad_mass = base.clone();
        bad_mass.nuclides[3].atomic_mass = 0.0;
        assert!(matches!(DecayDataset::from_spec(&bad_mass), Err(DatasetError::InvalidAtomicMass { .. })));

        let empty = DatasetSpec { name: "empty".into(), year_days: 365.25, nuclides: vec![] };
        assert!(matches!(DecayDataset::from_spec(&empty), Err(DatasetError::Empty)));

        assert!(matches!(DatasetSpec::from_json("{"), Err(DatasetError::Serialization(_))));
    }

    #[test]
    fn spec_json_round_trip() {
        let spec = DatasetSpec::from_json(SMALL).unwrap();
        let again = DatasetSpec::from_json(&spec.to_json().unwrap()).unwrap();
        assert_eq!(spec, again);
    }

    #[test]
    fn load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.json");
        std::fs::write(&path, SMALL).unwrap();
        let ds = DecayDataset::load(&path).unwrap();
        assert_eq!(ds.len(), 5);
        assert!(matches!(DecayDataset::load(&dir.path().join("missing.json")), Err(DatasetError::Io(_))));
    }
}
