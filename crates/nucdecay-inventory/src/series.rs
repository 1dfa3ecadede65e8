//! Decay over a grid of time points.

use std::collections::BTreeMap;

use nucdecay_core::{NuclideId, QuantityConverter, QuantityUnit, TimeUnit};
use nucdecay_engine::NuclideKey;
use ordered_float::OrderedFloat;
use serde::Serialize;
use tracing::debug;

use crate::error::InventoryError;
use crate::inventory::Inventory;

/// Time points at which to evaluate a decay series.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeGrid {
    /// `samples` evenly spaced points from 0 to `duration` inclusive.
    Uniform { duration: f64, samples: usize },
    /// Arbitrary offsets, evaluated in the given order.
    Explicit(Vec<f64>),
}

impl TimeGrid {
    pub fn points(&self) -> Result<Vec<f64>, InventoryError> {
        match self {
            TimeGrid::Uniform { duration, samples } => {
                if *samples < 2 {
                    return Err(InventoryError::InvalidTimeGrid(format!(
                        "uniform grid needs at least 2 samples, got {samples}"
                    )));
                }
                if !duration.is_finite() {
                    return Err(InventoryError::InvalidTimeGrid(format!("duration {duration}")));
                }
                let step = duration / (*samples - 1) as f64;
                Ok((0..*samples)
                    .map(|k| if k + 1 == *samples { *duration } else { k as f64 * step })
                    .collect())
            }
            TimeGrid::Explicit(points) => {
                if points.is_empty() {
                    return Err(InventoryError::InvalidTimeGrid("no time points".to_string()));
                }
                if let Some(bad) = points.iter().find(|t| !t.is_finite()) {
                    return Err(InventoryError::InvalidTimeGrid(format!("time point {bad}")));
                }
                Ok(points.clone())
            }
        }
    }
}

/// Quantities of each nuclide at each time point.
#[derive(Debug, Clone, Serialize)]
pub struct DecayTable {
    time_unit: String,
    quantity_unit: String,
    times: Vec<f64>,
    nuclides: Vec<NuclideId>,
    /// `values[k][i]`: nuclide `i` at time `k`.
    values: Vec<Vec<f64>>,
    #[serde(skip)]
    by_time: BTreeMap<OrderedFloat<f64>, usize>,
}

impl DecayTable {
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Column order of the table, in decay-chain order.
    pub fn nuclides(&self) -> &[NuclideId] {
        &self.nuclides
    }

    pub fn time_unit(&self) -> &str {
        &self.time_unit
    }

    pub fn quantity_unit(&self) -> &str {
        &self.quantity_unit
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// All quantities at time index `k`, in [`DecayTable::nuclides`] order.
    pub fn row(&self, k: usize) -> Option<&[f64]> {
        self.values.get(k).map(Vec::as_slice)
    }

    /// Quantities at an exact time value from the grid. The first match wins
    /// when the grid repeats a time.
    pub fn at_time(&self, t: f64) -> Option<&[f64]> {
        self.by_time.get(&OrderedFloat(t)).and_then(|&k| self.row(k))
    }

    /// The series of one nuclide over all time points.
    pub fn series<K: NuclideKey + ?Sized>(&self, key: &K) -> Result<Vec<f64>, InventoryError> {
        let i = self.column(key)?;
        Ok(self.values.iter().map(|row| row[i]).collect())
    }

    /// One nuclide at time index `k`.
    pub fn get<K: NuclideKey + ?Sized>(&self, key: &K, k: usize) -> Result<Option<f64>, InventoryError> {
        let i = self.column(key)?;
        Ok(self.values.get(k).map(|row| row[i]))
    }

    fn column<K: NuclideKey + ?Sized>(&self, key: &K) -> Result<usize, InventoryError> {
        let id = key.to_nuclide_id()?;
        self.nuclides
            .iter()
            .position(|n| *n == id)
            .ok_or_else(|| InventoryError::NotPresent(id.to_string()))
    }
}

impl Inventory {
    /// Decay this inventory to every point of `grid` (in `time_unit`) and
    /// report quantities in `unit`.
    ///
    /// Columns cover the nuclides present initially plus every progeny that
    /// is non-zero at some time point.
    pub fn decay_series(
        &self,
        grid: &TimeGrid,
        time_unit: TimeUnit,
        unit: QuantityUnit,
    ) -> Result<DecayTable, InventoryError> {
        let times = grid.points()?;
        let year_days = self.dataset().year_days();
        let seconds: Vec<f64> = times.iter().map(|t| time_unit.to_seconds(*t, year_days)).collect();
        debug!(points = times.len(), precision = self.precision().label(), "inventory: decay series");

        let atoms = self.solver().decay_series(&self.dense(), &seconds)?;

        let dataset = self.dataset();
        let columns: Vec<usize> = (0..dataset.len())
            .filter(|&pos| self.contains_position(pos) || atoms.iter().any(|row| row[pos] != 0.0))
            .collect();
        let conv = QuantityConverter::<f64>::new();
        let mut nuclides = Vec::with_capacity(columns.len());
        for &pos in &columns {
            if let Some(n) = dataset.nuclide_at(pos) {
                nuclides.push(n.id);
            }
        }
        let values = atoms
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .filter_map(|&pos| dataset.nuclide_at(pos).map(|n| (n, row[pos])))
                    .map(|(n, a)| conv.from_atoms(a, unit, n))
                    .collect::<Result<Vec<f64>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut by_time = BTreeMap::new();
        for (k, t) in times.iter().enumerate() {
            by_time.entry(OrderedFloat(*t)).or_insert(k);
        }
        Ok(DecayTable {
            time_unit: time_unit.to_string(),
            quantity_unit: unit.to_string(),
            times,
            nuclides,
            values,
            by_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::Precision;
    use nucdecay_core::ActivityUnit;
    use nucdecay_engine::DecayDataset;
    use std::sync::Arc;

    const CS137: &str = r#"{
        "name": "cs137",
        "nuclides": [
            { "nuclide": "Cs-137", "half_life": 30.1671, "unit": "y", "atomic_mass": 136.907089,
              "progeny": [
                { "nuclide": "Ba-137m", "fraction": 0.94399, "mode": "β-" },
                { "nuclide": "Ba-137", "fraction": 0.05601, "mode": "β-" }
              ] },
            { "nuclide": "Ba-137m", "half_life": 153.12, "unit": "s", "atomic_mass": 136.906708,
              "progeny": [{ "nuclide": "Ba-137", "fraction": 1.0, "mode": "IT" }] },
            { "nuclide": "Ba-137", "atomic_mass": 136.905827 }
        ]
    }"#;

    fn inventory() -> Inventory {
        let ds = Arc::new(DecayDataset::from_json(CS137).unwrap());
        Inventory::new(ds, [("Cs-137", 1e20)], QuantityUnit::Atoms).unwrap()
    }

    #[test]
    fn uniform_grid_points() {
        let points = TimeGrid::Uniform { duration: 10.0, samples: 5 }.points().unwrap();
        assert_eq!(points, vec![0.0, 2.5, 5.0, 7.5, 10.0]);
        assert!(matches!(
            TimeGrid::Uniform { duration: 1.0, samples: 1 }.points(),
            Err(InventoryError::InvalidTimeGrid(_))
        ));
        assert!(TimeGrid::Explicit(vec![]).points().is_err());
        assert!(TimeGrid::Explicit(vec![1.0, f64::NAN]).points().is_err());
    }

    #[test]
    fn series_matches_pointwise_decay() {
        let inv = inventory();
        let grid = TimeGrid::Explicit(vec![0.0, 10.0, 30.1671]);
        let table = inv.decay_series(&grid, TimeUnit::Year, QuantityUnit::Atoms).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.nuclides().len(), 3);
        for (k, t) in table.times().iter().enumerate() {
            let single = inv.decay(*t, TimeUnit::Year).unwrap();
            for id in single.nuclides() {
                let expected = single.atoms(&id).unwrap();
                let got = table.get(&id, k).unwrap().unwrap();
                assert!((got - expected).abs() <= 1e-9 * expected.abs().max(1.0));
            }
        }
        let cs = table.series("Cs-137").unwrap();
        assert!((cs[2] / 1e20 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn lookup_by_time_and_units() {
        let inv = inventory().with_precision(Precision::High { sig_figs: 40 });
        let grid = TimeGrid::Uniform { duration: 60.0, samples: 3 };
        let table = inv.decay_series(&grid, TimeUnit::Year, ActivityUnit::BQ.into()).unwrap();
        assert_eq!(table.time_unit(), "y");
        assert_eq!(table.quantity_unit(), "Bq");
        assert!(table.at_time(30.0).is_some());
        assert!(table.at_time(31.0).is_none());
        let stable = table.series("Ba-137").unwrap();
        assert!(stable.iter().all(|a| *a == 0.0));
        assert!(matches!(table.series("K-40"), Err(InventoryError::NotPresent(_))));
        // Ba-137m progeny of an initially pure Cs-137 source starts at zero.
        assert_eq!(table.get("Ba-137m", 0).unwrap(), Some(0.0));
        assert_eq!(table.get("Ba-137m", 9).unwrap(), None);

        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["times"].as_array().unwrap().len(), 3);
        assert_eq!(json["quantity_unit"], "Bq");
    }
}
