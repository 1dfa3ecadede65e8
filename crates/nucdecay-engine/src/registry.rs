//! Named, shared datasets.
//!
//! Replaces a process-wide default dataset: callers load datasets into a
//! registry and hand out `Arc<DecayDataset>` clones explicitly.

use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use nucdecay_core::DatasetError;
use tracing::info;

use crate::dataset::{DatasetSpec, DecayDataset};

/// Thread-safe map from dataset name to a loaded dataset.
#[derive(Debug, Default)]
pub struct DatasetRegistry {
    datasets: DashMap<String, Arc<DecayDataset>>,
}

impl DatasetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `dataset` under its own name, replacing any previous entry.
    pub fn insert(&self, dataset: DecayDataset) -> Arc<DecayDataset> {
        let dataset = Arc::new(dataset);
        if let Some(old) = self.datasets.insert(dataset.name().to_string(), Arc::clone(&dataset)) {
            if !old.same_as(&dataset) {
                info!(dataset = %dataset.name(), "registry: replaced dataset with different contents");
            }
        }
        dataset
    }

    pub fn get(&self, name: &str) -> Option<Arc<DecayDataset>> {
        self.datasets.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Load a dataset JSON file and register it.
    pub fn load(&self, path: &Path) -> Result<Arc<DecayDataset>, DatasetError> {
        let dataset = DecayDataset::load(path)?;
        info!(dataset = %dataset.name(), nuclides = dataset.len(), path = %path.display(), "registry: loaded");
        Ok(self.insert(dataset))
    }

    /// Return the registered dataset named in `spec`, building it if absent.
    pub fn get_or_build(&self, spec: &DatasetSpec) -> Result<Arc<DecayDataset>, DatasetError> {
        if let Some(existing) = self.get(&spec.name) {
            return Ok(existing);
        }
        Ok(self.insert(DecayDataset::from_spec(spec)?))
    }

    pub fn remove(&self, name: &str) -> Option<Arc<DecayDataset>> {
        self.datasets.remove(name).map(|(_, dataset)| dataset)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.datasets.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}
