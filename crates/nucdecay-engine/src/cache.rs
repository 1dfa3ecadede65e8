//! On-disk cache of a dataset's decompositions.
//!
//! Building the exact matrices for a long chain dominates load time, so a
//! dataset can persist both decompositions next to its JSON file. The cache
//! records the dataset fingerprint and is ignored (and rebuilt) whenever it
//! does not match the inputs it is loaded against.

use std::path::Path;

use nucdecay_core::{BigRational, DatasetError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::builder::Decomposition;
use crate::dataset::{DatasetSpec, DecayDataset, Prepared};
use crate::store::DualPrecisionStore;

/// Bumped whenever the cached layout changes.
pub const CACHE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    fingerprint: [u8; 32],
    fixed: Decomposition<f64>,
    exact: Decomposition<BigRational>,
}

fn encode(dataset: &DecayDataset) -> Result<Vec<u8>, DatasetError> {
    let file = CacheFile {
        version: CACHE_VERSION,
        fingerprint: *dataset.fingerprint(),
        fixed: dataset.store().fixed().clone(),
        exact: dataset.store().exact().clone(),
    };
    bincode::serde::encode_to_vec(&file, bincode::config::standard())
        .map_err(|e| DatasetError::Serialization(e.to_string()))
}

fn decode(bytes: &[u8], fingerprint: &[u8; 32]) -> Result<DualPrecisionStore, DatasetError> {
    let (file, _): (CacheFile, usize) =
        bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            .map_err(|e| DatasetError::Serialization(e.to_string()))?;
    if file.version != CACHE_VERSION {
        return Err(DatasetError::CacheMismatch(format!(
            "version {} (expected {CACHE_VERSION})",
            file.version
        )));
    }
    if &file.fingerprint != fingerprint {
        return Err(DatasetError::CacheMismatch("fingerprint differs".to_string()));
    }
    DualPrecisionStore::from_parts(file.fixed, file.exact)
}

impl DecayDataset {
    /// Persist both decompositions to `path`.
    pub fn write_cache(&self, path: &Path) -> Result<(), DatasetError> {
        let bytes = encode(self)?;
        std::fs::write(path, &bytes).map_err(|e| DatasetError::Io(format!("{}: {e}", path.display())))?;
        info!(
            dataset = %self.name(),
            path = %path.display(),
            bytes = bytes.len(),
            "cache: written"
        );
        Ok(())
    }

    /// Build from `spec`, reusing the cache at `cache_path` when it matches.
    ///
    /// A missing, stale or corrupt cache is rebuilt and rewritten. Failing to
    /// write the new cache is logged and otherwise ignored.
    pub fn from_spec_cached(spec: &DatasetSpec, cache_path: &Path) -> Result<Self, DatasetError> {
        let prepared = Prepared::new(&spec.name, spec.year_days, spec.to_nuclides()?)?;

        match std::fs::read(cache_path) {
            Ok(bytes) => match decode(&bytes, &prepared.fingerprint) {
                Ok(store) => {
                    debug!(dataset = %spec.name, path = %cache_path.display(), "cache: hit");
                    return prepared.finish(store);
                }
                Err(e) => {
                    warn!(dataset = %spec.name, path = %cache_path.display(), error = %e, "cache: unusable, rebuilding");
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(dataset = %spec.name, path = %cache_path.display(), "cache: miss");
            }
            Err(e) => {
                warn!(dataset = %spec.name, path = %cache_path.display(), error = %e, "cache: unreadable, rebuilding");
            }
        }

        let store = prepared.build_store()?;
        let dataset = prepared.finish(store)?;
        if let Err(e) = dataset.write_cache(cache_path) {
            warn!(dataset = %spec.name, error = %e, "cache: write failed");
        }
        Ok(dataset)
    }
}
