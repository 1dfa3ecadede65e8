//! # nucdecay-engine: Decay matrices and the closed-form chain solver.
//!
//! This crate turns a nuclear dataset into something that can be solved:
//! - **Datasets**: JSON loading, validation and BLAKE3 fingerprints
//!   ([`DecayDataset`], [`DatasetSpec`]).
//! - **Ordering**: parents before progeny via [`NuclideIndex`].
//! - **Matrices**: Λ, C and C⁻¹ built by forward substitution over sparse
//!   columns ([`DecayMatrixBuilder`]), stored in both `f64` and exact
//!   rationals ([`DualPrecisionStore`]).
//! - **Solving**: [`DecayEngine`] evaluates `C · e^{-λt} · C⁻¹ · N(0)` in
//!   either precision.
//! - **Sharing**: a bincode cache of the decompositions and a thread-safe
//!   [`DatasetRegistry`].

pub mod builder;
pub mod cache;
pub mod dataset;
pub mod engine;
pub mod index;
pub mod registry;
pub mod sparse;
pub mod store;

pub use builder::{DecayMatrixBuilder, Decomposition};
pub use cache::CACHE_VERSION;
pub use dataset::{DatasetSpec, DecayDataset, NuclideKey, NuclideSpec, ProgenySpec};
pub use engine::DecayEngine;
pub use index::NuclideIndex;
pub use registry::DatasetRegistry;
pub use sparse::SparseMatrix;
pub use store::DualPrecisionStore;
