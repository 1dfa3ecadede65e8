//! # nucdecay-inventory: Inventories of radioactive nuclides.
//!
//! The user-facing layer over nucdecay-engine:
//! - **Inventory**: nuclide quantities in any supported unit, held as atom
//!   counts, with value-semantics arithmetic and decay.
//! - **Precision**: choose the `f64` or exact-rational solver per inventory.
//! - **Time series**: decay over a [`TimeGrid`] into a [`DecayTable`].
//! - **Configuration**: [`SolverConfig`] layered from file and environment.

pub mod config;
pub mod error;
pub mod inventory;
pub mod series;

pub use crate::config::SolverConfig;
pub use error::InventoryError;
pub use inventory::{Inventory, Precision};
pub use series::{DecayTable, TimeGrid};
