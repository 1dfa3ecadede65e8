//! Error type for inventory operations.

use nucdecay_core::{DatasetError, DecayError, NuclideError, QuantityError, UnitError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("inventories use different datasets: {left} and {right}")] DatasetMismatch { left: String, right: String },
    #[error("nuclide {0} is not in the inventory")] NotPresent(String),
    #[error("invalid time grid: {0}")] InvalidTimeGrid(String),
    #[error(transparent)] Dataset(#[from] DatasetError),
    #[error(transparent)] Quantity(#[from] QuantityError),
    #[error(transparent)] Decay(#[from] DecayError),
    #[error(transparent)] Unit(#[from] UnitError),
    #[error(transparent)] Nuclide(#[from] NuclideError),
}
