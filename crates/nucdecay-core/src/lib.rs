//! # nucdecay-core: Core types, units and numeric strategies.
//!
//! This crate defines the pieces shared by the solver and its front ends:
//! - **Nuclide identity**: canonical ids and the accepted name forms
//!   (`Tc-99m`, `Tc99m`, `99mTc`).
//! - **Nuclear data**: [`Nuclide`] and [`Progeny`] records.
//! - **Units**: time, activity, mass and moles with exact decimal factors.
//! - **Numeric strategies**: [`DecayScalar`] for `f64` and exact
//!   [`BigRational`], including the digit-budgeted exponential.
//! - **Quantity conversion** between atoms, activity, mass and moles.
//! - **Errors** and the [`DecaySolver`] trait implemented by nucdecay-engine.

pub mod constants;
pub mod convert;
pub mod error;
pub mod nuclide;
pub mod precise;
pub mod scalar;
pub mod traits;
pub mod types;
pub mod units;

pub use convert::QuantityConverter;
pub use error::{DatasetError, DecayError, NucDecayError, NuclideError, QuantityError, UnitError};
pub use nuclide::NuclideId;
pub use num_rational::BigRational;
pub use precise::{exp_rational, rational_to_f64};
pub use scalar::{DecayFactor, DecayScalar, ExpBudget};
pub use traits::DecaySolver;
pub use types::{Nuclide, Progeny};
pub use units::{ActivityUnit, MassUnit, MolesUnit, Prefix, QuantityUnit, TimeUnit};
