//! Error types for the nucdecay solver.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NuclideError {
    #[error("invalid nuclide string: {0}")] InvalidString(String),
    #[error("unknown element symbol: {0}")] UnknownElement(String),
    #[error("invalid atomic number: {0}")] InvalidAtomicNumber(u32),
    #[error("mass number {a} below atomic number {z}")] InvalidMassNumber { z: u32, a: u32 },
    #[error("invalid metastable state: {0}")] InvalidState(u32),
    #[error("invalid canonical id: {0}")] InvalidId(u32),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    #[error("unknown time unit: {0}")] UnknownTime(String),
    #[error("unknown activity unit: {0}")] UnknownActivity(String),
    #[error("unknown mass unit: {0}")] UnknownMass(String),
    #[error("unknown moles unit: {0}")] UnknownMoles(String),
    #[error("unknown quantity unit: {0}")] UnknownQuantity(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuantityError {
    #[error("non-zero activity {activity} for stable nuclide {nuclide}")] ActivityOfStable { nuclide: String, activity: f64 },
    #[error("negative quantity for {nuclide}: {value}")] Negative { nuclide: String, value: f64 },
    #[error("non-finite quantity for {nuclide}")] NonFinite { nuclide: String },
    #[error("no usable atomic mass for {0}")] UndefinedMass(String),
    #[error("non-finite scale factor: {0}")] NonFiniteFactor(f64),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatasetError {
    #[error("unknown nuclide: {0}")] UnknownNuclide(String),
    #[error("duplicate nuclide: {0}")] DuplicateNuclide(String),
    #[error("progeny {progeny} of {parent} is not in the dataset")] UnknownProgeny { parent: String, progeny: String },
    #[error("{progeny} is not a progeny of {parent}")] NotProgeny { parent: String, progeny: String },
    #[error("degenerate half-lives: {ancestor} and {descendant} share a decay constant")] DegenerateHalfLife { ancestor: String, descendant: String },
    #[error("invalid branching for {nuclide}: {detail}")] InvalidBranching { nuclide: String, detail: String },
    #[error("stable nuclide {0} lists progeny")] StableWithProgeny(String),
    #[error("invalid half-life for {nuclide}: {value}")] InvalidHalfLife { nuclide: String, value: f64 },
    #[error("invalid atomic mass for {nuclide}: {value}")] InvalidAtomicMass { nuclide: String, value: f64 },
    #[error("invalid {mode} decay energy for {nuclide}: {value}")] InvalidDecayEnergy { nuclide: String, mode: String, value: f64 },
    #[error("decay chain contains a cycle through: {0}")] CyclicChain(String),
    #[error("empty dataset")] Empty,
    #[error("cache mismatch: {0}")] CacheMismatch(String),
    #[error("serialization: {0}")] Serialization(String),
    #[error("io: {0}")] Io(String),
    #[error(transparent)] Nuclide(#[from] NuclideError),
    #[error(transparent)] Unit(#[from] UnitError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecayError {
    #[error("quantity vector length {got} does not match dataset size {expected}")] DimensionMismatch { expected: usize, got: usize },
    #[error("invalid decay time: {0}")] InvalidTime(f64),
    #[error("value not representable: {0}")] NotRepresentable(f64),
    #[error("decay factor overflows at t = {0} s")] Overflow(f64),
}

#[derive(Error, Debug)]
pub enum NucDecayError {
    #[error(transparent)] Nuclide(#[from] NuclideError),
    #[error(transparent)] Unit(#[from] UnitError),
    #[error(transparent)] Quantity(#[from] QuantityError),
    #[error(transparent)] Dataset(#[from] DatasetError),
    #[error(transparent)] Decay(#[from] DecayError),
}
