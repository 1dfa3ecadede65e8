//! Integration test suite for nucdecay.
//!
//! Exercises the solver end to end on the bundled sample dataset and on
//! synthetic chains: closed-form checks, precision agreement, and inventory
//! behaviour across crates.

pub mod helpers;
