//! Test utilities for the ratepack crates.
//!
//! - [`data_gen`]: seeded synthetic rating data
//! - [`fixtures`]: packed rating files in temporary directories

pub mod data_gen;
pub mod fixtures;
