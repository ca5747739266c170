#![deny(warnings)]
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::needless_range_loop)]

#[macro_use]
extern crate serde_derive;

/// Module for the Barrett reducer.
pub mod barrett;

/// Module for errors.
pub mod errors;

/// Module for the prelude.
pub mod prelude;

/// Module for test random number generators.
pub mod rand_helper;

/// Module for cyclic and cyclotomic polynomial rings.
pub mod ring;

/// Module for uniform and discrete Gaussian samplers.
pub mod sampler;

/// Module for number-theoretic utilities.
pub mod utils;
