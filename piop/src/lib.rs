//! A lattice-based polynomial IOP.
//!
//! Big-integer witness vectors are committed with an Ajtai commitment over a cyclotomic
//! ring, and batches of arithmetic, linear-transform and sum constraints are reduced to
//! polynomial identities checked at a single Fiat-Shamir point.
#![deny(warnings)]
#![allow(clippy::needless_borrow)]
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::too_many_arguments)]

#[macro_use]
extern crate serde_derive;

/// Module for errors.
pub mod errors;

/// Module for the polynomial IOP.
pub mod piop;

/// Module for the polynomial commitment scheme.
pub mod poly_commit;

/// Module for shared helpers.
pub mod utils;
