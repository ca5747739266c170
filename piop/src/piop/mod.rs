//! The polynomial IOP: a relation is declared on a [`constraint_system::CircuitBuilder`],
//! compiled into a [`prover::Prover`] and a [`verifier::Verifier`], and proven by
//! reducing its constraints to row-check, lin-check and sum-check identities on the
//! committed witness embeddings.

/// Module for declaring relations.
pub mod constraint_system;

pub(crate) mod helpers;

/// Module for compiling relations and the proof data structures.
pub mod indexer;

pub(crate) mod lincheck;

/// Module for the prover.
pub mod prover;

pub(crate) mod rowcheck;

pub(crate) mod sumcheck;

pub(crate) mod transcript;

/// Module for the verifier.
pub mod verifier;

pub use indexer::{compile, compile_builder, PiopIndex, PiopProof};
pub use prover::{Assignment, Prover};
pub use verifier::Verifier;
