//! The polynomial commitment scheme.
//!
//! A vector of residues modulo `q = b^r + 1` is cut into chunks of `C` values. Each chunk
//! is written in base `b` into the slots of a few ring elements of degree `d`, and the
//! elements are committed with an Ajtai commitment. Openings are proved with a batched
//! Schnorr-like protocol using monomial challenges; an evaluation at `x` is proved by
//! recombining the chunk openings with powers of `x`.

/// Module for the commit key and the Ajtai commitment.
pub mod ajtai;

/// Module for the base-`b` encoder.
pub mod encoder;

/// Module for parameters.
pub mod params;

/// Module for commitment and proof types.
pub mod pcs;

/// Module for the committing prover.
pub mod prover;

/// Module for the transcript extension.
pub mod transcript;

/// Module for the verifier.
pub mod verifier;
