use crate::errors::{PiopError, Result};
use ark_std::fmt::Debug;
use latte_algebra::prelude::*;

/// A linear map on witness vectors with a computable transpose.
///
/// Both maps act on vectors of length `N` through the cyclotomic ring of degree `N`
/// modulo the field modulus.
pub trait LinearTransformer: Send + Sync + Debug {
    /// Apply the map.
    fn apply(&self, ring: &Ring, v: &[BigUint]) -> Result<Vec<BigUint>>;

    /// Apply the transpose of the map.
    fn apply_transpose(&self, ring: &Ring, v: &[BigUint]) -> Result<Vec<BigUint>>;

    /// A description of the map for transcript binding.
    fn to_bytes(&self) -> Vec<u8>;
}

fn check_len(ring: &Ring, v: &[BigUint]) -> Result<()> {
    if v.len() != ring.degree() {
        return Err(PiopError::LengthError {
            expected: ring.degree(),
            found: v.len(),
        });
    }
    Ok(())
}

/// Coefficients to NTT values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NttTransformer;

impl LinearTransformer for NttTransformer {
    fn apply(&self, ring: &Ring, v: &[BigUint]) -> Result<Vec<BigUint>> {
        check_len(ring, v)?;
        let mut out = v.to_vec();
        ring.ntt_in_place(&mut out);
        Ok(out)
    }

    fn apply_transpose(&self, ring: &Ring, v: &[BigUint]) -> Result<Vec<BigUint>> {
        Ok(ring.ntt_transpose(v)?)
    }

    fn to_bytes(&self) -> Vec<u8> {
        b"ntt".to_vec()
    }
}

/// NTT values to coefficients.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InvNttTransformer;

impl LinearTransformer for InvNttTransformer {
    fn apply(&self, ring: &Ring, v: &[BigUint]) -> Result<Vec<BigUint>> {
        check_len(ring, v)?;
        let mut out = v.to_vec();
        ring.intt_in_place(&mut out);
        Ok(out)
    }

    fn apply_transpose(&self, ring: &Ring, v: &[BigUint]) -> Result<Vec<BigUint>> {
        Ok(ring.intt_transpose(v)?)
    }

    fn to_bytes(&self) -> Vec<u8> {
        b"intt".to_vec()
    }
}

/// `X -> X^exponent` applied to NTT values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutomorphismTransformer {
    /// The odd exponent `d`.
    pub exponent: usize,
}

impl AutomorphismTransformer {
    /// The automorphism `X -> X^exponent`.
    pub fn new(exponent: usize) -> Self {
        AutomorphismTransformer { exponent }
    }
}

impl LinearTransformer for AutomorphismTransformer {
    fn apply(&self, ring: &Ring, v: &[BigUint]) -> Result<Vec<BigUint>> {
        check_len(ring, v)?;
        let p = Poly {
            coeffs: v.to_vec(),
            is_ntt: true,
        };
        Ok(ring.automorphism(&p, self.exponent)?.coeffs)
    }

    fn apply_transpose(&self, ring: &Ring, v: &[BigUint]) -> Result<Vec<BigUint>> {
        check_len(ring, v)?;
        Ok(ring.automorphism_transpose(v, self.exponent)?)
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = b"automorphism".to_vec();
        bytes.extend_from_slice(&(self.exponent as u64).to_le_bytes());
        bytes
    }
}
