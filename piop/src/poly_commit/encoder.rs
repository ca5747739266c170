//! Digit encoding of big-integer vectors into commitment ring elements.
//!
//! A ring element of degree `d` holds `s = d / r` values. Value `i` of the element
//! occupies the coefficients `j * s + i` for `j < r`, one base-`b` digit each, so
//! decoding is a centered lift followed by Horner's rule in base `b`.

use crate::errors::{PiopError, Result};
use crate::poly_commit::params::Parameters;
use latte_algebra::prelude::*;

/// Encodes and decodes big-integer vectors for one parameter set.
#[derive(Clone, Copy, Debug)]
pub struct Encoder<'a> {
    params: &'a Parameters,
}

impl<'a> Encoder<'a> {
    /// Create an encoder.
    pub fn new(params: &'a Parameters) -> Self {
        Encoder { params }
    }

    /// The base-`b` digits of `v`, least significant first.
    ///
    /// `v = b^r`, the only residue with `r + 1` digits, is written as the single digit `-1`.
    fn digits(&self, v: &BigUint) -> Result<Vec<BigInt>> {
        let p = self.params;
        if v >= &p.modulus {
            return Err(PiopError::ValueOutOfRange);
        }
        let r = p.digits();
        let mut out = vec![BigInt::zero(); r];
        if v == &(&p.modulus - 1u32) {
            out[0] = BigInt::from(-1);
            return Ok(out);
        }
        let mut rest = v.clone();
        for d in out.iter_mut() {
            let (quo, rem) = rest.div_rem(&p.modulus_base);
            *d = BigInt::from_biguint(Sign::Plus, rem);
            rest = quo;
        }
        Ok(out)
    }

    fn check_len(&self, values: &[BigUint], max: usize) -> Result<()> {
        if values.len() > max {
            return Err(PiopError::LengthError {
                expected: max,
                found: values.len(),
            });
        }
        Ok(())
    }

    fn to_ring(&self, coeffs: &[BigInt]) -> Result<Poly> {
        let ring = &self.params.base_ring;
        let mut p = ring.from_signed(coeffs)?;
        ring.to_ntt_assign(&mut p)?;
        Ok(p)
    }

    /// Encode up to `s` values into one ring element in NTT form.
    pub fn encode(&self, values: &[BigUint]) -> Result<Poly> {
        let p = self.params;
        self.check_len(values, p.slots)?;
        let mut coeffs = vec![BigInt::zero(); p.ring_degree()];
        for (i, v) in values.iter().enumerate() {
            for (j, d) in self.digits(v)?.into_iter().enumerate() {
                coeffs[j * p.slots + i] = d;
            }
        }
        self.to_ring(&coeffs)
    }

    /// Encode up to `s` values with Gaussian-randomized digits, in NTT form.
    ///
    /// Every digit but the top one absorbs a multiple of `b` sampled around the value
    /// that cancels the digit, and the next digit carries the compensation, so the
    /// base-`b` reconstruction is unchanged while the low digits have deviation `std_dev`.
    pub fn random_encode<R: CryptoRng + RngCore>(
        &self,
        values: &[BigUint],
        std_dev: f64,
        prng: &mut R,
    ) -> Result<Poly> {
        let p = self.params;
        self.check_len(values, p.slots)?;
        let base = BigInt::from_biguint(Sign::Plus, p.modulus_base.clone());
        let base_f = p.literal.modulus_base as f64;
        let r = p.digits();
        let zero = BigUint::zero();

        let mut coeffs = vec![BigInt::zero(); p.ring_degree()];
        for i in 0..p.slots {
            let digits = self.digits(values.get(i).unwrap_or(&zero))?;
            let mut carry = BigInt::zero();
            for (j, d) in digits.into_iter().enumerate() {
                let t = d + &carry;
                if j + 1 == r {
                    coeffs[j * p.slots + i] = t;
                    break;
                }
                let center = -t.to_f64().unwrap_or(0.0) / base_f;
                let k = prng.sample_gaussian(center, std_dev / base_f);
                coeffs[j * p.slots + i] = &t + &k * &base;
                carry = -k;
            }
        }
        self.to_ring(&coeffs)
    }

    /// Encode up to `C` values into `C / s` ring elements.
    pub fn encode_chunk(&self, values: &[BigUint]) -> Result<Vec<Poly>> {
        let p = self.params;
        self.check_len(values, p.chunk_size())?;
        (0..p.ring_chunks)
            .map(|c| self.encode(slot_window(values, c, p.slots)))
            .collect()
    }

    /// Randomized [`Encoder::encode_chunk`].
    pub fn random_encode_chunk<R: CryptoRng + RngCore>(
        &self,
        values: &[BigUint],
        std_dev: f64,
        prng: &mut R,
    ) -> Result<Vec<Poly>> {
        let p = self.params;
        self.check_len(values, p.chunk_size())?;
        (0..p.ring_chunks)
            .map(|c| self.random_encode(slot_window(values, c, p.slots), std_dev, prng))
            .collect()
    }

    /// Decode the `s` values of a ring element in either representation.
    pub fn decode(&self, poly: &Poly) -> Result<Vec<BigUint>> {
        let p = self.params;
        let ring = &p.base_ring;
        let poly = ring.to_coeff(poly)?;
        let base = BigInt::from_biguint(Sign::Plus, p.modulus_base.clone());
        let lifted: Vec<BigInt> = poly
            .coeffs
            .iter()
            .map(|c| centered_lift(c, ring.modulus()))
            .collect();
        Ok((0..p.slots)
            .map(|i| {
                let mut acc = BigInt::zero();
                for j in (0..p.digits()).rev() {
                    acc = acc * &base + &lifted[j * p.slots + i];
                }
                reduce_signed(&acc, &p.modulus)
            })
            .collect())
    }

    /// Decode the `C` values of a chunk.
    pub fn decode_chunk(&self, polys: &[Poly]) -> Result<Vec<BigUint>> {
        let p = self.params;
        if polys.len() != p.ring_chunks {
            return Err(PiopError::LengthError {
                expected: p.ring_chunks,
                found: polys.len(),
            });
        }
        let mut out = Vec::with_capacity(p.chunk_size());
        for poly in polys {
            out.extend(self.decode(poly)?);
        }
        Ok(out)
    }
}

/// The values of ring element `c` within a chunk, possibly shorter than `slots`.
fn slot_window(values: &[BigUint], c: usize, slots: usize) -> &[BigUint] {
    let start = (c * slots).min(values.len());
    let end = ((c + 1) * slots).min(values.len());
    &values[start..end]
}
