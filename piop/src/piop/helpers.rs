use crate::errors::{PiopError, Result};
use crate::piop::constraint_system::{ArithmeticConstraint, ConstraintValues, PublicWitness, Witness};
use crate::poly_commit::params::Parameters;
use ark_std::cfg_into_iter;
use latte_algebra::prelude::*;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The cyclic ring modulo `q` of the smallest power-of-two degree holding `len` coefficients.
pub(crate) fn working_ring(params: &Parameters, len: usize) -> Result<Ring> {
    let degree = min_greater_equal_power_of_two(len);
    Ring::new(degree, &params.modulus, RingKind::Cyclic).map_err(|e| match e {
        AlgebraError::NoPrimitiveRoot(_) => PiopError::DegreeError,
        e => PiopError::Algebra(e),
    })
}

/// Interpolate `values` on the `N`-th roots of unity and add a random multiple of `X^N - 1`.
///
/// The result has length `N + 1` and takes the value `values[k]` at the point of NTT slot `k`.
pub(crate) fn embed_witness<R: CryptoRng + RngCore>(
    params: &Parameters,
    values: &[BigUint],
    prng: &mut R,
) -> Vec<BigUint> {
    let mut coeffs = embed_public(params, values);
    let rho = prng.sample_uniform(&params.modulus);
    coeffs[0] = params.reducer().sub(&coeffs[0], &rho);
    coeffs.push(rho);
    coeffs
}

/// Interpolate `values` on the `N`-th roots of unity.
pub(crate) fn embed_public(params: &Parameters, values: &[BigUint]) -> Vec<BigUint> {
    let mut coeffs = values.to_vec();
    params.witness_ring.intt_in_place(&mut coeffs);
    coeffs
}

/// The NTT values of `coeffs` in `ring`, zero-padded to the ring degree.
pub(crate) fn lift(ring: &Ring, coeffs: &[BigUint]) -> Vec<BigUint> {
    let mut values = coeffs.to_vec();
    values.resize(ring.degree(), BigUint::zero());
    ring.ntt_in_place(&mut values);
    values
}

/// The values of every witness and public witness at one NTT slot.
pub(crate) struct SlotValues<'a> {
    pub(crate) witnesses: &'a [Vec<BigUint>],
    pub(crate) publics: &'a [Vec<BigUint>],
    pub(crate) slot: usize,
}

impl<'a> ConstraintValues for SlotValues<'a> {
    fn witness(&self, w: Witness) -> &BigUint {
        &self.witnesses[w.index()][self.slot]
    }

    fn public(&self, p: PublicWitness) -> &BigUint {
        &self.publics[p.index()][self.slot]
    }
}

/// The evaluations of every embedding at the challenge point.
pub(crate) struct PointValues<'a> {
    pub(crate) witnesses: &'a [BigUint],
    pub(crate) publics: &'a [BigUint],
}

impl<'a> ConstraintValues for PointValues<'a> {
    fn witness(&self, w: Witness) -> &BigUint {
        &self.witnesses[w.index()]
    }

    fn public(&self, p: PublicWitness) -> &BigUint {
        &self.publics[p.index()]
    }
}

/// Compute `sum_i weight_i * C_i` as a polynomial in coefficient form of length `ring.degree()`.
///
/// `witnesses` and `publics` hold the NTT values of the embeddings in `ring`.
pub(crate) fn batched_constraint_poly(
    ring: &Ring,
    constraints: &[(&ArithmeticConstraint, &BigUint)],
    witnesses: &[Vec<BigUint>],
    publics: &[Vec<BigUint>],
) -> Vec<BigUint> {
    let reducer = ring.reducer();
    let mut values: Vec<BigUint> = cfg_into_iter!(0..ring.degree())
        .map(|slot| {
            let point = SlotValues {
                witnesses,
                publics,
                slot,
            };
            constraints.iter().fold(BigUint::zero(), |acc, (c, weight)| {
                let v = c.evaluate(&point, reducer);
                reducer.add(&acc, &reducer.mul(&v, weight))
            })
        })
        .collect();
    ring.intt_in_place(&mut values);
    values
}

/// Sample a uniform mask of length `len`, with `N` times its sum over the `N`-th roots of unity.
pub(crate) fn sample_mask<R: CryptoRng + RngCore>(
    params: &Parameters,
    len: usize,
    prng: &mut R,
) -> (Vec<BigUint>, BigUint) {
    let mask = prng.sample_uniform_vec(&params.modulus, len);
    let sum = mask_sum(params, &mask);
    (mask, sum)
}

/// `N * sum_j M_(jN)`, the sum of `M` over the `N`-th roots of unity.
pub(crate) fn mask_sum(params: &Parameters, mask: &[BigUint]) -> BigUint {
    let n = params.degree();
    let reducer = params.reducer();
    let folded = mask
        .iter()
        .step_by(n)
        .fold(BigUint::zero(), |acc, m| reducer.add(&acc, m));
    reducer.mul(&folded, &BigUint::from(n))
}

/// The parts of `F = Q (X^N - 1) + R(0) + X R'` that get committed.
#[derive(Debug)]
pub(crate) struct RemainderSplit {
    pub(crate) quotient: Vec<BigUint>,
    /// `R'`, padded to length `N`.
    pub(crate) remainder: Vec<BigUint>,
    /// `X R'`.
    pub(crate) remainder_shift: Vec<BigUint>,
}

/// Divide `f` by `X^N - 1` and split off the constant term of the remainder.
pub(crate) fn split_remainder(params: &Parameters, f: &[BigUint], quotient_len: usize) -> RemainderSplit {
    let n = params.degree();
    let (mut quotient, rem) = params.witness_ring.quo_rem_by_vanishing(f, n);
    quotient.resize(quotient_len, BigUint::zero());
    let mut remainder = rem[1..].to_vec();
    remainder.push(BigUint::zero());
    let mut remainder_shift = rem;
    remainder_shift[0] = BigUint::zero();
    RemainderSplit {
        quotient,
        remainder,
        remainder_shift,
    }
}

/// `x^N - 1`.
pub(crate) fn vanishing_eval(params: &Parameters, x: &BigUint) -> BigUint {
    let reducer = params.reducer();
    reducer.sub(&reducer.pow(x, params.degree() as u64), &BigUint::one())
}

/// Check `F(x) = Q(x) (x^N - 1) + S / N + RemShift(x)` and `RemShift(x) = x Rem(x)`,
/// where `S` is the claimed sum of `F` over the `N`-th roots of unity.
pub(crate) fn check_remainder_identity(
    params: &Parameters,
    x: &BigUint,
    f_eval: &BigUint,
    total: &BigUint,
    quotient_eval: &BigUint,
    remainder_eval: &BigUint,
    remainder_shift_eval: &BigUint,
) -> Result<()> {
    let reducer = params.reducer();
    if &reducer.mul(x, remainder_eval) != remainder_shift_eval {
        return Err(PiopError::VerificationError);
    }
    let n_inv = mod_inverse(&BigUint::from(params.degree()), &params.modulus)?;
    let rhs = reducer.add(
        &reducer.add(
            &reducer.mul(quotient_eval, &vanishing_eval(params, x)),
            &reducer.mul(total, &n_inv),
        ),
        remainder_shift_eval,
    );
    if &rhs != f_eval {
        return Err(PiopError::VerificationError);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::poly_commit::params::ParametersLiteral;

    #[test]
    fn embedding_agrees_on_the_domain() {
        let mut prng = test_rng();
        let params = ParametersLiteral::test().compile().unwrap();
        let n = params.degree();
        let values = prng.sample_uniform_vec(&params.modulus, n);
        let w = embed_witness(&params, &values, &mut prng);
        assert_eq!(w.len(), n + 1);
        let ring = &params.witness_ring;
        for (k, v) in values.iter().enumerate() {
            let point = ring.evaluation_point(k);
            assert_eq!(&params.reducer().eval_poly(&w, &point), v);
        }

        let wide = working_ring(&params, 2 * n + 1).unwrap();
        let lifted = lift(&wide, &w);
        assert_eq!(lifted.len(), 64);
        let mut back = lifted;
        wide.intt_in_place(&mut back);
        assert_eq!(&back[..n + 1], &w[..]);
    }

    #[test]
    fn remainder_identity() {
        let mut prng = test_rng();
        let params = ParametersLiteral::test().compile().unwrap();
        let n = params.degree();
        let reducer = params.reducer();
        let ring = &params.witness_ring;

        let (mask, mask_sum) = sample_mask(&params, 3 * n, &mut prng);
        let direct = (0..n).fold(BigUint::zero(), |acc, k| {
            reducer.add(&acc, &reducer.eval_poly(&mask, &ring.evaluation_point(k)))
        });
        assert_eq!(mask_sum, direct);

        let split = split_remainder(&params, &mask, 2 * n);
        let x = prng.sample_uniform(&params.modulus);
        let eval = |p: &[BigUint]| reducer.eval_poly(p, &x);
        assert!(check_remainder_identity(
            &params,
            &x,
            &eval(&mask),
            &mask_sum,
            &eval(&split.quotient),
            &eval(&split.remainder),
            &eval(&split.remainder_shift),
        )
        .is_ok());

        let wrong = reducer.add(&mask_sum, &BigUint::one());
        assert!(check_remainder_identity(
            &params,
            &x,
            &eval(&mask),
            &wrong,
            &eval(&split.quotient),
            &eval(&split.remainder),
            &eval(&split.remainder_shift),
        )
        .is_err());
    }
}
