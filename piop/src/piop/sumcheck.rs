//! Sum-check: `sum_k C(slot k) = S` for every sum constraint.
//!
//! `F = sum_k beta^(k+1) C_k + M` sums over the `N`-th roots of unity to
//! `sum_k beta^(k+1) S_k + MaskSum`, which pins the constant term of `F mod (X^N - 1)`.

use crate::errors::Result;
use crate::piop::{
    constraint_system::ArithmeticConstraint,
    helpers::{
        batched_constraint_poly, check_remainder_identity, lift, split_remainder, PointValues,
        RemainderSplit,
    },
    indexer::SumCheckIndex,
};
use crate::poly_commit::params::Parameters;
use ark_std::{cfg_iter, end_timer, start_timer};
use latte_algebra::prelude::*;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Compute `F` and split it into quotient and remainders.
pub(crate) fn prove_sumcheck(
    params: &Parameters,
    sum: &SumCheckIndex,
    weights: &[BigUint],
    witnesses: &[Vec<BigUint>],
    publics: &[Vec<BigUint>],
    mask: &[BigUint],
) -> RemainderSplit {
    let timer = start_timer!(|| "Sum check");
    let ring = &sum.ring;
    let reducer = ring.reducer();
    let witnesses: Vec<Vec<BigUint>> = cfg_iter!(witnesses).map(|w| lift(ring, w)).collect();
    let publics: Vec<Vec<BigUint>> = cfg_iter!(publics).map(|p| lift(ring, p)).collect();
    let constraints: Vec<(&ArithmeticConstraint, &BigUint)> = sum
        .constraints
        .iter()
        .map(|c| &c.constraint)
        .zip(weights.iter())
        .collect();
    let mut f = batched_constraint_poly(ring, &constraints, &witnesses, &publics);
    f.truncate(sum.len);
    for (c, m) in f.iter_mut().zip(mask.iter()) {
        *c = reducer.add(c, m);
    }
    let split = split_remainder(params, &f, sum.len - params.degree());
    end_timer!(timer);
    split
}

/// The claimed sum of `F` over the roots of unity.
pub(crate) fn sumcheck_total(
    params: &Parameters,
    sum: &SumCheckIndex,
    weights: &[BigUint],
    mask_sum: &BigUint,
) -> BigUint {
    let reducer = params.reducer();
    sum.constraints
        .iter()
        .zip(weights.iter())
        .fold(mask_sum.clone(), |acc, (c, w)| {
            reducer.add(&acc, &reducer.mul(&c.sum, w))
        })
}

/// Check the sum-check identity from the evaluations at `x`.
pub(crate) fn verify_sumcheck(
    params: &Parameters,
    sum: &SumCheckIndex,
    weights: &[BigUint],
    point: &PointValues,
    x: &BigUint,
    mask_sum: &BigUint,
    evals: [&BigUint; 4],
) -> Result<()> {
    let reducer = params.reducer();
    let [mask_eval, quotient_eval, remainder_eval, remainder_shift_eval] = evals;
    let f = sum
        .constraints
        .iter()
        .zip(weights.iter())
        .fold(mask_eval.clone(), |acc, (c, w)| {
            reducer.add(&acc, &reducer.mul(&c.constraint.evaluate(point, reducer), w))
        });
    check_remainder_identity(
        params,
        x,
        &f,
        &sumcheck_total(params, sum, weights, mask_sum),
        quotient_eval,
        remainder_eval,
        remainder_shift_eval,
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::piop::{
        constraint_system::{CircuitBuilder, Term},
        helpers::{embed_public, embed_witness, sample_mask},
        indexer::compile_builder,
    };
    use crate::poly_commit::params::ParametersLiteral;
    use crate::utils::challenge_powers;

    fn check(offset: u32) -> bool {
        let mut prng = test_rng();
        let params = ParametersLiteral::test().compile().unwrap();
        let n = params.degree();
        let reducer = params.reducer();

        let ys: Vec<BigUint> = (0..n as u32).map(BigUint::from).collect();
        let ps = prng.sample_uniform_vec(&params.modulus, n);
        let total: BigUint = ys.iter().sum();
        let inner = ys
            .iter()
            .zip(ps.iter())
            .fold(BigUint::zero(), |acc, (a, b)| reducer.add(&acc, &reducer.mul(a, b)));

        let mut cs = CircuitBuilder::new();
        let y = cs.new_witness();
        let p = cs.new_public_witness();
        cs.add_sum_check_constraint(y, total + offset);
        cs.add_arithmetic_sum_check_constraint(
            ArithmeticConstraint::new().add_term(Term::new(1).public(p).witness(y)),
            inner,
        );
        let prover = compile_builder(&params, cs).unwrap().0;
        let sum = prover.index.sumcheck.as_ref().unwrap();
        assert_eq!(sum.len, 2 * n);

        let witnesses = vec![embed_witness(&params, &ys, &mut prng)];
        let publics = vec![embed_public(&params, &ps)];
        let beta = prng.sample_uniform(&params.modulus);
        let weights = challenge_powers(&beta, 2, reducer);
        let (mask, mask_sum) = sample_mask(&params, sum.len, &mut prng);
        let split = prove_sumcheck(&params, sum, &weights, &witnesses, &publics, &mask);
        assert_eq!(split.quotient.len(), n);

        let x = prng.sample_uniform(&params.modulus);
        let e = |p: &[BigUint]| reducer.eval_poly(p, &x);
        let w_evals = vec![e(&witnesses[0])];
        let p_evals = vec![e(&publics[0])];
        let point = PointValues {
            witnesses: &w_evals,
            publics: &p_evals,
        };
        verify_sumcheck(
            &params,
            sum,
            &weights,
            &point,
            &x,
            &mask_sum,
            [
                &e(&mask),
                &e(&split.quotient),
                &e(&split.remainder),
                &e(&split.remainder_shift),
            ],
        )
        .is_ok()
    }

    #[test]
    fn sumcheck_completeness() {
        assert!(check(0));
    }

    #[test]
    fn sumcheck_off_by_one() {
        assert!(!check(1));
    }
}
