//! Lin-check: `w_out = T_k(w_in)` for every linear constraint `k`.
//!
//! For a random `v`, the identity reduces to `<w_out, v> = <w_in, T_k^t v>`. With `V` and
//! `V*_k` the interpolations of `v` and `T_k^t v` on the `N`-th roots of unity, the
//! polynomial `F = sum_k beta^(k+1) (W_out V - W_in V*_k) + M` sums over the roots to the
//! mask sum alone.

use crate::errors::Result;
use crate::piop::{
    helpers::{check_remainder_identity, embed_public, lift, split_remainder, RemainderSplit},
    indexer::LinCheckIndex,
};
use crate::poly_commit::params::Parameters;
use ark_std::{cfg_into_iter, cfg_iter, end_timer, start_timer};
use latte_algebra::prelude::*;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The interpolations `V` and `V*_k` of the challenge vector and its transposed transforms.
#[derive(Debug)]
pub(crate) struct LinCheckPolys {
    pub(crate) v: Vec<BigUint>,
    pub(crate) v_star: Vec<Vec<BigUint>>,
}

impl LinCheckPolys {
    pub(crate) fn new(params: &Parameters, lin: &LinCheckIndex, v: &[BigUint]) -> Result<Self> {
        let v_star = lin
            .constraints
            .iter()
            .map(|c| {
                let t = c.transformer.apply_transpose(&params.transform_ring, v)?;
                Ok(embed_public(params, &t))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(LinCheckPolys {
            v: embed_public(params, v),
            v_star,
        })
    }
}

/// Compute `F` and split it into quotient and remainders.
pub(crate) fn prove_lincheck(
    params: &Parameters,
    lin: &LinCheckIndex,
    weights: &[BigUint],
    polys: &LinCheckPolys,
    witnesses: &[Vec<BigUint>],
    mask: &[BigUint],
) -> RemainderSplit {
    let timer = start_timer!(|| "Lin check");
    let ring = &lin.ring;
    let reducer = ring.reducer();
    let v = lift(ring, &polys.v);
    let v_star: Vec<Vec<BigUint>> = cfg_iter!(polys.v_star).map(|p| lift(ring, p)).collect();
    let inputs: Vec<Vec<BigUint>> = cfg_iter!(lin.constraints)
        .map(|c| lift(ring, &witnesses[c.input.index()]))
        .collect();
    let outputs: Vec<Vec<BigUint>> = cfg_iter!(lin.constraints)
        .map(|c| lift(ring, &witnesses[c.output.index()]))
        .collect();

    let mut f: Vec<BigUint> = cfg_into_iter!(0..ring.degree())
        .map(|s| {
            weights
                .iter()
                .enumerate()
                .fold(BigUint::zero(), |acc, (k, weight)| {
                    let term = reducer.sub(
                        &reducer.mul(&outputs[k][s], &v[s]),
                        &reducer.mul(&inputs[k][s], &v_star[k][s]),
                    );
                    reducer.add(&acc, &reducer.mul(&term, weight))
                })
        })
        .collect();
    ring.intt_in_place(&mut f);
    for (c, m) in f.iter_mut().zip(mask.iter()) {
        *c = reducer.add(c, m);
    }
    let split = split_remainder(params, &f, params.degree());
    end_timer!(timer);
    split
}

/// Check the lin-check identity from the evaluations at `x`.
///
/// `witness_evals` are the evaluations of all witness embeddings.
pub(crate) fn verify_lincheck(
    params: &Parameters,
    lin: &LinCheckIndex,
    weights: &[BigUint],
    polys: &LinCheckPolys,
    witness_evals: &[BigUint],
    x: &BigUint,
    mask_sum: &BigUint,
    evals: [&BigUint; 4],
) -> Result<()> {
    let reducer = params.reducer();
    let [mask_eval, quotient_eval, remainder_eval, remainder_shift_eval] = evals;
    let v = reducer.eval_poly(&polys.v, x);
    let mut f = mask_eval.clone();
    for ((c, weight), v_star) in lin
        .constraints
        .iter()
        .zip(weights.iter())
        .zip(polys.v_star.iter())
    {
        let term = reducer.sub(
            &reducer.mul(&witness_evals[c.output.index()], &v),
            &reducer.mul(&witness_evals[c.input.index()], &reducer.eval_poly(v_star, x)),
        );
        f = reducer.add(&f, &reducer.mul(&term, weight));
    }
    check_remainder_identity(
        params,
        x,
        &f,
        mask_sum,
        quotient_eval,
        remainder_eval,
        remainder_shift_eval,
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::piop::{
        constraint_system::{AutomorphismTransformer, CircuitBuilder, LinearTransformer, NttTransformer},
        helpers::{embed_witness, sample_mask},
        indexer::compile_builder,
    };
    use crate::poly_commit::params::ParametersLiteral;
    use crate::utils::challenge_powers;

    fn check(exponent: usize) -> bool {
        let mut prng = test_rng();
        let params = ParametersLiteral::test().compile().unwrap();
        let n = params.degree();
        let reducer = params.reducer();
        let mut cs = CircuitBuilder::new();
        let a = cs.new_witness();
        let b = cs.new_witness();
        let c = cs.new_witness();
        cs.add_linear_constraint(NttTransformer, a, b);
        cs.add_linear_constraint(AutomorphismTransformer::new(5), b, c);
        let prover = compile_builder(&params, cs).unwrap().0;
        let lin = prover.index.lincheck.as_ref().unwrap();

        let ring = &params.transform_ring;
        let av = prng.sample_uniform_vec(&params.modulus, n);
        let bv = NttTransformer.apply(ring, &av).unwrap();
        let cv = AutomorphismTransformer::new(exponent).apply(ring, &bv).unwrap();
        let witnesses: Vec<Vec<BigUint>> = [av, bv, cv]
            .iter()
            .map(|w| embed_witness(&params, w, &mut prng))
            .collect();

        let v = prng.sample_uniform_vec(&params.modulus, n);
        let polys = LinCheckPolys::new(&params, lin, &v).unwrap();
        let beta = prng.sample_uniform(&params.modulus);
        let weights = challenge_powers(&beta, 2, reducer);
        let (mask, mask_sum) = sample_mask(&params, 2 * n, &mut prng);
        let split = prove_lincheck(&params, lin, &weights, &polys, &witnesses, &mask);
        assert_eq!(split.quotient.len(), n);

        let x = prng.sample_uniform(&params.modulus);
        let evals: Vec<BigUint> = witnesses.iter().map(|w| reducer.eval_poly(w, &x)).collect();
        let e = |p: &[BigUint]| reducer.eval_poly(p, &x);
        verify_lincheck(
            &params,
            lin,
            &weights,
            &polys,
            &evals,
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
    fn lincheck_completeness() {
        assert!(check(5));
    }

    #[test]
    fn lincheck_wrong_automorphism() {
        assert!(!check(7));
    }
}
