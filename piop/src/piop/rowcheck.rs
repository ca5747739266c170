//! Row-check: every arithmetic constraint vanishes in every slot.
//!
//! The constraints are batched into `T = sum_D sum_i beta_D^(i+1) C_i`, one constant
//! `beta_D` per degree bucket. `T` vanishes on the `N`-th roots of unity iff all
//! constraints hold, so the prover commits to `Q = T / (X^N - 1)` and the verifier
//! checks `T(x) = Q(x) (x^N - 1)`.

use crate::errors::{PiopError, Result};
use crate::piop::{
    constraint_system::ArithmeticConstraint,
    helpers::{batched_constraint_poly, lift, vanishing_eval, PointValues},
    indexer::RowCheckIndex,
};
use crate::poly_commit::params::Parameters;
use crate::utils::challenge_powers;
use ark_std::{cfg_iter, end_timer, start_timer};
use latte_algebra::prelude::*;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The weight of every constraint: `beta_D^(i+1)` for the `i`-th constraint of bucket `D`.
pub(crate) fn rowcheck_weights(row: &RowCheckIndex, betas: &[BigUint], reducer: &Reducer) -> Vec<BigUint> {
    let mut weights = vec![BigUint::zero(); row.constraints.len()];
    for (bucket, beta) in row.buckets.iter().zip(betas.iter()) {
        for (i, w) in bucket
            .iter()
            .zip(challenge_powers(beta, bucket.len(), reducer))
        {
            weights[*i] = w;
        }
    }
    weights
}

fn weighted<'a>(
    constraints: &'a [ArithmeticConstraint],
    weights: &'a [BigUint],
) -> Vec<(&'a ArithmeticConstraint, &'a BigUint)> {
    constraints.iter().zip(weights.iter()).collect()
}

/// Compute the quotient of the batched constraint polynomial by `X^N - 1`.
///
/// `witnesses` are the masked embeddings and `publics` the public embeddings.
pub(crate) fn prove_rowcheck(
    params: &Parameters,
    row: &RowCheckIndex,
    weights: &[BigUint],
    witnesses: &[Vec<BigUint>],
    publics: &[Vec<BigUint>],
) -> Vec<BigUint> {
    let timer = start_timer!(|| "Row check");
    let ring = &row.ring;
    let witnesses: Vec<Vec<BigUint>> = cfg_iter!(witnesses).map(|w| lift(ring, w)).collect();
    let publics: Vec<Vec<BigUint>> = cfg_iter!(publics).map(|p| lift(ring, p)).collect();
    let t = batched_constraint_poly(
        ring,
        &weighted(&row.constraints, weights),
        &witnesses,
        &publics,
    );
    let (mut quotient, _) = ring.quo_rem_by_vanishing(&t, params.degree());
    quotient.resize(row.quotient_len, BigUint::zero());
    end_timer!(timer);
    quotient
}

/// Check `T(x) = Q(x) (x^N - 1)`.
pub(crate) fn verify_rowcheck(
    params: &Parameters,
    row: &RowCheckIndex,
    weights: &[BigUint],
    point: &PointValues,
    x: &BigUint,
    quotient_eval: &BigUint,
) -> Result<()> {
    let reducer = params.reducer();
    let t = weighted(&row.constraints, weights)
        .into_iter()
        .fold(BigUint::zero(), |acc, (c, w)| {
            reducer.add(&acc, &reducer.mul(&c.evaluate(point, reducer), w))
        });
    if t != reducer.mul(quotient_eval, &vanishing_eval(params, x)) {
        return Err(PiopError::VerificationError);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::piop::{
        constraint_system::{CircuitBuilder, Term},
        helpers::{embed_public, embed_witness},
        indexer::compile_builder,
    };
    use crate::poly_commit::params::ParametersLiteral;

    fn product_index(params: &Parameters) -> crate::piop::prover::Prover {
        let mut cs = CircuitBuilder::new();
        let x = cs.new_witness();
        let y = cs.new_public_witness();
        let z = cs.new_witness();
        cs.add_arithmetic_constraint(
            ArithmeticConstraint::new()
                .add_term(Term::new(1).witness(z))
                .add_term(Term::new(-1).public(y).witness(x)),
        );
        cs.add_arithmetic_constraint(
            ArithmeticConstraint::new()
                .add_term(Term::new(1).witness(x).witness(x))
                .add_term(Term::new(-1).witness(x)),
        );
        compile_builder(params, cs).unwrap().0
    }

    fn check(valid: bool) -> bool {
        let mut prng = test_rng();
        let params = ParametersLiteral::test().compile().unwrap();
        let prover = product_index(&params);
        let row = prover.index.rowcheck.as_ref().unwrap();
        let reducer = params.reducer();
        let n = params.degree();

        let xs: Vec<BigUint> = (0..n).map(|i| BigUint::from((i % 2) as u32)).collect();
        let ys = prng.sample_uniform_vec(&params.modulus, n);
        let mut zs: Vec<BigUint> = xs.iter().zip(ys.iter()).map(|(a, b)| reducer.mul(a, b)).collect();
        if !valid {
            zs[n - 1] = reducer.add(&zs[n - 1], &BigUint::one());
        }

        let witnesses = vec![
            embed_witness(&params, &xs, &mut prng),
            embed_witness(&params, &zs, &mut prng),
        ];
        let publics = vec![embed_public(&params, &ys)];
        let betas = vec![
            prng.sample_uniform(&params.modulus),
            prng.sample_uniform(&params.modulus),
        ];
        let weights = rowcheck_weights(row, &betas, reducer);
        let quotient = prove_rowcheck(&params, row, &weights, &witnesses, &publics);
        assert_eq!(quotient.len(), row.quotient_len);

        let x = prng.sample_uniform(&params.modulus);
        let w_evals: Vec<BigUint> = witnesses.iter().map(|w| reducer.eval_poly(w, &x)).collect();
        let p_evals: Vec<BigUint> = publics.iter().map(|p| reducer.eval_poly(p, &x)).collect();
        let point = PointValues {
            witnesses: &w_evals,
            publics: &p_evals,
        };
        verify_rowcheck(
            &params,
            row,
            &weights,
            &point,
            &x,
            &reducer.eval_poly(&quotient, &x),
        )
        .is_ok()
    }

    #[test]
    fn rowcheck_completeness() {
        assert!(check(true));
    }

    #[test]
    fn rowcheck_soundness() {
        assert!(!check(false));
    }

    #[test]
    fn weights_per_bucket() {
        let params = ParametersLiteral::test().compile().unwrap();
        let prover = product_index(&params);
        let row = prover.index.rowcheck.as_ref().unwrap();
        let betas = vec![BigUint::from(3u32), BigUint::from(5u32)];
        let weights = rowcheck_weights(row, &betas, params.reducer());
        // the product constraint has degree 1, the bit constraint degree 2
        assert_eq!(weights, vec![BigUint::from(3u32), BigUint::from(5u32)]);
    }
}
