use crate::errors::{PiopError, Result};
use crate::piop::{
    helpers::{embed_public, PointValues},
    indexer::{MaskedCheckProof, PiopIndex, PiopProof},
    lincheck::{verify_lincheck, LinCheckPolys},
    rowcheck::{rowcheck_weights, verify_rowcheck},
    sumcheck::verify_sumcheck,
    transcript::{
        transcript_append_public_values, transcript_get_lincheck_vector,
        transcript_get_piop_challenge_beta, transcript_get_piop_challenge_x, transcript_init_piop,
    },
};
use crate::poly_commit::{
    ajtai::CommitKey,
    pcs::{Commitment, EvalProof},
    transcript::PolyComTranscript,
    verifier::PcsVerifier,
};
use crate::utils::challenge_powers;
use ark_std::{end_timer, start_timer, sync::Arc};
use latte_algebra::prelude::*;
use merlin::Transcript;

/// The verifier of a compiled relation.
#[derive(Clone, Debug)]
pub struct Verifier {
    pub(crate) index: Arc<PiopIndex>,
}

fn masked_commitments(p: &MaskedCheckProof) -> [&Commitment; 3] {
    [&p.quotient, &p.remainder, &p.remainder_shift]
}

fn ensure(ok: bool) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(PiopError::VerificationError)
    }
}

impl Verifier {
    /// The compiled relation.
    pub fn index(&self) -> &PiopIndex {
        &self.index
    }

    /// Verify a proof.
    pub fn verify(&self, ck: &CommitKey, proof: &PiopProof) -> bool {
        self.verify_detailed(ck, proof).is_ok()
    }

    /// Reject proofs whose shape does not match the relation.
    fn check_shape(&self, pcs: &PcsVerifier, proof: &PiopProof) -> Result<()> {
        let index = &self.index;
        let params = &index.params;
        let n = params.degree();
        ensure(proof.public_values.len() == index.num_public)?;
        ensure(proof.public_values.iter().all(|v| {
            v.len() == n && v.iter().all(|c| c < &params.modulus)
        }))?;
        ensure(proof.witness_commitments.len() == index.num_witnesses)?;
        ensure(proof.witness_evals.len() == index.num_witnesses)?;
        for c in proof.witness_commitments.iter() {
            pcs.check_commitment(c, index.embedding_len())?;
        }

        match (&index.rowcheck, &proof.rowcheck) {
            (Some(row), Some(p)) => pcs.check_commitment(&p.quotient, row.quotient_len)?,
            (None, None) => {}
            _ => return Err(PiopError::VerificationError),
        }
        let check_masked = |p: &MaskedCheckProof, len: usize| -> Result<()> {
            ensure(p.mask_sum < params.modulus)?;
            pcs.check_commitment(&p.mask, len)?;
            pcs.check_commitment(&p.quotient, len - n)?;
            pcs.check_commitment(&p.remainder, n)?;
            pcs.check_commitment(&p.remainder_shift, n)
        };
        match (&index.lincheck, &proof.lincheck) {
            (Some(_), Some(p)) => check_masked(p, 2 * n)?,
            (None, None) => {}
            _ => return Err(PiopError::VerificationError),
        }
        match (&index.sumcheck, &proof.sumcheck) {
            (Some(sum), Some(p)) => check_masked(p, sum.len)?,
            (None, None) => {}
            _ => return Err(PiopError::VerificationError),
        }
        Ok(())
    }

    /// [`Verifier::verify`] returning the reason of a rejection.
    pub fn verify_detailed(&self, ck: &CommitKey, proof: &PiopProof) -> Result<()> {
        let timer = start_timer!(|| "Verify");
        let index = &self.index;
        let params = &index.params;
        let reducer = params.reducer();
        let q = &params.modulus;
        let n = params.degree();
        ck.check(params)?;
        let pcs = PcsVerifier::new(params, ck);
        self.check_shape(&pcs, proof)?;

        let mut transcript = Transcript::new(b"Latte PIOP");
        transcript_init_piop(&mut transcript, index, ck);
        transcript_append_public_values(&mut transcript, &proof.public_values);

        // 1. the witness commitments and their opening proof.
        for c in proof.witness_commitments.iter() {
            transcript.append_commitment(c);
        }
        pcs.verify_opening_detailed(
            &mut transcript,
            &proof.witness_commitments.iter().collect::<Vec<_>>(),
            &proof.witness_opening_proof,
        )?;

        // 2. the masks.
        for p in proof.lincheck.iter().chain(proof.sumcheck.iter()) {
            transcript.append_commitment(&p.mask);
            transcript.append_field_elem(&p.mask_sum);
        }

        // 3. batching challenges.
        let row_weights = index.rowcheck.as_ref().map(|row| {
            let betas: Vec<BigUint> = row
                .buckets
                .iter()
                .map(|_| transcript_get_piop_challenge_beta(&mut transcript, b"row check beta", q))
                .collect();
            rowcheck_weights(row, &betas, reducer)
        });
        let lin_challenges = match &index.lincheck {
            Some(lin) => {
                let beta = transcript_get_piop_challenge_beta(&mut transcript, b"lin check beta", q);
                let v = transcript_get_lincheck_vector(&mut transcript, q, n);
                let polys = LinCheckPolys::new(params, lin, &v)?;
                Some((challenge_powers(&beta, lin.constraints.len(), reducer), polys))
            }
            None => None,
        };
        let sum_weights = index.sumcheck.as_ref().map(|sum| {
            let beta = transcript_get_piop_challenge_beta(&mut transcript, b"sum check beta", q);
            challenge_powers(&beta, sum.constraints.len(), reducer)
        });

        // 4. the sub-protocol commitments and their opening proof.
        let num_masks = proof.lincheck.iter().count() + proof.sumcheck.iter().count();
        let aux: Vec<&Commitment> = proof
            .lincheck
            .iter()
            .chain(proof.sumcheck.iter())
            .map(|p| &p.mask)
            .chain(proof.rowcheck.iter().map(|p| &p.quotient))
            .chain(proof.lincheck.iter().flat_map(masked_commitments))
            .chain(proof.sumcheck.iter().flat_map(masked_commitments))
            .collect();
        for c in aux.iter().skip(num_masks) {
            transcript.append_commitment(*c);
        }
        pcs.verify_opening_detailed(&mut transcript, &aux, &proof.aux_opening_proof)?;

        // 5. the evaluations at x.
        let x = transcript_get_piop_challenge_x(&mut transcript, reducer, n);
        for (c, e) in proof.witness_commitments.iter().zip(proof.witness_evals.iter()) {
            pcs.verify_eval_detailed(&x, c, e)?;
        }
        let witness_evals: Vec<BigUint> = proof.witness_evals.iter().map(|e| e.value.clone()).collect();
        let public_evals: Vec<BigUint> = proof
            .public_values
            .iter()
            .map(|v| reducer.eval_poly(&embed_public(params, v), &x))
            .collect();
        let point = PointValues {
            witnesses: &witness_evals,
            publics: &public_evals,
        };

        if let (Some(row), Some(p), Some(w)) = (&index.rowcheck, &proof.rowcheck, &row_weights) {
            pcs.verify_eval_detailed(&x, &p.quotient, &p.quotient_eval)?;
            verify_rowcheck(params, row, w, &point, &x, &p.quotient_eval.value)?;
        }
        if let (Some(lin), Some(p), Some((w, polys))) =
            (&index.lincheck, &proof.lincheck, &lin_challenges)
        {
            let evals = self.verify_masked_evals(&pcs, &x, p)?;
            verify_lincheck(params, lin, w, polys, &witness_evals, &x, &p.mask_sum, evals)?;
        }
        if let (Some(sum), Some(p), Some(w)) = (&index.sumcheck, &proof.sumcheck, &sum_weights) {
            let evals = self.verify_masked_evals(&pcs, &x, p)?;
            verify_sumcheck(params, sum, w, &point, &x, &p.mask_sum, evals)?;
        }
        end_timer!(timer);
        Ok(())
    }

    fn verify_masked_evals<'a>(
        &self,
        pcs: &PcsVerifier,
        x: &BigUint,
        p: &'a MaskedCheckProof,
    ) -> Result<[&'a BigUint; 4]> {
        let pairs: [(&Commitment, &EvalProof); 4] = [
            (&p.mask, &p.mask_eval),
            (&p.quotient, &p.quotient_eval),
            (&p.remainder, &p.remainder_eval),
            (&p.remainder_shift, &p.remainder_shift_eval),
        ];
        for (c, e) in pairs.iter() {
            pcs.verify_eval_detailed(x, c, e)?;
        }
        Ok([
            &p.mask_eval.value,
            &p.quotient_eval.value,
            &p.remainder_eval.value,
            &p.remainder_shift_eval.value,
        ])
    }
}
