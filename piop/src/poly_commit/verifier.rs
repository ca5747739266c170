use crate::errors::{PiopError, Result};
use crate::poly_commit::{
    ajtai::CommitKey,
    encoder::Encoder,
    params::Parameters,
    pcs::{AjtaiCommitment, Commitment, EvalProof, MaskedOpening, OpeningProof},
    prover::evaluation_scalars,
    transcript::PolyComTranscript,
};
use ark_std::{end_timer, start_timer};
use latte_algebra::prelude::*;
use merlin::Transcript;

/// Checks opening and evaluation proofs against commitments.
#[derive(Clone, Copy, Debug)]
pub struct PcsVerifier<'a> {
    params: &'a Parameters,
    ck: &'a CommitKey,
    encoder: Encoder<'a>,
}

impl<'a> PcsVerifier<'a> {
    /// Create a verifier over a commit key.
    pub fn new(params: &'a Parameters, ck: &'a CommitKey) -> Self {
        PcsVerifier {
            params,
            ck,
            encoder: Encoder::new(params),
        }
    }

    fn check_ajtai(&self, com: &AjtaiCommitment) -> Result<()> {
        let ring = &self.params.base_ring;
        let q = ring.modulus();
        let ok = com.0.len() == self.params.ajtai_size()
            && com
                .0
                .iter()
                .all(|p| p.is_ntt && p.len() == ring.degree() && p.coeffs.iter().all(|c| c < q));
        if !ok {
            return Err(PiopError::VerificationError);
        }
        Ok(())
    }

    /// Reject commitments that are not well-formed.
    pub fn check_commitment(&self, com: &Commitment, len: usize) -> Result<()> {
        if com.len() != self.params.commitment_len(len) {
            return Err(PiopError::VerificationError);
        }
        com.0.iter().try_for_each(|c| self.check_ajtai(c))
    }

    /// Check the shape of a masked opening and return it in NTT form.
    fn check_masked(&self, opening: &MaskedOpening, bound_sq: &BigUint) -> Result<(Vec<Poly>, Vec<Poly>)> {
        let p = self.params;
        let ring = &p.base_ring;
        let q = ring.modulus();
        let well_formed = opening.mask.len() == p.ring_chunks
            && opening.rand.len() == p.rand_size()
            && opening
                .mask
                .iter()
                .chain(opening.rand.iter())
                .all(|x| !x.is_ntt && x.len() == ring.degree() && x.coeffs.iter().all(|c| c < q));
        if !well_formed {
            return Err(PiopError::VerificationError);
        }
        if &centered_norm_squared(opening.coeffs(), q) > bound_sq {
            return Err(PiopError::VerificationError);
        }
        let to_ntt = |v: &[Poly]| -> Result<Vec<Poly>> {
            v.iter().map(|x| Ok(ring.to_ntt(x)?)).collect()
        };
        Ok((to_ntt(&opening.mask)?, to_ntt(&opening.rand)?))
    }

    /// Verify a batched opening proof, replaying the prover's transcript.
    pub fn verify_opening(
        &self,
        transcript: &mut Transcript,
        commitments: &[&Commitment],
        proof: &OpeningProof,
    ) -> bool {
        self.verify_opening_detailed(transcript, commitments, proof)
            .is_ok()
    }

    /// [`PcsVerifier::verify_opening`] returning the reason of a rejection.
    pub fn verify_opening_detailed(
        &self,
        transcript: &mut Transcript,
        commitments: &[&Commitment],
        proof: &OpeningProof,
    ) -> Result<()> {
        let timer = start_timer!(|| "Verify opening");
        let p = self.params;
        let ring = &p.base_ring;
        if proof.first_moves.len() != p.repetitions || proof.responses.len() != p.repetitions {
            return Err(PiopError::VerificationError);
        }
        for w in proof.first_moves.iter() {
            self.check_ajtai(w)?;
        }
        let items: Vec<&AjtaiCommitment> = commitments.iter().flat_map(|c| c.0.iter()).collect();
        for item in items.iter() {
            self.check_ajtai(item)?;
        }

        for w in proof.first_moves.iter() {
            transcript.append_commitment(w);
        }
        let challenges = transcript.get_monomial_challenges(
            b"opening challenges",
            p.repetitions * items.len(),
            p.ring_degree(),
        );

        for (t, (w, z)) in proof
            .first_moves
            .iter()
            .zip(proof.responses.iter())
            .enumerate()
        {
            let (mask, rand) = self.check_masked(z, &p.open_proof_bound_sq)?;
            let lhs = self.ck.commit(p, &mask, &rand)?;

            let mut rhs = w.0.clone();
            for (item, e) in items
                .iter()
                .zip(challenges[t * items.len()..(t + 1) * items.len()].iter())
            {
                let c = ring.monomial(*e, true);
                for (r, com) in rhs.iter_mut().zip(item.0.iter()) {
                    ring.mul_acc(r, &c, com)?;
                }
            }
            if lhs.0 != rhs {
                return Err(PiopError::VerificationError);
            }
        }
        end_timer!(timer);
        Ok(())
    }

    /// Verify that `proof.value` is the evaluation at `x` of the vector committed in `com`.
    pub fn verify_eval(&self, x: &BigUint, com: &Commitment, proof: &EvalProof) -> bool {
        self.verify_eval_detailed(x, com, proof).is_ok()
    }

    /// [`PcsVerifier::verify_eval`] returning the reason of a rejection.
    pub fn verify_eval_detailed(&self, x: &BigUint, com: &Commitment, proof: &EvalProof) -> Result<()> {
        let p = self.params;
        let ring = &p.base_ring;
        if com.len() < 3 || proof.value >= p.modulus {
            return Err(PiopError::VerificationError);
        }
        for c in com.0.iter() {
            self.check_ajtai(c)?;
        }
        let (mask, rand) = self.check_masked(&proof.opening, &p.eval_bound_sq)?;

        let x = x % &p.modulus;
        let scalars = evaluation_scalars(p, &x, com.len() - 2);
        let mut rhs = vec![ring.zero(true); p.ajtai_size()];
        for (c, s) in com.0.iter().zip(scalars.iter()) {
            for (r, part) in rhs.iter_mut().zip(c.0.iter()) {
                ring.scalar_mul_acc(r, part, s)?;
            }
        }
        if self.ck.commit(p, &mask, &rand)?.0 != rhs {
            return Err(PiopError::VerificationError);
        }

        let values = self.encoder.decode_chunk(&proof.opening.mask)?;
        if p.reducer().eval_poly(&values, &x) != proof.value {
            return Err(PiopError::VerificationError);
        }
        Ok(())
    }

    /// Verify a batch of evaluations at the same point, one per commitment.
    pub fn verify_evals(&self, x: &BigUint, commitments: &[&Commitment], proofs: &[&EvalProof]) -> bool {
        commitments.len() == proofs.len()
            && commitments
                .iter()
                .zip(proofs.iter())
                .all(|(c, p)| self.verify_eval(x, c, p))
    }
}
