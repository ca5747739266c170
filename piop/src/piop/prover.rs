use crate::errors::{PiopError, Result};
use crate::piop::{
    constraint_system::{CircuitBuilder, PublicWitness, Relation, Witness},
    helpers::{embed_public, embed_witness, sample_mask, SlotValues},
    indexer::{MaskedCheckProof, PiopIndex, PiopProof, RowCheckProof},
    lincheck::{prove_lincheck, LinCheckPolys},
    rowcheck::{prove_rowcheck, rowcheck_weights},
    sumcheck::prove_sumcheck,
    transcript::{
        transcript_append_public_values, transcript_get_lincheck_vector,
        transcript_get_piop_challenge_beta, transcript_get_piop_challenge_x, transcript_init_piop,
    },
};
use crate::poly_commit::{
    ajtai::CommitKey,
    pcs::{Commitment, EvalProof, Opening},
    prover::PcsProver,
    transcript::PolyComTranscript,
};
use crate::utils::{challenge_powers, derive_seeds, join};
use ark_std::{cfg_into_iter, end_timer, start_timer, sync::Arc};
use latte_algebra::prelude::*;
use merlin::Transcript;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The values of the witnesses and public witnesses of a relation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    degree: usize,
    modulus: BigUint,
    witnesses: Vec<Option<Vec<BigUint>>>,
    publics: Vec<Option<Vec<BigUint>>>,
}

impl Assignment {
    fn reduce(&self, values: &[BigUint]) -> Result<Vec<BigUint>> {
        if values.len() != self.degree {
            return Err(PiopError::LengthError {
                expected: self.degree,
                found: values.len(),
            });
        }
        Ok(values.iter().map(|v| v % &self.modulus).collect())
    }

    /// Set the value of a witness, reduced modulo `q`.
    pub fn set_witness(&mut self, w: Witness, values: &[BigUint]) -> Result<()> {
        let values = self.reduce(values)?;
        let slot = self
            .witnesses
            .get_mut(w.index())
            .ok_or(PiopError::MissingWitness(w.index()))?;
        *slot = Some(values);
        Ok(())
    }

    /// Set the value of a public witness, reduced modulo `q`.
    pub fn set_public_witness(&mut self, p: PublicWitness, values: &[BigUint]) -> Result<()> {
        let values = self.reduce(values)?;
        let slot = self
            .publics
            .get_mut(p.index())
            .ok_or(PiopError::MissingPublicWitness(p.index()))?;
        *slot = Some(values);
        Ok(())
    }
}

/// The prover of a compiled relation.
#[derive(Clone, Debug)]
pub struct Prover {
    pub(crate) index: Arc<PiopIndex>,
}

/// Witness values ready to prove with: every witness present, inf-norm bits filled in.
struct FullAssignment {
    witnesses: Vec<Vec<BigUint>>,
    publics: Vec<Vec<BigUint>>,
}

impl Prover {
    /// The compiled relation.
    pub fn index(&self) -> &PiopIndex {
        &self.index
    }

    /// An assignment with no values yet.
    pub fn new_assignment(&self) -> Assignment {
        Assignment {
            degree: self.index.params.degree(),
            modulus: self.index.params.modulus.clone(),
            witnesses: vec![None; self.index.num_witnesses],
            publics: vec![None; self.index.num_public],
        }
    }

    /// Collect the values `relation` assigns while defining itself.
    pub fn assignment_from_relation<R: Relation + ?Sized>(&self, relation: &R) -> Result<Assignment> {
        let mut cs = CircuitBuilder::new();
        relation.define(&mut cs)?;
        if cs.num_witnesses != self.index.num_witnesses {
            return Err(PiopError::LengthError {
                expected: self.index.num_witnesses,
                found: cs.num_witnesses,
            });
        }
        if cs.num_public != self.index.num_public {
            return Err(PiopError::LengthError {
                expected: self.index.num_public,
                found: cs.num_public,
            });
        }
        let mut assignment = self.new_assignment();
        for (i, v) in cs.witness_values.iter().enumerate() {
            if let Some(v) = v {
                assignment.set_witness(Witness(i), v)?;
            }
        }
        for (i, v) in cs.public_values.iter().enumerate() {
            if let Some(v) = v {
                assignment.set_public_witness(PublicWitness(i), v)?;
            }
        }
        Ok(assignment)
    }

    fn complete(&self, assignment: &Assignment) -> Result<FullAssignment> {
        let index = &self.index;
        if assignment.witnesses.len() != index.num_witnesses
            || assignment.publics.len() != index.num_public
            || assignment.degree != index.params.degree()
        {
            return Err(PiopError::ParameterError(
                "the assignment belongs to a different relation",
            ));
        }
        let mut witnesses = assignment.witnesses.clone();
        for c in index.inf_norms.iter() {
            let values = witnesses[c.witness.index()]
                .as_ref()
                .ok_or(PiopError::MissingWitness(c.witness.index()))?;
            let bits = c.fill_bits(values, &index.params.modulus)?;
            for (b, v) in c.bits.iter().zip(bits) {
                witnesses[b.index()] = Some(v);
            }
        }
        let witnesses = witnesses
            .into_iter()
            .enumerate()
            .map(|(i, w)| w.ok_or(PiopError::MissingWitness(i)))
            .collect::<Result<_>>()?;
        let publics = assignment
            .publics
            .iter()
            .enumerate()
            .map(|(i, p)| p.clone().ok_or(PiopError::MissingPublicWitness(i)))
            .collect::<Result<_>>()?;
        Ok(FullAssignment {
            witnesses,
            publics,
        })
    }

    /// Check every constraint directly on the values.
    pub fn check_assignment(&self, assignment: &Assignment) -> Result<()> {
        let full = self.complete(assignment)?;
        self.check_full(&full)
    }

    fn check_full(&self, full: &FullAssignment) -> Result<()> {
        let index = &self.index;
        let params = &index.params;
        let reducer = params.reducer();
        let n = params.degree();
        let slot = |k: usize| SlotValues {
            witnesses: &full.witnesses,
            publics: &full.publics,
            slot: k,
        };

        if let Some(row) = &index.rowcheck {
            for k in 0..n {
                if row
                    .constraints
                    .iter()
                    .any(|c| !c.evaluate(&slot(k), reducer).is_zero())
                {
                    return Err(PiopError::ProofErrorInvalidWitness);
                }
            }
        }
        if let Some(lin) = &index.lincheck {
            for c in lin.constraints.iter() {
                let out = c
                    .transformer
                    .apply(&params.transform_ring, &full.witnesses[c.input.index()])?;
                if out != full.witnesses[c.output.index()] {
                    return Err(PiopError::ProofErrorInvalidWitness);
                }
            }
        }
        if let Some(sum) = &index.sumcheck {
            for c in sum.constraints.iter() {
                let total = (0..n).fold(BigUint::zero(), |acc, k| {
                    reducer.add(&acc, &c.constraint.evaluate(&slot(k), reducer))
                });
                if total != c.sum {
                    return Err(PiopError::ProofErrorInvalidWitness);
                }
            }
        }
        Ok(())
    }

    /// Prove the values `relation` assigns while defining itself.
    pub fn prove_relation<Rel: Relation + ?Sized, R: CryptoRng + RngCore>(
        &self,
        ck: &CommitKey,
        relation: &Rel,
        prng: &mut R,
    ) -> Result<PiopProof> {
        let assignment = self.assignment_from_relation(relation)?;
        self.prove(ck, &assignment, prng)
    }

    /// Prove that `assignment` satisfies the relation.
    ///
    /// An assignment that violates a constraint still yields a proof, which fails to verify.
    pub fn prove<R: CryptoRng + RngCore>(
        &self,
        ck: &CommitKey,
        assignment: &Assignment,
        prng: &mut R,
    ) -> Result<PiopProof> {
        let timer = start_timer!(|| "Prove");
        let index = &self.index;
        let params = &index.params;
        let reducer = params.reducer();
        let q = &params.modulus;
        let n = params.degree();
        ck.check(params)?;
        let full = self.complete(assignment)?;
        #[cfg(feature = "debug")]
        self.check_full(&full)?;

        let pcs = PcsProver::new(params, ck);
        let mut transcript = Transcript::new(b"Latte PIOP");
        transcript_init_piop(&mut transcript, index, ck);
        transcript_append_public_values(&mut transcript, &full.publics);

        // 1. embed and commit the witnesses.
        let commit_timer = start_timer!(|| "Commit witnesses");
        let seeds = derive_seeds(prng, full.witnesses.len());
        let committed: Vec<(Vec<BigUint>, Commitment, Opening)> =
            cfg_into_iter!(full.witnesses.iter().zip(seeds).collect::<Vec<_>>())
                .map(|(w, seed)| {
                    let mut prng = ChaChaRng::from_seed(seed);
                    let embedded = embed_witness(params, w, &mut prng);
                    let (com, opening) = pcs.commit(&embedded, &mut prng)?;
                    Ok((embedded, com, opening))
                })
                .collect::<Result<_>>()?;
        end_timer!(commit_timer);
        let mut embeddings = Vec::with_capacity(committed.len());
        let mut witness_commitments = Vec::with_capacity(committed.len());
        let mut witness_openings = Vec::with_capacity(committed.len());
        for (e, c, o) in committed {
            embeddings.push(e);
            witness_commitments.push(c);
            witness_openings.push(o);
        }
        for c in witness_commitments.iter() {
            transcript.append_commitment(c);
        }
        let witness_opening_proof = pcs.prove_opening(
            &mut transcript,
            &witness_openings.iter().collect::<Vec<_>>(),
            prng,
        )?;

        // 2. commit the masks of lin-check and sum-check.
        let mut commit_mask = |len: usize| -> Result<(Vec<BigUint>, BigUint, Commitment, Opening)> {
            let (mask, mask_sum) = sample_mask(params, len, prng);
            let (com, opening) = pcs.commit(&mask, prng)?;
            Ok((mask, mask_sum, com, opening))
        };
        let lin_mask = match &index.lincheck {
            Some(_) => Some(commit_mask(2 * n)?),
            None => None,
        };
        let sum_mask = match &index.sumcheck {
            Some(sum) => Some(commit_mask(sum.len)?),
            None => None,
        };
        for (_, mask_sum, com, _) in lin_mask.iter().chain(sum_mask.iter()) {
            transcript.append_commitment(com);
            transcript.append_field_elem(mask_sum);
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

        // 4. run the three reductions.
        let publics: Vec<Vec<BigUint>> = full.publics.iter().map(|p| embed_public(params, p)).collect();
        let (row_quotient, (lin_split, sum_split)) = join(
            || {
                index
                    .rowcheck
                    .as_ref()
                    .zip(row_weights.as_ref())
                    .map(|(row, w)| prove_rowcheck(params, row, w, &embeddings, &publics))
            },
            || {
                join(
                    || {
                        index
                            .lincheck
                            .as_ref()
                            .zip(lin_challenges.as_ref())
                            .zip(lin_mask.as_ref())
                            .map(|((lin, (w, polys)), mask)| {
                                prove_lincheck(params, lin, w, polys, &embeddings, &mask.0)
                            })
                    },
                    || {
                        index
                            .sumcheck
                            .as_ref()
                            .zip(sum_weights.as_ref())
                            .zip(sum_mask.as_ref())
                            .map(|((sum, w), mask)| {
                                prove_sumcheck(params, sum, w, &embeddings, &publics, &mask.0)
                            })
                    },
                )
            },
        );

        // 5. commit the quotients and remainders.
        let mut commit = |v: &[BigUint]| -> Result<(Commitment, Opening)> {
            let (com, opening) = pcs.commit(v, prng)?;
            transcript.append_commitment(&com);
            Ok((com, opening))
        };
        let row_committed = row_quotient.map(|t| commit(&t[..])).transpose()?;
        let lin_committed = lin_split
            .map(|s| {
                Ok::<_, PiopError>([
                    commit(&s.quotient[..])?,
                    commit(&s.remainder[..])?,
                    commit(&s.remainder_shift[..])?,
                ])
            })
            .transpose()?;
        let sum_committed = sum_split
            .map(|s| {
                Ok::<_, PiopError>([
                    commit(&s.quotient[..])?,
                    commit(&s.remainder[..])?,
                    commit(&s.remainder_shift[..])?,
                ])
            })
            .transpose()?;

        // 6. prove the openings of everything committed after the witnesses.
        let aux_openings: Vec<&Opening> = lin_mask
            .iter()
            .chain(sum_mask.iter())
            .map(|m| &m.3)
            .chain(row_committed.iter().map(|(_, o)| o))
            .chain(lin_committed.iter().flat_map(|c| c.iter().map(|(_, o)| o)))
            .chain(sum_committed.iter().flat_map(|c| c.iter().map(|(_, o)| o)))
            .collect();
        let aux_opening_proof = pcs.prove_opening(&mut transcript, &aux_openings, prng)?;

        // 7. evaluate everything at x.
        let x = transcript_get_piop_challenge_x(&mut transcript, reducer, n);
        let witness_evals = pcs.evaluate_many(&x, &witness_openings.iter().collect::<Vec<_>>())?;
        let rowcheck = row_committed
            .map(|(quotient, opening)| {
                Ok::<_, PiopError>(RowCheckProof {
                    quotient,
                    quotient_eval: pcs.evaluate(&x, &opening)?,
                })
            })
            .transpose()?;
        let lincheck = lin_mask
            .zip(lin_committed)
            .map(|(mask, committed)| masked_check_proof(&pcs, &x, mask, committed))
            .transpose()?;
        let sumcheck = sum_mask
            .zip(sum_committed)
            .map(|(mask, committed)| masked_check_proof(&pcs, &x, mask, committed))
            .transpose()?;

        end_timer!(timer);
        Ok(PiopProof {
            public_values: full.publics,
            witness_commitments,
            witness_opening_proof,
            rowcheck,
            lincheck,
            sumcheck,
            aux_opening_proof,
            witness_evals,
        })
    }
}

fn masked_check_proof(
    pcs: &PcsProver,
    x: &BigUint,
    mask: (Vec<BigUint>, BigUint, Commitment, Opening),
    committed: [(Commitment, Opening); 3],
) -> Result<MaskedCheckProof> {
    let (_, mask_sum, mask_com, mask_opening) = mask;
    let [quotient, remainder, remainder_shift] = committed;
    let evals: Vec<EvalProof> = pcs.evaluate_many(
        x,
        &[&mask_opening, &quotient.1, &remainder.1, &remainder_shift.1],
    )?;
    let mut evals = evals.into_iter();
    let mut next = || evals.next().ok_or(PiopError::CommitmentError);
    Ok(MaskedCheckProof {
        mask: mask_com,
        mask_sum,
        quotient: quotient.0,
        remainder: remainder.0,
        remainder_shift: remainder_shift.0,
        mask_eval: next()?,
        quotient_eval: next()?,
        remainder_eval: next()?,
        remainder_shift_eval: next()?,
    })
}
