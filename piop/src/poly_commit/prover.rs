use crate::errors::{PiopError, Result};
use crate::poly_commit::{
    ajtai::CommitKey,
    encoder::Encoder,
    params::Parameters,
    pcs::{
        AjtaiCommitment, ChunkOpening, Commitment, EvalProof, MaskedOpening, Opening,
        OpeningProof,
    },
    transcript::PolyComTranscript,
};
use crate::utils::{derive_seeds, div_ceil, pad_zeros};
use ark_std::{cfg_into_iter, end_timer, start_timer};
use latte_algebra::prelude::*;
use merlin::Transcript;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Commits to big-integer vectors and proves openings and evaluations.
#[derive(Clone, Copy, Debug)]
pub struct PcsProver<'a> {
    params: &'a Parameters,
    ck: &'a CommitKey,
    encoder: Encoder<'a>,
}

impl<'a> PcsProver<'a> {
    /// Create a prover over a commit key.
    pub fn new(params: &'a Parameters, ck: &'a CommitKey) -> Self {
        PcsProver {
            params,
            ck,
            encoder: Encoder::new(params),
        }
    }

    fn gaussian_ntt<R: CryptoRng + RngCore>(&self, std_dev: f64, n: usize, prng: &mut R) -> Result<Vec<Poly>> {
        let ring = &self.params.base_ring;
        (0..n)
            .map(|_| {
                let mut p = prng.sample_gaussian_poly(ring, std_dev);
                ring.to_ntt_assign(&mut p)?;
                Ok(p)
            })
            .collect()
    }

    fn commit_chunk<R: CryptoRng + RngCore>(
        &self,
        values: &[BigUint],
        std_dev: f64,
        rand_std_dev: f64,
        prng: &mut R,
    ) -> Result<(AjtaiCommitment, ChunkOpening)> {
        let mask = self.encoder.random_encode_chunk(values, std_dev, prng)?;
        let rand = self.gaussian_ntt(rand_std_dev, self.params.rand_size(), prng)?;
        let com = self.ck.commit(self.params, &mask, &rand)?;
        Ok((com, ChunkOpening { mask, rand }))
    }

    /// Commit to `values`, every entry reduced modulo `q`.
    ///
    /// The vector is zero-padded to whole chunks of `C` values. Two more chunks are
    /// appended: a uniform skip blind `s` with `s_0 = 0`, and the full blind
    /// `t_u = -s_(u+1)`, which cancel out in every evaluation.
    pub fn commit<R: CryptoRng + RngCore>(
        &self,
        values: &[BigUint],
        prng: &mut R,
    ) -> Result<(Commitment, Opening)> {
        let p = self.params;
        let c = p.chunk_size();
        let n = div_ceil(values.len().max(1), c);
        let values = pad_zeros(values.to_vec(), n * c);

        let mut skip = prng.sample_uniform_vec(&p.modulus, c);
        skip[0] = BigUint::zero();
        let mut full: Vec<BigUint> = (0..c - 1)
            .map(|u| p.reducer().neg(&skip[u + 1]))
            .collect();
        full.push(BigUint::zero());

        let seeds = derive_seeds(prng, n + 2);
        let scale = ((n + 2) as f64).sqrt();
        let chunks: Vec<(&[BigUint], f64, f64)> = values
            .chunks(c)
            .map(|v| (v, p.literal.commit_std_dev, p.literal.commit_rand_std_dev))
            .chain([
                (
                    &skip[..],
                    p.literal.commit_std_dev,
                    p.literal.commit_rand_std_dev,
                ),
                (
                    &full[..],
                    p.literal.blind_std_dev * scale,
                    p.literal.blind_rand_std_dev * scale,
                ),
            ])
            .collect();

        let committed: Vec<(AjtaiCommitment, ChunkOpening)> = cfg_into_iter!(chunks)
            .zip(cfg_into_iter!(seeds))
            .map(|((v, std_dev, rand_std_dev), seed)| {
                let mut prng = ChaChaRng::from_seed(seed);
                self.commit_chunk(v, std_dev, rand_std_dev, &mut prng)
            })
            .collect::<Result<_>>()?;
        let (coms, opens) = committed.into_iter().unzip();
        Ok((Commitment(coms), Opening(opens)))
    }

    /// Prove knowledge of the openings of a batch of commitments.
    ///
    /// The commitments must already be bound to the transcript.
    pub fn prove_opening<R: CryptoRng + RngCore>(
        &self,
        transcript: &mut Transcript,
        openings: &[&Opening],
        prng: &mut R,
    ) -> Result<OpeningProof> {
        let timer = start_timer!(|| "Prove opening");
        let p = self.params;
        let ring = &p.base_ring;
        let items: Vec<&ChunkOpening> = openings.iter().flat_map(|o| o.0.iter()).collect();

        let seeds = derive_seeds(prng, p.repetitions);
        let first: Vec<(AjtaiCommitment, ChunkOpening)> = cfg_into_iter!(seeds)
            .map(|seed| {
                let mut prng = ChaChaRng::from_seed(seed);
                let mask = self.gaussian_ntt(
                    p.literal.opening_proof_std_dev,
                    p.ring_chunks,
                    &mut prng,
                )?;
                let rand =
                    self.gaussian_ntt(p.literal.opening_proof_rand_std_dev, p.rand_size(), &mut prng)?;
                let w = self.ck.commit(p, &mask, &rand)?;
                Ok((w, ChunkOpening { mask, rand }))
            })
            .collect::<Result<_>>()?;

        for (w, _) in first.iter() {
            transcript.append_commitment(w);
        }
        let challenges = transcript.get_monomial_challenges(
            b"opening challenges",
            p.repetitions * items.len(),
            p.ring_degree(),
        );

        let responses: Vec<MaskedOpening> = cfg_into_iter!(0..p.repetitions)
            .map(|t| {
                let mut z = first[t].1.clone();
                for (item, e) in items
                    .iter()
                    .zip(challenges[t * items.len()..(t + 1) * items.len()].iter())
                {
                    let c = ring.monomial(*e, true);
                    for (zm, m) in z.mask.iter_mut().zip(item.mask.iter()) {
                        ring.mul_acc(zm, &c, m)?;
                    }
                    for (zr, r) in z.rand.iter_mut().zip(item.rand.iter()) {
                        ring.mul_acc(zr, &c, r)?;
                    }
                }
                to_masked(ring, z)
            })
            .collect::<Result<_>>()?;

        end_timer!(timer);
        Ok(OpeningProof {
            first_moves: first.into_iter().map(|(w, _)| w).collect(),
            responses,
        })
    }

    /// Evaluate the committed vector at `x` and prove the evaluation.
    ///
    /// Chunk `c` is scaled by `x^(cC)`, the skip blind by `1` and the full blind by `x`.
    pub fn evaluate(&self, x: &BigUint, opening: &Opening) -> Result<EvalProof> {
        let p = self.params;
        let ring = &p.base_ring;
        if opening.0.len() < 3 {
            return Err(PiopError::CommitmentError);
        }
        let x = x % &p.modulus;
        let scalars = evaluation_scalars(p, &x, opening.0.len() - 2);

        let mut acc = ChunkOpening {
            mask: vec![ring.zero(true); p.ring_chunks],
            rand: vec![ring.zero(true); p.rand_size()],
        };
        for (chunk, s) in opening.0.iter().zip(scalars.iter()) {
            for (a, m) in acc.mask.iter_mut().zip(chunk.mask.iter()) {
                ring.scalar_mul_acc(a, m, s)?;
            }
            for (a, r) in acc.rand.iter_mut().zip(chunk.rand.iter()) {
                ring.scalar_mul_acc(a, r, s)?;
            }
        }
        let masked = to_masked(ring, acc)?;
        let values = self.encoder.decode_chunk(&masked.mask)?;
        let value = p.reducer().eval_poly(&values, &x);
        Ok(EvalProof {
            value,
            opening: masked,
        })
    }

    /// Evaluate every opening at the same point.
    pub fn evaluate_many(&self, x: &BigUint, openings: &[&Opening]) -> Result<Vec<EvalProof>> {
        let timer = start_timer!(|| format!("Evaluate {} commitments", openings.len()));
        let proofs = cfg_into_iter!(openings.to_vec())
            .map(|o| self.evaluate(x, o))
            .collect::<Result<Vec<_>>>()?;
        end_timer!(timer);
        Ok(proofs)
    }
}

fn to_masked(ring: &Ring, opening: ChunkOpening) -> Result<MaskedOpening> {
    let convert = |v: Vec<Poly>| -> Result<Vec<Poly>> {
        v.into_iter()
            .map(|mut p| {
                ring.to_coeff_assign(&mut p)?;
                Ok(p)
            })
            .collect()
    };
    Ok(MaskedOpening {
        mask: convert(opening.mask)?,
        rand: convert(opening.rand)?,
    })
}

/// The scalars chunks are combined with when evaluating at `x`.
pub(crate) fn evaluation_scalars(params: &Parameters, x: &BigUint, data_chunks: usize) -> Vec<BigUint> {
    let reducer = params.reducer();
    let skip = reducer.pow(x, params.chunk_size() as u64);
    let mut scalars = Vec::with_capacity(data_chunks + 2);
    let mut cur = BigUint::one();
    for _ in 0..data_chunks {
        let next = reducer.mul(&cur, &skip);
        scalars.push(cur);
        cur = next;
    }
    scalars.push(BigUint::one());
    scalars.push(x.clone());
    scalars
}

#[cfg(test)]
mod test {
    use super::PcsProver;
    use crate::poly_commit::{
        ajtai::CommitKey, params::ParametersLiteral, transcript::PolyComTranscript,
        verifier::PcsVerifier,
    };
    use latte_algebra::prelude::*;
    use merlin::Transcript;

    #[test]
    fn evaluation_matches_horner() {
        let mut prng = test_rng();
        let params = ParametersLiteral::test().compile().unwrap();
        let ck = CommitKey::generate(&params, &mut prng);
        let prover = PcsProver::new(&params, &ck);

        for len in [1usize, 8, 17] {
            let values = prng.sample_uniform_vec(&params.modulus, len);
            let (com, opening) = prover.commit(&values, &mut prng).unwrap();
            assert_eq!(com.len(), params.commitment_len(len));
            let x = prng.sample_uniform(&params.modulus);
            let proof = prover.evaluate(&x, &opening).unwrap();
            assert_eq!(proof.value, params.reducer().eval_poly(&values, &x));
        }
    }

    #[test]
    fn opening_proof_shape() {
        let mut prng = test_rng();
        let params = ParametersLiteral::test().compile().unwrap();
        let ck = CommitKey::generate(&params, &mut prng);
        let prover = PcsProver::new(&params, &ck);
        let values = prng.sample_uniform_vec(&params.modulus, 16);
        let (com, opening) = prover.commit(&values, &mut prng).unwrap();

        let mut transcript = Transcript::new(b"test");
        transcript.append_commitment(&com);
        let proof = prover
            .prove_opening(&mut transcript, &[&opening], &mut prng)
            .unwrap();
        assert_eq!(proof.first_moves.len(), params.repetitions);
        assert_eq!(proof.responses.len(), params.repetitions);
        assert!(proof.responses.iter().all(|r| r.mask.iter().all(|p| !p.is_ntt)));
    }

    #[test]
    fn commit_is_deterministic_given_the_seed() {
        let params = ParametersLiteral::test().compile().unwrap();
        let ck = CommitKey::generate(&params, &mut ChaChaRng::from_seed([0u8; 32]));
        let prover = PcsProver::new(&params, &ck);
        let values = vec![BigUint::from(3u32); 10];
        let (c1, _) = prover
            .commit(&values, &mut ChaChaRng::from_seed([9u8; 32]))
            .unwrap();
        let (c2, _) = prover
            .commit(&values, &mut ChaChaRng::from_seed([9u8; 32]))
            .unwrap();
        assert_eq!(c1, c2);
    }

    #[test]
    fn witness_length_commitment_has_degree_below_n() {
        let mut prng = test_rng();
        let params = ParametersLiteral::test().compile().unwrap();
        let ck = CommitKey::generate(&params, &mut prng);
        let prover = PcsProver::new(&params, &ck);
        let verifier = PcsVerifier::new(&params, &ck);
        let n = params.degree();
        assert!(params.chunk_size() < n);

        let values = prng.sample_uniform_vec(&params.modulus, n);
        let (com, opening) = prover.commit(&values, &mut prng).unwrap();
        verifier.check_commitment(&com, n).unwrap();
        let x = prng.sample_uniform(&params.modulus);
        let proof = prover.evaluate(&x, &opening).unwrap();
        verifier.verify_eval_detailed(&x, &com, &proof).unwrap();

        // a coefficient at X^N needs another data chunk
        let mut longer = values;
        longer.push(BigUint::one());
        let (com, _) = prover.commit(&longer, &mut prng).unwrap();
        assert!(verifier.check_commitment(&com, n).is_err());
    }
}
