use crate::errors::{PiopError, Result};
use crate::poly_commit::{
    params::Parameters,
    pcs::{AjtaiCommitment, ToBytes},
};
use latte_algebra::prelude::*;

/// The common reference string: the public matrices `A0` (`mu x l`) and `A1`
/// (`mu x nu`) of uniform ring elements in NTT form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitKey {
    /// The matrix applied to the encoded values.
    pub a0: Vec<Vec<Poly>>,
    /// The matrix applied to the first `nu` randomness elements.
    pub a1: Vec<Vec<Poly>>,
}

impl CommitKey {
    /// Sample a fresh key for `params`.
    pub fn generate<R: CryptoRng + RngCore>(params: &Parameters, prng: &mut R) -> CommitKey {
        let ring = &params.base_ring;
        let mu = params.ajtai_size();
        let nu = params.rand_size() - mu;
        let mut uniform = |n: usize| -> Vec<Poly> {
            (0..n)
                .map(|_| Poly {
                    coeffs: prng.sample_uniform_vec(ring.modulus(), ring.degree()),
                    is_ntt: true,
                })
                .collect()
        };
        let a0 = (0..mu).map(|_| uniform(params.ring_chunks)).collect();
        let a1 = (0..mu).map(|_| uniform(nu)).collect();
        CommitKey { a0, a1 }
    }

    /// Check the key matches the shape of `params` and every element is a reduced
    /// NTT-form ring element.
    pub fn check(&self, params: &Parameters) -> Result<()> {
        let ring = &params.base_ring;
        let q = ring.modulus();
        let mu = params.ajtai_size();
        let nu = params.rand_size() - mu;
        let ok = self.a0.len() == mu
            && self.a1.len() == mu
            && self.a0.iter().all(|row| row.len() == params.ring_chunks)
            && self.a1.iter().all(|row| row.len() == nu)
            && self
                .a0
                .iter()
                .chain(self.a1.iter())
                .flatten()
                .all(|p| p.is_ntt && p.len() == ring.degree() && p.coeffs.iter().all(|c| c < q));
        if !ok {
            return Err(PiopError::CommitmentError);
        }
        Ok(())
    }

    /// Compute `A0 * mask + A1 * rand[..nu] + rand[nu..]` for NTT-form inputs.
    pub fn commit(
        &self,
        params: &Parameters,
        mask: &[Poly],
        rand: &[Poly],
    ) -> Result<AjtaiCommitment> {
        let ring = &params.base_ring;
        let mu = params.ajtai_size();
        let nu = params.rand_size() - mu;
        if mask.len() != params.ring_chunks || rand.len() != params.rand_size() {
            return Err(PiopError::CommitmentError);
        }
        let mut out = Vec::with_capacity(mu);
        for i in 0..mu {
            let mut acc = rand[nu + i].clone();
            for (a, m) in self.a0[i].iter().zip(mask.iter()) {
                ring.mul_acc(&mut acc, a, m)?;
            }
            for (a, r) in self.a1[i].iter().zip(rand.iter()) {
                ring.mul_acc(&mut acc, a, r)?;
            }
            out.push(acc);
        }
        Ok(AjtaiCommitment(out))
    }
}

impl ToBytes for CommitKey {
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![];
        for row in self.a0.iter().chain(self.a1.iter()) {
            out.extend(row.to_bytes());
        }
        out
    }
}

#[cfg(test)]
mod test {
    use super::CommitKey;
    use crate::poly_commit::params::ParametersLiteral;
    use latte_algebra::prelude::*;

    #[test]
    fn commitment_is_linear() {
        let mut prng = test_rng();
        let params = ParametersLiteral::test().compile().unwrap();
        let ring = &params.base_ring;
        let ck = CommitKey::generate(&params, &mut prng);
        ck.check(&params).unwrap();

        let sample = |prng: &mut ChaChaRng, n: usize| -> Vec<Poly> {
            (0..n)
                .map(|_| ring.to_ntt(&prng.sample_gaussian_poly(ring, 100.0)).unwrap())
                .collect()
        };
        let mut prng = ChaChaRng::from_seed([1u8; 32]);
        let (m1, r1) = (sample(&mut prng, 2), sample(&mut prng, 3));
        let (m2, r2) = (sample(&mut prng, 2), sample(&mut prng, 3));
        let c1 = ck.commit(&params, &m1, &r1).unwrap();
        let c2 = ck.commit(&params, &m2, &r2).unwrap();

        let add = |a: &[Poly], b: &[Poly]| -> Vec<Poly> {
            a.iter().zip(b).map(|(x, y)| ring.add(x, y).unwrap()).collect()
        };
        let c3 = ck
            .commit(&params, &add(&m1, &m2), &add(&r1, &r2))
            .unwrap();
        assert_eq!(c3.0, add(&c1.0, &c2.0));

        assert!(ck.commit(&params, &m1[..1], &r1).is_err());
    }

    #[test]
    fn malformed_keys_are_rejected() {
        let mut prng = test_rng();
        let params = ParametersLiteral::test().compile().unwrap();
        let ck = CommitKey::generate(&params, &mut prng);
        let q = params.ring_modulus();

        let mut bad = ck.clone();
        bad.a0[0][0].coeffs[0] = q * q * 4u32;
        assert!(bad.check(&params).is_err());

        let mut bad = ck.clone();
        bad.a1[0][0].coeffs[3] = q.clone();
        assert!(bad.check(&params).is_err());

        let mut bad = ck.clone();
        bad.a1[0][1].is_ntt = false;
        assert!(bad.check(&params).is_err());

        let mut bad = ck.clone();
        bad.a0[0][1].coeffs.pop();
        assert!(bad.check(&params).is_err());

        let mut bad = ck;
        bad.a1.pop();
        assert!(bad.check(&params).is_err());
    }
}
