use crate::errors::{PiopError, Result};
use latte_algebra::prelude::*;
use num_traits::FromPrimitive;

/// The parameters as they are written down, before validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParametersLiteral {
    /// Rows `mu` of the Ajtai matrices.
    pub ajtai_size: usize,
    /// Length `mu + nu` of the commitment randomness.
    pub ajtai_rand_size: usize,
    /// Length `N` of every witness vector.
    pub degree: usize,
    /// Number `C` of big integers committed per chunk.
    pub big_int_commit_size: usize,
    /// Digit base `b`.
    pub modulus_base: u64,
    /// Digit count `r`; the commitment modulus is `b^r + 1`.
    pub digits: usize,
    /// Degree `d` of the commitment ring.
    pub ring_degree: usize,
    /// Bit length of the commitment ring modulus.
    pub log_ring_modulus: usize,
    /// Standard deviation of committed digits.
    pub commit_std_dev: f64,
    /// Standard deviation of the commitment randomness.
    pub commit_rand_std_dev: f64,
    /// Standard deviation of the opening proof masks.
    pub opening_proof_std_dev: f64,
    /// Standard deviation of the opening proof randomness masks.
    pub opening_proof_rand_std_dev: f64,
    /// Standard deviation of the evaluation blind.
    pub blind_std_dev: f64,
    /// Standard deviation of the evaluation blind randomness.
    pub blind_rand_std_dev: f64,
    /// Euclidean norm bound on opening proof responses.
    pub open_proof_bound: f64,
    /// Euclidean norm bound on evaluation proofs.
    pub eval_bound: f64,
}

impl ParametersLiteral {
    /// Small parameters for tests: 64-bit field, 16-slot witnesses. Not secure.
    pub fn test() -> ParametersLiteral {
        ParametersLiteral {
            ajtai_size: 1,
            ajtai_rand_size: 3,
            degree: 16,
            big_int_commit_size: 8,
            modulus_base: 65484,
            digits: 4,
            ring_degree: 16,
            log_ring_modulus: 128,
            commit_std_dev: 1048576.0,
            commit_rand_std_dev: 1048576.0,
            opening_proof_std_dev: 17179869184.0,
            opening_proof_rand_std_dev: 17179869184.0,
            blind_std_dev: 1048576.0,
            blind_rand_std_dev: 1048576.0,
            open_proof_bound: 1099511627776.0,
            eval_bound: 2f64.powi(96),
        }
    }

    /// Parameters over the 256-bit field `65432^16 + 1`.
    pub fn default_128() -> ParametersLiteral {
        ParametersLiteral {
            ajtai_size: 2,
            ajtai_rand_size: 6,
            degree: 1024,
            big_int_commit_size: 256,
            modulus_base: 65432,
            digits: 16,
            ring_degree: 64,
            log_ring_modulus: 300,
            commit_std_dev: 1048576.0,
            commit_rand_std_dev: 1048576.0,
            opening_proof_std_dev: 1099511627776.0,
            opening_proof_rand_std_dev: 1099511627776.0,
            blind_std_dev: 1048576.0,
            blind_rand_std_dev: 1048576.0,
            open_proof_bound: 2f64.powi(50),
            eval_bound: 2f64.powi(290),
        }
    }

    /// Validate the literal and precompute the rings it describes.
    pub fn compile(&self) -> Result<Parameters> {
        if self.digits == 0 || self.modulus_base < 2 {
            return Err(PiopError::ParameterError("the digit base and count must be positive"));
        }
        let modulus_base = BigUint::from(self.modulus_base);
        let modulus = modulus_base.pow(self.digits as u32) + 1u32;
        if !is_probable_prime(&modulus) {
            return Err(PiopError::ParameterError("b^r + 1 is not prime"));
        }
        if self.ring_degree == 0 || !self.ring_degree.is_power_of_two() {
            return Err(PiopError::ParameterError("the ring degree must be a power of two"));
        }
        if self.ring_degree % self.digits != 0 {
            return Err(PiopError::ParameterError("the digit count must divide the ring degree"));
        }
        let slots = self.ring_degree / self.digits;
        if self.big_int_commit_size == 0 || self.big_int_commit_size % slots != 0 {
            return Err(PiopError::ParameterError(
                "the slot count must divide the big-integer chunk size",
            ));
        }
        let ring_chunks = self.big_int_commit_size / slots;
        if self.degree == 0 || !self.degree.is_power_of_two() {
            return Err(PiopError::ParameterError("the witness degree must be a power of two"));
        }
        if self.degree % self.big_int_commit_size != 0 {
            return Err(PiopError::ParameterError(
                "the big-integer chunk size must divide the witness degree",
            ));
        }
        // the full blind opens at x^C, which must stay below X^N in the remainders
        if self.big_int_commit_size >= self.degree {
            return Err(PiopError::ParameterError(
                "the big-integer chunk size must be smaller than the witness degree",
            ));
        }
        if self.ajtai_size == 0 || self.ajtai_rand_size <= self.ajtai_size {
            return Err(PiopError::ParameterError(
                "the randomness length must exceed the Ajtai size",
            ));
        }
        let std_devs = [
            self.commit_std_dev,
            self.commit_rand_std_dev,
            self.opening_proof_std_dev,
            self.opening_proof_rand_std_dev,
            self.blind_std_dev,
            self.blind_rand_std_dev,
        ];
        if std_devs.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(PiopError::ParameterError("standard deviations must be positive"));
        }

        // the embedding and the transforms need 2N-th roots of unity mod q
        let witness_ring = Ring::new(self.degree, &modulus, RingKind::Cyclic)
            .map_err(|_| PiopError::ParameterError("2N must divide q - 1"))?;
        let transform_ring = Ring::new(self.degree, &modulus, RingKind::Cyclotomic)
            .map_err(|_| PiopError::ParameterError("2N must divide q - 1"))?;

        let ring_modulus = find_ntt_prime(self.log_ring_modulus, 2 * self.ring_degree)?;
        let base_ring = Ring::new(self.ring_degree, &ring_modulus, RingKind::Cyclotomic)?;

        let half = &ring_modulus >> 1;
        let open_proof_bound = bound_from_f64(self.open_proof_bound)?;
        let eval_bound = bound_from_f64(self.eval_bound)?;
        if open_proof_bound >= half || eval_bound >= half {
            return Err(PiopError::ParameterError(
                "norm bounds must be below half the ring modulus",
            ));
        }

        let log_d = self.ring_degree.trailing_zeros() as usize;
        let repetitions = (128 + log_d) / (1 + log_d);

        Ok(Parameters {
            literal: self.clone(),
            modulus,
            modulus_base,
            slots,
            ring_chunks,
            base_ring,
            witness_ring,
            transform_ring,
            open_proof_bound_sq: &open_proof_bound * &open_proof_bound,
            eval_bound_sq: &eval_bound * &eval_bound,
            repetitions,
        })
    }
}

fn bound_from_f64(bound: f64) -> Result<BigUint> {
    if !bound.is_finite() || bound <= 0.0 {
        return Err(PiopError::ParameterError("norm bounds must be positive"));
    }
    BigUint::from_f64(bound.floor()).ok_or(PiopError::ParameterError("norm bounds must be positive"))
}

/// Validated parameters with the precomputed rings.
#[derive(Clone, Debug)]
pub struct Parameters {
    /// The literal these parameters were compiled from.
    pub literal: ParametersLiteral,
    /// The field modulus `q = b^r + 1`.
    pub modulus: BigUint,
    /// The digit base `b`.
    pub modulus_base: BigUint,
    /// Big integers per ring element, `d / r`.
    pub slots: usize,
    /// Ring elements per chunk, `C / slots`.
    pub ring_chunks: usize,
    /// The cyclotomic commitment ring of degree `d`.
    pub base_ring: Ring,
    /// The cyclic ring of degree `N` modulo `q` witnesses are embedded in.
    pub witness_ring: Ring,
    /// The cyclotomic ring of degree `N` modulo `q` linear transforms act in.
    pub transform_ring: Ring,
    /// Squared opening proof bound.
    pub open_proof_bound_sq: BigUint,
    /// Squared evaluation bound.
    pub eval_bound_sq: BigUint,
    /// Parallel repetitions of the opening proof.
    pub repetitions: usize,
}

impl Parameters {
    /// The witness length `N`.
    pub fn degree(&self) -> usize {
        self.literal.degree
    }

    /// The chunk size `C`.
    pub fn chunk_size(&self) -> usize {
        self.literal.big_int_commit_size
    }

    /// The Ajtai size `mu`.
    pub fn ajtai_size(&self) -> usize {
        self.literal.ajtai_size
    }

    /// The randomness length `mu + nu`.
    pub fn rand_size(&self) -> usize {
        self.literal.ajtai_rand_size
    }

    /// The commitment ring degree `d`.
    pub fn ring_degree(&self) -> usize {
        self.literal.ring_degree
    }

    /// The digit count `r`.
    pub fn digits(&self) -> usize {
        self.literal.digits
    }

    /// The field reducer modulo `q`.
    pub fn reducer(&self) -> &Reducer {
        self.witness_ring.reducer()
    }

    /// The commitment ring modulus `Q`.
    pub fn ring_modulus(&self) -> &BigUint {
        self.base_ring.modulus()
    }

    /// Number of chunks a committed vector of length `len` occupies, blinds included.
    pub fn commitment_len(&self, len: usize) -> usize {
        crate::utils::div_ceil(len.max(1), self.chunk_size()) + 2
    }

    /// Serialize the literal for transcript binding.
    pub fn to_bytes(&self) -> Vec<u8> {
        let l = &self.literal;
        let mut bytes = vec![];
        for v in [
            l.ajtai_size,
            l.ajtai_rand_size,
            l.degree,
            l.big_int_commit_size,
            l.modulus_base as usize,
            l.digits,
            l.ring_degree,
            l.log_ring_modulus,
        ] {
            bytes.extend_from_slice(&(v as u64).to_le_bytes());
        }
        for v in [
            l.commit_std_dev,
            l.commit_rand_std_dev,
            l.opening_proof_std_dev,
            l.opening_proof_rand_std_dev,
            l.blind_std_dev,
            l.blind_rand_std_dev,
            l.open_proof_bound,
            l.eval_bound,
        ] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes.extend_from_slice(&self.ring_modulus().to_bytes_le());
        bytes
    }
}

#[cfg(test)]
mod test {
    use super::ParametersLiteral;
    use crate::errors::PiopError;
    use latte_algebra::prelude::*;

    #[test]
    fn compile_test_parameters() {
        let params = ParametersLiteral::test().compile().unwrap();
        assert_eq!(params.slots, 4);
        assert_eq!(params.ring_chunks, 2);
        assert_eq!(params.repetitions, 26);
        assert_eq!(params.ring_modulus().bits(), 128);
        assert!(
            (params.ring_modulus() - 1u32) % BigUint::from(32u32) == BigUint::zero()
        );
        assert_eq!(params.modulus, BigUint::from(65484u64).pow(4) + 1u32);
        assert_eq!(params.commitment_len(17), 5);
        assert_eq!(params.commitment_len(16), 4);
    }

    #[test]
    fn compile_default_parameters() {
        let params = ParametersLiteral::default_128().compile().unwrap();
        assert_eq!(params.modulus.bits(), 256);
        assert_eq!(params.repetitions, 19);
    }

    #[test]
    fn reject_invalid_parameters() {
        let mut literal = ParametersLiteral::test();
        literal.modulus_base = 65482;
        assert!(matches!(
            literal.compile(),
            Err(PiopError::ParameterError(_))
        ));

        let mut literal = ParametersLiteral::test();
        literal.big_int_commit_size = 6;
        assert!(literal.compile().is_err());

        let mut literal = ParametersLiteral::test();
        literal.degree = 512;
        assert_eq!(
            literal.compile().unwrap_err(),
            PiopError::ParameterError("2N must divide q - 1")
        );

        let mut literal = ParametersLiteral::test();
        literal.ajtai_rand_size = 1;
        assert!(literal.compile().is_err());

        let mut literal = ParametersLiteral::test();
        literal.commit_std_dev = 0.0;
        assert!(literal.compile().is_err());

        let mut literal = ParametersLiteral::test();
        literal.eval_bound = 2f64.powi(127);
        assert!(literal.compile().is_err());
    }

    #[test]
    fn reject_chunk_size_equal_to_degree() {
        let mut literal = ParametersLiteral::test();
        literal.big_int_commit_size = literal.degree;
        assert_eq!(
            literal.compile().unwrap_err(),
            PiopError::ParameterError(
                "the big-integer chunk size must be smaller than the witness degree"
            )
        );

        literal.big_int_commit_size = literal.degree / 2;
        assert!(literal.compile().is_ok());
    }

    #[test]
    fn literal_from_json() {
        let json = serde_json::to_string(&ParametersLiteral::test()).unwrap();
        let literal: ParametersLiteral = serde_json::from_str(&json).unwrap();
        assert_eq!(literal, ParametersLiteral::test());
    }
}
