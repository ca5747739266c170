use crate::poly_commit::pcs::ToBytes;
use latte_algebra::prelude::*;
use merlin::Transcript;

/// The trait for polynomial commitment transcript.
pub trait PolyComTranscript {
    /// Append the commitment to the transcript.
    fn append_commitment<C: ToBytes + ?Sized>(&mut self, commitment: &C);

    /// Append the field element to the transcript.
    fn append_field_elem(&mut self, elem: &BigUint);

    /// Return a generator seeded by the transcript state.
    fn get_challenge_rng(&mut self, label: &'static [u8]) -> ChaChaRng;

    /// Get a challenge uniform in `[0, modulus)`.
    fn get_challenge_field_elem(&mut self, label: &'static [u8], modulus: &BigUint) -> BigUint;

    /// Get `count` monomial exponents uniform in `[0, 2 * ring_degree)`.
    fn get_monomial_challenges(
        &mut self,
        label: &'static [u8],
        count: usize,
        ring_degree: usize,
    ) -> Vec<usize>;
}

impl PolyComTranscript for Transcript {
    fn append_commitment<C: ToBytes + ?Sized>(&mut self, commitment: &C) {
        self.append_message(b"append commitment", &commitment.to_bytes());
    }

    fn append_field_elem(&mut self, elem: &BigUint) {
        self.append_message(b"append field point", &elem.to_bytes());
    }

    fn get_challenge_rng(&mut self, label: &'static [u8]) -> ChaChaRng {
        let mut buff = [0u8; 32];
        self.challenge_bytes(label, &mut buff[..]);
        ChaChaRng::from_seed(buff)
    }

    fn get_challenge_field_elem(&mut self, label: &'static [u8], modulus: &BigUint) -> BigUint {
        self.get_challenge_rng(label).sample_uniform(modulus)
    }

    fn get_monomial_challenges(
        &mut self,
        label: &'static [u8],
        count: usize,
        ring_degree: usize,
    ) -> Vec<usize> {
        let mut prng = self.get_challenge_rng(label);
        // 2d is a power of two, so the reduction is unbiased.
        let order = 2 * ring_degree as u64;
        (0..count)
            .map(|_| (prng.next_u64() % order) as usize)
            .collect()
    }
}
