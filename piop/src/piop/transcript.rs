use crate::piop::indexer::PiopIndex;
use crate::poly_commit::{ajtai::CommitKey, pcs::ToBytes, transcript::PolyComTranscript};
use latte_algebra::prelude::*;
use merlin::Transcript;

/// Initialize the transcript with the parameters, the commit key and the relation.
pub(crate) fn transcript_init_piop(transcript: &mut Transcript, index: &PiopIndex, ck: &CommitKey) {
    transcript.append_message(b"New Domain", b"Latte PIOP");
    transcript.append_message(b"parameters", &index.params.to_bytes());
    transcript.append_message(b"commit key", &ck.to_bytes());
    transcript.append_message(b"relation", &index.to_bytes());
}

/// Append the public witness values.
pub(crate) fn transcript_append_public_values(transcript: &mut Transcript, values: &[Vec<BigUint>]) {
    transcript.append_u64(b"public witnesses", values.len() as u64);
    for v in values.iter() {
        transcript.append_message(b"public witness", &v[..].to_bytes());
    }
}

/// Return a batching constant in `[0, q)`.
pub(crate) fn transcript_get_piop_challenge_beta(
    transcript: &mut Transcript,
    label: &'static [u8],
    q: &BigUint,
) -> BigUint {
    transcript.get_challenge_field_elem(label, q)
}

/// Return the uniform vector `v` of the lin-check.
pub(crate) fn transcript_get_lincheck_vector(
    transcript: &mut Transcript,
    q: &BigUint,
    n: usize,
) -> Vec<BigUint> {
    let mut prng = transcript.get_challenge_rng(b"lin check vector");
    prng.sample_uniform_vec(q, n)
}

/// Return the evaluation point `x`, never an `N`-th root of unity.
pub(crate) fn transcript_get_piop_challenge_x(
    transcript: &mut Transcript,
    reducer: &Reducer,
    n: usize,
) -> BigUint {
    let mut prng = transcript.get_challenge_rng(b"evaluation point");
    loop {
        let x = prng.sample_uniform(reducer.modulus());
        if !reducer.pow(&x, n as u64).is_one() {
            return x;
        }
    }
}
