use latte_algebra::prelude::*;

/// Trait for serialization into transcripts.
pub trait ToBytes {
    /// Convert to bytes.
    fn to_bytes(&self) -> Vec<u8>;
}

impl ToBytes for BigUint {
    fn to_bytes(&self) -> Vec<u8> {
        let bytes = self.to_bytes_le();
        let mut out = (bytes.len() as u32).to_le_bytes().to_vec();
        out.extend(bytes);
        out
    }
}

impl ToBytes for Poly {
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![self.is_ntt as u8];
        out.extend_from_slice(&(self.coeffs.len() as u32).to_le_bytes());
        for c in self.coeffs.iter() {
            out.extend(c.to_bytes());
        }
        out
    }
}

impl<T: ToBytes> ToBytes for [T] {
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = (self.len() as u32).to_le_bytes().to_vec();
        for t in self.iter() {
            out.extend(t.to_bytes());
        }
        out
    }
}

/// One Ajtai commitment: `mu` ring elements in NTT form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AjtaiCommitment(pub Vec<Poly>);

impl ToBytes for AjtaiCommitment {
    fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes()
    }
}

/// The commitment to a big-integer vector: one Ajtai commitment per chunk,
/// followed by the skip blind and the full blind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment(pub Vec<AjtaiCommitment>);

impl Commitment {
    /// Number of chunks, blinds included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no chunks.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl ToBytes for Commitment {
    fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes()
    }
}

/// The secret behind one Ajtai commitment, in NTT form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkOpening {
    /// The encoded values, `C / s` ring elements.
    pub mask: Vec<Poly>,
    /// The commitment randomness, `mu + nu` ring elements.
    pub rand: Vec<Poly>,
}

/// The secret behind a [`Commitment`]. Kept by the prover.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Opening(pub Vec<ChunkOpening>);

/// A masked opening sent to the verifier, in coefficient form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskedOpening {
    /// Masked encodings.
    pub mask: Vec<Poly>,
    /// Masked randomness.
    pub rand: Vec<Poly>,
}

impl MaskedOpening {
    /// All coefficients, for norm computations.
    pub fn coeffs(&self) -> impl Iterator<Item = &BigUint> {
        self.mask
            .iter()
            .chain(self.rand.iter())
            .flat_map(|p| p.coeffs.iter())
    }
}

/// A batched proof of knowledge of openings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningProof {
    /// The first move of every repetition.
    pub first_moves: Vec<AjtaiCommitment>,
    /// The response of every repetition.
    pub responses: Vec<MaskedOpening>,
}

/// The value of a committed vector at a point, with its proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalProof {
    /// The claimed evaluation.
    pub value: BigUint,
    /// The chunks recombined with powers of the point.
    pub opening: MaskedOpening,
}
