use ark_std::{error, fmt, string::String};
use latte_algebra::prelude::AlgebraError;

pub(crate) type Result<T> = core::result::Result<T, PiopError>;

#[derive(Debug, Clone, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum PiopError {
    /// Algebra error
    Algebra(AlgebraError),
    /// Error with message
    Message(String),
    /// The parameters violate a constraint, with the reason.
    ParameterError(&'static str),
    /// A value is not a residue of the commitment modulus.
    ValueOutOfRange,
    /// A vector does not have the expected length.
    LengthError { expected: usize, found: usize },
    /// The witness with this index has no value.
    MissingWitness(usize),
    /// The public witness with this index has no value.
    MissingPublicWitness(usize),
    /// The witness with this index exceeds its infinity norm bound.
    InfNormBoundExceeded(usize),
    /// The witness does not satisfy the relation.
    ProofErrorInvalidWitness,
    /// The relation needs a polynomial degree the parameters do not support.
    DegreeError,
    /// Polynomial commitment error.
    CommitmentError,
    /// Error occurred when verify.
    VerificationError,
}

impl fmt::Display for PiopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use PiopError::*;
        match self {
            Algebra(e) => write!(f, "Algebra: {}", e),
            Message(e) => f.write_str(e),
            ParameterError(reason) => write!(f, "Invalid parameters: {}", reason),
            ValueOutOfRange => f.write_str("Value is not reduced modulo the commitment modulus."),
            LengthError { expected, found } => {
                write!(f, "Expected a vector of length {}, found {}.", expected, found)
            }
            MissingWitness(i) => write!(f, "Witness {} is not assigned.", i),
            MissingPublicWitness(i) => write!(f, "Public witness {} is not assigned.", i),
            InfNormBoundExceeded(i) => {
                write!(f, "Witness {} exceeds its infinity norm bound.", i)
            }
            ProofErrorInvalidWitness => f.write_str("Proof error invalid witness."),
            DegreeError => f.write_str(
                "The degree of the polynomial is higher than the maximum degree supported.",
            ),
            CommitmentError => f.write_str("Commitment error."),
            VerificationError => f.write_str("Verification error."),
        }
    }
}

impl error::Error for PiopError {}

impl From<AlgebraError> for PiopError {
    fn from(e: AlgebraError) -> PiopError {
        PiopError::Algebra(e)
    }
}
