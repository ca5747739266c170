use ark_std::{error, fmt};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum AlgebraError {
    DegreeNotPowerOfTwo(usize),
    ModulusNotPrime,
    NoPrimitiveRoot(usize),
    PrimeNotFound(usize),
    RepresentationMismatch,
    LengthMismatch,
    IndexError,
    ParameterError,
    NotInvertible,
}

impl fmt::Display for AlgebraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use AlgebraError::*;
        match self {
            DegreeNotPowerOfTwo(n) => write!(f, "Ring degree {} is not a power of two", n),
            ModulusNotPrime => f.write_str("Ring modulus is not prime"),
            NoPrimitiveRoot(m) => {
                write!(f, "No primitive root of unity of order {} exists", m)
            }
            PrimeNotFound(bits) => write!(f, "Could not find a {}-bit NTT-friendly prime", bits),
            RepresentationMismatch => {
                f.write_str("Ring elements are not in the same representation")
            }
            LengthMismatch => f.write_str("Ring elements do not have the ring degree"),
            IndexError => f.write_str("Index out of bounds"),
            ParameterError => f.write_str("Unexpected parameter for method or function"),
            NotInvertible => f.write_str("Element not invertible"),
        }
    }
}

impl error::Error for AlgebraError {}
