pub use crate::barrett::Reducer;
pub use crate::errors::AlgebraError;
pub use crate::rand_helper::test_rng;
pub use crate::ring::{Poly, Ring, RingKind};
pub use crate::sampler::{GaussianSampler, UniformSampler};
pub use crate::utils::*;
pub use ark_std::{string::String, vec, vec::Vec};
pub use itertools::Itertools;
pub use num_bigint::{BigInt, BigUint, RandBigInt, Sign};
pub use num_integer::Integer;
pub use num_traits::{One, ToPrimitive, Zero};
pub use rand_chacha::{
    rand_core::{CryptoRng, RngCore, SeedableRng},
    ChaChaRng,
};

pub(crate) type Result<T> = core::result::Result<T, AlgebraError>;
