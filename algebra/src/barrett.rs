//! Barrett reduction over arbitrary-precision residues.
//!
//! For a modulus `q` of bit length `k` the reducer stores `mu = floor(2^(2k+1) / q)`.
//! Any `x < 2q^2` is then reduced with one multiplication, one shift and at most
//! two conditional subtractions, instead of a long division.

use crate::prelude::*;

/// Precomputed Barrett constants for a fixed modulus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reducer {
    modulus: BigUint,
    mu: BigUint,
    shift: u64,
    bound: BigUint,
}

impl Reducer {
    /// Create the reducer for `modulus`.
    pub fn new(modulus: &BigUint) -> Reducer {
        let k = modulus.bits();
        let shift = 2 * k + 1;
        let mu = (BigUint::one() << shift) / modulus;
        let bound = (modulus * modulus) << 1;
        Reducer {
            modulus: modulus.clone(),
            mu,
            shift,
            bound,
        }
    }

    /// Return the modulus.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Reduce `x` into `[0, q)`.
    ///
    /// # Panics
    /// If `x >= 2q^2`, which is outside the range the constants are valid for.
    pub fn reduce(&self, x: &BigUint) -> BigUint {
        assert!(
            x < &self.bound,
            "Barrett reduction input exceeds 2q^2 for the modulus {}",
            self.modulus
        );
        let t = (x * &self.mu) >> self.shift;
        let mut r = x - t * &self.modulus;
        while r >= self.modulus {
            r -= &self.modulus;
        }
        r
    }

    /// Reduce a signed `x` with `|x| < 2q^2` into `[0, q)`.
    pub fn reduce_signed(&self, x: &BigInt) -> BigUint {
        let (sign, magnitude) = x.clone().into_parts();
        let r = self.reduce(&magnitude);
        if sign == Sign::Minus && !r.is_zero() {
            &self.modulus - r
        } else {
            r
        }
    }

    /// Return `a * b mod q` for reduced inputs.
    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        self.reduce(&(a * b))
    }

    /// Return `a + b mod q` for reduced inputs.
    pub fn add(&self, a: &BigUint, b: &BigUint) -> BigUint {
        let s = a + b;
        if s >= self.modulus {
            s - &self.modulus
        } else {
            s
        }
    }

    /// Return `a - b mod q` for reduced inputs.
    pub fn sub(&self, a: &BigUint, b: &BigUint) -> BigUint {
        if a >= b {
            a - b
        } else {
            &self.modulus - b + a
        }
    }

    /// Return `-a mod q` for a reduced input.
    pub fn neg(&self, a: &BigUint) -> BigUint {
        if a.is_zero() {
            BigUint::zero()
        } else {
            &self.modulus - a
        }
    }

    /// Return `a^e mod q`.
    pub fn pow(&self, a: &BigUint, e: u64) -> BigUint {
        a.modpow(&BigUint::from(e), &self.modulus)
    }
}

#[cfg(test)]
mod test {
    use super::Reducer;
    use crate::prelude::*;

    #[test]
    fn reduce_matches_remainder() {
        let mut prng = test_rng();
        let q = BigUint::from(65484u64).pow(4) + 1u32;
        let reducer = Reducer::new(&q);
        let bound = (&q * &q) << 1;
        for _ in 0..1000 {
            let x = prng.gen_biguint_below(&bound);
            assert_eq!(reducer.reduce(&x), &x % &q);
        }
        let edge = &bound - 1u32;
        assert_eq!(reducer.reduce(&edge), &edge % &q);
        assert_eq!(reducer.reduce(&q), BigUint::zero());
    }

    #[test]
    fn reduce_signed_values() {
        let q = BigUint::from(97u32);
        let reducer = Reducer::new(&q);
        assert_eq!(reducer.reduce_signed(&BigInt::from(-1)), BigUint::from(96u32));
        assert_eq!(reducer.reduce_signed(&BigInt::from(-97)), BigUint::zero());
        assert_eq!(reducer.reduce_signed(&BigInt::from(-200)), BigUint::from(91u32));
        assert_eq!(reducer.reduce_signed(&BigInt::from(200)), BigUint::from(6u32));
    }

    #[test]
    fn field_operations() {
        let q = BigUint::from(97u32);
        let r = Reducer::new(&q);
        let a = BigUint::from(90u32);
        let b = BigUint::from(10u32);
        assert_eq!(r.add(&a, &b), BigUint::from(3u32));
        assert_eq!(r.sub(&b, &a), BigUint::from(17u32));
        assert_eq!(r.neg(&b), BigUint::from(87u32));
        assert_eq!(r.mul(&a, &b), BigUint::from(27u32));
        assert_eq!(r.pow(&b, 2), BigUint::from(3u32));
    }

    #[test]
    #[should_panic]
    fn reduce_out_of_range_panics() {
        let q = BigUint::from(97u32);
        let reducer = Reducer::new(&q);
        let _ = reducer.reduce(&(BigUint::from(2u32) * &q * &q));
    }
}
