//! Randomness capabilities consumed by the commitment scheme.
//!
//! Both samplers are implemented for every cryptographically secure generator, so callers
//! inject randomness by passing their own `RngCore + CryptoRng`.

use crate::prelude::*;
use num_traits::FromPrimitive;
use rand_distr::{Distribution, StandardNormal};

/// Uniform sampling of residues.
pub trait UniformSampler {
    /// Sample uniformly from `[0, bound)`.
    fn sample_uniform(&mut self, bound: &BigUint) -> BigUint;

    /// Sample `n` uniform values from `[0, bound)`.
    fn sample_uniform_vec(&mut self, bound: &BigUint, n: usize) -> Vec<BigUint> {
        (0..n).map(|_| self.sample_uniform(bound)).collect()
    }
}

/// Rounded continuous Gaussian sampling.
pub trait GaussianSampler {
    /// Sample an integer from the Gaussian of the given center and standard deviation.
    fn sample_gaussian(&mut self, center: f64, std_dev: f64) -> BigInt;

    /// Sample a coefficient-form element of `ring` with centered Gaussian coefficients.
    fn sample_gaussian_poly(&mut self, ring: &Ring, std_dev: f64) -> Poly {
        let q = ring.modulus();
        let coeffs = (0..ring.degree())
            .map(|_| reduce_signed(&self.sample_gaussian(0.0, std_dev), q))
            .collect();
        Poly {
            coeffs,
            is_ntt: false,
        }
    }
}

impl<R: RngCore + CryptoRng> UniformSampler for R {
    fn sample_uniform(&mut self, bound: &BigUint) -> BigUint {
        self.gen_biguint_below(bound)
    }
}

impl<R: RngCore + CryptoRng> GaussianSampler for R {
    fn sample_gaussian(&mut self, center: f64, std_dev: f64) -> BigInt {
        let z: f64 = StandardNormal.sample(self);
        let x = (center + std_dev * z).round();
        BigInt::from_f64(x).unwrap_or_default()
    }
}

#[cfg(test)]
mod test {
    use crate::prelude::*;

    #[test]
    fn uniform_is_in_range() {
        let mut prng = test_rng();
        let bound = BigUint::from(1000u32);
        for v in prng.sample_uniform_vec(&bound, 500) {
            assert!(v < bound);
        }
    }

    #[test]
    fn gaussian_statistics() {
        let mut prng = test_rng();
        let n = 20000;
        let std_dev = 1000.0;
        let center = -250.5;
        let samples: Vec<f64> = (0..n)
            .map(|_| prng.sample_gaussian(center, std_dev).to_f64().unwrap())
            .collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n as f64;
        assert!((mean - center).abs() < 50.0);
        assert!((var.sqrt() - std_dev).abs() < 50.0);
    }

    #[test]
    fn gaussian_poly_is_small() {
        let mut prng = test_rng();
        let q = BigUint::from(65484u64).pow(4) + 1u32;
        let ring = Ring::new(16, &q, RingKind::Cyclotomic).unwrap();
        let p = prng.sample_gaussian_poly(&ring, 8.0);
        assert!(!p.is_ntt);
        for c in p.coeffs.iter() {
            let lifted = centered_lift(c, &q);
            assert!(lifted < BigInt::from(200) && lifted > BigInt::from(-200));
        }
    }
}
