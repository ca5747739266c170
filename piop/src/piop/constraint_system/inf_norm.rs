//! Infinity-norm bounds lowered to bit decompositions.
//!
//! For a bound `B > 0` let `L = bitlen(2B)`. The bases are `2^j` for `j < L - 1` and
//! `2B - 2^(L-1) + 1` for the last bit; their subset sums cover exactly `[0, 2B]`. A
//! witness `w` is bounded by `B` iff `w + B = sum_j base_j * b_j` with every `b_j` a bit.

use crate::errors::{PiopError, Result};
use crate::piop::constraint_system::{ArithmeticConstraint, CircuitBuilder, Term, Witness};
use latte_algebra::prelude::*;

/// A lowered bound on the centered entries of a witness.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfNormConstraint {
    /// The bounded witness.
    pub witness: Witness,
    /// The bound `B`.
    pub bound: BigUint,
    /// The bit witnesses, filled in by the prover.
    pub bits: Vec<Witness>,
    /// The weight of every bit.
    pub bases: Vec<BigUint>,
}

impl InfNormConstraint {
    /// Return the bases of the decomposition of `[0, 2 bound]`.
    pub fn bases(bound: &BigUint) -> Vec<BigUint> {
        if bound.is_zero() {
            return vec![];
        }
        let two_b: BigUint = bound << 1;
        let l = two_b.bits() as usize;
        let mut bases: Vec<BigUint> = (0..l - 1).map(|j| BigUint::one() << j).collect();
        bases.push(&two_b + 1u32 - (BigUint::one() << (l - 1)));
        bases
    }

    /// Declare the bit witnesses and their row constraints on `cs`.
    pub(crate) fn lower(cs: &mut CircuitBuilder, w: Witness, bound: BigUint) -> InfNormConstraint {
        let bases = Self::bases(&bound);
        if bases.is_empty() {
            cs.add_arithmetic_constraint(
                ArithmeticConstraint::new().add_term(Term::new(1).witness(w)),
            );
            return InfNormConstraint {
                witness: w,
                bound,
                bits: vec![],
                bases,
            };
        }

        let bits: Vec<Witness> = bases.iter().map(|_| cs.new_witness()).collect();
        for b in bits.iter() {
            cs.add_arithmetic_constraint(
                ArithmeticConstraint::new()
                    .add_term(Term::new(1).witness(*b).witness(*b))
                    .add_term(Term::new(-1).witness(*b)),
            );
        }
        let mut sum = ArithmeticConstraint::new()
            .add_term(Term::new(1).witness(w))
            .add_term(Term::new(1).scalar(bound.clone()));
        for (b, base) in bits.iter().zip(bases.iter()) {
            sum = sum.add_term(Term::new(-1).scalar(base.clone()).witness(*b));
        }
        cs.add_arithmetic_constraint(sum);

        InfNormConstraint {
            witness: w,
            bound,
            bits,
            bases,
        }
    }

    /// Decompose every entry of `values` into bits, one vector per bit witness.
    pub fn fill_bits(&self, values: &[BigUint], q: &BigUint) -> Result<Vec<Vec<BigUint>>> {
        let mut out = vec![vec![BigUint::zero(); values.len()]; self.bits.len()];
        let bound = BigInt::from_biguint(Sign::Plus, self.bound.clone());
        let top = match self.bases.last() {
            Some(top) => top,
            None => {
                if values.iter().any(|v| !v.is_zero()) {
                    return Err(PiopError::InfNormBoundExceeded(self.witness.0));
                }
                return Ok(out);
            }
        };
        let l = self.bases.len();
        let half = BigUint::one() << (l - 1);

        for (k, v) in values.iter().enumerate() {
            let c = centered_lift(v, q);
            if c.magnitude() > &self.bound {
                return Err(PiopError::InfNormBoundExceeded(self.witness.0));
            }
            let (_, mut t) = (c + &bound).into_parts();
            if t >= half {
                out[l - 1][k] = BigUint::one();
                t -= top;
            }
            for (j, bit) in out.iter_mut().take(l - 1).enumerate() {
                if t.bit(j as u64) {
                    bit[k] = BigUint::one();
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn recompose(c: &InfNormConstraint, bits: &[Vec<BigUint>], k: usize) -> BigUint {
        c.bases
            .iter()
            .zip(bits.iter())
            .map(|(base, b)| base * &b[k])
            .sum()
    }

    #[test]
    fn bases_cover_the_range() {
        for bound in 1u32..40 {
            let bases = InfNormConstraint::bases(&BigUint::from(bound));
            let total: BigUint = bases.iter().sum();
            assert_eq!(total, BigUint::from(2 * bound));
        }
        assert!(InfNormConstraint::bases(&BigUint::zero()).is_empty());
        assert_eq!(
            InfNormConstraint::bases(&BigUint::from(5u32)),
            vec![1u32, 2, 4, 3]
                .into_iter()
                .map(BigUint::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn bits_recompose() {
        let q = BigUint::from(65537u32);
        for bound in [1u32, 5, 8, 13] {
            let mut cs = CircuitBuilder::new();
            let w = cs.new_witness();
            cs.add_inf_norm_constraint(w, bound);
            let c = &cs.inf_norms[0];
            assert_eq!(cs.num_witnesses(), 1 + c.bits.len());
            assert_eq!(cs.arithmetic.len(), c.bits.len() + 1);

            let values: Vec<BigUint> = (-(bound as i64)..=bound as i64)
                .map(|v| reduce_signed(&BigInt::from(v), &q))
                .collect();
            let bits = c.fill_bits(&values, &q).unwrap();
            for (k, v) in values.iter().enumerate() {
                let t = reduce_signed(&(centered_lift(v, &q) + BigInt::from(bound)), &q);
                assert_eq!(recompose(c, &bits, k), t);
            }

            let too_big = vec![BigUint::from(bound + 1)];
            assert_eq!(
                c.fill_bits(&too_big, &q),
                Err(PiopError::InfNormBoundExceeded(0))
            );
        }
    }

    #[test]
    fn zero_bound() {
        let q = BigUint::from(65537u32);
        let mut cs = CircuitBuilder::new();
        let w = cs.new_witness();
        cs.add_inf_norm_constraint(w, 0u32);
        let c = &cs.inf_norms[0];
        assert!(c.bits.is_empty());
        assert_eq!(cs.arithmetic.len(), 1);
        assert!(c.fill_bits(&[BigUint::zero()], &q).unwrap().is_empty());
        assert!(c.fill_bits(&[BigUint::one()], &q).is_err());
    }
}
