use crate::errors::{PiopError, Result};
use crate::piop::{
    constraint_system::{
        ArithmeticConstraint, CircuitBuilder, InfNormConstraint, LinearConstraint, Relation,
        SumConstraint,
    },
    helpers::working_ring,
    prover::Prover,
    verifier::Verifier,
};
use crate::poly_commit::{
    params::Parameters,
    pcs::{Commitment, EvalProof, OpeningProof},
};
use ark_std::{end_timer, start_timer, sync::Arc};
use latte_algebra::prelude::*;

/// The row-check part of a proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowCheckProof {
    /// The commitment to the quotient `Q` with `T = Q (X^N - 1)`.
    pub quotient: Commitment,
    /// The evaluation of the quotient.
    pub quotient_eval: EvalProof,
}

/// The lin-check or sum-check part of a proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskedCheckProof {
    /// The commitment to the masking polynomial.
    pub mask: Commitment,
    /// `N` times the sum of the masking polynomial over the `N`-th roots of unity.
    pub mask_sum: BigUint,
    /// The commitment to the quotient by `X^N - 1`.
    pub quotient: Commitment,
    /// The commitment to `(R(X) - R(0)) / X` for the remainder `R`.
    pub remainder: Commitment,
    /// The commitment to `R(X) - R(0)`.
    pub remainder_shift: Commitment,
    /// The evaluation of the mask.
    pub mask_eval: EvalProof,
    /// The evaluation of the quotient.
    pub quotient_eval: EvalProof,
    /// The evaluation of the remainder.
    pub remainder_eval: EvalProof,
    /// The evaluation of the shifted remainder.
    pub remainder_shift_eval: EvalProof,
}

/// The data structure of a proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiopProof {
    /// The public witness values, in declaration order.
    pub public_values: Vec<Vec<BigUint>>,
    /// The commitments to the masked witness embeddings.
    pub witness_commitments: Vec<Commitment>,
    /// The opening proof of the witness commitments.
    pub witness_opening_proof: OpeningProof,
    /// The row-check proof, if the relation has arithmetic constraints.
    pub rowcheck: Option<RowCheckProof>,
    /// The lin-check proof, if the relation has linear constraints.
    pub lincheck: Option<MaskedCheckProof>,
    /// The sum-check proof, if the relation has sum constraints.
    pub sumcheck: Option<MaskedCheckProof>,
    /// The opening proof of the masks and the sub-protocol commitments.
    pub aux_opening_proof: OpeningProof,
    /// The evaluations of the witness embeddings.
    pub witness_evals: Vec<EvalProof>,
}

/// The arithmetic constraints, grouped by degree.
#[derive(Debug)]
pub(crate) struct RowCheckIndex {
    /// Normalized constraints.
    pub(crate) constraints: Vec<ArithmeticConstraint>,
    /// Indices into `constraints` of every degree bucket, by increasing degree.
    pub(crate) buckets: Vec<Vec<usize>>,
    /// The cyclic ring the batched polynomial is computed in.
    pub(crate) ring: Ring,
    /// The length of the quotient.
    pub(crate) quotient_len: usize,
}

#[derive(Debug)]
pub(crate) struct LinCheckIndex {
    pub(crate) constraints: Vec<LinearConstraint>,
    /// The cyclic ring of degree `2N`.
    pub(crate) ring: Ring,
}

#[derive(Debug)]
pub(crate) struct SumCheckIndex {
    /// Normalized constraints, sums reduced.
    pub(crate) constraints: Vec<SumConstraint>,
    pub(crate) ring: Ring,
    /// The length of the batched polynomial and of its mask.
    pub(crate) len: usize,
}

/// A compiled relation, shared by its prover and verifier.
#[derive(Debug)]
pub struct PiopIndex {
    pub(crate) params: Parameters,
    pub(crate) num_witnesses: usize,
    pub(crate) num_public: usize,
    pub(crate) inf_norms: Vec<InfNormConstraint>,
    pub(crate) rowcheck: Option<RowCheckIndex>,
    pub(crate) lincheck: Option<LinCheckIndex>,
    pub(crate) sumcheck: Option<SumCheckIndex>,
}

impl PiopIndex {
    /// The parameters the relation was compiled for.
    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Number of private witnesses, bit witnesses included.
    pub fn num_witnesses(&self) -> usize {
        self.num_witnesses
    }

    /// Number of public witnesses.
    pub fn num_public_witnesses(&self) -> usize {
        self.num_public
    }

    /// Length of every committed witness embedding.
    pub(crate) fn embedding_len(&self) -> usize {
        self.params.degree() + 1
    }

    /// Serialize the shape of the relation for transcript binding.
    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![];
        let mut push = |v: usize| bytes.extend_from_slice(&(v as u64).to_le_bytes());
        push(self.num_witnesses);
        push(self.num_public);
        if let Some(row) = &self.rowcheck {
            push(row.constraints.len());
        }
        if let Some(lin) = &self.lincheck {
            push(lin.constraints.len());
        }
        if let Some(sum) = &self.sumcheck {
            push(sum.constraints.len());
        }
        if let Some(row) = &self.rowcheck {
            for c in row.constraints.iter() {
                bytes.extend(c.to_bytes());
            }
        }
        if let Some(lin) = &self.lincheck {
            for c in lin.constraints.iter() {
                bytes.extend(c.transformer.to_bytes());
                bytes.extend_from_slice(&(c.input.index() as u64).to_le_bytes());
                bytes.extend_from_slice(&(c.output.index() as u64).to_le_bytes());
            }
        }
        if let Some(sum) = &self.sumcheck {
            for c in sum.constraints.iter() {
                bytes.extend(c.constraint.to_bytes());
                bytes.extend(c.sum.to_bytes_le());
            }
        }
        bytes
    }
}

/// Compile the constraints collected by `cs`.
pub fn compile_builder(params: &Parameters, cs: CircuitBuilder) -> Result<(Prover, Verifier)> {
    let timer = start_timer!(|| "Compile relation");
    let n = params.degree();
    let q = &params.modulus;
    let reducer = params.reducer();

    for c in cs.arithmetic.iter() {
        c.check_handles(cs.num_witnesses, cs.num_public)?;
    }
    for c in cs.sums.iter() {
        c.constraint.check_handles(cs.num_witnesses, cs.num_public)?;
    }
    for c in cs.linear.iter() {
        if c.input.index() >= cs.num_witnesses {
            return Err(PiopError::MissingWitness(c.input.index()));
        }
        if c.output.index() >= cs.num_witnesses {
            return Err(PiopError::MissingWitness(c.output.index()));
        }
    }
    for c in cs.inf_norms.iter() {
        if &(&c.bound << 1) >= q {
            return Err(PiopError::ParameterError(
                "infinity norm bounds must be below half the modulus",
            ));
        }
    }

    let rowcheck = if cs.arithmetic.is_empty() {
        None
    } else {
        let constraints: Vec<ArithmeticConstraint> =
            cs.arithmetic.iter().map(|c| c.normalize(reducer)).collect();
        let degrees: Vec<usize> = constraints
            .iter()
            .map(|c| c.degree())
            .unique()
            .sorted()
            .collect();
        let buckets = degrees
            .iter()
            .map(|d| {
                constraints
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| c.degree() == *d)
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect();
        let max_degree = constraints
            .iter()
            .map(|c| c.poly_degree(n))
            .max()
            .unwrap_or(0);
        let len = (max_degree + 1).max(n + 1);
        Some(RowCheckIndex {
            constraints,
            buckets,
            ring: working_ring(params, len)?,
            quotient_len: len - n,
        })
    };

    let lincheck = if cs.linear.is_empty() {
        None
    } else {
        Some(LinCheckIndex {
            constraints: cs.linear,
            ring: working_ring(params, 2 * n)?,
        })
    };

    let sumcheck = if cs.sums.is_empty() {
        None
    } else {
        let constraints: Vec<SumConstraint> = cs
            .sums
            .iter()
            .map(|c| SumConstraint {
                constraint: c.constraint.normalize(reducer),
                sum: &c.sum % q,
            })
            .collect();
        let max_degree = constraints
            .iter()
            .map(|c| c.constraint.poly_degree(n))
            .max()
            .unwrap_or(0);
        let len = (max_degree + 1).max(n + 1);
        Some(SumCheckIndex {
            constraints,
            ring: working_ring(params, len)?,
            len,
        })
    };

    let index = Arc::new(PiopIndex {
        params: params.clone(),
        num_witnesses: cs.num_witnesses,
        num_public: cs.num_public,
        inf_norms: cs.inf_norms,
        rowcheck,
        lincheck,
        sumcheck,
    });
    end_timer!(timer);
    Ok((
        Prover {
            index: index.clone(),
        },
        Verifier { index },
    ))
}

/// Compile a relation into its prover and verifier.
///
/// Values assigned while defining the relation are ignored.
pub fn compile<R: Relation + ?Sized>(params: &Parameters, relation: &R) -> Result<(Prover, Verifier)> {
    let mut cs = CircuitBuilder::new();
    relation.define(&mut cs)?;
    compile_builder(params, cs)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::piop::constraint_system::{NttTransformer, Term};
    use crate::poly_commit::params::ParametersLiteral;

    #[test]
    fn buckets_by_degree() {
        let params = ParametersLiteral::test().compile().unwrap();
        let mut cs = CircuitBuilder::new();
        let x = cs.new_witness();
        let y = cs.new_witness();
        let p = cs.new_public_witness();
        cs.add_arithmetic_constraint(
            ArithmeticConstraint::new()
                .add_term(Term::new(1).witness(x).witness(y))
                .add_term(Term::new(-1).public(p)),
        );
        cs.add_arithmetic_constraint(ArithmeticConstraint::new().add_term(Term::new(1).witness(x)));
        cs.add_arithmetic_constraint(
            ArithmeticConstraint::new().add_term(Term::new(2).witness(y).witness(y)),
        );
        cs.add_linear_constraint(NttTransformer, x, y);
        let (prover, verifier) = compile_builder(&params, cs).unwrap();

        let row = prover.index.rowcheck.as_ref().unwrap();
        assert_eq!(row.buckets, vec![vec![1], vec![0, 2]]);
        assert_eq!(row.ring.degree(), 64);
        assert_eq!(row.quotient_len, 2 * 16 + 1 - 16);
        assert!(prover.index.sumcheck.is_none());
        assert_eq!(verifier.index.lincheck.as_ref().unwrap().ring.degree(), 32);
    }

    #[test]
    fn rejects_foreign_handles() {
        let params = ParametersLiteral::test().compile().unwrap();
        let mut other = CircuitBuilder::new();
        let _ = other.new_witness();
        let w = other.new_witness();

        let mut cs = CircuitBuilder::new();
        let x = cs.new_witness();
        cs.add_linear_constraint(NttTransformer, x, w);
        assert_eq!(
            compile_builder(&params, cs).err(),
            Some(PiopError::MissingWitness(1))
        );
    }

    #[test]
    fn rejects_unsupported_degrees() {
        // the test field has no 2^9-th roots of unity
        let params = ParametersLiteral::test().compile().unwrap();
        let mut cs = CircuitBuilder::new();
        let x = cs.new_witness();
        let mut term = Term::new(1);
        for _ in 0..16 {
            term = term.witness(x);
        }
        cs.add_arithmetic_constraint(ArithmeticConstraint::new().add_term(term));
        assert_eq!(
            compile_builder(&params, cs).err(),
            Some(PiopError::DegreeError)
        );
    }

    #[test]
    fn rejects_large_bounds() {
        let params = ParametersLiteral::test().compile().unwrap();
        let mut cs = CircuitBuilder::new();
        let x = cs.new_witness();
        cs.add_inf_norm_constraint(x, params.modulus.clone());
        assert!(matches!(
            compile_builder(&params, cs).err(),
            Some(PiopError::ParameterError(_))
        ));
    }
}
