use crate::errors::{PiopError, Result};
use latte_algebra::prelude::*;

pub mod inf_norm;
pub mod transformer;

pub use inf_norm::InfNormConstraint;
pub use transformer::{
    AutomorphismTransformer, InvNttTransformer, LinearTransformer, NttTransformer,
};

/// Handle of a private witness vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Witness(pub(crate) usize);

impl Witness {
    /// The position of the witness in declaration order.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Handle of a public witness vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PublicWitness(pub(crate) usize);

impl PublicWitness {
    /// The position of the public witness in declaration order.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A monomial `coeff * scalar * p_1 * ... * p_j * w_1 * ... * w_k`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// A small signed coefficient.
    pub coeff: i64,
    /// An optional big-integer factor.
    pub scalar: Option<BigUint>,
    /// The public witness factors.
    pub publics: Vec<PublicWitness>,
    /// The witness factors.
    pub witnesses: Vec<Witness>,
}

impl Term {
    /// The constant term `coeff`.
    pub fn new(coeff: i64) -> Term {
        Term {
            coeff,
            scalar: None,
            publics: vec![],
            witnesses: vec![],
        }
    }

    /// Multiply the term by a big-integer scalar.
    pub fn scalar(mut self, s: BigUint) -> Term {
        self.scalar = Some(match self.scalar {
            Some(t) => t * s,
            None => s,
        });
        self
    }

    /// Multiply the term by a public witness.
    pub fn public(mut self, p: PublicWitness) -> Term {
        self.publics.push(p);
        self
    }

    /// Multiply the term by a witness.
    pub fn witness(mut self, w: Witness) -> Term {
        self.witnesses.push(w);
        self
    }

    /// Number of witness factors.
    pub fn degree(&self) -> usize {
        self.witnesses.len()
    }

    /// Degree of the term once witnesses are replaced by their masked embeddings
    /// of degree `n` and public witnesses by embeddings of degree `n - 1`.
    pub fn poly_degree(&self, n: usize) -> usize {
        self.witnesses.len() * n + self.publics.len() * (n - 1)
    }

    /// The constant factor of the term, reduced.
    fn factor(&self, reducer: &Reducer) -> BigUint {
        let c = match self.coeff {
            1 => BigUint::one(),
            c => reducer.reduce_signed(&BigInt::from(c)),
        };
        match &self.scalar {
            Some(s) if self.coeff == 1 && s < reducer.modulus() => s.clone(),
            Some(s) => reducer.mul(&c, &(s % reducer.modulus())),
            None => c,
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.coeff.to_le_bytes().to_vec();
        match &self.scalar {
            Some(s) => {
                bytes.push(1);
                let s = s.to_bytes_le();
                bytes.extend_from_slice(&(s.len() as u32).to_le_bytes());
                bytes.extend(s);
            }
            None => bytes.push(0),
        }
        bytes.extend_from_slice(&(self.publics.len() as u64).to_le_bytes());
        for p in self.publics.iter() {
            bytes.extend_from_slice(&(p.0 as u64).to_le_bytes());
        }
        bytes.extend_from_slice(&(self.witnesses.len() as u64).to_le_bytes());
        for w in self.witnesses.iter() {
            bytes.extend_from_slice(&(w.0 as u64).to_le_bytes());
        }
        bytes
    }
}

/// Where a constraint reads its values from: one slot of the witness vectors on the
/// prover side, or the evaluations at the challenge point on the verifier side.
pub trait ConstraintValues {
    /// The value of a witness.
    fn witness(&self, w: Witness) -> &BigUint;

    /// The value of a public witness.
    fn public(&self, p: PublicWitness) -> &BigUint;
}

/// A sum of [`Term`]s that must vanish.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArithmeticConstraint {
    /// The monomials.
    pub terms: Vec<Term>,
}

impl ArithmeticConstraint {
    /// The empty constraint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a monomial.
    pub fn add_term(mut self, term: Term) -> Self {
        self.terms.push(term);
        self
    }

    /// Length of the longest witness list.
    pub fn degree(&self) -> usize {
        self.terms.iter().map(|t| t.degree()).max().unwrap_or(0)
    }

    /// Degree of the constraint polynomial over embeddings of length `n`.
    pub fn poly_degree(&self, n: usize) -> usize {
        self.terms
            .iter()
            .map(|t| t.poly_degree(n))
            .max()
            .unwrap_or(0)
    }

    /// Evaluate the constraint on `values`.
    pub fn evaluate<V: ConstraintValues>(&self, values: &V, reducer: &Reducer) -> BigUint {
        let mut acc = BigUint::zero();
        for term in self.terms.iter() {
            let mut v = term.factor(reducer);
            for p in term.publics.iter() {
                v = reducer.mul(&v, values.public(*p));
            }
            for w in term.witnesses.iter() {
                v = reducer.mul(&v, values.witness(*w));
            }
            acc = reducer.add(&acc, &v);
        }
        acc
    }

    /// Fold every coefficient into a reduced scalar.
    pub(crate) fn normalize(&self, reducer: &Reducer) -> ArithmeticConstraint {
        let terms = self
            .terms
            .iter()
            .map(|t| Term {
                coeff: 1,
                scalar: Some(t.factor(reducer)),
                publics: t.publics.clone(),
                witnesses: t.witnesses.clone(),
            })
            .collect();
        ArithmeticConstraint { terms }
    }

    /// Fail if the constraint mentions a handle out of range.
    pub(crate) fn check_handles(&self, num_witnesses: usize, num_public: usize) -> Result<()> {
        for t in self.terms.iter() {
            if let Some(p) = t.publics.iter().find(|p| p.0 >= num_public) {
                return Err(PiopError::MissingPublicWitness(p.0));
            }
            if let Some(w) = t.witnesses.iter().find(|w| w.0 >= num_witnesses) {
                return Err(PiopError::MissingWitness(w.0));
            }
        }
        Ok(())
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = (self.terms.len() as u64).to_le_bytes().to_vec();
        for t in self.terms.iter() {
            bytes.extend(t.to_bytes());
        }
        bytes
    }
}

/// `output = T(input)` for a linear transform `T` of witness vectors.
#[derive(Debug)]
pub struct LinearConstraint {
    /// The transform.
    pub transformer: Box<dyn LinearTransformer>,
    /// The transformed witness.
    pub input: Witness,
    /// The witness that must equal the transform of `input`.
    pub output: Witness,
}

/// The sum over all slots of a constraint equals `sum`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SumConstraint {
    /// The summed expression.
    pub constraint: ArithmeticConstraint,
    /// The expected sum.
    pub sum: BigUint,
}

/// Collects the witnesses and constraints of a relation, and optionally their values.
///
/// Handles are numbered in declaration order, so defining the same relation twice
/// yields the same handles.
#[derive(Debug, Default)]
pub struct CircuitBuilder {
    pub(crate) num_witnesses: usize,
    pub(crate) num_public: usize,
    pub(crate) arithmetic: Vec<ArithmeticConstraint>,
    pub(crate) linear: Vec<LinearConstraint>,
    pub(crate) inf_norms: Vec<InfNormConstraint>,
    pub(crate) sums: Vec<SumConstraint>,
    pub(crate) witness_values: Vec<Option<Vec<BigUint>>>,
    pub(crate) public_values: Vec<Option<Vec<BigUint>>>,
}

impl CircuitBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a private witness.
    pub fn new_witness(&mut self) -> Witness {
        self.num_witnesses += 1;
        self.witness_values.push(None);
        Witness(self.num_witnesses - 1)
    }

    /// Declare a public witness.
    pub fn new_public_witness(&mut self) -> PublicWitness {
        self.num_public += 1;
        self.public_values.push(None);
        PublicWitness(self.num_public - 1)
    }

    /// Record the value of a witness. Values are only used when proving.
    ///
    /// Fails if `w` was not declared on this builder.
    pub fn assign_witness(&mut self, w: Witness, values: &[BigUint]) -> Result<()> {
        let slot = self
            .witness_values
            .get_mut(w.0)
            .ok_or(PiopError::MissingWitness(w.0))?;
        *slot = Some(values.to_vec());
        Ok(())
    }

    /// Record the value of a public witness.
    pub fn assign_public_witness(&mut self, p: PublicWitness, values: &[BigUint]) -> Result<()> {
        let slot = self
            .public_values
            .get_mut(p.0)
            .ok_or(PiopError::MissingPublicWitness(p.0))?;
        *slot = Some(values.to_vec());
        Ok(())
    }

    /// Require `constraint` to vanish in every slot.
    pub fn add_arithmetic_constraint(&mut self, constraint: ArithmeticConstraint) {
        self.arithmetic.push(constraint);
    }

    /// Require `output = transformer(input)`.
    pub fn add_linear_constraint<T: LinearTransformer + 'static>(
        &mut self,
        transformer: T,
        input: Witness,
        output: Witness,
    ) {
        self.linear.push(LinearConstraint {
            transformer: Box::new(transformer),
            input,
            output,
        });
    }

    /// Require every entry of `w`, read as a centered residue, to lie in `[-bound, bound]`.
    ///
    /// The witness is decomposed into fresh bit witnesses constrained by row checks.
    pub fn add_inf_norm_constraint(&mut self, w: Witness, bound: impl Into<BigUint>) {
        let c = InfNormConstraint::lower(self, w, bound.into());
        self.inf_norms.push(c);
    }

    /// Require the entries of `w` to sum to `sum`.
    pub fn add_sum_check_constraint(&mut self, w: Witness, sum: impl Into<BigUint>) {
        let constraint = ArithmeticConstraint::new().add_term(Term::new(1).witness(w));
        self.add_arithmetic_sum_check_constraint(constraint, sum);
    }

    /// Require the values of `constraint` over all slots to sum to `sum`.
    pub fn add_arithmetic_sum_check_constraint(
        &mut self,
        constraint: ArithmeticConstraint,
        sum: impl Into<BigUint>,
    ) {
        self.sums.push(SumConstraint {
            constraint,
            sum: sum.into(),
        });
    }

    /// Number of declared witnesses, bit witnesses included.
    pub fn num_witnesses(&self) -> usize {
        self.num_witnesses
    }

    /// Number of declared public witnesses.
    pub fn num_public_witnesses(&self) -> usize {
        self.num_public
    }
}

/// A relation declares its witnesses and constraints on a [`CircuitBuilder`].
///
/// `define` must declare the same handles in the same order on every call. A relation
/// carrying values assigns them while declaring; the assignment is ignored when compiling.
pub trait Relation {
    /// Declare the relation.
    fn define(&self, cs: &mut CircuitBuilder) -> Result<()>;
}

#[cfg(test)]
mod test {
    use super::*;

    struct Values(Vec<BigUint>, Vec<BigUint>);

    impl ConstraintValues for Values {
        fn witness(&self, w: Witness) -> &BigUint {
            &self.0[w.0]
        }

        fn public(&self, p: PublicWitness) -> &BigUint {
            &self.1[p.0]
        }
    }

    #[test]
    fn constraint_evaluation() {
        let reducer = Reducer::new(&BigUint::from(97u32));
        let mut cs = CircuitBuilder::new();
        let x = cs.new_witness();
        let y = cs.new_public_witness();
        let z = cs.new_witness();
        assert_eq!((x.index(), y.index(), z.index()), (0, 0, 1));

        // z - 3 x y + 5 = 0
        let c = ArithmeticConstraint::new()
            .add_term(Term::new(1).witness(z))
            .add_term(Term::new(-3).public(y).witness(x))
            .add_term(Term::new(1).scalar(BigUint::from(102u32)));
        assert_eq!(c.degree(), 1);
        assert_eq!(c.poly_degree(16), 31);

        let values = Values(
            vec![BigUint::from(4u32), BigUint::from(55u32)],
            vec![BigUint::from(5u32)],
        );
        assert!(c.evaluate(&values, &reducer).is_zero());
        assert!(c.normalize(&reducer).evaluate(&values, &reducer).is_zero());

        let values = Values(
            vec![BigUint::from(4u32), BigUint::from(56u32)],
            vec![BigUint::from(5u32)],
        );
        assert_eq!(c.evaluate(&values, &reducer), BigUint::one());
    }

    #[test]
    fn handles_are_checked() {
        let c = ArithmeticConstraint::new().add_term(Term::new(1).witness(Witness(3)));
        assert_eq!(c.check_handles(3, 0), Err(PiopError::MissingWitness(3)));
        assert!(c.check_handles(4, 0).is_ok());
        let c = ArithmeticConstraint::new().add_term(Term::new(1).public(PublicWitness(0)));
        assert_eq!(c.check_handles(0, 0), Err(PiopError::MissingPublicWitness(0)));
    }

    #[test]
    fn repeated_public_factors_multiply() {
        let reducer = Reducer::new(&BigUint::from(97u32));
        let mut cs = CircuitBuilder::new();
        let x = cs.new_witness();
        let p = cs.new_public_witness();
        let r = cs.new_public_witness();

        // x - p r^2 = 0
        let c = ArithmeticConstraint::new()
            .add_term(Term::new(1).witness(x))
            .add_term(Term::new(-1).public(p).public(r).public(r));
        assert_eq!(c.terms[1].publics, vec![p, r, r]);
        assert_eq!(c.degree(), 1);
        assert_eq!(c.poly_degree(16), 45);

        let values = Values(
            vec![BigUint::from(18u32)],
            vec![BigUint::from(2u32), BigUint::from(3u32)],
        );
        assert!(c.evaluate(&values, &reducer).is_zero());
        assert!(c.normalize(&reducer).evaluate(&values, &reducer).is_zero());
        assert_ne!(
            c.to_bytes(),
            ArithmeticConstraint::new()
                .add_term(Term::new(1).witness(x))
                .add_term(Term::new(-1).public(r).public(r))
                .to_bytes()
        );

        let c = ArithmeticConstraint::new().add_term(Term::new(1).public(p).public(PublicWitness(2)));
        assert_eq!(c.check_handles(1, 2), Err(PiopError::MissingPublicWitness(2)));
    }

    #[test]
    fn assignment_rejects_foreign_handles() {
        let mut other = CircuitBuilder::new();
        other.new_witness();
        let foreign = other.new_witness();
        let foreign_public = other.new_public_witness();

        let mut cs = CircuitBuilder::new();
        let w = cs.new_witness();
        let values = vec![BigUint::one(); 4];
        assert!(cs.assign_witness(w, &values).is_ok());
        assert_eq!(
            cs.assign_witness(foreign, &values),
            Err(PiopError::MissingWitness(1))
        );
        assert_eq!(
            cs.assign_public_witness(foreign_public, &values),
            Err(PiopError::MissingPublicWitness(0))
        );
        assert_eq!(cs.witness_values, vec![Some(values)]);
    }

    #[test]
    fn sum_check_declaration() {
        let mut cs = CircuitBuilder::new();
        let w = cs.new_witness();
        cs.add_sum_check_constraint(w, 10u32);
        assert_eq!(cs.sums.len(), 1);
        assert_eq!(cs.sums[0].sum, BigUint::from(10u32));
        assert_eq!(cs.sums[0].constraint.degree(), 1);
    }
}
