//! Polynomial rings `Z_q[X]/(X^N - 1)` and `Z_q[X]/(X^N + 1)` with NTT multiplication.
//!
//! Elements live either in coefficient form or in NTT form. The forward transform
//! takes natural-order coefficients to bit-reversed evaluations: in the cyclic ring
//! slot `k` holds `A(w^brv(k))` for a primitive `N`-th root `w`; in the cyclotomic
//! ring slot `k` holds `A(psi^(2 brv(k) + 1))` for a primitive `2N`-th root `psi`.

use crate::prelude::*;
use ark_std::{cfg_iter, cfg_iter_mut};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Which defining polynomial the ring is reduced by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RingKind {
    /// `X^N - 1`.
    Cyclic,
    /// `X^N + 1`.
    Cyclotomic,
}

/// A ring element, with every coefficient reduced into `[0, q)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poly {
    /// The coefficients, or the NTT values when `is_ntt` is set.
    pub coeffs: Vec<BigUint>,
    /// Whether the element is in NTT form.
    pub is_ntt: bool,
}

impl Poly {
    /// The zero element of degree `n`.
    pub fn zero(n: usize, is_ntt: bool) -> Poly {
        Poly {
            coeffs: vec![BigUint::zero(); n],
            is_ntt,
        }
    }

    /// Return the number of coefficients.
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    /// Whether the element has no coefficients.
    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Whether every coefficient is zero.
    pub fn is_zero(&self) -> bool {
        self.coeffs.iter().all(|c| c.is_zero())
    }
}

/// A cyclic or cyclotomic ring with precomputed NTT tables.
#[derive(Clone, Debug)]
pub struct Ring {
    degree: usize,
    log_degree: u32,
    kind: RingKind,
    reducer: Reducer,
    /// Order of the stored root: `2N` for cyclotomic rings, `N` for cyclic ones.
    root_order: usize,
    root_pows: Vec<BigUint>,
    inv_root_pows: Vec<BigUint>,
    n_inv: BigUint,
}

impl Ring {
    /// Build the ring of degree `degree` over the prime `modulus`.
    ///
    /// Fails if the degree is not a power of two, the modulus is not prime, or the
    /// modulus has no primitive root of unity of the required order.
    pub fn new(degree: usize, modulus: &BigUint, kind: RingKind) -> Result<Ring> {
        let log_degree = log2_exact(degree)?;
        if !is_probable_prime(modulus) {
            return Err(AlgebraError::ModulusNotPrime);
        }
        let root_order = match kind {
            RingKind::Cyclic => degree,
            RingKind::Cyclotomic => 2 * degree,
        };
        let reducer = Reducer::new(modulus);
        let root = primitive_root_of_unity(modulus, root_order)?;
        let root_inv = mod_inverse(&root, modulus)?;

        let mut root_pows = Vec::with_capacity(root_order);
        let mut inv_root_pows = Vec::with_capacity(root_order);
        let mut cur = BigUint::one();
        let mut cur_inv = BigUint::one();
        for _ in 0..root_order {
            let next = reducer.mul(&cur, &root);
            let next_inv = reducer.mul(&cur_inv, &root_inv);
            root_pows.push(cur);
            inv_root_pows.push(cur_inv);
            cur = next;
            cur_inv = next_inv;
        }
        let n_inv = mod_inverse(&BigUint::from(degree), modulus)?;

        Ok(Ring {
            degree,
            log_degree,
            kind,
            reducer,
            root_order,
            root_pows,
            inv_root_pows,
            n_inv,
        })
    }

    /// Return the ring degree.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Return the modulus.
    pub fn modulus(&self) -> &BigUint {
        self.reducer.modulus()
    }

    /// Return the ring kind.
    pub fn kind(&self) -> RingKind {
        self.kind
    }

    /// Return the Barrett reducer of the modulus.
    pub fn reducer(&self) -> &Reducer {
        &self.reducer
    }

    /// Exponent of the stored root at which NTT slot `k` evaluates.
    fn slot_exponent(&self, k: usize) -> usize {
        let r = bit_reverse(k, self.log_degree);
        match self.kind {
            RingKind::Cyclic => r,
            RingKind::Cyclotomic => 2 * r + 1,
        }
    }

    /// The point at which NTT slot `k` evaluates the element.
    pub fn evaluation_point(&self, k: usize) -> BigUint {
        self.root_pows[self.slot_exponent(k)].clone()
    }

    /// The zero element.
    pub fn zero(&self, is_ntt: bool) -> Poly {
        Poly::zero(self.degree, is_ntt)
    }

    /// Build an element from unreduced values.
    pub fn new_poly(&self, coeffs: Vec<BigUint>, is_ntt: bool) -> Result<Poly> {
        if coeffs.len() != self.degree {
            return Err(AlgebraError::LengthMismatch);
        }
        let q = self.modulus();
        let coeffs = coeffs
            .into_iter()
            .map(|c| if &c >= q { c % q } else { c })
            .collect();
        Ok(Poly { coeffs, is_ntt })
    }

    /// Build a coefficient-form element from signed coefficients.
    pub fn from_signed(&self, coeffs: &[BigInt]) -> Result<Poly> {
        if coeffs.len() != self.degree {
            return Err(AlgebraError::LengthMismatch);
        }
        let q = self.modulus();
        Ok(Poly {
            coeffs: coeffs.iter().map(|c| reduce_signed(c, q)).collect(),
            is_ntt: false,
        })
    }

    fn check(&self, p: &Poly) -> Result<()> {
        if p.len() != self.degree {
            return Err(AlgebraError::LengthMismatch);
        }
        Ok(())
    }

    fn check_pair(&self, a: &Poly, b: &Poly) -> Result<()> {
        self.check(a)?;
        self.check(b)?;
        if a.is_ntt != b.is_ntt {
            return Err(AlgebraError::RepresentationMismatch);
        }
        Ok(())
    }

    /// Forward transform of natural-order coefficients into bit-reversed NTT values.
    pub fn ntt_in_place(&self, a: &mut [BigUint]) {
        let n = self.degree;
        let r = &self.reducer;
        if self.kind == RingKind::Cyclotomic {
            for (c, psi) in a.iter_mut().zip(self.root_pows.iter()) {
                *c = r.mul(c, psi);
            }
        }
        let stride = self.root_order / n;
        let mut len = n / 2;
        while len >= 1 {
            let step = n / (2 * len);
            for start in (0..n).step_by(2 * len) {
                for j in 0..len {
                    let w = &self.root_pows[j * step * stride];
                    let u = ark_std::mem::take(&mut a[start + j]);
                    let v = ark_std::mem::take(&mut a[start + j + len]);
                    a[start + j] = r.add(&u, &v);
                    a[start + j + len] = r.mul(&r.sub(&u, &v), w);
                }
            }
            len /= 2;
        }
    }

    /// Inverse transform of bit-reversed NTT values into natural-order coefficients.
    pub fn intt_in_place(&self, a: &mut [BigUint]) {
        let n = self.degree;
        let r = &self.reducer;
        let stride = self.root_order / n;
        let mut len = 1;
        while len < n {
            let step = n / (2 * len);
            for start in (0..n).step_by(2 * len) {
                for j in 0..len {
                    let w = &self.inv_root_pows[j * step * stride];
                    let u = ark_std::mem::take(&mut a[start + j]);
                    let v = r.mul(&a[start + j + len], w);
                    a[start + j] = r.add(&u, &v);
                    a[start + j + len] = r.sub(&u, &v);
                }
            }
            len *= 2;
        }
        for c in a.iter_mut() {
            *c = r.mul(c, &self.n_inv);
        }
        if self.kind == RingKind::Cyclotomic {
            for (c, psi_inv) in a.iter_mut().zip(self.inv_root_pows.iter()) {
                *c = r.mul(c, psi_inv);
            }
        }
    }

    /// Convert into NTT form. An element already in NTT form is left as is.
    pub fn to_ntt_assign(&self, p: &mut Poly) -> Result<()> {
        self.check(p)?;
        if !p.is_ntt {
            self.ntt_in_place(&mut p.coeffs);
            p.is_ntt = true;
        }
        Ok(())
    }

    /// Convert into coefficient form. An element already in coefficient form is left as is.
    pub fn to_coeff_assign(&self, p: &mut Poly) -> Result<()> {
        self.check(p)?;
        if p.is_ntt {
            self.intt_in_place(&mut p.coeffs);
            p.is_ntt = false;
        }
        Ok(())
    }

    /// Return the NTT form of `p`.
    pub fn to_ntt(&self, p: &Poly) -> Result<Poly> {
        let mut out = p.clone();
        self.to_ntt_assign(&mut out)?;
        Ok(out)
    }

    /// Return the coefficient form of `p`.
    pub fn to_coeff(&self, p: &Poly) -> Result<Poly> {
        let mut out = p.clone();
        self.to_coeff_assign(&mut out)?;
        Ok(out)
    }

    /// Return `a + b`.
    pub fn add(&self, a: &Poly, b: &Poly) -> Result<Poly> {
        let mut out = a.clone();
        self.add_assign(&mut out, b)?;
        Ok(out)
    }

    /// Set `a = a + b`.
    pub fn add_assign(&self, a: &mut Poly, b: &Poly) -> Result<()> {
        self.check_pair(a, b)?;
        for (x, y) in a.coeffs.iter_mut().zip(b.coeffs.iter()) {
            *x = self.reducer.add(x, y);
        }
        Ok(())
    }

    /// Return `a - b`.
    pub fn sub(&self, a: &Poly, b: &Poly) -> Result<Poly> {
        self.check_pair(a, b)?;
        let coeffs = a
            .coeffs
            .iter()
            .zip(b.coeffs.iter())
            .map(|(x, y)| self.reducer.sub(x, y))
            .collect();
        Ok(Poly {
            coeffs,
            is_ntt: a.is_ntt,
        })
    }

    /// Return `-a`.
    pub fn neg(&self, a: &Poly) -> Poly {
        Poly {
            coeffs: a.coeffs.iter().map(|x| self.reducer.neg(x)).collect(),
            is_ntt: a.is_ntt,
        }
    }

    /// Return `s * a` for an integer scalar `s`.
    pub fn scalar_mul(&self, a: &Poly, s: &BigUint) -> Poly {
        let s = s % self.modulus();
        Poly {
            coeffs: cfg_iter!(a.coeffs).map(|x| self.reducer.mul(x, &s)).collect(),
            is_ntt: a.is_ntt,
        }
    }

    /// Set `acc = acc + s * a` for an integer scalar `s`.
    pub fn scalar_mul_acc(&self, acc: &mut Poly, a: &Poly, s: &BigUint) -> Result<()> {
        self.check_pair(acc, a)?;
        let s = s % self.modulus();
        for (x, y) in acc.coeffs.iter_mut().zip(a.coeffs.iter()) {
            *x = self.reducer.add(x, &self.reducer.mul(y, &s));
        }
        Ok(())
    }

    /// Return the ring product `a * b`, in the representation of the inputs.
    pub fn mul(&self, a: &Poly, b: &Poly) -> Result<Poly> {
        self.check_pair(a, b)?;
        if a.is_ntt {
            return Ok(self.pointwise(a, b));
        }
        let a_ntt = self.to_ntt(a)?;
        let b_ntt = self.to_ntt(b)?;
        self.to_coeff(&self.pointwise(&a_ntt, &b_ntt))
    }

    fn pointwise(&self, a: &Poly, b: &Poly) -> Poly {
        Poly {
            coeffs: cfg_iter!(a.coeffs)
                .zip(cfg_iter!(b.coeffs))
                .map(|(x, y)| self.reducer.mul(x, y))
                .collect(),
            is_ntt: true,
        }
    }

    /// Set `acc = acc + a * b` for elements in NTT form.
    pub fn mul_acc(&self, acc: &mut Poly, a: &Poly, b: &Poly) -> Result<()> {
        self.check_pair(a, b)?;
        self.check_pair(acc, a)?;
        if !acc.is_ntt {
            return Err(AlgebraError::RepresentationMismatch);
        }
        cfg_iter_mut!(acc.coeffs)
            .zip(cfg_iter!(a.coeffs))
            .zip(cfg_iter!(b.coeffs))
            .for_each(|((z, x), y)| *z = self.reducer.add(z, &self.reducer.mul(x, y)));
        Ok(())
    }

    /// Return the monomial `X^e`, where `e` is taken modulo `2N` (cyclotomic) or `N` (cyclic).
    pub fn monomial(&self, e: usize, is_ntt: bool) -> Poly {
        let e = e % self.root_order;
        if is_ntt {
            let coeffs = (0..self.degree)
                .map(|k| self.root_pows[(e * self.slot_exponent(k)) % self.root_order].clone())
                .collect();
            return Poly {
                coeffs,
                is_ntt: true,
            };
        }
        let mut out = self.zero(false);
        if e < self.degree {
            out.coeffs[e] = BigUint::one();
        } else {
            out.coeffs[e - self.degree] = self.reducer.neg(&BigUint::one());
        }
        out
    }

    fn check_automorphism_exponent(&self, d: usize) -> Result<()> {
        if self.degree > 1 && d % 2 == 0 {
            return Err(AlgebraError::ParameterError);
        }
        Ok(())
    }

    /// Apply `X -> X^d` for odd `d`, in the representation of `p`.
    pub fn automorphism(&self, p: &Poly, d: usize) -> Result<Poly> {
        self.check(p)?;
        self.check_automorphism_exponent(d)?;
        let n = self.degree;
        let d = d % self.root_order;
        let mut out = self.zero(p.is_ntt);
        if p.is_ntt {
            for k in 0..n {
                let src = match self.kind {
                    RingKind::Cyclic => bit_reverse(bit_reverse(k, self.log_degree) * d % n, self.log_degree),
                    RingKind::Cyclotomic => {
                        let e = self.slot_exponent(k) * d % (2 * n);
                        bit_reverse((e - 1) / 2, self.log_degree)
                    }
                };
                out.coeffs[k] = p.coeffs[src].clone();
            }
            return Ok(out);
        }
        for (i, c) in p.coeffs.iter().enumerate() {
            let idx = i * d % self.root_order;
            if idx >= n {
                out.coeffs[idx - n] = self.reducer.neg(c);
            } else {
                out.coeffs[idx] = c.clone();
            }
        }
        Ok(out)
    }

    /// Return the `e` with `d * e = 1` modulo the automorphism group order.
    pub fn inverse_automorphism_exponent(&self, d: usize) -> Result<usize> {
        self.check_automorphism_exponent(d)?;
        let order = self.root_order as i128;
        let gcd = (d as i128).extended_gcd(&order);
        if !gcd.gcd.is_one() {
            return Err(AlgebraError::NotInvertible);
        }
        Ok(gcd.x.mod_floor(&order) as usize)
    }

    /// Evaluate a coefficient-form element at `x`.
    pub fn evaluate(&self, p: &Poly, x: &BigUint) -> Result<BigUint> {
        self.check(p)?;
        if p.is_ntt {
            return Err(AlgebraError::RepresentationMismatch);
        }
        Ok(self.reducer.eval_poly(&p.coeffs, x))
    }

    /// Return `(quo, rem)` with `p = quo * (X^n - 1) + rem` for a coefficient vector of any length.
    ///
    /// The remainder always has length `n`.
    pub fn quo_rem_by_vanishing(&self, p: &[BigUint], n: usize) -> (Vec<BigUint>, Vec<BigUint>) {
        let r = &self.reducer;
        let len = p.len();
        let mut rem: Vec<BigUint> = p.to_vec();
        if len < n {
            rem.resize(n, BigUint::zero());
        }
        let mut quo = vec![BigUint::zero(); len.saturating_sub(n)];
        for i in (n..len).rev() {
            let c = ark_std::mem::take(&mut rem[i]);
            quo[i - n] = r.add(&quo[i - n], &c);
            rem[i - n] = r.add(&rem[i - n], &c);
        }
        rem.truncate(n);
        (quo, rem)
    }

    fn check_transpose(&self, v: &[BigUint]) -> Result<()> {
        if self.kind != RingKind::Cyclotomic {
            return Err(AlgebraError::ParameterError);
        }
        if v.len() != self.degree {
            return Err(AlgebraError::LengthMismatch);
        }
        Ok(())
    }

    /// Apply the transpose of the forward NTT matrix: `N * INTT(reverse(v))`.
    pub fn ntt_transpose(&self, v: &[BigUint]) -> Result<Vec<BigUint>> {
        self.check_transpose(v)?;
        let mut out: Vec<BigUint> = v.iter().rev().cloned().collect();
        self.intt_in_place(&mut out);
        let n = BigUint::from(self.degree);
        Ok(out.iter().map(|c| self.reducer.mul(c, &n)).collect())
    }

    /// Apply the transpose of the inverse NTT matrix: `reverse(NTT(v)) / N`.
    pub fn intt_transpose(&self, v: &[BigUint]) -> Result<Vec<BigUint>> {
        self.check_transpose(v)?;
        let mut out = v.to_vec();
        self.ntt_in_place(&mut out);
        Ok(out
            .iter()
            .rev()
            .map(|c| self.reducer.mul(c, &self.n_inv))
            .collect())
    }

    /// Apply the transpose of the NTT-domain automorphism by `d`.
    pub fn automorphism_transpose(&self, v: &[BigUint], d: usize) -> Result<Vec<BigUint>> {
        let d_inv = self.inverse_automorphism_exponent(d)?;
        let p = Poly {
            coeffs: v.to_vec(),
            is_ntt: true,
        };
        Ok(self.automorphism(&p, d_inv)?.coeffs)
    }
}

impl Reducer {
    /// Evaluate the polynomial with coefficients `coeffs` at `x` by Horner's rule.
    pub fn eval_poly(&self, coeffs: &[BigUint], x: &BigUint) -> BigUint {
        let x = x % self.modulus();
        let mut acc = BigUint::zero();
        for c in coeffs.iter().rev() {
            acc = self.add(&self.mul(&acc, &x), c);
        }
        acc
    }
}
