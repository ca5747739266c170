use latte_algebra::prelude::*;

/// Draw `n` ChaCha seeds from `prng`, in order.
///
/// Parallel tasks each own one seed, so the output does not depend on scheduling.
pub fn derive_seeds<R: RngCore>(prng: &mut R, n: usize) -> Vec<[u8; 32]> {
    (0..n)
        .map(|_| {
            let mut seed = [0u8; 32];
            prng.fill_bytes(&mut seed);
            seed
        })
        .collect()
}

/// Run two closures, in parallel when the `parallel` feature is on.
#[cfg(feature = "parallel")]
pub fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    rayon::join(a, b)
}

/// Run two closures, in parallel when the `parallel` feature is on.
#[cfg(not(feature = "parallel"))]
pub fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    (a(), b())
}

/// Pad `v` with zeros to length `len`.
pub fn pad_zeros(mut v: Vec<BigUint>, len: usize) -> Vec<BigUint> {
    if v.len() < len {
        v.resize(len, BigUint::zero());
    }
    v
}

/// Integer ceiling of `a / b`.
pub fn div_ceil(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}

/// Return `[s, s^2, ..., s^n]` modulo the reducer's modulus.
pub fn challenge_powers(s: &BigUint, n: usize, reducer: &Reducer) -> Vec<BigUint> {
    let mut out = Vec::with_capacity(n);
    let mut cur = s.clone();
    for _ in 0..n {
        let next = reducer.mul(&cur, s);
        out.push(cur);
        cur = next;
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn seeds_are_deterministic() {
        let mut a = ChaChaRng::from_seed([3u8; 32]);
        let mut b = ChaChaRng::from_seed([3u8; 32]);
        assert_eq!(derive_seeds(&mut a, 4), derive_seeds(&mut b, 4));
        let seeds = derive_seeds(&mut a, 2);
        assert_ne!(seeds[0], seeds[1]);
    }

    #[test]
    fn powers() {
        let reducer = Reducer::new(&BigUint::from(97u32));
        let p = challenge_powers(&BigUint::from(10u32), 3, &reducer);
        assert_eq!(
            p,
            vec![
                BigUint::from(10u32),
                BigUint::from(3u32),
                BigUint::from(30u32)
            ]
        );
        assert_eq!(div_ceil(17, 8), 3);
        assert_eq!(pad_zeros(vec![BigUint::one()], 3).len(), 3);
    }
}
