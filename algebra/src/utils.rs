use crate::prelude::*;

/// Small primes used both for trial division and as Miller-Rabin witnesses.
const SMALL_PRIMES: [u32; 24] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
];

/// Reverse the lowest `log_n` bits of `x`.
pub fn bit_reverse(x: usize, log_n: u32) -> usize {
    if log_n == 0 {
        return 0;
    }
    x.reverse_bits() >> (usize::BITS - log_n)
}

/// Permute a slice of power-of-two length into bit-reversed order.
pub fn bit_reverse_permute<T>(v: &mut [T]) {
    let n = v.len();
    let log_n = n.trailing_zeros();
    for i in 0..n {
        let j = bit_reverse(i, log_n);
        if i < j {
            v.swap(i, j);
        }
    }
}

/// Compute the minimum power of two that is greater or equal to the input
pub fn min_greater_equal_power_of_two(n: usize) -> usize {
    n.next_power_of_two()
}

/// Return the base-2 logarithm of a power of two.
pub fn log2_exact(n: usize) -> Result<u32> {
    if n == 0 || !n.is_power_of_two() {
        return Err(AlgebraError::DegreeNotPowerOfTwo(n));
    }
    Ok(n.trailing_zeros())
}

/// Miller-Rabin primality test with the first small primes as witnesses.
pub fn is_probable_prime(n: &BigUint) -> bool {
    let two = BigUint::from(2u32);
    if n < &two {
        return false;
    }
    for p in SMALL_PRIMES.iter() {
        let p = BigUint::from(*p);
        if n == &p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }

    let n_minus_one = n - 1u32;
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    'witness: for a in SMALL_PRIMES.iter() {
        let mut x = BigUint::from(*a).modpow(&d, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = &x * &x % n;
            if x == n_minus_one {
                continue 'witness;
            }
            if x.is_one() {
                return false;
            }
        }
        return false;
    }
    true
}

/// Find the largest prime of exactly `bits` bits that is congruent to 1 modulo `order`.
pub fn find_ntt_prime(bits: usize, order: usize) -> Result<BigUint> {
    if bits < 2 || order == 0 {
        return Err(AlgebraError::ParameterError);
    }
    let order = BigUint::from(order);
    let top = BigUint::one() << bits;
    let bottom = BigUint::one() << (bits - 1);

    // the largest candidate below 2^bits of the form k * order + 1
    let mut candidate = (&top - 1u32) / &order * &order + 1u32;
    if candidate >= top {
        candidate -= &order;
    }
    while candidate > bottom {
        if is_probable_prime(&candidate) {
            return Ok(candidate);
        }
        candidate -= &order;
    }
    Err(AlgebraError::PrimeNotFound(bits))
}

/// Return a primitive `order`-th root of unity modulo the prime `q`, `order` a power of two.
pub fn primitive_root_of_unity(q: &BigUint, order: usize) -> Result<BigUint> {
    log2_exact(order)?;
    let q_minus_one = q - 1u32;
    let order_big = BigUint::from(order);
    if !(&q_minus_one % &order_big).is_zero() {
        return Err(AlgebraError::NoPrimitiveRoot(order));
    }
    let exp = &q_minus_one / &order_big;
    let half = &q_minus_one >> 1;

    // A quadratic non-residue g gives g^((q-1)/order) of order exactly `order`.
    let mut g = BigUint::from(2u32);
    while &g < q {
        if g.modpow(&half, q) == q_minus_one {
            let root = g.modpow(&exp, q);
            if order == 1 || root.modpow(&BigUint::from(order / 2), q) == q_minus_one {
                return Ok(root);
            }
        }
        g += 1u32;
        if g > BigUint::from(1u32 << 16) {
            break;
        }
    }
    Err(AlgebraError::NoPrimitiveRoot(order))
}

/// Inverse of `a` modulo the prime `q`.
pub fn mod_inverse(a: &BigUint, q: &BigUint) -> Result<BigUint> {
    let a = a % q;
    if a.is_zero() {
        return Err(AlgebraError::NotInvertible);
    }
    Ok(a.modpow(&(q - 2u32), q))
}

/// Lift `x` in `[0, q)` to the centered representative in `(-q/2, q/2]`.
pub fn centered_lift(x: &BigUint, q: &BigUint) -> BigInt {
    if x > &(q >> 1) {
        BigInt::from_biguint(Sign::Plus, x.clone()) - BigInt::from_biguint(Sign::Plus, q.clone())
    } else {
        BigInt::from_biguint(Sign::Plus, x.clone())
    }
}

/// Reduce a signed integer into `[0, q)`.
pub fn reduce_signed(x: &BigInt, q: &BigUint) -> BigUint {
    let q = BigInt::from_biguint(Sign::Plus, q.clone());
    let (_, r) = x.mod_floor(&q).into_parts();
    r
}

/// Number of bytes needed to hold any residue modulo `q`.
pub fn modulus_byte_len(q: &BigUint) -> usize {
    ((q.bits() as usize) + 7) / 8
}

/// Serialize `x` as exactly `len` little-endian bytes.
pub fn biguint_to_bytes_le(x: &BigUint, len: usize) -> Vec<u8> {
    let mut bytes = x.to_bytes_le();
    bytes.resize(len, 0);
    bytes
}

/// Squared Euclidean norm of the centered lifts of `coeffs` modulo `q`.
pub fn centered_norm_squared<'a, I: IntoIterator<Item = &'a BigUint>>(
    coeffs: I,
    q: &BigUint,
) -> BigUint {
    let mut acc = BigUint::zero();
    for c in coeffs {
        let (_, m) = centered_lift(c, q).into_parts();
        acc += &m * &m;
    }
    acc
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_bit_reverse() {
        assert_eq!(super::bit_reverse(0b0001, 4), 0b1000);
        assert_eq!(super::bit_reverse(0b0110, 4), 0b0110);
        assert_eq!(super::bit_reverse(0b1011, 4), 0b1101);
        assert_eq!(super::bit_reverse(5, 0), 0);

        let mut v: Vec<usize> = (0..8).collect();
        bit_reverse_permute(&mut v);
        assert_eq!(v, vec![0, 4, 2, 6, 1, 5, 3, 7]);
        bit_reverse_permute(&mut v);
        assert_eq!(v, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn min_greater_equal_power_of_two() {
        assert_eq!(16, super::min_greater_equal_power_of_two(16));
        assert_eq!(16, super::min_greater_equal_power_of_two(15));
        assert_eq!(16, super::min_greater_equal_power_of_two(9));
        assert_eq!(8, super::min_greater_equal_power_of_two(5));
        assert_eq!(1, super::min_greater_equal_power_of_two(1));
    }

    #[test]
    fn test_primality() {
        let primes = [2u64, 3, 97, 65537, 998244353, 18446744069414584321];
        for p in primes.iter() {
            assert!(is_probable_prime(&BigUint::from(*p)));
        }
        let composites = [1u64, 91, 561, 65535, 4294967297];
        for c in composites.iter() {
            assert!(!is_probable_prime(&BigUint::from(*c)));
        }
        // 65484^4 + 1
        let q = BigUint::from(65484u64).pow(4) + 1u32;
        assert!(is_probable_prime(&q));
    }

    #[test]
    fn test_find_ntt_prime() {
        let q = find_ntt_prime(62, 64).unwrap();
        assert_eq!(q.bits(), 62);
        assert!((&q - 1u32) % 64u32 == BigUint::zero());
        assert!(is_probable_prime(&q));
    }

    #[test]
    fn test_root_of_unity() {
        let q = BigUint::from(998244353u64);
        let w = primitive_root_of_unity(&q, 1 << 10).unwrap();
        assert!(w.modpow(&BigUint::from(1u32 << 10), &q).is_one());
        assert!(!w.modpow(&BigUint::from(1u32 << 9), &q).is_one());
        assert_eq!(
            primitive_root_of_unity(&BigUint::from(97u32), 64),
            Err(AlgebraError::NoPrimitiveRoot(64))
        );
    }

    #[test]
    fn test_centered() {
        let q = BigUint::from(17u32);
        assert_eq!(centered_lift(&BigUint::from(8u32), &q), BigInt::from(8));
        assert_eq!(centered_lift(&BigUint::from(9u32), &q), BigInt::from(-8));
        assert_eq!(reduce_signed(&BigInt::from(-1), &q), BigUint::from(16u32));
        assert_eq!(
            centered_norm_squared(&[BigUint::from(16u32), BigUint::from(2u32)], &q),
            BigUint::from(5u32)
        );
        assert_eq!(
            mod_inverse(&BigUint::from(3u32), &q).unwrap(),
            BigUint::from(6u32)
        );
    }
}
