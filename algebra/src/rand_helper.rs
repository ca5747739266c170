use rand_chacha::{
    rand_core::{CryptoRng, RngCore, SeedableRng},
    ChaChaRng,
};

fn test_rng_helper() -> ChaChaRng {
    // arbitrary seed
    let seed = [
        7, 0, 0, 0, 41, 0, 0, 0, 113, 2, 0, 0, 5, 19, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0,
    ];
    ChaChaRng::from_seed(seed)
}

/// Should be used only for tests, not for any real world usage.
#[cfg(not(feature = "std"))]
pub fn test_rng() -> impl RngCore + CryptoRng {
    test_rng_helper()
}

/// Should be used only for tests, not for any real world usage.
///
/// Setting `DETERMINISTIC_TEST_RNG=1` makes every call return the same stream.
#[cfg(feature = "std")]
pub fn test_rng() -> impl RngCore + CryptoRng {
    let is_deterministic =
        std::env::vars().any(|(key, val)| key == "DETERMINISTIC_TEST_RNG" && val == "1");
    if is_deterministic {
        test_rng_helper()
    } else {
        ChaChaRng::from_entropy()
    }
}

#[cfg(all(test, feature = "std"))]
mod test {
    use rand_chacha::rand_core::RngCore;

    #[test]
    fn test_deterministic_rng() {
        let mut rng = super::test_rng();
        let a = rng.next_u64();

        // Reset the rng by sampling a new one.
        let mut rng = super::test_rng();
        let b = rng.next_u64();
        assert_ne!(a, b); // should be unequal with high probability.

        std::env::set_var("DETERMINISTIC_TEST_RNG", "1");
        let mut rng = super::test_rng();
        let a = rng.next_u64();

        let mut rng = super::test_rng();
        let b = rng.next_u64();
        assert_eq!(a, b);
        std::env::remove_var("DETERMINISTIC_TEST_RNG");
    }
}
