#![crate_name = "rotkey_util"]
#![crate_type = "lib"]
#![warn(missing_docs, unused_imports)]

//! Utilities for the rotkey library.

use num_traits::ToPrimitive;
use rand::{CryptoRng, RngCore};

/// Returns whether the modulus p is prime; this function is 100% accurate.
pub fn is_prime(p: u64) -> bool {
    num_bigint_dig::prime::probably_prime(&num_bigint_dig::BigUint::from(p), 0)
}

/// Sample a vector of independent centered binomial distributions of a given
/// variance. Returns an error if the variance is strictly larger than 16.
pub fn sample_vec_cbd<R: RngCore + CryptoRng>(
    vector_size: usize,
    variance: usize,
    rng: &mut R,
) -> Result<Vec<i64>, &'static str> {
    if !(1..=16).contains(&variance) {
        return Err("The variance should be between 1 and 16");
    }

    let mut out = Vec::with_capacity(vector_size);

    let number_bits = 4 * variance;
    let mask_add = (u64::MAX >> (64 - 2 * variance)) as u128;
    let mask_sub = mask_add << (2 * variance);

    let mut current_pool = 0u128;
    let mut current_pool_nbits = 0;

    for _ in 0..vector_size {
        if current_pool_nbits < number_bits {
            current_pool |= (rng.next_u64() as u128) << current_pool_nbits;
            current_pool_nbits += 64;
        }
        debug_assert!(current_pool_nbits >= number_bits);
        out.push(
            ((current_pool & mask_add).count_ones() as i64)
                - ((current_pool & mask_sub).count_ones() as i64),
        );
        current_pool >>= number_bits;
        current_pool_nbits -= number_bits;
    }

    Ok(out)
}

/// Compute the sample variance of a list of values.
/// Panics if the length of value is < 2.
pub fn variance<T: ToPrimitive>(values: &[T]) -> f64 {
    assert!(values.len() > 1);
    let values = values
        .iter()
        .map(|v| v.to_f64().unwrap_or_default())
        .collect::<Vec<_>>();
    let mean = values.iter().sum::<f64>() / (values.len() as f64);
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / ((values.len() as f64) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::{is_prime, sample_vec_cbd, variance};
    use proptest::prelude::*;
    use rand::thread_rng;

    #[test]
    fn prime() {
        assert!(is_prime(2));
        assert!(is_prime(3));
        assert!(is_prime(5));
        assert!(is_prime(7));
        assert!(is_prime(1153));
        assert!(is_prime(4611686018326724609));

        assert!(!is_prime(0));
        assert!(!is_prime(1));
        assert!(!is_prime(4));
        assert!(!is_prime(1155));
        assert!(!is_prime(4611686018326724607));
    }

    proptest! {
        #[test]
        fn sample_cbd_bounds(var in 1usize..=16, size in 0usize..200) {
            let v = sample_vec_cbd(size, var, &mut thread_rng()).unwrap();
            prop_assert_eq!(v.len(), size);
            prop_assert!(v.iter().all(|vi| vi.abs() <= 2 * var as i64));
        }

        #[test]
        fn sample_cbd_invalid_variance(
            var in prop_oneof![Just(0usize), 17usize..64],
            size in 0usize..20,
        ) {
            prop_assert!(sample_vec_cbd(size, var, &mut thread_rng()).is_err());
        }
    }

    #[test]
    fn sample_cbd() {
        assert!(sample_vec_cbd(10, 0, &mut thread_rng()).is_err());
        assert!(sample_vec_cbd(10, 17, &mut thread_rng()).is_err());

        for var in 1..=16 {
            // Verifies that the variance is correct. We could probably refine the bound
            // but for now, we will consider the estimate to be fine when within 10%.
            let v = sample_vec_cbd(100000, var, &mut thread_rng()).unwrap();
            let estimated_variance = variance(&v);
            let relative_diff = (estimated_variance - var as f64).abs() / var as f64;
            assert!(relative_diff < 0.1);
        }
    }

    #[test]
    fn sample_variance() {
        assert_eq!(variance(&[0u64, 0]), 0.0);
        assert_eq!(variance(&[1u64, 3]), 2.0);
        assert_eq!(variance(&[-2i64, 2]), 8.0);
    }
}
