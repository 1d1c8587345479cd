//! Generation of NTT-friendly primes.

use rotkey_util::is_prime;

/// Returns the largest prime of `num_bits` bits which is congruent to 1 modulo
/// `modulo` and strictly smaller than `upper_bound`.
///
/// Returns None if `num_bits` is not in [10, 62], or if no such prime exists.
pub fn generate_prime(num_bits: usize, modulo: u64, upper_bound: u64) -> Option<u64> {
    if !(10..=62).contains(&num_bits) || modulo == 0 || upper_bound < 2 {
        return None;
    }
    debug_assert!(
        (1u64 << num_bits) >= upper_bound,
        "upper_bound larger than number of bits"
    );

    let leading_zeros = (64 - num_bits) as u32;

    let mut tentative_prime = upper_bound - 1;
    let remainder = tentative_prime % modulo;
    tentative_prime = if remainder >= 1 {
        tentative_prime - (remainder - 1)
    } else {
        tentative_prime.checked_sub(modulo - 1)?
    };

    while tentative_prime.leading_zeros() == leading_zeros {
        if is_prime(tentative_prime) {
            return Some(tentative_prime);
        }
        tentative_prime = tentative_prime.checked_sub(modulo)?;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::generate_prime;
    use rotkey_util::is_prime;

    #[test]
    fn prime_generation() {
        assert!(generate_prime(0, 2, 1 << 10).is_none());
        assert!(generate_prime(63, 2, 1 << 62).is_none());

        for size in 10..=62 {
            for modulo in [2u64, 16, 128, 1024] {
                let upper_bound = 1u64 << size;
                if let Some(p) = generate_prime(size, modulo, upper_bound) {
                    assert!(is_prime(p));
                    assert_eq!(p % modulo, 1);
                    assert_eq!(64 - p.leading_zeros() as usize, size);
                    assert!(p < upper_bound);

                    // The next prime is strictly smaller.
                    if let Some(q) = generate_prime(size, modulo, p) {
                        assert!(q < p);
                        assert_eq!(q % modulo, 1);
                    }
                }
            }
        }

        assert_eq!(generate_prime(62, 16, 1 << 62), Some(4611686018427387761));
    }
}
