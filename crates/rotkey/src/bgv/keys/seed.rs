//! Per-key seeds derived from a master seed.

use crate::{Error, Result};
use hkdf::Hkdf;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::Sha256;

/// Seed of the pseudorandom generator used for one rotation key.
pub type Seed = <ChaCha8Rng as SeedableRng>::Seed;

const ROTATION_KEY_DOMAIN: &[u8] = b"rotkey_bgv_rotation_key_v1";

/// Derives the seed of the rotation key for substitution `power` from the
/// master seed of a key set, with HKDF-SHA256.
///
/// The master seed is the input key material, and the info string is the
/// domain followed by the power as a little-endian `u64`.
pub(crate) fn derive_key_seed(master_seed: &Seed, power: usize) -> Result<Seed> {
    let hk = Hkdf::<Sha256>::new(None, master_seed);
    let mut seed = Seed::default();
    hk.expand_multi_info(&[ROTATION_KEY_DOMAIN, &(power as u64).to_le_bytes()], &mut seed)
        .map_err(|e| Error::DefaultError(e.to_string()))?;
    Ok(seed)
}

#[cfg(test)]
mod tests {
    use super::{derive_key_seed, Seed};
    use rand::{thread_rng, Rng};
    use std::error::Error;

    #[test]
    fn derive() -> Result<(), Box<dyn Error>> {
        let mut master = Seed::default();
        thread_rng().fill(&mut master);

        assert_eq!(derive_key_seed(&master, 5)?, derive_key_seed(&master, 5)?);
        assert_ne!(derive_key_seed(&master, 5)?, derive_key_seed(&master, 9)?);

        let mut other = master;
        other[0] ^= 1;
        assert_ne!(derive_key_seed(&master, 5)?, derive_key_seed(&other, 5)?);
        Ok(())
    }

    #[test]
    fn hkdf_sha256_vector() -> Result<(), Box<dyn Error>> {
        let mut master = Seed::default();
        master
            .iter_mut()
            .enumerate()
            .for_each(|(i, b)| *b = i as u8);
        assert_eq!(
            derive_key_seed(&master, 5)?,
            [
                50, 162, 18, 204, 194, 167, 155, 105, 244, 210, 6, 234, 195, 31, 82, 226, 212, 3,
                41, 72, 42, 12, 169, 65, 233, 166, 73, 211, 80, 67, 147, 2
            ]
        );
        Ok(())
    }
}
