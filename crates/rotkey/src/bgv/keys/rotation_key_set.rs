//! Sets of rotation keys indexed by slot shift.

use super::{
    seed::{derive_key_seed, Seed},
    Gadget, RotationConfig, RotationKey,
};
use crate::bgv::{BgvParameters, SecretKey};
use crate::{Error, Result};
use rand::{CryptoRng, Rng, RngCore};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// A rotation key together with its substitution power.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerAndKey {
    /// The substitution power `p` of the automorphism `X -> X^p`.
    pub power: usize,
    /// The key switching key from `s(X^p)` to `s(X)`.
    pub key: RotationKey,
}

/// The rotation keys for every shift `1..N/2` of a given level.
///
/// The key for shift `k` switches from the substitution `X -> X^(g^k)`, where
/// `g` is the Galois generator, so that applying it rotates both rows of slots
/// by `k` to the left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationKeySet {
    par: Arc<BgvParameters>,
    level: usize,
    gadget: Arc<Gadget>,
    keys: BTreeMap<usize, PowerAndKey>,
}

impl RotationKeySet {
    /// Generate the rotation keys at the highest level with the default
    /// configuration.
    pub fn generate<R: RngCore + CryptoRng>(
        par: &Arc<BgvParameters>,
        sk: &SecretKey,
        rng: &mut R,
    ) -> Result<Self> {
        Self::generate_with_config(par, sk, &RotationConfig::default(), rng)
    }

    /// Generate the rotation keys at the highest level.
    pub fn generate_with_config<R: RngCore + CryptoRng>(
        par: &Arc<BgvParameters>,
        sk: &SecretKey,
        config: &RotationConfig,
        rng: &mut R,
    ) -> Result<Self> {
        let mut seed = Seed::default();
        rng.fill(&mut seed);
        Self::generate_with_seed(par, sk, config, seed)
    }

    /// Generate the rotation keys at the highest level, deterministically from
    /// a master seed.
    pub fn generate_with_seed(
        par: &Arc<BgvParameters>,
        sk: &SecretKey,
        config: &RotationConfig,
        seed: Seed,
    ) -> Result<Self> {
        Self::generate_at_level(par, sk, par.max_level(), config, seed)
    }

    /// Generate the rotation keys for ciphertexts at `level`, deterministically
    /// from a master seed.
    #[instrument(skip(par, sk, seed), fields(degree = par.degree()))]
    pub fn generate_at_level(
        par: &Arc<BgvParameters>,
        sk: &SecretKey,
        level: usize,
        config: &RotationConfig,
        seed: Seed,
    ) -> Result<Self> {
        config.validate()?;
        if sk.par != *par {
            return Err(Error::DefaultError(
                "Incompatible BGV parameters".to_string(),
            ));
        }
        if level == 0 || level > par.max_level() {
            return Err(Error::DefaultError(format!("Invalid level {level}")));
        }

        let index = level - 1;
        let gadget = Arc::new(Gadget::new(
            par.log_n(),
            &vec![config.log_gadget_base; level],
            &par.main_prime_modulus_complements(index)?,
            &par.main_prime_modulus_crt_factors(index)?,
            &par.main_prime_moduli()[..level],
        )?);

        let two_n = 2 * par.degree();
        let mut sub_power = config.galois_generator % two_n;
        let mut powers = Vec::with_capacity(par.degree() / 2);
        for shift in 1..par.degree() / 2 {
            powers.push((shift, sub_power));
            sub_power = (sub_power * config.galois_generator) % two_n;
        }
        debug!(level, num_keys = powers.len(), "generating rotation keys");

        let variance = sk.variance();
        let keys = powers
            .into_par_iter()
            .map(|(shift, power)| {
                derive_key_seed(&seed, power)
                    .and_then(|key_seed| {
                        RotationKey::create_for_bgv(
                            sk,
                            power,
                            variance,
                            &gadget,
                            par.plaintext_modulus(),
                            key_seed,
                        )
                    })
                    .map(|key| (shift, PowerAndKey { power, key }))
                    .map_err(|e| Error::KeyGenerationError {
                        power,
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(Self {
            par: par.clone(),
            level,
            gadget,
            keys,
        })
    }

    /// Returns the substitution power and the key for a shift.
    pub fn lookup(&self, shift: usize) -> Result<&PowerAndKey> {
        self.keys
            .get(&shift)
            .ok_or(Error::MissingRotationKey(shift))
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns whether the set holds no key.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the shifts with a key, in increasing order.
    pub fn shifts(&self) -> impl Iterator<Item = usize> + '_ {
        self.keys.keys().copied()
    }

    /// Iterates over the shifts and their keys, in increasing shift order.
    pub fn iter(&self) -> impl Iterator<Item = (&usize, &PowerAndKey)> {
        self.keys.iter()
    }

    /// Returns the gadget shared by all the keys.
    pub fn gadget(&self) -> &Arc<Gadget> {
        &self.gadget
    }

    /// Returns the level of the ciphertexts the keys apply to.
    pub const fn level(&self) -> usize {
        self.level
    }

    /// Returns the parameters of the keys.
    pub fn parameters(&self) -> &Arc<BgvParameters> {
        &self.par
    }
}
