//! Rotation key sets for several levels.

use super::{seed::Seed, RotationConfig, RotationKeySet};
use crate::bgv::{roll, BgvParameters, Ciphertext, SecretKey};
use crate::{Error, Result};
use rand::{CryptoRng, Rng, RngCore};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One [`RotationKeySet`] per level, so that ciphertexts can be rotated at any
/// generated level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeveledRotationKeys {
    sets: BTreeMap<usize, RotationKeySet>,
}

impl LeveledRotationKeys {
    /// Generate the rotation keys for every level from 1 to the maximum level,
    /// except the levels in `skip_levels`.
    pub fn generate<R: RngCore + CryptoRng>(
        par: &Arc<BgvParameters>,
        sk: &SecretKey,
        skip_levels: &[usize],
        config: &RotationConfig,
        rng: &mut R,
    ) -> Result<Self> {
        let mut sets = BTreeMap::new();
        for level in (1..=par.max_level()).filter(|l| !skip_levels.contains(l)) {
            let mut seed = Seed::default();
            rng.fill(&mut seed);
            sets.insert(
                level,
                RotationKeySet::generate_at_level(par, sk, level, config, seed)?,
            );
        }
        Ok(Self { sets })
    }

    /// Returns the key set for `level`.
    pub fn get(&self, level: usize) -> Result<&RotationKeySet> {
        self.sets.get(&level).ok_or(Error::MissingLevel(level))
    }

    /// Returns the generated levels, in increasing order.
    pub fn levels(&self) -> impl Iterator<Item = usize> + '_ {
        self.sets.keys().copied()
    }

    /// Rotates a batch of ciphertexts with the key set matching their level.
    pub fn roll(&self, batch: &[Ciphertext], shift: i64) -> Result<Vec<Ciphertext>> {
        let first = batch.first().ok_or(Error::EmptyBatch)?;
        roll(self.get(first.level())?, batch, shift)
    }
}
