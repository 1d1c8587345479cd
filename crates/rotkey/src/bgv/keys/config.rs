//! Configuration of the rotation key generation.

use crate::{Error, Result};

/// Generator of the Galois group orbit used for slot rotations. The
/// substitution `X -> X^(5^k)` rotates both rows of slots by `k`.
pub const GALOIS_GENERATOR: usize = 5;

/// Base-2 logarithm of the gadget decomposition base.
pub const LOG_GADGET_BASE: usize = 10;

/// Parameters of the rotation key generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationConfig {
    /// Generator of the substitution powers.
    pub galois_generator: usize,
    /// Base-2 logarithm of the gadget base, for every modulus.
    pub log_gadget_base: usize,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            galois_generator: GALOIS_GENERATOR,
            log_gadget_base: LOG_GADGET_BASE,
        }
    }
}

impl RotationConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.galois_generator <= 1 || self.galois_generator & 1 == 0 {
            return Err(Error::UnspecifiedInput(format!(
                "The Galois generator must be an odd integer larger than 1, got {}",
                self.galois_generator
            )));
        }
        if !(1..=30).contains(&self.log_gadget_base) {
            return Err(Error::GadgetError(format!(
                "The gadget base must be 2^k with k between 1 and 30, got k = {}",
                self.log_gadget_base
            )));
        }
        Ok(())
    }
}
