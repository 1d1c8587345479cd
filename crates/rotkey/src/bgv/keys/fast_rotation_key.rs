//! Single rotation key that can be serialized and decoded lazily.

use super::GALOIS_GENERATOR;
use crate::bgv::SecretKey;
use crate::{Error, Result};
use rotkey_math::rq::{Context, Poly, SubstitutionExponent};
use rotkey_traits::{DeserializeWithContext, Serialize};
use std::fmt::Debug;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, error};

enum FastKeyState {
    Encoded(Vec<Vec<u8>>),
    Decoded { keys: Vec<Poly>, ctx: Arc<Context> },
}

/// A rotation key that travels as serialized polynomials.
///
/// The key is either encoded, holding one blob per polynomial, or decoded,
/// holding the polynomials together with the context they were decoded in.
/// [`FastRotationKey::lazy_decode`] moves from the first state to the second
/// at most once.
pub struct FastRotationKey {
    state: RwLock<FastKeyState>,
}

impl Default for FastRotationKey {
    fn default() -> Self {
        Self {
            state: RwLock::new(FastKeyState::Encoded(Vec::new())),
        }
    }
}

impl Clone for FastRotationKey {
    fn clone(&self) -> Self {
        let state = match &*self.read() {
            FastKeyState::Encoded(blobs) => FastKeyState::Encoded(blobs.clone()),
            FastKeyState::Decoded { keys, ctx } => FastKeyState::Decoded {
                keys: keys.clone(),
                ctx: ctx.clone(),
            },
        };
        Self {
            state: RwLock::new(state),
        }
    }
}

impl Debug for FastRotationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastRotationKey")
            .field("decoded", &self.is_decoded())
            .field("len", &self.len())
            .finish()
    }
}

impl FastRotationKey {
    /// Creates a decoded key from polynomials bound to `ctx`.
    pub fn new(keys: Vec<Poly>, ctx: &Arc<Context>) -> Self {
        Self {
            state: RwLock::new(FastKeyState::Decoded {
                keys,
                ctx: ctx.clone(),
            }),
        }
    }

    /// Generate the substituted secret keys `s(X^(5^(2^i)))` for `i` from 0 to
    /// `log2(N / 2) - 1`, in Ntt representation at `level`.
    pub fn generate(sk: &SecretKey, level: usize) -> Result<Self> {
        let par = sk.parameters();
        let ctx = par.ctx_at_level(level)?;
        let s = sk.to_poly(ctx)?;

        let two_n = 2 * par.degree();
        let mut power = GALOIS_GENERATOR % two_n;
        let mut keys = Vec::with_capacity(par.log_n() - 1);
        for _ in 0..par.log_n() - 1 {
            keys.push(s.substitute(&SubstitutionExponent::new(ctx, power)?)?);
            power = (power * power) % two_n;
        }
        debug!(level, num_keys = keys.len(), "generated fast rotation key");
        Ok(Self::new(keys, ctx))
    }

    /// Creates an encoded key from serialized polynomials, without parsing
    /// them.
    pub fn deserialize_shallow(blobs: &[Vec<u8>]) -> Result<Self> {
        let key = Self::default();
        key.load_shallow(blobs)?;
        Ok(key)
    }

    /// Stores serialized polynomials in an empty key, without parsing them.
    ///
    /// Returns an error if `blobs` is empty or if the key already holds
    /// polynomials, serialized or not.
    pub fn load_shallow(&self, blobs: &[Vec<u8>]) -> Result<()> {
        if blobs.is_empty() {
            return Err(Error::UnspecifiedInput(
                "No serialized polynomial to load".to_string(),
            ));
        }
        let mut state = self.write();
        match &*state {
            FastKeyState::Encoded(current) if current.is_empty() => {
                *state = FastKeyState::Encoded(blobs.to_vec());
                Ok(())
            }
            _ => Err(Error::AlreadyDecoded),
        }
    }

    /// Serializes the polynomials of a decoded key, one blob per polynomial.
    ///
    /// A polynomial that is not bound to the context of the key is logged and
    /// ends the serialization, so the output is then shorter than the key.
    /// Serializing an encoded key logs an error and returns no blob.
    pub fn serialize(&self) -> Vec<Vec<u8>> {
        match &*self.read() {
            FastKeyState::Encoded(_) => {
                error!("cannot serialize a fast rotation key that is not decoded");
                Vec::new()
            }
            FastKeyState::Decoded { keys, ctx } => {
                let mut blobs = Vec::with_capacity(keys.len());
                for (i, key) in keys.iter().enumerate() {
                    if key.ctx() != ctx {
                        error!(index = i, "polynomial is not bound to the key context");
                        break;
                    }
                    blobs.push(key.to_bytes());
                }
                blobs
            }
        }
    }

    /// Decodes the serialized polynomials in `ctx`.
    ///
    /// Does nothing if the key is already decoded. Otherwise, the key becomes
    /// decoded only if every polynomial parses; on failure it stays encoded.
    pub fn lazy_decode(&self, ctx: &Arc<Context>) -> Result<()> {
        if self.is_decoded() {
            return Ok(());
        }

        let mut state = self.write();
        let keys = match &*state {
            FastKeyState::Decoded { .. } => return Ok(()),
            FastKeyState::Encoded(blobs) if blobs.is_empty() => return Err(Error::NotDecoded),
            FastKeyState::Encoded(blobs) => blobs
                .iter()
                .map(|blob| Poly::from_bytes(blob, ctx))
                .collect::<rotkey_math::Result<Vec<_>>>()?,
        };
        debug!(num_keys = keys.len(), "decoded fast rotation key");
        *state = FastKeyState::Decoded {
            keys,
            ctx: ctx.clone(),
        };
        Ok(())
    }

    /// Returns whether the key is decoded.
    pub fn is_decoded(&self) -> bool {
        matches!(&*self.read(), FastKeyState::Decoded { .. })
    }

    /// Returns the polynomials of a decoded key.
    pub fn keys(&self) -> Result<Vec<Poly>> {
        match &*self.read() {
            FastKeyState::Decoded { keys, .. } => Ok(keys.clone()),
            FastKeyState::Encoded(_) => Err(Error::NotDecoded),
        }
    }

    /// Returns the number of polynomials, serialized or not.
    pub fn len(&self) -> usize {
        match &*self.read() {
            FastKeyState::Encoded(blobs) => blobs.len(),
            FastKeyState::Decoded { keys, .. } => keys.len(),
        }
    }

    /// Returns whether the key holds no polynomial.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock cannot leave the state half updated, so a
    // poisoned lock is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, FastKeyState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, FastKeyState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}
