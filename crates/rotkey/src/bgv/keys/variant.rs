use super::{FastRotationKey, PowerAndKey, RotationKeySet};
use crate::{Error, Result};

/// The kinds of rotation key material a party may hold.
#[derive(Debug, Clone)]
pub enum KeyVariant {
    /// A full set of rotation keys, indexed by shift.
    RotationKeys(RotationKeySet),
    /// A single rotation key with its substitution power.
    SingleRotationKey(PowerAndKey),
    /// A fast rotation key, which may travel in serialized form.
    FastRotationKey(FastRotationKey),
}

impl KeyVariant {
    /// Returns the name of the variant.
    pub const fn type_name(&self) -> &'static str {
        match self {
            KeyVariant::RotationKeys(_) => "RotationKeys",
            KeyVariant::SingleRotationKey(_) => "SingleRotationKey",
            KeyVariant::FastRotationKey(_) => "FastRotationKey",
        }
    }

    /// Serializes the key material, one blob per polynomial.
    ///
    /// Only fast rotation keys can be serialized.
    pub fn encode(&self) -> Result<Vec<Vec<u8>>> {
        match self {
            KeyVariant::FastRotationKey(key) => Ok(key.serialize()),
            _ => Err(Error::SerializationNotSupported(self.type_name())),
        }
    }

    /// Loads serialized key material into an empty fast rotation key. The
    /// polynomials are only parsed by [`FastRotationKey::lazy_decode`].
    pub fn decode(&mut self, blobs: &[Vec<u8>]) -> Result<()> {
        match self {
            KeyVariant::FastRotationKey(key) => key.load_shallow(blobs),
            _ => Err(Error::SerializationNotSupported(self.type_name())),
        }
    }

    /// Returns a short human readable description of the key material.
    pub fn debug_string(&self) -> String {
        match self {
            KeyVariant::RotationKeys(keys) => format!(
                "RotationKeys(level={}, keys={})",
                keys.level(),
                keys.len()
            ),
            KeyVariant::SingleRotationKey(pk) => format!(
                "SingleRotationKey(power={}, level={})",
                pk.power,
                pk.key.level()
            ),
            KeyVariant::FastRotationKey(key) => format!(
                "FastRotationKey(decoded={}, len={})",
                key.is_decoded(),
                key.len()
            ),
        }
    }
}

impl From<RotationKeySet> for KeyVariant {
    fn from(keys: RotationKeySet) -> Self {
        KeyVariant::RotationKeys(keys)
    }
}

impl From<PowerAndKey> for KeyVariant {
    fn from(pk: PowerAndKey) -> Self {
        KeyVariant::SingleRotationKey(pk)
    }
}

impl From<FastRotationKey> for KeyVariant {
    fn from(key: FastRotationKey) -> Self {
        KeyVariant::FastRotationKey(key)
    }
}
