//! Secret keys and rotation keys for the BGV encryption scheme

mod config;
mod fast_rotation_key;
mod gadget;
mod leveled;
mod rotation_key;
mod rotation_key_set;
mod secret_key;
mod seed;
mod variant;

pub use config::{RotationConfig, GALOIS_GENERATOR, LOG_GADGET_BASE};
pub use fast_rotation_key::FastRotationKey;
pub use gadget::Gadget;
pub use leveled::LeveledRotationKeys;
pub use rotation_key::RotationKey;
pub use rotation_key_set::{PowerAndKey, RotationKeySet};
pub use secret_key::SecretKey;
pub use seed::Seed;
pub use variant::KeyVariant;
