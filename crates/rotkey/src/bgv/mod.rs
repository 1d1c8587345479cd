#![warn(missing_docs, unused_imports)]

//! The BGV encryption scheme with Galois slot rotations.

mod ciphertext;
mod encoding;
mod parameters;
mod plaintext;
mod roll;

pub mod keys;
pub mod traits;

pub use ciphertext::Ciphertext;
pub use encoding::Encoding;
pub use keys::SecretKey;
pub use parameters::{BgvParameters, BgvParametersBuilder};
pub use plaintext::Plaintext;
pub use roll::{roll, roll_array};
