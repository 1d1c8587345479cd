#![crate_name = "rotkey"]
#![crate_type = "lib"]
#![warn(missing_docs, unused_imports)]

//! Galois slot rotation for RNS BGV ciphertexts.
//!
//! The [`bgv`] module provides a minimal BGV encryption scheme whose
//! plaintexts pack `N` slots, arranged as two rows of `N / 2` slots, together
//! with the rotation keys that cyclically shift each row without decryption.
//!
//! ```
//! use rotkey::bgv::{self, keys::RotationKeySet, BgvParametersBuilder, Encoding, Plaintext, SecretKey};
//! use rotkey_traits::{FheDecoder, FheDecrypter, FheEncoder, FheEncrypter};
//! use rand::thread_rng;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut rng = thread_rng();
//! let par = BgvParametersBuilder::new()
//!     .set_degree(16)
//!     .set_plaintext_modulus(1153)
//!     .set_moduli_sizes(&[62, 62])
//!     .build_arc()?;
//! let sk = SecretKey::random(&par, &mut rng)?;
//! let keys = RotationKeySet::generate(&par, &sk, &mut rng)?;
//!
//! let values = (0..16u64).collect::<Vec<_>>();
//! let pt = Plaintext::try_encode(&values[..], Encoding::simd(), &par)?;
//! let ct = sk.try_encrypt(&pt, &mut rng)?;
//!
//! let rotated = bgv::roll(&keys, &[ct], 1)?;
//! let decrypted = sk.try_decrypt(&rotated[0])?;
//! let slots = Vec::<u64>::try_decode(&decrypted, Encoding::simd())?;
//! assert_eq!(&slots[..8], &[7, 0, 1, 2, 3, 4, 5, 6]);
//! assert_eq!(&slots[8..], &[15, 8, 9, 10, 11, 12, 13, 14]);
//! # Ok(())
//! # }
//! ```

mod errors;

pub mod bgv;
pub mod proto;

pub use errors::{Error, ParametersError, Result};
