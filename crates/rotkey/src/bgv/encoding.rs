//! Encodings of plaintext values.

use rotkey_traits::FhePlaintextEncoding;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EncodingEnum {
    Poly,
    Simd,
}

impl Display for EncodingEnum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// An encoding for the plaintext.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoding {
    pub(crate) encoding: EncodingEnum,
}

impl Encoding {
    /// A Poly encoding encodes a vector as coefficients of a polynomial;
    /// rotating such a plaintext does not shift the values.
    pub fn poly() -> Self {
        Self {
            encoding: EncodingEnum::Poly,
        }
    }

    /// A Simd encoding packs the values in the `N` slots of the plaintext,
    /// arranged as two rows of `N / 2` slots. Rotations shift each row
    /// cyclically.
    pub fn simd() -> Self {
        Self {
            encoding: EncodingEnum::Simd,
        }
    }
}

impl From<Encoding> for String {
    fn from(e: Encoding) -> Self {
        String::from(&e)
    }
}

impl From<&Encoding> for String {
    fn from(e: &Encoding) -> Self {
        format!("{e:?}")
    }
}

impl Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encoding)
    }
}

impl FhePlaintextEncoding for Encoding {}
