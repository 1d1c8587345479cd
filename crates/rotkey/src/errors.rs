use thiserror::Error;

/// The Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Enum encapsulating all the possible errors from this library.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Indicates that an error in the underlying mathematical library was
    /// encountered.
    #[error("{0}")]
    MathError(rotkey_math::Error),

    /// Indicates a serialization error.
    #[error("Serialization error")]
    SerializationError,

    /// Indicates that too many values were provided.
    #[error("Too many values provided: {0} exceeds limit {1}")]
    TooManyValues(usize, usize),

    /// Indicates that too few values were provided.
    #[error("Too few values provided: {0} is below limit {1}")]
    TooFewValues(usize, usize),

    /// Indicates that an input is invalid.
    #[error("{0}")]
    UnspecifiedInput(String),

    /// Indicates a mismatch in the encodings.
    #[error("Encoding mismatch: found {0}, expected {1}")]
    EncodingMismatch(String, String),

    /// Indicates that the encoding is not supported.
    #[error("Does not support {0} encoding")]
    EncodingNotSupported(String),

    /// Indicates a parameter error.
    #[error("{0}")]
    ParametersError(ParametersError),

    /// Indicates that the gadget parameters are inconsistent.
    #[error("Invalid gadget: {0}")]
    GadgetError(String),

    /// Indicates that the rotation key for a substitution power could not be
    /// generated.
    #[error("Failed to generate the rotation key for power {power}: {reason}")]
    KeyGenerationError {
        /// The substitution power of the key.
        power: usize,
        /// The underlying failure.
        reason: String,
    },

    /// Indicates that a rotation was requested on an empty batch.
    #[error("Cannot rotate an empty batch of ciphertexts")]
    EmptyBatch,

    /// Indicates that a shift is outside of the representable range.
    #[error("Shift {shift} is out of bounds: its magnitude must be smaller than {bound}")]
    ShiftOutOfBounds {
        /// The requested shift.
        shift: i64,
        /// The exclusive bound on the magnitude of the shift.
        bound: usize,
    },

    /// Indicates that no rotation key exists for a shift.
    #[error("No rotation key for shift {0}")]
    MissingRotationKey(usize),

    /// Indicates that no rotation key set exists for a level.
    #[error("No rotation key at level {0}")]
    MissingLevel(usize),

    /// Indicates a level mismatch between a ciphertext and a key.
    #[error("Level mismatch: expected {expected}, found {found}")]
    LevelMismatch {
        /// The level expected by the key.
        expected: usize,
        /// The level of the provided ciphertext.
        found: usize,
    },

    /// Indicates that a key variant cannot cross a process boundary.
    #[error("{0} does not support serialization")]
    SerializationNotSupported(&'static str),

    /// Indicates that a key already holds material.
    #[error("The key has already been populated")]
    AlreadyDecoded,

    /// Indicates that a key has not been decoded yet.
    #[error("The key has not been decoded")]
    NotDecoded,

    /// Indicates a default error
    #[error("{0}")]
    DefaultError(String),
}

impl From<rotkey_math::Error> for Error {
    fn from(e: rotkey_math::Error) -> Self {
        Error::MathError(e)
    }
}

/// Separate enum to indicate parameters-related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParametersError {
    /// Indicates that the degree is invalid.
    #[error("Invalid degree: {0} is not a power of 2 larger than 8")]
    InvalidDegree(usize),

    /// Indicates that the moduli sizes are invalid.
    #[error("Invalid modulus size: {0}, expected an integer between {1} and {2}")]
    InvalidModulusSize(usize, usize, usize),

    /// Indicates that there exists not enough primes.
    #[error("Not enough primes of size {0} for polynomials of degree {1}")]
    NotEnoughPrimes(usize, usize),

    /// Indicates that the plaintext is invalid.
    #[error("{0}")]
    InvalidPlaintext(String),

    /// Indicates that the variance is invalid.
    #[error("Invalid variance: {0}, expected an integer between 1 and 16")]
    InvalidVariance(usize),

    /// Indicates that too many parameters were specified.
    #[error("{0}")]
    TooManySpecified(String),

    /// Indicates that too few parameters were specified.
    #[error("{0}")]
    TooFewSpecified(String),
}

#[cfg(test)]
mod tests {
    use crate::{Error, ParametersError};

    #[test]
    fn error_strings() {
        assert_eq!(
            Error::MathError(rotkey_math::Error::InvalidContext).to_string(),
            rotkey_math::Error::InvalidContext.to_string()
        );
        assert_eq!(Error::EmptyBatch.to_string(), "Cannot rotate an empty batch of ciphertexts");
        assert_eq!(
            Error::ShiftOutOfBounds { shift: -4, bound: 4 }.to_string(),
            "Shift -4 is out of bounds: its magnitude must be smaller than 4"
        );
        assert_eq!(Error::MissingRotationKey(3).to_string(), "No rotation key for shift 3");
        assert_eq!(Error::MissingLevel(2).to_string(), "No rotation key at level 2");
        assert_eq!(
            Error::LevelMismatch { expected: 2, found: 1 }.to_string(),
            "Level mismatch: expected 2, found 1"
        );
        assert_eq!(
            Error::SerializationNotSupported("RotationKeys").to_string(),
            "RotationKeys does not support serialization"
        );
        assert_eq!(
            Error::KeyGenerationError {
                power: 5,
                reason: "boom".to_string()
            }
            .to_string(),
            "Failed to generate the rotation key for power 5: boom"
        );
        assert_eq!(
            Error::ParametersError(ParametersError::InvalidDegree(10)).to_string(),
            "Invalid degree: 10 is not a power of 2 larger than 8"
        );
        assert_eq!(
            Error::from(rotkey_math::Error::NoMoreContext),
            Error::MathError(rotkey_math::Error::NoMoreContext)
        );
    }
}
