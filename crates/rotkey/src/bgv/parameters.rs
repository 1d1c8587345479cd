//! Create parameters for the BGV encryption scheme

use crate::bgv::keys::GALOIS_GENERATOR;
use crate::proto::bgv::Parameters;
use crate::{Error, ParametersError, Result};
use itertools::Itertools;
use num_bigint::BigUint;
use prost::Message;
use rotkey_math::{
    ntt::NttOperator,
    rq::Context,
    zq::{primes::generate_prime, Modulus},
};
use rotkey_traits::{Deserialize, FheParameters, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

/// Parameters for the BGV encryption scheme.
///
/// A ciphertext at level `l` uses the first `l` moduli, so that the levels
/// range from 1 to the number of moduli.
#[derive(PartialEq, Eq)]
pub struct BgvParameters {
    /// Number of coefficients in a polynomial.
    polynomial_degree: usize,

    /// Modulus of the plaintext.
    plaintext_modulus: u64,

    /// Vector of coprime moduli q_i for the ciphertext.
    pub(crate) moduli: Box<[u64]>,

    /// Vector of the sized of the coprime moduli q_i for the ciphertext.
    moduli_sizes: Box<[usize]>,

    /// Error variance
    pub(crate) variance: usize,

    /// Contexts for the underlying polynomials; `ctx[i]` drops the last `i`
    /// moduli.
    pub ctx: Vec<Arc<Context>>,

    /// Ntt operator for the SIMD plaintext, if possible.
    pub(crate) op: Option<Arc<NttOperator>>,

    /// Plaintext Modulus
    pub(crate) plaintext: Modulus,

    pub(crate) matrix_reps_index_map: Box<[usize]>,
}

impl Debug for BgvParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BgvParameters")
            .field("polynomial_degree", &self.polynomial_degree)
            .field("plaintext_modulus", &self.plaintext_modulus)
            .field("moduli", &self.moduli)
            .field("variance", &self.variance)
            .finish()
    }
}

impl FheParameters for BgvParameters {}

impl BgvParameters {
    /// Returns the underlying polynomial degree
    pub const fn degree(&self) -> usize {
        self.polynomial_degree
    }

    /// Returns the base-2 logarithm of the polynomial degree.
    pub const fn log_n(&self) -> usize {
        self.polynomial_degree.trailing_zeros() as usize
    }

    /// Returns a reference to the ciphertext moduli
    pub fn moduli(&self) -> &[u64] {
        &self.moduli
    }

    /// Returns a reference to the ciphertext moduli sizes
    pub fn moduli_sizes(&self) -> &[usize] {
        &self.moduli_sizes
    }

    /// Returns the plaintext modulus
    pub const fn plaintext(&self) -> u64 {
        self.plaintext_modulus
    }

    /// Returns the plaintext modulus; alias of [`BgvParameters::plaintext`].
    pub const fn plaintext_modulus(&self) -> u64 {
        self.plaintext_modulus
    }

    /// Returns the variance
    pub const fn variance(&self) -> usize {
        self.variance
    }

    /// Returns the ctx
    pub fn ctx(&self) -> &[Arc<Context>] {
        &self.ctx
    }

    /// Returns the number of main prime moduli, which is also the highest
    /// level.
    pub fn num_main_prime_moduli(&self) -> usize {
        self.moduli.len()
    }

    /// Returns the main prime moduli.
    pub fn main_prime_moduli(&self) -> &[u64] {
        &self.moduli
    }

    /// Returns the maximum level allowed by these parameters.
    pub fn max_level(&self) -> usize {
        self.moduli.len()
    }

    /// Returns the context for ciphertexts at `level`, i.e. with `level`
    /// active moduli.
    pub fn ctx_at_level(&self, level: usize) -> Result<&Arc<Context>> {
        if level == 0 || level > self.moduli.len() {
            return Err(Error::DefaultError(format!("No context at level {level}")));
        }
        self.ctx
            .get(self.moduli.len() - level)
            .ok_or_else(|| Error::DefaultError(format!("No context at level {level}")))
    }

    /// Returns the level of a given context
    pub(crate) fn level_of_ctx(&self, ctx: &Arc<Context>) -> Result<usize> {
        let niterations = self.ctx[0].niterations_to(ctx)?;
        Ok(self.moduli.len() - niterations)
    }

    /// Returns the CRT complements `q̂_i = Q / q_i` of the moduli `q_0, ..,
    /// q_index`, where `Q` is their product.
    ///
    /// `index` is the index of the highest active modulus.
    pub fn main_prime_modulus_complements(&self, index: usize) -> Result<Vec<BigUint>> {
        let ctx = self.ctx_at_level(index + 1)?;
        (0..=index)
            .map(|i| {
                ctx.rns
                    .get_q_star(i)
                    .cloned()
                    .ok_or_else(|| Error::DefaultError("Missing CRT complement".to_string()))
            })
            .collect()
    }

    /// Returns the CRT factors `q̂_i^{-1} mod q_i` of the moduli `q_0, ..,
    /// q_index`.
    ///
    /// `index` is the index of the highest active modulus.
    pub fn main_prime_modulus_crt_factors(&self, index: usize) -> Result<Vec<u64>> {
        let ctx = self.ctx_at_level(index + 1)?;
        (0..=index)
            .map(|i| {
                ctx.rns
                    .get_q_tilde(i)
                    .ok_or_else(|| Error::DefaultError("Missing CRT factor".to_string()))
            })
            .collect()
    }

    #[cfg(test)]
    #[allow(missing_docs)]
    pub fn default_arc(num_moduli: usize, degree: usize) -> Arc<Self> {
        if !degree.is_power_of_two() || degree < 8 {
            panic!("Invalid degree");
        }
        BgvParametersBuilder::new()
            .set_degree(degree)
            .set_plaintext_modulus(1153)
            .set_moduli_sizes(&vec![62usize; num_moduli])
            .build_arc()
            .unwrap()
    }
}

/// Builder for parameters for the Bgv encryption scheme.
#[derive(Debug)]
pub struct BgvParametersBuilder {
    degree: usize,
    plaintext: u64,
    variance: usize,
    ciphertext_moduli: Vec<u64>,
    ciphertext_moduli_sizes: Vec<usize>,
}

impl BgvParametersBuilder {
    /// Creates a new instance of the builder
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            degree: Default::default(),
            plaintext: Default::default(),
            variance: 10,
            ciphertext_moduli: Default::default(),
            ciphertext_moduli_sizes: Default::default(),
        }
    }

    /// Sets the polynomial degree. The build fails if the degree is not a
    /// power of two larger or equal to 8.
    pub fn set_degree(&mut self, degree: usize) -> &mut Self {
        self.degree = degree;
        self
    }

    /// Sets the plaintext modulus. The build fails if the plaintext is not
    /// between 2 and 2^62 - 1, or if it is one of the ciphertext moduli.
    pub fn set_plaintext_modulus(&mut self, plaintext: u64) -> &mut Self {
        self.plaintext = plaintext;
        self
    }

    /// Sets the sizes of the ciphertext moduli.
    /// Only one of `set_moduli_sizes` and `set_moduli`
    /// can be specified.
    pub fn set_moduli_sizes(&mut self, sizes: &[usize]) -> &mut Self {
        self.ciphertext_moduli_sizes = sizes.to_owned();
        self
    }

    /// Sets the ciphertext moduli to use.
    /// Only one of `set_moduli_sizes` and `set_moduli`
    /// can be specified.
    pub fn set_moduli(&mut self, moduli: &[u64]) -> &mut Self {
        self.ciphertext_moduli = moduli.to_owned();
        self
    }

    /// Sets the error variance. The build fails if the variance is not
    /// between one and sixteen.
    pub fn set_variance(&mut self, variance: usize) -> &mut Self {
        self.variance = variance;
        self
    }

    /// Generate ciphertext moduli with the specified sizes
    fn generate_moduli(moduli_sizes: &[usize], degree: usize) -> Result<Vec<u64>> {
        let mut moduli = vec![];
        for size in moduli_sizes {
            if *size > 62 || *size < 10 {
                return Err(Error::ParametersError(ParametersError::InvalidModulusSize(
                    *size, 10, 62,
                )));
            }

            let mut upper_bound = 1 << size;
            loop {
                if let Some(prime) = generate_prime(*size, 2 * degree as u64, upper_bound) {
                    if !moduli.contains(&prime) {
                        moduli.push(prime);
                        break;
                    } else {
                        upper_bound = prime;
                    }
                } else {
                    return Err(Error::ParametersError(ParametersError::NotEnoughPrimes(
                        *size, degree,
                    )));
                }
            }
        }

        Ok(moduli)
    }

    /// Build a new `BgvParameters` inside an `Arc`.
    pub fn build_arc(&self) -> Result<Arc<BgvParameters>> {
        self.build().map(Arc::new)
    }

    /// Build a new `BgvParameters`.
    pub fn build(&self) -> Result<BgvParameters> {
        // Check that the degree is a power of 2 (and large enough).
        if self.degree < 8 || !self.degree.is_power_of_two() {
            return Err(Error::ParametersError(ParametersError::InvalidDegree(
                self.degree,
            )));
        }

        if !(1..=16).contains(&self.variance) {
            return Err(Error::ParametersError(ParametersError::InvalidVariance(
                self.variance,
            )));
        }

        let plaintext_modulus = Modulus::new(self.plaintext).map_err(|e| {
            Error::ParametersError(ParametersError::InvalidPlaintext(e.to_string()))
        })?;

        // Check that one of `ciphertext_moduli` and `ciphertext_moduli_sizes` is
        // specified.
        if !self.ciphertext_moduli.is_empty() && !self.ciphertext_moduli_sizes.is_empty() {
            return Err(Error::ParametersError(ParametersError::TooManySpecified(
                "Only one of `ciphertext_moduli` and `ciphertext_moduli_sizes` can be specified"
                    .to_string(),
            )));
        } else if self.ciphertext_moduli.is_empty() && self.ciphertext_moduli_sizes.is_empty() {
            return Err(Error::ParametersError(ParametersError::TooFewSpecified(
                "One of `ciphertext_moduli` and `ciphertext_moduli_sizes` must be specified"
                    .to_string(),
            )));
        }

        // Get or generate the moduli
        let moduli = if self.ciphertext_moduli_sizes.is_empty() {
            self.ciphertext_moduli.clone()
        } else {
            Self::generate_moduli(&self.ciphertext_moduli_sizes, self.degree)?
        };

        if moduli.contains(&self.plaintext) {
            return Err(Error::ParametersError(ParametersError::InvalidPlaintext(
                "The plaintext modulus must differ from the ciphertext moduli".to_string(),
            )));
        }

        // Recomputes the moduli sizes
        let moduli_sizes = moduli
            .iter()
            .map(|m| 64 - m.leading_zeros() as usize)
            .collect_vec();

        let op = NttOperator::new(&plaintext_modulus, self.degree);

        // The context chain holds one context per level, from the full set of
        // moduli down to the first modulus alone.
        let top = Context::new_arc(&moduli, self.degree)?;
        let ctx = (0..moduli.len())
            .map(|i| top.context_at_level(i))
            .collect::<rotkey_math::Result<Vec<_>>>()?;

        // We use the same code as SEAL, with the generator 5 so that the
        // automorphism X -> X^(5^k) rotates both rows of slots by k.
        // https://github.com/microsoft/SEAL/blob/82b07db635132e297282649e2ab5908999089ad2/native/src/seal/batchencoder.cpp
        let row_size = self.degree >> 1;
        let m = self.degree << 1;
        let gen = GALOIS_GENERATOR;
        let mut pos = 1;
        let mut matrix_reps_index_map = vec![0usize; self.degree];
        for i in 0..row_size {
            let index1 = (pos - 1) >> 1;
            let index2 = (m - pos - 1) >> 1;
            matrix_reps_index_map[i] = index1.reverse_bits() >> (self.degree.leading_zeros() + 1);
            matrix_reps_index_map[row_size | i] =
                index2.reverse_bits() >> (self.degree.leading_zeros() + 1);
            pos *= gen;
            pos &= m - 1;
        }

        Ok(BgvParameters {
            polynomial_degree: self.degree,
            plaintext_modulus: self.plaintext,
            moduli: moduli.into_boxed_slice(),
            moduli_sizes: moduli_sizes.into_boxed_slice(),
            variance: self.variance,
            ctx,
            op: op.map(Arc::new),
            plaintext: plaintext_modulus,
            matrix_reps_index_map: matrix_reps_index_map.into_boxed_slice(),
        })
    }
}

impl Serialize for BgvParameters {
    fn to_bytes(&self) -> Vec<u8> {
        Parameters {
            degree: self.polynomial_degree as u32,
            plaintext: self.plaintext_modulus,
            moduli: self.moduli.to_vec(),
            variance: self.variance as u32,
        }
        .encode_to_vec()
    }
}

impl Deserialize for BgvParameters {
    fn try_deserialize(bytes: &[u8]) -> Result<Self> {
        let params: Parameters = Message::decode(bytes).map_err(|_| Error::SerializationError)?;
        BgvParametersBuilder::new()
            .set_degree(params.degree as usize)
            .set_plaintext_modulus(params.plaintext)
            .set_moduli(&params.moduli)
            .set_variance(params.variance as usize)
            .build()
    }
    type Error = Error;
}

#[cfg(test)]
mod tests {
    use super::{BgvParameters, BgvParametersBuilder};
    use crate::{Error, ParametersError};
    use num_bigint::BigUint;
    use rotkey_traits::{Deserialize, Serialize};
    use std::error::Error as StdError;

    #[test]
    fn default() {
        let params = BgvParameters::default_arc(1, 8);
        assert_eq!(params.moduli.len(), 1);
        assert_eq!(params.degree(), 8);
        assert_eq!(params.log_n(), 3);

        let params = BgvParameters::default_arc(2, 16);
        assert_eq!(params.moduli.len(), 2);
        assert_eq!(params.degree(), 16);
        assert_eq!(params.log_n(), 4);
        assert_eq!(params.plaintext_modulus(), 1153);
        assert_eq!(params.variance(), 10);
    }

    #[test]
    fn ciphertext_moduli() -> Result<(), Box<dyn StdError>> {
        let params = BgvParametersBuilder::new()
            .set_degree(8)
            .set_plaintext_modulus(2)
            .set_moduli_sizes(&[62, 62, 62, 61, 60, 11])
            .build()?;
        assert_eq!(
            params.moduli.to_vec(),
            &[
                4611686018427387761,
                4611686018427387617,
                4611686018427387409,
                2305843009213693921,
                1152921504606846577,
                2017
            ]
        );

        let params = BgvParametersBuilder::new()
            .set_degree(8)
            .set_plaintext_modulus(2)
            .set_moduli(&[
                4611686018427387761,
                4611686018427387617,
                4611686018427387409,
                2305843009213693921,
                1152921504606846577,
                2017,
            ])
            .build()?;
        assert_eq!(params.moduli_sizes.to_vec(), &[62, 62, 62, 61, 60, 11]);

        Ok(())
    }

    #[test]
    fn invalid_parameters() {
        assert_eq!(
            BgvParametersBuilder::new()
                .set_degree(12)
                .set_plaintext_modulus(1153)
                .set_moduli_sizes(&[62])
                .build()
                .err(),
            Some(Error::ParametersError(ParametersError::InvalidDegree(12)))
        );
        assert_eq!(
            BgvParametersBuilder::new()
                .set_degree(8)
                .set_plaintext_modulus(1153)
                .set_moduli_sizes(&[63])
                .build()
                .err(),
            Some(Error::ParametersError(ParametersError::InvalidModulusSize(
                63, 10, 62
            )))
        );
        assert_eq!(
            BgvParametersBuilder::new()
                .set_degree(8)
                .set_plaintext_modulus(1153)
                .set_moduli_sizes(&[62])
                .set_variance(17)
                .build()
                .err(),
            Some(Error::ParametersError(ParametersError::InvalidVariance(17)))
        );
        assert!(BgvParametersBuilder::new()
            .set_degree(8)
            .set_plaintext_modulus(1153)
            .build()
            .is_err());
        assert!(BgvParametersBuilder::new()
            .set_degree(8)
            .set_plaintext_modulus(1153)
            .set_moduli(&[4611686018427387761])
            .set_moduli_sizes(&[62])
            .build()
            .is_err());
        assert!(BgvParametersBuilder::new()
            .set_degree(8)
            .set_plaintext_modulus(0)
            .set_moduli_sizes(&[62])
            .build()
            .is_err());
        assert!(BgvParametersBuilder::new()
            .set_degree(8)
            .set_plaintext_modulus(2017)
            .set_moduli(&[2017])
            .build()
            .is_err());
    }

    #[test]
    fn levels() -> Result<(), Box<dyn StdError>> {
        let params = BgvParameters::default_arc(3, 8);
        assert_eq!(params.num_main_prime_moduli(), 3);
        assert_eq!(params.max_level(), 3);
        assert_eq!(params.ctx().len(), 3);
        assert!(params.ctx_at_level(0).is_err());
        assert!(params.ctx_at_level(4).is_err());
        for level in 1..=3 {
            let ctx = params.ctx_at_level(level)?;
            assert_eq!(ctx.moduli(), &params.main_prime_moduli()[..level]);
            assert_eq!(params.level_of_ctx(ctx)?, level);
        }
        Ok(())
    }

    #[test]
    fn crt_factors() -> Result<(), Box<dyn StdError>> {
        let params = BgvParameters::default_arc(3, 8);
        let moduli = params.main_prime_moduli();
        for index in 0..3 {
            let q_hats = params.main_prime_modulus_complements(index)?;
            let q_hat_invs = params.main_prime_modulus_crt_factors(index)?;
            assert_eq!(q_hats.len(), index + 1);
            assert_eq!(q_hat_invs.len(), index + 1);

            let product = moduli[..=index]
                .iter()
                .fold(BigUint::from(1u64), |acc, q| acc * *q);
            for i in 0..=index {
                assert_eq!(&q_hats[i] * moduli[i], product);
                assert_eq!((&q_hats[i] * q_hat_invs[i]) % moduli[i], BigUint::from(1u64));
            }
        }
        assert!(params.main_prime_modulus_complements(3).is_err());
        assert!(params.main_prime_modulus_crt_factors(3).is_err());
        Ok(())
    }

    #[test]
    fn serialize() -> Result<(), Box<dyn StdError>> {
        let params = BgvParametersBuilder::new()
            .set_degree(8)
            .set_plaintext_modulus(2)
            .set_moduli_sizes(&[62, 62, 62, 61, 60, 11])
            .set_variance(4)
            .build()?;
        let bytes = params.to_bytes();
        assert_eq!(BgvParameters::try_deserialize(&bytes)?, params);
        Ok(())
    }
}
