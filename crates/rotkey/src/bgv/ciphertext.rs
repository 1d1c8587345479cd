//! Ciphertext type in the BGV encryption scheme.

use crate::bgv::{parameters::BgvParameters, traits::TryConvertFrom};
use crate::proto::bgv::Ciphertext as CiphertextProto;
use crate::{Error, Result};
use prost::Message;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rotkey_math::rq::{Poly, Representation, SubstitutionExponent};
use rotkey_traits::{
    DeserializeParametrized, DeserializeWithContext, FheCiphertext, FheParametrized, Serialize,
};
use std::sync::Arc;

/// A ciphertext encrypting a plaintext.
///
/// A fresh ciphertext `(c0, c1)` satisfies `c0 + c1 * s = m + t * e` modulo the
/// product of its active moduli.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext {
    /// The parameters of the underlying BGV encryption scheme.
    pub(crate) par: Arc<BgvParameters>,

    /// The seed that generated the polynomial c1 in a fresh ciphertext.
    pub(crate) seed: Option<<ChaCha8Rng as SeedableRng>::Seed>,

    /// The ciphertext elements.
    pub c: Vec<Poly>,

    /// The ciphertext level, i.e. its number of active moduli.
    pub level: usize,
}

impl Ciphertext {
    /// Create a ciphertext from a vector of polynomials.
    /// A ciphertext must contain at least two polynomials, and all polynomials
    /// must be in Ntt representation and with the same context.
    pub fn new(c: Vec<Poly>, par: &Arc<BgvParameters>) -> Result<Self> {
        if c.len() < 2 {
            return Err(Error::TooFewValues(c.len(), 2));
        }

        let ctx = c[0].ctx();
        let level = par.level_of_ctx(ctx)?;

        // Check that all polynomials have the expected representation and context.
        for ci in c.iter() {
            if ci.representation() != &Representation::Ntt {
                return Err(Error::MathError(
                    rotkey_math::Error::IncorrectRepresentation(
                        *ci.representation(),
                        Representation::Ntt,
                    ),
                ));
            }
            if ci.ctx() != ctx {
                return Err(Error::MathError(rotkey_math::Error::InvalidContext));
            }
        }

        Ok(Self {
            par: par.clone(),
            seed: None,
            c,
            level,
        })
    }

    /// Get the i-th polynomial of the ciphertext.
    pub fn get(&self, i: usize) -> Option<&Poly> {
        self.c.get(i)
    }

    /// Returns the level of the ciphertext.
    pub const fn level(&self) -> usize {
        self.level
    }

    /// Returns the base-2 logarithm of the ring degree, so that the ciphertext
    /// packs `2^log_n` slots.
    pub fn log_n(&self) -> usize {
        self.par.log_n()
    }

    /// Returns the parameters of the ciphertext.
    pub fn parameters(&self) -> &Arc<BgvParameters> {
        &self.par
    }

    /// Applies the automorphism `X -> X^power` to every component of the
    /// ciphertext.
    ///
    /// The result decrypts under the substituted secret key `s(X^power)`.
    /// Returns an error if `power` is even, or if the ciphertext is empty.
    pub fn substitute(&self, power: usize) -> Result<Ciphertext> {
        let first = match self.c.first() {
            Some(c0) if self.level > 0 => c0,
            _ => {
                return Err(Error::UnspecifiedInput(
                    "Cannot substitute an empty ciphertext".to_string(),
                ))
            }
        };
        let exponent = SubstitutionExponent::new(first.ctx(), power)?;
        let c = self
            .c
            .iter()
            .map(|ci| ci.substitute(&exponent))
            .collect::<rotkey_math::Result<Vec<_>>>()?;
        Ok(Self {
            par: self.par.clone(),
            seed: None,
            c,
            level: self.level,
        })
    }
}

impl FheCiphertext for Ciphertext {}

impl FheParametrized for Ciphertext {
    type Parameters = BgvParameters;
}

impl Serialize for Ciphertext {
    fn to_bytes(&self) -> Vec<u8> {
        CiphertextProto::from(self).encode_to_vec()
    }
}

impl DeserializeParametrized for Ciphertext {
    fn from_bytes(bytes: &[u8], par: &Arc<BgvParameters>) -> Result<Self> {
        if let Ok(ctp) = Message::decode(bytes) {
            Ciphertext::try_convert_from(&ctp, par)
        } else {
            Err(Error::SerializationError)
        }
    }

    type Error = Error;
}

/// Conversions from and to protobuf.
impl From<&Ciphertext> for CiphertextProto {
    fn from(ct: &Ciphertext) -> Self {
        let mut proto = CiphertextProto::default();
        if let Some((last, rest)) = ct.c.split_last() {
            proto.c.extend(rest.iter().map(|ci| ci.to_bytes()));
            if let Some(seed) = ct.seed {
                proto.seed = seed.to_vec()
            } else {
                proto.c.push(last.to_bytes())
            }
        }
        proto.level = ct.level as u32;
        proto
    }
}

impl TryConvertFrom<&CiphertextProto> for Ciphertext {
    fn try_convert_from(value: &CiphertextProto, par: &Arc<BgvParameters>) -> Result<Self> {
        if value.c.is_empty() || (value.c.len() == 1 && value.seed.is_empty()) {
            return Err(Error::DefaultError("Not enough polynomials".to_string()));
        }

        let level = value.level as usize;
        if level == 0 || level > par.max_level() {
            return Err(Error::DefaultError("Invalid level".to_string()));
        }

        let ctx = par.ctx_at_level(level)?;

        let mut c = Vec::with_capacity(value.c.len() + 1);
        for cip in &value.c {
            c.push(Poly::from_bytes(cip, ctx)?)
        }

        let mut seed = None;
        if !value.seed.is_empty() {
            let try_seed = <ChaCha8Rng as SeedableRng>::Seed::try_from(value.seed.clone())
                .map_err(|_| {
                    Error::MathError(rotkey_math::Error::InvalidSeedSize(
                        value.seed.len(),
                        <ChaCha8Rng as SeedableRng>::Seed::default().len(),
                    ))
                })?;
            seed = Some(try_seed);
            c.push(Poly::random_from_seed(ctx, Representation::Ntt, try_seed))
        }

        if c.iter().any(|ci| ci.representation() != &Representation::Ntt) {
            return Err(Error::SerializationError);
        }

        Ok(Ciphertext {
            par: par.clone(),
            seed,
            c,
            level,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::bgv::{
        traits::TryConvertFrom, BgvParameters, Ciphertext, Encoding, Plaintext, SecretKey,
    };
    use crate::proto::bgv::Ciphertext as CiphertextProto;
    use rand::thread_rng;
    use rotkey_math::rq::{Poly, Representation};
    use rotkey_traits::{
        DeserializeParametrized, FheDecoder, FheDecrypter, FheEncoder, FheEncrypter, Serialize,
    };
    use std::error::Error;

    #[test]
    fn proto_conversion() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        for params in [
            BgvParameters::default_arc(1, 8),
            BgvParameters::default_arc(3, 8),
        ] {
            let sk = SecretKey::random(&params, &mut rng)?;
            let v = params.plaintext.random_vec(params.degree(), &mut rng);
            let pt = Plaintext::try_encode(&v[..], Encoding::poly(), &params)?;
            let ct: Ciphertext = sk.try_encrypt(&pt, &mut rng)?;
            let ct_proto = CiphertextProto::from(&ct);
            assert!(!ct_proto.seed.is_empty());
            assert_eq!(ct_proto.c.len(), 1);
            assert_eq!(ct, Ciphertext::try_convert_from(&ct_proto, &params)?);

            // Substituted ciphertexts lose their seed.
            let ct = ct.substitute(3)?;
            let ct_proto = CiphertextProto::from(&ct);
            assert!(ct_proto.seed.is_empty());
            assert_eq!(ct_proto.c.len(), 2);
            assert_eq!(ct, Ciphertext::try_convert_from(&ct_proto, &params)?)
        }
        Ok(())
    }

    #[test]
    fn serialize() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        for params in [
            BgvParameters::default_arc(1, 8),
            BgvParameters::default_arc(3, 8),
        ] {
            let sk = SecretKey::random(&params, &mut rng)?;
            let v = params.plaintext.random_vec(params.degree(), &mut rng);
            let pt = Plaintext::try_encode(&v[..], Encoding::simd(), &params)?;
            let ct: Ciphertext = sk.try_encrypt(&pt, &mut rng)?;
            let ct_bytes = ct.to_bytes();
            assert_eq!(ct, Ciphertext::from_bytes(&ct_bytes, &params)?);

            let ct = sk.try_encrypt_at_level(&pt, 1, &mut rng)?;
            let ct_bytes = ct.to_bytes();
            assert_eq!(ct, Ciphertext::from_bytes(&ct_bytes, &params)?);
        }

        let params = BgvParameters::default_arc(2, 8);
        assert!(Ciphertext::from_bytes(&[1, 2, 3], &params).is_err());
        Ok(())
    }

    #[test]
    fn new() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        let params = BgvParameters::default_arc(2, 16);
        let sk = SecretKey::random(&params, &mut rng)?;
        let v = params.plaintext.random_vec(params.degree(), &mut rng);
        let pt = Plaintext::try_encode(&v[..], Encoding::simd(), &params)?;
        let ct: Ciphertext = sk.try_encrypt(&pt, &mut rng)?;
        assert_eq!(ct.level(), 2);
        assert_eq!(ct.log_n(), 4);

        let ct2 = Ciphertext::new(ct.c.clone(), &params)?;
        assert_eq!(ct2.c, ct.c);
        assert_eq!(ct2.level(), 2);
        let pt2 = sk.try_decrypt(&ct2)?;
        assert_eq!(Vec::<u64>::try_decode(&pt2, Encoding::simd())?, v);

        assert!(Ciphertext::new(vec![ct.c[0].clone()], &params).is_err());

        let mut c1 = ct.c[1].clone();
        c1.change_representation(Representation::PowerBasis);
        assert!(Ciphertext::new(vec![ct.c[0].clone(), c1], &params).is_err());

        let ctx = params.ctx_at_level(1)?;
        let other = Poly::random(ctx, Representation::Ntt, &mut rng);
        assert!(Ciphertext::new(vec![ct.c[0].clone(), other], &params).is_err());
        Ok(())
    }

    #[test]
    fn substitute() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        let params = BgvParameters::default_arc(2, 16);
        let sk = SecretKey::random(&params, &mut rng)?;
        let v = params.plaintext.random_vec(params.degree(), &mut rng);
        let pt = Plaintext::try_encode(&v[..], Encoding::simd(), &params)?;
        let ct: Ciphertext = sk.try_encrypt(&pt, &mut rng)?;

        assert!(ct.substitute(2).is_err());
        assert!(ct.substitute(32).is_err());

        let substituted = ct.substitute(5)?;
        assert_eq!(substituted.level(), ct.level());
        assert_ne!(substituted, ct);

        // (X^5)^13 = X^65 = X modulo X^16 + 1, so the composition is the
        // identity up to the seed.
        let back = substituted.substitute(13)?;
        assert_eq!(back.c, ct.c);
        Ok(())
    }
}
