//! Plaintext type in the BGV encryption scheme.

use crate::bgv::{encoding::EncodingEnum, BgvParameters, Encoding};
use crate::{Error, Result};
use rotkey_math::rq::{traits::TryConvertFrom, Context, Poly, Representation};
use rotkey_traits::{FheDecoder, FheEncoder, FheParametrized, FhePlaintext};
use std::sync::Arc;
use zeroize::{Zeroize, Zeroizing};

/// A plaintext object, that encodes a vector according to a specific encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plaintext {
    /// The parameters of the underlying BGV encryption scheme.
    pub(crate) par: Arc<BgvParameters>,
    /// The value after encoding, as coefficients modulo the plaintext modulus.
    pub(crate) value: Box<[u64]>,
    /// The encoding of the plaintext, if known
    pub(crate) encoding: Option<Encoding>,
}

impl FheParametrized for Plaintext {
    type Parameters = BgvParameters;
}

impl FhePlaintext for Plaintext {
    type Encoding = Encoding;
}

impl Plaintext {
    /// Returns the polynomial encoding the plaintext in `ctx`, in Ntt
    /// representation.
    pub(crate) fn to_poly(&self, ctx: &Arc<Context>) -> Result<Poly> {
        let mut m = Poly::try_convert_from(&self.value[..], ctx, Representation::PowerBasis)?;
        m.change_representation(Representation::Ntt);
        Ok(m)
    }

    /// Returns the encoding of the plaintext, if known.
    pub fn encoding(&self) -> Option<Encoding> {
        self.encoding
    }
}

impl Zeroize for Plaintext {
    fn zeroize(&mut self) {
        self.value.zeroize();
    }
}

impl FheEncoder<&[u64]> for Plaintext {
    type Error = Error;
    fn try_encode(value: &[u64], encoding: Encoding, par: &Arc<BgvParameters>) -> Result<Self> {
        if value.len() > par.degree() {
            return Err(Error::TooManyValues(value.len(), par.degree()));
        }
        let mut v = vec![0u64; par.degree()];

        match encoding.encoding {
            EncodingEnum::Poly => v[..value.len()].copy_from_slice(value),
            EncodingEnum::Simd => {
                let op = par
                    .op
                    .as_ref()
                    .ok_or_else(|| Error::EncodingNotSupported(EncodingEnum::Simd.to_string()))?;
                for (i, vi) in value.iter().enumerate() {
                    v[par.matrix_reps_index_map[i]] = *vi;
                }
                par.plaintext.reduce_vec(&mut v);
                op.backward(&mut v);
            }
        }
        par.plaintext.reduce_vec(&mut v);

        Ok(Self {
            par: par.clone(),
            value: v.into_boxed_slice(),
            encoding: Some(encoding),
        })
    }
}

impl FheEncoder<&[i64]> for Plaintext {
    type Error = Error;
    fn try_encode(value: &[i64], encoding: Encoding, par: &Arc<BgvParameters>) -> Result<Self> {
        let w = Zeroizing::new(par.plaintext.reduce_vec_i64(value));
        Plaintext::try_encode(&w[..], encoding, par)
    }
}

impl FheDecoder<Plaintext> for Vec<u64> {
    type Error = Error;
    fn try_decode<O>(pt: &Plaintext, encoding: O) -> Result<Vec<u64>>
    where
        O: Into<Option<Encoding>>,
    {
        let enc = match (pt.encoding, encoding.into()) {
            (None, None) => {
                return Err(Error::UnspecifiedInput("No encoding specified".to_string()))
            }
            (Some(pt_enc), Some(arg_enc)) if pt_enc != arg_enc => {
                return Err(Error::EncodingMismatch(arg_enc.into(), pt_enc.into()))
            }
            (Some(enc), _) | (None, Some(enc)) => enc,
        };

        let mut w = pt.value.to_vec();
        match enc.encoding {
            EncodingEnum::Poly => Ok(w),
            EncodingEnum::Simd => {
                let op = pt
                    .par
                    .op
                    .as_ref()
                    .ok_or_else(|| Error::EncodingNotSupported(EncodingEnum::Simd.to_string()))?;
                op.forward(&mut w);
                let mut w_reordered = w.clone();
                for i in 0..pt.par.degree() {
                    w_reordered[i] = w[pt.par.matrix_reps_index_map[i]]
                }
                w.zeroize();
                Ok(w_reordered)
            }
        }
    }
}

impl FheDecoder<Plaintext> for Vec<i64> {
    type Error = Error;
    fn try_decode<E>(pt: &Plaintext, encoding: E) -> Result<Vec<i64>>
    where
        E: Into<Option<Encoding>>,
    {
        let v = Vec::<u64>::try_decode(pt, encoding)?;
        Ok(v.iter().map(|vi| pt.par.plaintext.center(*vi)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{Encoding, Plaintext};
    use crate::bgv::{BgvParameters, BgvParametersBuilder};
    use rand::thread_rng;
    use rotkey_math::rq::{
        traits::TryConvertFrom, Context, Poly, Representation, SubstitutionExponent,
    };
    use rotkey_traits::{FheDecoder, FheEncoder};
    use std::{error::Error, sync::Arc};

    #[test]
    fn try_encode() -> Result<(), Box<dyn Error>> {
        // The default test parameters support both Poly and Simd encodings
        let params = BgvParameters::default_arc(1, 8);
        let a = params.plaintext.random_vec(params.degree(), &mut thread_rng());

        let plaintext = Plaintext::try_encode(&[0u64; 9][..], Encoding::poly(), &params);
        assert!(plaintext.is_err());

        let plaintext = Plaintext::try_encode(&a[..], Encoding::poly(), &params);
        assert!(plaintext.is_ok());

        let plaintext = Plaintext::try_encode(&a[..], Encoding::simd(), &params);
        assert!(plaintext.is_ok());

        let plaintext = Plaintext::try_encode(&[1u64][..], Encoding::poly(), &params);
        assert!(plaintext.is_ok());

        // The following parameters do not allow for Simd encoding
        let params = BgvParametersBuilder::new()
            .set_degree(8)
            .set_plaintext_modulus(2)
            .set_moduli_sizes(&[62])
            .build_arc()?;

        let a = params.plaintext.random_vec(params.degree(), &mut thread_rng());

        let plaintext = Plaintext::try_encode(&a[..], Encoding::poly(), &params);
        assert!(plaintext.is_ok());

        let plaintext = Plaintext::try_encode(&a[..], Encoding::simd(), &params);
        assert!(plaintext.is_err());

        Ok(())
    }

    #[test]
    fn encode_decode() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        for _ in 0..20 {
            let params = BgvParameters::default_arc(1, 16);
            let a = params.plaintext.random_vec(params.degree(), &mut rng);

            let plaintext = Plaintext::try_encode(&a[..], Encoding::simd(), &params)?;
            let b = Vec::<u64>::try_decode(&plaintext, Encoding::simd())?;
            assert_eq!(b, a);

            let plaintext = Plaintext::try_encode(&a[..], Encoding::poly(), &params)?;
            let b = Vec::<u64>::try_decode(&plaintext, Encoding::poly())?;
            assert_eq!(b, a);
            assert!(Vec::<u64>::try_decode(&plaintext, Encoding::simd()).is_err());

            let a = params.plaintext.random_vec(params.degree(), &mut rng);
            let a = a
                .iter()
                .map(|ai| params.plaintext.center(*ai))
                .collect::<Vec<_>>();
            let plaintext = Plaintext::try_encode(&a[..], Encoding::simd(), &params)?;
            let b = Vec::<i64>::try_decode(&plaintext, Encoding::simd())?;
            assert_eq!(b, a);
        }
        Ok(())
    }

    #[test]
    fn simd_substitution_rotates_rows() -> Result<(), Box<dyn Error>> {
        let params = BgvParametersBuilder::new()
            .set_degree(16)
            .set_plaintext_modulus(1153)
            .set_moduli(&[4611686018326724609])
            .build_arc()?;
        let values = (0..16u64).collect::<Vec<_>>();
        let pt = Plaintext::try_encode(&values[..], Encoding::simd(), &params)?;

        // Substitute X -> X^5 on the plaintext polynomial modulo t.
        let ctx = Arc::new(Context::new(&[1153], 16)?);
        let p = Poly::try_convert_from(&pt.value[..], &ctx, Representation::PowerBasis)?;
        let q = p.substitute(&SubstitutionExponent::new(&ctx, 5)?)?;
        let coeffs = q.coefficients().row(0).to_vec();
        let substituted = Plaintext {
            par: params.clone(),
            value: coeffs.into_boxed_slice(),
            encoding: None,
        };
        let slots = Vec::<u64>::try_decode(&substituted, Encoding::simd())?;
        assert_eq!(&slots[..8], &[1, 2, 3, 4, 5, 6, 7, 0]);
        assert_eq!(&slots[8..], &[9, 10, 11, 12, 13, 14, 15, 8]);
        Ok(())
    }
}
