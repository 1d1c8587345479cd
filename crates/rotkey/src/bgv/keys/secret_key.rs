//! Secret keys for the BGV encryption scheme

use crate::bgv::{BgvParameters, Ciphertext, Plaintext};
use crate::{Error, Result};
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use rand::{CryptoRng, Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rotkey_math::rq::{traits::TryConvertFrom, Context, Poly, Representation};
use rotkey_traits::{FheDecrypter, FheEncrypter, FheParametrized};
use rotkey_util::sample_vec_cbd;
use std::sync::Arc;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Secret key for the BGV encryption scheme.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SecretKey {
    /// The BGV parameters
    pub(crate) par: Arc<BgvParameters>,
    /// The secret key coefficients
    pub coeffs: Box<[i64]>,
}

impl Zeroize for SecretKey {
    fn zeroize(&mut self) {
        self.coeffs.zeroize();
    }
}

impl ZeroizeOnDrop for SecretKey {}

impl SecretKey {
    /// The variance used for secret key sampling
    pub const SK_VARIANCE: usize = 1;

    /// Generate a random [`SecretKey`].
    pub fn random<R: RngCore + CryptoRng>(par: &Arc<BgvParameters>, rng: &mut R) -> Result<Self> {
        let s_coefficients = sample_vec_cbd(par.degree(), Self::SK_VARIANCE, rng)
            .map_err(|e| Error::DefaultError(e.to_string()))?;
        Ok(Self::new(s_coefficients, par))
    }

    /// Generate a [`SecretKey`] from its coefficients.
    pub fn new(coeffs: Vec<i64>, par: &Arc<BgvParameters>) -> Self {
        Self {
            par: par.clone(),
            coeffs: coeffs.into_boxed_slice(),
        }
    }

    /// Returns the variance of the error terms sampled with this key, for
    /// encryption and for key generation.
    pub fn variance(&self) -> usize {
        self.par.variance
    }

    /// Returns the parameters of this key.
    pub fn parameters(&self) -> &Arc<BgvParameters> {
        &self.par
    }

    /// The secret key as a polynomial in `ctx`, in Ntt representation.
    pub(crate) fn to_poly(&self, ctx: &Arc<Context>) -> Result<Zeroizing<Poly>> {
        let mut s = Zeroizing::new(Poly::try_convert_from(
            &self.coeffs[..],
            ctx,
            Representation::PowerBasis,
        )?);
        s.change_representation(Representation::Ntt);
        Ok(s)
    }

    /// Measure the noise in a [`Ciphertext`], as the number of bits of the
    /// largest centered coefficient of `c0 + c1 * s - m`.
    pub fn measure_noise(&self, ct: &Ciphertext) -> Result<usize> {
        let plaintext = Zeroizing::new(self.try_decrypt(ct)?);
        let ctx = ct.c[0].ctx();
        let m = Zeroizing::new(plaintext.to_poly(ctx)?);

        let mut c = Zeroizing::new(self.phase(ct)?);
        *c -= &*m;
        c.change_representation(Representation::PowerBasis);

        let ciphertext_modulus = ctx.modulus();
        let mut noise = 0usize;
        for coeff in c.lift()? {
            noise = std::cmp::max(
                noise,
                std::cmp::min(coeff.bits(), (ciphertext_modulus - &coeff).bits()) as usize,
            )
        }

        Ok(noise)
    }

    /// Computes `c0 + c1 * s + c2 * s^2 + ...` in Ntt representation.
    fn phase(&self, ct: &Ciphertext) -> Result<Poly> {
        let ctx = ct.c[0].ctx();
        let s = self.to_poly(ctx)?;
        let mut si = s.clone();

        let mut c = ct.c[0].clone();
        for ci in ct.c.iter().skip(1) {
            let cis = Zeroizing::new(ci * &*si);
            c += &*cis;
            *si *= &*s;
        }
        Ok(c)
    }

    /// Encrypt a polynomial in Ntt representation, drawing the uniform
    /// polynomial `c1` from `seed`.
    pub(crate) fn encrypt_poly_with_seed<R: RngCore + CryptoRng>(
        &self,
        m: &Poly,
        seed: <ChaCha8Rng as SeedableRng>::Seed,
        rng: &mut R,
    ) -> Result<Ciphertext> {
        if m.representation() != &Representation::Ntt {
            return Err(Error::MathError(
                rotkey_math::Error::IncorrectRepresentation(
                    *m.representation(),
                    Representation::Ntt,
                ),
            ));
        }

        let level = self.par.level_of_ctx(m.ctx())?;
        let s = self.to_poly(m.ctx())?;

        let a = Poly::random_from_seed(m.ctx(), Representation::Ntt, seed);
        let a_s = Zeroizing::new(&a * &*s);

        let mut b = Poly::small(m.ctx(), Representation::Ntt, self.par.variance, rng)?;
        b.scalar_mul(self.par.plaintext());
        b -= &*a_s;
        b += m;

        Ok(Ciphertext {
            par: self.par.clone(),
            seed: Some(seed),
            c: vec![b, a],
            level,
        })
    }

    /// Encrypt a plaintext at a given level, i.e. using only the first `level`
    /// moduli.
    pub fn try_encrypt_at_level<R: RngCore + CryptoRng>(
        &self,
        pt: &Plaintext,
        level: usize,
        rng: &mut R,
    ) -> Result<Ciphertext> {
        if self.par != pt.par {
            return Err(Error::DefaultError(
                "Incompatible BGV parameters".to_string(),
            ));
        }
        let ctx = self.par.ctx_at_level(level)?;
        let m = Zeroizing::new(pt.to_poly(ctx)?);

        let mut seed = <ChaCha8Rng as SeedableRng>::Seed::default();
        rng.fill(&mut seed);
        self.encrypt_poly_with_seed(&m, seed, rng)
    }
}

impl FheParametrized for SecretKey {
    type Parameters = BgvParameters;
}

impl FheEncrypter<Plaintext, Ciphertext> for SecretKey {
    type Error = Error;

    fn try_encrypt<R: RngCore + CryptoRng>(
        &self,
        pt: &Plaintext,
        rng: &mut R,
    ) -> Result<Ciphertext> {
        self.try_encrypt_at_level(pt, self.par.max_level(), rng)
    }
}

impl FheDecrypter<Plaintext, Ciphertext> for SecretKey {
    type Error = Error;

    fn try_decrypt(&self, ct: &Ciphertext) -> Result<Plaintext> {
        if self.par != ct.par {
            return Err(Error::DefaultError(
                "Incompatible BGV parameters".to_string(),
            ));
        }
        if ct.c.len() < 2 {
            return Err(Error::TooFewValues(ct.c.len(), 2));
        }

        let mut c = Zeroizing::new(self.phase(ct)?);
        c.change_representation(Representation::PowerBasis);

        // Center the coefficients modulo q before reducing them modulo t.
        let q = c.ctx().modulus().clone();
        let half_q: BigUint = &q >> 1;
        let t = BigUint::from(self.par.plaintext());
        let q_mod_t = &q % &t;
        let value = c
            .lift()?
            .into_iter()
            .map(|x| {
                let r = if x > half_q {
                    (&t + &x % &t - &q_mod_t) % &t
                } else {
                    &x % &t
                };
                r.to_u64()
                    .ok_or_else(|| Error::DefaultError("Invalid decryption".to_string()))
            })
            .collect::<Result<Vec<u64>>>()?;

        Ok(Plaintext {
            par: self.par.clone(),
            value: value.into_boxed_slice(),
            encoding: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::SecretKey;
    use crate::bgv::{parameters::BgvParameters, Encoding, Plaintext};
    use rand::thread_rng;
    use rotkey_traits::{FheDecoder, FheDecrypter, FheEncoder, FheEncrypter};
    use std::error::Error;

    #[test]
    fn keygen() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        let params = BgvParameters::default_arc(1, 8);
        let sk = SecretKey::random(&params, &mut rng)?;
        assert_eq!(sk.par, params);
        assert_eq!(sk.variance(), params.variance());

        sk.coeffs.iter().for_each(|ci| {
            // Check that this is a small polynomial
            assert!((*ci).abs() <= 2 * SecretKey::SK_VARIANCE as i64)
        });
        Ok(())
    }

    #[test]
    fn encrypt_decrypt() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        for params in [
            BgvParameters::default_arc(1, 8),
            BgvParameters::default_arc(3, 16),
        ] {
            for level in 1..=params.max_level() {
                for _ in 0..20 {
                    let sk = SecretKey::random(&params, &mut rng)?;

                    let v = params.plaintext.random_vec(params.degree(), &mut rng);
                    let pt = Plaintext::try_encode(&v[..], Encoding::simd(), &params)?;
                    let ct = sk.try_encrypt_at_level(&pt, level, &mut rng)?;
                    assert_eq!(ct.level(), level);
                    let pt2 = sk.try_decrypt(&ct)?;

                    assert_eq!(Vec::<u64>::try_decode(&pt2, Encoding::simd())?, v);
                    assert!(sk.measure_noise(&ct)? < 30);
                }
            }
        }

        Ok(())
    }

    #[test]
    fn decrypt_signed_values() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        let params = BgvParameters::default_arc(2, 16);
        let sk = SecretKey::random(&params, &mut rng)?;
        let v = (-8..8i64).collect::<Vec<_>>();
        let pt = Plaintext::try_encode(&v[..], Encoding::poly(), &params)?;
        let ct = sk.try_encrypt(&pt, &mut rng)?;
        let pt2 = sk.try_decrypt(&ct)?;
        assert_eq!(Vec::<i64>::try_decode(&pt2, Encoding::poly())?, v);
        Ok(())
    }

    #[test]
    fn incompatible_parameters() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        let params = BgvParameters::default_arc(1, 8);
        let other = BgvParameters::default_arc(2, 8);
        let sk = SecretKey::random(&params, &mut rng)?;
        let pt = Plaintext::try_encode(&[1u64, 2, 3][..], Encoding::poly(), &other)?;
        assert!(sk.try_encrypt(&pt, &mut rng).is_err());
        assert!(sk.try_encrypt_at_level(&pt, 0, &mut rng).is_err());
        Ok(())
    }
}
