//! Rotation keys for the BGV encryption scheme

use super::{seed::Seed, Gadget};
use crate::bgv::{Ciphertext, SecretKey};
use crate::{Error, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rotkey_math::rq::{dot_product, Context, Poly, Representation, SubstitutionExponent};
use std::sync::Arc;
use zeroize::Zeroizing;

/// Key switching key from the substituted secret key `s(X^power)` back to
/// `s(X)`.
///
/// For every gadget digit `j`, the key holds `b_j = -a_j * s + t * e_j + g_j *
/// s(X^power)` and the uniform `a_j`, in Ntt representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationKey {
    pub(crate) power: usize,
    pub(crate) level: usize,
    pub(crate) gadget: Arc<Gadget>,
    pub(crate) ctx: Arc<Context>,
    pub(crate) b: Box<[Poly]>,
    pub(crate) a: Box<[Poly]>,
}

impl RotationKey {
    /// Generate the rotation key for the substitution `X -> X^power`, with
    /// error terms of the given variance and the pseudorandomness drawn from
    /// `seed`.
    pub fn create_for_bgv(
        sk: &SecretKey,
        power: usize,
        variance: usize,
        gadget: &Arc<Gadget>,
        plaintext_modulus: u64,
        seed: Seed,
    ) -> Result<Self> {
        let level = gadget.num_moduli();
        let ctx = sk.par.ctx_at_level(level)?;
        if ctx.moduli() != gadget.moduli() || ctx.log_n() != gadget.log_n() {
            return Err(Error::GadgetError(
                "The gadget does not match the parameters of the secret key".to_string(),
            ));
        }

        let exponent = SubstitutionExponent::new(ctx, power)?;
        let s = sk.to_poly(ctx)?;
        let s_sub = Zeroizing::new(s.substitute(&exponent)?);

        let mut rng = ChaCha8Rng::from_seed(seed);
        let mut b = Vec::with_capacity(gadget.num_digits());
        let mut a = Vec::with_capacity(gadget.num_digits());
        for j in 0..gadget.num_digits() {
            let entry = gadget
                .entry(j)
                .ok_or_else(|| Error::GadgetError(format!("Missing gadget entry {j}")))?;

            let a_j = Poly::random(ctx, Representation::Ntt, &mut rng);
            let mut b_j = Poly::small(ctx, Representation::Ntt, variance, &mut rng)?;
            b_j.scalar_mul(plaintext_modulus);

            let mut g_s = Zeroizing::new((*s_sub).clone());
            g_s.mul_limbwise(entry)?;
            b_j += &*g_s;

            let a_s = Zeroizing::new(&a_j * &*s);
            b_j -= &*a_s;

            b.push(b_j);
            a.push(a_j);
        }

        Ok(Self {
            power: exponent.exponent,
            level,
            gadget: gadget.clone(),
            ctx: ctx.clone(),
            b: b.into_boxed_slice(),
            a: a.into_boxed_slice(),
        })
    }

    /// Key switch a ciphertext decrypting under `s(X^power)` into a ciphertext
    /// decrypting under `s(X)` to the same plaintext.
    pub fn apply_to(&self, ct: &Ciphertext) -> Result<Ciphertext> {
        if ct.c.len() < 2 {
            return Err(Error::TooFewValues(ct.c.len(), 2));
        }
        if ct.c.len() > 2 {
            return Err(Error::TooManyValues(ct.c.len(), 2));
        }
        if ct.level != self.level {
            return Err(Error::LevelMismatch {
                expected: self.level,
                found: ct.level,
            });
        }
        if ct.c[0].ctx() != &self.ctx {
            return Err(Error::MathError(rotkey_math::Error::InvalidContext));
        }

        let mut c1 = ct.c[1].clone();
        c1.change_representation(Representation::PowerBasis);
        let digits = self.gadget.decompose(&c1)?;

        let mut c0 = ct.c[0].clone();
        c0 += &dot_product(digits.iter(), self.b.iter())?;
        let c1 = dot_product(digits.iter(), self.a.iter())?;

        Ok(Ciphertext {
            par: ct.par.clone(),
            seed: None,
            c: vec![c0, c1],
            level: ct.level,
        })
    }

    /// Rotate a ciphertext: substitute `X -> X^power`, then key switch back to
    /// the original secret key.
    pub fn rotate(&self, ct: &Ciphertext) -> Result<Ciphertext> {
        self.apply_to(&ct.substitute(self.power)?)
    }

    /// Returns the substitution power of the key.
    pub const fn power(&self) -> usize {
        self.power
    }

    /// Returns the level of the ciphertexts this key applies to.
    pub const fn level(&self) -> usize {
        self.level
    }

    /// Returns the number of key switching rows, one per gadget digit.
    pub fn num_digits(&self) -> usize {
        self.a.len()
    }

    /// Returns the gadget of the key.
    pub fn gadget(&self) -> &Arc<Gadget> {
        &self.gadget
    }
}
