#![warn(missing_docs, unused_imports)]

//! Polynomials in R_q\[x\] = (ZZ_q1 x ... x ZZ_qn)\[x\] where the qi's are
//! prime moduli in zq.

mod context;
mod convert;
mod ops;
mod serialize;
mod substitution;

pub mod traits;

pub use context::Context;
pub use ops::dot_product;
pub use substitution::SubstitutionExponent;

use crate::{ntt::NttOperator, zq::Modulus, Error, Result};
use itertools::izip;
use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut1, Axis};
use std::borrow::Cow;
use num_bigint::BigUint;
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use traits::TryConvertFrom;
use zeroize::{Zeroize, Zeroizing};

/// Possible representations of the underlying polynomial.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    /// This is the list of coefficients ci, such that the polynomial is c0 + c1
    /// * x + ... + c_(degree - 1) * x^(degree - 1)
    #[default]
    PowerBasis,
    /// This is the NTT representation of the PowerBasis representation.
    Ntt,
}

/// Struct that holds a polynomial for a specific context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poly {
    ctx: Arc<Context>,
    representation: Representation,
    coefficients: Array2<u64>,
}

impl Poly {
    /// Creates a polynomial holding the constant 0.
    pub fn zero(ctx: &Arc<Context>, representation: Representation) -> Self {
        Self {
            ctx: ctx.clone(),
            representation,
            coefficients: Array2::zeros((ctx.q.len(), ctx.degree)),
        }
    }

    /// Generate a random polynomial.
    pub fn random<R: RngCore + CryptoRng>(
        ctx: &Arc<Context>,
        representation: Representation,
        rng: &mut R,
    ) -> Self {
        let mut p = Poly::zero(ctx, representation);
        izip!(p.coefficients.outer_iter_mut(), ctx.q.iter()).for_each(|(mut v, qi)| {
            let random = qi.random_vec(ctx.degree, rng);
            v.assign(&ArrayView1::from(&random[..]));
        });
        p
    }

    /// Generate a random polynomial deterministically from a seed.
    pub fn random_from_seed(
        ctx: &Arc<Context>,
        representation: Representation,
        seed: <ChaCha8Rng as SeedableRng>::Seed,
    ) -> Self {
        let mut rng = ChaCha8Rng::from_seed(seed);
        Self::random(ctx, representation, &mut rng)
    }

    /// Generate a small polynomial and convert into the specified
    /// representation.
    ///
    /// Returns an error if the variance does not belong to [1, ..., 16].
    pub fn small<T: RngCore + CryptoRng>(
        ctx: &Arc<Context>,
        representation: Representation,
        variance: usize,
        rng: &mut T,
    ) -> Result<Self> {
        if !(1..=16).contains(&variance) {
            return Err(Error::Default(
                "The variance should be an integer between 1 and 16".to_string(),
            ));
        }

        let coeffs = Zeroizing::new(
            rotkey_util::sample_vec_cbd(ctx.degree, variance, rng)
                .map_err(|e| Error::Default(e.to_string()))?,
        );
        let mut p = Poly::try_convert_from(&coeffs[..], ctx, Representation::PowerBasis)?;
        if representation != Representation::PowerBasis {
            p.change_representation(representation);
        }
        Ok(p)
    }

    /// Access the polynomial context.
    pub const fn ctx(&self) -> &Arc<Context> {
        &self.ctx
    }

    /// Current representation of the polynomial.
    pub const fn representation(&self) -> &Representation {
        &self.representation
    }

    /// Get a view on the coefficients, one row per modulus.
    pub fn coefficients(&self) -> ArrayView2<'_, u64> {
        self.coefficients.view()
    }

    /// Change the representation of the underlying polynomial.
    pub fn change_representation(&mut self, to: Representation) {
        match (self.representation, to) {
            (Representation::PowerBasis, Representation::Ntt) => {
                self.apply_ntt(|op, v| op.forward(v))
            }
            (Representation::Ntt, Representation::PowerBasis) => {
                self.apply_ntt(|op, v| op.backward(v))
            }
            _ => {}
        }
        self.representation = to;
    }

    fn apply_ntt(&mut self, f: impl Fn(&NttOperator, &mut [u64])) {
        izip!(self.coefficients.outer_iter_mut(), self.ctx.ops.iter())
            .for_each(|(v, op)| with_limb(v, |limb| f(op, limb)));
    }

    /// Applies `f` to every limb together with its modulus.
    pub(crate) fn for_each_limb(&mut self, f: impl Fn(&Modulus, &mut [u64])) {
        izip!(self.coefficients.outer_iter_mut(), self.ctx.q.iter())
            .for_each(|(v, qi)| with_limb(v, |limb| f(qi, limb)));
    }

    /// Applies `f` to every limb, the matching limb of `p` and their modulus.
    pub(crate) fn zip_limbs(&mut self, p: &Poly, f: impl Fn(&Modulus, &mut [u64], &[u64])) {
        izip!(
            self.coefficients.outer_iter_mut(),
            p.coefficients.outer_iter(),
            self.ctx.q.iter()
        )
        .for_each(|(v, w, qi)| {
            let other = w
                .as_slice()
                .map(Cow::Borrowed)
                .unwrap_or_else(|| Cow::Owned(w.to_vec()));
            with_limb(v, |limb| f(qi, limb, &other))
        });
    }

    /// Multiply the residues modulo the i-th modulus by `scalars[i]`.
    ///
    /// Returns an error if there is not exactly one scalar per modulus.
    pub fn mul_limbwise(&mut self, scalars: &[u64]) -> Result<()> {
        if scalars.len() != self.ctx.q.len() {
            return Err(Error::Default(format!(
                "Expected {} scalars, got {}",
                self.ctx.q.len(),
                scalars.len()
            )));
        }
        izip!(
            self.coefficients.outer_iter_mut(),
            self.ctx.q.iter(),
            scalars.iter()
        )
        .for_each(|(v, qi, s)| with_limb(v, |limb| qi.scalar_mul_vec(limb, *s)));
        Ok(())
    }

    /// Multiply the polynomial by an integer scalar.
    pub fn scalar_mul(&mut self, scalar: u64) {
        self.for_each_limb(|qi, limb| qi.scalar_mul_vec(limb, scalar));
    }

    /// Substitute x by x^i in a polynomial.
    ///
    /// In power basis, the coefficient of x^j moves to x^(i * j mod 2N), negated
    /// when `i * j mod 2N >= N`. In NTT representation, the substitution is a
    /// permutation of the evaluation points.
    pub fn substitute(&self, i: &SubstitutionExponent) -> Result<Poly> {
        if i.degree != self.ctx.degree {
            return Err(Error::InvalidContext);
        }

        let degree = self.ctx.degree;
        let mut q = Poly::zero(&self.ctx, self.representation);
        match self.representation {
            Representation::Ntt => {
                izip!(q.coefficients.outer_iter_mut(), self.coefficients.outer_iter()).for_each(
                    |(mut q_row, p_row)| {
                        izip!(self.ctx.bitrev.iter(), i.power_bitrev.iter())
                            .for_each(|(j, k)| q_row[*j] = p_row[*k]);
                    },
                );
            }
            Representation::PowerBasis => {
                let two_degree = degree << 1;
                izip!(
                    q.coefficients.outer_iter_mut(),
                    self.coefficients.outer_iter(),
                    self.ctx.q.iter()
                )
                .for_each(|(mut q_row, p_row, qi)| {
                    let mut power = 0usize;
                    for p_j in p_row.iter() {
                        if power < degree {
                            q_row[power] = *p_j;
                        } else {
                            q_row[power - degree] = qi.neg(*p_j);
                        }
                        power = (power + i.exponent) % two_degree;
                    }
                });
            }
        }

        Ok(q)
    }

    /// Lift the coefficients of the polynomial into integers in [0, q), where q
    /// is the product of the moduli.
    ///
    /// Returns an error if the polynomial is not in power basis.
    pub fn lift(&self) -> Result<Vec<BigUint>> {
        if self.representation != Representation::PowerBasis {
            return Err(Error::IncorrectRepresentation(
                self.representation,
                Representation::PowerBasis,
            ));
        }
        Ok(self
            .coefficients
            .axis_iter(Axis(1))
            .map(|rests| self.ctx.rns.lift(rests))
            .collect())
    }
}

// Runs `f` on a limb, through a copy when the limb is not contiguous.
fn with_limb(mut v: ArrayViewMut1<'_, u64>, f: impl FnOnce(&mut [u64])) {
    if let Some(limb) = v.as_slice_mut() {
        f(limb)
    } else {
        let mut buffer = v.to_vec();
        f(&mut buffer);
        v.assign(&ArrayView1::from(&buffer[..]));
    }
}

impl Zeroize for Poly {
    fn zeroize(&mut self) {
        self.coefficients.iter_mut().for_each(|c| c.zeroize());
    }
}
