//! Implementation of operations over polynomials.

use super::{Poly, Representation};
use crate::{Error, Result};
use itertools::izip;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

impl AddAssign<&Poly> for Poly {
    fn add_assign(&mut self, p: &Poly) {
        assert_eq!(
            self.representation, p.representation,
            "Incompatible representations"
        );
        debug_assert_eq!(self.ctx, p.ctx, "Incompatible contexts");
        self.zip_limbs(p, |qi, a, b| qi.add_vec(a, b));
    }
}

impl Add<&Poly> for &Poly {
    type Output = Poly;
    fn add(self, p: &Poly) -> Poly {
        let mut q = self.clone();
        q += p;
        q
    }
}

impl SubAssign<&Poly> for Poly {
    fn sub_assign(&mut self, p: &Poly) {
        assert_eq!(
            self.representation, p.representation,
            "Incompatible representations"
        );
        debug_assert_eq!(self.ctx, p.ctx, "Incompatible contexts");
        self.zip_limbs(p, |qi, a, b| qi.sub_vec(a, b));
    }
}

impl Sub<&Poly> for &Poly {
    type Output = Poly;
    fn sub(self, p: &Poly) -> Poly {
        let mut q = self.clone();
        q -= p;
        q
    }
}

impl MulAssign<&Poly> for Poly {
    fn mul_assign(&mut self, p: &Poly) {
        assert_eq!(
            self.representation,
            Representation::Ntt,
            "Multiplication requires an Ntt representation."
        );
        assert_eq!(
            p.representation,
            Representation::Ntt,
            "Multiplication requires an Ntt representation."
        );
        debug_assert_eq!(self.ctx, p.ctx, "Incompatible contexts");
        self.zip_limbs(p, |qi, a, b| qi.mul_vec(a, b));
    }
}

impl Mul<&Poly> for &Poly {
    type Output = Poly;
    fn mul(self, p: &Poly) -> Poly {
        let mut q = self.clone();
        q *= p;
        q
    }
}

impl Neg for &Poly {
    type Output = Poly;

    fn neg(self) -> Poly {
        -self.clone()
    }
}

impl Neg for Poly {
    type Output = Poly;

    fn neg(mut self) -> Poly {
        self.for_each_limb(|qi, limb| qi.neg_vec(limb));
        self
    }
}

/// Computes the inner product `sum_i p[i] * q[i]` of two sequences of
/// polynomials in Ntt representation.
///
/// Returns an error if the sequences are empty, have different lengths, do not
/// share a context, or are not in Ntt representation.
pub fn dot_product<'a, 'b, I, J>(p: I, q: J) -> Result<Poly>
where
    I: Iterator<Item = &'a Poly> + Clone,
    J: Iterator<Item = &'b Poly> + Clone,
{
    let count = p.clone().count();
    if count == 0 || count != q.clone().count() {
        return Err(Error::Default(
            "The sequences must be non-empty and of the same length".to_string(),
        ));
    }

    let mut out: Option<Poly> = None;
    for (pi, qi) in izip!(p, q) {
        if pi.representation != Representation::Ntt {
            return Err(Error::IncorrectRepresentation(
                pi.representation,
                Representation::Ntt,
            ));
        }
        if qi.representation != Representation::Ntt {
            return Err(Error::IncorrectRepresentation(
                qi.representation,
                Representation::Ntt,
            ));
        }
        if pi.ctx != qi.ctx {
            return Err(Error::InvalidContext);
        }
        match out.as_mut() {
            None => out = Some(pi * qi),
            Some(acc) => {
                if acc.ctx != pi.ctx {
                    return Err(Error::InvalidContext);
                }
                *acc += &(pi * qi);
            }
        }
    }
    out.ok_or_else(|| Error::Default("Empty dot product".to_string()))
}
