use super::Context;
use crate::{Error, Result};
use itertools::Itertools;
use std::sync::Arc;

/// Substitution exponent.
/// This is an exponent `k` that is invertible modulo `2 * degree`, and
/// defines the ring automorphism `X -> X^k`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SubstitutionExponent {
    /// The value of the exponent, in [0, 2 * degree).
    pub exponent: usize,

    pub(crate) degree: usize,
    pub(crate) power_bitrev: Box<[usize]>,
}

impl SubstitutionExponent {
    /// Creates a substitution element from an exponent.
    ///
    /// The exponent is reduced modulo `2 * degree`. Returns an error if it is
    /// even, since it is then not invertible modulo `2 * degree`.
    pub fn new(ctx: &Arc<Context>, exponent: usize) -> Result<Self> {
        let exponent = exponent % (2 * ctx.degree);
        if exponent & 1 == 0 {
            return Err(Error::InvalidSubstitutionExponent(exponent));
        }

        let mask = ctx.degree - 1;
        let shift = ctx.degree.leading_zeros() + 1;
        let mut power = (exponent - 1) / 2;
        let power_bitrev = (0..ctx.degree)
            .map(|_| {
                let r = (power & mask).reverse_bits() >> shift;
                power += exponent;
                r
            })
            .collect_vec();

        Ok(Self {
            exponent,
            degree: ctx.degree,
            power_bitrev: power_bitrev.into_boxed_slice(),
        })
    }

    /// Returns the degree of the polynomials this exponent applies to.
    pub const fn degree(&self) -> usize {
        self.degree
    }
}

#[cfg(test)]
mod tests {
    use super::SubstitutionExponent;
    use crate::rq::{traits::TryConvertFrom, Context, Poly, Representation};
    use rand::thread_rng;
    use std::{error::Error, sync::Arc};

    const MODULI: &[u64; 3] = &[1153, 4611686018326724609, 4611686018309947393];

    #[test]
    fn constructor() -> Result<(), Box<dyn Error>> {
        let ctx = Arc::new(Context::new(MODULI, 8)?);

        for k in (1..64).step_by(2) {
            let e = SubstitutionExponent::new(&ctx, k)?;
            assert_eq!(e.exponent, k % 16);
            assert_eq!(e.degree(), 8);
        }
        for k in (0..64).step_by(2) {
            assert_eq!(
                SubstitutionExponent::new(&ctx, k).err(),
                Some(crate::Error::InvalidSubstitutionExponent(k % 16))
            );
        }
        Ok(())
    }

    #[test]
    fn substitute_power_basis() -> Result<(), Box<dyn Error>> {
        let ctx = Arc::new(Context::new(MODULI, 8)?);

        // X -> X^3 maps X to X^3, and X^3 to X^9 = -X.
        let p = Poly::try_convert_from(&[0u64, 1, 0, 2][..], &ctx, Representation::PowerBasis)?;
        let q = p.substitute(&SubstitutionExponent::new(&ctx, 3)?)?;
        let expected =
            Poly::try_convert_from(&[0i64, -2, 0, 1][..], &ctx, Representation::PowerBasis)?;
        assert_eq!(q, expected);

        // X -> X^(2N - 1) = X^(-1).
        let q = p.substitute(&SubstitutionExponent::new(&ctx, 15)?)?;
        let expected = Poly::try_convert_from(
            &[0i64, 0, 0, 0, 0, -2, 0, -1][..],
            &ctx,
            Representation::PowerBasis,
        )?;
        assert_eq!(q, expected);
        Ok(())
    }

    #[test]
    fn substitute_ntt_matches_power_basis() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        for degree in [8, 16, 32] {
            let ctx = Arc::new(Context::new(&MODULI[1..], degree)?);
            let p = Poly::random(&ctx, Representation::PowerBasis, &mut rng);
            let mut p_ntt = p.clone();
            p_ntt.change_representation(Representation::Ntt);

            for k in (1..2 * degree).step_by(2) {
                let e = SubstitutionExponent::new(&ctx, k)?;
                let q = p.substitute(&e)?;
                let mut q_ntt = p_ntt.substitute(&e)?;
                q_ntt.change_representation(Representation::PowerBasis);
                assert_eq!(q, q_ntt);
            }
        }
        Ok(())
    }

    #[test]
    fn substitute_composition() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        let ctx = Arc::new(Context::new(MODULI, 8)?);
        let p = Poly::random(&ctx, Representation::Ntt, &mut rng);

        // (X^5)^13 = X^65 = X^1 modulo X^8 + 1.
        let q = p
            .substitute(&SubstitutionExponent::new(&ctx, 5)?)?
            .substitute(&SubstitutionExponent::new(&ctx, 13)?)?;
        assert_eq!(p, q);

        // The exponent 1 is the identity.
        assert_eq!(p.substitute(&SubstitutionExponent::new(&ctx, 1)?)?, p);

        // The exponent must have been built for the same degree.
        let other_ctx = Arc::new(Context::new(&MODULI[1..], 16)?);
        let e = SubstitutionExponent::new(&other_ctx, 5)?;
        assert!(p.substitute(&e).is_err());
        Ok(())
    }
}
