//! Implementation of conversions from and to polynomials.

use super::{traits::TryConvertFrom, Context, Poly, Representation};
use crate::{Error, Result};
use itertools::izip;
use ndarray::Array2;
use num_bigint::BigUint;
use std::sync::Arc;

impl TryConvertFrom<Array2<u64>> for Poly {
    fn try_convert_from(
        a: Array2<u64>,
        ctx: &Arc<Context>,
        representation: Representation,
    ) -> Result<Self> {
        if a.dim() != (ctx.q.len(), ctx.degree) {
            return Err(Error::Default(
                "The array of coefficient does not have the correct shape".to_string(),
            ));
        }
        let in_range = izip!(a.outer_iter(), ctx.q.iter())
            .all(|(v, qi)| v.iter().all(|vj| *vj < qi.modulus()));
        if !in_range {
            return Err(Error::Default(
                "The coefficients are not reduced modulo the moduli".to_string(),
            ));
        }
        Ok(Self {
            ctx: ctx.clone(),
            representation,
            coefficients: a,
        })
    }
}

impl<'a> TryConvertFrom<&'a [u64]> for Poly {
    fn try_convert_from(
        v: &'a [u64],
        ctx: &Arc<Context>,
        representation: Representation,
    ) -> Result<Self> {
        check_length(v.len(), ctx, representation)?;
        let mut p = Poly::zero(ctx, representation);
        izip!(p.coefficients.outer_iter_mut(), ctx.q.iter()).for_each(|(mut row, qi)| {
            izip!(row.iter_mut(), v.iter()).for_each(|(rj, vj)| *rj = qi.reduce(*vj))
        });
        Ok(p)
    }
}

impl<'a> TryConvertFrom<&'a [i64]> for Poly {
    fn try_convert_from(
        v: &'a [i64],
        ctx: &Arc<Context>,
        representation: Representation,
    ) -> Result<Self> {
        check_length(v.len(), ctx, representation)?;
        let mut p = Poly::zero(ctx, representation);
        izip!(p.coefficients.outer_iter_mut(), ctx.q.iter()).for_each(|(mut row, qi)| {
            izip!(row.iter_mut(), v.iter()).for_each(|(rj, vj)| *rj = qi.reduce_i64(*vj))
        });
        Ok(p)
    }
}

impl<'a> TryConvertFrom<&'a [BigUint]> for Poly {
    fn try_convert_from(
        v: &'a [BigUint],
        ctx: &Arc<Context>,
        representation: Representation,
    ) -> Result<Self> {
        check_length(v.len(), ctx, representation)?;
        let mut p = Poly::zero(ctx, representation);
        for (j, vj) in v.iter().enumerate() {
            let rests = ctx.rns.project(vj);
            izip!(p.coefficients.column_mut(j).iter_mut(), rests.iter())
                .for_each(|(c, r)| *c = *r);
        }
        Ok(p)
    }
}

/// Polynomials in power basis may be given fewer coefficients than the
/// degree; the remaining coefficients are zero.
fn check_length(len: usize, ctx: &Context, representation: Representation) -> Result<()> {
    match representation {
        Representation::PowerBasis if len <= ctx.degree => Ok(()),
        Representation::Ntt if len == ctx.degree => Ok(()),
        _ => Err(Error::Default(format!(
            "Invalid number of coefficients: got {}, expected {} {}",
            len,
            if representation == Representation::Ntt {
                "exactly"
            } else {
                "at most"
            },
            ctx.degree
        ))),
    }
}
