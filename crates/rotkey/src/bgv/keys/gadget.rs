//! Gadget decomposition used by key switching.

use crate::{Error, Result};
use itertools::{izip, Itertools};
use ndarray::Array2;
use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use rotkey_math::rq::{traits::TryConvertFrom, Poly, Representation};

/// Decomposition of RNS polynomials in small digits.
///
/// The residue modulo `q_i` is written in base `B_i = 2^log_b_i` with
/// `ceil(bits(q_i) / log_b_i)` digits. Digit `k` of limb `i` pairs with the
/// gadget element `g_{i,k} = q̂_i * (q̂_i^-1 mod q_i) * B_i^k mod Q`, which is
/// `B_i^k` modulo `q_i` and zero modulo every other modulus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gadget {
    log_n: usize,
    log_bases: Box<[usize]>,
    dimensions: Box<[usize]>,
    moduli: Box<[u64]>,
    q_hats: Box<[BigUint]>,
    q_hat_invs: Box<[u64]>,
    entries: Box<[Box<[u64]>]>,
}

impl Gadget {
    /// Creates a gadget from the base-2 logarithms of the bases, the CRT
    /// complements `q̂_i = Q / q_i` and factors `q̂_i^-1 mod q_i`, and the
    /// moduli.
    ///
    /// Returns an error if the lengths differ, if a base is not smaller than
    /// every modulus, or if the CRT factors are inconsistent.
    pub fn new(
        log_n: usize,
        log_bases: &[usize],
        q_hats: &[BigUint],
        q_hat_invs: &[u64],
        moduli: &[u64],
    ) -> Result<Self> {
        if moduli.is_empty() {
            return Err(Error::GadgetError("The list of moduli is empty".to_string()));
        }
        if log_bases.len() != moduli.len()
            || q_hats.len() != moduli.len()
            || q_hat_invs.len() != moduli.len()
        {
            return Err(Error::GadgetError(format!(
                "Expected {} bases and CRT factors, got {}, {} and {}",
                moduli.len(),
                log_bases.len(),
                q_hats.len(),
                q_hat_invs.len()
            )));
        }

        let min_modulus = moduli.iter().min().copied().unwrap_or_default();
        for log_b in log_bases {
            if *log_b == 0 || *log_b >= 63 || (1u64 << log_b) >= min_modulus {
                return Err(Error::GadgetError(format!(
                    "The base 2^{log_b} must be larger than 1 and smaller than every modulus"
                )));
            }
        }

        for (i, (q_hat, q_hat_inv, qi)) in izip!(q_hats, q_hat_invs, moduli).enumerate() {
            let qi_big = BigUint::from(*qi);
            if *q_hat_inv >= *qi || (q_hat % &qi_big) * *q_hat_inv % &qi_big != BigUint::one() {
                return Err(Error::GadgetError(format!(
                    "Inconsistent CRT factors for the modulus {qi}"
                )));
            }
            if moduli
                .iter()
                .enumerate()
                .any(|(j, qj)| j != i && !(q_hat % *qj).is_zero())
            {
                return Err(Error::GadgetError(format!(
                    "The CRT complement of {qi} is not divisible by the other moduli"
                )));
            }
        }

        let dimensions = izip!(moduli, log_bases)
            .map(|(qi, log_b)| (64 - qi.leading_zeros() as usize).div_ceil(*log_b))
            .collect_vec();

        let q = moduli
            .iter()
            .fold(BigUint::one(), |acc, qi| acc * *qi);
        let mut entries = Vec::with_capacity(dimensions.iter().sum());
        for (q_hat, q_hat_inv, log_b, dimension) in
            izip!(q_hats, q_hat_invs, log_bases, dimensions.iter())
        {
            let crt = q_hat * *q_hat_inv;
            for k in 0..*dimension {
                let g = (&crt << (log_b * k)) % &q;
                let residues = moduli
                    .iter()
                    .map(|qj| {
                        (&g % *qj)
                            .to_u64()
                            .ok_or_else(|| Error::GadgetError("Invalid residue".to_string()))
                    })
                    .collect::<Result<Vec<_>>>()?;
                entries.push(residues.into_boxed_slice());
            }
        }

        Ok(Self {
            log_n,
            log_bases: log_bases.into(),
            dimensions: dimensions.into_boxed_slice(),
            moduli: moduli.into(),
            q_hats: q_hats.into(),
            q_hat_invs: q_hat_invs.into(),
            entries: entries.into_boxed_slice(),
        })
    }

    /// Decomposes a polynomial in power basis into its digits, returned in Ntt
    /// representation.
    pub fn decompose(&self, p: &Poly) -> Result<Vec<Poly>> {
        if p.representation() != &Representation::PowerBasis {
            return Err(Error::MathError(
                rotkey_math::Error::IncorrectRepresentation(
                    *p.representation(),
                    Representation::PowerBasis,
                ),
            ));
        }
        let ctx = p.ctx();
        if ctx.degree() != 1 << self.log_n {
            return Err(Error::GadgetError(format!(
                "Expected a polynomial of degree {}, got {}",
                1 << self.log_n,
                ctx.degree()
            )));
        }
        if ctx.moduli().len() != self.moduli.len() {
            return Err(Error::LevelMismatch {
                expected: self.moduli.len(),
                found: ctx.moduli().len(),
            });
        }
        if ctx.moduli() != &self.moduli[..] {
            return Err(Error::MathError(rotkey_math::Error::InvalidContext));
        }

        let num_moduli = self.moduli.len();
        let coefficients = p.coefficients();
        let mut digits = Vec::with_capacity(self.num_digits());
        for (row, log_b, dimension) in izip!(
            coefficients.outer_iter(),
            self.log_bases.iter(),
            self.dimensions.iter()
        ) {
            let mask = (1u64 << log_b) - 1;
            for k in 0..*dimension {
                let shift = log_b * k;
                // The digit is smaller than every modulus, so it is embedded
                // as is in every limb.
                let digit_coefficients =
                    Array2::from_shape_fn((num_moduli, ctx.degree()), |(_, j)| {
                        (row[j] >> shift) & mask
                    });
                let mut digit =
                    Poly::try_convert_from(digit_coefficients, ctx, Representation::PowerBasis)?;
                digit.change_representation(Representation::Ntt);
                digits.push(digit);
            }
        }
        Ok(digits)
    }

    /// Recomposes digits into the polynomial `sum_j digits[j] * g_j`, in the
    /// representation of the digits.
    pub fn recompose(&self, digits: &[Poly]) -> Result<Poly> {
        if digits.len() != self.num_digits() {
            return Err(Error::GadgetError(format!(
                "Expected {} digits, got {}",
                self.num_digits(),
                digits.len()
            )));
        }
        let first = &digits[0];
        if first.ctx().moduli() != &self.moduli[..] {
            return Err(Error::MathError(rotkey_math::Error::InvalidContext));
        }

        let mut out = Poly::zero(first.ctx(), *first.representation());
        for (digit, entry) in izip!(digits, self.entries.iter()) {
            if digit.ctx() != first.ctx() {
                return Err(Error::MathError(rotkey_math::Error::InvalidContext));
            }
            if digit.representation() != first.representation() {
                return Err(Error::MathError(
                    rotkey_math::Error::IncorrectRepresentation(
                        *digit.representation(),
                        *first.representation(),
                    ),
                ));
            }
            let mut term = digit.clone();
            term.mul_limbwise(entry)?;
            out += &term;
        }
        Ok(out)
    }

    /// Returns the RNS residues of the `j`-th gadget element.
    pub fn entry(&self, j: usize) -> Option<&[u64]> {
        self.entries.get(j).map(|e| &e[..])
    }

    /// Returns the total number of digits.
    pub fn num_digits(&self) -> usize {
        self.entries.len()
    }

    /// Returns the number of digits of each modulus.
    pub fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }

    /// Returns the base-2 logarithms of the bases.
    pub fn log_bases(&self) -> &[usize] {
        &self.log_bases
    }

    /// Returns the number of moduli the gadget decomposes over.
    pub fn num_moduli(&self) -> usize {
        self.moduli.len()
    }

    /// Returns the moduli.
    pub fn moduli(&self) -> &[u64] {
        &self.moduli
    }

    /// Returns the CRT complements.
    pub fn q_hats(&self) -> &[BigUint] {
        &self.q_hats
    }

    /// Returns the CRT factors.
    pub fn q_hat_invs(&self) -> &[u64] {
        &self.q_hat_invs
    }

    /// Returns the base-2 logarithm of the ring degree.
    pub const fn log_n(&self) -> usize {
        self.log_n
    }
}
