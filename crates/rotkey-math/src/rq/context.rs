use itertools::Itertools;
use num_bigint::BigUint;
use std::{fmt::Debug, sync::Arc};

use crate::{ntt::NttOperator, rns::RnsContext, zq::Modulus, Error, Result};

/// Struct that holds the context associated with elements in rq.
#[derive(Clone, PartialEq, Eq)]
pub struct Context {
    /// List of prime moduli
    pub moduli: Box<[u64]>,
    /// Modulus operators for each prime
    pub q: Box<[Modulus]>,
    /// RNS context for CRT operations
    pub rns: Arc<RnsContext>,
    /// NTT operators for each prime
    pub ops: Box<[NttOperator]>,
    /// Polynomial degree (must be power of 2)
    pub degree: usize,
    /// Bit-reversed indices for NTT operations
    pub bitrev: Box<[usize]>,
    /// Link to context with one less modulus (for level management)
    pub next_context: Option<Arc<Context>>,
}

impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("moduli", &self.moduli)
            .field("degree", &self.degree)
            .field("next_context", &self.next_context)
            .finish()
    }
}

impl Context {
    /// Creates a context from a list of moduli and a polynomial degree.
    ///
    /// Returns an error if the moduli are not primes less than 62 bits which
    /// supports the NTT of size `degree`.
    pub fn new(moduli: &[u64], degree: usize) -> Result<Self> {
        if !degree.is_power_of_two() || degree < 8 {
            return Err(Error::Default(
                "The degree is not a power of two larger or equal to 8".to_string(),
            ));
        }

        let rns = Arc::new(RnsContext::new(moduli)?);
        let mut q = Vec::with_capacity(moduli.len());
        let mut ops = Vec::with_capacity(moduli.len());
        for modulus in moduli {
            let qi = Modulus::new(*modulus)?;
            let op = NttOperator::new(&qi, degree).ok_or_else(|| {
                Error::Default("Impossible to construct a Ntt operator".to_string())
            })?;
            q.push(qi);
            ops.push(op);
        }
        let bitrev = (0..degree)
            .map(|j| j.reverse_bits() >> (degree.leading_zeros() + 1))
            .collect_vec();

        let next_context = if moduli.len() >= 2 {
            Some(Arc::new(Context::new(&moduli[..moduli.len() - 1], degree)?))
        } else {
            None
        };

        Ok(Self {
            moduli: moduli.to_owned().into_boxed_slice(),
            q: q.into_boxed_slice(),
            rns,
            ops: ops.into_boxed_slice(),
            degree,
            bitrev: bitrev.into_boxed_slice(),
            next_context,
        })
    }

    /// Creates a context in an `Arc`.
    pub fn new_arc(moduli: &[u64], degree: usize) -> Result<Arc<Self>> {
        Self::new(moduli, degree).map(Arc::new)
    }

    /// Returns the modulus as a BigUint.
    pub fn modulus(&self) -> &BigUint {
        self.rns.modulus()
    }

    /// Returns a reference to the moduli in this context.
    pub fn moduli(&self) -> &[u64] {
        &self.moduli
    }

    /// Returns the degree of the polynomials.
    pub const fn degree(&self) -> usize {
        self.degree
    }

    /// Returns the base-2 logarithm of the degree.
    pub const fn log_n(&self) -> usize {
        self.degree.trailing_zeros() as usize
    }

    /// Returns the number of iterations to switch to a children context.
    /// Returns an error if the context provided is not a child context.
    pub fn niterations_to(&self, context: &Arc<Context>) -> Result<usize> {
        if context.as_ref() == self {
            return Ok(0);
        }

        let mut niterations = 0;
        let mut current_ctx = self.next_context.clone();
        while let Some(ctx) = current_ctx {
            niterations += 1;
            if &ctx == context {
                return Ok(niterations);
            }
            current_ctx = ctx.next_context.clone();
        }
        Err(Error::InvalidContext)
    }

    /// Returns the context after `i` iterations.
    pub fn context_at_level(self: &Arc<Self>, i: usize) -> Result<Arc<Self>> {
        let mut current_ctx = self.clone();
        for _ in 0..i {
            current_ctx = current_ctx
                .next_context
                .clone()
                .ok_or(Error::NoMoreContext)?;
        }
        Ok(current_ctx)
    }
}
