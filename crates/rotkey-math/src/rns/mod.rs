//! Residue-Number System operations.

use crate::{zq::Modulus, Error, Result};
use itertools::izip;
use ndarray::ArrayView1;
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

/// Context for a Residue Number System.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RnsContext {
    moduli_u64: Vec<u64>,
    q_tilde: Vec<u64>,
    q_star: Vec<BigUint>,
    garner: Vec<BigUint>,
    product: BigUint,
}

impl RnsContext {
    /// Create a RNS context from a list of moduli.
    ///
    /// Returns an error if the list is empty, or if the moduli are not
    /// pairwise coprime primes.
    pub fn new(moduli_u64: &[u64]) -> Result<Self> {
        if moduli_u64.is_empty() {
            return Err(Error::Default("The list of moduli is empty".to_string()));
        }

        let moduli = moduli_u64
            .iter()
            .map(|qi| Modulus::new(*qi))
            .collect::<Result<Vec<_>>>()?;

        for (i, qi) in moduli_u64.iter().enumerate() {
            if moduli_u64[i + 1..].iter().any(|qj| gcd(*qi, *qj) != 1) {
                return Err(Error::Default(
                    "The moduli are not coprime".to_string(),
                ));
            }
        }

        let product = moduli_u64
            .iter()
            .fold(BigUint::from(1u64), |acc, qi| acc * *qi);

        let mut q_star = Vec::with_capacity(moduli.len());
        let mut q_tilde = Vec::with_capacity(moduli.len());
        let mut garner = Vec::with_capacity(moduli.len());
        for qi in &moduli {
            // q* = product / qi and q~ = (q*)^(-1) mod qi
            let q_star_i = &product / qi.modulus();
            let q_star_i_mod_qi = (&q_star_i % qi.modulus())
                .to_u64()
                .ok_or_else(|| Error::Default("Could not reduce modulo qi".to_string()))?;
            let q_tilde_i = qi.inv(q_star_i_mod_qi).ok_or_else(|| {
                Error::Default(format!("The modulus {} is not prime", qi.modulus()))
            })?;
            garner.push(&q_star_i * q_tilde_i);
            q_star.push(q_star_i);
            q_tilde.push(q_tilde_i);
        }

        Ok(Self {
            moduli_u64: moduli_u64.to_owned(),
            q_tilde,
            q_star,
            garner,
            product,
        })
    }

    /// Returns the product of the moduli used when creating the RNS context.
    pub const fn modulus(&self) -> &BigUint {
        &self.product
    }

    /// Returns the moduli of the RNS context.
    pub fn moduli(&self) -> &[u64] {
        &self.moduli_u64
    }

    /// Project a BigUint into its rests.
    pub fn project(&self, a: &BigUint) -> Vec<u64> {
        self.moduli_u64
            .iter()
            .map(|qi| (a % *qi).to_u64().unwrap_or_default())
            .collect()
    }

    /// Lift rests into a BigUint in [0, modulus).
    ///
    /// Aborts if the number of rests is different than the number of moduli in
    /// debug mode.
    pub fn lift(&self, rests: ArrayView1<u64>) -> BigUint {
        debug_assert_eq!(rests.len(), self.moduli_u64.len());

        let mut result = BigUint::zero();
        izip!(rests.iter(), self.garner.iter())
            .for_each(|(r_i, garner_i)| result += garner_i * *r_i);
        result % &self.product
    }

    /// Getter for the i-th CRT complement `q*_i = product / q_i`.
    pub fn get_q_star(&self, i: usize) -> Option<&BigUint> {
        self.q_star.get(i)
    }

    /// Getter for the i-th CRT inverse `q~_i = (q*_i)^(-1) mod q_i`.
    pub fn get_q_tilde(&self, i: usize) -> Option<u64> {
        self.q_tilde.get(i).copied()
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
