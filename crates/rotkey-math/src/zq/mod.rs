//! Ring of integers modulo a prime q.

pub mod primes;

use crate::{Error, Result};
use itertools::izip;
use rand::{distributions::Uniform, CryptoRng, Rng, RngCore};

/// Structure encapsulating an integer modulus up to 62 bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modulus {
    pub(crate) p: u64,
    nbits: usize,
    supports_opt: bool,
}

impl Modulus {
    /// Create a modulus from an integer of at most 62 bits.
    pub fn new(p: u64) -> Result<Self> {
        if p < 2 || (p >> 62) != 0 {
            Err(Error::InvalidModulus(p))
        } else {
            Ok(Self {
                p,
                nbits: 64 - p.leading_zeros() as usize,
                supports_opt: rotkey_util::is_prime(p),
            })
        }
    }

    /// Returns the value of the modulus.
    pub const fn modulus(&self) -> u64 {
        self.p
    }

    /// Returns the number of bits of the modulus.
    pub const fn bits(&self) -> usize {
        self.nbits
    }

    /// Modular addition of a and b in constant time.
    ///
    /// Aborts if a >= p or b >= p in debug mode.
    pub const fn add(&self, a: u64, b: u64) -> u64 {
        debug_assert!(a < self.p && b < self.p);
        Self::reduce1(a + b, self.p)
    }

    /// Modular subtraction of a and b in constant time.
    ///
    /// Aborts if a >= p or b >= p in debug mode.
    pub const fn sub(&self, a: u64, b: u64) -> u64 {
        debug_assert!(a < self.p && b < self.p);
        Self::reduce1(a + self.p - b, self.p)
    }

    /// Modular multiplication of a and b.
    ///
    /// Aborts if a >= p or b >= p in debug mode.
    pub const fn mul(&self, a: u64, b: u64) -> u64 {
        debug_assert!(a < self.p && b < self.p);
        self.reduce_u128((a as u128) * (b as u128))
    }

    /// Modular negation.
    ///
    /// Aborts if a >= p in debug mode.
    pub const fn neg(&self, a: u64) -> u64 {
        debug_assert!(a < self.p);
        Self::reduce1(self.p - a, self.p)
    }

    /// Compute the Shoup representation of a.
    ///
    /// Aborts if a >= p in debug mode.
    pub const fn shoup(&self, a: u64) -> u64 {
        debug_assert!(a < self.p);
        (((a as u128) << 64) / (self.p as u128)) as u64
    }

    /// Shoup multiplication of a and b, with a result in [0, 2p).
    ///
    /// Aborts if b >= p or if b_shoup is not the Shoup representation of b in
    /// debug mode.
    pub const fn lazy_mul_shoup(&self, a: u64, b: u64, b_shoup: u64) -> u64 {
        debug_assert!(b < self.p);

        let q = ((a as u128) * (b_shoup as u128)) >> 64;
        let r = a.wrapping_mul(b).wrapping_sub((q as u64).wrapping_mul(self.p));

        debug_assert!(r < 2 * self.p);
        r
    }

    /// Shoup multiplication of a and b.
    pub const fn mul_shoup(&self, a: u64, b: u64, b_shoup: u64) -> u64 {
        Self::reduce1(self.lazy_mul_shoup(a, b, b_shoup), self.p)
    }

    /// Reduce a u64 modulo p.
    pub const fn reduce(&self, a: u64) -> u64 {
        a % self.p
    }

    /// Reduce a u128 modulo p.
    pub const fn reduce_u128(&self, a: u128) -> u64 {
        (a % (self.p as u128)) as u64
    }

    /// Reduce an i64 modulo p.
    pub const fn reduce_i64(&self, a: i64) -> u64 {
        (a as i128).rem_euclid(self.p as i128) as u64
    }

    /// Returns the representative of a in (-p/2, p/2].
    ///
    /// Aborts if a >= p in debug mode.
    pub const fn center(&self, a: u64) -> i64 {
        debug_assert!(a < self.p);
        if a > self.p >> 1 {
            (a as i64) - (self.p as i64)
        } else {
            a as i64
        }
    }

    /// Modular exponentiation.
    ///
    /// Aborts if a >= p in debug mode.
    pub fn pow(&self, a: u64, n: u64) -> u64 {
        debug_assert!(a < self.p);

        if n == 0 {
            1
        } else if n == 1 {
            a
        } else {
            let mut r = a;
            let mut i = (62 - n.leading_zeros()) as isize;
            while i >= 0 {
                r = self.mul(r, r);
                if (n >> i) & 1 == 1 {
                    r = self.mul(r, a);
                }
                i -= 1;
            }
            r
        }
    }

    /// Modular inversion.
    ///
    /// Returns None if p is not prime or a = 0.
    pub fn inv(&self, a: u64) -> Option<u64> {
        if !self.supports_opt || a == 0 {
            None
        } else {
            let r = self.pow(a, self.p - 2);
            debug_assert_eq!(self.mul(a, r), 1);
            Some(r)
        }
    }

    /// Reduce `a` in [0, 2p) to [0, p).
    pub(crate) const fn reduce1(a: u64, p: u64) -> u64 {
        debug_assert!(a < 2 * p);
        if a >= p {
            a - p
        } else {
            a
        }
    }

    /// Compute the Shoup representation of a vector.
    pub fn shoup_vec(&self, a: &[u64]) -> Vec<u64> {
        a.iter().map(|ai| self.shoup(*ai)).collect()
    }

    /// Modular addition of vectors in place.
    ///
    /// Aborts if a and b differ in size.
    pub fn add_vec(&self, a: &mut [u64], b: &[u64]) {
        debug_assert_eq!(a.len(), b.len());
        izip!(a.iter_mut(), b.iter()).for_each(|(ai, bi)| *ai = self.add(*ai, *bi));
    }

    /// Modular subtraction of vectors in place.
    ///
    /// Aborts if a and b differ in size.
    pub fn sub_vec(&self, a: &mut [u64], b: &[u64]) {
        debug_assert_eq!(a.len(), b.len());
        izip!(a.iter_mut(), b.iter()).for_each(|(ai, bi)| *ai = self.sub(*ai, *bi));
    }

    /// Modular multiplication of vectors in place.
    ///
    /// Aborts if a and b differ in size.
    pub fn mul_vec(&self, a: &mut [u64], b: &[u64]) {
        debug_assert_eq!(a.len(), b.len());
        izip!(a.iter_mut(), b.iter()).for_each(|(ai, bi)| *ai = self.mul(*ai, *bi));
    }

    /// Modular scalar multiplication of a vector in place.
    pub fn scalar_mul_vec(&self, a: &mut [u64], b: u64) {
        let b = self.reduce(b);
        let b_shoup = self.shoup(b);
        a.iter_mut()
            .for_each(|ai| *ai = self.mul_shoup(*ai, b, b_shoup));
    }

    /// Modular negation of a vector in place.
    pub fn neg_vec(&self, a: &mut [u64]) {
        a.iter_mut().for_each(|ai| *ai = self.neg(*ai));
    }

    /// Reduce a vector of u64 in place.
    pub fn reduce_vec(&self, a: &mut [u64]) {
        a.iter_mut().for_each(|ai| *ai = self.reduce(*ai));
    }

    /// Reduce a vector of i64 into a vector of u64.
    pub fn reduce_vec_i64(&self, a: &[i64]) -> Vec<u64> {
        a.iter().map(|ai| self.reduce_i64(*ai)).collect()
    }

    /// Sample a vector of uniform elements modulo p.
    pub fn random_vec<R: RngCore + CryptoRng>(&self, size: usize, rng: &mut R) -> Vec<u64> {
        rng.sample_iter(Uniform::from(0..self.p)).take(size).collect()
    }
}
