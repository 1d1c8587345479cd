//! Cyclic rotation of the slots of a batch of ciphertexts.

use crate::bgv::{keys::RotationKeySet, Ciphertext};
use crate::{Error, Result};
use ndarray::ArrayD;
use rayon::prelude::*;
use tracing::{debug, instrument};

/// Rotates both rows of slots of every ciphertext in `batch` by `shift`
/// positions.
///
/// A positive shift moves the value in slot `j` to slot `j + shift`, within
/// each row of `N / 2` slots; a negative shift moves it the other way. The
/// magnitude of the shift must be smaller than `N / 2`, and a zero shift
/// returns copies of the input.
#[instrument(skip(keys, batch), fields(batch_len = batch.len(), level = keys.level()))]
pub fn roll(keys: &RotationKeySet, batch: &[Ciphertext], shift: i64) -> Result<Vec<Ciphertext>> {
    let first = batch.first().ok_or(Error::EmptyBatch)?;
    let row_size = (1usize << first.log_n()) >> 1;
    let out_of_bounds = || Error::ShiftOutOfBounds {
        shift,
        bound: row_size,
    };
    // The keys rotate to the left, so a rotation to the right is the inverse.
    let left = shift.checked_neg().ok_or_else(out_of_bounds)?;
    let magnitude = usize::try_from(left.unsigned_abs()).map_err(|_| out_of_bounds())?;
    if magnitude >= row_size {
        return Err(out_of_bounds());
    }
    let left = if left < 0 {
        row_size - magnitude
    } else {
        magnitude
    };

    if left == 0 {
        debug!("identity rotation");
        return Ok(batch.to_vec());
    }

    let pk = keys.lookup(left)?;
    batch
        .par_iter()
        .map(|ct| pk.key.apply_to(&ct.substitute(pk.power)?))
        .collect()
}

/// Rotates every ciphertext of an array, keeping the shape of the array.
pub fn roll_array(
    keys: &RotationKeySet,
    batch: &ArrayD<Ciphertext>,
    shift: i64,
) -> Result<ArrayD<Ciphertext>> {
    let cts = batch.iter().cloned().collect::<Vec<_>>();
    let rotated = roll(keys, &cts, shift)?;
    ArrayD::from_shape_vec(batch.raw_dim(), rotated)
        .map_err(|e| Error::DefaultError(e.to_string()))
}
