//! Non-zero random integers
//!
//! Positions, velocities and initial placement all draw from here. Zero is
//! excluded so no ball ever starts with a stalled velocity component.

use rand::Rng;

use crate::error::{Result, SimError};

/// Uniform integer in `[ceil(min), floor(max)]`, resampled until non-zero.
///
/// Fails with `DegenerateRange` when the range is empty or holds only zero,
/// instead of looping forever.
pub fn random_non_zero_int<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> Result<i32> {
    let lo = min.ceil();
    let hi = max.floor();
    if !lo.is_finite() || !hi.is_finite() || lo > hi || (lo == 0.0 && hi == 0.0) {
        return Err(SimError::DegenerateRange { min, max });
    }
    let (lo, hi) = (lo as i32, hi as i32);

    loop {
        let value = rng.random_range(lo..=hi);
        if value != 0 {
            return Ok(value);
        }
    }
}
