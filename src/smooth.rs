//! Smooth tune decision
//!
//! Inside a small window around the last fully programmed frequency the Si570
//! accepts a new RFREQ without freezing the DCO, so the output doesn't glitch.

use crate::frequency::{Frequency, Ppm};

/// 1_000_000 / 65536 = 15.258..., truncated.
/// The resulting 1.7% error is accepted, deployed tuning windows rely on it.
const HZ_SCALE: u64 = 15;

/// True if moving from `current` to `requested` fits in the `tolerance` window
/// and only RFREQ needs to be rewritten.
///
/// A zero tolerance disables smooth tuning.
pub fn is_small_change(current: Frequency, requested: Frequency, tolerance: Ppm) -> bool {
    if tolerance.is_disabled() {
        return false;
    }

    let delta = u64::from(current.abs_diff(requested)) * HZ_SCALE;
    let max_delta = u64::from(current.whole_mhz()) * u64::from(tolerance.0);

    delta <= max_delta
}
