//! Half-power bandwidth damping estimate.
//!
//! From the peak at `f_n` the magnitude is followed outwards on both sides
//! until it first drops to `peak - 3 dB`. The crossing frequencies `f1 < f_n <
//! f2` are interpolated linearly (in dB) between the bracketing samples and
//!
//! ```text
//! ζ = (f2 - f1) / (2 f_n)
//! ```

use serde::{Deserialize, Serialize};

use crate::frf::Frf;

/// Drop below the peak magnitude that defines the half-power points
pub const HALF_POWER_DB: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HalfPowerEstimate {
    /// Lower half-power frequency [Hz]
    pub f1: f64,
    /// Upper half-power frequency [Hz]
    pub f2: f64,
    /// Peak frequency [Hz]
    pub natural_frequency_hz: f64,
    pub damping_ratio: f64,
    pub peak_db: f64,
}

impl HalfPowerEstimate {
    pub fn bandwidth_hz(&self) -> f64 {
        self.f2 - self.f1
    }
}

/// Half-power estimate around bin `peak` of `frf`
///
/// Returns `None` if either side never reaches the half-power level inside
/// the data, or if `peak` is out of range.
pub fn half_power(frf: &Frf, peak: usize) -> Option<HalfPowerEstimate> {
    let db = frf.magnitude_db();
    let f = &frf.frequencies_hz;
    let peak_db = *db.get(peak)?;
    let level = peak_db - HALF_POWER_DB;

    let left = (0..peak).rev().find(|&i| db[i] <= level)?;
    let right = (peak + 1..db.len()).find(|&i| db[i] <= level)?;

    let f1 = crossing(f[left], db[left], f[left + 1], db[left + 1], level);
    let f2 = crossing(f[right - 1], db[right - 1], f[right], db[right], level);
    let natural_frequency_hz = f[peak];

    Some(HalfPowerEstimate {
        f1,
        f2,
        natural_frequency_hz,
        damping_ratio: (f2 - f1) / (2.0 * natural_frequency_hz),
        peak_db,
    })
}

fn crossing(fa: f64, da: f64, fb: f64, db: f64, level: f64) -> f64 {
    if da == db {
        return fa;
    }
    fa + (level - da) / (db - da) * (fb - fa)
}
