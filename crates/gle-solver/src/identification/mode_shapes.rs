//! Real mode shapes from receptance values at a resonance.
//!
//! Each channel contributes its magnitude with a sign taken from its phase
//! relative to the reference channel: within ±π/2 of the reference phase
//! the sign is +1, otherwise −1. The vector is scaled so its largest
//! magnitude is exactly 1.
//!
//! This sign-by-quadrant rule treats the modes as real (proportionally
//! damped). For structures with strongly non-proportional damping the
//! discarded phase information can matter; the complex receptances remain
//! available to callers through the identification result.

use std::f64::consts::PI;

use num_complex::Complex64;

use crate::error::{Result, SolverError};

/// Signed, max-normalised mode shape
///
/// # Errors
/// - `Configuration` if `reference` is out of range
/// - `InsufficientData` if every value is zero
pub fn mode_shape(receptances: &[Complex64], reference: usize) -> Result<Vec<f64>> {
    let reference_phase = receptances
        .get(reference)
        .ok_or_else(|| {
            SolverError::Configuration(format!(
                "Reference channel {} outside {} channels",
                reference,
                receptances.len()
            ))
        })?
        .arg();

    let signed: Vec<f64> = receptances
        .iter()
        .map(|h| {
            let sign = if wrap_phase(h.arg() - reference_phase).abs() < PI / 2.0 {
                1.0
            } else {
                -1.0
            };
            sign * h.norm()
        })
        .collect();

    let max = signed.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if max == 0.0 || !max.is_finite() {
        return Err(SolverError::InsufficientData(
            "No channel has a finite, non-zero response at the resonance".to_string(),
        ));
    }
    Ok(signed.into_iter().map(|v| v / max).collect())
}

/// Wrap an angle into `(-π, π]`
fn wrap_phase(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped == -PI { PI } else { wrapped }
}
