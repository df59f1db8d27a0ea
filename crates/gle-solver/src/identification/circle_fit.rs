//! Nyquist circle fitting.
//!
//! Near an isolated resonance the mobility (or receptance) traces an
//! approximate circle in the complex plane. The algebraic least-squares fit
//! minimises `Σ (x² + y² + D x + E y + F)²`, which gives the normal equations
//!
//! ```text
//! [Σx²  Σxy  Σx] [D]     [Σx(x²+y²)]
//! [Σxy  Σy²  Σy] [E] = - [Σy(x²+y²)]
//! [Σx   Σy   n ] [F]     [Σ(x²+y²) ]
//! ```
//!
//! with centre `(-D/2, -E/2)` and radius `sqrt(xc² + yc² - F)`. Points are
//! shifted to their centroid first, which keeps the system well scaled for
//! FRF values of any magnitude.
//!
//! The natural frequency is placed where the angle swept around the centre
//! per unit frequency is largest. Damping follows from pairs of points
//! below (a) and above (b) resonance:
//!
//! ```text
//! ζ = (ω_b² - ω_a²) / (2 ω_n (ω_a tan(θ_a/2) + ω_b tan(θ_b/2)))
//! ```
//!
//! where θ is the angle at the centre between the point and the resonance
//! point.

use std::f64::consts::PI;

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};
use crate::frf::Frf;

/// Relative size of `Sxx·Syy - Sxy²` below which points count as collinear
const COLLINEAR_TOL: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub xc: f64,
    pub yc: f64,
    pub radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleFit {
    pub circle: Circle,
    /// Root-mean-square radial residual
    pub rmse: f64,
}

/// Least-squares circle through `points`
///
/// # Errors
/// `SingularSystem` for fewer than three points, collinear points, or a
/// degenerate (imaginary) radius
pub fn fit_circle(points: &[(f64, f64)]) -> Result<CircleFit> {
    if points.len() < 3 {
        return Err(SolverError::SingularSystem(format!(
            "Circle fit needs at least 3 points, got {}",
            points.len()
        )));
    }
    let n = points.len() as f64;
    let (mx, my) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), (x, y)| (sx + x, sy + y));
    let (mx, my) = (mx / n, my / n);

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    let mut sx = 0.0;
    let mut sy = 0.0;
    let mut sxr = 0.0;
    let mut syr = 0.0;
    let mut sr = 0.0;
    for (x, y) in points {
        let (x, y) = (x - mx, y - my);
        let r2 = x * x + y * y;
        sxx += x * x;
        syy += y * y;
        sxy += x * y;
        sx += x;
        sy += y;
        sxr += x * r2;
        syr += y * r2;
        sr += r2;
    }

    if sxx * syy - sxy * sxy <= COLLINEAR_TOL * (sxx * syy).max(f64::MIN_POSITIVE) {
        return Err(SolverError::SingularSystem(
            "Circle fit points are collinear".to_string(),
        ));
    }

    let normal = Matrix3::new(sxx, sxy, sx, sxy, syy, sy, sx, sy, n);
    let rhs = -Vector3::new(sxr, syr, sr);
    let def = normal.lu().solve(&rhs).ok_or_else(|| {
        SolverError::SingularSystem("Circle fit normal equations are singular".to_string())
    })?;

    let xc = -def[0] / 2.0;
    let yc = -def[1] / 2.0;
    let r2 = xc * xc + yc * yc - def[2];
    if !(r2 > 0.0) {
        return Err(SolverError::SingularSystem(format!(
            "Circle fit gives non-positive squared radius {}",
            r2
        )));
    }
    let radius = r2.sqrt();

    let rmse = (points
        .iter()
        .map(|(x, y)| {
            let d = ((x - mx - xc).powi(2) + (y - my - yc).powi(2)).sqrt() - radius;
            d * d
        })
        .sum::<f64>()
        / n)
        .sqrt();

    Ok(CircleFit {
        circle: Circle {
            xc: xc + mx,
            yc: yc + my,
            radius,
        },
        rmse,
    })
}

/// Circle-fit cross-check of one resonance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NyquistEstimate {
    /// Frequency of maximum angular sweep rate [Hz]
    pub natural_frequency_hz: f64,
    /// Mean of the symmetric-pair estimates; `None` if no pair was usable
    pub damping_ratio: Option<f64>,
    pub fit: CircleFit,
    /// Number of FRF bins in the fitted window
    pub points: usize,
}

/// Fit the circle to bins `peak ± half_width` of `frf` and locate the resonance
///
/// # Errors
/// - `InsufficientData` if the window holds fewer than three bins
/// - `SingularSystem` from [`fit_circle`]
pub fn nyquist_estimate(frf: &Frf, peak: usize, half_width: usize) -> Result<NyquistEstimate> {
    if peak >= frf.len() {
        return Err(SolverError::InsufficientData(format!(
            "Peak index {} outside FRF of {} bins",
            peak,
            frf.len()
        )));
    }
    let start = peak.saturating_sub(half_width);
    let end = (peak + half_width).min(frf.len() - 1);
    if end - start + 1 < 3 {
        return Err(SolverError::InsufficientData(format!(
            "Circle window around {:.2} Hz holds {} bins",
            frf.frequencies_hz[peak],
            end - start + 1
        )));
    }

    let points: Vec<(f64, f64)> = frf.values[start..=end].iter().map(|h| (h.re, h.im)).collect();
    let fit = fit_circle(&points)?;
    let omegas: Vec<f64> = frf.frequencies_hz[start..=end]
        .iter()
        .map(|f| 2.0 * PI * f)
        .collect();

    let angles = unwrap(
        &points
            .iter()
            .map(|(x, y)| (y - fit.circle.yc).atan2(x - fit.circle.xc))
            .collect::<Vec<_>>(),
    );

    // Interval with the largest |dθ/dω|
    let k = (0..angles.len() - 1)
        .max_by(|&a, &b| {
            let rate = |i: usize| ((angles[i + 1] - angles[i]) / (omegas[i + 1] - omegas[i])).abs();
            rate(a).total_cmp(&rate(b))
        })
        .unwrap_or(0);
    let omega_n = 0.5 * (omegas[k] + omegas[k + 1]);
    let theta_n = 0.5 * (angles[k] + angles[k + 1]);

    let estimates: Vec<f64> = (0..=k)
        .rev()
        .zip(k + 1..angles.len())
        .filter_map(|(a, b)| {
            let theta_a = (angles[a] - theta_n).abs();
            let theta_b = (angles[b] - theta_n).abs();
            if !(theta_a > 0.0 && theta_a < PI && theta_b > 0.0 && theta_b < PI) {
                return None;
            }
            let (wa, wb) = (omegas[a], omegas[b]);
            let denom = 2.0 * omega_n * (wa * (theta_a / 2.0).tan() + wb * (theta_b / 2.0).tan());
            (denom > 0.0).then(|| (wb * wb - wa * wa) / denom)
        })
        .collect();
    let damping_ratio =
        (!estimates.is_empty()).then(|| estimates.iter().sum::<f64>() / estimates.len() as f64);

    Ok(NyquistEstimate {
        natural_frequency_hz: omega_n / (2.0 * PI),
        damping_ratio,
        fit,
        points: points.len(),
    })
}

/// Remove 2π jumps between consecutive angles
fn unwrap(angles: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(angles.len());
    let mut offset = 0.0;
    for (i, &a) in angles.iter().enumerate() {
        if i > 0 {
            let delta = a - angles[i - 1];
            if delta > PI {
                offset -= 2.0 * PI;
            } else if delta < -PI {
                offset += 2.0 * PI;
            }
        }
        out.push(a + offset);
    }
    out
}
