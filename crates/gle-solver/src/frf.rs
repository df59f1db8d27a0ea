//! Frequency response functions and their three representations.
//!
//! For a response measured as displacement X, velocity V or acceleration A
//! under force F:
//!
//! ```text
//! receptance  H_d = X/F
//! mobility    H_v = V/F = (iω)   H_d
//! inertance   H_a = A/F = (iω)^2 H_d = -ω² H_d
//! ```
//!
//! Inertance is the canonical representation (it is the raw ratio of the
//! measured acceleration to force); every other form is derived from it by
//! [`Frf::convert`]. Dividing by `iω` at ω = 0 is undefined: such bins are set
//! to `+∞ + 0i` and counted in the returned [`GuardReport`].

use std::f64::consts::PI;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, SolverError};

/// FRF representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrfKind {
    /// Displacement / force
    Receptance,
    /// Velocity / force
    Mobility,
    /// Acceleration / force
    Inertance,
}

impl FrfKind {
    /// Power of `iω` relating this representation to receptance
    pub fn order(&self) -> i32 {
        match self {
            FrfKind::Receptance => 0,
            FrfKind::Mobility => 1,
            FrfKind::Inertance => 2,
        }
    }
}

/// Numerical guards applied while forming or converting FRFs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardReport {
    /// Bins where a division by `iω` met ω = 0
    pub zero_frequency_bins: usize,
    /// Bins where the force spectrum magnitude fell below the guard threshold
    pub small_force_bins: usize,
}

impl GuardReport {
    pub fn merge(&mut self, other: GuardReport) {
        self.zero_frequency_bins += other.zero_frequency_bins;
        self.small_force_bins += other.small_force_bins;
    }

    pub fn total(&self) -> usize {
        self.zero_frequency_bins + self.small_force_bins
    }

    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }
}

/// Inclusive frequency band `[f_min, f_max]` in Hz; DC is never inside
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBand {
    pub f_min: f64,
    pub f_max: f64,
}

impl Default for FrequencyBand {
    fn default() -> Self {
        Self {
            f_min: 10.0,
            f_max: 1000.0,
        }
    }
}

impl FrequencyBand {
    /// # Errors
    /// `Configuration` unless `0 <= f_min < f_max`
    pub fn new(f_min: f64, f_max: f64) -> Result<Self> {
        if !(f_min >= 0.0 && f_min < f_max) {
            return Err(SolverError::Configuration(format!(
                "Invalid frequency band: lower cutoff {} Hz must be below upper cutoff {} Hz",
                f_min, f_max
            )));
        }
        Ok(Self { f_min, f_max })
    }

    pub fn contains(&self, f_hz: f64) -> bool {
        f_hz > 0.0 && f_hz >= self.f_min && f_hz <= self.f_max
    }

    /// Narrow the band to the positive frequencies present in `frf`
    ///
    /// # Errors
    /// `InsufficientData` if the band and the data do not overlap
    pub fn clip_to(&self, frf: &Frf) -> Result<FrequencyBand> {
        let lowest = frf.frequencies_hz.iter().copied().find(|&f| f > 0.0);
        let highest = frf.frequencies_hz.last().copied();
        let (Some(lowest), Some(highest)) = (lowest, highest) else {
            return Err(SolverError::InsufficientData(
                "FRF has no positive frequencies".to_string(),
            ));
        };
        let f_min = self.f_min.max(lowest);
        let f_max = self.f_max.min(highest);
        if f_min >= f_max {
            return Err(SolverError::InsufficientData(format!(
                "Band {}-{} Hz does not overlap data range {}-{} Hz",
                self.f_min, self.f_max, lowest, highest
            )));
        }
        Ok(Self { f_min, f_max })
    }
}

/// Bode representation: magnitude in dB and phase in radians
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bode {
    pub frequencies_hz: Vec<f64>,
    pub magnitude_db: Vec<f64>,
    pub phase_rad: Vec<f64>,
}

/// Complex FRF sampled on a non-negative, increasing frequency axis
#[derive(Debug, Clone, PartialEq)]
pub struct Frf {
    pub frequencies_hz: Vec<f64>,
    pub values: Vec<Complex64>,
    pub kind: FrfKind,
}

impl Frf {
    /// # Errors
    /// `Configuration` for mismatched lengths or a negative or
    /// non-increasing frequency axis
    pub fn new(frequencies_hz: Vec<f64>, values: Vec<Complex64>, kind: FrfKind) -> Result<Self> {
        if frequencies_hz.len() != values.len() {
            return Err(SolverError::Configuration(format!(
                "FRF has {} frequencies but {} values",
                frequencies_hz.len(),
                values.len()
            )));
        }
        if frequencies_hz.first().is_some_and(|f| *f < 0.0)
            || frequencies_hz.windows(2).any(|w| w[1] <= w[0])
        {
            return Err(SolverError::Configuration(
                "FRF frequencies must be non-negative and strictly increasing".to_string(),
            ));
        }
        Ok(Self {
            frequencies_hz,
            values,
            kind,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn angular_frequencies(&self) -> Vec<f64> {
        self.frequencies_hz.iter().map(|f| 2.0 * PI * f).collect()
    }

    /// Convert to another representation by multiplying with `(iω)^(p_to - p_from)`
    pub fn convert(&self, to: FrfKind) -> (Frf, GuardReport) {
        let exponent = to.order() - self.kind.order();
        let mut report = GuardReport::default();
        if exponent == 0 {
            return (self.clone(), report);
        }

        let values = self
            .frequencies_hz
            .iter()
            .zip(&self.values)
            .map(|(&f, &h)| {
                let factor = i_omega_pow(2.0 * PI * f, exponent.unsigned_abs());
                if exponent > 0 {
                    h * factor
                } else if f == 0.0 {
                    report.zero_frequency_bins += 1;
                    Complex64::new(f64::INFINITY, 0.0)
                } else {
                    h / factor
                }
            })
            .collect();

        if report.zero_frequency_bins > 0 {
            warn!(
                from = ?self.kind,
                to = ?to,
                bins = report.zero_frequency_bins,
                "FRF conversion undefined at 0 Hz; bins set to infinity"
            );
        }

        (
            Frf {
                frequencies_hz: self.frequencies_hz.clone(),
                values,
                kind: to,
            },
            report,
        )
    }

    /// Keep only the bins inside `band`
    pub fn restrict(&self, band: &FrequencyBand) -> Frf {
        let (frequencies_hz, values) = self
            .frequencies_hz
            .iter()
            .zip(&self.values)
            .filter(|(f, _)| band.contains(**f))
            .map(|(f, h)| (*f, *h))
            .unzip();
        Frf {
            frequencies_hz,
            values,
            kind: self.kind,
        }
    }

    pub fn magnitude(&self) -> Vec<f64> {
        self.values.iter().map(|h| h.norm()).collect()
    }

    /// `20·log10|H|`
    pub fn magnitude_db(&self) -> Vec<f64> {
        self.values.iter().map(|h| 20.0 * h.norm().log10()).collect()
    }

    /// Phase angle in radians, in `(-π, π]`
    pub fn phase(&self) -> Vec<f64> {
        self.values.iter().map(|h| h.arg()).collect()
    }

    pub fn bode(&self) -> Bode {
        Bode {
            frequencies_hz: self.frequencies_hz.clone(),
            magnitude_db: self.magnitude_db(),
            phase_rad: self.phase(),
        }
    }

    /// `(Re, Im)` pairs for a Nyquist plot
    pub fn nyquist(&self) -> Vec<(f64, f64)> {
        self.values.iter().map(|h| (h.re, h.im)).collect()
    }

    /// Index of the bin closest to `f_hz`
    pub fn nearest_index(&self, f_hz: f64) -> Option<usize> {
        if self.frequencies_hz.is_empty() {
            return None;
        }
        let upper = self.frequencies_hz.partition_point(|&f| f < f_hz);
        if upper == 0 {
            return Some(0);
        }
        if upper == self.frequencies_hz.len() {
            return Some(upper - 1);
        }
        let below = f_hz - self.frequencies_hz[upper - 1];
        let above = self.frequencies_hz[upper] - f_hz;
        Some(if below <= above { upper - 1 } else { upper })
    }

    /// Value at the bin closest to `f_hz`
    pub fn value_at(&self, f_hz: f64) -> Option<Complex64> {
        self.nearest_index(f_hz).map(|i| self.values[i])
    }

    /// Spacing of the first two bins
    pub fn resolution(&self) -> Option<f64> {
        match self.frequencies_hz.as_slice() {
            [f0, f1, ..] => Some(f1 - f0),
            _ => None,
        }
    }
}

/// `(iω)^k` without going through polar form
fn i_omega_pow(omega: f64, k: u32) -> Complex64 {
    match k % 4 {
        0 => Complex64::new(omega.powi(k as i32), 0.0),
        1 => Complex64::new(0.0, omega.powi(k as i32)),
        2 => Complex64::new(-omega.powi(k as i32), 0.0),
        _ => Complex64::new(0.0, -omega.powi(k as i32)),
    }
}
