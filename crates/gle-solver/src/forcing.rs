//! Excitation signals for time-domain simulation.
//!
//! Piecewise signals are right-closed: at a switching time `t_s` the value
//! is the one of the piece ending at `t_s`. The integrator never steps over
//! a breakpoint, so every step sees a single smooth piece.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};

/// Scalar excitation signal g(t)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Excitation {
    /// Rectangular pulse of unit area: g = 1/duration on [0, duration]
    Impulse { duration: f64 },
    /// Unit step applied at t = 0
    Step,
    /// Continuous sine
    Sine { frequency_hz: f64 },
    /// Linear chirp sin(2π (f_start + rate·t) t) on [0, duration], then zero
    SineSweep {
        start_hz: f64,
        end_hz: f64,
        duration: f64,
    },
    /// `steps` equally spaced frequencies, each held for `periods` whole periods
    SteppedSweep {
        start_hz: f64,
        end_hz: f64,
        steps: usize,
        periods: f64,
    },
}

impl Excitation {
    /// Check signal parameters
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, v: f64| -> Result<()> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(SolverError::Configuration(format!(
                    "Excitation {} must be positive, got {}",
                    name, v
                )))
            }
        };
        match self {
            Excitation::Impulse { duration } => positive("duration", *duration),
            Excitation::Step => Ok(()),
            Excitation::Sine { frequency_hz } => positive("frequency", *frequency_hz),
            Excitation::SineSweep {
                start_hz,
                end_hz,
                duration,
            } => {
                positive("start frequency", *start_hz)?;
                positive("end frequency", *end_hz)?;
                positive("duration", *duration)
            }
            Excitation::SteppedSweep {
                start_hz,
                end_hz,
                steps,
                periods,
            } => {
                positive("start frequency", *start_hz)?;
                positive("end frequency", *end_hz)?;
                positive("periods", *periods)?;
                if *steps == 0 {
                    return Err(SolverError::Configuration(
                        "Stepped sweep needs at least one step".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Signal value at time `t` (zero before t = 0)
    pub fn value(&self, t: f64) -> f64 {
        if t < 0.0 {
            return 0.0;
        }
        match self {
            Excitation::Impulse { duration } => {
                if t <= *duration {
                    1.0 / duration
                } else {
                    0.0
                }
            }
            Excitation::Step => 1.0,
            Excitation::Sine { frequency_hz } => (2.0 * PI * frequency_hz * t).sin(),
            Excitation::SineSweep {
                start_hz,
                end_hz,
                duration,
            } => {
                if t > *duration {
                    return 0.0;
                }
                let rate = (end_hz - start_hz) / duration;
                (2.0 * PI * (start_hz + rate * t) * t).sin()
            }
            Excitation::SteppedSweep { .. } => {
                let mut start = 0.0;
                for freq in self.stepped_frequencies() {
                    let end = start + self.segment_length(freq);
                    if t <= end {
                        return (2.0 * PI * freq * (t - start)).sin();
                    }
                    start = end;
                }
                0.0
            }
        }
    }

    /// Times in `(0, t_end)` where the signal or its slope jumps
    pub fn breakpoints(&self, t_end: f64) -> Vec<f64> {
        let points = match self {
            Excitation::Impulse { duration } => vec![*duration],
            Excitation::Step | Excitation::Sine { .. } => Vec::new(),
            Excitation::SineSweep { duration, .. } => vec![*duration],
            Excitation::SteppedSweep { .. } => {
                let mut t = 0.0;
                self.stepped_frequencies()
                    .into_iter()
                    .map(|freq| {
                        t += self.segment_length(freq);
                        t
                    })
                    .collect()
            }
        };
        points.into_iter().filter(|&t| t > 0.0 && t < t_end).collect()
    }

    /// Time after which the signal is identically zero, if any
    pub fn active_duration(&self) -> Option<f64> {
        match self {
            Excitation::Impulse { duration } | Excitation::SineSweep { duration, .. } => Some(*duration),
            Excitation::Step | Excitation::Sine { .. } => None,
            Excitation::SteppedSweep { .. } => Some(
                self.stepped_frequencies()
                    .into_iter()
                    .map(|f| self.segment_length(f))
                    .sum(),
            ),
        }
    }

    fn stepped_frequencies(&self) -> Vec<f64> {
        match self {
            Excitation::SteppedSweep {
                start_hz,
                end_hz,
                steps,
                ..
            } => {
                if *steps == 1 {
                    return vec![*start_hz];
                }
                let df = (end_hz - start_hz) / (*steps - 1) as f64;
                (0..*steps).map(|k| start_hz + df * k as f64).collect()
            }
            _ => Vec::new(),
        }
    }

    fn segment_length(&self, freq: f64) -> f64 {
        match self {
            Excitation::SteppedSweep { periods, .. } => periods / freq,
            _ => 0.0,
        }
    }
}

/// A scaled excitation applied at one global DOF
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forcing {
    /// Global DOF index receiving the load
    pub dof: usize,
    pub amplitude: f64,
    pub excitation: Excitation,
}

impl Forcing {
    pub fn new(dof: usize, amplitude: f64, excitation: Excitation) -> Self {
        Self {
            dof,
            amplitude,
            excitation,
        }
    }

    /// Applied force at time `t`
    pub fn force(&self, t: f64) -> f64 {
        self.amplitude * self.excitation.value(t)
    }
}
