//! Analytic single-degree-of-freedom oscillator m·ẍ + c·ẋ + k·x = f.
//!
//! Used to synthesise reference FRFs with a known natural frequency and
//! damping ratio.

use std::f64::consts::PI;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sdof {
    pub mass: f64,
    pub stiffness: f64,
    pub damping: f64,
}

impl Sdof {
    pub fn new(mass: f64, stiffness: f64, damping: f64) -> Result<Self> {
        if !(mass > 0.0 && stiffness > 0.0 && damping >= 0.0) {
            return Err(SolverError::Configuration(format!(
                "SDOF needs m > 0, k > 0, c >= 0 (got m = {}, k = {}, c = {})",
                mass, stiffness, damping
            )));
        }
        Ok(Self {
            mass,
            stiffness,
            damping,
        })
    }

    /// Oscillator with natural frequency `natural_frequency_hz` and damping ratio `zeta`
    pub fn from_modal(natural_frequency_hz: f64, zeta: f64, mass: f64) -> Result<Self> {
        let omega = 2.0 * PI * natural_frequency_hz;
        Self::new(mass, mass * omega * omega, 2.0 * zeta * mass * omega)
    }

    pub fn natural_frequency_hz(&self) -> f64 {
        (self.stiffness / self.mass).sqrt() / (2.0 * PI)
    }

    pub fn damping_ratio(&self) -> f64 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }

    /// X/F at angular frequency `omega`
    pub fn receptance(&self, omega: f64) -> Complex64 {
        Complex64::new(1.0, 0.0)
            / Complex64::new(self.stiffness - omega * omega * self.mass, omega * self.damping)
    }

    /// V/F = iω·X/F
    pub fn mobility(&self, omega: f64) -> Complex64 {
        Complex64::new(0.0, omega) * self.receptance(omega)
    }

    /// A/F = -ω²·X/F
    pub fn inertance(&self, omega: f64) -> Complex64 {
        -omega * omega * self.receptance(omega)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn modal_parameters_round_trip() {
        let sdof = Sdof::from_modal(100.0, 0.02, 1.5).unwrap();
        assert_relative_eq!(sdof.natural_frequency_hz(), 100.0, epsilon = 1e-10);
        assert_relative_eq!(sdof.damping_ratio(), 0.02, epsilon = 1e-12);
    }

    #[test]
    fn resonance_is_quadrature() {
        let sdof = Sdof::from_modal(100.0, 0.02, 1.0).unwrap();
        let omega = 2.0 * PI * 100.0;
        let h = sdof.receptance(omega);
        assert!(h.re.abs() < 1e-12 * h.norm());
        assert_relative_eq!(h.norm(), 1.0 / (omega * sdof.damping), max_relative = 1e-12);
        // Mobility is real and positive at resonance
        let v = sdof.mobility(omega);
        assert_relative_eq!(v.re, 1.0 / sdof.damping, max_relative = 1e-12);
    }

    #[test]
    fn rejects_non_physical_parameters() {
        assert!(Sdof::new(0.0, 1.0, 0.0).is_err());
        assert!(Sdof::new(1.0, 1.0, -0.1).is_err());
    }
}
