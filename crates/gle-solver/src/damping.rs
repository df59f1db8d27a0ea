//! Rayleigh (proportional) damping.
//!
//! C = α·M + β·K, which gives mode `i` the damping ratio
//!
//! ```text
//! ζ_i = (α/ω_i + β·ω_i) / 2
//! ```
//!
//! Two target ratios at two modal frequencies fix α and β through the 2×2
//! system
//!
//! ```text
//! [ 1/ω1  ω1 ] [α]     [ζ1]
//! [ 1/ω2  ω2 ] [β] = 2 [ζ2]
//! ```

use nalgebra::{DMatrix, Matrix2, Vector2};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};

/// Mass- and stiffness-proportional damping coefficients
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RayleighDamping {
    /// Mass-proportional coefficient α [1/s]
    pub alpha: f64,
    /// Stiffness-proportional coefficient β [s]
    pub beta: f64,
}

impl RayleighDamping {
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }

    /// Undamped system
    pub fn none() -> Self {
        Self::default()
    }

    /// Coefficients that give damping ratios `zeta1`, `zeta2` at angular
    /// frequencies `omega1`, `omega2` [rad/s]
    ///
    /// # Errors
    /// - `SingularSystem` if `omega1 == omega2`
    /// - `Configuration` if either frequency is not positive
    pub fn from_modal(omega1: f64, omega2: f64, zeta1: f64, zeta2: f64) -> Result<Self> {
        if !(omega1 > 0.0 && omega2 > 0.0) {
            return Err(SolverError::Configuration(format!(
                "Rayleigh damping needs positive frequencies, got {} and {} rad/s",
                omega1, omega2
            )));
        }
        if (omega1 - omega2).abs() <= f64::EPSILON * omega1.max(omega2) {
            return Err(SolverError::SingularSystem(format!(
                "Rayleigh damping is undetermined for coincident frequencies ({} rad/s)",
                omega1
            )));
        }

        let a = Matrix2::new(1.0 / omega1, omega1, 1.0 / omega2, omega2);
        let rhs = Vector2::new(2.0 * zeta1, 2.0 * zeta2);
        let coeffs = a.lu().solve(&rhs).ok_or_else(|| {
            SolverError::SingularSystem("Rayleigh damping system could not be solved".to_string())
        })?;

        Ok(Self {
            alpha: coeffs[0],
            beta: coeffs[1],
        })
    }

    /// Damping ratio this damping gives a mode at `omega` [rad/s]
    pub fn damping_ratio_at(&self, omega: f64) -> f64 {
        (self.alpha / omega + self.beta * omega) / 2.0
    }

    /// Damping matrix C = αM + βK
    pub fn damping_matrix(&self, mass: &DMatrix<f64>, stiffness: &DMatrix<f64>) -> DMatrix<f64> {
        mass * self.alpha + stiffness * self.beta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn recovers_target_ratios() {
        let (w1, w2) = (2.0 * std::f64::consts::PI * 120.0, 2.0 * std::f64::consts::PI * 340.0);
        let damping = RayleighDamping::from_modal(w1, w2, 0.02, 0.03).unwrap();
        assert_relative_eq!(damping.damping_ratio_at(w1), 0.02, epsilon = 1e-12);
        assert_relative_eq!(damping.damping_ratio_at(w2), 0.03, epsilon = 1e-12);
    }

    #[test]
    fn equal_ratios_give_positive_coefficients() {
        let damping = RayleighDamping::from_modal(100.0, 1000.0, 0.05, 0.05).unwrap();
        assert!(damping.alpha > 0.0);
        assert!(damping.beta > 0.0);
    }

    #[test]
    fn coincident_frequencies_are_singular() {
        assert!(matches!(
            RayleighDamping::from_modal(500.0, 500.0, 0.02, 0.02),
            Err(SolverError::SingularSystem(_))
        ));
    }

    #[test]
    fn rejects_zero_frequency() {
        assert!(matches!(
            RayleighDamping::from_modal(0.0, 500.0, 0.02, 0.02),
            Err(SolverError::Configuration(_))
        ));
    }

    #[test]
    fn builds_damping_matrix() {
        let m = DMatrix::<f64>::identity(2, 2);
        let k = DMatrix::from_row_slice(2, 2, &[2.0, -1.0, -1.0, 2.0]);
        let c = RayleighDamping::new(0.5, 0.1).damping_matrix(&m, &k);
        assert_relative_eq!(c[(0, 0)], 0.7);
        assert_relative_eq!(c[(0, 1)], -0.1);
    }
}
