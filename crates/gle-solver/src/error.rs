//! Error types for gle-solver

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SolverError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Invalid geometry, element count, cutoff ordering or channel setup.
    /// Fatal: surfaced immediately, retrying with the same input cannot succeed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Degenerate linear system (Rayleigh coefficients, circle fit, FRF solve).
    #[error("Singular system: {0}")]
    SingularSystem(String),

    /// No peak satisfied the picking criteria inside the frequency band.
    /// Recoverable: widen the band or relax prominence/distance.
    #[error("No resonance found between {f_min:.2} Hz and {f_max:.2} Hz")]
    NoResonanceFound { f_min: f64, f_max: f64 },

    /// Too few channels or samples to form the requested result.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Time integration could not reach the end time (step-size underflow
    /// or step-count ceiling).
    #[error("Integration failed: {0}")]
    Integration(String),
}

impl SolverError {
    /// Whether the caller may retry with relaxed inputs.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SolverError::NoResonanceFound { .. } | SolverError::InsufficientData(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_variants() {
        assert!(
            SolverError::NoResonanceFound {
                f_min: 10.0,
                f_max: 100.0
            }
            .is_recoverable()
        );
        assert!(SolverError::InsufficientData("one channel".into()).is_recoverable());
        assert!(!SolverError::Configuration("n < 2".into()).is_recoverable());
        assert!(!SolverError::SingularSystem("w1 == w2".into()).is_recoverable());
        assert!(!SolverError::Integration("step underflow".into()).is_recoverable());
    }

    #[test]
    fn messages_name_the_band() {
        let err = SolverError::NoResonanceFound {
            f_min: 10.0,
            f_max: 1000.0,
        };
        assert_eq!(
            err.to_string(),
            "No resonance found between 10.00 Hz and 1000.00 Hz"
        );
    }
}
