//! JSON configuration documents.
//!
//! Two documents are read: the identification request
//! ([`IdentificationConfig`], camelCase keys) and the simulation
//! specification ([`SimulationSpec`]) consumed by `gle-cli simulate`. Both are
//! validated on load so that downstream code only sees consistent values.

use std::fs;
use std::path::Path;

use gle_solver::model::DOFS_PER_NODE;
use gle_solver::{
    BeamModel, BoundaryConditions, DampingTargets, Excitation, Forcing, IdentificationConfig,
    IntegratorConfig, ModalOptions, SolverError,
};
use nalgebra::DVector;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Support condition presets of the test rig
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Supports {
    #[default]
    FreeFree,
    SimplySupported,
    Cantilever,
}

impl Supports {
    pub fn boundary_conditions(&self, num_nodes: usize) -> BoundaryConditions {
        match self {
            Supports::FreeFree => BoundaryConditions::free_free(),
            Supports::SimplySupported => BoundaryConditions::simply_supported(num_nodes),
            Supports::Cantilever => BoundaryConditions::cantilever(),
        }
    }
}

/// Transverse load at one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSpec {
    /// Node (accelerometer location) receiving the load
    pub location: usize,
    #[serde(default = "unit_amplitude")]
    pub amplitude: f64,
    pub excitation: Excitation,
}

fn unit_amplitude() -> f64 {
    1.0
}

/// Virtual-rig run: beam, supports, damping, load and sampling
///
/// ```json
/// {
///   "beam": {
///     "length": 0.65,
///     "num_elements": 4,
///     "section": { "area": 3e-4, "second_moment": 2.5e-9 },
///     "material": { "name": "STEEL", "elastic_modulus": 2e11, "density": 7850 }
///   },
///   "supports": "free_free",
///   "damping": { "zeta1": 0.02, "zeta2": 0.02 },
///   "forcing": { "location": 0, "excitation": { "type": "impulse", "duration": 0.0005 } },
///   "duration": 10,
///   "samplingFreq": 10000
/// }
/// ```
///
/// An optional `initialState` starts the run from a non-rest state: interleaved
/// `[v, u]` per global DOF, `2 * num_dofs` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSpec {
    pub beam: BeamModel,
    #[serde(default)]
    pub supports: Supports,
    #[serde(default)]
    pub damping: DampingTargets,
    pub forcing: LoadSpec,
    /// Simulated time [s]
    pub duration: f64,
    /// Output sampling frequency [Hz]
    pub sampling_freq: f64,
    #[serde(default)]
    pub integrator: IntegratorConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_state: Option<Vec<f64>>,
}

impl SimulationSpec {
    pub fn validate(&self) -> Result<()> {
        self.beam.validate()?;
        self.forcing.excitation.validate()?;
        self.integrator.validate()?;
        if self.forcing.location >= self.beam.num_nodes() {
            return Err(SolverError::Configuration(format!(
                "Forcing location {} outside a beam of {} nodes",
                self.forcing.location,
                self.beam.num_nodes()
            ))
            .into());
        }
        for (name, value) in [("duration", self.duration), ("samplingFreq", self.sampling_freq)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(
                    SolverError::Configuration(format!("{} must be positive, got {}", name, value))
                        .into(),
                );
            }
        }
        if let Some(state) = &self.initial_state {
            let expected = 2 * self.beam.num_dofs();
            if state.len() != expected {
                return Err(SolverError::Configuration(format!(
                    "initialState has {} entries, expected {}",
                    state.len(),
                    expected
                ))
                .into());
            }
            if let Some(value) = state.iter().find(|v| !v.is_finite()) {
                return Err(SolverError::Configuration(format!(
                    "initialState entries must be finite, got {}",
                    value
                ))
                .into());
            }
        }
        Ok(())
    }

    /// Initial state in the layout taken by `DynamicSolver::solve`
    pub fn initial_state_vector(&self) -> Option<DVector<f64>> {
        self.initial_state.as_deref().map(DVector::from_column_slice)
    }

    pub fn boundary_conditions(&self) -> BoundaryConditions {
        self.supports.boundary_conditions(self.beam.num_nodes())
    }

    pub fn modal_options(&self) -> ModalOptions {
        ModalOptions {
            policy: None,
            damping: self.damping,
        }
    }

    /// Load on the transverse DOF of the forcing location
    pub fn forcing(&self) -> Forcing {
        Forcing::new(
            self.forcing.location * DOFS_PER_NODE,
            self.forcing.amplitude,
            self.forcing.excitation.clone(),
        )
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path)?;
    let value = serde_json::from_slice(&bytes)?;
    debug!(path = %path.display(), "loaded JSON document");
    Ok(value)
}

/// Load and validate an identification request
pub fn load_identification_config(path: impl AsRef<Path>) -> Result<IdentificationConfig> {
    let config: IdentificationConfig = load_json(path.as_ref())?;
    config.validate()?;
    Ok(config)
}

/// Load and validate a simulation specification
pub fn load_simulation_spec(path: impl AsRef<Path>) -> Result<SimulationSpec> {
    let spec: SimulationSpec = load_json(path.as_ref())?;
    spec.validate()?;
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IoError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(content.as_bytes()).expect("write temp file");
        file
    }

    const SPEC: &str = r#"{
        "beam": {
            "length": 0.65,
            "num_elements": 4,
            "section": { "area": 3e-4, "second_moment": 2.5e-9 },
            "material": { "name": "STEEL", "elastic_modulus": 2e11, "density": 7850 }
        },
        "supports": "cantilever",
        "forcing": { "location": 4, "excitation": { "type": "sine", "frequency_hz": 50 } },
        "duration": 0.5,
        "samplingFreq": 2000
    }"#;

    #[test]
    fn loads_simulation_spec_with_defaults() {
        let file = write_temp(SPEC);
        let spec = load_simulation_spec(file.path()).unwrap();
        assert_eq!(spec.supports, Supports::Cantilever);
        assert_eq!(spec.damping, DampingTargets::default());
        assert_eq!(spec.integrator, IntegratorConfig::default());
        assert_eq!(spec.forcing.amplitude, 1.0);

        let forcing = spec.forcing();
        assert_eq!(forcing.dof, 8);
        assert_eq!(forcing.excitation, Excitation::Sine { frequency_hz: 50.0 });
        assert!(!spec.boundary_conditions().is_free_free());
    }

    #[test]
    fn rejects_out_of_range_location() {
        let file = write_temp(&SPEC.replace("\"location\": 4", "\"location\": 5"));
        assert!(matches!(
            load_simulation_spec(file.path()),
            Err(IoError::Solver(SolverError::Configuration(_)))
        ));
    }

    #[test]
    fn loads_initial_state() {
        // 5 nodes x 2 DOFs, tip displaced by 1 mm
        let mut state = vec![0.0; 20];
        state[17] = 1e-3;
        let json = SPEC.replace(
            "\"samplingFreq\": 2000",
            &format!("\"samplingFreq\": 2000, \"initialState\": {:?}", state),
        );
        let file = write_temp(&json);
        let spec = load_simulation_spec(file.path()).unwrap();
        let z0 = spec.initial_state_vector().unwrap();
        assert_eq!(z0.len(), 20);
        assert_eq!(z0[17], 1e-3);
        let at_rest = load_simulation_spec(write_temp(SPEC).path()).unwrap();
        assert!(at_rest.initial_state_vector().is_none());
    }

    #[test]
    fn rejects_initial_state_of_wrong_length() {
        let json = SPEC.replace(
            "\"samplingFreq\": 2000",
            "\"samplingFreq\": 2000, \"initialState\": [0.0, 0.0, 1.0]",
        );
        let file = write_temp(&json);
        assert!(matches!(
            load_simulation_spec(file.path()),
            Err(IoError::Solver(SolverError::Configuration(_)))
        ));
    }

    #[test]
    fn loads_identification_request() {
        let file = write_temp(
            r#"{ "accelerometers": { "A0": true, "A1": true, "A2": false },
                 "samplingFreq": 400, "shakerPosition": 1, "upperCutoff": 150 }"#,
        );
        let config = load_identification_config(file.path()).unwrap();
        assert_eq!(config.sampling_freq, Some(400.0));
        assert_eq!(config.shaker_position, 1);
        assert_eq!(config.upper_cutoff, 150.0);
        assert_eq!(config.lower_cutoff, 10.0);
        assert_eq!(config.active_channels().unwrap().len(), 2);
    }

    #[test]
    fn invalid_band_fails_validation() {
        let file = write_temp(r#"{ "lowerCutoff": 500, "upperCutoff": 100 }"#);
        assert!(matches!(
            load_identification_config(file.path()),
            Err(IoError::Solver(SolverError::Configuration(_)))
        ));
    }

    #[test]
    fn malformed_json_is_reported() {
        let file = write_temp("{ \"lowerCutoff\": ");
        assert!(matches!(
            load_identification_config(file.path()),
            Err(IoError::Json(_))
        ));
    }
}
