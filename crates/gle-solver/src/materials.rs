//! Material properties for beam analysis.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};

/// A linear elastic isotropic material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Material name
    pub name: String,
    /// Young's modulus (E) [Pa]
    pub elastic_modulus: f64,
    /// Density (ρ) [kg/m³]
    pub density: f64,
}

impl Material {
    /// Create a new material
    pub fn new(name: impl Into<String>, elastic_modulus: f64, density: f64) -> Self {
        Self {
            name: name.into(),
            elastic_modulus,
            density,
        }
    }

    /// Structural steel (E = 200 GPa, ρ = 7850 kg/m³)
    pub fn steel() -> Self {
        Self::new("STEEL", 200e9, 7850.0)
    }

    /// Aluminium alloy (E = 69 GPa, ρ = 2700 kg/m³)
    pub fn aluminium() -> Self {
        Self::new("ALUMINIUM", 69e9, 2700.0)
    }

    /// Check that both constants are finite and positive
    pub fn validate(&self) -> Result<()> {
        if !(self.elastic_modulus.is_finite() && self.elastic_modulus > 0.0) {
            return Err(SolverError::Configuration(format!(
                "Material '{}' has invalid elastic modulus {}",
                self.name, self.elastic_modulus
            )));
        }
        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(SolverError::Configuration(format!(
                "Material '{}' has invalid density {}",
                self.name, self.density
            )));
        }
        Ok(())
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::steel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        assert!(Material::steel().validate().is_ok());
        assert!(Material::aluminium().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_density() {
        let mut mat = Material::steel();
        mat.density = 0.0;
        assert!(matches!(
            mat.validate(),
            Err(SolverError::Configuration(_))
        ));
    }

    #[test]
    fn rejects_nan_modulus() {
        let mat = Material::new("BAD", f64::NAN, 1000.0);
        assert!(mat.validate().is_err());
    }
}
