//! Beam model definition: a chain of identical collinear beam elements.

use serde::{Deserialize, Serialize};

use crate::elements::{BeamSection, EulerBernoulliBeam};
use crate::error::{Result, SolverError};
use crate::materials::Material;

/// Degrees of freedom per node of the planar bending model (w, θ)
pub const DOFS_PER_NODE: usize = 2;

/// Uniform Euler-Bernoulli beam of total length `length` split into
/// `num_elements` identical elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamModel {
    /// Total beam length [m]
    pub length: f64,
    /// Number of elements in the chain (at least 2)
    pub num_elements: usize,
    pub section: BeamSection,
    pub material: Material,
}

impl BeamModel {
    pub fn new(length: f64, num_elements: usize, section: BeamSection, material: Material) -> Self {
        Self {
            length,
            num_elements,
            section,
            material,
        }
    }

    /// Check geometry, element count and material constants
    pub fn validate(&self) -> Result<()> {
        if self.num_elements < 2 {
            return Err(SolverError::Configuration(format!(
                "Beam model needs at least 2 elements, got {}",
                self.num_elements
            )));
        }
        if !(self.length.is_finite() && self.length > 0.0) {
            return Err(SolverError::Configuration(format!(
                "Beam length must be positive, got {}",
                self.length
            )));
        }
        self.section.validate()?;
        self.material.validate()
    }

    pub fn num_nodes(&self) -> usize {
        self.num_elements + 1
    }

    pub fn num_dofs(&self) -> usize {
        DOFS_PER_NODE * self.num_nodes()
    }

    pub fn element_length(&self) -> f64 {
        self.length / self.num_elements as f64
    }

    /// The element shared by every position in the chain
    pub fn element(&self) -> EulerBernoulliBeam {
        EulerBernoulliBeam::new(self.element_length(), self.section)
    }

    /// Axial coordinate of every node, `x_i = i·L_e`
    pub fn node_positions(&self) -> Vec<f64> {
        let le = self.element_length();
        (0..self.num_nodes()).map(|i| i as f64 * le).collect()
    }

    /// Total mass ρAL [kg]
    pub fn total_mass(&self) -> f64 {
        self.material.density * self.section.area * self.length
    }
}
