//! Planar Euler-Bernoulli beam element for the gle beam model
//!
//! Each node has 2 degrees of freedom:
//! - transverse displacement (w)
//! - rotation about the bending axis (θ)
//!
//! Interpolation uses cubic Hermite shape functions, giving the classical
//! closed-form consistent mass and stiffness matrices.
//!
//! References:
//! - Cook et al., "Concepts and Applications of Finite Element Analysis"
//! - Petyt, "Introduction to Finite Element Vibration Analysis"

use nalgebra::{DMatrix, Matrix4};
use serde::{Deserialize, Serialize};

use crate::elements::Element;
use crate::error::{Result, SolverError};
use crate::materials::Material;

/// Cross-section properties for bending about the strong (x-x) axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamSection {
    /// Cross-sectional area [m²]
    pub area: f64,
    /// Second moment of area about the bending axis [m⁴]
    pub second_moment: f64,
}

impl BeamSection {
    /// Create a custom section with explicit properties
    pub fn custom(area: f64, second_moment: f64) -> Self {
        Self {
            area,
            second_moment,
        }
    }

    /// Solid rectangle of width `b` and height `h` (bending about the width axis)
    ///
    /// # Example
    /// ```
    /// use gle_solver::elements::BeamSection;
    ///
    /// let section = BeamSection::rectangular(0.03, 0.01);
    /// assert!((section.area - 3.0e-4).abs() < 1e-15);
    /// assert!((section.second_moment - 0.03 * 0.01_f64.powi(3) / 12.0).abs() < 1e-20);
    /// ```
    pub fn rectangular(b: f64, h: f64) -> Self {
        Self {
            area: b * h,
            second_moment: b * h.powi(3) / 12.0,
        }
    }

    /// Hollow rectangular tube: outer `b × h` minus inner `b_inner × h_inner`
    pub fn hollow_rectangular(b: f64, h: f64, b_inner: f64, h_inner: f64) -> Self {
        Self {
            area: b * h - b_inner * h_inner,
            second_moment: b * h.powi(3) / 12.0 - b_inner * h_inner.powi(3) / 12.0,
        }
    }

    /// T-section: web of height `web_height` and thickness `web_thickness`,
    /// topped by a flange of thickness `flange_thickness` and width `flange_width`
    pub fn t_section(
        web_height: f64,
        web_thickness: f64,
        flange_thickness: f64,
        flange_width: f64,
    ) -> Self {
        let (hw, bw, tf, bf) = (web_height, web_thickness, flange_thickness, flange_width);
        let area = bf * tf + bw * hw;
        // Neutral axis measured from the free end of the web
        let y_c = ((hw + tf / 2.0) * tf * bf + hw * hw * bw / 2.0) / area;
        let second_moment = bw * hw * (y_c - hw / 2.0).powi(2)
            + bw * hw.powi(3) / 12.0
            + tf * bf * (hw + tf / 2.0 - y_c).powi(2)
            + tf.powi(3) * bf / 12.0;

        Self {
            area,
            second_moment,
        }
    }

    /// Symmetric I-section: web `web_height × web_thickness` between two
    /// flanges of thickness `flange_thickness` and width `flange_width`
    pub fn i_section(
        web_height: f64,
        web_thickness: f64,
        flange_thickness: f64,
        flange_width: f64,
    ) -> Self {
        let (hw, bw, tf, bf) = (web_height, web_thickness, flange_thickness, flange_width);
        let area = 2.0 * tf * bf + bw * hw;
        let second_moment =
            hw.powi(3) * bw / 12.0 + 2.0 * (tf.powi(3) * bf / 12.0 + tf * bf * (hw + tf).powi(2) / 4.0);

        Self {
            area,
            second_moment,
        }
    }

    /// Check that area and second moment are finite and positive
    pub fn validate(&self) -> Result<()> {
        if !(self.area.is_finite() && self.area > 0.0) {
            return Err(SolverError::Configuration(format!(
                "Section area must be positive, got {}",
                self.area
            )));
        }
        if !(self.second_moment.is_finite() && self.second_moment > 0.0) {
            return Err(SolverError::Configuration(format!(
                "Section second moment must be positive, got {}",
                self.second_moment
            )));
        }
        Ok(())
    }
}

/// 2-node Euler-Bernoulli beam element with 2 DOFs per node
///
/// DOF order: [w1, θ1, w2, θ2]
#[derive(Debug, Clone, PartialEq)]
pub struct EulerBernoulliBeam {
    /// Element length [m]
    pub length: f64,
    pub section: BeamSection,
}

impl EulerBernoulliBeam {
    pub fn new(length: f64, section: BeamSection) -> Self {
        Self { length, section }
    }

    fn check_length(&self) -> Result<()> {
        if !(self.length.is_finite() && self.length > 0.0) {
            return Err(SolverError::Configuration(format!(
                "Beam element length must be positive, got {}",
                self.length
            )));
        }
        Ok(())
    }

    /// Dimensionless consistent mass pattern; scaled by ρAL/420
    #[rustfmt::skip]
    fn mass_pattern(l: f64) -> Matrix4<f64> {
        let l2 = l * l;
        Matrix4::new(
            156.0, 22.0 * l, 54.0, -13.0 * l,
            22.0 * l, 4.0 * l2, 13.0 * l, -3.0 * l2,
            54.0, 13.0 * l, 156.0, -22.0 * l,
            -13.0 * l, -3.0 * l2, -22.0 * l, 4.0 * l2,
        )
    }

    /// Dimensionless bending stiffness pattern; scaled by EI/L³
    #[rustfmt::skip]
    fn stiffness_pattern(l: f64) -> Matrix4<f64> {
        let l2 = l * l;
        Matrix4::new(
            12.0, 6.0 * l, -12.0, 6.0 * l,
            6.0 * l, 4.0 * l2, -6.0 * l, 2.0 * l2,
            -12.0, -6.0 * l, 12.0, -6.0 * l,
            6.0 * l, 2.0 * l2, -6.0 * l, 4.0 * l2,
        )
    }

    /// Fixed-size 4×4 consistent mass matrix
    pub fn local_mass(&self, material: &Material) -> Result<Matrix4<f64>> {
        self.check_length()?;
        let l = self.length;
        let scale = material.density * self.section.area * l / 420.0;
        Ok(Self::mass_pattern(l) * scale)
    }

    /// Fixed-size 4×4 stiffness matrix
    pub fn local_stiffness(&self, material: &Material) -> Result<Matrix4<f64>> {
        self.check_length()?;
        let l = self.length;
        let scale = material.elastic_modulus * self.section.second_moment / l.powi(3);
        Ok(Self::stiffness_pattern(l) * scale)
    }
}

impl Element for EulerBernoulliBeam {
    fn stiffness_matrix(&self, material: &Material) -> Result<DMatrix<f64>> {
        let k = self.local_stiffness(material)?;
        Ok(DMatrix::from_iterator(4, 4, k.iter().copied()))
    }

    fn mass_matrix(&self, material: &Material) -> Result<DMatrix<f64>> {
        let m = self.local_mass(material)?;
        Ok(DMatrix::from_iterator(4, 4, m.iter().copied()))
    }

    fn num_nodes(&self) -> usize {
        2
    }

    fn dofs_per_node(&self) -> usize {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector4;

    fn element() -> EulerBernoulliBeam {
        EulerBernoulliBeam::new(0.1625, BeamSection::rectangular(0.03, 0.01))
    }

    #[test]
    fn element_matrices_are_symmetric() {
        let mat = Material::steel();
        let k = element().local_stiffness(&mat).unwrap();
        let m = element().local_mass(&mat).unwrap();
        assert_relative_eq!(k, k.transpose(), max_relative = 1e-14);
        assert_relative_eq!(m, m.transpose(), max_relative = 1e-14);
    }

    #[test]
    fn translational_mass_sums_to_element_mass() {
        let mat = Material::steel();
        let beam = element();
        let m = beam.local_mass(&mat).unwrap();
        let total: f64 = [0, 2]
            .iter()
            .flat_map(|&i| [0, 2].map(move |j| (i, j)))
            .map(|(i, j)| m[(i, j)])
            .sum();
        let expected = mat.density * beam.section.area * beam.length;
        assert_relative_eq!(total, expected, max_relative = 1e-12);
    }

    #[test]
    fn rigid_body_motions_produce_no_force() {
        let mat = Material::steel();
        let beam = element();
        let k = beam.local_stiffness(&mat).unwrap();
        let translation = Vector4::new(1.0, 0.0, 1.0, 0.0);
        let rotation = Vector4::new(0.0, 1.0, beam.length, 1.0);
        let scale = k.amax();
        assert!((k * translation).amax() < 1e-12 * scale);
        assert!((k * rotation).amax() < 1e-12 * scale);
    }

    #[test]
    fn dynamic_matrices_match_fixed_size() {
        let mat = Material::aluminium();
        let beam = element();
        let k = beam.stiffness_matrix(&mat).unwrap();
        let k_fixed = beam.local_stiffness(&mat).unwrap();
        assert_eq!(k.nrows(), 4);
        assert_eq!(k[(0, 1)], k_fixed[(0, 1)]);
        assert_eq!(k[(3, 2)], k_fixed[(3, 2)]);
    }

    #[test]
    fn rejects_zero_length() {
        let beam = EulerBernoulliBeam::new(0.0, BeamSection::rectangular(0.03, 0.01));
        assert!(beam.local_mass(&Material::steel()).is_err());
    }

    #[test]
    fn hollow_section_reduces_to_solid() {
        let solid = BeamSection::rectangular(0.04, 0.02);
        let hollow = BeamSection::hollow_rectangular(0.04, 0.02, 0.0, 0.0);
        assert_eq!(solid, hollow);
    }

    #[test]
    fn i_section_exceeds_its_web() {
        let web_only = BeamSection::rectangular(0.006, 0.1);
        let i_beam = BeamSection::i_section(0.1, 0.006, 0.008, 0.05);
        assert!(i_beam.second_moment > web_only.second_moment);
        assert_relative_eq!(i_beam.area, 0.1 * 0.006 + 2.0 * 0.008 * 0.05);
    }

    #[test]
    fn t_section_area_and_positive_inertia() {
        let t = BeamSection::t_section(0.05, 0.005, 0.006, 0.04);
        assert_relative_eq!(t.area, 0.04 * 0.006 + 0.005 * 0.05);
        assert!(t.second_moment > 0.0);
        assert!(t.validate().is_ok());
    }
}
