//! Finite element library for beam analysis.

use nalgebra::DMatrix;

use crate::error::Result;
use crate::materials::Material;

pub mod beam;

pub use beam::{BeamSection, EulerBernoulliBeam};

/// Element interface for finite element calculations
pub trait Element {
    /// Compute the element stiffness matrix
    ///
    /// # Arguments
    /// * `material` - Material properties
    ///
    /// # Returns
    /// Element stiffness matrix k_e (size: num_dofs × num_dofs)
    fn stiffness_matrix(&self, material: &Material) -> Result<DMatrix<f64>>;

    /// Compute the consistent element mass matrix
    ///
    /// # Arguments
    /// * `material` - Material properties
    ///
    /// # Returns
    /// Element mass matrix m_e (size: num_dofs × num_dofs)
    fn mass_matrix(&self, material: &Material) -> Result<DMatrix<f64>>;

    /// Get the number of nodes for this element type
    fn num_nodes(&self) -> usize;

    /// Get the number of degrees of freedom per node
    fn dofs_per_node(&self) -> usize;

    /// Get the global DOF indices for this element
    ///
    /// # Arguments
    /// * `connectivity` - 0-based node indices for this element
    ///
    /// # Returns
    /// Vector of global DOF indices
    fn global_dof_indices(&self, connectivity: &[usize]) -> Vec<usize> {
        let dofs_per_node = self.dofs_per_node();
        let mut indices = Vec::with_capacity(self.num_nodes() * dofs_per_node);

        for &node in connectivity {
            let base_dof = node * dofs_per_node;
            for local_dof in 0..dofs_per_node {
                indices.push(base_dof + local_dof);
            }
        }

        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DummyElement;

    impl Element for DummyElement {
        fn stiffness_matrix(&self, _material: &Material) -> Result<DMatrix<f64>> {
            Ok(DMatrix::zeros(4, 4))
        }
        fn mass_matrix(&self, _material: &Material) -> Result<DMatrix<f64>> {
            Ok(DMatrix::zeros(4, 4))
        }
        fn num_nodes(&self) -> usize {
            2
        }
        fn dofs_per_node(&self) -> usize {
            2
        }
    }

    #[test]
    fn global_dof_indices_simple() {
        let indices = DummyElement.global_dof_indices(&[0, 1]);
        // Node 0: DOFs 0, 1; node 1: DOFs 2, 3
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn global_dof_indices_offset() {
        let indices = DummyElement.global_dof_indices(&[3, 4]);
        // Adjacent elements share the two DOFs of their common node
        assert_eq!(indices, vec![6, 7, 8, 9]);
    }
}
