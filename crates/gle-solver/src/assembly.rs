//! Global matrix assembly for the beam chain.
//!
//! Assembles element mass and stiffness matrices into the global system:
//! - K: Global stiffness matrix
//! - M: Global consistent mass matrix
//!
//! ## Assembly Process
//!
//! 1. Allocate dense global K and M (num_dofs × num_dofs)
//! 2. Loop over the elements of the chain:
//!    - Compute element k_e and m_e (4×4)
//!    - Get element DOF indices (offset `2·element_index`)
//!    - Overlap-add into K and M, so neighbouring elements share the two
//!      DOFs of their common node
//!
//! No constraints are applied during assembly; see [`GlobalSystem::reduce`].

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::boundary_conditions::BoundaryConditions;
use crate::elements::Element;
use crate::error::{Result, SolverError};
use crate::model::BeamModel;

/// Assembled global finite element system
#[derive(Debug, Clone)]
pub struct GlobalSystem {
    /// Global stiffness matrix
    pub stiffness: DMatrix<f64>,
    /// Global consistent mass matrix
    pub mass: DMatrix<f64>,
    /// Number of degrees of freedom
    pub num_dofs: usize,
    /// Degrees of freedom per node
    pub dofs_per_node: usize,
}

impl GlobalSystem {
    /// Assemble the global system of a beam model
    ///
    /// # Errors
    /// Returns a configuration error if the model fails validation
    /// (e.g. fewer than two elements).
    pub fn assemble(model: &BeamModel) -> Result<Self> {
        model.validate()?;

        let element = model.element();
        let dofs_per_node = element.dofs_per_node();
        let num_dofs = model.num_nodes() * dofs_per_node;

        let k_e = element.stiffness_matrix(&model.material)?;
        let m_e = element.mass_matrix(&model.material)?;

        let mut stiffness = DMatrix::zeros(num_dofs, num_dofs);
        let mut mass = DMatrix::zeros(num_dofs, num_dofs);

        for elem_index in 0..model.num_elements {
            let dofs = element.global_dof_indices(&[elem_index, elem_index + 1]);
            for (i, &gi) in dofs.iter().enumerate() {
                for (j, &gj) in dofs.iter().enumerate() {
                    stiffness[(gi, gj)] += k_e[(i, j)];
                    mass[(gi, gj)] += m_e[(i, j)];
                }
            }
        }

        debug!(
            num_elements = model.num_elements,
            num_dofs, "assembled beam mass and stiffness matrices"
        );

        Ok(Self {
            stiffness,
            mass,
            num_dofs,
            dofs_per_node,
        })
    }

    /// Check both matrices for symmetry to an absolute tolerance scaled by
    /// each matrix's largest entry
    pub fn is_symmetric(&self, tol: f64) -> bool {
        is_symmetric(&self.stiffness, tol) && is_symmetric(&self.mass, tol)
    }

    /// Check if the system is ready for an eigen or time-domain solve
    pub fn validate(&self) -> Result<()> {
        for i in 0..self.num_dofs {
            if self.mass[(i, i)] <= 0.0 {
                return Err(SolverError::Configuration(format!(
                    "Non-positive mass diagonal at DOF {}",
                    i
                )));
            }
        }
        if !self.is_symmetric(1e-12) {
            return Err(SolverError::Configuration(
                "Assembled matrices are not symmetric".to_string(),
            ));
        }
        Ok(())
    }

    /// Delete the rows and columns of constrained DOFs
    pub fn reduce(&self, bcs: &BoundaryConditions) -> Result<ReducedSystem> {
        let constrained = bcs.constrained_global_dofs(self.dofs_per_node, self.num_dofs)?;
        let free_dofs: Vec<usize> = (0..self.num_dofs)
            .filter(|dof| constrained.binary_search(dof).is_err())
            .collect();

        if free_dofs.is_empty() {
            return Err(SolverError::Configuration(
                "No free DOFs available (all DOFs constrained)".to_string(),
            ));
        }

        Ok(ReducedSystem {
            stiffness: reduce_matrix(&self.stiffness, &free_dofs),
            mass: reduce_matrix(&self.mass, &free_dofs),
            free_dofs,
            num_dofs: self.num_dofs,
            dofs_per_node: self.dofs_per_node,
        })
    }
}

/// Global matrices restricted to the free DOFs
#[derive(Debug, Clone)]
pub struct ReducedSystem {
    pub stiffness: DMatrix<f64>,
    pub mass: DMatrix<f64>,
    /// Global index of each reduced DOF
    pub free_dofs: Vec<usize>,
    /// DOF count of the unreduced system
    pub num_dofs: usize,
    pub dofs_per_node: usize,
}

impl ReducedSystem {
    pub fn num_free(&self) -> usize {
        self.free_dofs.len()
    }

    /// Reduced index of a global DOF, `None` if it is constrained
    pub fn reduced_index(&self, global_dof: usize) -> Option<usize> {
        self.free_dofs.binary_search(&global_dof).ok()
    }

    /// Expand a reduced vector to full size, inserting zeros at constrained DOFs
    pub fn expand_vector(&self, reduced: &DVector<f64>) -> DVector<f64> {
        let mut full = DVector::zeros(self.num_dofs);
        for (reduced_idx, &dof) in self.free_dofs.iter().enumerate() {
            full[dof] = reduced[reduced_idx];
        }
        full
    }

    /// Expand the columns of a reduced matrix (e.g. mode shapes) to full size
    pub fn expand_columns(&self, reduced: &DMatrix<f64>) -> DMatrix<f64> {
        let mut full = DMatrix::zeros(self.num_dofs, reduced.ncols());
        for col in 0..reduced.ncols() {
            for (reduced_idx, &dof) in self.free_dofs.iter().enumerate() {
                full[(dof, col)] = reduced[(reduced_idx, col)];
            }
        }
        full
    }
}

/// Extract submatrix A_red[i,j] = A[dofs[i], dofs[j]]
fn reduce_matrix(matrix: &DMatrix<f64>, dofs: &[usize]) -> DMatrix<f64> {
    DMatrix::from_fn(dofs.len(), dofs.len(), |i, j| matrix[(dofs[i], dofs[j])])
}

fn is_symmetric(matrix: &DMatrix<f64>, tol: f64) -> bool {
    let scale = matrix.amax().max(f64::MIN_POSITIVE);
    (0..matrix.nrows()).all(|i| {
        (i + 1..matrix.ncols()).all(|j| (matrix[(i, j)] - matrix[(j, i)]).abs() <= tol * scale)
    })
}
