//! Boundary conditions for the beam model.
//!
//! The beam is free-free unless constraints are added explicitly. Constraints
//! are applied by deleting the constrained rows and columns from the global
//! matrices (see [`crate::assembly::GlobalSystem::reduce`]).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};

/// Transverse displacement DOF index within a node
pub const TRANSVERSE: usize = 0;
/// Rotation DOF index within a node
pub const ROTATION: usize = 1;

/// Degree of freedom identifier (both indices 0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DofId {
    /// Node index
    pub node: usize,
    /// DOF index within the node (0 = transverse, 1 = rotation)
    pub dof: usize,
}

impl DofId {
    /// Create a new DOF identifier
    pub fn new(node: usize, dof: usize) -> Self {
        Self { node, dof }
    }

    /// Global DOF index for a given node layout
    pub fn global_index(&self, dofs_per_node: usize) -> usize {
        self.node * dofs_per_node + self.dof
    }
}

/// Set of constrained (zero-displacement) DOFs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryConditions {
    constrained: BTreeSet<DofId>,
}

impl BoundaryConditions {
    /// Unconstrained beam
    pub fn free_free() -> Self {
        Self::default()
    }

    /// Pin the transverse DOF of the first and last node
    pub fn simply_supported(num_nodes: usize) -> Self {
        let mut bcs = Self::default();
        bcs.fix(DofId::new(0, TRANSVERSE));
        bcs.fix(DofId::new(num_nodes.saturating_sub(1), TRANSVERSE));
        bcs
    }

    /// Clamp both DOFs of node 0
    pub fn cantilever() -> Self {
        let mut bcs = Self::default();
        bcs.fix(DofId::new(0, TRANSVERSE));
        bcs.fix(DofId::new(0, ROTATION));
        bcs
    }

    /// Constrain a single DOF
    pub fn fix(&mut self, dof: DofId) -> &mut Self {
        self.constrained.insert(dof);
        self
    }

    pub fn is_free_free(&self) -> bool {
        self.constrained.is_empty()
    }

    pub fn constrained(&self) -> impl Iterator<Item = &DofId> {
        self.constrained.iter()
    }

    /// Sorted global indices of the constrained DOFs
    ///
    /// # Errors
    /// Returns a configuration error if a constraint refers to a DOF outside
    /// the model.
    pub fn constrained_global_dofs(&self, dofs_per_node: usize, num_dofs: usize) -> Result<Vec<usize>> {
        self.constrained
            .iter()
            .map(|id| {
                if id.dof >= dofs_per_node {
                    return Err(SolverError::Configuration(format!(
                        "DOF {} does not exist on a node with {} DOFs",
                        id.dof, dofs_per_node
                    )));
                }
                let index = id.global_index(dofs_per_node);
                if index >= num_dofs {
                    return Err(SolverError::Configuration(format!(
                        "Constraint on node {} is outside the model ({} DOFs)",
                        id.node, num_dofs
                    )));
                }
                Ok(index)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_free_has_no_constraints() {
        let bcs = BoundaryConditions::free_free();
        assert!(bcs.is_free_free());
        assert!(bcs.constrained_global_dofs(2, 10).unwrap().is_empty());
    }

    #[test]
    fn simply_supported_pins_end_displacements() {
        let bcs = BoundaryConditions::simply_supported(5);
        assert_eq!(bcs.constrained_global_dofs(2, 10).unwrap(), vec![0, 8]);
    }

    #[test]
    fn cantilever_clamps_first_node() {
        let bcs = BoundaryConditions::cantilever();
        assert_eq!(bcs.constrained_global_dofs(2, 10).unwrap(), vec![0, 1]);
    }

    #[test]
    fn rejects_out_of_range_node() {
        let mut bcs = BoundaryConditions::free_free();
        bcs.fix(DofId::new(7, TRANSVERSE));
        assert!(bcs.constrained_global_dofs(2, 10).is_err());
    }

    #[test]
    fn rejects_unknown_dof() {
        let mut bcs = BoundaryConditions::free_free();
        bcs.fix(DofId::new(1, 2));
        assert!(bcs.constrained_global_dofs(2, 10).is_err());
    }
}
