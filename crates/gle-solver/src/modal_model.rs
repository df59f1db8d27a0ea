//! Damped modal model of a beam: M, K, C and the undamped modes.
//!
//! Built once per beam configuration and immutable afterwards; rebuild on any
//! geometry, material or constraint change.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assembly::{GlobalSystem, ReducedSystem};
use crate::boundary_conditions::BoundaryConditions;
use crate::damping::RayleighDamping;
use crate::error::{Result, SolverError};
use crate::modal_solver::{ModalResults, ModalSolver, RigidBodyPolicy};
use crate::model::BeamModel;

/// Target damping ratios of the first two physical modes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DampingTargets {
    pub zeta1: f64,
    pub zeta2: f64,
}

impl Default for DampingTargets {
    fn default() -> Self {
        Self {
            zeta1: 0.02,
            zeta2: 0.02,
        }
    }
}

/// Options controlling how the modal model is derived
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModalOptions {
    /// Rigid-body policy; derived from the constraints when `None`
    pub policy: Option<RigidBodyPolicy>,
    pub damping: DampingTargets,
}

/// M, K, C restricted to the free DOFs, with the modes they were derived from
#[derive(Debug, Clone)]
pub struct ModalModel {
    system: GlobalSystem,
    reduced: ReducedSystem,
    damping_matrix: DMatrix<f64>,
    rayleigh: RayleighDamping,
    modes: ModalResults,
}

impl ModalModel {
    /// Assemble, constrain, solve the eigenproblem and derive Rayleigh damping
    ///
    /// # Errors
    /// - `Configuration` for invalid beam data or constraints, or when fewer
    ///   than two physical modes remain
    /// - `SingularSystem` if the first two physical frequencies coincide
    pub fn build(model: &BeamModel, bcs: &BoundaryConditions, options: &ModalOptions) -> Result<Self> {
        let system = GlobalSystem::assemble(model)?;
        system.validate()?;
        let reduced = system.reduce(bcs)?;

        let policy = options
            .policy
            .unwrap_or_else(|| RigidBodyPolicy::for_constraints(bcs));
        let modes = ModalSolver::new(&system, bcs)
            .with_policy(policy)
            .solve_reduced(&reduced, None)?;

        if modes.num_modes < 2 {
            return Err(SolverError::Configuration(format!(
                "Rayleigh damping needs two physical modes, model has {}",
                modes.num_modes
            )));
        }

        let rayleigh = RayleighDamping::from_modal(
            modes.angular_frequencies[0],
            modes.angular_frequencies[1],
            options.damping.zeta1,
            options.damping.zeta2,
        )?;
        let damping_matrix = rayleigh.damping_matrix(&reduced.mass, &reduced.stiffness);

        info!(
            num_dofs = system.num_dofs,
            free_dofs = reduced.num_free(),
            f1_hz = modes.frequencies_hz[0],
            f2_hz = modes.frequencies_hz[1],
            alpha = rayleigh.alpha,
            beta = rayleigh.beta,
            "built modal model"
        );

        Ok(Self {
            system,
            reduced,
            damping_matrix,
            rayleigh,
            modes,
        })
    }

    /// Unconstrained assembled system
    pub fn system(&self) -> &GlobalSystem {
        &self.system
    }

    /// Free-DOF map and reduced M, K
    pub fn reduced(&self) -> &ReducedSystem {
        &self.reduced
    }

    pub fn mass(&self) -> &DMatrix<f64> {
        &self.reduced.mass
    }

    pub fn stiffness(&self) -> &DMatrix<f64> {
        &self.reduced.stiffness
    }

    pub fn damping(&self) -> &DMatrix<f64> {
        &self.damping_matrix
    }

    pub fn rayleigh(&self) -> RayleighDamping {
        self.rayleigh
    }

    pub fn modes(&self) -> &ModalResults {
        &self.modes
    }

    pub fn dofs_per_node(&self) -> usize {
        self.system.dofs_per_node
    }

    pub fn num_nodes(&self) -> usize {
        self.system.num_dofs / self.system.dofs_per_node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::BeamSection;
    use crate::materials::Material;
    use approx::assert_relative_eq;

    fn beam() -> BeamModel {
        BeamModel::new(0.65, 4, BeamSection::rectangular(0.03, 0.01), Material::steel())
    }

    #[test]
    fn builds_free_free_model() {
        let model = ModalModel::build(&beam(), &BoundaryConditions::free_free(), &ModalOptions::default())
            .unwrap();
        assert_eq!(model.mass().nrows(), 10);
        assert_eq!(model.damping().nrows(), 10);
        assert_eq!(model.num_nodes(), 5);
        assert_eq!(model.modes().discarded, 2);
    }

    #[test]
    fn damping_hits_targets_on_first_two_modes() {
        let options = ModalOptions {
            damping: DampingTargets {
                zeta1: 0.01,
                zeta2: 0.03,
            },
            ..ModalOptions::default()
        };
        let model = ModalModel::build(&beam(), &BoundaryConditions::free_free(), &options).unwrap();
        let w = &model.modes().angular_frequencies;
        assert_relative_eq!(model.rayleigh().damping_ratio_at(w[0]), 0.01, epsilon = 1e-9);
        assert_relative_eq!(model.rayleigh().damping_ratio_at(w[1]), 0.03, epsilon = 1e-9);
    }

    #[test]
    fn constrained_model_is_reduced() {
        let model = ModalModel::build(
            &beam(),
            &BoundaryConditions::cantilever(),
            &ModalOptions::default(),
        )
        .unwrap();
        assert_eq!(model.mass().nrows(), 8);
        assert_eq!(model.modes().discarded, 0);
    }
}
