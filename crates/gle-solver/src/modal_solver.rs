//! Modal analysis solver for computing natural frequencies and mode shapes.
//!
//! This module implements eigenvalue analysis for undamped free vibration:
//! (K - λM)φ = 0
//!
//! where:
//! - K = global stiffness matrix
//! - M = global mass matrix
//! - λ = ω² (squared angular frequency)
//! - φ = mode shape (eigenvector)
//!
//! # Workflow
//! 1. Reduce K and M to the free DOFs (no-op for a free-free beam)
//! 2. Solve the generalized eigenvalue problem K_red * φ = λ * M_red * φ
//! 3. Sort ascending and drop the rigid-body modes named by the policy
//! 4. Convert eigenvalues to frequencies: f = √λ / (2π)
//! 5. Expand mode shapes back to full DOF space
//!
//! # Example
//! ```no_run
//! use gle_solver::{BeamModel, BeamSection, BoundaryConditions, GlobalSystem, Material, ModalSolver};
//!
//! # fn example() -> gle_solver::Result<()> {
//! let model = BeamModel::new(0.65, 4, BeamSection::rectangular(0.03, 0.01), Material::steel());
//! let system = GlobalSystem::assemble(&model)?;
//! let bcs = BoundaryConditions::free_free();
//! let results = ModalSolver::new(&system, &bcs).solve(None)?;
//!
//! for (i, freq) in results.frequencies_hz.iter().enumerate() {
//!     println!("  Mode {}: {:.2} Hz", i + 1, freq);
//! }
//! # Ok(())
//! # }
//! ```

use nalgebra::linalg::{Cholesky, SymmetricEigen};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::assembly::{GlobalSystem, ReducedSystem};
use crate::boundary_conditions::{BoundaryConditions, TRANSVERSE};
use crate::error::{Result, SolverError};

/// Relative size below which a negative eigenvalue is treated as round-off
const NEGATIVE_EIGENVALUE_TOL: f64 = 1e-8;

/// Which of the lowest modes are excluded from the physical results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RigidBodyPolicy {
    /// Drop the `n` smallest eigenvalues (2 for a free-free planar beam:
    /// translation and rotation)
    Discard(usize),
    /// Keep every mode (constrained models)
    KeepAll,
}

impl RigidBodyPolicy {
    /// Free-free models discard translation and rotation, constrained ones
    /// keep everything
    pub fn for_constraints(bcs: &BoundaryConditions) -> Self {
        if bcs.is_free_free() {
            RigidBodyPolicy::Discard(2)
        } else {
            RigidBodyPolicy::KeepAll
        }
    }

    fn discard_count(&self) -> usize {
        match self {
            RigidBodyPolicy::Discard(n) => *n,
            RigidBodyPolicy::KeepAll => 0,
        }
    }
}

/// Results from modal analysis
#[derive(Debug, Clone)]
pub struct ModalResults {
    /// Eigenvalues (λ = ω² = (2πf)²), ascending
    pub eigenvalues: Vec<f64>,
    /// Natural angular frequencies [rad/s]
    pub angular_frequencies: Vec<f64>,
    /// Natural frequencies [Hz]
    pub frequencies_hz: Vec<f64>,
    /// Mass-normalised mode shapes, one column per mode
    /// Size: (num_dofs × num_modes), zeros at constrained DOFs
    pub mode_shapes: DMatrix<f64>,
    /// Number of modes returned
    pub num_modes: usize,
    /// Number of lowest modes dropped by the rigid-body policy
    pub discarded: usize,
    /// Degrees of freedom per node of the model the shapes belong to
    pub dofs_per_node: usize,
}

impl ModalResults {
    /// Get the i-th mode shape as a vector
    pub fn mode_shape(&self, mode_index: usize) -> Option<DVector<f64>> {
        if mode_index >= self.num_modes {
            return None;
        }
        Some(self.mode_shapes.column(mode_index).into())
    }

    /// Get angular frequency (rad/s) for a given mode
    pub fn angular_frequency(&self, mode_index: usize) -> Option<f64> {
        self.angular_frequencies.get(mode_index).copied()
    }

    /// Transverse displacement of every node for one mode, scaled so the
    /// largest entry has magnitude 1
    pub fn transverse_shape(&self, mode_index: usize) -> Option<Vec<f64>> {
        let shape = self.mode_shape(mode_index)?;
        let values: Vec<f64> = shape
            .iter()
            .skip(TRANSVERSE)
            .step_by(self.dofs_per_node)
            .copied()
            .collect();
        let max = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        if max == 0.0 {
            return Some(values);
        }
        Some(values.into_iter().map(|v| v / max).collect())
    }
}

/// Modal analysis solver
pub struct ModalSolver<'a> {
    system: &'a GlobalSystem,
    bcs: &'a BoundaryConditions,
    policy: RigidBodyPolicy,
}

impl<'a> ModalSolver<'a> {
    /// Create a new modal solver with the rigid-body policy implied by `bcs`
    pub fn new(system: &'a GlobalSystem, bcs: &'a BoundaryConditions) -> Self {
        Self {
            system,
            bcs,
            policy: RigidBodyPolicy::for_constraints(bcs),
        }
    }

    /// Override the rigid-body policy
    pub fn with_policy(mut self, policy: RigidBodyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Solve the modal analysis problem
    ///
    /// # Arguments
    /// * `num_modes` - Maximum number of physical modes to return (all if `None`)
    ///
    /// # Errors
    /// Returns error if:
    /// - The constraints are invalid or leave no free DOF
    /// - The mass matrix is not positive definite
    /// - The policy discards every mode
    pub fn solve(&self, num_modes: Option<usize>) -> Result<ModalResults> {
        let reduced = self.system.reduce(self.bcs)?;
        self.solve_reduced(&reduced, num_modes)
    }

    /// Solve on an already reduced system
    pub fn solve_reduced(&self, reduced: &ReducedSystem, num_modes: Option<usize>) -> Result<ModalResults> {
        let (eigenvalues, eigenvectors) = solve_generalized(&reduced.stiffness, &reduced.mass)?;

        let discard = self.policy.discard_count();
        if discard >= eigenvalues.len() {
            return Err(SolverError::Configuration(format!(
                "Rigid-body policy discards {} of {} modes",
                discard,
                eigenvalues.len()
            )));
        }

        let available = eigenvalues.len() - discard;
        let count = num_modes.map_or(available, |n| n.min(available));

        let kept: Vec<f64> = eigenvalues[discard..discard + count].to_vec();
        let shapes_red = eigenvectors.columns(discard, count).into_owned();
        let mode_shapes = reduced.expand_columns(&shapes_red);

        let angular_frequencies: Vec<f64> = kept.iter().map(|&lambda| lambda.sqrt()).collect();
        let frequencies_hz: Vec<f64> = angular_frequencies
            .iter()
            .map(|&omega| omega / (2.0 * std::f64::consts::PI))
            .collect();

        debug!(
            discarded = discard,
            modes = count,
            first_hz = frequencies_hz.first().copied().unwrap_or(0.0),
            "modal solve complete"
        );

        Ok(ModalResults {
            eigenvalues: kept,
            angular_frequencies,
            frequencies_hz,
            mode_shapes,
            num_modes: count,
            discarded: discard,
            dofs_per_node: reduced.dofs_per_node,
        })
    }
}

/// Solve the generalized eigenvalue problem K*φ = λ*M*φ
///
/// Uses Cholesky decomposition to transform to a standard symmetric problem:
/// 1. M = L*L^T (Cholesky decomposition)
/// 2. K* = L^-1 * K * L^-T (transformed stiffness)
/// 3. Solve K*ψ = λψ (standard eigenvalue problem)
/// 4. φ = L^-T * ψ (transform back, φ^T M φ = 1)
///
/// Eigenpairs are returned sorted by ascending eigenvalue. Negative
/// eigenvalues are clamped to zero; those beyond round-off are reported.
pub fn solve_generalized(k: &DMatrix<f64>, m: &DMatrix<f64>) -> Result<(Vec<f64>, DMatrix<f64>)> {
    if k.nrows() != k.ncols() || m.nrows() != m.ncols() {
        return Err(SolverError::Configuration("Matrices must be square".to_string()));
    }
    if k.nrows() != m.nrows() {
        return Err(SolverError::Configuration(
            "K and M must have same dimensions".to_string(),
        ));
    }
    let n = k.nrows();
    if n == 0 {
        return Err(SolverError::Configuration(
            "Cannot solve eigenvalue problem for 0×0 matrices".to_string(),
        ));
    }

    let chol = Cholesky::new(m.clone()).ok_or_else(|| {
        SolverError::SingularSystem(
            "Mass matrix is not positive definite (Cholesky decomposition failed)".to_string(),
        )
    })?;
    let l_inv = chol
        .l()
        .try_inverse()
        .ok_or_else(|| SolverError::SingularSystem("Failed to invert Cholesky factor".to_string()))?;

    let k_star = &l_inv * k * l_inv.transpose();
    let asymmetry = (&k_star - k_star.transpose()).amax();
    debug!(asymmetry, "transformed stiffness symmetry defect");
    let k_star = (&k_star + k_star.transpose()) * 0.5;

    let eigen = SymmetricEigen::new(k_star);
    let lambda_max = eigen.eigenvalues.amax();
    let tol = NEGATIVE_EIGENVALUE_TOL * lambda_max.max(f64::MIN_POSITIVE);

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));

    let l_inv_t = l_inv.transpose();
    let mut eigenvalues = Vec::with_capacity(n);
    let mut eigenvectors = DMatrix::zeros(n, n);
    for (col, &idx) in order.iter().enumerate() {
        let mut lambda = eigen.eigenvalues[idx];
        if lambda < 0.0 {
            if lambda < -tol {
                warn!(
                    eigenvalue = lambda,
                    tolerance = tol,
                    "negative eigenvalue beyond round-off, clamped to zero"
                );
            }
            lambda = 0.0;
        }
        eigenvalues.push(lambda);
        let psi = eigen.eigenvectors.column(idx);
        eigenvectors.set_column(col, &(&l_inv_t * psi));
    }

    Ok((eigenvalues, eigenvectors))
}
