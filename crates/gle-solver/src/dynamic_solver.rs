//! Transient response of the damped beam by adaptive implicit integration.
//!
//! Solves the structural dynamics problem on the free DOFs:
//! M*ü + C*u̇ + K*u = e_d·g(t)
//!
//! where:
//! - M, K, C = reduced matrices of a [`ModalModel`]
//! - e_d = unit vector of the loaded DOF
//! - g(t) = amplitude-scaled excitation signal
//!
//! # State layout
//!
//! The first-order state interleaves velocity and displacement per DOF:
//!
//! ```text
//! z = [v_0, u_0, v_1, u_1, ..., v_{n-1}, u_{n-1}]
//! ```
//!
//! With two DOFs per node, node `i` transverse displacement sits at
//! `z[4i + 1]` and its velocity at `z[4i]`; in general the stride between
//! nodes is `2 * dofs_per_node`.
//!
//! # Method
//!
//! A 5-stage, L-stable, stiffly accurate SDIRK method of order 4 (γ = 1/4)
//! with an embedded order-3 solution for error control:
//!
//! ```text
//! (I - γhA) k_i = A (z_n + h Σ_{j<i} a_ij k_j) + b(t_n + c_i h)
//! z_{n+1}      = z_n + h Σ b_i k_i
//! ```
//!
//! The error norm uses `atol + rtol * max(|z_n|, |z_{n+1}|)` per component.
//! Steps never exceed `max_step` and never straddle a forcing breakpoint.
//!
//! # Example
//!
//! ```no_run
//! use gle_solver::{BeamModel, BeamSection, BoundaryConditions, DynamicSolver, Excitation, Forcing,
//!     IntegratorConfig, Material, ModalModel, ModalOptions};
//!
//! # fn example() -> gle_solver::Result<()> {
//! let beam = BeamModel::new(0.65, 4, BeamSection::rectangular(0.03, 0.01), Material::steel());
//! let model = ModalModel::build(&beam, &BoundaryConditions::free_free(), &ModalOptions::default())?;
//! let forcing = Forcing::new(0, 1.0, Excitation::Impulse { duration: 5e-4 });
//!
//! let results = DynamicSolver::new(&model, IntegratorConfig::default()).solve(&forcing, 1.0, None)?;
//! let series = results.to_time_series(10_000.0)?;
//! println!("{} samples, {} accepted steps", series.len(), results.stats.accepted_steps);
//! # Ok(())
//! # }
//! ```

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, SolverError};
use crate::forcing::Forcing;
use crate::interpolation::CubicSpline;
use crate::modal_model::ModalModel;
use crate::time_series::{ChannelId, TimeSeries};

/// Standard gravity used to express acceleration in g
pub const GRAVITY: f64 = 9.81;

const GAMMA: f64 = 0.25;
const STAGES: usize = 5;
const STAGE_TIMES: [f64; STAGES] = [0.25, 0.75, 11.0 / 20.0, 0.5, 1.0];
const STAGE_COEFFS: [[f64; STAGES]; STAGES] = [
    [0.25, 0.0, 0.0, 0.0, 0.0],
    [0.5, 0.25, 0.0, 0.0, 0.0],
    [17.0 / 50.0, -1.0 / 25.0, 0.25, 0.0, 0.0],
    [371.0 / 1360.0, -137.0 / 2720.0, 15.0 / 544.0, 0.25, 0.0],
    [25.0 / 24.0, -49.0 / 48.0, 125.0 / 16.0, -85.0 / 12.0, 0.25],
];
/// b - b̂ (order-4 minus embedded order-3 weights)
const ERROR_WEIGHTS: [f64; STAGES] = [-9.0 / 48.0, -81.0 / 96.0, 25.0 / 32.0, 0.0, 0.25];

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;

/// Adaptive step-size control parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorConfig {
    /// Relative tolerance
    pub rtol: f64,
    /// Absolute tolerance
    pub atol: f64,
    /// Largest allowed step [s]
    pub max_step: f64,
    /// First trial step [s]; estimated from the initial derivative when `None`
    pub initial_step: Option<f64>,
    /// Ceiling on attempted steps (accepted + rejected)
    pub max_steps: usize,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            rtol: 1e-6,
            atol: 1e-6,
            max_step: 0.01,
            initial_step: None,
            max_steps: 1_000_000,
        }
    }
}

impl IntegratorConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.rtol > 0.0 && self.atol > 0.0) {
            return Err(SolverError::Configuration(format!(
                "Tolerances must be positive (rtol = {}, atol = {})",
                self.rtol, self.atol
            )));
        }
        if !(self.max_step > 0.0) {
            return Err(SolverError::Configuration(format!(
                "max_step must be positive, got {}",
                self.max_step
            )));
        }
        if let Some(h0) = self.initial_step
            && !(h0 > 0.0)
        {
            return Err(SolverError::Configuration(format!(
                "initial_step must be positive, got {}",
                h0
            )));
        }
        Ok(())
    }
}

/// Step-control bookkeeping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationStats {
    pub accepted_steps: usize,
    pub rejected_steps: usize,
    pub lu_factorizations: usize,
}

/// Raw adaptive-step history
#[derive(Debug, Clone)]
pub struct DynamicResults {
    /// Accepted step times, starting at 0
    pub time: Vec<f64>,
    /// Interleaved state over all DOFs (zeros at constrained DOFs), one per time
    pub states: Vec<DVector<f64>>,
    pub stats: IntegrationStats,
    pub dofs_per_node: usize,
    pub forcing: Forcing,
    pub duration: f64,
}

/// Per-node transverse response on the raw time axis
#[derive(Debug, Clone, PartialEq)]
pub struct NodalResponse {
    pub time: Vec<f64>,
    /// `displacement[node][k]` [m]
    pub displacement: Vec<Vec<f64>>,
    /// `velocity[node][k]` [m/s]
    pub velocity: Vec<Vec<f64>>,
    /// First difference of velocity in g; the first sample is zero
    pub acceleration: Vec<Vec<f64>>,
}

impl DynamicResults {
    pub fn num_nodes(&self) -> usize {
        self.states
            .first()
            .map_or(0, |z| z.len() / (2 * self.dofs_per_node))
    }

    /// Distance between consecutive nodes in the interleaved state
    pub fn node_stride(&self) -> usize {
        2 * self.dofs_per_node
    }

    /// Extract transverse displacement and velocity per node and
    /// differentiate velocity to acceleration
    pub fn nodal_response(&self) -> NodalResponse {
        let num_nodes = self.num_nodes();
        let stride = self.node_stride();
        let steps = self.time.len();

        let mut displacement = vec![Vec::with_capacity(steps); num_nodes];
        let mut velocity = vec![Vec::with_capacity(steps); num_nodes];
        for z in &self.states {
            for (node, v) in z.iter().step_by(stride).enumerate() {
                velocity[node].push(*v);
            }
            for (node, u) in z.iter().skip(1).step_by(stride).enumerate() {
                displacement[node].push(*u);
            }
        }

        let acceleration = velocity
            .iter()
            .map(|v| {
                let mut a = vec![0.0; v.len()];
                for k in 1..v.len() {
                    let dt = self.time[k] - self.time[k - 1];
                    a[k] = (v[k] - v[k - 1]) / dt / GRAVITY;
                }
                a
            })
            .collect();

        NodalResponse {
            time: self.time.clone(),
            displacement,
            velocity,
            acceleration,
        }
    }

    /// Resample onto `t_k = k / fs`, `k < round(duration * fs)`
    ///
    /// Produces `A{i}` (acceleration in g, cubic-spline resampled) and `F{i}`
    /// (applied force evaluated exactly, zero at unloaded nodes) for every node.
    ///
    /// # Errors
    /// - `Configuration` for a non-positive sampling frequency
    /// - `InsufficientData` if the grid or the raw history has fewer than two samples
    pub fn to_time_series(&self, sampling_frequency: f64) -> Result<TimeSeries> {
        let num_samples = (self.duration * sampling_frequency).round() as usize;
        if num_samples < 2 {
            return Err(SolverError::InsufficientData(format!(
                "{} Hz over {} s gives fewer than two samples",
                sampling_frequency, self.duration
            )));
        }
        let mut series = TimeSeries::uniform(sampling_frequency, num_samples)?;
        let grid = series.time().to_vec();

        let response = self.nodal_response();
        for (node, accel) in response.acceleration.iter().enumerate() {
            let spline = CubicSpline::natural(&response.time, accel)?;
            series.insert_channel(ChannelId::Response(node), spline.evaluate_many(&grid))?;
        }

        let loaded_node = self.forcing.dof / self.dofs_per_node;
        for node in 0..response.acceleration.len() {
            let values = if node == loaded_node {
                grid.iter().map(|&t| self.forcing.force(t)).collect()
            } else {
                vec![0.0; grid.len()]
            };
            series.insert_channel(ChannelId::Force(node), values)?;
        }

        debug!(
            num_samples,
            sampling_frequency,
            raw_samples = self.time.len(),
            "resampled transient response"
        );
        Ok(series)
    }
}

/// z' = A z + g(t) w on the interleaved state
struct FirstOrderSystem {
    a: DMatrix<f64>,
    load: DVector<f64>,
}

impl FirstOrderSystem {
    fn new(model: &ModalModel, load_index: usize) -> Result<Self> {
        let n = model.mass().nrows();
        let chol = model.mass().clone().cholesky().ok_or_else(|| {
            SolverError::SingularSystem("Mass matrix is not positive definite".to_string())
        })?;
        let minv_c = chol.solve(model.damping());
        let minv_k = chol.solve(model.stiffness());
        let mut unit = DVector::zeros(n);
        unit[load_index] = 1.0;
        let minv_e = chol.solve(&unit);

        let mut a = DMatrix::zeros(2 * n, 2 * n);
        let mut load = DVector::zeros(2 * n);
        for i in 0..n {
            for j in 0..n {
                a[(2 * i, 2 * j)] = -minv_c[(i, j)];
                a[(2 * i, 2 * j + 1)] = -minv_k[(i, j)];
            }
            a[(2 * i + 1, 2 * i)] = 1.0;
            load[2 * i] = minv_e[i];
        }
        Ok(Self { a, load })
    }

    fn derivative(&self, z: &DVector<f64>, g: f64) -> DVector<f64> {
        &self.a * z + &self.load * g
    }
}

/// Adaptive SDIRK integrator bound to one modal model
pub struct DynamicSolver<'a> {
    model: &'a ModalModel,
    config: IntegratorConfig,
}

impl<'a> DynamicSolver<'a> {
    pub fn new(model: &'a ModalModel, config: IntegratorConfig) -> Self {
        Self { model, config }
    }

    /// Integrate from rest (or `initial_state`) over `[0, duration]`
    ///
    /// # Arguments
    /// * `forcing` - Load applied at one free global DOF
    /// * `duration` - End time [s]
    /// * `initial_state` - Interleaved `[v, u]` per global DOF (length
    ///   `2 * num_dofs`, zero at constrained DOFs); zero when `None`
    ///
    /// # Errors
    /// - `Configuration` for invalid tolerances, duration, forcing or initial state
    /// - `SingularSystem` if a stage matrix cannot be factorised
    /// - `Integration` on step-size underflow or when `max_steps` is exhausted
    pub fn solve(
        &self,
        forcing: &Forcing,
        duration: f64,
        initial_state: Option<&DVector<f64>>,
    ) -> Result<DynamicResults> {
        self.config.validate()?;
        forcing.excitation.validate()?;
        if !(duration > 0.0 && duration.is_finite()) {
            return Err(SolverError::Configuration(format!(
                "Simulation duration must be positive, got {}",
                duration
            )));
        }

        let reduced = self.model.reduced();
        let load_index = reduced.reduced_index(forcing.dof).ok_or_else(|| {
            SolverError::Configuration(format!(
                "Forcing DOF {} is constrained or out of range",
                forcing.dof
            ))
        })?;
        let system = FirstOrderSystem::new(self.model, load_index)?;
        let z0 = self.reduce_initial_state(initial_state)?;

        let mut breakpoints = forcing.excitation.breakpoints(duration);
        breakpoints.push(duration);

        let cfg = &self.config;
        let dim = z0.len();
        let mut stats = IntegrationStats::default();
        let mut time = vec![0.0];
        let mut states = vec![self.expand_state(&z0)];

        let mut t = 0.0;
        let mut z = z0;
        let mut h = cfg
            .initial_step
            .unwrap_or_else(|| initial_step(&system, &z, forcing.force(0.0), cfg))
            .min(cfg.max_step);
        let iteration_matrix = |step: f64| DMatrix::identity(dim, dim) - &system.a * (GAMMA * step);
        let mut factor_step = h;
        let mut lu = iteration_matrix(h).lu();
        stats.lu_factorizations += 1;
        let mut stages: Vec<DVector<f64>> = vec![DVector::zeros(dim); STAGES];

        for &segment_end in &breakpoints {
            while t < segment_end {
                if stats.accepted_steps + stats.rejected_steps >= cfg.max_steps {
                    return Err(SolverError::Integration(format!(
                        "Step limit of {} reached at t = {:.6} s",
                        cfg.max_steps, t
                    )));
                }

                let remaining = segment_end - t;
                let lands = h >= remaining;
                let step = if lands { remaining } else { h };
                if step <= 16.0 * f64::EPSILON * t.abs().max(1.0) && !lands {
                    return Err(SolverError::Integration(format!(
                        "Step size underflow at t = {:.6} s",
                        t
                    )));
                }
                let step_end = if lands { segment_end } else { t + step };

                if step != factor_step {
                    lu = iteration_matrix(step).lu();
                    factor_step = step;
                    stats.lu_factorizations += 1;
                }

                for i in 0..STAGES {
                    let mut base = z.clone();
                    for (j, kj) in stages.iter().enumerate().take(i) {
                        base.axpy(step * STAGE_COEFFS[i][j], kj, 1.0);
                    }
                    let stage_time = (t + STAGE_TIMES[i] * step).min(step_end);
                    let rhs = system.derivative(&base, forcing.force(stage_time));
                    stages[i] = lu.solve(&rhs).ok_or_else(|| {
                        SolverError::SingularSystem(format!(
                            "Stage matrix is singular for step {:.3e} s",
                            step
                        ))
                    })?;
                }

                let mut z_new = z.clone();
                let mut err = DVector::zeros(dim);
                for i in 0..STAGES {
                    z_new.axpy(step * STAGE_COEFFS[STAGES - 1][i], &stages[i], 1.0);
                    err.axpy(step * ERROR_WEIGHTS[i], &stages[i], 1.0);
                }
                let err_norm = error_norm(&err, &z, &z_new, cfg);

                if err_norm <= 1.0 {
                    t = step_end;
                    z = z_new;
                    time.push(t);
                    states.push(self.expand_state(&z));
                    stats.accepted_steps += 1;

                    let proposed = step * step_factor(err_norm, MAX_FACTOR);
                    // A short landing step says nothing about the natural step size
                    h = if lands && step < h { h.max(proposed) } else { proposed };
                    h = h.min(cfg.max_step);
                } else {
                    stats.rejected_steps += 1;
                    h = step * step_factor(err_norm, 1.0);
                }
            }
        }

        info!(
            duration,
            accepted = stats.accepted_steps,
            rejected = stats.rejected_steps,
            factorizations = stats.lu_factorizations,
            "transient integration finished"
        );

        Ok(DynamicResults {
            time,
            states,
            stats,
            dofs_per_node: self.model.dofs_per_node(),
            forcing: forcing.clone(),
            duration,
        })
    }

    fn reduce_initial_state(&self, initial_state: Option<&DVector<f64>>) -> Result<DVector<f64>> {
        let reduced = self.model.reduced();
        let Some(full) = initial_state else {
            return Ok(DVector::zeros(2 * reduced.num_free()));
        };
        if full.len() != 2 * reduced.num_dofs {
            return Err(SolverError::Configuration(format!(
                "Initial state has {} entries, expected {}",
                full.len(),
                2 * reduced.num_dofs
            )));
        }
        for dof in 0..reduced.num_dofs {
            if reduced.reduced_index(dof).is_none()
                && (full[2 * dof] != 0.0 || full[2 * dof + 1] != 0.0)
            {
                return Err(SolverError::Configuration(format!(
                    "Initial state is non-zero at constrained DOF {}",
                    dof
                )));
            }
        }
        Ok(DVector::from_iterator(
            2 * reduced.num_free(),
            reduced
                .free_dofs
                .iter()
                .flat_map(|&dof| [full[2 * dof], full[2 * dof + 1]]),
        ))
    }

    fn expand_state(&self, z: &DVector<f64>) -> DVector<f64> {
        let reduced = self.model.reduced();
        let mut full = DVector::zeros(2 * reduced.num_dofs);
        for (r, &dof) in reduced.free_dofs.iter().enumerate() {
            full[2 * dof] = z[2 * r];
            full[2 * dof + 1] = z[2 * r + 1];
        }
        full
    }
}

fn error_norm(err: &DVector<f64>, z_old: &DVector<f64>, z_new: &DVector<f64>, cfg: &IntegratorConfig) -> f64 {
    if err.is_empty() {
        return 0.0;
    }
    let sum: f64 = err
        .iter()
        .zip(z_old.iter().zip(z_new.iter()))
        .map(|(e, (a, b))| {
            let scale = cfg.atol + cfg.rtol * a.abs().max(b.abs());
            (e / scale).powi(2)
        })
        .sum();
    let norm = (sum / err.len() as f64).sqrt();
    if norm.is_finite() { norm } else { f64::INFINITY }
}

fn step_factor(err_norm: f64, max_factor: f64) -> f64 {
    if err_norm == 0.0 {
        return max_factor;
    }
    (SAFETY * err_norm.powf(-0.25)).clamp(MIN_FACTOR, max_factor)
}

/// Starting step from the size of the state and its derivative
fn initial_step(system: &FirstOrderSystem, z0: &DVector<f64>, g0: f64, cfg: &IntegratorConfig) -> f64 {
    let f0 = system.derivative(z0, g0);
    let scaled_norm = |v: &DVector<f64>| {
        let sum: f64 = v
            .iter()
            .zip(z0.iter())
            .map(|(x, z)| (x / (cfg.atol + cfg.rtol * z.abs())).powi(2))
            .sum();
        (sum / v.len().max(1) as f64).sqrt()
    };
    let d0 = scaled_norm(z0);
    let d1 = scaled_norm(&f0);
    if d0 < 1e-5 || d1 < 1e-5 {
        1e-6
    } else {
        0.01 * d0 / d1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary_conditions::BoundaryConditions;
    use crate::elements::BeamSection;
    use crate::forcing::Excitation;
    use crate::materials::Material;
    use crate::modal_model::{DampingTargets, ModalOptions};
    use crate::model::BeamModel;
    use approx::assert_relative_eq;

    fn beam() -> BeamModel {
        BeamModel::new(0.65, 4, BeamSection::rectangular(0.03, 0.01), Material::steel())
    }

    fn undamped() -> ModalOptions {
        ModalOptions {
            damping: DampingTargets {
                zeta1: 0.0,
                zeta2: 0.0,
            },
            ..ModalOptions::default()
        }
    }

    #[test]
    fn coefficients_are_consistent() {
        for i in 0..STAGES {
            let row_sum: f64 = STAGE_COEFFS[i].iter().sum();
            assert_relative_eq!(row_sum, STAGE_TIMES[i], epsilon = 1e-14);
        }
        let err_sum: f64 = ERROR_WEIGHTS.iter().sum();
        assert_relative_eq!(err_sum, 0.0, epsilon = 1e-14);
    }

    #[test]
    fn stays_at_rest_without_load() {
        let model = ModalModel::build(&beam(), &BoundaryConditions::free_free(), &undamped()).unwrap();
        let forcing = Forcing::new(0, 0.0, Excitation::Step);
        let results = DynamicSolver::new(&model, IntegratorConfig::default())
            .solve(&forcing, 0.05, None)
            .unwrap();
        assert!(results.states.iter().all(|z| z.amax() == 0.0));
        assert_eq!(*results.time.last().unwrap(), 0.05);
    }

    #[test]
    fn impulse_transfers_unit_momentum() {
        let model = ModalModel::build(&beam(), &BoundaryConditions::free_free(), &undamped()).unwrap();
        let forcing = Forcing::new(0, 1.0, Excitation::Impulse { duration: 5e-4 });
        let results = DynamicSolver::new(&model, IntegratorConfig::default())
            .solve(&forcing, 0.01, None)
            .unwrap();

        // Pulse end is a breakpoint, so it is an accepted step time
        assert!(results.time.contains(&5e-4));

        // Linear momentum r^T M v, r = rigid translation
        let mass = &model.system().mass;
        let rigid = DVector::from_fn(mass.nrows(), |i, _| if i % 2 == 0 { 1.0 } else { 0.0 });
        let z = results.states.last().unwrap();
        let velocity = DVector::from_fn(mass.nrows(), |i, _| z[2 * i]);
        let momentum = rigid.dot(&(mass * velocity));
        assert_relative_eq!(momentum, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn step_load_settles_to_static_deflection() {
        let model = ModalModel::build(
            &beam(),
            &BoundaryConditions::cantilever(),
            &ModalOptions {
                damping: DampingTargets {
                    zeta1: 0.2,
                    zeta2: 0.2,
                },
                ..ModalOptions::default()
            },
        )
        .unwrap();
        // Tip transverse DOF of node 4
        let forcing = Forcing::new(8, 1.0, Excitation::Step);
        let results = DynamicSolver::new(&model, IntegratorConfig::default())
            .solve(&forcing, 1.0, None)
            .unwrap();

        let b = beam();
        let stat = b.length.powi(3) / (3.0 * b.material.elastic_modulus * b.section.second_moment);
        let response = results.nodal_response();
        let tip = *response.displacement[4].last().unwrap();
        assert_relative_eq!(tip, stat, max_relative = 1e-2);
        // Clamped node never moves
        assert!(response.displacement[0].iter().all(|u| *u == 0.0));
    }

    #[test]
    fn extracts_nodes_with_fixed_stride() {
        let model = ModalModel::build(&beam(), &BoundaryConditions::free_free(), &ModalOptions::default())
            .unwrap();
        let forcing = Forcing::new(0, 1.0, Excitation::Impulse { duration: 5e-4 });
        let results = DynamicSolver::new(&model, IntegratorConfig::default())
            .solve(&forcing, 0.02, None)
            .unwrap();
        assert_eq!(results.node_stride(), 4);

        let response = results.nodal_response();
        assert_eq!(response.displacement.len(), 5);
        assert_eq!(response.acceleration[0].len(), results.time.len());
        assert_eq!(response.acceleration[0][0], 0.0);
        let k = results.time.len() / 2;
        assert_eq!(response.displacement[2][k], results.states[k][9]);
        assert_eq!(response.velocity[2][k], results.states[k][8]);
    }

    #[test]
    fn resamples_to_uniform_channels() {
        let model = ModalModel::build(&beam(), &BoundaryConditions::free_free(), &ModalOptions::default())
            .unwrap();
        let forcing = Forcing::new(0, 2.0, Excitation::Impulse { duration: 5e-4 });
        let results = DynamicSolver::new(&model, IntegratorConfig::default())
            .solve(&forcing, 0.05, None)
            .unwrap();
        let series = results.to_time_series(10_000.0).unwrap();

        assert_eq!(series.len(), 500);
        assert!(series.is_uniform(1e-9));
        assert_eq!(series.response_channels().len(), 5);
        assert_eq!(series.force_channels().len(), 5);
        let f0 = series.channel(ChannelId::Force(0)).unwrap();
        assert_relative_eq!(f0[0], 4000.0, max_relative = 1e-12);
        assert_eq!(f0[100], 0.0);
        assert!(series.channel(ChannelId::Force(3)).unwrap().iter().all(|f| *f == 0.0));
    }

    #[test]
    fn rejects_constrained_forcing_dof() {
        let model =
            ModalModel::build(&beam(), &BoundaryConditions::cantilever(), &ModalOptions::default()).unwrap();
        let forcing = Forcing::new(0, 1.0, Excitation::Step);
        assert!(matches!(
            DynamicSolver::new(&model, IntegratorConfig::default()).solve(&forcing, 0.1, None),
            Err(SolverError::Configuration(_))
        ));
    }

    #[test]
    fn reports_exhausted_step_limit() {
        let model = ModalModel::build(&beam(), &BoundaryConditions::free_free(), &ModalOptions::default())
            .unwrap();
        let forcing = Forcing::new(0, 1.0, Excitation::Sine { frequency_hz: 200.0 });
        let config = IntegratorConfig {
            max_steps: 5,
            ..IntegratorConfig::default()
        };
        assert!(matches!(
            DynamicSolver::new(&model, config).solve(&forcing, 1.0, None),
            Err(SolverError::Integration(_))
        ));
    }

    #[test]
    fn rejects_bad_initial_state() {
        let model = ModalModel::build(&beam(), &BoundaryConditions::free_free(), &ModalOptions::default())
            .unwrap();
        let forcing = Forcing::new(0, 0.0, Excitation::Step);
        let short = DVector::zeros(3);
        assert!(
            DynamicSolver::new(&model, IntegratorConfig::default())
                .solve(&forcing, 0.1, Some(&short))
                .is_err()
        );
    }
}
