//! Beam finite-element model, FRF extraction and modal identification.
//!
//! The crate covers the full virtual-rig chain for a slender beam:
//!
//! - Euler–Bernoulli elements assembled into global mass and stiffness
//!   matrices, reduced by the boundary conditions
//! - generalised eigenproblem for natural frequencies and mode shapes, with
//!   Rayleigh damping fitted to two target damping ratios
//! - time-domain response to impulse, step and sine-type forcing with an
//!   adaptive L-stable integrator, resampled onto a uniform grid
//! - analytical and FFT-based frequency response functions
//! - peak picking, half-power and Nyquist circle-fit damping, and mode-shape
//!   extraction
//!
//! # Example
//!
//! ```no_run
//! use gle_solver::{
//!     BeamModel, BeamSection, BoundaryConditions, DynamicSolver, Excitation, Forcing,
//!     IdentificationConfig, IntegratorConfig, Material, ModalModel, ModalOptions,
//!     identification::identify_time_series,
//! };
//!
//! # fn main() -> gle_solver::Result<()> {
//! let beam = BeamModel::new(0.65, 4, BeamSection::rectangular(0.03, 0.01), Material::steel());
//! let bcs = BoundaryConditions::free_free();
//! let model = ModalModel::build(&beam, &bcs, &ModalOptions::default())?;
//!
//! let forcing = Forcing::new(0, 1.0, Excitation::Impulse { duration: 5e-4 });
//! let response = DynamicSolver::new(&model, IntegratorConfig::default()).solve(&forcing, 2.0, None)?;
//! let series = response.to_time_series(10_000.0)?;
//!
//! let result = identify_time_series(&series, &IdentificationConfig::default())?;
//! for mode in &result.modes {
//!     println!("{:.1} Hz, zeta = {:.4}", mode.natural_frequency_hz, mode.damping_ratio());
//! }
//! # Ok(())
//! # }
//! ```

pub mod assembly;
pub mod boundary_conditions;
pub mod config;
pub mod damping;
pub mod dynamic_solver;
pub mod elements;
pub mod error;
pub mod forcing;
pub mod frequency_response;
pub mod frf;
pub mod identification;
pub mod interpolation;
pub mod materials;
pub mod modal_model;
pub mod modal_solver;
pub mod model;
pub mod sdof;
pub mod signal;
pub mod time_series;

pub use assembly::{GlobalSystem, ReducedSystem};
pub use boundary_conditions::{BoundaryConditions, DofId};
pub use config::IdentificationConfig;
pub use damping::RayleighDamping;
pub use dynamic_solver::{
    DynamicResults, DynamicSolver, IntegrationStats, IntegratorConfig, NodalResponse,
};
pub use elements::{BeamSection, Element, EulerBernoulliBeam};
pub use error::{Result, SolverError};
pub use forcing::{Excitation, Forcing};
pub use frequency_response::{AnalyticalSweep, ChannelFrf, SpectralOptions, experimental_frf};
pub use frf::{Bode, FrequencyBand, Frf, FrfKind, GuardReport};
pub use identification::{IdentificationResult, IdentifiedMode, PeakPicking, identify};
pub use interpolation::CubicSpline;
pub use materials::Material;
pub use modal_model::{DampingTargets, ModalModel, ModalOptions};
pub use modal_solver::{ModalResults, ModalSolver, RigidBodyPolicy};
pub use model::BeamModel;
pub use sdof::Sdof;
pub use time_series::{ChannelId, TimeSeries};
