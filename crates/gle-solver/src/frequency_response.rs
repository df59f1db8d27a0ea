//! Analytical and experimental frequency response functions.
//!
//! # Analytical path
//!
//! For each angular frequency ω the full receptance matrix
//!
//! ```text
//! H(ω) = (K - ω²M + iωC)^-1
//! ```
//!
//! is formed by LU inversion of the complex dynamic stiffness. Frequencies are
//! independent and are solved in parallel; output order follows the input.
//!
//! # Experimental path
//!
//! Paired force and response records are transformed with a forward FFT, the
//! non-negative half of the spectrum is kept (bins `0..=n/2`) and
//! `H = FFT(response) / FFT(force)` is formed bin by bin. Where the force
//! spectrum magnitude drops below [`FORCE_GUARD`], machine epsilon is used as
//! the divisor and the bin is counted in the [`GuardReport`].

use std::f64::consts::PI;

use nalgebra::DMatrix;
use num_complex::Complex64;
use rayon::prelude::*;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, SolverError};
use crate::frf::{Frf, FrfKind, GuardReport};
use crate::modal_model::ModalModel;
use crate::signal::remove_mean;
use crate::time_series::{ChannelId, TimeSeries};

/// Force-spectrum magnitude below which the division is guarded
pub const FORCE_GUARD: f64 = 1e-10;

/// Receptance matrices `(K - ω²M + iωC)^-1`, one per angular frequency
///
/// # Errors
/// - `Configuration` if the matrix shapes disagree
/// - `SingularSystem` if the dynamic stiffness is singular at some ω
///   (e.g. ω = 0 for an unconstrained model)
pub fn analytical_receptance(
    mass: &DMatrix<f64>,
    stiffness: &DMatrix<f64>,
    damping: &DMatrix<f64>,
    angular_frequencies: &[f64],
) -> Result<Vec<DMatrix<Complex64>>> {
    let n = mass.nrows();
    for (name, m) in [("mass", mass), ("stiffness", stiffness), ("damping", damping)] {
        if m.nrows() != n || m.ncols() != n {
            return Err(SolverError::Configuration(format!(
                "{} matrix is {}x{}, expected {}x{}",
                name,
                m.nrows(),
                m.ncols(),
                n,
                n
            )));
        }
    }

    angular_frequencies
        .par_iter()
        .map(|&omega| {
            let dynamic = DMatrix::from_fn(n, n, |i, j| {
                Complex64::new(
                    stiffness[(i, j)] - omega * omega * mass[(i, j)],
                    omega * damping[(i, j)],
                )
            });
            dynamic.lu().try_inverse().ok_or_else(|| {
                SolverError::SingularSystem(format!(
                    "Dynamic stiffness is singular at {:.4} rad/s",
                    omega
                ))
            })
        })
        .collect()
}

/// Receptance sweep of a modal model, addressed by global DOF
#[derive(Debug, Clone)]
pub struct AnalyticalSweep {
    pub frequencies_hz: Vec<f64>,
    receptance: Vec<DMatrix<Complex64>>,
    free_dofs: Vec<usize>,
}

impl AnalyticalSweep {
    /// Solve the receptance matrix at every frequency of `frequencies_hz`
    pub fn compute(model: &ModalModel, frequencies_hz: &[f64]) -> Result<Self> {
        let omegas: Vec<f64> = frequencies_hz.iter().map(|f| 2.0 * PI * f).collect();
        let receptance =
            analytical_receptance(model.mass(), model.stiffness(), model.damping(), &omegas)?;
        debug!(
            frequencies = frequencies_hz.len(),
            dofs = model.mass().nrows(),
            "analytical receptance sweep"
        );
        Ok(Self {
            frequencies_hz: frequencies_hz.to_vec(),
            receptance,
            free_dofs: model.reduced().free_dofs.clone(),
        })
    }

    /// Receptance matrix at sweep index `index` (free DOFs only)
    pub fn matrix(&self, index: usize) -> Option<&DMatrix<Complex64>> {
        self.receptance.get(index)
    }

    /// Transfer function from a force at `excitation_dof` to the response at
    /// `response_dof` (global DOF indices) in representation `kind`
    ///
    /// # Errors
    /// `Configuration` if either DOF is constrained or out of range
    pub fn transfer(
        &self,
        excitation_dof: usize,
        response_dof: usize,
        kind: FrfKind,
    ) -> Result<(Frf, GuardReport)> {
        let locate = |dof: usize| {
            self.free_dofs.binary_search(&dof).map_err(|_| {
                SolverError::Configuration(format!("DOF {} is constrained or out of range", dof))
            })
        };
        let col = locate(excitation_dof)?;
        let row = locate(response_dof)?;
        let receptance = Frf::new(
            self.frequencies_hz.clone(),
            self.receptance.iter().map(|h| h[(row, col)]).collect(),
            FrfKind::Receptance,
        )?;
        Ok(receptance.convert(kind))
    }
}

/// Options of the FFT-based estimate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpectralOptions {
    /// Sampling frequency [Hz]; `1 / (t1 - t0)` when `None`
    pub sampling_frequency: Option<f64>,
    /// Subtract each channel's mean before the transform
    pub remove_mean: bool,
}

/// Experimental FRF of one response channel
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelFrf {
    pub channel: ChannelId,
    pub frf: Frf,
}

/// Inertance FRFs of `responses` relative to `force`
///
/// # Errors
/// - `InsufficientData` with no response channels or fewer than two samples
/// - `Configuration` if a channel is missing or the sampling frequency is not positive
pub fn experimental_frf(
    series: &TimeSeries,
    force: ChannelId,
    responses: &[ChannelId],
    options: &SpectralOptions,
) -> Result<(Vec<ChannelFrf>, GuardReport)> {
    if responses.is_empty() {
        return Err(SolverError::InsufficientData(
            "No response channels selected".to_string(),
        ));
    }
    let n = series.len();
    if n < 2 {
        return Err(SolverError::InsufficientData(format!(
            "FFT needs at least two samples, series has {}",
            n
        )));
    }
    let fs = match options.sampling_frequency {
        Some(fs) => fs,
        None => series.sampling_frequency()?,
    };
    if !(fs.is_finite() && fs > 0.0) {
        return Err(SolverError::Configuration(format!(
            "Sampling frequency must be positive, got {}",
            fs
        )));
    }

    let channel = |id: ChannelId| {
        series
            .channel(id)
            .ok_or_else(|| SolverError::Configuration(format!("Channel {} not present", id)))
    };
    let force_values = channel(force)?;
    let response_values = responses
        .iter()
        .map(|&id| channel(id))
        .collect::<Result<Vec<_>>>()?;

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    let half = n / 2 + 1;
    let spectrum = |values: &[f64]| -> Vec<Complex64> {
        let centred;
        let values = if options.remove_mean {
            centred = remove_mean(values);
            centred.as_slice()
        } else {
            values
        };
        let mut buffer: Vec<Complex64> = values.iter().map(|v| Complex64::new(*v, 0.0)).collect();
        fft.process(&mut buffer);
        buffer.truncate(half);
        buffer
    };

    let mut guards = GuardReport::default();
    let force_spectrum: Vec<Complex64> = spectrum(force_values)
        .into_iter()
        .map(|f| {
            if f.norm() < FORCE_GUARD {
                guards.small_force_bins += 1;
                Complex64::new(f64::EPSILON, 0.0)
            } else {
                f
            }
        })
        .collect();
    if guards.small_force_bins > 0 {
        warn!(
            channel = %force,
            bins = guards.small_force_bins,
            "force spectrum below guard threshold; epsilon substituted"
        );
    }

    let frequencies_hz: Vec<f64> = (0..half).map(|k| k as f64 * fs / n as f64).collect();
    let frfs = responses
        .par_iter()
        .zip(response_values.par_iter())
        .map(|(&id, values)| {
            let values = spectrum(values)
                .into_iter()
                .zip(&force_spectrum)
                .map(|(a, f)| a / f)
                .collect();
            Ok(ChannelFrf {
                channel: id,
                frf: Frf::new(frequencies_hz.clone(), values, FrfKind::Inertance)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        samples = n,
        sampling_frequency = fs,
        channels = frfs.len(),
        "experimental FRFs"
    );
    Ok((frfs, guards))
}
