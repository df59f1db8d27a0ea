//! Modal identification from measured or simulated FRFs.
//!
//! Each call is a pure function of its inputs. The workflow:
//!
//! 1. Validate the configuration and select the active response channels
//!    (at least two are needed for a relative mode shape)
//! 2. Convert the reference channel to the configured representation and
//!    restrict it to the analysis band before any peak search
//! 3. Pick peaks, then for each peak:
//!    - half-power bandwidth damping (peaks without both crossings are skipped)
//!    - Nyquist circle fit as an independent cross-check
//!    - mode shape from the receptance of every active channel
//!
//! Skipped peaks are reported with a reason so that callers can tell when
//! fewer modes than peaks were returned.

pub mod circle_fit;
pub mod half_power;
pub mod mode_shapes;
pub mod peaks;

pub use circle_fit::{Circle, CircleFit, NyquistEstimate, fit_circle, nyquist_estimate};
pub use half_power::{HalfPowerEstimate, half_power};
pub use mode_shapes::mode_shape;
pub use peaks::{Peak, PeakPicking};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::IdentificationConfig;
use crate::error::{Result, SolverError};
use crate::frequency_response::{ChannelFrf, experimental_frf};
use crate::frf::{Frf, FrfKind, GuardReport};
use crate::time_series::{ChannelId, TimeSeries};

/// Minimum number of bins on each side of the peak in the circle window
const MIN_CIRCLE_HALF_WIDTH: usize = 3;

/// One identified resonance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifiedMode {
    /// Peak frequency [Hz]
    pub natural_frequency_hz: f64,
    /// Half-power frequencies and damping ratio
    pub half_power: HalfPowerEstimate,
    /// Circle-fit estimate; `None` when the fit failed
    pub nyquist: Option<NyquistEstimate>,
    /// One entry per active channel, max |·| = 1
    pub mode_shape: Vec<f64>,
    pub peak: Peak,
}

impl IdentifiedMode {
    pub fn damping_ratio(&self) -> f64 {
        self.half_power.damping_ratio
    }
}

/// A peak that could not be fully characterised
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedPeak {
    pub frequency_hz: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentificationResult {
    pub modes: Vec<IdentifiedMode>,
    pub skipped: Vec<SkippedPeak>,
    /// Active channels, in mode-shape order
    pub channels: Vec<ChannelId>,
    /// Channel used for peak picking and as the sign reference
    pub reference: ChannelId,
    /// FRFs of the active channels as supplied
    pub frfs: Vec<ChannelFrf>,
    pub guards: GuardReport,
}

impl IdentificationResult {
    pub fn natural_frequencies_hz(&self) -> Vec<f64> {
        self.modes.iter().map(|m| m.natural_frequency_hz).collect()
    }

    pub fn damping_ratios(&self) -> Vec<f64> {
        self.modes.iter().map(IdentifiedMode::damping_ratio).collect()
    }
}

/// Identify modes from per-channel FRFs
///
/// # Errors
/// - `Configuration` for an invalid configuration, an enabled accelerometer
///   without an FRF, or active channels on different frequency axes
/// - `InsufficientData` with fewer than two active channels, or a band that
///   misses the data
/// - `NoResonanceFound` if no peak passes the picking thresholds
pub fn identify(frfs: &[ChannelFrf], config: &IdentificationConfig) -> Result<IdentificationResult> {
    config.validate()?;
    let wanted = config.active_channels()?;
    if let Some(missing) = wanted
        .iter()
        .find(|id| !frfs.iter().any(|c| c.channel == **id))
    {
        return Err(SolverError::Configuration(format!(
            "Enabled accelerometer {} has no FRF",
            missing
        )));
    }
    let active: Vec<ChannelFrf> = frfs
        .iter()
        .filter(|c| wanted.contains(&c.channel))
        .cloned()
        .collect();
    if active.len() < 2 {
        return Err(SolverError::InsufficientData(format!(
            "Mode shapes need at least 2 active channels, got {}",
            active.len()
        )));
    }
    let channels: Vec<ChannelId> = active.iter().map(|c| c.channel).collect();
    let reference = config
        .reference_channel(&channels)
        .ok_or_else(|| SolverError::InsufficientData("No reference channel".to_string()))?;
    let reference_pos = channels
        .iter()
        .position(|c| *c == reference)
        .ok_or_else(|| SolverError::InsufficientData("No reference channel".to_string()))?;
    let axis = &active[reference_pos].frf.frequencies_hz;
    if let Some(other) = active.iter().find(|c| c.frf.frequencies_hz != *axis) {
        return Err(SolverError::Configuration(format!(
            "Channel {} is not sampled on the frequency axis of reference {}",
            other.channel, reference
        )));
    }

    let mut guards = GuardReport::default();
    let (analysis, report) = active[reference_pos].frf.convert(config.representation);
    guards.merge(report);
    let band = config.band()?.clip_to(&analysis)?;
    let analysis = analysis.restrict(&band);

    let receptances: Vec<Frf> = active
        .iter()
        .map(|c| {
            let (receptance, report) = c.frf.convert(FrfKind::Receptance);
            guards.merge(report);
            receptance.restrict(&band)
        })
        .collect();

    let peaks = config.peaks.find_peaks(&analysis);
    debug!(
        reference = %reference,
        f_min = band.f_min,
        f_max = band.f_max,
        peaks = peaks.len(),
        "peak picking"
    );
    if peaks.is_empty() {
        return Err(SolverError::NoResonanceFound {
            f_min: band.f_min,
            f_max: band.f_max,
        });
    }

    let resolution = analysis.resolution().unwrap_or(f64::INFINITY);
    let mut modes = Vec::new();
    let mut skipped = Vec::new();
    for peak in peaks {
        let Some(hp) = half_power(&analysis, peak.index) else {
            skipped.push(SkippedPeak {
                frequency_hz: peak.frequency_hz,
                reason: "half-power level not crossed on both sides inside the band".to_string(),
            });
            continue;
        };

        let half_width = ((config.circle_window_factor * hp.bandwidth_hz() / resolution).ceil()
            as usize)
            .max(MIN_CIRCLE_HALF_WIDTH);
        let nyquist = match nyquist_estimate(&analysis, peak.index, half_width) {
            Ok(estimate) => Some(estimate),
            Err(err) => {
                warn!(frequency_hz = peak.frequency_hz, %err, "circle fit failed");
                None
            }
        };

        let values = receptances
            .iter()
            .map(|r| {
                r.values.get(peak.index).copied().ok_or_else(|| {
                    SolverError::InsufficientData(format!(
                        "No receptance bin at {} Hz",
                        peak.frequency_hz
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let shape = match mode_shape(&values, reference_pos) {
            Ok(shape) => shape,
            Err(err) => {
                skipped.push(SkippedPeak {
                    frequency_hz: peak.frequency_hz,
                    reason: format!("mode shape: {}", err),
                });
                continue;
            }
        };

        info!(
            frequency_hz = hp.natural_frequency_hz,
            damping_ratio = hp.damping_ratio,
            circle_frequency_hz = nyquist.map(|n| n.natural_frequency_hz),
            "identified mode"
        );
        modes.push(IdentifiedMode {
            natural_frequency_hz: hp.natural_frequency_hz,
            half_power: hp,
            nyquist,
            mode_shape: shape,
            peak,
        });
    }

    for skip in &skipped {
        warn!(frequency_hz = skip.frequency_hz, reason = %skip.reason, "peak skipped");
    }

    Ok(IdentificationResult {
        modes,
        skipped,
        channels,
        reference,
        frfs: active,
        guards,
    })
}

/// Force channel used for `series`: `F{shakerPosition}` when present,
/// otherwise the first force channel
///
/// # Errors
/// `InsufficientData` when the series has no force channel
pub fn force_channel(series: &TimeSeries, config: &IdentificationConfig) -> Result<ChannelId> {
    let forces = series.force_channels();
    let at_shaker = ChannelId::Force(config.shaker_position);
    if forces.contains(&at_shaker) {
        return Ok(at_shaker);
    }
    forces.first().copied().ok_or_else(|| {
        SolverError::InsufficientData("Time series has no force channel".to_string())
    })
}

/// Identify modes from a force/response time series
///
/// The force channel is chosen by [`force_channel`].
///
/// # Errors
/// As [`identify`] and [`experimental_frf`]: `Configuration` when an enabled
/// accelerometer has no channel in the series, `InsufficientData` when there
/// is no force channel
pub fn identify_time_series(
    series: &TimeSeries,
    config: &IdentificationConfig,
) -> Result<IdentificationResult> {
    config.validate()?;
    let force = force_channel(series, config)?;
    let responses = config.active_channels()?;

    let (frfs, spectral_guards) =
        experimental_frf(series, force, &responses, &config.spectral_options())?;
    let mut result = identify(&frfs, config)?;
    result.guards.merge(spectral_guards);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdof::Sdof;
    use std::f64::consts::PI;

    /// Two-mode inertance with per-channel modal amplitudes
    fn two_mode_frfs(amplitudes: &[(f64, f64)]) -> Vec<ChannelFrf> {
        let m1 = Sdof::from_modal(120.0, 0.02, 1.0).unwrap();
        let m2 = Sdof::from_modal(340.0, 0.02, 1.0).unwrap();
        let freqs: Vec<f64> = (0..6000).map(|i| i as f64 * 0.1).collect();
        amplitudes
            .iter()
            .enumerate()
            .map(|(i, (a1, a2))| {
                let values = freqs
                    .iter()
                    .map(|f| {
                        let w = 2.0 * PI * f;
                        m1.inertance(w) * *a1 + m2.inertance(w) * *a2
                    })
                    .collect();
                ChannelFrf {
                    channel: ChannelId::Response(i),
                    frf: Frf::new(freqs.clone(), values, FrfKind::Inertance).unwrap(),
                }
            })
            .collect()
    }

    fn config_for(n: usize) -> IdentificationConfig {
        IdentificationConfig {
            accelerometers: (0..n).map(|i| (format!("A{}", i), true)).collect(),
            ..IdentificationConfig::default()
        }
    }

    #[test]
    fn identifies_two_modes_with_shapes() {
        let frfs = two_mode_frfs(&[(1.0, 1.0), (0.5, -1.0), (-0.25, 0.5)]);
        let result = identify(&frfs, &config_for(3)).unwrap();

        assert_eq!(result.modes.len(), 2);
        assert!(result.skipped.is_empty());
        assert!((result.modes[0].natural_frequency_hz - 120.0).abs() < 0.5);
        assert!((result.modes[1].natural_frequency_hz - 340.0).abs() < 1.0);
        for mode in &result.modes {
            assert!((mode.damping_ratio() - 0.02).abs() < 0.004);
            let max = mode.mode_shape.iter().fold(0.0_f64, |a, v| a.max(v.abs()));
            assert!((max - 1.0).abs() < 1e-12);
            assert!(mode.nyquist.is_some());
        }
        // Relative signs of the second mode follow the amplitudes
        let shape = &result.modes[1].mode_shape;
        assert!(shape[0] > 0.0 && shape[1] < 0.0 && shape[2] > 0.0);
        assert_eq!(result.reference, ChannelId::Response(0));
        // DC bin of every channel hits the ω = 0 guard in the receptance conversion
        assert_eq!(result.guards.zero_frequency_bins, 4);
    }

    #[test]
    fn single_channel_is_insufficient() {
        let frfs = two_mode_frfs(&[(1.0, 1.0)]);
        assert!(matches!(
            identify(&frfs, &config_for(1)),
            Err(SolverError::InsufficientData(_))
        ));
    }

    #[test]
    fn empty_band_reports_no_resonance() {
        let frfs = two_mode_frfs(&[(1.0, 1.0), (0.5, -1.0)]);
        let config = IdentificationConfig {
            lower_cutoff: 400.0,
            upper_cutoff: 500.0,
            ..config_for(2)
        };
        let err = identify(&frfs, &config).unwrap_err();
        assert!(matches!(err, SolverError::NoResonanceFound { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn peak_at_band_edge_is_skipped() {
        let frfs = two_mode_frfs(&[(1.0, 1.0), (0.5, -1.0)]);
        // Band ends 1 Hz past the first resonance: no upper half-power crossing
        let config = IdentificationConfig {
            lower_cutoff: 50.0,
            upper_cutoff: 121.0,
            peaks: PeakPicking {
                prominence_db: 0.3,
                min_distance_hz: 10.0,
            },
            ..config_for(2)
        };
        let result = identify(&frfs, &config).unwrap();
        assert!(result.modes.is_empty());
        assert_eq!(result.skipped.len(), 1);
        assert!((result.skipped[0].frequency_hz - 120.0).abs() < 0.5);
    }

    #[test]
    fn enabled_accelerometer_without_frf_is_rejected() {
        // Default configuration enables A0..A4
        let frfs = two_mode_frfs(&[(1.0, 1.0), (0.5, -1.0)]);
        let err = identify(&frfs, &IdentificationConfig::default()).unwrap_err();
        match err {
            SolverError::Configuration(message) => assert!(message.contains("A2")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn mismatched_frequency_axes_are_rejected() {
        let mut frfs = two_mode_frfs(&[(1.0, 1.0), (0.5, -1.0)]);
        // A1 on a 0..60 Hz axis with the same bin count as A0's 0..600 Hz
        let coarse = frfs[0].frf.frequencies_hz.iter().map(|f| f * 0.1).collect();
        frfs[1].frf = Frf::new(coarse, frfs[1].frf.values.clone(), FrfKind::Inertance).unwrap();
        assert!(matches!(
            identify(&frfs, &config_for(2)),
            Err(SolverError::Configuration(_))
        ));
    }

    #[test]
    fn time_series_without_force_is_rejected() {
        let mut series = TimeSeries::uniform(100.0, 8).unwrap();
        series
            .insert_channel(ChannelId::Response(0), vec![0.0; 8])
            .unwrap();
        series
            .insert_channel(ChannelId::Response(1), vec![0.0; 8])
            .unwrap();
        assert!(matches!(
            identify_time_series(&series, &config_for(2)),
            Err(SolverError::InsufficientData(_))
        ));
    }

    #[test]
    fn missing_enabled_channel_is_a_configuration_error() {
        let mut series = TimeSeries::uniform(100.0, 8).unwrap();
        series
            .insert_channel(ChannelId::Force(0), vec![1.0; 8])
            .unwrap();
        series
            .insert_channel(ChannelId::Response(0), vec![0.0; 8])
            .unwrap();
        assert!(matches!(
            identify_time_series(&series, &config_for(2)),
            Err(SolverError::Configuration(_))
        ));
    }
}
