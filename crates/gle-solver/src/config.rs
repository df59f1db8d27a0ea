//! Validated configuration for modal identification.
//!
//! Deserialises the identification request document:
//!
//! ```json
//! {
//!   "accelerometers": { "A0": true, "A1": true, "A2": false },
//!   "samplingFreq": 10000,
//!   "lowerCutoff": 10,
//!   "upperCutoff": 1000,
//!   "shakerPosition": 0,
//!   "peaks": { "prominenceDb": 6, "minDistanceHz": 10 },
//!   "representation": "mobility",
//!   "circleWindowFactor": 1.0,
//!   "removeMean": false
//! }
//! ```
//!
//! Every field is optional; missing fields take the [`Default`] values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};
use crate::frequency_response::SpectralOptions;
use crate::frf::{FrequencyBand, FrfKind};
use crate::identification::PeakPicking;
use crate::time_series::ChannelId;

/// Number of accelerometer locations on the rig
pub const DEFAULT_LOCATIONS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IdentificationConfig {
    /// Enabled flag per response channel, keyed `A{i}` (or the bare index)
    pub accelerometers: BTreeMap<String, bool>,
    /// Sampling frequency [Hz]; derived from the time axis when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampling_freq: Option<f64>,
    /// Lower edge of the analysis band [Hz]
    pub lower_cutoff: f64,
    /// Upper edge of the analysis band [Hz]
    pub upper_cutoff: f64,
    /// Location index of the excitation
    pub shaker_position: usize,
    pub peaks: PeakPicking,
    /// Representation used for peak picking, half-power and circle fitting
    pub representation: FrfKind,
    /// Half-width of the circle-fit window in half-power bandwidths
    pub circle_window_factor: f64,
    /// Subtract channel means before the FFT
    pub remove_mean: bool,
}

impl Default for IdentificationConfig {
    fn default() -> Self {
        Self {
            accelerometers: (0..DEFAULT_LOCATIONS)
                .map(|i| (ChannelId::Response(i).to_string(), true))
                .collect(),
            sampling_freq: None,
            lower_cutoff: 10.0,
            upper_cutoff: 1000.0,
            shaker_position: 0,
            peaks: PeakPicking::default(),
            representation: FrfKind::Mobility,
            circle_window_factor: 1.0,
            remove_mean: false,
        }
    }
}

impl IdentificationConfig {
    /// Check the document once at the boundary
    ///
    /// # Errors
    /// `Configuration` for unparsable accelerometer labels, no enabled
    /// accelerometer, `lowerCutoff >= upperCutoff`, a non-positive sampling
    /// frequency or window factor, or invalid peak-picking thresholds
    pub fn validate(&self) -> Result<()> {
        let active = self.active_channels()?;
        if active.is_empty() {
            return Err(SolverError::Configuration(
                "At least one accelerometer must be enabled".to_string(),
            ));
        }
        self.band()?;
        if let Some(fs) = self.sampling_freq
            && !(fs.is_finite() && fs > 0.0)
        {
            return Err(SolverError::Configuration(format!(
                "samplingFreq must be positive, got {}",
                fs
            )));
        }
        if !(self.circle_window_factor > 0.0) {
            return Err(SolverError::Configuration(format!(
                "circleWindowFactor must be positive, got {}",
                self.circle_window_factor
            )));
        }
        self.peaks.validate()
    }

    /// Enabled response channels in location order
    pub fn active_channels(&self) -> Result<Vec<ChannelId>> {
        let mut active = Vec::new();
        for (label, enabled) in &self.accelerometers {
            let id = parse_accelerometer(label)?;
            if *enabled {
                active.push(id);
            }
        }
        active.sort();
        active.dedup();
        Ok(active)
    }

    pub fn band(&self) -> Result<FrequencyBand> {
        FrequencyBand::new(self.lower_cutoff, self.upper_cutoff)
    }

    /// Response channel at the shaker if it is active, else the first active one
    pub fn reference_channel(&self, active: &[ChannelId]) -> Option<ChannelId> {
        let at_shaker = ChannelId::Response(self.shaker_position);
        if active.contains(&at_shaker) {
            Some(at_shaker)
        } else {
            active.first().copied()
        }
    }

    pub fn spectral_options(&self) -> SpectralOptions {
        SpectralOptions {
            sampling_frequency: self.sampling_freq,
            remove_mean: self.remove_mean,
        }
    }
}

fn parse_accelerometer(label: &str) -> Result<ChannelId> {
    if let Ok(index) = label.trim().parse::<usize>() {
        return Ok(ChannelId::Response(index));
    }
    match label.parse::<ChannelId>()? {
        id @ ChannelId::Response(_) => Ok(id),
        ChannelId::Force(_) => Err(SolverError::Configuration(format!(
            "Accelerometer label '{}' names a force channel",
            label
        ))),
    }
}
