//! JSON result reports written by the command-line driver.

use std::fs;
use std::path::Path;

use gle_solver::identification::SkippedPeak;
use gle_solver::{
    BeamModel, Bode, ChannelFrf, ChannelId, FrfKind, GuardReport, IdentificationResult,
    IdentifiedMode, ModalModel, RayleighDamping,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ensure_parent_dir;
use crate::error::Result;

/// Natural frequencies and normalised transverse shapes of a modal model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModesReport {
    pub generated_at: String,
    /// Axial node coordinates [m]
    pub node_positions: Vec<f64>,
    pub frequencies_hz: Vec<f64>,
    /// Rayleigh damping ratio of each mode
    pub damping_ratios: Vec<f64>,
    pub rayleigh: RayleighDamping,
    /// One transverse shape per mode, max |·| = 1
    pub mode_shapes: Vec<Vec<f64>>,
    pub discarded_modes: usize,
}

impl ModesReport {
    pub fn new(generated_at: impl Into<String>, beam: &BeamModel, model: &ModalModel) -> Self {
        let modes = model.modes();
        let rayleigh = model.rayleigh();
        Self {
            generated_at: generated_at.into(),
            node_positions: beam.node_positions(),
            frequencies_hz: modes.frequencies_hz.clone(),
            damping_ratios: modes
                .angular_frequencies
                .iter()
                .map(|&w| rayleigh.damping_ratio_at(w))
                .collect(),
            rayleigh,
            mode_shapes: (0..modes.num_modes)
                .filter_map(|i| modes.transverse_shape(i))
                .collect(),
            discarded_modes: modes.discarded,
        }
    }
}

/// Bode data of one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelBode {
    pub channel: String,
    #[serde(flatten)]
    pub bode: Bode,
}

/// FRFs of every response channel against one force channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrfReport {
    pub generated_at: String,
    pub force_channel: String,
    pub representation: FrfKind,
    pub channels: Vec<ChannelBode>,
    pub guards: GuardReport,
}

impl FrfReport {
    /// Report `frfs` converted to `representation`; conversion guards are
    /// merged into `guards`
    pub fn new(
        generated_at: impl Into<String>,
        force: ChannelId,
        frfs: &[ChannelFrf],
        representation: FrfKind,
        mut guards: GuardReport,
    ) -> Self {
        let channels = frfs
            .iter()
            .map(|c| {
                let (frf, report) = c.frf.convert(representation);
                guards.merge(report);
                ChannelBode {
                    channel: c.channel.to_string(),
                    bode: frf.bode(),
                }
            })
            .collect();
        Self {
            generated_at: generated_at.into(),
            force_channel: force.to_string(),
            representation,
            channels,
            guards,
        }
    }
}

/// One identified mode in report form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeReport {
    pub natural_frequency_hz: f64,
    /// Half-power damping ratio
    pub damping_ratio: f64,
    /// Lower and upper half-power frequencies [Hz]
    pub half_power_hz: [f64; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circle_frequency_hz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circle_damping_ratio: Option<f64>,
    pub mode_shape: Vec<f64>,
}

impl From<&IdentifiedMode> for ModeReport {
    fn from(mode: &IdentifiedMode) -> Self {
        Self {
            natural_frequency_hz: mode.natural_frequency_hz,
            damping_ratio: mode.damping_ratio(),
            half_power_hz: [mode.half_power.f1, mode.half_power.f2],
            circle_frequency_hz: mode.nyquist.map(|n| n.natural_frequency_hz),
            circle_damping_ratio: mode.nyquist.and_then(|n| n.damping_ratio),
            mode_shape: mode.mode_shape.clone(),
        }
    }
}

/// Outcome of a modal identification run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationReport {
    pub generated_at: String,
    pub reference_channel: String,
    /// Channel order of every mode shape
    pub channels: Vec<String>,
    pub modes: Vec<ModeReport>,
    pub skipped: Vec<SkippedPeak>,
    pub guards: GuardReport,
}

impl IdentificationReport {
    pub fn new(generated_at: impl Into<String>, result: &IdentificationResult) -> Self {
        Self {
            generated_at: generated_at.into(),
            reference_channel: result.reference.to_string(),
            channels: result.channels.iter().map(ChannelId::to_string).collect(),
            modes: result.modes.iter().map(ModeReport::from).collect(),
            skipped: result.skipped.clone(),
            guards: result.guards,
        }
    }
}

/// Write any report as pretty-printed JSON, creating parent directories
pub fn write_report<T: Serialize>(path: impl AsRef<Path>, report: &T) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let bytes = serde_json::to_vec_pretty(report)?;
    fs::write(path, bytes)?;
    info!(path = %path.display(), "report written");
    Ok(())
}

pub fn read_report<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gle_solver::{BeamSection, BoundaryConditions, Frf, Material, ModalOptions};
    use num_complex::Complex64;
    use tempfile::tempdir;

    #[test]
    fn modes_report_roundtrip() {
        let beam = BeamModel::new(0.65, 4, BeamSection::rectangular(0.03, 0.01), Material::steel());
        let model =
            ModalModel::build(&beam, &BoundaryConditions::free_free(), &ModalOptions::default())
                .unwrap();
        let report = ModesReport::new("2026-01-01T00:00:00Z", &beam, &model);
        assert_eq!(report.mode_shapes.len(), report.frequencies_hz.len());
        assert_eq!(report.node_positions.len(), 5);
        assert!((report.damping_ratios[0] - 0.02).abs() < 1e-12);

        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("modes.json");
        write_report(&path, &report).unwrap();
        let loaded: ModesReport = read_report(&path).unwrap();
        assert_eq!(loaded, report);
    }

    #[test]
    fn report_floats_survive_the_file_bit_for_bit() {
        let values = vec![0.1 + 0.2, 0.4875, 1.0 / 3.0, 2.0_f64.sqrt() * 1e-7, 6.02214076e23];
        let dir = tempdir().unwrap();
        let path = dir.path().join("floats.json");
        write_report(&path, &values).unwrap();
        let loaded: Vec<f64> = read_report(&path).unwrap();
        for (a, b) in loaded.iter().zip(&values) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn frf_report_flattens_bode_and_counts_guards() {
        let frf = Frf::new(
            vec![0.0, 10.0],
            vec![Complex64::new(1.0, 0.0), Complex64::new(0.0, 1.0)],
            FrfKind::Inertance,
        )
        .unwrap();
        let channels = [ChannelFrf {
            channel: ChannelId::Response(0),
            frf,
        }];
        let report = FrfReport::new(
            "now",
            ChannelId::Force(0),
            &channels,
            FrfKind::Mobility,
            GuardReport::default(),
        );
        assert_eq!(report.guards.zero_frequency_bins, 1);
        assert_eq!(report.force_channel, "F0");

        let json = serde_json::to_value(&report).unwrap();
        let channel = &json["channels"][0];
        assert_eq!(channel["channel"], "A0");
        assert!(channel["magnitude_db"].is_array());
        assert_eq!(json["representation"], "mobility");
    }
}
