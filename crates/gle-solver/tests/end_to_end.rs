//! End-to-end virtual rig: impulse on a free-free beam, resampled response,
//! FFT-based FRFs and modal identification
//!
//! Scenario: L = 0.65 m, 4 elements, 30 × 10 mm steel section, 2% Rayleigh
//! damping, 0.5 ms unit impulse at node 0, sampled at 10 kHz.

use gle_solver::{
    BeamModel, BeamSection, BoundaryConditions, ChannelId, DynamicSolver, Excitation, Forcing,
    IdentificationConfig, IntegratorConfig, Material, ModalModel, ModalOptions,
    identification::identify_time_series,
};

const FS: f64 = 10_000.0;
const DURATION: f64 = 2.0;
const PULSE: f64 = 5e-4;

fn rig_model() -> ModalModel {
    let beam = BeamModel::new(0.65, 4, BeamSection::rectangular(0.03, 0.01), Material::steel());
    ModalModel::build(&beam, &BoundaryConditions::free_free(), &ModalOptions::default()).unwrap()
}

#[test]
fn test_impulse_response_identifies_fe_modes() {
    let model = rig_model();
    let forcing = Forcing::new(0, 1.0, Excitation::Impulse { duration: PULSE });
    let response = DynamicSolver::new(&model, IntegratorConfig::default())
        .solve(&forcing, DURATION, None)
        .unwrap();
    println!("Integration: {:?}", response.stats);
    assert!(response.stats.accepted_steps > 0);
    assert_eq!(*response.time.last().unwrap(), DURATION);

    let series = response.to_time_series(FS).unwrap();
    assert_eq!(series.len(), 20_000);
    assert_eq!(series.response_channels().len(), 5);
    assert_eq!(series.force_channels().len(), 5);

    // Exact force at the loaded node, nothing elsewhere
    let f0 = series.channel(ChannelId::Force(0)).unwrap();
    assert!((f0[0] - 1.0 / PULSE).abs() < 1e-9 / PULSE);
    assert_eq!(f0[100], 0.0);
    assert!(series.channel(ChannelId::Force(3)).unwrap().iter().all(|v| *v == 0.0));
    // Acceleration starts from rest
    for node in 0..5 {
        assert!(series.channel(ChannelId::Response(node)).unwrap()[0].abs() < 1e-12);
    }

    let config = IdentificationConfig::default();
    let result = identify_time_series(&series, &config).unwrap();
    println!("Identified: {:?}", result.natural_frequencies_hz());
    assert_eq!(result.channels.len(), 5);
    assert_eq!(result.reference, ChannelId::Response(0));

    let fe: Vec<f64> = model
        .modes()
        .frequencies_hz
        .iter()
        .copied()
        .filter(|f| *f >= config.lower_cutoff && *f <= config.upper_cutoff)
        .collect();
    assert!(!fe.is_empty());
    assert!((fe[0] - 123.0).abs() < 3.0);
    for target in &fe {
        let found = result
            .modes
            .iter()
            .any(|m| (m.natural_frequency_hz - target).abs() / target < 0.01);
        assert!(found, "FE mode at {:.2} Hz not identified", target);
    }

    // First bending mode: ends in phase, midspan opposite
    let first = result
        .modes
        .iter()
        .find(|m| (m.natural_frequency_hz - fe[0]).abs() / fe[0] < 0.01)
        .unwrap();
    assert!(first.mode_shape[4] > 0.5);
    assert!(first.mode_shape[2] < 0.0);
    assert!((first.damping_ratio() - 0.02).abs() < 0.006);
}
