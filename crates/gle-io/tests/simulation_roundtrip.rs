//! Simulated rig data survives a CSV round trip unchanged

use gle_io::{read_time_series, write_time_series};
use gle_solver::{
    BeamModel, BeamSection, BoundaryConditions, ChannelId, DynamicSolver, Excitation, Forcing,
    IntegratorConfig, Material, ModalModel, ModalOptions,
};
use tempfile::tempdir;

#[test]
fn simulated_series_roundtrip() {
    let beam = BeamModel::new(0.65, 4, BeamSection::rectangular(0.03, 0.01), Material::steel());
    let model =
        ModalModel::build(&beam, &BoundaryConditions::free_free(), &ModalOptions::default()).unwrap();
    let forcing = Forcing::new(0, 1.0, Excitation::Impulse { duration: 5e-4 });
    let response = DynamicSolver::new(&model, IntegratorConfig::default())
        .solve(&forcing, 0.05, None)
        .unwrap();
    let series = response.to_time_series(2000.0).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("sim_data").join("IMPULSE_0.csv");
    write_time_series(&path, &series).unwrap();

    let header = std::fs::read_to_string(&path).unwrap();
    assert!(header.starts_with("t,F0,A0,F1,A1,F2,A2,F3,A3,F4,A4\n"));

    let loaded = read_time_series(&path).unwrap();
    assert_eq!(loaded.len(), 100);
    assert_eq!(loaded, series);
    assert!((loaded.sampling_frequency().unwrap() - 2000.0).abs() < 1e-9);
    assert!(loaded.channel(ChannelId::Force(0)).unwrap()[0] > 0.0);
}
