// End-to-end checks of loading, aggregation and the output pipeline

use ap_coverage::ap_loader::{load_ap_file, parse_ap_str};
use ap_coverage::config::SimConfig;
use ap_coverage::constants::*;
use ap_coverage::coverage::aggregate;
use ap_coverage::engine::EstimatorEngine;
use ap_coverage::error::{LoadError, SimError};
use ap_coverage::grid::Grid;
use ap_coverage::grid_csv::read_grid_csv;
use ap_coverage::path_loss::{PathLossEstimator, PathLossParams, RadioParams};
use ap_coverage::scene::parse_scene_str;
use ap_coverage::sim::{SimProps, Simulation};
use ap_coverage::sim_op::{self, CoverageOp, ReportOp, SimOpHandle};
use ap_coverage::transmitter::Bounds;
use more_asserts::assert_gt;
use std::fs;
use std::path::Path;

const TWO_APS: &str = "AP_01,5,10,3\nAP_02,15,20,3\n";

fn two_ap_simulation(output_dir: &Path, ops: Vec<SimOpHandle>) -> Simulation {
    let load = parse_ap_str(TWO_APS);
    Simulation::new(SimProps {
        name: "two_aps".to_string(),
        config: SimConfig {
            grid_resolution_m: 1.0,
            ..SimConfig::default()
        },
        transmitters: load.transmitters,
        scene: None,
        output_dir: output_dir.to_path_buf(),
        ops,
    })
    .unwrap()
}

fn quiet_ops() -> Vec<SimOpHandle> {
    let mut ops = vec![CoverageOp::handle(Box::new(EstimatorEngine))];
    ops.extend(sim_op::output_ops());
    ops
}

#[test]
fn nearest_ap_wins_its_own_cell() {
    let load = parse_ap_str(TWO_APS);
    assert!(load.is_clean());

    let grid = Grid::new(Bounds::new(-20.0, -20.0, 40.0, 40.0), 1.0);
    assert_eq!(grid.shape(), (60, 60));

    let model = PathLossEstimator::new(RadioParams::default(), PathLossParams::default());
    let coverage = aggregate(&load.transmitters, &grid, &model);

    assert_eq!(coverage.best_tx_near(5.0, 10.0), 0);
    assert_eq!(coverage.best_tx_near(15.0, 20.0), 1);
    assert_gt!(
        coverage.signal_dbm[grid.nearest_index(5.0, 10.0)],
        coverage.signal_dbm[grid.nearest_index(-20.0, 39.0)]
    );
}

#[test]
fn zero_valid_rows_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(&path, "AP_01,abc,1,2\nonly,two\n").unwrap();

    match load_ap_file(&path) {
        Err(LoadError::NoValidRows { diagnostics, .. }) => {
            assert_eq!(diagnostics.len(), 2);
            assert_eq!(diagnostics[0].line, 1);
            assert_eq!(diagnostics[1].line, 2);
        }
        other => panic!("expected NoValidRows, got {:?}", other.map(|l| l.transmitters.len())),
    }
}

#[test]
fn pipeline_writes_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("run");
    let mut sim = two_ap_simulation(&out, quiet_ops());
    sim.run().unwrap();

    for file in [
        COVERAGE_GRID_FILE,
        COVERAGE_MAP_PNG,
        AP_ZONES_PNG,
        INDIVIDUAL_COVERAGE_PNG,
        REPORT_TXT,
        REPORT_JSON,
    ] {
        assert!(out.join(file).is_file(), "missing {}", file);
    }
    assert_eq!(sim.artifacts.len(), 6);

    let grid_values: Vec<f64> = read_grid_csv(out.join(COVERAGE_GRID_FILE), &sim.grid).unwrap();
    let coverage = sim.coverage.as_ref().unwrap();
    assert_eq!(grid_values.len(), coverage.signal_dbm.len());
    for (written, computed) in grid_values.iter().zip(&coverage.signal_dbm) {
        approx::assert_abs_diff_eq!(*written, *computed, epsilon = 1e-9);
    }

    let report = fs::read_to_string(out.join(REPORT_TXT)).unwrap();
    assert!(report.contains("AP_01"));
    assert!(report.contains("AP_02"));
    assert!(report.contains("not from ray tracing"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join(REPORT_JSON)).unwrap()).unwrap();
    assert_eq!(json["engine"], "estimator");
    assert_eq!(json["grid"]["nx"], sim.grid.nx);
    let pct = &json["statistics"];
    let total = pct["excellent_pct"].as_f64().unwrap()
        + pct["good_pct"].as_f64().unwrap()
        + pct["fair_pct"].as_f64().unwrap()
        + pct["poor_pct"].as_f64().unwrap();
    approx::assert_abs_diff_eq!(total, 100.0, epsilon = 1e-6);
}

#[test]
fn writers_without_coverage_fail() {
    let dir = tempfile::tempdir().unwrap();
    let mut sim = two_ap_simulation(dir.path(), vec![ReportOp::handle()]);
    assert!(matches!(sim.run(), Err(SimError::MissingCoverage(_))));
    assert!(!dir.path().join(REPORT_JSON).exists());
}

#[test]
fn second_run_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut sim = two_ap_simulation(dir.path(), vec![CoverageOp::handle(Box::new(EstimatorEngine))]);
    sim.run().unwrap();
    let first = sim.coverage.clone();
    assert!(matches!(sim.run(), Err(SimError::AlreadyRun(_))));
    assert_eq!(sim.coverage, first);
}

#[test]
fn scene_material_drives_wall_loss() {
    let scene = parse_scene_str(
        r#"<scene version="2.1.0">
             <bsdf type="diffuse" id="mat-concrete"/>
             <shape type="ply" id="wall_north"><ref id="mat-concrete"/></shape>
             <shape type="ply" id="wall_south"><ref id="mat-concrete"/></shape>
             <shape type="ply" id="window"><ref id="glass"/></shape>
           </scene>"#,
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let load = parse_ap_str(TWO_APS);
    let sim = Simulation::new(SimProps {
        name: "scene".to_string(),
        config: SimConfig::default(),
        transmitters: load.transmitters,
        scene: Some(scene),
        output_dir: dir.path().to_path_buf(),
        ops: vec![],
    })
    .unwrap();

    assert_eq!(sim.model.params.wall_attenuation_db, 15.0);
}
