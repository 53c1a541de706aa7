//! Integration tests for the end-to-end dispatch run.

mod common;

use dunkelflaute_sim::config::{CapacityConfig, ModelConfig};
use dunkelflaute_sim::network::Carrier;
use dunkelflaute_sim::profiles::{reader, synthetic};
use dunkelflaute_sim::runner::{self, OutputPaths};

const TOL_MW: f64 = 1e-3;

#[test]
fn energy_balance_holds_every_snapshot() {
    let cfg = common::short_config(3);
    let profiles = synthetic::generate(&cfg.synthetic);
    let out = runner::run(&cfg, &profiles).expect("run should succeed");

    for t in 0..out.network.snapshot_count() {
        let generation: f64 = out
            .network
            .generators
            .iter()
            .map(|g| out.solution.dispatch(g.carrier)[t])
            .sum();
        let supplied = generation + out.solution.storage_net(t);
        let demand = out.network.load.p_set[t];
        assert!(
            (supplied - demand).abs() < TOL_MW * demand.max(1.0),
            "snapshot {t}: supplied {supplied:.3} MW vs demand {demand:.3} MW"
        );
    }
}

#[test]
fn backup_covers_positive_residual_load() {
    let cfg = common::short_config(3);
    let profiles = synthetic::generate(&cfg.synthetic);
    let out = runner::run(&cfg, &profiles).expect("run should succeed");

    for row in &out.table.rows {
        assert!(row.backup + 1e-3 >= row.residual_load.max(0.0) - 1e-3);
        assert!(row.backup <= out.solution.backup_p_nom + 1e-3);
    }
    assert!(out.summary.backup_capacity_mw <= out.summary.optimal_backup_capacity_mw + 1e-3);
}

#[test]
fn ample_renewables_need_no_backup() {
    let cfg = ModelConfig::germany();
    let profiles = common::flat_profiles(24, 1.0, 1.0, 1.0 / 8760.0);
    let out = runner::run(&cfg, &profiles).expect("run should succeed");

    assert!(out.summary.optimal_backup_capacity_mw < 1e-3);
    assert!(out.summary.backup_energy_mwh < 1e-3);
    assert!(out.summary.curtailed_mwh > 0.0);
    assert!((out.summary.renewable_share - 1.0).abs() < 1e-4);
}

#[test]
fn without_renewables_backup_equals_peak_load() {
    let mut cfg = ModelConfig::no_storage();
    cfg.capacities = CapacityConfig {
        pv_mw: 0.0,
        wind_on_mw: 0.0,
        wind_off_mw: 0.0,
        biomass_mw: 0.0,
        hydro_mw: 0.0,
    };
    let profiles = common::flat_profiles(12, 0.5, 0.5, 1.0 / 8760.0);
    let out = runner::run(&cfg, &profiles).expect("run should succeed");

    let peak = out
        .network
        .load
        .p_set
        .iter()
        .copied()
        .fold(0.0_f64, f64::max);
    assert!((out.summary.optimal_backup_capacity_mw - peak).abs() < 1.0);
    assert!((out.summary.backup_capacity_mw - peak).abs() < 1.0);
    assert!(out.summary.curtailed_mwh.abs() < 1e-6);
}

#[test]
fn dunkelflaute_window_requires_backup() {
    let cfg = common::short_config(4);
    let profiles = synthetic::generate(&cfg.synthetic);
    let out = runner::run(&cfg, &profiles).expect("run should succeed");

    assert!(out.summary.backup_capacity_mw > 0.0);
    assert!(out.summary.backup_energy_mwh > 0.0);
    let backup = out.solution.dispatch(Carrier::Backup);
    assert!(backup.iter().any(|p| *p > 0.0));
}

#[test]
fn more_storage_never_costs_more() {
    let base = common::short_config(3);
    let profiles = synthetic::generate(&base.synthetic);

    let mut without = ModelConfig::no_storage();
    without.synthetic = base.synthetic.clone();
    let mut heavy = ModelConfig::storage_heavy();
    heavy.synthetic = base.synthetic.clone();

    let a = runner::run(&without, &profiles).expect("no_storage run should succeed");
    let b = runner::run(&heavy, &profiles).expect("storage_heavy run should succeed");

    assert!(
        b.summary.objective_eur <= a.summary.objective_eur * (1.0 + 1e-6),
        "storage_heavy {:.3e} EUR vs no_storage {:.3e} EUR",
        b.summary.objective_eur,
        a.summary.objective_eur
    );
    assert_eq!(a.summary.battery_throughput_mwh, 0.0);
}

#[test]
fn csv_profiles_drive_the_same_run() {
    let cfg = common::short_config(2);
    let generated = synthetic::generate(&cfg.synthetic);
    let path = common::write_profile_csv(&generated, "dispatch_profiles");

    let read = reader::read_csv(&path).expect("fixture should parse");
    let _ = std::fs::remove_file(&path);
    assert_eq!(read, generated);

    let from_csv = runner::run(&cfg, &read).expect("run should succeed");
    let direct = runner::run(&cfg, &generated).expect("run should succeed");
    assert_eq!(from_csv.summary.snapshots, direct.summary.snapshots);
    assert!(
        (from_csv.summary.objective_eur - direct.summary.objective_eur).abs()
            <= 1e-6 * direct.summary.objective_eur.abs().max(1.0)
    );
}

#[test]
fn outputs_are_written() {
    let cfg = common::short_config(2);
    let profiles = synthetic::generate(&cfg.synthetic);
    let out = runner::run(&cfg, &profiles).expect("run should succeed");

    let paths = OutputPaths {
        results: Some(common::temp_path("dispatch_results.csv")),
        summary: Some(common::temp_path("dispatch_summary.json")),
        plot: Some(common::temp_path("dispatch_plot.svg")),
    };
    runner::write_outputs(&out, &paths).expect("outputs should be written");

    let csv = std::fs::read_to_string(paths.results.as_ref().unwrap()).unwrap_or_default();
    assert_eq!(csv.lines().count(), 1 + 48);
    let json = std::fs::read_to_string(paths.summary.as_ref().unwrap()).unwrap_or_default();
    let value: serde_json::Value = serde_json::from_str(&json).expect("summary should be JSON");
    assert_eq!(value["snapshots"], 48);
    let svg = std::fs::read_to_string(paths.plot.as_ref().unwrap()).unwrap_or_default();
    assert!(svg.contains("Power [GW]"));

    for path in [paths.results, paths.summary, paths.plot].into_iter().flatten() {
        let _ = std::fs::remove_file(path);
    }
}
