//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{Duration, TimeZone, Utc};
use dunkelflaute_sim::config::{ModelConfig, SyntheticConfig};
use dunkelflaute_sim::profiles::ProfileSet;

/// Reference scenario on a short synthetic horizon with a two-day lull.
pub fn short_config(days: usize) -> ModelConfig {
    let mut cfg = ModelConfig::germany();
    cfg.synthetic = SyntheticConfig {
        days,
        dunkelflaute_start_day: 1,
        dunkelflaute_days: 2.min(days.saturating_sub(1)),
        ..SyntheticConfig::default()
    };
    cfg
}

/// Hourly profiles with constant availability and a flat load share.
pub fn flat_profiles(n: usize, pv: f64, wind: f64, load_share: f64) -> ProfileSet {
    let start = Utc.with_ymd_and_hms(2023, 1, 9, 0, 0, 0).unwrap();
    ProfileSet {
        timestamps: (0..n).map(|i| start + Duration::hours(i as i64)).collect(),
        pv: vec![pv; n],
        wind_on: vec![wind; n],
        wind_off: vec![wind; n],
        biomass: vec![0.8; n],
        hydro: vec![0.45; n],
        load: vec![load_share; n],
    }
}

/// Writes a profile set as an ENTSO-E style CSV and returns its path.
pub fn write_profile_csv(set: &ProfileSet, name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("{name}_{}.csv", std::process::id()));
    let mut text = String::from(
        "time,pv_profile,wind_on_profile,wind_off_profile,biomass_profile,hydro_profile,load_profile\n",
    );
    for t in 0..set.len() {
        text.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            set.timestamps[t].format("%Y-%m-%d %H:%M:%S"),
            set.pv[t],
            set.wind_on[t],
            set.wind_off[t],
            set.biomass[t],
            set.hydro[t],
            set.load[t],
        ));
    }
    std::fs::write(&path, text).expect("profile fixture should be writable");
    path
}

/// Unique temp path for an output file.
pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{}_{name}", std::process::id()))
}
