//! Seeded synthetic profiles for running the model without an ENTSO-E export.
//!
//! Solar follows a half-sine daylight curve scaled by season and an AR(1)
//! cloud multiplier; onshore and offshore wind share one AR(1) weather state;
//! biomass is flat, hydro nearly flat; load is a daily sinusoid with noise.
//! Inside the configured Dunkelflaute window, wind and solar availability are
//! scaled down by `dunkelflaute_factor`.

use std::f64::consts::PI;

use chrono::{Datelike, Duration, TimeZone, Timelike, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::ProfileSet;
use crate::config::SyntheticConfig;

/// Hours in a non-leap year; the load profile is normalized to this horizon.
pub const HOURS_PER_YEAR: f64 = 8760.0;

/// Seed offsets keeping the per-series RNG streams uncorrelated.
const CLOUD_SEED_OFFSET: u64 = 11;
const WIND_SEED_OFFSET: u64 = 23;
const HYDRO_SEED_OFFSET: u64 = 37;
const LOAD_SEED_OFFSET: u64 = 57;

/// AR(1) persistence of the cloud multiplier per hour.
const CLOUD_ALPHA: f64 = 0.85;
const CLOUD_NOISE_STD: f64 = 0.35;
const CLOUD_MIN: f64 = 0.1;
const CLOUD_MAX: f64 = 1.1;

/// AR(1) persistence of the wind weather state per hour.
const WIND_ALPHA: f64 = 0.96;
const WIND_ON_MEAN: f64 = 0.24;
const WIND_ON_SPREAD: f64 = 0.16;
const WIND_OFF_MEAN: f64 = 0.42;
const WIND_OFF_SPREAD: f64 = 0.22;

const BIOMASS_AVAILABILITY: f64 = 0.8;
const HYDRO_MEAN: f64 = 0.45;
const HYDRO_NOISE_STD: f64 = 0.02;

const LOAD_DAILY_AMPLITUDE: f64 = 0.15;
const LOAD_PHASE_RAD: f64 = -2.0;
const LOAD_NOISE_STD: f64 = 0.02;

/// Gaussian noise via the Box-Muller transform.
fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-9, 1.0);
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos() * std_dev
}

/// Seasonal phase in `[-1, 1]`: 1 at the summer solstice, -1 in midwinter.
fn season(day_of_year: u32) -> f64 {
    (2.0 * PI * (f64::from(day_of_year) - 172.0) / 365.0).cos()
}

/// Fraction of peak solar output at `hour` (0–24, fractional) for the given season.
fn daylight_frac(hour: f64, season: f64) -> f64 {
    let day_length = 12.0 + 4.0 * season;
    let sunrise = 12.0 - day_length / 2.0;
    let sunset = 12.0 + day_length / 2.0;
    if hour <= sunrise || hour >= sunset {
        return 0.0;
    }
    (PI * (hour - sunrise) / day_length).sin()
}

/// Generates a complete, validated-by-construction profile set.
///
/// Identical configurations always produce identical profiles.
pub fn generate(cfg: &SyntheticConfig) -> ProfileSet {
    let steps_per_day = cfg.steps_per_day.max(1);
    let n = cfg.days * steps_per_day;
    let dt_hours = 24.0 / steps_per_day as f64;
    let step = Duration::seconds((dt_hours * 3600.0).round() as i64);
    let start = Utc.from_utc_datetime(&cfg.start);

    let mut cloud_rng = StdRng::seed_from_u64(cfg.seed.wrapping_add(CLOUD_SEED_OFFSET));
    let mut wind_rng = StdRng::seed_from_u64(cfg.seed.wrapping_add(WIND_SEED_OFFSET));
    let mut hydro_rng = StdRng::seed_from_u64(cfg.seed.wrapping_add(HYDRO_SEED_OFFSET));
    let mut load_rng = StdRng::seed_from_u64(cfg.seed.wrapping_add(LOAD_SEED_OFFSET));

    // Per-step persistence so that the process statistics do not depend on resolution.
    let cloud_alpha = CLOUD_ALPHA.powf(dt_hours);
    let wind_alpha = WIND_ALPHA.powf(dt_hours);
    let wind_innovation = (1.0 - wind_alpha * wind_alpha).sqrt();

    let window = cfg.dunkelflaute_start_day..cfg.dunkelflaute_start_day + cfg.dunkelflaute_days;

    let mut set = ProfileSet {
        timestamps: Vec::with_capacity(n),
        pv: Vec::with_capacity(n),
        wind_on: Vec::with_capacity(n),
        wind_off: Vec::with_capacity(n),
        biomass: Vec::with_capacity(n),
        hydro: Vec::with_capacity(n),
        load: Vec::with_capacity(n),
    };

    let mut cloud = 1.0;
    let mut weather = 0.0;

    for t in 0..n {
        let ts = start + step * t as i32;
        let day = t / steps_per_day;
        let hour = f64::from(ts.hour()) + f64::from(ts.minute()) / 60.0;
        let s = season(ts.ordinal());
        let lull = if window.contains(&day) {
            cfg.dunkelflaute_factor
        } else {
            1.0
        };

        cloud = cloud_alpha * cloud
            + (1.0 - cloud_alpha) * (1.0 + gaussian_noise(&mut cloud_rng, CLOUD_NOISE_STD));
        cloud = cloud.clamp(CLOUD_MIN, CLOUD_MAX);
        let seasonal_peak = 0.55 + 0.45 * s;
        let pv = daylight_frac(hour, s) * seasonal_peak * cloud * lull;

        weather = wind_alpha * weather + wind_innovation * gaussian_noise(&mut wind_rng, 1.0);
        // Wind is stronger in winter.
        let wind_season = 1.0 - 0.25 * s;
        let wind_on = (WIND_ON_MEAN + WIND_ON_SPREAD * weather) * wind_season * lull;
        let wind_off = (WIND_OFF_MEAN + WIND_OFF_SPREAD * weather) * wind_season * lull;

        let hydro = HYDRO_MEAN + gaussian_noise(&mut hydro_rng, HYDRO_NOISE_STD);

        let day_pos = hour / 24.0;
        let load = 1.0
            - 0.08 * s
            + LOAD_DAILY_AMPLITUDE * (2.0 * PI * day_pos + LOAD_PHASE_RAD).sin()
            + gaussian_noise(&mut load_rng, LOAD_NOISE_STD);

        set.timestamps.push(ts);
        set.pv.push(pv.clamp(0.0, 1.0));
        set.wind_on.push(wind_on.clamp(0.0, 1.0));
        set.wind_off.push(wind_off.clamp(0.0, 1.0));
        set.biomass.push(BIOMASS_AVAILABILITY);
        set.hydro.push(hydro.clamp(0.0, 1.0));
        set.load.push(load.max(0.0));
    }

    // Share of the annual demand that falls into this horizon.
    let target = n as f64 * dt_hours / HOURS_PER_YEAR;
    let sum = set.load_sum();
    if sum > 0.0 {
        for v in &mut set.load {
            *v *= target / sum;
        }
    }

    set
}
