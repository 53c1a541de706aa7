//! Single-bus network components assembled from configuration and profiles.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::ModelConfig;
use crate::error::ProfileError;
use crate::profiles::ProfileSet;

/// Generation technology of a generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Carrier {
    Pv,
    WindOn,
    WindOff,
    Biomass,
    Hydro,
    /// Dispatchable backup plants covering the residual load.
    Backup,
}

impl Carrier {
    /// Fixed-capacity renewable carriers, in plotting order from the bottom up.
    pub const RENEWABLES: [Carrier; 5] = [
        Carrier::Hydro,
        Carrier::Biomass,
        Carrier::WindOff,
        Carrier::WindOn,
        Carrier::Pv,
    ];

    /// Column name used in result tables.
    pub fn name(self) -> &'static str {
        match self {
            Self::Pv => "pv",
            Self::WindOn => "wind_on",
            Self::WindOff => "wind_off",
            Self::Biomass => "biomass",
            Self::Hydro => "hydro",
            Self::Backup => "residual_load",
        }
    }

    /// Human-readable label for legends.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pv => "pv",
            Self::WindOn => "wind onshore",
            Self::WindOff => "wind offshore",
            Self::Biomass => "biomass",
            Self::Hydro => "hydro",
            Self::Backup => "residual load",
        }
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Capacity expansion bounds and cost for an extendable generator.
#[derive(Debug, Clone, PartialEq)]
pub struct Extendable {
    /// Cost per MW of installed power (EUR/MW).
    pub capital_cost: f64,
    pub p_nom_min: f64,
    /// `None` means unbounded.
    pub p_nom_max: Option<f64>,
}

/// A generator attached to the bus.
#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    pub carrier: Carrier,
    /// Installed power (MW); ignored when `extendable` is set.
    pub p_nom: f64,
    /// Per-snapshot availability per unit of `p_nom`.
    pub p_max_pu: Vec<f64>,
    /// Cost per MWh produced (EUR/MWh).
    pub marginal_cost: f64,
    pub extendable: Option<Extendable>,
}

impl Generator {
    /// Available power at snapshot `t` for a fixed-capacity generator (MW).
    pub fn available_mw(&self, t: usize) -> f64 {
        self.p_nom * self.p_max_pu.get(t).copied().unwrap_or(0.0)
    }
}

/// Battery storage attached to the bus.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageUnit {
    /// Charge and discharge power limit (MW).
    pub p_nom: f64,
    /// Energy capacity in hours at `p_nom`.
    pub max_hours: f64,
    pub efficiency_store: f64,
    pub efficiency_dispatch: f64,
    /// Fraction of stored energy lost per hour.
    pub standing_loss: f64,
    /// The state of charge after the last snapshot feeds the first one.
    pub cyclic_state_of_charge: bool,
    /// Starting state of charge (MWh) when not cyclic.
    pub state_of_charge_initial: f64,
}

impl StorageUnit {
    /// Energy capacity (MWh).
    pub fn energy_capacity_mwh(&self) -> f64 {
        self.p_nom * self.max_hours
    }

    /// Fraction of stored energy retained over a snapshot of `hours`.
    pub fn retention(&self, hours: f64) -> f64 {
        (1.0 - self.standing_loss).powf(hours)
    }
}

/// Fixed demand on the bus.
#[derive(Debug, Clone, PartialEq)]
pub struct Load {
    /// Demand per snapshot (MW).
    pub p_set: Vec<f64>,
}

/// One-bus power system ready for dispatch optimization.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    pub snapshots: Vec<DateTime<Utc>>,
    /// Duration of each snapshot in hours.
    pub weights: Vec<f64>,
    pub generators: Vec<Generator>,
    pub storage: StorageUnit,
    pub load: Load,
}

impl Network {
    /// Builds the network from a model configuration and input profiles.
    ///
    /// Demand per snapshot is `annual_load_mwh * load_profile[t] / weight[t]`,
    /// so that each snapshot's energy equals its share of the annual sum.
    ///
    /// # Errors
    ///
    /// Returns a `ProfileError` if the profile set is invalid.
    pub fn build(cfg: &ModelConfig, profiles: &ProfileSet) -> Result<Self, ProfileError> {
        profiles.validate()?;

        let weights = profiles.weights();
        let load_profile = if cfg.generation.normalize_load_profile {
            profiles.normalized_load()
        } else {
            profiles.load.clone()
        };
        let p_set = load_profile
            .iter()
            .zip(&weights)
            .map(|(share, w)| cfg.demand.annual_load_mwh * share / w)
            .collect();

        let caps = &cfg.capacities;
        let mc = cfg.generation.renewable_marginal_cost;
        let fixed = |carrier, p_nom, series: &[f64]| Generator {
            carrier,
            p_nom,
            p_max_pu: series.to_vec(),
            marginal_cost: mc,
            extendable: None,
        };

        let n = profiles.len();
        let generators = vec![
            fixed(Carrier::Pv, caps.pv_mw, &profiles.pv),
            fixed(Carrier::WindOn, caps.wind_on_mw, &profiles.wind_on),
            fixed(Carrier::WindOff, caps.wind_off_mw, &profiles.wind_off),
            fixed(Carrier::Biomass, caps.biomass_mw, &profiles.biomass),
            fixed(Carrier::Hydro, caps.hydro_mw, &profiles.hydro),
            Generator {
                carrier: Carrier::Backup,
                p_nom: 0.0,
                p_max_pu: vec![1.0; n],
                marginal_cost: cfg.backup.marginal_cost,
                extendable: Some(Extendable {
                    capital_cost: cfg.backup.capital_cost,
                    p_nom_min: cfg.backup.min_capacity_mw,
                    p_nom_max: cfg.backup.max_capacity_mw,
                }),
            },
        ];

        let bat = &cfg.battery;
        let storage = StorageUnit {
            p_nom: bat.power_mw,
            max_hours: bat.duration_h,
            efficiency_store: bat.charge_efficiency,
            efficiency_dispatch: bat.discharge_efficiency,
            standing_loss: bat.standing_loss,
            cyclic_state_of_charge: bat.cyclic,
            state_of_charge_initial: bat.initial_soc * bat.power_mw * bat.duration_h,
        };

        Ok(Self {
            snapshots: profiles.timestamps.clone(),
            weights,
            generators,
            storage,
            load: Load { p_set },
        })
    }

    /// Number of snapshots.
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    /// Returns the generator of the given carrier, if present.
    pub fn generator(&self, carrier: Carrier) -> Option<&Generator> {
        self.generators.iter().find(|g| g.carrier == carrier)
    }

    /// Fixed-capacity renewable generators.
    pub fn renewables(&self) -> impl Iterator<Item = &Generator> {
        self.generators.iter().filter(|g| g.extendable.is_none())
    }

    /// Total available renewable power at snapshot `t` (MW).
    pub fn renewable_available_mw(&self, t: usize) -> f64 {
        self.renewables().map(|g| g.available_mw(t)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn profiles(n: usize, minutes: i64) -> ProfileSet {
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        ProfileSet {
            timestamps: (0..n)
                .map(|i| start + chrono::Duration::minutes(minutes * i as i64))
                .collect(),
            pv: vec![0.5; n],
            wind_on: vec![0.2; n],
            wind_off: vec![0.4; n],
            biomass: vec![1.0; n],
            hydro: vec![0.5; n],
            load: vec![0.25; n],
        }
    }

    #[test]
    fn builds_reference_components() {
        let cfg = ModelConfig::germany();
        let net = Network::build(&cfg, &profiles(4, 60)).unwrap();
        assert_eq!(net.snapshot_count(), 4);
        assert_eq!(net.generators.len(), 6);
        assert_eq!(net.renewables().count(), 5);

        let pv = net.generator(Carrier::Pv).unwrap();
        assert_eq!(pv.available_mw(0), 107_500.0);

        let backup = net.generator(Carrier::Backup).unwrap();
        assert_eq!(backup.marginal_cost, 100.0);
        assert!(backup.extendable.is_some());

        assert_eq!(net.storage.energy_capacity_mwh(), 100_000.0);
        assert!(net.storage.cyclic_state_of_charge);
    }

    #[test]
    fn hourly_load_matches_annual_share() {
        let mut cfg = ModelConfig::germany();
        cfg.demand.annual_load_mwh = 1_000.0;
        let net = Network::build(&cfg, &profiles(4, 60)).unwrap();
        assert_eq!(net.load.p_set, vec![250.0; 4]);
    }

    #[test]
    fn quarter_hourly_load_keeps_energy() {
        let mut cfg = ModelConfig::germany();
        cfg.demand.annual_load_mwh = 1_000.0;
        let net = Network::build(&cfg, &profiles(4, 15)).unwrap();
        // 250 MWh per 15-minute snapshot is 1000 MW.
        assert_eq!(net.load.p_set, vec![1_000.0; 4]);
        let energy: f64 = net
            .load
            .p_set
            .iter()
            .zip(&net.weights)
            .map(|(p, w)| p * w)
            .sum();
        assert!((energy - 1_000.0).abs() < 1e-9);
    }

    #[test]
    fn normalize_option_rescales_load() {
        let mut cfg = ModelConfig::germany();
        cfg.demand.annual_load_mwh = 800.0;
        cfg.generation.normalize_load_profile = true;
        let mut p = profiles(2, 60);
        p.load = vec![3.0, 1.0];
        let net = Network::build(&cfg, &p).unwrap();
        assert_eq!(net.load.p_set, vec![600.0, 200.0]);
    }

    #[test]
    fn retention_compounds_per_hour() {
        let cfg = ModelConfig::germany();
        let net = Network::build(&cfg, &profiles(2, 60)).unwrap();
        let r2 = net.storage.retention(2.0);
        assert!((r2 - 0.9999_f64.powi(2)).abs() < 1e-15);
    }

    #[test]
    fn invalid_profiles_rejected() {
        let cfg = ModelConfig::germany();
        let mut p = profiles(3, 60);
        p.pv[1] = -0.1;
        assert!(Network::build(&cfg, &p).is_err());
    }
}
