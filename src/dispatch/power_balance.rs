//! Per-snapshot result table derived from a dispatch solution.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::network::{Carrier, Network};

use super::types::DispatchSolution;

/// Residual load: demand not met by available renewables or battery discharge.
///
/// Sign convention for `batteries`: positive = discharge, negative = charge.
/// A negative residual load indicates renewable surplus.
pub fn residual_load(load: f64, renewable_available: f64, batteries: f64) -> f64 {
    load - renewable_available - batteries
}

/// Renewable energy that was available but not dispatched.
pub fn curtailed(renewable_available: f64, renewable_dispatched: f64) -> f64 {
    renewable_available - renewable_dispatched
}

/// One row of the result table. Power in MW (or GW after [`ResultTable::scale`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub time: DateTime<Utc>,
    /// Available PV power.
    pub pv: f64,
    /// Available onshore wind power.
    pub wind_on: f64,
    /// Available offshore wind power.
    pub wind_off: f64,
    /// Available biomass power.
    pub biomass: f64,
    /// Available hydro power.
    pub hydro: f64,
    /// Net battery power (positive = discharge).
    pub batteries: f64,
    pub load: f64,
    pub curtailed_re: f64,
    pub residual_load: f64,
    /// Dispatched backup power.
    pub backup: f64,
    /// Battery state of charge at the end of the snapshot (MWh).
    pub battery_soc: f64,
}

impl ResultRow {
    /// Available power of a renewable carrier; zero for [`Carrier::Backup`].
    pub fn available(&self, carrier: Carrier) -> f64 {
        match carrier {
            Carrier::Pv => self.pv,
            Carrier::WindOn => self.wind_on,
            Carrier::WindOff => self.wind_off,
            Carrier::Biomass => self.biomass,
            Carrier::Hydro => self.hydro,
            Carrier::Backup => 0.0,
        }
    }

    /// Sum of available renewable power.
    pub fn renewable_available(&self) -> f64 {
        Carrier::RENEWABLES.iter().map(|&c| self.available(c)).sum()
    }
}

/// Time-indexed dispatch results, one row per snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultTable {
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    /// Builds the table from a solved network.
    pub fn from_solution(network: &Network, solution: &DispatchSolution) -> Self {
        let available = |carrier: Carrier, t: usize| {
            network
                .generator(carrier)
                .map_or(0.0, |g| g.available_mw(t))
        };

        let rows = network
            .snapshots
            .iter()
            .enumerate()
            .map(|(t, &time)| {
                let re_available = network.renewable_available_mw(t);
                let re_dispatched: f64 = Carrier::RENEWABLES
                    .iter()
                    .map(|&c| solution.dispatch(c).get(t).copied().unwrap_or(0.0))
                    .sum();
                let batteries = solution.storage_net(t);
                let load = network.load.p_set[t];

                ResultRow {
                    time,
                    pv: available(Carrier::Pv, t),
                    wind_on: available(Carrier::WindOn, t),
                    wind_off: available(Carrier::WindOff, t),
                    biomass: available(Carrier::Biomass, t),
                    hydro: available(Carrier::Hydro, t),
                    batteries,
                    load,
                    curtailed_re: curtailed(re_available, re_dispatched),
                    residual_load: residual_load(load, re_available, batteries),
                    backup: solution
                        .dispatch(Carrier::Backup)
                        .get(t)
                        .copied()
                        .unwrap_or(0.0),
                    battery_soc: solution.storage_soc.get(t).copied().unwrap_or(0.0),
                }
            })
            .collect();

        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns a copy with every numeric column multiplied by `factor`.
    pub fn scale(&self, factor: f64) -> Self {
        let rows = self
            .rows
            .iter()
            .map(|r| ResultRow {
                time: r.time,
                pv: r.pv * factor,
                wind_on: r.wind_on * factor,
                wind_off: r.wind_off * factor,
                biomass: r.biomass * factor,
                hydro: r.hydro * factor,
                batteries: r.batteries * factor,
                load: r.load * factor,
                curtailed_re: r.curtailed_re * factor,
                residual_load: r.residual_load * factor,
                backup: r.backup * factor,
                battery_soc: r.battery_soc * factor,
            })
            .collect();
        Self { rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::solver::SolverBackend;
    use std::collections::HashMap;

    #[test]
    fn residual_load_subtracts_discharge() {
        assert_eq!(residual_load(100.0, 60.0, 10.0), 30.0);
        // Charging raises the residual load.
        assert_eq!(residual_load(100.0, 60.0, -10.0), 50.0);
    }

    #[test]
    fn surplus_gives_negative_residual() {
        assert_eq!(residual_load(50.0, 80.0, 0.0), -30.0);
        assert_eq!(curtailed(80.0, 50.0), 30.0);
    }

    #[test]
    fn table_follows_solution() {
        use crate::config::ModelConfig;
        use crate::profiles::ProfileSet;
        use chrono::TimeZone;

        let mut cfg = ModelConfig::germany();
        cfg.demand.annual_load_mwh = 200.0;
        cfg.capacities = crate::config::CapacityConfig {
            pv_mw: 100.0,
            wind_on_mw: 50.0,
            wind_off_mw: 0.0,
            biomass_mw: 0.0,
            hydro_mw: 0.0,
        };
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let profiles = ProfileSet {
            timestamps: vec![start, start + chrono::Duration::hours(1)],
            pv: vec![1.0, 0.0],
            wind_on: vec![1.0, 0.4],
            wind_off: vec![0.0; 2],
            biomass: vec![0.0; 2],
            hydro: vec![0.0; 2],
            load: vec![0.5, 0.5],
        };
        let network = Network::build(&cfg, &profiles).unwrap();

        let mut generation = HashMap::new();
        generation.insert(Carrier::Pv, vec![80.0, 0.0]);
        generation.insert(Carrier::WindOn, vec![40.0, 20.0]);
        generation.insert(Carrier::Backup, vec![0.0, 60.0]);
        let solution = DispatchSolution {
            generation,
            backup_p_nom: 60.0,
            storage_store: vec![20.0, 0.0],
            storage_dispatch: vec![0.0, 20.0],
            storage_soc: vec![18.0, 0.0],
            objective: 0.0,
            backend: SolverBackend::Microlp,
        };

        let table = ResultTable::from_solution(&network, &solution);
        assert_eq!(table.len(), 2);
        let r0 = &table.rows[0];
        assert_eq!(r0.pv, 100.0);
        assert_eq!(r0.wind_on, 50.0);
        assert_eq!(r0.load, 100.0);
        assert_eq!(r0.batteries, -20.0);
        assert_eq!(r0.curtailed_re, 30.0);
        assert_eq!(r0.residual_load, -30.0);

        let r1 = &table.rows[1];
        assert_eq!(r1.renewable_available(), 20.0);
        assert_eq!(r1.residual_load, 60.0);
        assert_eq!(r1.backup, 60.0);

        let gw = table.scale(1e-3);
        assert!((gw.rows[1].residual_load - 0.06).abs() < 1e-12);
        assert_eq!(gw.rows[1].time, r1.time);
    }
}
