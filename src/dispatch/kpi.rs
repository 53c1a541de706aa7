//! Post-hoc summary of a solved dispatch.

use std::fmt;

use serde::Serialize;

use crate::network::Network;

use super::power_balance::ResultTable;
use super::types::DispatchSolution;

const MW_PER_GW: f64 = 1e3;
const MWH_PER_TWH: f64 = 1e6;

/// Aggregate indicators of a dispatch run.
///
/// Computed from the result table so that reported figures always agree with
/// the exported time series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchSummary {
    /// Peak positive residual load (MW); the backup capacity actually needed.
    pub backup_capacity_mw: f64,
    /// Energy from backup plants, sum of positive residual load (MWh).
    pub backup_energy_mwh: f64,
    /// Available but unused renewable energy (MWh).
    pub curtailed_mwh: f64,
    /// Backup capacity chosen by the optimizer (MW).
    pub optimal_backup_capacity_mw: f64,
    /// Total system cost (EUR).
    pub objective_eur: f64,
    /// Dispatched renewable energy over load energy.
    pub renewable_share: f64,
    /// Sum of |battery power| over the horizon (MWh).
    pub battery_throughput_mwh: f64,
    /// Throughput over twice the energy capacity.
    pub battery_equivalent_full_cycles: f64,
    pub snapshots: usize,
    pub horizon_hours: f64,
}

impl DispatchSummary {
    /// Aggregates a result table using the snapshot weights of `network`.
    pub fn from_results(
        network: &Network,
        table: &ResultTable,
        solution: &DispatchSolution,
    ) -> Self {
        let mut backup_capacity = 0.0_f64;
        let mut backup_energy = 0.0;
        let mut curtailed = 0.0;
        let mut renewable_energy = 0.0;
        let mut load_energy = 0.0;
        let mut throughput = 0.0;

        for (row, &w) in table.rows.iter().zip(&network.weights) {
            let positive = row.residual_load.max(0.0);
            backup_capacity = backup_capacity.max(positive);
            backup_energy += positive * w;
            curtailed += row.curtailed_re * w;
            renewable_energy += (row.renewable_available() - row.curtailed_re) * w;
            load_energy += row.load * w;
            throughput += row.batteries.abs() * w;
        }

        let capacity = network.storage.energy_capacity_mwh();
        let cycles = if capacity > 0.0 {
            throughput / (2.0 * capacity)
        } else {
            0.0
        };

        let renewable_share = if load_energy > 0.0 {
            renewable_energy / load_energy
        } else {
            0.0
        };

        Self {
            backup_capacity_mw: backup_capacity,
            backup_energy_mwh: backup_energy,
            curtailed_mwh: curtailed,
            optimal_backup_capacity_mw: solution.backup_p_nom,
            objective_eur: solution.objective,
            renewable_share,
            battery_throughput_mwh: throughput,
            battery_equivalent_full_cycles: cycles,
            snapshots: table.len(),
            horizon_hours: network.weights.iter().take(table.len()).sum(),
        }
    }

    /// The three headline lines reported after every run.
    pub fn headline(&self) -> [String; 3] {
        [
            format!(
                "Installed backup power plant capacity: {:.1} GW",
                self.backup_capacity_mw / MW_PER_GW
            ),
            format!(
                "Electrical energy from backup power plants: {:.2} TWh/a",
                self.backup_energy_mwh / MWH_PER_TWH
            ),
            format!(
                "Curtailed Renewables: {:.2} TWh/a",
                self.curtailed_mwh / MWH_PER_TWH
            ),
        ]
    }
}

impl fmt::Display for DispatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Dispatch Summary ---")?;
        for line in self.headline() {
            writeln!(f, "{line}")?;
        }
        writeln!(
            f,
            "Optimal backup capacity:  {:.1} GW",
            self.optimal_backup_capacity_mw / MW_PER_GW
        )?;
        writeln!(f, "System cost:              {:.3e} EUR", self.objective_eur)?;
        writeln!(
            f,
            "Renewable share:          {:.1}%",
            100.0 * self.renewable_share
        )?;
        writeln!(
            f,
            "Battery throughput:       {:.2} TWh ({:.1} equiv. cycles)",
            self.battery_throughput_mwh / MWH_PER_TWH,
            self.battery_equivalent_full_cycles
        )?;
        write!(
            f,
            "Horizon:                  {} snapshots, {:.0} h",
            self.snapshots, self.horizon_hours
        )
    }
}
