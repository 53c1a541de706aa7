//! Dispatch solution types.

use std::collections::HashMap;
use std::fmt;

use crate::error::DispatchError;
use crate::network::Carrier;

use super::solver::SolverBackend;

/// Outcome of an optimization attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    Failed,
}

impl SolveStatus {
    /// Classifies the result of [`super::optimize`].
    pub fn of(result: &Result<DispatchSolution, DispatchError>) -> Self {
        match result {
            Ok(_) => Self::Optimal,
            Err(DispatchError::Infeasible) => Self::Infeasible,
            Err(DispatchError::Unbounded) => Self::Unbounded,
            Err(_) => Self::Failed,
        }
    }

    /// Short status word used in logs: `"ok"` for a solved problem.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Optimal => "ok",
            Self::Infeasible => "infeasible",
            Self::Unbounded => "unbounded",
            Self::Failed => "failed",
        }
    }

    pub fn is_ok(self) -> bool {
        self == Self::Optimal
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optimal dispatch for every snapshot of a network.
///
/// Power values are MW per snapshot; state of charge is MWh at the end of
/// each snapshot.
#[derive(Debug, Clone)]
pub struct DispatchSolution {
    /// Dispatched power per generator carrier, including [`Carrier::Backup`].
    pub generation: HashMap<Carrier, Vec<f64>>,
    /// Optimal installed power of the backup plants (MW).
    pub backup_p_nom: f64,
    /// Battery charging power (MW, >= 0).
    pub storage_store: Vec<f64>,
    /// Battery discharging power (MW, >= 0).
    pub storage_dispatch: Vec<f64>,
    /// Battery state of charge (MWh).
    pub storage_soc: Vec<f64>,
    /// Total system cost (EUR).
    pub objective: f64,
    /// Backend that produced the solution.
    pub backend: SolverBackend,
}

impl DispatchSolution {
    /// Dispatch series of a carrier; empty if the carrier is absent.
    pub fn dispatch(&self, carrier: Carrier) -> &[f64] {
        self.generation
            .get(&carrier)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Net battery power at snapshot `t` (MW; positive = discharge, negative = charge).
    pub fn storage_net(&self, t: usize) -> f64 {
        self.storage_dispatch.get(t).copied().unwrap_or(0.0)
            - self.storage_store.get(t).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_words() {
        assert_eq!(SolveStatus::Optimal.to_string(), "ok");
        assert!(SolveStatus::Optimal.is_ok());
        assert!(!SolveStatus::Infeasible.is_ok());
    }

    #[test]
    fn status_from_error() {
        let r: Result<DispatchSolution, DispatchError> = Err(DispatchError::Infeasible);
        assert_eq!(SolveStatus::of(&r), SolveStatus::Infeasible);
        let r: Result<DispatchSolution, DispatchError> =
            Err(DispatchError::Solver("numerical trouble".into()));
        assert_eq!(SolveStatus::of(&r), SolveStatus::Failed);
    }

    #[test]
    fn storage_net_sign() {
        let sol = DispatchSolution {
            generation: HashMap::new(),
            backup_p_nom: 0.0,
            storage_store: vec![5.0, 0.0],
            storage_dispatch: vec![0.0, 3.0],
            storage_soc: vec![4.5, 1.5],
            objective: 0.0,
            backend: SolverBackend::Microlp,
        };
        assert_eq!(sol.storage_net(0), -5.0);
        assert_eq!(sol.storage_net(1), 3.0);
        assert!(sol.dispatch(Carrier::Pv).is_empty());
    }
}
