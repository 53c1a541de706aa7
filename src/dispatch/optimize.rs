//! Linear dispatch and backup-capacity optimization.
//!
//! For every snapshot `t` with duration `w_t` hours:
//!
//! ```text
//! minimise  Σ_t w_t (Σ_g c_g p_g[t] + c_b p_b[t]) + C_b P_b
//!
//! s.t.      Σ_g p_g[t] + p_b[t] + out[t] − in[t] = d[t]
//!           0 <= p_g[t] <= p_nom_g · p_max_pu_g[t]
//!           0 <= p_b[t] <= P_b,   P_min <= P_b <= P_max
//!           0 <= in[t], out[t] <= p_nom_s
//!           0 <= soc[t] <= p_nom_s · max_hours
//!           soc[t] = (1 − λ)^w_t soc[t−1] + w_t (η_in in[t] − out[t] / η_out)
//! ```
//!
//! With a cyclic battery `soc[−1]` is `soc[T−1]`; otherwise it is the
//! configured initial state of charge.

use std::collections::HashMap;

use good_lp::{
    Constraint, Expression, ProblemVariables, ResolutionError, Solution, Solver, SolverModel,
    Variable, constraint, variable,
};
use tracing::{debug, warn};

use crate::error::DispatchError;
use crate::network::{Carrier, Network};

use super::solver::SolverBackend;
use super::types::DispatchSolution;

/// Snapshot count above which the pure-Rust backend gets slow.
const LARGE_PROBLEM_SNAPSHOTS: usize = 2_000;

/// Decision variables of one formulated problem.
struct Handles {
    generation: Vec<(Carrier, Vec<Variable>)>,
    backup: Vec<Variable>,
    backup_p_nom: Variable,
    store: Vec<Variable>,
    dispatch: Vec<Variable>,
    soc: Vec<Variable>,
}

/// A complete LP, independent of the backend that will solve it.
struct Formulation {
    vars: ProblemVariables,
    objective: Expression,
    constraints: Vec<Constraint>,
    handles: Handles,
}

/// Solves the dispatch problem for `network` with the chosen backend.
///
/// # Errors
///
/// Returns `DispatchError::Infeasible` / `Unbounded` when the solver proves
/// so, `UnavailableBackend` if the backend was not compiled in, and
/// `EmptyNetwork` for a network without snapshots.
pub fn optimize(network: &Network, backend: SolverBackend) -> Result<DispatchSolution, DispatchError> {
    if !backend.is_available() {
        return Err(DispatchError::UnavailableBackend(backend.name().to_string()));
    }
    if network.snapshot_count() > LARGE_PROBLEM_SNAPSHOTS && backend == SolverBackend::Microlp {
        warn!(
            snapshots = network.snapshot_count(),
            "large problem for the microlp backend; consider building with the `highs` feature"
        );
    }

    let formulation = formulate(network)?;
    debug!(
        snapshots = network.snapshot_count(),
        constraints = formulation.constraints.len(),
        %backend,
        "dispatch problem formulated"
    );

    match backend {
        SolverBackend::Microlp => solve_with(
            formulation,
            network,
            backend,
            good_lp::solvers::microlp::microlp,
        ),
        #[cfg(feature = "highs")]
        SolverBackend::Highs => {
            solve_with(formulation, network, backend, good_lp::solvers::highs::highs)
        }
        #[cfg(not(feature = "highs"))]
        SolverBackend::Highs => Err(DispatchError::UnavailableBackend(backend.name().to_string())),
    }
}

fn formulate(network: &Network) -> Result<Formulation, DispatchError> {
    let n = network.snapshot_count();
    if n == 0 {
        return Err(DispatchError::EmptyNetwork);
    }
    let weights = &network.weights;
    let storage = &network.storage;

    let mut vars = ProblemVariables::new();
    let mut objective = Expression::from(0.0);
    let mut constraints = Vec::with_capacity(3 * n);

    let mut generation = Vec::new();
    let mut backup = Vec::new();
    let mut backup_p_nom = None;
    let mut backup_marginal_cost = 0.0;

    for generator in &network.generators {
        if let Some(ext) = &generator.extendable {
            let mut def = variable().min(ext.p_nom_min);
            if let Some(max) = ext.p_nom_max {
                def = def.max(max);
            }
            let p_nom = vars.add(def);
            objective += p_nom * ext.capital_cost;
            backup = vars.add_vector(variable().min(0.0), n);
            for &p in &backup {
                constraints.push(constraint!(p <= p_nom));
            }
            backup_p_nom = Some(p_nom);
            backup_marginal_cost = generator.marginal_cost;
        } else {
            let series: Vec<Variable> = (0..n)
                .map(|t| vars.add(variable().min(0.0).max(generator.available_mw(t))))
                .collect();
            for (&p, &w) in series.iter().zip(weights) {
                objective += p * (w * generator.marginal_cost);
            }
            generation.push((generator.carrier, series));
        }
    }

    // Without an extendable generator the backup series is pinned to zero.
    let backup_p_nom = match backup_p_nom {
        Some(v) => v,
        None => {
            let v = vars.add(variable().min(0.0).max(0.0));
            backup = vars.add_vector(variable().min(0.0).max(0.0), n);
            v
        }
    };
    for (&p, &w) in backup.iter().zip(weights) {
        objective += p * (w * backup_marginal_cost);
    }

    let e_max = storage.energy_capacity_mwh();
    let store = vars.add_vector(variable().min(0.0).max(storage.p_nom), n);
    let dispatch = vars.add_vector(variable().min(0.0).max(storage.p_nom), n);
    let soc = vars.add_vector(variable().min(0.0).max(e_max), n);

    for t in 0..n {
        let w = weights[t];

        let mut supply = Expression::from(0.0);
        for (_, series) in &generation {
            supply += series[t];
        }
        supply += backup[t];
        supply += dispatch[t];
        supply -= store[t];
        let demand = network.load.p_set[t];
        constraints.push(constraint!(supply == demand));

        let previous = if t > 0 {
            Expression::from_other_affine(soc[t - 1])
        } else if storage.cyclic_state_of_charge {
            Expression::from_other_affine(soc[n - 1])
        } else {
            Expression::from(storage.state_of_charge_initial.min(e_max))
        };
        let balance = previous * storage.retention(w)
            + store[t] * (w * storage.efficiency_store)
            - dispatch[t] * (w / storage.efficiency_dispatch);
        constraints.push(constraint!(soc[t] == balance));
    }

    Ok(Formulation {
        vars,
        objective,
        constraints,
        handles: Handles {
            generation,
            backup,
            backup_p_nom,
            store,
            dispatch,
            soc,
        },
    })
}

fn solve_with<S>(
    formulation: Formulation,
    network: &Network,
    backend: SolverBackend,
    solver: S,
) -> Result<DispatchSolution, DispatchError>
where
    S: Solver,
    S::Model: SolverModel<Error = ResolutionError>,
{
    let Formulation {
        vars,
        objective,
        constraints,
        handles,
    } = formulation;

    let mut model = vars.minimise(objective).using(solver);
    for c in constraints {
        model = model.with(c);
    }

    let solution = model.solve().map_err(|e| match e {
        ResolutionError::Infeasible => DispatchError::Infeasible,
        ResolutionError::Unbounded => DispatchError::Unbounded,
        other => DispatchError::Solver(other.to_string()),
    })?;

    let values = |series: &[Variable]| -> Vec<f64> {
        series.iter().map(|&v| solution.value(v).max(0.0)).collect()
    };

    let mut generation: HashMap<Carrier, Vec<f64>> = handles
        .generation
        .iter()
        .map(|(carrier, series)| (*carrier, values(series.as_slice())))
        .collect();
    generation.insert(Carrier::Backup, values(handles.backup.as_slice()));

    let backup_p_nom = solution.value(handles.backup_p_nom).max(0.0);

    let mut result = DispatchSolution {
        generation,
        backup_p_nom,
        storage_store: values(handles.store.as_slice()),
        storage_dispatch: values(handles.dispatch.as_slice()),
        storage_soc: values(handles.soc.as_slice()),
        objective: 0.0,
        backend,
    };
    result.objective = system_cost(network, &result);
    Ok(result)
}

/// Evaluates the objective for a solution (EUR).
pub fn system_cost(network: &Network, solution: &DispatchSolution) -> f64 {
    let mut cost = 0.0;
    for generator in &network.generators {
        let energy: f64 = solution
            .dispatch(generator.carrier)
            .iter()
            .zip(&network.weights)
            .map(|(p, w)| p * w)
            .sum();
        cost += energy * generator.marginal_cost;
        if let Some(ext) = &generator.extendable {
            cost += solution.backup_p_nom * ext.capital_cost;
        }
    }
    cost
}
