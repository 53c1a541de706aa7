//! Linear dispatch optimization and its results.

/// Post-hoc dispatch summary.
pub mod kpi;
pub mod optimize;
/// Per-snapshot result table.
pub mod power_balance;
/// LP solver backend selection.
pub mod solver;
pub mod types;

pub use optimize::optimize;
