//! Single-bus dispatch model for sizing backup plants through a Dunkelflaute.
//!
//! Renewable availability profiles and a battery fleet are combined into a
//! one-bus network; a linear program then finds the cheapest dispatch and the
//! backup capacity needed to cover the residual load.

pub mod cli;
pub mod config;
/// LP formulation, solver backends, and result aggregation.
pub mod dispatch;
pub mod error;
pub mod io;
pub mod logging;
pub mod network;
/// Input time series: CSV reader and synthetic generator.
pub mod profiles;
pub mod runner;

pub use error::Error;
