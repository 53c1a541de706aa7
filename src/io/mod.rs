//! Result export: CSV table, JSON summary, and the dispatch chart.

pub mod export;
pub mod plot;
