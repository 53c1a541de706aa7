//! Solver backend selection.

use std::fmt;
use std::str::FromStr;

/// Linear programming backend used to solve the dispatch problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverBackend {
    /// Pure-Rust simplex solver, always available.
    #[default]
    Microlp,
    /// HiGHS, available with the `highs` cargo feature.
    Highs,
}

impl SolverBackend {
    /// Config-file name of the backend.
    pub fn name(self) -> &'static str {
        match self {
            Self::Microlp => "microlp",
            Self::Highs => "highs",
        }
    }

    /// Whether this build was compiled with support for the backend.
    pub fn is_available(self) -> bool {
        match self {
            Self::Microlp => true,
            Self::Highs => cfg!(feature = "highs"),
        }
    }
}

impl FromStr for SolverBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "microlp" => Ok(Self::Microlp),
            "highs" => Ok(Self::Highs),
            other => Err(format!(
                "must be \"microlp\" or \"highs\", got \"{other}\""
            )),
        }
    }
}

impl fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
