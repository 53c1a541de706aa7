//! Normalized time series driving the dispatch model.
//!
//! A [`ProfileSet`] holds one availability series per renewable carrier
//! (normalized to installed power, in `[0, 1]`) and a load series normalized
//! to the annual sum, all sharing one timestamp index.

pub mod reader;
pub mod synthetic;

use chrono::{DateTime, Utc};

use crate::error::ProfileError;

/// CSV column names of the six profile series, in storage order.
pub const PROFILE_COLUMNS: [&str; 6] = [
    "pv_profile",
    "wind_on_profile",
    "wind_off_profile",
    "biomass_profile",
    "hydro_profile",
    "load_profile",
];

/// Time-indexed renewable availability and load profiles.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileSet {
    /// Snapshot start times (UTC), strictly increasing.
    pub timestamps: Vec<DateTime<Utc>>,
    /// PV availability per unit of installed power.
    pub pv: Vec<f64>,
    /// Onshore wind availability per unit of installed power.
    pub wind_on: Vec<f64>,
    /// Offshore wind availability per unit of installed power.
    pub wind_off: Vec<f64>,
    /// Biomass availability per unit of installed power.
    pub biomass: Vec<f64>,
    /// Hydro availability per unit of installed power.
    pub hydro: Vec<f64>,
    /// Share of annual demand falling into each snapshot.
    pub load: Vec<f64>,
}

impl ProfileSet {
    /// Builds and validates a profile set.
    ///
    /// # Errors
    ///
    /// Returns the first violation reported by [`ProfileSet::validate`].
    pub fn new(
        timestamps: Vec<DateTime<Utc>>,
        pv: Vec<f64>,
        wind_on: Vec<f64>,
        wind_off: Vec<f64>,
        biomass: Vec<f64>,
        hydro: Vec<f64>,
        load: Vec<f64>,
    ) -> Result<Self, ProfileError> {
        let set = Self {
            timestamps,
            pv,
            wind_on,
            wind_off,
            biomass,
            hydro,
            load,
        };
        set.validate()?;
        Ok(set)
    }

    /// Number of snapshots.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Renewable series paired with their CSV column names.
    pub fn renewables(&self) -> [(&'static str, &[f64]); 5] {
        [
            (PROFILE_COLUMNS[0], self.pv.as_slice()),
            (PROFILE_COLUMNS[1], self.wind_on.as_slice()),
            (PROFILE_COLUMNS[2], self.wind_off.as_slice()),
            (PROFILE_COLUMNS[3], self.biomass.as_slice()),
            (PROFILE_COLUMNS[4], self.hydro.as_slice()),
        ]
    }

    /// Checks lengths, ordering and value ranges.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let n = self.len();
        if n == 0 {
            return Err(ProfileError::Empty);
        }

        for (column, series) in self
            .renewables()
            .into_iter()
            .chain(std::iter::once((PROFILE_COLUMNS[5], self.load.as_slice())))
        {
            if series.len() != n {
                return Err(ProfileError::LengthMismatch {
                    column,
                    len: series.len(),
                    expected: n,
                });
            }
        }

        for (row, pair) in self.timestamps.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(ProfileError::Unordered { row: row + 2 });
            }
        }

        for (column, series) in self.renewables() {
            if let Some((row, &value)) = series
                .iter()
                .enumerate()
                .find(|&(_, v)| !(0.0..=1.0).contains(v))
            {
                return Err(ProfileError::OutOfRange {
                    row: row + 1,
                    column,
                    value,
                    expected: "a value in [0, 1]",
                });
            }
        }

        if let Some((row, &value)) = self
            .load
            .iter()
            .enumerate()
            .find(|&(_, v)| !v.is_finite() || *v < 0.0)
        {
            return Err(ProfileError::OutOfRange {
                row: row + 1,
                column: PROFILE_COLUMNS[5],
                value,
                expected: "a finite value >= 0",
            });
        }

        if self.load_sum() <= 0.0 {
            return Err(ProfileError::ZeroLoad);
        }

        Ok(())
    }

    /// Duration of each snapshot in hours, derived from timestamp spacing.
    ///
    /// The last snapshot repeats the spacing before it; a single snapshot
    /// weighs one hour.
    pub fn weights(&self) -> Vec<f64> {
        let n = self.len();
        if n == 0 {
            return Vec::new();
        }
        if n == 1 {
            return vec![1.0];
        }

        let mut weights: Vec<f64> = self
            .timestamps
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).num_seconds() as f64 / 3600.0)
            .collect();
        let last = weights[n - 2];
        weights.push(last);
        weights
    }

    /// Total modelled time span in hours.
    pub fn horizon_hours(&self) -> f64 {
        self.weights().iter().sum()
    }

    /// Sum of the load profile.
    pub fn load_sum(&self) -> f64 {
        self.load.iter().sum()
    }

    /// Load profile rescaled to sum to exactly 1.0.
    pub fn normalized_load(&self) -> Vec<f64> {
        let sum = self.load_sum();
        if sum <= 0.0 {
            return self.load.clone();
        }
        self.load.iter().map(|v| v / sum).collect()
    }
}
