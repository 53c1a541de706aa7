//! TOML-based model configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::dispatch::solver::SolverBackend;

/// Top-level model configuration parsed from TOML.
///
/// All fields have defaults matching the reference German scenario. Load from
/// TOML with [`ModelConfig::from_toml_file`] or use [`ModelConfig::germany`]
/// for the built-in default.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Annual electricity demand.
    #[serde(default)]
    pub demand: DemandConfig,
    /// Installed renewable capacities.
    #[serde(default)]
    pub capacities: CapacityConfig,
    /// Battery storage parameters.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Extendable backup plant parameters.
    #[serde(default)]
    pub backup: BackupConfig,
    /// Shared generation parameters.
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Solver selection.
    #[serde(default)]
    pub solver: SolverConfig,
    /// Synthetic profile generation, used when no profile file is given.
    #[serde(default)]
    pub synthetic: SyntheticConfig,
}

/// Annual electricity demand.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemandConfig {
    /// Sum of electrical load over a year (MWh/a).
    pub annual_load_mwh: f64,
}

impl Default for DemandConfig {
    fn default() -> Self {
        Self {
            annual_load_mwh: 750_000_000.0,
        }
    }
}

/// Installed power of the fixed renewable fleet (MW).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapacityConfig {
    pub pv_mw: f64,
    pub wind_on_mw: f64,
    pub wind_off_mw: f64,
    pub biomass_mw: f64,
    pub hydro_mw: f64,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            pv_mw: 215_000.0,
            wind_on_mw: 115_000.0,
            wind_off_mw: 30_000.0,
            biomass_mw: 5_200.0,
            hydro_mw: 2_100.0,
        }
    }
}

/// Battery storage parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Installed charge/discharge power (MW).
    pub power_mw: f64,
    /// Energy capacity in hours at full power.
    pub duration_h: f64,
    /// Charge efficiency (0.0–1.0].
    pub charge_efficiency: f64,
    /// Discharge efficiency (0.0–1.0].
    pub discharge_efficiency: f64,
    /// Fraction of stored energy lost per hour.
    pub standing_loss: f64,
    /// Whether the state of charge must return to its starting value.
    pub cyclic: bool,
    /// Initial state of charge as a fraction of energy capacity (non-cyclic only).
    pub initial_soc: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            power_mw: 25_000.0,
            duration_h: 4.0,
            charge_efficiency: 0.90,
            discharge_efficiency: 1.0,
            standing_loss: 0.0001,
            cyclic: true,
            initial_soc: 0.0,
        }
    }
}

/// Extendable backup ("residual load") plant parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackupConfig {
    /// Marginal cost (EUR/MWh).
    pub marginal_cost: f64,
    /// Capital cost (EUR/MW).
    pub capital_cost: f64,
    /// Lower bound on installed power (MW).
    pub min_capacity_mw: f64,
    /// Optional upper bound on installed power (MW).
    pub max_capacity_mw: Option<f64>,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            marginal_cost: 100.0,
            capital_cost: 1_000.0,
            min_capacity_mw: 0.0,
            max_capacity_mw: None,
        }
    }
}

/// Parameters shared by the renewable generators.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Marginal cost applied to every renewable generator (EUR/MWh).
    pub renewable_marginal_cost: f64,
    /// Rescale the load profile so it sums to exactly 1.0 before use.
    pub normalize_load_profile: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            renewable_marginal_cost: 0.1,
            normalize_load_profile: false,
        }
    }
}

/// Solver selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Backend name: `"microlp"` or `"highs"`.
    pub backend: String,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: SolverBackend::default().name().to_string(),
        }
    }
}

/// Synthetic profile generation parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyntheticConfig {
    /// First snapshot (UTC).
    pub start: NaiveDateTime,
    /// Number of days to generate (must be > 0).
    pub days: usize,
    /// Snapshots per day (must be > 0).
    pub steps_per_day: usize,
    /// Random seed.
    pub seed: u64,
    /// First day of the low wind / low solar window.
    pub dunkelflaute_start_day: usize,
    /// Length of the low wind / low solar window in days (0 disables it).
    pub dunkelflaute_days: usize,
    /// Multiplier applied to wind and solar availability inside the window.
    pub dunkelflaute_factor: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            start: NaiveDateTime::parse_from_str("2023-01-01 00:00:00", "%Y-%m-%d %H:%M:%S")
                .unwrap_or_default(),
            days: 14,
            steps_per_day: 24,
            seed: 42,
            dunkelflaute_start_day: 7,
            dunkelflaute_days: 4,
            dunkelflaute_factor: 0.1,
        }
    }
}

impl SyntheticConfig {
    /// Sets the horizon and pulls the low wind / low solar window inside it.
    ///
    /// The window keeps its length where possible and moves earlier; it is
    /// shortened only when it is longer than the new horizon.
    pub fn set_days(&mut self, days: usize) {
        self.days = days;
        self.dunkelflaute_days = self.dunkelflaute_days.min(days);
        self.dunkelflaute_start_day = self
            .dunkelflaute_start_day
            .min(days - self.dunkelflaute_days);
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"battery.charge_efficiency"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl ModelConfig {
    /// Returns the reference German scenario.
    pub fn germany() -> Self {
        Self::default()
    }

    /// Returns the reference scenario without any battery storage.
    pub fn no_storage() -> Self {
        Self {
            battery: BatteryConfig {
                power_mw: 0.0,
                ..BatteryConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the reference scenario with a large long-duration battery fleet.
    pub fn storage_heavy() -> Self {
        Self {
            battery: BatteryConfig {
                power_mw: 100_000.0,
                duration_h: 8.0,
                ..BatteryConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["germany", "no_storage", "storage_heavy"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "germany" => Ok(Self::germany()),
            "no_storage" => Ok(Self::no_storage()),
            "storage_heavy" => Ok(Self::storage_heavy()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut check = |ok: bool, field: &str, message: &str| {
            if !ok {
                errors.push(ConfigError {
                    field: field.into(),
                    message: message.into(),
                });
            }
        };

        check(
            self.demand.annual_load_mwh > 0.0,
            "demand.annual_load_mwh",
            "must be > 0",
        );

        let c = &self.capacities;
        for (field, value) in [
            ("capacities.pv_mw", c.pv_mw),
            ("capacities.wind_on_mw", c.wind_on_mw),
            ("capacities.wind_off_mw", c.wind_off_mw),
            ("capacities.biomass_mw", c.biomass_mw),
            ("capacities.hydro_mw", c.hydro_mw),
        ] {
            check(value >= 0.0, field, "must be >= 0");
        }

        let bat = &self.battery;
        check(bat.power_mw >= 0.0, "battery.power_mw", "must be >= 0");
        check(bat.duration_h >= 0.0, "battery.duration_h", "must be >= 0");
        check(
            bat.charge_efficiency > 0.0 && bat.charge_efficiency <= 1.0,
            "battery.charge_efficiency",
            "must be in (0.0, 1.0]",
        );
        check(
            bat.discharge_efficiency > 0.0 && bat.discharge_efficiency <= 1.0,
            "battery.discharge_efficiency",
            "must be in (0.0, 1.0]",
        );
        check(
            (0.0..1.0).contains(&bat.standing_loss),
            "battery.standing_loss",
            "must be in [0.0, 1.0)",
        );
        check(
            (0.0..=1.0).contains(&bat.initial_soc),
            "battery.initial_soc",
            "must be in [0.0, 1.0]",
        );

        let b = &self.backup;
        check(b.marginal_cost >= 0.0, "backup.marginal_cost", "must be >= 0");
        check(b.capital_cost >= 0.0, "backup.capital_cost", "must be >= 0");
        check(
            b.min_capacity_mw >= 0.0,
            "backup.min_capacity_mw",
            "must be >= 0",
        );
        if let Some(max) = b.max_capacity_mw {
            check(
                max >= b.min_capacity_mw,
                "backup.max_capacity_mw",
                "must be >= backup.min_capacity_mw",
            );
        }

        check(
            self.generation.renewable_marginal_cost >= 0.0,
            "generation.renewable_marginal_cost",
            "must be >= 0",
        );

        if let Err(e) = self.solver.backend.parse::<SolverBackend>() {
            errors.push(ConfigError {
                field: "solver.backend".into(),
                message: e,
            });
        }

        let s = &self.synthetic;
        if s.days == 0 {
            errors.push(ConfigError {
                field: "synthetic.days".into(),
                message: "must be > 0".into(),
            });
        }
        if s.steps_per_day == 0 {
            errors.push(ConfigError {
                field: "synthetic.steps_per_day".into(),
                message: "must be > 0".into(),
            });
        }
        if s.dunkelflaute_days > 0 && s.dunkelflaute_start_day + s.dunkelflaute_days > s.days {
            errors.push(ConfigError {
                field: "synthetic.dunkelflaute_start_day".into(),
                message: "window must end within synthetic.days".into(),
            });
        }
        if !(0.0..=1.0).contains(&s.dunkelflaute_factor) {
            errors.push(ConfigError {
                field: "synthetic.dunkelflaute_factor".into(),
                message: "must be in [0.0, 1.0]".into(),
            });
        }

        errors
    }

    /// Returns the parsed solver backend.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the backend name is unknown.
    pub fn solver_backend(&self) -> Result<SolverBackend, ConfigError> {
        self.solver
            .backend
            .parse()
            .map_err(|message| ConfigError {
                field: "solver.backend".into(),
                message,
            })
    }
}
