//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    #[serde(default = "default_strategy")]
    pub strategy: String,
    #[serde(default = "default_offloading")]
    pub offloading: String,
    #[serde(default = "default_topology")]
    pub topology: String,
    #[serde(default)]
    pub loadbalancing: bool,
    #[serde(default)]
    pub compute_energydata: bool,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub proactive: ProactiveConfig,
    #[serde(default)]
    pub reactive: ReactiveConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub battery: BatteryConfig,
    #[serde(default = "default_server_id")]
    pub server_id: u32,
    #[serde(default)]
    pub edge_device_ids: EdgeDeviceIdsConfig,
}

fn default_strategy() -> String {
    "reactive".to_string()
}

fn default_offloading() -> String {
    "model".to_string()
}

fn default_topology() -> String {
    "test".to_string()
}

fn default_server_id() -> u32 {
    1
}

/// Simulation timing and global parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of ticks to run (must be > 0).
    pub steps: usize,
    /// Nominal duration of one tick, in `tick_unit`s (passed to the host framework only).
    pub tick_duration: f32,
    /// Unit name for `tick_duration` (e.g. `"seconds"`).
    pub tick_unit: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steps: 100,
            tick_duration: 1.0,
            tick_unit: "seconds".to_string(),
        }
    }
}

/// Proactive strategy parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProactiveConfig {
    /// Upload/download trigger, in watts (or watt-hours of SoC, battery-backed).
    pub min_power_threshold: f32,
}

impl Default for ProactiveConfig {
    fn default() -> Self {
        Self { min_power_threshold: 5.0 }
    }
}

/// Reactive strategy parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReactiveConfig {
    pub max_services_per_device: u32,
}

impl Default for ReactiveConfig {
    fn default() -> Self {
        Self { max_services_per_device: 2 }
    }
}

/// Oracle strategy parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OracleConfig {
    pub max_services_per_device: u32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self { max_services_per_device: 2 }
    }
}

/// Physical battery parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryCharacteristics {
    pub ampere_hours: f32,
    pub voltage: f32,
    pub efficiency: f32,
    pub initial_charge: f32,
    pub depth_of_discharge: f32,
}

impl Default for BatteryCharacteristics {
    fn default() -> Self {
        Self {
            ampere_hours: 10.0,
            voltage: 12.0,
            efficiency: 0.9,
            initial_charge: 0.5,
            depth_of_discharge: 0.2,
        }
    }
}

/// Battery storage layer parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    pub enabled: bool,
    pub characteristics: BatteryCharacteristics,
    /// Per-tick device draw, watts; must exceed `proactive.min_power_threshold` when enabled.
    pub power_required: f32,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            characteristics: BatteryCharacteristics::default(),
            power_required: 8.0,
        }
    }
}

/// Edge device id lists, one per `topology` value.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EdgeDeviceIdsConfig {
    pub test: Vec<u32>,
    pub prod: Vec<u32>,
}

impl Default for EdgeDeviceIdsConfig {
    fn default() -> Self {
        Self {
            test: vec![2, 3],
            prod: Vec::new(),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            offloading: default_offloading(),
            topology: default_topology(),
            loadbalancing: false,
            compute_energydata: false,
            simulation: SimulationConfig::default(),
            proactive: ProactiveConfig::default(),
            reactive: ReactiveConfig::default(),
            oracle: OracleConfig::default(),
            battery: BatteryConfig::default(),
            server_id: default_server_id(),
            edge_device_ids: EdgeDeviceIdsConfig::default(),
        }
    }
}

impl ScenarioConfig {
    /// The built-in runnable baseline: reactive strategy, model offloading, no battery.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// A battery-constrained scenario: proactive strategy driven by state of charge.
    pub fn battery_constrained() -> Self {
        Self {
            strategy: "proactive".to_string(),
            battery: BatteryConfig {
                enabled: true,
                characteristics: BatteryCharacteristics {
                    ampere_hours: 5.0,
                    voltage: 12.0,
                    efficiency: 0.85,
                    initial_charge: 0.6,
                    depth_of_discharge: 0.3,
                },
                power_required: 6.0,
            },
            proactive: ProactiveConfig { min_power_threshold: 4.0 },
            ..Self::default()
        }
    }

    /// A denser fleet exercising the oracle strategy's load-balancing pass.
    pub fn oracle_dense() -> Self {
        Self {
            strategy: "oracle".to_string(),
            loadbalancing: true,
            oracle: OracleConfig { max_services_per_device: 4 },
            edge_device_ids: EdgeDeviceIdsConfig {
                test: vec![2, 3, 4, 5],
                prod: Vec::new(),
            },
            ..Self::default()
        }
    }

    pub const PRESETS: &[&str] = &["baseline", "battery_constrained", "oracle_dense"];

    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "battery_constrained" => Ok(Self::battery_constrained()),
            "oracle_dense" => Ok(Self::oracle_dense()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!("unknown preset \"{name}\", available: {}", Self::PRESETS.join(", ")),
            }),
        }
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates every constraint named in the error-handling design; an
    /// empty vector means the configuration is runnable.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if !["reactive", "proactive", "oracle"].contains(&self.strategy.as_str()) {
            errors.push(ConfigError {
                field: "strategy".into(),
                message: format!("must be \"reactive\", \"proactive\" or \"oracle\", got \"{}\"", self.strategy),
            });
        }
        if !["model", "data"].contains(&self.offloading.as_str()) {
            errors.push(ConfigError {
                field: "offloading".into(),
                message: format!("must be \"model\" or \"data\", got \"{}\"", self.offloading),
            });
        }
        if !["test", "prod"].contains(&self.topology.as_str()) {
            errors.push(ConfigError {
                field: "topology".into(),
                message: format!("must be \"test\" or \"prod\", got \"{}\"", self.topology),
            });
        }
        if self.simulation.steps == 0 {
            errors.push(ConfigError {
                field: "simulation.steps".into(),
                message: "must be > 0".into(),
            });
        }
        if self.proactive.min_power_threshold <= 0.0 {
            errors.push(ConfigError {
                field: "proactive.min_power_threshold".into(),
                message: "must be > 0".into(),
            });
        }
        if self.reactive.max_services_per_device == 0 {
            errors.push(ConfigError {
                field: "reactive.max_services_per_device".into(),
                message: "must be > 0".into(),
            });
        }
        if self.oracle.max_services_per_device == 0 {
            errors.push(ConfigError {
                field: "oracle.max_services_per_device".into(),
                message: "must be > 0".into(),
            });
        }
        if self.server_id == 0 {
            errors.push(ConfigError {
                field: "server_id".into(),
                message: "must be non-zero (0 is the transfer-slot sentinel)".into(),
            });
        }

        let selected_ids = match self.topology.as_str() {
            "prod" => &self.edge_device_ids.prod,
            _ => &self.edge_device_ids.test,
        };
        if selected_ids.is_empty() {
            errors.push(ConfigError {
                field: format!("edge_device_ids.{}", self.topology),
                message: "must list at least one device id".into(),
            });
        }

        if self.battery.enabled {
            let c = &self.battery.characteristics;
            if self.proactive.min_power_threshold >= self.battery.power_required {
                errors.push(ConfigError {
                    field: "battery.power_required".into(),
                    message: "must exceed proactive.min_power_threshold when battery is enabled".into(),
                });
            }
            if c.ampere_hours <= 0.0 {
                errors.push(ConfigError {
                    field: "battery.characteristics.ampere_hours".into(),
                    message: "must be > 0".into(),
                });
            }
            if c.voltage <= 0.0 {
                errors.push(ConfigError {
                    field: "battery.characteristics.voltage".into(),
                    message: "must be > 0".into(),
                });
            }
            if !(0.0..=1.0).contains(&c.efficiency) || c.efficiency <= 0.0 {
                errors.push(ConfigError {
                    field: "battery.characteristics.efficiency".into(),
                    message: "must be in (0.0, 1.0]".into(),
                });
            }
            if !(0.0..=1.0).contains(&c.initial_charge) {
                errors.push(ConfigError {
                    field: "battery.characteristics.initial_charge".into(),
                    message: "must be in [0.0, 1.0]".into(),
                });
            }
            if !(0.0..1.0).contains(&c.depth_of_discharge) {
                errors.push(ConfigError {
                    field: "battery.characteristics.depth_of_discharge".into(),
                    message: "must be in [0.0, 1.0)".into(),
                });
            }
        }

        errors
    }
}
