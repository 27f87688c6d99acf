//! TOML-based scenario configuration and preset definitions.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::modules::{RADIO_STATE_CATEGORY, RadioState};
use crate::sim::script::ScriptEntry;

/// Top-level scenario configuration parsed from TOML.
///
/// Load from TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::demo`] for the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Host compound modules and the modules they contain.
    #[serde(default)]
    pub hosts: Vec<HostConfig>,
    /// Publications replayed after initialization.
    #[serde(default)]
    pub script: ScriptConfig,
}

/// Global parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Master random seed.
    pub seed: u64,
    /// Turns on debug diagnostics for every module.
    pub debug: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            debug: false,
        }
    }
}

/// A host compound module.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    /// Structural name, unique per scenario.
    pub name: String,
    /// Host index, unique per scenario.
    pub index: usize,
    /// Overrides the structural name in log output.
    #[serde(default)]
    pub logging_name: Option<String>,
    /// Whether the host carries a battery.
    #[serde(default = "default_true")]
    pub battery: bool,
    #[serde(default)]
    pub modules: Vec<ModuleConfig>,
}

/// A module placed inside a host.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleConfig {
    pub name: String,
    /// `"radio"` or `"meter"`.
    pub kind: String,
    #[serde(default)]
    pub debug: Option<bool>,
    /// Battery accounts requested by a meter (default 1).
    #[serde(default)]
    pub accounts: Option<i32>,
    /// Initial state of a radio (default `"sleep"`).
    #[serde(default)]
    pub initial_state: Option<String>,
}

/// Publish script. Explicit `publish` entries take priority; otherwise
/// `steps` random entries are generated from `values`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptConfig {
    pub steps: usize,
    pub category: String,
    pub values: Vec<String>,
    pub publish: Vec<ScriptEntry>,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            steps: 0,
            category: RADIO_STATE_CATEGORY.to_string(),
            values: vec!["sleep".into(), "rx".into(), "tx".into()],
            publish: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Module kinds a scenario may instantiate.
pub const MODULE_KINDS: &[&str] = &["radio", "meter"];

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"hosts[1].index"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn module(name: &str, kind: &str) -> ModuleConfig {
    ModuleConfig {
        name: name.to_string(),
        kind: kind.to_string(),
        debug: None,
        accounts: None,
        initial_state: None,
    }
}

impl ScenarioConfig {
    /// Two battery-powered hosts, each with a radio and a meter, and a
    /// random 24-step script.
    pub fn demo() -> Self {
        let host = |name: &str, index: usize, logging_name: Option<&str>| HostConfig {
            name: name.to_string(),
            index,
            logging_name: logging_name.map(str::to_string),
            battery: true,
            modules: vec![module("nic", "radio"), module("meter", "meter")],
        };
        Self {
            simulation: SimulationConfig::default(),
            hosts: vec![host("node0", 0, Some("sink")), host("node1", 1, None)],
            script: ScriptConfig {
                steps: 24,
                ..ScriptConfig::default()
            },
        }
    }

    /// One host with a single radio and a fixed three-step script.
    pub fn single_host() -> Self {
        let entry = |value: &str| ScriptEntry {
            host: "node0".to_string(),
            category: RADIO_STATE_CATEGORY.to_string(),
            value: value.to_string(),
        };
        Self {
            simulation: SimulationConfig::default(),
            hosts: vec![HostConfig {
                name: "node0".to_string(),
                index: 0,
                logging_name: None,
                battery: true,
                modules: vec![module("nic", "radio")],
            }],
            script: ScriptConfig {
                publish: vec![entry("rx"), entry("tx"), entry("sleep")],
                ..ScriptConfig::default()
            },
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["demo", "single_host"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "demo" => Ok(Self::demo()),
            "single_host" => Ok(Self::single_host()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut names = BTreeSet::new();
        let mut indices = BTreeSet::new();

        if self.hosts.is_empty() {
            errors.push(ConfigError::new("hosts", "at least one host is required"));
        }

        for (h, host) in self.hosts.iter().enumerate() {
            if host.name.is_empty() {
                errors.push(ConfigError::new(format!("hosts[{h}].name"), "must not be empty"));
            }
            if !names.insert(host.name.as_str()) {
                errors.push(ConfigError::new(
                    format!("hosts[{h}].name"),
                    format!("duplicate host name \"{}\"", host.name),
                ));
            }
            if !indices.insert(host.index) {
                errors.push(ConfigError::new(
                    format!("hosts[{h}].index"),
                    format!("duplicate host index {}", host.index),
                ));
            }

            for (m, module) in host.modules.iter().enumerate() {
                let field = format!("hosts[{h}].modules[{m}]");
                if !MODULE_KINDS.contains(&module.kind.as_str()) {
                    errors.push(ConfigError::new(
                        format!("{field}.kind"),
                        format!(
                            "must be one of {}, got \"{}\"",
                            MODULE_KINDS.join(", "),
                            module.kind
                        ),
                    ));
                }
                if let Some(n) = module.accounts {
                    if n <= 0 {
                        errors.push(ConfigError::new(format!("{field}.accounts"), "must be > 0"));
                    }
                    if module.kind == "radio" {
                        errors.push(ConfigError::new(
                            format!("{field}.accounts"),
                            format!("radios always register {} accounts", RadioState::COUNT),
                        ));
                    }
                }
                if let Some(state) = &module.initial_state {
                    if module.kind != "radio" {
                        errors.push(ConfigError::new(
                            format!("{field}.initial_state"),
                            "only radios have a state",
                        ));
                    } else if let Err(e) = state.parse::<RadioState>() {
                        errors.push(ConfigError::new(format!("{field}.initial_state"), e));
                    }
                }
            }
        }

        let script = &self.script;
        if script.publish.is_empty() && script.steps > 0 {
            if script.values.is_empty() {
                errors.push(ConfigError::new(
                    "script.values",
                    "must not be empty when script.steps > 0",
                ));
            }
            if script.category.is_empty() {
                errors.push(ConfigError::new("script.category", "must not be empty"));
            }
        }
        for (i, entry) in script.publish.iter().enumerate() {
            if !names.contains(entry.host.as_str()) {
                errors.push(ConfigError::new(
                    format!("script.publish[{i}].host"),
                    format!("unknown host \"{}\"", entry.host),
                ));
            }
        }

        errors
    }
}
