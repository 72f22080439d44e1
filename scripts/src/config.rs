//! Compiler settings, named network profiles, and block explorer keys

use std::{collections::BTreeMap, env, fs, path::Path};

use serde::Deserialize;

use crate::{constants::DEFAULT_CONFIG, errors::ScriptError};

/// Solidity compiler settings used when building the contracts
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct CompilerSettings {
    /// The solc version
    pub version: String,
    /// Whether the optimizer is enabled
    #[serde(default)]
    pub optimizer: bool,
    /// The number of optimizer runs
    #[serde(default = "default_optimizer_runs")]
    pub optimizer_runs: u32,
    /// Whether to compile through the IR pipeline
    #[serde(default)]
    pub via_ir: bool,
}

/// The solc default
fn default_optimizer_runs() -> u32 {
    200
}

/// A named remote network
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct NetworkProfile {
    /// The name the profile is selected by, filled in from its table key
    #[serde(skip)]
    pub name: String,
    /// The JSON-RPC endpoint
    pub url: String,
    /// The expected chain ID, checked against the endpoint when present
    pub chain_id: Option<u64>,
    /// The key into [`Config::explorers`] used for contract verification
    pub explorer: Option<String>,
}

/// A block explorer used for contract verification
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ExplorerConfig {
    /// The environment variable holding the explorer API key
    pub api_key_env: String,
    /// A custom verifier API URL, for explorers the tooling does not know
    pub api_url: Option<String>,
}

/// The full script configuration
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// The compiler settings
    pub compiler: CompilerSettings,
    /// The network profiles, keyed by name
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkProfile>,
    /// The block explorers, keyed by name
    #[serde(default)]
    pub explorers: BTreeMap<String, ExplorerConfig>,
}

impl Config {
    /// The configuration shipped with the scripts
    pub fn builtin() -> Result<Self, ScriptError> {
        Self::from_toml_str(DEFAULT_CONFIG)
    }

    /// Parse a configuration from TOML
    pub fn from_toml_str(s: &str) -> Result<Self, ScriptError> {
        let mut config: Config =
            toml::from_str(s).map_err(|e| ScriptError::ConfigLoad(e.to_string()))?;

        for (name, profile) in config.networks.iter_mut() {
            profile.name = name.clone();
        }

        for profile in config.networks.values() {
            if let Some(explorer) = &profile.explorer {
                if !config.explorers.contains_key(explorer) {
                    return Err(ScriptError::ConfigLoad(format!(
                        "network `{}` references unknown explorer `{}`",
                        profile.name, explorer
                    )));
                }
            }
        }

        Ok(config)
    }

    /// Read a configuration file
    pub fn from_file(path: &Path) -> Result<Self, ScriptError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ScriptError::ConfigLoad(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Load the given configuration file, or the built-in one if none is given
    pub fn load(path: Option<&Path>) -> Result<Self, ScriptError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::builtin(),
        }
    }

    /// Look up a network profile by name
    pub fn network(&self, name: &str) -> Result<&NetworkProfile, ScriptError> {
        self.networks
            .get(name)
            .ok_or_else(|| ScriptError::UnknownNetwork(name.to_string()))
    }

    /// Look up the explorer used to verify contracts on the given network
    pub fn explorer(&self, profile: &NetworkProfile) -> Result<&ExplorerConfig, ScriptError> {
        profile
            .explorer
            .as_ref()
            .and_then(|name| self.explorers.get(name))
            .ok_or_else(|| ScriptError::MissingExplorerKey(profile.name.clone()))
    }

    /// Resolve the explorer API key for the given network from the environment
    pub fn explorer_api_key(&self, profile: &NetworkProfile) -> Result<String, ScriptError> {
        let explorer = self.explorer(profile)?;
        env::var(&explorer.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ScriptError::MissingExplorerKey(profile.name.clone()))
    }
}
