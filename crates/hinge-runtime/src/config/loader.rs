//! Configuration loader using figment.
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Profile-specific config file (`hinge.{profile}.toml`)
//! 3. Main config file (`hinge.toml`)
//! 4. Environment variables (`HINGE_*`)
//! 5. Programmatic overrides
//!
//! # Environment Variable Mapping
//!
//! Environment variables use the `HINGE_` prefix with `__` as separator:
//!
//! - `HINGE_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `HINGE_REGISTRIES__SEAL_ON_START=false` → `registries.seal_on_start = false`
//! - `HINGE_REGISTRIES__QUALIFIERS__FORMATTER=csvFormatters` →
//!   `registries.qualifiers.formatter = "csvFormatters"`
//!
//! Qualifier keys are lowercased in every layer before merging, so the env
//! entry above overrides a `Formatter = "..."` entry from `hinge.toml`.
//!
//! # Example
//!
//! ```rust,ignore
//! use hinge_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .profile("production")
//!     .file("./config/hinge.toml")
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use std::collections::BTreeMap;

#[cfg(feature = "toml-config")]
use figment::providers::{Format, Toml};
use figment::providers::{Env, Serialized};
use figment::value::{Dict, Map, Value};
use figment::{Figment, Metadata, Provider};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::HingeConfig;
use super::validation::validate_config;

const ENV_PREFIX: &str = "HINGE_";
const PROFILE_ENV: &str = "HINGE_PROFILE";
const BASE_NAME: &str = "hinge";

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Production,
    Custom(String),
}

impl Profile {
    /// Returns the profile name as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Parses a profile name, accepting `dev` and `prod` shorthands.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Reads `HINGE_PROFILE`, defaulting to development.
    pub fn from_env() -> Self {
        std::env::var(PROFILE_ENV)
            .map(|name| Self::parse(&name))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration loader with figment-based multi-source support.
pub struct ConfigLoader {
    /// Programmatic overrides, merged last.
    overrides: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    /// Specific config file to load (overrides search).
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a new configuration loader with defaults.
    pub fn new() -> Self {
        Self {
            overrides: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    /// Sets the configuration profile.
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.profile = Profile::parse(profile.as_ref());
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Adds the current directory to the search paths.
    pub fn with_current_dir(self) -> Self {
        match std::env::current_dir() {
            Ok(cwd) => self.search_path(cwd),
            Err(_) => self,
        }
    }

    /// Adds the user config directory (`~/.config/hinge` on Linux).
    pub fn with_user_config_dir(self) -> Self {
        match dirs::config_dir() {
            Some(config_dir) => self.search_path(config_dir.join(BASE_NAME)),
            None => self,
        }
    }

    /// Sets a specific configuration file to load.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enables loading environment variables (default: true).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges configuration programmatically, above every other source.
    pub fn merge(mut self, config: HingeConfig) -> Self {
        self.overrides = self.overrides.merge(Serialized::defaults(config));
        self
    }

    /// Loads, validates and returns the configuration.
    pub fn load(self) -> ConfigResult<HingeConfig> {
        let profile = self.profile.clone();
        let config: HingeConfig = self.build_figment()?.extract()?;
        validate_config(&config)?;

        debug!(
            profile = %profile,
            logging_level = %config.logging.level,
            qualifiers = config.registries.qualifiers.len(),
            excluded = config.registries.exclude.len(),
            "Configuration loaded"
        );

        Ok(config)
    }

    fn build_figment(self) -> ConfigResult<Figment> {
        let mut figment =
            Figment::from(ContractKeys(Serialized::defaults(HingeConfig::default())));

        if let Some(path) = &self.config_file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            info!(path = %path.display(), "Loading configuration file");
            figment = Self::merge_config_file(figment, path)?;
        } else {
            figment = self.load_config_files(figment);
        }

        if self.load_env {
            trace!("Loading environment variables with {ENV_PREFIX} prefix");
            figment = figment.merge(ContractKeys(Env::prefixed(ENV_PREFIX).split("__")));
        }

        Ok(figment.merge(ContractKeys(self.overrides)))
    }

    /// Merges a single config file, dispatching on its extension.
    fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            #[cfg(feature = "toml-config")]
            "toml" => Ok(figment.merge(ContractKeys(Toml::file(path)))),
            _ => Err(ConfigError::ParseError(format!(
                "Unsupported or disabled configuration file format: .{ext}"
            ))),
        }
    }

    /// Explicit search paths, or the current and user config directories.
    pub(crate) fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(BASE_NAME));
        }
        paths
    }

    /// Searches for `hinge.{profile}.toml` and `hinge.toml`, stopping at the
    /// first directory holding a base file.
    #[cfg(feature = "toml-config")]
    fn load_config_files(&self, mut figment: Figment) -> Figment {
        for search_path in self.resolve_search_paths() {
            let profile_path =
                search_path.join(format!("{BASE_NAME}.{}.toml", self.profile.as_str()));
            if profile_path.exists() {
                debug!(path = %profile_path.display(), "Loading profile-specific config");
                figment = figment.merge(ContractKeys(Toml::file(&profile_path)));
            }

            let base_path = search_path.join(format!("{BASE_NAME}.toml"));
            if base_path.exists() {
                info!(path = %base_path.display(), "Loading configuration file");
                return figment.merge(ContractKeys(Toml::file(&base_path)));
            }
        }
        warn!("No configuration file found, using defaults");
        figment
    }

    #[cfg(not(feature = "toml-config"))]
    fn load_config_files(&self, figment: Figment) -> Figment {
        debug!(
            paths = self.resolve_search_paths().len(),
            "File configuration disabled, skipping search"
        );
        figment
    }
}

// =============================================================================
// Contract keys
// =============================================================================

/// Lowercases the contract names under `registries.qualifiers`, so a file's
/// `Formatter` and the environment's `formatter` merge as one key.
struct ContractKeys<P>(P);

impl<P: Provider> Provider for ContractKeys<P> {
    fn metadata(&self) -> Metadata {
        self.0.metadata()
    }

    fn data(&self) -> Result<Map<figment::Profile, Dict>, figment::Error> {
        let mut data = self.0.data()?;
        for dict in data.values_mut() {
            lowercase_qualifier_keys(dict)?;
        }
        Ok(data)
    }

    fn profile(&self) -> Option<figment::Profile> {
        self.0.profile()
    }
}

fn lowercase_qualifier_keys(dict: &mut Dict) -> Result<(), figment::Error> {
    let Some(Value::Dict(_, registries)) = dict.get_mut("registries") else {
        return Ok(());
    };
    let Some(Value::Dict(_, qualifiers)) = registries.get_mut("qualifiers") else {
        return Ok(());
    };

    let mut originals: BTreeMap<String, String> = BTreeMap::new();
    let mut lowered = Dict::new();
    for (contract, qualifier) in std::mem::take(qualifiers) {
        let key = contract.to_ascii_lowercase();
        if let Some(first) = originals.insert(key.clone(), contract.clone()) {
            return Err(figment::Error::from(format!(
                "qualifier keys '{first}' and '{contract}' name the same contract"
            )));
        }
        lowered.insert(key, qualifier);
    }
    *qualifiers = lowered;
    Ok(())
}

/// Loads configuration from the default locations.
pub fn load_config() -> ConfigResult<HingeConfig> {
    ConfigLoader::new().load()
}

/// Loads configuration from `path`, plus environment overrides.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<HingeConfig> {
    ConfigLoader::new().file(path).load()
}

// =============================================================================
// Tests
// =============================================================================
