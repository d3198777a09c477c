//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HingeConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Registry wiring settings.
    #[serde(default)]
    pub registries: RegistriesConfig,
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to the equivalent `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature.
    Json,
}

/// Where log lines are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// How often the log file is rolled over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level for every target.
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Include thread IDs.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include file names and line numbers.
    #[serde(default)]
    pub file_location: bool,

    /// Log file, used when `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    #[serde(default)]
    pub rotation: LogRotation,

    /// Per-target levels, e.g. `hinge_core = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            output: LogOutput::Stdout,
            span_events: SpanEventConfig::default(),
            thread_ids: false,
            file_location: false,
            file_path: None,
            rotation: LogRotation::Never,
            filters: HashMap::new(),
        }
    }
}

// =============================================================================
// Registries
// =============================================================================

/// Registry wiring configuration.
///
/// Contracts are matched by simple name (`Formatter`) or full type name
/// (`dyn my_app::Formatter`), ignoring ASCII case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistriesConfig {
    /// Contract name to registry qualifier.
    #[serde(default)]
    pub qualifiers: HashMap<String, String>,

    /// Contracts that are not wired.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Seal every registry once startup contributions are installed.
    #[serde(default = "default_seal_on_start")]
    pub seal_on_start: bool,

    /// Fail startup when a contribution targets a contract that was not wired.
    #[serde(default)]
    pub strict_contributions: bool,
}

impl Default for RegistriesConfig {
    fn default() -> Self {
        Self {
            qualifiers: HashMap::new(),
            exclude: Vec::new(),
            seal_on_start: default_seal_on_start(),
            strict_contributions: false,
        }
    }
}

fn default_seal_on_start() -> bool {
    true
}

impl RegistriesConfig {
    /// The qualifier configured for a contract.
    ///
    /// A key naming the full type name wins over one naming the simple name.
    /// Among keys differing only in case, an exact match wins, then the
    /// smallest key.
    pub fn qualifier_for(&self, simple_name: &str, type_name: &str) -> Option<&str> {
        [type_name, simple_name]
            .into_iter()
            .find_map(|name| {
                self.qualifiers.get(name).or_else(|| {
                    self.qualifiers
                        .iter()
                        .filter(|(contract, _)| contract.eq_ignore_ascii_case(name))
                        .min_by_key(|(contract, _)| contract.as_str())
                        .map(|(_, qualifier)| qualifier)
                })
            })
            .map(String::as_str)
    }

    /// Returns `true` if the contract is excluded from wiring.
    pub fn is_excluded(&self, simple_name: &str, type_name: &str) -> bool {
        self.exclude
            .iter()
            .any(|contract| names_contract(contract, simple_name, type_name))
    }
}

fn names_contract(key: &str, simple_name: &str, type_name: &str) -> bool {
    key.eq_ignore_ascii_case(simple_name) || key.eq_ignore_ascii_case(type_name)
}
