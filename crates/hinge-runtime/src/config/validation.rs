//! Configuration validation.

use std::collections::HashMap;

use super::error::{ConfigError, ConfigResult};
use super::schema::{HingeConfig, LogOutput, LoggingConfig, RegistriesConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &HingeConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_registries_config(&config.registries)?;
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.filters.keys().any(|target| target.trim().is_empty()) {
        return Err(ConfigError::validation("Log filter targets cannot be empty"));
    }

    if logging.output == LogOutput::File
        && logging
            .file_path
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
    {
        return Err(ConfigError::validation("Log file path cannot be empty"));
    }

    Ok(())
}

fn validate_registries_config(registries: &RegistriesConfig) -> ConfigResult<()> {
    // Sorted so the reported pair does not depend on map order.
    let mut qualifiers: Vec<_> = registries.qualifiers.iter().collect();
    qualifiers.sort();

    let mut seen: HashMap<&str, &str> = HashMap::new();
    let mut contracts: HashMap<String, &str> = HashMap::new();
    for (contract, qualifier) in qualifiers {
        if contract.trim().is_empty() {
            return Err(ConfigError::validation(
                "Qualifier overrides must name a contract",
            ));
        }
        if let Some(first) = contracts.insert(contract.to_ascii_lowercase(), contract) {
            return Err(ConfigError::validation(format!(
                "Qualifier keys '{first}' and '{contract}' name the same contract"
            )));
        }
        if qualifier.trim().is_empty() {
            return Err(ConfigError::validation(format!(
                "Qualifier for '{contract}' cannot be empty"
            )));
        }
        if qualifier.chars().any(char::is_whitespace) {
            return Err(ConfigError::validation(format!(
                "Qualifier '{qualifier}' for '{contract}' cannot contain whitespace"
            )));
        }
        if let Some(first) = seen.insert(qualifier, contract) {
            return Err(ConfigError::DuplicateQualifier {
                qualifier: qualifier.clone(),
                first: first.to_string(),
                second: contract.clone(),
            });
        }
    }

    if registries.exclude.iter().any(|contract| contract.trim().is_empty()) {
        return Err(ConfigError::validation("Excluded contract names cannot be empty"));
    }

    Ok(())
}
