// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation of configuration values.
//!
//! Figment guarantees types and known keys; this module checks value
//! ranges and cross-field rules, collecting every violation instead of
//! stopping at the first.

use miette::Diagnostic;
use thiserror::Error;

use crate::model::MurmurConfig;

/// A single configuration validation failure.
#[derive(Debug, Error, Diagnostic)]
#[error("{field}: {message}")]
#[diagnostic(code(murmur::config::invalid_value))]
pub struct ConfigError {
    /// Dotted path of the offending key, e.g. `agent.history_window`.
    pub field: String,
    pub message: String,
    #[help]
    pub help: Option<String>,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>, help: Option<&str>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            help: help.map(String::from),
        }
    }
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validates a loaded configuration, returning all violations at once.
pub fn validate_config(config: &MurmurConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::new(
            "agent.log_level",
            format!("unknown level {:?}", config.agent.log_level),
            Some("expected one of: trace, debug, info, warn, error"),
        ));
    }

    if config.agent.history_window == 0 || config.agent.history_window > 64 {
        errors.push(ConfigError::new(
            "agent.history_window",
            format!("{} is out of range", config.agent.history_window),
            Some("expected a value between 1 and 64"),
        ));
    }

    if !(0.0..=2.0).contains(&config.gemini.temperature) {
        errors.push(ConfigError::new(
            "gemini.temperature",
            format!("{} is out of range", config.gemini.temperature),
            Some("expected a value between 0.0 and 2.0"),
        ));
    }

    if config.gemini.max_output_tokens == 0 {
        errors.push(ConfigError::new(
            "gemini.max_output_tokens",
            "must be at least 1",
            None,
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::new(
            "storage.database_path",
            "must not be empty",
            None,
        ));
    }

    if config.admin.port == 0 {
        errors.push(ConfigError::new(
            "admin.port",
            "port 0 is not a valid bind target",
            None,
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Renders validation errors to stderr as miette diagnostics.
pub fn render_errors(errors: &[ConfigError]) {
    for err in errors {
        eprintln!("{:?}", miette::Report::msg(err.to_string()));
        if let Some(help) = &err.help {
            eprintln!("  help: {help}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&MurmurConfig::default()).is_ok());
    }

    #[test]
    fn zero_history_window_is_rejected() {
        let mut config = MurmurConfig::default();
        config.agent.history_window = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "agent.history_window"));
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let mut config = MurmurConfig::default();
        config.gemini.temperature = 3.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "gemini.temperature"));
    }

    #[test]
    fn all_violations_are_collected() {
        let mut config = MurmurConfig::default();
        config.agent.log_level = "loud".into();
        config.admin.port = 0;
        config.storage.database_path = "  ".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
