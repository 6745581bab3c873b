// Configuration module for reading Snake.toml
// This module provides OOP-style configuration management for the Battlesnake bot

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::safety::{RiskPolicy, Severity};

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub appearance: AppearanceConfig,
    pub risk: RiskConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    pub debug: DebugConfig,
}

/// Metadata returned from GET /
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppearanceConfig {
    pub apiversion: String,
    pub author: String,
    pub color: String,
    pub head: String,
    pub tail: String,
}

/// Severities for moves that are risky rather than illegal
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RiskConfig {
    /// Moving onto a tail that may or may not vacate
    pub tail_severity: Severity,
    /// Moving where an equal or longer opponent head may also move
    pub head_on_severity: Severity,
}

impl RiskConfig {
    pub fn policy(&self) -> RiskPolicy {
        RiskPolicy {
            tail_severity: self.tail_severity,
            head_on_severity: self.head_on_severity,
        }
    }
}

/// Random tie-break settings
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct SelectionConfig {
    /// Seeds each turn's RNG (combined with the turn number) when set
    pub seed: Option<u64>,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Snake.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration text
    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// A tail risk must always rank below a possible head-on loss
    fn validate(&self) -> Result<(), String> {
        if self.risk.tail_severity >= self.risk.head_on_severity {
            return Err(format!(
                "risk.tail_severity ({}) must be lower than risk.head_on_severity ({})",
                self.risk.tail_severity, self.risk.head_on_severity
            ));
        }
        Ok(())
    }

    /// Loads default configuration from Snake.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Snake.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Snake.toml
    pub fn default_hardcoded() -> Self {
        let policy = RiskPolicy::default();
        Config {
            appearance: AppearanceConfig {
                apiversion: "1".to_string(),
                author: "BigMac27".to_string(),
                color: "#105c1b".to_string(),
                head: "caffeine".to_string(),
                tail: "swoop".to_string(),
            },
            risk: RiskConfig {
                tail_severity: policy.tail_severity,
                head_on_severity: policy.head_on_severity,
            },
            selection: SelectionConfig { seed: None },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "battlesnake_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!("Could not load Snake.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_orders_tail_below_head_on() {
        let config = Config::default_hardcoded();
        assert!(config.validate().is_ok());
        assert_eq!(config.risk.policy(), RiskPolicy::default());
    }

    #[test]
    fn test_snake_toml_can_be_parsed() {
        // This test ensures Snake.toml is valid and can be parsed
        let result = Config::from_file("Snake.toml");
        assert!(
            result.is_ok(),
            "Failed to parse Snake.toml: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_snake_toml_matches_hardcoded_defaults() {
        let file_config = Config::from_file("Snake.toml").expect("Snake.toml should be parseable");
        assert_eq!(file_config, Config::default_hardcoded());
    }

    #[test]
    fn test_inverted_severities_are_rejected() {
        let text = r##"
            [appearance]
            apiversion = "1"
            author = "x"
            color = "#000000"
            head = "default"
            tail = "default"

            [risk]
            tail_severity = 3
            head_on_severity = 2

            [debug]
            enabled = false
            log_file_path = "x.jsonl"
        "##;
        let err = Config::from_toml_str(text).unwrap_err();
        assert!(err.contains("tail_severity"));
    }

    #[test]
    fn test_selection_section_is_optional() {
        let text = r##"
            [appearance]
            apiversion = "1"
            author = "x"
            color = "#000000"
            head = "default"
            tail = "default"

            [risk]
            tail_severity = 1
            head_on_severity = 2

            [debug]
            enabled = false
            log_file_path = "x.jsonl"
        "##;
        let config = Config::from_toml_str(text).unwrap();
        assert_eq!(config.selection.seed, None);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        // Test with a non-existent file
        let result = Config::from_file("nonexistent.toml");
        assert!(result.is_err());
    }
}
