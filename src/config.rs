//! Runtime configuration from `OBESENSE_*` environment variables.

use std::path::PathBuf;

use crate::adapters::artifacts::manifest::verifying_key_from_b64;
use crate::adapters::artifacts::{ArtifactError, ArtifactOptions, IntegrityPolicy};
use crate::application::UnknownCategoryPolicy;

pub const ARTIFACT_DIR_ENV: &str = "OBESENSE_ARTIFACT_DIR";
pub const MODEL_NAME_ENV: &str = "OBESENSE_MODEL_NAME";
pub const UNKNOWN_CATEGORY_ENV: &str = "OBESENSE_UNKNOWN_CATEGORY";
pub const REQUIRE_SIGNED_ENV: &str = "OBESENSE_REQUIRE_SIGNED_ARTIFACTS";
pub const PUBKEY_ENV: &str = "OBESENSE_ARTIFACT_PUBKEY_B64";
pub const LOG_MODE_ENV: &str = "OBESENSE_LOG_MODE";
pub const LOG_FILE_ENV: &str = "OBESENSE_LOG_FILE";

pub const DEFAULT_MODEL_NAME: &str = "Random Forest";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is invalid: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Where log output goes. Logging to the terminal would corrupt the TUI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogMode {
    File,
    Stdout,
    /// File when stdout is a terminal, stdout otherwise
    #[default]
    Auto,
}

impl LogMode {
    fn parse(value: &str) -> Self {
        match value.trim() {
            "file" => Self::File,
            "stdout" => Self::Stdout,
            _ => Self::Auto,
        }
    }

    /// Whether to log to a file given whether stdout is interactive.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("expected a boolean (true/false), got {other:?}")),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub artifact_dir: PathBuf,
    pub model_name: String,
    pub unknown_category: UnknownCategoryPolicy,
    pub require_signed: bool,
    /// Base64 Ed25519 verifying key for `manifest.sig`
    pub public_key_b64: Option<String>,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from("models"),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            unknown_category: UnknownCategoryPolicy::default(),
            require_signed: false,
            public_key_b64: None,
            log_mode: LogMode::default(),
            log_file: PathBuf::from("obesense.log"),
        }
    }
}

impl AppConfig {
    /// Read the configuration from the process environment.
    ///
    /// # Errors
    /// Returns `ConfigError` when a variable has an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read the configuration through `lookup`; unset or blank variables
    /// keep their defaults.
    ///
    /// # Errors
    /// Returns `ConfigError` when a variable has an unusable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(dir) = get(ARTIFACT_DIR_ENV) {
            config.artifact_dir = PathBuf::from(dir.trim());
        }
        if let Some(name) = get(MODEL_NAME_ENV) {
            config.model_name = name.trim().to_string();
        }
        if let Some(value) = get(UNKNOWN_CATEGORY_ENV) {
            config.unknown_category = value
                .parse::<UnknownCategoryPolicy>()
                .map_err(|reason| ConfigError::InvalidValue {
                    var: UNKNOWN_CATEGORY_ENV,
                    value: value.clone(),
                    reason,
                })?;
        }
        if let Some(value) = get(REQUIRE_SIGNED_ENV) {
            config.require_signed =
                parse_bool(&value).map_err(|reason| ConfigError::InvalidValue {
                    var: REQUIRE_SIGNED_ENV,
                    value: value.clone(),
                    reason,
                })?;
        }
        config.public_key_b64 = get(PUBKEY_ENV).map(|v| v.trim().to_string());
        if let Some(value) = get(LOG_MODE_ENV) {
            config.log_mode = LogMode::parse(&value);
        }
        if let Some(path) = get(LOG_FILE_ENV) {
            config.log_file = PathBuf::from(path.trim());
        }

        Ok(config)
    }

    /// Integrity policy derived from the signing settings.
    ///
    /// # Errors
    /// Returns `ArtifactError::Integrity` if the configured key is invalid.
    pub fn integrity_policy(&self) -> Result<IntegrityPolicy, ArtifactError> {
        let public_key = self
            .public_key_b64
            .as_deref()
            .map(verifying_key_from_b64)
            .transpose()?;
        Ok(IntegrityPolicy {
            require_signed: self.require_signed,
            public_key,
        })
    }

    /// Options for loading the artifact bundle.
    ///
    /// # Errors
    /// Returns `ArtifactError::Integrity` if the configured key is invalid.
    pub fn artifact_options(&self) -> Result<ArtifactOptions, ArtifactError> {
        Ok(ArtifactOptions {
            model_name: self.model_name.clone(),
            integrity: self.integrity_policy()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|var| map.get(var).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).expect("Should load");
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.model_name, "Random Forest");
        assert_eq!(cfg.artifact_dir, PathBuf::from("models"));
        assert!(!cfg.integrity_policy().expect("Should build").require_signed);
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            (ARTIFACT_DIR_ENV, "/srv/artifacts"),
            (MODEL_NAME_ENV, " Linear SVC "),
            (UNKNOWN_CATEGORY_ENV, "sentinel"),
            (REQUIRE_SIGNED_ENV, "YES"),
            (LOG_MODE_ENV, "stdout"),
            (LOG_FILE_ENV, "/tmp/o.log"),
        ])
        .expect("Should load");
        assert_eq!(cfg.artifact_dir, PathBuf::from("/srv/artifacts"));
        assert_eq!(cfg.model_name, "Linear SVC");
        assert_eq!(cfg.unknown_category, UnknownCategoryPolicy::Sentinel);
        assert!(cfg.require_signed);
        assert_eq!(cfg.log_mode, LogMode::Stdout);
        assert_eq!(cfg.log_file, PathBuf::from("/tmp/o.log"));
    }

    #[test]
    fn test_blank_values_keep_defaults() {
        let cfg =
            config(&[(MODEL_NAME_ENV, "  "), (REQUIRE_SIGNED_ENV, "")]).expect("Should load");
        assert_eq!(cfg.model_name, DEFAULT_MODEL_NAME);
        assert!(!cfg.require_signed);
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let err = config(&[(UNKNOWN_CATEGORY_ENV, "drop")]).expect_err("Should fail");
        assert!(matches!(
            err,
            ConfigError::InvalidValue { var, .. } if var == UNKNOWN_CATEGORY_ENV
        ));
    }

    #[test]
    fn test_bool_parsing() {
        for truthy in ["1", "true", "TRUE", "True", "yes", "On"] {
            assert_eq!(parse_bool(truthy), Ok(true), "{truthy}");
        }
        for falsy in ["0", "false", "No", "OFF"] {
            assert_eq!(parse_bool(falsy), Ok(false), "{falsy}");
        }
        assert!(parse_bool("enabled").is_err());
    }

    #[test]
    fn test_unrecognised_signing_switch_rejected() {
        let err = config(&[(REQUIRE_SIGNED_ENV, "sure")]).expect_err("Should fail");
        assert!(matches!(
            err,
            ConfigError::InvalidValue { var, ref value, .. }
                if var == REQUIRE_SIGNED_ENV && value == "sure"
        ));
    }

    #[test]
    fn test_log_mode() {
        assert!(LogMode::Auto.use_file(true));
        assert!(!LogMode::Auto.use_file(false));
        assert!(LogMode::File.use_file(false));
        assert_eq!(LogMode::parse("bogus"), LogMode::Auto);
    }

    #[test]
    fn test_invalid_public_key() {
        let cfg = config(&[(PUBKEY_ENV, "not-a-key")]).expect("Should load");
        assert!(matches!(
            cfg.integrity_policy(),
            Err(ArtifactError::Integrity(_))
        ));
    }
}
