//! Process-wide settings of certificate and CRL handling
//!
//! Settings are read from an optional JSON file (path in `PKIX_CONFIG_PATH`)
//! and then overridden by individual environment variables.

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

const PKIX_CONFIG_PATH_ENV: &str = "PKIX_CONFIG_PATH";
const PKIX_REVOCATION_INDEX_ENV: &str = "PKIX_REVOCATION_INDEX";
const PKIX_LENIENT_SERIAL_ENV: &str = "PKIX_LENIENT_SERIAL";
const PKIX_VERIFICATION_CACHE_ENV: &str = "PKIX_VERIFICATION_CACHE";
const PKIX_LOG_LEVEL_ENV: &str = "PKIX_LOG_LEVEL";

#[derive(Debug, Error)]
pub enum ConfigError {
    /// couldn't read configuration file
    #[error("couldn't read configuration file {path}: {source}")]
    Io { path: String, source: std::io::Error },

    /// invalid JSON configuration
    #[error("invalid JSON configuration: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

const fn default_lenient_serial_numbers() -> bool {
    true
}

const fn default_verification_cache() -> bool {
    true
}

const fn default_log_level() -> LevelFilter {
    LevelFilter::Info
}

fn parse_level_filter(s: &str) -> LevelFilter {
    match s.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Off,
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// How CRL entries are matched to certificate issuers.
#[derive(PartialEq, Eq, Clone, Copy, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum RevocationIndexKind {
    /// Every entry belongs to the CRL issuer.
    #[default]
    Direct,
    /// Entries may name another issuer through the `CertificateIssuer` entry extension.
    Indirect,
}

impl From<&str> for RevocationIndexKind {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "direct" => Self::Direct,
            "indirect" => Self::Indirect,
            _ => Self::default(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct PkixConfig {
    #[serde(default)]
    pub revocation_index: RevocationIndexKind,
    /// Accept serial numbers that are negative, zero or longer than 20 octets.
    #[serde(default = "default_lenient_serial_numbers")]
    pub lenient_serial_numbers: bool,
    /// Remember the outcome of the last signature verification per certificate / CRL.
    #[serde(default = "default_verification_cache")]
    pub verification_cache: bool,
    #[serde(default = "default_log_level")]
    pub log_level: LevelFilter,
}

impl Default for PkixConfig {
    fn default() -> Self {
        Self {
            revocation_index: RevocationIndexKind::default(),
            lenient_serial_numbers: default_lenient_serial_numbers(),
            verification_cache: default_verification_cache(),
            log_level: default_log_level(),
        }
    }
}

impl PkixConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Configuration file (if any) with environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match env::var(PKIX_CONFIG_PATH_ENV) {
            Ok(path) => {
                let json = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io { path, source })?;
                Self::from_json(&json)?
            }
            Err(_) => Self::default(),
        };
        config.inject_env();
        Ok(config)
    }

    /// Settings used when none are given explicitly, loaded once.
    pub fn global() -> &'static PkixConfig {
        static CONFIG: OnceLock<PkixConfig> = OnceLock::new();
        CONFIG.get_or_init(|| {
            Self::from_env().unwrap_or_else(|e| {
                log::warn!("{e}, using default configuration");
                let mut config = Self::default();
                config.inject_env();
                config
            })
        })
    }

    /// Raises or lowers the `log` max level to `log_level`.
    pub fn apply_log_level(&self) {
        log::set_max_level(self.log_level);
    }

    fn inject_env(&mut self) {
        if let Ok(val) = env::var(PKIX_REVOCATION_INDEX_ENV) {
            self.revocation_index = RevocationIndexKind::from(val.as_str());
        }

        if let Ok(val) = env::var(PKIX_LENIENT_SERIAL_ENV) {
            if let Some(flag) = parse_flag(&val) {
                self.lenient_serial_numbers = flag;
            }
        }

        if let Ok(val) = env::var(PKIX_VERIFICATION_CACHE_ENV) {
            if let Some(flag) = parse_flag(&val) {
                self.verification_cache = flag;
            }
        }

        if let Ok(val) = env::var(PKIX_LOG_LEVEL_ENV) {
            self.log_level = parse_level_filter(&val);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn defaults_from_empty_json() {
        let config = PkixConfig::from_json("{}").unwrap();
        assert_eq!(config, PkixConfig::default());
        assert_eq!(config.revocation_index, RevocationIndexKind::Direct);
        assert!(config.lenient_serial_numbers);
        assert!(config.verification_cache);
        assert_eq!(config.log_level, LevelFilter::Info);
    }

    #[test]
    fn json_fields() {
        let config = PkixConfig::from_json(
            r#"{ "revocation_index": "indirect", "lenient_serial_numbers": false, "log_level": "DEBUG" }"#,
        )
        .unwrap();
        assert_eq!(config.revocation_index, RevocationIndexKind::Indirect);
        assert!(!config.lenient_serial_numbers);
        assert!(config.verification_cache);
        assert_eq!(config.log_level, LevelFilter::Debug);

        let reparsed = PkixConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(reparsed, config);
    }

    #[test]
    fn invalid_json() {
        let err = PkixConfig::from_json(r#"{ "revocation_index": "sideways" }"#).unwrap_err();
        assert!(err.to_string().starts_with("invalid JSON configuration"));
    }

    #[rstest]
    #[case("Indirect", RevocationIndexKind::Indirect)]
    #[case("direct", RevocationIndexKind::Direct)]
    #[case("garbage", RevocationIndexKind::Direct)]
    fn revocation_index_from_str(#[case] s: &str, #[case] expected: RevocationIndexKind) {
        assert_eq!(RevocationIndexKind::from(s), expected);
    }

    #[rstest]
    #[case("TRUE", Some(true))]
    #[case("0", Some(false))]
    #[case("maybe", None)]
    fn flags(#[case] s: &str, #[case] expected: Option<bool>) {
        assert_eq!(parse_flag(s), expected);
    }

    #[test]
    fn level_filter() {
        assert_eq!(parse_level_filter("Trace"), LevelFilter::Trace);
        assert_eq!(parse_level_filter("loud"), LevelFilter::Off);
    }
}
