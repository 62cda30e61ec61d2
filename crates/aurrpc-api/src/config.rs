//! Server configuration loaded from a JSON settings file.

use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The settings file is not valid JSON.
    #[error("cannot parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    /// A required option is zero or empty.
    #[error("config: {0} needs to be specified / greater than 0")]
    MissingOption(&'static str),
    /// TLS was enabled without a certificate/key pair.
    #[error("config: EnableSSL requires both CertFile and KeyFile")]
    IncompleteTls,
}

/// Runtime settings. JSON keys keep the PascalCase convention of the
/// snapshot source's own configuration files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// TCP port to listen on.
    #[serde(rename = "Port")]
    pub port: u16,
    /// Snapshot source: an `http(s)` URL or a filesystem path.
    #[serde(rename = "AurFileLocation")]
    pub aur_file_location: String,
    /// Per-query result cap.
    #[serde(rename = "MaxResults")]
    pub max_results: usize,
    /// Seconds between snapshot refresh attempts.
    #[serde(rename = "RefreshInterval")]
    pub refresh_interval: u64,
    /// Requests allowed per client within one window; 0 disables limiting.
    #[serde(rename = "RateLimit")]
    pub rate_limit: u32,
    /// Seconds between rate-limit eviction passes.
    #[serde(rename = "RateLimitCleanupInterval")]
    pub rate_limit_cleanup_interval: u64,
    /// Length of a client's rate window in seconds.
    #[serde(rename = "RateLimitTimeWindow")]
    pub rate_limit_time_window: u64,
    /// Peer addresses whose forwarded-IP headers are honored.
    #[serde(rename = "TrustedReverseProxies")]
    pub trusted_reverse_proxies: Vec<String>,
    /// Serve TLS instead of plain HTTP.
    #[serde(rename = "EnableSSL")]
    pub enable_ssl: bool,
    /// PEM certificate chain, required when TLS is enabled.
    #[serde(rename = "CertFile")]
    pub cert_file: String,
    /// PEM private key, required when TLS is enabled.
    #[serde(rename = "KeyFile")]
    pub key_file: String,
    /// Cache search results between refreshes.
    #[serde(rename = "EnableSearchCache")]
    pub enable_search_cache: bool,
    /// Seconds between cache eviction passes.
    #[serde(rename = "CacheCleanupInterval")]
    pub cache_cleanup_interval: u64,
    /// Cache entry time-to-live in seconds.
    #[serde(rename = "CacheExpirationTime")]
    pub cache_expiration_time: u64,
    /// Log destination; empty logs to stdout.
    #[serde(rename = "LogFile")]
    pub log_file: String,
    /// Expose the admin surface under `/admin`.
    #[serde(rename = "EnableAdminApi")]
    pub enable_admin_api: bool,
    /// Key expected in the `APIKey` header of admin calls.
    #[serde(rename = "AdminAPIKey")]
    pub admin_api_key: String,
}

impl Default for Settings {
    /// The public AUR deployment defaults.
    fn default() -> Self {
        Self {
            port: 10666,
            aur_file_location: "https://aur.archlinux.org/packages-meta-ext-v1.json.gz"
                .to_owned(),
            max_results: 5000,
            refresh_interval: 5 * 60,
            rate_limit: 4000,
            rate_limit_cleanup_interval: 10 * 60,
            rate_limit_time_window: 24 * 60 * 60,
            trusted_reverse_proxies: vec!["127.0.0.1".to_owned(), "::1".to_owned()],
            enable_ssl: false,
            cert_file: String::new(),
            key_file: String::new(),
            enable_search_cache: true,
            cache_cleanup_interval: 60,
            cache_expiration_time: 180,
            log_file: String::new(),
            enable_admin_api: false,
            admin_api_key: String::new(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file. Validation is separate; call
    /// [`Settings::validate`] once logging is up.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Check that the loaded settings can actually run a server.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingOption`] for a zero/empty required
    /// option, or [`ConfigError::IncompleteTls`] for a TLS half-config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::MissingOption("Port"));
        }
        if self.aur_file_location.is_empty() {
            return Err(ConfigError::MissingOption("AurFileLocation"));
        }
        if self.max_results == 0 {
            return Err(ConfigError::MissingOption("MaxResults"));
        }
        if self.refresh_interval == 0 {
            return Err(ConfigError::MissingOption("RefreshInterval"));
        }
        if self.rate_limit_cleanup_interval == 0 {
            return Err(ConfigError::MissingOption("RateLimitCleanupInterval"));
        }
        if self.rate_limit_time_window == 0 {
            return Err(ConfigError::MissingOption("RateLimitTimeWindow"));
        }
        if self.cache_cleanup_interval == 0 {
            return Err(ConfigError::MissingOption("CacheCleanupInterval"));
        }
        if self.cache_expiration_time == 0 {
            return Err(ConfigError::MissingOption("CacheExpirationTime"));
        }
        if self.enable_ssl && (self.cert_file.is_empty() || self.key_file.is_empty()) {
            return Err(ConfigError::IncompleteTls);
        }
        if self.enable_admin_api && self.admin_api_key.is_empty() {
            return Err(ConfigError::MissingOption("AdminAPIKey"));
        }
        if self.rate_limit == 0 {
            warn!("rate limiting is disabled - RateLimit = 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Settings::default().validate().unwrap();
    }

    #[test]
    fn zero_interval_is_rejected() {
        let settings = Settings {
            refresh_interval: 0,
            ..Settings::default()
        };
        let err = settings.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "config: RefreshInterval needs to be specified / greater than 0"
        );
    }

    #[test]
    fn zero_rate_limit_is_allowed() {
        let settings = Settings {
            rate_limit: 0,
            ..Settings::default()
        };
        settings.validate().unwrap();
    }

    #[test]
    fn tls_requires_cert_and_key() {
        let settings = Settings {
            enable_ssl: true,
            cert_file: "cert.pem".to_owned(),
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::IncompleteTls)
        ));
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let parsed: Settings =
            serde_json::from_str(r#"{"Port": 8080, "MaxResults": 250}"#).unwrap();
        assert_eq!(parsed.port, 8080);
        assert_eq!(parsed.max_results, 250);
        assert_eq!(parsed.refresh_interval, 300);
        assert!(parsed.enable_search_cache);
    }
}
