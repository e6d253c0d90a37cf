//! Configuration for the shortdeck CLI.
//!
//! TOML server profiles, credential resolution (env + keyring + plaintext),
//! real-time update settings, and translation to
//! `shortdeck_core::ControllerConfig`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shortdeck_core::{ControllerConfig, RealTimeUpdates, ServerConfig, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("unknown server '{name}'")]
    UnknownServer { name: String },

    #[error("no API key configured for server '{server}'")]
    NoCredentials { server: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Server used when none is named on the command line.
    pub default_server: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub real_time_updates: RealTimeUpdatesSettings,

    /// Named server profiles.
    #[serde(default)]
    pub servers: BTreeMap<String, ServerProfile>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RealTimeUpdatesSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Minutes between flushes; 0 applies visits as they arrive.
    #[serde(default)]
    pub interval: u32,
}

impl Default for RealTimeUpdatesSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval: 0,
        }
    }
}

fn default_enabled() -> bool {
    true
}

impl From<&RealTimeUpdatesSettings> for RealTimeUpdates {
    fn from(settings: &RealTimeUpdatesSettings) -> Self {
        Self {
            enabled: settings.enabled,
            interval_minutes: settings.interval,
        }
    }
}

/// A named Shlink server.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerProfile {
    /// Server base URL (e.g., "https://s.test").
    pub url: String,

    /// API key (plaintext; prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Accept invalid certificates.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Select this server on start-up when no default is configured.
    #[serde(default)]
    pub auto_connect: bool,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "shortdeck", "shortdeck").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("shortdeck");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` merged with `SHORTDECK_`-prefixed environment variables.
///
/// Nested keys use a double underscore, e.g.
/// `SHORTDECK_REAL_TIME_UPDATES__INTERVAL=5`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SHORTDECK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve an API key from the credential chain.
pub fn resolve_api_key(
    profile: &ServerProfile,
    server_name: &str,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's api_key_env → env var lookup
    if let Some(ref env_name) = profile.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new("shortdeck", &format!("{server_name}/api-key")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        server: server_name.into(),
    })
}

/// Values given on the command line that take priority over a profile.
#[derive(Debug, Clone, Default)]
pub struct ServerOverrides {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub insecure: bool,
    pub timeout: Option<u64>,
}

/// Build a `ServerConfig` from a profile and any overrides.
///
/// The timeout resolves override, then profile, then `default_timeout`.
pub fn profile_to_server_config(
    profile: &ServerProfile,
    server_name: &str,
    overrides: &ServerOverrides,
    default_timeout: u64,
) -> Result<ServerConfig, ConfigError> {
    let url = parse_url(overrides.url.as_deref().unwrap_or(&profile.url))?;

    let api_key = match overrides.api_key {
        Some(ref key) => SecretString::from(key.clone()),
        None => resolve_api_key(profile, server_name)?,
    };

    let tls = if overrides.insecure || profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let timeout = overrides
        .timeout
        .or(profile.timeout)
        .unwrap_or(default_timeout);

    Ok(ServerConfig {
        name: server_name.into(),
        url,
        api_key,
        tls,
        timeout: Duration::from_secs(timeout),
    })
}

/// Build a `ServerConfig` from overrides alone, when no profile applies.
fn ad_hoc_server_config(
    raw_url: &str,
    overrides: &ServerOverrides,
    default_timeout: u64,
) -> Result<ServerConfig, ConfigError> {
    let url = parse_url(raw_url)?;
    let api_key = overrides
        .api_key
        .clone()
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::NoCredentials {
            server: raw_url.into(),
        })?;

    Ok(ServerConfig {
        name: raw_url.into(),
        url,
        api_key,
        tls: if overrides.insecure {
            TlsVerification::DangerAcceptInvalid
        } else {
            TlsVerification::SystemDefaults
        },
        timeout: Duration::from_secs(overrides.timeout.unwrap_or(default_timeout)),
    })
}

fn parse_url(raw: &str) -> Result<url::Url, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {raw}"),
    })
}

impl Config {
    /// Name of the server to use: `requested`, else `default_server`, else
    /// the first profile marked `auto_connect`.
    pub fn resolve_server_name<'a>(&'a self, requested: Option<&'a str>) -> Option<&'a str> {
        requested.or(self.default_server.as_deref()).or_else(|| {
            self.servers
                .iter()
                .find(|(_, profile)| profile.auto_connect)
                .map(|(name, _)| name.as_str())
        })
    }

    /// Build a `ControllerConfig`, selecting the resolved server if any.
    ///
    /// A named server must exist unless `overrides.url` stands in for it.
    /// Without any server name, `overrides.url` alone selects an ad-hoc server.
    pub fn to_controller_config(
        &self,
        requested: Option<&str>,
        overrides: &ServerOverrides,
    ) -> Result<ControllerConfig, ConfigError> {
        let default_timeout = self.defaults.timeout;
        let profile = self
            .resolve_server_name(requested)
            .map(|name| (name, self.servers.get(name)));

        let server = match (profile, overrides.url.as_deref()) {
            (Some((name, Some(profile))), _) => Some(profile_to_server_config(
                profile,
                name,
                overrides,
                default_timeout,
            )?),
            (Some((name, None)), None) => {
                return Err(ConfigError::UnknownServer { name: name.into() });
            }
            (_, Some(raw_url)) => Some(ad_hoc_server_config(raw_url, overrides, default_timeout)?),
            (None, None) => None,
        };

        Ok(ControllerConfig {
            server,
            real_time_updates: RealTimeUpdates::from(&self.real_time_updates),
        })
    }
}
