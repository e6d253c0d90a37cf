// ── Runtime configuration ──
//
// These types describe which server to talk to and how live updates are
// applied. They carry credential data but never touch disk: the CLI (via
// `shortdeck-config`) constructs a `ControllerConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use shortdeck_api::{TlsMode, TransportConfig};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// A server the dashboard can be pointed at.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Profile name, for display only.
    pub name: String,
    /// Server root (e.g. `https://s.test`).
    pub url: Url,
    pub api_key: SecretString,
    pub tls: TlsVerification,
    pub timeout: Duration,
}

impl ServerConfig {
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }
}

/// How visits from the live feed reach the short URL collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealTimeUpdates {
    /// Disabled means incoming visits are dropped.
    pub enabled: bool,
    /// 0 forwards visits as they arrive; N buffers them for N minutes.
    pub interval_minutes: u32,
}

impl Default for RealTimeUpdates {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_minutes: 0,
        }
    }
}

impl RealTimeUpdates {
    /// Flush period, or `None` for immediate delivery.
    pub fn flush_interval(self) -> Option<Duration> {
        (self.interval_minutes > 0)
            .then(|| Duration::from_secs(u64::from(self.interval_minutes) * 60))
    }
}

/// Configuration for a `Controller`.
#[derive(Debug, Clone, Default)]
pub struct ControllerConfig {
    /// Server selected at start-up, if any.
    pub server: Option<ServerConfig>,
    pub real_time_updates: RealTimeUpdates,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_interval_means_immediate() {
        assert_eq!(RealTimeUpdates::default().flush_interval(), None);
    }

    #[test]
    fn interval_is_in_minutes() {
        let updates = RealTimeUpdates {
            enabled: true,
            interval_minutes: 3,
        };
        assert_eq!(updates.flush_interval(), Some(Duration::from_secs(180)));
    }
}
