//! CLI configuration: thin wrapper around `shortdeck_config` shared types.
//!
//! Maps `GlobalOpts` flag overrides (--url, --api-key, --insecure,
//! --timeout) onto the shared resolution, and fills unset output flags
//! from the `[defaults]` table.

use clap::ValueEnum;

use shortdeck_config::{ConfigError, Defaults, ServerOverrides};
use shortdeck_core::ControllerConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use shortdeck_config::{Config, ServerProfile, config_path, load_config_or_default, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active server name from CLI flags and config.
pub fn active_server_name(global: &GlobalOpts, config: &Config) -> Option<String> {
    config
        .resolve_server_name(global.server.as_deref())
        .map(str::to_owned)
}

/// Fill `--output` and `--color` from the `[defaults]` table when neither
/// the flag nor its env var was given.
pub fn apply_defaults(global: &mut GlobalOpts, defaults: &Defaults) -> Result<(), CliError> {
    if global.output.is_none() {
        let format = OutputFormat::from_str(&defaults.output, true).map_err(|reason| {
            CliError::Validation {
                field: "defaults.output".into(),
                reason,
            }
        })?;
        global.output = Some(format);
    }
    if global.color.is_none() {
        let mode = ColorMode::from_str(&defaults.color, true).map_err(|reason| {
            CliError::Validation {
                field: "defaults.color".into(),
                reason,
            }
        })?;
        global.color = Some(mode);
    }
    Ok(())
}

pub fn overrides(global: &GlobalOpts) -> ServerOverrides {
    ServerOverrides {
        url: global.url.clone(),
        api_key: global.api_key.clone(),
        insecure: global.insecure,
        timeout: global.timeout,
    }
}

/// Build a `ControllerConfig` from the config file, the active profile and
/// CLI overrides. Flags win over the profile, which wins over `[defaults]`.
pub fn build_controller_config(
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<ControllerConfig, CliError> {
    let controller_config = cfg
        .to_controller_config(global.server.as_deref(), &overrides(global))
        .map_err(|err| match err {
            ConfigError::UnknownServer { name } => CliError::ServerNotFound {
                name,
                available: server_names(cfg),
            },
            other => CliError::from(other),
        })?;

    if controller_config.server.is_none() {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    }
    Ok(controller_config)
}

pub fn server_names(cfg: &Config) -> String {
    if cfg.servers.is_empty() {
        "(none)".into()
    } else {
        cfg.servers.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
