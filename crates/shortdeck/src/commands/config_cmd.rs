//! Config subcommand handlers.

use dialoguer::{Input, Password, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, ServerProfile};
use crate::error::CliError;
use crate::output;

const KEYRING_SERVICE: &str = "shortdeck";

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_server {
        let _ = writeln!(out, "default_server = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out);
    let _ = writeln!(out, "[real_time_updates]");
    let _ = writeln!(out, "enabled = {}", cfg.real_time_updates.enabled);
    let _ = writeln!(out, "interval = {}", cfg.real_time_updates.interval);

    for (name, p) in &cfg.servers {
        let _ = writeln!(out);
        let _ = writeln!(out, "[servers.{name}]");
        let _ = writeln!(out, "url = \"{}\"", p.url);
        if p.api_key.is_some() {
            let _ = writeln!(out, "api_key = \"****\"");
        }
        if let Some(ref env) = p.api_key_env {
            let _ = writeln!(out, "api_key_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if p.auto_connect {
            let _ = writeln!(out, "auto_connect = true");
        }
    }

    out.trim_end().to_owned()
}

/// Structured form of the config with API keys masked.
fn redacted_value(cfg: &Config) -> Result<serde_json::Value, CliError> {
    let mut value = serde_json::to_value(cfg)?;
    if let Some(servers) = value
        .get_mut("servers")
        .and_then(serde_json::Value::as_object_mut)
    {
        for server in servers.values_mut() {
            if let Some(key) = server.get_mut("api_key").filter(|k| !k.is_null()) {
                *key = "****".into();
            }
        }
    }
    Ok(value)
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Prompt(e.to_string())
}

fn store_in_keyring(server: &str, secret: &str) -> Result<(), CliError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{server}/api-key")).map_err(|e| {
        CliError::Validation {
            field: "keyring".into(),
            reason: format!("failed to access keyring: {e}"),
        }
    })?;
    entry.set_password(secret).map_err(|e| CliError::Validation {
        field: "keyring".into(),
        reason: format!("failed to store API key in keyring: {e}"),
    })
}

/// Offer to store the API key in the system keyring or return it for
/// plaintext config.
///
/// Returns `Some(key)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_key_storage(server: &str, key: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the API key?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        store_in_keyring(server, key)?;
        eprintln!("   ✓ API key stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(key.to_owned()))
    }
}

fn prompt_api_key() -> Result<String, CliError> {
    let key = Password::new()
        .with_prompt("API key")
        .interact()
        .map_err(prompt_err)?;
    if key.is_empty() {
        return Err(CliError::Validation {
            field: "api_key".into(),
            reason: "API key cannot be empty".into(),
        });
    }
    Ok(key)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init { name, default } => {
            let config_path = config::config_path();
            eprintln!("shortdeck configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let url = match global.url.clone() {
                Some(url) => url,
                None => Input::new()
                    .with_prompt("Shlink server URL")
                    .default("https://s.test".into())
                    .interact_text()
                    .map_err(prompt_err)?,
            };
            url.parse::<url::Url>().map_err(|_| CliError::Validation {
                field: "url".into(),
                reason: format!("invalid URL: {url}"),
            })?;

            let key = match global.api_key.clone() {
                Some(key) => key,
                None => prompt_api_key()?,
            };
            let api_key = if global.yes {
                // Non-interactive: keep the key in the config file.
                Some(key)
            } else {
                prompt_key_storage(&name, &key)?
            };

            let mut cfg = config::load_config_or_default();
            cfg.servers.insert(
                name.clone(),
                ServerProfile {
                    url,
                    api_key,
                    insecure: global.insecure.then_some(true),
                    ..ServerProfile::default()
                },
            );
            if default || cfg.default_server.is_none() {
                cfg.default_server = Some(name.clone());
            }
            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Server profile: {name}");
            eprintln!("\n  Test it: shortdeck domains list --validate");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let value = redacted_value(&cfg)?;
            let out = output::render_single(
                &global.output(),
                &value,
                |_| format_config_redacted(&cfg),
                |_| config::config_path().display().to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Servers ─────────────────────────────────────────────────
        ConfigCommand::Servers => {
            let cfg = config::load_config_or_default();
            let active = config::active_server_name(global, &cfg);
            if cfg.servers.is_empty() {
                eprintln!("No servers configured. Run: shortdeck config init");
            } else {
                for (name, profile) in &cfg.servers {
                    let marker = if Some(name) == active.as_ref() { " *" } else { "" };
                    println!("{name}{marker}\t{}", profile.url);
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.servers.contains_key(&name) {
                return Err(CliError::ServerNotFound {
                    available: config::server_names(&cfg),
                    name,
                });
            }

            cfg.default_server = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default server set to '{name}'");
            Ok(())
        }

        // ── SetKey ──────────────────────────────────────────────────
        ConfigCommand::SetKey { name } => {
            let cfg = config::load_config_or_default();
            let name = name
                .or_else(|| config::active_server_name(global, &cfg))
                .ok_or_else(|| CliError::NoConfig {
                    path: config::config_path().display().to_string(),
                })?;
            if !cfg.servers.contains_key(&name) {
                return Err(CliError::ServerNotFound {
                    available: config::server_names(&cfg),
                    name,
                });
            }

            let key = match global.api_key.clone() {
                Some(key) => key,
                None => prompt_api_key()?,
            };
            store_in_keyring(&name, &key)?;
            eprintln!("✓ API key for '{name}' stored in system keyring");
            Ok(())
        }
    }
}
