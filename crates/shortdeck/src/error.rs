//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use shortdeck_config::ConfigError;
use shortdeck_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to server at {url}: {reason}")]
    #[diagnostic(
        code(shortdeck::connection_failed),
        help(
            "Check that the Shlink server is running and accessible.\n\
             URL: {url}\n\
             Self-signed certificate? Try --insecure (-k)"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(shortdeck::timeout),
        help("Increase timeout with --timeout or check server responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(shortdeck::auth_failed),
        help(
            "Verify the API key of the selected server.\n\
             Run: shortdeck config set-key"
        )
    )]
    AuthFailed { message: String },

    #[error("No API key configured for server '{server}'")]
    #[diagnostic(
        code(shortdeck::no_credentials),
        help(
            "Store one with: shortdeck config set-key {server}\n\
             Or set the SHORTDECK_API_KEY environment variable."
        )
    )]
    NoCredentials { server: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(shortdeck::not_found),
        help("Run: shortdeck {list_command} to see what exists")
    )]
    NotFound {
        message: String,
        list_command: String,
    },

    #[error("{message}")]
    #[diagnostic(code(shortdeck::conflict))]
    Conflict { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(shortdeck::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(shortdeck::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Server '{name}' not found in configuration")]
    #[diagnostic(
        code(shortdeck::server_not_found),
        help(
            "Available servers: {available}\n\
             Create one with: shortdeck config init --name {name}"
        )
    )]
    ServerNotFound { name: String, available: String },

    #[error("No server configured")]
    #[diagnostic(
        code(shortdeck::no_config),
        help(
            "Create one with: shortdeck config init\n\
             Or pass --url and --api-key.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(shortdeck::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(shortdeck::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("Prompt failed: {0}")]
    #[diagnostic(code(shortdeck::prompt))]
    Prompt(String),

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    #[diagnostic(code(shortdeck::internal))]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not encode output: {0}")]
    #[diagnostic(code(shortdeck::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::ServerNotFound { .. }
            | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::Timeout => CliError::Timeout,

            CoreError::NoServerSelected => CliError::NoConfig {
                path: shortdeck_config::config_path().display().to_string(),
            },

            CoreError::ControllerStopped => {
                CliError::Internal("controller stopped before the command finished".into())
            }

            CoreError::Problem { problem } => {
                let message = problem.summary().to_owned();
                match problem.status {
                    Some(401 | 403) => CliError::AuthFailed { message },
                    Some(404) => CliError::NotFound {
                        message,
                        list_command: "short-urls list".into(),
                    },
                    Some(409) => CliError::Conflict { message },
                    Some(400 | 422) => CliError::Validation {
                        field: "request".into(),
                        reason: message,
                    },
                    _ => CliError::ApiError { message },
                }
            }

            CoreError::Api { message, status } => match status {
                Some(401 | 403) => CliError::AuthFailed { message },
                _ => CliError::ApiError { message },
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { server } => CliError::NoCredentials { server },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownServer { name } => CliError::ServerNotFound {
                name,
                available: available_servers(),
            },
            other => CliError::Config(other),
        }
    }
}

fn available_servers() -> String {
    crate::config::server_names(&crate::config::load_config_or_default())
}
