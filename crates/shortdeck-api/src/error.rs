use thiserror::Error;

use crate::types::ProblemDetails;

/// Top-level error type for the `shortdeck-api` crate.
///
/// Covers every failure mode of the REST surface: transport, URL handling,
/// structured problem-details responses and payload decoding.
/// `shortdeck-core` maps these into collection-level error state.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A domain could not be used as the authority of a server URL.
    #[error("Invalid authority '{authority}' for {url}")]
    InvalidAuthority { url: String, authority: String },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Server responses ────────────────────────────────────────────
    /// Non-2xx response carrying an RFC 7807 problem-details body.
    #[error("API error (HTTP {}): {}", .0.status.unwrap_or_default(), .0.summary())]
    Api(Box<ProblemDetails>),

    /// Non-2xx response without a problem-details body.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Http { status, .. } => *status >= 500,
            Self::Api(problem) => problem.status.is_some_and(|s| s >= 500),
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api(problem) => problem.status == Some(404),
            Self::Http { status: 404, .. } => true,
            _ => false,
        }
    }

    /// The structured problem-details payload, if the server sent one.
    pub fn problem_details(&self) -> Option<&ProblemDetails> {
        match self {
            Self::Api(problem) => Some(problem),
            _ => None,
        }
    }
}
