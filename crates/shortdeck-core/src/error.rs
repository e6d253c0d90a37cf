// ── Core error types ──
//
// User-facing errors from shortdeck-core. Transport-layer errors are
// translated by `From<shortdeck_api::Error>`; the structured payload the
// collection states keep is available through `problem_details()`.

use thiserror::Error;

use crate::model::ProblemDetails;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    #[error("No server selected")]
    NoServerSelected,

    #[error("Controller stopped")]
    ControllerStopped,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("{}", .problem.summary())]
    Problem { problem: Box<ProblemDetails> },

    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Structured error payload for collection state, present only when the
    /// server answered with problem details.
    pub fn problem_details(&self) -> Option<ProblemDetails> {
        match self {
            Self::Problem { problem } => Some((**problem).clone()),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<shortdeck_api::Error> for CoreError {
    fn from(err: shortdeck_api::Error) -> Self {
        match err {
            shortdeck_api::Error::Api(problem) => CoreError::Problem { problem },
            shortdeck_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            shortdeck_api::Error::Http { status, body } => CoreError::Api {
                message: body,
                status: Some(status),
            },
            shortdeck_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            shortdeck_api::Error::InvalidAuthority { url, authority } => CoreError::Config {
                message: format!("Invalid authority '{authority}' for {url}"),
            },
            shortdeck_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            shortdeck_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_responses_keep_their_payload() {
        let problem = ProblemDetails {
            problem_type: "https://shlink.io/api/error/invalid-data".into(),
            title: "Invalid data".into(),
            detail: "Provided data is not valid".into(),
            status: Some(400),
            extra: serde_json::Map::new(),
        };
        let err = CoreError::from(shortdeck_api::Error::Api(Box::new(problem.clone())));

        assert_eq!(err.problem_details(), Some(problem));
        assert_eq!(err.to_string(), "Provided data is not valid");
    }

    #[test]
    fn plain_http_errors_carry_no_payload() {
        let err = CoreError::from(shortdeck_api::Error::Http {
            status: 502,
            body: "Bad Gateway".into(),
        });

        assert!(err.problem_details().is_none());
        assert!(matches!(err, CoreError::Api { status: Some(502), .. }));
    }
}
