use thiserror::Error;

/// Top-level error type for the `avx-api` crate.
///
/// Covers every failure mode of a controller call: client construction,
/// login, transport, protocol, and the controller's own `return=false`
/// answers. The CLI maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Construction ────────────────────────────────────────────────
    /// Invalid or unresolvable controller address, or bad builder input.
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected by the controller (wrong credentials, locked, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// A session token was required but no login has succeeded yet.
    #[error("Not authenticated -- login has not completed")]
    NotAuthenticated,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, TLS, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration or certificate loading error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Request object could not be form- or query-encoded.
    #[error("Encoding error: {0}")]
    Encoding(String),

    // ── Protocol ────────────────────────────────────────────────────
    /// The controller answered with something other than HTTP 200.
    #[error("Unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16 },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Controller ──────────────────────────────────────────────────
    /// `return=false` from the controller. Displays the reason verbatim.
    #[error("{reason}")]
    Api { reason: String },

    /// A lookup-by-key scan found no matching entry.
    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying at the
    /// send level.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    /// Returns `true` if a lookup found nothing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if the controller reported the session token as
    /// invalid or expired.
    ///
    /// The orchestrator handles the first occurrence internally, so callers
    /// only see this once the re-authentication budget is spent.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::Api { reason } if reason == crate::SESSION_EXPIRED_REASON)
    }

    /// The controller's failure reason, if this error carries one.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Api { reason } => Some(reason),
            _ => None,
        }
    }
}

/// First 200 bytes of a response body, cut on a char boundary.
pub(crate) fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_displays_reason_verbatim() {
        let err = Error::Api {
            reason: "duplicate name".into(),
        };
        assert_eq!(err.to_string(), "duplicate name");
        assert_eq!(err.reason(), Some("duplicate name"));
    }

    #[test]
    fn not_found_is_distinct_from_api_error() {
        let err = Error::NotFound {
            entity: "account user",
            key: "alice".into(),
        };
        assert!(err.is_not_found());
        assert!(err.reason().is_none());

        let err = Error::Api {
            reason: "not found".into(),
        };
        assert!(!err.is_not_found());
    }

    #[test]
    fn session_expired_matches_sentinel_only() {
        let expired = Error::Api {
            reason: "CID is invalid or expired.".into(),
        };
        assert!(expired.is_session_expired());

        let other = Error::Api {
            reason: "CID is invalid or expired".into(),
        };
        assert!(!other.is_session_expired());
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "é".repeat(150);
        assert!(preview(&body).len() <= 200);
        assert!(preview("short").len() == 5);
    }
}
