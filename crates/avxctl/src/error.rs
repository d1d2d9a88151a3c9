//! CLI error types with miette diagnostics.
//!
//! Maps `avx_api::Error` and `avx_config::ConfigError` into user-facing
//! errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use avx_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the controller")]
    #[diagnostic(
        code(avxctl::connection_failed),
        help(
            "Check that the controller is reachable on port 443.\n\
             Try: avxctl accounts list --insecure -v"
        )
    )]
    ConnectionFailed {
        #[source]
        source: avx_api::Error,
    },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(avxctl::tls_error),
        help(
            "Controllers ship a self-signed certificate by default.\n\
             Use --insecure (-k) to accept it, or configure ca_cert in your profile."
        )
    )]
    TlsError { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(avxctl::auth_failed),
        help(
            "Verify the username and password for this controller.\n\
             Stored passwords can be replaced with: avxctl config init"
        )
    )]
    AuthFailed { message: String },

    #[error("Session expired and could not be renewed")]
    #[diagnostic(
        code(avxctl::session_expired),
        help("The controller rejected the session twice in a row. Retry the command.")
    )]
    SessionExpired,

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(avxctl::no_credentials),
        help(
            "Configure credentials with: avxctl config init\n\
             Or set AVX_USERNAME and AVX_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(avxctl::not_found),
        help("Run: avxctl {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Controller rejected the request: {message}")]
    #[diagnostic(code(avxctl::api_error))]
    ApiError { message: String },

    #[error("Unexpected response from controller: {message}")]
    #[diagnostic(
        code(avxctl::protocol),
        help("Re-run with -vv to log the request and response.")
    )]
    Protocol { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(avxctl::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(avxctl::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: avxctl config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No controller configured")]
    #[diagnostic(
        code(avxctl::no_config),
        help(
            "Create a profile with: avxctl config init\n\
             Or pass --controller and --username.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(avxctl::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(avxctl::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out")]
    #[diagnostic(
        code(avxctl::timeout),
        help("Increase timeout with --timeout or check controller responsiveness.")
    )]
    Timeout,

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::SessionExpired | Self::NoCredentials { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError ───────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

// ── avx_api::Error → CliError ────────────────────────────────────────

impl From<avx_api::Error> for CliError {
    fn from(err: avx_api::Error) -> Self {
        use avx_api::Error as Api;

        if err.is_session_expired() {
            return Self::SessionExpired;
        }

        match err {
            Api::Transport(ref e) if e.is_timeout() => Self::Timeout,
            Api::Transport(_) => Self::ConnectionFailed { source: err },

            Api::Authentication { message } => Self::AuthFailed { message },
            Api::NotAuthenticated => Self::AuthFailed {
                message: "no session has been established".into(),
            },

            Api::Config { message } => Self::Validation {
                field: "controller".into(),
                reason: message,
            },
            Api::InvalidUrl(e) => Self::Validation {
                field: "controller".into(),
                reason: e.to_string(),
            },
            Api::Tls(message) => Self::TlsError { message },
            Api::Encoding(message) => Self::Validation {
                field: "request".into(),
                reason: message,
            },

            Api::UnexpectedStatus { status } => Self::Protocol {
                message: format!("HTTP {status}"),
            },
            Api::Deserialization { message, .. } => Self::Protocol { message },

            Api::Api { reason } => Self::ApiError { message: reason },

            Api::NotFound { entity, key } => Self::NotFound {
                resource_type: entity.into(),
                identifier: key,
                list_command: list_command_for(entity).into(),
            },
        }
    }
}

fn list_command_for(entity: &str) -> &'static str {
    match entity {
        "account" => "accounts list",
        "account user" => "users list",
        _ => "--help",
    }
}
