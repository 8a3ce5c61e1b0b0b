//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use flock_config::ConfigError;
use flock_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not load data from the membership service: {message}")]
    #[diagnostic(
        code(flock::fetch_failed),
        help(
            "Check that the service is running and reachable.\n\
             Use --insecure (-k) for self-signed certificates, or raise --timeout."
        )
    )]
    FetchFailed { message: String },

    // ── Authorization ────────────────────────────────────────────────

    #[error("Authentication required")]
    #[diagnostic(
        code(flock::unauthenticated),
        help(
            "Provide a token with --token, set FLOCK_API_TOKEN, or store one in the\n\
             system keyring under service 'flock', account '<profile>/token'."
        )
    )]
    Unauthenticated,

    #[error("Permission denied: requires '{capability}'")]
    #[diagnostic(
        code(flock::permission_denied),
        help("Ask an administrator to grant the '{capability}' capability to your account.")
    )]
    PermissionDenied { capability: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("Not found: {resource}")]
    #[diagnostic(
        code(flock::not_found),
        help("Check the service URL; list endpoints live directly under it.")
    )]
    NotFound { resource: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(flock::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(flock::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: flock config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No service configured")]
    #[diagnostic(
        code(flock::no_config),
        help(
            "Create a config with: flock config init\n\
             Expected at: {path}\n\
             Or pass --url for a one-off query."
        )
    )]
    NoConfig { path: String },

    #[error("Config file already exists at {path}")]
    #[diagnostic(code(flock::config_exists), help("Use --force to overwrite it."))]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(flock::config))]
    Config(ConfigError),

    // ── Internal ─────────────────────────────────────────────────────

    #[error("Unexpected error: {0}")]
    #[diagnostic(code(flock::internal))]
    Internal(String),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FetchFailed { .. } => exit_code::CONNECTION,
            Self::Unauthenticated => exit_code::AUTH,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::ConfigExists { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::PermissionDenied { capability } => CliError::PermissionDenied { capability },
            CoreError::Unauthenticated => CliError::Unauthenticated,
            CoreError::NotFound { resource } => CliError::NotFound { resource },
            CoreError::Fetch { message, .. } => CliError::FetchFailed { message },
            CoreError::Config { message } => CliError::Validation {
                field: "connection".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(other),
        }
    }
}
