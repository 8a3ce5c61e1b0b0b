// ── Core error types ──
//
// List-level errors from flock-core. Consumers never see HTTP status codes
// or JSON parse failures directly; the `From<flock_api::Error>` impl
// translates transport errors into the three classes a list screen
// distinguishes.

use thiserror::Error;

/// Capability reported when the session itself is missing or expired.
pub const SESSION_CAPABILITY: &str = "session";

/// Unified error type for the core crate.
///
/// `Clone` so a failed fetch can be both returned to the caller and kept in
/// the published remote status.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Authorization ────────────────────────────────────────────────
    #[error("Permission denied (requires '{capability}')")]
    PermissionDenied { capability: String },

    #[error("Authentication required")]
    Unauthenticated,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Could not load data: {message}")]
    Fetch {
        message: String,
        /// Whether retrying the same request may succeed.
        transient: bool,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of remote failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Rendered as an "unauthorized" affordance, never a retry button.
    PermissionDenied,
    NotFound,
    NetworkOrServer,
}

impl CoreError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::PermissionDenied { .. } | Self::Unauthenticated => ErrorClass::PermissionDenied,
            Self::NotFound { .. } => ErrorClass::NotFound,
            Self::Fetch { .. } | Self::Config { .. } | Self::Internal(_) => {
                ErrorClass::NetworkOrServer
            }
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        self.class() == ErrorClass::PermissionDenied
    }

    /// The capability that was denied, if this is a permission failure.
    pub fn required_capability(&self) -> Option<&str> {
        match self {
            Self::PermissionDenied { capability } => Some(capability.as_str()),
            Self::Unauthenticated => Some(SESSION_CAPABILITY),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<flock_api::Error> for CoreError {
    fn from(err: flock_api::Error) -> Self {
        let transient = err.is_transient();
        match err {
            flock_api::Error::Unauthenticated => CoreError::Unauthenticated,
            flock_api::Error::PermissionDenied { capability } => {
                CoreError::PermissionDenied { capability }
            }
            flock_api::Error::NotFound { path } => CoreError::NotFound { resource: path },
            flock_api::Error::Transport(e) => CoreError::Fetch {
                message: e.to_string(),
                transient,
            },
            flock_api::Error::Server { status, message } => CoreError::Fetch {
                message: format!("server returned {status}: {message}"),
                transient,
            },
            flock_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            flock_api::Error::InvalidHeader(message) | flock_api::Error::Tls(message) => {
                CoreError::Config { message }
            }
            flock_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
