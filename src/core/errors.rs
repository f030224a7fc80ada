/// All domain errors for verse.
///
/// Each variant provides enough context to diagnose the issue
/// without needing a debugger.
#[derive(Debug, thiserror::Error)]
pub enum VerseError {
    #[error(
        "Session expired ({method} {path} returned 401)\n\n  \
         {}\n  \
         Log in again: verse login --email <you@example.com>",
        token_note(.erase_error)
    )]
    SessionExpired {
        method: String,
        path: String,
        /// Set when the rejected token could not be removed from storage.
        erase_error: Option<String>,
    },

    #[error("Request {method} {path} failed with status {status}: {body}")]
    HttpStatus {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    #[error(
        "Could not reach the backend: {reason}\n\n  \
         Check that the service is running and the base URL is correct.\n  \
         Run 'verse status' to see the configured address."
    )]
    Transport { reason: String },

    #[error("Backend rejected the request (code {code}): {message}")]
    Backend { code: i64, message: String },

    #[error(
        "Not logged in\n\n  \
         This command needs an authenticated session.\n  \
         Run 'verse login --email <you@example.com>' first."
    )]
    NotLoggedIn,

    #[error("Unexpected response from the backend: {detail}")]
    InvalidResponse { detail: String },

    #[error("Storage error for key '{key}': {detail}")]
    Storage { key: String, detail: String },

    #[error(
        "Storage quota exceeded for key '{key}': {size} bytes (limit {limit})\n\n  \
         Raise [storage] max_value_bytes in config.toml or run 'verse logs clear'."
    )]
    StorageQuotaExceeded { key: String, size: usize, limit: usize },

    #[error("Invalid storage key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("Not a valid log export: {detail}")]
    InvalidExport { detail: String },

    #[error("Invalid input: {detail}")]
    InvalidInput { detail: String },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl VerseError {
    /// Whether the error is a rejected session rather than a transport problem.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, VerseError::SessionExpired { .. })
    }
}

fn token_note(erase_error: &Option<String>) -> String {
    match erase_error {
        None => "Your stored token was rejected and has been removed.".to_string(),
        Some(e) => format!("Your stored token was rejected but could not be removed: {e}"),
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VerseError>;
