use thiserror::Error;

/// Top-level error type for the `aircon-api` crate.
///
/// A non-2xx status from the device API is deliberately absent here: control
/// calls hand the status back to the caller, and a non-JSON status document
/// is folded into [`StatusResponse::NotJson`](crate::StatusResponse::NotJson).
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Building the underlying `reqwest::Client` failed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Request construction ────────────────────────────────────────
    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The base URL cannot carry a path (e.g. `mailto:` or `data:` URLs).
    #[error("base URL cannot be extended with a path: {url}")]
    CannotBeABase { url: String },

    /// A credential or setting is not a legal HTTP header value.
    #[error("invalid value for header {name}: {message}")]
    InvalidHeader { name: &'static str, message: String },

    /// Unrecognised job mode, wind strength, or similar closed value.
    #[error("invalid {field} '{value}' (expected one of: {expected})")]
    InvalidArgument {
        field: &'static str,
        value: String,
        expected: String,
    },
}

impl Error {
    /// Returns `true` if this is a transient network error.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Returns `true` if the error was raised before any request was sent.
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::Transport(_))
    }
}
