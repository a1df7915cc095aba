//! CLI error types with miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;
use url::Url;

use aircon_config::ConfigError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("{var} is not set")]
    #[diagnostic(
        code(aircon::missing_config),
        help(
            "Export {var} before running.\n\
             Required: API_KEY, PAT, DEVICE_ID, COUNTRY, API_LINK"
        )
    )]
    MissingConfig { var: &'static str },

    #[error("Invalid configuration for {field}: {reason}")]
    #[diagnostic(code(aircon::invalid_config))]
    InvalidConfig { field: String, reason: String },

    #[error("Could not load configuration")]
    #[diagnostic(code(aircon::config_load))]
    ConfigLoad(#[source] ConfigError),

    // ── Requests ─────────────────────────────────────────────────────
    #[error("Could not reach the device API at {url}")]
    #[diagnostic(
        code(aircon::connection_failed),
        help("Check API_LINK and your network connection.")
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: aircon_api::Error,
    },

    #[error("Request to {url} timed out")]
    #[diagnostic(code(aircon::timeout), help("Raise AIRCON_TIMEOUT (seconds) if the API is slow."))]
    Timeout { url: String },

    #[error(transparent)]
    #[diagnostic(code(aircon::api_error))]
    Api(#[from] aircon_api::Error),
}

impl CliError {
    /// Map a failed request into a diagnostic carrying the target URL.
    pub fn from_request(err: aircon_api::Error, url: &Url) -> Self {
        let url = url.to_string();
        match err {
            aircon_api::Error::Transport(ref e) if e.is_timeout() => Self::Timeout { url },
            aircon_api::Error::Transport(_) => Self::ConnectionFailed { url, source: err },
            other => Self::Api(other),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingConfig { .. } | Self::InvalidConfig { .. } | Self::ConfigLoad(_) => {
                exit_code::USAGE
            }
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Api(_) => exit_code::GENERAL,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingVar { var } => Self::MissingConfig { var },
            ConfigError::Validation { field, reason } => Self::InvalidConfig { field, reason },
            other @ ConfigError::Figment(_) => Self::ConfigLoad(other),
        }
    }
}
