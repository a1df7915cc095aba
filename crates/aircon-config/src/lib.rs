//! Configuration for the aircon client.
//!
//! Credentials come straight from the process environment (`API_KEY`, `PAT`,
//! `DEVICE_ID`, `COUNTRY`, `API_LINK`). Client settings are layered with
//! figment: built-in defaults, then `AIRCON_`-prefixed variables. The result
//! translates into an `aircon_api::ControllerConfig`.

use std::collections::HashMap;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use aircon_api::{
    ControllerConfig, Credentials, DEFAULT_CLIENT_ID, MessageIdPolicy, TransportConfig,
};

// ── Variable names ──────────────────────────────────────────────────

pub const API_KEY_VAR: &str = "API_KEY";
pub const PAT_VAR: &str = "PAT";
pub const DEVICE_ID_VAR: &str = "DEVICE_ID";
pub const COUNTRY_VAR: &str = "COUNTRY";
pub const API_LINK_VAR: &str = "API_LINK";

/// Every variable [`AirconConfig::from_env`] requires, in lookup order.
pub const REQUIRED_VARS: [&str; 5] = [
    API_KEY_VAR,
    PAT_VAR,
    DEVICE_ID_VAR,
    COUNTRY_VAR,
    API_LINK_VAR,
];

/// Prefix for optional client settings (`AIRCON_TIMEOUT`, ...).
pub const SETTINGS_PREFIX: &str = "AIRCON_";

/// Client id override. Read verbatim rather than through figment so ids
/// such as `0066` keep their leading zeros.
pub const CLIENT_ID_VAR: &str = "AIRCON_CLIENT_ID";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {var} is not set")]
    MissingVar { var: &'static str },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Client settings ─────────────────────────────────────────────────

/// Optional knobs, read from `AIRCON_*` variables on top of the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientSettings {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Value of the `x-client-id` header.
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// `per_request` or `per_controller`.
    #[serde(default)]
    pub message_id: MessageIdPolicy,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            client_id: default_client_id(),
            message_id: MessageIdPolicy::default(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_client_id() -> String {
    DEFAULT_CLIENT_ID.into()
}

impl ClientSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "AIRCON_TIMEOUT".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        if self.client_id.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "AIRCON_CLIENT_ID".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

/// The figment used for [`ClientSettings`]: defaults, then `AIRCON_*` env.
///
/// `AIRCON_CLIENT_ID` is left out; [`load_settings`] applies it afterwards.
pub fn settings_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ClientSettings::default()))
        .merge(Env::prefixed(SETTINGS_PREFIX).ignore(&["client_id"]))
}

/// Load and validate client settings from the environment.
pub fn load_settings() -> Result<ClientSettings, ConfigError> {
    let mut settings: ClientSettings = settings_figment().extract()?;
    if let Ok(client_id) = std::env::var(CLIENT_ID_VAR) {
        settings.client_id = client_id.trim().to_owned();
    }
    settings.validate()?;
    Ok(settings)
}

// ── Full configuration ──────────────────────────────────────────────

/// Credentials, endpoint and settings for one device.
#[derive(Debug, Clone)]
pub struct AirconConfig {
    pub api_key: SecretString,
    pub personal_access_token: SecretString,
    pub device_id: String,
    pub country: String,
    pub api_link: Url,
    pub settings: ClientSettings,
}

impl AirconConfig {
    /// Read the five required variables and the optional settings from the
    /// process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings = load_settings()?;
        Self::from_lookup(|name| std::env::var(name).ok(), settings)
    }

    /// Build from a map of variable names to values.
    pub fn from_map(
        vars: &HashMap<String, String>,
        settings: ClientSettings,
    ) -> Result<Self, ConfigError> {
        Self::from_lookup(|name| vars.get(name).cloned(), settings)
    }

    /// Build from an arbitrary variable lookup.
    ///
    /// Values are trimmed; a variable that is unset or blank is reported as
    /// missing. Variables are checked in [`REQUIRED_VARS`] order.
    pub fn from_lookup<F>(lookup: F, settings: ClientSettings) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        settings.validate()?;

        let require = |var: &'static str| -> Result<String, ConfigError> {
            lookup(var)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingVar { var })
        };

        let api_key = require(API_KEY_VAR)?;
        let pat = require(PAT_VAR)?;
        let device_id = require(DEVICE_ID_VAR)?;
        let country = require(COUNTRY_VAR)?;
        let api_link = parse_api_link(&require(API_LINK_VAR)?)?;

        debug!(%device_id, %country, api_link = %api_link, "loaded device configuration");

        Ok(Self {
            api_key: SecretString::from(api_key),
            personal_access_token: SecretString::from(pat),
            device_id,
            country,
            api_link,
            settings,
        })
    }

    /// Translate into the API crate's controller config.
    pub fn into_controller_config(self) -> ControllerConfig {
        let credentials = Credentials {
            api_key: self.api_key,
            personal_access_token: self.personal_access_token,
            device_id: self.device_id,
            country: self.country,
        };

        ControllerConfig {
            base_url: self.api_link,
            credentials,
            client_id: self.settings.client_id,
            message_id: self.settings.message_id,
            transport: TransportConfig::with_timeout(Duration::from_secs(self.settings.timeout)),
        }
    }
}

fn parse_api_link(raw: &str) -> Result<Url, ConfigError> {
    let url: Url = raw.parse().map_err(|e| ConfigError::Validation {
        field: API_LINK_VAR.into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Validation {
            field: API_LINK_VAR.into(),
            reason: format!("expected an http or https URL, got scheme '{other}'"),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    fn full_env() -> HashMap<String, String> {
        [
            (API_KEY_VAR, "key-123"),
            (PAT_VAR, "pat-456"),
            (DEVICE_ID_VAR, "0042abcd"),
            (COUNTRY_VAR, "US"),
            (API_LINK_VAR, "https://api.example.com/v1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect()
    }

    #[test]
    fn loads_all_required_values() {
        let cfg = AirconConfig::from_map(&full_env(), ClientSettings::default()).unwrap();

        assert_eq!(cfg.api_key.expose_secret(), "key-123");
        assert_eq!(cfg.personal_access_token.expose_secret(), "pat-456");
        assert_eq!(cfg.device_id, "0042abcd");
        assert_eq!(cfg.country, "US");
        assert_eq!(cfg.api_link.as_str(), "https://api.example.com/v1");
    }

    #[test]
    fn each_missing_var_is_named() {
        for var in REQUIRED_VARS {
            let mut env = full_env();
            env.remove(var);

            let err = AirconConfig::from_map(&env, ClientSettings::default()).unwrap_err();
            assert!(
                matches!(err, ConfigError::MissingVar { var: missing } if missing == var),
                "expected MissingVar({var}), got: {err:?}"
            );
        }
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let mut env = full_env();
        env.insert(PAT_VAR.into(), "   ".into());

        let err = AirconConfig::from_map(&env, ClientSettings::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar { var: "PAT" }));
    }

    #[test]
    fn values_are_trimmed() {
        let mut env = full_env();
        env.insert(COUNTRY_VAR.into(), " US\n".into());

        let cfg = AirconConfig::from_map(&env, ClientSettings::default()).unwrap();
        assert_eq!(cfg.country, "US");
    }

    #[test]
    fn api_link_must_be_http() {
        let mut env = full_env();
        env.insert(API_LINK_VAR.into(), "ftp://example.com".into());
        let err = AirconConfig::from_map(&env, ClientSettings::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "API_LINK"));

        env.insert(API_LINK_VAR.into(), "not a url".into());
        let err = AirconConfig::from_map(&env, ClientSettings::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn translates_to_controller_config() {
        let settings = ClientSettings {
            timeout: 5,
            client_id: "CUSTOM01".into(),
            message_id: MessageIdPolicy::PerController,
        };
        let cfg = AirconConfig::from_map(&full_env(), settings)
            .unwrap()
            .into_controller_config();

        assert_eq!(cfg.base_url.as_str(), "https://api.example.com/v1");
        assert_eq!(cfg.credentials.device_id, "0042abcd");
        assert_eq!(cfg.credentials.country, "US");
        assert_eq!(cfg.credentials.api_key.expose_secret(), "key-123");
        assert_eq!(cfg.client_id, "CUSTOM01");
        assert_eq!(cfg.message_id, MessageIdPolicy::PerController);
        assert_eq!(cfg.transport.timeout, Duration::from_secs(5));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let settings = ClientSettings {
            timeout: 0,
            ..ClientSettings::default()
        };
        let err = AirconConfig::from_map(&full_env(), settings).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn settings_default_without_env() {
        Jail::expect_with(|_jail| {
            let settings = load_settings().map_err(|e| e.to_string())?;
            assert_eq!(settings, ClientSettings::default());
            assert_eq!(settings.client_id, "JAY0066");
            assert_eq!(settings.message_id, MessageIdPolicy::PerRequest);
            Ok(())
        });
    }

    #[test]
    fn settings_read_prefixed_env() {
        Jail::expect_with(|jail| {
            jail.set_env("AIRCON_TIMEOUT", "12");
            jail.set_env("AIRCON_CLIENT_ID", "ABC0001");
            jail.set_env("AIRCON_MESSAGE_ID", "per_controller");

            let settings = load_settings().map_err(|e| e.to_string())?;
            assert_eq!(settings.timeout, 12);
            assert_eq!(settings.client_id, "ABC0001");
            assert_eq!(settings.message_id, MessageIdPolicy::PerController);
            Ok(())
        });
    }

    #[test]
    fn numeric_client_id_keeps_leading_zeros() {
        Jail::expect_with(|jail| {
            jail.set_env("AIRCON_CLIENT_ID", "0066");

            let settings = load_settings().map_err(|e| e.to_string())?;
            assert_eq!(settings.client_id, "0066");
            Ok(())
        });
    }

    #[test]
    fn blank_client_id_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("AIRCON_CLIENT_ID", "  ");

            let err = load_settings().unwrap_err();
            assert!(
                matches!(err, ConfigError::Validation { ref field, .. } if field == "AIRCON_CLIENT_ID")
            );
            Ok(())
        });
    }

    #[test]
    fn from_env_reads_process_environment() {
        Jail::expect_with(|jail| {
            jail.set_env("API_KEY", "env-key");
            jail.set_env("PAT", "env-pat");
            jail.set_env("DEVICE_ID", "dev-env");
            jail.set_env("COUNTRY", "DE");
            jail.set_env("API_LINK", "http://localhost:8080");

            let cfg = AirconConfig::from_env().map_err(|e| e.to_string())?;
            assert_eq!(cfg.device_id, "dev-env");
            assert_eq!(cfg.country, "DE");
            assert_eq!(cfg.api_key.expose_secret(), "env-key");
            Ok(())
        });
    }
}
