use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// Client identifier sent as `x-client-id` unless overridden.
pub const DEFAULT_CLIENT_ID: &str = "JAY0066";

pub(crate) const API_KEY_HEADER: &str = "x-api-key";
pub(crate) const CLIENT_ID_HEADER: &str = "x-client-id";
pub(crate) const COUNTRY_HEADER: &str = "x-country";
pub(crate) const MESSAGE_ID_HEADER: &str = "x-message-id";

/// Credentials for a single device on the control API.
///
/// The API key and personal access token are kept as [`SecretString`] so they
/// never show up in `Debug` output or logs.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: SecretString,
    /// Personal access token, sent as `Authorization: Bearer <token>`.
    pub personal_access_token: SecretString,
    pub device_id: String,
    /// Country code sent as `x-country` (e.g. `"US"`).
    pub country: String,
}

impl Credentials {
    pub fn new(
        api_key: impl Into<String>,
        personal_access_token: impl Into<String>,
        device_id: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            personal_access_token: SecretString::from(personal_access_token.into()),
            device_id: device_id.into(),
            country: country.into(),
        }
    }

    /// Build the headers shared by every request for these credentials.
    ///
    /// `x-message-id` is not included; the controller stamps it per request.
    pub(crate) fn header_map(&self, client_id: &str) -> Result<HeaderMap, Error> {
        let bearer = format!("Bearer {}", self.personal_access_token.expose_secret());

        let mut headers = HeaderMap::with_capacity(6);
        headers.insert(AUTHORIZATION, sensitive_value("Authorization", &bearer)?);
        headers.insert(
            API_KEY_HEADER,
            sensitive_value(API_KEY_HEADER, self.api_key.expose_secret())?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(CLIENT_ID_HEADER, plain_value(CLIENT_ID_HEADER, client_id)?);
        headers.insert(COUNTRY_HEADER, plain_value(COUNTRY_HEADER, &self.country)?);
        Ok(headers)
    }
}

fn plain_value(name: &'static str, value: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader {
        name,
        message: e.to_string(),
    })
}

fn sensitive_value(name: &'static str, value: &str) -> Result<HeaderValue, Error> {
    let mut value = plain_value(name, value)?;
    value.set_sensitive(true);
    Ok(value)
}

/// How the `x-message-id` correlation header is generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageIdPolicy {
    /// A fresh UUID v4 on every request.
    #[default]
    PerRequest,
    /// One UUID v4 generated when the controller is built, reused for every
    /// request it sends.
    PerController,
}

/// Source of `x-message-id` values for one controller.
#[derive(Debug)]
pub(crate) enum MessageIds {
    Fresh,
    Fixed(Uuid),
}

impl MessageIds {
    pub(crate) fn new(policy: MessageIdPolicy) -> Self {
        match policy {
            MessageIdPolicy::PerRequest => Self::Fresh,
            MessageIdPolicy::PerController => Self::Fixed(Uuid::new_v4()),
        }
    }

    pub(crate) fn next(&self) -> Uuid {
        match self {
            Self::Fresh => Uuid::new_v4(),
            Self::Fixed(id) => *id,
        }
    }
}
