// Device controller
//
// One controller talks to one device. Every operation is a single request
// against `{base}/devices/{id}/state` or `{base}/devices/{id}/control`;
// nothing is retried and non-2xx statuses are returned, not raised.

use std::sync::{PoisonError, RwLock};

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::auth::{Credentials, DEFAULT_CLIENT_ID, MESSAGE_ID_HEADER, MessageIdPolicy, MessageIds};
use crate::error::Error;
use crate::models::{
    ControlPayload, ControlResponse, JobMode, PowerMode, StatusResponse, WindStrength,
};
use crate::transport::TransportConfig;

/// Everything needed to build a [`DeviceController`].
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// API root; `/devices/{id}/...` is appended to its path.
    pub base_url: Url,
    pub credentials: Credentials,
    /// Value of the `x-client-id` header.
    pub client_id: String,
    pub message_id: MessageIdPolicy,
    pub transport: TransportConfig,
}

impl ControllerConfig {
    /// Config with the default client id, message-id policy and transport.
    pub fn new(base_url: Url, credentials: Credentials) -> Self {
        Self {
            base_url,
            credentials,
            client_id: DEFAULT_CLIENT_ID.to_owned(),
            message_id: MessageIdPolicy::default(),
            transport: TransportConfig::default(),
        }
    }
}

/// Client for a single air conditioner.
///
/// Construction only validates inputs and builds headers; no request is sent
/// until an operation is called.
///
/// Every response's status and body are logged at `debug`; rejected control
/// requests and non-JSON state bodies also log at `warn`.
pub struct DeviceController {
    http: reqwest::Client,
    device_id: String,
    state_url: Url,
    control_url: Url,
    headers: HeaderMap,
    message_ids: MessageIds,
    /// Most recent `get_status` result, owned by this instance.
    last_status: RwLock<Option<StatusResponse>>,
}

impl DeviceController {
    /// Build a controller and its HTTP client from `config`.
    pub fn new(config: ControllerConfig) -> Result<Self, Error> {
        let http = config.transport.build_client()?;
        Self::with_client(http, config)
    }

    /// Build a controller around an existing `reqwest::Client`.
    ///
    /// `config.transport` is ignored; the client's own settings apply.
    pub fn with_client(http: reqwest::Client, config: ControllerConfig) -> Result<Self, Error> {
        let ControllerConfig {
            base_url,
            credentials,
            client_id,
            message_id,
            ..
        } = config;

        let headers = credentials.header_map(&client_id)?;
        let state_url = device_url(&base_url, &credentials.device_id, "state")?;
        let control_url = device_url(&base_url, &credentials.device_id, "control")?;

        debug!(
            device_id = %credentials.device_id,
            policy = ?message_id,
            "device controller ready"
        );

        Ok(Self {
            http,
            device_id: credentials.device_id,
            state_url,
            control_url,
            headers,
            message_ids: MessageIds::new(message_id),
            last_status: RwLock::new(None),
        })
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// `{base}/devices/{id}/state`
    pub fn state_url(&self) -> &Url {
        &self.state_url
    }

    /// `{base}/devices/{id}/control`
    pub fn control_url(&self) -> &Url {
        &self.control_url
    }

    /// The result of the most recent [`get_status`](Self::get_status) call.
    pub fn last_status(&self) -> Option<StatusResponse> {
        self.last_status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Fetch the device state.
    ///
    /// A body that is not JSON comes back as [`StatusResponse::NotJson`]
    /// rather than an error. Either way the result replaces the cached
    /// last status.
    pub async fn get_status(&self) -> Result<StatusResponse, Error> {
        debug!("GET {}", self.state_url);

        let resp = self
            .request(Method::GET, &self.state_url)
            .send()
            .await?;
        let (status, body) = read_response(resp).await?;

        let result = StatusResponse::from_body(status, body);
        if !result.is_json() {
            warn!(status = status.as_u16(), "device state response is not JSON");
        }

        *self
            .last_status
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(result.clone());
        Ok(result)
    }

    pub async fn turn_on(&self) -> Result<ControlResponse, Error> {
        self.send(&ControlPayload::power(PowerMode::PowerOn)).await
    }

    pub async fn turn_off(&self) -> Result<ControlResponse, Error> {
        self.send(&ControlPayload::power(PowerMode::PowerOff)).await
    }

    /// Set the target temperature in Celsius.
    pub async fn set_temperature(&self, celsius: i32) -> Result<ControlResponse, Error> {
        self.send(&ControlPayload::temperature(celsius)).await
    }

    pub async fn set_mode(&self, mode: JobMode) -> Result<ControlResponse, Error> {
        self.send(&ControlPayload::job_mode(mode)).await
    }

    pub async fn set_fan_speed(&self, speed: WindStrength) -> Result<ControlResponse, Error> {
        self.send(&ControlPayload::wind_strength(speed)).await
    }

    /// POST an arbitrary control payload.
    pub async fn send(&self, payload: &ControlPayload) -> Result<ControlResponse, Error> {
        debug!(kind = payload.kind(), "POST {}", self.control_url);

        let resp = self
            .request(Method::POST, &self.control_url)
            .json(payload)
            .send()
            .await?;
        let (status, body) = read_response(resp).await?;

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                kind = payload.kind(),
                "control request rejected"
            );
        }

        Ok(ControlResponse { status, body })
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn request(&self, method: Method, url: &Url) -> reqwest::RequestBuilder {
        let message_id = self.message_ids.next();
        debug!(%message_id, "stamping request");

        self.http
            .request(method, url.clone())
            .headers(self.headers.clone())
            .header(MESSAGE_ID_HEADER, message_id.to_string())
    }
}

impl std::fmt::Debug for DeviceController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceController")
            .field("device_id", &self.device_id)
            .field("state_url", &self.state_url.as_str())
            .field("control_url", &self.control_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Drain a response into its status and raw body, logging both.
async fn read_response(resp: reqwest::Response) -> Result<(StatusCode, String), Error> {
    let status = resp.status();
    let body = resp.text().await?;

    debug!(status = status.as_u16(), "device API responded");
    debug!(body = %body, "raw response");

    Ok((status, body))
}

/// Append `devices/{id}/{leaf}` to the base URL path.
///
/// A trailing slash on the base is dropped first and the device id is
/// percent-encoded as a single path segment.
fn device_url(base: &Url, device_id: &str, leaf: &str) -> Result<Url, Error> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| Error::CannotBeABase {
            url: base.to_string(),
        })?
        .pop_if_empty()
        .extend(["devices", device_id, leaf]);
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn controller(base: &str) -> DeviceController {
        let creds = Credentials::new("key", "pat", "dev-1", "US");
        let config = ControllerConfig::new(Url::parse(base).unwrap(), creds);
        DeviceController::new(config).unwrap()
    }

    #[test]
    fn urls_follow_device_pattern() {
        let ac = controller("https://api.example.com/v1");

        assert_eq!(
            ac.state_url().as_str(),
            "https://api.example.com/v1/devices/dev-1/state"
        );
        assert_eq!(
            ac.control_url().as_str(),
            "https://api.example.com/v1/devices/dev-1/control"
        );
    }

    #[test]
    fn trailing_slash_on_base_is_tolerated() {
        let ac = controller("https://api.example.com/v1/");
        assert_eq!(
            ac.state_url().as_str(),
            "https://api.example.com/v1/devices/dev-1/state"
        );
    }

    #[test]
    fn device_id_is_a_single_segment() {
        let url = Url::parse("https://api.example.com").unwrap();
        let built = device_url(&url, "a/b c", "state").unwrap();
        assert_eq!(
            built.as_str(),
            "https://api.example.com/devices/a%2Fb%20c/state"
        );
    }

    #[test]
    fn cannot_be_a_base_url_is_rejected() {
        let url = Url::parse("mailto:ops@example.com").unwrap();
        let err = device_url(&url, "dev-1", "state").unwrap_err();
        assert!(matches!(err, Error::CannotBeABase { .. }));
    }

    #[test]
    fn new_controller_has_no_cached_status() {
        let ac = controller("https://api.example.com");
        assert!(ac.last_status().is_none());
    }

    #[test]
    fn debug_output_omits_headers() {
        let ac = controller("https://api.example.com");
        let rendered = format!("{ac:?}");
        assert!(rendered.contains("dev-1"));
        assert!(!rendered.contains("pat"));
    }
}
