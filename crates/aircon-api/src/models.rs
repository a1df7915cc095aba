// Wire types for the device control API.
//
// Control bodies are small literal JSON shapes, one per operation; nothing is
// shared between them. State documents are kept as raw JSON with a typed,
// fully optional view on top.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::error::Error;

/// `error` field of [`StatusResponse::NotJson`].
pub const NOT_JSON_ERROR: &str = "Response not JSON";

// ── Closed value sets ───────────────────────────────────────────────

/// Power state (`operation.airConOperationMode`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    VariantNames,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum PowerMode {
    PowerOn,
    PowerOff,
}

/// Operating mode (`airConJobMode.currentJobMode`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    VariantNames,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum JobMode {
    /// Dehumidify.
    AirDry,
    Cool,
    /// Fan only.
    Fan,
    Auto,
}

/// Fan speed (`airFlow.windStrength`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    VariantNames,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum WindStrength {
    High,
    Auto,
    Low,
    Mid,
}

macro_rules! impl_parse {
    ($ty:ty, $field:literal) => {
        impl $ty {
            /// Parse a wire value (case-insensitive), rejecting anything
            /// outside the known set.
            pub fn parse(raw: &str) -> Result<Self, Error> {
                raw.trim()
                    .parse()
                    .map_err(|_| Error::InvalidArgument {
                        field: $field,
                        value: raw.to_owned(),
                        expected: <Self as VariantNames>::VARIANTS.join(", "),
                    })
            }

            /// The value as sent on the wire.
            pub fn as_wire(self) -> &'static str {
                self.into()
            }
        }
    };
}

impl_parse!(PowerMode, "power mode");
impl_parse!(JobMode, "job mode");
impl_parse!(WindStrength, "wind strength");

// ── Control payloads ────────────────────────────────────────────────

/// Body of a `POST /devices/{id}/control` request.
///
/// Serializes to exactly one top-level key; see the constructors for the
/// literal shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ControlPayload {
    /// `{"operation":{"airConOperationMode":"POWER_ON"}}`
    Operation { operation: OperationBody },
    /// `{"temperature":{"targetTemperature":"24","unit":"C"}}`
    Temperature { temperature: TemperatureBody },
    /// `{"airConJobMode":{"currentJobMode":"COOL"}}`
    JobMode {
        #[serde(rename = "airConJobMode")]
        air_con_job_mode: JobModeBody,
    },
    /// `{"airFlow":{"windStrength":"HIGH"}}`
    AirFlow {
        #[serde(rename = "airFlow")]
        air_flow: AirFlowBody,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationBody {
    pub air_con_operation_mode: PowerMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureBody {
    /// Sent as a string, not a number.
    pub target_temperature: String,
    pub unit: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobModeBody {
    pub current_job_mode: JobMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirFlowBody {
    pub wind_strength: WindStrength,
}

impl ControlPayload {
    pub fn power(mode: PowerMode) -> Self {
        Self::Operation {
            operation: OperationBody {
                air_con_operation_mode: mode,
            },
        }
    }

    /// Target temperature in Celsius. No range check; the device decides.
    pub fn temperature(celsius: i32) -> Self {
        Self::Temperature {
            temperature: TemperatureBody {
                target_temperature: celsius.to_string(),
                unit: "C",
            },
        }
    }

    pub fn job_mode(mode: JobMode) -> Self {
        Self::JobMode {
            air_con_job_mode: JobModeBody {
                current_job_mode: mode,
            },
        }
    }

    pub fn wind_strength(speed: WindStrength) -> Self {
        Self::AirFlow {
            air_flow: AirFlowBody {
                wind_strength: speed,
            },
        }
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Operation { .. } => "operation",
            Self::Temperature { .. } => "temperature",
            Self::JobMode { .. } => "airConJobMode",
            Self::AirFlow { .. } => "airFlow",
        }
    }
}

// ── Responses ───────────────────────────────────────────────────────

/// Result of `GET /devices/{id}/state`.
///
/// Serializes to the raw document for [`State`](Self::State), or to
/// `{"error", "details", "status_code"}` for [`NotJson`](Self::NotJson).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatusResponse {
    /// Body parsed as JSON, whatever the HTTP status.
    State(Value),
    /// Body was not valid JSON.
    NotJson {
        error: String,
        /// The raw response body.
        details: String,
        status_code: u16,
    },
}

impl StatusResponse {
    pub(crate) fn from_body(status: StatusCode, body: String) -> Self {
        match serde_json::from_str(&body) {
            Ok(doc) => Self::State(doc),
            Err(_) => Self::NotJson {
                error: NOT_JSON_ERROR.to_owned(),
                details: body,
                status_code: status.as_u16(),
            },
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::State(_))
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::State(doc) => Some(doc),
            Self::NotJson { .. } => None,
        }
    }

    /// Typed view of the state document, if it is a JSON object.
    pub fn device_state(&self) -> Option<DeviceState> {
        self.as_json().and_then(DeviceState::from_document)
    }

    /// The response as a single JSON value, matching its serialized form.
    pub fn to_json(&self) -> Value {
        match self {
            Self::State(doc) => doc.clone(),
            Self::NotJson {
                error,
                details,
                status_code,
            } => serde_json::json!({
                "error": error,
                "details": details,
                "status_code": status_code,
            }),
        }
    }
}

/// Result of a control request: the HTTP status and raw body.
///
/// Non-2xx statuses are returned as-is; check [`is_success`](Self::is_success).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ControlResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The body parsed as JSON, if it is JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

// ── Device state ────────────────────────────────────────────────────

/// Typed view of a device state document.
///
/// Every section is optional, a section with an unexpected shape reads as
/// `None`, and unknown keys are kept in `extra`, so any JSON object converts.
/// Enumerated values stay as strings because the
/// service may report values this client does not know.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceState {
    #[serde(default, deserialize_with = "lenient_section")]
    pub run_state: Option<RunState>,
    #[serde(default, deserialize_with = "lenient_section")]
    pub operation: Option<OperationState>,
    #[serde(default, deserialize_with = "lenient_section")]
    pub air_con_job_mode: Option<JobModeState>,
    #[serde(default, deserialize_with = "lenient_section")]
    pub temperature: Option<TemperatureState>,
    #[serde(default, deserialize_with = "lenient_section")]
    pub air_flow: Option<AirFlowState>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    pub current_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationState {
    pub air_con_operation_mode: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobModeState {
    pub current_job_mode: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureState {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub current_temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub target_temperature: Option<f64>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirFlowState {
    pub wind_strength: Option<String>,
}

impl DeviceState {
    /// Extract the state from a document, unwrapping a `{"response": {...}}`
    /// envelope when present. Returns `None` for non-object documents.
    pub fn from_document(doc: &Value) -> Option<Self> {
        let inner = match doc.get("response") {
            Some(inner @ Value::Object(_)) => inner,
            _ => doc,
        };
        if !inner.is_object() {
            return None;
        }
        serde_json::from_value(inner.clone()).ok()
    }

    /// Power state, if reported and recognised.
    pub fn power(&self) -> Option<PowerMode> {
        let raw = self.operation.as_ref()?.air_con_operation_mode.as_deref()?;
        PowerMode::parse(raw).ok()
    }

    pub fn is_on(&self) -> Option<bool> {
        self.power().map(|p| p == PowerMode::PowerOn)
    }

    pub fn job_mode(&self) -> Option<JobMode> {
        let raw = self.air_con_job_mode.as_ref()?.current_job_mode.as_deref()?;
        JobMode::parse(raw).ok()
    }

    pub fn wind_strength(&self) -> Option<WindStrength> {
        let raw = self.air_flow.as_ref()?.wind_strength.as_deref()?;
        WindStrength::parse(raw).ok()
    }

    pub fn target_temperature(&self) -> Option<f64> {
        self.temperature.as_ref()?.target_temperature
    }

    pub fn current_temperature(&self) -> Option<f64> {
        self.temperature.as_ref()?.current_temperature
    }
}

/// Temperatures arrive as numbers or numeric strings depending on firmware.
/// Anything else reads as `None`.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// A section with an unexpected shape reads as `None` instead of failing
/// the whole document.
fn lenient_section<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .and_then(|raw| serde_json::from_value(raw).ok()))
}
