// aircon-api: Async Rust client for a cloud air-conditioner control API

pub mod auth;
pub mod controller;
pub mod error;
pub mod models;
pub mod transport;

pub use auth::{Credentials, DEFAULT_CLIENT_ID, MessageIdPolicy};
pub use controller::{ControllerConfig, DeviceController};
pub use error::Error;
pub use models::{
    ControlPayload, ControlResponse, DeviceState, JobMode, NOT_JSON_ERROR, PowerMode,
    StatusResponse, WindStrength,
};
pub use reqwest::StatusCode;
pub use transport::TransportConfig;
