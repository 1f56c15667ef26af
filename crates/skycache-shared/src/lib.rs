//! # SkyCache Shared
//!
//! Wire types for the gateway's HTTP API, shared with API clients.

pub mod dto;
pub mod response;

pub use dto::{HealthResponse, ServiceInfo, WeatherResponse};
pub use response::ErrorResponse;
