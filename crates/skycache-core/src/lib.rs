//! # SkyCache Core
//!
//! The domain layer of the SkyCache weather gateway.
//! This crate contains the lookup pipeline and the ports it depends on,
//! with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use error::{ErrorKind, LookupError};
pub use service::{HealthReporter, LookupResult, WeatherLookup};
