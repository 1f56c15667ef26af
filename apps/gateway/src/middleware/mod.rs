//! Request extractors and error mapping.

mod client;
mod error;

pub use client::ClientId;
pub use error::{AppError, AppResult};
