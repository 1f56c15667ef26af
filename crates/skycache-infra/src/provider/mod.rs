//! Upstream weather provider clients.

mod visual_crossing;

pub use visual_crossing::{
    DEFAULT_BASE_URL, ProviderConfig, ProviderInitError, VisualCrossingClient,
};
