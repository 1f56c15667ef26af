//! Domain types - lookup keys and normalized weather records.

mod key;
mod weather;

pub use key::LookupKey;
pub use weather::{NOT_AVAILABLE, Reading, WeatherRecord, text_or_sentinel};
