use serde::{Deserialize, Serialize};

/// Placeholder used for any field the provider did not supply.
pub const NOT_AVAILABLE: &str = "N/A";

/// A numeric measurement, or the "not available" sentinel.
///
/// Serialized as a plain JSON number, or as the string `"N/A"`.
/// Any other string is rejected when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ReadingRepr", into = "ReadingRepr")]
pub enum Reading {
    Value(f64),
    NotAvailable,
}

impl Reading {
    pub fn value(&self) -> Option<f64> {
        match self {
            Reading::Value(v) => Some(*v),
            Reading::NotAvailable => None,
        }
    }
}

impl From<Option<f64>> for Reading {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Reading::Value(v),
            _ => Reading::NotAvailable,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ReadingRepr {
    Number(f64),
    Text(String),
}

impl TryFrom<ReadingRepr> for Reading {
    type Error = String;

    fn try_from(repr: ReadingRepr) -> Result<Self, Self::Error> {
        match repr {
            ReadingRepr::Number(v) => Ok(Reading::Value(v)),
            ReadingRepr::Text(s) if s == NOT_AVAILABLE => Ok(Reading::NotAvailable),
            ReadingRepr::Text(s) => Err(format!("expected a number or \"{NOT_AVAILABLE}\", got {s:?}")),
        }
    }
}

impl From<Reading> for ReadingRepr {
    fn from(reading: Reading) -> Self {
        match reading {
            Reading::Value(v) => ReadingRepr::Number(v),
            Reading::NotAvailable => ReadingRepr::Text(NOT_AVAILABLE.to_string()),
        }
    }
}

/// Normalized weather data for one location.
///
/// Every field always carries a value or an explicit sentinel. This is also
/// the exact schema of a cache entry: unknown or missing fields fail to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeatherRecord {
    /// Temperature in degrees Celsius.
    pub temperature: Reading,
    pub conditions: String,
    /// Free-text summary; empty when the provider has none.
    pub description: String,
    /// Relative humidity in percent.
    pub humidity: Reading,
    /// Wind speed in km/h.
    pub wind_speed: Reading,
    /// Location name as resolved by the provider.
    pub location: String,
    /// Provider's date for the reported day.
    pub last_updated: String,
}

impl WeatherRecord {
    /// Serialize to the cache payload format.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a cache payload.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Substitute the text sentinel for a missing or blank provider field.
pub fn text_or_sentinel(value: Option<String>) -> String {
    match value {
        Some(s) if !s.trim().is_empty() => s,
        _ => NOT_AVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WeatherRecord {
        WeatherRecord {
            temperature: Reading::Value(18.4),
            conditions: "Partially cloudy".to_string(),
            description: "Clearing in the afternoon.".to_string(),
            humidity: Reading::NotAvailable,
            wind_speed: Reading::Value(12.0),
            location: "London, England, United Kingdom".to_string(),
            last_updated: NOT_AVAILABLE.to_string(),
        }
    }

    #[test]
    fn test_round_trip_keeps_sentinels() {
        let record = sample();
        let json = record.to_json().unwrap();
        assert_eq!(WeatherRecord::from_json(&json).unwrap(), record);
    }

    #[test]
    fn test_reading_wire_format() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["temperature"], serde_json::json!(18.4));
        assert_eq!(value["humidity"], serde_json::json!("N/A"));
    }

    #[test]
    fn test_rejects_unknown_reading_text() {
        let err = serde_json::from_str::<Reading>("\"warm\"");
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_payload_with_missing_field() {
        let raw = r#"{"temperature": 20.0, "conditions": "Clear"}"#;
        assert!(WeatherRecord::from_json(raw).is_err());
    }

    #[test]
    fn test_rejects_payload_with_unknown_field() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value["feels_like"] = serde_json::json!(17.0);
        assert!(WeatherRecord::from_json(&value.to_string()).is_err());
    }

    #[test]
    fn test_reading_from_option() {
        assert_eq!(Reading::from(Some(3.5)), Reading::Value(3.5));
        assert_eq!(Reading::from(None), Reading::NotAvailable);
        assert_eq!(Reading::from(Some(f64::NAN)), Reading::NotAvailable);
    }

    #[test]
    fn test_text_or_sentinel() {
        assert_eq!(text_or_sentinel(Some("Rain".into())), "Rain");
        assert_eq!(text_or_sentinel(Some("  ".into())), NOT_AVAILABLE);
        assert_eq!(text_or_sentinel(None), NOT_AVAILABLE);
    }
}
