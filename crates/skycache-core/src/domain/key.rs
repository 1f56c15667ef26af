use std::fmt;

use crate::error::LookupError;

/// Location code a lookup is keyed by.
///
/// Never empty or whitespace-only. Used verbatim both in the provider request
/// and, behind a namespace prefix, as the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupKey(String);

impl LookupKey {
    pub fn parse(raw: &str) -> Result<Self, LookupError> {
        if raw.trim().is_empty() {
            return Err(LookupError::Validation(
                "location code must not be empty".to_string(),
            ));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Cache key for this location under the given namespace prefix.
    pub fn namespaced(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.0)
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
