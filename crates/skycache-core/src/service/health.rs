//! Dependency status reporting.

/// Snapshot of the process's dependency configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthStatus {
    pub cache_enabled: bool,
    pub credential_configured: bool,
}

/// Reports dependency status without touching any dependency.
///
/// Both facts are settled at startup and never change afterwards, so this
/// performs no network call and no cache access.
#[derive(Debug, Clone)]
pub struct HealthReporter {
    status: HealthStatus,
}

impl HealthReporter {
    pub fn new(cache_enabled: bool, credential_configured: bool) -> Self {
        Self {
            status: HealthStatus {
                cache_enabled,
                credential_configured,
            },
        }
    }

    pub fn status(&self) -> HealthStatus {
        self.status
    }
}
