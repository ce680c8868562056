use serde::Serialize;

/// Payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct HealthResponse {
    /// "ok" when the store answered, "degraded" otherwise.
    pub status: &'static str,
}

impl HealthResponse {
    /// The store answered the health probe.
    pub fn ok() -> Self {
        Self { status: "ok" }
    }

    /// The store did not answer the health probe.
    pub fn degraded() -> Self {
        Self { status: "degraded" }
    }
}
