use serde::{Deserialize, Serialize};

/// Failure categories the subscription service reports on non-2xx
/// responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceErrorKind {
    Unauthorized,
    UnknownSubscriber,
    Throttled,
    Internal,
}

/// Error envelope on the subscription query boundary. `retry_after_seconds`
/// is only populated for throttled queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceError {
    pub kind: ServiceErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<u32>,
}

impl ServiceError {
    pub fn detail(&self) -> &str {
        &self.message
    }
}
