use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::SubscriptionId;

/// One subscription row as served by the remote service. Immutable once
/// fetched; a refresh replaces the whole collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub id: SubscriptionId,
    pub title: String,
    pub email: String,
    pub checked: bool,
    pub price_cents: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renews_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSubscriptionsResponse {
    pub items: Vec<SubscriptionRecord>,
}
