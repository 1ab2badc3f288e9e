use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::Identity,
    error::ServiceError,
    protocol::{ListSubscriptionsResponse, SubscriptionRecord},
};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

pub mod config;
pub mod ordering;
pub mod refresh_hub;
pub mod view_state;

pub use config::{load_settings, Settings};
pub use refresh_hub::{HubRegistration, RefreshHub};
pub use view_state::{column_specs, Column, ColumnSpec, PageView, SortDirection, ViewState};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("subscription service unreachable: {0}")]
    Transport(String),
    #[error("subscription service rejected the query ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected subscription payload: {0}")]
    Malformed(String),
}

/// Read boundary against the remote subscription service: one query scoped
/// to the given identity. Records come back in service order; ordering is
/// the store's concern.
#[async_trait]
pub trait SubscriptionProvider: Send + Sync {
    async fn fetch(&self, identity: &Identity) -> Result<Vec<SubscriptionRecord>, FetchError>;
}

pub struct MissingSubscriptionProvider;

#[async_trait]
impl SubscriptionProvider for MissingSubscriptionProvider {
    async fn fetch(&self, identity: &Identity) -> Result<Vec<SubscriptionRecord>, FetchError> {
        Err(FetchError::Transport(format!(
            "no subscription service configured for {}",
            identity.email
        )))
    }
}

pub struct HttpSubscriptionProvider {
    http: Client,
    service_url: String,
}

impl HttpSubscriptionProvider {
    pub fn new(service_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            service_url: service_url.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.service_url.clone())
    }
}

#[async_trait]
impl SubscriptionProvider for HttpSubscriptionProvider {
    async fn fetch(&self, identity: &Identity) -> Result<Vec<SubscriptionRecord>, FetchError> {
        let response = self
            .http
            .get(format!("{}/subscriptions", self.service_url))
            .query(&[("email", identity.email.as_str())])
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ServiceError>().await {
                Ok(envelope) => envelope.detail().to_string(),
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            };
            return Err(FetchError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: ListSubscriptionsResponse = response
            .json()
            .await
            .map_err(|err| FetchError::Malformed(err.to_string()))?;
        Ok(body.items)
    }
}

/// Toast/alert collaborator notified once per failed fetch. Rendering is
/// the host's concern.
pub trait FailureAlerts: Send + Sync {
    fn failure(&self, title: &str, description: &str);
}

pub struct SilentAlerts;

impl FailureAlerts for SilentAlerts {
    fn failure(&self, _title: &str, _description: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Uninitialized,
    Loading,
    Ready,
    Errored,
}

/// Read-only view of the current dataset.
#[derive(Debug, Clone)]
pub struct DatasetSnapshot {
    pub records: Vec<SubscriptionRecord>,
    pub status: LoadStatus,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum TableEvent {
    StatusChanged(LoadStatus),
    DatasetReplaced { record_count: usize },
    FetchFailed { message: String },
}

pub struct SubscriptionTable {
    provider: Arc<dyn SubscriptionProvider>,
    alerts: Arc<dyn FailureAlerts>,
    inner: Mutex<TableState>,
    events: broadcast::Sender<TableEvent>,
}

struct TableState {
    identity: Option<Identity>,
    records: Vec<SubscriptionRecord>,
    status: LoadStatus,
    last_error: Option<String>,
}

impl SubscriptionTable {
    pub fn new(provider: Arc<dyn SubscriptionProvider>) -> Arc<Self> {
        Self::new_with_alerts(provider, Arc::new(SilentAlerts))
    }

    pub fn new_with_alerts(
        provider: Arc<dyn SubscriptionProvider>,
        alerts: Arc<dyn FailureAlerts>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(1024);
        Arc::new(Self {
            provider,
            alerts,
            inner: Mutex::new(TableState {
                identity: None,
                records: Vec::new(),
                status: LoadStatus::Uninitialized,
                last_error: None,
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<TableEvent> {
        self.events.subscribe()
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.inner.lock().await.identity.clone()
    }

    pub async fn dataset(&self) -> DatasetSnapshot {
        let guard = self.inner.lock().await;
        DatasetSnapshot {
            records: guard.records.clone(),
            status: guard.status,
            error: guard.last_error.clone(),
        }
    }

    /// Replaces the signed-in identity. The current dataset is invalidated
    /// either way; a present identity is fetched immediately.
    pub async fn set_identity(&self, identity: Option<Identity>) {
        {
            let mut guard = self.inner.lock().await;
            guard.identity = identity.clone();
            guard.records.clear();
            guard.status = LoadStatus::Uninitialized;
            guard.last_error = None;
        }
        let _ = self
            .events
            .send(TableEvent::StatusChanged(LoadStatus::Uninitialized));

        if identity.is_some() {
            self.refresh().await;
        }
    }

    /// Fetches the subscription collection for the current identity and
    /// replaces the dataset wholesale. Absent identity is a no-op. Fetch
    /// failures are logged and surfaced through the alerts collaborator;
    /// they never propagate to the caller.
    pub async fn refresh(&self) {
        let identity = {
            let guard = self.inner.lock().await;
            match guard.identity.clone() {
                Some(identity) => identity,
                None => {
                    debug!("refresh skipped: no signed-in identity");
                    return;
                }
            }
        };

        {
            let mut guard = self.inner.lock().await;
            if guard.identity.as_ref() != Some(&identity) {
                return;
            }
            guard.status = LoadStatus::Loading;
        }
        let _ = self
            .events
            .send(TableEvent::StatusChanged(LoadStatus::Loading));

        match self.provider.fetch(&identity).await {
            Ok(records) => {
                let records = ordering::checked_first(records);
                let record_count = records.len();

                let mut guard = self.inner.lock().await;
                if guard.identity.as_ref() != Some(&identity) {
                    debug!(
                        email = %identity.email,
                        "discarding fetch result for superseded identity"
                    );
                    return;
                }
                guard.records = records;
                guard.status = LoadStatus::Ready;
                guard.last_error = None;
                drop(guard);

                info!(email = %identity.email, record_count, "subscription dataset replaced");
                let _ = self
                    .events
                    .send(TableEvent::DatasetReplaced { record_count });
                let _ = self.events.send(TableEvent::StatusChanged(LoadStatus::Ready));
            }
            Err(err) => {
                let mut guard = self.inner.lock().await;
                if guard.identity.as_ref() != Some(&identity) {
                    debug!(
                        email = %identity.email,
                        "discarding fetch failure for superseded identity"
                    );
                    return;
                }
                guard.records.clear();
                guard.status = LoadStatus::Errored;
                guard.last_error = Some(err.to_string());
                drop(guard);

                warn!(email = %identity.email, error = %err, "subscription fetch failed");
                self.alerts.failure(
                    "Failure",
                    "Something went wrong while fetching the subscription",
                );
                let _ = self.events.send(TableEvent::FetchFailed {
                    message: err.to_string(),
                });
                let _ = self
                    .events
                    .send(TableEvent::StatusChanged(LoadStatus::Errored));
            }
        }
    }

    /// Registers refresh handlers for both hub slots. Handlers hold the
    /// table weakly and re-read the current identity when fired, so an
    /// identity change never leaves a stale trigger behind. Dropping the
    /// returned registrations deregisters the handlers.
    ///
    /// Handlers spawn onto the ambient Tokio runtime; notify from within one.
    pub fn bind_refresh_triggers(
        self: &Arc<Self>,
        hub: &Arc<RefreshHub>,
    ) -> [HubRegistration; 2] {
        let on_updated = hub.register_on_updated(refresh_trigger(self));
        let on_added = hub.register_on_added(refresh_trigger(self));
        [on_updated, on_added]
    }
}

fn refresh_trigger(table: &Arc<SubscriptionTable>) -> impl Fn() + Send + Sync + 'static {
    let table = Arc::downgrade(table);
    move || {
        let Some(table) = table.upgrade() else {
            return;
        };
        tokio::spawn(async move { table.refresh().await });
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
