use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::api::form_endpoint::{FormEndpoint, HttpFormEndpoint};
use crate::config::LandingConfig;
use crate::error::WaitlistError;
use crate::models::waitlist_models::{iso_timestamp, FormSubmission, WaitlistEntry};
use crate::repositories::local_storage::{FileStorage, LocalStorage};
use crate::repositories::waitlist_repository::WaitlistRepository;

/// What happened on the remote side of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteDelivery {
    /// No endpoint configured; local storage is the record.
    NotConfigured,
    Accepted,
    Rejected { status: u16 },
    /// The request never completed. The local entry stands in for it.
    Unreachable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub entry: WaitlistEntry,
    pub remote: RemoteDelivery,
}

impl SubmissionReceipt {
    /// Whether the page should show the confirmed state.
    ///
    /// Only an endpoint that answered with a non-success status counts as a
    /// failure. An unreachable endpoint still reports success because the
    /// entry is already stored locally; check `remote` to tell the two apart.
    pub fn success(&self) -> bool {
        !matches!(self.remote, RemoteDelivery::Rejected { .. })
    }

    pub fn confirmed_remotely(&self) -> bool {
        self.remote == RemoteDelivery::Accepted
    }
}

type Now = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Saves waitlist signups locally and forwards them to the form endpoint.
pub struct WaitlistService {
    repository: WaitlistRepository,
    endpoint: Option<Arc<dyn FormEndpoint>>,
    now: Now,
}

impl WaitlistService {
    pub fn new(storage: Arc<dyn LocalStorage>, endpoint: Option<Arc<dyn FormEndpoint>>) -> Self {
        Self {
            repository: WaitlistRepository::new(storage),
            endpoint,
            now: Arc::new(Utc::now),
        }
    }

    /// File-backed storage under `storage_dir`, plus the HTTP endpoint when one is set.
    pub fn from_config(config: &LandingConfig) -> Result<Self, WaitlistError> {
        let storage: Arc<dyn LocalStorage> = Arc::new(FileStorage::new(&config.storage_dir));
        let endpoint: Option<Arc<dyn FormEndpoint>> = match (&config.form_endpoint, config.request_timeout) {
            (Some(url), Some(timeout)) => Some(Arc::new(HttpFormEndpoint::with_timeout(url.clone(), timeout)?)),
            (Some(url), None) => Some(Arc::new(HttpFormEndpoint::new(url.clone()))),
            (None, _) => None,
        };
        tracing::info!(
            "Waitlist stored in {}, form endpoint {}",
            config.storage_dir.display(),
            config.form_endpoint.as_deref().unwrap_or("not configured")
        );
        Ok(Self::new(storage, endpoint))
    }

    /// Replaces the time source used for entry timestamps.
    pub fn with_clock<F>(mut self, now: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.now = Arc::new(now);
        self
    }

    pub fn repository(&self) -> &WaitlistRepository {
        &self.repository
    }

    pub fn entries(&self) -> Vec<WaitlistEntry> {
        self.repository.entries()
    }

    /// Stores `email` locally, then tries the remote endpoint once.
    ///
    /// The email is expected to be validated already. Errors only come from
    /// the local write; in that case the endpoint is not contacted.
    pub async fn submit(&self, email: &str) -> Result<SubmissionReceipt, WaitlistError> {
        let entry = WaitlistEntry {
            email: email.to_string(),
            timestamp: iso_timestamp((self.now)()),
        };

        let count = self.repository.append(&entry)?;
        tracing::debug!("Saved waitlist entry locally ({} total)", count);

        let Some(endpoint) = &self.endpoint else {
            return Ok(SubmissionReceipt {
                entry,
                remote: RemoteDelivery::NotConfigured,
            });
        };

        let remote = match endpoint.submit(&FormSubmission::from_entry(&entry)).await {
            Ok(status) if (200..300).contains(&status) => RemoteDelivery::Accepted,
            Ok(status) => RemoteDelivery::Rejected { status },
            Err(e) => {
                tracing::warn!("{}, email saved to local storage", e);
                RemoteDelivery::Unreachable
            }
        };

        Ok(SubmissionReceipt { entry, remote })
    }
}
