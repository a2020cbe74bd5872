use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;

use crate::error::{RemoteError, WaitlistError};
use crate::models::waitlist_models::FormSubmission;

/// Remote collector for waitlist signups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FormEndpoint: Send + Sync {
    /// Sends one submission and returns the HTTP status of the answer.
    /// `Err` means no response arrived at all.
    async fn submit(&self, submission: &FormSubmission) -> Result<u16, RemoteError>;
}

/// JSON-over-HTTP form endpoint.
pub struct HttpFormEndpoint {
    client: Client,
    url: String,
}

impl HttpFormEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, WaitlistError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WaitlistError::Client(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FormEndpoint for HttpFormEndpoint {
    async fn submit(&self, submission: &FormSubmission) -> Result<u16, RemoteError> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(submission)
            .send()
            .await
            .map_err(|e| RemoteError::Unreachable(e.to_string()))?;

        // Body is ignored, only the status matters
        let status = response.status();
        if !status.is_success() {
            tracing::info!("Form endpoint {} answered {}", self.url, status);
        }
        Ok(status.as_u16())
    }
}
