use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{EmailError, WaitlistError};
use crate::handlers::waitlist_handlers::{SubmissionReceipt, WaitlistService};
use crate::utils::email_utils::normalize_email;

/// What the page shows around the signup form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    /// A submission is in flight; the submit button is disabled.
    pub loading: bool,
    pub submitted: bool,
    pub submitted_email: Option<String>,
}

#[derive(Debug)]
pub enum FormOutcome {
    /// Saved and confirmed for the visitor.
    Submitted(SubmissionReceipt),
    /// Saved locally but the endpoint turned it down; the form stays open.
    NotConfirmed(SubmissionReceipt),
    Invalid(EmailError),
    /// Another submission is still running.
    Busy,
    Failed(WaitlistError),
}

/// Signup form controller shared by every email form on the page.
pub struct WaitlistForm {
    service: Arc<WaitlistService>,
    state: Arc<Mutex<FormState>>,
}

fn lock(state: &Mutex<FormState>) -> MutexGuard<'_, FormState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears `loading` however the submission ends, including when the caller
/// drops the future mid-request.
struct LoadingGuard {
    state: Arc<Mutex<FormState>>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        lock(&self.state).loading = false;
    }
}

impl WaitlistForm {
    pub fn new(service: Arc<WaitlistService>) -> Self {
        Self {
            service,
            state: Arc::new(Mutex::new(FormState::default())),
        }
    }

    pub fn state(&self) -> FormState {
        lock(&self.state).clone()
    }

    pub async fn handle_submit(&self, raw_email: &str) -> FormOutcome {
        let email = match normalize_email(raw_email) {
            Ok(email) => email,
            Err(e) => return FormOutcome::Invalid(e),
        };

        let _loading = {
            let mut state = lock(&self.state);
            if state.loading {
                return FormOutcome::Busy;
            }
            state.loading = true;
            LoadingGuard {
                state: self.state.clone(),
            }
        };

        match self.service.submit(&email).await {
            Ok(receipt) if receipt.success() => {
                let mut state = lock(&self.state);
                state.submitted = true;
                state.submitted_email = Some(email);
                FormOutcome::Submitted(receipt)
            }
            Ok(receipt) => {
                tracing::info!("Waitlist signup saved locally but not confirmed: {:?}", receipt.remote);
                FormOutcome::NotConfirmed(receipt)
            }
            Err(e) => {
                tracing::error!("Failed to save waitlist signup: {}", e);
                FormOutcome::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::form_endpoint::{FormEndpoint, MockFormEndpoint};
    use crate::repositories::local_storage::MemoryStorage;
    use std::time::Duration;

    fn local_form() -> WaitlistForm {
        let service = WaitlistService::new(Arc::new(MemoryStorage::new()), None);
        WaitlistForm::new(Arc::new(service))
    }

    #[tokio::test]
    async fn successful_submit_marks_form_submitted() {
        let form = local_form();
        let outcome = form.handle_submit(" buyer@example.com ").await;

        assert!(matches!(outcome, FormOutcome::Submitted(_)));
        assert_eq!(
            form.state(),
            FormState {
                loading: false,
                submitted: true,
                submitted_email: Some("buyer@example.com".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let service = Arc::new(WaitlistService::new(storage, None));
        let form = WaitlistForm::new(service.clone());

        assert!(matches!(form.handle_submit("").await, FormOutcome::Invalid(EmailError::Empty)));
        assert!(matches!(form.handle_submit("buyer").await, FormOutcome::Invalid(EmailError::Malformed(_))));
        assert!(service.entries().is_empty());
        assert_eq!(form.state(), FormState::default());
    }

    #[tokio::test]
    async fn rejected_submit_leaves_form_open() {
        let mut endpoint = MockFormEndpoint::new();
        endpoint.expect_submit().returning(|_| Ok(500));
        let endpoint: Arc<dyn FormEndpoint> = Arc::new(endpoint);
        let service = WaitlistService::new(Arc::new(MemoryStorage::new()), Some(endpoint));
        let form = WaitlistForm::new(Arc::new(service));

        let outcome = form.handle_submit("buyer@example.com").await;
        assert!(matches!(outcome, FormOutcome::NotConfirmed(_)));
        assert!(!form.state().submitted);
        assert!(!form.state().loading);
    }

    #[tokio::test]
    async fn storage_failure_is_reported() {
        let service = WaitlistService::new(Arc::new(MemoryStorage::with_quota(2)), None);
        let form = WaitlistForm::new(Arc::new(service));
        assert!(matches!(
            form.handle_submit("buyer@example.com").await,
            FormOutcome::Failed(WaitlistError::Storage(_))
        ));
        assert!(!form.state().loading);
    }

    struct SlowEndpoint;

    #[async_trait::async_trait]
    impl FormEndpoint for SlowEndpoint {
        async fn submit(&self, _: &crate::models::waitlist_models::FormSubmission) -> Result<u16, crate::error::RemoteError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(200)
        }
    }

    #[tokio::test]
    async fn overlapping_submit_is_busy_and_dropped_submit_clears_loading() {
        let endpoint: Arc<dyn FormEndpoint> = Arc::new(SlowEndpoint);
        let service = WaitlistService::new(Arc::new(MemoryStorage::new()), Some(endpoint));
        let form = WaitlistForm::new(Arc::new(service));

        let first = form.handle_submit("first@example.com");
        let second = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            form.handle_submit("second@example.com").await
        };
        let (first, second) = tokio::join!(first, second);
        assert!(matches!(first, FormOutcome::Submitted(_)));
        assert!(matches!(second, FormOutcome::Busy));

        // Abandon a submission mid-request
        let abandoned = tokio::time::timeout(Duration::from_millis(20), form.handle_submit("third@example.com")).await;
        assert!(abandoned.is_err());
        assert!(!form.state().loading);
    }
}
