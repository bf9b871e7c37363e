use tracing::{error, info, instrument, warn};

use super::dto::{Envelope, SubmissionForm, SubmitResponse};
use super::repo::StoreError;
use super::repo_types::Participant;
use crate::mailer::{notify_entry, MailError};
use crate::serial;
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Name and Email are required.")]
    Validation,
    #[error("Email service error.")]
    Email(#[source] MailError),
}

/// Read failures, displayed with their user-facing text.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Participant store not initialized.")]
    NotInitialized,
    #[error("Participant not found.")]
    NotFound,
    #[error("Failed to fetch participants.")]
    ListFailed(#[source] StoreError),
    #[error("Error fetching participant.")]
    LookupFailed(#[source] StoreError),
}

/// Validates, issues a serial, notifies the operator, then stores the entry.
///
/// The notification decides the outcome. The insert is best effort: a failed
/// or skipped write is logged and the serial is still returned.
#[instrument(skip(state, form))]
pub async fn submit(state: &AppState, form: SubmissionForm) -> Result<String, SubmitError> {
    if form.name.is_empty() || form.email.is_empty() {
        warn!("submission missing name or email");
        return Err(SubmitError::Validation);
    }

    let entry = form.into_entry(serial::generate());

    if let Err(e) = notify_entry(state.mailer.as_ref(), &state.config.mail, &entry).await {
        error!(error = %e, serial = %entry.serial_number, "notification failed");
        return Err(SubmitError::Email(e));
    }

    if let Err(e) = state.store.insert(&entry).await {
        warn!(error = %e, serial = %entry.serial_number, "insert failed; entry not persisted");
    }

    info!(serial = %entry.serial_number, "entry accepted");
    Ok(entry.serial_number)
}

#[instrument(skip(state))]
pub async fn list_all(state: &AppState) -> Result<Vec<Participant>, QueryError> {
    state.store.list_all().await.map_err(|e| match e {
        StoreError::NotInitialized => QueryError::NotInitialized,
        e => {
            error!(error = %e, "failed to fetch participants");
            QueryError::ListFailed(e)
        }
    })
}

#[instrument(skip(state))]
pub async fn get_by_serial(state: &AppState, serial: &str) -> Result<Participant, QueryError> {
    state.store.get_by_serial(serial).await.map_err(|e| match e {
        StoreError::NotInitialized => QueryError::NotInitialized,
        StoreError::NotFound => QueryError::NotFound,
        e => {
            error!(error = %e, %serial, "failed to fetch participant");
            QueryError::LookupFailed(e)
        }
    })
}

impl From<Result<String, SubmitError>> for SubmitResponse {
    fn from(result: Result<String, SubmitError>) -> Self {
        match result {
            Ok(serial) => SubmitResponse::accepted(serial),
            Err(e) => SubmitResponse::rejected(e.to_string()),
        }
    }
}

impl<T> From<Result<T, QueryError>> for Envelope<T> {
    fn from(result: Result<T, QueryError>) -> Self {
        match result {
            Ok(data) => Envelope::ok(data),
            Err(e) => Envelope::err(e.to_string()),
        }
    }
}

#[cfg(test)]
mod services_tests {
    use std::sync::{atomic::Ordering, Arc};

    use regex::Regex;

    use super::*;
    use crate::participants::repo::{ParticipantStore, PreviewStore};
    use crate::participants::repo_types::NewParticipant;
    use crate::state::testing::{state_with, BrokenStore, MemoryStore, RecordingMailer};

    fn ada() -> SubmissionForm {
        SubmissionForm {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            ..SubmissionForm::default()
        }
    }

    fn seed_entry(serial: &str, name: &str) -> NewParticipant {
        NewParticipant {
            serial_number: serial.into(),
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            kick_username: None,
            comments: None,
        }
    }

    #[tokio::test]
    async fn missing_name_or_email_makes_no_calls() {
        let store = Arc::new(MemoryStore::default());
        let mailer = Arc::new(RecordingMailer::default());
        let state = state_with(store.clone(), mailer.clone());

        for form in [
            SubmissionForm { name: String::new(), ..ada() },
            SubmissionForm { email: String::new(), ..ada() },
            SubmissionForm::default(),
        ] {
            let res: SubmitResponse = submit(&state, form).await.into();
            assert_eq!(res, SubmitResponse::rejected("Name and Email are required."));
        }
        assert_eq!(mailer.count(), 0);
        assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failing_notification_returns_no_serial_and_skips_store() {
        let store = Arc::new(MemoryStore::default());
        let state = state_with(store.clone(), Arc::new(RecordingMailer::failing()));

        let res: SubmitResponse = submit(&state, ada()).await.into();
        assert_eq!(
            res,
            SubmitResponse {
                success: false,
                serial_number: None,
                error: Some("Email service error.".into()),
            }
        );
        assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_submission_notifies_and_stores() {
        let store = Arc::new(MemoryStore::default());
        let mailer = Arc::new(RecordingMailer::default());
        let state = state_with(store.clone(), mailer.clone());

        let serial = submit(&state, ada()).await.unwrap();
        assert!(Regex::new(r"^GW-\d{6}-\d{4}$").unwrap().is_match(&serial));

        let sent = mailer.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["ops@example.org".to_string()]);
        assert!(sent[0].html.contains(&serial));

        let stored = store.get_by_serial(&serial).await.unwrap();
        assert_eq!(stored.name, "Ada");
        assert_eq!(stored.email, "ada@example.com");
    }

    #[tokio::test]
    async fn store_outcome_never_changes_success() {
        let failing = Arc::new(MemoryStore::failing_writes());
        let state = state_with(failing.clone(), Arc::new(RecordingMailer::default()));
        let res: SubmitResponse = submit(&state, ada()).await.into();
        assert!(res.success);
        assert!(res.serial_number.is_some());
        assert_eq!(failing.inserts.load(Ordering::SeqCst), 1);
        assert_eq!(failing.len(), 0);

        let preview = state_with(Arc::new(PreviewStore), Arc::new(RecordingMailer::default()));
        let res: SubmitResponse = submit(&preview, ada()).await.into();
        assert!(res.success);
        assert!(res.serial_number.is_some());
    }

    #[tokio::test]
    async fn unknown_serial_is_not_found() {
        let store = Arc::new(MemoryStore::default());
        store.seed(seed_entry("GW-111111-1111", "Ada"));
        let state = state_with(store, Arc::new(RecordingMailer::default()));

        let env: Envelope<Participant> = get_by_serial(&state, "GW-999999-9999").await.into();
        assert_eq!(env, Envelope::err("Participant not found."));
    }

    #[tokio::test]
    async fn lookup_is_exact_and_case_sensitive() {
        let store = Arc::new(MemoryStore::default());
        store.seed(seed_entry("GW-111111-1111", "Ada"));
        let state = state_with(store, Arc::new(RecordingMailer::default()));

        assert!(get_by_serial(&state, "GW-111111-1111").await.is_ok());
        assert!(matches!(
            get_by_serial(&state, "gw-111111-1111").await,
            Err(QueryError::NotFound)
        ));
        assert!(matches!(
            get_by_serial(&state, " GW-111111-1111").await,
            Err(QueryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn duplicate_serial_lookup_returns_newest_row() {
        let store = Arc::new(MemoryStore::default());
        let older = store.seed(seed_entry("GW-424242-4242", "Ada"));
        let newer = store.seed(seed_entry("GW-424242-4242", "Grace"));
        assert!(newer.created_at > older.created_at);
        let state = state_with(store, Arc::new(RecordingMailer::default()));

        let found = get_by_serial(&state, "GW-424242-4242").await.unwrap();
        assert_eq!(found, newer);

        let all = list_all(&state).await.unwrap();
        assert_eq!(all, vec![newer, older]);
    }

    #[tokio::test]
    async fn unconfigured_store_reads_are_not_initialized() {
        let state = state_with(Arc::new(PreviewStore), Arc::new(RecordingMailer::default()));

        let one: Envelope<Participant> = get_by_serial(&state, "GW-111111-1111").await.into();
        assert_eq!(one.error.as_deref(), Some("Participant store not initialized."));
        assert_ne!(one.error.as_deref(), Some("Participant not found."));

        let all: Envelope<Vec<Participant>> = list_all(&state).await.into();
        assert_eq!(all, Envelope::err("Participant store not initialized."));
    }

    #[tokio::test]
    async fn database_errors_use_generic_messages() {
        let state = state_with(Arc::new(BrokenStore), Arc::new(RecordingMailer::default()));

        let all: Envelope<Vec<Participant>> = list_all(&state).await.into();
        assert_eq!(all.error.as_deref(), Some("Failed to fetch participants."));

        let one: Envelope<Participant> = get_by_serial(&state, "GW-111111-1111").await.into();
        assert_eq!(one.error.as_deref(), Some("Error fetching participant."));
    }

    #[tokio::test]
    async fn list_is_newest_first_and_stable() {
        let store = Arc::new(MemoryStore::default());
        for (i, name) in ["Ada", "Grace", "Linus", "Barbara"].iter().enumerate() {
            store.seed(seed_entry(&format!("GW-00000{i}-0000"), name));
        }
        let state = state_with(store, Arc::new(RecordingMailer::default()));

        let first = list_all(&state).await.unwrap();
        assert_eq!(first.len(), 4);
        assert_eq!(first[0].name, "Barbara");
        for pair in first.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }

        let second = list_all(&state).await.unwrap();
        assert_eq!(first, second);
    }
}
