use std::sync::Arc;

use axum::http::StatusCode;
use tracing::{info, warn};

use super::domain::{NewStudent, StudentRecord};
use super::form::AdmissionForm;
use super::store::{StoreError, StudentStore};
use super::uploads::UploadSink;
use crate::config::ValidationPolicy;

/// Service composing the upload sink and the record store.
pub struct AdmissionService<S> {
    store: Arc<S>,
    uploads: UploadSink,
    policy: ValidationPolicy,
}

impl<S> AdmissionService<S>
where
    S: StudentStore + 'static,
{
    pub fn new(store: Arc<S>, uploads: UploadSink, policy: ValidationPolicy) -> Self {
        Self {
            store,
            uploads,
            policy,
        }
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// Validate a submitted form, store its photo, and insert the applicant.
    ///
    /// Field checks run first, so a submission missing a required field writes neither a photo
    /// nor a row. A photo written for a row the store then refuses is removed again.
    pub async fn submit(&self, mut form: AdmissionForm) -> Result<i64, SubmissionError> {
        let mut student = NewStudent::from_form(&form)?;

        if let Some(photo) = form.take_photo() {
            student.photo_path = self
                .uploads
                .accept(&photo)
                .await
                .map_err(SubmissionError::Upload)?;
        }

        let id = match self.store.insert(&student).await {
            Ok(id) => id,
            Err(err) => {
                if let Some(path) = student.photo_path.as_deref() {
                    if let Err(cleanup) = tokio::fs::remove_file(path).await {
                        warn!(path, error = %cleanup, "failed to remove orphaned photo");
                    }
                }
                return Err(err.into());
            }
        };
        info!(
            id,
            class = %student.class,
            has_photo = student.photo_path.is_some(),
            "admission recorded"
        );
        Ok(id)
    }

    /// Every stored admission.
    pub async fn list(&self) -> Result<Vec<StudentRecord>, StoreError> {
        self.store.list_all().await
    }
}

/// Error raised while handling a submission.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },
    #[error("malformed form body: {0}")]
    MalformedForm(String),
    #[error("failed to store uploaded photo")]
    Upload(#[source] std::io::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SubmissionError {
    /// True for failures caused by the request itself rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingField { .. } | Self::MalformedForm(_))
    }

    pub fn status(&self, policy: ValidationPolicy) -> StatusCode {
        match policy {
            ValidationPolicy::Strict if self.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
