use std::error::Error as _;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{error, warn};

use super::form::AdmissionForm;
use super::service::{AdmissionService, SubmissionError};
use super::store::StudentStore;

pub const WELCOME_PAGE: &str =
    "<h1>Welcome to the Admission Server</h1><p>Use the API to submit or manage admissions.</p>";

pub const SUBMITTED_MESSAGE: &str = "Admission submitted successfully!";

/// Router builder exposing the welcome page, intake, and admin listing.
pub fn admission_router<S>(service: Arc<AdmissionService<S>>) -> Router
where
    S: StudentStore + 'static,
{
    Router::new()
        .route("/", get(home_handler))
        .route("/submit", post(submit_handler::<S>))
        .route("/admin", get(admin_handler::<S>))
        .with_state(service)
}

pub(crate) async fn home_handler() -> Html<&'static str> {
    Html(WELCOME_PAGE)
}

pub(crate) async fn submit_handler<S>(
    State(service): State<Arc<AdmissionService<S>>>,
    form: Result<AdmissionForm, SubmissionError>,
) -> Response
where
    S: StudentStore + 'static,
{
    let outcome = match form {
        Ok(form) => service.submit(form).await,
        Err(rejection) => Err(rejection),
    };

    match outcome {
        Ok(id) => {
            let payload = json!({
                "message": SUBMITTED_MESSAGE,
                "id": id,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => {
            let status = err.status(service.policy());
            if err.is_client_error() {
                warn!(error = %err, %status, "admission rejected");
            } else {
                error!(error = %err, cause = ?err.source(), %status, "admission failed");
            }
            error_response(status, &err)
        }
    }
}

pub(crate) async fn admin_handler<S>(State(service): State<Arc<AdmissionService<S>>>) -> Response
where
    S: StudentStore + 'static,
{
    match service.list().await {
        Ok(students) => (StatusCode::OK, Json(json!({ "students": students }))).into_response(),
        Err(err) => {
            error!(error = %err, cause = ?err.source(), "admission listing failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &err)
        }
    }
}

fn error_response(status: StatusCode, err: &dyn std::error::Error) -> Response {
    let payload = json!({
        "error": err.to_string(),
    });
    (status, Json(payload)).into_response()
}

/// Used when the form extractor runs outside [`submit_handler`]; no policy is known there.
impl IntoResponse for SubmissionError {
    fn into_response(self) -> Response {
        let status = self.status(Default::default());
        error_response(status, &self)
    }
}
