use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{instrument, warn};

use super::dto::{Envelope, SubmissionForm, SubmitResponse};
use super::repo_types::Participant;
use super::services::{self, QueryError, SubmitError};
use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/participants", get(list_participants).post(create_participant))
        .route("/participants/:serial", get(get_participant))
}

pub(crate) fn submit_status(e: &SubmitError) -> StatusCode {
    match e {
        SubmitError::Validation => StatusCode::BAD_REQUEST,
        SubmitError::Email(_) => StatusCode::BAD_GATEWAY,
    }
}

pub(crate) fn query_status(e: &QueryError) -> StatusCode {
    match e {
        QueryError::NotInitialized => StatusCode::SERVICE_UNAVAILABLE,
        QueryError::NotFound => StatusCode::NOT_FOUND,
        QueryError::ListFailed(_) | QueryError::LookupFailed(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn query_reply<T>(result: Result<T, QueryError>) -> (StatusCode, Json<Envelope<T>>) {
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) => query_status(e),
    };
    (status, Json(result.into()))
}

/// POST /participants. An unreadable body is answered with the same envelope as
/// a validation failure.
#[instrument(skip(state, payload))]
pub async fn create_participant(
    State(state): State<AppState>,
    payload: Result<Json<SubmissionForm>, JsonRejection>,
) -> (StatusCode, Json<SubmitResponse>) {
    let Json(form) = match payload {
        Ok(form) => form,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "malformed submission body");
            return (
                StatusCode::BAD_REQUEST,
                Json(SubmitResponse::rejected(rejection.body_text())),
            );
        }
    };
    let result = services::submit(&state, form).await;
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) => submit_status(e),
    };
    (status, Json(result.into()))
}

/// GET /participants, newest first
#[instrument(skip(state))]
pub async fn list_participants(
    State(state): State<AppState>,
) -> (StatusCode, Json<Envelope<Vec<Participant>>>) {
    query_reply(services::list_all(&state).await)
}

/// GET /participants/:serial
#[instrument(skip(state))]
pub async fn get_participant(
    State(state): State<AppState>,
    Path(serial): Path<String>,
) -> (StatusCode, Json<Envelope<Participant>>) {
    query_reply(services::get_by_serial(&state, &serial).await)
}
