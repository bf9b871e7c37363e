use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use time::{macros::format_description, OffsetDateTime};
use tracing::instrument;

use super::admin::{filter_participants, SearchQuery};
use super::format_timestamp;
use crate::participants::{handlers::query_status, repo_types::Participant, services};
use crate::state::AppState;

const HEADER: &str = "Serial Number,Name,Email,Phone,Kick Username,Comments,Created At";

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// One header row, then one row per participant. `name` and `comments` are quoted.
pub fn participants_csv<'a, I>(participants: I) -> String
where
    I: IntoIterator<Item = &'a Participant>,
{
    let mut lines = vec![HEADER.to_string()];
    for p in participants {
        lines.push(
            [
                p.serial_number.clone(),
                quoted(&p.name),
                p.email.clone(),
                p.phone.clone().unwrap_or_default(),
                p.kick_username.clone().unwrap_or_default(),
                quoted(p.comments.as_deref().unwrap_or("")),
                format_timestamp(p.created_at),
            ]
            .join(","),
        );
    }
    lines.join("\n")
}

pub fn export_filename(today: OffsetDateTime) -> String {
    let date = today
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default();
    format!("giveaway-participants-{date}.csv")
}

/// GET /admin/export.csv?q=
#[instrument(skip(state))]
pub async fn export_csv(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Response {
    match services::list_all(&state).await {
        Ok(all) => {
            let csv = participants_csv(filter_participants(&all, query.term()));
            let disposition = format!(
                "attachment; filename=\"{}\"",
                export_filename(OffsetDateTime::now_utc())
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                csv,
            )
                .into_response()
        }
        Err(e) => (query_status(&e), e.to_string()).into_response(),
    }
}
