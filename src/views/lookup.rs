use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
};
use serde::Deserialize;
use tracing::instrument;

use super::{error_block, format_timestamp, or_else, page};
use crate::html::escape;
use crate::participants::{handlers::query_status, repo_types::Participant, services};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub serial: Option<String>,
}

fn participant_card(p: &Participant) -> String {
    let comments = p
        .comments
        .as_deref()
        .filter(|c| !c.is_empty())
        .map(|c| format!("<p><strong>Comments:</strong> {}</p>", escape(c)))
        .unwrap_or_default();

    format!(
        r#"<section class="participant">
  <h2>{name}</h2>
  <p><code>{serial}</code></p>
  <p><strong>Email:</strong> {email}</p>
  <p><strong>Phone:</strong> {phone}</p>
  <p><strong>Kick Username:</strong> {kick}</p>
  <p><strong>Entry Date:</strong> {created}</p>
  {comments}
</section>"#,
        name = escape(&p.name),
        serial = escape(&p.serial_number),
        email = escape(&p.email),
        phone = escape(or_else(p.phone.as_deref(), "Not provided")),
        kick = escape(or_else(p.kick_username.as_deref(), "Not provided")),
        created = format_timestamp(p.created_at),
    )
}

fn render(serial: &str, result: &str) -> String {
    let body = format!(
        r#"<h1>Participant Lookup</h1>
<p>Find participant information by serial number.</p>
<form method="get" action="/lookup">
  <label for="serial">Serial Number</label>
  <input id="serial" name="serial" placeholder="GW-123456-7890" value="{serial}">
  <button type="submit">Search</button>
</form>
{result}"#,
        serial = escape(serial),
    );
    page("Participant Lookup", &body)
}

/// GET /lookup?serial=
#[instrument(skip(state))]
pub async fn lookup_page(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> (StatusCode, Html<String>) {
    let Some(raw) = query.serial else {
        return (StatusCode::OK, Html(render("", "")));
    };

    let serial = raw.trim();
    if serial.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Html(render("", &error_block("Please enter a serial number"))),
        );
    }

    match services::get_by_serial(&state, serial).await {
        Ok(p) => (StatusCode::OK, Html(render(serial, &participant_card(&p)))),
        Err(e) => (
            query_status(&e),
            Html(render(serial, &error_block(&e.to_string()))),
        ),
    }
}
