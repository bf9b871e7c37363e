use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
};
use serde::Deserialize;
use tracing::instrument;
use url::form_urlencoded;

use super::{error_block, format_date, format_time, or_else, page};
use crate::html::escape;
use crate::participants::{handlers::query_status, repo_types::Participant, services};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

impl SearchQuery {
    pub fn term(&self) -> &str {
        self.q.as_deref().unwrap_or("")
    }
}

/// Case-insensitive substring match on name, email, serial and Kick username.
pub fn matches_search(p: &Participant, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let term = term.to_lowercase();
    [
        Some(p.name.as_str()),
        Some(p.email.as_str()),
        Some(p.serial_number.as_str()),
        p.kick_username.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&term))
}

pub fn filter_participants<'a>(all: &'a [Participant], term: &str) -> Vec<&'a Participant> {
    all.iter().filter(|p| matches_search(p, term)).collect()
}

fn stats(all: &[Participant]) -> String {
    let with_kick = all
        .iter()
        .filter(|p| p.kick_username.as_deref().is_some_and(|k| !k.is_empty()))
        .count();
    // list is newest first
    let latest = all
        .first()
        .map(|p| format_date(p.created_at))
        .unwrap_or_else(|| "No entries yet".to_string());

    format!(
        r#"<section class="stats">
  <div><h3>Total Participants</h3><p>{total}</p></div>
  <div><h3>With Kick Username</h3><p>{with_kick}</p></div>
  <div><h3>Latest Entry</h3><p>{latest}</p></div>
</section>"#,
        total = all.len(),
    )
}

fn row(p: &Participant) -> String {
    let comments = p
        .comments
        .as_deref()
        .filter(|c| !c.is_empty())
        .map(|c| format!("\n  <p><strong>Comments:</strong> {}</p>", escape(c)))
        .unwrap_or_default();

    format!(
        r#"<article class="participant">
  <h2>{name}</h2>
  <p>{email} <code>{serial}</code></p>
  <p><strong>Phone:</strong> {phone}</p>
  <p><strong>Kick Username:</strong> {kick}</p>
  <p><strong>Entry Date:</strong> {date}</p>
  <p><strong>Entry Time:</strong> {time}</p>{comments}
</article>"#,
        name = escape(&p.name),
        email = escape(&p.email),
        serial = escape(&p.serial_number),
        phone = escape(or_else(p.phone.as_deref(), "Not provided")),
        kick = escape(or_else(p.kick_username.as_deref(), "Not provided")),
        date = format_date(p.created_at),
        time = format_time(p.created_at),
    )
}

fn search_bar(term: &str) -> String {
    let export = if term.is_empty() {
        "/admin/export.csv".to_string()
    } else {
        let q: String = form_urlencoded::byte_serialize(term.as_bytes()).collect();
        format!("/admin/export.csv?q={q}")
    };
    format!(
        r#"<form method="get" action="/admin">
  <input name="q" placeholder="Search participants..." value="{term}">
  <button type="submit">Search</button>
</form>
<p><a href="{export}" download>Export CSV</a></p>"#,
        term = escape(term),
        export = escape(&export),
    )
}

fn render(all: &[Participant], term: &str) -> String {
    let shown = filter_participants(all, term);
    let list = if shown.is_empty() {
        let empty = if term.is_empty() {
            "No participants yet."
        } else {
            "No participants found matching your search."
        };
        format!("<p class=\"empty\">{empty}</p>")
    } else {
        shown.into_iter().map(row).collect::<Vec<_>>().join("\n")
    };

    let body = format!(
        "<h1>Giveaway Admin Panel</h1>\n<p>Manage and view all giveaway participants</p>\n{}\n{}\n{}",
        stats(all),
        search_bar(term),
        list,
    );
    page("Giveaway Admin", &body)
}

fn render_error(message: &str) -> String {
    let body = format!(
        "<h1>Giveaway Admin Panel</h1>\n{}\n<p><a href=\"/admin\">Retry</a></p>",
        error_block(message)
    );
    page("Giveaway Admin", &body)
}

/// GET /admin?q=
#[instrument(skip(state))]
pub async fn admin_page(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> (StatusCode, Html<String>) {
    match services::list_all(&state).await {
        Ok(all) => (StatusCode::OK, Html(render(&all, query.term()))),
        Err(e) => (query_status(&e), Html(render_error(&e.to_string()))),
    }
}
