use axum::{extract::State, http::StatusCode, response::Html, Form};
use tracing::instrument;

use super::{error_block, page};
use crate::html::escape;
use crate::participants::{dto::SubmissionForm, handlers::submit_status, services};
use crate::state::AppState;

fn render_form(values: &SubmissionForm, error: Option<&str>) -> String {
    let field = |v: Option<&String>| escape(v.map(String::as_str).unwrap_or(""));
    let error = error.map(error_block).unwrap_or_default();

    let body = format!(
        r#"<h1>Enter the giveaway</h1>
<p>Fill in your details to receive your serial number.</p>
{error}
<form method="post" action="/">
  <label for="name">Name *</label>
  <input id="name" name="name" required value="{name}">
  <label for="email">Email *</label>
  <input id="email" name="email" type="email" required value="{email}">
  <label for="phone">Phone</label>
  <input id="phone" name="phone" type="tel" value="{phone}">
  <label for="kickUsername">Kick username</label>
  <input id="kickUsername" name="kickUsername" value="{kick}">
  <label for="comments">Comments</label>
  <textarea id="comments" name="comments">{comments}</textarea>
  <button type="submit">Enter giveaway</button>
</form>"#,
        name = escape(&values.name),
        email = escape(&values.email),
        phone = field(values.phone.as_ref()),
        kick = field(values.kick_username.as_ref()),
        comments = field(values.comments.as_ref()),
    );
    page("Giveaway", &body)
}

fn render_confirmation(serial: &str) -> String {
    let body = format!(
        r#"<h1>You're in!</h1>
<p>Your serial number</p>
<p><code class="serial">{serial}</code></p>
<p>Save this number - you'll need it to claim your prize!</p>
<p>Thank you for participating in our giveaway! Winners will be announced soon.</p>"#,
        serial = escape(serial),
    );
    page("Entry confirmed", &body)
}

/// GET /
pub async fn show_form() -> Html<String> {
    Html(render_form(&SubmissionForm::default(), None))
}

/// POST /
#[instrument(skip(state, form))]
pub async fn submit_form(
    State(state): State<AppState>,
    Form(form): Form<SubmissionForm>,
) -> (StatusCode, Html<String>) {
    match services::submit(&state, form.clone()).await {
        Ok(serial) => (StatusCode::OK, Html(render_confirmation(&serial))),
        Err(e) => (
            submit_status(&e),
            Html(render_form(&form, Some(&e.to_string()))),
        ),
    }
}
