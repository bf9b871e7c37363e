use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Participant record in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Participant {
    pub id: i64,
    pub serial_number: String, // not unique
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub kick_username: Option<String>,
    pub comments: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Row to insert; `id` and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewParticipant {
    pub serial_number: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub kick_username: Option<String>,
    pub comments: Option<String>,
}
