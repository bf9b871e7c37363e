use serde::{Deserialize, Serialize};

use super::repo_types::NewParticipant;

/// Fields an entrant submits. Used for both the JSON body and the HTML form.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub kick_username: Option<String>,
    pub comments: Option<String>,
}

impl SubmissionForm {
    pub fn into_entry(self, serial_number: String) -> NewParticipant {
        NewParticipant {
            serial_number,
            name: self.name,
            email: self.email,
            phone: self.phone,
            kick_username: self.kick_username,
            comments: self.comments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmitResponse {
    pub fn accepted(serial_number: String) -> Self {
        Self {
            success: true,
            serial_number: Some(serial_number),
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            serial_number: None,
            error: Some(error.into()),
        }
    }
}

/// `{success, data, error}` wrapper returned by the read operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
