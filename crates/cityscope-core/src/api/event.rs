use serde::{Deserialize, Serialize};

/// Call name the backend uses when control is handed to another agent.
pub const HANDOFF_CALL_NAME: &str = "transfer_to_agent";

/// One decoded frame from the run stream.
///
/// Events carry more fields than the client consumes; unknown ones are
/// ignored rather than rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunEvent {
    #[serde(default)]
    pub id: String,
    pub author: String,
    #[serde(default)]
    pub content: Option<EventContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventContent {
    #[serde(default)]
    pub parts: Vec<EventPart>,
}

/// A content part is either a function call or a text payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPart {
    #[serde(default)]
    pub function_call: Option<FunctionCall>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

/// Body for `POST /run_stream`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
    pub new_message: NewMessage,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewMessage {
    pub parts: Vec<MessagePart>,
    pub role: String,
}

impl NewMessage {
    pub fn from_user_text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![MessagePart { text: text.into() }],
            role: "user".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessagePart {
    pub text: String,
}

/// Success body for `POST /sessions/{app}/{user}/{session}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: String,
    pub user_id: String,
}
