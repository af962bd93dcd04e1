use async_trait::async_trait;
use reqwest::{StatusCode, header};
use url::Url;

use crate::api::RunTransport;
use crate::api::error::ApiError;
use crate::api::event::{NewMessage, RunRequest, SessionResponse};
use crate::api::sse::{FrameStream, decode_frames};
use crate::session::Session;

/// HTTP client for the multi-agent backend.
#[derive(Debug, Clone)]
pub struct AgentClient {
    http_client: reqwest::Client,
    base_url: Url,
    app_name: String,
}

impl AgentClient {
    pub fn new(base_url: Url, app_name: impl Into<String>) -> Result<Self, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            base_url: ensure_trailing_slash(base_url),
            app_name: app_name.into(),
        })
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidRequest {
                details: format!("invalid endpoint {path}: {e}"),
            })
    }
}

// `Url::join` treats a base without a trailing slash as a file and
// replaces the last segment.
fn ensure_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        url.set_path(&format!("{}/", url.path()));
    }
    url
}

#[async_trait]
impl RunTransport for AgentClient {
    async fn create_session(&self, user_id: &str, session_id: &str) -> Result<Session, ApiError> {
        let url = self.endpoint(&format!(
            "sessions/{}/{user_id}/{session_id}",
            self.app_name
        ))?;

        let response = self
            .http_client
            .post(url)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let created: SessionResponse =
                response
                    .json()
                    .await
                    .map_err(|e| ApiError::ResponseParsing {
                        details: e.to_string(),
                    })?;
            return Ok(Session {
                id: created.id,
                user_id: created.user_id,
            });
        }

        let error_text = response.text().await?;
        if error_body_message(&error_text).contains("already exists") {
            return Err(ApiError::SessionConflict {
                details: error_text,
            });
        }

        Err(map_status_error(status, error_text))
    }

    async fn open_run(&self, session: &Session, query: &str) -> Result<FrameStream, ApiError> {
        let request = RunRequest {
            app_name: self.app_name.clone(),
            user_id: session.user_id.clone(),
            session_id: session.id.clone(),
            new_message: NewMessage::from_user_text(query),
        };

        let response = self
            .http_client
            .post(self.endpoint("run_stream")?)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(map_status_error(status, error_text));
        }

        Ok(decode_frames(response.bytes_stream()))
    }
}

/// Pulls the human-readable message out of an error body, falling back to
/// the raw text when the body is not the expected JSON shape.
fn error_body_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "detail", "error"]
                .iter()
                .find_map(|key| value.get(key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.to_string())
}

fn map_status_error(status: StatusCode, details: String) -> ApiError {
    match status.as_u16() {
        401 | 403 => ApiError::Authentication { details },
        400..=499 => ApiError::InvalidRequest { details },
        500..=599 => ApiError::ServerError {
            status_code: status.as_u16(),
            details,
        },
        _ => ApiError::Unknown { details },
    }
}
