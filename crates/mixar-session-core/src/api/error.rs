use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    /// The backend rejected a login, signup or OAuth exchange.
    /// Displays exactly the backend-supplied message.
    #[error("{0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Backend did not return a Google login URL")]
    MissingOAuthUrl,

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

/// Maximum length for response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl SessionError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let cut = (0..=MAX_ERROR_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
    }

    /// Build an authentication failure from a raw error body.
    pub fn rejected(body: &str, fallback: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|value| detail_message(&value));
        SessionError::Authentication(message.unwrap_or_else(|| fallback.to_string()))
    }

    /// Like [`SessionError::rejected`], additionally accepting a top-level
    /// `message` field once `detail` yields nothing.
    pub fn rejected_with_message(body: &str, fallback: &str) -> Self {
        let message = serde_json::from_str::<Value>(body).ok().and_then(|value| {
            detail_message(&value).or_else(|| value.get("message").and_then(truthy_text))
        });
        SessionError::Authentication(message.unwrap_or_else(|| fallback.to_string()))
    }
}

/// Extract the message from a `{detail: string | {message: string}}` body:
/// `detail.message` first, then `detail` itself.
pub fn detail_message(body: &Value) -> Option<String> {
    let detail = body.get("detail")?;
    detail
        .get("message")
        .and_then(truthy_text)
        .or_else(|| truthy_text(detail))
}

/// Text for a JSON value the backend considers "set": null, false, zero and
/// empty strings count as absent.
fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}
