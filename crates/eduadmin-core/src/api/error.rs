use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unexpected response code {actual:?} (expected {expected:?})")]
    UnexpectedCode { expected: &'static str, actual: String },
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error bodies from the backend usually look like `{ "code": ..., "message": ... }`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// The server's `message` field, or empty when the body has none.
    ///
    /// Raw bodies (HTML error pages, bare codes) only go to the log.
    fn body_message(body: &str) -> String {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_default()
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        debug!(status = status.as_u16(), body = %Self::truncate_body(body), "Error response");
        let message = Self::body_message(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(message),
            code => ApiError::Rejected { status: code, message },
        }
    }

    /// Human-readable message for toasts and error panels.
    ///
    /// Server-provided messages are shown as-is; anything without one
    /// (unexpected codes, transport failures, empty bodies) falls back to the
    /// generic localized message.
    pub fn user_message(&self, fallback: &str) -> String {
        let message = match self {
            ApiError::AccessDenied(m)
            | ApiError::NotFound(m)
            | ApiError::ServerError(m)
            | ApiError::Rejected { message: m, .. } => m.as_str(),
            _ => "",
        };
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_prefers_server_message() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, r#"{"code":"userNotFound","message":"Foydalanuvchi topilmadi"}"#);
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "Foydalanuvchi topilmadi"));
        assert_eq!(err.user_message("fallback"), "Foydalanuvchi topilmadi");
    }

    #[test]
    fn test_from_status_variants() {
        assert!(matches!(ApiError::from_status(StatusCode::UNAUTHORIZED, ""), ApiError::Unauthorized));
        assert!(matches!(ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""), ApiError::RateLimited));
        assert!(matches!(ApiError::from_status(StatusCode::BAD_GATEWAY, "oops"), ApiError::ServerError(_)));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"message":"Invalid data"}"#),
            ApiError::Rejected { status: 400, ref message } if message == "Invalid data"
        ));
    }

    #[test]
    fn test_user_message_falls_back() {
        let err = ApiError::UnexpectedCode {
            expected: "testsFetched",
            actual: "somethingElse".into(),
        };
        assert_eq!(err.user_message("Something went wrong"), "Something went wrong");
        assert_eq!(ApiError::ServerError(String::new()).user_message("generic"), "generic");
    }

    #[test]
    fn test_body_without_message_uses_fallback() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, r#"{"code":"userNotFound"}"#);
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.user_message("Nimadir xato ketdi"), "Nimadir xato ketdi");

        let err = ApiError::from_status(
            StatusCode::BAD_GATEWAY,
            "<html><body>502 Bad Gateway</body></html>",
        );
        assert!(matches!(err, ApiError::ServerError(_)));
        assert_eq!(err.user_message("Nimadir xato ketdi"), "Nimadir xato ketdi");
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 10);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.contains("truncated"));
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert_eq!(ApiError::truncate_body("short"), "short");
    }
}
