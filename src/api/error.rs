use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - please log in again")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Extract a human-readable message from a JSON error body.
    /// The backend is inconsistent about the field it uses (`error`,
    /// `status` or `detail`), so all three are tried before falling back
    /// to the raw (truncated) body.
    fn extract_message(body: &str) -> String {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
            for key in ["error", "status", "detail"] {
                if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                    return msg.to_string();
                }
            }
        }
        Self::truncate_body(body)
    }

    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::extract_message(body);
        match status.as_u16() {
            400 => ApiError::BadRequest(message),
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            500..=599 => ApiError::ServerError(message),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, message)),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_message_extracted_from_error_field() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, r#"{"error":"group not found"}"#);
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "group not found"));
    }

    #[test]
    fn test_message_extracted_from_status_field() {
        let err =
            ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"status":"group already exists"}"#);
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == "group already exists"));
    }

    #[test]
    fn test_message_extracted_from_detail_field() {
        let err = ApiError::from_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"detail":"database unavailable"}"#,
        );
        assert!(matches!(err, ApiError::ServerError(ref m) if m == "database unavailable"));
    }

    #[test]
    fn test_non_json_body_is_kept_verbatim() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, "plain text");
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == "plain text"));
    }

    #[test]
    fn test_unauthorized_discards_body() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"detail":"expired"}"#);
        assert!(err.is_unauthorized());
    }
}
