use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application error types
///
/// The pricing engine itself never constructs one of these: every numeric
/// edge case inside the computation maps to a fallback value instead. Errors
/// only arise at the edges (catalog mutations, configuration, the advice
/// service).
#[derive(Debug)]
pub enum AppError {
    /// Configuration error
    ConfigError(String),
    /// Invalid user input (empty name, malformed payload)
    Validation(String),
    /// Material id not present in the catalog
    MaterialNotFound(String),
    /// Cost row id not present in the product configuration
    RowNotFound(String),
    /// Material name already taken (case-insensitive)
    DuplicateMaterial(String),
    /// Advice generation is not configured
    AdvisorDisabled(String),
    /// Advice requested again before the client-side cooldown elapsed
    AdviceCooldown(String),
    /// Upstream advice API returned a non-success status
    UpstreamError { status: StatusCode, message: String },
    /// HTTP request error (preserves reqwest::Error for diagnostics)
    HttpRequest(reqwest::Error),
    /// Internal server error
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::Validation(msg) => write!(f, "Validation error: {}", msg),
            Self::MaterialNotFound(msg) => write!(f, "Material not found: {}", msg),
            Self::RowNotFound(msg) => write!(f, "Row not found: {}", msg),
            Self::DuplicateMaterial(msg) => write!(f, "Duplicate material: {}", msg),
            Self::AdvisorDisabled(msg) => write!(f, "Advisor disabled: {}", msg),
            Self::AdviceCooldown(msg) => write!(f, "Advice cooldown: {}", msg),
            Self::UpstreamError { status, message } => {
                write!(f, "Upstream error ({}): {}", status, message)
            }
            Self::HttpRequest(err) => write!(f, "HTTP request error: {}", err),
            Self::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::ConfigError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::MaterialNotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::RowNotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::DuplicateMaterial(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::AdvisorDisabled(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            Self::AdviceCooldown(msg) => (StatusCode::TOO_MANY_REQUESTS, msg.clone()),
            Self::UpstreamError { status, message } => (*status, message.clone()),
            Self::HttpRequest(err) => (StatusCode::BAD_GATEWAY, err.to_string()),
            Self::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": error_type_name(&self),
            }
        }));

        (status, body).into_response()
    }
}

fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::ConfigError(_) => "config_error",
        AppError::Validation(_) => "validation_error",
        AppError::MaterialNotFound(_) => "material_not_found",
        AppError::RowNotFound(_) => "row_not_found",
        AppError::DuplicateMaterial(_) => "duplicate_material",
        AppError::AdvisorDisabled(_) => "advisor_disabled",
        AppError::AdviceCooldown(_) => "advice_cooldown",
        AppError::UpstreamError { .. } => "upstream_error",
        AppError::HttpRequest(_) => "http_request_error",
        AppError::InternalError(_) => "internal_error",
    }
}

// Implement conversions from common error types
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpRequest(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::InternalError(format!("JSON error: {}", err))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::InternalError(format!("Storage error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = AppError::MaterialNotFound("1f3c".to_string());
        assert_eq!(error.to_string(), "Material not found: 1f3c");
    }

    #[test]
    fn test_error_type_name() {
        assert_eq!(
            error_type_name(&AppError::DuplicateMaterial("wool".to_string())),
            "duplicate_material"
        );
        assert_eq!(
            error_type_name(&AppError::AdviceCooldown("wait".to_string())),
            "advice_cooldown"
        );
    }

    #[tokio::test]
    async fn test_error_response_status() {
        let error = AppError::DuplicateMaterial("wool".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let error = AppError::AdviceCooldown("wait".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
