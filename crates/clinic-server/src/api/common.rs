// Common DTOs and error mapping shared by the HTTP handlers

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use clinic_core::FieldError;
use serde::{de, Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::services::ServiceError;

/// Generic message shown when a write fails for reasons the user cannot fix
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";
pub const REGISTRATION_FAILURE: &str = "Registration failed. Please try again.";

/// Standard error response for API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message describing what went wrong.
    pub error: String,
    /// Form field the error refers to, for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            field: None,
        }
    }

    /// Convert to axum response tuple
    pub fn into_response(self, status: StatusCode) -> (StatusCode, Json<Self>) {
        (status, Json(self))
    }
}

impl From<FieldError> for ErrorResponse {
    fn from(err: FieldError) -> Self {
        Self {
            error: err.message,
            field: Some(err.field),
        }
    }
}

/// Response wrapper for list endpoints.
/// All list endpoints return responses wrapped in a `data` field.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListResponse<T> {
    /// Array of items returned by the list operation.
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self { data }
    }
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

/// Acknowledgement of a status change
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub success: bool,
    /// Status after the change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Optional body of a status change. Without `active` the status flips.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SetStatusRequest {
    /// `true`/`false`, or `1`/`0` as stored by older clients
    #[serde(default, alias = "estado", deserialize_with = "status_flag")]
    pub active: Option<bool>,
}

fn status_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Number(i64),
    }

    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Flag::Bool(active)) => Ok(Some(active)),
        Some(Flag::Number(1)) => Ok(Some(true)),
        Some(Flag::Number(0)) => Ok(Some(false)),
        Some(Flag::Number(n)) => Err(de::Error::custom(format!("invalid status {}", n))),
    }
}

/// Parse a status change body. Empty means flip; anything else must be a valid request.
pub fn parse_status_body(body: &[u8]) -> Result<Option<bool>, FieldError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice::<SetStatusRequest>(body)
        .map(|req| req.active)
        .map_err(|e| {
            tracing::debug!("Rejected status body: {}", e);
            FieldError::new("active", "Status must be true, false, 1 or 0")
        })
}

/// Extractor for the requested status: `None` flips, `Some` sets.
/// A body that is present but unreadable is rejected with 422.
#[derive(Debug, Clone, Copy)]
pub struct StatusChange(pub Option<bool>);

#[axum::async_trait]
impl<S> FromRequest<S> for StatusChange
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::Invalid(FieldError::new("active", e.body_text())))?;
        parse_status_body(&body).map(StatusChange).map_err(ApiError::Invalid)
    }
}

/// Map the outcome of a status change to `{success, active}`, 404 or 500
pub fn status_response(result: Result<Option<bool>, ServiceError>, not_found: &str) -> Response {
    match result {
        Ok(Some(active)) => Json(StatusResponse {
            success: true,
            active: Some(active),
            error: None,
        })
        .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(StatusResponse {
                success: false,
                active: None,
                error: Some(not_found.to_string()),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to change status: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(StatusResponse {
                    success: false,
                    active: None,
                    error: None,
                }),
            )
                .into_response()
        }
    }
}

/// Handler error mapped to a JSON response
#[derive(Debug)]
pub enum ApiError {
    /// 422 with the offending field
    Invalid(FieldError),
    /// 401, used by the login form
    Unauthorized(String),
    /// 500 with a generic message; the cause was logged where it happened
    Failed(&'static str),
}

impl ApiError {
    /// Like `From<ServiceError>` but with the registration failure message
    pub fn registration(err: ServiceError) -> Self {
        match err {
            ServiceError::Invalid(field) => ApiError::Invalid(field),
            ServiceError::Failed(e) => {
                tracing::error!("Registration failed: {:#}", e);
                ApiError::Failed(REGISTRATION_FAILURE)
            }
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Invalid(field) => ApiError::Invalid(field),
            ServiceError::Failed(e) => {
                tracing::error!("Request failed: {:#}", e);
                ApiError::Failed(GENERIC_FAILURE)
            }
        }
    }
}

impl From<FieldError> for ApiError {
    fn from(err: FieldError) -> Self {
        ApiError::Invalid(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Invalid(field) => {
                ErrorResponse::from(field).into_response(StatusCode::UNPROCESSABLE_ENTITY)
            }
            ApiError::Unauthorized(message) => {
                ErrorResponse::new(message).into_response(StatusCode::UNAUTHORIZED)
            }
            ApiError::Failed(message) => {
                ErrorResponse::new(message).into_response(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
        .into_response()
    }
}

/// Trim a form value; blank input counts as absent
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_omits_empty_field() {
        let json = serde_json::to_value(ErrorResponse::new("Page not found")).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Page not found" }));

        let json = serde_json::to_value(ErrorResponse::from(FieldError::new(
            "national_id",
            "taken",
        )))
        .unwrap();
        assert_eq!(json["field"], "national_id");
    }

    #[test]
    fn test_set_status_request_accepts_legacy_name() {
        let req: SetStatusRequest = serde_json::from_str(r#"{"estado": false}"#).unwrap();
        assert_eq!(req.active, Some(false));
        let req: SetStatusRequest = serde_json::from_str(r#"{"active": true}"#).unwrap();
        assert_eq!(req.active, Some(true));
        let req: SetStatusRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.active, None);
    }

    #[test]
    fn test_set_status_request_accepts_numeric_flags() {
        let req: SetStatusRequest = serde_json::from_str(r#"{"estado": 0}"#).unwrap();
        assert_eq!(req.active, Some(false));
        let req: SetStatusRequest = serde_json::from_str(r#"{"estado": 1}"#).unwrap();
        assert_eq!(req.active, Some(true));
        let req: SetStatusRequest = serde_json::from_str(r#"{"active": null}"#).unwrap();
        assert_eq!(req.active, None);
        assert!(serde_json::from_str::<SetStatusRequest>(r#"{"estado": 2}"#).is_err());
        assert!(serde_json::from_str::<SetStatusRequest>(r#"{"estado": "no"}"#).is_err());
    }

    #[test]
    fn test_parse_status_body() {
        assert_eq!(parse_status_body(b""), Ok(None));
        assert_eq!(parse_status_body(b"  \n"), Ok(None));
        assert_eq!(parse_status_body(b"{}"), Ok(None));
        assert_eq!(parse_status_body(br#"{"estado": 0}"#), Ok(Some(false)));
        assert_eq!(parse_status_body(br#"{"active": true}"#), Ok(Some(true)));

        let err = parse_status_body(b"estado=0").unwrap_err();
        assert_eq!(err.field, "active");
        assert!(parse_status_body(br#"{"active": "maybe"}"#).is_err());
    }

    #[test]
    fn test_status_response_codes() {
        assert_eq!(
            status_response(Ok(Some(true)), "missing").status(),
            StatusCode::OK
        );
        assert_eq!(
            status_response(Ok(None), "missing").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_response(Err(ServiceError::Failed(anyhow::anyhow!("boom"))), "missing")
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_status_codes() {
        let invalid = ApiError::Invalid(FieldError::new("email", "bad")).into_response();
        assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let failed = ApiError::Failed(GENERIC_FAILURE).into_response();
        assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  x ".into())), Some("x".to_string()));
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(None), None);
    }
}
