//! Error envelope and `DomainError` → HTTP status mapping
//!
//! Every failing endpoint answers with
//! `{"success": false, "error": "...", "details": [...], "conflicts": [...]}`
//! where `details` and `conflicts` are present only when they carry data.

use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::domain::{ConflictSummary, DomainError};

/// A reservation that blocks the requested dates. Only the customer's name
/// is disclosed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConflictDto {
    pub reservation_id: i64,
    pub start_date: NaiveDate,
    pub days: u32,
    pub customer_name: String,
}

impl From<ConflictSummary> for ConflictDto {
    fn from(c: ConflictSummary) -> Self {
        Self {
            reservation_id: c.reservation_id,
            start_date: c.start_date,
            days: c.days,
            customer_name: c.customer_name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    pub error: String,
    /// Field-level validation messages
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<ConflictDto>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
            details: Vec::new(),
            conflicts: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::AlreadyConfirmed(_)
        | DomainError::InvalidState { .. }
        | DomainError::Expired(_) => StatusCode::BAD_REQUEST,
        DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<DomainError> for ErrorResponse {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(details) => {
                ErrorResponse::new("Validation failed").with_details(details)
            }
            DomainError::Conflict(conflicts) => ErrorResponse {
                conflicts: conflicts.into_iter().map(ConflictDto::from).collect(),
                ..ErrorResponse::new("Vehicle is already booked for the requested dates")
            },
            // Storage details stay in the logs.
            DomainError::Storage(_) => ErrorResponse::new("Storage failure, please retry"),
            other => ErrorResponse::new(other.to_string()),
        }
    }
}

/// Convert a domain failure into the response tuple handlers return.
pub fn api_error(err: DomainError) -> ApiError {
    let status = status_for(&err);
    if status.is_server_error() {
        error!(error = %err, "Request failed");
    } else {
        debug!(error = %err, status = status.as_u16(), "Request rejected");
    }
    (status, Json(ErrorResponse::from(err)))
}
