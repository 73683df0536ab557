use thiserror::Error;

use crate::domain::reservation::{ConflictSummary, ReservationStatus};

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Not found: {entity} {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Vehicle is already booked for {} overlapping reservation(s)", .0.len())]
    Conflict(Vec<ConflictSummary>),

    #[error("Reservation {0} is already confirmed")]
    AlreadyConfirmed(i64),

    #[error("Reservation {id} cannot change state from {status}")]
    InvalidState { id: i64, status: ReservationStatus },

    #[error("Reservation {0} has expired")]
    Expired(i64),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn vehicle_not_found(vin: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "vehicle",
            id: vin.into(),
        }
    }

    pub fn reservation_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "reservation",
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    format!("{}: {}", wire_name(field), msg)
                })
            })
            .collect();
        // field_errors() is a HashMap, keep the output stable
        messages.sort();

        if messages.is_empty() {
            messages.push("validation failed".to_string());
        }
        Self::Validation(messages)
    }
}

/// Field names as they appear on the wire (`driver_license` → `driverLicense`).
fn wire_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        Self::Storage(format!("serialization: {}", e))
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
