//! Reservation domain entity

use chrono::{DateTime, Days, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::{DomainError, DomainResult};

/// Reservation status
///
/// `Draft` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Provisional hold, does not block other customers
    Draft,
    /// Authoritative booking
    Confirmed,
    /// Withdrawn by the customer while still a draft
    Cancelled,
    /// Draft aged past the retention window
    Expired,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Draft)
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Customer contact details, captured by value when the draft is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    #[validate(
        length(min = 2, message = "must be at least 2 characters"),
        custom(function = "validate_person_name")
    )]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[validate(length(min = 5, message = "must be at least 5 characters"))]
    pub driver_license: String,
}

fn validate_person_name(name: &str) -> Result<(), ValidationError> {
    let allowed = |c: char| c.is_alphabetic() || c == ' ' || c == '-' || c == '\'';
    if name.trim().is_empty() || !name.chars().all(allowed) {
        return Err(ValidationError::new("invalid_name")
            .with_message("may only contain letters, spaces, hyphens and apostrophes".into()));
    }
    Ok(())
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let body = phone.strip_prefix('+').unwrap_or(phone);
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')');
    let digits = body.chars().filter(char::is_ascii_digit).count();
    if !body.chars().all(allowed) || digits < 10 {
        return Err(ValidationError::new("invalid_phone")
            .with_message("must contain at least 10 digits".into()));
    }
    Ok(())
}

/// Half-open date interval `[start_date, start_date + days)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalPeriod {
    pub start_date: NaiveDate,
    pub days: u32,
}

impl RentalPeriod {
    pub fn new(start_date: NaiveDate, days: u32) -> Self {
        Self { start_date, days }
    }

    /// Exclusive end date.
    pub fn end(&self) -> NaiveDate {
        self.start_date
            .checked_add_days(Days::new(u64::from(self.days)))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Back-to-back periods (one starts on the other's end) do not overlap.
    pub fn overlaps(&self, other: &RentalPeriod) -> bool {
        self.start_date < other.end() && self.end() > other.start_date
    }
}

/// What a conflicting reservation may reveal to another customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictSummary {
    pub reservation_id: i64,
    pub start_date: NaiveDate,
    pub days: u32,
    pub customer_name: String,
}

/// Vehicle reservation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Unique reservation ID
    pub id: i64,
    /// Reserved vehicle
    pub vin: String,
    pub customer_info: CustomerInfo,
    pub rental_period: RentalPeriod,
    /// Price fixed at creation time
    pub total_price: Decimal,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl Reservation {
    pub fn new_draft(
        id: i64,
        vin: impl Into<String>,
        customer_info: CustomerInfo,
        rental_period: RentalPeriod,
        total_price: Decimal,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            vin: vin.into(),
            customer_info,
            rental_period,
            total_price,
            status: ReservationStatus::Draft,
            created_at,
            confirmed_at: None,
        }
    }

    pub fn is_draft(&self) -> bool {
        self.status == ReservationStatus::Draft
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == ReservationStatus::Confirmed
    }

    /// A draft older than `retention`. Confirmed reservations never go stale.
    pub fn is_stale(&self, now: DateTime<Utc>, retention: Duration) -> bool {
        self.is_draft() && now - self.created_at > retention
    }

    /// Draft -> Confirmed
    pub fn confirm(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        match self.status {
            ReservationStatus::Draft => {
                self.status = ReservationStatus::Confirmed;
                self.confirmed_at = Some(now);
                Ok(())
            }
            ReservationStatus::Confirmed => Err(DomainError::AlreadyConfirmed(self.id)),
            status => Err(DomainError::InvalidState {
                id: self.id,
                status,
            }),
        }
    }

    /// Draft -> Cancelled
    pub fn cancel(&mut self) -> DomainResult<()> {
        self.leave_draft(ReservationStatus::Cancelled)
    }

    /// Draft -> Expired
    pub fn expire(&mut self) -> DomainResult<()> {
        self.leave_draft(ReservationStatus::Expired)
    }

    fn leave_draft(&mut self, to: ReservationStatus) -> DomainResult<()> {
        if !self.is_draft() {
            return Err(DomainError::InvalidState {
                id: self.id,
                status: self.status,
            });
        }
        self.status = to;
        Ok(())
    }

    pub fn summary(&self) -> ConflictSummary {
        ConflictSummary {
            reservation_id: self.id,
            start_date: self.rental_period.start_date,
            days: self.rental_period.days,
            customer_name: self.customer_info.name.clone(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
