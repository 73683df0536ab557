//! Reservation (order) DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::{Confirmation, ListingStatus};
use crate::domain::{CustomerInfo, RentalPeriod, Reservation};

/// Customer contact snapshot
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfoDto {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub driver_license: String,
}

impl From<CustomerInfoDto> for CustomerInfo {
    fn from(c: CustomerInfoDto) -> Self {
        CustomerInfo {
            name: c.name.trim().to_string(),
            email: c.email.trim().to_string(),
            phone: c.phone.trim().to_string(),
            driver_license: c.driver_license.trim().to_string(),
        }
    }
}

impl From<CustomerInfo> for CustomerInfoDto {
    fn from(c: CustomerInfo) -> Self {
        Self {
            name: c.name,
            email: c.email,
            phone: c.phone,
            driver_license: c.driver_license,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RentalPeriodDto {
    pub start_date: NaiveDate,
    pub days: u32,
    /// Exclusive end date, filled in responses
    #[serde(default, skip_deserializing)]
    pub end_date: Option<NaiveDate>,
}

impl From<RentalPeriod> for RentalPeriodDto {
    fn from(p: RentalPeriod) -> Self {
        Self {
            start_date: p.start_date,
            days: p.days,
            end_date: Some(p.end()),
        }
    }
}

/// Body of `POST /api/orders`. Customer fields and the rental period are
/// validated by the reservation service so that every problem is reported
/// at once.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub vin: String,
    pub customer_info: CustomerInfoDto,
    pub rental_period: RentalPeriodDto,
    /// Client-side estimate; the server recomputes the price
    #[serde(default)]
    pub total_price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub id: i64,
    pub vin: String,
    pub customer_info: CustomerInfoDto,
    pub rental_period: RentalPeriodDto,
    pub total_price: Decimal,
    /// draft, confirmed, cancelled or expired
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl From<Reservation> for OrderDto {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            vin: r.vin,
            customer_info: r.customer_info.into(),
            rental_period: r.rental_period.into(),
            total_price: r.total_price,
            status: r.status.as_str().to_string(),
            created_at: r.created_at,
            confirmed_at: r.confirmed_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub success: bool,
    pub order: OrderDto,
}

impl OrderResponse {
    pub fn new(reservation: Reservation) -> Self {
        Self {
            success: true,
            order: reservation.into(),
        }
    }
}

/// Listing flag of the booked vehicle after confirmation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarStatusDto {
    pub vin: String,
    pub available: bool,
    /// `false` when the flag could not be stored; the booking still stands
    pub synced: bool,
}

impl From<ListingStatus> for CarStatusDto {
    fn from(l: ListingStatus) -> Self {
        Self {
            vin: l.vin,
            available: l.available_for_listing,
            synced: l.synced,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmOrderResponse {
    pub success: bool,
    pub order: OrderDto,
    pub car_status: CarStatusDto,
}

impl From<Confirmation> for ConfirmOrderResponse {
    fn from(c: Confirmation) -> Self {
        Self {
            success: true,
            order: c.reservation.into(),
            car_status: c.listing.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CancelOrderResponse {
    pub success: bool,
    pub message: String,
}
