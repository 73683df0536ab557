//! Vehicle catalogue DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::{CarQuery, CatalogueFilters};
use crate::domain::{RentalPeriod, Vehicle};

/// Listing filters for `GET /api/cars`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CarQueryParams {
    /// Substring over brand, model, type and description (case-insensitive)
    pub search: Option<String>,
    /// Exact vehicle type (case-insensitive)
    #[serde(rename = "type")]
    pub vehicle_type: Option<String>,
    /// Exact brand (case-insensitive)
    pub brand: Option<String>,
}

impl From<CarQueryParams> for CarQuery {
    fn from(p: CarQueryParams) -> Self {
        CarQuery {
            search: p.search,
            vehicle_type: p.vehicle_type,
            brand: p.brand,
        }
    }
}

/// A catalogue vehicle
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarDto {
    pub vin: String,
    pub brand: String,
    pub model: String,
    #[serde(rename = "type")]
    pub vehicle_type: String,
    pub year: u16,
    pub mileage: u32,
    pub fuel_type: String,
    pub price_per_day: Decimal,
    pub image: Option<String>,
    pub description: Option<String>,
    /// Catalogue visibility hint; bookings are decided from confirmed reservations
    pub available: bool,
}

impl From<Vehicle> for CarDto {
    fn from(v: Vehicle) -> Self {
        Self {
            vin: v.vin,
            brand: v.brand,
            model: v.model,
            vehicle_type: v.vehicle_type,
            year: v.year,
            mileage: v.mileage,
            fuel_type: v.fuel_type,
            price_per_day: v.price_per_day,
            image: v.image,
            description: v.description,
            available: v.available_for_listing,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FiltersResponse {
    pub types: Vec<String>,
    pub brands: Vec<String>,
}

impl From<CatalogueFilters> for FiltersResponse {
    fn from(f: CatalogueFilters) -> Self {
        Self {
            types: f.types,
            brands: f.brands,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SuggestionParams {
    /// Partial brand, model or type
    pub q: Option<String>,
}

/// Body of `POST /api/cars/check-availability`
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckAvailabilityRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub vin: String,
    pub start_date: NaiveDate,
    pub days: u32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckAvailabilityResponse {
    pub success: bool,
    pub available: bool,
    pub message: String,
}

/// Optional range for `GET /api/cars/{vin}/availability`
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AvailabilityParams {
    /// First rental day (YYYY-MM-DD); requires `days`
    pub start_date: Option<NaiveDate>,
    pub days: Option<u32>,
}

/// A confirmed booking window, without customer data
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookedRangeDto {
    pub start_date: NaiveDate,
    pub days: u32,
    /// Exclusive end date
    pub end_date: NaiveDate,
}

impl From<RentalPeriod> for BookedRangeDto {
    fn from(p: RentalPeriod) -> Self {
        Self {
            start_date: p.start_date,
            days: p.days,
            end_date: p.end(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehicleAvailabilityResponse {
    pub success: bool,
    pub vin: String,
    /// The listing flag, or the decision for the requested range when one is given
    pub available: bool,
    pub booked_ranges: Vec<BookedRangeDto>,
}
