//! Vehicle catalogue HTTP handlers

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;

use crate::application::{CatalogueService, ReservationService};
use crate::domain::DomainError;
use crate::interfaces::http::common::error::api_error;
use crate::interfaces::http::common::{ApiResult, ErrorResponse, ValidatedJson};

use super::dto::*;

#[derive(Clone)]
pub struct CarsState {
    pub catalogue: Arc<CatalogueService>,
    pub reservations: Arc<ReservationService>,
}

#[utoipa::path(
    get,
    path = "/api/cars",
    tag = "Cars",
    params(CarQueryParams),
    responses(
        (status = 200, description = "Matching vehicles", body = Vec<CarDto>),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn list_cars(
    State(state): State<CarsState>,
    Query(params): Query<CarQueryParams>,
) -> ApiResult<Vec<CarDto>> {
    let vehicles = state
        .catalogue
        .search(&params.into())
        .await
        .map_err(api_error)?;
    Ok(Json(vehicles.into_iter().map(CarDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/cars/{vin}",
    tag = "Cars",
    params(("vin" = String, Path, description = "Vehicle identification number")),
    responses(
        (status = 200, description = "Vehicle details", body = CarDto),
        (status = 404, description = "Vehicle not found", body = ErrorResponse)
    )
)]
pub async fn get_car(State(state): State<CarsState>, Path(vin): Path<String>) -> ApiResult<CarDto> {
    let vehicle = state.catalogue.get(&vin).await.map_err(api_error)?;
    Ok(Json(vehicle.into()))
}

#[utoipa::path(
    post,
    path = "/api/cars/check-availability",
    tag = "Cars",
    request_body = CheckAvailabilityRequest,
    responses(
        (status = 200, description = "Availability decision", body = CheckAvailabilityResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Vehicle not found", body = ErrorResponse)
    )
)]
pub async fn check_availability(
    State(state): State<CarsState>,
    ValidatedJson(request): ValidatedJson<CheckAvailabilityRequest>,
) -> ApiResult<CheckAvailabilityResponse> {
    let availability = state
        .reservations
        .check_availability(&request.vin, request.start_date, request.days)
        .await
        .map_err(api_error)?;

    let message = if availability.available {
        "Vehicle is available for the selected dates".to_string()
    } else {
        format!(
            "Vehicle is already booked for the selected dates ({} overlapping reservation(s))",
            availability.conflicts.len()
        )
    };

    Ok(Json(CheckAvailabilityResponse {
        success: true,
        available: availability.available,
        message,
    }))
}

#[utoipa::path(
    get,
    path = "/api/cars/{vin}/availability",
    tag = "Cars",
    params(
        ("vin" = String, Path, description = "Vehicle identification number"),
        AvailabilityParams
    ),
    responses(
        (status = 200, description = "Listing flag and upcoming booked ranges", body = VehicleAvailabilityResponse),
        (status = 400, description = "Incomplete or invalid range", body = ErrorResponse),
        (status = 404, description = "Vehicle not found", body = ErrorResponse)
    )
)]
pub async fn vehicle_availability(
    State(state): State<CarsState>,
    Path(vin): Path<String>,
    Query(params): Query<AvailabilityParams>,
) -> ApiResult<VehicleAvailabilityResponse> {
    let vehicle = state.catalogue.get(&vin).await.map_err(api_error)?;

    let available = match (params.start_date, params.days) {
        (Some(start), Some(days)) => {
            state
                .reservations
                .check_availability(&vin, start, days)
                .await
                .map_err(api_error)?
                .available
        }
        (None, None) => vehicle.available_for_listing,
        _ => {
            return Err(api_error(DomainError::validation(
                "startDate and days must be given together",
            )))
        }
    };

    let booked_ranges = state
        .reservations
        .booked_ranges(&vin)
        .await
        .map_err(api_error)?
        .into_iter()
        .map(BookedRangeDto::from)
        .collect();

    Ok(Json(VehicleAvailabilityResponse {
        success: true,
        vin,
        available,
        booked_ranges,
    }))
}

#[utoipa::path(
    get,
    path = "/api/filters",
    tag = "Cars",
    responses((status = 200, description = "Distinct types and brands", body = FiltersResponse))
)]
pub async fn get_filters(State(state): State<CarsState>) -> ApiResult<FiltersResponse> {
    let filters = state.catalogue.filters().await.map_err(api_error)?;
    Ok(Json(filters.into()))
}

#[utoipa::path(
    get,
    path = "/api/suggestions",
    tag = "Cars",
    params(SuggestionParams),
    responses((status = 200, description = "Up to five search suggestions", body = Vec<String>))
)]
pub async fn get_suggestions(
    State(state): State<CarsState>,
    Query(params): Query<SuggestionParams>,
) -> ApiResult<Vec<String>> {
    let q = params.q.unwrap_or_default();
    let suggestions = state.catalogue.suggestions(&q).await.map_err(api_error)?;
    Ok(Json(suggestions))
}
