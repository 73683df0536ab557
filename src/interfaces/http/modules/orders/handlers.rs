//! Reservation (order) HTTP handlers
//!
//! Thin wrappers over [`ReservationService`]; every rule lives there.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use tracing::warn;

use crate::application::{NewReservation, ReservationService};
use crate::interfaces::http::common::error::api_error;
use crate::interfaces::http::common::{ApiResult, ErrorResponse, ValidatedJson};

use super::dto::*;

#[derive(Clone)]
pub struct OrdersState {
    pub reservations: Arc<ReservationService>,
}

#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Draft reservation created", body = OrderResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Vehicle not found", body = ErrorResponse),
        (status = 409, description = "Dates already booked", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn create_order(
    State(state): State<OrdersState>,
    ValidatedJson(request): ValidatedJson<CreateOrderRequest>,
) -> ApiResult<OrderResponse> {
    let client_total = request.total_price;

    let reservation = state
        .reservations
        .create_draft(NewReservation {
            vin: request.vin,
            customer: request.customer_info.into(),
            start_date: request.rental_period.start_date,
            days: request.rental_period.days,
        })
        .await
        .map_err(api_error)?;

    if let Some(client_total) = client_total {
        if client_total != reservation.total_price {
            warn!(
                reservation_id = reservation.id,
                client_total = %client_total,
                server_total = %reservation.total_price,
                "Client price estimate differs from server price"
            );
        }
    }

    Ok(Json(OrderResponse::new(reservation)))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(("id" = i64, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation", body = OrderResponse),
        (status = 404, description = "Reservation not found", body = ErrorResponse)
    )
)]
pub async fn get_order(
    State(state): State<OrdersState>,
    Path(id): Path<i64>,
) -> ApiResult<OrderResponse> {
    let reservation = state.reservations.get(id).await.map_err(api_error)?;
    Ok(Json(OrderResponse::new(reservation)))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/confirm",
    tag = "Orders",
    params(("id" = i64, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation confirmed", body = ConfirmOrderResponse),
        (status = 400, description = "Already confirmed, expired or not a draft", body = ErrorResponse),
        (status = 404, description = "Reservation not found", body = ErrorResponse),
        (status = 409, description = "Another booking took the dates", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn confirm_order(
    State(state): State<OrdersState>,
    Path(id): Path<i64>,
) -> ApiResult<ConfirmOrderResponse> {
    let confirmation = state.reservations.confirm(id).await.map_err(api_error)?;
    Ok(Json(confirmation.into()))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}/cancel",
    tag = "Orders",
    params(("id" = i64, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Draft withdrawn", body = CancelOrderResponse),
        (status = 400, description = "Not a draft", body = ErrorResponse),
        (status = 404, description = "Reservation not found", body = ErrorResponse)
    )
)]
pub async fn cancel_order(
    State(state): State<OrdersState>,
    Path(id): Path<i64>,
) -> ApiResult<CancelOrderResponse> {
    state.reservations.cancel_draft(id).await.map_err(api_error)?;
    Ok(Json(CancelOrderResponse {
        success: true,
        message: format!("Reservation {} cancelled", id),
    }))
}
