//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{CatalogueService, ReservationService};

use super::common::{ConflictDto, ErrorResponse};
use super::modules::{
    cars, health, http_metrics_middleware, metrics, orders, request_id_middleware,
};

/// Unified state for every route; each handler extracts its own slice via `FromRef`.
#[derive(Clone)]
pub struct HttpState {
    pub catalogue: Arc<CatalogueService>,
    pub reservations: Arc<ReservationService>,
    pub started_at: Instant,
}

impl HttpState {
    pub fn new(catalogue: Arc<CatalogueService>, reservations: Arc<ReservationService>) -> Self {
        Self {
            catalogue,
            reservations,
            started_at: Instant::now(),
        }
    }
}

impl FromRef<HttpState> for cars::CarsState {
    fn from_ref(s: &HttpState) -> Self {
        cars::CarsState {
            catalogue: Arc::clone(&s.catalogue),
            reservations: Arc::clone(&s.reservations),
        }
    }
}

impl FromRef<HttpState> for orders::OrdersState {
    fn from_ref(s: &HttpState) -> Self {
        orders::OrdersState {
            reservations: Arc::clone(&s.reservations),
        }
    }
}

impl FromRef<HttpState> for health::HealthState {
    fn from_ref(s: &HttpState) -> Self {
        health::HealthState {
            catalogue: Arc::clone(&s.catalogue),
            started_at: s.started_at,
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Cars
        cars::list_cars,
        cars::get_car,
        cars::check_availability,
        cars::vehicle_availability,
        cars::get_filters,
        cars::get_suggestions,
        // Orders
        orders::create_order,
        orders::get_order,
        orders::confirm_order,
        orders::cancel_order,
    ),
    components(
        schemas(
            // Common
            ErrorResponse,
            ConflictDto,
            // Health
            health::HealthResponse,
            health::ComponentHealth,
            // Cars
            cars::CarDto,
            cars::FiltersResponse,
            cars::CheckAvailabilityRequest,
            cars::CheckAvailabilityResponse,
            cars::BookedRangeDto,
            cars::VehicleAvailabilityResponse,
            // Orders
            orders::CustomerInfoDto,
            orders::RentalPeriodDto,
            orders::CreateOrderRequest,
            orders::OrderDto,
            orders::OrderResponse,
            orders::CarStatusDto,
            orders::ConfirmOrderResponse,
            orders::CancelOrderResponse,
        )
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Cars", description = "Vehicle catalogue, search and availability"),
        (name = "Orders", description = "Draft reservations, confirmation and cancellation"),
    ),
    info(
        title = "Car Rental Reservation API",
        version = "1.0.0",
        description = "Vehicle catalogue and booking workflow with conflict-free confirmation",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(state: HttpState, prometheus_handle: PrometheusHandle) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let car_routes = Router::new()
        .route("/", get(cars::list_cars))
        .route("/check-availability", post(cars::check_availability))
        .route("/{vin}", get(cars::get_car))
        .route("/{vin}/availability", get(cars::vehicle_availability));

    let order_routes = Router::new()
        .route("/", post(orders::create_order))
        .route("/{id}", get(orders::get_order))
        .route("/{id}/confirm", put(orders::confirm_order))
        .route("/{id}/cancel", delete(orders::cancel_order));

    let api_routes = Router::new()
        .nest("/cars", car_routes)
        .nest("/orders", order_routes)
        .route("/filters", get(cars::get_filters))
        .route("/suggestions", get(cars::get_suggestions));

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics::prometheus_metrics))
        .with_state(metrics::MetricsState {
            handle: prometheus_handle,
        });

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        // Swagger UI
        .merge(swagger_routes)
        // Health
        .route("/health", get(health::health_check))
        // Catalogue and orders
        .nest("/api", api_routes)
        .with_state(state)
        // Prometheus
        .merge(metrics_routes)
        // Middleware
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
