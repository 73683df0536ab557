//! # Car Rental Reservation Service
//!
//! Vehicle catalogue and booking workflow: customers place non-binding
//! draft holds, and a confirmation re-checks availability under a
//! per-vehicle lock so two confirmed bookings never overlap.
//!
//! ## Architecture
//!
//! - **domain**: Vehicle and Reservation entities, the reservation state
//!   machine, repository traits and the clock
//! - **application**: availability checker, reservation lifecycle,
//!   stale-draft sweep and catalogue queries
//! - **infrastructure**: in-memory and JSON-file storage, catalogue seeding
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: runtime wiring and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export API router
pub use interfaces::http::create_api_router;

pub use server::{init_tracing, ServerHandle, ServerOptions};
