//! HTTP REST API
//!
//! - `common`: error envelope and validated JSON extraction
//! - `modules`: handlers and DTOs per resource, plus request-id and metrics middleware
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiDoc, HttpState};
