//! Vehicle aggregate
//!
//! Contains the Vehicle entity and repository interface.

pub mod model;
pub mod repository;

pub use model::Vehicle;
pub use repository::VehicleRepository;
