//! Reservation aggregate
//!
//! Contains the Reservation entity, its draft/confirmed state machine,
//! related value types, and the repository interface.

pub mod model;
pub mod repository;

pub use model::{ConflictSummary, CustomerInfo, RentalPeriod, Reservation, ReservationStatus};
pub use repository::ReservationRepository;
