//! Core business entities, repository traits and the time source.

pub mod clock;
pub mod repositories;
pub mod reservation;
pub mod vehicle;

pub use clock::{Clock, FixedClock, SharedClock, SystemClock};
pub use repositories::RepositoryProvider;
pub use reservation::{
    ConflictSummary, CustomerInfo, RentalPeriod, Reservation, ReservationRepository,
    ReservationStatus,
};
pub use vehicle::{Vehicle, VehicleRepository};

pub use crate::shared::errors::{DomainError, DomainResult};
