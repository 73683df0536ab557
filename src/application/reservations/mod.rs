//! Reservation lifecycle: availability, per-vehicle locking, the state
//! machine and the stale-draft sweep.

pub mod availability;
pub mod locks;
pub mod service;
pub mod sweeper;

pub use availability::{evaluate, Availability, AvailabilityChecker, ConflictFilter};
pub use locks::VehicleLocks;
pub use service::{
    Confirmation, DraftCheck, ListingStatus, NewReservation, ReservationPolicy, ReservationService,
    SweepReport,
};
pub use sweeper::start_draft_sweep_task;
