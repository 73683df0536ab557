//! Application layer: use cases over the domain and its stores.

pub mod catalogue;
pub mod reservations;

pub use catalogue::{CarQuery, CatalogueFilters, CatalogueService};
pub use reservations::{
    start_draft_sweep_task, Availability, AvailabilityChecker, Confirmation, ConflictFilter,
    DraftCheck, ListingStatus, NewReservation, ReservationPolicy, ReservationService, SweepReport,
};
