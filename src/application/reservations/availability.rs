//! Availability checker
//!
//! Decides whether a vehicle is free for a half-open date range. Reads the
//! reservation store and never writes to it.

use std::sync::Arc;

use crate::domain::{
    ConflictSummary, DomainResult, RentalPeriod, RepositoryProvider, Reservation,
    ReservationStatus,
};

/// Which reservations count as blocking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConflictFilter {
    /// Ignore this reservation (the one being confirmed).
    pub exclude: Option<i64>,
    /// Count drafts as well as confirmed reservations.
    pub include_drafts: bool,
}

impl ConflictFilter {
    /// The authoritative filter: confirmed reservations only.
    pub fn confirmed_only() -> Self {
        Self::default()
    }

    pub fn with_drafts() -> Self {
        Self {
            exclude: None,
            include_drafts: true,
        }
    }

    pub fn excluding(mut self, id: i64) -> Self {
        self.exclude = Some(id);
        self
    }

    fn blocks(&self, reservation: &Reservation, period: &RentalPeriod) -> bool {
        if self.exclude == Some(reservation.id) {
            return false;
        }
        let counted = match reservation.status {
            ReservationStatus::Confirmed => true,
            ReservationStatus::Draft => self.include_drafts,
            ReservationStatus::Cancelled | ReservationStatus::Expired => false,
        };
        counted && reservation.rental_period.overlaps(period)
    }
}

#[derive(Debug, Clone)]
pub struct Availability {
    pub available: bool,
    /// Every blocking reservation, in ID order
    pub conflicts: Vec<Reservation>,
}

impl Availability {
    pub fn summaries(&self) -> Vec<ConflictSummary> {
        self.conflicts.iter().map(Reservation::summary).collect()
    }
}

/// Pure decision over an already loaded set of reservations.
pub fn evaluate(
    reservations: impl IntoIterator<Item = Reservation>,
    period: &RentalPeriod,
    filter: ConflictFilter,
) -> Availability {
    let conflicts: Vec<Reservation> = reservations
        .into_iter()
        .filter(|r| filter.blocks(r, period))
        .collect();

    Availability {
        available: conflicts.is_empty(),
        conflicts,
    }
}

#[derive(Clone)]
pub struct AvailabilityChecker {
    repos: Arc<dyn RepositoryProvider>,
}

impl AvailabilityChecker {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn check(
        &self,
        vin: &str,
        period: &RentalPeriod,
        filter: ConflictFilter,
    ) -> DomainResult<Availability> {
        let reservations = self.repos.reservations().list_for_vehicle(vin).await?;
        Ok(evaluate(reservations, period, filter))
    }
}
