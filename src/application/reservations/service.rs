//! Reservation lifecycle manager: application-layer orchestration
//!
//! Owns the draft → confirmed / cancelled / expired state machine.
//! HTTP handlers are thin wrappers that delegate to this service.
//!
//! Every store mutation happens under the vehicle's lock (see
//! [`VehicleLocks`]), so the availability check and the write that depends
//! on it cannot interleave with another request for the same vehicle.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use validator::Validate;

use super::availability::{Availability, AvailabilityChecker, ConflictFilter};
use super::locks::VehicleLocks;
use crate::domain::{
    CustomerInfo, DomainError, DomainResult, RentalPeriod, RepositoryProvider, Reservation,
    SharedClock, Vehicle,
};

/// How the availability check at draft creation treats overlaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftCheck {
    /// Reject drafts overlapping a confirmed reservation.
    #[default]
    Confirmed,
    /// Reject drafts overlapping a confirmed reservation or another draft.
    IncludeDrafts,
    /// Log overlaps with confirmed reservations but create the draft anyway;
    /// confirmation is the only gate.
    Advisory,
}

/// Tunables for the lifecycle rules
#[derive(Debug, Clone)]
pub struct ReservationPolicy {
    pub min_days: u32,
    pub max_days: u32,
    /// Drafts older than this can no longer be confirmed and are swept.
    pub draft_retention: Duration,
    pub draft_check: DraftCheck,
}

impl Default for ReservationPolicy {
    fn default() -> Self {
        Self {
            min_days: 1,
            max_days: 30,
            draft_retention: Duration::hours(24),
            draft_check: DraftCheck::Confirmed,
        }
    }
}

/// Booking request as submitted by a customer
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub vin: String,
    pub customer: CustomerInfo,
    pub start_date: NaiveDate,
    pub days: u32,
}

/// Catalogue visibility after a confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingStatus {
    pub vin: String,
    pub available_for_listing: bool,
    /// `false` when the flag could not be written back.
    pub synced: bool,
}

#[derive(Debug, Clone)]
pub struct Confirmation {
    pub reservation: Reservation,
    pub listing: ListingStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Stale drafts removed
    pub removed: usize,
    /// Vehicles whose listing flag was turned back on
    pub relisted: usize,
}

pub struct ReservationService {
    repos: Arc<dyn RepositoryProvider>,
    checker: AvailabilityChecker,
    locks: VehicleLocks,
    clock: SharedClock,
    policy: ReservationPolicy,
}

impl ReservationService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, clock: SharedClock) -> Self {
        Self {
            checker: AvailabilityChecker::new(repos.clone()),
            repos,
            locks: VehicleLocks::new(),
            clock,
            policy: ReservationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ReservationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &ReservationPolicy {
        &self.policy
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn get(&self, id: i64) -> DomainResult<Reservation> {
        self.repos
            .reservations()
            .get(id)
            .await?
            .ok_or_else(|| DomainError::reservation_not_found(id))
    }

    /// Informational check for a prospective booking, confirmed-only.
    pub async fn check_availability(
        &self,
        vin: &str,
        start_date: NaiveDate,
        days: u32,
    ) -> DomainResult<Availability> {
        let mut errors = Vec::new();
        self.validate_days(days, &mut errors);
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        self.vehicle(vin).await?;
        self.checker
            .check(vin, &RentalPeriod::new(start_date, days), ConflictFilter::confirmed_only())
            .await
    }

    /// Confirmed periods that have not ended yet, earliest first.
    pub async fn booked_ranges(&self, vin: &str) -> DomainResult<Vec<RentalPeriod>> {
        self.vehicle(vin).await?;
        let today = self.clock.today();

        let mut ranges: Vec<RentalPeriod> = self
            .repos
            .reservations()
            .list_for_vehicle(vin)
            .await?
            .into_iter()
            .filter(|r| r.is_confirmed() && r.rental_period.end() > today)
            .map(|r| r.rental_period)
            .collect();
        ranges.sort_by_key(|p| p.start_date);
        Ok(ranges)
    }

    // ── Commands ────────────────────────────────────────────────

    /// Create a provisional hold. The availability check here is advisory;
    /// the confirmation re-checks authoritatively.
    pub async fn create_draft(&self, request: NewReservation) -> DomainResult<Reservation> {
        self.validate_request(&request)?;

        // Resolve before locking so unknown VINs never enter the lock table.
        let vehicle = self.vehicle(&request.vin).await?;
        let _guard = self.locks.lock(&vehicle.vin).await;

        let period = RentalPeriod::new(request.start_date, request.days);

        let filter = match self.policy.draft_check {
            DraftCheck::IncludeDrafts => ConflictFilter::with_drafts(),
            DraftCheck::Confirmed | DraftCheck::Advisory => ConflictFilter::confirmed_only(),
        };
        let availability = self.checker.check(&vehicle.vin, &period, filter).await?;
        if !availability.available && self.policy.draft_check == DraftCheck::Advisory {
            warn!(
                vin = %vehicle.vin,
                start = %period.start_date,
                days = period.days,
                conflicts = availability.conflicts.len(),
                "Draft overlaps a confirmed booking, confirmation will fail unless it is released"
            );
        } else if !availability.available {
            metrics::counter!("reservation_conflicts_total", "stage" => "draft").increment(1);
            info!(
                vin = %vehicle.vin,
                start = %period.start_date,
                days = period.days,
                conflicts = availability.conflicts.len(),
                "Draft rejected, dates already booked"
            );
            return Err(DomainError::Conflict(availability.summaries()));
        }

        let total = vehicle.quote(period.days)?;
        let id = self.repos.reservations().next_id().await;
        let reservation = Reservation::new_draft(
            id,
            vehicle.vin.clone(),
            request.customer,
            period,
            total,
            self.clock.now(),
        );
        self.repos.reservations().upsert(reservation.clone()).await?;

        metrics::counter!("reservations_drafts_created_total").increment(1);
        info!(
            reservation_id = id,
            vin = %reservation.vin,
            start = %period.start_date,
            days = period.days,
            total = %reservation.total_price,
            "📝 Draft reservation created"
        );
        Ok(reservation)
    }

    /// Promote a draft to a confirmed booking.
    pub async fn confirm(&self, id: i64) -> DomainResult<Confirmation> {
        let vin = self.get(id).await?.vin;
        let _guard = self.locks.lock(&vin).await;

        // Re-read under the lock: a sweep or cancel may have won the race.
        let mut reservation = self.get(id).await?;
        let now = self.clock.now();

        if reservation.is_draft() && reservation.is_stale(now, self.policy.draft_retention) {
            info!(reservation_id = id, "Confirmation refused, draft expired");
            return Err(DomainError::Expired(id));
        }

        let availability = self
            .checker
            .check(
                &vin,
                &reservation.rental_period,
                ConflictFilter::confirmed_only().excluding(id),
            )
            .await?;
        if !availability.available && reservation.is_draft() {
            metrics::counter!("reservation_conflicts_total", "stage" => "confirm").increment(1);
            warn!(
                reservation_id = id,
                vin = %vin,
                conflicts = availability.conflicts.len(),
                "Confirmation lost the race for overlapping dates"
            );
            return Err(DomainError::Conflict(availability.summaries()));
        }

        reservation.confirm(now)?;
        self.repos.reservations().upsert(reservation.clone()).await?;

        metrics::counter!("reservations_confirmed_total").increment(1);
        info!(reservation_id = id, vin = %vin, "✅ Reservation confirmed");

        // The listing flag is advisory; a failure here does not undo the booking.
        let listing = match self.refresh_listing(&vin).await {
            Ok(listing) => listing,
            Err(e) => {
                metrics::counter!("listing_flag_update_failures_total").increment(1);
                error!(
                    reservation_id = id,
                    vin = %vin,
                    error = %e,
                    "Reservation confirmed but listing flag update failed"
                );
                ListingStatus {
                    vin: vin.clone(),
                    available_for_listing: false,
                    synced: false,
                }
            }
        };

        Ok(Confirmation {
            reservation,
            listing,
        })
    }

    /// Withdraw a draft. Drafts never affected authoritative state, so the
    /// record is removed rather than kept as `Cancelled`.
    pub async fn cancel_draft(&self, id: i64) -> DomainResult<Reservation> {
        let vin = self.get(id).await?.vin;
        let _guard = self.locks.lock(&vin).await;

        let mut reservation = self.get(id).await?;
        reservation.cancel()?;
        self.repos.reservations().delete(id).await?;

        metrics::counter!("reservations_cancelled_total").increment(1);
        info!(reservation_id = id, vin = %vin, "🗑️ Draft reservation cancelled");
        Ok(reservation)
    }

    /// Sweep with the configured retention window.
    pub async fn sweep(&self) -> DomainResult<SweepReport> {
        self.sweep_expired_drafts(self.policy.draft_retention).await
    }

    /// Remove drafts older than `retention` and relist vehicles that no
    /// longer have upcoming confirmed bookings. Per-record failures are
    /// logged and skipped.
    pub async fn sweep_expired_drafts(&self, retention: Duration) -> DomainResult<SweepReport> {
        let now = self.clock.now();
        let mut report = SweepReport::default();

        let mut stale_by_vehicle: BTreeMap<String, Vec<i64>> = BTreeMap::new();
        for r in self.repos.reservations().list().await? {
            if r.is_stale(now, retention) {
                stale_by_vehicle.entry(r.vin).or_default().push(r.id);
            }
        }

        for (vin, ids) in stale_by_vehicle {
            let _guard = self.locks.lock(&vin).await;
            for id in ids {
                // It may have been confirmed or cancelled since the scan.
                match self.repos.reservations().get(id).await {
                    Ok(Some(mut r)) if r.is_stale(now, retention) => {
                        if let Err(e) = r.expire() {
                            warn!(reservation_id = id, error = %e, "Draft not expirable");
                            continue;
                        }
                        match self.repos.reservations().delete(id).await {
                            Ok(Some(_)) => {
                                report.removed += 1;
                                debug!(reservation_id = id, vin = %vin, "Stale draft removed");
                            }
                            Ok(None) => {}
                            Err(e) => {
                                warn!(reservation_id = id, error = %e, "Failed to remove stale draft")
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(e) => warn!(reservation_id = id, error = %e, "Failed to read draft"),
                }
            }
        }

        match self.repos.vehicles().list().await {
            Ok(vehicles) => {
                for vehicle in vehicles.into_iter().filter(|v| !v.available_for_listing) {
                    let _guard = self.locks.lock(&vehicle.vin).await;
                    match self.refresh_listing(&vehicle.vin).await {
                        Ok(listing) if listing.available_for_listing => report.relisted += 1,
                        Ok(_) => {}
                        Err(e) => {
                            warn!(vin = %vehicle.vin, error = %e, "Failed to refresh listing flag")
                        }
                    }
                }
            }
            Err(e) => warn!(error = %e, "Failed to list vehicles for relisting"),
        }

        if report.removed > 0 || report.relisted > 0 {
            metrics::counter!("reservations_swept_total").increment(report.removed as u64);
            info!(
                removed = report.removed,
                relisted = report.relisted,
                "🧹 Draft sweep finished"
            );
        }
        Ok(report)
    }

    // ── Helpers ─────────────────────────────────────────────────

    async fn vehicle(&self, vin: &str) -> DomainResult<Vehicle> {
        self.repos
            .vehicles()
            .get(vin)
            .await?
            .ok_or_else(|| DomainError::vehicle_not_found(vin))
    }

    /// Recompute the listing flag from confirmed bookings that end after
    /// today. Caller must hold the vehicle lock.
    async fn refresh_listing(&self, vin: &str) -> DomainResult<ListingStatus> {
        let today = self.clock.today();
        let booked = self
            .repos
            .reservations()
            .list_for_vehicle(vin)
            .await?
            .iter()
            .any(|r| r.is_confirmed() && r.rental_period.end() > today);

        let mut vehicle = self.vehicle(vin).await?;
        let listed = !booked;
        if vehicle.available_for_listing != listed {
            vehicle.available_for_listing = listed;
            self.repos.vehicles().upsert(vehicle).await?;
            debug!(vin = %vin, listed, "Listing flag updated");
        }

        Ok(ListingStatus {
            vin: vin.to_string(),
            available_for_listing: listed,
            synced: true,
        })
    }

    fn validate_days(&self, days: u32, errors: &mut Vec<String>) {
        if days < self.policy.min_days || days > self.policy.max_days {
            errors.push(format!(
                "days: must be between {} and {}",
                self.policy.min_days, self.policy.max_days
            ));
        }
    }

    fn validate_request(&self, request: &NewReservation) -> DomainResult<()> {
        let mut errors = match request.customer.validate() {
            Ok(()) => Vec::new(),
            Err(e) => match DomainError::from(e) {
                DomainError::Validation(messages) => messages,
                other => return Err(other),
            },
        };

        if request.vin.trim().is_empty() {
            errors.push("vin: must not be empty".to_string());
        }
        self.validate_days(request.days, &mut errors);
        if request.start_date < self.clock.today() {
            errors.push("startDate: must not be in the past".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(errors))
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        FixedClock, ReservationRepository, ReservationStatus, VehicleRepository,
    };
    use crate::infrastructure::storage::memory::InMemoryReservationRepository;
    use crate::infrastructure::InMemoryRepositoryProvider;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    const V1: &str = "V1";

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap())
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn fleet() -> Vec<Vehicle> {
        vec![
            Vehicle::new(V1, "Honda", "Civic", "Sedan", 2022, Decimal::from(45)),
            Vehicle::new("V2", "Kia", "Rio", "Sedan", 2021, Decimal::from(30)),
        ]
    }

    fn customer(name: &str) -> CustomerInfo {
        CustomerInfo {
            name: name.to_string(),
            email: "someone@example.com".into(),
            phone: "+1 555 010 2030".into(),
            driver_license: "DL123456".into(),
        }
    }

    fn request(name: &str, start: NaiveDate, days: u32) -> NewReservation {
        NewReservation {
            vin: V1.into(),
            customer: customer(name),
            start_date: start,
            days,
        }
    }

    fn setup() -> (Arc<InMemoryRepositoryProvider>, FixedClock, ReservationService) {
        let repos = Arc::new(InMemoryRepositoryProvider::with_vehicles(fleet()));
        let clock = clock();
        let service = ReservationService::new(repos.clone(), Arc::new(clock.clone()));
        (repos, clock, service)
    }

    #[tokio::test]
    async fn draft_then_confirm_then_conflicting_confirm() {
        let (repos, _clock, service) = setup();

        let first = service.create_draft(request("Alice Smith", date(6, 10), 3)).await.unwrap();
        assert_eq!(first.status, ReservationStatus::Draft);
        assert_eq!(first.total_price, Decimal::from(135));
        assert!(repos.vehicles().get(V1).await.unwrap().unwrap().available_for_listing);

        let confirmation = service.confirm(first.id).await.unwrap();
        assert_eq!(confirmation.reservation.status, ReservationStatus::Confirmed);
        assert!(confirmation.reservation.confirmed_at.is_some());
        assert!(!confirmation.listing.available_for_listing);
        assert!(confirmation.listing.synced);
        assert!(!repos.vehicles().get(V1).await.unwrap().unwrap().available_for_listing);

        let second = service.create_draft(request("Bob Jones", date(6, 11), 2)).await;
        // The default draft-time check refuses overlaps with confirmed bookings.
        let Err(DomainError::Conflict(conflicts)) = second else {
            panic!("expected conflict, got {second:?}");
        };
        assert_eq!(conflicts[0].customer_name, "Alice Smith");
    }

    #[tokio::test]
    async fn overlapping_drafts_coexist_and_only_first_confirm_wins() {
        let (_repos, _clock, service) = setup();

        let a = service.create_draft(request("Alice Smith", date(6, 10), 3)).await.unwrap();
        let b = service.create_draft(request("Bob Jones", date(6, 11), 2)).await.unwrap();

        service.confirm(a.id).await.unwrap();
        let err = service.confirm(b.id).await.unwrap_err();
        match err {
            DomainError::Conflict(conflicts) => {
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].reservation_id, a.id);
                assert_eq!(conflicts[0].start_date, date(6, 10));
                assert_eq!(conflicts[0].days, 3);
                assert_eq!(conflicts[0].customer_name, "Alice Smith");
            }
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(service.get(b.id).await.unwrap().status, ReservationStatus::Draft);
    }

    #[tokio::test]
    async fn drafts_can_block_drafts_when_configured() {
        let (_repos, _clock, service) = setup();
        let service = service.with_policy(ReservationPolicy {
            draft_check: DraftCheck::IncludeDrafts,
            ..ReservationPolicy::default()
        });

        service.create_draft(request("Alice Smith", date(6, 10), 3)).await.unwrap();
        let err = service
            .create_draft(request("Bob Jones", date(6, 12), 2))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn advisory_mode_defers_conflict_to_confirmation() {
        let (_repos, _clock, service) = setup();
        let service = service.with_policy(ReservationPolicy {
            draft_check: DraftCheck::Advisory,
            ..ReservationPolicy::default()
        });

        let first = service.create_draft(request("Alice Smith", date(6, 10), 3)).await.unwrap();
        service.confirm(first.id).await.unwrap();

        let second = service.create_draft(request("Bob Jones", date(6, 11), 2)).await.unwrap();
        assert_eq!(second.status, ReservationStatus::Draft);
        assert_eq!(second.total_price, Decimal::from(90));

        let Err(DomainError::Conflict(conflicts)) = service.confirm(second.id).await else {
            panic!("expected conflict");
        };
        assert_eq!(conflicts[0].reservation_id, first.id);
        assert_eq!(conflicts[0].days, 3);
        assert_eq!(conflicts[0].customer_name, "Alice Smith");
    }

    #[tokio::test]
    async fn back_to_back_bookings_both_confirm() {
        let (_repos, _clock, service) = setup();
        let a = service.create_draft(request("Alice Smith", date(6, 1), 3)).await.unwrap();
        service.confirm(a.id).await.unwrap();

        let b = service.create_draft(request("Bob Jones", date(6, 4), 2)).await.unwrap();
        assert!(service.confirm(b.id).await.is_ok());
    }

    #[tokio::test]
    async fn confirm_is_idempotent_guarded() {
        let (_repos, clock, service) = setup();
        let r = service.create_draft(request("Alice Smith", date(6, 10), 3)).await.unwrap();
        let first = service.confirm(r.id).await.unwrap();

        clock.advance(Duration::hours(2));
        let err = service.confirm(r.id).await.unwrap_err();
        assert!(matches!(err, DomainError::AlreadyConfirmed(id) if id == r.id));
        assert_eq!(
            service.get(r.id).await.unwrap().confirmed_at,
            first.reservation.confirmed_at
        );
    }

    #[tokio::test]
    async fn expired_draft_cannot_be_confirmed_and_is_swept() {
        let (repos, clock, service) = setup();
        let r = service.create_draft(request("Alice Smith", date(6, 10), 3)).await.unwrap();

        clock.advance(Duration::hours(25));
        let err = service.confirm(r.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Expired(id) if id == r.id));

        let report = service.sweep().await.unwrap();
        assert_eq!(report.removed, 1);
        assert!(repos.reservations().get(r.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sweep_keeps_fresh_drafts_and_old_confirmed() {
        let (repos, clock, service) = setup();
        let confirmed = service.create_draft(request("Alice Smith", date(7, 1), 3)).await.unwrap();
        service.confirm(confirmed.id).await.unwrap();

        clock.advance(Duration::hours(20));
        let fresh = service.create_draft(request("Bob Jones", date(8, 1), 2)).await.unwrap();

        clock.advance(Duration::hours(10));
        let report = service.sweep().await.unwrap();
        assert_eq!(report.removed, 0);
        assert!(repos.reservations().get(confirmed.id).await.unwrap().is_some());
        assert!(repos.reservations().get(fresh.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn sweep_relists_vehicle_after_last_booking_ends() {
        let (repos, clock, service) = setup();
        let r = service.create_draft(request("Alice Smith", date(6, 2), 2)).await.unwrap();
        service.confirm(r.id).await.unwrap();
        assert!(!repos.vehicles().get(V1).await.unwrap().unwrap().available_for_listing);

        // Booking covers Jun 2-3; on Jun 4 nothing upcoming remains.
        clock.set(Utc.with_ymd_and_hms(2024, 6, 4, 0, 30, 0).unwrap());
        let report = service.sweep().await.unwrap();
        assert_eq!(report.relisted, 1);
        assert!(repos.vehicles().get(V1).await.unwrap().unwrap().available_for_listing);
    }

    #[tokio::test]
    async fn cancel_removes_draft_only() {
        let (repos, _clock, service) = setup();
        let draft = service.create_draft(request("Alice Smith", date(6, 10), 3)).await.unwrap();
        let cancelled = service.cancel_draft(draft.id).await.unwrap();
        assert_eq!(cancelled.status, ReservationStatus::Cancelled);
        assert!(repos.reservations().get(draft.id).await.unwrap().is_none());

        let err = service.cancel_draft(draft.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        let confirmed = service.create_draft(request("Bob Jones", date(6, 20), 2)).await.unwrap();
        service.confirm(confirmed.id).await.unwrap();
        let err = service.cancel_draft(confirmed.id).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn price_is_fixed_at_creation() {
        let (repos, _clock, service) = setup();
        let r = service.create_draft(request("Alice Smith", date(6, 10), 3)).await.unwrap();

        let mut vehicle = repos.vehicles().get(V1).await.unwrap().unwrap();
        vehicle.price_per_day = Decimal::from(99);
        repos.vehicles().upsert(vehicle).await.unwrap();

        let confirmed = service.confirm(r.id).await.unwrap();
        assert_eq!(confirmed.reservation.total_price, Decimal::from(135));
    }

    #[tokio::test]
    async fn validation_collects_all_problems() {
        let (_repos, _clock, service) = setup();
        let mut bad = request("X", date(5, 1), 31);
        bad.customer.email = "nope".into();
        bad.customer.driver_license = "D1".into();

        let err = service.create_draft(bad).await.unwrap_err();
        let DomainError::Validation(messages) = err else {
            panic!("expected validation error");
        };
        assert!(messages.iter().any(|m| m.starts_with("name:")));
        assert!(messages.iter().any(|m| m.starts_with("email:")));
        assert!(messages.iter().any(|m| m.starts_with("days:")));
        assert!(messages.iter().any(|m| m.starts_with("startDate:")));
        assert!(messages.iter().any(|m| m.starts_with("driverLicense:")));
        assert!(!messages.iter().any(|m| m.contains("driver_license")));
    }

    #[tokio::test]
    async fn zero_days_rejected_and_today_allowed() {
        let (_repos, _clock, service) = setup();
        assert!(matches!(
            service.create_draft(request("Alice Smith", date(6, 1), 0)).await,
            Err(DomainError::Validation(_))
        ));
        assert!(service.create_draft(request("Alice Smith", date(6, 1), 30)).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_vehicle_and_reservation_are_not_found() {
        let (_repos, _clock, service) = setup();
        let mut req = request("Alice Smith", date(6, 10), 3);
        req.vin = "NOPE".into();
        assert!(matches!(
            service.create_draft(req).await,
            Err(DomainError::NotFound { entity: "vehicle", .. })
        ));
        assert!(matches!(
            service.confirm(999).await,
            Err(DomainError::NotFound { entity: "reservation", .. })
        ));
    }

    #[tokio::test]
    async fn unrepresentable_total_is_rejected_not_panicking() {
        let (repos, _clock, service) = setup();
        let mut pricey = repos.vehicles().get(V1).await.unwrap().unwrap();
        pricey.price_per_day = Decimal::MAX;
        repos.vehicles().upsert(pricey).await.unwrap();

        let result = service.create_draft(request("Alice Smith", date(6, 10), 3)).await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(repos.reservations().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_vehicles_do_not_grow_lock_table() {
        let (_repos, _clock, service) = setup();
        for i in 0..50 {
            let mut req = request("Alice Smith", date(6, 10), 3);
            req.vin = format!("BOGUS{i}");
            assert!(service.create_draft(req).await.is_err());
        }
        assert!(service.locks.is_empty());

        service.create_draft(request("Alice Smith", date(6, 10), 3)).await.unwrap();
        assert_eq!(service.locks.len(), 1);
    }

    #[tokio::test]
    async fn check_availability_and_booked_ranges() {
        let (_repos, _clock, service) = setup();
        let r = service.create_draft(request("Alice Smith", date(6, 10), 3)).await.unwrap();

        assert!(service.check_availability(V1, date(6, 11), 1).await.unwrap().available);
        assert!(service.booked_ranges(V1).await.unwrap().is_empty());

        service.confirm(r.id).await.unwrap();
        let busy = service.check_availability(V1, date(6, 11), 1).await.unwrap();
        assert!(!busy.available);
        assert!(service.check_availability(V1, date(6, 13), 1).await.unwrap().available);
        assert_eq!(
            service.booked_ranges(V1).await.unwrap(),
            vec![RentalPeriod::new(date(6, 10), 3)]
        );
        assert!(matches!(
            service.check_availability(V1, date(6, 13), 0).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn concurrent_confirmations_never_double_book() {
        let (repos, _clock, service) = setup();
        let service = Arc::new(service);

        let mut ids = Vec::new();
        // Every pair of these four-day periods overlaps.
        for (name, start) in [
            ("Customer A", date(6, 10)),
            ("Customer B", date(6, 11)),
            ("Customer C", date(6, 12)),
            ("Customer D", date(6, 9)),
        ] {
            let r = service.create_draft(request(name, start, 4)).await.unwrap();
            ids.push(r.id);
        }

        let handles: Vec<_> = ids
            .into_iter()
            .map(|id| {
                let service = service.clone();
                tokio::spawn(async move { service.confirm(id).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(DomainError::Conflict(_)) => {}
                Err(other) => panic!("unexpected error {other:?}"),
            }
        }
        assert_eq!(successes, 1);

        let confirmed: Vec<Reservation> = repos
            .reservations()
            .list_for_vehicle(V1)
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.is_confirmed())
            .collect();
        for (i, a) in confirmed.iter().enumerate() {
            for b in &confirmed[i + 1..] {
                assert!(!a.rental_period.overlaps(&b.rental_period));
            }
        }
    }

    // Vehicle store that refuses writes, to exercise the best-effort flag update.
    struct ReadOnlyVehicles(Vec<Vehicle>);

    #[async_trait]
    impl VehicleRepository for ReadOnlyVehicles {
        async fn get(&self, vin: &str) -> DomainResult<Option<Vehicle>> {
            Ok(self.0.iter().find(|v| v.vin == vin).cloned())
        }

        async fn list(&self) -> DomainResult<Vec<Vehicle>> {
            Ok(self.0.clone())
        }

        async fn upsert(&self, _vehicle: Vehicle) -> DomainResult<()> {
            Err(DomainError::Storage("read-only".into()))
        }
    }

    struct ReadOnlyCatalogue {
        vehicles: ReadOnlyVehicles,
        reservations: InMemoryReservationRepository,
    }

    impl RepositoryProvider for ReadOnlyCatalogue {
        fn vehicles(&self) -> &dyn VehicleRepository {
            &self.vehicles
        }

        fn reservations(&self) -> &dyn ReservationRepository {
            &self.reservations
        }
    }

    #[tokio::test]
    async fn listing_failure_does_not_fail_confirmation() {
        let repos = Arc::new(ReadOnlyCatalogue {
            vehicles: ReadOnlyVehicles(fleet()),
            reservations: InMemoryReservationRepository::new(),
        });
        let service = ReservationService::new(repos.clone(), Arc::new(clock()));

        let r = service.create_draft(request("Alice Smith", date(6, 10), 3)).await.unwrap();
        let confirmation = service.confirm(r.id).await.unwrap();

        assert_eq!(confirmation.reservation.status, ReservationStatus::Confirmed);
        assert!(!confirmation.listing.synced);
        assert!(repos.reservations().get(r.id).await.unwrap().unwrap().is_confirmed());
    }
}
