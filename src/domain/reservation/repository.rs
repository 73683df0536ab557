//! Reservation repository interface

use async_trait::async_trait;

use super::model::Reservation;
use crate::domain::DomainResult;

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Find reservation by ID
    async fn get(&self, id: i64) -> DomainResult<Option<Reservation>>;

    /// All reservations (any status), ordered by ID
    async fn list(&self) -> DomainResult<Vec<Reservation>>;

    /// All reservations (any status) for one vehicle, ordered by ID
    async fn list_for_vehicle(&self, vin: &str) -> DomainResult<Vec<Reservation>>;

    /// Insert or replace a reservation
    async fn upsert(&self, reservation: Reservation) -> DomainResult<()>;

    /// Remove a reservation, returning it if it existed
    async fn delete(&self, id: i64) -> DomainResult<Option<Reservation>>;

    /// Generate next reservation ID
    async fn next_id(&self) -> i64;
}
