//! In-memory storage implementation

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{
    DomainResult, RepositoryProvider, Reservation, ReservationRepository, Vehicle,
    VehicleRepository,
};

/// DashMap-backed vehicle catalogue
#[derive(Default)]
pub struct InMemoryVehicleRepository {
    vehicles: DashMap<String, Vehicle>,
}

impl InMemoryVehicleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vehicles(vehicles: impl IntoIterator<Item = Vehicle>) -> Self {
        let repo = Self::new();
        for v in vehicles {
            repo.vehicles.insert(v.vin.clone(), v);
        }
        repo
    }

    pub(crate) fn snapshot(&self) -> Vec<Vehicle> {
        let mut all: Vec<Vehicle> = self.vehicles.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.vin.cmp(&b.vin));
        all
    }

    pub(crate) fn put(&self, vehicle: Vehicle) -> Option<Vehicle> {
        self.vehicles.insert(vehicle.vin.clone(), vehicle)
    }

    pub(crate) fn remove(&self, vin: &str) {
        self.vehicles.remove(vin);
    }
}

#[async_trait]
impl VehicleRepository for InMemoryVehicleRepository {
    async fn get(&self, vin: &str) -> DomainResult<Option<Vehicle>> {
        Ok(self.vehicles.get(vin).map(|v| v.clone()))
    }

    async fn list(&self) -> DomainResult<Vec<Vehicle>> {
        Ok(self.snapshot())
    }

    async fn upsert(&self, vehicle: Vehicle) -> DomainResult<()> {
        self.put(vehicle);
        Ok(())
    }
}

/// DashMap-backed reservation store with a monotonic ID counter
pub struct InMemoryReservationRepository {
    reservations: DashMap<i64, Reservation>,
    counter: AtomicI64,
}

impl InMemoryReservationRepository {
    pub fn new() -> Self {
        Self {
            reservations: DashMap::new(),
            counter: AtomicI64::new(1),
        }
    }

    /// Load existing records; the ID counter resumes after the highest ID.
    pub fn with_reservations(reservations: impl IntoIterator<Item = Reservation>) -> Self {
        let repo = Self::new();
        let mut max_id = 0;
        for r in reservations {
            max_id = max_id.max(r.id);
            repo.reservations.insert(r.id, r);
        }
        repo.counter.store(max_id + 1, Ordering::SeqCst);
        repo
    }

    pub(crate) fn snapshot(&self) -> Vec<Reservation> {
        let mut all: Vec<Reservation> = self
            .reservations
            .iter()
            .map(|e| e.value().clone())
            .collect();
        all.sort_by_key(|r| r.id);
        all
    }

    pub(crate) fn put(&self, reservation: Reservation) -> Option<Reservation> {
        self.reservations.insert(reservation.id, reservation)
    }

    pub(crate) fn take(&self, id: i64) -> Option<Reservation> {
        self.reservations.remove(&id).map(|(_, r)| r)
    }
}

impl Default for InMemoryReservationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReservationRepository for InMemoryReservationRepository {
    async fn get(&self, id: i64) -> DomainResult<Option<Reservation>> {
        Ok(self.reservations.get(&id).map(|r| r.clone()))
    }

    async fn list(&self) -> DomainResult<Vec<Reservation>> {
        Ok(self.snapshot())
    }

    async fn list_for_vehicle(&self, vin: &str) -> DomainResult<Vec<Reservation>> {
        let mut matching: Vec<Reservation> = self
            .reservations
            .iter()
            .filter(|r| r.vin == vin)
            .map(|r| r.clone())
            .collect();
        matching.sort_by_key(|r| r.id);
        Ok(matching)
    }

    async fn upsert(&self, reservation: Reservation) -> DomainResult<()> {
        self.put(reservation);
        Ok(())
    }

    async fn delete(&self, id: i64) -> DomainResult<Option<Reservation>> {
        Ok(self.take(id))
    }

    async fn next_id(&self) -> i64 {
        self.counter.fetch_add(1, Ordering::SeqCst)
    }
}

/// Process-lifetime storage for development and testing
#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    vehicles: InMemoryVehicleRepository,
    reservations: InMemoryReservationRepository,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vehicles(vehicles: impl IntoIterator<Item = Vehicle>) -> Self {
        Self {
            vehicles: InMemoryVehicleRepository::with_vehicles(vehicles),
            reservations: InMemoryReservationRepository::new(),
        }
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn vehicles(&self) -> &dyn VehicleRepository {
        &self.vehicles
    }

    fn reservations(&self) -> &dyn ReservationRepository {
        &self.reservations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CustomerInfo, RentalPeriod};
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    fn reservation(id: i64, vin: &str) -> Reservation {
        Reservation::new_draft(
            id,
            vin,
            CustomerInfo {
                name: "Test Customer".into(),
                email: "test@example.com".into(),
                phone: "5551234567".into(),
                driver_license: "LIC12345".into(),
            },
            RentalPeriod::new(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(), 2),
            Decimal::from(100),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn ids_are_monotonic() {
        let repo = InMemoryReservationRepository::new();
        let a = repo.next_id().await;
        let b = repo.next_id().await;
        assert_eq!(a, 1);
        assert_eq!(b, 2);
    }

    #[tokio::test]
    async fn counter_resumes_after_loaded_records() {
        let repo =
            InMemoryReservationRepository::with_reservations(vec![reservation(7, "A"), reservation(3, "A")]);
        assert_eq!(repo.next_id().await, 8);
    }

    #[tokio::test]
    async fn list_for_vehicle_filters_and_orders() {
        let repo = InMemoryReservationRepository::new();
        repo.upsert(reservation(2, "A")).await.unwrap();
        repo.upsert(reservation(1, "A")).await.unwrap();
        repo.upsert(reservation(3, "B")).await.unwrap();

        let ids: Vec<i64> = repo
            .list_for_vehicle("A")
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn delete_returns_removed_record() {
        let repo = InMemoryReservationRepository::new();
        repo.upsert(reservation(1, "A")).await.unwrap();
        assert!(repo.delete(1).await.unwrap().is_some());
        assert!(repo.delete(1).await.unwrap().is_none());
        assert!(repo.get(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn vehicles_listed_by_vin() {
        let repo = InMemoryVehicleRepository::with_vehicles(vec![
            Vehicle::new("B", "Ford", "Focus", "Hatchback", 2020, Decimal::from(30)),
            Vehicle::new("A", "Kia", "Rio", "Sedan", 2021, Decimal::from(28)),
        ]);
        let vins: Vec<String> = repo.list().await.unwrap().into_iter().map(|v| v.vin).collect();
        assert_eq!(vins, vec!["A".to_string(), "B".to_string()]);
    }
}
