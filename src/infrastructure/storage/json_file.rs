//! JSON-file-backed storage
//!
//! Keeps the working set in the in-memory repositories and rewrites the
//! whole collection file after every mutation. Writes go to a temporary
//! file that is renamed over the target, so a crash never leaves a
//! half-written collection behind. If the write fails the in-memory change
//! is rolled back and the caller gets `DomainError::Storage`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::memory::{InMemoryReservationRepository, InMemoryVehicleRepository};
use crate::domain::{
    DomainResult, RepositoryProvider, Reservation, ReservationRepository, Vehicle,
    VehicleRepository,
};

pub const VEHICLES_FILE: &str = "cars.json";
pub const RESERVATIONS_FILE: &str = "orders.json";

/// One collection file. The mutex serializes mutate-then-write so two
/// writers can never persist snapshots out of order.
struct JsonFile {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// A missing file is an empty collection.
    async fn load<T: DeserializeOwned>(&self) -> DomainResult<Vec<T>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write<T: Serialize>(&self, records: &[T]) -> DomainResult<()> {
        let body = serde_json::to_vec_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), records = records.len(), "Collection written");
        Ok(())
    }
}

pub struct JsonFileVehicleRepository {
    inner: InMemoryVehicleRepository,
    file: JsonFile,
}

#[async_trait]
impl VehicleRepository for JsonFileVehicleRepository {
    async fn get(&self, vin: &str) -> DomainResult<Option<Vehicle>> {
        self.inner.get(vin).await
    }

    async fn list(&self) -> DomainResult<Vec<Vehicle>> {
        self.inner.list().await
    }

    async fn upsert(&self, vehicle: Vehicle) -> DomainResult<()> {
        let _guard = self.file.write_lock.lock().await;
        let vin = vehicle.vin.clone();
        let previous = self.inner.put(vehicle);

        if let Err(e) = self.file.write(&self.inner.snapshot()).await {
            match previous {
                Some(old) => {
                    self.inner.put(old);
                }
                None => self.inner.remove(&vin),
            }
            return Err(e);
        }
        Ok(())
    }
}

pub struct JsonFileReservationRepository {
    inner: InMemoryReservationRepository,
    file: JsonFile,
}

#[async_trait]
impl ReservationRepository for JsonFileReservationRepository {
    async fn get(&self, id: i64) -> DomainResult<Option<Reservation>> {
        self.inner.get(id).await
    }

    async fn list(&self) -> DomainResult<Vec<Reservation>> {
        self.inner.list().await
    }

    async fn list_for_vehicle(&self, vin: &str) -> DomainResult<Vec<Reservation>> {
        self.inner.list_for_vehicle(vin).await
    }

    async fn upsert(&self, reservation: Reservation) -> DomainResult<()> {
        let _guard = self.file.write_lock.lock().await;
        let id = reservation.id;
        let previous = self.inner.put(reservation);

        if let Err(e) = self.file.write(&self.inner.snapshot()).await {
            match previous {
                Some(old) => {
                    self.inner.put(old);
                }
                None => {
                    self.inner.take(id);
                }
            }
            return Err(e);
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> DomainResult<Option<Reservation>> {
        let _guard = self.file.write_lock.lock().await;
        let Some(removed) = self.inner.take(id) else {
            return Ok(None);
        };

        if let Err(e) = self.file.write(&self.inner.snapshot()).await {
            self.inner.put(removed);
            return Err(e);
        }
        Ok(Some(removed))
    }

    async fn next_id(&self) -> i64 {
        self.inner.next_id().await
    }
}

/// Storage rooted at a data directory holding `cars.json` and `orders.json`.
pub struct JsonFileRepositoryProvider {
    vehicles: JsonFileVehicleRepository,
    reservations: JsonFileReservationRepository,
}

impl JsonFileRepositoryProvider {
    /// Create the data directory if needed and load both collections.
    pub async fn open(data_dir: impl AsRef<Path>) -> DomainResult<Self> {
        let data_dir = data_dir.as_ref();
        tokio::fs::create_dir_all(data_dir).await?;

        let vehicles_file = JsonFile::new(data_dir.join(VEHICLES_FILE));
        let reservations_file = JsonFile::new(data_dir.join(RESERVATIONS_FILE));

        let vehicles: Vec<Vehicle> = vehicles_file.load().await?;
        let reservations: Vec<Reservation> = reservations_file.load().await?;

        info!(
            data_dir = %data_dir.display(),
            vehicles = vehicles.len(),
            reservations = reservations.len(),
            "📂 JSON storage loaded"
        );

        Ok(Self {
            vehicles: JsonFileVehicleRepository {
                inner: InMemoryVehicleRepository::with_vehicles(vehicles),
                file: vehicles_file,
            },
            reservations: JsonFileReservationRepository {
                inner: InMemoryReservationRepository::with_reservations(reservations),
                file: reservations_file,
            },
        })
    }
}

impl RepositoryProvider for JsonFileRepositoryProvider {
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
    use crate::domain::{CustomerInfo, DomainError, RentalPeriod};
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("car-rental-{}-{}", tag, uuid::Uuid::new_v4()))
    }

    fn vehicle(vin: &str) -> Vehicle {
        Vehicle::new(vin, "Mazda", "3", "Sedan", 2023, Decimal::from(50))
    }

    fn reservation(id: i64) -> Reservation {
        Reservation::new_draft(
            id,
            "VIN-A",
            CustomerInfo {
                name: "Jo Doe".into(),
                email: "jo@example.com".into(),
                phone: "0123456789".into(),
                driver_license: "ABCDE".into(),
            },
            RentalPeriod::new(NaiveDate::from_ymd_opt(2031, 3, 1).unwrap(), 4),
            Decimal::from(200),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn missing_directory_opens_empty() {
        let dir = temp_dir("empty");
        let repos = JsonFileRepositoryProvider::open(&dir).await.unwrap();
        assert!(repos.vehicles().list().await.unwrap().is_empty());
        assert!(repos.reservations().list().await.unwrap().is_empty());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = temp_dir("reopen");
        {
            let repos = JsonFileRepositoryProvider::open(&dir).await.unwrap();
            repos.vehicles().upsert(vehicle("VIN-A")).await.unwrap();
            let id = repos.reservations().next_id().await;
            repos.reservations().upsert(reservation(id)).await.unwrap();
        }

        let reopened = JsonFileRepositoryProvider::open(&dir).await.unwrap();
        assert!(reopened.vehicles().get("VIN-A").await.unwrap().is_some());
        let stored = reopened.reservations().get(1).await.unwrap().unwrap();
        assert_eq!(stored.total_price, Decimal::from(200));
        assert_eq!(reopened.reservations().next_id().await, 2);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn delete_is_persisted() {
        let dir = temp_dir("delete");
        {
            let repos = JsonFileRepositoryProvider::open(&dir).await.unwrap();
            repos.reservations().upsert(reservation(1)).await.unwrap();
            repos.reservations().upsert(reservation(2)).await.unwrap();
            assert!(repos.reservations().delete(1).await.unwrap().is_some());
        }

        let reopened = JsonFileRepositoryProvider::open(&dir).await.unwrap();
        let ids: Vec<i64> = reopened
            .reservations()
            .list()
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![2]);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn failed_write_rolls_back_memory() {
        let dir = temp_dir("rollback");
        let repos = JsonFileRepositoryProvider::open(&dir).await.unwrap();
        repos.reservations().upsert(reservation(1)).await.unwrap();

        // A directory squatting on the temp path makes the write fail.
        std::fs::create_dir_all(dir.join("orders.json.tmp")).unwrap();

        let err = repos.reservations().upsert(reservation(2)).await.unwrap_err();
        assert!(matches!(err, DomainError::Storage(_)));
        assert!(repos.reservations().get(2).await.unwrap().is_none());

        let err = repos.reservations().delete(1).await.unwrap_err();
        assert!(matches!(err, DomainError::Storage(_)));
        assert!(repos.reservations().get(1).await.unwrap().is_some());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn corrupt_file_is_a_storage_error() {
        let dir = temp_dir("corrupt");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(VEHICLES_FILE), b"{ not json").unwrap();

        let err = JsonFileRepositoryProvider::open(&dir).await.err().unwrap();
        assert!(matches!(err, DomainError::Storage(_)));
        let _ = std::fs::remove_dir_all(dir);
    }
}
