//! Vehicle repository interface

use async_trait::async_trait;

use super::model::Vehicle;
use crate::domain::DomainResult;

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    /// Find vehicle by VIN
    async fn get(&self, vin: &str) -> DomainResult<Option<Vehicle>>;

    /// All vehicles in catalogue order
    async fn list(&self) -> DomainResult<Vec<Vehicle>>;

    /// Insert or replace a vehicle
    async fn upsert(&self, vehicle: Vehicle) -> DomainResult<()>;
}
