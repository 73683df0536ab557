//! Repository access for the domain layer
//!
//! `RepositoryProvider` gives unified access to the per-aggregate
//! repositories. Consumers request only the repository they need:
//!
//! ```ignore
//! async fn handle(repos: &dyn RepositoryProvider) -> DomainResult<()> {
//!     let car = repos.vehicles().get("JT2BF22K1W0123456").await?;
//!     let bookings = repos.reservations().list_for_vehicle("JT2BF22K1W0123456").await?;
//!     Ok(())
//! }
//! ```

use super::reservation::ReservationRepository;
use super::vehicle::VehicleRepository;

pub trait RepositoryProvider: Send + Sync {
    fn vehicles(&self) -> &dyn VehicleRepository;
    fn reservations(&self) -> &dyn ReservationRepository;
}
