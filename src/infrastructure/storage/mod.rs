//! Storage backends behind the `RepositoryProvider` interface

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileRepositoryProvider;
pub use memory::{InMemoryRepositoryProvider, InMemoryReservationRepository, InMemoryVehicleRepository};
