//! Infrastructure layer - storage backends and catalogue seeding

pub mod seed;
pub mod storage;

pub use seed::{default_fleet, seed_catalogue};
pub use storage::{InMemoryRepositoryProvider, JsonFileRepositoryProvider};
