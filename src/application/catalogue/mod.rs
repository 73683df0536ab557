pub mod service;

pub use service::{CarQuery, CatalogueFilters, CatalogueService, MAX_SUGGESTIONS};
