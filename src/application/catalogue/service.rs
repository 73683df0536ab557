//! Catalogue queries: listing, search, filters and suggestions.
//!
//! Read-only; never takes vehicle locks. The listing flag it returns may
//! trail a confirmation by a moment.

use std::sync::Arc;

use crate::domain::{DomainError, DomainResult, RepositoryProvider, Vehicle};

pub const MAX_SUGGESTIONS: usize = 5;

/// Search parameters for the vehicle listing
#[derive(Debug, Clone, Default)]
pub struct CarQuery {
    /// Case-insensitive substring over brand, model, type and description
    pub search: Option<String>,
    /// Case-insensitive exact type match
    pub vehicle_type: Option<String>,
    /// Case-insensitive exact brand match
    pub brand: Option<String>,
}

impl CarQuery {
    fn matches(&self, vehicle: &Vehicle) -> bool {
        if let Some(search) = non_blank(&self.search) {
            if !vehicle.matches_text(&search.to_lowercase()) {
                return false;
            }
        }
        if let Some(t) = non_blank(&self.vehicle_type) {
            if !vehicle.vehicle_type.eq_ignore_ascii_case(t) {
                return false;
            }
        }
        if let Some(b) = non_blank(&self.brand) {
            if !vehicle.brand.eq_ignore_ascii_case(b) {
                return false;
            }
        }
        true
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogueFilters {
    pub types: Vec<String>,
    pub brands: Vec<String>,
}

pub struct CatalogueService {
    repos: Arc<dyn RepositoryProvider>,
}

impl CatalogueService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn search(&self, query: &CarQuery) -> DomainResult<Vec<Vehicle>> {
        Ok(self
            .repos
            .vehicles()
            .list()
            .await?
            .into_iter()
            .filter(|v| query.matches(v))
            .collect())
    }

    pub async fn get(&self, vin: &str) -> DomainResult<Vehicle> {
        self.repos
            .vehicles()
            .get(vin)
            .await?
            .ok_or_else(|| DomainError::vehicle_not_found(vin))
    }

    pub async fn filters(&self) -> DomainResult<CatalogueFilters> {
        let mut filters = CatalogueFilters::default();
        for v in self.repos.vehicles().list().await? {
            push_unique(&mut filters.types, v.vehicle_type);
            push_unique(&mut filters.brands, v.brand);
        }
        Ok(filters)
    }

    /// Up to [`MAX_SUGGESTIONS`] distinct brands, "brand model" pairs and
    /// types containing `q`. A blank query yields nothing.
    pub async fn suggestions(&self, q: &str) -> DomainResult<Vec<String>> {
        let needle = q.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let mut out = Vec::new();
        for v in self.repos.vehicles().list().await? {
            if v.brand.to_lowercase().contains(&needle) {
                push_unique(&mut out, v.brand.clone());
            }
            if v.model.to_lowercase().contains(&needle) {
                push_unique(&mut out, format!("{} {}", v.brand, v.model));
            }
            if v.vehicle_type.to_lowercase().contains(&needle) {
                push_unique(&mut out, v.vehicle_type.clone());
            }
            if out.len() >= MAX_SUGGESTIONS {
                break;
            }
        }
        out.truncate(MAX_SUGGESTIONS);
        Ok(out)
    }

    /// Vehicle and reservation counts for the health endpoint.
    pub async fn counts(&self) -> DomainResult<(usize, usize)> {
        let vehicles = self.repos.vehicles().list().await?.len();
        let reservations = self.repos.reservations().list().await?.len();
        Ok((vehicles, reservations))
    }
}

fn push_unique(values: &mut Vec<String>, value: String) {
    if !values.contains(&value) {
        values.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{default_fleet, InMemoryRepositoryProvider};
    use rust_decimal::Decimal;

    fn service() -> CatalogueService {
        CatalogueService::new(Arc::new(InMemoryRepositoryProvider::with_vehicles(
            default_fleet(),
        )))
    }

    #[tokio::test]
    async fn empty_query_lists_everything() {
        let all = service().search(&CarQuery::default()).await.unwrap();
        assert_eq!(all.len(), default_fleet().len());
    }

    #[tokio::test]
    async fn search_is_case_insensitive_substring() {
        let query = CarQuery {
            search: Some("hYbRiD".into()),
            ..Default::default()
        };
        let found = service().search(&query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].model, "RAV4");
    }

    #[tokio::test]
    async fn type_and_brand_are_exact_matches() {
        let svc = service();
        let sedans = svc
            .search(&CarQuery {
                vehicle_type: Some("sedan".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(sedans.iter().all(|v| v.vehicle_type == "Sedan"));
        assert_eq!(sedans.len(), 3);

        let toyota_sedans = svc
            .search(&CarQuery {
                vehicle_type: Some("Sedan".into()),
                brand: Some("TOYOTA".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(toyota_sedans.len(), 1);
        assert_eq!(toyota_sedans[0].model, "Corolla");

        let partial = svc
            .search(&CarQuery {
                brand: Some("Toy".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(partial.is_empty());
    }

    #[tokio::test]
    async fn get_missing_vehicle_is_not_found() {
        let err = service().get("missing").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "vehicle", .. }));
    }

    #[tokio::test]
    async fn filters_are_distinct() {
        let filters = service().filters().await.unwrap();
        assert_eq!(filters.brands.iter().filter(|b| *b == "Honda").count(), 1);
        assert_eq!(filters.types.iter().filter(|t| *t == "Sedan").count(), 1);
        assert!(filters.types.contains(&"Minivan".to_string()));
    }

    #[tokio::test]
    async fn suggestions_cover_brand_model_and_type() {
        let svc = service();
        let honda = svc.suggestions("hon").await.unwrap();
        assert_eq!(honda, vec!["Honda".to_string()]);

        let civic = svc.suggestions("civ").await.unwrap();
        assert_eq!(civic, vec!["Honda Civic".to_string()]);

        assert_eq!(svc.suggestions("suv").await.unwrap(), vec!["SUV".to_string()]);
        assert!(svc.suggestions("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn suggestions_are_capped() {
        let vehicles = (0..10).map(|i| {
            Vehicle::new(
                format!("VIN{i}"),
                format!("Brand{i}"),
                "Model",
                "Type",
                2020,
                Decimal::from(10),
            )
        });
        let svc = CatalogueService::new(Arc::new(InMemoryRepositoryProvider::with_vehicles(
            vehicles,
        )));
        assert_eq!(svc.suggestions("brand").await.unwrap().len(), MAX_SUGGESTIONS);
    }
}
