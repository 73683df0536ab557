//! Vehicle domain entity

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

/// A rentable car in the catalogue.
///
/// `available_for_listing` is a coarse hint for the catalogue UI. Booking
/// conflicts are decided from confirmed reservations, never from this flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    /// Unique identifier (VIN)
    pub vin: String,
    pub brand: String,
    pub model: String,
    #[serde(rename = "type")]
    pub vehicle_type: String,
    pub year: u16,
    /// Odometer reading in kilometres
    #[serde(default)]
    pub mileage: u32,
    #[serde(default)]
    pub fuel_type: String,
    pub price_per_day: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "available", alias = "availableForListing", default = "listed")]
    pub available_for_listing: bool,
}

fn listed() -> bool {
    true
}

impl Vehicle {
    pub fn new(
        vin: impl Into<String>,
        brand: impl Into<String>,
        model: impl Into<String>,
        vehicle_type: impl Into<String>,
        year: u16,
        price_per_day: Decimal,
    ) -> Self {
        Self {
            vin: vin.into(),
            brand: brand.into(),
            model: model.into(),
            vehicle_type: vehicle_type.into(),
            year,
            mileage: 0,
            fuel_type: String::new(),
            price_per_day,
            image: None,
            description: None,
            available_for_listing: true,
        }
    }

    pub fn with_details(
        mut self,
        mileage: u32,
        fuel_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.mileage = mileage;
        self.fuel_type = fuel_type.into();
        self.description = Some(description.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Total for `days` whole days at the current daily rate.
    pub fn quote(&self, days: u32) -> DomainResult<Decimal> {
        self.price_per_day
            .checked_mul(Decimal::from(days))
            .ok_or_else(|| DomainError::validation("totalPrice: exceeds the supported range"))
    }

    /// Case-insensitive substring match over brand, model, type and description.
    pub fn matches_text(&self, needle_lower: &str) -> bool {
        self.brand.to_lowercase().contains(needle_lower)
            || self.model.to_lowercase().contains(needle_lower)
            || self.vehicle_type.to_lowercase().contains(needle_lower)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle_lower))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vehicle {
        Vehicle::new("VIN001", "Toyota", "Corolla", "Sedan", 2022, Decimal::from(45))
            .with_details(12_000, "Petrol", "Reliable compact sedan")
    }

    #[test]
    fn quote_multiplies_daily_rate() {
        assert_eq!(sample().quote(3).unwrap(), Decimal::from(135));
    }

    #[test]
    fn quote_overflow_is_a_validation_error() {
        let mut v = sample();
        v.price_per_day = Decimal::MAX;
        assert!(matches!(v.quote(2), Err(DomainError::Validation(_))));
    }

    #[test]
    fn matches_text_checks_description() {
        let v = sample();
        assert!(v.matches_text("compact"));
        assert!(v.matches_text("toyota"));
        assert!(!v.matches_text("diesel"));
    }

    #[test]
    fn deserializes_catalogue_json() {
        let json = r#"{
            "vin": "JT123",
            "brand": "Toyota",
            "model": "RAV4",
            "type": "SUV",
            "year": 2021,
            "mileage": 30000,
            "fuelType": "Hybrid",
            "pricePerDay": 65,
            "image": "/images/rav4.jpg",
            "description": "Family SUV",
            "available": false
        }"#;
        let v: Vehicle = serde_json::from_str(json).unwrap();
        assert_eq!(v.vehicle_type, "SUV");
        assert_eq!(v.price_per_day, Decimal::from(65));
        assert!(!v.available_for_listing);
    }

    #[test]
    fn missing_flag_defaults_to_listed() {
        let json = r#"{"vin":"X","brand":"B","model":"M","type":"T","year":2020,"pricePerDay":10}"#;
        let v: Vehicle = serde_json::from_str(json).unwrap();
        assert!(v.available_for_listing);
    }
}
