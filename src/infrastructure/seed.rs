//! Default catalogue used when the vehicle store starts empty.

use rust_decimal::Decimal;
use tracing::info;

use crate::domain::{DomainResult, RepositoryProvider, Vehicle};

pub fn default_fleet() -> Vec<Vehicle> {
    vec![
        Vehicle::new("1HGCM82633A004352", "Honda", "Civic", "Sedan", 2022, Decimal::from(45))
            .with_details(18_500, "Petrol", "Economical compact sedan, ideal for city driving")
            .with_image("/images/honda-civic.jpg"),
        Vehicle::new("JTMBFREV0JJ123456", "Toyota", "RAV4", "SUV", 2023, Decimal::from(65))
            .with_details(9_200, "Hybrid", "Spacious hybrid SUV with all-wheel drive")
            .with_image("/images/toyota-rav4.jpg"),
        Vehicle::new("WBA8E9G50GNT12345", "BMW", "3 Series", "Sedan", 2021, Decimal::from(89))
            .with_details(27_000, "Petrol", "Premium sports sedan with leather interior")
            .with_image("/images/bmw-3.jpg"),
        Vehicle::new("5YJ3E1EA7KF317000", "Tesla", "Model 3", "Electric", 2023, Decimal::from(99))
            .with_details(6_400, "Electric", "Long range electric sedan with autopilot")
            .with_image("/images/tesla-model3.jpg"),
        Vehicle::new("1FTFW1E50MFA00001", "Ford", "F-150", "Truck", 2021, Decimal::from(79))
            .with_details(31_800, "Petrol", "Full-size pickup for hauling and towing")
            .with_image("/images/ford-f150.jpg"),
        Vehicle::new("2T1BURHE5JC000002", "Toyota", "Corolla", "Sedan", 2020, Decimal::from(39))
            .with_details(42_100, "Petrol", "Dependable everyday sedan")
            .with_image("/images/toyota-corolla.jpg"),
        Vehicle::new("WVWZZZAUZKW000003", "Volkswagen", "Golf", "Hatchback", 2022, Decimal::from(42))
            .with_details(15_300, "Diesel", "Practical hatchback with frugal diesel engine")
            .with_image("/images/vw-golf.jpg"),
        Vehicle::new("5FNRL6H79LB000004", "Honda", "Odyssey", "Minivan", 2020, Decimal::from(72))
            .with_details(38_900, "Petrol", "Eight-seat minivan for family trips")
            .with_image("/images/honda-odyssey.jpg"),
    ]
}

/// Insert the default fleet if the catalogue is empty. Returns the number
/// of vehicles inserted.
pub async fn seed_catalogue(repos: &dyn RepositoryProvider) -> DomainResult<usize> {
    if !repos.vehicles().list().await?.is_empty() {
        return Ok(0);
    }

    let fleet = default_fleet();
    let count = fleet.len();
    for vehicle in fleet {
        repos.vehicles().upsert(vehicle).await?;
    }
    info!(count, "🚗 Catalogue seeded with default fleet");
    Ok(count)
}
