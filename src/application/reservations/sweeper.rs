//! Background task that periodically removes stale drafts.
//!
//! The first sweep runs immediately on start, then every `interval`.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{info, warn};

use super::service::ReservationService;
use crate::shared::shutdown::ShutdownSignal;

pub fn start_draft_sweep_task(
    service: Arc<ReservationService>,
    shutdown: ShutdownSignal,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_secs = interval.as_secs(),
            retention_hours = service.policy().draft_retention.num_hours(),
            "🧹 Draft sweep task started"
        );

        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = service.sweep().await {
                        warn!(error = %e, "Draft sweep failed");
                    }
                }
                _ = shutdown.notified().wait() => {
                    info!("🧹 Draft sweep task shutting down");
                    break;
                }
            }
        }

        info!("🧹 Draft sweep task stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CustomerInfo, FixedClock, RepositoryProvider, Vehicle};
    use crate::application::reservations::NewReservation;
    use crate::infrastructure::InMemoryRepositoryProvider;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn sweeps_on_start_and_stops_on_shutdown() {
        let repos = Arc::new(InMemoryRepositoryProvider::with_vehicles(vec![Vehicle::new(
            "V1",
            "Kia",
            "Rio",
            "Sedan",
            2021,
            Decimal::from(30),
        )]));
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap());
        let service = Arc::new(ReservationService::new(repos.clone(), Arc::new(clock.clone())));

        let draft = service
            .create_draft(NewReservation {
                vin: "V1".into(),
                customer: CustomerInfo {
                    name: "Alice Smith".into(),
                    email: "alice@example.com".into(),
                    phone: "5550001111".into(),
                    driver_license: "DL12345".into(),
                },
                start_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
                days: 2,
            })
            .await
            .unwrap();
        clock.advance(chrono::Duration::hours(30));

        let shutdown = ShutdownSignal::new();
        let handle = start_draft_sweep_task(service, shutdown.clone(), Duration::from_secs(3600));

        let mut removed = false;
        for _ in 0..50 {
            if repos.reservations().get(draft.id).await.unwrap().is_none() {
                removed = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(removed);

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweep task should stop")
            .unwrap();
    }
}
