//! Reusable server runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: storage, catalogue seeding,
//! services, the REST API, the draft sweep task, metrics and graceful
//! shutdown. The CLI binary is a thin wrapper around it.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::application::{start_draft_sweep_task, CatalogueService, ReservationService};
use crate::config::{AppConfig, StorageBackend};
use crate::domain::{DomainResult, RepositoryProvider, SharedClock, SystemClock};
use crate::infrastructure::{seed_catalogue, InMemoryRepositoryProvider, JsonFileRepositoryProvider};
use crate::interfaces::http::{create_api_router, HttpState};
use crate::shared::shutdown::{listen_for_shutdown_signals, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the service.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Time source for the reservation lifecycle (default: wall clock).
    pub clock: SharedClock,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            clock: Arc::new(SystemClock),
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running service.
///
/// ```rust,no_run
/// use car_rental::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     // ... wait for shutdown signal ...
///     handle.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub repos: Arc<dyn RepositoryProvider>,
    pub catalogue: Arc<CatalogueService>,
    pub reservations: Arc<ReservationService>,
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Address the REST API is bound to.
    pub local_addr: SocketAddr,

    shutdown: ShutdownSignal,
    api_task: JoinHandle<()>,
    sweep_task: JoinHandle<()>,
}

impl ServerHandle {
    /// Start the service:
    /// 1. Install the Prometheus recorder
    /// 2. Open storage and seed the catalogue if it is empty
    /// 3. Start the draft sweep task
    /// 4. Start the REST API (with Swagger UI)
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        app_cfg.validate()?;

        info!("Starting car rental service...");

        let prometheus_handle = prometheus_handle();

        // ── Storage ────────────────────────────────────────────
        let repos = open_storage(&app_cfg).await?;
        if app_cfg.storage.seed_catalogue {
            seed_catalogue(repos.as_ref()).await?;
        }

        // ── Services ───────────────────────────────────────────
        let catalogue = Arc::new(CatalogueService::new(repos.clone()));
        let reservations = Arc::new(
            ReservationService::new(repos.clone(), opts.clock)
                .with_policy(app_cfg.reservations.policy()),
        );

        // ── Background tasks ───────────────────────────────────
        let shutdown = ShutdownSignal::new();
        let sweep_task = start_draft_sweep_task(
            reservations.clone(),
            shutdown.clone(),
            Duration::from_secs(app_cfg.reservations.sweep_interval_secs),
        );

        // ── REST API server ────────────────────────────────────
        let router = create_api_router(
            HttpState::new(catalogue.clone(), reservations.clone()),
            prometheus_handle,
        );

        let listener = tokio::net::TcpListener::bind(app_cfg.address()).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API server listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let api_shutdown = shutdown.clone();
        let api_server = axum::serve(listener, router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("🛑 REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        info!("🚀 Car rental service started.");

        Ok(Self {
            repos,
            catalogue,
            reservations,
            config: app_cfg,
            local_addr,
            shutdown,
            api_task,
            sweep_task,
        })
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        tokio::spawn(listen_for_shutdown_signals(self.shutdown.clone()));
    }

    /// Trigger graceful shutdown (non-blocking).
    pub fn trigger_shutdown(&self) {
        self.shutdown.trigger();
    }

    /// Wait for the server to stop after shutdown has been triggered,
    /// giving in-flight requests up to `server.shutdown_timeout` seconds.
    pub async fn wait(self) {
        info!("⏳ Waiting for server tasks to complete...");
        let grace = Duration::from_secs(self.config.server.shutdown_timeout);

        match tokio::time::timeout(grace, self.api_task).await {
            Ok(Ok(())) => info!("REST API server stopped"),
            Ok(Err(e)) => error!("REST API server task panicked: {}", e),
            Err(_) => warn!(timeout_secs = grace.as_secs(), "REST API server did not stop in time"),
        }

        match tokio::time::timeout(grace, self.sweep_task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("Draft sweep task panicked: {}", e),
            Err(_) => warn!("Draft sweep task did not stop in time"),
        }

        info!("👋 Car rental service shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("🛑 Shutting down car rental service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// The global metrics recorder can only be installed once per process, so
/// a restart within the same process reuses the first handle.
fn prometheus_handle() -> PrometheusHandle {
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    PROM_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("📊 Prometheus metrics recorder installed");
                handle
            }
            Err(e) => {
                warn!(error = %e, "Prometheus recorder not installed, /metrics will be empty");
                PrometheusBuilder::new().build_recorder().handle()
            }
        })
        .clone()
}

async fn open_storage(config: &AppConfig) -> DomainResult<Arc<dyn RepositoryProvider>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            info!("💾 Using in-memory storage");
            Ok(Arc::new(InMemoryRepositoryProvider::new()))
        }
        StorageBackend::Json => Ok(Arc::new(
            JsonFileRepositoryProvider::open(&config.storage.data_dir).await?,
        )),
    }
}

/// Initialize tracing (logging) from the application config.
///
/// `RUST_LOG` overrides `logging.level`. Call once at process startup,
/// before [`ServerHandle::start`]; later calls are ignored.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let result = match config.logging.format.to_lowercase().as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
    };

    if result.is_err() {
        warn!("Tracing subscriber already initialised");
    }
}
