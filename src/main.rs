//! PunchOut Storefront
//!
//! B2B storefront gateway for Ariba PunchOut:
//! - cXML PunchOutSetupRequest authentication (shared secret + Ariba identity binding)
//! - Contract-priced cart reconciliation for edit/inspect sessions
//! - Time-boxed PunchOut sessions redeemed for bearer tokens
//! - Background sweep of expired sessions

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};

use api::{router, AppState, JwtConfig};
use punchout::{AppSettings, AribaConfig};
use storefront_store::{MemoryStore, SeedData, StoreConfig, StorefrontStore};
use telemetry::{health, init_tracing_from_env};
use worker::{WorkerConfig, WorkerScheduler};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    #[serde(default)]
    ariba: AribaConfig,

    #[serde(default)]
    app: AppSettings,

    #[serde(default)]
    jwt: JwtConfig,

    #[serde(default)]
    store: StoreConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ariba: AribaConfig::default(),
            app: AppSettings::default(),
            jwt: JwtConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting PunchOut Storefront v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;

    info!(
        storefront_url = %config.app.storefront_url,
        session_ttl_minutes = config.ariba.session_ttl_minutes,
        shared_secret_configured = config.ariba.shared_secret.as_deref().is_some_and(|s| !s.is_empty()),
        "Loaded PunchOut config"
    );

    let store = Arc::new(MemoryStore::new(&config.store));

    if let Some(path) = &config.store.seed_path {
        let seed = SeedData::from_path(path)
            .with_context(|| format!("Failed to load seed data from {}", path))?;
        let summary = seed.apply(&store);
        info!(
            path = %path,
            users = summary.users,
            carts = summary.carts,
            cart_items = summary.cart_items,
            contract_items = summary.contract_items,
            taxonomy_inserted = summary.taxonomy_inserted,
            taxonomy_updated = summary.taxonomy_updated,
            rejected = summary.rejected,
            "Seed data loaded"
        );
    } else {
        warn!("No seed data configured; starting with an empty store");
    }

    let store: Arc<dyn StorefrontStore> = store;

    check_health(store.as_ref()).await;

    // Start background workers
    let worker_config = WorkerConfig {
        sweep_interval: Duration::from_secs(config.store.sweep_interval_secs.max(1)),
        sweep_grace_minutes: config.store.sweep_grace_minutes,
    };
    let worker_scheduler = Arc::new(WorkerScheduler::new(worker_config, store.clone()));
    let worker_handles = worker_scheduler.start();

    let state = AppState::new(
        store.clone(),
        config.ariba.clone(),
        &config.app,
        config.jwt.clone(),
    )
    .context("Failed to build application state")?;

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down...");
    for handle in worker_handles {
        handle.abort();
    }

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables, e.g. STOREFRONT_ARIBA__SHARED_SECRET
        .add_source(
            config::Environment::with_prefix("STOREFRONT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Flat aliases for the secrets, as most deployments inject them
    if let Ok(secret) = std::env::var("ARIBA_SHARED_SECRET") {
        config.ariba.shared_secret = Some(secret);
    }
    if let Ok(key) = std::env::var("JWT_KEY") {
        config.jwt.key = key;
    }

    Ok(config)
}

/// Check component health on startup.
async fn check_health(store: &dyn StorefrontStore) {
    if storefront_store::health::check_connection(store).await {
        health().store.set_healthy();
        info!("Store connection: healthy");
    } else {
        health().store.set_unhealthy("Connection failed");
        error!("Store connection: unhealthy");
    }
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
