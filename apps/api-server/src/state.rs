//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use defender_core::RequestGovernor;
use defender_core::GovernorConfig;
use defender_core::ports::{ApiTokenResolver, Clock, CounterStore, OrganizationRepository};
use defender_infra::{
    InMemoryCounterStore, InMemoryOrganizationRepository, InMemoryTokenResolver, SystemClock,
};

#[cfg(feature = "postgres")]
use defender_infra::{
    DatabaseConnections, PostgresApiApplicationRepository, PostgresOrganizationRepository,
};
#[cfg(feature = "redis")]
use defender_infra::RedisCounterStore;

use crate::config::AppConfig;
use crate::listing::OrganizationListing;

/// How often expired in-memory counters are dropped.
const PURGE_INTERVAL: Duration = Duration::from_secs(300);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub governor: Arc<RequestGovernor>,
    pub organizations: Arc<OrganizationListing>,
    pub public_base_url: Option<String>,
    /// Take the client address from forwarding headers.
    pub trust_forwarded_for: bool,
    /// Name of the counter backend, reported by the health endpoint.
    pub counter_backend: &'static str,
}

/// Counter store picked at startup.
enum Counters {
    Memory(Arc<InMemoryCounterStore>),
    #[cfg(feature = "redis")]
    Redis(Arc<RedisCounterStore>),
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let (store, counter_backend): (Arc<dyn CounterStore>, &'static str) =
            match init_counters(config).await? {
                Counters::Memory(store) => {
                    spawn_purge_task(store.clone());
                    (store, "memory")
                }
                #[cfg(feature = "redis")]
                Counters::Redis(store) => (store, "redis"),
            };

        let (tokens, organizations) = init_storage(config).await;

        let mut state = Self::from_parts(
            config.governor.clone(),
            store,
            tokens,
            organizations,
            Arc::new(SystemClock),
            config.public_base_url.clone(),
            counter_backend,
        );
        state.trust_forwarded_for = config.trust_forwarded_for;
        tracing::info!(
            counter_backend,
            trust_forwarded_for = state.trust_forwarded_for,
            "Application state initialized"
        );

        Ok(state)
    }

    /// Assemble the state from already-built adapters.
    pub fn from_parts(
        governor: GovernorConfig,
        store: Arc<dyn CounterStore>,
        tokens: Arc<dyn ApiTokenResolver>,
        organizations: Arc<dyn OrganizationRepository>,
        clock: Arc<dyn Clock>,
        public_base_url: Option<String>,
        counter_backend: &'static str,
    ) -> Self {
        Self {
            governor: Arc::new(RequestGovernor::new(governor, store, tokens, clock)),
            organizations: Arc::new(OrganizationListing::new(organizations)),
            public_base_url,
            trust_forwarded_for: false,
            counter_backend,
        }
    }
}

#[cfg(feature = "redis")]
async fn init_counters(config: &AppConfig) -> anyhow::Result<Counters> {
    let Some(redis) = &config.redis else {
        tracing::warn!("REDIS_URL not set. Counting requests in memory (per process).");
        return Ok(Counters::Memory(Arc::new(InMemoryCounterStore::new())));
    };

    match RedisCounterStore::new(redis).await {
        Ok(store) => Ok(Counters::Redis(Arc::new(store))),
        Err(e) if redis.fallback_to_memory => {
            tracing::error!("Failed to connect to Redis: {}. Using in-memory fallback.", e);
            Ok(Counters::Memory(Arc::new(InMemoryCounterStore::new())))
        }
        Err(e) => Err(anyhow::Error::new(e).context("Redis counter store unavailable")),
    }
}

#[cfg(not(feature = "redis"))]
async fn init_counters(_config: &AppConfig) -> anyhow::Result<Counters> {
    tracing::info!("Running without redis feature - counting requests in memory");
    Ok(Counters::Memory(Arc::new(InMemoryCounterStore::new())))
}

fn spawn_purge_task(store: Arc<InMemoryCounterStore>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let purged = store.purge_expired().await;
            if purged > 0 {
                tracing::debug!(purged, "Purged expired rate windows");
            }
        }
    });
}

async fn in_memory_storage() -> (Arc<dyn ApiTokenResolver>, Arc<dyn OrganizationRepository>) {
    let tokens = InMemoryTokenResolver::from_env();
    tracing::info!(
        applications = tokens.len().await,
        "Loaded API applications from API_TOKENS"
    );
    (
        Arc::new(tokens),
        Arc::new(InMemoryOrganizationRepository::new()),
    )
}

#[cfg(feature = "postgres")]
async fn init_storage(
    config: &AppConfig,
) -> (Arc<dyn ApiTokenResolver>, Arc<dyn OrganizationRepository>) {
    let Some(db_config) = &config.database else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return in_memory_storage().await;
    };

    match DatabaseConnections::init(db_config).await {
        Ok(connections) => (
            Arc::new(PostgresApiApplicationRepository::new(connections.main.clone())),
            Arc::new(PostgresOrganizationRepository::new(connections.main)),
        ),
        Err(e) => {
            tracing::error!(
                "Failed to connect to database: {}. Using in-memory fallback.",
                e
            );
            in_memory_storage().await
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn init_storage(
    _config: &AppConfig,
) -> (Arc<dyn ApiTokenResolver>, Arc<dyn OrganizationRepository>) {
    tracing::info!("Running without postgres feature - using in-memory storage");
    in_memory_storage().await
}
