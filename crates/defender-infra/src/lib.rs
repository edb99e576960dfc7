//! # Defender Infrastructure
//!
//! Concrete implementations of the ports defined in `defender-core`:
//! counter stores, token resolution, organization storage and the clock.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL storage via SeaORM
//! - `redis` - Redis-backed counter store

pub mod auth;
pub mod clock;
pub mod counter;
pub mod database;

// Re-exports - In-Memory
pub use auth::InMemoryTokenResolver;
pub use clock::SystemClock;
pub use counter::InMemoryCounterStore;
pub use database::{DatabaseConfig, InMemoryOrganizationRepository};

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use counter::{RedisConfig, RedisCounterStore};

// Re-exports - Postgres
#[cfg(feature = "postgres")]
pub use database::{DatabaseConnections, PostgresApiApplicationRepository, PostgresOrganizationRepository};
