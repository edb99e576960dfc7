//! Redis counter store - shares quota windows across every server process.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Script};

use defender_core::ports::{CounterStore, CounterStoreError};

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Whether to fall back to the in-memory store if Redis is unavailable
    pub fallback_to_memory: bool,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
            fallback_to_memory: true,
        }
    }
}

impl RedisConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            connect_timeout: Duration::from_secs(
                std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            fallback_to_memory: std::env::var("REDIS_FALLBACK_TO_MEMORY")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
        }
    }
}

/// Redis-backed counters.
///
/// Increment and expiry run in one Lua script, so concurrent callers on any
/// node see a single consistent count.
pub struct RedisCounterStore {
    conn: ConnectionManager,
    script: Script,
    bounded_script: Script,
}

impl RedisCounterStore {
    pub async fn new(config: &RedisConfig) -> Result<Self, CounterStoreError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| CounterStoreError::Connection(e.to_string()))?;

        // Use timeout to prevent hanging if Redis is unreachable
        let conn_manager_fut = ConnectionManager::new(client);
        let conn = tokio::time::timeout(config.connect_timeout, conn_manager_fut)
            .await
            .map_err(|_| CounterStoreError::Connection("Connection timed out".to_string()))?
            .map_err(|e| CounterStoreError::Connection(e.to_string()))?;

        // Returns the count after increment; sets TTL only on creation.
        let script = Script::new(
            r#"
            local current = redis.call('INCR', KEYS[1])
            if current == 1 then
                redis.call('EXPIRE', KEYS[1], tonumber(ARGV[1]))
            end
            return current
            "#,
        );

        // Same, but refuses with -1 once the count has reached ARGV[2].
        let bounded_script = Script::new(
            r#"
            local current = tonumber(redis.call('GET', KEYS[1]) or '0')
            if current >= tonumber(ARGV[2]) then
                return -1
            end
            current = redis.call('INCR', KEYS[1])
            if current == 1 then
                redis.call('EXPIRE', KEYS[1], tonumber(ARGV[1]))
            end
            return current
            "#,
        );

        tracing::info!(url = %config.url, "Connected to Redis counter store");

        Ok(Self {
            conn,
            script,
            bounded_script,
        })
    }

    /// Create from environment configuration.
    pub async fn from_env() -> Result<Self, CounterStoreError> {
        Self::new(&RedisConfig::from_env()).await
    }

    /// Overwrite a counter.
    pub async fn set(&self, key: &str, value: u64, ttl: Duration) -> Result<(), CounterStoreError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
            .await
            .map_err(|e| CounterStoreError::Operation(e.to_string()))
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn get(&self, key: &str) -> Result<Option<u64>, CounterStoreError> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<u64>>(key)
            .await
            .map_err(|e| CounterStoreError::Operation(e.to_string()))
    }

    async fn increment_with_expiry(
        &self,
        key: &str,
        ttl: Duration,
    ) -> Result<u64, CounterStoreError> {
        let mut conn = self.conn.clone();
        let count: u64 = self
            .script
            .key(key)
            .arg(ttl.as_secs().max(1))
            .invoke_async(&mut conn)
            .await
            .map_err(|e| CounterStoreError::Operation(e.to_string()))?;

        Ok(count)
    }

    async fn increment_below(
        &self,
        key: &str,
        limit: u64,
        ttl: Duration,
    ) -> Result<Option<u64>, CounterStoreError> {
        let mut conn = self.conn.clone();
        let count: i64 = self
            .bounded_script
            .key(key)
            .arg(ttl.as_secs().max(1))
            .arg(limit)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| CounterStoreError::Operation(e.to_string()))?;

        Ok(u64::try_from(count).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn get_test_store() -> Option<RedisCounterStore> {
        let config = RedisConfig {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6389".to_string()),
            connect_timeout: Duration::from_secs(1),
            fallback_to_memory: false,
        };

        RedisCounterStore::new(&config).await.ok()
    }

    #[tokio::test]
    async fn test_redis_increment_with_expiry() {
        let store = match get_test_store().await {
            Some(s) => s,
            None => return,
        };

        let key = format!("test_counter:{}", uuid::Uuid::new_v4());

        assert_eq!(store.get(&key).await.unwrap(), None);
        assert_eq!(
            store
                .increment_with_expiry(&key, Duration::from_secs(1))
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            store
                .increment_with_expiry(&key, Duration::from_secs(1))
                .await
                .unwrap(),
            2
        );
        assert_eq!(store.get(&key).await.unwrap(), Some(2));

        // Wait for expiry
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(store.get(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_redis_set_seeds_counter() {
        let store = match get_test_store().await {
            Some(s) => s,
            None => return,
        };

        let key = format!("test_counter:{}", uuid::Uuid::new_v4());
        store.set(&key, 60, Duration::from_secs(5)).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), Some(60));
    }

    #[tokio::test]
    async fn test_redis_increment_below_refuses_at_limit() {
        let store = match get_test_store().await {
            Some(s) => s,
            None => return,
        };

        let key = format!("test_counter:{}", uuid::Uuid::new_v4());
        let ttl = Duration::from_secs(5);
        store.set(&key, 59, ttl).await.unwrap();

        assert_eq!(store.increment_below(&key, 60, ttl).await.unwrap(), Some(60));
        assert_eq!(store.increment_below(&key, 60, ttl).await.unwrap(), None);
        assert_eq!(store.get(&key).await.unwrap(), Some(60));
    }
}
