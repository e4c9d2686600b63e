use async_trait::async_trait;
use redis::AsyncCommands;

use super::CacheStore;

/// Shared byte store backed by a Redis service.
///
/// The client hands out multiplexed connections per operation, so one store
/// instance is safely shared across sessions and tasks.
pub struct RedisStore {
    client: redis::Client,
}

impl RedisStore {
    /// Validates the connection string. No connection is opened until the
    /// first operation.
    pub fn connect(url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(url)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let data: Option<Vec<u8>> = conn.get(key).await?;
        Ok(data)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> anyhow::Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.set(key, value).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_connection_string() {
        assert!(RedisStore::connect("not-a-redis-url").is_err());
    }

    #[test]
    fn accepts_standard_connection_string() {
        assert!(RedisStore::connect("redis://localhost:6379").is_ok());
    }
}
