use std::sync::Arc;

use redis::aio::ConnectionManager;
use redis::{cmd, Client, RedisError};
use tokio::sync::RwLock;

#[derive(Clone)]
pub(crate) struct RedisHandle {
    url: String,
    manager: Arc<RwLock<Option<ConnectionManager>>>,
}

#[derive(Debug, Clone)]
pub(crate) enum RedisHealth {
    Healthy,
    Disconnected,
    Unhealthy(String),
}

/// Counter state of one fixed window as seen by Redis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WindowCount {
    pub(crate) count: u64,
    pub(crate) ttl_seconds: u64,
}

const FIXED_WINDOW_SCRIPT: &str = r#"
    local current = redis.call("INCR", KEYS[1])
    if current == 1 then
        redis.call("EXPIRE", KEYS[1], ARGV[1])
    end
    local ttl = redis.call("TTL", KEYS[1])
    if ttl < 0 then
        redis.call("EXPIRE", KEYS[1], ARGV[1])
        ttl = tonumber(ARGV[1])
    end
    return {current, ttl}
"#;

impl RedisHandle {
    pub(crate) fn new(url: String) -> Self {
        Self { url, manager: Arc::new(RwLock::new(None)) }
    }

    pub(crate) async fn connect(&self) -> Result<(), RedisError> {
        let client = Client::open(self.url.clone())?;
        let manager = ConnectionManager::new(client).await?;
        let mut guard = self.manager.write().await;
        *guard = Some(manager);
        Ok(())
    }

    pub(crate) async fn disconnect(&self) {
        let mut guard = self.manager.write().await;
        *guard = None;
    }

    pub(crate) async fn health(&self) -> RedisHealth {
        let manager = { self.manager.read().await.clone() };
        let Some(mut manager) = manager else {
            return RedisHealth::Disconnected;
        };

        match cmd("PING").query_async::<_, String>(&mut manager).await {
            Ok(_) => RedisHealth::Healthy,
            Err(err) => RedisHealth::Unhealthy(err.to_string()),
        }
    }

    /// Increments the shared counter for `key` inside a window of `window_seconds`.
    /// Returns `None` when no connection is established.
    pub(crate) async fn increment_window(
        &self,
        key: &str,
        window_seconds: u64,
    ) -> Result<Option<WindowCount>, RedisError> {
        let manager = { self.manager.read().await.clone() };
        let Some(mut manager) = manager else {
            return Ok(None);
        };

        let (count, ttl): (i64, i64) = redis::Script::new(FIXED_WINDOW_SCRIPT)
            .key(key)
            .arg(window_seconds as i64)
            .invoke_async(&mut manager)
            .await?;

        Ok(Some(WindowCount { count: count.max(0) as u64, ttl_seconds: ttl.max(0) as u64 }))
    }
}

#[cfg(test)]
mod tests {
    use super::RedisHandle;

    #[tokio::test]
    async fn disconnected_handle_reports_no_window() {
        let redis = RedisHandle::new("redis://127.0.0.1:6379/1".to_string());
        let window = redis.increment_window("rl:test", 60).await.expect("no redis call");
        assert!(window.is_none());
        assert!(matches!(redis.health().await, super::RedisHealth::Disconnected));
    }
}
