//! Fixed-window request counters keyed by client identifier.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::core::config::{RateLimitBackendKind, RateLimitSettings};
use crate::core::redis::RedisHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RateDecision {
    Allowed { remaining: u64 },
    Limited { retry_after_seconds: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RatePolicy {
    pub(crate) name: &'static str,
    pub(crate) max_requests: u64,
    pub(crate) window: Duration,
}

impl RatePolicy {
    fn key(&self, identifier: &str) -> String {
        format!("rl:{}:{identifier}", self.name)
    }
}

fn decide(count: u64, max_requests: u64, until_reset: Duration) -> RateDecision {
    if count > max_requests {
        let retry_after_seconds = until_reset.as_millis().div_ceil(1000).max(1) as u64;
        RateDecision::Limited { retry_after_seconds }
    } else {
        RateDecision::Allowed { remaining: max_requests - count }
    }
}

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u64,
    reset_at: Instant,
}

/// In-process counter store. Entries carry their own expiry; [`sweep`] drops
/// the expired ones so idle clients do not accumulate.
///
/// [`sweep`]: MemoryWindowStore::sweep
#[derive(Debug, Default)]
pub(crate) struct MemoryWindowStore {
    entries: DashMap<String, WindowEntry>,
}

impl MemoryWindowStore {
    /// Counts one request for `key`; returns the count in the current window and
    /// the time left until it resets.
    pub(crate) fn hit(&self, key: &str, window: Duration, now: Instant) -> (u64, Duration) {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) if occupied.get().reset_at > now => {
                let entry = occupied.get_mut();
                entry.count += 1;
                (entry.count, entry.reset_at - now)
            }
            Entry::Occupied(mut occupied) => {
                occupied.insert(WindowEntry { count: 1, reset_at: now + window });
                (1, window)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(WindowEntry { count: 1, reset_at: now + window });
                (1, window)
            }
        }
    }

    pub(crate) fn sweep(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.reset_at > now);
        before.saturating_sub(self.entries.len())
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Clone)]
enum Backend {
    Memory(Arc<MemoryWindowStore>),
    Redis(RedisHandle),
}

#[derive(Clone)]
pub(crate) struct RateLimiter {
    enabled: bool,
    backend: Backend,
    moderate: RatePolicy,
    strict: RatePolicy,
}

impl RateLimiter {
    pub(crate) fn from_settings(settings: &RateLimitSettings, redis: RedisHandle) -> Self {
        let window = Duration::from_secs(settings.window_seconds);
        let backend = match settings.backend {
            RateLimitBackendKind::Memory => Backend::Memory(Arc::default()),
            RateLimitBackendKind::Redis => Backend::Redis(redis),
        };

        Self {
            enabled: settings.enabled,
            backend,
            moderate: RatePolicy { name: "moderate", max_requests: settings.max_requests, window },
            strict: RatePolicy { name: "strict", max_requests: settings.strict_max_requests, window },
        }
    }

    #[cfg(test)]
    pub(crate) fn in_memory(moderate: RatePolicy, strict: RatePolicy) -> Self {
        Self { enabled: true, backend: Backend::Memory(Arc::default()), moderate, strict }
    }

    pub(crate) fn enabled(&self) -> bool {
        self.enabled
    }

    /// Applies to every API request.
    pub(crate) fn moderate(&self) -> &RatePolicy {
        &self.moderate
    }

    /// Applies on top of `moderate` to write-heavy endpoints.
    pub(crate) fn strict(&self) -> &RatePolicy {
        &self.strict
    }

    pub(crate) async fn check(&self, policy: &RatePolicy, identifier: &str) -> RateDecision {
        let key = policy.key(identifier);

        match &self.backend {
            Backend::Memory(store) => {
                let (count, until_reset) = store.hit(&key, policy.window, Instant::now());
                decide(count, policy.max_requests, until_reset)
            }
            Backend::Redis(redis) => match redis.increment_window(&key, policy.window.as_secs()).await {
                Ok(Some(window)) => decide(
                    window.count,
                    policy.max_requests,
                    Duration::from_secs(window.ttl_seconds),
                ),
                Ok(None) => RateDecision::Allowed { remaining: policy.max_requests },
                Err(err) => {
                    tracing::warn!(error = %err, policy = policy.name, "Rate limit check failed; allowing request");
                    RateDecision::Allowed { remaining: policy.max_requests }
                }
            },
        }
    }

    /// Drops expired in-memory windows. Redis expires keys on its own.
    pub(crate) fn sweep_expired(&self) -> usize {
        match &self.backend {
            Backend::Memory(store) => store.sweep(Instant::now()),
            Backend::Redis(_) => 0,
        }
    }

    pub(crate) fn tracked_windows(&self) -> usize {
        match &self.backend {
            Backend::Memory(store) => store.len(),
            Backend::Redis(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(900);

    fn policy(max_requests: u64) -> RatePolicy {
        RatePolicy { name: "test", max_requests, window: WINDOW }
    }

    #[test]
    fn window_counts_until_reset() {
        let store = MemoryWindowStore::default();
        let start = Instant::now();

        assert_eq!(store.hit("a", WINDOW, start), (1, WINDOW));
        let (count, left) = store.hit("a", WINDOW, start + Duration::from_secs(60));
        assert_eq!(count, 2);
        assert_eq!(left, Duration::from_secs(840));

        let (count, left) = store.hit("a", WINDOW, start + WINDOW);
        assert_eq!(count, 1, "window restarts once reset time is reached");
        assert_eq!(left, WINDOW);
    }

    #[test]
    fn identifiers_are_isolated() {
        let store = MemoryWindowStore::default();
        let now = Instant::now();
        store.hit("a", WINDOW, now);
        store.hit("a", WINDOW, now);
        assert_eq!(store.hit("b", WINDOW, now).0, 1);
    }

    #[test]
    fn concurrent_hits_are_all_counted() {
        let store = Arc::new(MemoryWindowStore::default());
        let now = Instant::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        store.hit("shared", WINDOW, now);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker thread");
        }

        assert_eq!(store.hit("shared", WINDOW, now).0, 801);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn sweep_removes_only_expired_windows() {
        let store = MemoryWindowStore::default();
        let start = Instant::now();
        store.hit("old", Duration::from_secs(10), start);
        store.hit("fresh", WINDOW, start);

        assert_eq!(store.sweep(start + Duration::from_secs(11)), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.sweep(start + Duration::from_secs(11)), 0);
    }

    #[test]
    fn decision_reports_retry_after_rounded_up() {
        assert_eq!(decide(3, 3, Duration::from_secs(5)), RateDecision::Allowed { remaining: 0 });
        assert_eq!(
            decide(4, 3, Duration::from_millis(4_200)),
            RateDecision::Limited { retry_after_seconds: 5 }
        );
        assert_eq!(
            decide(4, 3, Duration::from_millis(0)),
            RateDecision::Limited { retry_after_seconds: 1 }
        );
    }

    #[tokio::test]
    async fn limiter_blocks_after_max_requests() {
        let limiter = RateLimiter::in_memory(policy(3), policy(1));
        let moderate = *limiter.moderate();

        for expected_remaining in [2, 1, 0] {
            assert_eq!(
                limiter.check(&moderate, "user-1").await,
                RateDecision::Allowed { remaining: expected_remaining }
            );
        }
        assert!(matches!(
            limiter.check(&moderate, "user-1").await,
            RateDecision::Limited { retry_after_seconds } if retry_after_seconds <= 900
        ));
        assert_eq!(
            limiter.check(&moderate, "user-2").await,
            RateDecision::Allowed { remaining: 2 }
        );
    }

    #[tokio::test]
    async fn policies_keep_separate_counters() {
        let limiter = RateLimiter::in_memory(
            RatePolicy { name: "moderate", max_requests: 5, window: WINDOW },
            RatePolicy { name: "strict", max_requests: 1, window: WINDOW },
        );
        let strict = *limiter.strict();
        let moderate = *limiter.moderate();

        assert!(matches!(limiter.check(&strict, "ip").await, RateDecision::Allowed { .. }));
        assert!(matches!(limiter.check(&strict, "ip").await, RateDecision::Limited { .. }));
        assert_eq!(limiter.check(&moderate, "ip").await, RateDecision::Allowed { remaining: 4 });
    }

    #[tokio::test]
    async fn disconnected_redis_backend_fails_open() {
        let settings = RateLimitSettings {
            enabled: true,
            backend: RateLimitBackendKind::Redis,
            window_seconds: 60,
            max_requests: 1,
            strict_max_requests: 1,
            sweep_interval_seconds: 60,
        };
        let limiter = RateLimiter::from_settings(
            &settings,
            RedisHandle::new("redis://127.0.0.1:6379/1".to_string()),
        );
        let moderate = *limiter.moderate();

        for _ in 0..3 {
            assert!(matches!(limiter.check(&moderate, "x").await, RateDecision::Allowed { .. }));
        }
        assert_eq!(limiter.sweep_expired(), 0);
    }
}
