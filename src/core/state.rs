use std::sync::Arc;

use sqlx::PgPool;

use crate::core::{config::Settings, redis::RedisHandle};
use crate::services::rate_limit::RateLimiter;
use crate::services::scoring::EssayScorer;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    redis: RedisHandle,
    scorer: EssayScorer,
    rate_limiter: RateLimiter,
}

impl AppState {
    pub(crate) fn new(settings: Settings, db: PgPool, redis: RedisHandle) -> Self {
        let scorer = EssayScorer::from_settings(&settings);
        let rate_limiter = RateLimiter::from_settings(settings.rate_limit(), redis.clone());
        Self::with_parts(settings, db, redis, scorer, rate_limiter)
    }

    pub(crate) fn with_parts(
        settings: Settings,
        db: PgPool,
        redis: RedisHandle,
        scorer: EssayScorer,
        rate_limiter: RateLimiter,
    ) -> Self {
        Self { inner: Arc::new(InnerState { settings, db, redis, scorer, rate_limiter }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn redis(&self) -> &RedisHandle {
        &self.inner.redis
    }

    pub(crate) fn scorer(&self) -> &EssayScorer {
        &self.inner.scorer
    }

    pub(crate) fn rate_limiter(&self) -> &RateLimiter {
        &self.inner.rate_limiter
    }
}
