mod parsing;
mod secret;
mod settings;
mod types;

pub(crate) use types::{GradingStrategyKind, RateLimitBackendKind, RateLimitSettings, Settings};

#[cfg(test)]
mod tests {
    use super::types::{ConfigError, Environment};
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn defaults_load_outside_strict_mode() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();

        let settings = Settings::load().expect("settings");
        assert_eq!(settings.api().api_prefix, "/api");
        assert_eq!(settings.rate_limit().window_seconds, 900);
        assert_eq!(settings.rate_limit().max_requests, 100);
        assert_eq!(settings.rate_limit().strict_max_requests, 50);
        assert_eq!(settings.rate_limit().backend, RateLimitBackendKind::Memory);
        assert_eq!(settings.grading().strategy, GradingStrategyKind::Heuristic);
        assert_eq!(settings.runtime().environment, Environment::Test);
    }

    #[tokio::test]
    async fn production_requires_explicit_secret_key() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("WRITEWELL_ENV", "production");
        std::env::remove_var("SECRET_KEY");

        let result = Settings::load();
        test_support::set_test_env();

        assert!(matches!(result, Err(ConfigError::MissingSecret("SECRET_KEY"))));
    }

    #[tokio::test]
    async fn strict_limit_cannot_exceed_general_limit() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("RATE_LIMIT_STRICT_MAX_REQUESTS", "500");

        let result = Settings::load();
        std::env::remove_var("RATE_LIMIT_STRICT_MAX_REQUESTS");

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { field: "RATE_LIMIT_STRICT_MAX_REQUESTS", .. })
        ));
    }

    #[tokio::test]
    async fn teacher_bootstrap_requires_both_values() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("FIRST_TEACHER_EMAIL", "teacher@example.com");

        let result = Settings::load();
        std::env::remove_var("FIRST_TEACHER_EMAIL");

        assert!(result.is_err());
    }
}
