use super::parsing::{
    env_optional, env_or_default, parse_bool, parse_cors_origins, parse_environment,
    parse_grading_strategy, parse_optional_u64, parse_positive_u64, parse_rate_limit_backend,
    parse_u16, parse_u32, parse_u64,
};
use super::secret::load_or_create_secret_key;
use super::types::{
    ApiSettings, BootstrapSettings, ConfigError, CorsSettings, DatabaseSettings, GradingSettings,
    RateLimitSettings, RedisSettings, RuntimeSettings, SecuritySettings, ServerHost, ServerPort,
    ServerSettings, Settings, TelemetrySettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("WRITEWELL_HOST", "0.0.0.0");
        let port = env_or_default("WRITEWELL_PORT", "5000");

        let environment = parse_environment(
            env_optional("WRITEWELL_ENV").or_else(|| env_optional("ENVIRONMENT")),
        );
        let strict_config = env_optional("WRITEWELL_STRICT_CONFIG")
            .map(|value| parse_bool(&value))
            .unwrap_or(false)
            || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "WriteWell API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_prefix = env_or_default("API_PREFIX", "/api");

        let (secret_key, secret_key_explicit) = match env_optional("SECRET_KEY") {
            Some(value) => (value, true),
            None if strict_config => (String::new(), false),
            None => (load_or_create_secret_key(), false),
        };
        let access_token_expire_minutes = parse_u64(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            env_or_default("ACCESS_TOKEN_EXPIRE_MINUTES", "10080"),
        )?;
        let algorithm = env_or_default("ALGORITHM", "HS256");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "writewell");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "writewell");
        let database_url = env_optional("DATABASE_URL");
        let max_connections =
            parse_u32("DATABASE_MAX_CONNECTIONS", env_or_default("DATABASE_MAX_CONNECTIONS", "20"))?;

        let redis_host = env_or_default("REDIS_HOST", "localhost");
        let redis_port = parse_u16("REDIS_PORT", env_or_default("REDIS_PORT", "6379"))?;
        let redis_db = parse_u16("REDIS_DB", env_or_default("REDIS_DB", "0"))?;
        let redis_password = env_or_default("REDIS_PASSWORD", "");

        let rate_limit_enabled =
            env_optional("RATE_LIMIT_ENABLED").map(|value| parse_bool(&value)).unwrap_or(true);
        let rate_limit_backend =
            parse_rate_limit_backend(env_or_default("RATE_LIMIT_BACKEND", "memory"))?;
        let rate_limit_window_seconds = parse_positive_u64(
            "RATE_LIMIT_WINDOW_SECONDS",
            env_or_default("RATE_LIMIT_WINDOW_SECONDS", "900"),
        )?;
        let rate_limit_max_requests = parse_positive_u64(
            "RATE_LIMIT_MAX_REQUESTS",
            env_or_default("RATE_LIMIT_MAX_REQUESTS", "100"),
        )?;
        let rate_limit_strict_max_requests = parse_positive_u64(
            "RATE_LIMIT_STRICT_MAX_REQUESTS",
            env_or_default("RATE_LIMIT_STRICT_MAX_REQUESTS", "50"),
        )?;
        let rate_limit_sweep_seconds = parse_positive_u64(
            "RATE_LIMIT_SWEEP_SECONDS",
            env_or_default("RATE_LIMIT_SWEEP_SECONDS", "600"),
        )?;

        let grading_strategy =
            parse_grading_strategy(env_or_default("GRADING_STRATEGY", "heuristic"))?;
        let grading_seed = parse_optional_u64("GRADING_SEED", env_optional("GRADING_SEED"))?;

        let first_teacher_email = env_or_default("FIRST_TEACHER_EMAIL", "");
        let first_teacher_password = env_or_default("FIRST_TEACHER_PASSWORD", "");

        let log_level = env_or_default("WRITEWELL_LOG_LEVEL", "info");
        let json = env_optional("WRITEWELL_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings { host: ServerHost::parse(host)?, port: ServerPort::parse(port)? },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_prefix },
            security: SecuritySettings {
                secret_key,
                secret_key_explicit,
                access_token_expire_minutes,
                algorithm,
            },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
                max_connections,
            },
            redis: RedisSettings {
                host: redis_host,
                port: redis_port,
                db: redis_db,
                password: redis_password,
            },
            rate_limit: RateLimitSettings {
                enabled: rate_limit_enabled,
                backend: rate_limit_backend,
                window_seconds: rate_limit_window_seconds,
                max_requests: rate_limit_max_requests,
                strict_max_requests: rate_limit_strict_max_requests,
                sweep_interval_seconds: rate_limit_sweep_seconds,
            },
            grading: GradingSettings { strategy: grading_strategy, seed: grading_seed },
            bootstrap: BootstrapSettings { first_teacher_email, first_teacher_password },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;

        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn redis(&self) -> &RedisSettings {
        &self.redis
    }

    pub(crate) fn rate_limit(&self) -> &RateLimitSettings {
        &self.rate_limit
    }

    pub(crate) fn grading(&self) -> &GradingSettings {
        &self.grading
    }

    pub(crate) fn bootstrap(&self) -> &BootstrapSettings {
        &self.bootstrap
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.api.api_prefix.starts_with('/') || self.api.api_prefix.ends_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "API_PREFIX",
                value: self.api.api_prefix.clone(),
            });
        }

        if self.rate_limit.strict_max_requests > self.rate_limit.max_requests {
            return Err(ConfigError::InvalidValue {
                field: "RATE_LIMIT_STRICT_MAX_REQUESTS",
                value: self.rate_limit.strict_max_requests.to_string(),
            });
        }

        let teacher = &self.bootstrap;
        if teacher.first_teacher_email.is_empty() != teacher.first_teacher_password.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "FIRST_TEACHER_EMAIL/FIRST_TEACHER_PASSWORD",
                value: String::from("<only one of the pair is set>"),
            });
        }

        if !self.runtime.strict_config {
            return Ok(());
        }

        if !self.security.secret_key_explicit {
            return Err(ConfigError::MissingSecret("SECRET_KEY"));
        }

        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }

        Ok(())
    }
}
