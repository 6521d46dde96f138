use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub providers: ProviderConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_rate_limiting: bool,
    pub rate_limit_requests: u32,
    pub rate_limit_window_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    /// Expected `aud` claim; `None` disables the audience check
    pub jwt_audience: Option<String>,
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing)]
    pub encryption_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub binance_base_url: String,
    pub covalent_base_url: String,
    #[serde(skip_serializing)]
    pub covalent_api_key: Option<String>,
    pub dune_base_url: String,
    #[serde(skip_serializing)]
    pub dune_api_key: Option<String>,
    pub dune_query_id: u64,
    pub dune_poll_attempts: u32,
    pub dune_poll_interval_secs: u64,
    pub santiment_url: String,
    #[serde(skip_serializing)]
    pub santiment_api_key: Option<String>,
    pub santiment_asset: String,
    pub currency_base_url: String,
    #[serde(skip_serializing)]
    pub currency_api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub exchange_rate_ttl_hours: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        Self::for_environment(environment).with_env_overrides()
    }

    /// Preset defaults without any environment overrides
    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout =
                v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Some(v) = env::var("JOURNAL_API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_ENABLE_RATE_LIMITING") {
            self.api.enable_rate_limiting = v.parse().unwrap_or(self.api.enable_rate_limiting);
        }
        if let Ok(v) = env::var("API_RATE_LIMIT_REQUESTS") {
            self.api.rate_limit_requests = v.parse().unwrap_or(self.api.rate_limit_requests);
        }
        if let Ok(v) = env::var("API_RATE_LIMIT_WINDOW_SECS") {
            self.api.rate_limit_window_secs = v.parse().unwrap_or(self.api.rate_limit_window_secs);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_AUDIENCE") {
            self.security.jwt_audience = if v.is_empty() { None } else { Some(v) };
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("API_ENCRYPTION_KEY") {
            self.security.encryption_key = Some(v);
        }

        // Provider overrides
        if let Ok(v) = env::var("BINANCE_API_URL") {
            self.providers.binance_base_url = v;
        }
        if let Ok(v) = env::var("COVALENT_API_URL") {
            self.providers.covalent_base_url = v;
        }
        if let Ok(v) = env::var("COVALENT_API_KEY") {
            self.providers.covalent_api_key = Some(v);
        }
        if let Ok(v) = env::var("DUNE_API_URL") {
            self.providers.dune_base_url = v;
        }
        if let Ok(v) = env::var("DUNE_API_KEY") {
            self.providers.dune_api_key = Some(v);
        }
        if let Ok(v) = env::var("DUNE_QUERY_ID") {
            self.providers.dune_query_id = v.parse().unwrap_or(self.providers.dune_query_id);
        }
        if let Ok(v) = env::var("DUNE_POLL_ATTEMPTS") {
            self.providers.dune_poll_attempts =
                v.parse().unwrap_or(self.providers.dune_poll_attempts);
        }
        if let Ok(v) = env::var("DUNE_POLL_INTERVAL_SECS") {
            self.providers.dune_poll_interval_secs =
                v.parse().unwrap_or(self.providers.dune_poll_interval_secs);
        }
        if let Ok(v) = env::var("SANTIMENT_API_URL") {
            self.providers.santiment_url = v;
        }
        if let Ok(v) = env::var("SANTIMENT_API_KEY") {
            self.providers.santiment_api_key = Some(v);
        }
        if let Ok(v) = env::var("SANTIMENT_ASSET") {
            self.providers.santiment_asset = v;
        }
        if let Ok(v) = env::var("CURRENCYFREAKS_API_URL") {
            self.providers.currency_base_url = v;
        }
        if let Ok(v) = env::var("CURRENCYFREAKS_API_KEY") {
            self.providers.currency_api_key = Some(v);
        }

        // Cache overrides
        if let Ok(v) = env::var("EXCHANGE_RATE_TTL_HOURS") {
            self.cache.exchange_rate_ttl_hours =
                v.parse().unwrap_or(self.cache.exchange_rate_ttl_hours);
        }

        self
    }

    /// A `*` entry in the CORS origin list allows any origin
    pub fn cors_is_permissive(&self) -> bool {
        self.security.cors_origins.iter().any(|o| o == "*")
    }

    fn providers() -> ProviderConfig {
        ProviderConfig {
            binance_base_url: "https://api.binance.com".to_string(),
            covalent_base_url: "https://api.covalenthq.com/v1".to_string(),
            covalent_api_key: None,
            dune_base_url: "https://api.dune.com/api/v1".to_string(),
            dune_api_key: None,
            dune_query_id: 5455459,
            dune_poll_attempts: 30,
            dune_poll_interval_secs: 10,
            santiment_url: "https://api.santiment.net/graphql".to_string(),
            santiment_api_key: None,
            santiment_asset: "bitcoin".to_string(),
            currency_base_url: "https://api.currencyfreaks.com".to_string(),
            currency_api_key: None,
        }
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                port: 3000,
                enable_rate_limiting: false,
                rate_limit_requests: 1000,
                rate_limit_window_secs: 60,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_audience: None,
                cors_origins: vec!["*".to_string()],
                encryption_key: None,
            },
            providers: Self::providers(),
            cache: CacheConfig { exchange_rate_ttl_hours: 6 },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                port: 3000,
                enable_rate_limiting: true,
                rate_limit_requests: 100,
                rate_limit_window_secs: 60,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_audience: Some("authenticated".to_string()),
                cors_origins: vec!["https://staging.example.com".to_string()],
                encryption_key: None,
            },
            providers: Self::providers(),
            cache: CacheConfig { exchange_rate_ttl_hours: 6 },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                port: 3000,
                enable_rate_limiting: true,
                rate_limit_requests: 60,
                rate_limit_window_secs: 60,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_audience: Some("authenticated".to_string()),
                cors_origins: vec!["https://app.example.com".to_string()],
                encryption_key: None,
            },
            providers: Self::providers(),
            cache: CacheConfig { exchange_rate_ttl_hours: 6 },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
