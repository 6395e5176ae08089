use std::collections::HashMap;
use std::env;
use std::fmt;

use thiserror::Error;
use url::Url;

/// Errors raised while assembling configuration at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub identity: IdentityConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

/// Identity provider endpoint and keys. Keys never show up in Debug output.
#[derive(Clone)]
pub struct IdentityConfig {
    pub url: Url,
    pub anon_key: String,
    pub service_role_key: String,
    /// When present, bearer tokens are verified locally as HS256 JWTs
    pub jwt_secret: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Allowed CORS origins; empty means permissive
    pub cors_origins: Vec<String>,
    pub admin_role: String,
    pub require_admin_role: bool,
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &"<redacted>")
            .field("service_role_key", &"<redacted>")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl AppConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an explicit key/value map
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let database_url = required(&lookup, "DATABASE_URL")?;
        if !database_url.starts_with("postgres://") && !database_url.starts_with("postgresql://") {
            return Err(ConfigError::Invalid {
                name: "DATABASE_URL",
                reason: "expected a postgres:// connection string".to_string(),
            });
        }

        let identity_url = required(&lookup, "SUPABASE_URL")?;
        let identity_url = Url::parse(&identity_url).map_err(|e| ConfigError::Invalid {
            name: "SUPABASE_URL",
            reason: e.to_string(),
        })?;

        let identity = IdentityConfig {
            url: identity_url,
            anon_key: required(&lookup, "SUPABASE_ANON_KEY")?,
            service_role_key: required(&lookup, "SUPABASE_SERVICE_ROLE_KEY")?,
            jwt_secret: lookup("SUPABASE_JWT_SECRET").filter(|s| !s.trim().is_empty()),
            timeout_secs: 10,
        };

        let config = match environment {
            Environment::Production => Self::production(database_url, identity),
            Environment::Staging => Self::staging(database_url, identity),
            Environment::Development => Self::development(database_url, identity),
        };

        Ok(config.with_overrides(&lookup))
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Database overrides
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Identity overrides
        if let Some(v) = lookup("IDENTITY_TIMEOUT_SECS") {
            self.identity.timeout_secs = v.parse().unwrap_or(self.identity.timeout_secs);
        }

        // API overrides
        if let Some(v) = lookup("HOST") {
            if !v.trim().is_empty() {
                self.api.host = v.trim().to_string();
            }
        }
        if let Some(v) = lookup("PORT") {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Some(v) = lookup("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = lookup("ADMIN_ROLE") {
            if !v.trim().is_empty() {
                self.security.admin_role = v.trim().to_string();
            }
        }
        if let Some(v) = lookup("ADMIN_REQUIRE_ROLE") {
            self.security.require_admin_role = v.parse().unwrap_or(self.security.require_admin_role);
        }

        self
    }

    fn development(database_url: String, identity: IdentityConfig) -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: database_url,
                max_connections: 10,
                connection_timeout: 30,
            },
            identity,
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 3001,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                cors_origins: Vec::new(),
                admin_role: "admin".to_string(),
                require_admin_role: true,
            },
        }
    }

    fn staging(database_url: String, identity: IdentityConfig) -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: database_url,
                max_connections: 20,
                connection_timeout: 10,
            },
            identity,
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 3001,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                cors_origins: Vec::new(),
                admin_role: "admin".to_string(),
                require_admin_role: true,
            },
        }
    }

    fn production(database_url: String, identity: IdentityConfig) -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: database_url,
                max_connections: 50,
                connection_timeout: 5,
            },
            identity,
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 3001,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                cors_origins: Vec::new(),
                admin_role: "admin".to_string(),
                require_admin_role: true,
            },
        }
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}
