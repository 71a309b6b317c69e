//! Application configuration
//!
//! Loaded from a TOML file (default `~/.config/users-service/config.toml`).
//! Every section and field is optional; missing values fall back to the
//! defaults below. `JWT_SECRET` and `JWT_EXPIRATION_HOURS` in the
//! environment take precedence over the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::crypto::password::DEFAULT_HASH_COST;
use crate::shared::InfraError;

/// Development-only signing secret, replaced via config or `JWT_SECRET`.
pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

/// Upper bound for `security.jwt_expiration_hours` (one year).
pub const MAX_JWT_EXPIRATION_HOURS: i64 = 24 * 365;

/// Work factors accepted by bcrypt.
pub const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// Default config path: `<config dir>/users-service/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("users-service")
        .join("config.toml")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub jwt_issuer: String,
    pub bcrypt_cost: u32,
    /// Include password hashes in `GET /users`. Off unless a legacy
    /// client depends on it.
    pub expose_password_hashes: bool,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("expose_password_hashes", &self.expose_password_hashes)
            .finish()
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_expiration_hours: 24,
            jwt_issuer: "users-service".to_string(),
            bcrypt_cost: DEFAULT_HASH_COST,
            expose_password_hashes: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `users_service=debug`
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `path`. A missing file yields defaults; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, InfraError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| InfraError::Config(format!("{}: {}", path.display(), e)))?;
            Self::from_toml(&raw)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would break token issuing or hashing at runtime.
    pub fn validate(&self) -> Result<(), InfraError> {
        let hours = self.security.jwt_expiration_hours;
        if !(1..=MAX_JWT_EXPIRATION_HOURS).contains(&hours) {
            return Err(InfraError::Config(format!(
                "security.jwt_expiration_hours must be within 1..={}, got {}",
                MAX_JWT_EXPIRATION_HOURS, hours
            )));
        }

        let cost = self.security.bcrypt_cost;
        if !BCRYPT_COST_RANGE.contains(&cost) {
            return Err(InfraError::Config(format!(
                "security.bcrypt_cost must be within {}..={}, got {}",
                BCRYPT_COST_RANGE.start(),
                BCRYPT_COST_RANGE.end(),
                cost
            )));
        }

        Ok(())
    }

    pub fn from_toml(raw: &str) -> Result<Self, InfraError> {
        toml::from_str(raw).map_err(|e| InfraError::Config(e.to_string()))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            if !secret.is_empty() {
                self.security.jwt_secret = secret;
            }
        }
        if let Some(hours) = std::env::var("JWT_EXPIRATION_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.security.jwt_expiration_hours = hours;
        }
    }

    pub fn uses_default_secret(&self) -> bool {
        self.security.jwt_secret == DEFAULT_JWT_SECRET
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig::new(
            self.security.jwt_secret.clone(),
            self.security.jwt_expiration_hours,
            self.security.jwt_issuer.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.security.jwt_expiration_hours, 24);
        assert_eq!(cfg.security.bcrypt_cost, 10);
        assert!(!cfg.security.expose_password_hashes);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.uses_default_secret());
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [server]
            port = 8080

            [security]
            jwt_secret = "s3cret"
            expose_password_hashes = true
            "#,
        )
        .unwrap();

        assert_eq!(cfg.address(), "0.0.0.0:8080");
        assert_eq!(cfg.security.jwt_issuer, "users-service");
        assert!(cfg.security.expose_password_hashes);
        assert!(!cfg.uses_default_secret());

        let jwt = cfg.jwt_config();
        assert_eq!(jwt.secret, "s3cret");
        assert_eq!(jwt.expiration_hours, 24);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let err = AppConfig::from_toml("[server\nport = ").unwrap_err();
        assert!(matches!(err, InfraError::Config(_)));
    }

    #[test]
    fn secret_is_redacted_in_debug_output() {
        let cfg = AppConfig::default();
        let printed = format!("{:?}", cfg);
        assert!(!printed.contains(DEFAULT_JWT_SECRET));
    }

    fn security(hours: i64, cost: u32) -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.security.jwt_expiration_hours = hours;
        cfg.security.bcrypt_cost = cost;
        cfg
    }

    #[test]
    fn token_lifetime_bounds_are_enforced() {
        assert!(security(1, 10).validate().is_ok());
        assert!(security(MAX_JWT_EXPIRATION_HOURS, 10).validate().is_ok());

        for hours in [0, -1, MAX_JWT_EXPIRATION_HOURS + 1, i64::MAX] {
            let err = security(hours, 10).validate().unwrap_err();
            assert!(matches!(err, InfraError::Config(msg) if msg.contains("jwt_expiration_hours")));
        }
    }

    #[test]
    fn bcrypt_cost_bounds_are_enforced() {
        assert!(security(24, 4).validate().is_ok());
        assert!(security(24, 31).validate().is_ok());

        for cost in [0, 3, 32, 40] {
            let err = security(24, cost).validate().unwrap_err();
            assert!(matches!(err, InfraError::Config(msg) if msg.contains("bcrypt_cost")));
        }
    }

    #[test]
    fn load_rejects_out_of_range_values() {
        let path = std::env::temp_dir().join(format!(
            "users-service-config-{}.toml",
            uuid::Uuid::new_v4()
        ));
        std::fs::write(&path, "[security]\nbcrypt_cost = 40\n").unwrap();

        let result = AppConfig::load(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(InfraError::Config(msg)) if msg.contains("bcrypt_cost")));
    }
}
