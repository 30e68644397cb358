//! Configuration module for the Study Vault backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Credential pair that authenticates as the super admin without a stored user.
#[derive(Clone)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Output format for the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bypass credential pair; the bypass login path is disabled when absent
    pub admin: Option<AdminCredentials>,
    /// HMAC secret for signing tokens
    pub jwt_secret: String,
    /// Whether `jwt_secret` was generated for this process only
    pub jwt_secret_ephemeral: bool,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let admin = match (
            non_empty_var("CATALOG_ADMIN_EMAIL"),
            non_empty_var("CATALOG_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(AdminCredentials { email, password }),
            _ => None,
        };

        let (jwt_secret, jwt_secret_ephemeral) = match non_empty_var("CATALOG_JWT_SECRET") {
            Some(secret) => (secret, false),
            None => (uuid::Uuid::new_v4().simple().to_string(), true),
        };

        let db_path = env::var("CATALOG_DB_PATH")
            .unwrap_or_else(|_| "./data/catalog.sqlite".to_string())
            .into();

        let bind_addr = env::var("CATALOG_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:5001".to_string())
            .parse()
            .expect("Invalid CATALOG_BIND_ADDR format");

        let log_level = env::var("CATALOG_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = match env::var("CATALOG_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Self {
            admin,
            jwt_secret,
            jwt_secret_ephemeral,
            db_path,
            bind_addr,
            log_level,
            log_format,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("CATALOG_ADMIN_EMAIL");
        env::remove_var("CATALOG_ADMIN_PASSWORD");
        env::remove_var("CATALOG_JWT_SECRET");
        env::remove_var("CATALOG_DB_PATH");
        env::remove_var("CATALOG_BIND_ADDR");
        env::remove_var("CATALOG_LOG_LEVEL");
        env::remove_var("CATALOG_LOG_FORMAT");

        let config = Config::from_env();

        assert!(config.admin.is_none());
        assert!(config.jwt_secret_ephemeral);
        assert!(!config.jwt_secret.is_empty());
        assert_eq!(config.db_path, PathBuf::from("./data/catalog.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:5001");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_admin_credentials_debug_hides_password() {
        let creds = AdminCredentials {
            email: "root@vault.test".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("root@vault.test"));
        assert!(!rendered.contains("hunter2"));
    }
}
