use std::net::IpAddr;

use chrono::{Duration, Utc};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub max_body_size: usize,
    pub log_level: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub default_admin: AdminCredentials,
}

/// Account created at startup when no user with this name exists yet.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("NOTEDESK_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid NOTEDESK_HOST: {e}"))?;

        let port: u16 = env_or("NOTEDESK_PORT", "5000")
            .parse()
            .map_err(|e| format!("Invalid NOTEDESK_PORT: {e}"))?;

        let max_body_size: usize = env_or("NOTEDESK_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid NOTEDESK_MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("NOTEDESK_LOG_LEVEL", "info");

        let access_token_ttl = env_minutes("NOTEDESK_ACCESS_TOKEN_TTL_MINUTES", 24 * 60)?;
        let refresh_token_ttl = env_minutes("NOTEDESK_REFRESH_TOKEN_TTL_MINUTES", 2 * 24 * 60)?;

        let default_admin = AdminCredentials {
            username: env_or("NOTEDESK_DEFAULT_USERNAME", "admin"),
            password: env_or("NOTEDESK_DEFAULT_PASSWORD", "adminadmin"),
        };

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            max_body_size,
            log_level,
            access_token_ttl,
            refresh_token_ttl,
            default_admin,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_minutes(key: &str, default: i64) -> Result<Duration, String> {
    parse_minutes(key, &env_or(key, &default.to_string()))
}

/// Parse a positive minute count for `key`. Values too large to add to the
/// current time are rejected.
pub fn parse_minutes(key: &str, raw: &str) -> Result<Duration, String> {
    let minutes: i64 = raw.trim().parse().map_err(|e| format!("Invalid {key}: {e}"))?;
    if minutes <= 0 {
        return Err(format!("Invalid {key}: must be positive"));
    }
    Duration::try_minutes(minutes)
        .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
        .ok_or_else(|| format!("Invalid {key}: out of range"))
}
