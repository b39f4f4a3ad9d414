use std::net::IpAddr;
use std::path::PathBuf;

use chrono::{Duration, Utc};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: Option<String>,
    pub jwt_ttl: Duration,
    pub host: IpAddr,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub max_body_size: usize,
    pub cors_origins: Vec<String>,
    pub auth_mode: AuthMode,
    pub log_level: String,
}

/// How the employee routes treat requests without a valid bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Attach identity when a valid token is present, otherwise proceed anonymously.
    Optional,
    /// Reject anonymous requests with 401.
    Required,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;

        let jwt_secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let jwt_ttl = parse_ttl(&env_or("JWT_EXPIRES_IN", "1d"))
            .map_err(|e| format!("Invalid JWT_EXPIRES_IN: {e}"))?;

        let host: IpAddr = env_or("STAFFDESK_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid STAFFDESK_HOST: {e}"))?;

        let port: u16 = env_or("STAFFDESK_PORT", "4000")
            .parse()
            .map_err(|e| format!("Invalid STAFFDESK_PORT: {e}"))?;

        let upload_dir = PathBuf::from(env_or("STAFFDESK_UPLOAD_DIR", "uploads"));

        let max_body_size: usize = env_or("STAFFDESK_MAX_BODY_SIZE", "5242880")
            .parse()
            .map_err(|e| format!("Invalid STAFFDESK_MAX_BODY_SIZE: {e}"))?;

        let cors_origins: Vec<String> = env_or("STAFFDESK_CORS_ORIGINS", "")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let auth_mode = match env_or("STAFFDESK_AUTH_MODE", "optional").as_str() {
            "required" => AuthMode::Required,
            "optional" => AuthMode::Optional,
            other => return Err(format!("Invalid STAFFDESK_AUTH_MODE: {other}")),
        };

        let log_level = env_or("STAFFDESK_LOG_LEVEL", "info");

        Ok(Config {
            database_url,
            jwt_secret,
            jwt_ttl,
            host,
            port,
            upload_dir,
            max_body_size,
            cors_origins,
            auth_mode,
            log_level,
        })
    }
}

/// Parse a token lifetime such as `3600`, `90s`, `15m`, `12h` or `1d`.
pub fn parse_ttl(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let (digits, unit) = match raw.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => raw.split_at(idx),
        None => (raw, "s"),
    };

    let amount: i64 = digits
        .parse()
        .map_err(|_| format!("expected a number followed by s/m/h/d, got '{raw}'"))?;
    if amount <= 0 {
        return Err("lifetime must be positive".to_string());
    }

    let ttl = match unit {
        "s" => Duration::try_seconds(amount),
        "m" => Duration::try_minutes(amount),
        "h" => Duration::try_hours(amount),
        "d" => Duration::try_days(amount),
        other => return Err(format!("unknown unit '{other}'")),
    };
    // Tokens are stamped with `now + ttl`, which must stay representable.
    ttl.filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
        .ok_or_else(|| format!("lifetime '{raw}' is too large"))
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
