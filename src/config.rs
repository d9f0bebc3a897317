/*
 * Responsibility
 * - 環境変数や設定の読み込み (署名鍵、トークン寿命、sweep 設定など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    /// HMAC signing key, decoded from base64. Held in memory only; the raw
    /// value must never show up in logs or responses.
    pub token_secret: Vec<u8>,
    pub token_ttl_seconds: i64,

    pub revocation_sweep_interval_seconds: u64,
    pub revocation_sweep_threshold: usize,

    /// Optional bootstrap admin account (seeded once at startup).
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let token_secret_b64 = std::env::var("AUTH_TOKEN_SECRET")
            .map_err(|_| ConfigError::Missing("AUTH_TOKEN_SECRET"))?;
        let token_secret = BASE64
            .decode(token_secret_b64.trim())
            .map_err(|_| ConfigError::Invalid("AUTH_TOKEN_SECRET"))?;
        // HS256 より短い鍵は拒否 (32 bytes)
        if token_secret.len() < 32 {
            return Err(ConfigError::Invalid("AUTH_TOKEN_SECRET"));
        }

        let token_ttl_seconds = std::env::var("AUTH_TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(24 * 60 * 60);
        if token_ttl_seconds <= 0 {
            return Err(ConfigError::Invalid("AUTH_TOKEN_TTL_SECONDS"));
        }

        let revocation_sweep_interval_seconds = std::env::var("REVOCATION_SWEEP_INTERVAL_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60 * 60);
        if revocation_sweep_interval_seconds == 0 {
            return Err(ConfigError::Invalid("REVOCATION_SWEEP_INTERVAL_SECONDS"));
        }

        let revocation_sweep_threshold = std::env::var("REVOCATION_SWEEP_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1000);

        let admin_email = std::env::var("ADMIN_EMAIL").ok().filter(|s| !s.is_empty());
        let admin_password = std::env::var("ADMIN_PASSWORD")
            .ok()
            .filter(|s| !s.is_empty());

        Ok(Self {
            addr,
            app_env,
            token_secret,
            token_ttl_seconds,
            revocation_sweep_interval_seconds,
            revocation_sweep_threshold,
            admin_email,
            admin_password,
        })
    }
}
