use std::{env, net::SocketAddr, str::FromStr, time::Duration};

use crate::errors::AppError;

/// Relay configuration loaded from environment variables (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    /// Requests per minute allowed from one IP address.
    pub rate_limit_per_minute: u32,
    /// Reserved rooms nobody entered are removed after this long.
    pub room_idle_ttl_secs: u64,
    pub room_cleanup_interval_secs: u64,
    /// Frames larger than this close the connection.
    pub max_message_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3001,
            allowed_origins: vec!["http://localhost:3000".into()],
            rate_limit_per_minute: 600,
            room_idle_ttl_secs: 600,
            room_cleanup_interval_secs: 60,
            max_message_bytes: 4096,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{name} has an invalid value: {raw}"))),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Config::default();

        let allowed_origins = match env::var("ALLOWED_ORIGINS") {
            Ok(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => defaults.allowed_origins,
        };

        let config = Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            allowed_origins,
            rate_limit_per_minute: parse_var("RATE_LIMIT_PER_MINUTE", defaults.rate_limit_per_minute)?,
            room_idle_ttl_secs: parse_var("ROOM_IDLE_TTL_SECS", defaults.room_idle_ttl_secs)?,
            room_cleanup_interval_secs: parse_var(
                "ROOM_CLEANUP_INTERVAL_SECS",
                defaults.room_cleanup_interval_secs,
            )?,
            max_message_bytes: parse_var("MAX_MESSAGE_BYTES", defaults.max_message_bytes)?,
        };

        if config.rate_limit_per_minute == 0 {
            return Err(AppError::Config(
                "RATE_LIMIT_PER_MINUTE must be positive".into(),
            ));
        }
        if config.room_cleanup_interval_secs == 0 {
            return Err(AppError::Config(
                "ROOM_CLEANUP_INTERVAL_SECS must be positive".into(),
            ));
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid bind address {}:{}", self.host, self.port)))
    }

    pub fn room_idle_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.room_idle_ttl_secs as i64)
    }
}

/// Settings for a [`crate::client::SessionClient`] connection.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket URL of the relay, e.g. `ws://127.0.0.1:3001/ws`.
    pub server_url: String,
    pub connect_timeout: Duration,
    /// Capacity of the bounded event channel handed to the UI.
    pub event_channel_capacity: usize,
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            connect_timeout: Duration::from_secs(10),
            event_channel_capacity: 64,
        }
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity.max(1);
        self
    }
}
