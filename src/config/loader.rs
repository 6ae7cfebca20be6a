//! Load server configuration from the environment (and `.env`, when present).

use crate::error::ConfigError;
use crate::state::RequestLimits;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 4000;

/// Bootstrap settings for the binary.
#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Multi-worker mode: `workers` isolated instances on `port + 1 ..= port + workers`.
    pub multi: bool,
    /// Worker count in multi mode; always 1 otherwise.
    pub workers: usize,
    pub body_timeout: Duration,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let limits = RequestLimits::default();
        ServerConfig {
            host: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            multi: false,
            workers: 1,
            body_timeout: limits.body_timeout,
            max_body_bytes: limits.max_body_bytes,
        }
    }
}

impl ServerConfig {
    /// Read `.env` (missing file is fine), then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset or empty keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = ServerConfig::default();

        let host = parse_or(get("HOST"), "HOST", defaults.host)?;
        let port = parse_or(get("PORT"), "PORT", defaults.port)?;
        let multi = match get("MULTI") {
            Some(v) => parse_flag(&v).ok_or(ConfigError::Invalid { key: "MULTI", value: v })?,
            None => false,
        };
        let workers = if multi {
            let n = parse_or(get("WORKERS"), "WORKERS", default_workers())?;
            if n == 0 {
                return Err(ConfigError::Invalid {
                    key: "WORKERS",
                    value: "0".into(),
                });
            }
            n
        } else {
            1
        };
        let timeout_ms = parse_or(
            get("BODY_TIMEOUT_MS"),
            "BODY_TIMEOUT_MS",
            defaults.body_timeout.as_millis() as u64,
        )?;
        let max_body_bytes = parse_or(
            get("MAX_BODY_BYTES"),
            "MAX_BODY_BYTES",
            defaults.max_body_bytes,
        )?;

        Ok(ServerConfig {
            host,
            port,
            multi,
            workers,
            body_timeout: Duration::from_millis(timeout_ms),
            max_body_bytes,
        })
    }

    pub fn is_multi(&self) -> bool {
        self.multi
    }

    pub fn limits(&self) -> RequestLimits {
        RequestLimits {
            body_timeout: self.body_timeout,
            max_body_bytes: self.max_body_bytes,
        }
    }
}

fn parse_or<T: FromStr>(
    raw: Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// One worker per spare CPU, at least one.
fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1))
        .unwrap_or(1)
        .max(1)
}
