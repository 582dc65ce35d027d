//! Runtime configuration read from the environment.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DATABASE_URL_VAR: &str = "BOOKING_DATABASE_URL";
pub const BIND_ADDR_VAR: &str = "BOOKING_BIND_ADDR";
pub const ALLOWED_ORIGIN_VAR: &str = "BOOKING_ALLOWED_ORIGIN";
pub const STATIC_DIR_VAR: &str = "BOOKING_STATIC_DIR";

const DEFAULT_DATABASE_URL: &str = "sqlite:appointments.db";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:8080";
const DEFAULT_STATIC_DIR: &str = "../frontend/dist";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Origin the frontend is served from, allowed through CORS
    pub allowed_origin: String,
    /// Built frontend served for every non-API path
    pub static_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from `BOOKING_*` environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup(DATABASE_URL_VAR).unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let bind_addr_raw = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr_raw
            .parse::<SocketAddr>()
            .with_context(|| format!("{} is not a socket address: {}", BIND_ADDR_VAR, bind_addr_raw))?;
        let allowed_origin = lookup(ALLOWED_ORIGIN_VAR).unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string());
        let static_dir = PathBuf::from(lookup(STATIC_DIR_VAR).unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()));

        Ok(Self {
            database_url,
            bind_addr,
            allowed_origin,
            static_dir,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}
