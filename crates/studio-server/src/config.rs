//! Server Configuration
//!
//! Read once at startup from the environment (after `.env` is loaded).
//! Stripe credentials are read by `StripeClient::from_env` on their own so
//! the secret never sits in this struct.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 4242;
pub const DEFAULT_STUDIO_NAME: &str = "Luna Design Studio";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("PORT must be a number between 1 and 65535, got {0:?}")]
    InvalidPort(String),

    #[error("HOST must be an IP address, got {0:?}")]
    InvalidHost(String),
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Interface to bind
    pub host: IpAddr,

    /// Listening port
    pub port: u16,

    /// Display name rendered into every page
    pub studio_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = match lookup("HOST") {
            Some(raw) => raw
                .trim()
                .parse::<IpAddr>()
                .map_err(|_| ConfigError::InvalidHost(raw))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let port = match lookup("PORT") {
            Some(raw) => match raw.trim().parse::<u16>() {
                Ok(port) if port > 0 => port,
                _ => return Err(ConfigError::InvalidPort(raw)),
            },
            None => DEFAULT_PORT,
        };

        let studio_name = lookup("STUDIO_NAME")
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_STUDIO_NAME.into());

        Ok(Self {
            host,
            port,
            studio_name,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
