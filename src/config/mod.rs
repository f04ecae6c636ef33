use std::env;
use thiserror::Error;

use crate::uploads::S3Config;

pub mod cors;
pub mod headers;

pub use cors::create_cors_layer;
pub use headers::create_response_headers_layer;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

pub struct Config {
    pub port: u16,
    /// When unset the service keeps events in process memory.
    pub database_url: Option<String>,
    pub page_size: usize,
    pub uploads: S3Config,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match non_empty("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let page_size = match non_empty("EVENTS_PAGE_SIZE") {
            Some(value) => match value.trim().parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "EVENTS_PAGE_SIZE",
                        value,
                    })
                }
            },
            None => DEFAULT_PAGE_SIZE,
        };

        let uploads = S3Config {
            bucket: non_empty("UPLOAD_BUCKET").ok_or(ConfigError::Missing("UPLOAD_BUCKET"))?,
            region: non_empty("AWS_REGION"),
            endpoint: non_empty("S3_ENDPOINT"),
        };

        Ok(Self {
            port,
            database_url: non_empty("DATABASE_URL"),
            page_size,
            uploads,
        })
    }
}
