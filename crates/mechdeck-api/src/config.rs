//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::AppError;

/// Startup settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Interface to bind (`HOST`, default `0.0.0.0`).
    pub host: String,
    /// Port to bind (`PORT`, default `3000`).
    pub port: u16,
    /// `PostgreSQL` URL (`DATABASE_URL`); in-memory stores when unset.
    pub database_url: Option<String>,
    /// Directory of story documents (`STORIES_DIR`, default `stories`).
    pub stories_dir: PathBuf,
    /// Card catalog file (`CARD_CATALOG_PATH`, default `data/cards.json`).
    pub card_catalog_path: PathBuf,
    /// Fixed RNG seed (`RNG_SEED`) for reproducible draws.
    pub rng_seed: Option<u64>,
}

impl ApiConfig {
    /// Reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `PORT` or `RNG_SEED` does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, treating empty values as unset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `PORT` or `RNG_SEED` does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => 3000,
        };
        let rng_seed = get("RNG_SEED")
            .map(|raw| {
                raw.trim()
                    .parse()
                    .map_err(|e| AppError::Config(format!("RNG_SEED must be a valid u64: {e}")))
            })
            .transpose()?;

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port,
            database_url: get("DATABASE_URL"),
            stories_dir: get("STORIES_DIR").map_or_else(|| PathBuf::from("stories"), PathBuf::from),
            card_catalog_path: get("CARD_CATALOG_PATH")
                .map_or_else(|| PathBuf::from("data/cards.json"), PathBuf::from),
            rng_seed,
        })
    }

    /// Address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}
