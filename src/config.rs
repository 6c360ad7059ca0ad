//! Server configuration read from the environment.
//!
//! `HOST` (default 0.0.0.0), `PORT` (default 8080), `BRACKET_FORMAT`
//! (`final` or `semifinals`), `SCHEDULE_SEED` (fixes the draw jitter) and
//! `PUBLIC_URL` (base of share links).

use crate::logic::BracketFormat;
use crate::models::TournamentId;

#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub bracket_format: BracketFormat,
    pub schedule_seed: Option<u64>,
    /// Without a trailing slash.
    pub public_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            bracket_format: BracketFormat::default(),
            schedule_seed: None,
            public_url: "http://localhost:8080".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unparseable values fall back to the default with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = parsed(&lookup, "PORT").unwrap_or(defaults.port);
        let bracket_format = match lookup("BRACKET_FORMAT") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                log::warn!("BRACKET_FORMAT: {}, using final", e);
                BracketFormat::Final
            }),
            None => defaults.bracket_format,
        };
        let schedule_seed = parsed(&lookup, "SCHEDULE_SEED");
        let public_url = lookup("PUBLIC_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("http://localhost:{}", port));
        Self {
            host,
            port,
            bracket_format,
            schedule_seed,
            public_url,
        }
    }

    /// Link that opens the given tournament.
    pub fn share_url(&self, id: TournamentId) -> String {
        format!("{}/?tournament={}", self.public_url, id)
    }
}

fn parsed<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring {}={:?}", key, raw);
            None
        }
    }
}
