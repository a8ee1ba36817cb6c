use std::{env, sync::Arc};

use arcade_core::constants::LEADERBOARD_SIZE;

use crate::store::ScoreStore;

pub(crate) const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub(crate) const DEFAULT_LEADERBOARD_LIMIT: usize = LEADERBOARD_SIZE;
pub(crate) const DEFAULT_JSON_LIMIT_BYTES: usize = 16 * 1024;

#[derive(Debug, Clone)]
pub(crate) struct ServerConfig {
    pub(crate) bind_addr: String,
    pub(crate) database_url: Option<String>,
    pub(crate) leaderboard_limit: usize,
    pub(crate) json_limit_bytes: usize,
    pub(crate) http_workers: Option<usize>,
}

impl ServerConfig {
    pub(crate) fn from_env() -> Self {
        let mut leaderboard_limit = read_env_usize("LEADERBOARD_LIMIT", DEFAULT_LEADERBOARD_LIMIT);
        if leaderboard_limit > DEFAULT_LEADERBOARD_LIMIT {
            tracing::warn!(
                "LEADERBOARD_LIMIT ({}) exceeds {}. Falling back to default.",
                leaderboard_limit,
                DEFAULT_LEADERBOARD_LIMIT
            );
            leaderboard_limit = DEFAULT_LEADERBOARD_LIMIT;
        }

        Self {
            bind_addr: read_env_string("API_BIND_ADDR")
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            database_url: read_env_string("DATABASE_URL"),
            leaderboard_limit,
            json_limit_bytes: read_env_usize("JSON_LIMIT_BYTES", DEFAULT_JSON_LIMIT_BYTES),
            http_workers: read_env_optional_usize("HTTP_WORKERS"),
        }
    }
}

#[derive(Clone)]
pub(crate) struct AppState {
    /// `None` when no database is configured; score routes then answer 500.
    pub(crate) scores: Option<Arc<ScoreStore>>,
    pub(crate) leaderboard_limit: usize,
}

impl AppState {
    pub(crate) fn from_config(config: &ServerConfig) -> Result<Self, String> {
        let scores = match config.database_url.as_deref() {
            Some(url) => Some(Arc::new(ScoreStore::open(url)?)),
            None => {
                tracing::warn!("DATABASE_URL is not set; score routes will report an error");
                None
            }
        };

        Ok(Self {
            scores,
            leaderboard_limit: config.leaderboard_limit,
        })
    }
}

pub(crate) fn read_env_string(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub(crate) fn read_env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

pub(crate) fn read_env_optional_usize(name: &str) -> Option<usize> {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
}
