use crate::dbs::DatabaseConfig;
use crate::images::ImageHostConfig;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// Resolved server settings, independent of where they were read from.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub images: ImageHostConfig,
    /// `None` keeps the listing cached until the next mutation.
    pub cache_ttl: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::Local {
                path: Some(PathBuf::from("players.json")),
            },
            images: ImageHostConfig::Inline,
            cache_ttl: Some(DEFAULT_CACHE_TTL),
        }
    }
}

impl AppConfig {
    /// Everything in memory with inline images. Used by tests and demos.
    pub fn ephemeral() -> Self {
        Self {
            database: DatabaseConfig::Local { path: None },
            ..Self::default()
        }
    }

    /// Zero seconds disables expiry.
    pub fn ttl_from_secs(secs: u64) -> Option<Duration> {
        (secs > 0).then(|| Duration::from_secs(secs))
    }
}
