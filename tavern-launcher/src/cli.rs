use backend::config::AppConfig;
use backend::dbs::DatabaseConfig;
use backend::images::ImageHostConfig;
use clap::{Parser, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ImageHost {
    /// Embed images in the record as data URLs
    Inline,
    /// Write images to --upload-dir and serve them under /uploads
    Disk,
}

#[derive(Parser, Debug)]
#[command(about = "Tavern campaign server")]
pub struct Cli {
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,
    #[arg(long, env = "TAVERN_DIST_DIR", default_value = "dist")]
    pub dist_dir: PathBuf,
    /// Postgres connection string. Without it players live in --local-db-path.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
    #[arg(long, env = "TAVERN_LOCAL_DB", default_value = "players.json")]
    pub local_db_path: PathBuf,
    #[arg(long, env = "TAVERN_IMAGE_HOST", value_enum, default_value_t = ImageHost::Inline)]
    pub image_host: ImageHost,
    #[arg(long, env = "TAVERN_UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,
    /// Seconds a cached player listing stays valid, 0 for no expiry
    #[arg(long, env = "TAVERN_CACHE_TTL", default_value_t = 30)]
    pub cache_ttl_secs: u64,
}

impl Cli {
    pub fn app_config(&self) -> AppConfig {
        let database = match &self.database_url {
            Some(url) if !url.trim().is_empty() => DatabaseConfig::Postgres { url: url.clone() },
            _ => DatabaseConfig::Local {
                path: Some(self.local_db_path.clone()),
            },
        };
        let images = match self.image_host {
            ImageHost::Inline => ImageHostConfig::Inline,
            ImageHost::Disk => ImageHostConfig::Disk {
                dir: self.upload_dir.clone(),
            },
        };

        AppConfig {
            database,
            images,
            cache_ttl: AppConfig::ttl_from_secs(self.cache_ttl_secs),
        }
    }
}
