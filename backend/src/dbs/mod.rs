use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use shared::models::Player;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

pub mod document;
pub mod local;
pub mod postgres;

pub use local::LocalDatabase;
pub use postgres::PostgresDatabase;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Clone, Debug)]
pub enum DatabaseConfig {
    /// JSON document file. `None` keeps everything in memory.
    Local { path: Option<PathBuf> },
    Postgres { url: String },
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Entity not found: {0}")]
    NotFound(String),
    #[error("Conflicting write: {0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// The record store. Implementations assign ids and timestamps and hand back
/// normalized records.
#[async_trait]
pub trait Database: Send + Sync {
    /// Newest first, optionally restricted to one campaign.
    async fn get_players(&self, campaign: Option<&str>) -> DbResult<Vec<Player>>;
    async fn get_player(&self, player_id: Uuid) -> DbResult<Player>;
    async fn create_player(&self, player: Player) -> DbResult<Player>;
    /// `player.updated_at` must still match the stored record, otherwise
    /// the write is refused with [`DbError::Conflict`].
    async fn update_player(&self, player: Player) -> DbResult<Player>;
    /// Returns the removed record.
    async fn delete_player(&self, player_id: Uuid) -> DbResult<Player>;
}

pub async fn connect(config: &DatabaseConfig) -> DbResult<Arc<dyn Database>> {
    match config {
        DatabaseConfig::Local { path: Some(path) } => {
            tracing::info!("Using local player store at {}", path.display());
            Ok(Arc::new(LocalDatabase::open(path.clone()).await?))
        }
        DatabaseConfig::Local { path: None } => {
            tracing::warn!("Using in-memory player store, nothing will be persisted");
            Ok(Arc::new(LocalDatabase::in_memory()))
        }
        DatabaseConfig::Postgres { url } => {
            tracing::info!("Using postgres player store");
            Ok(Arc::new(PostgresDatabase::new(url).await?))
        }
    }
}

pub(crate) fn player_not_found(player_id: Uuid) -> DbError {
    DbError::NotFound(format!("Player {} not found", player_id))
}

pub(crate) fn player_changed(player_id: Uuid) -> DbError {
    DbError::Conflict(format!("Player {} was changed by another edit", player_id))
}

/// Current time at millisecond precision, the resolution the ETag fingerprint
/// uses.
pub(crate) fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// A write timestamp strictly after `previous`, so every update moves the
/// fingerprint even inside the same millisecond.
pub(crate) fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    now_millis().max(previous + Duration::milliseconds(1))
}

/// Newest first; ids break ties so the order is stable.
pub(crate) fn sort_newest_first(players: &mut [Player]) {
    players.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
}
