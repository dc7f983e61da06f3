pub mod cache;
pub mod config;
pub mod dbs;
pub mod error;
pub mod form;
mod handlers;
pub mod images;
pub mod merge;
pub mod notifier;

use crate::cache::PlayerCache;
use crate::config::AppConfig;
use crate::dbs::{Database, DbError};
use crate::handlers::{
    create_player, delete_player, get_player, health, list_campaign_players, list_players,
    player_events, update_player,
};
use crate::images::{ImageHost, ImageHostConfig};
use crate::notifier::{ChangeEvent, ChangeKind, ChangeNotifier};
use axum::{Router, extract::DefaultBodyLimit, routing::get};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, services::ServeDir};
use uuid::Uuid;

/// Seven images at the upload limit plus the text fields.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Database>,
    pub images: Arc<dyn ImageHost>,
    pub cache: Arc<PlayerCache>,
    pub notifier: Arc<ChangeNotifier>,
}

impl AppState {
    pub fn new(
        db: Arc<dyn Database>,
        images: Arc<dyn ImageHost>,
        cache_ttl: Option<Duration>,
    ) -> Self {
        Self {
            db,
            images,
            cache: Arc::new(PlayerCache::new(cache_ttl)),
            notifier: Arc::new(ChangeNotifier::default()),
        }
    }

    /// Runs after every successful mutation.
    pub(crate) async fn players_changed(&self, kind: ChangeKind, player_id: Uuid) {
        self.cache.invalidate().await;
        let reached = self.notifier.publish(ChangeEvent { kind, player_id });
        tracing::info!(
            "Player {} {:?}, notified {} boards",
            player_id,
            kind,
            reached
        );
    }
}

/// The API routes, ready to be merged into a server.
pub fn router(state: AppState) -> Router<()> {
    Router::new()
        .route("/health", get(health))
        .route("/api/players", get(list_players).post(create_player))
        .route("/api/players/stream", get(player_events))
        .route("/api/players/id/{id}", get(get_player))
        .route(
            "/api/players/{key}",
            get(list_campaign_players)
                .put(update_player)
                .delete(delete_player),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Connects the configured services and merges the API into `app`.
pub async fn init(app: Router<()>, config: &AppConfig) -> Result<Router<()>, DbError> {
    let db = dbs::connect(&config.database).await?;
    let image_host = images::from_config(&config.images);
    let state = AppState::new(db, image_host, config.cache_ttl);

    let mut api = router(state);
    if let ImageHostConfig::Disk { dir } = &config.images {
        tokio::fs::create_dir_all(dir).await?;
        tracing::info!("Serving uploaded images from {}", dir.display());
        api = api.nest_service(images::disk::URL_PREFIX, ServeDir::new(dir));
    }

    Ok(app.merge(api))
}
