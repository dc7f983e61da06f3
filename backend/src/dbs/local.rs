use crate::dbs::document::PlayerDocument;
use crate::dbs::{
    Database, DbResult, next_timestamp, now_millis, player_changed, player_not_found,
    sort_newest_first,
};
use async_trait::async_trait;
use serde_json::Value;
use shared::models::Player;
use std::path::PathBuf;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Player documents kept in memory and mirrored to a JSON file.
///
/// Writers hold the write lock until the snapshot is on disk, so snapshots
/// land in order and memory only changes once the file does.
pub struct LocalDatabase {
    path: Option<PathBuf>,
    players: RwLock<Vec<Player>>,
}

impl LocalDatabase {
    pub fn in_memory() -> Self {
        Self::with_players(None, Vec::new())
    }

    /// Loads `path` if it exists. Documents in older shapes are normalized
    /// on the way in.
    pub async fn open(path: PathBuf) -> DbResult<Self> {
        let players = match tokio::fs::read_to_string(&path).await {
            Ok(content) => parse_documents(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!("Loaded {} players from {}", players.len(), path.display());
        Ok(Self::with_players(Some(path), players))
    }

    fn with_players(path: Option<PathBuf>, players: Vec<Player>) -> Self {
        Self {
            path,
            players: RwLock::new(players),
        }
    }

    /// Writes `next` to disk, then makes it the live list.
    async fn commit(&self, db: &mut Vec<Player>, next: Vec<Player>) -> DbResult<()> {
        self.save(&next).await?;
        *db = next;
        Ok(())
    }

    async fn save(&self, players: &[Player]) -> DbResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let content = serde_json::to_string_pretty(players)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

fn parse_documents(content: &str) -> DbResult<Vec<Player>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let now = now_millis();
    let raw: Vec<Value> = serde_json::from_str(content)?;
    raw.into_iter()
        .map(|value| Ok(PlayerDocument::from_value(value)?.normalize(now)))
        .collect()
}

#[async_trait]
impl Database for LocalDatabase {
    async fn get_players(&self, campaign: Option<&str>) -> DbResult<Vec<Player>> {
        let mut players: Vec<Player> = {
            let db = self.players.read().await;
            db.iter()
                .filter(|p| campaign.is_none_or(|c| p.campaign == c))
                .cloned()
                .collect()
        };
        sort_newest_first(&mut players);
        Ok(players)
    }

    async fn get_player(&self, player_id: Uuid) -> DbResult<Player> {
        let db = self.players.read().await;
        db.iter()
            .find(|p| p.id == player_id)
            .cloned()
            .ok_or_else(|| player_not_found(player_id))
    }

    async fn create_player(&self, mut player: Player) -> DbResult<Player> {
        player.id = Uuid::new_v4();
        player.created_at = now_millis();
        player.updated_at = player.created_at;

        let mut db = self.players.write().await;
        let mut next = db.clone();
        next.push(player.clone());
        self.commit(&mut db, next).await?;
        Ok(player)
    }

    async fn update_player(&self, mut player: Player) -> DbResult<Player> {
        let mut db = self.players.write().await;
        let index = db
            .iter()
            .position(|p| p.id == player.id)
            .ok_or_else(|| player_not_found(player.id))?;
        let stored = &db[index];
        if stored.updated_at != player.updated_at {
            return Err(player_changed(player.id));
        }
        player.created_at = stored.created_at;
        player.updated_at = next_timestamp(stored.updated_at);

        let mut next = db.clone();
        next[index] = player.clone();
        self.commit(&mut db, next).await?;
        Ok(player)
    }

    async fn delete_player(&self, player_id: Uuid) -> DbResult<Player> {
        let mut db = self.players.write().await;
        let index = db
            .iter()
            .position(|p| p.id == player_id)
            .ok_or_else(|| player_not_found(player_id))?;
        let mut next = db.clone();
        let removed = next.remove(index);
        self.commit(&mut db, next).await?;
        Ok(removed)
    }
}
