use crate::dbs::document::PlayerDocument;
use crate::dbs::{
    Database, DbResult, next_timestamp, now_millis, player_changed, player_not_found,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use shared::models::Player;
use sqlx::{Pool, Postgres, Row, postgres::PgPoolOptions, postgres::PgRow};
use uuid::Uuid;

/// One JSONB document per player. `campaign` and the timestamps are
/// mirrored into columns for filtering and ordering.
#[derive(Clone)]
pub struct PostgresDatabase {
    pool: Pool<Postgres>,
}

impl PostgresDatabase {
    pub async fn new(database_url: &str) -> DbResult<Self> {
        let pool = PgPoolOptions::new().connect(database_url).await?;

        let db = Self { pool };
        db.init().await?;
        Ok(db)
    }

    async fn init(&self) -> DbResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS players (
                id UUID PRIMARY KEY,
                campaign TEXT NOT NULL,
                document JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS players_campaign_created_idx
                ON players (campaign, created_at DESC)",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fetch_updated_at(&self, player_id: Uuid) -> DbResult<Option<DateTime<Utc>>> {
        let row = sqlx::query("SELECT updated_at FROM players WHERE id = $1")
            .bind(player_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("updated_at")))
    }
}

fn player_from_row(row: &PgRow) -> DbResult<Player> {
    let document: Value = row.get("document");
    let created_at: DateTime<Utc> = row.get("created_at");
    let mut player = PlayerDocument::from_value(document)?.normalize(created_at);
    player.id = row.get("id");
    player.created_at = created_at;
    player.updated_at = row.get("updated_at");
    Ok(player)
}

#[async_trait]
impl Database for PostgresDatabase {
    async fn get_players(&self, campaign: Option<&str>) -> DbResult<Vec<Player>> {
        let rows = if let Some(campaign) = campaign {
            sqlx::query(
                "SELECT id, document, created_at, updated_at FROM players
                 WHERE campaign = $1 ORDER BY created_at DESC, id",
            )
            .bind(campaign)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query(
                "SELECT id, document, created_at, updated_at FROM players
                 ORDER BY created_at DESC, id",
            )
            .fetch_all(&self.pool)
            .await?
        };

        rows.iter().map(player_from_row).collect()
    }

    async fn get_player(&self, player_id: Uuid) -> DbResult<Player> {
        let row = sqlx::query(
            "SELECT id, document, created_at, updated_at FROM players WHERE id = $1",
        )
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => player_from_row(&row),
            None => Err(player_not_found(player_id)),
        }
    }

    async fn create_player(&self, mut player: Player) -> DbResult<Player> {
        player.id = Uuid::new_v4();
        player.created_at = now_millis();
        player.updated_at = player.created_at;

        let document = serde_json::to_value(&player)?;
        sqlx::query(
            "INSERT INTO players (id, campaign, document, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(player.id)
        .bind(player.campaign.clone())
        .bind(document)
        .bind(player.created_at)
        .bind(player.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(player)
    }

    async fn update_player(&self, mut player: Player) -> DbResult<Player> {
        let expected = player.updated_at;
        player.updated_at = next_timestamp(expected);

        let document = serde_json::to_value(&player)?;
        let row = sqlx::query(
            "UPDATE players SET campaign = $1, document = $2, updated_at = $3
             WHERE id = $4 AND updated_at = $5 RETURNING created_at",
        )
        .bind(player.campaign.clone())
        .bind(document)
        .bind(player.updated_at)
        .bind(player.id)
        .bind(expected)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return match self.fetch_updated_at(player.id).await? {
                Some(_) => Err(player_changed(player.id)),
                None => Err(player_not_found(player.id)),
            };
        };
        player.created_at = row.get("created_at");
        Ok(player)
    }

    async fn delete_player(&self, player_id: Uuid) -> DbResult<Player> {
        let row = sqlx::query(
            "DELETE FROM players WHERE id = $1
             RETURNING id, document, created_at, updated_at",
        )
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => player_from_row(&row),
            None => Err(player_not_found(player_id)),
        }
    }
}
