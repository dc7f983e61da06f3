use super::player::Player;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub ok: bool,
    pub deleted: Player,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub version: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Names of the server-sent events on `/api/players/stream`.
pub const EVENT_CONNECTED: &str = "connected";
pub const EVENT_PLAYERS_UPDATED: &str = "playersUpdated";
