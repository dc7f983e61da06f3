use gloo_net::http::{Request, Response};
use gloo_storage::{LocalStorage, Storage};
use shared::models::*;
use uuid::Uuid;
use web_sys::FormData;

const API_BASE: &str = "/api";
pub const STREAM_URL: &str = "/api/players/stream";
/// Written by the master after each change so boards in other tabs refresh.
pub const UPDATED_KEY: &str = "tavern.players.updated";

pub enum Listing {
    NotModified,
    Players {
        players: Vec<Player>,
        etag: Option<String>,
    },
}

async fn checked(response: Response) -> Result<Response, gloo_net::Error> {
    if response.ok() {
        return Ok(response);
    }
    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => format!("Request failed with status {}", response.status()),
    };
    Err(gloo_net::Error::GlooError(message))
}

/// Fetches the listing, sending `etag` as `If-None-Match`.
pub async fn fetch_players(etag: Option<&str>) -> Result<Listing, gloo_net::Error> {
    let mut request = Request::get(&format!("{}/players", API_BASE));
    if let Some(etag) = etag {
        request = request.header("If-None-Match", etag);
    }
    let response = request.send().await?;
    if response.status() == 304 {
        return Ok(Listing::NotModified);
    }

    let response = checked(response).await?;
    let etag = response.headers().get("etag");
    Ok(Listing::Players {
        players: response.json().await?,
        etag,
    })
}

pub async fn create_player(form: FormData) -> Result<Player, gloo_net::Error> {
    let response = Request::post(&format!("{}/players", API_BASE))
        .body(form)?
        .send()
        .await?;
    let player = checked(response).await?.json().await?;
    mark_players_updated();
    Ok(player)
}

pub async fn update_player(id: Uuid, form: FormData) -> Result<Player, gloo_net::Error> {
    let response = Request::put(&format!("{}/players/{}", API_BASE, id))
        .body(form)?
        .send()
        .await?;
    let player = checked(response).await?.json().await?;
    mark_players_updated();
    Ok(player)
}

pub async fn delete_player(id: Uuid) -> Result<DeleteResponse, gloo_net::Error> {
    let response = Request::delete(&format!("{}/players/{}", API_BASE, id))
        .send()
        .await?;
    let deleted = checked(response).await?.json().await?;
    mark_players_updated();
    Ok(deleted)
}

fn mark_players_updated() {
    if let Err(e) = LocalStorage::set(UPDATED_KEY, web_sys::js_sys::Date::now()) {
        tracing::warn!("Failed to record player update: {:?}", e);
    }
}
