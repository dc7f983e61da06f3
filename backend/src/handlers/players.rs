use crate::AppState;
use crate::cache::{etag, etag_matches, fingerprint};
use crate::error::ApiError;
use crate::form::PlayerForm;
use crate::images::{self, ImageUpload};
use crate::merge;
use crate::notifier::ChangeKind;
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use shared::models::{DeleteResponse, Player};
use uuid::Uuid;

/// Ids that do not parse cannot name a record.
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound)
}

fn listing_response(headers: &HeaderMap, etag: &str, players: &[Player]) -> Response {
    let not_modified = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|inm| etag_matches(inm, etag));
    let cache_headers = [
        (header::ETAG, etag.to_string()),
        (header::CACHE_CONTROL, "no-cache".to_string()),
    ];

    if not_modified {
        return (StatusCode::NOT_MODIFIED, cache_headers).into_response();
    }
    (cache_headers, Json(players)).into_response()
}

pub async fn list_players(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let db = state.db.clone();
    let listing = state
        .cache
        .get_or_load(|| async move { db.get_players(None).await })
        .await?;
    Ok(listing_response(&headers, &listing.etag, &listing.players))
}

pub async fn list_campaign_players(
    State(state): State<AppState>,
    Path(campaign): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let players = state.db.get_players(Some(&campaign)).await?;
    let etag = etag(&fingerprint(&players));
    Ok(listing_response(&headers, &etag, &players))
}

pub async fn get_player(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<Player>, ApiError> {
    let player = state.db.get_player(parse_id(&player_id)?).await?;
    Ok(Json(player))
}

/// Uploads the portrait (if any) and the item files in one batch so a
/// failure rolls back everything stored so far.
async fn upload_images(
    state: &AppState,
    portrait: Option<ImageUpload>,
    items: Vec<ImageUpload>,
) -> Result<(Option<String>, Vec<String>), ApiError> {
    let has_portrait = portrait.is_some();
    let uploads = portrait.into_iter().chain(items).collect();
    let mut references = images::upload_all(state.images.as_ref(), uploads).await?;
    let portrait = if has_portrait && !references.is_empty() {
        Some(references.remove(0))
    } else {
        None
    };
    Ok((portrait, references))
}

pub async fn create_player(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Player>, ApiError> {
    let form = PlayerForm::from_multipart(multipart).await?;
    let mut player = merge::new_player(&form.fields)?;

    let (portrait, items) = upload_images(&state, form.portrait, form.items).await?;
    player.portrait_image = portrait;
    merge::set_items(
        &mut player,
        Vec::new(),
        items,
        form.fields.item_descriptions.clone(),
    );

    let created = match state.db.create_player(player.clone()).await {
        Ok(created) => created,
        Err(e) => {
            let orphans = player.image_refs().map(str::to_string).collect::<Vec<_>>();
            images::delete_best_effort(state.images.as_ref(), orphans).await;
            return Err(e.into());
        }
    };

    state.players_changed(ChangeKind::Created, created.id).await;
    Ok(Json(created))
}

pub async fn update_player(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Player>, ApiError> {
    let player_id = parse_id(&player_id)?;
    let form = PlayerForm::from_multipart(multipart).await?;
    let existing = state.db.get_player(player_id).await?;

    let mut player = existing.clone();
    merge::apply_fields(&mut player, &form.fields)?;

    let retained = merge::retained_items(&existing.item_images, form.fields.keep_items.as_deref());
    let capacity = merge::item_capacity(retained.len());
    let mut item_uploads = form.items;
    if item_uploads.len() > capacity {
        tracing::debug!(
            "Dropping {} item uploads for player {}, only {} slots free",
            item_uploads.len() - capacity,
            player_id,
            capacity
        );
        item_uploads.truncate(capacity);
    }

    let (portrait, uploaded) = upload_images(&state, form.portrait, item_uploads).await?;
    if portrait.is_some() {
        player.portrait_image = portrait;
    }
    merge::set_items(
        &mut player,
        retained,
        uploaded,
        form.fields.item_descriptions.clone(),
    );

    // Refused with a conflict if another edit was stored after `existing`
    // was read.
    let updated = match state.db.update_player(player.clone()).await {
        Ok(updated) => updated,
        Err(e) => {
            let orphans = merge::released_refs(&player, &existing);
            images::delete_best_effort(state.images.as_ref(), orphans).await;
            return Err(e.into());
        }
    };

    images::delete_best_effort(
        state.images.as_ref(),
        merge::released_refs(&existing, &updated),
    )
    .await;

    state.players_changed(ChangeKind::Updated, updated.id).await;
    Ok(Json(updated))
}

pub async fn delete_player(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = state.db.delete_player(parse_id(&player_id)?).await?;

    let references = deleted.image_refs().map(str::to_string).collect::<Vec<_>>();
    images::delete_best_effort(state.images.as_ref(), references).await;

    state.players_changed(ChangeKind::Deleted, deleted.id).await;
    Ok(Json(DeleteResponse {
        ok: true,
        deleted,
    }))
}
