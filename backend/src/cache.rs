//! Read-through cache for the full player listing.
//!
//! One slot holds the last listing together with its fingerprint. Mutations
//! call [`PlayerCache::invalidate`], which empties the slot and bumps a
//! generation counter; a load that began before the bump does not write its
//! result back.

use sha2::{Digest, Sha256};
use shared::models::Player;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Clone, Debug)]
pub struct CachedListing {
    pub etag: String,
    pub players: Arc<Vec<Player>>,
    stored_at: Instant,
}

impl CachedListing {
    pub fn new(players: Vec<Player>) -> Self {
        Self {
            etag: etag(&fingerprint(&players)),
            players: Arc::new(players),
            stored_at: Instant::now(),
        }
    }
}

#[derive(Default)]
struct Slot {
    entry: Option<CachedListing>,
    generation: u64,
}

pub struct PlayerCache {
    slot: RwLock<Slot>,
    ttl: Option<Duration>,
}

impl PlayerCache {
    /// `ttl` of `None` keeps entries until the next invalidation.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            slot: RwLock::new(Slot::default()),
            ttl,
        }
    }

    /// The cached listing, unless the slot is empty or expired.
    pub async fn get(&self) -> Option<CachedListing> {
        let slot = self.slot.read().await;
        slot.entry
            .as_ref()
            .filter(|entry| self.is_fresh(entry))
            .cloned()
    }

    /// Serves from the slot or runs `load` and populates it.
    pub async fn get_or_load<F, Fut, E>(&self, load: F) -> Result<CachedListing, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Player>, E>>,
    {
        let generation = {
            let slot = self.slot.read().await;
            if let Some(entry) = slot.entry.as_ref().filter(|e| self.is_fresh(e)) {
                return Ok(entry.clone());
            }
            slot.generation
        };

        let listing = CachedListing::new(load().await?);

        let mut slot = self.slot.write().await;
        if slot.generation == generation {
            slot.entry = Some(listing.clone());
        } else {
            tracing::debug!("Player listing changed while loading, not caching it");
        }
        Ok(listing)
    }

    pub async fn invalidate(&self) {
        let mut slot = self.slot.write().await;
        slot.entry = None;
        slot.generation = slot.generation.wrapping_add(1);
    }

    fn is_fresh(&self, entry: &CachedListing) -> bool {
        self.ttl.is_none_or(|ttl| entry.stored_at.elapsed() < ttl)
    }
}

/// Hex SHA-256 over `id:updatedAt` pairs in creation order, joined by `|`.
pub fn fingerprint(players: &[Player]) -> String {
    let mut ordered: Vec<&Player> = players.iter().collect();
    ordered.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

    let joined = ordered
        .iter()
        .map(|p| {
            format!(
                "{}:{}",
                p.id,
                p.updated_at
                    .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
            )
        })
        .collect::<Vec<_>>()
        .join("|");

    format!("{:x}", Sha256::digest(joined.as_bytes()))
}

/// Strong ETag for a fingerprint.
pub fn etag(fingerprint: &str) -> String {
    format!("\"{}\"", fingerprint)
}

/// `If-None-Match` semantics: `*`, a list of tags, weak tags compared
/// weakly.
pub fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    let bare = etag.trim_start_matches("W/");
    if_none_match.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.trim_start_matches("W/") == bare
    })
}
