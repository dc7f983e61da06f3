//! Stored player documents in any of their historical shapes.
//!
//! Older sheets carry two fixed skill slots (`skill1`, `skill2`), a portrait
//! under `img`, item images under `items` as bare base64 strings, or hosted
//! images as `{ url, public_id }` objects. [`PlayerDocument::normalize`] folds
//! all of them into the current [`Player`] shape.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use shared::limits::{
    DEFAULT_CAMPAIGN, DEFAULT_EXP, DEFAULT_LEVEL, DEFAULT_LIFE, MAX_ITEM_IMAGES,
};
use shared::models::{Player, clean_skills};
use uuid::Uuid;

const LEGACY_IMAGE_MIME: &str = "image/jpeg";

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDocument {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, rename = "_id")]
    pub legacy_id: Option<Value>,
    #[serde(default)]
    pub campaign: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub life: Option<Value>,
    #[serde(default)]
    pub exp: Option<Value>,
    #[serde(default)]
    pub level: Option<Value>,
    #[serde(default)]
    pub milestones: Option<String>,
    #[serde(default)]
    pub attributes: Option<String>,
    #[serde(default)]
    pub skills: Option<Value>,
    #[serde(default)]
    pub skill1: Option<String>,
    #[serde(default)]
    pub skill2: Option<String>,
    #[serde(default)]
    pub item_images: Option<Vec<Option<ImageEntry>>>,
    #[serde(default)]
    pub items: Option<Vec<Option<ImageEntry>>>,
    #[serde(default)]
    pub item_descriptions: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub portrait_image: Option<ImageEntry>,
    #[serde(default)]
    pub img: Option<ImageEntry>,
    #[serde(default)]
    pub created_at: Option<Value>,
    #[serde(default)]
    pub updated_at: Option<Value>,
}

/// One stored image: a plain reference or a hosted-image object.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ImageEntry {
    Reference(String),
    Hosted {
        url: String,
        #[serde(default)]
        #[allow(dead_code)]
        public_id: Option<String>,
    },
}

impl ImageEntry {
    fn into_reference(self) -> Option<String> {
        match self {
            ImageEntry::Reference(s) | ImageEntry::Hosted { url: s, .. } => {
                normalize_image_ref(&s)
            }
        }
    }
}

impl PlayerDocument {
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// Builds the current record shape. `fallback_now` stands in for missing
    /// timestamps; an id that is missing or not a UUID gets a fresh one.
    pub fn normalize(self, fallback_now: DateTime<Utc>) -> Player {
        let id = self
            .id
            .as_ref()
            .or(self.legacy_id.as_ref())
            .and_then(parse_uuid)
            .unwrap_or_else(|| {
                tracing::warn!(
                    "Stored player {:?} has no usable id, assigning a new one",
                    self.name
                );
                Uuid::new_v4()
            });

        let mut skills = self.skills.map(skills_from_value).unwrap_or_default();
        if skills.is_empty() {
            skills = clean_skills(self.skill1.iter().chain(self.skill2.iter()));
        }

        let item_images: Vec<String> = self
            .item_images
            .filter(|images| !images.is_empty())
            .or(self.items)
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .filter_map(ImageEntry::into_reference)
            .take(MAX_ITEM_IMAGES)
            .collect();

        let item_descriptions = self
            .item_descriptions
            .unwrap_or_default()
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect();

        let portrait_image = self
            .portrait_image
            .or(self.img)
            .and_then(ImageEntry::into_reference);

        let created_at = self
            .created_at
            .as_ref()
            .and_then(parse_timestamp)
            .unwrap_or(fallback_now);
        let updated_at = self
            .updated_at
            .as_ref()
            .and_then(parse_timestamp)
            .unwrap_or(created_at);

        let mut player = Player {
            id,
            campaign: self
                .campaign
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CAMPAIGN.to_string()),
            name: self.name.unwrap_or_default().trim().to_string(),
            life: stat_from_value(self.life.as_ref(), DEFAULT_LIFE, 0),
            exp: stat_from_value(self.exp.as_ref(), DEFAULT_EXP, 0),
            level: stat_from_value(self.level.as_ref(), DEFAULT_LEVEL, 1),
            milestones: self.milestones.unwrap_or_default(),
            attributes: self.attributes.unwrap_or_default(),
            skills,
            item_images,
            item_descriptions,
            portrait_image,
            created_at,
            updated_at,
        };
        player.align_item_descriptions();
        player
    }
}

/// Turns a stored image string into a reference the browser can load.
/// Bare base64 payloads from the oldest sheets get a `data:` prefix.
pub fn normalize_image_ref(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let is_reference = raw.starts_with("data:")
        || raw.starts_with("http://")
        || raw.starts_with("https://")
        || raw.starts_with('/');
    if is_reference {
        Some(raw.to_string())
    } else {
        Some(format!("data:{};base64,{}", LEGACY_IMAGE_MIME, raw))
    }
}

fn parse_uuid(value: &Value) -> Option<Uuid> {
    match value {
        Value::String(s) => Uuid::parse_str(s).ok(),
        // Mongo extended JSON: { "$oid": "..." }
        Value::Object(map) => map.get("$oid").and_then(parse_uuid),
        _ => None,
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Value::Object(map) => map.get("$date").and_then(parse_timestamp),
        _ => None,
    }
}

fn skills_from_value(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => clean_skills(items.iter().filter_map(Value::as_str)),
        Value::String(s) => clean_skills([s]),
        _ => Vec::new(),
    }
}

fn stat_from_value(value: Option<&Value>, default: i64, min: i64) -> i64 {
    let parsed = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64),
        _ => None,
    };
    parsed.filter(|v| *v >= min).unwrap_or(default)
}
