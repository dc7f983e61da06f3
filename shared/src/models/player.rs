use crate::limits::{DEFAULT_CAMPAIGN, DEFAULT_EXP, DEFAULT_LEVEL, DEFAULT_LIFE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A character sheet as served by the API.
///
/// Image fields hold references: either `data:` URLs or URLs issued by the
/// image host the server was started with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: Uuid,
    pub campaign: String,
    pub name: String,
    pub life: i64,
    pub exp: i64,
    pub level: i64,
    #[serde(default)]
    pub milestones: String,
    #[serde(default)]
    pub attributes: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub item_images: Vec<String>,
    /// Index-aligned with `item_images`
    #[serde(default)]
    pub item_descriptions: Vec<String>,
    #[serde(default)]
    pub portrait_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Player {
    /// A fresh sheet with every stat at its default. Timestamps are
    /// overwritten by the record store.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            campaign: DEFAULT_CAMPAIGN.to_string(),
            name: name.into(),
            life: DEFAULT_LIFE,
            exp: DEFAULT_EXP,
            level: DEFAULT_LEVEL,
            milestones: String::new(),
            attributes: String::new(),
            skills: Vec::new(),
            item_images: Vec::new(),
            item_descriptions: Vec::new(),
            portrait_image: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Pads or truncates `item_descriptions` to the number of item images.
    pub fn align_item_descriptions(&mut self) {
        self.item_descriptions
            .resize(self.item_images.len(), String::new());
    }

    /// Every image reference this sheet points at, portrait first.
    pub fn image_refs(&self) -> impl Iterator<Item = &str> {
        self.portrait_image
            .as_deref()
            .into_iter()
            .chain(self.item_images.iter().map(String::as_str))
    }
}

/// Drops blank entries and surrounding whitespace.
pub fn clean_skills<I, S>(skills: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    skills
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
