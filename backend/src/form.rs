//! Decoding of the multipart body shared by create and update.
//!
//! Text fields arrive as strings; `skills`, `itemDescriptions` and
//! `keepItems` carry JSON arrays. Unparsable JSON is treated as an empty
//! array, matching what the master UI has always relied on.

use crate::error::ApiError;
use crate::images::ImageUpload;
use axum::extract::Multipart;
use serde_json::Value;
use shared::limits::MAX_ITEM_IMAGES;
use shared::models::clean_skills;

pub const FIELD_PORTRAIT: &str = "charImg";
pub const FIELD_ITEMS: &str = "items";

/// Text part of the form. `None` means the field was not sent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SheetFields {
    pub name: Option<String>,
    pub campaign: Option<String>,
    pub life: Option<String>,
    pub exp: Option<String>,
    pub level: Option<String>,
    pub milestones: Option<String>,
    pub attributes: Option<String>,
    pub skills: Option<Vec<String>>,
    pub item_descriptions: Option<Vec<String>>,
    pub keep_items: Option<Vec<String>>,
    legacy_skills: Vec<String>,
}

impl SheetFields {
    /// Records one text field. Unknown names are ignored.
    pub fn set(&mut self, name: &str, value: String) {
        match name {
            "name" => self.name = Some(value),
            "campaign" => self.campaign = Some(value),
            "life" => self.life = Some(value),
            "exp" => self.exp = Some(value),
            "level" => self.level = Some(value),
            "milestones" => self.milestones = Some(value),
            "attributes" => self.attributes = Some(value),
            "skills" => self.skills = Some(clean_skills(json_strings(name, &value))),
            "itemDescriptions" => {
                self.item_descriptions = Some(
                    json_strings(name, &value)
                        .into_iter()
                        .take(MAX_ITEM_IMAGES)
                        .collect(),
                )
            }
            "keepItems" => self.keep_items = Some(json_strings(name, &value)),
            "skill1" | "skill2" => self.legacy_skills.push(value),
            _ => tracing::debug!("Ignoring unknown form field {}", name),
        }
    }

    /// Folds `skill1`/`skill2` into `skills` when the array was not sent.
    pub fn finish(mut self) -> Self {
        if self.skills.is_none() && !self.legacy_skills.is_empty() {
            self.skills = Some(clean_skills(&self.legacy_skills));
        }
        self.legacy_skills.clear();
        self
    }
}

#[derive(Debug, Default)]
pub struct PlayerForm {
    pub fields: SheetFields,
    pub portrait: Option<ImageUpload>,
    pub items: Vec<ImageUpload>,
}

impl PlayerForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = PlayerForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            if name == FIELD_PORTRAIT || name == FIELD_ITEMS {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?;
                // Browsers send an empty part for an untouched file input.
                if bytes.is_empty() {
                    continue;
                }
                form.push_file(
                    &name,
                    ImageUpload {
                        file_name,
                        content_type,
                        bytes,
                    },
                )?;
            } else {
                let value = field.text().await?;
                form.fields.set(&name, value);
            }
        }

        form.fields = form.fields.finish();
        Ok(form)
    }

    pub fn push_file(&mut self, field: &str, upload: ImageUpload) -> Result<(), ApiError> {
        upload.validate()?;
        if field == FIELD_PORTRAIT {
            if self.portrait.is_some() {
                return Err(ApiError::Validation(format!(
                    "Only one {} file is allowed",
                    FIELD_PORTRAIT
                )));
            }
            self.portrait = Some(upload);
        } else {
            if self.items.len() >= MAX_ITEM_IMAGES {
                return Err(ApiError::Validation(format!(
                    "At most {} item images are allowed",
                    MAX_ITEM_IMAGES
                )));
            }
            self.items.push(upload);
        }
        Ok(())
    }
}

/// Strings of a JSON array. Anything unparsable yields an empty list and
/// non-string entries are skipped.
fn json_strings(field: &str, raw: &str) -> Vec<String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Ok(_) | Err(_) => {
            tracing::debug!("Field {} is not a JSON array, treating it as empty", field);
            Vec::new()
        }
    }
}
