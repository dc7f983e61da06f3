/// Campaign tag used when a record does not carry one.
pub const DEFAULT_CAMPAIGN: &str = "default";

pub const DEFAULT_LIFE: i64 = 10;
pub const DEFAULT_EXP: i64 = 0;
pub const DEFAULT_LEVEL: i64 = 1;

/// Item image slots per character sheet.
pub const MAX_ITEM_IMAGES: usize = 6;
/// Skill rows offered by the master UI. The API does not cap skills.
pub const MAX_SKILLS: usize = 8;

pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/jpg", "image/webp"];

pub fn is_allowed_image_type(content_type: &str) -> bool {
    ALLOWED_IMAGE_TYPES
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(content_type.trim()))
}
