//! How form fields land on a player record.

use crate::error::ApiError;
use crate::form::SheetFields;
use shared::limits::{DEFAULT_CAMPAIGN, DEFAULT_EXP, DEFAULT_LEVEL, DEFAULT_LIFE, MAX_ITEM_IMAGES};
use shared::models::Player;
use std::collections::HashSet;

/// Parses a numeric form value. Blank, non-numeric and below-`min` values
/// yield `None`; fractional input is truncated.
pub fn parse_stat(raw: Option<&str>, min: i64) -> Option<i64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    let value = match raw.parse::<i64>() {
        Ok(v) => v,
        Err(_) => {
            let f = raw.parse::<f64>().ok().filter(|f| f.is_finite())?;
            f.trunc() as i64
        }
    };
    (value >= min).then_some(value)
}

fn required_name(raw: Option<&str>) -> Result<String, ApiError> {
    match raw.map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(ApiError::Validation("Name is required".into())),
    }
}

/// A new record from the text fields. Image fields are left empty.
pub fn new_player(fields: &SheetFields) -> Result<Player, ApiError> {
    let mut player = Player::new(required_name(fields.name.as_deref())?);

    player.campaign = fields
        .campaign
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CAMPAIGN)
        .to_string();
    player.life = parse_stat(fields.life.as_deref(), 0).unwrap_or(DEFAULT_LIFE);
    player.exp = parse_stat(fields.exp.as_deref(), 0).unwrap_or(DEFAULT_EXP);
    player.level = parse_stat(fields.level.as_deref(), 1).unwrap_or(DEFAULT_LEVEL);
    player.milestones = fields.milestones.clone().unwrap_or_default();
    player.attributes = fields.attributes.clone().unwrap_or_default();
    player.skills = fields.skills.clone().unwrap_or_default();
    player.item_descriptions = fields.item_descriptions.clone().unwrap_or_default();
    Ok(player)
}

/// Overwrites the scalar and list fields that were sent. Unusable numbers
/// keep the stored value.
pub fn apply_fields(player: &mut Player, fields: &SheetFields) -> Result<(), ApiError> {
    if fields.name.is_some() {
        player.name = required_name(fields.name.as_deref())?;
    }
    if let Some(campaign) = fields.campaign.as_deref().map(str::trim) {
        if !campaign.is_empty() {
            player.campaign = campaign.to_string();
        }
    }
    if let Some(life) = parse_stat(fields.life.as_deref(), 0) {
        player.life = life;
    }
    if let Some(exp) = parse_stat(fields.exp.as_deref(), 0) {
        player.exp = exp;
    }
    if let Some(level) = parse_stat(fields.level.as_deref(), 1) {
        player.level = level;
    }
    if let Some(milestones) = &fields.milestones {
        player.milestones = milestones.clone();
    }
    if let Some(attributes) = &fields.attributes {
        player.attributes = attributes.clone();
    }
    if let Some(skills) = &fields.skills {
        player.skills = skills.clone();
    }
    Ok(())
}

/// Item references that survive an update. Without a keep-list every
/// existing item stays; with one, only references the record already has
/// are honoured, in keep-list order and without duplicates.
pub fn retained_items(existing: &[String], keep: Option<&[String]>) -> Vec<String> {
    let Some(keep) = keep else {
        return existing.to_vec();
    };
    let owned: HashSet<&str> = existing.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    keep.iter()
        .filter(|r| owned.contains(r.as_str()) && seen.insert(r.as_str()))
        .take(MAX_ITEM_IMAGES)
        .cloned()
        .collect()
}

/// How many more item images fit next to `retained`.
pub fn item_capacity(retained: usize) -> usize {
    MAX_ITEM_IMAGES.saturating_sub(retained)
}

/// Replaces the item list with `retained` followed by `uploaded`.
///
/// When `descriptions` is `None` the existing descriptions travel with their
/// references and new uploads start blank.
pub fn set_items(
    player: &mut Player,
    retained: Vec<String>,
    uploaded: Vec<String>,
    descriptions: Option<Vec<String>>,
) {
    let mut items = retained;
    items.extend(uploaded);
    items.truncate(MAX_ITEM_IMAGES);

    let descriptions = descriptions.unwrap_or_else(|| {
        items
            .iter()
            .map(|reference| {
                player
                    .item_images
                    .iter()
                    .position(|r| r == reference)
                    .and_then(|i| player.item_descriptions.get(i).cloned())
                    .unwrap_or_default()
            })
            .collect()
    });

    player.item_images = items;
    player.item_descriptions = descriptions;
    player.align_item_descriptions();
}

/// References `before` held that `after` no longer does.
pub fn released_refs(before: &Player, after: &Player) -> Vec<String> {
    let kept: HashSet<&str> = after.image_refs().collect();
    let mut seen = HashSet::new();
    before
        .image_refs()
        .filter(|r| !kept.contains(r) && seen.insert(*r))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> SheetFields {
        let mut fields = SheetFields::default();
        for (name, value) in pairs {
            fields.set(name, value.to_string());
        }
        fields.finish()
    }

    fn refs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn stats_fall_back_only_when_unusable() {
        assert_eq!(parse_stat(Some("0"), 0), Some(0));
        assert_eq!(parse_stat(Some(" 12 "), 0), Some(12));
        assert_eq!(parse_stat(Some("7.9"), 0), Some(7));
        assert_eq!(parse_stat(Some(""), 0), None);
        assert_eq!(parse_stat(Some("abc"), 0), None);
        assert_eq!(parse_stat(Some("-3"), 0), None);
        assert_eq!(parse_stat(Some("0"), 1), None);
        assert_eq!(parse_stat(None, 0), None);
    }

    #[test]
    fn new_player_applies_defaults() {
        let p = new_player(&fields(&[("name", "  Aria "), ("life", "x"), ("exp", "0")])).unwrap();
        assert_eq!(p.name, "Aria");
        assert_eq!(p.campaign, "default");
        assert_eq!((p.life, p.exp, p.level), (10, 0, 1));
        assert!(p.item_images.is_empty());
        assert!(p.portrait_image.is_none());
    }

    #[test]
    fn name_is_required() {
        assert!(matches!(
            new_player(&fields(&[("life", "3")])),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            new_player(&fields(&[("name", "   ")])),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn update_keeps_what_was_not_sent() {
        let mut p = Player::new("Aria");
        p.life = 4;
        p.skills = refs(&["Stealth"]);
        apply_fields(&mut p, &fields(&[("exp", "50"), ("life", "oops")])).unwrap();
        assert_eq!(p.name, "Aria");
        assert_eq!(p.life, 4);
        assert_eq!(p.exp, 50);
        assert_eq!(p.skills, refs(&["Stealth"]));

        apply_fields(&mut p, &fields(&[("skills", "[]"), ("level", "3")])).unwrap();
        assert!(p.skills.is_empty());
        assert_eq!(p.level, 3);

        assert!(apply_fields(&mut p, &fields(&[("name", "")])).is_err());
    }

    #[test]
    fn keep_list_only_honours_owned_refs() {
        let existing = refs(&["a", "b", "c"]);
        assert_eq!(retained_items(&existing, None), existing);
        assert_eq!(
            retained_items(&existing, Some(&refs(&["c", "x", "a", "c"]))),
            refs(&["c", "a"])
        );
        assert!(retained_items(&existing, Some(&[])).is_empty());
        assert_eq!(item_capacity(5), 1);
        assert_eq!(item_capacity(6), 0);
    }

    #[test]
    fn appended_items_are_truncated_to_six() {
        let mut p = Player::new("Aria");
        p.item_images = refs(&["1", "2", "3", "4", "5"]);
        p.item_descriptions = refs(&["one", "two", "three", "four", "five"]);

        let retained = retained_items(&p.item_images, None);
        set_items(&mut p, retained, refs(&["6", "7"]), None);
        assert_eq!(p.item_images, refs(&["1", "2", "3", "4", "5", "6"]));
        assert_eq!(p.item_descriptions.len(), 6);
        assert_eq!(p.item_descriptions[0], "one");
        assert_eq!(p.item_descriptions[5], "");
    }

    #[test]
    fn descriptions_follow_their_items() {
        let mut p = Player::new("Aria");
        p.item_images = refs(&["a", "b"]);
        p.item_descriptions = refs(&["axe", "bow"]);
        set_items(&mut p, refs(&["b"]), refs(&["n"]), None);
        assert_eq!(p.item_descriptions, refs(&["bow", ""]));

        set_items(&mut p, refs(&["b", "n"]), vec![], Some(refs(&["only"])));
        assert_eq!(p.item_descriptions, refs(&["only", ""]));
    }

    #[test]
    fn released_refs_cover_portrait_and_items() {
        let mut before = Player::new("Aria");
        before.portrait_image = Some("old".into());
        before.item_images = refs(&["a", "b"]);
        let mut after = before.clone();
        after.portrait_image = Some("new".into());
        after.item_images = refs(&["b"]);
        assert_eq!(released_refs(&before, &after), refs(&["old", "a"]));
        assert!(released_refs(&after, &after).is_empty());
    }
}
