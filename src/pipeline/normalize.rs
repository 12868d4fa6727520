//! Normalization of model output into typed records.
//!
//! The model does not always use the field names it was asked for. Each
//! concept has an ordered list of accepted keys; the first key holding a
//! non-empty value wins. The tables below are the whole precedence contract.

use serde_json::{Map, Value};

use super::types::{
    AffixQuality, AffixRecord, ClassificationResult, ComparedItem, ComparisonResult, ItemDomain,
    SingleItemResult, Verdict, Winner,
};
use super::PipelineError;

pub const CATEGORY_KEYS: &[&str] = &["category", "game"];
pub const RATIONALE_KEYS: &[&str] = &["reason", "rationale"];
pub const TITLE_KEYS: &[&str] = &["title", "name", "item_name"];
pub const TYPE_KEYS: &[&str] = &["type", "item_type", "itemType"];
pub const RARITY_KEYS: &[&str] = &["rarity"];
pub const POWER_KEYS: &[&str] = &["power", "power_level", "powerLevel", "item_power"];
pub const VERDICT_KEYS: &[&str] = &["verdict"];
pub const TIER_KEYS: &[&str] = &["tier", "score", "grade"];
pub const INSIGHT_KEYS: &[&str] = &["insight", "summary"];
pub const AFFIX_KEYS: &[&str] = &["affixes", "stats"];
pub const SEARCH_KEYS: &[&str] = &["search_query", "searchQuery"];
pub const ITEM_A_KEYS: &[&str] = &["item_a", "itemA"];
pub const ITEM_B_KEYS: &[&str] = &["item_b", "itemB"];
pub const WINNER_KEYS: &[&str] = &["winner"];

pub const AFFIX_NAME_KEYS: &[&str] = &["name", "affix", "stat"];
pub const AFFIX_VALUE_KEYS: &[&str] = &["value", "roll"];
pub const AFFIX_QUALITY_KEYS: &[&str] = &["quality", "rating"];
pub const AFFIX_REASON_KEYS: &[&str] = &["reason", "note"];

const UNKNOWN: &str = "Unknown";

/// First non-empty value for any of `keys`, rendered as text.
///
/// Numbers are accepted (item power often comes back as `925`).
fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match obj.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn first_object<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Map<String, Value>> {
    keys.iter().find_map(|key| obj.get(*key)?.as_object())
}

fn first_array<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> &'a [Value] {
    keys.iter()
        .find_map(|key| obj.get(*key)?.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn as_object(value: &Value) -> Result<&Map<String, Value>, PipelineError> {
    value.as_object().ok_or(PipelineError::UnparseableResponse)
}

pub fn normalize_classification(value: &Value) -> Result<ClassificationResult, PipelineError> {
    let obj = as_object(value)?;
    let domain = match first_text(obj, CATEGORY_KEYS)
        .map(|c| c.to_ascii_lowercase())
        .as_deref()
    {
        Some("d4") => ItemDomain::Diablo4,
        Some("not_loot") => ItemDomain::NotLoot,
        _ => ItemDomain::OtherGame,
    };
    Ok(ClassificationResult {
        domain,
        rationale: first_text(obj, RATIONALE_KEYS),
    })
}

pub fn parse_verdict(raw: &str) -> Option<Verdict> {
    let lowered = raw.trim().to_ascii_lowercase();
    let word = lowered
        .split(|c: char| !c.is_ascii_alphabetic())
        .find(|w| !w.is_empty())?;
    match word {
        "keep" | "equip" | "upgrade" => Some(Verdict::Keep),
        "discard" | "salvage" | "sell" => Some(Verdict::Discard),
        _ => None,
    }
}

fn parse_winner(raw: &str) -> Option<Winner> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "a" | "item_a" | "itema" => Some(Winner::A),
        "b" | "item_b" | "itemb" => Some(Winner::B),
        _ => None,
    }
}

fn parse_quality(raw: Option<String>) -> AffixQuality {
    match raw.map(|q| q.to_ascii_lowercase()).as_deref() {
        Some("good") => AffixQuality::Good,
        Some("bad") => AffixQuality::Bad,
        _ => AffixQuality::Neutral,
    }
}

/// Affixes without a name are dropped; everything else is kept in order.
fn normalize_affixes(obj: &Map<String, Value>) -> Vec<AffixRecord> {
    first_array(obj, AFFIX_KEYS)
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|affix| {
            Some(AffixRecord {
                name: first_text(affix, AFFIX_NAME_KEYS)?,
                value: first_text(affix, AFFIX_VALUE_KEYS).unwrap_or_default(),
                quality: parse_quality(first_text(affix, AFFIX_QUALITY_KEYS)),
                reason: first_text(affix, AFFIX_REASON_KEYS).unwrap_or_default(),
            })
        })
        .collect()
}

fn normalize_compared_item(obj: &Map<String, Value>) -> ComparedItem {
    ComparedItem {
        title: first_text(obj, TITLE_KEYS).unwrap_or_else(|| UNKNOWN.into()),
        item_type: first_text(obj, TYPE_KEYS).unwrap_or_else(|| UNKNOWN.into()),
        rarity: first_text(obj, RARITY_KEYS).unwrap_or_else(|| UNKNOWN.into()),
        power_level: first_text(obj, POWER_KEYS),
        tier: first_text(obj, TIER_KEYS).unwrap_or_default(),
        affixes: normalize_affixes(obj),
    }
}

/// A single-item answer without a recognizable verdict is rejected outright.
pub fn normalize_single_item(value: &Value) -> Result<SingleItemResult, PipelineError> {
    let obj = as_object(value)?;
    let verdict = first_text(obj, VERDICT_KEYS)
        .as_deref()
        .and_then(parse_verdict)
        .ok_or(PipelineError::UnparseableResponse)?;

    let item = normalize_compared_item(obj);
    let search_query = first_text(obj, SEARCH_KEYS).unwrap_or_else(|| item.title.clone());

    Ok(SingleItemResult {
        title: item.title,
        item_type: item.item_type,
        rarity: item.rarity,
        power_level: item.power_level,
        verdict,
        tier: item.tier,
        insight: first_text(obj, INSIGHT_KEYS).unwrap_or_default(),
        affixes: item.affixes,
        search_query,
    })
}

/// Both items and a recognizable winner are required.
pub fn normalize_comparison(value: &Value) -> Result<ComparisonResult, PipelineError> {
    let obj = as_object(value)?;
    let item_a = first_object(obj, ITEM_A_KEYS).ok_or(PipelineError::UnparseableResponse)?;
    let item_b = first_object(obj, ITEM_B_KEYS).ok_or(PipelineError::UnparseableResponse)?;
    let winner = first_text(obj, WINNER_KEYS)
        .as_deref()
        .and_then(parse_winner)
        .ok_or(PipelineError::UnparseableResponse)?;

    let item_a = normalize_compared_item(item_a);
    let item_b = normalize_compared_item(item_b);
    let loser_title = match winner {
        Winner::A => item_b.title.clone(),
        Winner::B => item_a.title.clone(),
    };

    Ok(ComparisonResult {
        verdict: first_text(obj, VERDICT_KEYS).unwrap_or_default(),
        insight: first_text(obj, INSIGHT_KEYS).unwrap_or_default(),
        search_query: first_text(obj, SEARCH_KEYS).unwrap_or(loser_title),
        item_a,
        item_b,
        winner,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classification_prefers_category_over_game() {
        let c = normalize_classification(&json!({"category": "d4", "game": "poe"})).unwrap();
        assert_eq!(c.domain, ItemDomain::Diablo4);
    }

    #[test]
    fn classification_falls_back_to_game() {
        let c = normalize_classification(&json!({"game": "D4", "rationale": "tooltip"})).unwrap();
        assert_eq!(c.domain, ItemDomain::Diablo4);
        assert_eq!(c.rationale.as_deref(), Some("tooltip"));
    }

    #[test]
    fn classification_not_loot_and_unknown() {
        let c = normalize_classification(&json!({"category": "not_loot", "reason": "a can"})).unwrap();
        assert_eq!(c.domain, ItemDomain::NotLoot);
        let c = normalize_classification(&json!({"category": "diablo3"})).unwrap();
        assert_eq!(c.domain, ItemDomain::OtherGame);
        let c = normalize_classification(&json!({})).unwrap();
        assert_eq!(c.domain, ItemDomain::OtherGame);
    }

    #[test]
    fn single_item_with_aliases() {
        let value = json!({
            "name": "Harlequin Crest",
            "itemType": "Helm",
            "rarity": "Mythic Unique",
            "item_power": 925,
            "verdict": "KEEP",
            "score": "S",
            "insight": "Best in slot.",
            "stats": [
                {"name": "Cooldown Reduction", "value": "20%", "quality": "GOOD", "reason": "Core"},
                {"affix": "Thorns", "roll": "+120", "quality": "weird"},
                {"value": "no name"}
            ],
            "searchQuery": "Harlequin Crest Shako"
        });
        let item = normalize_single_item(&value).unwrap();
        assert_eq!(item.title, "Harlequin Crest");
        assert_eq!(item.item_type, "Helm");
        assert_eq!(item.power_level.as_deref(), Some("925"));
        assert_eq!(item.verdict, Verdict::Keep);
        assert_eq!(item.tier, "S");
        assert_eq!(item.affixes.len(), 2);
        assert_eq!(item.affixes[0].quality, AffixQuality::Good);
        assert_eq!(item.affixes[1].name, "Thorns");
        assert_eq!(item.affixes[1].quality, AffixQuality::Neutral);
        assert_eq!(item.search_query, "Harlequin Crest Shako");
    }

    #[test]
    fn primary_key_wins_over_alias() {
        let value = json!({"title": "A", "name": "B", "verdict": "keep", "tier": "S", "score": "D"});
        let item = normalize_single_item(&value).unwrap();
        assert_eq!(item.title, "A");
        assert_eq!(item.tier, "S");
    }

    #[test]
    fn empty_primary_falls_through_to_alias() {
        let value = json!({"title": "  ", "name": "Fallback", "verdict": "salvage"});
        let item = normalize_single_item(&value).unwrap();
        assert_eq!(item.title, "Fallback");
        assert_eq!(item.verdict, Verdict::Discard);
        assert_eq!(item.search_query, "Fallback");
        assert_eq!(item.item_type, "Unknown");
    }

    #[test]
    fn missing_verdict_is_unparseable() {
        let err = normalize_single_item(&json!({"title": "Shako"})).unwrap_err();
        assert_eq!(err, PipelineError::UnparseableResponse);
        let err = normalize_single_item(&json!({"title": "Shako", "verdict": "maybe"})).unwrap_err();
        assert_eq!(err, PipelineError::UnparseableResponse);
    }

    #[test]
    fn verdict_words() {
        assert_eq!(parse_verdict("KEEP or SALVAGE"), Some(Verdict::Keep));
        assert_eq!(parse_verdict("Salvage it"), Some(Verdict::Discard));
        assert_eq!(parse_verdict("equip"), Some(Verdict::Keep));
        assert_eq!(parse_verdict("sell"), Some(Verdict::Discard));
        assert_eq!(parse_verdict(""), None);
    }

    #[test]
    fn comparison_normalizes_and_defaults_search_to_loser() {
        let value = json!({
            "itemA": {"title": "Godslayer Crown", "type": "Helm", "tier": "B"},
            "item_b": {"title": "Harlequin Crest", "type": "Helm", "tier": "S"},
            "winner": "B",
            "verdict": "Equip B",
            "insight": "Shako wins."
        });
        let cmp = normalize_comparison(&value).unwrap();
        assert_eq!(cmp.winner, Winner::B);
        assert_eq!(cmp.item_a.title, "Godslayer Crown");
        assert_eq!(cmp.search_query, "Godslayer Crown");
        assert_eq!(cmp.verdict, "Equip B");
    }

    #[test]
    fn comparison_without_winner_or_items_is_unparseable() {
        let no_winner = json!({"item_a": {}, "item_b": {}});
        assert_eq!(
            normalize_comparison(&no_winner).unwrap_err(),
            PipelineError::UnparseableResponse
        );
        let no_items = json!({"winner": "A"});
        assert_eq!(
            normalize_comparison(&no_items).unwrap_err(),
            PipelineError::UnparseableResponse
        );
    }

    #[test]
    fn winner_accepts_item_labels() {
        let value = json!({"item_a": {"title": "x"}, "item_b": {"title": "y"}, "winner": "item_a"});
        assert_eq!(normalize_comparison(&value).unwrap().winner, Winner::A);
    }

    #[test]
    fn non_object_is_unparseable() {
        assert!(normalize_single_item(&json!([1])).is_err());
        assert!(normalize_classification(&json!("d4")).is_err());
    }
}
