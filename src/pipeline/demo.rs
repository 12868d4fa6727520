//! Canned results for demo runs (no API key, no network).

use super::types::{
    AffixQuality, AffixRecord, ComparedItem, ComparisonResult, RunMode, RunResult,
    SingleItemResult, Verdict, Winner,
};

fn affix(name: &str, value: &str, quality: AffixQuality, reason: &str) -> AffixRecord {
    AffixRecord {
        name: name.into(),
        value: value.into(),
        quality,
        reason: reason.into(),
    }
}

fn shako_affixes() -> Vec<AffixRecord> {
    vec![
        affix("Cooldown Reduction", "+20.0%", AffixQuality::Good, "Core for every skill rotation."),
        affix("Maximum Life", "+1,640", AffixQuality::Good, "Survivability in the Pit."),
        affix("All Stats", "+96", AffixQuality::Good, "Useful to every class."),
        affix("Damage Reduction", "+20.0%", AffixQuality::Good, "Unique power, always active."),
        affix("Ranks to All Skills", "+4", AffixQuality::Neutral, "Value depends on the build."),
    ]
}

pub fn demo_single_item() -> SingleItemResult {
    SingleItemResult {
        title: "Harlequin Crest".into(),
        item_type: "Unique Helm".into(),
        rarity: "Mythic Unique".into(),
        power_level: Some("925".into()),
        verdict: Verdict::Keep,
        tier: "S".into(),
        insight: "A Mythic Unique with perfect rolls. Never salvage a Shako; it fits almost every build."
            .into(),
        affixes: shako_affixes(),
        search_query: "Harlequin Crest".into(),
    }
}

pub fn demo_comparison() -> ComparisonResult {
    ComparisonResult {
        item_a: ComparedItem {
            title: "Harlequin Crest".into(),
            item_type: "Unique Helm".into(),
            rarity: "Mythic Unique".into(),
            power_level: Some("925".into()),
            tier: "S".into(),
            affixes: shako_affixes(),
        },
        item_b: ComparedItem {
            title: "Dread Visage".into(),
            item_type: "Helm".into(),
            rarity: "Ancestral Legendary".into(),
            power_level: Some("800".into()),
            tier: "B".into(),
            affixes: vec![
                affix("Maximum Life", "+1,102", AffixQuality::Good, "Solid but lower roll."),
                affix("Thorns", "+412", AffixQuality::Bad, "Dead stat outside thorns builds."),
                affix("Armor", "+6.5%", AffixQuality::Neutral, "Capped by other gear."),
            ],
        },
        winner: Winner::A,
        verdict: "Equip Harlequin Crest, salvage Dread Visage.".into(),
        insight: "Shako's cooldown reduction and rank bonus outclass anything a legendary helm rolls."
            .into(),
        search_query: "Dread Visage".into(),
    }
}

pub fn demo_result(mode: RunMode) -> RunResult {
    match mode {
        RunMode::Analyze => RunResult::Single(demo_single_item()),
        RunMode::Compare => RunResult::Comparison(demo_comparison()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_mode_matches_result_kind() {
        assert_eq!(demo_result(RunMode::Analyze).mode(), RunMode::Analyze);
        assert_eq!(demo_result(RunMode::Compare).mode(), RunMode::Compare);
    }

    #[test]
    fn demo_comparison_searches_for_loser() {
        let cmp = demo_comparison();
        assert_eq!(cmp.search_query, cmp.losing_item().title);
    }

    #[test]
    fn demo_single_item_is_a_keep() {
        let item = demo_single_item();
        assert_eq!(item.verdict, Verdict::Keep);
        assert!(!item.affixes.is_empty());
    }
}
