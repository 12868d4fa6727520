use crate::catalog::AnalysisContext;

/// Stage 1 instructions. Separates Diablo IV loot from everything else.
pub const CLASSIFICATION_PROMPT: &str = r#"
ROLE: Computer Vision Classifier.
TASK: Determine if the image is a valid Diablo IV item screenshot.

CATEGORIES:
1. "d4" -> Valid Diablo 4 loot tooltip.
   - MUST contain text like: "Item Power", "Ancestral", "Sacred", "Account Bound".
   - Visuals: dark UI, serif fonts, stat lists.

2. "not_loot" -> ANYTHING ELSE.
   - Real world objects: cans, bottles, keyboards, hands, desks.
   - Photos of screens: if the image is tilted, has glare, or shows a monitor bezel -> "not_loot".
   - Other games: Diablo 2 (pixelated), Diablo 3 (cartoonish), WoW, PoE.

CRITICAL RULES:
- If you see a beverage can, IMMEDIATELY return "not_loot".
- If you see a physical jacket or clothing item, return "not_loot".
- If you cannot read specific RPG stats (Str, Int, Dmg), return "not_loot".

OUTPUT FORMAT (JSON ONLY):
{"category": "d4" | "not_loot", "reason": "short explanation"}
"#;

const AFFIX_SCHEMA: &str = r#"[
        {"name": "Affix name", "value": "Rolled value as shown", "quality": "good" | "bad" | "neutral", "reason": "Why"}
    ]"#;

pub fn build_classification_prompt() -> String {
    CLASSIFICATION_PROMPT.to_string()
}

/// Stage 2 instructions for a single item.
pub fn build_single_item_prompt(context: &AnalysisContext) -> String {
    format!(
        r#"
ROLE: Expert Diablo IV Theorycrafter.
TASK: {task}
{guidance}
RULES:
- Read every affix exactly as printed on the tooltip.
- Tag each affix "good", "bad" or "neutral" for the player described above.
- "keep" means the item is worth equipping or holding; "discard" means salvage or sell it.
- "search_query" is the exact item name as printed.

OUTPUT FORMAT (JSON ONLY):
{{
    "title": "Item Name",
    "type": "Item Type",
    "rarity": "Rarity",
    "power": "Item Power or null",
    "verdict": "keep" | "discard",
    "tier": "S" | "A" | "B" | "C" | "D",
    "insight": "1 sentence summary.",
    "affixes": {AFFIX_SCHEMA},
    "search_query": "Item Name"
}}
"#,
        task = evaluation_task(context, "Evaluate this item"),
        guidance = context_guidance(context),
    )
}

/// Stage 2 instructions for two items shown in one screenshot.
pub fn build_comparison_prompt(context: &AnalysisContext) -> String {
    format!(
        r#"
ROLE: Expert Diablo IV Theorycrafter.
TASK: {task} The image shows TWO item tooltips. Read both, then decide which one to equip.
{guidance}
RULES:
- "item_a" is the left (or upper) tooltip, "item_b" the right (or lower) one.
- Read every affix exactly as printed and tag it "good", "bad" or "neutral".
- "winner" is the item to equip. "search_query" is the exact name of the LOSING item.

OUTPUT FORMAT (JSON ONLY):
{{
    "item_a": {{
        "title": "Item Name",
        "type": "Item Type",
        "rarity": "Rarity",
        "power": "Item Power or null",
        "tier": "S" | "A" | "B" | "C" | "D",
        "affixes": {AFFIX_SCHEMA}
    }},
    "item_b": {{ same fields as item_a }},
    "winner": "A" | "B",
    "verdict": "Short recommendation, e.g. Equip A, salvage B.",
    "insight": "1-2 sentences explaining the decision.",
    "search_query": "Losing Item Name"
}}
"#,
        task = evaluation_task(context, "Compare these items"),
        guidance = context_guidance(context),
    )
}

/// Opening task line, most specific tier that the context allows.
fn evaluation_task(context: &AnalysisContext, verb: &str) -> String {
    match (context.has_class(), context.has_build()) {
        (true, true) => format!(
            "{verb} for a {} running the {} build. Judge every affix against what that build needs.",
            context.category(),
            context.sub_category()
        ),
        (true, false) => format!(
            "{verb} for a {}. No specific build is selected, so judge it for the class's strongest general use.",
            context.category()
        ),
        _ => format!(
            "{verb} for any class. Judge it on raw item quality: item power, rarity, greater affixes and how many classes could use it."
        ),
    }
}

/// Optional clauses. Each is omitted when it carries no information.
fn context_guidance(context: &AnalysisContext) -> String {
    let mut lines = Vec::new();

    let mechanics = context.mechanics();
    if context.has_class() && !mechanics.is_empty() {
        lines.push(format!(
            "- Key {} mechanics: {}.",
            context.category(),
            mechanics.join(", ")
        ));
    }

    if let Some(focus) = context.focus_attribute() {
        lines.push(format!("- The player is prioritising: {focus}."));
    }

    let traits = context.required_traits();
    if !traits.is_empty() {
        let labels: Vec<&str> = traits.iter().map(|t| t.label()).collect();
        lines.push(format!(
            "- Required stats (treat missing ones as a weakness): {}.",
            labels.join(", ")
        ));
    }

    if lines.is_empty() {
        String::new()
    } else {
        format!("CONTEXT:\n{}\n", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{RequiredTrait, CLASSES, builds_for};

    #[test]
    fn classification_prompt_has_two_value_schema() {
        let prompt = build_classification_prompt();
        assert!(prompt.contains(r#""category": "d4" | "not_loot""#));
        assert!(prompt.contains("JSON ONLY"));
    }

    #[test]
    fn build_specific_prompt_names_class_and_build_verbatim() {
        for class in CLASSES {
            for build in builds_for(class) {
                let ctx = AnalysisContext::new(class, build).unwrap();
                let prompt = build_single_item_prompt(&ctx);
                assert!(prompt.contains(class), "missing {class}");
                assert!(prompt.contains(build), "missing {build}");
            }
        }
    }

    #[test]
    fn default_context_is_domain_agnostic() {
        let prompt = build_single_item_prompt(&AnalysisContext::default());
        assert!(prompt.contains("for any class"));
        assert!(!prompt.contains("CONTEXT:"));
        assert!(!prompt.contains("build."));
    }

    #[test]
    fn class_only_context_mentions_mechanics() {
        let ctx = AnalysisContext::new("Rogue", "").unwrap();
        let prompt = build_single_item_prompt(&ctx);
        assert!(prompt.contains("for a Rogue."));
        assert!(prompt.contains("Lucky Hit, Crit"));
    }

    #[test]
    fn single_item_schema_fields() {
        let prompt = build_single_item_prompt(&AnalysisContext::default());
        for field in [
            "\"title\"", "\"type\"", "\"rarity\"", "\"power\"", "\"verdict\"",
            "\"tier\"", "\"insight\"", "\"affixes\"", "\"search_query\"",
        ] {
            assert!(prompt.contains(field), "missing {field}");
        }
        assert!(prompt.contains(r#""keep" | "discard""#));
        assert!(prompt.contains(r#""good" | "bad" | "neutral""#));
    }

    #[test]
    fn comparison_schema_fields() {
        let ctx = AnalysisContext::new("Druid", "Pulverize").unwrap();
        let prompt = build_comparison_prompt(&ctx);
        assert!(prompt.contains("Druid"));
        assert!(prompt.contains("Pulverize"));
        assert!(prompt.contains("\"item_a\""));
        assert!(prompt.contains("\"item_b\""));
        assert!(prompt.contains(r#""winner": "A" | "B""#));
        assert!(prompt.contains("LOSING"));
    }

    #[test]
    fn empty_traits_clause_is_omitted() {
        let ctx = AnalysisContext::new("Sorcerer", "Firewall").unwrap();
        let prompt = build_single_item_prompt(&ctx);
        assert!(!prompt.contains("Required stats"));
    }

    #[test]
    fn traits_and_focus_are_listed() {
        let ctx = AnalysisContext::default()
            .with_focus_attribute(Some("Overpower"))
            .with_required_traits([RequiredTrait::Willpower, RequiredTrait::Strength]);
        let prompt = build_comparison_prompt(&ctx);
        assert!(prompt.contains("Required stats (treat missing ones as a weakness): Strength, Willpower."));
        assert!(prompt.contains("prioritising: Overpower"));
    }

    #[test]
    fn prompts_are_deterministic() {
        let ctx = AnalysisContext::new("Necromancer", "Minion").unwrap();
        assert_eq!(build_single_item_prompt(&ctx), build_single_item_prompt(&ctx));
        assert_eq!(build_comparison_prompt(&ctx), build_comparison_prompt(&ctx));
    }
}
