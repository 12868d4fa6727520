//! Terminal rendering of run outcomes, journal entries and the catalog.

use serde::Serialize;

use crate::catalog::ClassInfo;
use crate::journal::JournalEntry;
use crate::pipeline::{
    AffixRecord, ComparedItem, ComparisonResult, RunOutcome, RunResult, RunState,
    SingleItemResult,
};
use crate::share::{search_link, type_line};

/// `--json` envelope.
#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

pub fn to_json<T: Serialize>(ok: bool, data: T) -> String {
    serde_json::to_string_pretty(&JsonOut { ok, data })
        .unwrap_or_else(|e| format!("{{\"ok\":false,\"data\":\"{e}\"}}"))
}

/// JSON form of a run outcome.
pub fn outcome_json(outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::Succeeded(entry) => to_json(true, entry),
        RunOutcome::Rejected {
            domain,
            title,
            reason,
            rationale,
        } => to_json(
            false,
            serde_json::json!({
                "rejected": domain,
                "title": title,
                "reason": reason,
                "rationale": rationale,
            }),
        ),
        RunOutcome::Failed(e) => to_json(false, serde_json::json!({ "error": e.to_string() })),
    }
}

/// Loading message shown for a state, if any.
pub fn state_message(state: RunState) -> Option<&'static str> {
    match state {
        RunState::Classifying => Some("Identifying item..."),
        RunState::Analyzing => Some("Reading affixes..."),
        RunState::Comparing => Some("Comparing items..."),
        _ => None,
    }
}

pub fn outcome_text(outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::Succeeded(entry) => result_text(&entry.result),
        RunOutcome::Rejected { title, reason, .. } => format!("{title}\n{reason}\n"),
        RunOutcome::Failed(e) => format!("Error: {e}\n"),
    }
}

pub fn result_text(result: &RunResult) -> String {
    match result {
        RunResult::Single(item) => single_text(item),
        RunResult::Comparison(cmp) => comparison_text(cmp),
    }
}

fn single_text(item: &SingleItemResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", item.title));
    out.push_str(&format!(
        "{}\n",
        type_line(&item.item_type, &item.rarity, item.power_level.as_deref())
    ));
    out.push_str(&format!("\n  {}  ·  Tier {}\n", item.verdict, item.tier));
    if !item.insight.is_empty() {
        out.push_str(&format!("\n{}\n", item.insight));
    }
    push_affix_block(&mut out, &item.affixes);
    out.push_str(&format!("\nLook it up: {}\n", search_link(&item.search_query)));
    out
}

fn comparison_text(cmp: &ComparisonResult) -> String {
    let mut out = String::new();
    for (label, item) in [("A", &cmp.item_a), ("B", &cmp.item_b)] {
        let badge = if std::ptr::eq(item, cmp.winning_item()) {
            "WINNER"
        } else {
            "LOSER"
        };
        push_compared(&mut out, label, badge, item);
    }
    if !cmp.verdict.is_empty() {
        out.push_str(&format!("\nVerdict: {}\n", cmp.verdict));
    }
    if !cmp.insight.is_empty() {
        out.push_str(&format!("{}\n", cmp.insight));
    }
    out.push_str(&format!("\nLook it up: {}\n", search_link(&cmp.search_query)));
    out
}

fn push_compared(out: &mut String, label: &str, badge: &str, item: &ComparedItem) {
    out.push_str(&format!("[{label}] {} ({badge})\n", item.title));
    out.push_str(&format!(
        "    {}  ·  Tier {}\n",
        type_line(&item.item_type, &item.rarity, item.power_level.as_deref()),
        item.tier
    ));
    push_affix_block(out, &item.affixes);
    out.push('\n');
}

fn push_affix_block(out: &mut String, affixes: &[AffixRecord]) {
    if affixes.is_empty() {
        return;
    }
    out.push_str("\nAffixes:\n");
    for affix in affixes {
        out.push_str(&format!("  {} {} {}", affix.quality, affix.name, affix.value));
        if !affix.reason.is_empty() {
            out.push_str(&format!("  ({})", affix.reason));
        }
        out.push('\n');
    }
}

// ── Journal ─────────────────────────────────────────────────

/// One line per entry: short id, timestamp, mode, class/build, headline.
pub fn journal_list_text(entries: &[JournalEntry]) -> String {
    if entries.is_empty() {
        return "Journal is empty.\n".to_string();
    }
    entries
        .iter()
        .map(|e| {
            format!(
                "{}  {}  {:<7}  {}/{}  {}\n",
                short_id(&e.id),
                e.timestamp.format("%Y-%m-%d %H:%M"),
                e.mode,
                e.context.category,
                e.context.sub_category,
                e.result.headline()
            )
        })
        .collect()
}

pub fn journal_entry_text(entry: &JournalEntry) -> String {
    format!(
        "{} · {} · {}/{} · {}\n\n{}",
        entry.id,
        entry.mode,
        entry.context.category,
        entry.context.sub_category,
        entry.timestamp.to_rfc3339(),
        result_text(&entry.result)
    )
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

pub fn classes_text(classes: &[ClassInfo]) -> String {
    classes
        .iter()
        .map(|c| {
            format!(
                "{:<12} builds: {}\n{:<12} mechanics: {}\n",
                c.name,
                c.builds.join(", "),
                "",
                c.mechanics.join(", ")
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{class_catalog, AnalysisContext};
    use crate::pipeline::demo::{demo_comparison, demo_single_item};
    use crate::pipeline::{ItemDomain, PipelineError};

    fn entry(result: RunResult) -> JournalEntry {
        JournalEntry::new(&AnalysisContext::default(), result)
    }

    #[test]
    fn single_item_shows_verdict_and_tagged_affixes() {
        let text = result_text(&RunResult::Single(demo_single_item()));
        assert!(text.starts_with("Harlequin Crest\n"));
        assert!(text.contains("KEEP  ·  Tier S"));
        assert!(text.contains("+ Cooldown Reduction +20.0%"));
        assert!(text.contains("~ Ranks to All Skills +4"));
    }

    #[test]
    fn comparison_badges_follow_winner() {
        let mut cmp = demo_comparison();
        let text = result_text(&RunResult::Comparison(cmp.clone()));
        assert!(text.contains("[A] Harlequin Crest (WINNER)"));
        assert!(text.contains("[B] Dread Visage (LOSER)"));
        assert!(text.contains("- Thorns +412"));

        cmp.winner = crate::pipeline::Winner::B;
        let text = result_text(&RunResult::Comparison(cmp));
        assert!(text.contains("[A] Harlequin Crest (LOSER)"));
        assert!(text.contains("[B] Dread Visage (WINNER)"));
    }

    #[test]
    fn rejection_and_failure_text() {
        let rejected = RunOutcome::Rejected {
            domain: ItemDomain::NotLoot,
            title: "Not a Game Item".into(),
            reason: "Upload a screenshot.".into(),
            rationale: None,
        };
        assert_eq!(outcome_text(&rejected), "Not a Game Item\nUpload a screenshot.\n");
        let failed = RunOutcome::Failed(PipelineError::NoCredential);
        assert!(outcome_text(&failed).starts_with("Error: No API key"));
    }

    #[test]
    fn outcome_json_envelope() {
        let ok = RunOutcome::Succeeded(entry(RunResult::Single(demo_single_item())));
        let v: serde_json::Value = serde_json::from_str(&outcome_json(&ok)).unwrap();
        assert_eq!(v["ok"], true);
        assert_eq!(v["data"]["mode"], "analyze");
        assert_eq!(v["data"]["result"]["verdict"], "keep");

        let failed = RunOutcome::Failed(PipelineError::UnparseableResponse);
        let v: serde_json::Value = serde_json::from_str(&outcome_json(&failed)).unwrap();
        assert_eq!(v["ok"], false);
        assert!(v["data"]["error"].as_str().unwrap().contains("AI response"));
    }

    #[test]
    fn journal_list_lines() {
        assert_eq!(journal_list_text(&[]), "Journal is empty.\n");
        let e = entry(RunResult::Comparison(demo_comparison()));
        let text = journal_list_text(std::slice::from_ref(&e));
        assert!(text.starts_with(&e.id[..8]));
        assert!(text.contains("compare"));
        assert!(text.contains("Any/General"));
        assert!(text.contains("Harlequin Crest vs Dread Visage"));
    }

    #[test]
    fn classes_listing_mentions_every_class() {
        let text = classes_text(&class_catalog());
        for class in crate::catalog::CLASSES {
            assert!(text.contains(class));
        }
    }

    #[test]
    fn loading_messages_only_for_network_stages() {
        assert!(state_message(RunState::Classifying).is_some());
        assert!(state_message(RunState::Comparing).is_some());
        assert!(state_message(RunState::Idle).is_none());
    }
}
