//! Plain-text export of a result and the "look it up" web search link.

use reqwest::Url;

use crate::pipeline::{AffixRecord, ComparedItem, ComparisonResult, RunResult, SingleItemResult};

const SEARCH_BASE: &str = "https://www.google.com/search";
const SEARCH_PREFIX: &str = "Diablo 4";

/// Web search URL for an item name, query-encoded.
pub fn search_link(query: &str) -> String {
    let q = format!("{SEARCH_PREFIX} {}", query.trim());
    match Url::parse_with_params(SEARCH_BASE, &[("q", q.as_str())]) {
        Ok(url) => url.to_string(),
        // Static base; only reachable if the constant is edited badly.
        Err(_) => SEARCH_BASE.to_string(),
    }
}

/// Text suitable for pasting into chat or a clipboard.
pub fn share_text(result: &RunResult) -> String {
    match result {
        RunResult::Single(item) => single_text(item),
        RunResult::Comparison(cmp) => comparison_text(cmp),
    }
}

fn single_text(item: &SingleItemResult) -> String {
    let mut out = format!(
        "Horadric verdict: {} ({}-tier)\n{}\n",
        item.verdict, item.tier, item.title
    );
    out.push_str(&type_line(&item.item_type, &item.rarity, item.power_level.as_deref()));
    out.push('\n');
    if !item.insight.is_empty() {
        out.push_str(&format!("\n{}\n", item.insight));
    }
    push_affixes(&mut out, &item.affixes);
    out.push_str(&format!("\n{}\n", search_link(&item.search_query)));
    out
}

fn comparison_text(cmp: &ComparisonResult) -> String {
    let winner = cmp.winning_item();
    let loser = cmp.losing_item();
    let mut out = format!(
        "Horadric comparison: {} beats {}\n",
        winner.title, loser.title
    );
    for (badge, item) in [("WINNER", winner), ("LOSER", loser)] {
        out.push_str(&format!("\n[{badge}] {}\n", compared_line(item)));
        push_affixes(&mut out, &item.affixes);
    }
    if !cmp.verdict.is_empty() {
        out.push_str(&format!("\nVerdict: {}\n", cmp.verdict));
    }
    if !cmp.insight.is_empty() {
        out.push_str(&format!("{}\n", cmp.insight));
    }
    out.push_str(&format!("\n{}\n", search_link(&cmp.search_query)));
    out
}

fn compared_line(item: &ComparedItem) -> String {
    format!(
        "{} ({}-tier) {}",
        item.title,
        item.tier,
        type_line(&item.item_type, &item.rarity, item.power_level.as_deref())
    )
}

/// "Rarity Type · Power N", skipping empty parts.
pub(crate) fn type_line(item_type: &str, rarity: &str, power: Option<&str>) -> String {
    let kind = [rarity, item_type]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    match power.filter(|p| !p.is_empty()) {
        Some(p) if kind.is_empty() => format!("Power {p}"),
        Some(p) => format!("{kind} · Power {p}"),
        None => kind,
    }
}

fn push_affixes(out: &mut String, affixes: &[AffixRecord]) {
    for affix in affixes {
        out.push_str(&format!("  [{}] {} {}\n", affix.quality, affix.name, affix.value));
    }
}
