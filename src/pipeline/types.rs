use serde::{Deserialize, Serialize};

/// Which user action started a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Analyze,
    Compare,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Analyze => write!(f, "analyze"),
            Self::Compare => write!(f, "compare"),
        }
    }
}

/// Stage 1 outcome: does the screenshot show Diablo IV loot?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemDomain {
    /// A Diablo IV item tooltip.
    Diablo4,
    /// A photo of the real world (cans, desks, photographed monitors).
    NotLoot,
    /// Some other game, or a category the model made up.
    OtherGame,
}

impl ItemDomain {
    pub fn is_supported(self) -> bool {
        self == Self::Diablo4
    }

    /// Rejection banner (title, explanation) for unsupported domains.
    pub fn rejection(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Diablo4 => None,
            Self::NotLoot => Some((
                "Not a Game Item",
                "This looks like a real-world photo. Please upload a direct screenshot from Diablo 4.",
            )),
            Self::OtherGame => Some((
                "Wrong Game",
                "This does not look like a Diablo IV item tooltip. Please check your image.",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub domain: ItemDomain,
    pub rationale: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffixQuality {
    Good,
    Bad,
    Neutral,
}

impl std::fmt::Display for AffixQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Good => write!(f, "+"),
            Self::Bad => write!(f, "-"),
            Self::Neutral => write!(f, "~"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffixRecord {
    pub name: String,
    pub value: String,
    pub quality: AffixQuality,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Keep,
    Discard,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Keep => write!(f, "KEEP"),
            Self::Discard => write!(f, "DISCARD"),
        }
    }
}

/// Stage 2 result for a single item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleItemResult {
    pub title: String,
    pub item_type: String,
    pub rarity: String,
    pub power_level: Option<String>,
    pub verdict: Verdict,
    pub tier: String,
    pub insight: String,
    pub affixes: Vec<AffixRecord>,
    pub search_query: String,
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparedItem {
    pub title: String,
    pub item_type: String,
    pub rarity: String,
    pub power_level: Option<String>,
    pub tier: String,
    pub affixes: Vec<AffixRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    A,
    B,
}

/// Stage 2 result for two items read from one screenshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub item_a: ComparedItem,
    pub item_b: ComparedItem,
    pub winner: Winner,
    pub verdict: String,
    pub insight: String,
    /// Name of the losing item.
    pub search_query: String,
}

impl ComparisonResult {
    pub fn winning_item(&self) -> &ComparedItem {
        match self.winner {
            Winner::A => &self.item_a,
            Winner::B => &self.item_b,
        }
    }

    pub fn losing_item(&self) -> &ComparedItem {
        match self.winner {
            Winner::A => &self.item_b,
            Winner::B => &self.item_a,
        }
    }
}

/// Either kind of Stage 2 result.
///
/// Untagged on disk; `Comparison` is listed first because its required
/// fields never appear on a single-item record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunResult {
    Comparison(ComparisonResult),
    Single(SingleItemResult),
}

impl RunResult {
    pub fn mode(&self) -> RunMode {
        match self {
            Self::Single(_) => RunMode::Analyze,
            Self::Comparison(_) => RunMode::Compare,
        }
    }

    pub fn headline(&self) -> String {
        match self {
            Self::Single(item) => format!("{} ({})", item.title, item.verdict),
            Self::Comparison(cmp) => format!("{} vs {}", cmp.item_a.title, cmp.item_b.title),
        }
    }

    pub fn search_query(&self) -> &str {
        match self {
            Self::Single(item) => &item.search_query,
            Self::Comparison(cmp) => &cmp.search_query,
        }
    }
}
