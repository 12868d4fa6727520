//! Class catalog and the user-selected analysis context.
//!
//! The seven Diablo IV classes with their builds and key mechanics, plus
//! `AnalysisContext`, the validated selection that drives prompt wording.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ═══════════════════════════════════════════
// Constants: Classes, Builds, Mechanics
// ═══════════════════════════════════════════

pub const DEFAULT_CATEGORY: &str = "Any";
pub const DEFAULT_SUB_CATEGORY: &str = "General";

pub const CLASSES: &[&str] = &[
    "Barbarian",
    "Druid",
    "Necromancer",
    "Paladin",
    "Rogue",
    "Sorcerer",
    "Spiritborn",
];

pub fn builds_for(class: &str) -> Vec<&'static str> {
    match class {
        "Barbarian" => vec!["Whirlwind", "HOTA", "Thorns"],
        "Druid" => vec!["Pulverize", "Stormclaw", "Tornado"],
        "Necromancer" => vec!["Bone Spear", "Minion", "Blood"],
        "Paladin" => vec!["Shield Bash", "Holy Fire"],
        "Rogue" => vec!["Twisting Blades", "Rapid Fire"],
        "Sorcerer" => vec!["Ice Shards", "Firewall", "Ball Lightning"],
        "Spiritborn" => vec!["Jaguar", "Eagle", "Centipede"],
        _ => vec![],
    }
}

pub fn mechanics_for(class: &str) -> Vec<&'static str> {
    match class {
        "Barbarian" => vec!["Berserking", "Bleed"],
        "Druid" => vec!["Fortify", "Overpower"],
        "Necromancer" => vec!["Essence", "Corpse"],
        "Paladin" => vec!["Block", "Thorns"],
        "Rogue" => vec!["Lucky Hit", "Crit"],
        "Sorcerer" => vec!["Mana", "Barrier"],
        "Spiritborn" => vec!["Vigor", "Dodge"],
        _ => vec![],
    }
}

/// Class info with builds and mechanics (for listing).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    pub builds: Vec<String>,
    pub mechanics: Vec<String>,
}

pub fn class_catalog() -> Vec<ClassInfo> {
    CLASSES
        .iter()
        .map(|&name| ClassInfo {
            name: name.to_string(),
            builds: builds_for(name).into_iter().map(String::from).collect(),
            mechanics: mechanics_for(name).into_iter().map(String::from).collect(),
        })
        .collect()
}

/// Resolve a user-typed class name to its canonical spelling.
fn canonical_class(input: &str) -> Option<&'static str> {
    CLASSES
        .iter()
        .copied()
        .find(|c| c.eq_ignore_ascii_case(input.trim()))
}

fn canonical_build(class: &str, input: &str) -> Option<&'static str> {
    builds_for(class)
        .into_iter()
        .find(|b| b.eq_ignore_ascii_case(input.trim()))
}

// ═══════════════════════════════════════════
// Required traits (stat checkboxes)
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredTrait {
    Strength,
    Intelligence,
    Willpower,
    Dexterity,
    Resistances,
}

impl RequiredTrait {
    pub const ALL: [RequiredTrait; 5] = [
        Self::Strength,
        Self::Intelligence,
        Self::Willpower,
        Self::Dexterity,
        Self::Resistances,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Strength => "Strength",
            Self::Intelligence => "Intelligence",
            Self::Willpower => "Willpower",
            Self::Dexterity => "Dexterity",
            Self::Resistances => "Resistances",
        }
    }

    /// Accepts the label or the short stat code (`str`, `int`, `will`, `dex`, `res`).
    pub fn parse(input: &str) -> Option<Self> {
        let needle = input.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|t| {
            let label = t.label().to_ascii_lowercase();
            label == needle || (needle.len() >= 3 && label.starts_with(&needle))
        })
    }
}

impl std::fmt::Display for RequiredTrait {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ═══════════════════════════════════════════
// AnalysisContext
// ═══════════════════════════════════════════

#[derive(Error, Debug, PartialEq)]
pub enum CatalogError {
    #[error("Unknown class: {0}")]
    UnknownClass(String),

    #[error("Build '{build}' is not available for {class}")]
    UnknownBuild { class: String, build: String },
}

/// What the user selected before starting a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisContext {
    category: String,
    sub_category: String,
    focus_attribute: Option<String>,
    required_traits: BTreeSet<RequiredTrait>,
}

impl Default for AnalysisContext {
    fn default() -> Self {
        Self {
            category: DEFAULT_CATEGORY.to_string(),
            sub_category: DEFAULT_SUB_CATEGORY.to_string(),
            focus_attribute: None,
            required_traits: BTreeSet::new(),
        }
    }
}

impl AnalysisContext {
    /// Validate a class/build pair against the catalog.
    ///
    /// Blank or `Any` class means the default category, which only allows the
    /// default sub-category. Blank build means `General`.
    pub fn new(category: &str, sub_category: &str) -> Result<Self, CatalogError> {
        let category = category.trim();
        let sub_category = sub_category.trim();

        let class = if category.is_empty() || category.eq_ignore_ascii_case(DEFAULT_CATEGORY) {
            None
        } else {
            Some(
                canonical_class(category)
                    .ok_or_else(|| CatalogError::UnknownClass(category.to_string()))?,
            )
        };

        let is_default_build =
            sub_category.is_empty() || sub_category.eq_ignore_ascii_case(DEFAULT_SUB_CATEGORY);

        let build = match (class, is_default_build) {
            (_, true) => DEFAULT_SUB_CATEGORY,
            (Some(class), false) => {
                canonical_build(class, sub_category).ok_or_else(|| CatalogError::UnknownBuild {
                    class: class.to_string(),
                    build: sub_category.to_string(),
                })?
            }
            (None, false) => {
                return Err(CatalogError::UnknownBuild {
                    class: DEFAULT_CATEGORY.to_string(),
                    build: sub_category.to_string(),
                })
            }
        };

        Ok(Self {
            category: class.unwrap_or(DEFAULT_CATEGORY).to_string(),
            sub_category: build.to_string(),
            ..Self::default()
        })
    }

    pub fn with_focus_attribute(mut self, focus: Option<&str>) -> Self {
        self.focus_attribute = focus
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(String::from);
        self
    }

    pub fn with_required_traits(mut self, traits: impl IntoIterator<Item = RequiredTrait>) -> Self {
        self.required_traits = traits.into_iter().collect();
        self
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn sub_category(&self) -> &str {
        &self.sub_category
    }

    pub fn focus_attribute(&self) -> Option<&str> {
        self.focus_attribute.as_deref()
    }

    pub fn required_traits(&self) -> &BTreeSet<RequiredTrait> {
        &self.required_traits
    }

    pub fn has_class(&self) -> bool {
        self.category != DEFAULT_CATEGORY
    }

    pub fn has_build(&self) -> bool {
        self.sub_category != DEFAULT_SUB_CATEGORY
    }

    /// Key mechanics of the selected class (empty for `Any`).
    pub fn mechanics(&self) -> Vec<&'static str> {
        mechanics_for(&self.category)
    }
}
