//! Detail-page extraction: descriptions, affixes, and scalar stats.
//!
//! The affix parser reproduces the site's tooltip text conventions: a stat
//! line either carries a leading numeric/percent value ("+20% Core Skill
//! Damage") or is a free-text utility effect. "Requires ..." and
//! "Item Power ..." lines are tooltip noise, not affixes.

use super::{element_text, page_text};
use crate::model::Affix;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::OnceLock;

/// Default item power when the page text carries no match.
pub const DEFAULT_ITEM_POWER: u32 = 800;
/// Default required level when the page text carries no match.
pub const DEFAULT_REQUIRED_LEVEL: u32 = 60;

/// Stat lines shorter than this are icon glyphs or separators.
const MIN_STAT_LINE: usize = 3;
/// Stat lines longer than this are flavor paragraphs, not affixes.
const MAX_STAT_LINE: usize = 200;

fn affix_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([+\-]?[\d.,]+%?)\s*(.+)").expect("affix value regex is valid")
    })
}

fn item_power_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)Item Power:?\s*(\d+)").expect("item power regex is valid"))
}

fn required_level_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)Requires Level\s*(\d+)").expect("level regex is valid"))
}

/// Fields recovered from an item detail page.
#[derive(Debug, Clone, Default)]
pub struct ItemDetail {
    pub description: String,
    pub affixes: Vec<Affix>,
    pub item_power: u32,
    pub required_level: u32,
}

/// Fields recovered from a skill detail page.
#[derive(Debug, Clone)]
pub struct SkillDetail {
    pub description: String,
    pub category: String,
}

/// Fields recovered from an aspect detail page.
#[derive(Debug, Clone)]
pub struct AspectDetail {
    pub description: String,
    pub aspect_type: String,
    pub dungeon: String,
}

/// Text of the first element matching the selector union, or empty.
fn first_text(document: &Html, selectors: &str) -> String {
    let sel = Selector::parse(selectors).unwrap();
    document
        .select(&sel)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default()
}

/// Parse one stat line into an affix.
///
/// Lines containing "Requires" or "Item Power" never produce an affix. A
/// numeric/percent prefix splits into value + stat name (Offensive); any
/// other line becomes a zero-value Utility affix rather than being dropped.
pub fn parse_affix_line(text: &str) -> Option<Affix> {
    if text.contains("Requires") || text.contains("Item Power") {
        return None;
    }
    if let Some(caps) = affix_value_re().captures(text) {
        return Some(Affix {
            name: caps[2].trim().to_string(),
            value: caps[1].to_string(),
            description: text.to_string(),
            affix_type: "Offensive".to_string(),
        });
    }
    Some(Affix {
        name: text.to_string(),
        value: String::new(),
        description: text.to_string(),
        affix_type: "Utility".to_string(),
    })
}

/// Extract item description, affixes, and scalar stats from a detail page.
pub fn extract_item_detail(html: &str) -> ItemDetail {
    let document = Html::parse_document(html);

    let description = first_text(
        &document,
        ".db-description-display, .tooltip-desc, .q, .item-description",
    );

    let stat_sel = Selector::parse(".q7, .q2, .item-stats li, .indent").unwrap();
    let mut affixes = Vec::new();
    for el in document.select(&stat_sel) {
        let text = element_text(&el);
        if text.len() > MIN_STAT_LINE && text.len() < MAX_STAT_LINE {
            if let Some(affix) = parse_affix_line(&text) {
                affixes.push(affix);
            }
        }
    }

    let body = page_text(&document);
    let item_power = item_power_re()
        .captures(&body)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(DEFAULT_ITEM_POWER);
    let required_level = required_level_re()
        .captures(&body)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(DEFAULT_REQUIRED_LEVEL);

    ItemDetail {
        description,
        affixes,
        item_power,
        required_level,
    }
}

/// Extract skill description and category from a detail page.
pub fn extract_skill_detail(html: &str) -> SkillDetail {
    let document = Html::parse_document(html);
    let description = first_text(&document, ".db-description-display, .tooltip-desc, .q");
    let mut category = first_text(&document, ".skill-category, .breadcrumb");
    if category.is_empty() {
        category = "Core".to_string();
    }
    SkillDetail {
        description,
        category,
    }
}

/// Extract aspect description, type, and source dungeon from a detail page.
pub fn extract_aspect_detail(html: &str) -> AspectDetail {
    let document = Html::parse_document(html);
    let description = first_text(&document, ".db-description-display, .tooltip-desc, .q");
    let mut aspect_type = first_text(&document, ".aspect-type, .category");
    if aspect_type.is_empty() {
        aspect_type = "Utility".to_string();
    }
    let dungeon = first_text(&document, ".aspect-source, .source");
    AspectDetail {
        description,
        aspect_type,
        dungeon,
    }
}

/// Derive the coarse item category from the listed type string.
pub fn derive_item_category(item_type: &str) -> &'static str {
    const WEAPON_KEYWORDS: &[&str] = &[
        "sword", "axe", "mace", "staff", "bow", "crossbow", "dagger", "scythe", "polearm",
    ];
    let lower = item_type.to_lowercase();
    if WEAPON_KEYWORDS.iter().any(|k| lower.contains(k)) {
        "Weapons"
    } else {
        "Armor"
    }
}

/// Split a class-requirement cell into the output class list.
pub fn parse_class_requirement(class_req: &str) -> Vec<String> {
    if class_req.is_empty() || class_req == "All Classes" {
        return vec!["All Classes".to_string()];
    }
    class_req
        .split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}
