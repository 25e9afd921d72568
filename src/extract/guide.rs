//! Boss guide extraction: description, location, materials, and drops.

use super::{element_text, page_text};
use crate::model::{BossDrop, SummoningMaterial};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

/// Known summoning material names, alternated into the quantity regexes.
const MATERIAL_NAMES: &str = "Malignant Heart|Gurgling Head|Blackened Femur|Trembling Hand\
    |Living Steel|Exquisite Blood|Distilled Fear|Mucus-Slick Egg|Shard of Agony|Stygian Stone";

fn qty_before_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?i)(\d+)x?\s+({MATERIAL_NAMES})"))
            .expect("qty-before material regex is valid")
    })
}

fn qty_after_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?i)({MATERIAL_NAMES})\s*[x×]\s*(\d+)"))
            .expect("qty-after material regex is valid")
    })
}

fn location_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)located?\s+(?:in|at)\s+([^.]+)").expect("location regex is valid")
    })
}

/// Guide description paragraphs must be long enough to be prose and short
/// enough to not be the whole strategy section.
const MIN_DESCRIPTION: usize = 50;
const MAX_DESCRIPTION: usize = 500;

/// Drop anchor text outside this range is an icon glyph or a paragraph link.
const MIN_DROP_NAME: usize = 3;
const MAX_DROP_NAME: usize = 50;

/// Everything recoverable from a boss guide page. Every field is
/// best-effort; an unrecognized page yields the default.
#[derive(Debug, Clone, Default)]
pub struct BossGuide {
    pub description: Option<String>,
    pub location: Option<String>,
    pub materials: Vec<SummoningMaterial>,
    pub drops: Vec<BossDrop>,
}

/// Extract boss details from a guide page, keeping at most `max_drops`
/// drops.
pub fn extract_boss_guide(html: &str, max_drops: usize) -> BossGuide {
    let document = Html::parse_document(html);
    let body = page_text(&document);

    BossGuide {
        description: find_description(&document),
        location: location_re()
            .captures(&body)
            .map(|c| c[1].trim().to_string()),
        materials: find_materials(&body),
        drops: find_drops(&document, max_drops),
    }
}

/// First paragraph that reads like an intro blurb.
fn find_description(document: &Html) -> Option<String> {
    let p_sel = Selector::parse("p").unwrap();
    document
        .select(&p_sel)
        .map(|p| element_text(&p))
        .find(|text| {
            text.len() > MIN_DESCRIPTION
                && text.len() < MAX_DESCRIPTION
                && !text.contains("Table of Contents")
        })
}

/// Summoning materials matched anywhere in the body text, deduplicated by
/// name. Both "3x Living Steel" and "Living Steel x3" phrasings occur.
fn find_materials(body: &str) -> Vec<SummoningMaterial> {
    let mut materials: Vec<SummoningMaterial> = Vec::new();
    let mut push = |name: String, quantity: u32| {
        if !materials.iter().any(|m| m.name.eq_ignore_ascii_case(&name)) {
            materials.push(SummoningMaterial { name, quantity });
        }
    };

    for caps in qty_before_re().captures_iter(body) {
        let quantity = caps[1].parse().unwrap_or(1);
        push(caps[2].to_string(), quantity);
    }
    for caps in qty_after_re().captures_iter(body) {
        let quantity = caps[2].parse().unwrap_or(1);
        push(caps[1].to_string(), quantity);
    }

    materials
}

/// Drops inferred from item links, with the type read from the surrounding
/// list/table/paragraph context.
fn find_drops(document: &Html, max_drops: usize) -> Vec<BossDrop> {
    let link_sel = Selector::parse(r#"a[href*="/item/"]"#).unwrap();
    let mut drops: Vec<BossDrop> = Vec::new();

    for link in document.select(&link_sel) {
        if drops.len() >= max_drops {
            break;
        }
        let name = element_text(&link);
        if name.len() <= MIN_DROP_NAME || name.len() >= MAX_DROP_NAME {
            continue;
        }
        if drops.iter().any(|d| d.name == name) {
            continue;
        }

        let context = link
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|a| matches!(a.value().name(), "li" | "tr" | "p"))
            .map(|a| element_text(&a).to_lowercase())
            .unwrap_or_default();

        let drop_type = if context.contains("mythic") {
            "Mythic"
        } else if context.contains("rune") {
            "Rune"
        } else {
            "Unique"
        };

        drops.push(BossDrop {
            name,
            drop_type: drop_type.to_string(),
        });
    }

    drops
}
