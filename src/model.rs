//! Record types written to the category JSON files.
//!
//! Field names and optionality mirror the front end's TypeScript interfaces;
//! everything serializes camelCase and optional fields are omitted rather
//! than emitted as null, so the files diff cleanly between seasons.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A harvestable data category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Items,
    Skills,
    Aspects,
    Bosses,
}

impl Category {
    /// All categories, in default harvest order.
    pub const ALL: [Category; 4] = [
        Category::Items,
        Category::Skills,
        Category::Aspects,
        Category::Bosses,
    ];

    /// Fixed output file name for this category.
    pub fn output_file(&self) -> &'static str {
        match self {
            Category::Items => "items-scraped.json",
            Category::Skills => "skills-scraped.json",
            Category::Aspects => "aspects-scraped.json",
            Category::Bosses => "bosses-scraped.json",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Items => "items",
            Category::Skills => "skills",
            Category::Aspects => "aspects",
            Category::Bosses => "bosses",
        };
        f.write_str(name)
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "items" => Ok(Category::Items),
            "skills" => Ok(Category::Skills),
            "aspects" => Ok(Category::Aspects),
            "bosses" => Ok(Category::Bosses),
            other => Err(format!(
                "unknown category '{other}' (expected items, skills, aspects, or bosses)"
            )),
        }
    }
}

/// A lightweight reference harvested from an index page, consumed once by
/// the detail pass and then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListReference {
    pub id: String,
    pub name: String,
    /// Absolute detail-page URL.
    pub href: String,
    pub icon_url: String,
    /// Coarse fields only the index page exposes.
    pub item_type: String,
    pub slot: String,
    pub class_req: String,
}

/// A parsed stat line from an item detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affix {
    pub name: String,
    /// Numeric/percent prefix, empty for utility lines.
    pub value: String,
    pub description: String,
    #[serde(rename = "type")]
    pub affix_type: String,
}

/// Final item record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub category: String,
    pub slot: String,
    pub rarity: String,
    pub required_level: u32,
    pub item_power: u32,
    pub description: String,
    pub affixes: Vec<Affix>,
    pub class: Vec<String>,
    pub icon_url: String,
}

/// Final skill record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRecord {
    pub id: String,
    pub name: String,
    pub class: String,
    pub category: String,
    pub description: String,
    pub icon_url: String,
}

/// Final aspect record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AspectRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub aspect_type: String,
    pub description: String,
    pub class: Vec<String>,
    pub dungeon_location: String,
    pub icon_url: String,
}

/// A summoning material listed on a boss guide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummoningMaterial {
    pub name: String,
    pub quantity: u32,
}

/// A drop listed on a boss guide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossDrop {
    pub name: String,
    #[serde(rename = "type")]
    pub drop_type: String,
}

/// Final boss record. A boss whose guide page never loads still gets a
/// record with the statically known identity fields; the optionals stay
/// absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BossRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub boss_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summoning_materials: Option<Vec<SummoningMaterial>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drops: Option<Vec<BossDrop>>,
    pub guide_url: String,
}

/// Slugify a display name into a stable record id: lowercase, runs of
/// non-alphanumerics collapsed to single hyphens, no leading/trailing hyphen.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip() {
        for cat in Category::ALL {
            assert_eq!(cat.to_string().parse::<Category>().unwrap(), cat);
        }
        assert!("paragon".parse::<Category>().is_err());
    }

    #[test]
    fn test_output_file_names_are_fixed() {
        assert_eq!(Category::Items.output_file(), "items-scraped.json");
        assert_eq!(Category::Bosses.output_file(), "bosses-scraped.json");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Echo of Varshan"), "echo-of-varshan");
        assert_eq!(
            slugify("Grigoire, the Galvanic Saint"),
            "grigoire-the-galvanic-saint"
        );
        assert_eq!(slugify("Duriel, King of Maggots"), "duriel-king-of-maggots");
        assert_eq!(slugify("  Lord Zir  "), "lord-zir");
    }

    #[test]
    fn test_boss_fallback_serializes_without_optionals() {
        let boss = BossRecord {
            id: "echo-of-lilith".into(),
            name: "Echo of Lilith".into(),
            boss_type: "Pinnacle Boss".into(),
            tier: None,
            location: None,
            description: None,
            summoning_materials: None,
            drops: None,
            guide_url: "https://example.com/guide".into(),
        };
        let json = serde_json::to_value(&boss).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        for key in ["id", "name", "type", "guideUrl"] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert!(!obj.contains_key("tier"));
        assert!(!obj.contains_key("drops"));
    }

    #[test]
    fn test_item_record_uses_camel_case() {
        let item = ItemRecord {
            id: "1".into(),
            name: "Doombringer".into(),
            item_type: "Sword".into(),
            category: "Weapons".into(),
            slot: "One-Hand".into(),
            rarity: "Unique".into(),
            required_level: 60,
            item_power: 800,
            description: String::new(),
            affixes: Vec::new(),
            class: vec!["All Classes".into()],
            icon_url: String::new(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("requiredLevel").is_some());
        assert!(json.get("itemPower").is_some());
        assert!(json.get("iconUrl").is_some());
        assert!(json.get("required_level").is_none());
    }
}
