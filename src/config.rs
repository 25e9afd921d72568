//! Harvest configuration: target URLs, pacing, and the boss roster.
//!
//! Pacing values are deliberately conservative — the whole pipeline is
//! serialized as a courtesy toward the scraped site, and tests override the
//! delays to zero. The boss roster changes every season, so it lives in
//! `data/bosses.json` (embedded at compile time) rather than in code.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Season boss roster, embedded so there is no runtime file I/O.
const BOSS_ROSTER_JSON: &str = include_str!("../data/bosses.json");

/// Item types that are listed on the index pages but are not equipment.
pub const NON_EQUIPMENT_TYPES: &[&str] = &[
    "Elixir",
    "Incense",
    "Material",
    "Consumable",
    "Quest",
    "Scroll",
    "Key",
];

/// Playable classes, in the order their skill pages are visited.
pub const SKILL_CLASSES: &[&str] = &[
    "barbarian",
    "druid",
    "necromancer",
    "rogue",
    "sorcerer",
    "spiritborn",
];

/// An item-quality partition of the items index.
#[derive(Debug, Clone, Copy)]
pub struct QualityPartition {
    /// Display rarity carried onto every record from this partition.
    pub rarity: &'static str,
    /// Path suffix appended to the base URL.
    pub path: &'static str,
}

/// The two qualities worth harvesting. Lower qualities are procedurally
/// generated in-game and have no stable detail pages.
pub const QUALITY_PARTITIONS: &[QualityPartition] = &[
    QualityPartition {
        rarity: "Mythic",
        path: "/items/quality:6",
    },
    QualityPartition {
        rarity: "Unique",
        path: "/items/quality:5",
    },
];

/// One entry of the season boss roster.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BossEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub boss_type: String,
    pub tier: Option<String>,
    pub guide_path: String,
}

/// Parse the embedded boss roster.
pub fn boss_roster() -> Result<Vec<BossEntry>> {
    serde_json::from_str(BOSS_ROSTER_JSON).context("embedded boss roster is malformed")
}

/// Runtime configuration for a harvest run.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Base URL of the scraped site.
    pub base_url: String,
    /// Directory the category JSON files are written to.
    pub output_dir: PathBuf,
    /// Pause before each detail-page navigation.
    pub delay_between_requests: Duration,
    /// Longer pause after each category or quality/class partition.
    pub delay_between_categories: Duration,
    /// Navigation attempts before giving up on a URL.
    pub max_retries: u32,
    /// Backoff between navigation attempts.
    pub retry_delay: Duration,
    /// Hard timeout for a single page load.
    pub navigation_timeout: Duration,
    /// Soft timeout waiting for the site's Listview client hook.
    pub listview_timeout: Duration,
    /// References processed per partition when no `--limit` is given.
    pub default_partition_cap: usize,
    /// Maximum drops recorded per boss guide.
    pub max_drops_per_boss: usize,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.wowhead.com/diablo-4".to_string(),
            output_dir: PathBuf::from("public/data"),
            delay_between_requests: Duration::from_secs(2),
            delay_between_categories: Duration::from_secs(5),
            max_retries: 3,
            retry_delay: Duration::from_secs(5),
            navigation_timeout: Duration::from_secs(30),
            listview_timeout: Duration::from_secs(10),
            default_partition_cap: 20,
            max_drops_per_boss: 20,
        }
    }
}

impl HarvestConfig {
    /// Join a site-relative path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// A configuration with zero pacing, for tests against mock sessions.
    #[doc(hidden)]
    pub fn instant() -> Self {
        Self {
            delay_between_requests: Duration::ZERO,
            delay_between_categories: Duration::ZERO,
            retry_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Per-partition reference cap: an explicit limit is divided evenly across
/// partitions (rounding up), otherwise the configured default applies.
pub fn partition_cap(limit: Option<usize>, partitions: usize, default_cap: usize) -> usize {
    match limit {
        Some(n) => n.div_ceil(partitions.max(1)),
        None => default_cap,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boss_roster_parses() {
        let roster = boss_roster().expect("roster should parse");
        assert_eq!(roster.len(), 13);
        assert!(roster.iter().all(|b| !b.name.is_empty()));
        assert!(roster.iter().all(|b| b.guide_path.starts_with('/')));

        let lilith = roster
            .iter()
            .find(|b| b.name == "Echo of Lilith")
            .expect("pinnacle boss present");
        assert_eq!(lilith.boss_type, "Pinnacle Boss");
        assert!(lilith.tier.is_none());
    }

    #[test]
    fn test_partition_cap_divides_limit_evenly() {
        // 10 over 2 quality tiers → 5 per tier
        assert_eq!(partition_cap(Some(10), 2, 20), 5);
        // ceil division: 9 over 2 → 5
        assert_eq!(partition_cap(Some(9), 2, 20), 5);
        // 10 over 6 classes → 2 per class
        assert_eq!(partition_cap(Some(10), 6, 20), 2);
    }

    #[test]
    fn test_partition_cap_default_without_limit() {
        assert_eq!(partition_cap(None, 2, 20), 20);
    }

    #[test]
    fn test_url_join() {
        let cfg = HarvestConfig::default();
        assert_eq!(
            cfg.url("/items/quality:6"),
            "https://www.wowhead.com/diablo-4/items/quality:6"
        );
    }
}
