//! End-to-end pipeline tests against a scripted in-memory page session.
//!
//! No browser is involved: the mock session serves fixture HTML keyed by
//! URL and fails navigation for anything unmapped, which exercises the
//! retry/skip/degrade paths the same way an unreachable site would.

use anyhow::Result;
use async_trait::async_trait;
use d4_harvester::browser::PageSession;
use d4_harvester::config::HarvestConfig;
use d4_harvester::model::Category;
use d4_harvester::pipeline::Harvester;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

const SITE: &str = "https://www.wowhead.com/diablo-4";

struct MockSession {
    pages: HashMap<String, String>,
    current: Option<String>,
}

impl MockSession {
    fn new(pages: HashMap<String, String>) -> Box<Self> {
        Box::new(Self {
            pages,
            current: None,
        })
    }
}

#[async_trait]
impl PageSession for MockSession {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<()> {
        if self.pages.contains_key(url) {
            self.current = Some(url.to_string());
            Ok(())
        } else {
            anyhow::bail!("net::ERR_NAME_NOT_RESOLVED for {url}")
        }
    }

    async fn wait_for_listview(&self, _timeout: Duration) -> bool {
        true
    }

    async fn html(&self) -> Result<String> {
        let current = self.current.as_ref().expect("navigate before html");
        Ok(self.pages[current].clone())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.current.clone().unwrap_or_default())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

fn test_config(out_dir: &Path) -> HarvestConfig {
    HarvestConfig {
        output_dir: out_dir.to_path_buf(),
        ..HarvestConfig::instant()
    }
}

fn item_row(name: &str, id: u32, item_type: &str) -> String {
    let slug = name.to_lowercase().replace(' ', "-");
    format!(
        r#"<tr class="listview-row">
          <td><div class="iconmedium"><ins style="background-image: url({SITE}/icons/{slug}.jpg)"></ins></div></td>
          <td><a class="listview-cleartext" href="{SITE}/item/{slug}-{id}">{name}</a></td>
          <td>{item_type}</td>
          <td>One-Hand</td>
          <td>All Classes</td>
        </tr>"#
    )
}

fn index_page(rows: &[String]) -> String {
    format!("<html><body><table>{}</table></body></html>", rows.join(""))
}

fn detail_page(power: u32, level: u32) -> String {
    format!(
        r#"<html><body>
        <div class="db-description-display">A storied weapon of Sanctuary.</div>
        <ul class="item-stats"><li>+20% Core Skill Damage</li></ul>
        <div>Item Power: {power}</div>
        <div>Requires Level {level}</div>
        </body></html>"#
    )
}

/// Fixture site with `mythic` + `unique` items per quality tier, every
/// detail page present.
fn items_site(mythic: usize, unique: usize) -> HashMap<String, String> {
    let mut pages = HashMap::new();
    let mut next_id = 100;

    for (path, rarity, count) in [
        ("/items/quality:6", "Mythic", mythic),
        ("/items/quality:5", "Unique", unique),
    ] {
        let mut rows = Vec::new();
        for n in 0..count {
            let name = format!("{rarity} Blade {n}");
            rows.push(item_row(&name, next_id, "Sword"));
            let slug = name.to_lowercase().replace(' ', "-");
            pages.insert(
                format!("{SITE}/item/{slug}-{next_id}"),
                detail_page(800 + n as u32, 60),
            );
            next_id += 1;
        }
        pages.insert(format!("{SITE}{path}"), index_page(&rows));
    }

    pages
}

fn read_records(path: &Path) -> Vec<serde_json::Value> {
    let content = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&content).unwrap()
}

#[tokio::test]
async fn bosses_with_unreachable_guides_fall_back_to_identity_records() {
    let dir = tempfile::tempdir().unwrap();
    // No pages at all: every guide navigation exhausts its retries.
    let harvester = Harvester::new(MockSession::new(HashMap::new()), test_config(dir.path()));

    let summary = harvester.run(&[Category::Bosses], None).await.unwrap();
    assert_eq!(summary.outcomes.len(), 1);
    assert_eq!(summary.outcomes[0].records, 13);

    let file = summary.outcomes[0].file.as_ref().expect("bosses file written");
    let records = read_records(file);
    assert_eq!(records.len(), 13);

    // A tier-less boss carries exactly the identity fields, nothing more.
    let lilith = records
        .iter()
        .find(|r| r["id"] == "echo-of-lilith")
        .expect("pinnacle boss present");
    let mut keys: Vec<_> = lilith.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, vec!["guideUrl", "id", "name", "type"]);
    assert_eq!(lilith["type"], "Pinnacle Boss");

    // A lair boss keeps its tier even without a guide.
    let zir = records.iter().find(|r| r["id"] == "lord-zir").unwrap();
    assert_eq!(zir["tier"], "Initiate");
    assert!(zir.get("drops").is_none());
    assert!(zir.get("summoningMaterials").is_none());
}

#[tokio::test]
async fn items_limit_splits_evenly_across_quality_tiers() {
    let dir = tempfile::tempdir().unwrap();
    // 3 mythics and 8 uniques on the indexes; --limit 10 over 2 tiers → 5 each.
    let harvester = Harvester::new(MockSession::new(items_site(3, 8)), test_config(dir.path()));

    let summary = harvester.run(&[Category::Items], Some(10)).await.unwrap();
    assert_eq!(summary.outcomes[0].records, 8); // 3 mythic + 5 of 8 unique

    let records = read_records(summary.outcomes[0].file.as_ref().unwrap());
    let mythic = records.iter().filter(|r| r["rarity"] == "Mythic").count();
    let unique = records.iter().filter(|r| r["rarity"] == "Unique").count();
    assert_eq!(mythic, 3);
    assert_eq!(unique, 5);
    assert!(records.len() <= 10);

    for record in &records {
        assert!(!record["id"].as_str().unwrap().is_empty());
        assert!(!record["name"].as_str().unwrap().is_empty());
        assert_eq!(record["requiredLevel"], 60);
        assert_eq!(record["category"], "Weapons");
        assert_eq!(record["affixes"][0]["value"], "+20%");
    }
}

#[tokio::test]
async fn empty_index_writes_nothing_and_preserves_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let prior = dir.path().join(Category::Items.output_file());
    std::fs::write(&prior, "[{\"sentinel\":true}]").unwrap();

    let mut pages = HashMap::new();
    let empty = "<html><body><table></table></body></html>".to_string();
    pages.insert(format!("{SITE}/items/quality:6"), empty.clone());
    pages.insert(format!("{SITE}/items/quality:5"), empty);

    let harvester = Harvester::new(MockSession::new(pages), test_config(dir.path()));
    let summary = harvester.run(&[Category::Items], None).await.unwrap();

    assert_eq!(summary.outcomes[0].records, 0);
    assert!(summary.outcomes[0].file.is_none());
    assert_eq!(
        std::fs::read_to_string(&prior).unwrap(),
        "[{\"sentinel\":true}]"
    );
}

#[tokio::test]
async fn identical_source_pages_produce_byte_identical_output() {
    let dir = tempfile::tempdir().unwrap();
    let pages = items_site(2, 2);

    let harvester = Harvester::new(MockSession::new(pages.clone()), test_config(dir.path()));
    let summary = harvester.run(&[Category::Items], None).await.unwrap();
    let path = summary.outcomes[0].file.clone().unwrap();
    let first = std::fs::read(&path).unwrap();

    let harvester = Harvester::new(MockSession::new(pages), test_config(dir.path()));
    harvester.run(&[Category::Items], None).await.unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), first);
}

#[tokio::test]
async fn unreachable_detail_page_skips_only_that_item() {
    let dir = tempfile::tempdir().unwrap();
    let mut pages = items_site(2, 0);
    // Drop one mythic's detail page; its navigation will exhaust retries.
    let gone = format!("{SITE}/item/mythic-blade-0-100");
    assert!(pages.remove(&gone).is_some());

    let harvester = Harvester::new(MockSession::new(pages), test_config(dir.path()));
    let summary = harvester.run(&[Category::Items], None).await.unwrap();

    assert_eq!(summary.outcomes[0].records, 1);
    let records = read_records(summary.outcomes[0].file.as_ref().unwrap());
    assert_eq!(records[0]["name"], "Mythic Blade 1");
}

#[tokio::test]
async fn skill_ids_stay_unique_across_class_pages() {
    let dir = tempfile::tempdir().unwrap();
    // Two class indexes whose anchors carry no numeric id suffix; the other
    // class pages are unreachable and get skipped.
    let mut pages = HashMap::new();
    pages.insert(
        format!("{SITE}/skills/barbarian"),
        format!(r#"<a href="{SITE}/skill/bash">Bash</a>"#),
    );
    pages.insert(
        format!("{SITE}/skills/druid"),
        format!(r#"<a href="{SITE}/skill/maul">Maul</a>"#),
    );
    let detail = r#"<div class="skill-category">Basic</div><p class="q">Strike the enemy.</p>"#;
    pages.insert(format!("{SITE}/skill/bash"), detail.to_string());
    pages.insert(format!("{SITE}/skill/maul"), detail.to_string());

    let harvester = Harvester::new(MockSession::new(pages), test_config(dir.path()));
    let summary = harvester.run(&[Category::Skills], None).await.unwrap();

    assert_eq!(summary.outcomes[0].records, 2);
    let records = read_records(summary.outcomes[0].file.as_ref().unwrap());
    let ids: Vec<&str> = records.iter().map(|r| r["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["bash", "maul"]);
}

#[tokio::test]
async fn category_order_follows_the_caller() {
    let dir = tempfile::tempdir().unwrap();
    let harvester = Harvester::new(MockSession::new(items_site(1, 1)), test_config(dir.path()));

    let summary = harvester
        .run(&[Category::Bosses, Category::Items], None)
        .await
        .unwrap();
    let order: Vec<Category> = summary.outcomes.iter().map(|o| o.category).collect();
    assert_eq!(order, vec![Category::Bosses, Category::Items]);
    // Bosses still produced their full fallback roster with no site at all.
    assert_eq!(summary.outcomes[0].records, 13);
    assert_eq!(summary.outcomes[1].records, 2);
}
