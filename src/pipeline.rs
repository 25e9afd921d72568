//! Run orchestration: category sequencing, pacing, and accumulation.
//!
//! One browser session is reused serially for every navigation in a run; the
//! serialization is a rate-limiting courtesy toward the scraped site, not a
//! throughput concern. Failures narrow as they descend: a browser that will
//! not launch kills the run, an index page that will not load skips its
//! partition, and a detail page that will not load or parse skips only that
//! reference.

use crate::browser::chromium::ChromiumSession;
use crate::browser::{navigate_with_retry, PageSession};
use crate::config::{
    boss_roster, partition_cap, HarvestConfig, QUALITY_PARTITIONS, SKILL_CLASSES,
};
use crate::extract::detail::{
    derive_item_category, extract_aspect_detail, extract_item_detail, extract_skill_detail,
    parse_class_requirement,
};
use crate::extract::guide::extract_boss_guide;
use crate::extract::list::{extract_aspect_rows, extract_item_rows, extract_skill_rows};
use crate::model::{
    slugify, AspectRecord, BossRecord, Category, ItemRecord, ListReference, SkillRecord,
};
use crate::output::write_category;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Outcome of one category within a run.
#[derive(Debug)]
pub struct CategoryOutcome {
    pub category: Category,
    /// Records accumulated for the category.
    pub records: usize,
    /// Written file, `None` when the category produced no records.
    pub file: Option<PathBuf>,
}

/// Aggregate result of a harvest run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<CategoryOutcome>,
}

impl RunSummary {
    pub fn total_records(&self) -> usize {
        self.outcomes.iter().map(|o| o.records).sum()
    }
}

/// Launch a browser, harvest the requested categories, and close the browser
/// on every exit path. Browser launch failure is the run's only fatal error.
pub async fn run_harvest(
    categories: &[Category],
    limit: Option<usize>,
    config: HarvestConfig,
) -> Result<RunSummary> {
    let session = ChromiumSession::launch(&config)
        .await
        .context("browser launch failed")?;
    Harvester::new(Box::new(session), config)
        .run(categories, limit)
        .await
}

/// Drives one session through the requested categories.
pub struct Harvester {
    session: Box<dyn PageSession>,
    config: HarvestConfig,
}

impl Harvester {
    pub fn new(session: Box<dyn PageSession>, config: HarvestConfig) -> Self {
        Self { session, config }
    }

    /// Harvest the categories in the order given, then release the session.
    pub async fn run(mut self, categories: &[Category], limit: Option<usize>) -> Result<RunSummary> {
        let result = self.run_categories(categories, limit).await;
        if let Err(e) = self.session.close().await {
            warn!(error = %e, "failed to close browser session");
        }
        result
    }

    async fn run_categories(
        &mut self,
        categories: &[Category],
        limit: Option<usize>,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for &category in categories {
            info!(%category, "starting category");
            let outcome = match category {
                Category::Items => {
                    let records = self.harvest_items(limit).await;
                    self.finish(Category::Items, &records)?
                }
                Category::Skills => {
                    let records = self.harvest_skills(limit).await;
                    self.finish(Category::Skills, &records)?
                }
                Category::Aspects => {
                    let records = self.harvest_aspects(limit).await;
                    self.finish(Category::Aspects, &records)?
                }
                Category::Bosses => {
                    let records = self.harvest_bosses().await?;
                    self.finish(Category::Bosses, &records)?
                }
            };
            summary.outcomes.push(outcome);
        }
        Ok(summary)
    }

    /// Write the category file (if any records) and report the outcome.
    fn finish<T: serde::Serialize>(
        &self,
        category: Category,
        records: &[T],
    ) -> Result<CategoryOutcome> {
        if records.is_empty() {
            warn!(%category, "no records accumulated, leaving any previous file untouched");
        }
        let file = write_category(&self.config.output_dir, category, records)?;
        Ok(CategoryOutcome {
            category,
            records: records.len(),
            file,
        })
    }

    /// Load an index page and return its HTML, or `None` after exhausted
    /// retries. Zero-row pages are the extractor's concern, not this one's.
    async fn load_page(&mut self, url: &str) -> Option<String> {
        if !navigate_with_retry(self.session.as_mut(), url, &self.config).await {
            return None;
        }
        match self.session.html().await {
            Ok(html) => Some(html),
            Err(e) => {
                warn!(%url, error = %e, "failed to read page HTML");
                None
            }
        }
    }

    /// Current page URL for resolving relative hrefs, falling back to the
    /// requested URL.
    async fn page_url(&mut self, requested: &str) -> String {
        self.session
            .current_url()
            .await
            .ok()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| requested.to_string())
    }

    async fn pause_between_requests(&self) {
        tokio::time::sleep(self.config.delay_between_requests).await;
    }

    async fn pause_between_categories(&self) {
        tokio::time::sleep(self.config.delay_between_categories).await;
    }

    /// Items: two quality partitions, list pass then a capped detail pass.
    async fn harvest_items(&mut self, limit: Option<usize>) -> Vec<ItemRecord> {
        let cap = partition_cap(
            limit,
            QUALITY_PARTITIONS.len(),
            self.config.default_partition_cap,
        );
        let mut items = Vec::new();

        for partition in QUALITY_PARTITIONS {
            let index_url = self.config.url(partition.path);
            let Some(html) = self.load_page(&index_url).await else {
                error!(rarity = partition.rarity, "failed to load items index, skipping partition");
                continue;
            };
            let base = self.page_url(&index_url).await;
            let refs = extract_item_rows(&html, &base);
            info!(rarity = partition.rarity, count = refs.len(), "found items on index");

            if refs.is_empty() {
                warn!(rarity = partition.rarity, "no listview rows found, skipping detail pages");
                continue;
            }

            for item_ref in refs.iter().take(cap) {
                self.pause_between_requests().await;
                match self.harvest_one_item(item_ref, partition.rarity).await {
                    Some(record) => {
                        info!(name = %record.name, "scraped item");
                        items.push(record);
                    }
                    None => warn!(name = %item_ref.name, "skipping item"),
                }
            }

            self.pause_between_categories().await;
        }

        items
    }

    async fn harvest_one_item(
        &mut self,
        item_ref: &ListReference,
        rarity: &str,
    ) -> Option<ItemRecord> {
        let html = self.load_page(&item_ref.href).await?;
        let detail = extract_item_detail(&html);

        let item_type = if item_ref.item_type.is_empty() {
            "Unknown".to_string()
        } else {
            item_ref.item_type.clone()
        };
        let slot = if item_ref.slot.is_empty() {
            "Unknown".to_string()
        } else {
            item_ref.slot.clone()
        };

        Some(ItemRecord {
            id: item_ref.id.clone(),
            name: item_ref.name.clone(),
            category: derive_item_category(&item_type).to_string(),
            item_type,
            slot,
            rarity: rarity.to_string(),
            required_level: detail.required_level,
            item_power: detail.item_power,
            description: detail.description,
            affixes: detail.affixes,
            class: parse_class_requirement(&item_ref.class_req),
            icon_url: item_ref.icon_url.clone(),
        })
    }

    /// Skills: one index page per class, capped per class.
    async fn harvest_skills(&mut self, limit: Option<usize>) -> Vec<SkillRecord> {
        let cap = partition_cap(
            limit,
            SKILL_CLASSES.len(),
            self.config.default_partition_cap,
        );
        let mut skills = Vec::new();

        for class in SKILL_CLASSES {
            let index_url = self.config.url(&format!("/skills/{class}"));
            let Some(html) = self.load_page(&index_url).await else {
                error!(%class, "failed to load class skills page, skipping class");
                continue;
            };
            let base = self.page_url(&index_url).await;
            let refs = extract_skill_rows(&html, &base);
            info!(%class, count = refs.len(), "found skills on index");

            for skill_ref in refs.iter().take(cap) {
                self.pause_between_requests().await;
                let Some(html) = self.load_page(&skill_ref.href).await else {
                    warn!(name = %skill_ref.name, "skipping skill");
                    continue;
                };
                let detail = extract_skill_detail(&html);
                info!(name = %skill_ref.name, "scraped skill");
                skills.push(SkillRecord {
                    id: skill_ref.id.clone(),
                    name: skill_ref.name.clone(),
                    class: capitalize(class),
                    category: detail.category,
                    description: detail.description,
                    icon_url: String::new(),
                });
            }

            self.pause_between_categories().await;
        }

        skills
    }

    /// Aspects: a single index page.
    async fn harvest_aspects(&mut self, limit: Option<usize>) -> Vec<AspectRecord> {
        let cap = partition_cap(limit, 1, self.config.default_partition_cap);
        let mut aspects = Vec::new();

        let index_url = self.config.url("/aspects");
        let Some(html) = self.load_page(&index_url).await else {
            error!("failed to load aspects index");
            return aspects;
        };
        let base = self.page_url(&index_url).await;
        let refs = extract_aspect_rows(&html, &base);
        info!(count = refs.len(), "found aspects on index");

        for aspect_ref in refs.iter().take(cap) {
            self.pause_between_requests().await;
            let Some(html) = self.load_page(&aspect_ref.href).await else {
                warn!(name = %aspect_ref.name, "skipping aspect");
                continue;
            };
            let detail = extract_aspect_detail(&html);
            info!(name = %aspect_ref.name, "scraped aspect");
            aspects.push(AspectRecord {
                id: aspect_ref.id.clone(),
                name: aspect_ref.name.clone(),
                aspect_type: detail.aspect_type,
                description: detail.description,
                class: vec!["All Classes".to_string()],
                dungeon_location: detail.dungeon,
                icon_url: String::new(),
            });
        }

        aspects
    }

    /// Bosses: the fixed season roster, one guide page each. No list step
    /// and no limit — a boss whose guide never loads still yields a record
    /// with its statically known identity fields.
    async fn harvest_bosses(&mut self) -> Result<Vec<BossRecord>> {
        let roster = boss_roster()?;
        let mut bosses = Vec::new();

        for entry in roster {
            self.pause_between_requests().await;
            let guide_url = self.config.url(&entry.guide_path);

            let mut record = BossRecord {
                id: slugify(&entry.name),
                name: entry.name.clone(),
                boss_type: entry.boss_type.clone(),
                tier: entry.tier.clone(),
                location: None,
                description: None,
                summoning_materials: None,
                drops: None,
                guide_url: guide_url.clone(),
            };

            match self.load_page(&guide_url).await {
                Some(html) => {
                    let guide = extract_boss_guide(&html, self.config.max_drops_per_boss);
                    record.location = guide.location;
                    record.description = guide.description;
                    record.summoning_materials =
                        (!guide.materials.is_empty()).then_some(guide.materials);
                    record.drops = (!guide.drops.is_empty()).then_some(guide.drops);
                    info!(name = %entry.name, "scraped boss guide");
                }
                None => {
                    warn!(name = %entry.name, "guide unreachable, keeping identity-only record");
                }
            }

            bosses.push(record);
        }

        Ok(bosses)
    }
}

/// Capitalize a lowercase class token for output ("barbarian" → "Barbarian").
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
