//! Index-page extraction: listview rows and entity anchors.

use super::element_text;
use crate::config::NON_EQUIPMENT_TYPES;
use crate::model::{slugify, ListReference};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;

fn trailing_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-(\d+)$").expect("trailing id regex is valid"))
}

fn icon_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"url\(['"]?(.+?)['"]?\)"#).expect("icon url regex is valid"))
}

/// Resolve an href against the page URL. Falls back to the raw href when
/// either side fails to parse.
fn resolve_href(base_url: &str, href: &str) -> String {
    url::Url::parse(base_url)
        .ok()
        .and_then(|base| base.join(href).ok())
        .map(|u| u.to_string())
        .unwrap_or_else(|| href.to_string())
}

/// Slug of a detail URL's last path segment, used as the id when the URL
/// carries no numeric suffix. Unlike a row position, the slug stays unique
/// across the partition pages that feed one output file.
fn slug_id(href: &str, name: &str) -> String {
    let segment = href.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    let slug = slugify(segment);
    if slug.is_empty() {
        slugify(name)
    } else {
        slug
    }
}

/// Entity id from the trailing `-<digits>` of a detail URL, or the URL slug
/// when it carries none.
fn id_from_href(href: &str, name: &str) -> String {
    trailing_id_re()
        .captures(href)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| slug_id(href, name))
}

/// Extract item references from a listview index page.
///
/// Rows whose type matches the non-equipment denylist are dropped, rows
/// without a name anchor are skipped, and names are deduplicated in document
/// order. Zero rows is a valid outcome — the markup may have changed.
pub fn extract_item_rows(html: &str, base_url: &str) -> Vec<ListReference> {
    let document = Html::parse_document(html);
    let row_sel = Selector::parse(".listview-row").unwrap();
    let name_sel = Selector::parse("a.listview-cleartext").unwrap();
    let icon_sel = Selector::parse(".iconmedium ins").unwrap();
    let cell_sel = Selector::parse("td").unwrap();

    let mut seen = HashSet::new();
    let mut refs = Vec::new();

    for row in document.select(&row_sel) {
        let Some(link) = row.select(&name_sel).next() else {
            continue;
        };
        let name = element_text(&link);
        if name.is_empty() {
            continue;
        }

        let cells: Vec<String> = row.select(&cell_sel).map(|c| element_text(&c)).collect();
        let item_type = cells.get(2).cloned().unwrap_or_default();
        if NON_EQUIPMENT_TYPES.iter().any(|t| item_type.contains(t)) {
            continue;
        }
        if !seen.insert(name.clone()) {
            continue;
        }

        let href = resolve_href(base_url, link.value().attr("href").unwrap_or(""));
        let id = id_from_href(&href, &name);

        let icon_url = row
            .select(&icon_sel)
            .next()
            .and_then(|ins| ins.value().attr("style"))
            .and_then(|style| icon_url_re().captures(style))
            .map(|c| c[1].to_string())
            .unwrap_or_default();

        let slot = cells.get(3).cloned().unwrap_or_default();
        let mut class_req = cells.get(4).cloned().unwrap_or_default();
        if class_req.is_empty() {
            class_req = "All Classes".to_string();
        }

        refs.push(ListReference {
            id,
            name,
            href,
            icon_url,
            item_type,
            slot,
            class_req,
        });
    }

    refs
}

/// Extract references from anchors whose href contains the given entity
/// path segment (`/skill/` or `/aspect/`), deduplicated by name.
fn extract_anchor_rows(html: &str, base_url: &str, segment: &str) -> Vec<ListReference> {
    let document = Html::parse_document(html);
    let sel = Selector::parse(&format!(r#"a[href*="{segment}"]"#)).unwrap();
    let id_re = Regex::new(&format!(r"{}[^/]+-(\d+)", regex::escape(segment)))
        .expect("entity id regex is valid");

    let mut seen = HashSet::new();
    let mut refs = Vec::new();

    for link in document.select(&sel) {
        let name = element_text(&link);
        if name.is_empty() || !seen.insert(name.clone()) {
            continue;
        }
        let href = resolve_href(base_url, link.value().attr("href").unwrap_or(""));
        let id = id_re
            .captures(&href)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| slug_id(&href, &name));

        refs.push(ListReference {
            id,
            name,
            href,
            icon_url: String::new(),
            item_type: String::new(),
            slot: String::new(),
            class_req: String::new(),
        });
    }

    refs
}

/// Extract skill references from a class skills page.
pub fn extract_skill_rows(html: &str, base_url: &str) -> Vec<ListReference> {
    extract_anchor_rows(html, base_url, "/skill/")
}

/// Extract aspect references from the aspects index page.
pub fn extract_aspect_rows(html: &str, base_url: &str) -> Vec<ListReference> {
    extract_anchor_rows(html, base_url, "/aspect/")
}
