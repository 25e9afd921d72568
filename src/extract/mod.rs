//! Selector- and regex-based extraction over raw page HTML.
//!
//! Every function here is pure: it takes the page's outer HTML as a string
//! and returns plain data. No browser handle ever crosses this boundary, so
//! the site-specific heuristics can be unit tested against fixtures and
//! swapped without touching the orchestration.
//!
//! All extraction is best-effort against unversioned third-party markup:
//! a missing match yields a documented default or an empty collection,
//! never an error.

pub mod detail;
pub mod guide;
pub mod list;

use scraper::{ElementRef, Html};

/// Visible text of one element: text nodes joined by spaces, trimmed.
pub(crate) fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ").trim().to_string()
}

/// Visible text of the whole document.
pub(crate) fn page_text(document: &Html) -> String {
    document
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
}
