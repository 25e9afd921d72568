//! Browser session abstraction for page loading.
//!
//! Defines the `PageSession` trait that abstracts over the browser engine
//! (currently Chromium via chromiumoxide). The orchestrator holds exactly one
//! session for a whole run and reuses it serially across all navigations;
//! tests substitute a scripted in-memory session.

pub mod chromium;

use crate::config::HarvestConfig;
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while bringing up a browser session. Launch failure is the
/// only fatal class in the pipeline; everything downstream degrades instead.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no Chromium binary found (set D4HARVEST_CHROMIUM_PATH or install google-chrome)")]
    ChromiumNotFound,
    #[error("failed to launch Chromium: {0}")]
    Launch(String),
}

/// A single browser page (tab) the harvester drives.
#[async_trait]
pub trait PageSession: Send {
    /// Navigate to a URL, waiting for the load to settle.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Best-effort wait for the site's client-side `Listview` hook.
    ///
    /// Returns false on timeout; the page may still carry usable static
    /// markup, so callers treat this as advisory only.
    async fn wait_for_listview(&self, timeout: Duration) -> bool;

    /// Outer HTML of the current document.
    async fn html(&self) -> Result<String>;

    /// URL of the current document after any redirects.
    async fn current_url(&self) -> Result<String>;

    /// Release the session and its browser process.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Attempt to load a URL up to `config.max_retries` times with a fixed
/// backoff between attempts.
///
/// Failure is a value, not an error: the caller decides whether to skip the
/// reference, the partition, or the category.
pub async fn navigate_with_retry(
    session: &mut dyn PageSession,
    url: &str,
    config: &HarvestConfig,
) -> bool {
    for attempt in 1..=config.max_retries {
        debug!(%url, attempt, "navigating");
        match session.navigate(url, config.navigation_timeout).await {
            Ok(()) => {
                if !session.wait_for_listview(config.listview_timeout).await {
                    debug!(%url, "Listview hook not detected, continuing with static markup");
                }
                return true;
            }
            Err(e) => {
                warn!(
                    %url,
                    attempt,
                    max_attempts = config.max_retries,
                    error = %e,
                    "navigation failed"
                );
                if attempt < config.max_retries {
                    tokio::time::sleep(config.retry_delay).await;
                }
            }
        }
    }
    false
}
