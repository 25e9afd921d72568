//! Category JSON writer.
//!
//! Each category writes once, at the end of its processing. An empty record
//! set writes nothing, so a previously harvested file survives a bad run.
//! Writes go through a temp file plus rename in the same directory — the
//! front end reads these files as static assets and must never observe a
//! half-written array.

use crate::model::Category;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Write a category's records as a pretty-printed JSON array.
///
/// Returns the written path, or `None` when `records` is empty and the
/// write was skipped.
pub fn write_category<T: Serialize>(
    out_dir: &Path,
    category: Category,
    records: &[T],
) -> Result<Option<PathBuf>> {
    if records.is_empty() {
        return Ok(None);
    }

    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output dir {}", out_dir.display()))?;

    let path = out_dir.join(category.output_file());
    let tmp = out_dir.join(format!("{}.tmp", category.output_file()));

    let json = serde_json::to_string_pretty(records)?;
    fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, &path)
        .with_context(|| format!("failed to move {} into place", path.display()))?;

    info!(
        category = %category,
        records = records.len(),
        path = %path.display(),
        "wrote category file"
    );
    Ok(Some(path))
}
