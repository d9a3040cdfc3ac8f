//! The indexing pass.
//!
//! Scans the corpus directory, fingerprints each workflow file, and runs
//! changed files through extraction and storage. Per-file failures are
//! counted and logged; they never abort the pass.

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde_json::Value;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use crate::config::{Config, CorpusConfig};
use crate::db;
use crate::extract::extract_workflow;
use crate::fingerprint::fingerprint_file;
use crate::models::IndexReport;
use crate::store;

enum FileOutcome {
    Processed,
    Skipped,
}

/// Run one indexing pass over the corpus.
///
/// A missing corpus directory yields a zero report rather than an error, so
/// a fresh deployment can start serving before its first workflow lands.
pub async fn index_corpus(
    pool: &SqlitePool,
    corpus: &CorpusConfig,
    force: bool,
) -> Result<IndexReport> {
    let root = &corpus.root;
    if !root.is_dir() {
        warn!(root = %root.display(), "corpus directory does not exist, nothing to index");
        return Ok(IndexReport::default());
    }

    let include_set = build_globset(&corpus.include_globs)?;
    let exclude_set = build_globset(&corpus.exclude_globs)?;

    let mut report = IndexReport::default();

    let mut files: Vec<(PathBuf, String)> = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        // An unreadable entry (broken symlink, permission error mid-walk)
        // counts as one error; the rest of the corpus is still indexed.
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "cannot read corpus entry");
                report.errors += 1;
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_string();

        if exclude_set.is_match(&rel_str) {
            continue;
        }
        if !include_set.is_match(&rel_str) {
            continue;
        }

        files.push((path.to_path_buf(), rel_str));
    }

    // Sort for deterministic ordering
    files.sort_by(|a, b| a.1.cmp(&b.1));

    for (path, filename) in &files {
        match index_file(pool, path, filename, force).await {
            Ok(FileOutcome::Processed) => report.processed += 1,
            Ok(FileOutcome::Skipped) => report.skipped += 1,
            Err(e) => {
                warn!(file = %filename, error = %e, "failed to index workflow file");
                report.errors += 1;
            }
        }
    }

    Ok(report)
}

async fn index_file(
    pool: &SqlitePool,
    path: &Path,
    filename: &str,
    force: bool,
) -> Result<FileOutcome> {
    let (hash, file_size) = fingerprint_file(path)?;

    if !force && store::stored_hash(pool, filename).await?.as_deref() == Some(hash.as_str()) {
        return Ok(FileOutcome::Skipped);
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("not readable as UTF-8 text: {}", path.display()))?;
    let doc: Value = serde_json::from_str(&text)
        .with_context(|| format!("invalid workflow JSON: {}", path.display()))?;

    let meta = extract_workflow(filename, &doc);
    let analyzed_at = chrono::Utc::now().to_rfc3339();
    store::upsert_workflow(pool, &meta, &hash, file_size, &analyzed_at).await?;

    Ok(FileOutcome::Processed)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// CLI entry point — runs a pass and prints the report.
pub async fn run_index(config: &Config, force: bool) -> Result<()> {
    let pool = db::connect(config).await?;
    crate::migrate::run_migrations(&pool).await?;

    let report = index_corpus(&pool, &config.corpus, force).await?;

    println!("index {}", config.corpus.root.display());
    println!("  processed: {}", report.processed);
    println!("  skipped: {}", report.skipped);
    println!("  errors: {}", report.errors);
    println!("ok");

    pool.close().await;
    Ok(())
}
