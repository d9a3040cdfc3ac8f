//! Workflow detail retrieval by filename.
//!
//! Fetches a stored record together with the raw workflow JSON from the
//! corpus. Used by both the `fdx get` CLI command and the detail/download
//! HTTP endpoints.

use anyhow::{bail, Result};
use serde_json::Value;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::db;
use crate::models::WorkflowRecord;
use crate::store;

/// Fetch one stored record by filename.
pub async fn get_workflow_record(
    pool: &SqlitePool,
    filename: &str,
) -> Result<Option<WorkflowRecord>> {
    let row = sqlx::query("SELECT * FROM workflows WHERE filename = ?")
        .bind(filename)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(store::record_from_row))
}

/// Resolve a record's source file under the corpus root.
///
/// Rejects path traversal: the stored filename is a relative corpus path and
/// must stay inside the root. `None` means the name cannot point into the
/// corpus at all.
pub fn corpus_file_path(corpus_root: &Path, filename: &str) -> Option<PathBuf> {
    if filename.contains("..") || filename.starts_with('/') || filename.starts_with('\\') {
        return None;
    }
    Some(corpus_root.join(filename))
}

/// Fetch a record plus the raw workflow document from the corpus.
///
/// `Ok(None)` covers every missing-resource case (no record, rejected path,
/// unreadable file); `Err` is reserved for database failures.
pub async fn get_workflow_detail(
    pool: &SqlitePool,
    corpus_root: &Path,
    filename: &str,
) -> Result<Option<(WorkflowRecord, Value)>> {
    let Some(record) = get_workflow_record(pool, filename).await? else {
        return Ok(None);
    };

    let Some(path) = corpus_file_path(corpus_root, filename) else {
        return Ok(None);
    };
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(_) => return Ok(None),
    };
    let raw: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

    Ok(Some((record, raw)))
}

/// CLI entry point — fetches a workflow and prints it.
pub async fn run_get(config: &Config, filename: &str) -> Result<()> {
    let pool = db::connect(config).await?;
    let result = get_workflow_detail(&pool, &config.corpus.root, filename).await;
    pool.close().await;
    let Some((record, raw)) = result? else {
        bail!("workflow not found: {}", filename);
    };

    println!("--- Workflow ---");
    println!("id:           {}", record.id);
    println!("filename:     {}", record.filename);
    println!("name:         {}", record.name);
    println!("active:       {}", record.active);
    println!("trigger:      {}", record.trigger_type);
    println!("complexity:   {}", record.complexity);
    println!("nodes:        {}", record.node_count);
    println!("integrations: {}", record.integrations.join(", "));
    println!("tags:         {}", record.tags.join(", "));
    if let Some(ref created) = record.created_at {
        println!("created_at:   {}", created);
    }
    if let Some(ref updated) = record.updated_at {
        println!("updated_at:   {}", updated);
    }
    println!("analyzed_at:  {}", record.analyzed_at);
    println!();
    println!("--- Description ---");
    println!("{}", record.description);
    println!();
    println!("--- Source ---");
    println!("{}", serde_json::to_string_pretty(&raw)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_path_joins_relative_names() {
        let path = corpus_file_path(Path::new("/srv/workflows"), "0001_sync.json").unwrap();
        assert_eq!(path, PathBuf::from("/srv/workflows/0001_sync.json"));
    }

    #[test]
    fn test_corpus_path_rejects_traversal() {
        assert!(corpus_file_path(Path::new("/srv/workflows"), "../etc/passwd").is_none());
        assert!(corpus_file_path(Path::new("/srv/workflows"), "/etc/passwd").is_none());
    }
}
