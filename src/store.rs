//! Workflow record storage.
//!
//! Every write keeps the `workflows` row and its `workflows_fts` entry in
//! step inside one transaction, so the query path never observes the record
//! table and the text index diverging.

use anyhow::Result;
use serde_json::Value;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::models::{WorkflowMeta, WorkflowRecord};

/// Insert or update a record by filename, relinking its text-index entry.
///
/// The `ON CONFLICT(filename) DO UPDATE` form keeps the surrogate id stable
/// across re-indexes; a delete-and-reinsert would reassign it.
pub async fn upsert_workflow(
    pool: &SqlitePool,
    meta: &WorkflowMeta,
    content_hash: &str,
    file_size: i64,
    analyzed_at: &str,
) -> Result<i64> {
    let integrations_json = serde_json::to_string(&meta.integrations)?;
    let tags_json = meta.tags.to_string();
    let integrations_text = meta.integrations.join(" ");
    let tags_text = normalize_tags(&meta.tags).join(" ");

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO workflows (
            filename, name, workflow_id, active, description, trigger_type,
            complexity, node_count, integrations, tags, created_at, updated_at,
            content_hash, file_size, analyzed_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(filename) DO UPDATE SET
            name = excluded.name,
            workflow_id = excluded.workflow_id,
            active = excluded.active,
            description = excluded.description,
            trigger_type = excluded.trigger_type,
            complexity = excluded.complexity,
            node_count = excluded.node_count,
            integrations = excluded.integrations,
            tags = excluded.tags,
            created_at = excluded.created_at,
            updated_at = excluded.updated_at,
            content_hash = excluded.content_hash,
            file_size = excluded.file_size,
            analyzed_at = excluded.analyzed_at
        "#,
    )
    .bind(&meta.filename)
    .bind(&meta.name)
    .bind(&meta.workflow_id)
    .bind(meta.active)
    .bind(&meta.description)
    .bind(meta.trigger_type.as_str())
    .bind(meta.complexity.as_str())
    .bind(meta.node_count)
    .bind(&integrations_json)
    .bind(&tags_json)
    .bind(&meta.created_at)
    .bind(&meta.updated_at)
    .bind(content_hash)
    .bind(file_size)
    .bind(analyzed_at)
    .execute(&mut *tx)
    .await?;

    let id: i64 = sqlx::query_scalar("SELECT id FROM workflows WHERE filename = ?")
        .bind(&meta.filename)
        .fetch_one(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM workflows_fts WHERE workflow_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO workflows_fts (workflow_id, filename, name, description, integrations, tags)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(&meta.filename)
    .bind(&meta.name)
    .bind(&meta.description)
    .bind(&integrations_text)
    .bind(&tags_text)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(id)
}

/// Remove a record and its text-index entry. Returns false when no record
/// with that filename exists.
pub async fn delete_workflow(pool: &SqlitePool, filename: &str) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let id: Option<i64> = sqlx::query_scalar("SELECT id FROM workflows WHERE filename = ?")
        .bind(filename)
        .fetch_optional(&mut *tx)
        .await?;

    let Some(id) = id else {
        return Ok(false);
    };

    sqlx::query("DELETE FROM workflows_fts WHERE workflow_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM workflows WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}

/// Stored content hash for a filename, if the record exists.
pub async fn stored_hash(pool: &SqlitePool, filename: &str) -> Result<Option<String>> {
    let hash: Option<String> =
        sqlx::query_scalar("SELECT content_hash FROM workflows WHERE filename = ?")
            .bind(filename)
            .fetch_optional(pool)
            .await?;
    Ok(hash)
}

/// Map a `workflows` row to the record shape the query engine returns.
pub fn record_from_row(row: &SqliteRow) -> WorkflowRecord {
    let integrations_json: String = row.get("integrations");
    let integrations: Vec<String> =
        serde_json::from_str(&integrations_json).unwrap_or_default();

    let tags_json: String = row.get("tags");
    let tags_raw: Value = serde_json::from_str(&tags_json).unwrap_or(Value::Array(Vec::new()));

    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    WorkflowRecord {
        id: row.get("id"),
        filename: row.get("filename"),
        name: row.get("name"),
        workflow_id: row.get("workflow_id"),
        active: row.get("active"),
        description: row.get("description"),
        trigger_type: row.get("trigger_type"),
        complexity: row.get("complexity"),
        node_count: row.get("node_count"),
        integrations,
        tags: normalize_tags(&tags_raw),
        created_at: if created_at.is_empty() {
            None
        } else {
            Some(created_at)
        },
        updated_at: if updated_at.is_empty() {
            None
        } else {
            Some(updated_at)
        },
        analyzed_at: row.get("analyzed_at"),
    }
}

/// Normalize a stored tag array to display strings.
///
/// An object tag yields its `name` field if present, else the string form of
/// its `id` field, else `"tag"`; a plain value yields its string form.
pub fn normalize_tags(raw: &Value) -> Vec<String> {
    match raw {
        Value::Array(items) => items.iter().map(normalize_tag).collect(),
        _ => Vec::new(),
    }
}

fn normalize_tag(tag: &Value) -> String {
    match tag {
        Value::Object(map) => {
            if let Some(name) = map.get("name") {
                value_to_display(name)
            } else if let Some(id) = map.get("id") {
                value_to_display(id)
            } else {
                "tag".to_string()
            }
        }
        other => value_to_display(other),
    }
}

fn value_to_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
