//! Core data models used throughout Flowdex.
//!
//! These types represent the workflow metadata that flows through the
//! indexing pipeline and the records returned by the query engine.

use serde::Serialize;
use std::collections::BTreeMap;

/// What initiates a workflow's execution.
///
/// `Complex` is an override applied after node analysis when a workflow is
/// both large (more than 10 nodes) and broad (more than 3 integrations).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TriggerType {
    Manual,
    Webhook,
    Scheduled,
    Complex,
}

impl TriggerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerType::Manual => "Manual",
            TriggerType::Webhook => "Webhook",
            TriggerType::Scheduled => "Scheduled",
            TriggerType::Complex => "Complex",
        }
    }
}

/// Coarse size bucket derived from node count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Low => "low",
            Complexity::Medium => "medium",
            Complexity::High => "high",
        }
    }
}

/// Metadata extracted from a single workflow document, before storage.
///
/// `tags` carries the source file's tag array verbatim; it is normalized to
/// display strings only on the read path.
#[derive(Debug, Clone)]
pub struct WorkflowMeta {
    pub filename: String,
    pub name: String,
    pub workflow_id: String,
    pub active: bool,
    pub description: String,
    pub trigger_type: TriggerType,
    pub complexity: Complexity,
    pub node_count: i64,
    pub integrations: Vec<String>,
    pub tags: serde_json::Value,
    pub created_at: String,
    pub updated_at: String,
}

/// A stored workflow record as returned by the query engine.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowRecord {
    pub id: i64,
    pub filename: String,
    pub name: String,
    pub workflow_id: String,
    pub active: bool,
    pub description: String,
    pub trigger_type: String,
    pub complexity: String,
    pub node_count: i64,
    pub integrations: Vec<String>,
    pub tags: Vec<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub analyzed_at: String,
}

/// Outcome of one indexing pass over the corpus.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct IndexReport {
    pub processed: u64,
    pub skipped: u64,
    pub errors: u64,
}

/// Aggregate statistics over the whole catalog.
///
/// Group-by maps use `BTreeMap` so serialized output is stable across runs.
#[derive(Debug, Clone, Serialize)]
pub struct CorpusStats {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    pub triggers: BTreeMap<String, i64>,
    pub complexity: BTreeMap<String, i64>,
    pub total_nodes: i64,
    pub unique_integrations: i64,
    pub last_indexed: String,
}
