//! Workflow metadata extraction.
//!
//! Turns a parsed workflow document (a JSON graph of nodes and connections)
//! into catalog metadata: a resolved display name, trigger classification,
//! the set of external integrations, a complexity tier, and a generated
//! one-sentence description.
//!
//! Extraction is heuristic and total: any JSON document that parses yields a
//! [`WorkflowMeta`]. Missing or oddly-typed fields fall back to defaults
//! rather than failing, so one malformed field never loses a whole file.

use serde_json::Value;

use crate::catalog;
use crate::models::{Complexity, TriggerType, WorkflowMeta};

/// Extract catalog metadata from a parsed workflow document.
pub fn extract_workflow(filename: &str, doc: &Value) -> WorkflowMeta {
    let empty = Vec::new();
    let nodes = doc.get("nodes").and_then(Value::as_array).unwrap_or(&empty);

    let name = resolve_name(filename, doc);
    let (trigger_type, integrations) = classify_nodes(nodes);
    let node_count = nodes.len();
    let complexity = complexity_for(node_count);
    let description = generate_description(&name, node_count, trigger_type, &integrations);

    WorkflowMeta {
        filename: filename.to_string(),
        name,
        workflow_id: field_as_string(doc, "id"),
        active: doc.get("active").and_then(Value::as_bool).unwrap_or(false),
        description,
        trigger_type,
        complexity,
        node_count: node_count as i64,
        integrations,
        tags: doc
            .get("tags")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new())),
        created_at: field_as_string(doc, "createdAt"),
        updated_at: field_as_string(doc, "updatedAt"),
    }
}

fn field_as_string(doc: &Value, key: &str) -> String {
    match doc.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

// ============ Name resolution ============

/// Prefer the declared name when it carries information; otherwise derive a
/// readable name from the filename.
///
/// A declared name is meaningful when it is non-empty, differs from the
/// filename stem, and is not an editor placeholder (`My workflow…`).
fn resolve_name(filename: &str, doc: &Value) -> String {
    // The filename is a corpus-relative path; the stem comes from the
    // basename so directory components never leak into display names.
    let basename = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    let stem = basename.strip_suffix(".json").unwrap_or(basename);
    let declared = doc
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("");

    if !declared.is_empty() && declared != stem && !declared.starts_with("My workflow") {
        return declared.to_string();
    }

    format_name_from_stem(stem)
}

/// `0001_slack_alert_sync.json` style stems become `Slack Alert Sync`:
/// a leading ordinal part is dropped, the rest is title-cased with a few
/// canonical-casing overrides.
fn format_name_from_stem(stem: &str) -> String {
    let mut parts: Vec<&str> = stem.split('_').collect();

    if parts.len() > 1 && !parts[0].is_empty() && parts[0].bytes().all(|b| b.is_ascii_digit()) {
        parts.remove(0);
    }

    let rendered: Vec<String> = parts.iter().map(|part| render_name_part(part)).collect();
    rendered.join(" ")
}

fn render_name_part(part: &str) -> String {
    match part.to_lowercase().as_str() {
        "http" => "HTTP".to_string(),
        "api" => "API".to_string(),
        "webhook" => "Webhook".to_string(),
        "automation" => "Automation".to_string(),
        "automate" => "Automate".to_string(),
        "scheduled" => "Scheduled".to_string(),
        "triggered" => "Triggered".to_string(),
        "manual" => "Manual".to_string(),
        _ => capitalize(part),
    }
}

/// First char uppercased, the rest lowercased.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

// ============ Trigger classification & integration detection ============

/// Walk the node graph once, classifying the trigger and collecting
/// integrations in node order (deduplicated, order preserved).
///
/// Trigger classification escalates and never downgrades: Webhook dominates
/// Scheduled dominates Manual, whatever order the nodes appear in. A generic
/// trigger node (anything with `trigger` in its type except manual triggers)
/// escalates Manual to Webhook. After the walk, a workflow with more than 10
/// nodes spanning more than 3 integrations is reclassified as Complex.
fn classify_nodes(nodes: &[Value]) -> (TriggerType, Vec<String>) {
    let mut trigger = TriggerType::Manual;
    let mut integrations: Vec<String> = Vec::new();

    for node in nodes {
        let node_type = node.get("type").and_then(Value::as_str).unwrap_or("");
        let node_name = node
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_lowercase();
        let type_lower = node_type.to_lowercase();

        if type_lower.contains("webhook") || node_name.contains("webhook") {
            trigger = TriggerType::Webhook;
        } else if (type_lower.contains("cron") || type_lower.contains("schedule"))
            && trigger != TriggerType::Webhook
        {
            trigger = TriggerType::Scheduled;
        } else if type_lower.contains("trigger")
            && trigger == TriggerType::Manual
            && !type_lower.contains("manual")
        {
            trigger = TriggerType::Webhook;
        }

        let mut service = detect_service_from_type(node_type);

        // A service hint in the node's display name supersedes the
        // type-derived guess. First table entry wins.
        for (key, value) in catalog::SERVICE_TABLE {
            if let Some(display) = value {
                if node_name.contains(key) {
                    service = Some((*display).to_string());
                    break;
                }
            }
        }

        if let Some(name) = service {
            if !name.is_empty() && name != "None" && !integrations.contains(&name) {
                integrations.push(name);
            }
        }
    }

    if nodes.len() > 10 && integrations.len() > 3 {
        trigger = TriggerType::Complex;
    }

    (trigger, integrations)
}

/// Derive a service name from the node type alone.
///
/// `n8n-nodes-base.` and `@n8n/` namespaces are stripped down to a
/// normalized key (lowercased, `trigger` removed) and looked up in the
/// catalog; unknown keys fall back to a title-cased rendering. Community
/// node types (anything with a dash) are scanned for a handful of services
/// that commonly publish custom nodes.
fn detect_service_from_type(node_type: &str) -> Option<String> {
    if let Some(rest) = node_type.strip_prefix("n8n-nodes-base.") {
        let key = rest.to_lowercase().replace("trigger", "");
        return resolve_service_key(&key);
    }

    if node_type.starts_with("@n8n/") {
        let raw = match node_type.rsplit_once('.') {
            Some((_, last)) => last.to_lowercase(),
            None => node_type.to_lowercase(),
        };
        let key = raw.replace("trigger", "");
        return resolve_service_key(&key);
    }

    if node_type.contains('-') {
        for part in node_type.to_lowercase().split('.') {
            if part.contains("youtube") {
                return Some("YouTube".to_string());
            } else if part.contains("telegram") {
                return Some("Telegram".to_string());
            } else if part.contains("whatsapp") {
                return Some("WhatsApp".to_string());
            } else if part.contains("discord") {
                return Some("Discord".to_string());
            }
        }
    }

    None
}

fn resolve_service_key(key: &str) -> Option<String> {
    match catalog::lookup_service(key) {
        Some(Some(name)) => Some(name.to_string()),
        Some(None) => None,
        None => {
            if key.is_empty() {
                None
            } else {
                Some(title_case(key))
            }
        }
    }
}

/// Uppercase the first letter of each alphabetic run, lowercase the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

// ============ Complexity ============

fn complexity_for(node_count: usize) -> Complexity {
    if node_count <= 5 {
        Complexity::Low
    } else if node_count <= 15 {
        Complexity::Medium
    } else {
        Complexity::High
    }
}

// ============ Description generation ============

/// One-sentence summary: trigger clause, integration clause (first three by
/// node order), a purpose guessed from the name, and a size tail.
fn generate_description(
    name: &str,
    node_count: usize,
    trigger: TriggerType,
    integrations: &[String],
) -> String {
    let mut desc = match trigger {
        TriggerType::Webhook => "Webhook-triggered automation that".to_string(),
        TriggerType::Scheduled => "Scheduled automation that".to_string(),
        TriggerType::Complex => "Complex multi-step automation that".to_string(),
        TriggerType::Manual => "Manual workflow that".to_string(),
    };

    if !integrations.is_empty() {
        let main: Vec<&str> = integrations.iter().take(3).map(String::as_str).collect();
        match main.len() {
            1 => desc.push_str(&format!(" integrates with {}", main[0])),
            2 => desc.push_str(&format!(" connects {} and {}", main[0], main[1])),
            _ => desc.push_str(&format!(
                " orchestrates {} and {}",
                main[..main.len() - 1].join(", "),
                main[main.len() - 1]
            )),
        }
    }

    let name_lower = name.to_lowercase();
    if name_lower.contains("create") {
        desc.push_str(" to create new records");
    } else if name_lower.contains("update") {
        desc.push_str(" to update existing data");
    } else if name_lower.contains("sync") {
        desc.push_str(" to synchronize data");
    } else if name_lower.contains("notification") || name_lower.contains("alert") {
        desc.push_str(" for notifications and alerts");
    } else if name_lower.contains("backup") {
        desc.push_str(" for data backup operations");
    } else if name_lower.contains("monitor") {
        desc.push_str(" for monitoring and reporting");
    } else {
        desc.push_str(" for data processing");
    }

    desc.push_str(&format!(". Uses {} nodes", node_count));
    if integrations.len() > 3 {
        desc.push_str(&format!(
            " and integrates with {} services",
            integrations.len()
        ));
    }
    desc.push('.');
    desc
}
