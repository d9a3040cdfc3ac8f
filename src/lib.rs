//! # Flowdex
//!
//! A SQLite-backed catalog and full-text search engine for n8n workflow
//! exports.
//!
//! Flowdex scans a directory of workflow JSON files, extracts browsable
//! metadata from each node graph (trigger classification, integrations,
//! complexity, a generated description), and keeps the records in a SQLite
//! table with a synchronized FTS5 index. Search, category lookup, and
//! aggregate statistics are served over a CLI and a JSON HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌─────────────┐   ┌───────────┐
//! │  Corpus   │──▶│  Indexer     │──▶│  SQLite    │
//! │ *.json    │   │ hash+extract│   │ rows+FTS5 │
//! └───────────┘   └─────────────┘   └────┬──────┘
//!                                        │
//!                     ┌──────────────────┤
//!                     ▼                  ▼
//!                ┌──────────┐      ┌──────────┐
//!                │   CLI    │      │   HTTP   │
//!                │  (fdx)   │      │  (axum)  │
//!                └──────────┘      └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! fdx init                      # create database
//! fdx index                     # index the workflow corpus
//! fdx search "slack alerts"
//! fdx stats
//! fdx serve                     # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`fingerprint`] | Content hashing for change detection |
//! | [`catalog`] | Static service-name and category tables |
//! | [`extract`] | Metadata extraction from node graphs |
//! | [`store`] | Record storage with synchronized FTS |
//! | [`indexer`] | The indexing pass |
//! | [`search`] | Free-text and category search |
//! | [`stats`] | Aggregate statistics |
//! | [`get`] | Detail retrieval |
//! | [`server`] | JSON HTTP API |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod catalog;
pub mod config;
pub mod db;
pub mod extract;
pub mod fingerprint;
pub mod get;
pub mod indexer;
pub mod migrate;
pub mod models;
pub mod search;
pub mod server;
pub mod stats;
pub mod store;

pub use indexer::index_corpus;
pub use models::{CorpusStats, IndexReport, WorkflowRecord};
pub use search::{search_by_category, search_workflows};
pub use stats::collect_stats;
pub use store::delete_workflow;
