//! Wealth Advisory Orchestrator
//!
//! Turns one client submission (profile, portfolio, tax details, goals)
//! into a six-section advisory report:
//! - each section is produced by an independent LLM-backed agent,
//! - three agents augment their prompts with web-search snippets,
//! - failed or empty sections render as deterministic local fallback text,
//! - the client record is persisted best-effort to a document store with a
//!   Postgres fallback.

pub mod agents;
pub mod api;
pub mod config;
pub mod error;
pub mod fallback;
pub mod gemini;
pub mod models;
pub mod orchestrator;
pub mod report;
pub mod search;
pub mod storage;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use orchestrator::Orchestrator;
