//! # Error Taxonomy
//!
//! Failure classes surfaced by the engine. Dependency violations from the
//! reasoning step never appear here - the dispatcher silently downgrades them
//! to a clarifying question before they reach the caller.

use thiserror::Error;

/// Failures the engine can surface to a caller.
#[derive(Debug, Error)]
pub enum CoreError {
    /// One or more required context artifacts are absent, unreadable, or empty.
    /// Surfaced as an ask_user-shaped reply, not a hard error.
    #[error("context artifacts missing or unreadable: {}", .types.join(", "))]
    ContextMissing { types: Vec<String> },

    /// The completion or generation backend failed after exhausting retries.
    #[error("capability failure: {0}")]
    Capability(String),

    /// The reasoning step produced a decision the system cannot honor.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The decision named a skill that is not in the catalog.
    #[error("unknown skill: {0}")]
    UnknownSkill(String),

    /// The skill catalog violates its own invariants.
    #[error("invalid catalog: {0}")]
    Catalog(String),

    /// The state store could not load or persist a snapshot.
    #[error("state store failure: {0}")]
    Storage(#[source] anyhow::Error),

    /// Artifact write failed at the execution boundary.
    #[error("artifact io failure: {0}")]
    ArtifactIo(#[source] std::io::Error),
}
