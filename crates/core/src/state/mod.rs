//! # Session State
//!
//! Durable, versioned record of session progress: per-skill status, the
//! context index, and the single-slot pending-input lock. The bus owns the
//! state exclusively; readers get immutable snapshots, and every mutation is
//! persisted in full before it is acknowledged.

pub mod bus;
pub mod db;
pub mod store;
pub mod types;

pub use bus::StateBus;
pub use db::SqliteStore;
pub use store::{FileStore, MemoryStore, StateStore};
pub use types::{BusState, ContextEntry, ContextIndex, ContextStatus, SkillStatus, Stage};
