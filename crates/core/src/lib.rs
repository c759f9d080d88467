//! # Courseflow Core
//!
//! The "Brain" of the Courseflow system - routes a natural-language request to
//! at most one skill out of a fixed catalog, gated by data-dependency checks,
//! and tracks the produced artifacts in a durable session state bus.
//!
//! ## Architecture
//!
//! - `skills/` - Immutable skill catalog (descriptors, prompts, builtins)
//! - `state/` - Global state bus with pluggable persistence backends
//! - `dispatch/` - Decision engine: LLM reasoning cross-checked by a
//!   deterministic dependency validator, with a keyword-matching fallback
//! - `assemble` - Builds the final skill input from context artifacts
//! - `executor` - Text/image generation boundary
//! - `engine` - The per-turn loop tying everything together
//!
//! ## Usage
//!
//! ```rust,ignore
//! use courseflow_core::engine::Engine;
//! use courseflow_core::models::GeminiClient;
//! use courseflow_core::skills::builtin_catalog;
//! use courseflow_core::state::FileStore;
//!
//! let engine = Engine::new(
//!     builtin_catalog()?,
//!     Box::new(FileStore::new("state.json")),
//!     std::sync::Arc::new(GeminiClient::from_env()?),
//!     "outputs",
//! )?;
//! let outcome = engine.handle_message("write a transcript about photosynthesis").await?;
//! ```

pub mod assemble;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod executor;
pub mod models;
pub mod skills;
pub mod state;
pub mod trace;

pub use error::CoreError;
