//! fragpatch: one-shot, whitespace-tolerant fragment patcher
//!
//! This library exposes the patching core for the binary and the property tests.
//! The main binary is at src/main.rs.

pub mod cli;
pub mod config;
pub mod diff_formatter;
pub mod error_helpers;
pub mod logger;
pub mod patcher;
pub mod pattern;
pub mod recipes;

// Re-export commonly used types for convenience
pub use config::Config;
pub use patcher::{apply_once, patch, preview, PatchOutcome, PatchPreview};
pub use pattern::{Pattern, PatternMode};
pub use recipes::{builtin_recipes, find_recipe, Recipe};
