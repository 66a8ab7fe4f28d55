//! Application-level utilities for the Remnant CLI.
//!
//! This module provides:
//! - Path resolution for config, archive and settings files
//! - The lazily-configured application context
//! - PIN unlocking with retry logic

mod context;
mod resolver;
mod unlock;

pub use context::AppContext;
