//! Storage abstraction for Remnant.
//!
//! This module defines the `ArchiveStore` trait and the record types for
//! profiles and media.
//!
//! ## Architecture
//!
//! The store is a thin collaborator of the crypto core: it persists opaque
//! envelopes alongside plain metadata (names, mime types, timestamps) and is
//! never handed a key. Sealing and opening happen in [`crate::archive`].

pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export public types
pub use sqlite::SqliteArchive;
pub use traits::ArchiveStore;
pub use types::{MediaItem, MediaSummary, Profile, ReflectionSection, RelationshipType};
