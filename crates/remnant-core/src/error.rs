//! Error types for Remnant core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-friendly messages.
//!
//! No variant ever carries a PIN, key material, or decrypted content.

use thiserror::Error;

/// Result type alias for Remnant operations.
pub type Result<T> = std::result::Result<T, RemnantError>;

/// Core error type for Remnant operations.
#[derive(Debug, Error)]
pub enum RemnantError {
    /// Secure random source unavailable (fatal at startup)
    #[error("Initialization error: {0}")]
    Initialization(String),

    /// Content operation attempted while no key is cached
    #[error("Archive is locked")]
    Locked,

    /// AEAD authentication failed: wrong key, corrupted or truncated envelope
    #[error("Decryption failed: invalid key or corrupted data")]
    Decryption,

    /// Verification requested before any PIN was set up
    #[error("No PIN has been configured")]
    PinNotConfigured,

    /// Setup requested after a PIN was already set up
    #[error("A PIN is already configured")]
    PinAlreadyConfigured,

    /// Session key cache unusable (poisoned lock)
    #[error("Session error: {0}")]
    Session(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// Generic resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Analysis collaborator produced an unusable result
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl RemnantError {
    /// True for per-item failures the caller should recover from locally.
    pub fn is_decryption(&self) -> bool {
        matches!(self, RemnantError::Decryption)
    }
}
