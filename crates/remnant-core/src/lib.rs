//! # Remnant Core
//!
//! Core library for Remnant - a local-first, PIN-locked personal archive of
//! relationship reflections and media.
//!
//! ## Architecture
//!
//! - **crypto**: key derivation, envelopes, PIN sentinel, session key cache
//! - **settings**: salt, sentinel and PIN flag kept outside the archive
//! - **storage**: record store for profiles and media (SQLite)
//! - **archive**: sealing/opening archive content through a session
//! - **analysis**: optional reflection analysis and the external-command analyzer
//!
//! ## Example
//!
//! ```
//! use remnant_core::crypto::{PinAuthority, Session};
//! use remnant_core::settings::MemorySettings;
//!
//! let auth = PinAuthority::new(MemorySettings::new());
//! let session = Session::new();
//! auth.setup("4821", &session).unwrap();
//!
//! let sealed = session.seal_text("VALID").unwrap();
//! assert_eq!(session.open_text(&sealed).unwrap(), "VALID");
//! ```

pub mod analysis;
pub mod archive;
pub mod crypto;
pub mod error;
pub mod fs;
pub mod settings;
pub mod storage;

pub use crypto::{PinAuthority, Session};
pub use error::{RemnantError, Result};
pub use storage::ArchiveStore;

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
