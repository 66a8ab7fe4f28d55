//! Cryptographic core for Remnant.
//!
//! - **key**: PBKDF2-HMAC-SHA256 key derivation from a PIN and installation salt
//! - **envelope**: AES-256-GCM sealing of arbitrary payloads
//! - **sentinel**: PIN setup/verification by opening a known sealed marker
//! - **session**: the in-memory key slot gating all content access
//! - **pin**: PIN policy, applied only at the input boundary
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the archive and settings files
//! - Offline guessing, slowed by iterated key derivation
//! - Tampering with any stored envelope
//!
//! We do NOT defend against:
//! - Compromised OS / keylogger
//! - Access to an unlocked session / process memory

pub mod envelope;
pub mod key;
pub mod pin;
pub mod sentinel;
pub mod session;

pub use envelope::{
    open, open_text, open_text_b64, seal, seal_text, seal_text_b64, NONCE_LEN, TAG_LEN,
};
pub use key::{
    derive_key, derive_key_async, ensure_salt, load_salt, DerivedKey, KdfParams, Salt, KEY_LEN,
    SALT_LEN,
};
pub use pin::{validate_pin, PinPolicy};
pub use sentinel::{AuthState, PinAuthority, SENTINEL_MARKER};
pub use session::Session;
