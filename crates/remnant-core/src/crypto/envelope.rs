//! Authenticated encryption envelopes.
//!
//! Uses AES-256-GCM with a random 96-bit nonce per call and no associated data.
//!
//! Envelope layout:
//!   [ nonce (12 bytes) | ciphertext + tag (16 bytes) ]
//!
//! These functions take the key explicitly and never store it. Content code
//! should go through [`crate::crypto::Session`], which gates them on an
//! unlocked session.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::key::DerivedKey;
use crate::error::{RemnantError, Result};

/// AES-GCM nonce length (96 bits).
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length.
pub const TAG_LEN: usize = 16;

fn fresh_nonce() -> Result<[u8; NONCE_LEN]> {
    let mut nonce = [0u8; NONCE_LEN];
    getrandom::getrandom(&mut nonce).map_err(|e| {
        RemnantError::Initialization(format!("Secure random source unavailable: {}", e))
    })?;
    Ok(nonce)
}

fn cipher(key: &DerivedKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}

/// Encrypt `plaintext` into a self-contained envelope.
///
/// Every call draws a new nonce, so sealing the same plaintext twice gives
/// different envelopes. Payloads are sealed whole, without chunking.
///
/// # Examples
///
/// ```
/// use remnant_core::crypto::{derive_key, open, seal, KdfParams, Salt};
///
/// let key = derive_key("4821", &Salt::generate().unwrap(), &KdfParams::default()).unwrap();
/// let sealed = seal(&key, b"secret data").unwrap();
/// assert_eq!(open(&key, &sealed).unwrap(), b"secret data");
/// ```
pub fn seal(key: &DerivedKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let nonce = fresh_nonce()?;
    let ciphertext = cipher(key)
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| RemnantError::InvalidInput("Payload too large to encrypt".to_string()))?;

    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt an envelope produced by [`seal`].
///
/// # Errors
///
/// Returns `RemnantError::Decryption` if:
/// - The key is wrong
/// - Any byte of the envelope was altered
/// - The envelope is truncated or shorter than the nonce
///
/// No partial plaintext is ever returned.
pub fn open(key: &DerivedKey, sealed: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < NONCE_LEN {
        return Err(RemnantError::Decryption);
    }
    let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);

    cipher(key)
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| RemnantError::Decryption)
}

/// Seal UTF-8 text.
pub fn seal_text(key: &DerivedKey, text: &str) -> Result<Vec<u8>> {
    seal(key, text.as_bytes())
}

/// Open an envelope holding UTF-8 text.
pub fn open_text(key: &DerivedKey, sealed: &[u8]) -> Result<String> {
    let plaintext = open(key, sealed)?;
    String::from_utf8(plaintext).map_err(|_| RemnantError::Decryption)
}

/// Seal text and base64-wrap the envelope for text-oriented storage.
pub fn seal_text_b64(key: &DerivedKey, text: &str) -> Result<String> {
    Ok(STANDARD.encode(seal_text(key, text)?))
}

/// Reverse of [`seal_text_b64`]. Malformed base64 is reported as a decryption failure.
pub fn open_text_b64(key: &DerivedKey, encoded: &str) -> Result<String> {
    let sealed = STANDARD
        .decode(encoded.trim().as_bytes())
        .map_err(|_| RemnantError::Decryption)?;
    open_text(key, &sealed)
}
