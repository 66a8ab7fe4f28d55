//! Session key cache.
//!
//! A [`Session`] is the single authorization gate for archive content: it holds
//! at most one derived key, populated only by [`crate::crypto::PinAuthority`],
//! and every content seal/open goes through it. An empty session fails with
//! `RemnantError::Locked`.
//!
//! The key is swapped as a whole value and never handed out. It is zeroized
//! when the session is locked or the last handle is dropped.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::envelope;
use super::key::DerivedKey;
use crate::error::{RemnantError, Result};

type Slot = Option<Arc<DerivedKey>>;

/// Injectable session context holding the unlocked key, if any.
///
/// Clones share the same slot.
#[derive(Clone, Default)]
pub struct Session {
    slot: Arc<RwLock<Slot>>,
}

impl Session {
    /// Create a locked session.
    pub fn new() -> Self {
        Self::default()
    }

    fn read_slot(&self) -> Result<RwLockReadGuard<'_, Slot>> {
        self.slot
            .read()
            .map_err(|_| RemnantError::Session("key slot poisoned".to_string()))
    }

    fn write_slot(&self) -> Result<RwLockWriteGuard<'_, Slot>> {
        self.slot
            .write()
            .map_err(|_| RemnantError::Session("key slot poisoned".to_string()))
    }

    /// Whether a key is currently cached.
    pub fn is_unlocked(&self) -> bool {
        self.read_slot().map(|slot| slot.is_some()).unwrap_or(false)
    }

    /// Drop the cached key. Subsequent content operations fail with `Locked`.
    pub fn lock(&self) -> Result<()> {
        let previous = self.write_slot()?.take();
        if previous.is_some() {
            tracing::debug!("session locked");
        }
        Ok(())
    }

    /// Replace the cached key.
    pub(crate) fn install(&self, key: DerivedKey) -> Result<()> {
        *self.write_slot()? = Some(Arc::new(key));
        tracing::debug!("session unlocked");
        Ok(())
    }

    fn current_key(&self) -> Result<Arc<DerivedKey>> {
        self.read_slot()?.clone().ok_or(RemnantError::Locked)
    }

    /// Seal a payload under the session key.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let key = self.current_key()?;
        envelope::seal(&key, plaintext)
    }

    /// Open an envelope under the session key.
    pub fn open(&self, sealed: &[u8]) -> Result<Vec<u8>> {
        let key = self.current_key()?;
        envelope::open(&key, sealed)
    }

    pub fn seal_text(&self, text: &str) -> Result<Vec<u8>> {
        let key = self.current_key()?;
        envelope::seal_text(&key, text)
    }

    pub fn open_text(&self, sealed: &[u8]) -> Result<String> {
        let key = self.current_key()?;
        envelope::open_text(&key, sealed)
    }

    pub fn seal_text_b64(&self, text: &str) -> Result<String> {
        let key = self.current_key()?;
        envelope::seal_text_b64(&key, text)
    }

    pub fn open_text_b64(&self, encoded: &str) -> Result<String> {
        let key = self.current_key()?;
        envelope::open_text_b64(&key, encoded)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("unlocked", &self.is_unlocked())
            .finish()
    }
}
