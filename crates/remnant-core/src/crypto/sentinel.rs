//! PIN setup and verification via an encrypted sentinel.
//!
//! No hash of the PIN is stored. Setup seals a fixed marker under the derived
//! key; verification re-derives a candidate key and accepts it only if the
//! marker opens and matches. The sentinel and all archive content share one
//! trust anchor: the derived key.

use secrecy::SecretString;

use super::envelope::{open_text_b64, seal_text_b64};
use super::key::{
    derive_key, derive_key_async, ensure_salt, load_salt, DerivedKey, KdfParams, Salt,
};
use super::session::Session;
use crate::error::{RemnantError, Result};
use crate::settings::{SettingsStore, HAS_PIN_SETTING, SENTINEL_SETTING};

/// Known plaintext sealed under the derived key at setup.
pub const SENTINEL_MARKER: &str = "VALID";

/// Whether a PIN has been configured for this installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    NoPinConfigured,
    PinConfigured,
}

/// Sets up and verifies the installation PIN.
///
/// `PinAuthority` is the only code that populates a [`Session`].
pub struct PinAuthority<S: SettingsStore> {
    settings: S,
    params: KdfParams,
}

impl<S: SettingsStore> PinAuthority<S> {
    /// Create an authority with the default derivation parameters.
    pub fn new(settings: S) -> Self {
        Self::with_params(settings, KdfParams::default())
    }

    pub fn with_params(settings: S, params: KdfParams) -> Self {
        Self { settings, params }
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    pub fn has_pin(&self) -> Result<bool> {
        Ok(self.settings.get(HAS_PIN_SETTING)?.as_deref() == Some("true"))
    }

    pub fn state(&self) -> Result<AuthState> {
        if self.has_pin()? {
            Ok(AuthState::PinConfigured)
        } else {
            Ok(AuthState::NoPinConfigured)
        }
    }

    /// Configure the PIN and unlock `session` with the derived key.
    ///
    /// Generates the installation salt if none exists yet. This transition is
    /// one-way: there is no PIN change or reset.
    ///
    /// # Errors
    ///
    /// - `RemnantError::PinAlreadyConfigured` if a PIN exists
    /// - `RemnantError::InvalidInput` if the PIN is empty
    /// - `RemnantError::Initialization` if the random source is unavailable
    pub fn setup(&self, pin: &str, session: &Session) -> Result<()> {
        self.ensure_no_pin()?;
        let salt = ensure_salt(&self.settings)?;
        let key = derive_key(pin, &salt, &self.params)?;
        self.finish_setup(key, session)
    }

    /// [`PinAuthority::setup`] with derivation moved to the blocking pool.
    pub async fn setup_async(&self, pin: SecretString, session: &Session) -> Result<()> {
        self.ensure_no_pin()?;
        let salt = ensure_salt(&self.settings)?;
        let key = derive_key_async(pin, salt, self.params).await?;
        self.finish_setup(key, session)
    }

    /// Check a candidate PIN against the stored sentinel.
    ///
    /// On success the candidate key replaces whatever `session` held. On a
    /// wrong PIN, returns `Ok(false)` and leaves `session` untouched, so a
    /// failed attempt never locks an already unlocked session.
    ///
    /// # Errors
    ///
    /// - `RemnantError::PinNotConfigured` if setup never ran
    /// - `RemnantError::InvalidInput` if the PIN is empty
    pub fn verify(&self, pin: &str, session: &Session) -> Result<bool> {
        let Some((salt, sentinel)) = self.verification_inputs()? else {
            return Ok(false);
        };
        let candidate = derive_key(pin, &salt, &self.params)?;
        self.finish_verify(candidate, &sentinel, session)
    }

    /// [`PinAuthority::verify`] with derivation moved to the blocking pool.
    pub async fn verify_async(&self, pin: SecretString, session: &Session) -> Result<bool> {
        let Some((salt, sentinel)) = self.verification_inputs()? else {
            return Ok(false);
        };
        let candidate = derive_key_async(pin, salt, self.params).await?;
        self.finish_verify(candidate, &sentinel, session)
    }

    fn ensure_no_pin(&self) -> Result<()> {
        if self.has_pin()? {
            return Err(RemnantError::PinAlreadyConfigured);
        }
        Ok(())
    }

    fn finish_setup(&self, key: DerivedKey, session: &Session) -> Result<()> {
        let sentinel = seal_text_b64(&key, SENTINEL_MARKER)?;
        // Sentinel before flag: an interrupted setup stays NoPinConfigured.
        self.settings.set(SENTINEL_SETTING, &sentinel)?;
        self.settings.set(HAS_PIN_SETTING, "true")?;
        session.install(key)?;
        tracing::info!("PIN configured");
        Ok(())
    }

    fn verification_inputs(&self) -> Result<Option<(Salt, String)>> {
        if !self.has_pin()? {
            return Err(RemnantError::PinNotConfigured);
        }
        let Some(salt) = load_salt(&self.settings)? else {
            tracing::warn!("PIN flag set but salt is missing");
            return Ok(None);
        };
        let Some(sentinel) = self.settings.get(SENTINEL_SETTING)? else {
            tracing::warn!("PIN flag set but sentinel is missing");
            return Ok(None);
        };
        Ok(Some((salt, sentinel)))
    }

    fn finish_verify(
        &self,
        candidate: DerivedKey,
        sentinel: &str,
        session: &Session,
    ) -> Result<bool> {
        match open_text_b64(&candidate, sentinel) {
            Ok(marker) if marker == SENTINEL_MARKER => {
                session.install(candidate)?;
                tracing::debug!("PIN verified");
                Ok(true)
            }
            Ok(_) => {
                tracing::warn!("sentinel opened but marker mismatched");
                Ok(false)
            }
            Err(err) if err.is_decryption() => {
                tracing::debug!("PIN rejected");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::envelope::seal_text_b64;
    use crate::settings::{MemorySettings, SALT_SETTING};

    #[test]
    fn test_initial_state() {
        let auth = PinAuthority::new(MemorySettings::new());
        assert_eq!(auth.state().unwrap(), AuthState::NoPinConfigured);
        assert!(!auth.has_pin().unwrap());
    }

    #[test]
    fn test_setup_then_verify() {
        let auth = PinAuthority::new(MemorySettings::new());
        let session = Session::new();

        auth.setup("4821", &session).unwrap();

        assert_eq!(auth.state().unwrap(), AuthState::PinConfigured);
        assert!(session.is_unlocked());
        assert!(auth.settings().get(SALT_SETTING).unwrap().is_some());
        let sentinel = auth.settings().get(SENTINEL_SETTING).unwrap().unwrap();
        assert!(!sentinel.contains(SENTINEL_MARKER));

        let fresh = Session::new();
        assert!(auth.verify("4821", &fresh).unwrap());
        assert!(fresh.is_unlocked());

        let rejected = Session::new();
        assert!(!auth.verify("0000", &rejected).unwrap());
        assert!(!rejected.is_unlocked());
    }

    #[test]
    fn test_setup_twice_rejected() {
        let auth = PinAuthority::new(MemorySettings::new());
        let session = Session::new();
        auth.setup("4821", &session).unwrap();

        let result = auth.setup("1111", &session);
        assert!(matches!(result, Err(RemnantError::PinAlreadyConfigured)));
    }

    #[test]
    fn test_verify_without_setup() {
        let auth = PinAuthority::new(MemorySettings::new());
        let result = auth.verify("4821", &Session::new());
        assert!(matches!(result, Err(RemnantError::PinNotConfigured)));
    }

    #[test]
    fn test_wrong_pin_keeps_unlocked_session() {
        let auth = PinAuthority::new(MemorySettings::new());
        let session = Session::new();
        auth.setup("4821", &session).unwrap();
        let sealed = session.seal_text("still readable").unwrap();

        assert!(!auth.verify("9999", &session).unwrap());

        assert!(session.is_unlocked());
        assert_eq!(session.open_text(&sealed).unwrap(), "still readable");
    }

    #[test]
    fn test_mismatched_marker_rejected() {
        let auth = PinAuthority::new(MemorySettings::new());
        auth.setup("4821", &Session::new()).unwrap();

        let salt = load_salt(auth.settings()).unwrap().unwrap();
        let key = derive_key("4821", &salt, &KdfParams::default()).unwrap();
        let forged = seal_text_b64(&key, "NOT-VALID").unwrap();
        auth.settings().set(SENTINEL_SETTING, &forged).unwrap();

        let candidate = Session::new();
        assert!(!auth.verify("4821", &candidate).unwrap());
        assert!(!candidate.is_unlocked());
    }

    #[test]
    fn test_missing_sentinel_returns_false() {
        let auth = PinAuthority::new(MemorySettings::new());
        auth.setup("4821", &Session::new()).unwrap();
        auth.settings().remove(SENTINEL_SETTING).unwrap();

        assert!(!auth.verify("4821", &Session::new()).unwrap());
    }

    #[test]
    fn test_empty_pin_rejected() {
        let auth = PinAuthority::new(MemorySettings::new());
        let result = auth.setup("", &Session::new());
        assert!(matches!(result, Err(RemnantError::InvalidInput(_))));
        assert!(!auth.has_pin().unwrap());
    }

    #[tokio::test]
    async fn test_async_setup_and_verify() {
        let auth = PinAuthority::new(MemorySettings::new());
        let session = Session::new();

        auth.setup_async(SecretString::from("4821".to_string()), &session)
            .await
            .unwrap();
        assert!(session.is_unlocked());

        let fresh = Session::new();
        assert!(auth
            .verify_async(SecretString::from("4821".to_string()), &fresh)
            .await
            .unwrap());
        assert!(!auth
            .verify_async(SecretString::from("0000".to_string()), &Session::new())
            .await
            .unwrap());
    }
}
