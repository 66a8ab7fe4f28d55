//! Key derivation using PBKDF2-HMAC-SHA256.
//!
//! This module turns a short PIN plus a per-installation salt into a 256-bit
//! key for the envelope cipher. Derivation is deliberately slow.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

use crate::error::{RemnantError, Result};
use crate::settings::{SettingsStore, SALT_SETTING};

/// Length of the installation salt in bytes.
pub const SALT_LEN: usize = 16;

/// Length of derived key in bytes (32 bytes = 256 bits for AES-256-GCM).
pub const KEY_LEN: usize = 32;

/// Lowest iteration count accepted by [`KdfParams::new`].
pub const MIN_ITERATIONS: u32 = 100_000;

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Non-secret random value mixed into key derivation.
///
/// Generated once per installation and persisted outside the encrypted store.
/// Replacing it invalidates every envelope sealed under the old key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    /// Draw a fresh salt from the OS random source.
    ///
    /// # Errors
    ///
    /// Returns `RemnantError::Initialization` if the secure random source is
    /// unavailable.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; SALT_LEN];
        getrandom::getrandom(&mut bytes).map_err(|e| {
            RemnantError::Initialization(format!("Secure random source unavailable: {}", e))
        })?;
        Ok(Self(bytes))
    }

    /// Build a salt from stored bytes, rejecting the wrong length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; SALT_LEN] = bytes.try_into().map_err(|_| {
            RemnantError::Storage(format!(
                "Salt must be {} bytes (got {})",
                SALT_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(encoded.trim().as_bytes())
            .map_err(|e| RemnantError::Storage(format!("Salt is not valid base64: {}", e)))?;
        Self::from_slice(&bytes)
    }
}

/// Tunable derivation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    iterations: u32,
}

impl KdfParams {
    /// Create parameters with a custom iteration count.
    ///
    /// # Errors
    ///
    /// Returns `RemnantError::InvalidInput` if `iterations` is below
    /// [`MIN_ITERATIONS`].
    pub fn new(iterations: u32) -> Result<Self> {
        if iterations < MIN_ITERATIONS {
            return Err(RemnantError::InvalidInput(format!(
                "KDF iterations must be at least {} (got {})",
                MIN_ITERATIONS, iterations
            )));
        }
        Ok(Self { iterations })
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// A cryptographic key derived from a PIN.
///
/// Key material is zeroized from memory when dropped. The type is not
/// serializable and its `Debug` output is redacted.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LEN],
}

impl DerivedKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self { key: bytes }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate encryption operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive an encryption key from a PIN and salt.
///
/// The PIN is taken as UTF-8 text of any length; length policy belongs to the
/// caller (see [`crate::crypto::pin`]).
///
/// # Security
///
/// - Same PIN + salt + params always produces the same key (deterministic)
/// - Different salt produces a different key
///
/// # Examples
///
/// ```
/// use remnant_core::crypto::{derive_key, KdfParams, Salt};
///
/// let salt = Salt::generate().unwrap();
/// let key = derive_key("4821", &salt, &KdfParams::default()).unwrap();
/// assert_eq!(key.as_bytes().len(), 32);
/// ```
pub fn derive_key(pin: &str, salt: &Salt, params: &KdfParams) -> Result<DerivedKey> {
    if pin.is_empty() {
        return Err(RemnantError::InvalidInput("PIN cannot be empty".to_string()));
    }

    let mut key_bytes = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(
        pin.as_bytes(),
        salt.as_bytes(),
        params.iterations,
        &mut key_bytes,
    );

    Ok(DerivedKey::from_bytes(key_bytes))
}

/// Run [`derive_key`] on the blocking thread pool so async callers stay responsive.
pub async fn derive_key_async(
    pin: SecretString,
    salt: Salt,
    params: KdfParams,
) -> Result<DerivedKey> {
    tokio::task::spawn_blocking(move || derive_key(pin.expose_secret(), &salt, &params))
        .await
        .map_err(|e| RemnantError::Initialization(format!("Key derivation task failed: {}", e)))?
}

/// Read the persisted installation salt, if one exists.
pub fn load_salt(settings: &dyn SettingsStore) -> Result<Option<Salt>> {
    settings
        .get(SALT_SETTING)?
        .map(|encoded| Salt::from_base64(&encoded))
        .transpose()
}

/// Return the installation salt, generating and persisting it on first use.
pub fn ensure_salt(settings: &dyn SettingsStore) -> Result<Salt> {
    if let Some(salt) = load_salt(settings)? {
        return Ok(salt);
    }

    let salt = Salt::generate()?;
    settings.set(SALT_SETTING, &salt.to_base64())?;
    tracing::info!("generated installation salt");
    Ok(salt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemorySettings;

    fn fixed_salt(fill: u8) -> Salt {
        Salt::from_slice(&[fill; SALT_LEN]).unwrap()
    }

    #[test]
    fn test_key_derivation_deterministic() {
        let salt = fixed_salt(7);

        let key1 = derive_key("4821", &salt, &KdfParams::default()).unwrap();
        let key2 = derive_key("4821", &salt, &KdfParams::default()).unwrap();

        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_salt_different_key() {
        let key1 = derive_key("4821", &fixed_salt(1), &KdfParams::default()).unwrap();
        let key2 = derive_key("4821", &fixed_salt(2), &KdfParams::default()).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_pin_different_key() {
        let salt = fixed_salt(3);

        let key1 = derive_key("4821", &salt, &KdfParams::default()).unwrap();
        let key2 = derive_key("0000", &salt, &KdfParams::default()).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_iterations_change_key() {
        let salt = fixed_salt(4);
        let params = KdfParams::new(MIN_ITERATIONS + 1).unwrap();

        let key1 = derive_key("4821", &salt, &KdfParams::default()).unwrap();
        let key2 = derive_key("4821", &salt, &params).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_pin_length_not_assumed() {
        let salt = fixed_salt(5);
        let key = derive_key("a much longer passphrase é", &salt, &KdfParams::default()).unwrap();
        assert_eq!(key.as_bytes().len(), KEY_LEN);
    }

    #[test]
    fn test_empty_pin_rejected() {
        let result = derive_key("", &fixed_salt(6), &KdfParams::default());
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("PIN cannot be empty"));
    }

    #[test]
    fn test_low_iterations_rejected() {
        let result = KdfParams::new(1_000);
        assert!(matches!(result, Err(RemnantError::InvalidInput(_))));
        assert_eq!(KdfParams::default().iterations(), DEFAULT_ITERATIONS);
    }

    #[test]
    fn test_salt_wrong_length_rejected() {
        let result = Salt::from_slice(b"short");
        assert!(matches!(result, Err(RemnantError::Storage(_))));
    }

    #[test]
    fn test_salt_base64_round_trip() {
        let salt = Salt::generate().unwrap();
        let decoded = Salt::from_base64(&salt.to_base64()).unwrap();
        assert_eq!(salt, decoded);
    }

    #[test]
    fn test_generated_salts_differ() {
        assert_ne!(Salt::generate().unwrap(), Salt::generate().unwrap());
    }

    #[test]
    fn test_ensure_salt_generates_once() {
        let settings = MemorySettings::new();
        assert!(load_salt(&settings).unwrap().is_none());

        let first = ensure_salt(&settings).unwrap();
        let second = ensure_salt(&settings).unwrap();

        assert_eq!(first, second);
        assert_eq!(load_salt(&settings).unwrap(), Some(first));
    }

    #[test]
    fn test_corrupt_persisted_salt_is_error() {
        let settings = MemorySettings::new();
        settings.set(SALT_SETTING, "AAAA").unwrap();

        assert!(ensure_salt(&settings).is_err());
    }

    #[test]
    fn test_derived_key_debug_redacts() {
        let key = derive_key("4821", &fixed_salt(8), &KdfParams::default()).unwrap();

        let debug_output = format!("{:?}", key);
        assert!(debug_output.contains("REDACTED"));

        let key_hex = hex::encode(&key.as_bytes()[..4]);
        assert!(!debug_output.contains(&key_hex));
    }

    #[tokio::test]
    async fn test_async_derivation_matches_blocking() {
        let salt = fixed_salt(9);
        let blocking = derive_key("4821", &salt, &KdfParams::default()).unwrap();
        let offloaded = derive_key_async(
            SecretString::from("4821".to_string()),
            salt,
            KdfParams::default(),
        )
        .await
        .unwrap();

        assert_eq!(blocking.as_bytes(), offloaded.as_bytes());
    }
}
