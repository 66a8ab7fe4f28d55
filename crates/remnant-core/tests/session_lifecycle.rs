use std::fs;

use remnant_core::crypto::{
    derive_key, load_salt, open, seal, KdfParams, PinAuthority, Session, NONCE_LEN,
};
use remnant_core::settings::{FileSettings, MemorySettings, SettingsStore, SENTINEL_SETTING};
use remnant_core::RemnantError;
use tempfile::tempdir;

#[test]
fn test_setup_and_verify_scenario() {
    let auth = PinAuthority::new(MemorySettings::new());
    let session = Session::new();

    auth.setup("4821", &session).expect("setup should succeed");
    assert!(auth
        .settings()
        .get(SENTINEL_SETTING)
        .expect("settings read")
        .is_some());

    assert!(auth.verify("4821", &Session::new()).expect("verify"));
    assert!(!auth.verify("0000", &Session::new()).expect("verify"));
}

#[test]
fn test_content_survives_process_restart() {
    let dir = tempdir().expect("tempdir");
    let settings_path = dir.path().join("settings.json");
    let blob_path = dir.path().join("reflection.bin");

    {
        let auth = PinAuthority::new(FileSettings::open(&settings_path).expect("open settings"));
        let session = Session::new();
        auth.setup("4821", &session).expect("setup");

        let sealed = session.seal_text("VALID").expect("seal");
        fs::write(&blob_path, sealed).expect("write blob");
    }

    // Fresh process: only the persisted salt, sentinel and blob remain.
    let settings = FileSettings::open(&settings_path).expect("reopen settings");
    let salt = load_salt(&settings)
        .expect("read salt")
        .expect("salt persisted");
    let key = derive_key("4821", &salt, &KdfParams::default()).expect("derive");
    let on_disk = fs::read(&blob_path).expect("read blob");
    assert_eq!(open(&key, &on_disk).expect("open"), b"VALID");

    let auth = PinAuthority::new(settings);
    let session = Session::new();
    assert!(auth.verify("4821", &session).expect("verify"));
    assert_eq!(session.open_text(&on_disk).expect("open via session"), "VALID");
}

#[test]
fn test_sealed_file_does_not_contain_plaintext() {
    let auth = PinAuthority::new(MemorySettings::new());
    let session = Session::new();
    auth.setup("4821", &session).expect("setup");

    let sealed = session
        .seal_text("secret entry with marker: PLAINTEXT_MARKER_123")
        .expect("seal");
    let haystack = String::from_utf8_lossy(&sealed);
    assert!(!haystack.contains("PLAINTEXT_MARKER_123"));
}

#[test]
fn test_three_mebibyte_blob_round_trip() {
    let auth = PinAuthority::new(MemorySettings::new());
    let session = Session::new();
    auth.setup("4821", &session).expect("setup");

    let blob: Vec<u8> = (0..3 * 1024 * 1024).map(|i| (i % 251) as u8).collect();
    let sealed = session.seal(&blob).expect("seal");
    assert_eq!(session.open(&sealed).expect("open"), blob);
}

#[test]
fn test_short_buffer_is_decryption_error() {
    let auth = PinAuthority::new(MemorySettings::new());
    let session = Session::new();
    auth.setup("4821", &session).expect("setup");

    let result = session.open(&[0u8; NONCE_LEN - 1]);
    assert!(matches!(result, Err(RemnantError::Decryption)));
}

#[test]
fn test_keys_from_different_installations_do_not_interoperate() {
    let first = PinAuthority::new(MemorySettings::new());
    let second = PinAuthority::new(MemorySettings::new());
    let a = Session::new();
    let b = Session::new();
    first.setup("4821", &a).expect("setup");
    second.setup("4821", &b).expect("setup");

    let sealed = a.seal(b"same pin, different salt").expect("seal");
    assert!(matches!(b.open(&sealed), Err(RemnantError::Decryption)));
}

#[test]
fn test_wrong_pin_does_not_clear_unlocked_session() {
    let auth = PinAuthority::new(MemorySettings::new());
    let session = Session::new();
    auth.setup("4821", &session).expect("setup");

    assert!(!auth.verify("1234", &session).expect("verify"));
    assert!(session.is_unlocked());

    session.lock().expect("lock");
    assert!(matches!(session.seal(b"x"), Err(RemnantError::Locked)));
    assert!(auth.verify("4821", &session).expect("verify"));
    assert!(session.is_unlocked());
}

#[test]
fn test_explicit_key_seal_open_matches_session() {
    let settings = MemorySettings::new();
    let auth = PinAuthority::new(settings);
    let session = Session::new();
    auth.setup("4821", &session).expect("setup");

    let salt = load_salt(auth.settings()).expect("salt").expect("present");
    let key = derive_key("4821", &salt, &KdfParams::default()).expect("derive");

    let by_key = seal(&key, b"interop").expect("seal");
    assert_eq!(session.open(&by_key).expect("open"), b"interop");
}
