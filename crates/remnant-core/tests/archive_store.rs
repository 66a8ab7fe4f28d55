use remnant_core::archive::{add_media, load_media, read_reflections, write_reflection};
use remnant_core::crypto::{PinAuthority, Session};
use remnant_core::settings::FileSettings;
use remnant_core::storage::{
    ArchiveStore, Profile, ReflectionSection, RelationshipType, SqliteArchive,
};
use tempfile::tempdir;

#[test]
fn test_archive_round_trip_across_reopen() {
    let dir = tempdir().expect("tempdir");
    let settings_path = dir.path().join("settings.json");
    let db_path = dir.path().join("archive.db");

    let profile_id = {
        let auth = PinAuthority::new(FileSettings::open(&settings_path).expect("settings"));
        let session = Session::new();
        auth.setup("4821", &session).expect("setup");

        let mut store = SqliteArchive::open(&db_path).expect("open db");
        let mut profile = Profile::new("Morgan", RelationshipType::Romantic);
        write_reflection(
            &session,
            &mut profile,
            ReflectionSection::Thoughts,
            "It ended gently.",
        )
        .expect("write reflection");
        store.put_profile(&profile).expect("put profile");
        add_media(&session, &mut store, profile.id, "image/png", b"\x89PNG fake")
            .expect("add media");
        profile.id
    };

    let raw_db = std::fs::read(&db_path).expect("read db file");
    assert!(!String::from_utf8_lossy(&raw_db).contains("It ended gently."));

    let auth = PinAuthority::new(FileSettings::open(&settings_path).expect("settings"));
    let session = Session::new();
    assert!(auth.verify("4821", &session).expect("verify"));

    let store = SqliteArchive::open(&db_path).expect("reopen db");
    let profile = store
        .get_profile(&profile_id)
        .expect("get profile")
        .expect("profile exists");
    assert_eq!(profile.name, "Morgan");

    let sections = read_reflections(&session, &profile).expect("read reflections");
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].0, ReflectionSection::Thoughts);
    assert_eq!(
        sections[0].1.as_deref().expect("decrypts"),
        "It ended gently."
    );

    let media = load_media(&session, &store, &profile_id).expect("load media");
    assert_eq!(media.len(), 1);
    assert_eq!(media[0].0.mime_type, "image/png");
    assert_eq!(
        media[0].1.as_deref().expect("decrypts"),
        b"\x89PNG fake".as_slice()
    );
}

#[test]
fn test_delete_profile_removes_owned_media() {
    let dir = tempdir().expect("tempdir");
    let auth = PinAuthority::new(FileSettings::open(&dir.path().join("s.json")).expect("settings"));
    let session = Session::new();
    auth.setup("4821", &session).expect("setup");

    let mut store = SqliteArchive::open(&dir.path().join("a.db")).expect("open db");
    let profile = Profile::new("Riley", RelationshipType::Professional);
    store.put_profile(&profile).expect("put profile");
    let item = add_media(&session, &mut store, profile.id, "video/mp4", &[7u8; 4096])
        .expect("add media");

    store.delete_profile(&profile.id).expect("delete");

    assert!(store.get_profile(&profile.id).expect("get").is_none());
    assert!(store.get_media(&item.id).expect("get media").is_none());
    assert!(store
        .list_media_for_profile(&profile.id)
        .expect("list")
        .is_empty());
}
