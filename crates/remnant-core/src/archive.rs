//! Encrypted archive content.
//!
//! Joins a [`Session`] with an [`ArchiveStore`]: reflection text and media are
//! sealed before they reach the store and opened after they leave it.
//!
//! Reads recover per item. A record that fails to decrypt is reported on its
//! own and the rest of the archive stays readable. A locked session is not
//! recoverable and fails the whole call.

use chrono::Utc;
use uuid::Uuid;

use crate::crypto::Session;
use crate::error::{RemnantError, Result};
use crate::storage::{ArchiveStore, MediaItem, Profile, ReflectionSection};

fn ensure_unlocked(session: &Session) -> Result<()> {
    if session.is_unlocked() {
        Ok(())
    } else {
        Err(RemnantError::Locked)
    }
}

/// Seal `text` into `section` of `profile` and bump `updated_at`.
///
/// Each write uses a fresh nonce. Empty text clears the section.
/// The caller persists the profile.
pub fn write_reflection(
    session: &Session,
    profile: &mut Profile,
    section: ReflectionSection,
    text: &str,
) -> Result<()> {
    if text.is_empty() {
        ensure_unlocked(session)?;
        profile.reflections.remove(&section);
    } else {
        let sealed = session.seal_text_b64(text)?;
        profile.reflections.insert(section, sealed);
    }
    profile.updated_at = Utc::now();
    Ok(())
}

/// Open one section, `Ok(None)` if it was never written.
pub fn read_reflection(
    session: &Session,
    profile: &Profile,
    section: ReflectionSection,
) -> Result<Option<String>> {
    ensure_unlocked(session)?;
    profile
        .reflections
        .get(&section)
        .map(|sealed| session.open_text_b64(sealed))
        .transpose()
}

/// Open every written section of `profile`, in section order.
pub fn read_reflections(
    session: &Session,
    profile: &Profile,
) -> Result<Vec<(ReflectionSection, Result<String>)>> {
    ensure_unlocked(session)?;
    Ok(profile
        .reflections
        .iter()
        .map(|(section, sealed)| {
            let opened = session.open_text_b64(sealed);
            if let Err(err) = &opened {
                tracing::warn!(profile_id = %profile.id, section = section.slug(), "{}", err);
            }
            (*section, opened)
        })
        .collect())
}

/// Seal `bytes` and store them as a new media item owned by `profile_id`.
pub fn add_media(
    session: &Session,
    store: &mut dyn ArchiveStore,
    profile_id: Uuid,
    mime_type: &str,
    bytes: &[u8],
) -> Result<MediaItem> {
    let item = MediaItem {
        id: Uuid::new_v4(),
        profile_id,
        mime_type: mime_type.to_string(),
        blob: session.seal(bytes)?,
        timestamp: Utc::now(),
    };
    store.put_media(&item)?;
    tracing::debug!(media_id = %item.id, bytes = bytes.len(), "stored media");
    Ok(item)
}

/// Open one media item's payload.
pub fn open_media(session: &Session, item: &MediaItem) -> Result<Vec<u8>> {
    session.open(&item.blob)
}

/// Load and open every media item owned by `profile_id`.
pub fn load_media(
    session: &Session,
    store: &dyn ArchiveStore,
    profile_id: &Uuid,
) -> Result<Vec<(MediaItem, Result<Vec<u8>>)>> {
    ensure_unlocked(session)?;
    let items = store.list_media_for_profile(profile_id)?;
    Ok(items
        .into_iter()
        .map(|item| {
            let opened = open_media(session, &item);
            if let Err(err) = &opened {
                tracing::warn!(media_id = %item.id, "{}", err);
            }
            (item, opened)
        })
        .collect())
}
