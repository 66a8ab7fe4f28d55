//! Archive store trait definition.
//!
//! The `ArchiveStore` trait is the persistence collaborator for profiles and
//! media. It moves opaque envelopes and plain metadata; it never decrypts.

use uuid::Uuid;

use super::types::{MediaItem, MediaSummary, Profile};
use crate::error::Result;

/// Record store keyed by id, with media indexed by owning profile.
pub trait ArchiveStore: Send {
    // --- Profile operations ---

    /// Insert or replace a profile.
    fn put_profile(&mut self, profile: &Profile) -> Result<()>;

    /// Get a profile by ID.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(profile))` if found, `Ok(None)` if not found.
    fn get_profile(&self, id: &Uuid) -> Result<Option<Profile>>;

    /// List all profiles, most recently updated first.
    fn list_profiles(&self) -> Result<Vec<Profile>>;

    /// Delete a profile and every media item it owns, atomically.
    ///
    /// Deleting a missing profile is not an error.
    fn delete_profile(&mut self, id: &Uuid) -> Result<()>;

    // --- Media operations ---

    /// Insert or replace a media item.
    ///
    /// # Errors
    ///
    /// Returns `RemnantError::NotFound` if the owning profile does not exist.
    fn put_media(&mut self, item: &MediaItem) -> Result<()>;

    fn get_media(&self, id: &Uuid) -> Result<Option<MediaItem>>;

    /// List media owned by a profile, oldest first.
    fn list_media_for_profile(&self, profile_id: &Uuid) -> Result<Vec<MediaItem>>;

    /// Metadata for media owned by a profile, oldest first, without loading blobs.
    fn list_media_summaries(&self, profile_id: &Uuid) -> Result<Vec<MediaSummary>>;

    /// Number of media items owned by a profile.
    fn count_media_for_profile(&self, profile_id: &Uuid) -> Result<usize>;

    fn delete_media(&mut self, id: &Uuid) -> Result<()>;
}
