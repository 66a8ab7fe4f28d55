//! Command handlers, one module per command family.

mod analyze;
mod auth;
mod files;
mod media;
mod misc;
mod profile;
mod reflect;

pub use analyze::handle_analyze;
pub use auth::{handle_init, handle_verify};
pub use files::{handle_open, handle_seal};
pub use media::{handle_media_add, handle_media_delete, handle_media_export, handle_media_list};
pub use misc::handle_completions;
pub use profile::{
    handle_profile_add, handle_profile_delete, handle_profile_list, handle_profile_show,
};
pub use reflect::handle_reflect;

use remnant_core::storage::{ArchiveStore, Profile, SqliteArchive};
use uuid::Uuid;

use crate::errors::CliError;

/// Fetch a profile or exit with a not-found error.
fn require_profile(store: &SqliteArchive, id: &Uuid) -> anyhow::Result<Profile> {
    match store.get_profile(id)? {
        Some(profile) => Ok(profile),
        None => CliError::not_found(
            &format!("No profile with ID {}", id),
            "Hint: Run `remnant profile list` to see profile IDs.",
        )
        .exit(),
    }
}
