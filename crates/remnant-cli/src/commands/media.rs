use std::path::Path;

use remnant_core::archive::{add_media, open_media};
use remnant_core::crypto::{NONCE_LEN, TAG_LEN};
use remnant_core::fs::write_atomic;
use remnant_core::storage::ArchiveStore;

use crate::app::AppContext;
use crate::cli::{MediaAddArgs, MediaDeleteArgs, MediaExportArgs, MediaListArgs};
use crate::errors::CliError;
use crate::helpers::{format_size, parse_id};
use crate::ui::table;

use super::require_profile;

pub fn handle_media_add(ctx: &AppContext, args: &MediaAddArgs) -> anyhow::Result<()> {
    let profile_id = parse_id(&args.profile_id, "profile")?;
    let bytes = std::fs::read(&args.file)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", args.file, e))?;

    let session = ctx.unlock()?;
    let mut store = ctx.open_store()?;
    require_profile(&store, &profile_id)?;

    let item = add_media(&session, &mut store, profile_id, &args.mime, &bytes)?;
    if ctx.quiet() {
        println!("{}", item.id);
    } else {
        println!(
            "Added {} ({}, {}) as {}",
            args.file,
            item.mime_type,
            format_size(bytes.len()),
            item.id
        );
    }
    Ok(())
}

pub fn handle_media_list(ctx: &AppContext, args: &MediaListArgs) -> anyhow::Result<()> {
    let profile_id = parse_id(&args.profile_id, "profile")?;
    ctx.unlock()?;
    let store = ctx.open_store()?;
    require_profile(&store, &profile_id)?;

    let items = store.list_media_summaries(&profile_id)?;
    if items.is_empty() {
        if !ctx.quiet() {
            println!("No media for this profile.");
        }
        return Ok(());
    }

    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|item| {
            let plain_len = item.sealed_len.saturating_sub(NONCE_LEN + TAG_LEN);
            vec![
                item.id.to_string(),
                item.mime_type.clone(),
                format_size(plain_len),
                item.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();
    println!("{}", table(&["ID", "Type", "Size", "Added"], &rows));
    Ok(())
}

pub fn handle_media_export(ctx: &AppContext, args: &MediaExportArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id, "media")?;
    let session = ctx.unlock()?;
    let store = ctx.open_store()?;

    let Some(item) = store.get_media(&id)? else {
        CliError::not_found(
            &format!("No media with ID {}", id),
            "Hint: Run `remnant media list <PROFILE_ID>` to see media IDs.",
        )
        .exit()
    };

    let bytes = open_media(&session, &item)
        .map_err(|e| anyhow::anyhow!("Cannot open media {}: {}", id, e))?;
    write_atomic(Path::new(&args.destination), &bytes)?;
    if !ctx.quiet() {
        println!(
            "Exported {} ({}) to {}",
            id,
            format_size(bytes.len()),
            args.destination
        );
    }
    Ok(())
}

pub fn handle_media_delete(ctx: &AppContext, args: &MediaDeleteArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id, "media")?;
    ctx.unlock()?;
    let mut store = ctx.open_store()?;
    if store.get_media(&id)?.is_none() {
        CliError::not_found(
            &format!("No media with ID {}", id),
            "Hint: Run `remnant media list <PROFILE_ID>` to see media IDs.",
        )
        .exit()
    }
    store.delete_media(&id)?;
    if !ctx.quiet() {
        println!("Deleted media {}", id);
    }
    Ok(())
}
