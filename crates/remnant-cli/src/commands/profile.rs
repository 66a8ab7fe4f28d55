use std::io::IsTerminal;

use dialoguer::Confirm;
use serde_json::json;

use remnant_core::archive::read_reflections;
use remnant_core::storage::{ArchiveStore, Profile, ReflectionSection, RelationshipType};

use crate::app::AppContext;
use crate::cli::{ProfileAddArgs, ProfileIdArgs, ProfileListArgs, ProfileShowArgs};
use crate::helpers::{parse_date, parse_id};
use crate::ui::table;

use super::require_profile;

pub fn handle_profile_add(ctx: &AppContext, args: &ProfileAddArgs) -> anyhow::Result<()> {
    let name = args.name.trim();
    if name.is_empty() {
        return Err(anyhow::anyhow!("Profile name cannot be empty"));
    }
    let relationship_type: RelationshipType = args.relationship_type.parse()?;
    let start_date = args.start.as_deref().map(parse_date).transpose()?;
    let end_date = args.end.as_deref().map(parse_date).transpose()?;
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if end < start {
            return Err(anyhow::anyhow!("End date {} is before start date {}", end, start));
        }
    }

    ctx.unlock()?;
    let mut store = ctx.open_store()?;

    let mut profile = Profile::new(name, relationship_type);
    profile.start_date = start_date;
    profile.end_date = end_date;
    store.put_profile(&profile)?;

    if ctx.quiet() {
        println!("{}", profile.id);
    } else {
        println!("Created profile {} ({})", profile.name, profile.id);
    }
    Ok(())
}

pub fn handle_profile_list(ctx: &AppContext, args: &ProfileListArgs) -> anyhow::Result<()> {
    ctx.unlock()?;
    let store = ctx.open_store()?;
    let profiles = store.list_profiles()?;

    if args.json {
        let items: Vec<_> = profiles.iter().map(profile_summary_json).collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if profiles.is_empty() {
        if !ctx.quiet() {
            println!("No profiles yet. Create one with `remnant profile add <NAME>`.");
        }
        return Ok(());
    }

    let rows: Vec<Vec<String>> = profiles
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.name.clone(),
                p.relationship_type.to_string(),
                p.reflections.len().to_string(),
                p.updated_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        table(&["ID", "Name", "Type", "Sections", "Updated"], &rows)
    );
    Ok(())
}

pub fn handle_profile_show(ctx: &AppContext, args: &ProfileShowArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id, "profile")?;
    let session = ctx.unlock()?;
    let store = ctx.open_store()?;
    let profile = require_profile(&store, &id)?;
    let sections = read_reflections(&session, &profile)?;
    let media_count = store.count_media_for_profile(&id)?;

    if args.json {
        let mut reflections = serde_json::Map::new();
        for (section, opened) in &sections {
            let value = match opened {
                Ok(text) => json!(text),
                Err(_) => serde_json::Value::Null,
            };
            reflections.insert(section.slug().to_string(), value);
        }
        let mut value = profile_summary_json(&profile);
        value["reflections"] = serde_json::Value::Object(reflections);
        value["media_count"] = json!(media_count);
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", profile.name);
    println!("Type: {}", profile.relationship_type);
    if let Some(span) = date_span(&profile) {
        println!("Dates: {}", span);
    }
    println!("Media: {}", media_count);

    for (section, opened) in &sections {
        println!();
        println!("## {}", section.title());
        match opened {
            Ok(text) => println!("{}", text),
            Err(_) => println!("[unable to decrypt this section]"),
        }
    }

    let unwritten: Vec<&str> = ReflectionSection::ALL
        .iter()
        .filter(|s| !profile.reflections.contains_key(*s))
        .map(|s| s.slug())
        .collect();
    if !unwritten.is_empty() && !ctx.quiet() {
        println!();
        println!("Not yet written: {}", unwritten.join(", "));
    }
    Ok(())
}

pub fn handle_profile_delete(ctx: &AppContext, args: &ProfileIdArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id, "profile")?;
    ctx.unlock()?;
    let mut store = ctx.open_store()?;
    let profile = require_profile(&store, &id)?;

    if ctx.interactive() && std::io::stdout().is_terminal() {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete {} and all of its reflections and media?",
                profile.name
            ))
            .default(false)
            .interact()
            .map_err(|e| anyhow::anyhow!("Failed to read confirmation: {}", e))?;
        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.delete_profile(&id)?;
    if !ctx.quiet() {
        println!("Deleted profile {}", profile.name);
    }
    Ok(())
}

fn profile_summary_json(profile: &Profile) -> serde_json::Value {
    json!({
        "id": profile.id,
        "name": profile.name,
        "relationship_type": profile.relationship_type.as_str(),
        "start_date": profile.start_date,
        "end_date": profile.end_date,
        "sections": profile.reflections.keys().map(|s| s.slug()).collect::<Vec<_>>(),
        "created_at": profile.created_at,
        "updated_at": profile.updated_at,
    })
}

fn date_span(profile: &Profile) -> Option<String> {
    match (profile.start_date, profile.end_date) {
        (Some(start), Some(end)) => Some(format!("{} to {}", start, end)),
        (Some(start), None) => Some(format!("since {}", start)),
        (None, Some(end)) => Some(format!("until {}", end)),
        (None, None) => None,
    }
}
