use remnant_core::archive::write_reflection;
use remnant_core::storage::{ArchiveStore, ReflectionSection};

use crate::app::AppContext;
use crate::cli::ReflectArgs;
use crate::helpers::{parse_id, read_body};

use super::require_profile;

pub fn handle_reflect(ctx: &AppContext, args: &ReflectArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.profile_id, "profile")?;
    let section: ReflectionSection = args.section.parse()?;

    let session = ctx.unlock()?;
    let mut store = ctx.open_store()?;
    let mut profile = require_profile(&store, &id)?;

    let text = read_body(args.body.as_deref(), ctx.no_input())?;
    write_reflection(&session, &mut profile, section, &text)?;
    store.put_profile(&profile)?;

    if !ctx.quiet() {
        if text.is_empty() {
            println!("Cleared {} for {}", section.title(), profile.name);
        } else {
            println!("Saved {} for {}", section.title(), profile.name);
        }
    }
    Ok(())
}
