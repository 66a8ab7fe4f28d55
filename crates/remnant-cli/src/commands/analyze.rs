use remnant_core::analysis::{CommandAnalyzer, ReflectionAnalyzer};
use remnant_core::archive::read_reflection;
use remnant_core::storage::ReflectionSection;

use crate::app::AppContext;
use crate::cli::AnalyzeArgs;
use crate::helpers::parse_id;
use crate::ui::with_spinner;

use super::require_profile;

pub fn handle_analyze(ctx: &AppContext, args: &AnalyzeArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.profile_id, "profile")?;
    let section: ReflectionSection = args.section.parse()?;

    let Some(analyzer) = CommandAnalyzer::from_argv(&ctx.config()?.analysis.command) else {
        return Err(anyhow::anyhow!(
            "No analyzer configured\n\nHint: Set `command` under [analysis] in config.toml."
        ));
    };

    let session = ctx.unlock()?;
    let store = ctx.open_store()?;
    let profile = require_profile(&store, &id)?;
    let Some(text) = read_reflection(&session, &profile, section)? else {
        return Err(anyhow::anyhow!(
            "{} has no {} section to analyze",
            profile.name,
            section.title()
        ));
    };

    // The archive is only read here, so a failed run leaves it untouched.
    let result = with_spinner(ctx.quiet(), "Analyzing...", || analyzer.analyze(&text))
        .map_err(|e| anyhow::anyhow!("Analysis failed: {}", e))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Summary: {}", result.summary);
    if !result.questions.is_empty() {
        println!();
        println!("Questions:");
        for question in &result.questions {
            println!("  - {}", question);
        }
    }
    println!();
    println!("Lesson: {}", result.lesson);
    Ok(())
}
