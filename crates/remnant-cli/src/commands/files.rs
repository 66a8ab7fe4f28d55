use std::path::Path;

use remnant_core::fs::write_atomic;

use crate::app::AppContext;
use crate::cli::FileArgs;

pub fn handle_seal(ctx: &AppContext, args: &FileArgs) -> anyhow::Result<()> {
    let session = ctx.unlock()?;
    let plaintext = std::fs::read(&args.input)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", args.input, e))?;
    let sealed = session.seal(&plaintext)?;
    write_atomic(Path::new(&args.output), &sealed)?;
    if !ctx.quiet() {
        println!("Sealed {} -> {}", args.input, args.output);
    }
    Ok(())
}

pub fn handle_open(ctx: &AppContext, args: &FileArgs) -> anyhow::Result<()> {
    let session = ctx.unlock()?;
    let sealed = std::fs::read(&args.input)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", args.input, e))?;
    let plaintext = session
        .open(&sealed)
        .map_err(|e| anyhow::anyhow!("Cannot open {}: {}", args.input, e))?;
    write_atomic(Path::new(&args.output), &plaintext)?;
    if !ctx.quiet() {
        println!("Opened {} -> {}", args.input, args.output);
    }
    Ok(())
}
