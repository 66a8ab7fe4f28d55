use secrecy::ExposeSecret;

use remnant_core::crypto::Session;

use crate::app::AppContext;
use crate::helpers::prompt_new_pin;
use crate::ui::with_spinner;

pub fn handle_init(ctx: &AppContext) -> anyhow::Result<()> {
    let authority = ctx.authority()?;
    if authority.has_pin()? {
        return Err(anyhow::anyhow!(
            "A PIN is already configured for {}",
            ctx.settings_path()?.display()
        ));
    }

    let pin = prompt_new_pin(ctx.interactive())?;
    ctx.pin_policy()?.validate(pin.expose_secret())?;

    let session = Session::new();
    with_spinner(ctx.quiet(), "Deriving key", || {
        authority.setup(pin.expose_secret(), &session)
    })?;

    // Create the archive schema up front so later commands find it.
    ctx.open_store()?;

    if !ctx.quiet() {
        println!("Archive ready at {}", ctx.archive_path()?.display());
        println!("Keep your PIN safe: a forgotten PIN cannot be recovered.");
    }
    Ok(())
}

pub fn handle_verify(ctx: &AppContext) -> anyhow::Result<()> {
    // Exits with an auth failure on a wrong PIN.
    ctx.unlock()?;
    if !ctx.quiet() {
        println!("PIN verified.");
    }
    Ok(())
}
