//! PIN verification with retry logic.

use secrecy::{ExposeSecret, SecretString};

use remnant_core::crypto::Session;
use remnant_core::settings::FileSettings;
use remnant_core::PinAuthority;

use crate::errors::CliError;
use crate::helpers::{env_pin, prompt_pin};
use crate::ui::with_spinner;

use super::context::AppContext;
use super::resolver::missing_pin_message;

const MAX_ATTEMPTS: u32 = 3;

/// Unlock a fresh session, prompting up to three times on a TTY.
///
/// A PIN from `REMNANT_PIN` gets a single attempt.
pub fn unlock_with_retry(ctx: &AppContext) -> anyhow::Result<Session> {
    let authority = ctx.authority()?;
    if !authority.has_pin()? {
        CliError::not_found("No PIN configured for this archive.", missing_pin_message()).exit()
    }

    let session = Session::new();
    if let Some(pin) = env_pin() {
        if verify(ctx, &authority, &pin, &session)? {
            return Ok(session);
        }
        CliError::auth_failed("Incorrect PIN.").exit()
    }

    let interactive = ctx.interactive();
    let max_attempts = if interactive { MAX_ATTEMPTS } else { 1 };
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let pin = prompt_pin(interactive)?;
        if verify(ctx, &authority, &pin, &session)? {
            return Ok(session);
        }

        let remaining = max_attempts.saturating_sub(attempts);
        if remaining == 0 {
            CliError::auth_failed_with_hint(
                "Too many failed PIN attempts.",
                "Hint: A forgotten PIN cannot be recovered. The archive stays sealed.",
            )
            .exit()
        }
        eprintln!(
            "Incorrect PIN. {} attempt{} remaining.",
            remaining,
            if remaining == 1 { "" } else { "s" }
        );
    }
}

fn verify(
    ctx: &AppContext,
    authority: &PinAuthority<FileSettings>,
    pin: &SecretString,
    session: &Session,
) -> anyhow::Result<bool> {
    let verified = with_spinner(ctx.quiet(), "Unlocking archive", || {
        authority.verify(pin.expose_secret(), session)
    })?;
    Ok(verified)
}
