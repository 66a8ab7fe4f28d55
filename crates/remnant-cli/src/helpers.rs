//! Input and parsing helper functions for the CLI.

use std::io::{self, IsTerminal, Read};

use chrono::NaiveDate;
use dialoguer::Password;
use secrecy::SecretString;
use uuid::Uuid;

/// Environment variable consulted before prompting for a PIN.
pub const PIN_ENV: &str = "REMNANT_PIN";

/// PIN from `REMNANT_PIN`, if set and non-blank.
pub fn env_pin() -> Option<SecretString> {
    std::env::var(PIN_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
}

/// Prompt for the PIN, or read it from `REMNANT_PIN`.
pub fn prompt_pin(interactive: bool) -> anyhow::Result<SecretString> {
    if let Some(pin) = env_pin() {
        return Ok(pin);
    }
    if !interactive {
        return Err(anyhow::anyhow!(
            "No PIN provided and no TTY available. Set {}.",
            PIN_ENV
        ));
    }
    Password::new()
        .with_prompt("PIN")
        .interact()
        .map(SecretString::from)
        .map_err(|e| anyhow::anyhow!("Failed to read PIN: {}", e))
}

/// Prompt for a new PIN with confirmation (for init), or read it from `REMNANT_PIN`.
pub fn prompt_new_pin(interactive: bool) -> anyhow::Result<SecretString> {
    if let Some(pin) = env_pin() {
        return Ok(pin);
    }
    if !interactive {
        return Err(anyhow::anyhow!(
            "No PIN provided and no TTY available. Set {}.",
            PIN_ENV
        ));
    }
    Password::new()
        .with_prompt("Choose a PIN")
        .with_confirmation("Confirm PIN", "PINs do not match")
        .interact()
        .map(SecretString::from)
        .map_err(|e| anyhow::anyhow!("Failed to read PIN: {}", e))
}

/// Parse a full UUID, naming the kind of record in the error.
pub fn parse_id(value: &str, kind: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|_| anyhow::anyhow!("Invalid {} ID: {}", kind, value))
}

/// Parse a YYYY-MM-DD date.
pub fn parse_date(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid date (expected YYYY-MM-DD): {}", value))
}

/// Resolve text from `--body`, falling back to stdin.
///
/// Trailing newlines from piped input are dropped.
pub fn read_body(body: Option<&str>, no_input: bool) -> anyhow::Result<String> {
    if let Some(text) = body {
        return Ok(text.to_string());
    }

    let stdin = io::stdin();
    if stdin.is_terminal() && no_input {
        return Err(anyhow::anyhow!(
            "No text provided. Use --body or pipe text on stdin."
        ));
    }
    if stdin.is_terminal() {
        eprintln!("Enter text, then press Ctrl-D to finish:");
    }

    let mut text = String::new();
    stdin
        .lock()
        .read_to_string(&mut text)
        .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
    Ok(text.trim_end_matches(['\r', '\n']).to_string())
}

/// Human-readable byte size.
pub fn format_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    let value = bytes as f64;
    if value < KIB {
        format!("{} B", bytes)
    } else if value < KIB * KIB {
        format!("{:.1} KiB", value / KIB)
    } else {
        format!("{:.1} MiB", value / (KIB * KIB))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let date = parse_date("2021-03-14").unwrap();
        assert_eq!(date.to_string(), "2021-03-14");
        assert!(parse_date("14/03/2021").is_err());
    }

    #[test]
    fn test_parse_id_rejects_prefix() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "profile").unwrap(), id);
        let err = parse_id("1234abcd", "profile").unwrap_err();
        assert!(err.to_string().contains("Invalid profile ID"));
    }

    #[test]
    fn test_body_flag_wins() {
        assert_eq!(read_body(Some("hello"), true).unwrap(), "hello");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(12), "12 B");
        assert_eq!(format_size(2048), "2.0 KiB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MiB");
    }
}
