//! User-facing CLI failures with stable exit codes.

use std::fmt;

/// Exit code for an incorrect or missing PIN.
pub const EXIT_AUTH_FAILED: i32 = 3;

/// Exit code for a missing archive, profile or media item.
pub const EXIT_NOT_FOUND: i32 = 4;

#[derive(Debug)]
pub struct CliError {
    code: i32,
    message: String,
    hint: Option<String>,
}

impl CliError {
    pub fn auth_failed(message: &str) -> Self {
        Self {
            code: EXIT_AUTH_FAILED,
            message: message.to_string(),
            hint: None,
        }
    }

    pub fn auth_failed_with_hint(message: &str, hint: &str) -> Self {
        Self {
            code: EXIT_AUTH_FAILED,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    pub fn not_found(message: &str, hint: &str) -> Self {
        Self {
            code: EXIT_NOT_FOUND,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    /// Print the error (and hint) to stderr and exit with its code.
    pub fn exit(self) -> ! {
        eprintln!("Error: {}", self.message);
        if let Some(hint) = self.hint {
            eprintln!();
            eprintln!("{}", hint);
        }
        std::process::exit(self.code)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}
