//! PIN policy.
//!
//! The crypto core accepts any non-empty UTF-8 PIN. Length and alphabet rules
//! are applied here, at the input boundary, and nowhere else.

use crate::error::{RemnantError, Result};

/// Default number of digits in a PIN.
pub const DEFAULT_PIN_LENGTH: usize = 4;

/// Rules a PIN must satisfy before it reaches key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinPolicy {
    pub length: usize,
}

impl Default for PinPolicy {
    fn default() -> Self {
        Self {
            length: DEFAULT_PIN_LENGTH,
        }
    }
}

impl PinPolicy {
    /// Validate a PIN against this policy.
    ///
    /// # Requirements
    ///
    /// - Exactly `length` characters
    /// - ASCII digits only
    ///
    /// # Examples
    ///
    /// ```
    /// use remnant_core::crypto::PinPolicy;
    ///
    /// let policy = PinPolicy::default();
    /// assert!(policy.validate("4821").is_ok());
    /// assert!(policy.validate("48a1").is_err());
    /// ```
    pub fn validate(&self, pin: &str) -> Result<()> {
        if !pin.chars().all(|c| c.is_ascii_digit()) {
            return Err(RemnantError::InvalidInput(
                "PIN must contain digits only".to_string(),
            ));
        }

        if pin.len() != self.length {
            return Err(RemnantError::InvalidInput(format!(
                "PIN must be exactly {} digits (got {})",
                self.length,
                pin.len()
            )));
        }

        Ok(())
    }
}

/// Validate a PIN against the default policy.
pub fn validate_pin(pin: &str) -> Result<()> {
    PinPolicy::default().validate(pin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_pin() {
        assert!(validate_pin("4821").is_ok());
        assert!(validate_pin("0000").is_ok());
    }

    #[test]
    fn test_wrong_length() {
        let result = validate_pin("123");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("exactly 4 digits"));
        assert!(validate_pin("12345").is_err());
        assert!(validate_pin("").is_err());
    }

    #[test]
    fn test_non_digits_rejected() {
        assert!(validate_pin("12a4").is_err());
        assert!(validate_pin("12 4").is_err());
        assert!(validate_pin("١٢٣٤").is_err());
    }

    #[test]
    fn test_custom_length() {
        let policy = PinPolicy { length: 6 };
        assert!(policy.validate("482193").is_ok());
        assert!(policy.validate("4821").is_err());
    }
}
