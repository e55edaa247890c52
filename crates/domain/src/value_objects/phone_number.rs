//! Phone number value object with E.164 validation and normalization

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// A validated phone number in E.164 format (e.g., +264811234567)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber {
    value: String,
}

impl PhoneNumber {
    /// Create a new phone number, validating E.164 format
    ///
    /// E.164 format: +[country code][subscriber number]
    /// - Starts with +
    /// - Contains only digits after +
    /// - Length: 7-15 digits (including country code)
    pub fn new(number: impl Into<String>) -> Result<Self, DomainError> {
        let value = number.into().trim().replace([' ', '-', '(', ')'], "");

        if !value.starts_with('+') {
            return Err(DomainError::InvalidPhoneNumber(
                "Phone number must start with +".to_string(),
            ));
        }

        let digits = &value[1..];
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::InvalidPhoneNumber(
                "Phone number must contain only digits after +".to_string(),
            ));
        }

        if digits.len() < 7 || digits.len() > 15 {
            return Err(DomainError::InvalidPhoneNumber(
                "Phone number must have 7-15 digits".to_string(),
            ));
        }

        Ok(Self { value })
    }

    /// Normalize free-form guest input into E.164.
    ///
    /// Strips every non-digit character, prepends `default_country_code`
    /// (digits only, e.g. "264") when the input does not already carry a
    /// country code marker (`+` or `00` prefix), and ensures a leading `+`.
    /// Pure function, no I/O.
    pub fn normalize(raw: &str, default_country_code: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        let has_country_code = trimmed.starts_with('+') || trimmed.starts_with("00");

        let mut digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Err(DomainError::InvalidPhoneNumber(
                "Phone number contains no digits".to_string(),
            ));
        }

        if has_country_code {
            if digits.starts_with("00") {
                digits = digits[2..].to_string();
            }
        } else {
            let cc: String = default_country_code
                .chars()
                .filter(char::is_ascii_digit)
                .collect();
            // Local numbers commonly carry a trunk zero that the country
            // code replaces
            let subscriber = digits.strip_prefix('0').unwrap_or(&digits);
            digits = format!("{cc}{subscriber}");
        }

        Self::new(format!("+{digits}"))
    }

    /// Get the phone number as a string slice (E.164 format)
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Get digits only (without +)
    pub fn digits(&self) -> &str {
        &self.value[1..]
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for PhoneNumber {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_e164_number_is_accepted() {
        let phone = PhoneNumber::new("+264811234567").unwrap();
        assert_eq!(phone.as_str(), "+264811234567");
    }

    #[test]
    fn number_with_spaces_is_normalized() {
        let phone = PhoneNumber::new("+264 81 123 4567").unwrap();
        assert_eq!(phone.as_str(), "+264811234567");
    }

    #[test]
    fn number_without_plus_is_rejected() {
        assert!(PhoneNumber::new("264811234567").is_err());
    }

    #[test]
    fn number_with_letters_is_rejected() {
        assert!(PhoneNumber::new("+26481abc").is_err());
    }

    #[test]
    fn too_short_number_is_rejected() {
        assert!(PhoneNumber::new("+12345").is_err());
    }

    #[test]
    fn too_long_number_is_rejected() {
        assert!(PhoneNumber::new("+12345678901234567890").is_err());
    }

    #[test]
    fn digits_returns_without_plus() {
        let phone = PhoneNumber::new("+264811234567").unwrap();
        assert_eq!(phone.digits(), "264811234567");
    }

    #[test]
    fn normalize_keeps_existing_country_code() {
        let phone = PhoneNumber::normalize("+264 81 123 4567", "49").unwrap();
        assert_eq!(phone.as_str(), "+264811234567");
    }

    #[test]
    fn normalize_converts_double_zero_prefix() {
        let phone = PhoneNumber::normalize("00264811234567", "49").unwrap();
        assert_eq!(phone.as_str(), "+264811234567");
    }

    #[test]
    fn normalize_adds_default_country_code() {
        let phone = PhoneNumber::normalize("081 123 4567", "264").unwrap();
        assert_eq!(phone.as_str(), "+264811234567");
    }

    #[test]
    fn normalize_without_trunk_zero() {
        let phone = PhoneNumber::normalize("81 123 4567", "264").unwrap();
        assert_eq!(phone.as_str(), "+264811234567");
    }

    #[test]
    fn normalize_strips_punctuation() {
        let phone = PhoneNumber::normalize("(081) 123-4567", "264").unwrap();
        assert_eq!(phone.as_str(), "+264811234567");
    }

    #[test]
    fn normalize_rejects_digit_free_input() {
        assert!(PhoneNumber::normalize("call me", "264").is_err());
    }

    #[test]
    fn display_format() {
        let phone = PhoneNumber::new("+264811234567").unwrap();
        assert_eq!(phone.to_string(), "+264811234567");
    }

    #[test]
    fn try_from_str() {
        let phone: PhoneNumber = "+264811234567".try_into().unwrap();
        assert_eq!(phone.as_str(), "+264811234567");
    }

    #[test]
    fn serialization_is_transparent() {
        let phone = PhoneNumber::new("+264811234567").unwrap();
        let json = serde_json::to_string(&phone).unwrap();
        assert_eq!(json, "\"+264811234567\"");
        let parsed: PhoneNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(phone, parsed);
    }
}
