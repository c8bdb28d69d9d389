//! Common validation utilities.

use validator::ValidationError;

/// Domains accepted for the external profile link.
pub const RECOGNIZED_PROFILE_DOMAINS: &[&str] = &["linkedin.com", "lnkd.in"];

/// Youngest and oldest accepted member ages.
pub const MIN_AGE: i32 = 16;
pub const MAX_AGE: i32 = 100;

lazy_static::lazy_static! {
    static ref PHONE_REGEX: regex::Regex =
        regex::Regex::new(r"^\+?[0-9][0-9 \-]{5,18}[0-9]$").unwrap();
}

/// Returns true if the link's host is (a subdomain of) a recognized profile provider.
pub fn is_recognized_profile_link(link: &str) -> bool {
    let trimmed = link.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);

    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    if host.is_empty() || without_scheme.len() <= host.len() + 1 {
        // Bare domain without a profile path.
        return false;
    }

    RECOGNIZED_PROFILE_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
}

/// Validates an external profile link.
pub fn validate_profile_link(link: &str) -> Result<(), ValidationError> {
    if is_recognized_profile_link(link) {
        Ok(())
    } else {
        let mut err = ValidationError::new("profile_link");
        err.message = Some(
            format!(
                "Profile link must point to a profile on {}",
                RECOGNIZED_PROFILE_DOMAINS.join(" or ")
            )
            .into(),
        );
        Err(err)
    }
}

/// Validates a contact phone number (digits, optional leading +, spaces or dashes).
pub fn validate_phone_number(phone: &str) -> Result<(), ValidationError> {
    if PHONE_REGEX.is_match(phone.trim()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone_format");
        err.message = Some("Contact number must contain 7-20 digits".into());
        Err(err)
    }
}

/// Validates that an age is within the accepted range.
pub fn validate_age(age: i32) -> Result<(), ValidationError> {
    if (MIN_AGE..=MAX_AGE).contains(&age) {
        Ok(())
    } else {
        let mut err = ValidationError::new("age_range");
        err.message = Some(format!("Age must be between {} and {}", MIN_AGE, MAX_AGE).into());
        Err(err)
    }
}

/// Validates that a string is not empty after trimming.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Normalizes an optional text field: trims, and maps empty to `None`.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognized_profile_links() {
        assert!(is_recognized_profile_link("https://linkedin.com/in/someone"));
        assert!(is_recognized_profile_link("https://www.linkedin.com/in/someone"));
        assert!(is_recognized_profile_link("http://in.linkedin.com/in/someone/"));
        assert!(is_recognized_profile_link("www.linkedin.com/in/someone"));
        assert!(is_recognized_profile_link("https://lnkd.in/abc123"));
    }

    #[test]
    fn test_unrecognized_profile_links() {
        assert!(!is_recognized_profile_link(""));
        assert!(!is_recognized_profile_link("https://example.com/in/someone"));
        assert!(!is_recognized_profile_link("https://notlinkedin.com/in/someone"));
        assert!(!is_recognized_profile_link("https://linkedin.com.evil.io/in/x"));
        assert!(!is_recognized_profile_link("https://linkedin.com"));
        assert!(!is_recognized_profile_link("https://linkedin.com/"));
    }

    #[test]
    fn test_validate_profile_link_message() {
        let err = validate_profile_link("https://example.com/me").unwrap_err();
        assert!(err.message.unwrap().contains("linkedin.com"));
    }

    #[test]
    fn test_validate_phone_number() {
        assert!(validate_phone_number("+91 1234567890").is_ok());
        assert!(validate_phone_number("0123-456-789").is_ok());
        assert!(validate_phone_number("1234567").is_ok());
        assert!(validate_phone_number("12345").is_err());
        assert!(validate_phone_number("call me").is_err());
        assert!(validate_phone_number("").is_err());
    }

    #[test]
    fn test_validate_age() {
        assert!(validate_age(16).is_ok());
        assert!(validate_age(45).is_ok());
        assert!(validate_age(100).is_ok());
        assert!(validate_age(15).is_err());
        assert!(validate_age(101).is_err());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("x").is_ok());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("").is_err());
    }

    #[test]
    fn test_normalize_optional() {
        assert_eq!(normalize_optional(Some("  Acme ".into())), Some("Acme".into()));
        assert_eq!(normalize_optional(Some("   ".into())), None);
        assert_eq!(normalize_optional(None), None);
    }
}
