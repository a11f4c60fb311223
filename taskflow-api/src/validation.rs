/// Custom `validator` rules shared by request bodies

use validator::ValidationError;

/// E.164 mobile number: `+`, then 2 to 15 digits, the first non-zero
pub fn validate_mobile(value: &str) -> Result<(), ValidationError> {
    let digits = match value.strip_prefix('+') {
        Some(rest) => rest,
        None => return Err(mobile_error()),
    };

    let well_formed = (2..=15).contains(&digits.len())
        && digits.chars().all(|c| c.is_ascii_digit())
        && !digits.starts_with('0');

    if well_formed {
        Ok(())
    } else {
        Err(mobile_error())
    }
}

fn mobile_error() -> ValidationError {
    let mut err = ValidationError::new("mobile");
    err.message = Some("Please provide a valid mobile number".into());
    err
}

/// Rejects strings that are empty after trimming
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Must not be blank".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_mobile() {
        assert!(validate_mobile("+1234567890").is_ok());
        assert!(validate_mobile("+447911123456").is_ok());

        assert!(validate_mobile("1234567890").is_err());
        assert!(validate_mobile("+0123456").is_err());
        assert!(validate_mobile("+1").is_err());
        assert!(validate_mobile("+12345678901234567").is_err());
        assert!(validate_mobile("+12-345").is_err());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Ada").is_ok());
        assert!(validate_not_blank("   ").is_err());
    }
}
