//! Field validation helpers shared by record drafts.

use crate::error::FieldErrors;

/// Require a non-empty (after trim) value, returning the trimmed form.
pub fn required(errors: &mut FieldErrors, field: &'static str, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(field, "This field may not be blank.");
    }
    trimmed.to_string()
}

/// Enforce a maximum character length.
pub fn max_length(errors: &mut FieldErrors, field: &'static str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.push(
            field,
            format!("Ensure this field has no more than {max} characters."),
        );
    }
}

/// Basic email shape check; returns the normalized (trimmed, lowercased) form.
pub fn email(errors: &mut FieldErrors, field: &'static str, value: &str) -> String {
    let normalized = value.trim().to_lowercase();
    if normalized.is_empty() || !normalized.contains('@') {
        errors.push(field, "Enter a valid email address.");
    }
    normalized
}

/// Require a non-negative integer (drafts accept signed input so a negative
/// number is a field error rather than a deserialization failure).
pub fn non_negative(errors: &mut FieldErrors, field: &'static str, value: i64) -> u32 {
    if value < 0 {
        errors.push(field, "Ensure this value is greater than or equal to 0.");
        return 0;
    }
    match u32::try_from(value) {
        Ok(v) => v,
        Err(_) => {
            errors.push(field, "Value is too large.");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_flags_blank() {
        let mut errors = FieldErrors::new();
        assert_eq!(required(&mut errors, "name", "  Bob "), "Bob");
        assert!(errors.is_empty());

        required(&mut errors, "name", "   ");
        assert!(!errors.is_empty());
    }

    #[test]
    fn email_normalizes_and_flags_invalid() {
        let mut errors = FieldErrors::new();
        assert_eq!(email(&mut errors, "email", " Bob@X.COM "), "bob@x.com");
        assert!(errors.is_empty());

        email(&mut errors, "email", "not-an-email");
        assert!(!errors.is_empty());
    }

    #[test]
    fn non_negative_rejects_negative_input() {
        let mut errors = FieldErrors::new();
        assert_eq!(non_negative(&mut errors, "age", 30), 30);
        assert!(errors.is_empty());

        non_negative(&mut errors, "age", -1);
        assert!(!errors.is_empty());
    }
}
