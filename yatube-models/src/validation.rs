use crate::Error;
use std::borrow::Cow;
use validator::{ValidationError, ValidationErrors};

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(Cow::from("This field is required."));
        Err(err)
    } else {
        Ok(())
    }
}

/// Non blank, letters, digits and `@.+-_` only
pub fn valid_username(value: &str) -> Result<(), ValidationError> {
    not_blank(value)?;
    username_chars(value)
}

/// Emails are optional, but have to look like one when given
pub fn optional_email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || validator::validate_email(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("email");
        err.message = Some(Cow::from("Enter a valid email address."));
        Err(err)
    }
}

fn username_chars(value: &str) -> Result<(), ValidationError> {
    if value
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        Ok(())
    } else {
        let mut err = ValidationError::new("invalid_username");
        err.message = Some(Cow::from(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ));
        Err(err)
    }
}

/// Non blank, ASCII letters, digits, `-` and `_` only
pub fn valid_slug(value: &str) -> Result<(), ValidationError> {
    not_blank(value)?;
    slug_chars(value)
}

fn slug_chars(value: &str) -> Result<(), ValidationError> {
    if value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Ok(())
    } else {
        let mut err = ValidationError::new("invalid_slug");
        err.message = Some(Cow::from(
            "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
        ));
        Err(err)
    }
}

/// Builds a validation failure for a single field
pub fn invalid(field: &'static str, code: &'static str, message: &'static str) -> Error {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::from(message));
    let mut errors = ValidationErrors::new();
    errors.add(field, err);
    Error::Validation(errors)
}
