//! Input validation for CRM records and list queries.

use std::fmt;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid email format.
    InvalidEmail(String),
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Empty value where one is required.
    Empty(String),
    /// Payload could not be read as the target record.
    Malformed { entity: &'static str, reason: String },
    /// Page or limit out of range.
    InvalidPagination(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidEmail(msg) => write!(f, "Invalid email: {}", msg),
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
            ValidationError::Malformed { entity, reason } => {
                write!(f, "Invalid {} payload: {}", entity, reason)
            }
            ValidationError::InvalidPagination(msg) => write!(f, "Invalid pagination: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum allowed length for email addresses.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum allowed length for short text fields such as names.
pub const MAX_NAME_LENGTH: usize = 200;

/// Validate an email address (basic RFC 5322 format check).
///
/// This is a basic validation that checks:
/// - Contains exactly one @
/// - Has at least one character before @
/// - Has at least one character after @
/// - Has at least one dot after @
/// - Is not too long
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Empty("email".to_string()));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LENGTH,
            actual: email.len(),
        });
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::InvalidEmail(
            "must contain exactly one @ symbol".to_string(),
        ));
    };

    if domain.contains('@') {
        return Err(ValidationError::InvalidEmail(
            "must contain exactly one @ symbol".to_string(),
        ));
    }

    if local.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "missing local part (before @)".to_string(),
        ));
    }

    check_domain(domain).map_err(|reason| ValidationError::InvalidEmail(reason.to_string()))
}

fn check_domain(domain: &str) -> Result<(), &'static str> {
    if domain.is_empty() {
        Err("missing domain (after @)")
    } else if !domain.contains('.') {
        Err("domain must contain at least one dot")
    } else if domain.starts_with('.') || domain.ends_with('.') {
        Err("domain cannot start or end with a dot")
    } else if domain.contains("..") {
        Err("domain cannot contain consecutive dots")
    } else {
        Ok(())
    }
}

/// Validate an optional email: absent or blank values are accepted.
pub fn validate_optional_email(email: Option<&str>) -> Result<(), ValidationError> {
    match email {
        Some(value) if !value.trim().is_empty() => validate_email(value),
        _ => Ok(()),
    }
}

/// Require a non-blank value of bounded length.
pub fn require_text(field: &str, value: &str) -> Result<(), ValidationError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }

    let len = value.chars().count();
    if len > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
            actual: len,
        });
    }

    Ok(())
}

/// Validate 1-based page and a positive page size.
pub fn validate_pagination(page: u32, limit: u32) -> Result<(), ValidationError> {
    if page == 0 {
        return Err(ValidationError::InvalidPagination(
            "page starts at 1".to_string(),
        ));
    }
    if limit == 0 {
        return Err(ValidationError::InvalidPagination(
            "limit must be greater than 0".to_string(),
        ));
    }
    Ok(())
}
