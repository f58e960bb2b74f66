//! Manifest field validation

use thiserror::Error;

/// Validation error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid extension name: {0}")]
    InvalidName(String),

    #[error("invalid publisher name: {0}")]
    InvalidPublisher(String),

    #[error("invalid version format: {0}")]
    InvalidVersion(String),

    #[error("field required: {0}")]
    Required(String),
}

/// Validate an extension name
///
/// Valid names are:
/// - 1-64 characters
/// - Lowercase alphanumeric with hyphens and underscores
/// - Must start with a letter
pub fn validate_extension_name(name: &str) -> Result<(), ValidationError> {
    let Some(first) = name.chars().next() else {
        return Err(ValidationError::Required("name cannot be empty".into()));
    };

    if name.len() > 64 {
        return Err(ValidationError::InvalidName(
            "name must be 64 characters or less".into(),
        ));
    }

    if !first.is_ascii_lowercase() {
        return Err(ValidationError::InvalidName(
            "name must start with a lowercase letter".into(),
        ));
    }

    for (i, c) in name.chars().enumerate() {
        if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' && c != '_' {
            return Err(ValidationError::InvalidName(format!(
                "invalid character '{c}' at position {i}"
            )));
        }
    }

    if name.contains("--") || name.contains("__") || name.contains("-_") || name.contains("_-") {
        return Err(ValidationError::InvalidName(
            "name cannot have consecutive hyphens or underscores".into(),
        ));
    }

    if name.ends_with('-') || name.ends_with('_') {
        return Err(ValidationError::InvalidName(
            "name cannot end with hyphen or underscore".into(),
        ));
    }

    Ok(())
}

/// Validate a publisher name
///
/// Publisher names are free text up to 128 characters, but may not contain
/// `|` (the storage key separator) or control characters.
pub fn validate_publisher_name(publisher: &str) -> Result<(), ValidationError> {
    if publisher.trim().is_empty() {
        return Err(ValidationError::Required(
            "publisher name cannot be empty".into(),
        ));
    }

    if publisher.chars().count() > 128 {
        return Err(ValidationError::InvalidPublisher(
            "publisher name must be 128 characters or less".into(),
        ));
    }

    if let Some(c) = publisher.chars().find(|c| *c == '|' || c.is_control()) {
        return Err(ValidationError::InvalidPublisher(format!(
            "invalid character {c:?}"
        )));
    }

    Ok(())
}

/// Validate a semver version string
///
/// Accepts:
/// - Major.Minor (e.g., "1.0")
/// - Major.Minor.Patch (e.g., "1.0.0")
/// - With optional prerelease (e.g., "1.0.0-alpha.1")
pub fn validate_version(version: &str) -> Result<(), ValidationError> {
    if version.is_empty() {
        return Err(ValidationError::Required("version cannot be empty".into()));
    }

    let (numbers, prerelease) = match version.split_once('-') {
        Some((numbers, prerelease)) => (numbers, Some(prerelease)),
        None => (version, None),
    };

    let nums: Vec<&str> = numbers.split('.').collect();
    if nums.len() < 2 || nums.len() > 3 {
        return Err(ValidationError::InvalidVersion(
            "version must be Major.Minor or Major.Minor.Patch".into(),
        ));
    }

    for (i, num) in nums.iter().enumerate() {
        if num.is_empty() {
            return Err(ValidationError::InvalidVersion(format!(
                "empty version component at position {i}"
            )));
        }

        if !num.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidVersion(format!(
                "invalid version component '{num}' at position {i}"
            )));
        }

        // No leading zeros (except for "0" itself)
        if num.len() > 1 && num.starts_with('0') {
            return Err(ValidationError::InvalidVersion(format!(
                "version component cannot have leading zeros: '{num}'"
            )));
        }
    }

    if let Some(prerelease) = prerelease {
        if prerelease.is_empty() {
            return Err(ValidationError::InvalidVersion(
                "prerelease identifier cannot be empty".into(),
            ));
        }

        if let Some(c) = prerelease
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '.')
        {
            return Err(ValidationError::InvalidVersion(format!(
                "invalid character '{c}' in prerelease"
            )));
        }
    }

    Ok(())
}
