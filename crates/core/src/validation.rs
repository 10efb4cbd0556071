// Editor-side validation
//
// Field editors reject bad input before committing to the session; the
// session itself never validates.

use thiserror::Error;

/// Minimum admin password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// Maximum agent name length
pub const MAX_NAME_LEN: usize = 64;

/// File extensions the backend accepts for agent files
pub const ALLOWED_EXTENSIONS: [&str; 2] = ["txt", "pdf"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Agent name cannot be blank")]
    NameRequired,

    #[error("Agent name can contain only letters, digits, hyphen (-) and underscore (_)")]
    NameCharacters,

    #[error("Agent name must be at most {} characters", MAX_NAME_LEN)]
    NameTooLong,

    #[error("Both password fields are required.")]
    PasswordRequired,

    #[error("All fields are required.")]
    PasswordChangeRequired,

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Password must be at least {} characters.", MIN_PASSWORD_LEN)]
    PasswordTooShort,

    #[error("File name cannot be blank")]
    FileNameRequired,

    #[error("Only .txt and .pdf files can be attached: {0}")]
    FileType(String),
}

/// Check a new agent name
pub fn validate_agent_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::NameRequired);
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::NameCharacters);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong);
    }
    Ok(())
}

/// Backend normalization of agent names: lowercase, keep `[a-z0-9-]`
pub fn sanitize_agent_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

/// Check the first admin password and its confirmation
pub fn validate_new_password(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password.is_empty() || confirm.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Check an admin password change
pub fn validate_password_change(
    current: &str,
    new: &str,
    repeat: &str,
) -> Result<(), ValidationError> {
    if current.is_empty() || new.is_empty() || repeat.is_empty() {
        return Err(ValidationError::PasswordChangeRequired);
    }
    if new.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if new != repeat {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Check that an attachment has an accepted file type
pub fn validate_attachment_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::FileNameRequired);
    }
    let accepted = name
        .rsplit_once('.')
        .map(|(_, ext)| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false);
    if accepted {
        Ok(())
    } else {
        Err(ValidationError::FileType(name.to_string()))
    }
}
