//! Admin domain errors

use core_kernel::PortError;
use thiserror::Error;

/// Errors that can occur in the admin domain
#[derive(Debug, Error)]
pub enum AdminError {
    /// Username or password did not match an active admin
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Username or email is already taken
    #[error("Admin with this username or email already exists")]
    AlreadyExists,

    /// Registration requires an authenticated admin once one exists
    #[error("Registration is restricted to administrators")]
    RegistrationClosed,

    /// Admin not found
    #[error("Admin not found: {0}")]
    NotFound(String),

    /// Request failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Password could not be hashed or the stored hash is malformed
    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    /// The admin port failed
    #[error(transparent)]
    Port(PortError),
}

impl From<PortError> for AdminError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { id, .. } => AdminError::NotFound(id),
            PortError::Conflict { .. } => AdminError::AlreadyExists,
            PortError::Validation { message, .. } => AdminError::Validation(message),
            other => AdminError::Port(other),
        }
    }
}

impl From<validator::ValidationErrors> for AdminError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        messages.sort();
        AdminError::Validation(messages.join("; "))
    }
}
