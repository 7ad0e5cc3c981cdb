//! Error types for the identity layer.

/// Errors that can occur while resolving a player's identity.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The name or the password was empty.
    #[error("name and password required")]
    MissingCredentials,

    /// The name is registered with a different password.
    #[error("invalid password for {0}")]
    InvalidPassword(String),
}
