//! Authentication hook for resolving who a connection belongs to.
//!
//! The server calls an [`Authenticator`] once per connection, when the
//! client sends `register`. Everything past that point only sees the
//! returned [`PlayerId`].

use salvo_protocol::PlayerId;

use crate::IdentityError;

/// A name and password pair, as sent by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub name: String,
    pub password: String,
}

impl Credentials {
    /// Creates credentials from anything string-like.
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
        }
    }
}

/// Validates credentials and returns the player's stable identity.
///
/// # Example
///
/// ```rust
/// use salvo_identity::{Authenticator, Credentials, IdentityError};
/// use salvo_protocol::PlayerId;
///
/// /// Treats the name as a numeric id. Development only.
/// struct NumericNames;
///
/// impl Authenticator for NumericNames {
///     async fn authenticate(
///         &self,
///         credentials: &Credentials,
///     ) -> Result<PlayerId, IdentityError> {
///         let id: u64 = credentials
///             .name
///             .parse()
///             .map_err(|_| IdentityError::MissingCredentials)?;
///         Ok(PlayerId(id))
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Resolves `credentials` to a `PlayerId`.
    ///
    /// The same credentials must always resolve to the same id.
    fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> impl std::future::Future<Output = Result<PlayerId, IdentityError>> + Send;

    /// Looks a display name back up from an id, if the authenticator
    /// knows one. Default: no names.
    fn display_name(
        &self,
        _player_id: PlayerId,
    ) -> impl std::future::Future<Output = Option<String>> + Send {
        async { None }
    }
}
