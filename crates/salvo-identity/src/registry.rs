//! In-memory player registry: the stock [`Authenticator`].
//!
//! The first `register` with a new name creates an account and hands out
//! the next `PlayerId`. Any later `register` with the same name and
//! password logs back into that account and gets the same id, so a player
//! who reconnects is still the same player. Nothing is persisted.

use std::collections::HashMap;

use salvo_protocol::PlayerId;
use tokio::sync::Mutex;

use crate::{Authenticator, Credentials, IdentityError};

#[derive(Debug)]
struct Account {
    password: String,
    player_id: PlayerId,
}

#[derive(Debug)]
struct Accounts {
    by_name: HashMap<String, Account>,
    names: HashMap<PlayerId, String>,
    next_id: u64,
}

/// Name/password accounts held in memory for the life of the process.
#[derive(Debug)]
pub struct PlayerRegistry {
    inner: Mutex<Accounts>,
}

impl PlayerRegistry {
    /// Creates an empty registry. The first player gets `PlayerId(1)`.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Accounts {
                by_name: HashMap::new(),
                names: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Returns the name registered for `player_id`, if any.
    pub async fn name_of(&self, player_id: PlayerId) -> Option<String> {
        self.inner.lock().await.names.get(&player_id).cloned()
    }

    /// Returns the number of registered accounts.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.by_name.len()
    }

    /// Returns `true` if nobody has registered yet.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.by_name.is_empty()
    }
}

impl Default for PlayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Authenticator for PlayerRegistry {
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<PlayerId, IdentityError> {
        if credentials.name.is_empty() || credentials.password.is_empty() {
            return Err(IdentityError::MissingCredentials);
        }

        let mut accounts = self.inner.lock().await;

        if let Some(account) = accounts.by_name.get(&credentials.name) {
            if account.password != credentials.password {
                tracing::debug!(name = %credentials.name, "login rejected");
                return Err(IdentityError::InvalidPassword(
                    credentials.name.clone(),
                ));
            }
            tracing::info!(
                name = %credentials.name,
                player_id = %account.player_id,
                "player logged in"
            );
            return Ok(account.player_id);
        }

        let player_id = PlayerId(accounts.next_id);
        accounts.next_id += 1;
        accounts.by_name.insert(
            credentials.name.clone(),
            Account {
                password: credentials.password.clone(),
                player_id,
            },
        );
        accounts.names.insert(player_id, credentials.name.clone());

        tracing::info!(name = %credentials.name, %player_id, "player registered");
        Ok(player_id)
    }

    async fn display_name(&self, player_id: PlayerId) -> Option<String> {
        self.name_of(player_id).await
    }
}
