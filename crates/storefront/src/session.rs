//! Auth session store.
//!
//! Holds the bearer tokens and user identity in persistent storage and
//! publishes a [`SessionState`] that other components subscribe to. The cart
//! service derives its bucket key from this state, so signing in or out
//! switches carts immediately.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use bazaar_core::SessionUser;

use crate::models::{Session, SessionState};
use crate::storage::{KeyValueStore, StorageError, keys};

/// Persistent session store with change notification.
///
/// Cheaply cloneable; all clones share storage and subscribers.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

struct SessionStoreInner {
    store: Arc<dyn KeyValueStore>,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    /// Rebuild the session from whatever is in `store`.
    ///
    /// A corrupt `user` entry or an unreadable store yields a logged-out
    /// session instead of an error.
    pub fn restore(store: Arc<dyn KeyValueStore>) -> Self {
        let state = read_state(store.as_ref());
        debug!(
            is_logged_in = state.is_logged_in,
            is_admin = state.is_admin,
            "Session restored"
        );
        let (tx, _rx) = watch::channel(state);
        Self {
            inner: Arc::new(SessionStoreInner { store, state: tx }),
        }
    }

    /// Persist a new session and notify subscribers.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    #[instrument(skip(self, session), fields(username = %session.user.username))]
    pub fn login(&self, session: Session) -> Result<(), StorageError> {
        let store = self.inner.store.as_ref();
        let user_json = serde_json::to_string(&session.user)?;

        store.set(keys::ACCESS_TOKEN, session.access_token.expose_secret())?;
        match &session.refresh_token {
            Some(token) => store.set(keys::REFRESH_TOKEN, token.expose_secret())?,
            None => store.remove(keys::REFRESH_TOKEN)?,
        }
        store.set(keys::USER, &user_json)?;
        store.set(keys::IS_ADMIN, if session.is_admin { "true" } else { "false" })?;

        self.inner.state.send_replace(SessionState {
            is_logged_in: true,
            is_admin: session.is_admin,
            user: Some(session.user),
        });
        Ok(())
    }

    /// Sign out locally. Carts are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if a key cannot be removed.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<(), StorageError> {
        self.clear()
    }

    /// Remove every auth key, including the legacy token, and publish a
    /// logged-out state.
    ///
    /// The published state flips even if a key could not be removed; the
    /// first storage error is returned afterwards.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while removing keys.
    pub fn clear(&self) -> Result<(), StorageError> {
        let store = self.inner.store.as_ref();
        let mut first_error = None;
        for key in keys::SESSION.into_iter().chain([keys::LEGACY_AUTH_TOKEN]) {
            if let Err(e) = store.remove(key) {
                warn!(key, error = %e, "Failed to remove session key");
                first_error.get_or_insert(e);
            }
        }

        self.inner.state.send_replace(SessionState::default());
        first_error.map_or(Ok(()), Err)
    }

    /// Current session snapshot.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to identity changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Whether a user is signed in.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.inner.state.borrow().is_logged_in
    }

    /// Whether the signed-in user is an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.inner.state.borrow().is_admin
    }

    /// Username of the signed-in user.
    #[must_use]
    pub fn current_username(&self) -> Option<String> {
        self.inner.state.borrow().username().map(str::to_owned)
    }

    /// Bearer token to attach to outgoing requests.
    ///
    /// Read from storage on every call so tokens written by another process
    /// sharing the store are picked up.
    #[must_use]
    pub fn access_token(&self) -> Option<SecretString> {
        match self.inner.store.get(keys::ACCESS_TOKEN) {
            Ok(token) => token.filter(|t| !t.is_empty()).map(SecretString::from),
            Err(e) => {
                warn!(error = %e, "Failed to read access token");
                None
            }
        }
    }

    /// The storage backing this session.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.inner.store
    }
}

fn read_state(store: &dyn KeyValueStore) -> SessionState {
    let token = match store.get(keys::ACCESS_TOKEN) {
        Ok(token) => token.filter(|t| !t.is_empty()),
        Err(e) => {
            warn!(error = %e, "Failed to read stored session");
            return SessionState::default();
        }
    };
    if token.is_none() {
        return SessionState::default();
    }

    let user = match store.get(keys::USER) {
        Ok(Some(raw)) => match serde_json::from_str::<SessionUser>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Stored user is corrupt, treating session as logged out");
                return SessionState::default();
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "Failed to read stored user");
            return SessionState::default();
        }
    };

    let is_admin = matches!(store.get(keys::IS_ADMIN), Ok(Some(flag)) if flag == "true");

    SessionState {
        is_logged_in: true,
        is_admin,
        user,
    }
}
