//! Observable user store
//!
//! Thin state machine over the `IdentityProvider` port. Same commit/broadcast
//! discipline as the news store: mutations only through setters, a snapshot
//! published after each one.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

use secrecy::SecretString;

use crate::model::{Session, UserHandle, UserInfo};
use crate::ports::{IdentityError, IdentityProvider};

/// Observable authentication state
#[derive(Debug, Clone, Default)]
pub struct UserState {
    pub user: Option<UserInfo>,
    pub authenticated: bool,
    pub loading: bool,
}

/// In-memory user store over an `IdentityProvider`
pub struct UserStore<I>
where
    I: IdentityProvider + ?Sized,
{
    identity: Arc<I>,
    state: Mutex<UserState>,
    tx: watch::Sender<UserState>,
}

impl<I> UserStore<I>
where
    I: IdentityProvider + ?Sized,
{
    pub fn new(identity: Arc<I>) -> Self {
        let state = UserState::default();
        let (tx, _rx) = watch::channel(state.clone());
        Self {
            identity,
            state: Mutex::new(state),
            tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<UserState> {
        self.tx.subscribe()
    }

    pub fn state(&self) -> UserState {
        self.lock().clone()
    }

    /// Resolve the current user from the provider and commit the result.
    ///
    /// A provider failure degrades to the signed-out state before the error
    /// is surfaced, so observers never see a half-loaded session.
    pub async fn load_user(&self) -> Result<Option<UserInfo>, IdentityError> {
        self.commit(|state| state.loading = true);

        match self.identity.current_user().await {
            Ok(user) => {
                self.commit(|state| {
                    state.authenticated = user.is_some();
                    state.user = user.clone();
                    state.loading = false;
                });
                Ok(user)
            }
            Err(error) => {
                tracing::warn!(error = %error, "failed to load user info");
                self.commit(|state| {
                    state.user = None;
                    state.authenticated = false;
                    state.loading = false;
                });
                Err(error)
            }
        }
    }

    /// Authenticate, then refresh the user state from the provider.
    pub async fn sign_in(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<Session, IdentityError> {
        let session = self.identity.sign_in(username, password).await?;
        tracing::info!(username, "signed in");

        if let Err(error) = self.load_user().await {
            tracing::warn!(error = %error, "session established but user lookup failed");
        }

        Ok(session)
    }

    /// Register a new account. Does not establish a session or touch state.
    pub async fn sign_up(
        &self,
        username: &str,
        password: &SecretString,
        nickname: Option<&str>,
    ) -> Result<UserHandle, IdentityError> {
        self.identity.sign_up(username, password, nickname).await
    }

    /// End the session and clear the user state; returns whether a session
    /// existed.
    pub async fn sign_out(&self) -> Result<bool, IdentityError> {
        let signed_out = self.identity.sign_out().await?;
        self.commit(|state| {
            state.user = None;
            state.authenticated = false;
        });
        tracing::info!(had_session = signed_out, "signed out");
        Ok(signed_out)
    }

    fn commit(&self, apply: impl FnOnce(&mut UserState)) {
        let snapshot = {
            let mut state = self.lock();
            apply(&mut state);
            state.clone()
        };
        self.tx.send_replace(snapshot);
    }

    fn lock(&self) -> MutexGuard<'_, UserState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
