//! Stub identity provider for testing and offline mode

use async_trait::async_trait;
use newsdesk_domain::{IdentityError, IdentityProvider, Session, UserHandle, UserInfo};
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Clone)]
struct StubAccount {
    password: String,
    nickname: Option<String>,
}

/// In-memory identity provider: accounts registered through `sign_up` can
/// sign in within the same process.
pub struct StubIdentityProvider {
    inner: Mutex<StubState>,
}

#[derive(Default)]
struct StubState {
    accounts: HashMap<String, StubAccount>,
    signed_in: Option<String>,
}

impl StubIdentityProvider {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StubState::default()),
        }
    }

    /// Pre-register an account, e.g. for CLI tests
    pub fn with_account(username: &str, password: &str) -> Self {
        let stub = Self::new();
        stub.lock().accounts.insert(
            username.to_string(),
            StubAccount {
                password: password.to_string(),
                nickname: None,
            },
        );
        stub
    }

    fn lock(&self) -> MutexGuard<'_, StubState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for StubIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
    async fn sign_up(
        &self,
        username: &str,
        password: &SecretString,
        nickname: Option<&str>,
    ) -> Result<UserHandle, IdentityError> {
        let mut state = self.lock();
        if state.accounts.contains_key(username) {
            return Err(IdentityError::Auth(format!(
                "UsernameExistsException: {} already registered",
                username
            )));
        }

        state.accounts.insert(
            username.to_string(),
            StubAccount {
                password: password.expose_secret().to_string(),
                nickname: nickname.map(str::to_string),
            },
        );

        Ok(UserHandle {
            username: username.to_string(),
            confirmed: true,
        })
    }

    async fn sign_in(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<Session, IdentityError> {
        let mut state = self.lock();
        let account = state.accounts.get(username).ok_or_else(|| {
            IdentityError::Auth("UserNotFoundException: unknown user".to_string())
        })?;

        if account.password != password.expose_secret() {
            return Err(IdentityError::Auth(
                "NotAuthorizedException: incorrect username or password".to_string(),
            ));
        }

        state.signed_in = Some(username.to_string());
        Ok(Session {
            access_token: SecretString::new(format!("stub-token-{}", username).into()),
            id_token: None,
            refresh_token: None,
            expires_in_secs: 3600,
        })
    }

    async fn sign_out(&self) -> Result<bool, IdentityError> {
        Ok(self.lock().signed_in.take().is_some())
    }

    async fn current_user(&self) -> Result<Option<UserInfo>, IdentityError> {
        let state = self.lock();
        let Some(username) = state.signed_in.clone() else {
            return Ok(None);
        };

        let nickname = state
            .accounts
            .get(&username)
            .and_then(|account| account.nickname.clone());

        Ok(Some(UserInfo {
            email: Some(username.clone()),
            username,
            nickname,
            attributes: HashMap::new(),
        }))
    }
}
