//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::{RawArticle, Session, UserHandle, UserInfo};

/// Error type for news source operations.
///
/// `Clone + PartialEq` so the latest error can be held in observable state
/// and asserted on directly in tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Network failure or non-success HTTP status
    #[error("transport error: {0}")]
    Transport(String),
    /// The per-call deadline elapsed before a response arrived
    #[error("request timed out")]
    Timeout,
    /// Response shape invalid, including HTML disguised as JSON
    #[error("malformed response: {0}")]
    Contract(String),
}

/// Port for fetching articles from the remote News API
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Fetch the full article list across categories
    async fn all_news(&self) -> Result<Vec<RawArticle>, FetchError>;

    /// Fetch the article list for a single category
    async fn category_news(&self, category: &str) -> Result<Vec<RawArticle>, FetchError>;

    /// Fetch a single article's detail record
    async fn news_detail(&self, category: &str, id: &str) -> Result<RawArticle, FetchError>;
}

/// Error type for identity provider operations
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Credentials rejected or account in an unusable state
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Contract(String),
    /// An operation that needs a session was called without one
    #[error("not signed in")]
    NotSignedIn,
}

/// Port for the third-party identity service
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new account; nickname is optional profile data
    async fn sign_up(
        &self,
        username: &str,
        password: &SecretString,
        nickname: Option<&str>,
    ) -> Result<UserHandle, IdentityError>;

    /// Authenticate and establish a session
    async fn sign_in(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<Session, IdentityError>;

    /// End the current session; returns whether one existed
    async fn sign_out(&self) -> Result<bool, IdentityError>;

    /// Resolve the currently signed-in user, if any
    async fn current_user(&self) -> Result<Option<UserInfo>, IdentityError>;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
