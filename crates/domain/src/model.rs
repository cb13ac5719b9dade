//! Domain models and value objects

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use time::OffsetDateTime;

/// An article record as delivered by the remote News API, before validation.
///
/// Every field is optional: list endpoints are known to contain partial or
/// null entries, and ids arrive as either JSON strings or numbers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawArticle {
    #[serde(deserialize_with = "opaque_id")]
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,
    /// RFC 3339 timestamp (sometimes a bare date) as sent on the wire
    pub published_at: Option<String>,
    pub category: Option<String>,
}

/// A validated article suitable for display and caching
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,
    /// Missing timestamps sort as the epoch (oldest)
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    pub category: Option<String>,
}

/// Outcome of a store fetch operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The source was called and the payload replaced
    Fetched,
    /// The cached payload was still fresh; no remote call was made
    Cached,
}

/// Handle returned by a successful sign-up
#[derive(Debug, Clone)]
pub struct UserHandle {
    pub username: String,
    /// Whether the account is already confirmed (no verification pending)
    pub confirmed: bool,
}

/// Tokens for an authenticated session, held in memory only
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: SecretString,
    pub id_token: Option<SecretString>,
    pub refresh_token: Option<SecretString>,
    pub expires_in_secs: u64,
}

/// Profile of the currently signed-in user
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserInfo {
    pub username: String,
    pub email: Option<String>,
    pub nickname: Option<String>,
    /// Remaining provider attributes, verbatim
    pub attributes: HashMap<String, String>,
}

/// Ids may be JSON strings or numbers; normalize both to a string.
fn opaque_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Number(i64),
    }

    Ok(match Option::<Repr>::deserialize(deserializer)? {
        None => None,
        Some(Repr::Text(text)) => Some(text),
        Some(Repr::Number(number)) => Some(number.to_string()),
    })
}
