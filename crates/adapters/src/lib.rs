//! newsdesk adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `news`: News API clients (HTTP and stub)
//! - `identity`: identity providers (Cognito and stub)

mod identity_cognito;
mod identity_stub;
mod news_http;
mod news_stub;

/// Re-exports for news source adapters
pub mod news {
    pub use crate::news_http::HttpNewsSource;
    pub use crate::news_stub::StubNewsSource;
}

/// Re-exports for identity adapters
pub mod identity {
    pub use crate::identity_cognito::CognitoIdentityProvider;
    pub use crate::identity_stub::StubIdentityProvider;
}
