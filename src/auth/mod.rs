//! OAuth2 credential lifecycle.
//!
//! [`Credential`] is an immutable snapshot, [`OAuthClient`] turns one
//! snapshot into the next over HTTP, and [`Authenticator`] keeps the current
//! snapshot for callers that want a single mutable session.

pub mod authenticator;
pub mod credential;
pub mod oauth;

pub use authenticator::Authenticator;
pub use credential::{
    classify_token_response, Credential, CredentialState, Session, TokenGrant,
    REFRESH_TOKEN_LIFETIME_DAYS,
};
pub use oauth::{extract_location, OAuthClient, DEFAULT_AUTH_BASE_URL};
