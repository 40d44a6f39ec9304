#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use g2w::auth::{Authenticator, Credential, OAuthClient};
use g2w::transport::Transport;
use serde_json::{json, Value};
use wiremock::MockServer;

pub const API_KEY: &str = "key";
pub const API_SECRET: &str = "secret";
/// `base64("key:secret")`
pub const BASIC_AUTH: &str = "Basic a2V5OnNlY3JldA==";

pub fn oauth_client(server: &MockServer) -> OAuthClient {
    OAuthClient::new(Transport::new().expect("transport")).with_base_url(server.uri())
}

pub fn authenticator(server: &MockServer, credential: Credential) -> Authenticator {
    Authenticator::new(oauth_client(server), credential)
}

pub fn fresh_credential() -> Credential {
    Credential::new(API_KEY).with_secret(API_SECRET)
}

pub fn authorized_credential(issued_at: DateTime<Utc>) -> Credential {
    fresh_credential()
        .with_session("old-access", "org-1")
        .with_refresh_token("old-refresh", issued_at)
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days)
}

pub fn token_payload(access: &str, refresh: &str) -> Value {
    json!({
        "access_token": access,
        "organizer_key": "org-1",
        "account_key": "acct-1",
        "expires_in": 3600,
        "refresh_token": refresh
    })
}
