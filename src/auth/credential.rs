use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::Display;

use crate::error::{G2wError, Result};
use crate::transport::WireResponse;

/// How long a refresh token stays usable after issuance.
pub const REFRESH_TOKEN_LIFETIME_DAYS: i64 = 365;

/// Access token and organizer key; issued together, never apart.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub organizer_key: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("organizer_key", &self.organizer_key)
            .finish()
    }
}

/// Where a [`Credential`] sits in the OAuth2 lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum CredentialState {
    /// Only the client identity is known.
    Unauthenticated,
    /// An authorization code is waiting to be exchanged.
    AwaitingExchange,
    Authorized,
}

/// Immutable snapshot of an OAuth2 session.
///
/// Every transition returns a new snapshot; a failed exchange or refresh
/// leaves the previous one untouched.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    api_key: String,
    api_secret: String,
    session: Option<Session>,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
    token_issued_at: Option<DateTime<Utc>>,
    response_key: Option<String>,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |set: bool| if set { "<redacted>" } else { "<none>" };
        f.debug_struct("Credential")
            .field("api_key", &self.api_key)
            .field("api_secret", &redact(!self.api_secret.is_empty()))
            .field("session", &self.session)
            .field("refresh_token", &redact(self.refresh_token.is_some()))
            .field("expires_in", &self.expires_in)
            .field("token_issued_at", &self.token_issued_at)
            .field("response_key", &redact(self.response_key.is_some()))
            .finish()
    }
}

impl Credential {
    /// Unauthenticated credential for the given client key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: String::new(),
            session: None,
            refresh_token: None,
            expires_in: None,
            token_issued_at: None,
            response_key: None,
        }
    }

    pub fn with_secret(mut self, api_secret: impl Into<String>) -> Self {
        self.api_secret = api_secret.into();
        self
    }

    /// Attach the authorization code received on the redirect.
    pub fn with_response_key(mut self, response_key: impl Into<String>) -> Self {
        self.response_key = Some(response_key.into());
        self
    }

    /// Seed an existing session, e.g. one kept by the embedding application.
    pub fn with_session(
        mut self,
        access_token: impl Into<String>,
        organizer_key: impl Into<String>,
    ) -> Self {
        self.session = Some(Session {
            access_token: access_token.into(),
            organizer_key: organizer_key.into(),
        });
        self
    }

    pub fn with_refresh_token(
        mut self,
        refresh_token: impl Into<String>,
        issued_at: DateTime<Utc>,
    ) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self.token_issued_at = Some(issued_at);
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.access_token.as_str())
    }

    pub fn organizer_key(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.organizer_key.as_str())
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Lifetime reported by the server, in seconds. Informational only.
    pub fn expires_in(&self) -> Option<u64> {
        self.expires_in
    }

    pub fn token_issued_at(&self) -> Option<DateTime<Utc>> {
        self.token_issued_at
    }

    pub fn response_key(&self) -> Option<&str> {
        self.response_key.as_deref()
    }

    pub fn state(&self) -> CredentialState {
        match (&self.session, &self.response_key) {
            (Some(_), _) => CredentialState::Authorized,
            (None, Some(_)) => CredentialState::AwaitingExchange,
            (None, None) => CredentialState::Unauthenticated,
        }
    }

    /// Instant after which the refresh token is no longer accepted.
    pub fn refresh_expires_at(&self) -> Option<DateTime<Utc>> {
        self.token_issued_at
            .map(|issued_at| issued_at + Duration::days(REFRESH_TOKEN_LIFETIME_DAYS))
    }

    /// A credential with no issuance time never counts as expired.
    pub fn refresh_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.refresh_expires_at()
            .is_some_and(|expires_at| now > expires_at)
    }

    /// Apply a successful grant. The authorization code is single-use and
    /// is dropped.
    pub fn granted(mut self, grant: TokenGrant) -> Self {
        self.session = Some(Session {
            access_token: grant.access_token,
            organizer_key: grant.organizer_key,
        });
        self.refresh_token = Some(grant.refresh_token);
        self.expires_in = grant.expires_in;
        self.token_issued_at = Some(grant.issued_at);
        self.response_key = None;
        self
    }
}

/// Token quadruple returned by a successful exchange, refresh or direct login.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub organizer_key: String,
    pub refresh_token: String,
    pub expires_in: Option<u64>,
    pub issued_at: DateTime<Utc>,
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("organizer_key", &self.organizer_key)
            .field("expires_in", &self.expires_in)
            .field("issued_at", &self.issued_at)
            .finish_non_exhaustive()
    }
}

const GRANT_KEYS: [&str; 4] = ["access_token", "organizer_key", "expires_in", "refresh_token"];

/// Classify a token-endpoint response; first match wins.
///
/// 1. empty output fails with [`G2wError::EmptyResponse`]
/// 2. a `msg` field is a remote error
/// 3. so is an `int_error_code` (or `int_err_code`) field
/// 4. the full token quadruple is a grant stamped with `issued_at`
/// 5. any other mapping is [`G2wError::Rejected`] with its contents
/// 6. anything else is [`G2wError::MalformedOutput`]
pub fn classify_token_response(
    response: &WireResponse,
    issued_at: DateTime<Utc>,
) -> Result<TokenGrant> {
    if response.is_empty() {
        return Err(G2wError::EmptyResponse);
    }
    let payload = match response {
        WireResponse::Json(payload) => payload,
        WireResponse::Text(text) => return Err(G2wError::MalformedOutput(text.clone())),
    };
    let map = match payload {
        Value::Object(map) => map,
        Value::Array(items) => {
            return Err(G2wError::Rejected {
                errors: items.iter().map(scalar_text).collect(),
            })
        }
        other => return Err(G2wError::MalformedOutput(other.to_string())),
    };

    let code = error_code(map);
    if let Some(message) = present(map, "msg") {
        return Err(G2wError::Remote {
            code,
            message: scalar_text(message),
        });
    }
    if let Some(code) = code {
        return Err(G2wError::Remote {
            message: code.clone(),
            code: Some(code),
        });
    }
    if let Some(grant) = grant_from(map, issued_at) {
        return Ok(grant);
    }
    Err(G2wError::Rejected {
        errors: map
            .iter()
            .map(|(key, value)| format!("{key}: {}", scalar_text(value)))
            .collect(),
    })
}

fn error_code(map: &Map<String, Value>) -> Option<String> {
    present(map, "int_error_code")
        .or_else(|| present(map, "int_err_code"))
        .map(scalar_text)
}

/// A key set to `null` counts as absent.
fn present<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|value| !value.is_null())
}

fn grant_from(map: &Map<String, Value>, issued_at: DateTime<Utc>) -> Option<TokenGrant> {
    if GRANT_KEYS
        .iter()
        .any(|key| map.get(*key).map_or(true, Value::is_null))
    {
        return None;
    }
    let expires_in = &map["expires_in"];
    Some(TokenGrant {
        access_token: scalar_text(&map["access_token"]),
        organizer_key: scalar_text(&map["organizer_key"]),
        refresh_token: scalar_text(&map["refresh_token"]),
        expires_in: expires_in
            .as_u64()
            .or_else(|| expires_in.as_str().and_then(|s| s.trim().parse().ok())),
        issued_at,
    })
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn quadruple() -> Value {
        json!({
            "access_token": "at-1",
            "organizer_key": 300000000000384444u64,
            "expires_in": "3600",
            "refresh_token": "rt-1"
        })
    }

    #[test]
    fn state_follows_fields() {
        let credential = Credential::new("key");
        assert_eq!(credential.state(), CredentialState::Unauthenticated);
        let credential = credential.with_response_key("code");
        assert_eq!(credential.state(), CredentialState::AwaitingExchange);
        let credential = credential.with_session("tok", "org");
        assert_eq!(credential.state(), CredentialState::Authorized);
        assert_eq!(credential.state().to_string(), "authorized");
    }

    #[test]
    fn grant_sets_everything_and_drops_code() {
        let issued = at(2024, 3, 1);
        let grant =
            classify_token_response(&WireResponse::Json(quadruple()), issued).unwrap();
        let credential = Credential::new("key").with_response_key("code").granted(grant);
        assert_eq!(credential.access_token(), Some("at-1"));
        assert_eq!(credential.organizer_key(), Some("300000000000384444"));
        assert_eq!(credential.refresh_token(), Some("rt-1"));
        assert_eq!(credential.expires_in(), Some(3600));
        assert_eq!(credential.token_issued_at(), Some(issued));
        assert_eq!(credential.response_key(), None);
    }

    #[test]
    fn msg_wins_over_a_valid_quadruple() {
        let mut payload = quadruple();
        payload["msg"] = json!("Invalid token passed");
        let err = classify_token_response(&WireResponse::Json(payload), Utc::now()).unwrap_err();
        assert!(matches!(err, G2wError::Remote { message, .. } if message == "Invalid token passed"));
    }

    #[test]
    fn null_error_fields_do_not_block_a_grant() {
        let mut payload = quadruple();
        payload["msg"] = Value::Null;
        payload["int_error_code"] = Value::Null;
        let grant = classify_token_response(&WireResponse::Json(payload), Utc::now()).unwrap();
        assert_eq!(grant.access_token, "at-1");
    }

    #[test]
    fn error_code_alone_is_remote() {
        for key in ["int_error_code", "int_err_code"] {
            let err = classify_token_response(
                &WireResponse::Json(json!({ key: "InvalidToken" })),
                Utc::now(),
            )
            .unwrap_err();
            assert!(matches!(
                err,
                G2wError::Remote { code: Some(code), .. } if code == "InvalidToken"
            ));
        }
    }

    #[test]
    fn partial_or_null_quadruple_is_rejected() {
        let mut payload = quadruple();
        payload["refresh_token"] = Value::Null;
        let err = classify_token_response(&WireResponse::Json(payload), Utc::now()).unwrap_err();
        let G2wError::Rejected { errors } = err else {
            panic!("expected rejection");
        };
        assert!(errors.contains(&"refresh_token: null".to_string()));
        assert!(errors.contains(&"access_token: at-1".to_string()));
    }

    #[test]
    fn empty_and_non_mapping_outputs() {
        assert!(matches!(
            classify_token_response(&WireResponse::Json(json!({})), Utc::now()),
            Err(G2wError::EmptyResponse)
        ));
        assert!(matches!(
            classify_token_response(&WireResponse::Text(String::new()), Utc::now()),
            Err(G2wError::EmptyResponse)
        ));
        assert!(matches!(
            classify_token_response(&WireResponse::Text("<html>".into()), Utc::now()),
            Err(G2wError::MalformedOutput(_))
        ));
        assert!(matches!(
            classify_token_response(&WireResponse::Json(json!(42)), Utc::now()),
            Err(G2wError::MalformedOutput(_))
        ));
    }

    #[test]
    fn refresh_expiry_is_one_year_after_issuance() {
        let credential = Credential::new("key").with_refresh_token("rt", at(2023, 1, 1));
        assert!(!credential.refresh_expired_at(at(2024, 1, 1)));
        assert!(credential.refresh_expired_at(at(2024, 1, 2)));
        assert!(!Credential::new("key").refresh_expired_at(at(2099, 1, 1)));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let credential = Credential::new("key")
            .with_secret("shh")
            .with_session("access-secret", "org")
            .with_refresh_token("refresh-secret", Utc::now());
        let debug = format!("{credential:?}");
        assert!(!debug.contains("shh"));
        assert!(!debug.contains("access-secret"));
        assert!(!debug.contains("refresh-secret"));
        assert!(debug.contains("org"));
    }

    #[test]
    fn snapshot_round_trips_through_serde() {
        let credential = Credential::new("key")
            .with_secret("secret")
            .with_session("tok", "org")
            .with_refresh_token("rt", at(2024, 5, 1));
        let text = serde_json::to_string(&credential).unwrap();
        let back: Credential = serde_json::from_str(&text).unwrap();
        assert_eq!(back, credential);
    }
}
