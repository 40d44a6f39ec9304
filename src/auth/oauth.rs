use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use serde_json::json;
use tracing::debug;

use crate::auth::credential::{classify_token_response, Credential};
use crate::error::{G2wError, Result};
use crate::transport::{basic_form_headers, json_headers, text_headers, Method, Transport};

pub const DEFAULT_AUTH_BASE_URL: &str = "https://api.getgo.com";

static LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^Location:(.*)$").expect("location header regex must compile")
});

/// Stateless OAuth2 client for the webinar API.
///
/// Every operation takes a [`Credential`] snapshot and returns a new one;
/// the input is never modified.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    transport: Transport,
    authorize_url: String,
    token_url: String,
    direct_token_url: String,
}

impl OAuthClient {
    pub fn new(transport: Transport) -> Self {
        Self::with_transport_and_base(transport, DEFAULT_AUTH_BASE_URL)
    }

    fn with_transport_and_base(transport: Transport, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            transport,
            authorize_url: format!("{base}/oauth/v2/authorize"),
            token_url: format!("{base}/oauth/v2/token"),
            direct_token_url: format!("{base}/oauth/access_token"),
        }
    }

    /// Point every endpoint at another authorization host.
    pub fn with_base_url(self, base_url: impl AsRef<str>) -> Self {
        Self::with_transport_and_base(self.transport, base_url.as_ref())
    }

    pub fn with_authorize_url(mut self, url: impl Into<String>) -> Self {
        self.authorize_url = url.into();
        self
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn with_direct_token_url(mut self, url: impl Into<String>) -> Self {
        self.direct_token_url = url.into();
        self
    }

    pub fn authorize_url(&self) -> &str {
        &self.authorize_url
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    pub fn direct_token_url(&self) -> &str {
        &self.direct_token_url
    }

    /// Ask the authorization endpoint where the user should log in.
    pub async fn authorization_logon_url(&self, credential: &Credential) -> Result<String> {
        let query = json!({
            "response_type": "code",
            "client_id": credential.api_key(),
        });
        let output = self
            .transport
            .send(&self.authorize_url, Method::OAuth, &query, &text_headers())
            .await?;
        extract_location(&self.authorize_url, output.as_text().unwrap_or_default())
    }

    /// Exchange the pending authorization code unless a session already exists.
    ///
    /// An existing session is returned as is, stale or not.
    pub async fn apply_credentials(&self, credential: &Credential) -> Result<Credential> {
        if credential.session().is_some() {
            debug!(api_key = credential.api_key(), "credential already authorized");
            return Ok(credential.clone());
        }
        let code = credential.response_key().ok_or_else(|| {
            G2wError::InvalidCredentialState("no authorization code to exchange".to_string())
        })?;
        self.exchange_code(credential, code).await
    }

    /// Exchange an authorization code for a token pair.
    pub async fn exchange_code(&self, credential: &Credential, code: &str) -> Result<Credential> {
        let form = json!({
            "grant_type": "authorization_code",
            "code": code,
        });
        let output = self
            .transport
            .send(
                &self.token_url,
                Method::Post,
                &form,
                &basic_form_headers(credential.api_key(), credential.api_secret()),
            )
            .await?;
        let grant = classify_token_response(&output, Utc::now())?;
        debug!(organizer_key = %grant.organizer_key, "authorization code exchanged");
        Ok(credential.clone().granted(grant))
    }

    /// Trade the refresh token for a new token pair.
    pub async fn refresh(&self, credential: &Credential) -> Result<Credential> {
        let refresh_token = credential.refresh_token().ok_or_else(|| {
            G2wError::InvalidCredentialState("no refresh token".to_string())
        })?;
        if credential.refresh_expired_at(Utc::now()) {
            if let Some(issued_at) = credential.token_issued_at() {
                return Err(G2wError::RefreshExpired { issued_at });
            }
        }
        let form = json!({
            "grant_type": "refresh_token",
            "refresh_token": refresh_token,
        });
        let output = self
            .transport
            .send(
                &self.token_url,
                Method::Post,
                &form,
                &basic_form_headers(credential.api_key(), credential.api_secret()),
            )
            .await?;
        let grant = classify_token_response(&output, Utc::now())?;
        debug!(organizer_key = %grant.organizer_key, "token refreshed");
        Ok(credential.clone().granted(grant))
    }

    /// Log in with the organizer's own username and password.
    pub async fn apply_direct_credentials(
        &self,
        credential: &Credential,
        username: &str,
        password: &str,
    ) -> Result<Credential> {
        if credential.session().is_some() {
            debug!(api_key = credential.api_key(), "credential already authorized");
            return Ok(credential.clone());
        }
        if username.is_empty() || password.is_empty() {
            return Err(G2wError::InvalidCredentialState(
                "username and password are required".to_string(),
            ));
        }
        let query = json!({
            "grant_type": "password",
            "user_id": username,
            "password": password,
            "client_id": credential.api_key(),
        });
        let output = self
            .transport
            .send(&self.direct_token_url, Method::Get, &query, &json_headers())
            .await?;
        let grant = classify_token_response(&output, Utc::now())?;
        debug!(organizer_key = %grant.organizer_key, "direct login succeeded");
        Ok(credential.clone().granted(grant))
    }
}

/// Pull the `Location` header value out of raw `OAUTH` output.
pub fn extract_location(url: &str, output: &str) -> Result<String> {
    if output.is_empty() {
        return Err(G2wError::EmptyResponse);
    }
    LOCATION
        .captures(output)
        .and_then(|captures| captures.get(1))
        .map(|value| value.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| G2wError::InvalidRedirect {
            url: url.to_string(),
            output: output.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_is_matched_case_insensitively_and_trimmed() {
        let output = "content-type: text/html\r\nlocation:  https://login.example/?code=abc \r\n\r\nbody";
        assert_eq!(
            extract_location("u", output).unwrap(),
            "https://login.example/?code=abc"
        );
    }

    #[test]
    fn empty_output_and_missing_header() {
        assert!(matches!(
            extract_location("u", ""),
            Err(G2wError::EmptyResponse)
        ));
        assert!(matches!(
            extract_location("u", "content-type: text/html\r\n\r\n"),
            Err(G2wError::InvalidRedirect { url, .. }) if url == "u"
        ));
    }

    #[test]
    fn base_url_drives_every_endpoint() {
        let client = OAuthClient::new(Transport::new().unwrap()).with_base_url("http://h/");
        assert_eq!(client.authorize_url(), "http://h/oauth/v2/authorize");
        assert_eq!(client.token_url(), "http://h/oauth/v2/token");
        assert_eq!(client.direct_token_url(), "http://h/oauth/access_token");
    }
}
