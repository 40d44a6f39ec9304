use reqwest::header::HeaderMap;
use tracing::debug;

use crate::auth::credential::{Credential, CredentialState};
use crate::auth::oauth::OAuthClient;
use crate::error::{G2wError, Result};
use crate::transport::bearer_headers;

/// Stateful OAuth2 session: an [`OAuthClient`] plus the current snapshot.
///
/// The snapshot is replaced only when an operation succeeds.
///
/// # Example
/// ```no_run
/// use g2w::auth::{Authenticator, Credential, OAuthClient};
/// use g2w::transport::Transport;
///
/// # async fn example() -> g2w::error::Result<()> {
/// let credential = Credential::new("api-key").with_secret("api-secret");
/// let mut auth = Authenticator::new(OAuthClient::new(Transport::new()?), credential);
/// let logon = auth.authorization_logon_url().await?;
/// println!("log in at {logon}");
/// // ... the redirect comes back with ?code=...
/// auth.set_response_key("code-from-redirect");
/// auth.apply_credentials().await?;
/// let headers = auth.bearer_headers()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Authenticator {
    client: OAuthClient,
    credential: Credential,
}

impl Authenticator {
    pub fn new(client: OAuthClient, credential: Credential) -> Self {
        Self { client, credential }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn state(&self) -> CredentialState {
        self.credential.state()
    }

    pub fn client(&self) -> &OAuthClient {
        &self.client
    }

    pub fn into_credential(self) -> Credential {
        self.credential
    }

    pub fn set_response_key(&mut self, response_key: impl Into<String>) {
        self.credential = self.credential.clone().with_response_key(response_key);
        debug!(state = %self.credential.state(), "authorization code received");
    }

    pub async fn authorization_logon_url(&self) -> Result<String> {
        self.client.authorization_logon_url(&self.credential).await
    }

    pub async fn apply_credentials(&mut self) -> Result<&Credential> {
        self.credential = self.client.apply_credentials(&self.credential).await?;
        Ok(&self.credential)
    }

    pub async fn refresh_token_info(&mut self) -> Result<&Credential> {
        self.credential = self.client.refresh(&self.credential).await?;
        Ok(&self.credential)
    }

    pub async fn apply_direct_credentials(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<&Credential> {
        self.credential = self
            .client
            .apply_direct_credentials(&self.credential, username, password)
            .await?;
        Ok(&self.credential)
    }

    pub fn access_token(&self) -> Option<&str> {
        self.credential.access_token()
    }

    pub fn organizer_key(&self) -> Option<&str> {
        self.credential.organizer_key()
    }

    /// Headers for a resource call; fails until the session is authorized.
    pub fn bearer_headers(&self) -> Result<HeaderMap> {
        self.access_token().map(bearer_headers).ok_or_else(|| {
            G2wError::InvalidCredentialState(format!(
                "credential is {}, not authorized",
                self.credential.state()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Transport;
    use reqwest::header::AUTHORIZATION;

    fn authenticator(credential: Credential) -> Authenticator {
        Authenticator::new(OAuthClient::new(Transport::new().unwrap()), credential)
    }

    #[test]
    fn bearer_headers_require_a_session() {
        let auth = authenticator(Credential::new("key"));
        let err = auth.bearer_headers().unwrap_err();
        assert!(err.to_string().contains("unauthenticated"));

        let auth = authenticator(Credential::new("key").with_session("tok", "org"));
        let headers = auth.bearer_headers().unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok");
        assert_eq!(auth.organizer_key(), Some("org"));
    }

    #[test]
    fn response_key_moves_state_forward() {
        let mut auth = authenticator(Credential::new("key"));
        auth.set_response_key("code");
        assert_eq!(auth.state(), CredentialState::AwaitingExchange);
        assert_eq!(auth.credential().response_key(), Some("code"));
    }
}
