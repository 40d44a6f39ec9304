//! Client configuration (layered: code > env > `.env` file).

use std::fmt;
use std::time::Duration;

use bon::Builder;
use chrono_tz::Tz;

use crate::auth::{Authenticator, Credential, OAuthClient, DEFAULT_AUTH_BASE_URL};
use crate::codec::{parse_zone, DEFAULT_TIME_ZONE};
use crate::entity::{Registrant, RegistrantVariant, Webinar, WebinarVariant};
use crate::error::{G2wError, Result};
use crate::transport::{Transport, MAX_REDIRECTS};

pub const DEFAULT_API_BASE_URL: &str = "https://api.getgo.com";

/// Client identity, endpoints and transport options.
///
/// # Example
/// ```
/// use g2w::config::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .api_key("key")
///     .api_secret("secret")
///     .build();
/// # let client = config.oauth_client().unwrap();
/// assert_eq!(client.token_url(), "https://api.getgo.com/oauth/v2/token");
/// assert_eq!(
///     config.organizer_url("42"),
///     "https://api.getgo.com/G2W/rest/organizers/42"
/// );
/// ```
#[derive(Clone, Builder)]
pub struct ClientConfig {
    #[builder(into)]
    pub api_key: String,
    #[builder(into, default)]
    pub api_secret: String,
    #[builder(into, default = DEFAULT_AUTH_BASE_URL.to_string())]
    pub auth_base_url: String,
    #[builder(into, default = DEFAULT_API_BASE_URL.to_string())]
    pub api_base_url: String,
    /// Display zone for entities built from this config.
    #[builder(default = DEFAULT_TIME_ZONE)]
    pub time_zone: Tz,
    #[builder(default = MAX_REDIRECTS)]
    pub max_redirects: usize,
    pub timeout: Option<Duration>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"..")
            .field("auth_base_url", &self.auth_base_url)
            .field("api_base_url", &self.api_base_url)
            .field("time_zone", &self.time_zone)
            .field("max_redirects", &self.max_redirects)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    /// Load from `G2W_*` environment variables, after reading `.env` if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_key = var("G2W_API_KEY")
            .ok_or_else(|| G2wError::Configuration("G2W_API_KEY is not set".to_string()))?;
        let time_zone = match var("G2W_TIME_ZONE") {
            Some(name) => parse_zone(&name).ok_or_else(|| {
                G2wError::Configuration(format!("G2W_TIME_ZONE: unknown time zone {name}"))
            })?,
            None => DEFAULT_TIME_ZONE,
        };
        let max_redirects = match var("G2W_MAX_REDIRECTS") {
            Some(raw) => parse_number("G2W_MAX_REDIRECTS", &raw)?,
            None => MAX_REDIRECTS,
        };
        let timeout = var("G2W_TIMEOUT_SECS")
            .map(|raw| parse_number("G2W_TIMEOUT_SECS", &raw).map(Duration::from_secs))
            .transpose()?;

        Ok(Self::builder()
            .api_key(api_key)
            .api_secret(var("G2W_API_SECRET").unwrap_or_default())
            .auth_base_url(var("G2W_AUTH_BASE_URL").unwrap_or_else(|| DEFAULT_AUTH_BASE_URL.to_string()))
            .api_base_url(var("G2W_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()))
            .time_zone(time_zone)
            .max_redirects(max_redirects)
            .maybe_timeout(timeout)
            .build())
    }

    /// Base URL for resource calls made on behalf of an organizer.
    pub fn organizer_url(&self, organizer_key: &str) -> String {
        format!(
            "{}/G2W/rest/organizers/{organizer_key}",
            self.api_base_url.trim_end_matches('/')
        )
    }

    /// Webinar of the given variant, displayed in the configured zone.
    pub fn webinar(&self, variant: WebinarVariant) -> Webinar {
        Webinar::new(variant).with_time_zone(self.time_zone)
    }

    pub fn registrant(&self, variant: RegistrantVariant) -> Registrant {
        Registrant::new(variant).with_time_zone(self.time_zone)
    }

    /// Unauthenticated credential for this client identity.
    pub fn credential(&self) -> Credential {
        Credential::new(&self.api_key).with_secret(&self.api_secret)
    }

    pub fn transport(&self) -> Result<Transport> {
        Transport::with_options(self.max_redirects, self.timeout)
    }

    pub fn oauth_client(&self) -> Result<OAuthClient> {
        Ok(OAuthClient::new(self.transport()?).with_base_url(&self.auth_base_url))
    }

    /// Authenticator starting from an unauthenticated credential.
    pub fn authenticator(&self) -> Result<Authenticator> {
        Ok(Authenticator::new(self.oauth_client()?, self.credential()))
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| G2wError::Configuration(format!("{name}: expected a number, got {raw}")))
}
