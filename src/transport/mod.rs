//! Single-request HTTP transport.
//!
//! `send` applies the method-specific encoding (query string, form, JSON or
//! raw multipart body) and decodes the response according to the request's
//! `Accept` header: JSON is parsed into a generic mapping, anything else is
//! handed back as raw text.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::redirect::Policy;
use reqwest::RequestBuilder;
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString};
use tracing::{debug, warn};

use crate::error::{G2wError, Result};

pub const MIME_X_WWW_FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
pub const MIME_MULTIPART_FORM_DATA: &str = "multipart/form-data";
pub const MIME_JSON: &str = "application/json";
pub const MIME_TEXT: &str = "text/plain";

/// Redirects followed by a `GET` before giving up.
pub const MAX_REDIRECTS: usize = 5;

/// Request methods understood by [`Transport::send`].
///
/// `OAUTH` is a pseudo-method: a `GET` that never follows redirects and
/// returns the raw response headers together with the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString)]
pub enum Method {
    #[strum(serialize = "GET")]
    Get,
    #[strum(serialize = "POST")]
    Post,
    #[strum(serialize = "PUT")]
    Put,
    #[strum(serialize = "DELETE")]
    Delete,
    #[strum(serialize = "OAUTH")]
    OAuth,
}

impl Method {
    /// Parse a method name, failing with [`G2wError::InvalidMethod`].
    pub fn parse(name: &str) -> Result<Self> {
        name.parse()
            .map_err(|_| G2wError::InvalidMethod(name.to_string()))
    }

    fn http(self) -> reqwest::Method {
        match self {
            Self::Get | Self::OAuth => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A decoded response.
#[derive(Debug, Clone, PartialEq)]
pub enum WireResponse {
    /// Body parsed because the request accepted JSON.
    Json(Value),
    /// Raw text, including the header block for `OAUTH` requests.
    Text(String),
}

impl WireResponse {
    /// Empty text, `null`, `{}` or `[]`.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Json(Value::Null) => true,
            Self::Json(Value::Object(map)) => map.is_empty(),
            Self::Json(Value::Array(items)) => items.is_empty(),
            Self::Json(_) => false,
            Self::Text(text) => text.is_empty(),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Json(_) => None,
            Self::Text(text) => Some(text),
        }
    }

    /// Take the JSON body, failing with [`G2wError::MalformedOutput`] on raw text.
    pub fn into_json(self) -> Result<Value> {
        match self {
            Self::Json(value) => Ok(value),
            Self::Text(text) => Err(G2wError::MalformedOutput(text)),
        }
    }
}

/// HTTP transport holding one redirect-following and one non-following client.
///
/// # Example
/// ```no_run
/// use g2w::transport::{json_headers, Method, Transport};
///
/// # async fn example() -> g2w::error::Result<()> {
/// let transport = Transport::new()?;
/// let response = transport
///     .send(
///         "https://api.getgo.com/G2W/rest/organizers/1/webinars",
///         Method::Get,
///         &serde_json::json!({}),
///         &json_headers(),
///     )
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Transport {
    following: reqwest::Client,
    direct: reqwest::Client,
}

impl Transport {
    /// Transport with the default redirect bound and no timeout.
    pub fn new() -> Result<Self> {
        Self::with_options(MAX_REDIRECTS, None)
    }

    pub fn with_options(max_redirects: usize, timeout: Option<Duration>) -> Result<Self> {
        let mut following = reqwest::Client::builder().redirect(Policy::limited(max_redirects));
        let mut direct = reqwest::Client::builder().redirect(Policy::none());
        if let Some(timeout) = timeout {
            following = following.timeout(timeout);
            direct = direct.timeout(timeout);
        }
        Ok(Self {
            following: following.build()?,
            direct: direct.build()?,
        })
    }

    /// Issue one request and decode its response.
    pub async fn send(
        &self,
        url: &str,
        method: Method,
        data: &Value,
        headers: &HeaderMap,
    ) -> Result<WireResponse> {
        debug!(
            method = %method,
            url,
            headers = ?traced_header_lines(headers),
            "g2w request"
        );

        let builder = match method {
            Method::Post | Method::Put => {
                with_body(self.direct.request(method.http(), url), headers, data)
            }
            Method::Get => self.following.get(url).query(&query_pairs(data)),
            Method::OAuth => self.direct.get(url).query(&query_pairs(data)),
            Method::Delete => self.direct.delete(url),
        };

        let response = builder.headers(headers.clone()).send().await?;
        let status = response.status();
        debug!(method = %method, url, status = status.as_u16(), "g2w response");

        let head = (method == Method::OAuth).then(|| raw_head(response.headers()));
        let body = response.text().await?;

        if accepts_json(headers) {
            return Ok(WireResponse::Json(decode_json(&body)));
        }
        Ok(WireResponse::Text(match head {
            Some(head) => format!("{head}{body}"),
            None => body,
        }))
    }
}

/// Flatten a header map into `"Key: Value"` lines.
pub fn header_lines(headers: &HeaderMap) -> Vec<String> {
    headers
        .iter()
        .map(|(name, value)| format!("{}: {}", name, value.to_str().unwrap_or_default()))
        .collect()
}

fn traced_header_lines(headers: &HeaderMap) -> Vec<String> {
    let mut redacted = headers.clone();
    if redacted.contains_key(AUTHORIZATION) {
        redacted.insert(AUTHORIZATION, HeaderValue::from_static("<redacted>"));
    }
    header_lines(&redacted)
}

/// Headers for a resource call authorized by a bearer token.
pub fn bearer_headers(access_token: &str) -> HeaderMap {
    let mut headers = json_headers();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(MIME_JSON));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {access_token}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

/// Headers for a token-endpoint call authenticated with the client identity.
pub fn basic_form_headers(api_key: &str, api_secret: &str) -> HeaderMap {
    let mut headers = json_headers();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static(MIME_X_WWW_FORM_URLENCODED),
    );
    let encoded = STANDARD.encode(format!("{api_key}:{api_secret}"));
    if let Ok(val) = HeaderValue::from_str(&format!("Basic {encoded}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

/// `Accept: application/json`.
pub fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(MIME_JSON));
    headers
}

/// `Accept: text/plain`.
pub fn text_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(MIME_TEXT));
    headers
}

/// Flatten request data into query/form pairs.
///
/// Nested values use bracket notation (`times[0][startTime]`), booleans
/// become `1`/`0` and nulls are dropped.
pub fn query_pairs(data: &Value) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    match data {
        Value::Object(map) => {
            for (key, value) in map {
                flatten_into(key.clone(), value, &mut pairs);
            }
        }
        Value::Array(items) => {
            for (index, value) in items.iter().enumerate() {
                flatten_into(index.to_string(), value, &mut pairs);
            }
        }
        _ => {}
    }
    pairs
}

fn flatten_into(prefix: String, value: &Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(flag) => pairs.push((prefix, if *flag { "1" } else { "0" }.to_string())),
        Value::Number(number) => pairs.push((prefix, number.to_string())),
        Value::String(text) => pairs.push((prefix, text.clone())),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_into(format!("{prefix}[{index}]"), item, pairs);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                flatten_into(format!("{prefix}[{key}]"), item, pairs);
            }
        }
    }
}

fn with_body(builder: RequestBuilder, headers: &HeaderMap, data: &Value) -> RequestBuilder {
    match header_str(headers, CONTENT_TYPE) {
        Some(MIME_X_WWW_FORM_URLENCODED) => builder.form(&query_pairs(data)),
        Some(MIME_JSON) => builder.json(data),
        Some(content_type) if content_type.starts_with(MIME_MULTIPART_FORM_DATA) => {
            builder.body(raw_body(data))
        }
        _ => builder,
    }
}

/// Multipart bodies are prepared by the caller and sent as they are.
fn raw_body(data: &Value) -> String {
    match data {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn header_str(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn accepts_json(headers: &HeaderMap) -> bool {
    header_str(headers, ACCEPT) == Some(MIME_JSON)
}

fn raw_head(headers: &HeaderMap) -> String {
    let mut head = String::new();
    for line in header_lines(headers) {
        head.push_str(&line);
        head.push_str("\r\n");
    }
    if !head.is_empty() {
        head.push_str("\r\n");
    }
    head
}

fn decode_json(body: &str) -> Value {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(error) => {
            if !body.is_empty() {
                warn!(error = %error, "g2w response body is not JSON; treating as empty");
            }
            Value::Object(Map::new())
        }
    }
}
