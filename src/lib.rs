//! g2w: GoToWebinar client core
//!
//! OAuth2 credential lifecycle, a declarative entity codec with UTC wire
//! timestamps, and the HTTP transport and response processing they share.
//! Per-resource endpoint wrappers build on top of these pieces.
//!
//! # Quick Start
//!
//! ```no_run
//! use g2w::prelude::*;
//!
//! # async fn example() -> g2w::error::Result<()> {
//! let config = ClientConfig::from_env()?;
//! let mut auth = config.authenticator()?;
//! auth.set_response_key("code-from-redirect");
//! auth.apply_credentials().await?;
//!
//! let organizer = auth.organizer_key().unwrap_or_default().to_string();
//! let transport = config.transport()?;
//! let output = transport
//!     .send(
//!         &format!("{}/webinars", config.organizer_url(&organizer)),
//!         Method::Get,
//!         &serde_json::json!({}),
//!         &auth.bearer_headers()?,
//!     )
//!     .await?
//!     .into_json()?;
//! let webinars = process(&output, false, Webinar::read())?.into_vec();
//! println!("{} webinars", webinars.len());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod codec;
pub mod config;
pub mod entity;
pub mod error;
pub mod prelude;
pub mod response;
pub mod transport;
