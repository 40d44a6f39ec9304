//! Convenience re-exports for common use.

pub use crate::auth::{Authenticator, Credential, CredentialState, OAuthClient};
pub use crate::codec::{Described, Feedable, FieldKind, FieldValue, Hydratable, WireText};
pub use crate::config::ClientConfig;
pub use crate::entity::{Registrant, RegistrantVariant, Webinar, WebinarVariant};
pub use crate::error::{ErrorCategory, G2wError, Result};
pub use crate::response::{process, Processed};
pub use crate::transport::{Method, Transport, WireResponse};
