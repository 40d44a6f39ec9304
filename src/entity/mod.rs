//! Webinar-API entities and their outbound variants.

pub mod registrant;
pub mod webinar;

pub use registrant::{Registrant, RegistrantVariant};
pub use webinar::{Webinar, WebinarVariant};
