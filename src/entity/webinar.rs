use chrono::DateTime;
use chrono_tz::Tz;
use strum::Display;

use crate::codec::{
    write_zone, Described, Feedable, Field, FieldKind, FieldValue, Hydratable, Node, Schema,
    WireText,
};
use crate::codec::DEFAULT_TIME_ZONE;

const TIMES: Node = Node::List(&[Node::Object(&[
    ("startTime", Node::Leaf),
    ("endTime", Node::Leaf),
])]);

static CREATE_SCHEMA: Schema = &[
    ("subject", Node::Leaf),
    ("description", Node::Leaf),
    ("times", TIMES),
    ("timeZone", Node::Leaf),
    ("type", Node::Leaf),
    ("isPasswordProtected", Node::Leaf),
];

static UPDATE_SCHEMA: Schema = &[
    ("subject", Node::Leaf),
    ("description", Node::Leaf),
    ("times", TIMES),
    ("timeZone", Node::Leaf),
    ("locale", Node::Leaf),
];

static FIELDS: &[Field<Webinar>] = &[
    Field {
        key: "subject",
        kind: FieldKind::Scalar,
        read: |w| w.subject.clone().into(),
        write: |w, v| w.subject = v.into_wire_text(),
    },
    Field {
        key: "description",
        kind: FieldKind::Scalar,
        read: |w| w.description.clone().into(),
        write: |w, v| w.description = v.into_wire_text(),
    },
    Field {
        key: "startTime",
        kind: FieldKind::Timestamp,
        read: |w| w.start_time.into(),
        write: |w, v| w.start_time = v.into_timestamp(),
    },
    Field {
        key: "endTime",
        kind: FieldKind::Timestamp,
        read: |w| w.end_time.into(),
        write: |w, v| w.end_time = v.into_timestamp(),
    },
    Field {
        key: "timeZone",
        kind: FieldKind::Scalar,
        read: |w| FieldValue::Text(w.time_zone.name().to_string()),
        write: |w, v| write_zone(&mut w.time_zone, v),
    },
    Field {
        key: "type",
        kind: FieldKind::Scalar,
        read: |w| w.webinar_type.clone().into(),
        write: |w, v| w.webinar_type = v.into_wire_text(),
    },
    Field {
        key: "isPasswordProtected",
        kind: FieldKind::Scalar,
        read: |w| w.is_password_protected.into(),
        write: |w, v| w.is_password_protected = v.into_bool(),
    },
    Field {
        key: "webinarKey",
        kind: FieldKind::Scalar,
        read: |w| w.webinar_key.clone().into(),
        write: |w, v| w.webinar_key = v.into_wire_text(),
    },
    Field {
        key: "organizerKey",
        kind: FieldKind::Scalar,
        read: |w| w.organizer_key.clone().into(),
        write: |w, v| w.organizer_key = v.into_wire_text(),
    },
    Field {
        key: "registrationUrl",
        kind: FieldKind::Scalar,
        read: |w| w.registration_url.clone().into(),
        write: |w, v| w.registration_url = v.into_wire_text(),
    },
    Field {
        key: "locale",
        kind: FieldKind::Scalar,
        read: |w| w.locale.clone().into(),
        write: |w, v| w.locale = v.into_wire_text(),
    },
];

/// Which outbound payload a [`Webinar`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "snake_case")]
pub enum WebinarVariant {
    /// Received from the API; feeds an empty payload.
    #[default]
    Read,
    Create,
    Update,
}

/// A webinar, in one of its create/update/read variants.
///
/// # Example
/// ```
/// use chrono::TimeZone;
/// use g2w::entity::Webinar;
/// use g2w::codec::Feedable;
///
/// let rome = chrono_tz::Europe::Rome;
/// let mut webinar = Webinar::create();
/// webinar.subject = Some("Ownership in practice".into());
/// webinar.start_time = rome.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).single();
/// webinar.end_time = rome.with_ymd_and_hms(2023, 5, 1, 13, 0, 0).single();
///
/// let wire = webinar.feed();
/// assert_eq!(wire["times"][0]["startTime"], "2023-05-01T10:00:00Z");
/// assert_eq!(wire["type"], "single_session");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Webinar {
    variant: WebinarVariant,
    time_zone: Tz,
    pub subject: Option<WireText>,
    pub description: Option<WireText>,
    pub start_time: Option<DateTime<Tz>>,
    pub end_time: Option<DateTime<Tz>>,
    pub webinar_type: Option<WireText>,
    pub is_password_protected: Option<bool>,
    pub webinar_key: Option<WireText>,
    pub organizer_key: Option<WireText>,
    pub registration_url: Option<WireText>,
    pub locale: Option<WireText>,
}

impl Default for Webinar {
    fn default() -> Self {
        Self::new(WebinarVariant::Read)
    }
}

impl Webinar {
    pub fn new(variant: WebinarVariant) -> Self {
        let mut webinar = Self {
            variant,
            time_zone: DEFAULT_TIME_ZONE,
            subject: None,
            description: None,
            start_time: None,
            end_time: None,
            webinar_type: None,
            is_password_protected: None,
            webinar_key: None,
            organizer_key: None,
            registration_url: None,
            locale: None,
        };
        match variant {
            WebinarVariant::Create => {
                webinar.webinar_type = Some("single_session".into());
                webinar.is_password_protected = Some(false);
            }
            WebinarVariant::Update => webinar.locale = Some("it_IT".into()),
            WebinarVariant::Read => {}
        }
        webinar
    }

    /// Prototype for webinars received from the API.
    pub fn read() -> Self {
        Self::new(WebinarVariant::Read)
    }

    pub fn create() -> Self {
        Self::new(WebinarVariant::Create)
    }

    /// Update payload for an existing webinar.
    pub fn update(webinar_key: impl Into<String>) -> Self {
        let mut webinar = Self::new(WebinarVariant::Update);
        webinar.webinar_key = Some(WireText::from(webinar_key.into()));
        webinar
    }

    pub fn with_time_zone(mut self, time_zone: Tz) -> Self {
        self.time_zone = time_zone;
        self
    }

    pub fn variant(&self) -> WebinarVariant {
        self.variant
    }
}

impl Described for Webinar {
    fn fields() -> &'static [Field<Self>] {
        FIELDS
    }

    fn time_zone(&self) -> Tz {
        self.time_zone
    }
}

impl Feedable for Webinar {
    fn schema(&self) -> Schema {
        match self.variant {
            WebinarVariant::Create => CREATE_SCHEMA,
            WebinarVariant::Update => UPDATE_SCHEMA,
            WebinarVariant::Read => &[],
        }
    }
}

impl Hydratable for Webinar {}
