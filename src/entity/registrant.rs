use chrono::DateTime;
use chrono_tz::Tz;
use strum::Display;

use crate::codec::{
    write_zone, Described, Feedable, Field, FieldKind, FieldValue, Hydratable, Node, Schema,
    WireText,
};
use crate::codec::DEFAULT_TIME_ZONE;

static READ_SCHEMA: Schema = &[
    ("firstName", Node::Leaf),
    ("lastName", Node::Leaf),
    ("email", Node::Leaf),
];

static CREATE_SCHEMA: Schema = &[
    ("firstName", Node::Leaf),
    ("lastName", Node::Leaf),
    ("email", Node::Leaf),
    ("address", Node::Leaf),
    ("city", Node::Leaf),
    ("state", Node::Leaf),
    ("zipCode", Node::Leaf),
    ("country", Node::Leaf),
    ("phone", Node::Leaf),
    ("organization", Node::Leaf),
];

static FIELDS: &[Field<Registrant>] = &[
    Field {
        key: "firstName",
        kind: FieldKind::Scalar,
        read: |r| r.first_name.clone().into(),
        write: |r, v| r.first_name = v.into_wire_text(),
    },
    Field {
        key: "lastName",
        kind: FieldKind::Scalar,
        read: |r| r.last_name.clone().into(),
        write: |r, v| r.last_name = v.into_wire_text(),
    },
    Field {
        key: "email",
        kind: FieldKind::Scalar,
        read: |r| r.email.clone().into(),
        write: |r, v| r.email = v.into_wire_text(),
    },
    Field {
        key: "address",
        kind: FieldKind::Scalar,
        read: |r| r.address.clone().into(),
        write: |r, v| r.address = v.into_wire_text(),
    },
    Field {
        key: "city",
        kind: FieldKind::Scalar,
        read: |r| r.city.clone().into(),
        write: |r, v| r.city = v.into_wire_text(),
    },
    Field {
        key: "state",
        kind: FieldKind::Scalar,
        read: |r| r.state.clone().into(),
        write: |r, v| r.state = v.into_wire_text(),
    },
    Field {
        key: "zipCode",
        kind: FieldKind::Scalar,
        read: |r| r.zip_code.clone().into(),
        write: |r, v| r.zip_code = v.into_wire_text(),
    },
    Field {
        key: "country",
        kind: FieldKind::Scalar,
        read: |r| r.country.clone().into(),
        write: |r, v| r.country = v.into_wire_text(),
    },
    Field {
        key: "phone",
        kind: FieldKind::Scalar,
        read: |r| r.phone.clone().into(),
        write: |r, v| r.phone = v.into_wire_text(),
    },
    Field {
        key: "organization",
        kind: FieldKind::Scalar,
        read: |r| r.organization.clone().into(),
        write: |r, v| r.organization = v.into_wire_text(),
    },
    Field {
        key: "registrantKey",
        kind: FieldKind::Scalar,
        read: |r| r.registrant_key.clone().into(),
        write: |r, v| r.registrant_key = v.into_wire_text(),
    },
    Field {
        key: "joinUrl",
        kind: FieldKind::Scalar,
        read: |r| r.join_url.clone().into(),
        write: |r, v| r.join_url = v.into_wire_text(),
    },
    Field {
        key: "status",
        kind: FieldKind::Scalar,
        read: |r| r.status.clone().into(),
        write: |r, v| r.status = v.into_wire_text(),
    },
    Field {
        key: "registrationDate",
        kind: FieldKind::Timestamp,
        read: |r| r.registration_date.into(),
        write: |r, v| r.registration_date = v.into_timestamp(),
    },
    Field {
        key: "timeZone",
        kind: FieldKind::Scalar,
        read: |r| FieldValue::Text(r.time_zone.name().to_string()),
        write: |r, v| write_zone(&mut r.time_zone, v),
    },
];

/// Which outbound payload a [`Registrant`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RegistrantVariant {
    /// Registrants and attendees received from the API.
    #[default]
    Read,
    /// Full registration form.
    Create,
}

/// A webinar registrant or attendee.
#[derive(Debug, Clone, PartialEq)]
pub struct Registrant {
    variant: RegistrantVariant,
    time_zone: Tz,
    pub first_name: Option<WireText>,
    pub last_name: Option<WireText>,
    pub email: Option<WireText>,
    pub address: Option<WireText>,
    pub city: Option<WireText>,
    pub state: Option<WireText>,
    pub zip_code: Option<WireText>,
    pub country: Option<WireText>,
    pub phone: Option<WireText>,
    pub organization: Option<WireText>,
    pub registrant_key: Option<WireText>,
    pub join_url: Option<WireText>,
    pub status: Option<WireText>,
    pub registration_date: Option<DateTime<Tz>>,
}

impl Default for Registrant {
    fn default() -> Self {
        Self::new(RegistrantVariant::Read)
    }
}

impl Registrant {
    pub fn new(variant: RegistrantVariant) -> Self {
        Self {
            variant,
            time_zone: DEFAULT_TIME_ZONE,
            first_name: None,
            last_name: None,
            email: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            country: None,
            phone: None,
            organization: None,
            registrant_key: None,
            join_url: None,
            status: None,
            registration_date: None,
        }
    }

    pub fn read() -> Self {
        Self::new(RegistrantVariant::Read)
    }

    /// Registration form with the three mandatory fields filled in.
    pub fn create(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        let mut registrant = Self::new(RegistrantVariant::Create);
        registrant.first_name = Some(WireText::from(first_name.into()));
        registrant.last_name = Some(WireText::from(last_name.into()));
        registrant.email = Some(WireText::from(email.into()));
        registrant
    }

    pub fn with_time_zone(mut self, time_zone: Tz) -> Self {
        self.time_zone = time_zone;
        self
    }

    pub fn variant(&self) -> RegistrantVariant {
        self.variant
    }
}

impl Described for Registrant {
    fn fields() -> &'static [Field<Self>] {
        FIELDS
    }

    fn time_zone(&self) -> Tz {
        self.time_zone
    }
}

impl Feedable for Registrant {
    fn schema(&self) -> Schema {
        match self.variant {
            RegistrantVariant::Read => READ_SCHEMA,
            RegistrantVariant::Create => CREATE_SCHEMA,
        }
    }
}

impl Hydratable for Registrant {}
