//! Declarative entity codec.
//!
//! Every entity publishes a table of [`Field`] descriptors, one per wire key,
//! and each outbound variant declares a [`Schema`]. [`feed`] walks the schema
//! and asks the descriptors for values; [`hydrate`] walks an inbound payload
//! and hands every keyed scalar to the descriptor with the same key.
//! Only descriptors of kind [`FieldKind::Timestamp`] parse wire timestamps;
//! text fields keep their value as received, numbers included.
//!
//! Descriptors are looked up by key alone, whatever the nesting depth, so a
//! key reused inside a nested object writes the same field as the top-level
//! key (the last one seen wins).

pub mod timestamp;

use std::fmt;
use std::ops::Deref;

use chrono::DateTime;
use chrono_tz::Tz;
use serde_json::{Map, Number, Value};
use tracing::warn;

pub use timestamp::{format_wire, parse_wire, parse_zone, DEFAULT_TIME_ZONE};

/// A single field value crossing the codec.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    Timestamp(DateTime<Tz>),
}

impl FieldValue {
    /// Type-directed inbound transform; `None` for containers.
    ///
    /// For [`FieldKind::Timestamp`] descriptors, strings shaped like a wire
    /// timestamp become [`FieldValue::Timestamp`] in `zone`. Every other
    /// scalar passes through unchanged.
    pub fn from_wire(value: &Value, kind: FieldKind, zone: Tz) -> Option<Self> {
        match value {
            Value::Null => Some(Self::Null),
            Value::Bool(flag) => Some(Self::Bool(*flag)),
            Value::Number(number) => Some(Self::Number(number.clone())),
            Value::String(text) => Some(match kind {
                FieldKind::Timestamp => match parse_wire(text, zone) {
                    Some(at) => Self::Timestamp(at),
                    None => Self::Text(text.clone()),
                },
                FieldKind::Scalar => Self::Text(text.clone()),
            }),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Outbound form; timestamps are rendered in UTC.
    pub fn to_wire(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(flag) => Value::Bool(*flag),
            Self::Number(number) => Value::Number(number.clone()),
            Self::Text(text) => Value::String(text.clone()),
            Self::Timestamp(at) => Value::String(format_wire(at)),
        }
    }

    /// Text form of any scalar; `None` for null.
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(flag) => Some(flag.to_string()),
            Self::Number(number) => Some(number.to_string()),
            Self::Text(text) => Some(text),
            Self::Timestamp(at) => Some(format_wire(&at)),
        }
    }

    /// Text that remembers whether it arrived as a JSON number.
    pub fn into_wire_text(self) -> Option<WireText> {
        match self {
            Self::Number(number) => Some(WireText::from(number)),
            other => other.into_text().map(WireText::from),
        }
    }

    pub fn into_timestamp(self) -> Option<DateTime<Tz>> {
        match self {
            Self::Timestamp(at) => Some(at),
            _ => None,
        }
    }

    /// Booleans, plus the `"true"`/`"false"` and `1`/`0` spellings.
    pub fn into_bool(self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(flag),
            Self::Text(text) => match text.as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            Self::Number(number) => number.as_i64().map(|n| n != 0),
            _ => None,
        }
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Null, Self::Text)
    }
}

impl From<Option<WireText>> for FieldValue {
    fn from(value: Option<WireText>) -> Self {
        match value {
            None => Self::Null,
            Some(WireText { number: Some(number), .. }) => Self::Number(number),
            Some(WireText { text, .. }) => Self::Text(text),
        }
    }
}

impl From<Option<bool>> for FieldValue {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Self::Null, Self::Bool)
    }
}

impl From<Option<DateTime<Tz>>> for FieldValue {
    fn from(value: Option<DateTime<Tz>>) -> Self {
        value.map_or(Self::Null, Self::Timestamp)
    }
}

/// Free-form wire text.
///
/// Keeps the JSON number a value arrived as, so feeding it back emits a
/// number again. Dereferences to its text form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WireText {
    text: String,
    number: Option<Number>,
}

impl WireText {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_number(&self) -> bool {
        self.number.is_some()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl Deref for WireText {
    type Target = str;

    fn deref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for WireText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<String> for WireText {
    fn from(text: String) -> Self {
        Self { text, number: None }
    }
}

impl From<&str> for WireText {
    fn from(text: &str) -> Self {
        Self::from(text.to_string())
    }
}

impl From<Number> for WireText {
    fn from(number: Number) -> Self {
        Self {
            text: number.to_string(),
            number: Some(number),
        }
    }
}

impl PartialEq<str> for WireText {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl PartialEq<&str> for WireText {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

/// How a descriptor wants inbound strings treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldKind {
    /// Passed through as received.
    #[default]
    Scalar,
    /// Parsed as a wire timestamp into the entity's display zone.
    Timestamp,
}

/// Reader/writer pair bound to one wire key.
pub struct Field<E> {
    pub key: &'static str,
    pub kind: FieldKind,
    pub read: fn(&E) -> FieldValue,
    pub write: fn(&mut E, FieldValue),
}

/// Shape of one outbound schema entry.
#[derive(Debug, Clone, Copy)]
pub enum Node {
    /// Placeholder filled from the descriptor with the same key (null otherwise).
    Leaf,
    Object(Schema),
    List(&'static [Node]),
}

/// Ordered wire keys of an outbound payload.
pub type Schema = &'static [(&'static str, Node)];

/// An entity with a descriptor table and a display timezone.
pub trait Described: Sized + 'static {
    fn fields() -> &'static [Field<Self>];

    /// Zone inbound timestamps are converted into.
    fn time_zone(&self) -> Tz;

    fn field(key: &str) -> Option<&'static Field<Self>> {
        Self::fields().iter().find(|field| field.key == key)
    }
}

/// Entities that can produce an outbound wire payload.
pub trait Feedable: Described {
    /// Outbound schema of this instance's variant.
    fn schema(&self) -> Schema;

    fn feed(&self) -> Value {
        feed(self)
    }
}

/// Entities that accept inbound wire payloads.
pub trait Hydratable: Described {
    fn hydrate(&mut self, data: &Value) -> &mut Self {
        hydrate(self, data);
        self
    }
}

/// Build the outbound payload; key order follows the schema declaration.
pub fn feed<E: Feedable>(entity: &E) -> Value {
    Value::Object(feed_object(entity, entity.schema()))
}

fn feed_object<E: Described>(entity: &E, schema: Schema) -> Map<String, Value> {
    schema
        .iter()
        .map(|(key, node)| (key.to_string(), feed_node(entity, Some(*key), node)))
        .collect()
}

fn feed_node<E: Described>(entity: &E, key: Option<&str>, node: &Node) -> Value {
    match node {
        Node::Leaf => key
            .and_then(E::field)
            .map(|field| (field.read)(entity).to_wire())
            .unwrap_or(Value::Null),
        Node::Object(schema) => Value::Object(feed_object(entity, *schema)),
        // list slots have no key of their own
        Node::List(items) => Value::Array(
            items
                .iter()
                .map(|item| feed_node(entity, None, item))
                .collect(),
        ),
    }
}

/// Populate `entity` from an inbound payload, depth first.
pub fn hydrate<E: Described>(entity: &mut E, data: &Value) {
    match data {
        Value::Object(map) => {
            for (key, value) in map {
                if value.is_object() || value.is_array() {
                    hydrate(entity, value);
                } else {
                    apply(entity, key, value);
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter().filter(|item| item.is_object() || item.is_array()) {
                hydrate(entity, item);
            }
        }
        _ => {}
    }
}

fn apply<E: Described>(entity: &mut E, key: &str, value: &Value) {
    let Some(field) = E::field(key) else {
        return;
    };
    if let Some(value) = FieldValue::from_wire(value, field.kind, entity.time_zone()) {
        (field.write)(entity, value);
    }
}

/// Writer for a wire `timeZone` key that drives the display zone.
///
/// Unknown zone names leave the zone untouched.
pub fn write_zone(zone: &mut Tz, value: FieldValue) {
    let Some(name) = value.into_text() else {
        return;
    };
    match parse_zone(&name) {
        Some(parsed) => *zone = parsed,
        None => warn!(zone = %name, "ignoring unknown time zone"),
    }
}
