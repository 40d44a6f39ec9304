//! Wire timestamps: `YYYY-MM-DDThh:mm:ssZ`, always UTC.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use regex::Regex;

/// Display zone used when an entity is not told otherwise.
pub const DEFAULT_TIME_ZONE: Tz = chrono_tz::Europe::Rome;

pub const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

static WIRE_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}Z")
        .expect("wire timestamp regex must compile")
});

/// Format an instant for the wire, converting it to UTC first.
pub fn format_wire<Z: TimeZone>(at: &DateTime<Z>) -> String {
    at.with_timezone(&Utc).format(WIRE_FORMAT).to_string()
}

/// Parse a wire timestamp and express it in `zone`.
///
/// Only the leading `YYYY-MM-DDThh:mm:ssZ` is considered; returns `None` when
/// the text does not start with that shape or names an impossible date.
pub fn parse_wire(text: &str, zone: Tz) -> Option<DateTime<Tz>> {
    let matched = WIRE_TIMESTAMP.find(text)?;
    let stamp = matched.as_str()[..19].to_ascii_uppercase();
    let naive = NaiveDateTime::parse_from_str(&stamp, "%Y-%m-%dT%H:%M:%S").ok()?;
    Some(Utc.from_utc_datetime(&naive).with_timezone(&zone))
}

/// Resolve an IANA zone name such as `Europe/Rome`.
pub fn parse_zone(name: &str) -> Option<Tz> {
    name.trim().parse().ok()
}
