//! Configurable date formatting for serialized bodies.
//!
//! Body types opt in per field:
//!
//! ```ignore
//! #[derive(Serialize, Deserialize)]
//! struct Invoice {
//!     #[serde(with = "courier_codec::date")]
//!     issued: NaiveDateTime,
//!     #[serde(default, with = "courier_codec::date::option")]
//!     paid: Option<NaiveDateTime>,
//! }
//! ```
//!
//! The pattern is a chrono `strftime` string. It is taken from the scope
//! opened by [`with_format`] on the current thread, which the JSON codec opens
//! around every encode and decode. Outside any scope
//! [`DEFAULT_DATE_FORMAT`] applies.

use std::cell::RefCell;
use std::fmt::Write;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{de, ser, Deserialize, Deserializer, Serializer};

/// Day-month-year, e.g. `31-12-2024`.
pub const DEFAULT_DATE_FORMAT: &str = "%d-%m-%Y";

thread_local! {
    static ACTIVE_FORMAT: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Restores the enclosing scope's format on drop, including on unwind.
struct ScopeGuard {
    previous: Option<String>,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        ACTIVE_FORMAT.with(|cell| *cell.borrow_mut() = previous);
    }
}

/// Run `f` with `format` as the active date pattern on this thread.
pub fn with_format<R>(format: &str, f: impl FnOnce() -> R) -> R {
    let previous = ACTIVE_FORMAT.with(|cell| cell.replace(Some(format.to_string())));
    let _guard = ScopeGuard { previous };
    f()
}

/// The pattern currently in effect on this thread.
pub fn active_format() -> String {
    ACTIVE_FORMAT
        .with(|cell| cell.borrow().clone())
        .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string())
}

/// Render a timestamp with the active pattern.
pub fn format(value: &NaiveDateTime) -> Result<String, String> {
    let pattern = active_format();
    let mut out = String::new();
    write!(out, "{}", value.format(&pattern))
        .map_err(|_| format!("invalid date format '{pattern}'"))?;
    Ok(out)
}

/// Parse a timestamp with the active pattern.
///
/// Date-only patterns are accepted and yield midnight.
pub fn parse(text: &str) -> Result<NaiveDateTime, String> {
    let pattern = active_format();
    if let Ok(value) = NaiveDateTime::parse_from_str(text, &pattern) {
        return Ok(value);
    }
    NaiveDate::parse_from_str(text, &pattern)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("invalid date '{text}' for format '{pattern}'"))
}

pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    let text = format(value).map_err(ser::Error::custom)?;
    serializer.serialize_str(&text)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    let text = String::deserialize(deserializer)?;
    parse(&text).map_err(de::Error::custom)
}

/// The same helpers for `Option<NaiveDateTime>` fields.
pub mod option {
    use chrono::NaiveDateTime;
    use serde::{de, ser, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => {
                let text = super::format(value).map_err(ser::Error::custom)?;
                serializer.serialize_some(&text)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) => super::parse(&text).map(Some).map_err(de::Error::custom),
            None => Ok(None),
        }
    }
}
