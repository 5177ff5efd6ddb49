//! JSON codec implementation.

use std::any::TypeId;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::codec::Codec;
use crate::date::{self, DEFAULT_DATE_FORMAT};
use crate::error::CodecError;
use crate::kind::ContentKind;

/// A schema-less JSON object.
///
/// Decoding into this type only succeeds when the body is an object; arrays
/// and scalars are rejected even though they are valid JSON.
pub type JsonObject = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonOptions {
    /// Write `null` for absent fields instead of dropping them.
    pub serialize_nulls: bool,
    /// Pattern used by the [`date`](crate::date) field helpers.
    pub date_format: String,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            serialize_nulls: false,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

/// A codec that handles JSON encoding/decoding.
///
/// # Example
///
/// ```rust
/// use courier_codec::{Codec, JsonCodec, JsonOptions};
///
/// let codec = JsonCodec::new(JsonOptions::default());
/// let body = codec.encode(&vec![1, 2, 3]).unwrap();
/// let decoded: Vec<i32> = codec.decode(&body).unwrap();
///
/// assert_eq!(decoded, vec![1, 2, 3]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonCodec {
    options: JsonOptions,
}

impl JsonCodec {
    pub fn new(options: JsonOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &JsonOptions {
        &self.options
    }
}

impl Codec for JsonCodec {
    fn kind(&self) -> ContentKind {
        ContentKind::JSON
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CodecError> {
        date::with_format(&self.options.date_format, || -> Result<String, CodecError> {
            if self.options.serialize_nulls {
                return Ok(serde_json::to_string(value)?);
            }
            let mut json = serde_json::to_value(value)?;
            strip_null_members(&mut json);
            Ok(serde_json::to_string(&json)?)
        })
    }

    fn decode<T: DeserializeOwned + 'static>(&self, body: &str) -> Result<T, CodecError> {
        date::with_format(&self.options.date_format, || -> Result<T, CodecError> {
            if TypeId::of::<T>() == TypeId::of::<JsonObject>() {
                let json: Value = serde_json::from_str(body)?;
                if !json.is_object() {
                    return Err(CodecError::NotAnObject {
                        found: value_kind(&json),
                    });
                }
                return Ok(serde_json::from_value(json)?);
            }
            Ok(serde_json::from_str(body)?)
        })
    }
}

/// Drop object members whose value is `null`, at every depth.
///
/// Nulls inside arrays are positional and stay.
fn strip_null_members(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, member| !member.is_null());
            map.values_mut().for_each(strip_null_members);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_null_members),
        _ => {}
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Account {
        id: u64,
        name: String,
        nickname: Option<String>,
        #[serde(with = "crate::date")]
        opened: NaiveDateTime,
    }

    fn account() -> Account {
        Account {
            id: 7,
            name: "Ada".to_string(),
            nickname: None,
            opened: NaiveDate::from_ymd_opt(2021, 4, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn nulls_are_dropped_by_default() {
        let body = JsonCodec::default().encode(&account()).unwrap();
        assert_eq!(body, r#"{"id":7,"name":"Ada","opened":"01-04-2021"}"#);
    }

    #[test]
    fn nulls_are_kept_when_requested() {
        let codec = JsonCodec::new(JsonOptions {
            serialize_nulls: true,
            ..Default::default()
        });
        let body = codec.encode(&account()).unwrap();
        assert_eq!(
            body,
            r#"{"id":7,"name":"Ada","nickname":null,"opened":"01-04-2021"}"#
        );
    }

    #[test]
    fn nested_nulls_are_dropped_but_array_slots_kept() {
        let value = serde_json::json!({"outer": {"gone": null, "kept": 1}, "list": [null, 2]});
        let body = JsonCodec::default().encode(&value).unwrap();
        assert_eq!(body, r#"{"outer":{"kept":1},"list":[null,2]}"#);
    }

    #[test]
    fn round_trip_with_configured_date_format() {
        let codec = JsonCodec::new(JsonOptions {
            date_format: "%Y-%m-%d".to_string(),
            ..Default::default()
        });
        let body = codec.encode(&account()).unwrap();
        assert!(body.contains(r#""opened":"2021-04-01""#));

        let decoded: Account = codec.decode(&body).unwrap();
        assert_eq!(decoded, account());
    }

    #[test]
    fn object_target_accepts_objects() {
        let object: JsonObject = JsonCodec::default().decode(r#"{"a":1}"#).unwrap();
        assert_eq!(object.get("a"), Some(&serde_json::json!(1)));
    }

    #[test]
    fn object_target_rejects_arrays() {
        let err = JsonCodec::default()
            .decode::<JsonObject>("[1,2,3]")
            .unwrap_err();
        assert!(matches!(err, CodecError::NotAnObject { found: "array" }));
    }

    #[test]
    fn value_target_accepts_arrays() {
        let value: Value = JsonCodec::default().decode("[1,2,3]").unwrap();
        assert!(value.is_array());
    }

    #[test]
    fn malformed_body_is_a_json_error() {
        let err = JsonCodec::default().decode::<Account>("not json").unwrap_err();
        assert!(matches!(err, CodecError::Json(_)));
    }
}
