//! The codec seam and the plain-text codec.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CodecError;
use crate::kind::ContentKind;

/// Encodes values into body text and decodes body text into values.
///
/// Implementations are configured once (null policy, date format, XML
/// prolog, ...) and then shared by every call of a client.
pub trait Codec: Send + Sync {
    /// The content kind this codec produces and understands.
    fn kind(&self) -> ContentKind;

    /// Encode a value into a body.
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CodecError>;

    /// Decode a body into a value of type `T`.
    fn decode<T: DeserializeOwned + 'static>(&self, body: &str) -> Result<T, CodecError>;
}

/// Renders values as plain text.
///
/// Strings are written without quotes, numbers and booleans with their usual
/// rendering, and anything structured falls back to its compact JSON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl Codec for TextCodec {
    fn kind(&self) -> ContentKind {
        ContentKind::TEXT
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CodecError> {
        Ok(match serde_json::to_value(value)? {
            serde_json::Value::String(text) => text,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    fn decode<T: DeserializeOwned + 'static>(&self, body: &str) -> Result<T, CodecError> {
        Ok(serde_json::from_value(serde_json::Value::String(
            body.to_string(),
        ))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "lowercase")]
    enum Color {
        Red,
        Green,
    }

    #[test]
    fn strings_are_unquoted() {
        assert_eq!(TextCodec.encode("hello").unwrap(), "hello");
    }

    #[test]
    fn scalars_use_their_rendering() {
        assert_eq!(TextCodec.encode(&42).unwrap(), "42");
        assert_eq!(TextCodec.encode(&true).unwrap(), "true");
    }

    #[test]
    fn structs_fall_back_to_json() {
        let text = TextCodec.encode(&Point { x: 1, y: 2 }).unwrap();
        assert_eq!(text, r#"{"x":1,"y":2}"#);
    }

    #[test]
    fn decode_string_like_targets() {
        let text: String = TextCodec.decode("raw body").unwrap();
        assert_eq!(text, "raw body");

        assert_eq!(TextCodec.decode::<Color>("red").unwrap(), Color::Red);
        assert_eq!(TextCodec.decode::<Color>("green").unwrap(), Color::Green);
        assert!(TextCodec.decode::<Color>("blue").is_err());
    }

    #[test]
    fn kind_is_text() {
        assert_eq!(TextCodec.kind(), ContentKind::TEXT);
    }
}
