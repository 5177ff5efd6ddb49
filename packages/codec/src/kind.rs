//! Content kinds for request and response bodies.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The declared media type of a body.
///
/// Content kinds are MIME strings. The constants cover the kinds the client
/// knows how to encode and decode; any other string is carried through to the
/// `Content-Type` / `Accept` headers untouched.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContentKind(pub Cow<'static, str>);

impl ContentKind {
    /// JSON (`application/json`)
    pub const JSON: ContentKind = ContentKind(Cow::Borrowed("application/json"));

    /// XML (`application/xml`)
    pub const XML: ContentKind = ContentKind(Cow::Borrowed("application/xml"));

    /// SOAP 1.2 envelopes (`application/soap+xml`)
    pub const SOAP_XML: ContentKind = ContentKind(Cow::Borrowed("application/soap+xml"));

    /// URL-encoded form bodies (`application/x-www-form-urlencoded`)
    pub const FORM_URLENCODED: ContentKind =
        ContentKind(Cow::Borrowed("application/x-www-form-urlencoded"));

    /// Plain text (`text/plain`)
    pub const TEXT: ContentKind = ContentKind(Cow::Borrowed("text/plain"));

    /// Opaque binary data (`application/octet-stream`)
    pub const OCTET_STREAM: ContentKind = ContentKind(Cow::Borrowed("application/octet-stream"));

    pub const fn from_static(s: &'static str) -> Self {
        ContentKind(Cow::Borrowed(s))
    }

    pub fn new(s: impl Into<String>) -> Self {
        ContentKind(Cow::Owned(s.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The media type without parameters (`application/json; charset=UTF-8`
    /// yields `application/json`).
    pub fn essence(&self) -> &str {
        self.0.split(';').next().unwrap_or_default().trim()
    }

    pub fn is_json(&self) -> bool {
        self.essence().eq_ignore_ascii_case(Self::JSON.as_str())
    }

    /// Any media type mentioning `xml`, which covers `application/xml`,
    /// `text/xml` and `application/soap+xml`.
    pub fn is_xml(&self) -> bool {
        self.essence().to_ascii_lowercase().contains("xml")
    }

    /// Append a `charset` parameter.
    pub fn with_charset(&self, charset: &str) -> Self {
        if charset.trim().is_empty() {
            return self.clone();
        }
        ContentKind::new(format!("{}; charset={}", self.essence(), charset.trim()))
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&'static str> for ContentKind {
    fn from(s: &'static str) -> Self {
        ContentKind(Cow::Borrowed(s))
    }
}

impl From<String> for ContentKind {
    fn from(s: String) -> Self {
        ContentKind(Cow::Owned(s))
    }
}

impl AsRef<str> for ContentKind {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for ContentKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ContentKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(ContentKind::from)
    }
}
