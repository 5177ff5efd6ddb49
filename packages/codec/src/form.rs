//! `application/x-www-form-urlencoded` bodies.

use url::form_urlencoded;

use crate::kind::ContentKind;

/// Encode name/value pairs in order. Repeated names are kept.
pub fn encode<I, K, V>(pairs: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in pairs {
        serializer.append_pair(name.as_ref(), value.as_ref());
    }
    serializer.finish()
}

/// The form content type, with a `charset` parameter when one is given.
pub fn content_kind(charset: &str) -> ContentKind {
    ContentKind::FORM_URLENCODED.with_charset(charset)
}
