//! Picks the codec for request and response bodies.

use std::any::{Any, TypeId};

use courier_codec::{Codec, JsonObject, TextCodec};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ParsingError;
use crate::policy::ClientPolicy;

/// Encode a request body according to the request content kind.
///
/// Strings are sent as they are. JSON and XML kinds go through their codec
/// and anything else is rendered as plain text.
pub fn encode<B>(value: &B, policy: &ClientPolicy) -> Result<String, ParsingError>
where
    B: Serialize + Any,
{
    let any = value as &dyn Any;
    if let Some(text) = any.downcast_ref::<String>() {
        return Ok(text.clone());
    }
    if let Some(text) = any.downcast_ref::<&'static str>() {
        return Ok((*text).to_string());
    }

    let encoded = match &policy.request_content_kind {
        Some(kind) if kind.is_json() => policy.json_codec().encode(value)?,
        Some(kind) if kind.is_xml() => policy.xml_codec().encode(value)?,
        _ => TextCodec.encode(value)?,
    };
    Ok(encoded)
}

/// Decode a response body into `T`.
///
/// The first rule that applies wins:
///
/// 1. a JSON response kind forces JSON decoding;
/// 2. a `String` target receives the body verbatim;
/// 3. a JSON request kind decodes JSON;
/// 4. an XML request kind decodes XML.
///
/// Otherwise the content is `None`. An empty body also yields `None` for
/// JSON targets other than [`JsonObject`]; XML targets and `JsonObject`
/// reject it.
pub fn decode<T>(body: String, policy: &ClientPolicy) -> Result<Option<T>, ParsingError>
where
    T: DeserializeOwned + 'static,
{
    let forced_json = policy
        .response_content_kind
        .as_ref()
        .is_some_and(|kind| kind.is_json());

    if forced_json {
        return decode_json(&body, policy);
    }

    let mut slot = Some(body);
    if let Some(target) = (&mut slot as &mut dyn Any).downcast_mut::<Option<T>>() {
        return Ok(target.take());
    }
    let body = slot.unwrap_or_default();

    match &policy.request_content_kind {
        Some(kind) if kind.is_json() => decode_json(&body, policy),
        Some(kind) if kind.is_xml() => Ok(Some(policy.xml_codec().decode(&body)?)),
        _ => Ok(None),
    }
}

fn decode_json<T>(body: &str, policy: &ClientPolicy) -> Result<Option<T>, ParsingError>
where
    T: DeserializeOwned + 'static,
{
    // An empty body decodes to nothing, unless an object is required.
    if body.trim().is_empty() && TypeId::of::<T>() != TypeId::of::<JsonObject>() {
        return Ok(None);
    }
    Ok(Some(policy.json_codec().decode(body)?))
}
