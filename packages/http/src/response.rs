//! Response handling: drain, classify, decode.

use std::io::Read;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::content;
use crate::error::{ApiResponseError, Result};
use crate::policy::ClientPolicy;
use crate::transport::{RawResponse, ResponseHead, TransportError};
use crate::types::{is_error, ApiResponse};

/// Turn a raw response into an [`ApiResponse`].
///
/// The body is read to the end and dropped before anything else happens, so
/// the connection is released on every path out of this function. With
/// `throw_on_http_error` set, a non-2xx status becomes an
/// [`ApiResponseError`] carrying the undecoded body.
pub fn handle<T>(raw: RawResponse, url: &str, policy: &ClientPolicy) -> Result<ApiResponse<T>>
where
    T: DeserializeOwned + 'static,
{
    let RawResponse {
        status,
        headers,
        mut body,
    } = raw;

    let mut bytes = Vec::new();
    let read = body.read_to_end(&mut bytes);
    drop(body);
    read.map_err(TransportError::from)?;

    let text = String::from_utf8_lossy(&bytes).into_owned();
    debug!(status, bytes = bytes.len(), url, "Received response");

    if policy.throw_on_http_error && is_error(status) {
        return Err(ApiResponseError {
            url: url.to_string(),
            http_code: status,
            content: text,
            response: ResponseHead { status, headers },
        }
        .into());
    }

    let content = content::decode(text, policy)?;
    Ok(ApiResponse {
        http_code: status,
        headers,
        content,
    })
}
