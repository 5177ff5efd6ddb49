//! Turning a call into the request that goes on the wire.

use crate::policy::ClientPolicy;
use crate::types::{Entity, Method};

/// What a call sends, decided at the call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    Get,
    Delete,
    Post(Entity),
    Put(Entity),
    Patch(Entity),
}

impl Verb {
    pub fn method(&self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Delete => Method::DELETE,
            Verb::Post(_) => Method::POST,
            Verb::Put(_) => Method::PUT,
            Verb::Patch(_) => Method::PATCH,
        }
    }

    pub fn into_body(self) -> Option<Entity> {
        match self {
            Verb::Get | Verb::Delete => None,
            Verb::Post(body) | Verb::Put(body) | Verb::Patch(body) => Some(body),
        }
    }
}

/// A fully resolved request.
///
/// Headers are kept in the order they are sent; a name may repeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Entity>,
}

impl PreparedRequest {
    /// All values sent under `name`, compared case-insensitively.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Resolve a call URL against the base URL.
///
/// A blank URL targets the base itself, one starting with `/` is appended to
/// it, and anything else is taken as absolute.
pub fn resolve_url(base_url: &str, relative_url: &str) -> String {
    if relative_url.trim().is_empty() {
        base_url.to_string()
    } else if relative_url.starts_with('/') {
        format!("{base_url}{relative_url}")
    } else {
        relative_url.to_string()
    }
}

/// `"{prefix} {token}"`, or the bare token when the prefix is blank.
pub fn auth_header_value(prefix: &str, token: &str) -> String {
    if prefix.trim().is_empty() {
        token.to_string()
    } else {
        format!("{prefix} {token}")
    }
}

/// Build the request for one call.
///
/// `token` is the snapshot taken by the caller; the policy is only read.
pub fn prepare(
    policy: &ClientPolicy,
    token: Option<&str>,
    verb: Verb,
    relative_url: &str,
) -> PreparedRequest {
    let method = verb.method();
    let url = resolve_url(&policy.base_url, relative_url);
    let body = verb.into_body();
    let mut headers = Vec::new();

    if let Some(token) = token {
        headers.push((
            policy.token_header_name.clone(),
            auth_header_value(&policy.token_prefix, token),
        ));
    }

    for (name, value) in &policy.additional_headers {
        headers.push((name.clone(), value.clone()));
    }

    if let Some(body) = &body {
        let content_type = body
            .content_type
            .as_ref()
            .or(policy.request_content_kind.as_ref());
        if let Some(kind) = content_type {
            headers.push(("Content-Type".to_string(), kind.to_string()));
        }
    }

    if let Some(accept) = &policy.accept_content_kind {
        headers.push(("Accept".to_string(), accept.to_string()));
    }

    PreparedRequest {
        method,
        url,
        headers,
        body,
    }
}
