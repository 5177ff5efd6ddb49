use std::fmt;

use courier_codec::ContentKind;
use serde::{Deserialize, Serialize};

/// HTTP method for requests
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    HEAD,
    POST,
    PUT,
    PATCH,
    DELETE,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::PATCH => "PATCH",
            Method::DELETE => "DELETE",
        }
    }

    /// Safe to repeat without duplicating side effects.
    ///
    /// POST and PATCH are the only non-idempotent methods here.
    pub fn is_idempotent(&self) -> bool {
        !matches!(self, Method::POST | Method::PATCH)
    }

    /// Read requests: the only ones eligible for automatic retry, and the
    /// ones that use the GET socket timeout.
    pub fn is_get_class(&self) -> bool {
        matches!(self, Method::GET | Method::HEAD)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => http::Method::GET,
            Method::HEAD => http::Method::HEAD,
            Method::POST => http::Method::POST,
            Method::PUT => http::Method::PUT,
            Method::PATCH => http::Method::PATCH,
            Method::DELETE => http::Method::DELETE,
        }
    }
}

/// A raw request body.
///
/// When `content_type` is unset the client's request content kind is sent
/// as `Content-Type`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Entity {
    pub content: Vec<u8>,
    pub content_type: Option<ContentKind>,
}

impl Entity {
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, kind: ContentKind) -> Self {
        self.content_type = Some(kind);
        self
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl From<String> for Entity {
    fn from(text: String) -> Self {
        Entity::new(text)
    }
}

impl From<&str> for Entity {
    fn from(text: &str) -> Self {
        Entity::new(text)
    }
}

/// Check if a status code is outside the 2xx range
pub fn is_error(status: u16) -> bool {
    !(200..300).contains(&status)
}

/// The outcome of a call that reached the server.
///
/// `content` is `None` when the body was not decoded: the response kind is
/// not one the client models (binary, form, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse<T> {
    pub http_code: u16,
    pub headers: Vec<(String, String)>,
    pub content: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn is_error(&self) -> bool {
        is_error(self.http_code)
    }

    /// First header with this name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
