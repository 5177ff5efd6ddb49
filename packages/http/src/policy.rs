//! Client configuration

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use courier_codec::{
    ContentKind, JsonCodec, JsonOptions, XmlCodec, XmlCompanion, XmlOptions, DEFAULT_DATE_FORMAT,
    DEFAULT_XML_HEADER,
};
use reqwest::cookie::Jar;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::Method;

/// Everything an [`ApiClient`](crate::ApiClient) is configured with.
///
/// Built in code with [`ClientPolicy::new`] and the `with_*` setters, or
/// deserialized from any serde format. Only `base_url` is required. The
/// cookie store and XML companion types are not data and can only be set in
/// code.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientPolicy {
    /// Prefix for every relative URL
    pub base_url: String,

    /// Charset advertised on form bodies. Other bodies are sent as UTF-8
    /// and their `Content-Type` carries no charset parameter.
    #[serde(default = "default_content_charset")]
    pub content_charset: String,

    /// chrono pattern for date fields in JSON bodies
    #[serde(default = "default_date_format")]
    pub date_format: String,

    #[serde(default = "default_token_header_name")]
    pub token_header_name: String,

    /// Written before the token; omitted when blank
    #[serde(default = "default_token_prefix")]
    pub token_prefix: String,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Read timeout for GET and HEAD
    #[serde(default = "default_get_socket_timeout_ms")]
    pub get_socket_timeout_ms: u64,

    /// Read timeout for every other method
    #[serde(default = "default_post_socket_timeout_ms")]
    pub post_socket_timeout_ms: u64,

    /// Retries after the first GET attempt
    #[serde(default = "default_get_max_retry")]
    pub get_max_retry: u32,

    /// Sent on every request
    #[serde(default)]
    pub additional_headers: BTreeMap<String, String>,

    /// Encoding of request bodies, sent as `Content-Type`
    #[serde(default = "default_content_kind")]
    pub request_content_kind: Option<ContentKind>,

    /// Forces JSON decoding of responses when set to JSON
    #[serde(default)]
    pub response_content_kind: Option<ContentKind>,

    /// Sent as `Accept`
    #[serde(default = "default_content_kind")]
    pub accept_content_kind: Option<ContentKind>,

    #[serde(default)]
    pub serialize_nulls: bool,

    /// Turn non-2xx statuses into [`ApiResponseError`](crate::ApiResponseError)
    #[serde(default)]
    pub throw_on_http_error: bool,

    /// Follow every redirect with the original method and body
    #[serde(default)]
    pub redirect_anyway: bool,

    /// Prolog for XML bodies
    #[serde(default = "default_xml_header")]
    pub xml_header: Option<String>,

    #[serde(default = "default_xml_disable_escaping")]
    pub xml_disable_escaping: bool,

    #[serde(skip)]
    pub xml_companion_types: Vec<XmlCompanion>,

    /// Skip certificate and hostname verification
    #[serde(default)]
    pub bypass_tls: bool,

    /// Shared by every call of the client
    #[serde(skip)]
    pub cookie_store: Option<Arc<Jar>>,
}

impl ClientPolicy {
    /// Create a policy with defaults for everything but the base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            content_charset: default_content_charset(),
            date_format: default_date_format(),
            token_header_name: default_token_header_name(),
            token_prefix: default_token_prefix(),
            connect_timeout_ms: default_connect_timeout_ms(),
            get_socket_timeout_ms: default_get_socket_timeout_ms(),
            post_socket_timeout_ms: default_post_socket_timeout_ms(),
            get_max_retry: default_get_max_retry(),
            additional_headers: BTreeMap::new(),
            request_content_kind: default_content_kind(),
            response_content_kind: None,
            accept_content_kind: default_content_kind(),
            serialize_nulls: false,
            throw_on_http_error: false,
            redirect_anyway: false,
            xml_header: default_xml_header(),
            xml_disable_escaping: default_xml_disable_escaping(),
            xml_companion_types: Vec::new(),
            bypass_tls: false,
            cookie_store: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::Config {
                message: "base_url must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Send and accept JSON
    pub fn json(self) -> Self {
        self.with_request_content_kind(ContentKind::JSON)
            .with_accept_content_kind(ContentKind::JSON)
    }

    /// Decode responses as JSON whatever the request kind
    pub fn json_response(self) -> Self {
        self.with_response_content_kind(ContentKind::JSON)
    }

    /// Send and accept XML
    pub fn xml(self) -> Self {
        self.with_request_content_kind(ContentKind::XML)
            .with_accept_content_kind(ContentKind::XML)
    }

    /// Send and accept SOAP 1.2 envelopes
    pub fn soap_xml(self) -> Self {
        self.with_request_content_kind(ContentKind::SOAP_XML)
            .with_accept_content_kind(ContentKind::SOAP_XML)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Read timeout for a request with this method
    pub fn socket_timeout(&self, method: Method) -> Duration {
        if method.is_get_class() {
            Duration::from_millis(self.get_socket_timeout_ms)
        } else {
            Duration::from_millis(self.post_socket_timeout_ms)
        }
    }

    /// The JSON codec for this policy's null and date settings
    pub fn json_codec(&self) -> JsonCodec {
        JsonCodec::new(JsonOptions {
            serialize_nulls: self.serialize_nulls,
            date_format: self.date_format.clone(),
        })
    }

    /// The XML codec for this policy's prolog, escaping and companion types
    pub fn xml_codec(&self) -> XmlCodec {
        let codec = XmlCodec::new(XmlOptions {
            header: self.xml_header.clone(),
            disable_escaping: self.xml_disable_escaping,
            companions: self.xml_companion_types.clone(),
        });
        match &self.request_content_kind {
            Some(kind) if kind.is_xml() => codec.with_kind(kind.clone()),
            _ => codec,
        }
    }

    pub fn with_content_charset(mut self, charset: impl Into<String>) -> Self {
        self.content_charset = charset.into();
        self
    }

    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    pub fn with_token_header_name(mut self, name: impl Into<String>) -> Self {
        self.token_header_name = name.into();
        self
    }

    pub fn with_token_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.token_prefix = prefix.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_get_socket_timeout(mut self, timeout: Duration) -> Self {
        self.get_socket_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_post_socket_timeout(mut self, timeout: Duration) -> Self {
        self.post_socket_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_get_max_retry(mut self, retries: u32) -> Self {
        self.get_max_retry = retries;
        self
    }

    /// Add a header sent on every request, replacing one with the same name
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_headers.insert(name.into(), value.into());
        self
    }

    pub fn with_request_content_kind(mut self, kind: ContentKind) -> Self {
        self.request_content_kind = Some(kind);
        self
    }

    pub fn with_response_content_kind(mut self, kind: ContentKind) -> Self {
        self.response_content_kind = Some(kind);
        self
    }

    pub fn with_accept_content_kind(mut self, kind: ContentKind) -> Self {
        self.accept_content_kind = Some(kind);
        self
    }

    pub fn with_serialize_nulls(mut self, enabled: bool) -> Self {
        self.serialize_nulls = enabled;
        self
    }

    pub fn with_throw_on_http_error(mut self, enabled: bool) -> Self {
        self.throw_on_http_error = enabled;
        self
    }

    pub fn with_redirect_anyway(mut self, enabled: bool) -> Self {
        self.redirect_anyway = enabled;
        self
    }

    /// Set the XML prolog; `None` writes bare fragments
    pub fn with_xml_header(mut self, header: Option<String>) -> Self {
        self.xml_header = header;
        self
    }

    pub fn with_xml_disable_escaping(mut self, disabled: bool) -> Self {
        self.xml_disable_escaping = disabled;
        self
    }

    pub fn with_xml_companion(mut self, companion: XmlCompanion) -> Self {
        self.xml_companion_types.push(companion);
        self
    }

    pub fn with_bypass_tls(mut self, enabled: bool) -> Self {
        self.bypass_tls = enabled;
        self
    }

    pub fn with_cookie_store(mut self, jar: Arc<Jar>) -> Self {
        self.cookie_store = Some(jar);
        self
    }
}

fn default_content_charset() -> String {
    "UTF-8".to_string()
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

fn default_token_header_name() -> String {
    "Authorization".to_string()
}

fn default_token_prefix() -> String {
    "Bearer".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    1500
}

fn default_get_socket_timeout_ms() -> u64 {
    1500
}

fn default_post_socket_timeout_ms() -> u64 {
    3000
}

fn default_get_max_retry() -> u32 {
    3
}

fn default_content_kind() -> Option<ContentKind> {
    Some(ContentKind::JSON)
}

fn default_xml_header() -> Option<String> {
    Some(DEFAULT_XML_HEADER.to_string())
}

fn default_xml_disable_escaping() -> bool {
    true
}
