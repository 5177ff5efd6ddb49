//! # courier-http
//!
//! A configurable blocking client for REST-ish and SOAP-ish HTTP APIs.
//!
//! An [`ApiClient`] is built from a [`ClientPolicy`] and issues
//! GET/POST/PUT/PATCH/DELETE calls against the policy's base URL. Each call
//! goes through the same pipeline:
//!
//! 1. [`request::prepare`] resolves the URL and attaches the auth token,
//!    the configured headers, `Content-Type` and `Accept`;
//! 2. a [`Transport`] sends it, with the connect and socket timeouts,
//!    redirect mode, TLS mode and cookie store of the policy. Failed GETs are
//!    retried per [`retry::RetryDecider`];
//! 3. [`response::handle`] drains the body, raises error statuses when the
//!    policy asks for it, and decodes the body into the caller's type.
//!
//! ## Bodies
//!
//! Request bodies come in four shapes: a serde value encoded with the
//! request content kind (`post`), a literal string (`post_text`), a raw
//! [`Entity`] (`post_entity`), or name/value pairs sent as a form
//! (`post_url_form_encoded`). The same exists for PUT and PATCH.
//!
//! Responses decode as JSON or XML following the policy; a `String` target
//! always receives the raw body.
//!
//! ## Errors
//!
//! [`Error::Transport`] means the exchange did not complete (timeouts,
//! unknown host, TLS, I/O). [`Error::Api`] means it did but no value could be
//! returned: an error status while `throw_on_http_error` is set, or a body
//! that could not be encoded or decoded. Without `throw_on_http_error`, error
//! statuses are ordinary responses; check [`ApiResponse::is_error`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use courier_http::{ApiClient, ApiResponse, ClientPolicy, JsonObject};
//! use std::time::Duration;
//!
//! let policy = ClientPolicy::new("https://api.example.com")
//!     .with_header("X-Tenant", "acme")
//!     .with_get_socket_timeout(Duration::from_secs(5))
//!     .with_throw_on_http_error(true);
//!
//! let client = ApiClient::new(policy)?;
//! let status: ApiResponse<JsonObject> = client.get("/status")?;
//! println!("{:?}", status.content);
//! # Ok::<(), courier_http::Error>(())
//! ```

pub mod client;
pub mod content;
pub mod error;
pub mod policy;
pub mod request;
pub mod response;
pub mod retry;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use error::{ApiError, ApiResponseError, Error, ParsingError, Result};
pub use policy::ClientPolicy;
pub use request::{PreparedRequest, Verb};
pub use transport::{
    RawResponse, ReqwestTransport, ResponseHead, Transport, TransportError, TransportErrorKind,
};
pub use types::{is_error, ApiResponse, Entity, Method};

pub use courier_codec::{ContentKind, JsonObject, XmlCompanion};
