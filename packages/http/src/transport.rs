//! HTTP execution abstraction.
//!
//! [`Transport`] is the seam between the client pipeline and the network; it
//! can be mocked in tests, avoiding the need for actual network calls.
//! [`ReqwestTransport`] is the production implementation.

use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::blocking::{Client, ClientBuilder, Response};
use reqwest::redirect::Policy;
use tracing::{debug, warn};
use url::Url;

use crate::policy::ClientPolicy;
use crate::request::PreparedRequest;
use crate::types::{Entity, Method};

/// Redirect hops followed before giving up.
pub const MAX_REDIRECTS: usize = 10;

/// Trait for executing HTTP requests.
pub trait Transport: Send + Sync {
    /// Execute a prepared request with the given socket (read) timeout.
    ///
    /// Redirects are resolved before returning.
    fn execute(
        &self,
        request: &PreparedRequest,
        socket_timeout: Duration,
    ) -> Result<RawResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(
        &self,
        request: &PreparedRequest,
        socket_timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        (**self).execute(request, socket_timeout)
    }
}

/// A response as it comes off the wire.
///
/// The body can be read once. It is drained and dropped by the response
/// handler, which releases the underlying connection.
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Box<dyn Read + Send>,
}

impl RawResponse {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: impl Read + Send + 'static) -> Self {
        Self {
            status,
            headers,
            body: Box::new(body),
        }
    }

    pub fn head(&self) -> ResponseHead {
        ResponseHead {
            status: self.status,
            headers: self.headers.clone(),
        }
    }
}

impl fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Status line and headers of a response whose body has been consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    ConnectTimeout,
    ReadTimeout,
    UnknownHost,
    Tls,
    Io,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportErrorKind::ConnectTimeout => "connect timeout",
            TransportErrorKind::ReadTimeout => "read timeout",
            TransportErrorKind::UnknownHost => "unknown host",
            TransportErrorKind::Tls => "TLS failure",
            TransportErrorKind::Io => "I/O failure",
        };
        f.write_str(name)
    }
}

/// The exchange did not complete.
#[derive(thiserror::Error, Debug)]
#[error("{kind}: {message}")]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self.kind,
            TransportErrorKind::ConnectTimeout | TransportErrorKind::ReadTimeout
        )
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        let kind = classify(&error);
        TransportError::new(kind, error.to_string()).with_source(error)
    }
}

impl From<io::Error> for TransportError {
    fn from(error: io::Error) -> Self {
        let kind = match error.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TransportErrorKind::ReadTimeout,
            _ => TransportErrorKind::Io,
        };
        TransportError::new(kind, error.to_string()).with_source(error)
    }
}

fn classify(error: &reqwest::Error) -> TransportErrorKind {
    if error.is_timeout() {
        return if error.is_connect() {
            TransportErrorKind::ConnectTimeout
        } else {
            TransportErrorKind::ReadTimeout
        };
    }

    let chain = error_chain(error).to_ascii_lowercase();
    if chain.contains("dns error")
        || chain.contains("failed to lookup address")
        || chain.contains("name or service not known")
        || chain.contains("no such host")
    {
        TransportErrorKind::UnknownHost
    } else if chain.contains("certificate")
        || chain.contains("handshake")
        || chain.contains("tls")
        || chain.contains("ssl")
    {
        TransportErrorKind::Tls
    } else {
        TransportErrorKind::Io
    }
}

/// Messages of an error and all of its sources, joined.
fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut messages = vec![error.to_string()];
    let mut current = error.source();
    while let Some(source) = current {
        messages.push(source.to_string());
        current = source.source();
    }
    messages.join(": ")
}

/// Production transport using reqwest's blocking client.
///
/// Connect timeout, redirect mode, TLS verification and the cookie store are
/// fixed when the transport is built; the socket timeout is applied per call.
pub struct ReqwestTransport {
    client: Client,
    redirect_anyway: bool,
}

impl ReqwestTransport {
    pub fn new(policy: &ClientPolicy) -> Result<Self, TransportError> {
        let client = if policy.bypass_tls {
            match Self::builder(policy, true).build() {
                Ok(client) => client,
                Err(e) => {
                    warn!(error = %e, "Cannot bypass TLS verification, using default TLS settings");
                    Self::builder(policy, false).build()?
                }
            }
        } else {
            Self::builder(policy, false).build()?
        };

        Ok(Self {
            client,
            redirect_anyway: policy.redirect_anyway,
        })
    }

    fn builder(policy: &ClientPolicy, bypass_tls: bool) -> ClientBuilder {
        // In lax mode redirects are followed by hand so the method survives.
        let redirect = if policy.redirect_anyway {
            Policy::none()
        } else {
            Policy::limited(MAX_REDIRECTS)
        };

        let mut builder = Client::builder()
            .connect_timeout(policy.connect_timeout())
            .redirect(redirect);

        if let Some(jar) = &policy.cookie_store {
            builder = builder.cookie_provider(Arc::clone(jar));
        }

        if bypass_tls {
            builder = builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }

        builder
    }

    fn send(
        &self,
        method: Method,
        url: &str,
        headers: &[(String, String)],
        body: Option<&Entity>,
        socket_timeout: Duration,
    ) -> Result<Response, TransportError> {
        let mut builder = self.client.request(method.into(), url).timeout(socket_timeout);

        // `header` appends, so repeated names are all sent.
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = body {
            builder = builder.body(body.content.clone());
        }

        debug!(%method, url, "Sending request");
        Ok(builder.send()?)
    }

    /// Follow redirects whatever their status, keeping method, headers and
    /// body. GET and HEAD stay GET and HEAD.
    fn send_following_redirects(
        &self,
        request: &PreparedRequest,
        socket_timeout: Duration,
    ) -> Result<Response, TransportError> {
        let method = request.method;
        let mut url = request.url.clone();
        let mut body = request.body.as_ref();

        for _ in 0..=MAX_REDIRECTS {
            let response = self.send(method, &url, &request.headers, body, socket_timeout)?;

            let Some(location) = redirect_location(&response) else {
                return Ok(response);
            };

            let next = Url::parse(&url)
                .and_then(|current| current.join(&location))
                .map_err(|e| {
                    TransportError::new(
                        TransportErrorKind::Io,
                        format!("Invalid redirect location '{location}'"),
                    )
                    .with_source(e)
                })?;

            if method.is_get_class() {
                body = None;
            }

            debug!(
                %method,
                from = %url,
                to = %next,
                status = response.status().as_u16(),
                "Following redirect"
            );
            url = next.to_string();
        }

        Err(TransportError::new(
            TransportErrorKind::Io,
            format!("Too many redirects (more than {MAX_REDIRECTS}) starting at {}", request.url),
        ))
    }
}

impl Transport for ReqwestTransport {
    fn execute(
        &self,
        request: &PreparedRequest,
        socket_timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        let started = Instant::now();

        let result = if self.redirect_anyway {
            self.send_following_redirects(request, socket_timeout)
        } else {
            self.send(
                request.method,
                &request.url,
                &request.headers,
                request.body.as_ref(),
                socket_timeout,
            )
        };

        match result {
            Ok(response) => Ok(into_raw(response)),
            Err(e) => {
                if e.is_timeout() {
                    warn!(
                        method = %request.method,
                        url = %request.url,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        kind = %e.kind(),
                        "Request timed out"
                    );
                }
                Err(e)
            }
        }
    }
}

fn redirect_location(response: &Response) -> Option<String> {
    if !response.status().is_redirection() {
        return None;
    }
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn into_raw(response: Response) -> RawResponse {
    let status = response.status().as_u16();

    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    RawResponse::new(status, headers, response)
}

/// Mock transport for testing.
///
/// Returns scripted outcomes in order and records every request it sees.
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::io::Cursor;
    use std::sync::Mutex;

    /// One scripted outcome.
    #[derive(Debug, Clone)]
    pub enum Scripted {
        Respond {
            status: u16,
            headers: Vec<(String, String)>,
            body: String,
        },
        Fail(TransportErrorKind),
    }

    #[derive(Default)]
    pub struct MockTransport {
        script: Mutex<VecDeque<Scripted>>,
        /// Used once the script is exhausted.
        fallback: Mutex<Option<Scripted>>,
        recorded: Mutex<Vec<(PreparedRequest, Duration)>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a response.
        pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
            self.script.lock().unwrap().push_back(Scripted::Respond {
                status,
                headers: Vec::new(),
                body: body.into(),
            });
            self
        }

        /// Queue a response with headers.
        pub fn respond_with_headers(
            self,
            status: u16,
            headers: &[(&str, &str)],
            body: impl Into<String>,
        ) -> Self {
            self.script.lock().unwrap().push_back(Scripted::Respond {
                status,
                headers: headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                body: body.into(),
            });
            self
        }

        /// Queue a failure.
        pub fn fail(self, kind: TransportErrorKind) -> Self {
            self.script.lock().unwrap().push_back(Scripted::Fail(kind));
            self
        }

        /// Fail with `kind` on every call once the script runs out.
        pub fn always_fail(self, kind: TransportErrorKind) -> Self {
            *self.fallback.lock().unwrap() = Some(Scripted::Fail(kind));
            self
        }

        pub fn recorded(&self) -> Vec<(PreparedRequest, Duration)> {
            self.recorded.lock().unwrap().clone()
        }

        pub fn calls(&self) -> usize {
            self.recorded.lock().unwrap().len()
        }
    }

    impl Transport for MockTransport {
        fn execute(
            &self,
            request: &PreparedRequest,
            socket_timeout: Duration,
        ) -> Result<RawResponse, TransportError> {
            self.recorded
                .lock()
                .unwrap()
                .push((request.clone(), socket_timeout));

            let next = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .or_else(|| self.fallback.lock().unwrap().clone());

            match next {
                Some(Scripted::Respond {
                    status,
                    headers,
                    body,
                }) => Ok(RawResponse::new(status, headers, Cursor::new(body.into_bytes()))),
                Some(Scripted::Fail(kind)) => Err(TransportError::new(kind, "scripted failure")),
                None => Ok(RawResponse::new(404, Vec::new(), Cursor::new(Vec::new()))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockTransport;
    use super::*;
    use crate::request::{prepare, Verb};

    fn get_request() -> PreparedRequest {
        let policy = ClientPolicy::new("http://localhost:9");
        prepare(&policy, None, Verb::Get, "/items")
    }

    #[test]
    fn mock_returns_scripted_outcomes_in_order() {
        let transport = MockTransport::new()
            .fail(TransportErrorKind::ReadTimeout)
            .respond(200, "ok");
        let request = get_request();

        let first = transport.execute(&request, Duration::from_millis(5));
        assert_eq!(first.unwrap_err().kind(), TransportErrorKind::ReadTimeout);

        let mut second = transport.execute(&request, Duration::from_millis(5)).unwrap();
        let mut body = String::new();
        second.body.read_to_string(&mut body).unwrap();
        assert_eq!(second.status, 200);
        assert_eq!(body, "ok");
        assert_eq!(transport.calls(), 2);
    }

    #[test]
    fn mock_falls_back_to_404() {
        let transport = MockTransport::new();
        let response = transport
            .execute(&get_request(), Duration::from_secs(1))
            .unwrap();
        assert_eq!(response.status, 404);
    }

    #[test]
    fn transport_error_reports_kind() {
        let error = TransportError::new(TransportErrorKind::UnknownHost, "no.such.host");
        assert_eq!(error.to_string(), "unknown host: no.such.host");
        assert!(!error.is_timeout());
        assert!(TransportError::new(TransportErrorKind::ConnectTimeout, "x").is_timeout());
    }

    #[test]
    fn io_timeouts_map_to_read_timeout() {
        let error = TransportError::from(io::Error::new(io::ErrorKind::TimedOut, "slow"));
        assert_eq!(error.kind(), TransportErrorKind::ReadTimeout);

        let error = TransportError::from(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        assert_eq!(error.kind(), TransportErrorKind::Io);
    }

    #[test]
    fn error_chain_joins_sources() {
        let inner = io::Error::new(io::ErrorKind::Other, "dns error: failed to lookup address");
        let outer = TransportError::new(TransportErrorKind::Io, "connect failed").with_source(inner);
        let chain = error_chain(&outer);
        assert!(chain.contains("connect failed"));
        assert!(chain.contains("failed to lookup address"));
    }

    #[test]
    fn raw_response_debug_omits_body() {
        let raw = RawResponse::new(201, vec![("a".into(), "b".into())], io::empty());
        let debug = format!("{raw:?}");
        assert!(debug.contains("201"));
        assert_eq!(raw.head().status, 201);
    }

    #[test]
    fn reqwest_transport_creation() {
        let policy = ClientPolicy::new("http://localhost");
        assert!(ReqwestTransport::new(&policy).is_ok());
    }

    #[test]
    fn reqwest_transport_with_lax_redirects_tls_bypass_and_cookies() {
        let policy = ClientPolicy::new("https://localhost")
            .with_redirect_anyway(true)
            .with_bypass_tls(true)
            .with_cookie_store(Arc::new(reqwest::cookie::Jar::default()));
        let transport = ReqwestTransport::new(&policy).unwrap();
        assert!(transport.redirect_anyway);
    }
}
