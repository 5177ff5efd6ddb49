//! The API client.

use std::any::Any;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use courier_codec::form;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::content;
use crate::error::Result;
use crate::policy::ClientPolicy;
use crate::request::{self, PreparedRequest, Verb};
use crate::response;
use crate::retry::RetryDecider;
use crate::transport::{RawResponse, ReqwestTransport, Transport, TransportError};
use crate::types::{self, ApiResponse, Entity};

/// A blocking client for one HTTP API.
///
/// Every call resolves its URL against the policy's base URL, attaches the
/// auth token and configured headers, sends the request and decodes the
/// response into `T`. GET requests are retried on transient failures; no
/// other verb is.
///
/// The client is `Send + Sync`. The token can be changed while calls are in
/// flight: each call reads it once, when its request is built.
///
/// # Example
///
/// ```rust,no_run
/// use courier_http::{ApiClient, ApiResponse, ClientPolicy};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize)]
/// struct NewUser<'a> {
///     name: &'a str,
/// }
///
/// #[derive(Deserialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// let client = ApiClient::new(ClientPolicy::new("https://api.example.com/v1"))?;
/// client.set_token("s3cr3t");
///
/// let _created: ApiResponse<User> = client.post("/users", &NewUser { name: "ada" })?;
/// let user: ApiResponse<User> = client.get("/users/1")?;
/// if user.is_error() {
///     eprintln!("lookup failed with {}", user.http_code);
/// }
/// # Ok::<(), courier_http::Error>(())
/// ```
pub struct ApiClient<X: Transport = ReqwestTransport> {
    policy: Arc<ClientPolicy>,
    token: ArcSwapOption<String>,
    retry: RetryDecider,
    transport: X,
}

impl ApiClient {
    /// Create a client backed by reqwest.
    pub fn new(policy: ClientPolicy) -> Result<Self> {
        policy.validate()?;
        let transport = ReqwestTransport::new(&policy)?;
        Ok(Self::assemble(policy, transport))
    }
}

impl<X: Transport> ApiClient<X> {
    /// Create a client that sends requests through `transport`.
    pub fn with_transport(policy: ClientPolicy, transport: X) -> Result<Self> {
        policy.validate()?;
        Ok(Self::assemble(policy, transport))
    }

    fn assemble(policy: ClientPolicy, transport: X) -> Self {
        Self {
            retry: RetryDecider::from_policy(&policy),
            policy: Arc::new(policy),
            token: ArcSwapOption::empty(),
            transport,
        }
    }

    pub fn policy(&self) -> &ClientPolicy {
        &self.policy
    }

    pub fn token(&self) -> Option<String> {
        self.token.load_full().map(|token| token.as_ref().clone())
    }

    /// Set the token sent on subsequent calls.
    pub fn set_token(&self, token: impl Into<String>) {
        self.token.store(Some(Arc::new(token.into())));
    }

    pub fn clear_token(&self) {
        self.token.store(None);
    }

    /// Whether `status` is outside the 2xx range.
    pub fn is_error(&self, status: u16) -> bool {
        types::is_error(status)
    }

    pub fn get<T>(&self, url: &str) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned + 'static,
    {
        self.execute(Verb::Get, url)
    }

    pub fn delete<T>(&self, url: &str) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned + 'static,
    {
        self.execute(Verb::Delete, url)
    }

    /// POST `body` encoded with the request content kind.
    pub fn post<T, B>(&self, url: &str, body: &B) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned + 'static,
        B: Serialize + Any,
    {
        self.execute(Verb::Post(self.encode(body)?), url)
    }

    /// POST a literal string.
    pub fn post_text<T>(&self, url: &str, text: impl Into<String>) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned + 'static,
    {
        self.execute(Verb::Post(Entity::new(text.into())), url)
    }

    pub fn post_entity<T>(&self, url: &str, entity: Entity) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned + 'static,
    {
        self.execute(Verb::Post(entity), url)
    }

    pub fn post_url_form_encoded<T, I, K, V>(&self, url: &str, fields: I) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned + 'static,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.execute(Verb::Post(self.form(fields)), url)
    }

    /// PUT `body` encoded with the request content kind.
    pub fn put<T, B>(&self, url: &str, body: &B) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned + 'static,
        B: Serialize + Any,
    {
        self.execute(Verb::Put(self.encode(body)?), url)
    }

    pub fn put_text<T>(&self, url: &str, text: impl Into<String>) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned + 'static,
    {
        self.execute(Verb::Put(Entity::new(text.into())), url)
    }

    pub fn put_entity<T>(&self, url: &str, entity: Entity) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned + 'static,
    {
        self.execute(Verb::Put(entity), url)
    }

    pub fn put_url_form_encoded<T, I, K, V>(&self, url: &str, fields: I) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned + 'static,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.execute(Verb::Put(self.form(fields)), url)
    }

    /// PATCH `body` encoded with the request content kind.
    pub fn patch<T, B>(&self, url: &str, body: &B) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned + 'static,
        B: Serialize + Any,
    {
        self.execute(Verb::Patch(self.encode(body)?), url)
    }

    pub fn patch_text<T>(&self, url: &str, text: impl Into<String>) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned + 'static,
    {
        self.execute(Verb::Patch(Entity::new(text.into())), url)
    }

    pub fn patch_entity<T>(&self, url: &str, entity: Entity) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned + 'static,
    {
        self.execute(Verb::Patch(entity), url)
    }

    pub fn patch_url_form_encoded<T, I, K, V>(&self, url: &str, fields: I) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned + 'static,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.execute(Verb::Patch(self.form(fields)), url)
    }

    /// Send `verb` to `url` and decode the response.
    ///
    /// This is what every verb method ends in.
    pub fn execute<T>(&self, verb: Verb, url: &str) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned + 'static,
    {
        let token = self.token.load_full();
        let request = request::prepare(&self.policy, token.as_deref().map(String::as_str), verb, url);

        let raw = self.send(&request)?;
        response::handle(raw, &request.url, &self.policy)
    }

    fn send(&self, request: &PreparedRequest) -> std::result::Result<RawResponse, TransportError> {
        let timeout = self.policy.socket_timeout(request.method);
        let mut retries = 0;

        loop {
            match self.transport.execute(request, timeout) {
                Ok(raw) => return Ok(raw),
                Err(e)
                    if request.method.is_get_class()
                        && self.retry.should_retry(&e, request, retries) =>
                {
                    retries += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn encode<B>(&self, body: &B) -> Result<Entity>
    where
        B: Serialize + Any,
    {
        Ok(Entity::new(content::encode(body, &self.policy)?))
    }

    fn form<I, K, V>(&self, fields: I) -> Entity
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Entity::new(form::encode(fields))
            .with_content_type(form::content_kind(&self.policy.content_charset))
    }
}
