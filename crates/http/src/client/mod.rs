//! ecom API client

pub mod auth;
pub mod bearer;
pub mod catalog;
pub mod config;
pub mod error;
pub mod middleware;

use self::config::{ClientConfig, ClientSettings};
use crate::storage::{KeyValueStore, StoredAuthToken, TokenSource};
use bearer::BearerAuth;
pub use error::ClientError;
use middleware::{MiddlewarePipeline, RequestMiddleware};
use reqwest::{Client, ClientBuilder, Method, Request, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const DEFAULT_USER_AGENT: &str = concat!("ecom-client/", env!("CARGO_PKG_VERSION"));

/// ecom API client
///
/// Cheap to clone; clones share the connection pool, cookie jar and
/// middleware. Configuration never changes after [`ApiClientBuilder::build`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
    pipeline: MiddlewarePipeline,
}

impl ApiClient {
    /// Create an unauthenticated client for `<origin>/api`
    pub fn new(origin: Option<&str>) -> Result<Self, ClientError> {
        let mut builder = Self::builder();
        if let Some(origin) = origin {
            builder = builder.origin(origin);
        }
        builder.build()
    }

    /// Create a client that authenticates with the login record kept in `store`
    pub fn with_local_storage<S>(origin: Option<&str>, store: S) -> Result<Self, ClientError>
    where
        S: KeyValueStore + 'static,
    {
        let mut builder = Self::builder().local_storage(store);
        if let Some(origin) = origin {
            builder = builder.origin(origin);
        }
        builder.build()
    }

    /// Create a client from loaded settings, authenticating from `store`
    pub fn from_settings<S>(settings: &ClientSettings, store: S) -> Result<Self, ClientError>
    where
        S: KeyValueStore + 'static,
    {
        let mut builder = Self::builder()
            .token_source(StoredAuthToken::new(store).with_policy(settings.malformed_auth));

        if let Some(origin) = &settings.back_end_url {
            builder = builder.origin(origin);
        }
        if let Some(timeout_secs) = settings.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }
        if let Some(user_agent) = &settings.user_agent {
            builder = builder.user_agent(user_agent);
        }

        builder.build()
    }

    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Get the base URL (`<origin>/api`)
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Whether credentials are sent with requests
    pub const fn with_credentials(&self) -> bool {
        self.config.with_credentials
    }

    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve `path` against the base URL
    ///
    /// Absolute URLs are used as given and protocol-relative ones (`//host/..`)
    /// take the scheme of the base URL. Relative paths are joined to the base
    /// URL with a single `/`.
    pub fn url(&self, path: &str) -> String {
        resolve_url(&self.config.base_url, path)
    }

    /// Create a request builder for `path`
    ///
    /// Authentication is not applied here; it is added by the middleware when
    /// the request is prepared.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.client.request(method, self.url(path));

        #[cfg(target_arch = "wasm32")]
        let request = if self.config.with_credentials {
            request.fetch_credentials_include()
        } else {
            request
        };

        request
    }

    /// Build the request and run it through the middleware without sending it
    pub fn prepare(&self, request: RequestBuilder) -> Result<Request, ClientError> {
        let request = request.build()?;
        self.pipeline.run(request)
    }

    /// Prepare and send a request, returning the raw response
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let request = self.prepare(request)?;
        debug!(method = %request.method(), url = %request.url(), "Sending request");
        Ok(self.client.execute(request).await?)
    }

    /// Execute a request and handle common errors
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            debug!(status = status.as_u16(), "Request returned error status");
            Err(ClientError::from_status(status, message))
        }
    }

    /// GET `path` and decode the JSON response
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.execute(self.request(Method::GET, path)).await
    }

    /// POST `body` as JSON to `path` and decode the JSON response
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::POST, path).json(body))
            .await
    }

    /// PUT `body` as JSON to `path` and decode the JSON response
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::PUT, path).json(body))
            .await
    }

    /// DELETE `path` and decode the JSON response
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.execute(self.request(Method::DELETE, path)).await
    }
}

fn resolve_url(base_url: &str, path: &str) -> String {
    if is_absolute_url(path) {
        return path.to_string();
    }
    if path.starts_with("//") {
        return url::Url::parse(base_url)
            .and_then(|base| base.join(path))
            .map_or_else(|_| path.to_string(), String::from);
    }
    if path.is_empty() {
        return base_url.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn is_absolute_url(path: &str) -> bool {
    url::Url::parse(path).is_ok_and(|url| !url.cannot_be_a_base())
}

/// Builder for [`ApiClient`]
#[derive(Default)]
pub struct ApiClientBuilder {
    origin: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    token_source: Option<Arc<dyn TokenSource>>,
    pipeline: MiddlewarePipeline,
}

impl ApiClientBuilder {
    /// Set the backend origin; `/api` is appended
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Set the request timeout (ignored on wasm32)
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Attach bearer tokens from `source`
    pub fn token_source(mut self, source: impl TokenSource + 'static) -> Self {
        self.token_source = Some(Arc::new(source));
        self
    }

    /// Attach bearer tokens from the login record kept in `store`
    pub fn local_storage(self, store: impl KeyValueStore + 'static) -> Self {
        self.token_source(StoredAuthToken::new(store))
    }

    /// Add a middleware stage; stages run after bearer authentication, in the
    /// order they were added
    pub fn middleware(mut self, stage: impl RequestMiddleware + 'static) -> Self {
        self.pipeline.push(stage);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let config = ClientConfig::from_origin(self.origin.as_deref());

        let mut client_builder = ClientBuilder::new()
            .user_agent(self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT));

        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Some(timeout) = self.timeout {
                client_builder = client_builder.timeout(timeout);
            }
            client_builder = client_builder.cookie_store(config.with_credentials);
        }

        let client = client_builder.build()?;

        let mut pipeline = MiddlewarePipeline::new();
        if let Some(source) = self.token_source {
            pipeline.push(BearerAuth::new(source));
        }
        for stage in self.pipeline.into_stages() {
            pipeline.push_arc(stage);
        }

        debug!(base_url = %config.base_url, stages = pipeline.len(), "Built API client");

        Ok(ApiClient {
            client,
            config,
            pipeline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{AUTH_STORAGE_KEY, MemoryStore};
    use reqwest::header::AUTHORIZATION;

    fn client() -> ApiClient {
        ApiClient::new(Some("https://api.example.com")).unwrap()
    }

    #[test]
    fn test_base_url_and_credentials() {
        let client = client();
        assert_eq!(client.base_url(), "https://api.example.com/api");
        assert!(client.with_credentials());
    }

    #[test]
    fn test_url_resolution() {
        let client = client();
        assert_eq!(
            client.url("/products"),
            "https://api.example.com/api/products"
        );
        assert_eq!(
            client.url("products"),
            "https://api.example.com/api/products"
        );
        assert_eq!(client.url(""), "https://api.example.com/api");
        assert_eq!(
            client.url("https://cdn.example.com/image.png"),
            "https://cdn.example.com/image.png"
        );
    }

    #[test]
    fn test_protocol_relative_url_bypasses_base() {
        let client = client();
        assert_eq!(
            client.url("//cdn.example.com/x"),
            "https://cdn.example.com/x"
        );

        // Without an origin there is no scheme to borrow
        let client = ApiClient::new(None).unwrap();
        assert_eq!(client.url("//cdn.example.com/x"), "//cdn.example.com/x");
    }

    #[test]
    fn test_prepare_without_store_has_no_auth() {
        let client = client();
        let request = client
            .prepare(client.request(Method::GET, "/products"))
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://api.example.com/api/products"
        );
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_prepare_with_store_attaches_token() {
        let store = MemoryStore::with_items([(AUTH_STORAGE_KEY, r#"{"jwtToken":"xyz"}"#)]);
        let client = ApiClient::with_local_storage(Some("https://api.example.com"), store).unwrap();

        for path in ["/products", "/categories"] {
            let request = client.prepare(client.request(Method::GET, path)).unwrap();
            assert_eq!(request.headers()[AUTHORIZATION], "Bearer xyz");
        }
    }

    #[test]
    fn test_custom_middleware_runs_after_auth() {
        let store = MemoryStore::with_items([(AUTH_STORAGE_KEY, r#"{"jwtToken":"xyz"}"#)]);
        let client = ApiClient::builder()
            .origin("https://api.example.com")
            .local_storage(store)
            .middleware(|request: &mut Request| -> Result<(), ClientError> {
                assert!(request.headers().contains_key(AUTHORIZATION));
                request
                    .headers_mut()
                    .insert("x-client", reqwest::header::HeaderValue::from_static("cli"));
                Ok(())
            })
            .build()
            .unwrap();

        let request = client
            .prepare(client.request(Method::GET, "/products"))
            .unwrap();
        assert_eq!(request.headers()["x-client"], "cli");
    }

    #[test]
    fn test_missing_origin_fails_on_prepare() {
        let client = ApiClient::new(None).unwrap();
        assert_eq!(client.base_url(), "/api");

        let result = client.prepare(client.request(Method::GET, "/products"));
        assert!(matches!(result, Err(ClientError::Request(_))));
    }
}
