//! ecom HTTP client
//!
//! An [`ApiClient`](client::ApiClient) bound to `<origin>/api` that sends
//! credentials with every request and attaches `Authorization: Bearer <token>`
//! whenever a login record is present in persisted local storage.
//!
//! Requests pass through an ordered [`MiddlewarePipeline`](client::middleware::MiddlewarePipeline)
//! before transmission. The token lookup sits behind the [`TokenSource`](storage::TokenSource)
//! capability and the persisted store behind [`KeyValueStore`](storage::KeyValueStore),
//! so both can be replaced in tests.

pub mod client;
pub mod storage;
pub mod types;

pub use client::config::{ClientConfig, ClientSettings};
pub use client::error::ClientError;
pub use client::middleware::{MiddlewarePipeline, RequestMiddleware};
pub use client::{ApiClient, ApiClientBuilder};
pub use storage::{
    AUTH_STORAGE_KEY, AuthRecord, KeyValueStore, MalformedAuthPolicy, StorageError,
    StoredAuthToken, TokenError, TokenSource,
};
