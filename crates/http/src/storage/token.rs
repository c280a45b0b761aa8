//! Bearer token lookup

use super::{KeyValueStore, StorageError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;
use tracing::debug;

/// Storage key holding the login record
pub const AUTH_STORAGE_KEY: &str = "auth";

/// Token lookup error types
#[derive(Debug, Error)]
pub enum TokenError {
    /// The store itself failed
    #[error("Failed to read auth record: {0}")]
    Storage(#[from] StorageError),

    /// A record is stored but is not a valid login record
    #[error("Stored auth record is malformed: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Login record persisted after a successful sign-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthRecord {
    #[serde(rename = "jwtToken")]
    pub jwt_token: String,
    /// Anything else the backend returned alongside the token
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl AuthRecord {
    pub fn new(jwt_token: impl Into<String>) -> Self {
        Self {
            jwt_token: jwt_token.into(),
            extra: Map::new(),
        }
    }

    /// Parse a stored record
    ///
    /// Duplicate keys resolve to the last occurrence, as in a browser's
    /// `JSON.parse`.
    pub fn parse(raw: &str) -> Result<Self, TokenError> {
        serde_json::from_str::<JsonValue>(raw)
            .and_then(serde_json::from_value)
            .map_err(TokenError::Malformed)
    }
}

/// What to do with a stored record that does not parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedAuthPolicy {
    /// Fail the request
    #[default]
    Reject,
    /// Send the request without credentials
    TreatAsAbsent,
}

/// Source of the bearer token attached to outgoing requests
#[cfg_attr(test, mockall::automock)]
pub trait TokenSource: Send + Sync {
    /// Current token, or `Ok(None)` when no credentials are available
    fn get_auth_token(&self) -> Result<Option<String>, TokenError>;
}

/// Token read from the `"auth"` record of a [`KeyValueStore`]
#[derive(Debug, Clone)]
pub struct StoredAuthToken<S> {
    store: S,
    key: String,
    policy: MalformedAuthPolicy,
}

impl<S: KeyValueStore> StoredAuthToken<S> {
    /// Read the token from `store` under [`AUTH_STORAGE_KEY`]
    pub fn new(store: S) -> Self {
        Self {
            store,
            key: AUTH_STORAGE_KEY.to_string(),
            policy: MalformedAuthPolicy::default(),
        }
    }

    /// Read the record from a different key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Choose how malformed records are handled
    pub fn with_policy(mut self, policy: MalformedAuthPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub const fn policy(&self) -> MalformedAuthPolicy {
        self.policy
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Load and parse the full record, ignoring the malformed-record policy
    pub fn load_record(&self) -> Result<Option<AuthRecord>, TokenError> {
        match self.store.get_item(&self.key)? {
            // An empty value counts as no login
            Some(raw) if raw.is_empty() => Ok(None),
            Some(raw) => AuthRecord::parse(&raw).map(Some),
            None => Ok(None),
        }
    }
}

impl<S: KeyValueStore> TokenSource for StoredAuthToken<S> {
    fn get_auth_token(&self) -> Result<Option<String>, TokenError> {
        match self.load_record() {
            Ok(record) => Ok(record.map(|r| r.jwt_token)),
            Err(TokenError::Malformed(e)) if self.policy == MalformedAuthPolicy::TreatAsAbsent => {
                debug!(key = %self.key, error = %e, "Ignoring malformed auth record");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// A fixed token
#[derive(Clone)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    /// A source that never has a token
    pub const fn none() -> Self {
        Self(None)
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StaticToken")
            .field(&self.0.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl TokenSource for StaticToken {
    fn get_auth_token(&self) -> Result<Option<String>, TokenError> {
        Ok(self.0.clone())
    }
}

impl<T: TokenSource + ?Sized> TokenSource for std::sync::Arc<T> {
    fn get_auth_token(&self) -> Result<Option<String>, TokenError> {
        (**self).get_auth_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn source_with(raw: &str) -> StoredAuthToken<MemoryStore> {
        StoredAuthToken::new(MemoryStore::with_items([(AUTH_STORAGE_KEY, raw)]))
    }

    #[test]
    fn test_absent_record_has_no_token() {
        let source = StoredAuthToken::new(MemoryStore::new());
        assert_eq!(source.get_auth_token().unwrap(), None);
    }

    #[test]
    fn test_reads_jwt_token_field() {
        let source = source_with(r#"{"jwtToken":"abc123"}"#);
        assert_eq!(source.get_auth_token().unwrap().as_deref(), Some("abc123"));
    }

    #[test]
    fn test_keeps_extra_fields() {
        let source =
            source_with(r#"{"id":7,"username":"user1","roles":["ROLE_USER"],"jwtToken":"t"}"#);
        let record = source.load_record().unwrap().unwrap();

        assert_eq!(record.jwt_token, "t");
        assert_eq!(record.extra["username"], "user1");
        assert_eq!(record.extra["id"], 7);
    }

    #[test]
    fn test_empty_value_is_absent() {
        let source = source_with("");
        assert_eq!(source.get_auth_token().unwrap(), None);
    }

    #[test]
    fn test_malformed_record_is_rejected_by_default() {
        for raw in ["not json", "null", "{}", r#"{"jwtToken":42}"#] {
            let source = source_with(raw);
            assert!(
                matches!(source.get_auth_token(), Err(TokenError::Malformed(_))),
                "expected malformed error for {raw:?}"
            );
        }
    }

    #[test]
    fn test_malformed_record_can_be_treated_as_absent() {
        let source = source_with("{broken").with_policy(MalformedAuthPolicy::TreatAsAbsent);
        assert_eq!(source.get_auth_token().unwrap(), None);

        // load_record still reports the problem
        assert!(matches!(source.load_record(), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_duplicate_key_takes_last_value() {
        let source = source_with(r#"{"jwtToken":"a","jwtToken":"b"}"#);
        assert_eq!(source.get_auth_token().unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn test_custom_key() {
        let store = MemoryStore::with_items([("session", r#"{"jwtToken":"s"}"#)]);
        let source = StoredAuthToken::new(store).with_key("session");
        assert_eq!(source.get_auth_token().unwrap().as_deref(), Some("s"));
    }

    #[test]
    fn test_lookup_never_writes() {
        let source = source_with(r#"{"jwtToken":"abc123"}"#);
        source.get_auth_token().unwrap();
        source.get_auth_token().unwrap();

        assert_eq!(
            source.store().get_item(AUTH_STORAGE_KEY).unwrap().as_deref(),
            Some(r#"{"jwtToken":"abc123"}"#)
        );
    }

    #[test]
    fn test_static_token_debug_is_redacted() {
        let token = StaticToken::new("secret");
        assert!(!format!("{token:?}").contains("secret"));
        assert_eq!(StaticToken::none().get_auth_token().unwrap(), None);
    }
}
