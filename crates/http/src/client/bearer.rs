//! Bearer token middleware

use super::ClientError;
use super::middleware::RequestMiddleware;
use crate::storage::TokenSource;
use reqwest::Request;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use tracing::trace;

/// Sets `Authorization: Bearer <token>` when the token source has a token
///
/// Requests are left untouched when there is no token. A failing lookup fails
/// the request.
#[derive(Debug, Clone)]
pub struct BearerAuth<T> {
    source: T,
}

impl<T: TokenSource> BearerAuth<T> {
    pub const fn new(source: T) -> Self {
        Self { source }
    }

    pub const fn source(&self) -> &T {
        &self.source
    }
}

impl<T: TokenSource> RequestMiddleware for BearerAuth<T> {
    fn name(&self) -> &'static str {
        "bearer_auth"
    }

    fn on_request(&self, request: &mut Request) -> Result<(), ClientError> {
        let Some(token) = self.source.get_auth_token()? else {
            trace!(url = %request.url(), "No auth token stored, sending without credentials");
            return Ok(());
        };

        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
        value.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, value);

        trace!(url = %request.url(), "Attached bearer token");
        Ok(())
    }
}
