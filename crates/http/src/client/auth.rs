//! Authentication API client methods

use super::{ApiClient, ClientError};
use crate::types::{LoginRequest, MessageResponse, UserInfo};
use reqwest::Method;

impl ApiClient {
    /// Sign in with username and password
    ///
    /// The returned record is not persisted; storing it under the `"auth"`
    /// key is up to the caller.
    pub async fn sign_in(&self, request: &LoginRequest) -> Result<UserInfo, ClientError> {
        self.post("/auth/signin", request).await
    }

    /// Get the signed-in user
    pub async fn current_user(&self) -> Result<UserInfo, ClientError> {
        self.get("/auth/user").await
    }

    /// Sign out on the server
    pub async fn sign_out(&self) -> Result<MessageResponse, ClientError> {
        let request = self.request(Method::POST, "/auth/signout");
        self.execute(request).await
    }
}
