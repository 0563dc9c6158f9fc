use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use super::{AuthError, Identity, IdentityVerifier};

#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
}

/// Asks the backend's auth service who a token belongs to (`GET /auth/v1/user`)
pub struct RemoteVerifier {
    client: Client,
    user_url: Url,
    api_key: String,
}

impl RemoteVerifier {
    pub fn new(project_url: &str, api_key: &str, timeout: Duration) -> Result<Self, AuthError> {
        let mut user_url =
            Url::parse(project_url).map_err(|e| AuthError::Provider(format!("invalid project URL: {}", e)))?;
        let path = format!("{}/auth/v1/user", user_url.path().trim_end_matches('/'));
        user_url.set_path(&path);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        Ok(Self {
            client,
            user_url,
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl IdentityVerifier for RemoteVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let response = self
            .client
            .get(self.user_url.clone())
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let user = response
                    .json::<ProviderUser>()
                    .await
                    .map_err(|e| AuthError::Provider(format!("unexpected user payload: {}", e)))?;
                if user.id.trim().is_empty() {
                    return Err(AuthError::Invalid("identity provider returned no user id".to_string()));
                }
                Ok(Identity::new(user.id))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(AuthError::Invalid("rejected by identity provider".to_string()))
            }
            status => Err(AuthError::Provider(format!("identity provider responded {}", status))),
        }
    }
}
