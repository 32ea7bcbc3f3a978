//! JSON-over-HTTP transport with bearer auth, one-shot token refresh and
//! retried reads

use super::auth::AuthSession;
use super::retry::RetryPolicy;
use crate::config::ClientConfig;
use crate::core::error::ApiError;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Shared HTTP client for every entity API
///
/// Cheap to clone; clones share the connection pool and the auth session.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    auth: AuthSession,
    retry: RetryPolicy,
}

impl RestClient {
    /// Build a client from validated configuration
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
            auth: AuthSession::new(),
            retry: RetryPolicy::new(config.read_retries, config.retry_base_delay()),
        })
    }

    /// Replace the read retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Use an existing session (e.g. tokens restored from disk)
    pub fn with_session(mut self, auth: AuthSession) -> Self {
        self.auth = auth;
        self
    }

    pub fn auth(&self) -> &AuthSession {
        &self.auth
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET and decode, retried per the read policy
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.retry
            .run(path, || self.execute(Method::GET, path, None))
            .await
    }

    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.execute(Method::POST, path, Some(&body)).await
    }

    pub async fn patch<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.execute(Method::PATCH, path, Some(&body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let _: Value = self.execute(Method::DELETE, path, None).await?;
        Ok(())
    }

    /// POST without the bearer header, used by the token endpoints
    pub(crate) async fn send_unauthenticated<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let text = self.send(Method::POST, path, Some(&body), None).await?;
        decode(&text)
    }

    /// Send with the current access token; on 401 refresh once and replay
    async fn execute<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<R, ApiError> {
        let token = self.auth.access_token();
        let first = self.send(method.clone(), path, body, token.as_deref()).await;

        let text = match first {
            Err(ApiError::Unauthorized { .. }) if self.auth.refresh_token().is_some() => {
                debug!(%method, path, "access token rejected, refreshing");
                self.refresh().await?;
                let token = self.auth.access_token();
                self.send(method, path, body, token.as_deref()).await?
            }
            other => other?,
        };

        decode(&text)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<String, ApiError> {
        debug!(%method, path, "sending request");

        let mut request = self.http.request(method.clone(), self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            Ok(text)
        } else {
            let error = ApiError::from_response(status.as_u16(), &text);
            warn!(%method, path, status = status.as_u16(), error = %error, "request failed");
            Err(error)
        }
    }
}

/// Decode a response body; an empty body reads as JSON `null`
fn decode<R: DeserializeOwned>(text: &str) -> Result<R, ApiError> {
    let text = if text.trim().is_empty() { "null" } else { text };
    Ok(serde_json::from_str(text)?)
}
