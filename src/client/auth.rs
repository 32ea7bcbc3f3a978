//! Bearer-token session against the service's token endpoints
//!
//! `POST /auth/token/` exchanges credentials for an access/refresh pair;
//! `POST /auth/token/refresh/` trades the refresh token for a new access
//! token. The session is shared by every clone of the [`RestClient`].

use super::endpoints;
use super::rest::RestClient;
use crate::core::error::ApiError;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

/// Username and password for the token endpoint
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Access and refresh tokens issued by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

/// The refresh endpoint may rotate the refresh token
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

/// Shared, thread-safe holder of the current tokens
#[derive(Debug, Clone, Default)]
pub struct AuthSession {
    tokens: Arc<RwLock<Option<TokenPair>>>,
}

impl AuthSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from tokens persisted by an earlier run
    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            tokens: Arc::new(RwLock::new(Some(tokens))),
        }
    }

    pub fn tokens(&self) -> Option<TokenPair> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.tokens().map(|t| t.access)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.tokens().map(|t| t.refresh)
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens().is_some()
    }

    pub fn set(&self, tokens: TokenPair) {
        *self.tokens.write().unwrap_or_else(PoisonError::into_inner) = Some(tokens);
    }

    /// Forget the tokens (logout, or a refresh the server rejected)
    pub fn clear(&self) {
        *self.tokens.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl RestClient {
    /// Exchange credentials for a token pair and store it in the session
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenPair, ApiError> {
        let tokens: TokenPair = self
            .send_unauthenticated(endpoints::AUTH_TOKEN, credentials)
            .await?;
        self.auth().set(tokens.clone());
        info!(username = %credentials.username, "logged in");
        Ok(tokens)
    }

    /// Trade the refresh token for a new access token
    ///
    /// A rejected refresh clears the session and reports `Unauthorized`.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let Some(current) = self.auth().tokens() else {
            return Err(ApiError::Unauthorized { detail: None });
        };

        let body = RefreshRequest {
            refresh: &current.refresh,
        };
        match self
            .send_unauthenticated::<_, RefreshResponse>(endpoints::AUTH_TOKEN_REFRESH, &body)
            .await
        {
            Ok(response) => {
                self.auth().set(TokenPair {
                    access: response.access,
                    refresh: response.refresh.unwrap_or(current.refresh),
                });
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "token refresh rejected, clearing session");
                self.auth().clear();
                Err(ApiError::Unauthorized {
                    detail: e.detail().map(str::to_string),
                })
            }
        }
    }

    pub fn logout(&self) {
        self.auth().clear();
    }
}
