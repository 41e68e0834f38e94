//! OAuth 2.0 token refresh for YouTube API access.
//!
//! Obtaining the first token (the browser consent flow) happens elsewhere. This module takes
//! a stored token, keeps track of when it expires, and refreshes it against Google's token
//! endpoint whenever the gateway asks for a token that is about to go stale.

use crate::token::TokenProvider;
use eyre::Context;
use oauth2::basic::{BasicClient, BasicErrorResponseType, BasicTokenResponse};
use oauth2::{ClientId, ClientSecret, RequestTokenError, TokenResponse, TokenUrl};
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;

/// Google OAuth2 token endpoint used for refresh.
const TOKEN_URL: &str = "https://www.googleapis.com/oauth2/v3/token";

/// Safety margin subtracted from `expires_in`.
const EXPIRY_BUFFER: Duration = Duration::from_secs(300);

/// Lifetime assumed when the token response does not say (one hour minus the buffer).
const DEFAULT_LIFETIME: Duration = Duration::from_secs(3300);

/// Exchanges refresh tokens for new access tokens.
#[derive(Debug, Clone)]
pub struct OAuthManager {
    client_id: String,
    client_secret: String,
    http_client: oauth2::reqwest::Client,
}

impl OAuthManager {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> eyre::Result<Self> {
        let http_client = oauth2::reqwest::ClientBuilder::new()
            // SSRF no thank you.
            .redirect(oauth2::reqwest::redirect::Policy::none())
            .build()
            .context("build OAuth HTTP client")?;
        Ok(Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            http_client,
        })
    }

    /// Attempts to refresh `token` using its refresh token.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(new_token))` - Refresh succeeded
    /// * `Ok(None)` - There is no refresh token, or Google rejected it as an invalid grant
    /// * `Err(_)` - Network or other error occurred during the refresh attempt
    pub async fn refresh_token(
        &self,
        token: &BasicTokenResponse,
    ) -> eyre::Result<Option<BasicTokenResponse>> {
        let Some(refresh_token) = token.refresh_token() else {
            tracing::warn!("no refresh token available, cannot refresh");
            return Ok(None);
        };

        let token_url = TokenUrl::new(TOKEN_URL.to_string()).context("parse token endpoint URL")?;
        let client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.client_secret.clone()))
            .set_token_uri(token_url);

        tracing::debug!("attempting to refresh OAuth token");
        match client
            .exchange_refresh_token(refresh_token)
            .request_async(&self.http_client)
            .await
        {
            Ok(new_token) => {
                tracing::debug!("successfully refreshed OAuth token");
                Ok(Some(new_token))
            }
            Err(ref e @ RequestTokenError::ServerResponse(ref sr))
                if matches!(sr.error(), BasicErrorResponseType::InvalidGrant) =>
            {
                tracing::warn!("OAuth refresh token considered invalid grant: {}", e);
                Ok(None)
            }
            Err(e) => Err(e).context("exchange refresh token"),
        }
    }
}

/// An access token together with the moment it should no longer be used.
#[derive(Debug, Clone)]
struct TimeBoundAccessToken {
    token: BasicTokenResponse,
    expires_at: SystemTime,
}

impl TimeBoundAccessToken {
    fn new(token: BasicTokenResponse) -> Self {
        let lifetime = token
            .expires_in()
            .map_or(DEFAULT_LIFETIME, |d| d.saturating_sub(EXPIRY_BUFFER));
        Self {
            expires_at: SystemTime::now() + lifetime,
            token,
        }
    }

    /// Tokens loaded from storage have unknown age, so treat them as stale.
    fn expired(token: BasicTokenResponse) -> Self {
        Self {
            expires_at: SystemTime::UNIX_EPOCH,
            token,
        }
    }

    fn is_expired(&self) -> bool {
        SystemTime::now() >= self.expires_at
    }

    /// Swaps in a refreshed token, keeping the old refresh token if Google didn't send one.
    fn replace(&mut self, mut new_token: BasicTokenResponse) {
        if new_token.refresh_token().is_none() {
            tracing::trace!("new token lacks refresh token, preserving original");
            new_token.set_refresh_token(self.token.refresh_token().cloned());
        }
        *self = Self::new(new_token);
    }
}

/// A [`TokenProvider`] backed by a stored OAuth token that refreshes itself when stale.
#[derive(Debug)]
pub struct OAuthTokenProvider {
    token: Mutex<TimeBoundAccessToken>,
    oauth_manager: OAuthManager,
}

impl OAuthTokenProvider {
    /// Wraps a token that was just issued.
    pub fn fresh(token: BasicTokenResponse, oauth_manager: OAuthManager) -> Self {
        Self {
            token: Mutex::new(TimeBoundAccessToken::new(token)),
            oauth_manager,
        }
    }

    /// Wraps a token read back from storage; it is refreshed before first use.
    pub fn stored(token: BasicTokenResponse, oauth_manager: OAuthManager) -> Self {
        Self {
            token: Mutex::new(TimeBoundAccessToken::expired(token)),
            oauth_manager,
        }
    }

    /// The current token, for writing back to storage.
    pub async fn token(&self) -> BasicTokenResponse {
        self.token.lock().await.token.clone()
    }
}

impl TokenProvider for OAuthTokenProvider {
    async fn access_token(&self) -> eyre::Result<Option<String>> {
        let mut token = self.token.lock().await;
        if token.is_expired() {
            tracing::debug!("access token expired, attempting refresh");
            let Some(new_token) = self
                .oauth_manager
                .refresh_token(&token.token)
                .await
                .context("refresh OAuth token")?
            else {
                tracing::error!("access token refresh failed, re-authorization needed");
                return Ok(None);
            };
            token.replace(new_token);
        }
        Ok(Some(token.token.access_token().secret().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(json: serde_json::Value) -> BasicTokenResponse {
        serde_json::from_value(json).unwrap()
    }

    #[tokio::test]
    async fn fresh_token_is_served_without_refresh() {
        let manager = OAuthManager::new("id", "secret").unwrap();
        let provider = OAuthTokenProvider::fresh(
            token(serde_json::json!({
                "access_token": "ya29.fresh",
                "token_type": "bearer",
                "expires_in": 3599
            })),
            manager,
        );
        assert_eq!(
            provider.access_token().await.unwrap().as_deref(),
            Some("ya29.fresh")
        );
    }

    #[tokio::test]
    async fn stale_token_without_refresh_token_is_absent() {
        let manager = OAuthManager::new("id", "secret").unwrap();
        let provider = OAuthTokenProvider::stored(
            token(serde_json::json!({
                "access_token": "ya29.old",
                "token_type": "bearer"
            })),
            manager,
        );
        assert_eq!(provider.access_token().await.unwrap(), None);
    }

    #[test]
    fn refreshed_token_keeps_refresh_token() {
        let mut stored = TimeBoundAccessToken::expired(token(serde_json::json!({
            "access_token": "ya29.old",
            "token_type": "bearer",
            "refresh_token": "1//keep-me"
        })));
        stored.replace(token(serde_json::json!({
            "access_token": "ya29.new",
            "token_type": "bearer",
            "expires_in": 3599
        })));

        assert!(!stored.is_expired());
        assert_eq!(stored.token.access_token().secret(), "ya29.new");
        assert_eq!(
            stored.token.refresh_token().map(|t| t.secret().as_str()),
            Some("1//keep-me")
        );
    }
}
