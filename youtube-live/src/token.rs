//! Where bearer tokens come from.
//!
//! The gateway asks its [`TokenProvider`] for a token before every request. Providers may
//! suspend (to refresh, for example), may fail, or may have nothing to give. An absent token
//! is a configuration problem rather than a transient one, so callers see it as
//! `"OAuth token is not presented"` and nothing retries it.

use std::future::Future;
use std::sync::Arc;

/// Supplies OAuth2 access tokens on demand.
pub trait TokenProvider: Send + Sync {
    /// Returns a currently valid access token, or `None` if there is none to be had.
    fn access_token(&self) -> impl Future<Output = eyre::Result<Option<String>>> + Send;
}

impl<T: TokenProvider> TokenProvider for Arc<T> {
    fn access_token(&self) -> impl Future<Output = eyre::Result<Option<String>>> + Send {
        (**self).access_token()
    }
}

/// A token that never changes, such as one passed on the command line.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(pub Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }
}

impl TokenProvider for StaticToken {
    async fn access_token(&self) -> eyre::Result<Option<String>> {
        Ok(self.0.clone())
    }
}
