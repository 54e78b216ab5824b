//! Partner access tokens and the optional token cache

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Seconds shaved off `expires_in` before a cached token counts as stale
pub const TOKEN_EXPIRY_SKEW_SECONDS: u64 = 30;

/// OAuth2 token returned by the partner's password grant
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    /// Bearer token
    pub access_token: String,
    /// Usually `bearer`
    #[serde(default)]
    pub token_type: String,
    /// Granted scope
    #[serde(default)]
    pub scope: String,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: u64,
    /// Refresh token
    #[serde(default)]
    pub refresh_token: String,
    /// Opaque partner metadata
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl AccessToken {
    /// `Authorization` header value
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: AccessToken,
    obtained_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        let lifetime = self.token.expires_in.saturating_sub(TOKEN_EXPIRY_SKEW_SECONDS);
        lifetime > 0 && now.duration_since(self.obtained_at) < Duration::from_secs(lifetime)
    }
}

/// Holds the last token. The mutex stays locked across a refresh so
/// concurrent callers wait for one re-authentication.
#[derive(Debug, Default)]
pub struct TokenCache {
    slot: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached token if still fresh, otherwise run `refresh`
    /// and store its result. Errors are not cached.
    pub async fn get_or_refresh<F, Fut, E>(&self, refresh: F) -> Result<AccessToken, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<AccessToken, E>>,
    {
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_ref() {
            if cached.is_fresh(Instant::now()) {
                return Ok(cached.token.clone());
            }
        }

        let token = refresh().await?;
        *slot = Some(CachedToken {
            token: token.clone(),
            obtained_at: Instant::now(),
        });
        Ok(token)
    }

    /// Drop the cached token
    pub async fn invalidate(&self) {
        self.slot.lock().await.take();
    }
}
