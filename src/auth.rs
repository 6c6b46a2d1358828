//! OAuth2 client-credentials authentication for Microsoft Graph.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{GraphError, Result};
use crate::models::{Credentials, TokenResponse};

/// Microsoft identity platform host.
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Scope granting the application permissions configured for Graph.
const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

const GRANT_TYPE: &str = "client_credentials";

/// Snapshot of the last token fetched. Replaced as a whole on every refresh.
#[derive(Clone)]
pub struct CachedToken {
    access_token: String,
    token_type: String,
    expires_at: SystemTime,
}

impl CachedToken {
    fn from_response(response: TokenResponse, fetched_at: SystemTime) -> Self {
        Self {
            access_token: response.access_token,
            token_type: response.token_type,
            expires_at: fetched_at + Duration::from_secs(response.expires_in),
        }
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    pub fn expires_at(&self) -> SystemTime {
        self.expires_at
    }

    /// Strictly later than the expiry instant. There is no safety margin.
    pub fn is_expired_at(&self, at: SystemTime) -> bool {
        at > self.expires_at
    }

    /// Value for the `authorization` header: `"<type> <token>"`.
    pub fn header_value(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

/// Authenticator for Microsoft Graph using the client-credentials grant.
///
/// Constructing a provider performs no I/O. The first call to [`auth`](Self::auth)
/// fetches a token; later calls reuse it until it expires. Concurrent callers that
/// observe an expired token may each fetch a new one; the last write wins.
#[derive(Clone)]
pub struct GraphAuthProvider {
    credentials: Arc<Credentials>,
    token_url: String,
    client: Client,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
}

impl GraphAuthProvider {
    /// Create a new provider from credentials.
    pub fn new(credentials: Credentials) -> Self {
        let token_url = token_url(DEFAULT_AUTHORITY, &credentials.tenant_id);
        Self {
            credentials: Arc::new(credentials),
            token_url,
            client: Client::new(),
            cached_token: Arc::new(RwLock::new(None)),
        }
    }

    /// Create a new provider from `OFFICE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(Credentials::from_env()?))
    }

    /// Use another identity host, e.g. a sovereign cloud or a local stub.
    pub fn with_authority(mut self, authority: &str) -> Self {
        self.token_url = token_url(authority, &self.credentials.tenant_id);
        self
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Get the authorization headers, fetching a token if none is cached or it expired.
    pub async fn auth(&self) -> Result<HeaderMap> {
        let cached = self.cached_token.read().await.clone();

        let token = match cached {
            Some(token) if !token.is_expired_at(SystemTime::now()) => token,
            _ => {
                let token = self.fetch_access_token().await?;
                *self.cached_token.write().await = Some(token.clone());
                token
            }
        };

        let mut value = HeaderValue::from_str(&token.header_value())?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }

    /// Whether the cached token is expired at `at`. True when nothing was fetched yet.
    pub async fn is_token_expired_at(&self, at: SystemTime) -> bool {
        match self.cached_token.read().await.as_ref() {
            Some(token) => token.is_expired_at(at),
            None => true,
        }
    }

    /// Snapshot of the cached token, if any.
    pub async fn cached_token(&self) -> Option<CachedToken> {
        self.cached_token.read().await.clone()
    }

    async fn fetch_access_token(&self) -> Result<CachedToken> {
        debug!(url = %self.token_url, "requesting access token");

        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("grant_type", GRANT_TYPE),
            ("scope", GRAPH_SCOPE),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::AuthenticationError(body));
        }

        let fetched_at = SystemTime::now();
        let token_response: TokenResponse = response.json().await?;
        info!(
            expires_in = token_response.expires_in,
            "access token refreshed"
        );

        Ok(CachedToken::from_response(token_response, fetched_at))
    }
}

fn token_url(authority: &str, tenant_id: &str) -> String {
    format!(
        "{}/{}/oauth2/v2.0/token",
        authority.trim_end_matches('/'),
        tenant_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expires_in: u64, fetched_at: SystemTime) -> CachedToken {
        CachedToken::from_response(
            TokenResponse {
                access_token: "abc".to_string(),
                token_type: "Bearer".to_string(),
                expires_in,
            },
            fetched_at,
        )
    }

    #[test]
    fn test_token_url() {
        assert_eq!(
            token_url(DEFAULT_AUTHORITY, "tenant-1"),
            "https://login.microsoftonline.com/tenant-1/oauth2/v2.0/token"
        );
        assert_eq!(
            token_url("http://127.0.0.1:1234/", "t"),
            "http://127.0.0.1:1234/t/oauth2/v2.0/token"
        );
    }

    #[test]
    fn test_expiry_is_strict() {
        let now = SystemTime::now();
        let token = token(3600, now);
        let expiry = now + Duration::from_secs(3600);

        assert!(!token.is_expired_at(expiry));
        assert!(token.is_expired_at(expiry + Duration::from_millis(1)));
        assert!(!token.is_expired_at(expiry - Duration::from_secs(1)));
    }

    #[test]
    fn test_header_value() {
        let token = token(60, SystemTime::now());
        assert_eq!(token.header_value(), "Bearer abc");
        assert_eq!(token.token_type(), "Bearer");
    }

    #[tokio::test]
    async fn test_fresh_provider_reports_expired() {
        let provider = GraphAuthProvider::new(Credentials::new("id", "secret", "tenant"));
        assert!(provider.is_token_expired_at(SystemTime::now()).await);
        assert!(provider.cached_token().await.is_none());
    }
}
