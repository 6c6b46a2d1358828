//! Pre-authenticated transport session shared by resource clients.

use std::sync::Arc;

use reqwest::header::HeaderMap;
use reqwest::{Client, Method, RequestBuilder, Response};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{GraphError, Result};

/// One HTTP client carrying the authorization header as a default header.
///
/// Clones share the same underlying client. Once [`close`](Self::close) has been
/// called on any clone, every request through any clone fails with
/// [`GraphError::SessionClosed`].
#[derive(Debug, Clone)]
pub struct GraphSession {
    client: Arc<RwLock<Option<Client>>>,
}

impl GraphSession {
    /// Open a session whose requests all carry `default_headers`.
    pub fn open(default_headers: HeaderMap) -> Result<Self> {
        let client = Client::builder().default_headers(default_headers).build()?;
        Ok(Self {
            client: Arc::new(RwLock::new(Some(client))),
        })
    }

    /// Release the underlying client. Idempotent.
    pub async fn close(&self) {
        if self.client.write().await.take().is_some() {
            debug!("transport session closed");
        }
    }

    pub async fn is_closed(&self) -> bool {
        self.client.read().await.is_none()
    }

    /// Start a request through the session.
    pub async fn request(&self, method: Method, url: &str) -> Result<RequestBuilder> {
        let guard = self.client.read().await;
        let client = guard.as_ref().ok_or(GraphError::SessionClosed)?;
        debug!(%method, url, "graph request");
        Ok(client.request(method, url))
    }

    pub async fn get(&self, url: &str) -> Result<RequestBuilder> {
        self.request(Method::GET, url).await
    }

    pub async fn put(&self, url: &str) -> Result<RequestBuilder> {
        self.request(Method::PUT, url).await
    }

    pub async fn post(&self, url: &str) -> Result<RequestBuilder> {
        self.request(Method::POST, url).await
    }
}

/// Turn a non-success response into [`GraphError::ApiError`] carrying the raw body.
pub(crate) async fn error_for_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    Err(GraphError::ApiError {
        status: status.as_u16(),
        message: error_body,
    })
}
