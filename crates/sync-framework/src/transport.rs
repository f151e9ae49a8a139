//! # Transport
//!
//! The seam between the controller and the network. A transport performs exactly one
//! attempt for a [`ResourceQuery`] and returns the envelope's `data` object; retries,
//! timeouts and cancellation are layered on top by the controller.
//!
//! [`HttpTransport`] speaks the dashboard API:
//!
//! ```text
//! GET {base}/{endpoint}?page=1&limit=20&order_by=created_at&order_direction=desc&status=active
//! Authorization: Bearer {access_token}
//!
//! { "success": true, "data": { "<endpoint>": [...], "stats": {...}, "pagination": {...} } }
//! ```

use crate::error::SyncError;
use crate::query::ResourceQuery;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Performs one read of a remote resource.
#[async_trait]
pub trait ResourceTransport: Send + Sync + 'static {
    /// Returns the envelope's `data` object on success.
    async fn fetch(&self, query: ResourceQuery) -> Result<Value, SyncError>;
}

#[async_trait]
impl<T: ResourceTransport + ?Sized> ResourceTransport for Arc<T> {
    async fn fetch(&self, query: ResourceQuery) -> Result<Value, SyncError> {
        (**self).fetch(query).await
    }
}

/// Source of the current session's access token.
pub trait SessionProvider: Send + Sync + 'static {
    /// `None` when nobody is signed in.
    fn access_token(&self) -> Option<String>;
}

/// A session fixed at construction time.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    token: Option<String>,
}

impl StaticSession {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self { token: None }
    }
}

impl SessionProvider for StaticSession {
    fn access_token(&self) -> Option<String> {
        self.token.clone()
    }
}

/// Response envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub error: Option<String>,
}

impl Envelope {
    /// Maps an HTTP status and body to the `data` object or an error.
    ///
    /// 401 means the session expired or was revoked and maps to
    /// [`SyncError::Unauthenticated`], which is never retried.
    pub fn into_result(status: u16, body: &[u8]) -> Result<Value, SyncError> {
        if status == 401 {
            return Err(SyncError::Unauthenticated);
        }
        let parsed: Result<Envelope, _> = serde_json::from_slice(body);
        if !(200..300).contains(&status) {
            let message = parsed
                .ok()
                .and_then(|e| e.error)
                .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned());
            return Err(SyncError::Http { status, message });
        }
        let envelope = parsed?;
        if !envelope.success {
            return Err(SyncError::Server(
                envelope
                    .error
                    .unwrap_or_else(|| "request failed".to_string()),
            ));
        }
        Ok(envelope.data)
    }
}

/// `reqwest`-backed transport for the dashboard API.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionProvider>,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, session: Arc<dyn SessionProvider>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, session)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            session,
        }
    }

    pub fn url_for(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl ResourceTransport for HttpTransport {
    #[instrument(skip(self, query), fields(endpoint = %query.endpoint, page = query.page))]
    async fn fetch(&self, query: ResourceQuery) -> Result<Value, SyncError> {
        let token = self.session.access_token().ok_or(SyncError::Unauthenticated)?;
        let url = self.url_for(&query.endpoint);
        debug!(%url, "Sending request");

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&query.to_query_pairs())
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;
        Envelope::into_result(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{SortDirection, SortOrder};
    use serde_json::json;

    #[test]
    fn test_envelope_success() {
        let body = json!({ "success": true, "data": { "news": [] } }).to_string();
        let data = Envelope::into_result(200, body.as_bytes()).unwrap();
        assert_eq!(data, json!({ "news": [] }));
    }

    #[test]
    fn test_envelope_reported_failure() {
        let body = json!({ "success": false, "error": "sector not found" }).to_string();
        let result = Envelope::into_result(200, body.as_bytes());
        assert_eq!(result, Err(SyncError::Server("sector not found".into())));
    }

    #[test]
    fn test_non_2xx_status() {
        let body = json!({ "success": false, "error": "forbidden" }).to_string();
        let result = Envelope::into_result(403, body.as_bytes());
        assert_eq!(
            result,
            Err(SyncError::Http {
                status: 403,
                message: "forbidden".into()
            })
        );

        let result = Envelope::into_result(502, b"Bad Gateway");
        assert!(matches!(result, Err(SyncError::Http { status: 502, ref message }) if message == "Bad Gateway"));
    }

    #[test]
    fn test_expired_session_is_unauthenticated() {
        let body = json!({ "success": false, "error": "jwt expired" }).to_string();
        let result = Envelope::into_result(401, body.as_bytes());
        assert_eq!(result, Err(SyncError::Unauthenticated));
        assert!(result.unwrap_err().is_fatal());
    }

    #[test]
    fn test_garbage_body_is_decode_error() {
        let result = Envelope::into_result(200, b"<html>");
        assert!(matches!(result, Err(SyncError::Decode(_))));
    }

    #[test]
    fn test_url_joining() {
        let transport = HttpTransport::new(
            "https://api.example.com/admin/",
            Arc::new(StaticSession::anonymous()),
        );
        assert_eq!(transport.url_for("/news"), "https://api.example.com/admin/news");
    }

    #[tokio::test]
    async fn test_missing_session_fails_before_network() {
        let transport = HttpTransport::new(
            "http://192.0.2.1",
            Arc::new(StaticSession::anonymous()),
        );
        let query = ResourceQuery::new(
            "news",
            1,
            20,
            SortOrder {
                order_by: "created_at".into(),
                direction: SortDirection::Desc,
            },
        );
        assert_eq!(transport.fetch(query).await, Err(SyncError::Unauthenticated));
    }
}
