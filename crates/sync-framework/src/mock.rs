//! # Mock Transports & Testing Guide
//!
//! Controllers talk to the network only through [`ResourceTransport`], so tests swap in
//! one of two in-memory transports.
//!
//! | | `MockTransport` | `create_mock_transport` |
//! |---|---|---|
//! | **Style** | Fluent expectations, answered immediately (or after a delay) | Test receives every request and answers it by hand |
//! | **Good for** | Retry behavior, error surfacing, happy paths | Interleavings: out-of-order responses, in-flight overlap, teardown |
//! | **Verification** | `verify()` and `requests()` | Whatever arrives on the receiver |
//!
//! ## Pattern 1: Expectations
//!
//! ```rust
//! use serde_json::json;
//! use sync_framework::mock::MockTransport;
//! use sync_framework::{ResourceQuery, ResourceTransport, SortDirection, SortOrder, SyncError};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = MockTransport::new();
//!     mock.expect_fetch().return_err(SyncError::Network("reset".into()));
//!     mock.expect_fetch().return_ok(json!({ "widgets": [] }));
//!
//!     let sort = SortOrder { order_by: "name".into(), direction: SortDirection::Asc };
//!     let query = ResourceQuery::new("widgets", 1, 20, sort);
//!     assert!(mock.fetch(query.clone()).await.is_err());
//!     assert!(mock.fetch(query).await.is_ok());
//!     mock.verify();
//! }
//! ```
//!
//! ## Pattern 2: Manual responses
//!
//! ```rust
//! use serde_json::json;
//! use sync_framework::mock::{create_mock_transport, expect_fetch};
//! use sync_framework::{ResourceQuery, ResourceTransport, SortDirection, SortOrder};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (transport, mut receiver) = create_mock_transport(8);
//!     let sort = SortOrder { order_by: "name".into(), direction: SortDirection::Asc };
//!     let call = tokio::spawn(async move {
//!         transport.fetch(ResourceQuery::new("widgets", 1, 20, sort)).await
//!     });
//!
//!     let pending = expect_fetch(&mut receiver).await.expect("Expected a fetch");
//!     assert_eq!(pending.query.endpoint, "widgets");
//!     pending.respond(Ok(json!({ "widgets": [] })));
//!
//!     assert!(call.await.unwrap().is_ok());
//! }
//! ```

use crate::error::SyncError;
use crate::query::ResourceQuery;
use crate::transport::ResourceTransport;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

struct Expectation {
    endpoint: Option<String>,
    delay: Option<Duration>,
    response: Result<Value, SyncError>,
}

#[derive(Default)]
struct MockState {
    expectations: VecDeque<Expectation>,
    requests: Vec<ResourceQuery>,
    unexpected: Vec<String>,
}

/// In-memory transport answering from a queue of expectations.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Creates a new mock transport with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an expected fetch.
    pub fn expect_fetch(&self) -> FetchExpectationBuilder {
        FetchExpectationBuilder {
            state: self.state.clone(),
            endpoint: None,
            delay: None,
        }
    }

    /// Every query received so far, in arrival order.
    pub fn requests(&self) -> Vec<ResourceQuery> {
        self.state.lock().requests.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().requests.len()
    }

    /// Verifies that all expectations were met and nothing unexpected arrived.
    pub fn verify(&self) {
        let state = self.state.lock();
        if !state.unexpected.is_empty() {
            panic!("Unexpected requests: {:?}", state.unexpected);
        }
        if !state.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                state.expectations.len()
            );
        }
    }
}

#[async_trait]
impl ResourceTransport for MockTransport {
    async fn fetch(&self, query: ResourceQuery) -> Result<Value, SyncError> {
        let expectation = {
            let mut state = self.state.lock();
            state.requests.push(query.clone());
            state.expectations.pop_front()
        };

        let Some(expectation) = expectation else {
            self.state
                .lock()
                .unexpected
                .push(format!("no expectation left for {}", query.endpoint));
            return Err(SyncError::Server("unexpected request".into()));
        };

        if let Some(endpoint) = &expectation.endpoint {
            if *endpoint != query.endpoint {
                self.state.lock().unexpected.push(format!(
                    "expected endpoint {endpoint}, got {}",
                    query.endpoint
                ));
            }
        }
        if let Some(delay) = expectation.delay {
            tokio::time::sleep(delay).await;
        }
        expectation.response
    }
}

/// Builder for fetch expectations.
pub struct FetchExpectationBuilder {
    state: Arc<Mutex<MockState>>,
    endpoint: Option<String>,
    delay: Option<Duration>,
}

impl FetchExpectationBuilder {
    /// Fails verification if the fetch targets another endpoint.
    pub fn for_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Holds the response back for `delay`.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sets the expectation to return the given `data` object.
    pub fn return_ok(self, data: Value) {
        self.push(Ok(data));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: SyncError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<Value, SyncError>) {
        self.state.lock().expectations.push_back(Expectation {
            endpoint: self.endpoint,
            delay: self.delay,
            response,
        });
    }
}

// =============================================================================
// CHANNEL TRANSPORT
// =============================================================================

/// A fetch waiting for the test to answer it.
#[derive(Debug)]
pub struct PendingFetch {
    pub query: ResourceQuery,
    respond_to: oneshot::Sender<Result<Value, SyncError>>,
}

impl PendingFetch {
    /// Answers the fetch. Ignored if the caller has already given up on it.
    pub fn respond(self, response: Result<Value, SyncError>) {
        let _ = self.respond_to.send(response);
    }

    /// True once the caller stopped waiting (cancelled or timed out).
    pub fn is_abandoned(&self) -> bool {
        self.respond_to.is_closed()
    }
}

/// Transport that forwards every request to a test-held receiver.
#[derive(Clone)]
pub struct ChannelTransport {
    sender: mpsc::Sender<PendingFetch>,
}

#[async_trait]
impl ResourceTransport for ChannelTransport {
    async fn fetch(&self, query: ResourceQuery) -> Result<Value, SyncError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(PendingFetch { query, respond_to })
            .await
            .map_err(|_| SyncError::Network("mock receiver dropped".into()))?;
        response
            .await
            .map_err(|_| SyncError::Network("mock responder dropped".into()))?
    }
}

/// Creates a channel-backed transport and the receiver the test answers from.
///
/// # Testing Strategy
/// Each fetch shows up on the receiver as a [`PendingFetch`]. The test decides when and
/// in which order to answer, which makes overlapping and out-of-order responses
/// deterministic.
pub fn create_mock_transport(buffer_size: usize) -> (ChannelTransport, mpsc::Receiver<PendingFetch>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ChannelTransport { sender }, receiver)
}

/// Helper to take the next fetch off the receiver.
pub async fn expect_fetch(receiver: &mut mpsc::Receiver<PendingFetch>) -> Option<PendingFetch> {
    receiver.recv().await
}
