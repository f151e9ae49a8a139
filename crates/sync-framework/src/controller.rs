//! # Synchronization Controller
//!
//! The composition root. A `SyncController` owns the state store, debounce gate,
//! concurrency guard and abort registry for one resource, and drives them from a single
//! event loop: commands from [`SyncHandle`]s, completions from fetch tasks, and the
//! debounce deadline. Because only this loop touches the state, no field needs a lock.
//!
//! ## Lifecycle of a fetch
//!
//! 1. A trigger arrives (`fetch`, a pagination/sort change, an immediate filter change,
//!    or the debounce deadline).
//! 2. The guard is checked. Under [`OverlapPolicy::Drop`] an in-flight fetch makes the
//!    trigger a no-op; under [`OverlapPolicy::Supersede`] the newcomer proceeds.
//! 3. The registry issues a request id and token, cancelling any previous token.
//! 4. A task runs the transport call under the retry executor and reports back.
//! 5. The outcome is applied only if its request id is still the latest.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use sync_framework::mock::MockTransport;
//! use sync_framework::{Filters, SyncConfig, SyncController, SyncResource};
//!
//! #[derive(Debug, Clone, serde::Deserialize)]
//! struct Widget { id: u32 }
//! struct Widgets;
//! impl SyncResource for Widgets {
//!     type Record = Widget;
//!     type Stats = serde::de::IgnoredAny;
//!     fn endpoint() -> &'static str { "widgets" }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = MockTransport::new();
//!     mock.expect_fetch().return_ok(json!({ "widgets": [{ "id": 1 }] }));
//!
//!     let (controller, handle) = SyncController::<Widgets>::new(SyncConfig::default(), Arc::new(mock));
//!     tokio::spawn(controller.run());
//!
//!     let state = handle.wait_for(|s| s.loaded).await.unwrap();
//!     assert_eq!(state.data.len(), 1);
//!     handle.dispose().await;
//! }
//! ```

use crate::config::{OverlapPolicy, SyncConfig};
use crate::debounce::{DebounceGate, Trigger};
use crate::diagnostics::{NoopDiagnostics, SyncDiagnostics, SyncEvent};
use crate::error::SyncError;
use crate::guard::ConcurrencyGuard;
use crate::handle::SyncHandle;
use crate::message::{FetchFinished, FilterMode, SyncCommand, SyncRequest};
use crate::query::{Filters, SortOrder};
use crate::registry::AbortRegistry;
use crate::resource::{ResourcePage, SyncResource};
use crate::retry::{RetryExecutor, RetryPolicy};
use crate::store::{ResourceState, ResourceStore};
use crate::transport::ResourceTransport;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

enum Event<R: SyncResource> {
    Request(SyncRequest),
    Finished(FetchFinished<R>),
    DebounceElapsed,
    Closed,
}

/// Event loop owning one resource's synchronization state.
pub struct SyncController<R: SyncResource> {
    receiver: mpsc::Receiver<SyncRequest>,
    completions: mpsc::UnboundedReceiver<FetchFinished<R>>,
    completion_sender: mpsc::UnboundedSender<FetchFinished<R>>,
    store: ResourceStore<R>,
    gate: DebounceGate,
    guard: ConcurrencyGuard,
    registry: AbortRegistry,
    executor: RetryExecutor,
    transport: Arc<dyn ResourceTransport>,
    diagnostics: Arc<dyn SyncDiagnostics>,
    config: SyncConfig,
}

impl<R: SyncResource> SyncController<R> {
    /// Creates a controller and the handle that drives it.
    ///
    /// The controller does nothing until [`run`](Self::run) is spawned.
    pub fn new(config: SyncConfig, transport: Arc<dyn ResourceTransport>) -> (Self, SyncHandle<R>) {
        let (sender, receiver) = mpsc::channel(config.channel_capacity.max(1));
        let (completion_sender, completions) = mpsc::unbounded_channel();
        let sort = SortOrder {
            order_by: config.order_by.clone(),
            direction: config.order_direction,
        };
        let store = ResourceStore::new(ResourceState::new(config.page_limit, sort));
        let handle = SyncHandle::new(sender, store.subscribe());

        let controller = Self {
            receiver,
            completions,
            completion_sender,
            store,
            gate: DebounceGate::new(config.debounce()),
            guard: ConcurrencyGuard::new(),
            registry: AbortRegistry::new(),
            executor: RetryExecutor::new(RetryPolicy::from_config(&config)),
            transport,
            diagnostics: Arc::new(NoopDiagnostics),
            config,
        };
        (controller, handle)
    }

    /// Starts with `filters` already applied, so the first fetch uses them.
    pub fn with_initial_filters(mut self, filters: Filters) -> Self {
        self.store.update_filters(filters);
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn SyncDiagnostics>) -> Self {
        self.executor = self.executor.with_diagnostics(diagnostics.clone());
        self.diagnostics = diagnostics;
        self
    }

    /// Runs the event loop until disposed or every handle is dropped.
    pub async fn run(mut self) {
        let endpoint = R::endpoint();
        info!(endpoint, "Controller started");

        if self.config.fetch_on_start {
            self.fetch(false);
        }

        loop {
            let event = tokio::select! {
                biased;
                Some(done) = self.completions.recv() => Event::Finished(done),
                msg = self.receiver.recv() => match msg {
                    Some(request) => Event::Request(request),
                    None => Event::Closed,
                },
                _ = self.gate.elapsed(), if self.gate.is_armed() => Event::DebounceElapsed,
            };

            match event {
                Event::Finished(done) => self.finish(done),
                Event::DebounceElapsed => {
                    debug!(endpoint, "Debounce elapsed");
                    self.gate.disarm();
                    self.fetch(false);
                }
                Event::Request(SyncRequest::Dispose { respond_to }) => {
                    self.teardown();
                    let _ = respond_to.send(());
                    break;
                }
                Event::Request(SyncRequest::Command {
                    command,
                    respond_to,
                }) => {
                    self.handle(command);
                    let _ = respond_to.send(());
                }
                Event::Closed => {
                    self.teardown();
                    break;
                }
            }
        }

        info!(endpoint, records = self.store.state().data.len(), "Controller stopped");
    }

    fn handle(&mut self, command: SyncCommand) {
        let endpoint = R::endpoint();
        match command {
            SyncCommand::UpdateFilters { partial, mode } => {
                debug!(endpoint, ?partial, ?mode, "UpdateFilters");
                let trigger = self.trigger_for(&partial, mode);
                self.store.update_filters(partial);
                match trigger {
                    Trigger::Debounced => self.gate.arm(),
                    Trigger::Immediate => self.fetch(false),
                }
            }
            SyncCommand::UpdatePagination(update) => {
                debug!(endpoint, ?update, "UpdatePagination");
                self.store.update_pagination(update);
                self.fetch(false);
            }
            SyncCommand::UpdateSort(sort) => {
                debug!(endpoint, ?sort, "UpdateSort");
                self.store.update_sort(sort);
                self.fetch(false);
            }
            SyncCommand::Fetch { force_loading } => self.fetch(force_loading),
        }
    }

    fn trigger_for(&self, partial: &Filters, mode: FilterMode) -> Trigger {
        let all_immediate =
            !partial.is_empty() && partial.keys().all(|key| self.config.is_immediate_filter(key));
        if mode == FilterMode::Immediate || all_immediate {
            Trigger::Immediate
        } else {
            Trigger::Debounced
        }
    }

    fn fetch(&mut self, force_loading: bool) {
        let endpoint = R::endpoint();

        if !self.guard.try_engage() {
            match self.config.overlap {
                OverlapPolicy::Drop => {
                    debug!(endpoint, "Fetch already in flight, dropping trigger");
                    self.diagnostics.record(SyncEvent::FetchDropped {
                        endpoint: endpoint.to_string(),
                    });
                    return;
                }
                OverlapPolicy::Supersede => {
                    let superseded = self.store.latest_request().unwrap_or_default();
                    debug!(endpoint, request_id = superseded, "Superseding in-flight fetch");
                    self.diagnostics.record(SyncEvent::FetchSuperseded {
                        endpoint: endpoint.to_string(),
                        request_id: superseded,
                    });
                }
            }
        }

        let request = self.registry.issue(endpoint);
        let request_id = request.request_id();
        let query = self.store.query();
        self.store.begin_request(request_id, force_loading);
        self.diagnostics.record(SyncEvent::FetchStarted {
            endpoint: endpoint.to_string(),
            request_id,
        });
        info!(endpoint, request_id, page = query.page, limit = query.limit, "Fetching");

        let transport = self.transport.clone();
        let executor = self.executor.clone();
        let completions = self.completion_sender.clone();
        tokio::spawn(async move {
            let token = request.token().clone();
            let outcome = executor
                .execute(&token, |_| {
                    let transport = transport.clone();
                    let query = query.clone();
                    async move { transport.fetch(query).await }
                })
                .await
                .and_then(ResourcePage::<R>::decode);
            // the controller may already be gone
            let _ = completions.send(FetchFinished {
                request_id,
                outcome,
            });
        });
    }

    fn finish(&mut self, done: FetchFinished<R>) {
        let endpoint = R::endpoint();
        let FetchFinished {
            request_id,
            outcome,
        } = done;
        self.registry.complete(endpoint, request_id);

        if !self.store.is_latest(request_id) {
            debug!(endpoint, request_id, "Discarding superseded outcome");
            self.diagnostics.record(SyncEvent::StaleDiscarded {
                endpoint: endpoint.to_string(),
                request_id,
            });
            return;
        }
        self.guard.release();

        match outcome {
            Ok(page) => {
                let records = page.records.len();
                self.store.apply_result(request_id, page);
                info!(endpoint, request_id, records, "Applied");
                self.diagnostics.record(SyncEvent::Applied {
                    endpoint: endpoint.to_string(),
                    request_id,
                });
            }
            Err(SyncError::Cancelled) => {
                debug!(endpoint, request_id, "Fetch cancelled");
            }
            Err(error) => {
                warn!(endpoint, request_id, error = %error, "Fetch failed");
                self.store.apply_error(request_id, error.to_string());
                self.diagnostics.record(SyncEvent::Failed {
                    endpoint: endpoint.to_string(),
                    request_id,
                });
            }
        }
    }

    fn teardown(&mut self) {
        debug!(endpoint = R::endpoint(), "Tearing down");
        self.gate.disarm();
        self.registry.cancel_all();
        self.guard.release();
    }
}
