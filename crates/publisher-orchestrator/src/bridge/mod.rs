//! Bridge Channel
//!
//! Correlated request/response link between the orchestrator and the
//! delegate that performs real network operations. Each call registers a
//! completion handle under a fresh correlation id, emits the request, and
//! waits for either the matching response or the timeout. Whichever removes
//! the registry entry first wins; a response arriving afterwards finds no
//! entry and is dropped.

use crate::error::{OrchestratorError, Result};
use publisher_types::{BridgeRequest, BridgeRequestKind, BridgeResponse};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

pub mod delegate;

pub use delegate::{serve, Delegate};

type PendingRegistry = Arc<Mutex<HashMap<Uuid, PendingRequest>>>;

/// An outstanding call awaiting its response
#[derive(Debug)]
struct PendingRequest {
    kind: BridgeRequestKind,
    issued_at: Instant,
    completion: oneshot::Sender<BridgeResponse>,
}

/// Orchestrator side of the bridge
#[derive(Debug, Clone)]
pub struct BridgeChannel {
    outbound: mpsc::UnboundedSender<BridgeRequest>,
    pending: PendingRegistry,
}

/// Delegate side of the bridge: the request stream plus a responder
#[derive(Debug)]
pub struct BridgeEndpoint {
    requests: mpsc::UnboundedReceiver<BridgeRequest>,
    responder: BridgeResponder,
}

/// Delivers delegate responses into the correlation registry
#[derive(Debug, Clone)]
pub struct BridgeResponder {
    pending: PendingRegistry,
}

impl BridgeChannel {
    /// Create a connected channel/endpoint pair
    pub fn new() -> (Self, BridgeEndpoint) {
        let (outbound, requests) = mpsc::unbounded_channel();
        let pending: PendingRegistry = Arc::new(Mutex::new(HashMap::new()));
        let channel = Self {
            outbound,
            pending: pending.clone(),
        };
        let endpoint = BridgeEndpoint {
            requests,
            responder: BridgeResponder { pending },
        };
        (channel, endpoint)
    }

    /// Issue one request and wait for exactly one outcome
    ///
    /// Returns the delegate's `result` payload on success, `DelegateFailure`
    /// when the delegate reports `success: false`, and `Timeout` when no
    /// response arrives within `timeout`.
    #[instrument(skip(self, data), fields(request_type = %kind))]
    pub async fn call(
        &self,
        kind: BridgeRequestKind,
        data: serde_json::Value,
        timeout: Duration,
    ) -> Result<serde_json::Value> {
        let request = BridgeRequest::new(kind, data);
        let correlation_id = request.correlation_id;
        let (completion, mut receiver) = oneshot::channel();

        self.pending.lock().await.insert(
            correlation_id,
            PendingRequest {
                kind,
                issued_at: Instant::now(),
                completion,
            },
        );
        let _registration = Registration {
            pending: self.pending.clone(),
            correlation_id,
        };

        if self.outbound.send(request).is_err() {
            warn!("[BridgeChannel] Delegate endpoint dropped, cannot send {}", kind);
            return Err(OrchestratorError::ChannelClosed(kind));
        }
        debug!(
            "[BridgeChannel] Sent {} ({}), waiting up to {}ms",
            kind,
            correlation_id,
            timeout.as_millis()
        );

        let response = match tokio::time::timeout(timeout, &mut receiver).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => return Err(OrchestratorError::ChannelClosed(kind)),
            Err(_) => {
                let detached = self.pending.lock().await.remove(&correlation_id);
                if detached.is_some() {
                    warn!(
                        "[BridgeChannel] {} ({}) timed out after {}ms",
                        kind,
                        correlation_id,
                        timeout.as_millis()
                    );
                    return Err(OrchestratorError::Timeout {
                        kind,
                        timeout_ms: timeout.as_millis() as u64,
                    });
                }
                // The responder removed the entry first, so its response is already in flight.
                match receiver.try_recv() {
                    Ok(response) => response,
                    Err(_) => {
                        return Err(OrchestratorError::Timeout {
                            kind,
                            timeout_ms: timeout.as_millis() as u64,
                        })
                    }
                }
            }
        };

        into_result(kind, response)
    }

    /// Number of calls currently awaiting a response
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}

/// Removes the registry entry when a call ends, including when its future
/// is dropped mid-wait
struct Registration {
    pending: PendingRegistry,
    correlation_id: Uuid,
}

impl Drop for Registration {
    fn drop(&mut self) {
        let correlation_id = self.correlation_id;
        if let Ok(mut pending) = self.pending.try_lock() {
            pending.remove(&correlation_id);
        } else if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let pending = self.pending.clone();
            runtime.spawn(async move {
                pending.lock().await.remove(&correlation_id);
            });
        }
    }
}

fn into_result(kind: BridgeRequestKind, response: BridgeResponse) -> Result<serde_json::Value> {
    if response.success {
        Ok(response.result.unwrap_or(serde_json::Value::Null))
    } else {
        let message = response
            .error
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| format!("{} failed", kind.operation()));
        Err(OrchestratorError::DelegateFailure { kind, message })
    }
}

impl BridgeEndpoint {
    /// Next outbound request, or `None` once the orchestrator side is dropped
    pub async fn next_request(&mut self) -> Option<BridgeRequest> {
        self.requests.recv().await
    }

    pub fn responder(&self) -> BridgeResponder {
        self.responder.clone()
    }

    pub fn into_parts(self) -> (mpsc::UnboundedReceiver<BridgeRequest>, BridgeResponder) {
        (self.requests, self.responder)
    }
}

impl BridgeResponder {
    /// Deliver a response; returns `false` when nothing was waiting for it
    ///
    /// A response is only accepted when its correlation id is registered and
    /// its message type is the one paired with the pending request.
    pub async fn deliver(&self, response: BridgeResponse) -> bool {
        let mut pending = self.pending.lock().await;
        let expected = match pending.get(&response.correlation_id) {
            Some(entry) => entry.kind.response_type(),
            None => {
                debug!(
                    "[BridgeResponder] Dropping {} for {}: no pending request",
                    response.message_type, response.correlation_id
                );
                return false;
            }
        };
        if response.message_type != expected {
            warn!(
                "[BridgeResponder] Ignoring {} for {}: expected {}",
                response.message_type, response.correlation_id, expected
            );
            return false;
        }

        let Some(entry) = pending.remove(&response.correlation_id) else {
            return false;
        };
        debug!(
            "[BridgeResponder] {} answered after {}ms",
            entry.kind,
            entry.issued_at.elapsed().as_millis()
        );
        // Completed under the registry lock so a caller that finds its entry
        // gone can always collect the response.
        entry.completion.send(response).is_ok()
    }
}
