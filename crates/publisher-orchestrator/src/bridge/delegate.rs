//! Delegate Serving
//!
//! The worker side of the bridge. A `Delegate` turns each request into a
//! response (or into silence); `serve` pumps the endpoint and answers every
//! request on its own task so a slow operation never holds up the stream.

use super::{BridgeEndpoint, BridgeResponder};
use async_trait::async_trait;
use publisher_types::{BridgeRequest, BridgeResponse};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Executor for delegated operations
#[async_trait]
pub trait Delegate: Send + Sync + 'static {
    /// Handle one request; `None` means the delegate never replies
    async fn handle(&self, request: BridgeRequest) -> Option<BridgeResponse>;
}

/// Serve requests from `endpoint` until the orchestrator side is dropped
pub fn serve<D: Delegate>(endpoint: BridgeEndpoint, delegate: Arc<D>) -> JoinHandle<()> {
    let (mut requests, responder) = endpoint.into_parts();
    tokio::spawn(async move {
        while let Some(request) = requests.recv().await {
            debug!(
                "[Delegate] Received {} ({})",
                request.message_type, request.correlation_id
            );
            let delegate = delegate.clone();
            let responder: BridgeResponder = responder.clone();
            tokio::spawn(async move {
                let message_type = request.message_type.clone();
                if let Some(response) = delegate.handle(request).await {
                    if !responder.deliver(response).await {
                        debug!("[Delegate] Response to {} was not awaited", message_type);
                    }
                }
            });
        }
        info!("[Delegate] Bridge closed, delegate stopped");
    })
}
