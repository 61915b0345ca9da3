use std::sync::Arc;

use log::{error, trace, warn};

use tessera_common::api::{ChainEvent, RawChainEvent};

use crate::{
    client::LedgerClient, connection::ensure_connected, error::ClientError,
    transport::RawEventListener,
};

/// Caller-supplied handler for chain-emitted events
pub type ChainEventHandler = Arc<dyn Fn(&ChainEvent) + Send + Sync>;

// Handlers are identified by their allocation, so clones of the same Arc
// refer to the same subscription entry
fn handler_key(handler: &ChainEventHandler) -> usize {
    Arc::as_ptr(handler) as *const () as usize
}

impl LedgerClient {
    /// Subscribe a handler to chain-emitted events.
    ///
    /// Fire-and-forget: this entry point has no result channel, so failures
    /// (missing read transport, connect or subscribe errors) are logged
    /// instead of raised. Subscribing the same handler twice without
    /// unsubscribing in between is a caller error; the previous entry is
    /// silently overwritten.
    pub async fn subscribe_chain_events(&self, handler: ChainEventHandler) {
        if let Err(e) = self.try_subscribe(handler).await {
            if log::log_enabled!(log::Level::Error) {
                error!("failed to subscribe chain event handler: {}", e);
            }
        }
    }

    /// Remove a previously subscribed handler.
    ///
    /// Fire-and-forget like [`subscribe_chain_events`]: unsubscribing a
    /// handler that was never subscribed is logged, never raised.
    ///
    /// [`subscribe_chain_events`]: LedgerClient::subscribe_chain_events
    pub async fn unsubscribe_chain_events(&self, handler: &ChainEventHandler) {
        if let Err(e) = self.try_unsubscribe(handler).await {
            if log::log_enabled!(log::Level::Error) {
                error!("failed to unsubscribe chain event handler: {}", e);
            }
        }
    }

    async fn try_subscribe(&self, handler: ChainEventHandler) -> Result<(), ClientError> {
        trace!("subscribe_chain_events");
        let transport = self.read_transport()?.clone();
        ensure_connected(transport.as_ref(), self.auto_reconnect).await?;

        let key = handler_key(&handler);
        let wrapper: RawEventListener = Arc::new(move |raw: RawChainEvent<'static>| {
            match raw.into_event() {
                Ok(event) => handler(&event),
                // never dispatch a half-translated event
                Err(e) => warn!("dropping malformed chain event: {}", e),
            }
        });

        // Recorded before registration so the entry is visible as soon as
        // the transport may deliver events through the wrapper
        self.subscriptions.insert(key, wrapper.clone());
        if let Err(e) = transport.subscribe(wrapper).await {
            self.subscriptions.remove(&key);
            return Err(e.into());
        }

        Ok(())
    }

    async fn try_unsubscribe(&self, handler: &ChainEventHandler) -> Result<(), ClientError> {
        trace!("unsubscribe_chain_events");
        let (_, wrapper) = self
            .subscriptions
            .remove(&handler_key(handler))
            .ok_or(ClientError::NotSubscribed)?;

        let transport = self.read_transport()?.clone();
        // The transport compares listener identity: hand back the exact
        // wrapper registered at subscribe time
        transport.unsubscribe(&wrapper).await?;
        Ok(())
    }

    /// Number of live subscription entries
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}
