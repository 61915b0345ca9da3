use std::{borrow::Cow, sync::Arc, time::Duration};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use dashmap::DashMap;
use log::{debug, trace};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::{select, spawn, task::JoinHandle, time::sleep};

use tessera_common::{
    api::{
        BroadcastTxParams, CommitResult, CommitStage, CommitStageResult, NonceParams, QueryParams,
        ResolveParams, VmKind,
    },
    Address, Serializer,
};

use crate::{
    config::{
        DEFAULT_COMMIT_TIMEOUT_MILLIS, DEFAULT_NONCE_RETRY_LIMIT, NONCE_MISMATCH_CODE,
        NONCE_MISMATCH_LOG, NONCE_RETRY_DELAY_MILLIS,
    },
    connection::ensure_connected,
    error::ClientError,
    middleware::MiddlewareChain,
    transport::{RawEventListener, Transport},
};

/// Client for a remote ledger node: submits signed transactions, queries
/// contract state and relays chain-emitted events to local subscribers.
///
/// Submission and queries/subscriptions may go through two distinct
/// transports; either may be left unconfigured, in which case the calls
/// needing it fail with [`ClientError::NotConfigured`].
pub struct LedgerClient {
    pub(crate) chain_id: String,
    pub(crate) write_transport: Option<Arc<dyn Transport>>,
    pub(crate) read_transport: Option<Arc<dyn Transport>>,
    pub(crate) middleware: MiddlewareChain,
    pub(crate) auto_reconnect: bool,
    pub(crate) nonce_retry_limit: u32,
    pub(crate) nonce_retry_delay: Duration,
    // handler identity -> wrapper registered with the transport
    pub(crate) subscriptions: DashMap<usize, RawEventListener>,
}

pub struct ClientBuilder {
    chain_id: String,
    write_transport: Option<Arc<dyn Transport>>,
    read_transport: Option<Arc<dyn Transport>>,
    middleware: MiddlewareChain,
    auto_reconnect: bool,
    nonce_retry_limit: u32,
    nonce_retry_delay: Duration,
}

impl ClientBuilder {
    pub fn write_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.write_transport = Some(transport);
        self
    }

    pub fn read_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.read_transport = Some(transport);
        self
    }

    pub fn middleware(mut self, middleware: MiddlewareChain) -> Self {
        self.middleware = middleware;
        self
    }

    pub fn auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    /// Retries after a nonce conflict before giving up. `0` disables
    /// retries entirely.
    pub fn nonce_retry_limit(mut self, limit: u32) -> Self {
        self.nonce_retry_limit = limit;
        self
    }

    /// Fixed delay between nonce-conflict retries
    pub fn nonce_retry_delay(mut self, delay: Duration) -> Self {
        self.nonce_retry_delay = delay;
        self
    }

    pub fn build(self) -> LedgerClient {
        LedgerClient {
            chain_id: self.chain_id,
            write_transport: self.write_transport,
            read_transport: self.read_transport,
            middleware: self.middleware,
            auto_reconnect: self.auto_reconnect,
            nonce_retry_limit: self.nonce_retry_limit,
            nonce_retry_delay: self.nonce_retry_delay,
            subscriptions: DashMap::new(),
        }
    }
}

impl LedgerClient {
    pub fn builder<S: Into<String>>(chain_id: S) -> ClientBuilder {
        ClientBuilder {
            chain_id: chain_id.into(),
            write_transport: None,
            read_transport: None,
            middleware: MiddlewareChain::default(),
            auto_reconnect: true,
            nonce_retry_limit: DEFAULT_NONCE_RETRY_LIMIT,
            nonce_retry_delay: Duration::from_millis(NONCE_RETRY_DELAY_MILLIS),
        }
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub(crate) fn read_transport(&self) -> Result<&Arc<dyn Transport>, ClientError> {
        self.read_transport
            .as_ref()
            .ok_or(ClientError::NotConfigured("read"))
    }

    fn write_transport(&self) -> Result<&Arc<dyn Transport>, ClientError> {
        self.write_transport
            .as_ref()
            .ok_or(ClientError::NotConfigured("write"))
    }

    async fn request<P: Serialize>(
        &self,
        transport: &dyn Transport,
        method: &str,
        params: &P,
    ) -> Result<Value, ClientError> {
        let params = serde_json::to_value(params)?;
        Ok(transport.send(method, params).await?)
    }

    /// Current nonce of the account identified by the given hex-encoded key
    pub async fn get_nonce(&self, key: &str) -> Result<u64, ClientError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("get_nonce");
        }
        let transport = self.read_transport()?;
        ensure_connected(transport.as_ref(), self.auto_reconnect).await?;

        let value = self
            .request(
                transport.as_ref(),
                "nonce",
                &NonceParams {
                    key: Cow::Borrowed(key),
                },
            )
            .await?;
        // the node reports the nonce as decimal text
        let text: String = serde_json::from_value(value)?;
        Ok(text.trim().parse()?)
    }

    /// Resolve a registered contract name to an address. Fails with
    /// [`ClientError::NotFound`] when the node knows no such name.
    pub async fn resolve_contract_address(&self, name: &str) -> Result<Address, ClientError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("resolve_contract_address: {}", name);
        }
        let transport = self.read_transport()?;
        ensure_connected(transport.as_ref(), self.auto_reconnect).await?;

        let value = self
            .request(
                transport.as_ref(),
                "resolve",
                &ResolveParams {
                    name: Cow::Borrowed(name),
                },
            )
            .await?;
        let text: String = serde_json::from_value(value)?;
        if text.is_empty() {
            return Err(ClientError::NotFound(name.to_owned()));
        }

        Ok(Address::parse(&text, &self.chain_id))
    }

    /// Read-only state query against a contract.
    ///
    /// The caller address is forwarded only when it is fully qualified; a
    /// half-populated address is omitted entirely, never sent as-is. Queries
    /// are not retried: they are assumed idempotent and cheap to re-issue.
    pub async fn query<T: DeserializeOwned>(
        &self,
        contract: &Address,
        payload: &[u8],
        caller: Option<&Address>,
        vm: VmKind,
    ) -> Result<T, ClientError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("query on {}", contract);
        }
        let transport = self.read_transport()?;
        ensure_connected(transport.as_ref(), self.auto_reconnect).await?;

        let caller = caller
            .filter(|caller| caller.is_fully_qualified())
            .map(|caller| Cow::Owned(caller.fully_qualified()));
        let params = QueryParams {
            contract: Cow::Owned(contract.to_string()),
            query: Cow::Borrowed(payload),
            caller,
            vm,
        };

        let value = self.request(transport.as_ref(), "query", &params).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Submit a transaction with the default per-attempt timeout
    pub async fn commit<T: Serializer>(&self, tx: &T) -> Result<CommitResult, ClientError> {
        self.commit_with(tx, Duration::from_millis(DEFAULT_COMMIT_TIMEOUT_MILLIS))
            .await
    }

    /// Submit a transaction and wait until both remote commit stages report.
    ///
    /// Each attempt serializes the transaction, runs the middleware chain
    /// over the bytes and broadcasts the base64-encoded payload, racing the
    /// whole attempt against `timeout`. A nonce conflict reported by the
    /// pre-check stage is retried up to the configured limit with a fixed
    /// backoff; every other non-zero stage code fails immediately. A timed
    /// out attempt is abandoned, not retried.
    pub async fn commit_with<T: Serializer>(
        &self,
        tx: &T,
        timeout: Duration,
    ) -> Result<CommitResult, ClientError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("commit with timeout {:?}", timeout);
        }
        let transport = self.write_transport()?.clone();
        let raw = tx.to_bytes();

        let mut bad_nonce: u32 = 0;
        loop {
            let attempt = self.spawn_attempt(transport.clone(), raw.clone());
            let outcome = select! {
                res = attempt => res?,
                _ = sleep(timeout) => {
                    // Abandon the in-flight attempt: dropping the handle
                    // detaches the task, its eventual result is discarded
                    debug!("commit attempt timed out after {:?}", timeout);
                    return Err(ClientError::Timeout(timeout));
                }
            };

            let result = outcome?;
            match result.failed_stage() {
                None => return Ok(result),
                Some((CommitStage::CheckTx, stage)) if is_nonce_mismatch(stage) => {
                    if bad_nonce >= self.nonce_retry_limit {
                        // Synthesized terminal failure, not the last
                        // attempt's own error detail
                        return Err(ClientError::InvalidNonce);
                    }
                    bad_nonce += 1;
                    if log::log_enabled!(log::Level::Debug) {
                        debug!(
                            "nonce conflict, retrying {}/{}",
                            bad_nonce, self.nonce_retry_limit
                        );
                    }
                    sleep(self.nonce_retry_delay).await;
                }
                Some((stage, stage_result)) => {
                    return Err(ClientError::TxCommitFailed {
                        stage,
                        code: stage_result.code,
                        error: stage_result.log.clone(),
                    });
                }
            }
        }
    }

    // One commit attempt as an independent task, so a timed out attempt can
    // be detached without being able to touch the retry loop's state
    fn spawn_attempt(
        &self,
        transport: Arc<dyn Transport>,
        raw: Vec<u8>,
    ) -> JoinHandle<Result<CommitResult, ClientError>> {
        let middleware = self.middleware.clone();
        let auto_reconnect = self.auto_reconnect;
        spawn(async move {
            ensure_connected(transport.as_ref(), auto_reconnect).await?;
            let payload = middleware.run(raw).await.map_err(ClientError::Middleware)?;
            let encoded = BASE64.encode(&payload);
            let params = serde_json::to_value(&BroadcastTxParams::new(encoded))?;
            let value = transport.send("broadcast_tx_commit", params).await?;
            Ok(serde_json::from_value(value)?)
        })
    }
}

// A nonce conflict is identified by code AND log text: the code alone is
// shared with other admission failures
fn is_nonce_mismatch(stage: &CommitStageResult) -> bool {
    stage.code == NONCE_MISMATCH_CODE && stage.log.contains(NONCE_MISMATCH_LOG)
}
