use std::num::ParseIntError;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinError;

use tessera_common::api::CommitStage;

use crate::transport::TransportError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no {} transport is configured", _0)]
    NotConfigured(&'static str),
    #[error("transaction nonce is invalid")]
    InvalidNonce,
    #[error("transaction rejected at {} with code {}: {}", stage, code, error)]
    TxCommitFailed {
        stage: CommitStage,
        code: u32,
        error: String,
    },
    #[error("commit attempt timed out after {:?}", _0)]
    Timeout(Duration),
    #[error("no contract is registered under name '{}'", _0)]
    NotFound(String),
    #[error("handler is not subscribed to chain events")]
    NotSubscribed,
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("invalid response payload: {}", _0)]
    InvalidResponse(#[from] serde_json::Error),
    #[error("invalid numeric response: {}", _0)]
    InvalidNumber(#[from] ParseIntError),
    // Pre-submission fault from a middleware stage, distinct from the
    // commit protocol's own error taxonomy
    #[error("middleware stage failed: {:#}", _0)]
    Middleware(anyhow::Error),
    #[error("commit attempt aborted: {}", _0)]
    Aborted(#[from] JoinError),
}
