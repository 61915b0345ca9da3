mod event;

use std::borrow::Cow;

use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};
use strum::Display;

pub use event::*;

/// Which execution engine on the remote node should interpret a contract
/// query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VmKind {
    Wasm,
    Evm,
}

// Serialize raw query bytes as a hexadecimal string
pub fn serialize_bytes<S: Serializer>(bytes: &Cow<'_, [u8]>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&hex::encode(bytes.as_ref()))
}

// Deserialize raw query bytes from a hexadecimal string
pub fn deserialize_bytes<'de, 'a, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Cow<'a, [u8]>, D::Error> {
    let hex = String::deserialize(deserializer)?;
    let decoded = hex::decode(hex).map_err(Error::custom)?;
    Ok(Cow::Owned(decoded))
}

#[derive(Serialize, Deserialize)]
pub struct NonceParams<'a> {
    pub key: Cow<'a, str>, // hex-encoded account key
}

#[derive(Serialize, Deserialize)]
pub struct ResolveParams<'a> {
    pub name: Cow<'a, str>,
}

#[derive(Serialize, Deserialize)]
pub struct QueryParams<'a> {
    pub contract: Cow<'a, str>,
    #[serde(serialize_with = "serialize_bytes")]
    #[serde(deserialize_with = "deserialize_bytes")]
    pub query: Cow<'a, [u8]>,
    // Fully qualified caller, never a half-populated address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller: Option<Cow<'a, str>>,
    pub vm: VmKind,
}

/// Params of `broadcast_tx_commit`: a single-element array holding the
/// base64-encoded signed transaction.
#[derive(Serialize, Deserialize)]
pub struct BroadcastTxParams<'a>(pub (Cow<'a, str>,));

impl<'a> BroadcastTxParams<'a> {
    pub fn new<T: Into<Cow<'a, str>>>(data: T) -> Self {
        Self((data.into(),))
    }

    pub fn data(&self) -> &str {
        &self.0 .0
    }
}

/// Labels of the two remote commit stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CommitStage {
    CheckTx,
    DeliverTx,
}

/// Outcome of one commit stage. Code `0` means success; on failure the log
/// is advisory context and may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStageResult {
    pub code: u32,
    #[serde(default)]
    pub log: String,
}

impl CommitStageResult {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// Dual-stage result of `broadcast_tx_commit`: the fast admission check and
/// the actual application to chain state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResult {
    pub check_tx: CommitStageResult,
    pub deliver_tx: CommitStageResult,
}

impl CommitResult {
    pub fn is_success(&self) -> bool {
        self.check_tx.is_success() && self.deliver_tx.is_success()
    }

    /// First failed stage, check stage taking precedence
    pub fn failed_stage(&self) -> Option<(CommitStage, &CommitStageResult)> {
        if !self.check_tx.is_success() {
            Some((CommitStage::CheckTx, &self.check_tx))
        } else if !self.deliver_tx.is_success() {
            Some((CommitStage::DeliverTx, &self.deliver_tx))
        } else {
            None
        }
    }
}
