//! # Domain Value Objects
//!
//! Immutable value types: the chain identity tag, the transport's
//! backpressure signal, and the proof-response wire payload.

use serde::{Deserialize, Serialize};

/// Opaque identity of the chain fork the transport is currently following.
///
/// The verifier never interprets this value; it only compares it between
/// ticks to detect a reorganization and hands it back to the wallet store
/// when unwinding.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChainId(pub u64);

/// Outcome of handing a proof request to the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestStatus {
    /// The request was queued; a `ProofResponse` will arrive later.
    Accepted,
    /// The transport cannot accept another outstanding request this cycle.
    Busy,
}

/// Merkle branch portion of a proof response.
///
/// Hashes travel as hex strings in display byte order, exactly as the peer
/// protocol encodes them.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MerkleBranch {
    /// Height of the block the transaction is claimed to be in.
    pub block_height: u64,
    /// Leaf position of the transaction within the block. Signed because the
    /// wire format does not forbid negative values; validation rejects them.
    pub pos: i64,
    /// Sibling hashes, leaf-to-root order.
    pub merkle: Vec<String>,
}

/// A completed proof request, delivered by the transport.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProofResponse {
    /// Peer-reported error, if the request failed remotely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Echo of the request parameters; the first entry is the transaction
    /// hash the proof was requested for.
    #[serde(default)]
    pub params: Vec<String>,
    /// The merkle branch, absent when `error` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<MerkleBranch>,
}

impl ProofResponse {
    /// Build a successful response for a transaction.
    pub fn success(tx_hash: impl Into<String>, branch: MerkleBranch) -> Self {
        Self {
            error: None,
            params: vec![tx_hash.into()],
            result: Some(branch),
        }
    }

    /// Build a peer-error response for a transaction.
    pub fn failure(tx_hash: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            params: vec![tx_hash.into()],
            result: None,
        }
    }

    /// Transaction hash this response refers to, if the peer echoed one.
    pub fn tx_hash(&self) -> Option<&str> {
        self.params.first().map(String::as_str)
    }
}
