//! # Domain Errors
//!
//! Failure taxonomy for SPV proof verification.
//!
//! None of these escape the job's entry points: `tick` and
//! `on_proof_response` absorb every failure, log it, and leave the affected
//! transaction unverified. The enum exists so the absorption site can log a
//! precise reason.

use thiserror::Error;

/// Hash type alias (32-byte double-SHA-256, internal byte order)
pub type Hash = [u8; 32];

/// SPV verification error types.
#[derive(Debug, Error)]
pub enum SpvError {
    /// The proof payload could not be decoded (bad hash length, bad hex,
    /// negative position, oversized branch).
    #[error("malformed merkle proof: {0}")]
    MalformedProof(String),

    /// The recomputed merkle root disagrees with the stored header root.
    /// Indicates a buggy or malicious peer.
    #[error("merkle root mismatch at height {height}: computed {computed}, header has {expected}")]
    RootMismatch {
        /// Block height the proof claims
        height: u64,
        /// Root recomputed from the branch
        computed: String,
        /// Root stored in the local header
        expected: String,
    },

    /// No header is stored at the height the proof references, most likely
    /// because the chain reorganized while the request was in flight.
    #[error("no header stored at height {0}")]
    MissingHeader(u64),

    /// The peer answered the proof request with an explicit error.
    #[error("peer returned an error: {0}")]
    PeerError(String),
}
