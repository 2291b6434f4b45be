//! # SPV Verifier
//!
//! Simplified Payment Verification for a lightweight wallet client: proves
//! that wallet transactions are included in the canonical chain by checking
//! peer-supplied merkle branches against already-validated block headers,
//! without ever downloading full blocks.
//!
//! ## Purpose
//!
//! The verification job periodically scans the wallet's unverified
//! transactions, requests a merkle proof for each through the network
//! transport, and accepts a transaction only when the recomputed merkle root
//! matches the root stored in the local block header byte for byte. When the
//! transport switches chain forks, previously accepted proofs above the
//! reorg-safe base height are unwound and re-requested.
//!
//! ## Module Structure
//!
//! ```text
//! spv-verifier/
//! ├── domain/          # Hash, Header, proof payloads, per-tx state, errors
//! ├── algorithms/      # Bit-indexed merkle branch -> root computation
//! ├── ports/           # API trait (inbound) + collaborator traits (outbound)
//! ├── application/     # SpvVerifier service + single-task job runner
//! └── config.rs        # SpvConfig
//! ```
//!
//! ## Concurrency model
//!
//! `tick` and `on_proof_response` run on one task (see
//! [`application::run_job`]); the verifier's state is never locked. Shutdown
//! from another thread goes through [`ReleaseHandle`], which only sets a
//! flag; the owning task performs the actual teardown at its next tick.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use algorithms::{branch_root, compute_merkle_root, decode_hash, encode_hash, MAX_BRANCH_DEPTH};
pub use application::{response_channel, run_job, SpvVerifier};
pub use config::{SpvConfig, HEADER_CHUNK_SIZE};
pub use domain::{
    ChainId, Hash, Header, MerkleBranch, ProofResponse, RequestStatus, SpvError, TrackedProofs,
    VerificationStatus,
};
pub use ports::{
    EventSink, HeaderSource, MockEventSink, MockHeaderSource, MockTransport, MockWalletStore,
    ProofTransport, ProofVerification, ReleaseHandle, WalletStore,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
