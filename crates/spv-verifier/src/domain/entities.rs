//! # Domain Entities
//!
//! The block-header view the verifier reads, and the per-transaction
//! verification state it owns.

use super::errors::Hash;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Block header fields the verifier needs (read-only view from the header
/// store; the full header lives there).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Header {
    /// Block height.
    pub height: u64,
    /// Merkle root of the block's transactions.
    pub merkle_root: Hash,
    /// Unix timestamp.
    pub timestamp: u64,
}

impl Header {
    /// Create a new header view.
    pub fn new(height: u64, merkle_root: Hash, timestamp: u64) -> Self {
        Self {
            height,
            merkle_root,
            timestamp,
        }
    }
}

/// Verification state of one tracked transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerificationStatus {
    /// A proof request is outstanding with the transport.
    Pending,
    /// The proof checked out against the stored header root.
    Verified(Hash),
}

/// Per-transaction verification states, keyed by transaction hash.
///
/// A transaction is in exactly one state: untracked, `Pending`, or
/// `Verified`. Keeping both states in a single map makes it impossible for
/// a transaction to be pending and verified at the same time.
#[derive(Clone, Debug, Default)]
pub struct TrackedProofs {
    statuses: HashMap<Hash, VerificationStatus>,
}

impl TrackedProofs {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Is this transaction pending or verified?
    pub fn is_tracked(&self, tx_hash: &Hash) -> bool {
        self.statuses.contains_key(tx_hash)
    }

    /// Is a proof request outstanding for this transaction?
    pub fn is_pending(&self, tx_hash: &Hash) -> bool {
        matches!(self.statuses.get(tx_hash), Some(VerificationStatus::Pending))
    }

    /// Record that a proof request was accepted by the transport.
    pub fn mark_pending(&mut self, tx_hash: Hash) {
        self.statuses.insert(tx_hash, VerificationStatus::Pending);
    }

    /// Move a pending transaction to verified, recording its merkle root.
    ///
    /// Returns `false` (and changes nothing) unless the transaction is
    /// currently pending; a response for an untracked or already-verified
    /// transaction must not create state.
    pub fn mark_verified(&mut self, tx_hash: Hash, merkle_root: Hash) -> bool {
        match self.statuses.get(&tx_hash) {
            Some(VerificationStatus::Pending) => {
                self.statuses
                    .insert(tx_hash, VerificationStatus::Verified(merkle_root));
                true
            }
            _ => false,
        }
    }

    /// Forget a transaction entirely, whatever its state. Returns whether it
    /// was tracked. The transaction becomes eligible for a fresh proof
    /// request on the next scan.
    pub fn remove(&mut self, tx_hash: &Hash) -> bool {
        self.statuses.remove(tx_hash).is_some()
    }

    /// Merkle root of a verified transaction.
    pub fn verified_root(&self, tx_hash: &Hash) -> Option<Hash> {
        match self.statuses.get(tx_hash) {
            Some(VerificationStatus::Verified(root)) => Some(*root),
            _ => None,
        }
    }

    /// Any proof requests still outstanding?
    pub fn has_pending(&self) -> bool {
        self.statuses
            .values()
            .any(|s| matches!(s, VerificationStatus::Pending))
    }

    /// Number of outstanding proof requests.
    pub fn pending_count(&self) -> usize {
        self.statuses
            .values()
            .filter(|s| matches!(s, VerificationStatus::Pending))
            .count()
    }

    /// Total number of tracked transactions.
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    /// Is nothing tracked at all?
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_hash(n: u8) -> Hash {
        let mut h = [0u8; 32];
        h[0] = n;
        h
    }

    #[test]
    fn test_header_new() {
        let header = Header::new(100, make_hash(1), 1700000000);
        assert_eq!(header.height, 100);
        assert_eq!(header.timestamp, 1700000000);
    }

    #[test]
    fn test_tracked_proofs_empty() {
        let proofs = TrackedProofs::new();
        assert!(proofs.is_empty());
        assert!(!proofs.has_pending());
        assert!(!proofs.is_tracked(&make_hash(1)));
    }

    #[test]
    fn test_mark_pending() {
        let mut proofs = TrackedProofs::new();
        proofs.mark_pending(make_hash(1));
        assert!(proofs.is_tracked(&make_hash(1)));
        assert!(proofs.is_pending(&make_hash(1)));
        assert_eq!(proofs.pending_count(), 1);
    }

    #[test]
    fn test_mark_verified_from_pending() {
        let mut proofs = TrackedProofs::new();
        proofs.mark_pending(make_hash(1));
        assert!(proofs.mark_verified(make_hash(1), make_hash(9)));

        // No longer pending, still tracked, root retrievable.
        assert!(!proofs.is_pending(&make_hash(1)));
        assert!(proofs.is_tracked(&make_hash(1)));
        assert_eq!(proofs.verified_root(&make_hash(1)), Some(make_hash(9)));
        assert_eq!(proofs.pending_count(), 0);
    }

    #[test]
    fn test_mark_verified_requires_pending() {
        let mut proofs = TrackedProofs::new();

        // Untracked: refused.
        assert!(!proofs.mark_verified(make_hash(1), make_hash(9)));
        assert!(!proofs.is_tracked(&make_hash(1)));

        // Already verified: refused, root unchanged.
        proofs.mark_pending(make_hash(2));
        assert!(proofs.mark_verified(make_hash(2), make_hash(8)));
        assert!(!proofs.mark_verified(make_hash(2), make_hash(7)));
        assert_eq!(proofs.verified_root(&make_hash(2)), Some(make_hash(8)));
    }

    #[test]
    fn test_remove() {
        let mut proofs = TrackedProofs::new();
        proofs.mark_pending(make_hash(1));
        assert!(proofs.remove(&make_hash(1)));
        assert!(!proofs.is_tracked(&make_hash(1)));
        assert!(!proofs.remove(&make_hash(1)));
    }

    #[test]
    fn test_pending_and_verified_are_disjoint() {
        let mut proofs = TrackedProofs::new();
        proofs.mark_pending(make_hash(1));
        proofs.mark_verified(make_hash(1), make_hash(9));

        // A verified transaction cannot also be pending.
        assert!(!proofs.is_pending(&make_hash(1)));
        assert!(proofs.verified_root(&make_hash(1)).is_some());
        assert_eq!(proofs.len(), 1);
    }
}
