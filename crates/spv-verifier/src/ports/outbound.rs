//! # Outbound Ports
//!
//! Traits for the verifier's external collaborators: the block-header store,
//! the network transport, the wallet's transaction store, and the
//! notification sink. Mock implementations for testing live alongside the
//! traits.

use crate::domain::{ChainId, Hash, Header, RequestStatus};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Block-header store - outbound port.
///
/// Owns the validated header chain; the verifier only reads from it.
pub trait HeaderSource: Send + Sync {
    /// Is a header view attached at all? `false` is a transient condition
    /// while the transport is switching servers.
    fn is_attached(&self) -> bool;

    /// Header at the given height, if already fetched and validated.
    fn read_header(&self, height: u64) -> Option<Header>;

    /// Furthest-back height unaffected by a reorganization of the current
    /// chain.
    fn base_height(&self) -> u64;

    /// Height of the local chain tip.
    fn local_height(&self) -> u64;
}

/// Network transport - outbound port.
///
/// Request/completion style: `request_merkle_proof` returns an acceptance
/// or busy signal immediately; the completed [`crate::domain::ProofResponse`]
/// arrives later on the job's completion channel.
#[async_trait]
pub trait ProofTransport: Send + Sync {
    /// Currently connected server, if any.
    fn endpoint(&self) -> Option<String>;

    /// Identity of the chain fork the transport is following.
    fn chain_id(&self) -> ChainId;

    /// Ask the peer for a merkle proof of `tx_hash` at `height`.
    async fn request_merkle_proof(&self, tx_hash: Hash, height: u64) -> RequestStatus;

    /// Ask for the bulk header chunk with the given index. Returns whether
    /// the request was accepted.
    async fn request_header_chunk(&self, index: u64) -> bool;

    /// Cancel every outstanding proof request owned by this job.
    fn cancel_requests(&self);

    /// Deregister this job from the transport's worker.
    fn remove_job(&self);
}

/// Wallet transaction store - outbound port.
///
/// Authoritative for which transactions need verification and which remain
/// valid across a reorganization.
pub trait WalletStore: Send + Sync {
    /// Transactions awaiting verification, mapped to their claimed block
    /// height. Heights at or below zero mean unconfirmed or local-only.
    fn unverified_transactions(&self) -> BTreeMap<Hash, i64>;

    /// Record a successfully verified transaction.
    fn record_verified(&self, tx_hash: Hash, height: u64, timestamp: u64, position: u64);

    /// Persist all verified results.
    fn persist_verified(&self);

    /// Transactions whose verification no longer holds above the given
    /// height on the given chain. The wallet decides; the verifier unwinds.
    fn undo_above(&self, chain: ChainId, height: u64) -> HashSet<Hash>;

    /// Has the wallet finished syncing its transaction history?
    fn is_synced(&self) -> bool;
}

/// Notification sink - outbound port.
pub trait EventSink: Send + Sync {
    /// The wallet's verified state changed and every proof request has been
    /// resolved; listeners (e.g. a UI) should refresh.
    fn wallet_updated(&self);
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock header store for testing. Cloneable; clones share state.
#[derive(Clone)]
pub struct MockHeaderSource {
    /// Is a header view attached?
    pub attached: Arc<AtomicBool>,
    /// Reorg-safe base height.
    pub base: Arc<AtomicUsize>,
    /// Local tip height.
    pub local: Arc<AtomicUsize>,
    /// Stored headers by height.
    pub headers: Arc<Mutex<HashMap<u64, Header>>>,
}

impl Default for MockHeaderSource {
    fn default() -> Self {
        Self {
            attached: Arc::new(AtomicBool::new(true)),
            base: Arc::new(AtomicUsize::new(0)),
            local: Arc::new(AtomicUsize::new(0)),
            headers: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl MockHeaderSource {
    /// Store a header.
    pub fn insert_header(&self, header: Header) {
        self.headers.lock().unwrap().insert(header.height, header);
    }

    /// Set the local tip height.
    pub fn set_local_height(&self, height: u64) {
        self.local.store(height as usize, Ordering::SeqCst);
    }

    /// Set the reorg-safe base height.
    pub fn set_base_height(&self, height: u64) {
        self.base.store(height as usize, Ordering::SeqCst);
    }
}

impl HeaderSource for MockHeaderSource {
    fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    fn read_header(&self, height: u64) -> Option<Header> {
        self.headers.lock().unwrap().get(&height).copied()
    }

    fn base_height(&self) -> u64 {
        self.base.load(Ordering::SeqCst) as u64
    }

    fn local_height(&self) -> u64 {
        self.local.load(Ordering::SeqCst) as u64
    }
}

/// Mock transport for testing. Cloneable; clones share state.
#[derive(Clone)]
pub struct MockTransport {
    /// Simulated connection state.
    pub connected: Arc<AtomicBool>,
    /// Chain identity reported to the verifier.
    pub chain: Arc<Mutex<ChainId>>,
    /// Remaining proof requests before the queue reports busy.
    pub capacity: Arc<AtomicUsize>,
    /// Recorded proof requests.
    pub proof_requests: Arc<Mutex<Vec<(Hash, u64)>>>,
    /// Recorded chunk requests.
    pub chunk_requests: Arc<Mutex<Vec<u64>>>,
    /// Was whole-job cancellation invoked?
    pub cancelled: Arc<AtomicBool>,
    /// Was the job deregistered?
    pub removed: Arc<AtomicBool>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self {
            connected: Arc::new(AtomicBool::new(true)),
            chain: Arc::new(Mutex::new(ChainId(0))),
            capacity: Arc::new(AtomicUsize::new(usize::MAX)),
            proof_requests: Arc::new(Mutex::new(Vec::new())),
            chunk_requests: Arc::new(Mutex::new(Vec::new())),
            cancelled: Arc::new(AtomicBool::new(false)),
            removed: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl MockTransport {
    /// Switch the reported chain identity (simulates a reorg).
    pub fn set_chain(&self, chain: ChainId) {
        *self.chain.lock().unwrap() = chain;
    }

    /// Accept only this many further proof requests, then report busy.
    pub fn set_capacity(&self, remaining: usize) {
        self.capacity.store(remaining, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProofTransport for MockTransport {
    fn endpoint(&self) -> Option<String> {
        self.connected
            .load(Ordering::SeqCst)
            .then(|| "mock-server:50002".to_string())
    }

    fn chain_id(&self) -> ChainId {
        *self.chain.lock().unwrap()
    }

    async fn request_merkle_proof(&self, tx_hash: Hash, height: u64) -> RequestStatus {
        let remaining = self.capacity.load(Ordering::SeqCst);
        if remaining == 0 {
            return RequestStatus::Busy;
        }
        if remaining != usize::MAX {
            self.capacity.store(remaining - 1, Ordering::SeqCst);
        }
        self.proof_requests.lock().unwrap().push((tx_hash, height));
        RequestStatus::Accepted
    }

    async fn request_header_chunk(&self, index: u64) -> bool {
        self.chunk_requests.lock().unwrap().push(index);
        true
    }

    fn cancel_requests(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn remove_job(&self) {
        self.removed.store(true, Ordering::SeqCst);
    }
}

/// Mock wallet store for testing. Cloneable; clones share state.
#[derive(Clone, Default)]
pub struct MockWalletStore {
    /// Transactions awaiting verification.
    pub unverified: Arc<Mutex<BTreeMap<Hash, i64>>>,
    /// Recorded verifications: `(tx_hash, height, timestamp, position)`.
    pub recorded: Arc<Mutex<Vec<(Hash, u64, u64, u64)>>>,
    /// Number of persist calls.
    pub persist_count: Arc<AtomicUsize>,
    /// What `undo_above` should report invalidated.
    pub undo_result: Arc<Mutex<HashSet<Hash>>>,
    /// Heights `undo_above` was called with.
    pub undo_calls: Arc<Mutex<Vec<(ChainId, u64)>>>,
    /// Reported wallet sync state.
    pub synced: Arc<AtomicBool>,
}

impl MockWalletStore {
    /// Add an unverified transaction.
    pub fn add_unverified(&self, tx_hash: Hash, height: i64) {
        self.unverified.lock().unwrap().insert(tx_hash, height);
    }
}

impl WalletStore for MockWalletStore {
    fn unverified_transactions(&self) -> BTreeMap<Hash, i64> {
        self.unverified.lock().unwrap().clone()
    }

    fn record_verified(&self, tx_hash: Hash, height: u64, timestamp: u64, position: u64) {
        self.unverified.lock().unwrap().remove(&tx_hash);
        self.recorded
            .lock()
            .unwrap()
            .push((tx_hash, height, timestamp, position));
    }

    fn persist_verified(&self) {
        self.persist_count.fetch_add(1, Ordering::SeqCst);
    }

    fn undo_above(&self, chain: ChainId, height: u64) -> HashSet<Hash> {
        self.undo_calls.lock().unwrap().push((chain, height));
        self.undo_result.lock().unwrap().clone()
    }

    fn is_synced(&self) -> bool {
        self.synced.load(Ordering::SeqCst)
    }
}

/// Mock notification sink for testing. Cloneable; clones share state.
#[derive(Clone, Default)]
pub struct MockEventSink {
    /// Number of `wallet_updated` notifications.
    pub updates: Arc<AtomicUsize>,
}

impl EventSink for MockEventSink {
    fn wallet_updated(&self) {
        self.updates.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_transport_backpressure() {
        let transport = MockTransport::default();
        transport.set_capacity(1);

        let first = transport.request_merkle_proof([1u8; 32], 10).await;
        assert_eq!(first, RequestStatus::Accepted);

        let second = transport.request_merkle_proof([2u8; 32], 11).await;
        assert_eq!(second, RequestStatus::Busy);
        assert_eq!(transport.proof_requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_transport_disconnected() {
        let transport = MockTransport::default();
        transport.connected.store(false, Ordering::SeqCst);
        assert!(transport.endpoint().is_none());
    }

    #[test]
    fn test_mock_header_source() {
        let headers = MockHeaderSource::default();
        headers.insert_header(Header::new(5, [9u8; 32], 1700000000));
        headers.set_local_height(10);

        assert!(headers.is_attached());
        assert_eq!(headers.local_height(), 10);
        assert_eq!(headers.read_header(5).unwrap().merkle_root, [9u8; 32]);
        assert!(headers.read_header(6).is_none());
    }

    #[test]
    fn test_mock_wallet_records_and_clears() {
        let wallet = MockWalletStore::default();
        wallet.add_unverified([1u8; 32], 100);
        assert_eq!(wallet.unverified_transactions().len(), 1);

        wallet.record_verified([1u8; 32], 100, 1700000000, 3);
        assert!(wallet.unverified_transactions().is_empty());
        assert_eq!(wallet.recorded.lock().unwrap().len(), 1);
    }
}
