//! # SPV Verifier Service
//!
//! The verification job itself: a periodic scan that issues merkle-proof
//! requests for the wallet's unverified transactions, a response handler
//! that checks each returned branch against the stored header root, and a
//! reconciler that unwinds verified state after a chain reorganization.
//!
//! All state is owned by the single worker that drives `tick` and
//! `on_proof_response`; external threads interact only through the
//! [`ReleaseHandle`].

use async_trait::async_trait;
use tracing::{debug, trace, warn};

use crate::algorithms::{branch_root, decode_hash, encode_hash};
use crate::config::{SpvConfig, HEADER_CHUNK_SIZE};
use crate::domain::{ChainId, Hash, ProofResponse, RequestStatus, SpvError, TrackedProofs};
use crate::ports::{
    EventSink, HeaderSource, ProofTransport, ProofVerification, ReleaseHandle, WalletStore,
};

/// SPV verification job, generic over its collaborators.
pub struct SpvVerifier<H, T, W, E> {
    config: SpvConfig,
    headers: H,
    transport: T,
    wallet: W,
    events: E,
    proofs: TrackedProofs,
    queue_busy: bool,
    cleaned_up: bool,
    release: ReleaseHandle,
    observed_chain: ChainId,
}

impl<H, T, W, E> SpvVerifier<H, T, W, E>
where
    H: HeaderSource,
    T: ProofTransport,
    W: WalletStore,
    E: EventSink,
{
    /// Create a new verification job. The transport's current chain identity
    /// is captured as the baseline for reorg detection.
    pub fn new(config: SpvConfig, headers: H, transport: T, wallet: W, events: E) -> Self {
        let observed_chain = transport.chain_id();
        Self {
            config,
            headers,
            transport,
            wallet,
            events,
            proofs: TrackedProofs::new(),
            queue_busy: false,
            cleaned_up: false,
            release: ReleaseHandle::new(),
            observed_chain,
        }
    }

    /// Merkle root recorded for a verified transaction.
    pub fn verified_root(&self, tx_hash: &Hash) -> Option<Hash> {
        self.proofs.verified_root(tx_hash)
    }

    /// Evict a transaction's proof state, whatever it is. The transaction
    /// becomes eligible for a fresh proof request on the next tick.
    pub fn remove_proof(&mut self, tx_hash: &Hash) {
        if self.proofs.remove(tx_hash) {
            debug!(tx = %encode_hash(tx_hash), "evicted proof state");
        }
    }

    /// Number of outstanding proof requests.
    pub fn pending_count(&self) -> usize {
        self.proofs.pending_count()
    }

    /// Tear down on the owning worker: cancel outstanding requests,
    /// deregister from the transport, go permanently inert.
    fn teardown(&mut self) {
        self.cleaned_up = true;
        self.transport.cancel_requests();
        self.transport.remove_job();
        debug!("spv job released");
    }

    /// Scan the wallet's unverified transactions and issue proof requests.
    ///
    /// Returns `false` when the transport has no endpoint or the header view
    /// is detached. A detached view's base height is meaningless, so the
    /// caller must also skip the reorg check on such a tick.
    async fn scan(&mut self) -> bool {
        let Some(server) = self.transport.endpoint() else {
            trace!("no endpoint, skipping tick");
            return false;
        };
        if !self.headers.is_attached() {
            trace!(%server, "no header view, skipping tick");
            return false;
        }

        let local_height = self.headers.local_height();
        for (tx_hash, tx_height) in self.wallet.unverified_transactions() {
            // Never two requests for the same transaction, and never a
            // re-request of something already verified.
            if self.proofs.is_tracked(&tx_hash) {
                continue;
            }
            // Unconfirmed, local-only, or above our tip: nothing to prove.
            if tx_height <= 0 || tx_height as u64 > local_height {
                continue;
            }
            let height = tx_height as u64;

            if self.headers.read_header(height).is_none() {
                // In the checkpoint region headers only arrive in bulk
                // chunks; elsewhere normal sync will bring the header.
                if height <= self.config.checkpoint_height {
                    let index = height / HEADER_CHUNK_SIZE;
                    if self.transport.request_header_chunk(index).await {
                        debug!(index, height, "requested header chunk");
                    }
                }
                continue;
            }

            match self.transport.request_merkle_proof(tx_hash, height).await {
                RequestStatus::Accepted => {
                    self.queue_busy = false;
                    debug!(tx = %encode_hash(&tx_hash), height, "requested merkle proof");
                    self.proofs.mark_pending(tx_hash);
                }
                RequestStatus::Busy => {
                    // One busy signal covers the whole queue; the remaining
                    // transactions are deferred to the next tick.
                    self.queue_busy = true;
                    trace!("request queue busy, deferring remaining transactions");
                    break;
                }
            }
        }
        true
    }

    /// Verify one completed proof request against the stored header.
    fn process_response(&mut self, response: ProofResponse) -> Result<(), SpvError> {
        let ProofResponse {
            error,
            params,
            result,
        } = response;
        if let Some(error) = error {
            // The transaction stays pending; only a reorg, reconnection, or
            // a later response can clear it.
            return Err(SpvError::PeerError(error));
        }
        let Some(tx_hex) = params.into_iter().next() else {
            return Err(SpvError::MalformedProof(
                "response carries no transaction hash".to_string(),
            ));
        };
        let tx_hash = decode_hash(&tx_hex)?;

        if !self.proofs.is_pending(&tx_hash) {
            trace!(tx = %tx_hex, "response for a transaction that is not pending, ignoring");
            return Ok(());
        }

        let branch = result.ok_or_else(|| {
            SpvError::MalformedProof("response carries no merkle branch".to_string())
        })?;
        let root = branch_root(&branch.merkle, &tx_hex, branch.pos)?;

        let height = branch.block_height;
        let header = self
            .headers
            .read_header(height)
            .ok_or(SpvError::MissingHeader(height))?;
        if header.merkle_root != root {
            return Err(SpvError::RootMismatch {
                height,
                computed: encode_hash(&root),
                expected: encode_hash(&header.merkle_root),
            });
        }

        self.proofs.mark_verified(tx_hash, root);
        debug!(tx = %tx_hex, height, "verified merkle proof");
        self.wallet
            .record_verified(tx_hash, height, header.timestamp, branch.pos as u64);

        if !self.proofs.has_pending() && self.wallet.is_synced() && !self.queue_busy {
            self.wallet.persist_verified();
            self.events.wallet_updated();
        }
        Ok(())
    }

    /// Unwind verified state after the transport switched chain forks.
    fn reconcile(&mut self, chain: ChainId) {
        let base_height = self.headers.base_height();
        debug!(?chain, base_height, "chain reorganized, unwinding proofs");
        for tx_hash in self.wallet.undo_above(chain, base_height) {
            debug!(tx = %encode_hash(&tx_hash), "re-verifying after reorg");
            self.proofs.remove(&tx_hash);
        }
        // Whatever request slot was stalled belongs to the old fork.
        self.queue_busy = false;
    }
}

#[async_trait]
impl<H, T, W, E> ProofVerification for SpvVerifier<H, T, W, E>
where
    H: HeaderSource,
    T: ProofTransport,
    W: WalletStore,
    E: EventSink,
{
    async fn tick(&mut self) {
        if self.release.is_requested() && !self.cleaned_up {
            self.teardown();
        }
        if self.cleaned_up {
            return;
        }

        if !self.scan().await {
            return;
        }

        let chain = self.transport.chain_id();
        if chain != self.observed_chain {
            self.observed_chain = chain;
            self.reconcile(chain);
        }
    }

    async fn on_proof_response(&mut self, response: ProofResponse) {
        if self.cleaned_up {
            // Orphan callback after teardown.
            return;
        }
        if let Err(error) = self.process_response(response) {
            warn!(%error, "proof response rejected");
        }
    }

    fn is_up_to_date(&self) -> bool {
        !self.proofs.has_pending()
    }

    fn is_released(&self) -> bool {
        self.cleaned_up
    }

    fn release_handle(&self) -> ReleaseHandle {
        self.release.clone()
    }
}
