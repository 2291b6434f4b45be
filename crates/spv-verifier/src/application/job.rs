//! # Job Runner
//!
//! Hosts a verification job on one task: a fixed-cadence ticker drives the
//! scheduler, and the transport's completion channel is drained in between.
//! Because both entry points run on this single task, the verifier's state
//! needs no locking.

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::config::SpvConfig;
use crate::domain::ProofResponse;
use crate::ports::ProofVerification;

/// Create the completion channel the transport delivers proof responses on,
/// sized by the config's `response_queue_depth`.
pub fn response_channel(
    config: &SpvConfig,
) -> (mpsc::Sender<ProofResponse>, mpsc::Receiver<ProofResponse>) {
    mpsc::channel(config.response_queue_depth)
}

/// Drive a verification job until it is released or its response channel
/// closes.
///
/// Ticks fire at the config's `tick_interval`; responses are handled as they
/// arrive. Teardown requested through the job's
/// [`crate::ports::ReleaseHandle`] is performed inside `tick` on this task,
/// after which the loop exits.
pub async fn run_job<V>(
    mut verifier: V,
    mut responses: mpsc::Receiver<ProofResponse>,
    config: SpvConfig,
) where
    V: ProofVerification,
{
    debug!("spv job started");
    let mut ticker = tokio::time::interval(config.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                verifier.tick().await;
                if verifier.is_released() {
                    break;
                }
            }
            maybe_response = responses.recv() => match maybe_response {
                Some(response) => verifier.on_proof_response(response).await,
                None => break,
            },
        }
    }
    debug!("spv job stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::encode_hash;
    use crate::application::SpvVerifier;
    use crate::config::SpvConfig;
    use crate::domain::{Hash, Header, MerkleBranch};
    use crate::ports::{MockEventSink, MockHeaderSource, MockTransport, MockWalletStore};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn make_hash(n: u8) -> Hash {
        let mut h = [0u8; 32];
        h[0] = n;
        h
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_verifies_responses_and_releases() {
        let headers = MockHeaderSource::default();
        let transport = MockTransport::default();
        let wallet = MockWalletStore::default();
        let events = MockEventSink::default();

        let tx = make_hash(1);
        wallet.add_unverified(tx, 100);
        headers.set_local_height(200);
        headers.insert_header(Header::new(100, tx, 1700000000));

        let config = SpvConfig::for_testing();
        let verifier = SpvVerifier::new(
            config.clone(),
            headers.clone(),
            transport.clone(),
            wallet.clone(),
            events.clone(),
        );
        let release = verifier.release_handle();
        let (sender, receiver) = response_channel(&config);

        let job = tokio::spawn(run_job(verifier, receiver, config));

        // Let the first tick issue the proof request.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(transport.proof_requests.lock().unwrap().len(), 1);

        // Deliver the completion; the job drains it on its own task.
        let response = crate::domain::ProofResponse::success(
            encode_hash(&tx),
            MerkleBranch {
                block_height: 100,
                pos: 0,
                merkle: vec![],
            },
        );
        sender.send(response).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(wallet.recorded.lock().unwrap().len(), 1);

        // Release from "outside"; the next tick tears down and the loop ends.
        release.release();
        job.await.unwrap();
        assert!(transport.cancelled.load(Ordering::SeqCst));
        assert!(transport.removed.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_exits_when_channel_closes() {
        let config = SpvConfig::for_testing();
        let verifier = SpvVerifier::new(
            config.clone(),
            MockHeaderSource::default(),
            MockTransport::default(),
            MockWalletStore::default(),
            MockEventSink::default(),
        );
        let (sender, receiver) = response_channel(&config);

        let job = tokio::spawn(run_job(verifier, receiver, config));
        drop(sender);
        job.await.unwrap();
    }
}
