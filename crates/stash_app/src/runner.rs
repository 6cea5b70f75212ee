use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use stash_core::{SyncPhase, SyncState};
use stash_engine::{IdentityResolver, PageFetcher, SyncEvent, SyncHandle};
use stash_logging::{stash_info, stash_warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Drives a [`SyncHandle`] to completion on the calling thread.
///
/// When `deadline` passes the sync is cancelled; records merged so far are
/// kept in the returned state.
pub fn run_sync<C>(
    client: Arc<C>,
    initial: SyncState,
    deadline: Option<Duration>,
) -> anyhow::Result<SyncState>
where
    C: PageFetcher + IdentityResolver + 'static,
{
    let fetcher: Arc<dyn PageFetcher> = client.clone();
    let identity: Arc<dyn IdentityResolver> = client;
    let handle =
        SyncHandle::spawn(fetcher, identity, initial).context("failed to start sync thread")?;

    let started = Instant::now();
    let mut cancelled = false;
    let mut merged = 0usize;

    loop {
        match handle.recv_timeout(POLL_INTERVAL) {
            Ok(SyncEvent::PhaseChanged(phase)) => log_phase(&phase),
            Ok(SyncEvent::RecordsMerged(records)) => {
                merged += records.len();
                stash_info!("received {} records ({} so far)", records.len(), merged);
            }
            Ok(SyncEvent::Finished(state)) => return Ok(*state),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                bail!("sync thread exited without reporting a result")
            }
        }

        if let Some(limit) = deadline {
            if !cancelled && started.elapsed() >= limit {
                stash_warn!("deadline of {}s reached, cancelling sync", limit.as_secs());
                handle.cancel();
                cancelled = true;
            }
        }
    }
}

fn log_phase(phase: &SyncPhase) {
    match phase {
        SyncPhase::Error(failure) => stash_warn!("sync failed: {}", failure),
        SyncPhase::Cancelled => stash_warn!("sync cancelled"),
        other => stash_info!("sync phase: {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stash_core::{Cursor, Identity, ListingPage, PageRequest, Submission, SubmissionKind};
    use stash_engine::{FetchError, IdentityError};

    struct FakeAccount {
        pages: Vec<ListingPage>,
        hang: bool,
    }

    fn post(id: &str) -> Submission {
        let data = json!({"id": id});
        Submission::from_payload(SubmissionKind::Post, data.as_object().unwrap().clone()).unwrap()
    }

    #[async_trait::async_trait]
    impl PageFetcher for FakeAccount {
        async fn fetch_page(&self, request: &PageRequest) -> Result<ListingPage, FetchError> {
            if self.hang {
                std::future::pending::<()>().await;
            }
            let index = match &request.after {
                None => 0,
                Some(cursor) => cursor.as_str().parse::<usize>().unwrap(),
            };
            Ok(self.pages[index].clone())
        }
    }

    #[async_trait::async_trait]
    impl IdentityResolver for FakeAccount {
        async fn resolve_identity(&self) -> Result<Identity, IdentityError> {
            Ok(Identity {
                name: "tester".into(),
            })
        }
    }

    #[test]
    fn runs_listing_to_exhaustion() {
        let account = FakeAccount {
            pages: vec![
                ListingPage {
                    submissions: vec![post("a"), post("b")],
                    after: Some(Cursor::new("1")),
                    count: 2,
                },
                ListingPage {
                    submissions: vec![post("c")],
                    after: None,
                    count: 1,
                },
            ],
            hang: false,
        };

        let finished = run_sync(Arc::new(account), SyncState::new(), None).unwrap();

        assert_eq!(finished.phase(), &SyncPhase::Exhausted);
        assert_eq!(finished.collection().len(), 3);
        assert_eq!(finished.pages_fetched(), 2);
    }

    #[test]
    fn deadline_cancels_stalled_sync() {
        let account = FakeAccount {
            pages: Vec::new(),
            hang: true,
        };

        let finished =
            run_sync(Arc::new(account), SyncState::new(), Some(Duration::ZERO)).unwrap();

        assert_eq!(finished.phase(), &SyncPhase::Cancelled);
        assert!(finished.collection().is_empty());
    }
}
