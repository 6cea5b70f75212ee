use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use stash_core::{update, Effect, Msg, SyncPhase, SyncState};
use stash_logging::{stash_error, stash_info, stash_warn};
use tokio_util::sync::CancellationToken;

use crate::fetch::{IdentityResolver, PageFetcher, UpdateSink};
use crate::{FetchError, SyncEvent};

/// Drives one sync to a terminal phase by performing the effects `update` asks for.
///
/// Pages are fetched strictly one after another. Rate-limit waits are honoured
/// for as long as the server keeps asking; the cancellation token is the only
/// way out of an endless backoff.
pub struct SyncController {
    fetcher: Arc<dyn PageFetcher>,
    identity: Arc<dyn IdentityResolver>,
    sink: Arc<dyn UpdateSink>,
    cancel: CancellationToken,
}

impl SyncController {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        identity: Arc<dyn IdentityResolver>,
        sink: Arc<dyn UpdateSink>,
    ) -> Self {
        Self {
            fetcher,
            identity,
            sink,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses an externally owned token, e.g. one shared with a UI thread.
    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs a sync starting from `state` and hands the final state back.
    ///
    /// Whatever was merged before an error or cancellation stays in the
    /// returned collection.
    pub async fn run(&self, state: SyncState) -> SyncState {
        let mut state = state;
        let mut inbox = VecDeque::from([Msg::StartRequested]);

        while let Some(msg) = inbox.pop_front() {
            let (next, effects) = update(state, msg);
            state = next;
            for effect in effects {
                if let Some(reply) = self.perform(effect).await {
                    inbox.push_back(reply);
                }
            }
        }

        stash_info!(
            "sync finished in {:?}: {} records, {} pages, {} backoffs",
            state.phase(),
            state.collection().len(),
            state.pages_fetched(),
            state.backoffs()
        );
        state
    }

    async fn perform(&self, effect: Effect) -> Option<Msg> {
        match effect {
            Effect::ResolveIdentity => {
                let result = tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => return Some(Msg::CancelRequested),
                    result = self.identity.resolve_identity() => result,
                };
                Some(match result {
                    Ok(identity) => {
                        stash_info!("resolved identity {}", identity.name);
                        Msg::IdentityResolved(identity)
                    }
                    Err(err) => {
                        stash_error!("{}", err);
                        Msg::IdentityFailed(err.0.to_string())
                    }
                })
            }
            Effect::FetchPage(request) => {
                let result = tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => return Some(Msg::CancelRequested),
                    result = self.fetcher.fetch_page(&request) => result,
                };
                Some(match result {
                    Ok(page) => Msg::PageFetched(page),
                    Err(FetchError::RateLimited { retry_after_secs }) => {
                        Msg::RateLimited { retry_after_secs }
                    }
                    Err(err) => {
                        stash_error!("page after {:?} failed: {}", request.after, err);
                        Msg::FetchFailed(err.to_string())
                    }
                })
            }
            Effect::Backoff { seconds, request } => {
                stash_warn!(
                    "rate limited; retrying page after {:?} in {}s",
                    request.after,
                    seconds
                );
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Some(Msg::CancelRequested),
                    _ = tokio::time::sleep(Duration::from_secs(seconds)) => Some(Msg::BackoffElapsed),
                }
            }
            Effect::PublishRecords(records) => {
                stash_info!("merged {} records", records.len());
                self.sink.emit(SyncEvent::RecordsMerged(records));
                None
            }
            Effect::PublishPhase(phase) => {
                if phase == SyncPhase::Empty {
                    stash_info!("no saved content found");
                }
                self.sink.emit(SyncEvent::PhaseChanged(phase));
                None
            }
        }
    }
}
