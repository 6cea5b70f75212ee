use crate::collection::{normalize, Provenance};
use crate::state::Step;
use crate::{Effect, ListingPage, Msg, PageRequest, SyncFailure, SyncPhase, SyncState};

/// Pure update function: applies a message to state and returns any effects.
///
/// Messages that do not fit the current phase or step are ignored.
pub fn update(mut state: SyncState, msg: Msg) -> (SyncState, Vec<Effect>) {
    let loading = *state.phase() == SyncPhase::Loading;
    let step = state.step().cloned();

    let effects = match (msg, step) {
        (Msg::StartRequested, _) if !loading => {
            state.begin();
            vec![
                Effect::PublishPhase(SyncPhase::Loading),
                Effect::ResolveIdentity,
            ]
        }
        (Msg::IdentityResolved(identity), Some(Step::AwaitingIdentity)) => {
            let request = PageRequest::first(identity.name.clone());
            state.set_username(identity.name);
            state.set_step(Step::AwaitingPage(request.clone()));
            vec![Effect::FetchPage(request)]
        }
        (Msg::IdentityFailed(cause), Some(Step::AwaitingIdentity)) => {
            fail(&mut state, SyncFailure::IdentityUnavailable(cause))
        }
        (Msg::PageFetched(page), Some(Step::AwaitingPage(request))) => {
            apply_page(&mut state, request, page)
        }
        (Msg::RateLimited { retry_after_secs }, Some(Step::AwaitingPage(request))) => {
            state.record_backoff();
            state.set_step(Step::BackingOff(request.clone()));
            vec![Effect::Backoff {
                seconds: retry_after_secs,
                request,
            }]
        }
        (Msg::BackoffElapsed, Some(Step::BackingOff(request))) => {
            state.set_step(Step::AwaitingPage(request.clone()));
            vec![Effect::FetchPage(request)]
        }
        (Msg::FetchFailed(cause), Some(Step::AwaitingPage(_))) => {
            fail(&mut state, SyncFailure::FetchFailed(cause))
        }
        (Msg::CancelRequested, _) if loading => {
            state.set_phase(SyncPhase::Cancelled);
            vec![Effect::PublishPhase(SyncPhase::Cancelled)]
        }
        (Msg::Acknowledged, _) if state.phase().is_terminal() => {
            state.set_phase(SyncPhase::Idle);
            vec![Effect::PublishPhase(SyncPhase::Idle)]
        }
        (Msg::SnapshotImported(imported), _) if !loading => {
            state.collection_mut().merge(imported);
            Vec::new()
        }
        (Msg::ClearRequested, _) if !loading => {
            state.collection_mut().clear();
            Vec::new()
        }
        _ => Vec::new(),
    };

    (state, effects)
}

fn apply_page(state: &mut SyncState, request: PageRequest, page: ListingPage) -> Vec<Effect> {
    let first_page = state.pages_fetched() == 0;
    state.record_page();

    if page.count == 0 && first_page {
        state.set_phase(SyncPhase::Empty);
        return vec![Effect::PublishPhase(SyncPhase::Empty)];
    }

    let mut effects = Vec::with_capacity(2);
    let merged = normalize(page.submissions, Provenance::Live);
    if !merged.is_empty() {
        state.collection_mut().merge(merged.clone());
        effects.push(Effect::PublishRecords(merged));
    }

    match page.after {
        Some(after) if page.count > 0 => {
            let next = PageRequest {
                username: request.username,
                after: Some(after),
            };
            state.set_step(Step::AwaitingPage(next.clone()));
            effects.push(Effect::FetchPage(next));
        }
        _ => {
            state.set_phase(SyncPhase::Exhausted);
            effects.push(Effect::PublishPhase(SyncPhase::Exhausted));
        }
    }
    effects
}

fn fail(state: &mut SyncState, failure: SyncFailure) -> Vec<Effect> {
    let phase = SyncPhase::Error(failure);
    state.set_phase(phase.clone());
    vec![Effect::PublishPhase(phase)]
}
