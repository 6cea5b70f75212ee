use crate::collection::NormalizedCollection;
use crate::page::PageRequest;
use crate::view_model::SyncView;

/// Where the sync state machine is.
///
/// `Idle -> Loading -> {Exhausted, Empty, Error, Cancelled} -> Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncPhase {
    #[default]
    Idle,
    Loading,
    /// The listing ended normally.
    Exhausted,
    /// The very first page was empty: nothing saved.
    Empty,
    Error(SyncFailure),
    Cancelled,
}

impl SyncPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SyncPhase::Exhausted | SyncPhase::Empty | SyncPhase::Error(_) | SyncPhase::Cancelled
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncFailure {
    #[error("identity unavailable: {0}")]
    IdentityUnavailable(String),
    #[error("fetch failed: {0}")]
    FetchFailed(String),
}

/// What a `Loading` sync is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Step {
    AwaitingIdentity,
    AwaitingPage(PageRequest),
    BackingOff(PageRequest),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SyncState {
    phase: SyncPhase,
    step: Option<Step>,
    collection: NormalizedCollection,
    username: Option<String>,
    pages_fetched: usize,
    backoffs: usize,
    dirty: bool,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a previously accumulated collection, e.g. an imported snapshot.
    pub fn with_collection(collection: NormalizedCollection) -> Self {
        Self {
            collection,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> &SyncPhase {
        &self.phase
    }

    pub fn collection(&self) -> &NormalizedCollection {
        &self.collection
    }

    pub fn into_collection(self) -> NormalizedCollection {
        self.collection
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// The page request in flight or waiting out a backoff.
    pub fn pending_request(&self) -> Option<&PageRequest> {
        match self.step.as_ref()? {
            Step::AwaitingPage(request) | Step::BackingOff(request) => Some(request),
            Step::AwaitingIdentity => None,
        }
    }

    pub fn is_backing_off(&self) -> bool {
        matches!(self.step, Some(Step::BackingOff(_)))
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn backoffs(&self) -> usize {
        self.backoffs
    }

    pub fn view(&self) -> SyncView {
        let (posts, comments) = self.collection.count_by_kind();
        SyncView {
            phase: self.phase.clone(),
            username: self.username.clone(),
            total: self.collection.len(),
            posts,
            comments,
            restored: self.collection.restored_count(),
            pages_fetched: self.pages_fetched,
            backoffs: self.backoffs,
            subreddits: self.collection.subreddits(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn step(&self) -> Option<&Step> {
        self.step.as_ref()
    }

    pub(crate) fn collection_mut(&mut self) -> &mut NormalizedCollection {
        self.dirty = true;
        &mut self.collection
    }

    pub(crate) fn begin(&mut self) {
        self.phase = SyncPhase::Loading;
        self.step = Some(Step::AwaitingIdentity);
        self.username = None;
        self.pages_fetched = 0;
        self.backoffs = 0;
        self.dirty = true;
    }

    pub(crate) fn set_username(&mut self, name: String) {
        self.username = Some(name);
        self.dirty = true;
    }

    pub(crate) fn set_step(&mut self, step: Step) {
        self.step = Some(step);
    }

    pub(crate) fn record_page(&mut self) {
        self.pages_fetched += 1;
        self.dirty = true;
    }

    pub(crate) fn record_backoff(&mut self) {
        self.backoffs += 1;
        self.dirty = true;
    }

    pub(crate) fn set_phase(&mut self, phase: SyncPhase) {
        if !matches!(phase, SyncPhase::Loading) {
            self.step = None;
        }
        self.phase = phase;
        self.dirty = true;
    }
}
