use crate::{Identity, ListingPage, NormalizedCollection};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Caller asked for a sync to start.
    StartRequested,
    /// Identity endpoint answered.
    IdentityResolved(Identity),
    /// Identity endpoint failed; fatal to this sync.
    IdentityFailed(String),
    /// A page request completed.
    PageFetched(ListingPage),
    /// The server asked us to wait before repeating the request.
    RateLimited { retry_after_secs: u64 },
    /// The rate-limit wait is over.
    BackoffElapsed,
    /// A page request failed for good.
    FetchFailed(String),
    /// Caller gave up on the running sync.
    CancelRequested,
    /// Caller has seen the terminal state.
    Acknowledged,
    /// Merge a decoded snapshot into the collection.
    SnapshotImported(NormalizedCollection),
    /// Drop everything accumulated so far.
    ClearRequested,
}
