use crate::{NormalizedCollection, PageRequest, SyncPhase};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ResolveIdentity,
    FetchPage(PageRequest),
    /// Sleep `seconds`, then report `Msg::BackoffElapsed`; `request` is what gets retried.
    Backoff { seconds: u64, request: PageRequest },
    /// Records merged by the last page, in fetch order.
    PublishRecords(NormalizedCollection),
    PublishPhase(SyncPhase),
}
