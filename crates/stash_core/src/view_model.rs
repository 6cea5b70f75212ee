use crate::SyncPhase;

/// Read-only summary of a [`crate::SyncState`] for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncView {
    pub phase: SyncPhase,
    pub username: Option<String>,
    pub total: usize,
    pub posts: usize,
    pub comments: usize,
    pub restored: usize,
    pub pages_fetched: usize,
    pub backoffs: usize,
    pub subreddits: Vec<String>,
    pub dirty: bool,
}
