use std::fmt;

use stash_core::{NormalizedCollection, SyncPhase, SyncState};

/// Notifications for whoever renders a sync.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    PhaseChanged(SyncPhase),
    /// Records merged from one page, in fetch order.
    RecordsMerged(NormalizedCollection),
    /// The sync loop returned; carries the final state and its collection.
    Finished(Box<SyncState>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The server asked for a pause; repeat the same request afterwards.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
    #[error("{kind}: {message}")]
    Failed { kind: FailureKind, message: String },
}

impl FetchError {
    pub(crate) fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failed {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> Option<&FailureKind> {
        match self {
            FetchError::RateLimited { .. } => None,
            FetchError::Failed { kind, .. } => Some(kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("identity unavailable: {0}")]
pub struct IdentityError(pub FetchError);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "decode error"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
