//! Stash core: submission model, normalization, snapshot codec and the pure
//! sync state machine.
mod collection;
mod effect;
mod msg;
mod page;
pub mod snapshot;
mod state;
mod submission;
mod update;
mod view_model;

pub use collection::{normalize, Entry, NormalizedCollection, Provenance};
pub use effect::Effect;
pub use msg::Msg;
pub use page::{Cursor, Identity, ListingPage, PageRequest};
pub use snapshot::{DecodeError, EncodeError, SNAPSHOT_VERSION};
pub use state::{SyncFailure, SyncPhase, SyncState};
pub use submission::{InvalidSubmission, Submission, SubmissionId, SubmissionKind};
pub use update::update;
pub use view_model::SyncView;
