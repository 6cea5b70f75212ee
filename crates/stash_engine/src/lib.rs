//! Stash engine: platform client, sync driver and snapshot files.
mod controller;
mod engine;
mod export;
mod fetch;
mod persist;
mod types;

pub use controller::SyncController;
pub use engine::SyncHandle;
pub use export::{export_snapshot, import_snapshot, SnapshotFileError};
pub use fetch::{
    ChannelUpdateSink, IdentityResolver, PageFetcher, RedditClient, SyncSettings, UpdateSink,
};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use tokio_util::sync::CancellationToken;
pub use types::{FailureKind, FetchError, IdentityError, SyncEvent};
