use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use stash_core::SyncState;
use tokio_util::sync::CancellationToken;

use crate::controller::SyncController;
use crate::fetch::{ChannelUpdateSink, IdentityResolver, PageFetcher};
use crate::SyncEvent;

/// A sync running on its own thread, observed by polling.
///
/// Events arrive in the order the controller emitted them and always end with
/// [`SyncEvent::Finished`].
pub struct SyncHandle {
    cancel: CancellationToken,
    event_rx: mpsc::Receiver<SyncEvent>,
}

impl SyncHandle {
    pub fn spawn(
        fetcher: Arc<dyn PageFetcher>,
        identity: Arc<dyn IdentityResolver>,
        initial: SyncState,
    ) -> io::Result<Self> {
        let (event_tx, event_rx) = mpsc::channel();
        // Pagination is sequential, so one cooperative thread is enough.
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let sink = Arc::new(ChannelUpdateSink::new(event_tx.clone()));
        let controller = SyncController::new(fetcher, identity, sink);
        let cancel = controller.cancel_token();

        thread::Builder::new()
            .name("stash-sync".to_string())
            .spawn(move || {
                let finished = runtime.block_on(controller.run(initial));
                let _ = event_tx.send(SyncEvent::Finished(Box::new(finished)));
            })?;

        Ok(Self { cancel, event_rx })
    }

    /// Asks the sync to stop at its next suspension point.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn try_recv(&self) -> Option<SyncEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<SyncEvent, mpsc::RecvTimeoutError> {
        self.event_rx.recv_timeout(timeout)
    }
}
