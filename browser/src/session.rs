use std::sync::Arc;

use common::FilterState;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::filter_state::FilterStateManager;
use crate::listing::JobListController;
use crate::store::JobStore;

/// Filters wired to a job list: every published filter change re-requests
/// page 1.
pub struct BrowseSession<S> {
    pub filters: FilterStateManager,
    pub list: Arc<JobListController<S>>,
    forwarder: JoinHandle<()>,
}

impl<S: JobStore + 'static> BrowseSession<S> {
    /// Must be called from within a tokio runtime.
    pub fn start(list: Arc<JobListController<S>>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<FilterState>();
        let filters = FilterStateManager::new(move |state| {
            // Only fails once the session is gone.
            let _ = tx.send(state);
        });

        let target = Arc::clone(&list);
        let forwarder = tokio::spawn(async move {
            while let Some(state) = rx.recv().await {
                debug!(?state, "filters changed");
                // Issued in publication order, fetched side by side; the list
                // keeps the answer to the newest.
                let (ticket, request) = target.begin(1, Some(state));
                let target = Arc::clone(&target);
                tokio::spawn(async move {
                    target.resolve(ticket, &request).await;
                });
            }
        });

        Self {
            filters,
            list,
            forwarder,
        }
    }

    /// Loads the first page with the initial filters.
    pub async fn load_initial(&self) -> bool {
        self.list.set_filters(self.filters.current()).await
    }
}

impl<S> Drop for BrowseSession<S> {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}
