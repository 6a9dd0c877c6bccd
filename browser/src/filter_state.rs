//! Filter state with debounced search input.
//!
//! Tag and date changes are published at once. Search text is published only
//! after typing has paused for [`SEARCH_DEBOUNCE`]; each keystroke restarts
//! the timer, so only the last value of a burst goes out.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use common::{DateFilter, FilterState};
use tokio::task::JoinHandle;
use tracing::trace;

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Receives each published state. Called with the manager locked, so it
/// should hand the state off (a channel send) rather than do work.
pub type FilterListener = Arc<dyn Fn(FilterState) + Send + Sync>;

pub struct FilterStateManager {
    shared: Arc<Shared>,
    debounce: Duration,
}

struct Shared {
    state: Mutex<State>,
    listener: FilterListener,
}

#[derive(Default)]
struct State {
    current: FilterState,
    published: FilterState,
    /// Bumped on every search keystroke; a timer only fires if it is still
    /// the latest.
    search_seq: u64,
    pending: Option<JoinHandle<()>>,
}

impl FilterStateManager {
    pub fn new(listener: impl Fn(FilterState) + Send + Sync + 'static) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State::default()),
                listener: Arc::new(listener),
            }),
            debounce: SEARCH_DEBOUNCE,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// The live state, including search text not yet published.
    pub fn current(&self) -> FilterState {
        self.shared.lock().current.clone()
    }

    /// The last state handed to the listener.
    pub fn published(&self) -> FilterState {
        self.shared.lock().published.clone()
    }

    /// Records new search text and (re)starts the debounce timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn set_search_text(&self, text: impl Into<String>) {
        let mut state = self.shared.lock();
        state.current.search_text = text.into();
        state.search_seq += 1;
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }

        let seq = state.search_seq;
        let shared = Arc::clone(&self.shared);
        let debounce = self.debounce;
        state.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            shared.publish_debounced(seq);
        }));
    }

    /// Adds `tag` to the selection, or removes it if already selected.
    pub fn toggle_tag(&self, tag: &str) {
        let mut state = self.shared.lock();
        if !state.current.selected_tags.remove(tag) {
            state.current.selected_tags.insert(tag.to_string());
        }
        self.shared.publish(state);
    }

    pub fn set_date_filter(&self, date_filter: DateFilter) {
        let mut state = self.shared.lock();
        state.current.date_filter = date_filter;
        self.shared.publish(state);
    }

    /// Resets every field and publishes at once, dropping any pending search.
    pub fn clear_all(&self) {
        let mut state = self.shared.lock();
        state.current = FilterState::default();
        state.search_seq += 1;
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
        self.shared.publish(state);
    }
}

impl Drop for FilterStateManager {
    fn drop(&mut self) {
        if let Some(pending) = self.shared.lock().pending.take() {
            pending.abort();
        }
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_debounced(&self, seq: u64) {
        let mut state = self.lock();
        if state.search_seq != seq {
            return;
        }
        state.pending = None;
        self.publish(state);
    }

    /// Hands the current state to the listener unless it was just published.
    ///
    /// The listener runs under the lock, so publications reach it in the
    /// order they were recorded. It must not call back into the manager.
    fn publish(&self, mut state: MutexGuard<'_, State>) {
        if state.current == state.published {
            trace!("filters unchanged, not publishing");
            return;
        }
        state.published = state.current.clone();
        (self.listener)(state.published.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording() -> (FilterStateManager, Arc<Mutex<Vec<FilterState>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let manager = FilterStateManager::new(move |filters| sink.lock().unwrap().push(filters));
        (manager, seen)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_keystrokes_publishes_once() {
        let (manager, seen) = recording();

        manager.set_search_text("r");
        tokio::time::sleep(Duration::from_millis(40)).await;
        manager.set_search_text("ru");
        tokio::time::sleep(Duration::from_millis(40)).await;
        manager.set_search_text("rust");

        tokio::time::sleep(Duration::from_millis(299)).await;
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(manager.current().search_text, "rust");

        tokio::time::sleep(Duration::from_millis(2)).await;
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].search_text, "rust");
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_pauses_publish_each_value() {
        let (manager, seen) = recording();

        manager.set_search_text("go");
        tokio::time::sleep(Duration::from_millis(350)).await;
        manager.set_search_text("rust");
        tokio::time::sleep(Duration::from_millis(350)).await;

        let texts: Vec<_> = seen.lock().unwrap().iter().map(|f| f.search_text.clone()).collect();
        assert_eq!(texts, ["go", "rust"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tags_and_date_publish_immediately() {
        let (manager, seen) = recording();

        manager.toggle_tag("rust");
        manager.set_date_filter(DateFilter::Week);
        {
            let seen = seen.lock().unwrap();
            assert_eq!(seen.len(), 2);
            assert!(seen[1].selected_tags.contains("rust"));
            assert_eq!(seen[1].date_filter, DateFilter::Week);
        }

        manager.toggle_tag("rust");
        assert!(manager.published().selected_tags.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_all_cancels_pending_search() {
        let (manager, seen) = recording();

        manager.toggle_tag("remote");
        manager.set_search_text("rust");
        manager.clear_all();

        tokio::time::sleep(Duration::from_millis(500)).await;
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], FilterState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tag_toggle_carries_typed_search() {
        let (manager, seen) = recording();

        manager.set_search_text("rust");
        manager.toggle_tag("remote");
        assert_eq!(seen.lock().unwrap()[0].search_text, "rust");

        // The timer still fires, but the state is unchanged by then.
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_manager_cancels_timer() {
        let (manager, seen) = recording();
        manager.set_search_text("rust");
        drop(manager);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_listener_order_matches_publication_order_across_threads() {
        let (manager, seen) = recording();
        let manager = Arc::new(manager.with_debounce(Duration::ZERO));

        let mut writers = Vec::new();
        for writer in 0..8 {
            let manager = Arc::clone(&manager);
            writers.push(tokio::spawn(async move {
                for n in 0..50 {
                    manager.set_search_text(format!("{writer}-{n}"));
                    manager.toggle_tag(&format!("tag-{}", n % 3));
                    tokio::task::yield_now().await;
                }
            }));
        }
        for writer in writers {
            writer.await.unwrap();
        }
        // Let the last zero-length debounce timers run out.
        tokio::time::sleep(Duration::from_millis(100)).await;

        let published = manager.published();
        let seen = seen.lock().unwrap();
        assert_eq!(seen.last(), Some(&published));
        assert!(seen.windows(2).all(|pair| pair[0] != pair[1]));
    }
}
