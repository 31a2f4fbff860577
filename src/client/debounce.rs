use std::{future::Future, time::Duration};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::foods::table::MIN_QUERY_CHARS;

pub const SEARCH_DELAY: Duration = Duration::from_millis(300);

/// Single-slot pending timer for search-as-you-type.
///
/// Scheduling cancels whatever is still waiting. A request whose timer has
/// already fired is left to finish.
#[derive(Debug)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<CancellationToken>,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(SEARCH_DELAY)
    }
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }

    /// Schedules `run(query)` after the delay. The handle resolves to `None`
    /// if a later call cancelled it first.
    ///
    /// Queries shorter than two characters cancel the pending timer and
    /// schedule nothing.
    pub fn schedule<F, Fut, T>(&mut self, query: &str, run: F) -> Option<JoinHandle<Option<T>>>
    where
        F: FnOnce(String) -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.cancel();
        if query.chars().count() < MIN_QUERY_CHARS {
            return None;
        }

        let token = CancellationToken::new();
        self.pending = Some(token.clone());
        let delay = self.delay;
        let query = query.to_string();

        Some(tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    trace!(%query, "search superseded");
                    None
                }
                _ = tokio::time::sleep(delay) => Some(run(query).await),
            }
        }))
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay() {
        let mut debouncer = SearchDebouncer::default();
        let handle = debouncer
            .schedule("dosa", |q| async move { q.to_uppercase() })
            .unwrap();
        assert_eq!(handle.await.unwrap().as_deref(), Some("DOSA"));
    }

    #[tokio::test(start_paused = true)]
    async fn later_keystroke_cancels_pending_search() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut debouncer = SearchDebouncer::default();

        let counter = calls.clone();
        let first = debouncer
            .schedule("do", move |q| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                q
            })
            .unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;

        let counter = calls.clone();
        let second = debouncer
            .schedule("dos", move |q| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                q
            })
            .unwrap();

        assert_eq!(first.await.unwrap(), None);
        assert_eq!(second.await.unwrap().as_deref(), Some("dos"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn short_query_cancels_and_schedules_nothing() {
        let mut debouncer = SearchDebouncer::default();
        let pending = debouncer.schedule("id", |q| async move { q }).unwrap();

        assert!(debouncer.schedule("i", |q| async move { q }).is_none());
        assert!(debouncer.schedule("", |q| async move { q }).is_none());
        assert_eq!(pending.await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn fired_search_runs_to_completion() {
        let mut debouncer = SearchDebouncer::new(Duration::from_millis(300));
        let slow = debouncer
            .schedule("idli", |q| async move {
                tokio::time::sleep(Duration::from_secs(5)).await;
                q
            })
            .unwrap();

        tokio::time::sleep(Duration::from_millis(301)).await;
        debouncer.cancel();

        assert_eq!(slow.await.unwrap().as_deref(), Some("idli"));
    }
}
