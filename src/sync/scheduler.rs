//! Debounced auto-sync
//!
//! Every local change re-arms a single timer; when it fires, the latest
//! document is pushed. Bursts of edits therefore cost one push.
//!
//! A push that is already in flight is not cancelled by a later change. It
//! may complete after the newer snapshot has been scheduled, and a slow
//! older upsert can land last. The next change always re-pushes, so the
//! remote converges once editing pauses.

use crate::sync::{push_trip, StatusBoard, SyncGateway};
use crate::trip::Trip;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Delays pushes until edits have been quiet for a while
pub struct AutoSync {
    gateway: Arc<dyn SyncGateway>,
    slug: String,
    delay: Duration,
    board: StatusBoard,
    pending: Mutex<Option<Pending>>,
}

/// The armed timer and whether its push has started
struct Pending {
    handle: JoinHandle<()>,
    started: Arc<Mutex<bool>>,
}

impl AutoSync {
    pub fn new(
        gateway: Arc<dyn SyncGateway>,
        slug: impl Into<String>,
        debounce_ms: u64,
        board: StatusBoard,
    ) -> Self {
        Self {
            gateway,
            slug: slug.into(),
            delay: Duration::from_millis(debounce_ms),
            board,
            pending: Mutex::new(None),
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Schedule a push of `trip`, replacing any push still waiting
    ///
    /// Must be called from within a tokio runtime.
    pub fn notify(&self, trip: &Trip) {
        let Ok(mut pending) = self.pending.lock() else {
            return;
        };

        if let Some(previous) = pending.take() {
            let started = previous.started.lock().map(|s| *s).unwrap_or(true);
            if !started {
                previous.handle.abort();
                debug!("auto-sync timer re-armed");
            }
        }

        let gateway = Arc::clone(&self.gateway);
        let slug = self.slug.clone();
        let snapshot = trip.clone();
        let board = self.board.clone();
        let delay = self.delay;
        let started = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&started);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Ok(mut s) = flag.lock() {
                *s = true;
            }
            let status = push_trip(gateway.as_ref(), &slug, &snapshot).await;
            board.post(status);
        });

        *pending = Some(Pending { handle, started });
    }

    /// Abort the scheduled push
    pub fn cancel(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(previous) = pending.take() {
                previous.handle.abort();
            }
        }
    }

    /// Wait for the scheduled push (if any) to finish
    pub async fn flush(&self) {
        let pending = self.pending.lock().ok().and_then(|mut p| p.take());
        if let Some(pending) = pending {
            let _ = pending.handle.await;
        }
    }
}

impl Drop for AutoSync {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::testing::FakeGateway;

    fn trip(title: &str) -> Trip {
        Trip {
            trip_title: title.to_string(),
            ..Trip::default()
        }
    }

    #[tokio::test]
    async fn test_burst_collapses_to_one_push() {
        let gateway = Arc::new(FakeGateway::signed_in());
        let board = StatusBoard::new();
        let sync = AutoSync::new(gateway.clone(), "frankreich-2026", 20, board.clone());

        sync.notify(&trip("a"));
        sync.notify(&trip("b"));
        sync.notify(&trip("c"));
        sync.flush().await;

        assert_eq!(gateway.push_count(), 1);
        assert_eq!(gateway.pushes.lock().unwrap()[0].trip_title, "c");
        assert!(board.latest().unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_waits_for_quiet_period() {
        let gateway = Arc::new(FakeGateway::signed_in());
        let sync = AutoSync::new(gateway.clone(), "frankreich-2026", 300, StatusBoard::new());

        sync.notify(&trip("a"));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(gateway.push_count(), 0);

        sync.flush().await;
        assert_eq!(gateway.push_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_posted() {
        let gateway = Arc::new(FakeGateway::default());
        let board = StatusBoard::new();
        let sync = AutoSync::new(gateway.clone(), "frankreich-2026", 10, board.clone());

        sync.notify(&trip("a"));
        sync.flush().await;

        assert_eq!(board.latest().unwrap().message, "Bitte erst einloggen");
    }

    #[tokio::test]
    async fn test_cancel() {
        let gateway = Arc::new(FakeGateway::signed_in());
        let sync = AutoSync::new(gateway.clone(), "frankreich-2026", 20, StatusBoard::new());

        sync.notify(&trip("a"));
        sync.cancel();
        tokio::time::sleep(Duration::from_millis(60)).await;
        sync.flush().await;

        assert_eq!(gateway.push_count(), 0);
    }
}
