//! Refresh scheduler
//!
//! Two states, Idle and Updating. A timer or a manual request moves Idle to
//! Updating and spawns fetch + parse + install; a request arriving while
//! Updating is dropped, not queued. Success or failure both return to Idle
//! and restart the timer. On failure the installed snapshot stays.

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use modcheck_core::RuleStore;

use crate::fetch::{FetchError, Fetcher};
use crate::remote::{fetch_remote, RemoteSource};

/// Scheduler state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefreshState {
    /// Waiting for the timer or a manual request
    #[default]
    Idle,
    /// A refresh is in flight
    Updating,
}

/// Outcome of past refresh attempts
#[derive(Debug, Clone, Default)]
pub struct RefreshStatus {
    /// Current state
    pub state: RefreshState,

    /// When the last snapshot from the remote source was installed
    pub last_success: Option<DateTime<Utc>>,

    /// When the last attempt started
    pub last_attempt: Option<DateTime<Utc>>,

    /// Failed attempts since the last success
    pub consecutive_failures: u32,

    /// Error of the most recent attempt, if it failed
    pub last_error: Option<FetchError>,
}

#[derive(Debug, Clone, Default)]
struct History {
    last_success: Option<DateTime<Utc>>,
    last_attempt: Option<DateTime<Utc>>,
    consecutive_failures: u32,
    last_error: Option<FetchError>,
}

struct Inner {
    store: Arc<RuleStore>,
    fetcher: Arc<dyn Fetcher>,
    source: RemoteSource,
    interval: Duration,

    /// Idle (false) / Updating (true); only this scheduler flips it
    updating: AtomicBool,

    /// Written only by the one in-flight refresh
    history: ArcSwap<History>,

    /// Signalled when a refresh finishes so the timer restarts
    rescheduled: Notify,
}

/// Drives remote refreshes into a rule store
#[derive(Clone)]
pub struct RefreshScheduler {
    inner: Arc<Inner>,
}

impl RefreshScheduler {
    /// Create a scheduler; nothing runs until `refresh` or `spawn_timer`
    pub fn new(
        store: Arc<RuleStore>,
        fetcher: Arc<dyn Fetcher>,
        source: RemoteSource,
        interval: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                fetcher,
                source,
                interval,
                updating: AtomicBool::new(false),
                history: ArcSwap::from_pointee(History::default()),
                rescheduled: Notify::new(),
            }),
        }
    }

    /// Request a refresh.
    ///
    /// Returns the handle of the spawned refresh, or None if one is already
    /// running or no tokio runtime is available. Callers may drop the handle.
    pub fn refresh(&self) -> Option<JoinHandle<()>> {
        if self
            .inner
            .updating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("refresh already in progress; request ignored");
            return None;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                tracing::warn!("refresh requested outside a tokio runtime; ignored");
                self.inner.updating.store(false, Ordering::Release);
                return None;
            }
        };

        let scheduler = self.clone();
        Some(runtime.spawn(async move { scheduler.run().await }))
    }

    /// Arm the periodic timer.
    ///
    /// The next tick is `interval` after the most recent refresh finished,
    /// whether that refresh was scheduled or manual. Abort the handle to stop.
    /// Returns None when called outside a tokio runtime.
    pub fn spawn_timer(&self) -> Option<JoinHandle<()>> {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                tracing::warn!("refresh timer requested outside a tokio runtime; not armed");
                return None;
            }
        };

        let scheduler = self.clone();
        Some(runtime.spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(scheduler.inner.interval) => {
                        tracing::debug!("scheduled rule refresh");
                        scheduler.refresh();
                    }
                    _ = scheduler.inner.rescheduled.notified() => {}
                }
            }
        }))
    }

    /// Current state
    pub fn state(&self) -> RefreshState {
        if self.inner.updating.load(Ordering::Acquire) {
            RefreshState::Updating
        } else {
            RefreshState::Idle
        }
    }

    /// State plus history of past attempts
    pub fn status(&self) -> RefreshStatus {
        let history = self.inner.history.load();
        RefreshStatus {
            state: self.state(),
            last_success: history.last_success,
            last_attempt: history.last_attempt,
            consecutive_failures: history.consecutive_failures,
            last_error: history.last_error.clone(),
        }
    }

    /// Fetch, parse, install. Runs with the Updating flag held.
    async fn run(&self) {
        let _idle = ReturnToIdle(&self.inner);

        let started = Utc::now();
        tracing::info!(url = %self.inner.source.weights_url, "refreshing rule tables");

        let result = fetch_remote(self.inner.fetcher.as_ref(), &self.inner.source).await;

        let mut history = History::clone(&self.inner.history.load());
        history.last_attempt = Some(started);

        match result {
            Ok(snapshot) => {
                let rules = snapshot.rule_count();
                self.inner.store.replace(snapshot);
                history.last_success = Some(Utc::now());
                history.consecutive_failures = 0;
                history.last_error = None;
                tracing::info!(rules, "rule refresh complete");
            }
            Err(err) => {
                history.consecutive_failures += 1;
                tracing::warn!(
                    error = %err,
                    failures = history.consecutive_failures,
                    "rule refresh failed; keeping current rules"
                );
                history.last_error = Some(err);
            }
        }

        self.inner.history.store(Arc::new(history));
    }
}

/// Flips the scheduler back to Idle and restarts the timer, even if the
/// refresh task unwinds
struct ReturnToIdle<'a>(&'a Inner);

impl Drop for ReturnToIdle<'_> {
    fn drop(&mut self) {
        self.0.updating.store(false, Ordering::Release);
        self.0.rescheduled.notify_one();
    }
}
