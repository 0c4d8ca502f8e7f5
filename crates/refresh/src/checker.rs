//! Public checker surface
//!
//! Wires a rule store to an optional refresh scheduler. Validation only
//! ever touches the store; refresh only ever touches the scheduler.

use std::sync::Arc;
use tokio::task::JoinHandle;

use modcheck_config::ModcheckConfig;
use modcheck_core::{BundledTables, FormatError, RuleStore};

use crate::fetch::HttpFetcher;
use crate::remote::RemoteSource;
use crate::scheduler::{RefreshScheduler, RefreshStatus};

/// Sort code / account number checker
#[derive(Clone)]
pub struct Checker {
    store: Arc<RuleStore>,
    scheduler: Option<RefreshScheduler>,
}

impl Checker {
    /// Checker over a store with no remote refresh
    pub fn new(store: Arc<RuleStore>) -> Self {
        Self {
            store,
            scheduler: None,
        }
    }

    /// Attach a refresh scheduler writing into the same store
    pub fn with_scheduler(mut self, scheduler: RefreshScheduler) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Load the bundled tables and, when both remote URLs are configured,
    /// prepare an HTTP refresh scheduler. The timer is not started.
    pub fn from_config(config: &ModcheckConfig) -> Self {
        let tables = BundledTables::new(
            config.rules.weights_path.clone(),
            config.rules.substitutions_path.clone(),
        );
        let store = Arc::new(RuleStore::with_snapshot(tables.load()));
        let checker = Self::new(Arc::clone(&store));

        match RemoteSource::from_config(&config.refresh) {
            Some(source) => {
                let scheduler = RefreshScheduler::new(
                    store,
                    Arc::new(HttpFetcher::new()),
                    source,
                    config.refresh.interval(),
                );
                checker.with_scheduler(scheduler)
            }
            None => checker,
        }
    }

    /// Validate a sort code / account number pair against the current rules
    #[inline]
    pub fn validate(&self, sort_code: &str, account_number: &str) -> Result<bool, FormatError> {
        self.store.validate(sort_code, account_number)
    }

    /// True once a non-empty rule set has been installed
    pub fn ready(&self) -> bool {
        self.store.ready()
    }

    /// Number of weight rules currently installed
    pub fn rule_count(&self) -> usize {
        self.store.rule_count()
    }

    /// Request a remote refresh. Fire-and-forget; ignored while one is
    /// already running.
    pub fn refresh(&self) {
        match &self.scheduler {
            Some(scheduler) => {
                scheduler.refresh();
            }
            None => tracing::warn!("refresh requested but no remote source is configured"),
        }
    }

    /// Arm the periodic refresh timer, if a remote source is configured and
    /// a tokio runtime is running
    pub fn start_timer(&self) -> Option<JoinHandle<()>> {
        self.scheduler.as_ref().and_then(RefreshScheduler::spawn_timer)
    }

    /// Refresh history, if a remote source is configured
    pub fn refresh_status(&self) -> Option<RefreshStatus> {
        self.scheduler.as_ref().map(RefreshScheduler::status)
    }

    /// Underlying rule store
    pub fn store(&self) -> &Arc<RuleStore> {
        &self.store
    }

    /// Underlying scheduler
    pub fn scheduler(&self) -> Option<&RefreshScheduler> {
        self.scheduler.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::tests::{source, ScriptedFetcher, SUBS, WEIGHTS};
    use crate::scheduler::RefreshState;
    use modcheck_core::RuleSnapshot;
    use std::time::Duration;

    #[test]
    fn test_empty_checker_fails_open() {
        let checker = Checker::new(Arc::new(RuleStore::new()));
        assert!(!checker.ready());
        assert_eq!(checker.rule_count(), 0);
        assert_eq!(checker.validate("999999", "12345678"), Ok(true));
        assert_eq!(
            checker.validate("123", "12345678"),
            Err(FormatError::InvalidSortCodeFormat)
        );
        // No scheduler: refresh is a logged no-op
        checker.refresh();
        assert!(checker.refresh_status().is_none());
    }

    #[test]
    fn test_from_config_without_files_or_urls() {
        let mut config = ModcheckConfig::default();
        config.rules.weights_path = "/nonexistent/valacdos.txt".into();
        config.rules.substitutions_path = "/nonexistent/scsubtab.txt".into();

        let checker = Checker::from_config(&config);
        assert!(!checker.ready());
        assert!(checker.scheduler().is_none());
        assert_eq!(checker.validate("200000", "58177633"), Ok(true));
    }

    #[test]
    fn test_from_config_builds_scheduler() {
        let mut config = ModcheckConfig::default();
        config.rules.weights_path = "/nonexistent/valacdos.txt".into();
        config.refresh.weights_url = Some("https://rules.test/valacdos.txt".to_string());
        config.refresh.substitutions_url = Some("https://rules.test/scsubtab.txt".to_string());

        let checker = Checker::from_config(&config);
        assert!(checker.scheduler().is_some());
        // No runtime here: the timer is not armed, and nothing panics
        assert!(checker.start_timer().is_none());
        assert_eq!(
            checker.refresh_status().map(|s| s.state),
            Some(RefreshState::Idle)
        );
    }

    #[tokio::test]
    async fn test_refresh_replaces_rules_seen_by_validate() {
        let store = Arc::new(RuleStore::with_snapshot(RuleSnapshot::from_tables(
            "200000 200099 MOD10 0 0 0 0 0 0 0 0 0 0 0 0 0 1\n",
            "",
        )));
        let fetcher = Arc::new(ScriptedFetcher::serving(WEIGHTS, SUBS));
        let scheduler =
            RefreshScheduler::new(Arc::clone(&store), fetcher, source(), Duration::from_secs(60));
        let checker = Checker::new(store).with_scheduler(scheduler.clone());

        // Bundled MOD10 rule rejects this account
        assert_eq!(checker.validate("200000", "58177632"), Ok(false));

        checker.refresh();
        for _ in 0..200 {
            if checker.refresh_status().and_then(|s| s.last_success).is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        // Remote MOD11 rule accepts it
        assert_eq!(checker.validate("200000", "58177632"), Ok(true));
        assert_eq!(checker.validate("200000", "58177633"), Ok(false));
        assert_eq!(checker.rule_count(), 2);
    }
}
