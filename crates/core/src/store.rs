//! Rule store with immutable snapshot + ArcSwap
//!
//! Readers load the current snapshot without locking; the single writer
//! swaps in a freshly built snapshot. A reader holding an old snapshot keeps
//! it alive until it is done.

use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::engine;
use crate::error::Result;
use crate::rules::RuleSnapshot;

/// Holder of the active rule snapshot
#[derive(Debug)]
pub struct RuleStore {
    /// Current snapshot (swapped atomically)
    snapshot: ArcSwap<RuleSnapshot>,

    /// Set once a non-empty snapshot has been installed; never cleared
    ready: AtomicBool,
}

impl RuleStore {
    /// Create a store holding an empty snapshot
    pub fn new() -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(RuleSnapshot::default()),
            ready: AtomicBool::new(false),
        }
    }

    /// Create a store with an initial snapshot installed
    pub fn with_snapshot(snapshot: RuleSnapshot) -> Self {
        let store = Self::new();
        store.replace(snapshot);
        store
    }

    /// Get the current snapshot (lock-free)
    #[inline]
    pub fn current(&self) -> Arc<RuleSnapshot> {
        self.snapshot.load_full()
    }

    /// Install a new snapshot
    ///
    /// # Performance
    /// Single pointer swap; in-flight readers finish on the old snapshot
    pub fn replace(&self, snapshot: RuleSnapshot) {
        let non_empty = !snapshot.is_empty();
        let rules = snapshot.rule_count();
        let substitutions = snapshot.substitution_count();

        self.snapshot.store(Arc::new(snapshot));
        if non_empty {
            self.ready.store(true, Ordering::Release);
        }

        tracing::info!(rules, substitutions, "rule snapshot installed");
    }

    /// True once any non-empty snapshot has been installed
    pub fn ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Rule count of the current snapshot
    pub fn rule_count(&self) -> usize {
        self.snapshot.load().rule_count()
    }

    /// Validate against the current snapshot
    #[inline]
    pub fn validate(&self, sort_code: &str, account_number: &str) -> Result<bool> {
        let snapshot = self.snapshot.load();
        engine::validate(&snapshot, sort_code, account_number)
    }
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Algorithm, SubstitutionEntry, WeightRule, WEIGHT_COUNT};
    use std::thread;

    /// Snapshot whose rule count, substitution count and rule contents all
    /// encode the same generation number
    fn generation(n: u32) -> RuleSnapshot {
        let rules = (0..n)
            .map(|_| WeightRule::new(n, n, Algorithm::Mod10, [n as i32; WEIGHT_COUNT]))
            .collect();
        let subs = (0..n)
            .map(|i| SubstitutionEntry {
                from_sort_code: format!("{:06}", i),
                to_sort_code: format!("{:06}", n),
            })
            .collect();
        RuleSnapshot::new(rules, subs)
    }

    #[test]
    fn test_not_ready_until_rules_installed() {
        let store = RuleStore::new();
        assert!(!store.ready());
        assert_eq!(store.rule_count(), 0);

        store.replace(RuleSnapshot::default());
        assert!(!store.ready());

        store.replace(generation(3));
        assert!(store.ready());
        assert_eq!(store.rule_count(), 3);

        // Stays ready even if an empty snapshot follows
        store.replace(RuleSnapshot::default());
        assert!(store.ready());
        assert_eq!(store.rule_count(), 0);
    }

    #[test]
    fn test_old_snapshot_survives_replace() {
        let store = RuleStore::with_snapshot(generation(2));
        let held = store.current();

        store.replace(generation(5));

        assert_eq!(held.rule_count(), 2);
        assert_eq!(store.current().rule_count(), 5);
    }

    #[test]
    fn test_concurrent_reads_never_torn() {
        let store = Arc::new(RuleStore::with_snapshot(generation(1)));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..2_000 {
                        let snap = store.current();
                        let n = snap.rule_count() as u32;
                        assert_eq!(snap.substitution_count() as u32, n);
                        assert!(snap
                            .rules()
                            .iter()
                            .all(|r| r.range_start == n && r.weights == [n as i32; WEIGHT_COUNT]));
                    }
                })
            })
            .collect();

        for n in 2..50 {
            store.replace(generation(n));
        }

        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(store.rule_count(), 49);
    }
}
