//! Loading the snapshot that ships with the deployment
//!
//! A missing weight table leaves the store empty and every sort code
//! fails open. A missing substitution table only disables exception 5
//! substitution. Neither stops the process.

use std::path::{Path, PathBuf};

use crate::rules::RuleSnapshot;

/// Locations of the bundled tables
#[derive(Debug, Clone)]
pub struct BundledTables {
    /// Weight table path
    pub weights: PathBuf,

    /// Substitution table path
    pub substitutions: PathBuf,
}

impl BundledTables {
    /// Create from the two table paths
    pub fn new(weights: impl Into<PathBuf>, substitutions: impl Into<PathBuf>) -> Self {
        Self {
            weights: weights.into(),
            substitutions: substitutions.into(),
        }
    }

    /// Read and parse both tables
    pub fn load(&self) -> RuleSnapshot {
        let weights = match read_table(&self.weights) {
            Some(text) => text,
            None => {
                tracing::error!(
                    path = %self.weights.display(),
                    "weight table unavailable; all sort codes will pass unchecked"
                );
                String::new()
            }
        };

        let substitutions = match read_table(&self.substitutions) {
            Some(text) => text,
            None => {
                tracing::warn!(
                    path = %self.substitutions.display(),
                    "substitution table unavailable; continuing without substitutions"
                );
                String::new()
            }
        };

        let snapshot = RuleSnapshot::from_tables(&weights, &substitutions);
        tracing::info!(
            rules = snapshot.rule_count(),
            substitutions = snapshot.substitution_count(),
            "bundled tables loaded"
        );
        snapshot
    }
}

fn read_table(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "failed to read table");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_both_tables() {
        let dir = tempfile::tempdir().unwrap();
        let weights = write_file(
            &dir,
            "valacdos.txt",
            "200000 200099 MOD11 0 0 0 0 0 0 7 5 8 3 4 6 2 1\n",
        );
        let subs = write_file(&dir, "scsubtab.txt", "938600 938611\n");

        let snapshot = BundledTables::new(weights, subs).load();
        assert_eq!(snapshot.rule_count(), 1);
        assert_eq!(snapshot.substitute("938600"), "938611");
    }

    #[test]
    fn test_missing_substitutions_is_soft() {
        let dir = tempfile::tempdir().unwrap();
        let weights = write_file(
            &dir,
            "valacdos.txt",
            "200000 200099 MOD11 0 0 0 0 0 0 7 5 8 3 4 6 2 1\n",
        );

        let snapshot = BundledTables::new(weights, dir.path().join("missing.txt")).load();
        assert_eq!(snapshot.rule_count(), 1);
        assert_eq!(snapshot.substitution_count(), 0);
    }

    #[test]
    fn test_missing_weights_gives_empty_rules() {
        let dir = tempfile::tempdir().unwrap();
        let subs = write_file(&dir, "scsubtab.txt", "938600 938611\n");

        let snapshot = BundledTables::new(dir.path().join("missing.txt"), subs).load();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.substitution_count(), 1);
    }
}
