//! Atomically swappable configuration state.

use arc_swap::ArcSwap;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::loader::{load_document, ConfigError};
use crate::config::registry::SchemaRegistry;
use crate::config::resolver::{resolve, IssueAction, Resolution, ResolutionIssue};
use crate::config::schema::AdminConfig;
use crate::config::snapshot::{ConfigSnapshot, SnapshotError};
use crate::observability::metrics;

/// Everything produced by one resolution pass.
#[derive(Debug, Clone)]
pub struct ResolvedState {
    pub snapshot: ConfigSnapshot,
    pub issues: Vec<ResolutionIssue>,
    /// Typed view over `snapshot`.
    pub config: AdminConfig,
}

impl ResolvedState {
    pub fn is_degraded(&self) -> bool {
        self.issues.iter().any(|i| i.action == IssueAction::Rejected)
    }
}

/// Holder of the current configuration.
///
/// Readers call [`ConfigStore::load`] and keep the returned `Arc` for as long
/// as they need a consistent view. A reload replaces the whole state.
pub struct ConfigStore {
    registry: Arc<SchemaRegistry>,
    path: Option<PathBuf>,
    state: ArcSwap<ResolvedState>,
}

impl ConfigStore {
    /// Resolve `document` and build a store that is not backed by a file.
    pub fn from_document(registry: Arc<SchemaRegistry>, document: &Value) -> Result<Self, SnapshotError> {
        let state = Self::build_state(&registry, document)?;
        Ok(Self {
            registry,
            path: None,
            state: ArcSwap::from_pointee(state),
        })
    }

    /// Load the document at `path`. An unreadable or malformed file is logged
    /// and the store starts from defaults.
    pub fn open(registry: Arc<SchemaRegistry>, path: &Path) -> Result<Self, SnapshotError> {
        let document = match load_document(path) {
            Ok(document) => document,
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "Failed to load configuration, starting from defaults"
                );
                Value::Object(Default::default())
            }
        };
        let mut store = Self::from_document(registry, &document)?;
        store.path = Some(path.to_path_buf());
        Ok(store)
    }

    fn build_state(registry: &SchemaRegistry, document: &Value) -> Result<ResolvedState, SnapshotError> {
        let resolution = resolve(document, registry);
        resolution.report();
        let config = AdminConfig::from_snapshot(&resolution.snapshot)?;
        let Resolution { snapshot, issues } = resolution;
        Ok(ResolvedState {
            snapshot,
            issues,
            config,
        })
    }

    /// Current state.
    pub fn load(&self) -> Arc<ResolvedState> {
        self.state.load_full()
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Resolve a new raw document and swap it in.
    pub fn apply(&self, document: &Value) -> Result<Arc<ResolvedState>, SnapshotError> {
        let state = Arc::new(Self::build_state(&self.registry, document)?);
        self.state.store(Arc::clone(&state));
        metrics::record_reload("applied");
        tracing::info!(
            issues = state.issues.len(),
            degraded = state.is_degraded(),
            "Configuration snapshot replaced"
        );
        Ok(state)
    }

    /// Re-read the backing file and apply it. On failure the current state
    /// is kept.
    pub fn reload(&self) -> Result<Arc<ResolvedState>, ConfigError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(self.load());
        };
        let document = load_document(path).inspect_err(|e| {
            metrics::record_reload("failed");
            tracing::error!(error = %e, "Failed to reload config. Keeping current configuration.");
        })?;
        match self.apply(&document) {
            Ok(state) => Ok(state),
            Err(e) => {
                metrics::record_reload("failed");
                tracing::error!(error = %e, "Resolved configuration unusable. Keeping current configuration.");
                Ok(self.load())
            }
        }
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("path", &self.path)
            .field("fields", &self.registry.field_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::builtin_registry;
    use serde_json::json;
    use std::io::Write;

    fn registry() -> Arc<SchemaRegistry> {
        Arc::new(builtin_registry().unwrap())
    }

    #[test]
    fn test_apply_swaps_whole_state() {
        let store = ConfigStore::from_document(registry(), &json!({})).unwrap();
        let before = store.load();
        store
            .apply(&json!({"general": {"serverName": "new"}}))
            .unwrap();
        let after = store.load();
        // Readers holding the old Arc still see the old snapshot
        assert_eq!(before.config.general.server_name, "change-me");
        assert_eq!(after.config.general.server_name, "new");
    }

    #[test]
    fn test_open_malformed_file_uses_defaults() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{ not json").unwrap();
        let store = ConfigStore::open(registry(), file.path()).unwrap();
        assert_eq!(store.load().config.general.language, "en");
    }

    #[test]
    fn test_reload_failure_keeps_state() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"general": {{"serverName": "first"}}}}"#).unwrap();
        file.flush().unwrap();
        let store = ConfigStore::open(registry(), file.path()).unwrap();
        assert_eq!(store.load().config.general.server_name, "first");

        std::fs::write(file.path(), "[oops").unwrap();
        assert!(store.reload().is_err());
        assert_eq!(store.load().config.general.server_name, "first");

        std::fs::write(file.path(), r#"{"general": {"serverName": "second"}}"#).unwrap();
        let state = store.reload().unwrap();
        assert_eq!(state.config.general.server_name, "second");
    }
}
