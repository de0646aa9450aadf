//! Snapshot persistence.
//!
//! The service only depends on [`SnapshotStore`]; [`FsSnapshotStore`] keeps
//! one pretty-printed JSON file per snapshot, named `{phase}_{name}.json`.

use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::warn;
use ui_spy_core::model::ScreenSnapshot;

use crate::error::ServiceError;

const EXTENSION: &str = "json";

pub trait SnapshotStore: Send + Sync {
    /// Persists `snapshot` under its key and returns the stored file name.
    fn save(&self, snapshot: &ScreenSnapshot) -> Result<String, ServiceError>;

    /// Stored file names, sorted. Empty when nothing was saved yet.
    fn list(&self) -> Result<Vec<String>, ServiceError>;

    /// Loads by file name, with or without the `.json` extension.
    fn load(&self, file_name: &str) -> Result<Option<ScreenSnapshot>, ServiceError>;
}

/// Appends `.json` unless already present (case-insensitive).
pub fn with_extension(file_name: &str) -> String {
    let has_ext = Path::new(file_name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(EXTENSION));
    if has_ext {
        file_name.to_string()
    } else {
        format!("{}.{}", file_name, EXTENSION)
    }
}

/// Rejects anything that could escape the snapshot directory.
pub fn validate_component(value: &str) -> Result<(), ServiceError> {
    if value.is_empty() || value.contains(['/', '\\']) || value.contains("..") {
        return Err(ServiceError::InvalidSnapshotName(value.to_string()));
    }
    Ok(())
}

pub struct FsSnapshotStore {
    dir: PathBuf,
}

impl FsSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_dir(&self) -> Result<(), ServiceError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            ServiceError::persistence(
                "create_dir",
                format!("Failed to create directory '{}': {}", self.dir.display(), e),
            )
        })
    }
}

impl SnapshotStore for FsSnapshotStore {
    fn save(&self, snapshot: &ScreenSnapshot) -> Result<String, ServiceError> {
        validate_component(&snapshot.phase)?;
        validate_component(&snapshot.name)?;
        self.ensure_dir()?;

        let file_name = with_extension(&snapshot.key());
        let path = self.dir.join(&file_name);
        let temp_path = path.with_extension("json.tmp");

        let file = File::create(&temp_path).map_err(|e| {
            ServiceError::persistence(
                "create_temp",
                format!("Failed to create temp file '{}': {}", temp_path.display(), e),
            )
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, snapshot)
            .map_err(|e| ServiceError::persistence("write_json", e))?;
        writer
            .flush()
            .map_err(|e| ServiceError::persistence("flush", e))?;
        drop(writer);

        fs::rename(&temp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            ServiceError::persistence(
                "rename",
                format!("Failed to move snapshot into '{}': {}", path.display(), e),
            )
        })?;

        debug!(file = %file_name, "Snapshot saved");
        Ok(file_name)
    }

    fn list(&self) -> Result<Vec<String>, ServiceError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ServiceError::persistence("read_dir", e)),
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| {
                Path::new(name)
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(EXTENSION))
            })
            .collect();
        names.sort();
        Ok(names)
    }

    fn load(&self, file_name: &str) -> Result<Option<ScreenSnapshot>, ServiceError> {
        validate_component(file_name)?;
        let path = self.dir.join(with_extension(file_name));

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ServiceError::persistence("open", e)),
        };

        match serde_json::from_reader(BufReader::new(file)) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Snapshot file corrupted");
                Err(ServiceError::persistence(
                    "read_json",
                    format!("'{}' is not a valid snapshot: {}", path.display(), e),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ui_spy_core::model::AbstractControl;
    use ui_spy_core::model::ControlKind;
    use ui_spy_core::model::ControlState;
    use ui_spy_core::model::ControlVisual;

    fn snapshot(name: &str, phase: &str) -> ScreenSnapshot {
        ScreenSnapshot {
            name: name.to_string(),
            phase: phase.to_string(),
            page_name: Some("LoginPage".to_string()),
            timestamp: Utc::now(),
            controls: vec![AbstractControl {
                id: "Submit".to_string(),
                kind: ControlKind::ActionButton,
                label: Some("Sign in".to_string()),
                native_type: Some("Button".to_string()),
                state: ControlState::default(),
                visual: ControlVisual::default(),
                children: Vec::new(),
            }],
        }
    }

    #[test]
    fn test_list_is_empty_when_dir_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsSnapshotStore::new(tmp.path().join("never-created"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load_with_and_without_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsSnapshotStore::new(tmp.path().join("Snapshots"));
        let original = snapshot("login", "baseline");

        let file_name = store.save(&original).unwrap();
        assert_eq!(file_name, "baseline_login.json");

        let bare = store.load("baseline_login").unwrap().unwrap();
        let full = store.load("baseline_login.json").unwrap().unwrap();
        assert_eq!(bare, original);
        assert_eq!(full.controls, original.controls);
    }

    #[test]
    fn test_list_is_sorted_and_ignores_other_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsSnapshotStore::new(tmp.path());
        store.save(&snapshot("b", "migrated")).unwrap();
        store.save(&snapshot("a", "baseline")).unwrap();
        fs::write(tmp.path().join("notes.txt"), "ignore me").unwrap();

        assert_eq!(
            store.list().unwrap(),
            vec!["baseline_a.json".to_string(), "migrated_b.json".to_string()]
        );
    }

    #[test]
    fn test_save_replaces_existing() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsSnapshotStore::new(tmp.path());
        store.save(&snapshot("login", "baseline")).unwrap();

        let mut updated = snapshot("login", "baseline");
        updated.page_name = Some("HomePage".to_string());
        store.save(&updated).unwrap();

        let loaded = store.load("baseline_login").unwrap().unwrap();
        assert_eq!(loaded.page_name.as_deref(), Some("HomePage"));
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_snapshot_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsSnapshotStore::new(tmp.path());
        assert!(store.load("nope").unwrap().is_none());
    }

    #[test]
    fn test_path_escape_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsSnapshotStore::new(tmp.path());
        assert!(matches!(
            store.save(&snapshot("../evil", "baseline")),
            Err(ServiceError::InvalidSnapshotName(_))
        ));
        assert!(matches!(
            store.load("../../etc/passwd"),
            Err(ServiceError::InvalidSnapshotName(_))
        ));
    }

    #[test]
    fn test_corrupted_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsSnapshotStore::new(tmp.path());
        fs::write(tmp.path().join("baseline_bad.json"), "{not json").unwrap();
        assert!(matches!(
            store.load("baseline_bad"),
            Err(ServiceError::Persistence { .. })
        ));
    }
}
