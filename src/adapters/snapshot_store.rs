//! Snapshot Store
//!
//! Persists snapshot documents as pretty-printed JSON, one file per run,
//! named `holders_<chain>_<YYYYmmdd_HHMMSS>.json`. Files are written to a
//! temporary name and renamed into place so readers never see partial data.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::{shift_decimals, Chain, SnapshotDocument};

/// Default snapshot directory
pub const DEFAULT_SNAPSHOT_DIR: &str = "snapshots";

const FILE_PREFIX: &str = "holders";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Error, Debug, Clone)]
pub enum PersistError {
    #[error("Failed to serialize snapshot: {0}")]
    SerializationError(String),

    #[error("Failed to deserialize snapshot: {0}")]
    DeserializationError(String),

    #[error("Failed to write snapshot file: {0}")]
    WriteError(String),

    #[error("Failed to read snapshot file: {0}")]
    ReadError(String),

    #[error("Snapshot file is corrupted: {0}")]
    CorruptedFile(String),

    #[error("Failed to create directory: {0}")]
    DirectoryError(String),
}

/// Directory of snapshot files
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for a snapshot of `chain` taken at the document's timestamp
    pub fn file_name(snapshot: &SnapshotDocument) -> String {
        format!(
            "{}_{}_{}.json",
            FILE_PREFIX,
            snapshot.blockchain(),
            snapshot.timestamp().format(TIMESTAMP_FORMAT)
        )
    }

    /// Write `snapshot` and return the path of the new file
    pub fn save(&self, snapshot: &SnapshotDocument) -> Result<PathBuf, PersistError> {
        fs::create_dir_all(&self.dir).map_err(|e| PersistError::DirectoryError(e.to_string()))?;

        let path = self.unused_path(&Self::file_name(snapshot));
        let tmp_path = path.with_extension("json.tmp");

        let content = serde_json::to_string_pretty(snapshot)
            .map_err(|e| PersistError::SerializationError(e.to_string()))?;

        fs::write(&tmp_path, content).map_err(|e| PersistError::WriteError(e.to_string()))?;
        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(PersistError::WriteError(e.to_string()));
        }

        tracing::info!(
            "Snapshot saved: {} ({} holders)",
            path.display(),
            snapshot.holder_count()
        );

        Ok(path)
    }

    /// Load and sanity-check a snapshot file
    pub fn load(path: &Path) -> Result<SnapshotDocument, PersistError> {
        let content = fs::read_to_string(path).map_err(|e| PersistError::ReadError(e.to_string()))?;

        if content.trim().is_empty() {
            return Err(PersistError::CorruptedFile(format!("{} is empty", path.display())));
        }

        let snapshot: SnapshotDocument = serde_json::from_str(&content)
            .map_err(|e| PersistError::DeserializationError(e.to_string()))?;

        if !snapshot.is_consistent() {
            return Err(PersistError::CorruptedFile(format!(
                "holder_count {} does not match {} holders",
                snapshot.holder_count(),
                snapshot.holders().len()
            )));
        }

        for holder in snapshot.holders() {
            let expected = shift_decimals(holder.balance_raw(), snapshot.decimals())
                .map_err(|e| PersistError::CorruptedFile(format!("{}: {}", holder.address(), e)))?;
            if expected != holder.balance() {
                return Err(PersistError::CorruptedFile(format!(
                    "balance {} of {} does not match balance_raw {} at {} decimals",
                    holder.balance(),
                    holder.address(),
                    holder.balance_raw(),
                    snapshot.decimals()
                )));
            }
        }

        tracing::debug!("Snapshot loaded: {}", path.display());
        Ok(snapshot)
    }

    /// Snapshot files for `chain`, oldest first
    pub fn list(&self, chain: Chain) -> Result<Vec<PathBuf>, PersistError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let prefix = format!("{}_{}_", FILE_PREFIX, chain);
        let entries = fs::read_dir(&self.dir).map_err(|e| PersistError::ReadError(e.to_string()))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| name.starts_with(&prefix) && name.ends_with(".json"))
            })
            .collect();

        // Timestamps are zero-padded, so lexical order is chronological
        paths.sort();
        Ok(paths)
    }

    /// Most recent snapshot file for `chain`
    pub fn latest(&self, chain: Chain) -> Result<Option<PathBuf>, PersistError> {
        Ok(self.list(chain)?.pop())
    }

    /// `name`, or `name` with a numeric suffix if a file already exists
    fn unused_path(&self, name: &str) -> PathBuf {
        let candidate = self.dir.join(name);
        if !candidate.exists() {
            return candidate;
        }

        let stem = name.trim_end_matches(".json");
        (1u32..)
            .map(|n| self.dir.join(format!("{}_{}.json", stem, n)))
            .find(|path| !path.exists())
            .unwrap_or(candidate)
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(DEFAULT_SNAPSHOT_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HolderRecord;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn snapshot(chain: Chain, second: u32) -> SnapshotDocument {
        let holders = vec![
            HolderRecord::new(
                "0xF977814e90dA44bFA03b6295A0616a897441aceC",
                "1500000000000000000",
                18,
                "Binance Hot Wallet",
            )
            .unwrap(),
            HolderRecord::new("0x1111111111111111111111111111111111111111", "42", 18, "").unwrap(),
        ];

        SnapshotDocument::new(
            Utc.with_ymd_and_hms(2026, 10, 19, 12, 30, second).unwrap(),
            "0x0E09FaBB73Bd3Ade0a17ECC321fD13a19e81cE82",
            chain,
            None,
            18,
            Some(2.5),
            holders,
        )
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            SnapshotStore::file_name(&snapshot(Chain::Bsc, 5)),
            "holders_bsc_20261019_123005.json"
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("nested"));
        let original = snapshot(Chain::Eth, 0);

        let path = store.save(&original).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let loaded = SnapshotStore::load(&path).unwrap();
        assert_eq!(loaded, original);
        assert_eq!(loaded.holder_count(), 2);
    }

    #[test]
    fn test_save_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());
        let doc = snapshot(Chain::Bsc, 0);

        let first = store.save(&doc).unwrap();
        let second = store.save(&doc).unwrap();
        assert_ne!(first, second);
        assert!(second.to_string_lossy().ends_with("holders_bsc_20261019_123000_1.json"));
    }

    #[test]
    fn test_list_and_latest() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());

        store.save(&snapshot(Chain::Bsc, 10)).unwrap();
        let newest = store.save(&snapshot(Chain::Bsc, 20)).unwrap();
        store.save(&snapshot(Chain::Eth, 30)).unwrap();

        assert_eq!(store.list(Chain::Bsc).unwrap().len(), 2);
        assert_eq!(store.list(Chain::Eth).unwrap().len(), 1);
        assert_eq!(store.latest(Chain::Bsc).unwrap(), Some(newest));
        assert_eq!(store.latest(Chain::Polygon).unwrap(), None);
    }

    #[test]
    fn test_list_missing_dir() {
        let store = SnapshotStore::new("/nonexistent/snapshots/dir");
        assert!(store.list(Chain::Bsc).unwrap().is_empty());
    }

    #[test]
    fn test_load_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("holders_bsc_empty.json");
        fs::write(&path, "  ").unwrap();
        assert!(matches!(SnapshotStore::load(&path), Err(PersistError::CorruptedFile(_))));
    }

    #[test]
    fn test_load_inconsistent_count() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("holders_bsc_bad.json");

        let mut json = serde_json::to_value(snapshot(Chain::Bsc, 0)).unwrap();
        json["holder_count"] = serde_json::json!(99);
        fs::write(&path, json.to_string()).unwrap();

        assert!(matches!(SnapshotStore::load(&path), Err(PersistError::CorruptedFile(_))));
    }

    #[test]
    fn test_load_rejects_edited_balance() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("holders_bsc_edited.json");

        let mut json = serde_json::to_value(snapshot(Chain::Bsc, 0)).unwrap();
        json["holders"][0]["balance"] = serde_json::json!("15");
        fs::write(&path, json.to_string()).unwrap();

        let err = SnapshotStore::load(&path).unwrap_err();
        assert!(matches!(err, PersistError::CorruptedFile(_)));
        assert!(err.to_string().contains("balance_raw 1500000000000000000"));
    }

    #[test]
    fn test_load_rejects_non_integer_raw_balance() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("holders_bsc_raw.json");

        let mut json = serde_json::to_value(snapshot(Chain::Bsc, 0)).unwrap();
        json["holders"][1]["balance_raw"] = serde_json::json!("4.2");
        fs::write(&path, json.to_string()).unwrap();

        assert!(matches!(SnapshotStore::load(&path), Err(PersistError::CorruptedFile(_))));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            SnapshotStore::load(Path::new("/nonexistent/holders.json")),
            Err(PersistError::ReadError(_))
        ));
    }
}
