use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use crate::error::{Result, ShowcaseError};
use crate::types::ExampleRecord;

const PREFIX: &str = "found_examples_";
const LATEST: &str = "found_examples_latest.json";

/// JSON-array snapshot files under a data directory.
///
/// `found_examples_latest.json` is what readers see. Each crawl also leaves a
/// dated copy (`found_examples_YYYYMMDD.json`) behind.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    data_dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn latest_path(&self) -> PathBuf {
        self.data_dir.join(LATEST)
    }

    pub fn dated_path(&self, date: NaiveDate) -> PathBuf {
        self.data_dir
            .join(format!("{PREFIX}{}.json", date.format("%Y%m%d")))
    }

    /// Read the current snapshot: the latest file, else the newest dated file,
    /// else an empty list.
    pub fn load(&self) -> Result<Vec<ExampleRecord>> {
        let latest = self.latest_path();
        if latest.exists() {
            return read_records(&latest);
        }

        match self.newest_dated()? {
            Some(path) => {
                info!(path = %path.display(), "No latest snapshot, falling back to dated file");
                read_records(&path)
            }
            None => {
                debug!(dir = %self.data_dir.display(), "No snapshot found");
                Ok(Vec::new())
            }
        }
    }

    /// Write today's dated file and the latest file.
    pub fn save(&self, records: &[ExampleRecord]) -> Result<PathBuf> {
        self.save_on(records, Local::now().date_naive())
    }

    pub fn save_on(&self, records: &[ExampleRecord], date: NaiveDate) -> Result<PathBuf> {
        let dated = self.dated_path(date);
        write_records(&dated, records)?;
        write_records(&self.latest_path(), records)?;
        info!(count = records.len(), path = %dated.display(), "Snapshot saved");
        Ok(dated)
    }

    /// Rewrite only the latest file, used by in-place maintenance passes.
    pub fn overwrite_latest(&self, records: &[ExampleRecord]) -> Result<()> {
        write_records(&self.latest_path(), records)?;
        info!(count = records.len(), "Latest snapshot overwritten");
        Ok(())
    }

    fn newest_dated(&self) -> Result<Option<PathBuf>> {
        let entries = match fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&self.data_dir, e)),
        };

        let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !name.starts_with(PREFIX) || !name.ends_with(".json") || name == LATEST {
                continue;
            }
            let modified = match entry.metadata().and_then(|m| m.modified()) {
                Ok(t) => t,
                Err(e) => {
                    warn!(file = %name, error = %e, "Skipping snapshot with unreadable mtime");
                    continue;
                }
            };
            if newest.as_ref().map_or(true, |(t, _)| modified > *t) {
                newest = Some((modified, entry.path()));
            }
        }
        Ok(newest.map(|(_, path)| path))
    }
}

fn read_records(path: &Path) -> Result<Vec<ExampleRecord>> {
    let raw = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    serde_json::from_str(&raw).map_err(|source| ShowcaseError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn write_records(path: &Path, records: &[ExampleRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }
    let json = serde_json::to_string_pretty(records).map_err(|source| ShowcaseError::Parse {
        path: path.display().to_string(),
        source,
    })?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| io_error(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, source: std::io::Error) -> ShowcaseError {
    ShowcaseError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Platform;

    fn record(url: &str) -> ExampleRecord {
        ExampleRecord {
            title: "Café finder ☕".to_string(),
            original_url: url.to_string(),
            source_platform: Platform::YouTube,
            ..Default::default()
        }
    }

    #[test]
    fn empty_dir_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn missing_dir_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("nope"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_writes_dated_and_latest() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        let dated = store.save_on(&[record("https://a")], date).unwrap();

        assert!(dated.ends_with("found_examples_20250115.json"));
        assert!(dated.exists());
        assert!(store.latest_path().exists());

        let raw = fs::read_to_string(store.latest_path()).unwrap();
        assert!(raw.contains("Café finder ☕"), "non-ASCII kept verbatim");
        assert!(raw.contains("\n  "), "pretty printed");

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].original_url, "https://a");
    }

    #[test]
    fn falls_back_to_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        store.save_on(&[record("https://dated")], date).unwrap();
        fs::remove_file(store.latest_path()).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded[0].original_url, "https://dated");
    }

    #[test]
    fn overwrite_latest_leaves_dated_alone() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let dated = store.save_on(&[record("https://one")], date).unwrap();

        store
            .overwrite_latest(&[record("https://one"), record("https://two")])
            .unwrap();

        assert_eq!(store.load().unwrap().len(), 2);
        let dated_raw = fs::read_to_string(dated).unwrap();
        assert!(!dated_raw.contains("https://two"));
    }

    #[test]
    fn corrupt_latest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        fs::write(store.latest_path(), "{not json").unwrap();
        assert!(matches!(store.load(), Err(ShowcaseError::Parse { .. })));
    }
}
