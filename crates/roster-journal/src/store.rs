//! Journal storage: trait + file-system implementation.
//!
//! Entries are stored as JSON files organized by date:
//! ```text
//! {root}/
//!   2026/
//!     10/
//!       17/
//!         {entry_id}.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};

use crate::{JournalEntry, JournalId, Outcome};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Integrity check failed for journal entry {0}: stored hash does not match content")]
    IntegrityViolation(JournalId),

    #[error("Journal entry has no content hash (not finalized)")]
    NotFinalized,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Filters for listing journal entries.
#[derive(Debug, Default)]
pub struct JournalQuery {
    pub character_id: Option<i64>,
    pub outcome: Option<Outcome>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl JournalQuery {
    fn matches(&self, entry: &JournalEntry) -> bool {
        self.character_id.map_or(true, |c| c == entry.character_id)
            && (self.outcome.is_none() || self.outcome == entry.outcome)
            && self.from.map_or(true, |from| entry.started_at >= from)
            && self.to.map_or(true, |to| entry.started_at <= to)
    }

    fn covers_day(&self, day: NaiveDate) -> bool {
        self.from.map_or(true, |from| day >= from.date_naive())
            && self.to.map_or(true, |to| day <= to.date_naive())
    }
}

pub trait JournalStore {
    /// Store a finalized entry. Unfinalized entries are rejected.
    fn save(&self, entry: &JournalEntry) -> Result<(), StoreError>;

    /// List matching entries, newest first, verifying each one's integrity.
    fn list(&self, query: &JournalQuery) -> Result<Vec<JournalEntry>, StoreError>;
}

pub struct FileJournalStore {
    root: PathBuf,
}

impl FileJournalStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn entry_path(&self, entry: &JournalEntry) -> PathBuf {
        let date = entry.started_at.format("%Y/%m/%d");
        self.root.join(format!("{}/{}.json", date, entry.id.0))
    }

    /// Day directories under the root, skipping anything not shaped `YYYY/MM/DD`.
    fn day_dirs(&self) -> Result<Vec<(NaiveDate, PathBuf)>, StoreError> {
        let mut days = Vec::new();
        for year in subdirs(&self.root)? {
            for month in subdirs(&year)? {
                for day in subdirs(&month)? {
                    let stamp = [&year, &month, &day]
                        .map(|p| p.file_name().map(|n| n.to_string_lossy()).unwrap_or_default())
                        .join("-");
                    if let Ok(date) = NaiveDate::parse_from_str(&stamp, "%Y-%m-%d") {
                        days.push((date, day));
                    }
                }
            }
        }
        Ok(days)
    }
}

fn subdirs(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)?.flatten() {
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    Ok(dirs)
}

impl JournalStore for FileJournalStore {
    fn save(&self, entry: &JournalEntry) -> Result<(), StoreError> {
        if entry.content_hash.is_none() {
            return Err(StoreError::NotFinalized);
        }

        let path = self.entry_path(entry);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(entry)?;
        fs::write(&path, json)?;

        tracing::debug!(
            journal_id = %entry.id,
            path = %path.display(),
            "Journal entry saved"
        );

        Ok(())
    }

    fn list(&self, query: &JournalQuery) -> Result<Vec<JournalEntry>, StoreError> {
        let mut results = Vec::new();
        for (_, dir) in self.day_dirs()?.into_iter().filter(|(d, _)| query.covers_day(*d)) {
            for file in fs::read_dir(&dir)?.flatten() {
                let path = file.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                let entry: JournalEntry = serde_json::from_str(&fs::read_to_string(&path)?)?;
                if !entry.verify_integrity() {
                    return Err(StoreError::IntegrityViolation(entry.id));
                }
                if query.matches(&entry) {
                    results.push(entry);
                }
            }
        }
        results.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(results)
    }
}
