//! File-backed Session Store
//!
//! Each subject owns two JSON files in the data directory:
//! `<subject>_session.json` holds its [`CourseRecord`] and
//! `<subject>_progress.json` the sorted list of completed days. Writes are
//! whole-file overwrites; one process is assumed to own the directory.

use anyhow::{Context, Result};
use coach_core::course::CourseRecord;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const SESSION_SUFFIX: &str = "_session.json";
const PROGRESS_SUFFIX: &str = "_progress.json";

#[derive(Clone, Debug)]
pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn session_path(&self, subject: &str) -> PathBuf {
        self.root.join(format!("{subject}{SESSION_SUFFIX}"))
    }

    fn progress_path(&self, subject: &str) -> PathBuf {
        self.root.join(format!("{subject}{PROGRESS_SUFFIX}"))
    }

    /// Overwrites the subject's course file.
    pub async fn save_course(&self, subject: &str, course: &CourseRecord) -> Result<()> {
        let path = self.session_path(subject);
        let json = serde_json::to_vec(course)?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(subject, path = %path.display(), "Course saved");
        Ok(())
    }

    /// Reads the subject's course file, `None` if it does not exist.
    pub async fn load_course(&self, subject: &str) -> Result<Option<CourseRecord>> {
        let path = self.session_path(subject);
        read_json(&path).await
    }

    /// Loads every `*_session.json` in the data directory, keyed by subject.
    ///
    /// Files that cannot be read or parsed are skipped.
    pub async fn load_all_courses(&self) -> Result<BTreeMap<String, CourseRecord>> {
        let mut courses = BTreeMap::new();
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(courses),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to list {}", self.root.display()));
            }
        };

        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(subject) = file_name
                .to_str()
                .and_then(|name| name.strip_suffix(SESSION_SUFFIX))
            else {
                continue;
            };
            if subject.is_empty() {
                continue;
            }
            match self.load_course(subject).await {
                Ok(Some(course)) => {
                    courses.insert(subject.to_string(), course);
                }
                Ok(None) => {}
                Err(e) => warn!(subject, error = ?e, "Skipping unreadable course file"),
            }
        }
        Ok(courses)
    }

    /// Overwrites the subject's completed-day list.
    pub async fn save_progress(&self, subject: &str, days: &BTreeSet<u32>) -> Result<()> {
        let path = self.progress_path(subject);
        let days: Vec<u32> = days.iter().copied().collect();
        tokio::fs::write(&path, serde_json::to_vec(&days)?)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(subject, completed = days.len(), "Progress saved");
        Ok(())
    }

    /// Completed days for the subject, empty if nothing was recorded yet.
    pub async fn load_progress(&self, subject: &str) -> Result<BTreeSet<u32>> {
        let path = self.progress_path(subject);
        let days: Option<Vec<u32>> = read_json(&path).await?;
        Ok(days.unwrap_or_default().into_iter().collect())
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };
    let value = serde_json::from_slice(&bytes)
        .with_context(|| format!("Malformed JSON in {}", path.display()))?;
    Ok(Some(value))
}
