//! Persisted set of previously-posted article titles.
//!
//! The store is the only state that survives between runs: a JSON array of
//! title strings. It is loaded once at pipeline start and rewritten once at
//! pipeline end, so a crash mid-run loses that run's additions but never
//! corrupts the file. Single process, single writer; concurrent runs would
//! race.

use std::collections::HashSet;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Titles already posted to the channel, keyed for exact-match lookup.
#[derive(Debug)]
pub struct PostedTitles {
    titles: HashSet<String>,
    path: PathBuf,
}

impl PostedTitles {
    /// Load the store from `path`.
    ///
    /// A missing file means a first run and an unreadable or malformed file
    /// means lost history; both are treated as an empty store rather than an
    /// error, so the pipeline never fails to start over its own state file.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let titles = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Vec<String>>(&contents) {
                Ok(list) => list.into_iter().collect(),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Posted-titles file is not valid JSON; starting empty");
                    HashSet::new()
                }
            },
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No posted-titles file; starting empty");
                HashSet::new()
            }
        };

        info!(path = %path.display(), count = titles.len(), "Loaded posted titles");
        Self { titles, path }
    }

    /// Whether `title` was posted by an earlier run (or earlier this run).
    pub fn contains(&self, title: &str) -> bool {
        self.titles.contains(title)
    }

    /// Record `title` as posted. Returns false if it was already present.
    pub fn insert(&mut self, title: String) -> bool {
        self.titles.insert(title)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Rewrite the whole store to disk as a JSON array.
    ///
    /// Titles are sorted so the file is stable across runs despite the
    /// unordered in-memory set. serde_json writes non-ASCII characters
    /// literally, so titles with em-dashes or CJK text stay readable in the
    /// file.
    pub fn save(&self) -> Result<(), Box<dyn Error>> {
        let mut sorted: Vec<&String> = self.titles.iter().collect();
        sorted.sort();

        let json = serde_json::to_string_pretty(&sorted)?;
        fs::write(&self.path, json)?;
        info!(path = %self.path.display(), count = self.titles.len(), "Saved posted titles");
        Ok(())
    }
}
