//! Note summaries and their local archive

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::DomainError;

/// One generated summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub title: String,
    pub date: NaiveDate,
    pub summary: String,
}

/// Append-only JSONL file of summaries
pub struct SummaryArchive {
    path: PathBuf,
}

impl SummaryArchive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the file and its directory as needed
    pub fn append(&self, record: &SummaryRecord) -> Result<(), DomainError> {
        debug!(path = ?self.path, title = %record.title, "SummaryArchive::append: called");
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let line = serde_json::to_string(record)?;
        writeln!(file, "{}", line)?;
        info!("Archived summary '{}' to {}", record.title, self.path.display());
        Ok(())
    }

    /// All records in insertion order; a missing file is an empty archive
    pub fn list(&self) -> Result<Vec<SummaryRecord>, DomainError> {
        debug!(path = ?self.path, "SummaryArchive::list: called");
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.path)?;
        let mut records = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(record) => records.push(record),
                Err(e) => warn!(line = idx + 1, error = %e, "SummaryArchive::list: skipping corrupt line"),
            }
        }
        Ok(records)
    }
}
