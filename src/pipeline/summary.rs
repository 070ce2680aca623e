use crate::config::DownloadPolicy;
use crate::error::HarvestError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::time::{Duration, Instant};

/// Counters for one run. Owned and updated by the orchestrator only.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total_files: usize,
    pub files_processed: usize,
    pub images_downloaded: usize,
    pub images_skipped: usize,
    pub downloads_failed: usize,
    pub links_rejected: usize,
    pub files_failed: usize,
    pub folders_created: usize,
    pub bytes_written: u64,
    pub current_file: Option<String>,
    pub errors: Vec<String>,
    #[serde(skip)]
    start_time: Instant,
}

impl RunSummary {
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            files_processed: 0,
            images_downloaded: 0,
            images_skipped: 0,
            downloads_failed: 0,
            links_rejected: 0,
            files_failed: 0,
            folders_created: 0,
            bytes_written: 0,
            current_file: None,
            errors: Vec::new(),
            start_time: Instant::now(),
        }
    }

    pub fn start_file(&mut self, filename: &str) {
        self.current_file = Some(filename.to_string());
    }

    pub fn finish_file(&mut self) {
        self.files_processed += 1;
    }

    pub fn record_download(&mut self, bytes: u64) {
        self.images_downloaded += 1;
        self.bytes_written += bytes;
    }

    pub fn record_skip(&mut self) {
        self.images_skipped += 1;
    }

    pub fn record_failed_download(&mut self, error: &HarvestError) {
        self.downloads_failed += 1;
        self.add_error(error.to_string());
    }

    pub fn record_rejected_link(&mut self, error: &HarvestError) {
        self.links_rejected += 1;
        self.add_error(error.to_string());
    }

    pub fn record_file_failure(&mut self, error: &HarvestError) {
        self.files_failed += 1;
        self.add_error(error.to_string());
    }

    pub fn record_folder_created(&mut self) {
        self.folders_created += 1;
    }

    pub fn add_error<S: Into<String>>(&mut self, error: S) {
        self.errors.push(error.into());
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// One-line summary printed at the end of every run.
    pub fn headline(&self) -> String {
        format!(
            "Processed {} files, downloaded {} images",
            self.files_processed, self.images_downloaded
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub directory: String,
    pub policy: DownloadPolicy,
    pub summary: RunSummary,
    pub duration_ms: u128,
    pub completed_at: DateTime<Utc>,
}

impl RunReport {
    pub fn new(directory: &Path, policy: DownloadPolicy, summary: RunSummary) -> Self {
        Self {
            directory: directory.display().to_string(),
            policy,
            duration_ms: summary.elapsed().as_millis(),
            summary,
            completed_at: Utc::now(),
        }
    }
}
