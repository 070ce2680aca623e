use crate::config::ScanConfig;
use crate::error::{HarvestError, Result};
use crate::scanner::file_filter::SourceFilter;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub filename: String,
    pub extension: String,
    pub size: u64,
}

impl SourceFile {
    pub fn new(path: PathBuf, size: u64) -> Self {
        // Lossy only for display; folder names come from the raw path
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        Self {
            path,
            filename,
            extension,
            size,
        }
    }

    /// File name with its final extension removed, as the OS spells it.
    pub fn base_name(&self) -> &OsStr {
        self.path
            .file_stem()
            .or_else(|| self.path.file_name())
            .unwrap_or(self.path.as_os_str())
    }
}

/// Fails unless `path` exists and is a directory.
pub fn validate_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(HarvestError::InvalidDirectory {
            path: path.display().to_string(),
        });
    }

    if !path.is_dir() {
        return Err(HarvestError::InvalidDirectory {
            path: format!("{} is not a directory", path.display()),
        });
    }

    Ok(())
}

pub struct SourceCollector {
    filter: SourceFilter,
}

impl SourceCollector {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            filter: SourceFilter::new(config),
        }
    }

    /// Lists eligible files directly inside `directory`, sorted by name.
    ///
    /// Unreadable entries are left out; a directory that cannot be listed at
    /// all produces an empty list.
    pub fn collect<P: AsRef<Path>>(&self, directory: P) -> Vec<SourceFile> {
        let directory = directory.as_ref();

        let walker = WalkDir::new(directory)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        let mut sources: Vec<SourceFile> = walker
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => self.to_source_file(&entry),
                Err(err) => {
                    tracing::debug!("skipping unreadable entry in {}: {}", directory.display(), err);
                    None
                }
            })
            .collect();

        // walkdir sorts by OsStr; keep the order stable across platforms too
        sources.sort_by(|a, b| a.filename.cmp(&b.filename));

        tracing::debug!(
            "collected {} source files from {}",
            sources.len(),
            directory.display()
        );

        sources
    }

    pub fn get_extensions(&self) -> &Vec<String> {
        self.filter.get_extensions()
    }

    fn to_source_file(&self, entry: &DirEntry) -> Option<SourceFile> {
        if !entry.file_type().is_file() || !self.filter.is_source_file(entry.path()) {
            return None;
        }

        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        Some(SourceFile::new(entry.path().to_path_buf(), size))
    }
}

impl Default for SourceCollector {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}
