use crate::config::ScanConfig;
use std::path::Path;

/// Decides which directory entries count as source files.
pub struct SourceFilter {
    source_extensions: Vec<String>,
}

impl SourceFilter {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            source_extensions: config
                .source_extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
        }
    }

    pub fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| self.source_extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }

    pub fn get_extensions(&self) -> &Vec<String> {
        &self.source_extensions
    }
}

impl Default for SourceFilter {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_file_detection() {
        let filter = SourceFilter::default();

        assert!(filter.is_source_file(Path::new("links.txt")));
        assert!(filter.is_source_file(Path::new("export.csv")));
        assert!(filter.is_source_file(Path::new("server.log")));
        assert!(filter.is_source_file(Path::new("letter.rtf")));

        assert!(!filter.is_source_file(Path::new("README.md")));
        assert!(!filter.is_source_file(Path::new("photo.png")));
        assert!(!filter.is_source_file(Path::new("notes")));
        assert!(!filter.is_source_file(Path::new("archive.txt.gz")));
    }

    #[test]
    fn test_case_insensitive_extensions() {
        let filter = SourceFilter::default();

        assert!(filter.is_source_file(Path::new("LINKS.TXT")));
        assert!(filter.is_source_file(Path::new("Data.Csv")));
        assert!(filter.is_source_file(Path::new("app.LOG")));
    }

    #[test]
    fn test_hidden_file_without_extension() {
        let filter = SourceFilter::default();

        // ".txt" has a file stem and no extension as far as the filesystem is concerned
        assert!(!filter.is_source_file(Path::new(".txt")));
    }

    #[test]
    fn test_custom_extensions() {
        let config = ScanConfig {
            source_extensions: vec!["MD".to_string()],
            ..ScanConfig::default()
        };
        let filter = SourceFilter::new(&config);

        assert!(filter.is_source_file(Path::new("notes.md")));
        assert!(!filter.is_source_file(Path::new("notes.txt")));
        assert_eq!(filter.get_extensions(), &vec!["md".to_string()]);
    }
}
