use crate::error::{HarvestError, Result};
use crate::scanner::SourceFile;
use std::path::PathBuf;
use url::Url;

/// Folder that receives the images of `source`: a sibling named after the
/// file without its final extension.
pub fn target_folder_for(source: &SourceFile) -> PathBuf {
    let parent = source
        .path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_default();

    parent.join(source.base_name())
}

/// Name of the file an image URL is saved under: its last path segment.
///
/// Two URLs ending in the same segment map to the same file.
pub fn image_file_name(url: &Url) -> Result<String> {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");

    if segment.is_empty() {
        return Err(HarvestError::MissingFileName {
            url: url.to_string(),
        });
    }

    // Escapes that do not decode to UTF-8 leave the segment as written
    let decoded = urlencoding::decode(segment)
        .map(|name| name.into_owned())
        .unwrap_or_else(|_| segment.to_string());

    Ok(sanitize_filename(&decoded))
}

// Cross-platform filename sanitization
pub fn sanitize_filename(name: &str) -> String {
    let mut sanitized = String::new();

    for ch in name.chars() {
        match ch {
            // Windows/Unix reserved characters
            '<' | '>' | ':' | '"' | '|' | '?' | '*' => sanitized.push('_'),
            // Path separators
            '/' | '\\' => sanitized.push('_'),
            // Control characters
            c if c.is_control() => sanitized.push('_'),
            c => sanitized.push(c),
        }
    }

    // Trim dots and spaces (problematic on Windows)
    let sanitized = sanitized.trim_end_matches(&['.', ' '][..]).to_string();

    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        "unnamed_image".to_string()
    } else {
        sanitized
    }
}
