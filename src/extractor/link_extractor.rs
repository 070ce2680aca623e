use crate::config::ScanConfig;
use crate::error::{HarvestError, Result};
use regex::Regex;
use std::fs;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use url::Url;

// Characters RFC 3986 never allows unescaped. `Url::parse` would quietly
// percent-encode them, which hides text that was not really a link.
const UNSAFE_URL_CHARS: &[char] = &['{', '}', '|', '\\', '^', '`'];

/// Links found in one piece of text, in the order they appeared.
#[derive(Debug, Default)]
pub struct LinkExtraction {
    pub links: Vec<Url>,
    pub rejected: Vec<HarvestError>,
}

impl LinkExtraction {
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    fn merge_line(&mut self, extractor: &LinkExtractor, line: &str) {
        for candidate in extractor.pattern.find_iter(line) {
            match parse_image_url(candidate.as_str()) {
                Ok(url) => self.links.push(url),
                Err(err) => {
                    tracing::debug!("rejected link candidate: {}", err);
                    self.rejected.push(err);
                }
            }
        }
    }
}

pub struct LinkExtractor {
    pattern: Regex,
}

impl LinkExtractor {
    pub fn new(config: &ScanConfig) -> Result<Self> {
        Ok(Self {
            pattern: build_link_pattern(&config.image_extensions)?,
        })
    }

    pub fn extract_from_str(&self, content: &str) -> LinkExtraction {
        let mut extraction = LinkExtraction::default();
        for line in content.lines() {
            extraction.merge_line(self, line);
        }
        extraction
    }

    /// Reads line by line; any read failure aborts the whole extraction.
    pub fn extract_from_reader<R: Read>(&self, reader: R) -> std::io::Result<LinkExtraction> {
        let mut extraction = LinkExtraction::default();
        for line in BufReader::new(reader).lines() {
            extraction.merge_line(self, &line?);
        }
        Ok(extraction)
    }

    pub fn extract_file(&self, path: &Path) -> Result<LinkExtraction> {
        let file = fs::File::open(path).map_err(|e| HarvestError::read(path, e))?;
        let extraction = self
            .extract_from_reader(file)
            .map_err(|e| HarvestError::read(path, e))?;

        tracing::debug!(
            "{}: {} links, {} rejected",
            path.display(),
            extraction.links.len(),
            extraction.rejected.len()
        );

        Ok(extraction)
    }
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self {
            pattern: build_link_pattern(&ScanConfig::default().image_extensions)
                .expect("default image extensions form a valid pattern"),
        }
    }
}

fn build_link_pattern(image_extensions: &[String]) -> Result<Regex> {
    let alternatives = image_extensions
        .iter()
        .map(|ext| regex::escape(ext))
        .collect::<Vec<_>>()
        .join("|");

    // Lazy body: stop at the first image extension so trailing text and
    // neighbouring links on the same line are not swallowed.
    let pattern = format!(r#"(?i)https?://[^\s"'<>]+?\.(?:{})"#, alternatives);

    Regex::new(&pattern).map_err(|e| HarvestError::Config {
        message: format!("Invalid image extension pattern: {}", e),
    })
}

pub fn parse_image_url(raw: &str) -> Result<Url> {
    let invalid = |reason: &str| HarvestError::InvalidUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    if raw.contains(UNSAFE_URL_CHARS) {
        return Err(invalid("contains characters not allowed in a URL"));
    }

    if has_malformed_escape(raw) {
        return Err(invalid("malformed percent escape"));
    }

    if has_brackets_outside_host(raw) {
        return Err(invalid("brackets are only allowed around an IPv6 host"));
    }

    let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("unsupported scheme"));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host"));
    }

    Ok(url)
}

// `%` must start a two-digit hex escape.
fn has_malformed_escape(raw: &str) -> bool {
    let bytes = raw.as_bytes();

    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'%'
            && !(bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit))
    })
}

fn has_brackets_outside_host(raw: &str) -> bool {
    let rest = raw.split_once("://").map_or(raw, |(_, rest)| rest);
    let authority_end = rest.find(&['/', '?', '#'][..]).unwrap_or(rest.len());

    rest[authority_end..].contains(&['[', ']'][..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn links(content: &str) -> Vec<String> {
        LinkExtractor::default()
            .extract_from_str(content)
            .links
            .into_iter()
            .map(|u| u.to_string())
            .collect()
    }

    #[test]
    fn test_finds_links_in_order_with_duplicates() {
        let content = "first https://a.example/one.jpg then http://b.example/two.PNG\n\
                       plain text line\n\
                       again https://a.example/one.jpg";

        assert_eq!(
            links(content),
            vec![
                "https://a.example/one.jpg",
                "http://b.example/two.PNG",
                "https://a.example/one.jpg",
            ]
        );
    }

    #[test]
    fn test_ignores_non_image_links_and_text() {
        let content = "see https://example.com/page.html and ftp://x.example/a.png\n\
                       https://example.com/doc.pdf, mail me at someone@example.com\n\
                       <img src=\"https://cdn.example/pic.gif\">";

        assert_eq!(links(content), vec!["https://cdn.example/pic.gif"]);
    }

    #[test]
    fn test_match_is_not_greedy() {
        let content = "https://x.example/a.jpg,https://x.example/b.webp.";
        assert_eq!(
            links(content),
            vec!["https://x.example/a.jpg", "https://x.example/b.webp"]
        );

        // Stops at the first extension even when more text follows it
        assert_eq!(
            links("https://x.example/a.pngextra/b.gif"),
            vec!["https://x.example/a.png"]
        );
    }

    #[test]
    fn test_longer_extension_is_matched_whole() {
        assert_eq!(
            links("https://x.example/photo.jpeg done"),
            vec!["https://x.example/photo.jpeg"]
        );
        assert_eq!(
            links("HTTPS://X.EXAMPLE/SHOT.BMP"),
            vec!["https://x.example/SHOT.BMP"]
        );
    }

    #[test]
    fn test_quotes_and_angle_brackets_end_a_link() {
        assert!(links("'https://x.example/a'.jpg").is_empty());
        assert!(links("<https://x.example/a>.png").is_empty());
    }

    #[test]
    fn test_malformed_links_are_rejected_not_fatal() {
        let extraction = LinkExtractor::default().extract_from_str(
            "bad http://example.com:99999/a.png\n\
             bad https://x.example/{id}.jpg\n\
             bad http://x.example/a%zz.jpg http://x.example/b%4.png\n\
             bad http://x.example/[b].png\n\
             good https://x.example/ok.gif",
        );

        assert_eq!(extraction.links.len(), 1);
        assert_eq!(extraction.links[0].as_str(), "https://x.example/ok.gif");
        assert_eq!(extraction.rejected.len(), 5);
        assert!(extraction
            .rejected
            .iter()
            .all(|e| matches!(e, HarvestError::InvalidUrl { .. })));
    }

    #[test]
    fn test_valid_escapes_and_ipv6_hosts_are_kept() {
        assert_eq!(
            links("http://x.example/my%20cat.jpg http://[::1]:8080/local.png"),
            vec!["http://x.example/my%20cat.jpg", "http://[::1]:8080/local.png"]
        );
    }

    #[test]
    fn test_empty_input() {
        let extraction = LinkExtractor::default().extract_from_str("");
        assert!(extraction.is_empty());
        assert!(extraction.rejected.is_empty());
    }

    #[test]
    fn test_reader_surfaces_invalid_utf8() {
        let bytes: Vec<u8> = vec![b'h', b'i', 0xff, 0xfe, b'\n'];
        let result = LinkExtractor::default().extract_from_reader(Cursor::new(bytes));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = LinkExtractor::default().extract_file(Path::new("/no/such/links.txt"));
        assert!(matches!(result, Err(HarvestError::Read { .. })));
    }

    #[test]
    fn test_configured_extensions() {
        let config = ScanConfig {
            image_extensions: vec!["svg".to_string()],
            ..ScanConfig::default()
        };
        let extractor = LinkExtractor::new(&config).unwrap();
        let extraction =
            extractor.extract_from_str("https://x.example/a.png https://x.example/logo.svg");

        assert_eq!(extraction.links.len(), 1);
        assert_eq!(extraction.links[0].path(), "/logo.svg");
    }
}
